use astauto::config::load_from_path;
use astauto::imports::ImportOutcome;
use astauto::rules::{Orchestrator, Settings};
use astauto::StructEvent;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

#[test]
fn model_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("model.go");
    fs::write(&target, load_fixture("model.go.input")).unwrap();

    let config = load_from_path(fixture("model.toml")).expect("config");
    let orchestrator = Orchestrator::new(Settings {
        root: dir.path().to_path_buf(),
        dry_run: false,
    });
    let report = orchestrator.run(&config).expect("run");

    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        load_fixture("model.go.expected")
    );

    let rule = &report.rules[0];
    assert!(rule.written);
    let outcomes: Vec<_> = rule.imports.iter().map(|(_, outcome)| outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            ImportOutcome::Added,
            ImportOutcome::Added,
            ImportOutcome::AlreadyPresent
        ]
    );

    assert_eq!(
        rule.structs,
        vec![
            StructEvent::FieldAdded {
                type_name: "User".to_string(),
                field: "CreatedAt".to_string(),
            },
            StructEvent::FieldAdded {
                type_name: "User".to_string(),
                field: "Audit".to_string(),
            },
            StructEvent::FieldExists {
                type_name: "User".to_string(),
                field: "Name".to_string(),
            },
            StructEvent::NotAStruct {
                type_name: "Status".to_string(),
            },
            StructEvent::StructNotFound {
                type_name: "Order".to_string(),
            },
        ]
    );
}

#[test]
fn model_fixture_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("model.go");
    fs::write(&target, load_fixture("model.go.expected")).unwrap();

    let config = load_from_path(fixture("model.toml")).expect("config");
    let report = Orchestrator::new(Settings {
        root: dir.path().to_path_buf(),
        dry_run: false,
    })
    .run(&config)
    .expect("run");

    assert!(!report.rules[0].changed());
    assert!(!report.rules[0].written);
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        load_fixture("model.go.expected")
    );
}
