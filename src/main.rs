use anyhow::Result;
use astauto::config::{load_from_path, Config, ConfigError};
use astauto::imports::ImportOutcome;
use astauto::rules::{Orchestrator, RuleReport, RunError, RunReport, Settings};
use astauto::StructEvent;
use clap::Parser;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "astauto")]
#[command(about = "Add imports and struct fields to Go source files", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory rule paths are relative to
    #[arg(short, long, default_value = "./")]
    path: PathBuf,

    /// Rule file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "./config.toml")]
    conf: PathBuf,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Only print errors (and the diff, if requested)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match cmd_run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// 1: configuration; 2: a target file is missing; 3: anything else.
fn exit_code(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<ConfigError>().is_some() {
        1
    } else if let Some(run_error) = error.downcast_ref::<RunError>() {
        run_error.exit_code()
    } else {
        3
    }
}

fn cmd_run(cli: &Cli) -> Result<()> {
    let config = load_from_path(&cli.conf)?;

    if !cli.quiet {
        print_config_summary(&cli.conf, &config);
        if cli.dry_run {
            eprintln!("{}", "[DRY RUN - no files will be written]".cyan());
        }
    }

    let orchestrator = Orchestrator::new(Settings {
        root: cli.path.clone(),
        dry_run: cli.dry_run,
    });
    let report = orchestrator.run(&config)?;

    // Report paths are canonical; show them the way the rules name them.
    let root = cli.path.canonicalize().unwrap_or_else(|_| cli.path.clone());
    for rule in &report.rules {
        if !cli.quiet {
            print_rule_events(rule, cli.dry_run);
        }
        if cli.diff && rule.changed() {
            let label = rule.file.strip_prefix(&root).unwrap_or(&rule.file);
            display_diff(label, &rule.original, &rule.updated);
        }
    }

    if !cli.quiet {
        print_run_summary(&report, cli.dry_run);
    }

    Ok(())
}

fn print_config_summary(conf: &Path, config: &Config) {
    eprintln!(
        "Loaded {} rule(s) from {}",
        config.rules.len(),
        conf.display()
    );
    for rule in &config.rules {
        let fields: usize = rule.structs.iter().map(|s| s.fields.len()).sum();
        eprintln!(
            "  {} {}",
            rule.file.bold(),
            format!(
                "({} import(s), {} struct(s), {} field(s))",
                rule.imports.len(),
                rule.structs.len(),
                fields
            )
            .dimmed()
        );
    }
    eprintln!();
}

fn print_rule_events(rule: &RuleReport, dry_run: bool) {
    let status = if !rule.changed() {
        "unchanged".yellow()
    } else if dry_run {
        "would change".cyan()
    } else {
        "updated".green()
    };
    eprintln!("{}: {}", rule.file.display(), status);

    for (import, outcome) in &rule.imports {
        match outcome {
            ImportOutcome::Added => eprintln!("  {} import {} added", "✓".green(), import),
            ImportOutcome::AlreadyPresent => {
                eprintln!("  {} import {} already present", "⊙".yellow(), import)
            }
        }
    }

    for event in &rule.structs {
        match event {
            StructEvent::FieldAdded { type_name, field } => {
                eprintln!("  {} {}.{} added", "✓".green(), type_name, field)
            }
            StructEvent::FieldExists { type_name, field } => {
                eprintln!("  {} {}.{} already exists", "⊙".yellow(), type_name, field)
            }
            StructEvent::NotAStruct { type_name } => {
                eprintln!("  {} {} is not a struct, skipped", "⊘".cyan(), type_name)
            }
            StructEvent::StructNotFound { type_name } => {
                eprintln!("  {} type {} not found, skipped", "⊘".cyan(), type_name)
            }
        }
    }
}

fn print_run_summary(report: &RunReport, dry_run: bool) {
    let changed = report.files_changed();
    let unchanged = report.rules.len() - changed;
    eprintln!();
    eprintln!("{}", "Summary:".bold());
    if dry_run {
        eprintln!("  {} would change", format!("{}", changed).cyan());
    } else {
        eprintln!("  {} updated", format!("{}", changed).green());
    }
    eprintln!("  {} unchanged", format!("{}", unchanged).yellow());
}

/// Unified diff of one rewritten file, labelled relative to the root.
fn display_diff(label: &Path, original: &str, modified: &str) {
    let diff = TextDiff::from_lines(original, modified);
    let mut unified = diff.unified_diff();
    unified.context_radius(3);

    println!("{}", format!("--- a/{}", label.display()).dimmed());
    println!("{}", format!("+++ b/{}", label.display()).dimmed());
    for hunk in unified.iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
