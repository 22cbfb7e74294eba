//! Rule orchestrator: drives the import editor, struct augmenter and writer
//! over every configured file.
//!
//! A run is all-or-nothing with respect to missing targets: every rule's
//! file is checked before the first one is touched. After that, rules run
//! strictly in order and the first hard error aborts the run. Skips
//! (import already present, field exists, struct not found) are report
//! events, never errors.

use crate::augment::{augment_structs, StructEvent};
use crate::config::{Config, Import, Rule};
use crate::format::{render, write_atomic, FormatError, WriteError};
use crate::go::{GoSource, GoSyntaxError};
use crate::imports::{ensure_imports, ImportOutcome};
use crate::safety::{SafetyError, WorkspaceGuard};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory every rule path is relative to
    pub root: PathBuf,
    /// Compute everything, write nothing
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./"),
            dry_run: false,
        }
    }
}

/// What happened to one rule's file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RuleReport should be checked for what changed"]
pub struct RuleReport {
    /// Target as resolved by the guard
    pub file: PathBuf,
    pub imports: Vec<(Import, ImportOutcome)>,
    pub structs: Vec<StructEvent>,
    pub original: String,
    pub updated: String,
    /// False for an unchanged file or a dry run
    pub written: bool,
}

impl RuleReport {
    pub fn changed(&self) -> bool {
        self.original != self.updated
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub rules: Vec<RuleReport>,
}

impl RunReport {
    pub fn files_changed(&self) -> usize {
        self.rules.iter().filter(|rule| rule.changed()).count()
    }
}

/// Fatal errors; any of them aborts the run.
#[derive(Debug)]
pub enum RunError {
    /// A rule's target does not exist (checked before any write)
    FileNotFound { path: PathBuf },
    /// Target escapes the root or sits in a dependency directory
    Guard(SafetyError),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: GoSyntaxError,
    },
    Format {
        path: PathBuf,
        source: FormatError,
    },
    Write(WriteError),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::FileNotFound { .. } => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::FileNotFound { path } => {
                write!(f, "file not found: {}", path.display())
            }
            RunError::Guard(e) => write!(f, "refusing to edit: {}", e),
            RunError::Read { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            RunError::Parse { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
            RunError::Format { path, source } => {
                write!(f, "cannot format {}: {}", path.display(), source)
            }
            RunError::Write(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::FileNotFound { .. } => None,
            RunError::Guard(e) => Some(e),
            RunError::Read { source, .. } => Some(source),
            RunError::Parse { source, .. } => Some(source),
            RunError::Format { source, .. } => Some(source),
            RunError::Write(e) => Some(e),
        }
    }
}

impl From<SafetyError> for RunError {
    fn from(e: SafetyError) -> Self {
        RunError::Guard(e)
    }
}

impl From<WriteError> for RunError {
    fn from(e: WriteError) -> Self {
        RunError::Write(e)
    }
}

pub struct Orchestrator {
    settings: Settings,
}

impl Orchestrator {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply every rule of `config`, in order.
    pub fn run(&self, config: &Config) -> Result<RunReport, RunError> {
        self.preflight(config)?;

        let guard = WorkspaceGuard::new(&self.settings.root)?;
        let mut report = RunReport::default();
        for rule in &config.rules {
            report.rules.push(self.apply_rule(&guard, rule)?);
        }
        Ok(report)
    }

    /// Every target must exist before anything is modified.
    fn preflight(&self, config: &Config) -> Result<(), RunError> {
        match config
            .rules
            .iter()
            .map(|rule| self.settings.root.join(&rule.file))
            .find(|path| !path.is_file())
        {
            Some(path) => Err(RunError::FileNotFound { path }),
            None => Ok(()),
        }
    }

    fn apply_rule(&self, guard: &WorkspaceGuard, rule: &Rule) -> Result<RuleReport, RunError> {
        let path = guard.validate_path(&rule.file)?;

        let original = fs::read_to_string(&path).map_err(|source| RunError::Read {
            path: path.clone(),
            source,
        })?;

        let (updated, imports, structs) =
            augment_text(&original, rule).map_err(|e| e.with_path(&path))?;

        let written = !self.settings.dry_run && updated != original;
        if written {
            write_atomic(&path, &updated)?;
        }

        Ok(RuleReport {
            file: path,
            imports,
            structs,
            original,
            updated,
            written,
        })
    }
}

/// Failure of the in-memory pass; the caller attaches the path.
#[derive(Debug)]
enum PassError {
    Parse(GoSyntaxError),
    Format(FormatError),
}

impl PassError {
    fn with_path(self, path: &Path) -> RunError {
        let path = path.to_path_buf();
        match self {
            PassError::Parse(source) => RunError::Parse { path, source },
            PassError::Format(source) => RunError::Format { path, source },
        }
    }
}

type PassOutput = (String, Vec<(Import, ImportOutcome)>, Vec<StructEvent>);

/// One rule over in-memory text: parse, imports, structs, render.
fn augment_text(original: &str, rule: &Rule) -> Result<PassOutput, PassError> {
    let mut source = GoSource::parse(original).map_err(PassError::Parse)?;

    // A failed splice means a constructed node did not fit the tree.
    let imports =
        ensure_imports(&mut source, &rule.imports).map_err(|e| PassError::Format(e.into()))?;
    let structs =
        augment_structs(&mut source, &rule.structs).map_err(|e| PassError::Format(e.into()))?;

    let updated = render(&source).map_err(PassError::Format)?.to_string();
    Ok((updated, imports, structs))
}
