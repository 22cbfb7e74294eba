//! astauto: rule-driven augmentation of Go source files
//!
//! Reads a set of rules (target file, imports to ensure, fields to append
//! to named structs) and rewrites each target in place, touching only what
//! the rules ask for.
//!
//! # Architecture
//!
//! Go sources are parsed with tree-sitter into a [`GoSource`]. Every
//! mutation compiles down to a single primitive: [`Edit`], a verified
//! byte-span replacement. The import editor and struct augmenter compute
//! edits from the tree, splice them in and reparse.
//!
//! # Formatting
//!
//! This is not a gofmt pass over the whole file. Only the regions an edit
//! touches are laid out the way gofmt would lay them out: the added import
//! lines and the trailing alignment section of a struct that gains fields.
//! Everything else is written back byte for byte, so a source that was not
//! gofmt-clean before a run is still not gofmt-clean after it.
//!
//! # Safety
//!
//! - All edits verify expected before-text before applying
//! - Every target must exist before any file is written
//! - Targets must stay under the root and outside the Go module cache
//! - The mutated tree is re-validated before it is written
//! - Atomic file writes (tempfile + fsync + rename)
//! - Idempotent operations
//!
//! # Example
//!
//! ```no_run
//! use astauto::{load_from_path, Orchestrator, Settings};
//!
//! let config = load_from_path("config.toml")?;
//! let report = Orchestrator::new(Settings::default()).run(&config)?;
//! println!("{} file(s) changed", report.files_changed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod augment;
pub mod config;
pub mod edit;
pub mod format;
pub mod go;
pub mod imports;
pub mod rules;
pub mod safety;
pub mod typeref;

// Re-exports
pub use augment::{augment_structs, StructEvent};
pub use config::{load_from_path, load_from_str, Config, ConfigError, ConfigFormat};
pub use edit::{Edit, EditError, EditVerification};
pub use go::{GoSource, GoSyntaxError, Visitor};
pub use imports::{ensure_imports, ImportOutcome};
pub use rules::{Orchestrator, RuleReport, RunError, RunReport, Settings};
pub use safety::{SafetyError, WorkspaceGuard};
pub use typeref::TypeRef;
