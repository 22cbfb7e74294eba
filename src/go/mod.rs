//! Tree-sitter integration for Go source files.
//!
//! The owned syntax tree ([`GoSource`]) keeps the exact source text next to
//! its concrete syntax tree, so comments and formatting survive every
//! mutation: edits are spliced into the text and the tree is reparsed.

pub mod errors;
pub mod parser;
pub mod source;
pub mod visitor;

pub use errors::GoSyntaxError;
pub use parser::GoParser;
pub use source::{ErrorNode, GoSource};
pub use visitor::{walk, Visitor};
