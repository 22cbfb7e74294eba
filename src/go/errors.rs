use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoSyntaxError {
    #[error("failed to set Go language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at line {line}, column {column}")]
    SyntaxError { line: usize, column: usize },

    #[error("{count} syntax errors, first at line {line}, column {column}")]
    MultipleSyntaxErrors {
        count: usize,
        line: usize,
        column: usize,
    },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}
