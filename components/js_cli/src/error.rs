//! Error types for the CLI

use core_types::ParseError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Syntax or regular expression error reported by the parser
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command line value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

impl CliError {
    /// Whether the error was caused by input ending in the middle of a construct
    pub fn is_incomplete_input(&self) -> bool {
        matches!(
            self,
            CliError::Parse(error) if matches!(
                error.code,
                core_types::ErrorCode::UnexpectedEndOfInput
                    | core_types::ErrorCode::UnterminatedTemplate
                    | core_types::ErrorCode::UnterminatedComment
            )
        )
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
