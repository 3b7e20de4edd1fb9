//! Parser error types and helpers

use core_types::{ErrorCode, ErrorKind, ParseError, SourcePosition};

/// Result of every fallible tokenizer, parser and regex operation
pub type ParseResult<T> = Result<T, ParseError>;

/// Create a syntax error at a given position
pub fn syntax_error(
    code: ErrorCode,
    message: impl Into<String>,
    position: SourcePosition,
) -> ParseError {
    ParseError::new(ErrorKind::SyntaxError, code, message, position)
}

/// Create a regex conversion failure at a given position
pub fn conversion_error(
    code: ErrorCode,
    message: impl Into<String>,
    position: SourcePosition,
) -> ParseError {
    ParseError::new(ErrorKind::RegExpConversionError, code, message, position)
}

/// Create an unexpected token error
pub fn unexpected_token(got: &str, position: SourcePosition) -> ParseError {
    syntax_error(
        ErrorCode::UnexpectedToken,
        format!("Unexpected token {}", got),
        position,
    )
}

/// Create an unexpected end of input error
pub fn unexpected_eof(position: SourcePosition) -> ParseError {
    syntax_error(
        ErrorCode::UnexpectedEndOfInput,
        "Unexpected end of input",
        position,
    )
}
