//! Unit tests for ParseError, ErrorKind and ErrorCode

use core_types::{ErrorCode, ErrorKind, ParseError, SourcePosition};

#[cfg(test)]
mod parse_error_tests {
    use super::*;

    fn sample(kind: ErrorKind, code: ErrorCode) -> ParseError {
        ParseError::new(kind, code, "message", SourcePosition::new(2, 1, 10))
    }

    #[test]
    fn test_index_is_byte_offset() {
        assert_eq!(sample(ErrorKind::SyntaxError, ErrorCode::UnexpectedToken).index(), 10);
    }

    #[test]
    fn test_conversion_failures_are_distinct() {
        let err = sample(
            ErrorKind::RegExpConversionError,
            ErrorCode::RegExpInconvertibleBackreference,
        );
        assert!(err.is_conversion_failure());
        assert_eq!(err.code.as_str(), "RegExpInconvertibleBackreference");
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(sample(ErrorKind::SyntaxError, ErrorCode::StrictWith));
        assert_eq!(err.to_string(), "message (2:1)");
    }

    #[test]
    fn test_serializes_code_name() {
        let err = sample(ErrorKind::SyntaxError, ErrorCode::DuplicateExport);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"DuplicateExport\""));
    }
}
