//! Unit tests for SourcePosition, SourceLocation and get_line_info

use core_types::{get_line_info, is_line_break, SourceLocation, SourcePosition};

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_zero_values() {
        let pos = SourcePosition::default();
        assert_eq!(pos.line, 0);
        assert_eq!(pos.column, 0);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_source_position_large_values() {
        let pos = SourcePosition::new(u32::MAX, u32::MAX, usize::MAX);
        assert_eq!(pos.line, u32::MAX);
        assert_eq!(pos.offset, usize::MAX);
    }

    #[test]
    fn test_source_location_pair() {
        let loc = SourceLocation::new(SourcePosition::new(1, 0, 0), SourcePosition::new(1, 3, 3));
        assert_eq!(loc.end.offset - loc.start.offset, 3);
    }
}

#[cfg(test)]
mod line_info_tests {
    use super::*;

    #[test]
    fn test_each_line_terminator_starts_a_line() {
        let text = "a\nb\rc\u{2028}d\u{2029}e";
        let offset = text.find('e').unwrap();
        let pos = get_line_info(text, offset);
        assert_eq!(pos.line, 5);
        assert_eq!(pos.column, 0);
    }

    #[test]
    fn test_column_counts_bytes() {
        let text = "é = 1";
        let pos = get_line_info(text, text.len());
        assert_eq!(pos.column as usize, text.len());
    }

    #[test]
    fn test_offset_zero() {
        let pos = get_line_info("", 0);
        assert_eq!((pos.line, pos.column, pos.offset), (1, 0, 0));
    }

    #[test]
    fn test_is_line_break() {
        assert!(is_line_break('\u{2028}'));
        assert!(!is_line_break('\t'));
    }
}
