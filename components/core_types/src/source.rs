//! Source position types for parser diagnostics and AST locations.
//!
//! Offsets are byte offsets into the UTF-8 source text. Lines are 1-based;
//! columns are 0-based byte distances from the start of the line.

use serde::Serialize;

/// Represents a position in source code.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition {
///     line: 10,
///     column: 5,
///     offset: 150,
/// };
///
/// assert_eq!(pos.line, 10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (0-based, in bytes from the line start)
    pub column: u32,
    /// Byte offset from the start of the source text
    pub offset: usize,
}

impl SourcePosition {
    /// Create a position from its parts
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// The span of a token or node as a start/end position pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// Position of the first character
    pub start: SourcePosition,
    /// Position just past the last character
    pub end: SourcePosition,
}

impl SourceLocation {
    /// Create a location from two positions
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }
}

/// Check whether a character is an ECMAScript line terminator
pub fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Recompute the line/column of `offset` by scanning `text` from the start.
///
/// `\r\n` counts as a single line break. Offsets past the end of the text are
/// clamped to the text length.
pub fn get_line_info(text: &str, offset: usize) -> SourcePosition {
    let offset = offset.min(text.len());
    let mut line = 1u32;
    let mut line_start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if index >= offset {
            break;
        }
        if is_line_break(ch) {
            let mut next = index + ch.len_utf8();
            if ch == '\r' {
                if let Some(&(lf_index, '\n')) = chars.peek() {
                    if lf_index < offset {
                        chars.next();
                        next = lf_index + 1;
                    } else {
                        // Offset points between \r and \n: still on the \r line
                        break;
                    }
                }
            }
            line += 1;
            line_start = next;
        }
    }

    SourcePosition {
        line,
        column: (offset - line_start) as u32,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_position_creation() {
        let pos = SourcePosition::new(10, 5, 150);
        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 150);
    }

    #[test]
    fn test_line_info_first_line() {
        let pos = get_line_info("abc", 2);
        assert_eq!((pos.line, pos.column), (1, 2));
    }

    #[test]
    fn test_line_info_crlf_is_single_break() {
        let pos = get_line_info("a\r\nb\nc", 5);
        assert_eq!((pos.line, pos.column), (3, 0));
    }

    #[test]
    fn test_line_info_unicode_separators() {
        let text = "a\u{2028}b";
        let pos = get_line_info(text, text.len() - 1);
        assert_eq!((pos.line, pos.column), (2, 0));
    }

    #[test]
    fn test_line_info_clamps_offset() {
        let pos = get_line_info("ab", 99);
        assert_eq!(pos.offset, 2);
    }
}
