//! Core types shared by the ECMAScript parser components.
//!
//! This crate provides source location tracking and the error values every
//! other component reports through.
//!
//! # Overview
//!
//! - [`SourcePosition`] - Line/column/offset of a point in the source text
//! - [`SourceLocation`] - Start/end pair of positions
//! - [`get_line_info`] - Recompute a position from a byte offset
//! - [`ParseError`] - Syntax errors and regex conversion failures
//! - [`ErrorKind`] - Severity class of a [`ParseError`]
//! - [`ErrorCode`] - Stable identity of each diagnostic
//!
//! # Examples
//!
//! ```
//! use core_types::{get_line_info, ErrorCode, ErrorKind, ParseError};
//!
//! let pos = get_line_info("let a;\nlet b;", 11);
//! assert_eq!(pos.line, 2);
//! assert_eq!(pos.column, 4);
//!
//! let error = ParseError::new(ErrorKind::SyntaxError, ErrorCode::UnexpectedToken, "Unexpected token", pos);
//! assert_eq!(error.index(), 11);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{ErrorCode, ErrorKind, ParseError};
pub use source::{get_line_info, is_line_break, SourceLocation, SourcePosition};
