//! ECMAScript Parser Component
//!
//! Tokenizes and parses ECMAScript source text (ES3 through ES2023, plus an
//! experimental tier) into an ESTree-shaped AST, and validates or adapts
//! regular expression literals for a host regex engine.
//!
//! # Overview
//!
//! - [`Tokenizer`] - Context-sensitive scanner producing [`Token`]s
//! - [`Parser`] - Recursive descent parser with scope analysis
//! - [`Node`] / [`NodeKind`] - AST nodes with source spans
//! - [`ParserOptions`] - Language version, permissions and callbacks
//! - [`RegExpParser`] - Regular expression validation and translation
//!
//! # Example
//!
//! ```
//! use ecma_parser::{parse, NodeKind, ParserOptions, SourceType};
//!
//! let program = parse("const x = 42;", SourceType::Script, ParserOptions::default()).unwrap();
//! let NodeKind::Program { body, .. } = &program.kind else { unreachable!() };
//! assert_eq!(body[0].type_name(), "VariableDeclaration");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod character;
pub mod error;
pub mod options;
pub mod parser;
pub mod regexp;
pub mod scope;
pub mod token;
pub mod tokenizer;

pub use ast::{Class, Function, LiteralValue, MethodKind, Node, NodeKind, PropertyKind, VariableKind};
pub use error::ParseResult;
pub use options::{
    AllowReserved, DefaultErrorHandler, EcmaVersion, ErrorHandler, ParserOptions,
    RegExpParseMode, SourceType,
};
pub use parser::Parser;
pub use regexp::{adapt_regexp, validate_regexp, AdaptedRegExp, RegExpOptions, RegExpParseResult, RegExpParser};
pub use token::{Comment, CommentKind, Token, TokenType, TokenValue};
pub use tokenizer::{tokenize, Tokenizer, Tokens};

/// Parse `source` as a complete program.
///
/// Shorthand for [`Parser::new`] followed by [`Parser::parse`].
pub fn parse(source: &str, source_type: SourceType, options: ParserOptions) -> ParseResult<Node> {
    Parser::new(source, source_type, options).parse()
}
