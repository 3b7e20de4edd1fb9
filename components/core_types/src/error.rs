//! Parser error types.
//!
//! Every diagnostic produced by the tokenizer, the parser or the regular
//! expression translator is a [`ParseError`]. Its [`ErrorKind`] separates
//! grammar violations from patterns that are valid ECMAScript but cannot be
//! expressed for the host regex engine.

use crate::SourcePosition;
use serde::Serialize;
use thiserror::Error;

/// The class of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed input relative to the ECMAScript grammar
    SyntaxError,
    /// A valid regular expression that has no faithful host-engine equivalent
    RegExpConversionError,
}

macro_rules! error_codes {
    ($($(#[$doc:meta])* $name:ident,)*) => {
        /// Stable identity of a diagnostic.
        ///
        /// Codes survive rewording of messages and are what error handlers
        /// match on when they rewrite or suppress recoverable errors.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum ErrorCode {
            $($(#[$doc])* $name,)*
        }

        impl ErrorCode {
            /// The code's name, e.g. `"UnexpectedToken"`
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => stringify!($name),)*
                }
            }
        }
    };
}

error_codes! {
    // Tokenizer
    /// Token not valid at this position
    UnexpectedToken,
    /// Character that cannot start any token
    UnexpectedCharacter,
    /// Input ended in the middle of a construct
    UnexpectedEndOfInput,
    /// `/*` without `*/`
    UnterminatedComment,
    /// String literal without closing quote
    UnterminatedString,
    /// Template literal without closing backtick
    UnterminatedTemplate,
    /// Regular expression literal without closing slash
    UnterminatedRegExp,
    /// Malformed numeric literal
    InvalidNumber,
    /// Identifier directly after a numeric literal
    IdentifierAfterNumber,
    /// Misplaced `_` separator in a numeric literal
    InvalidNumericSeparator,
    /// Legacy octal literal such as `017` in strict code
    StrictOctalLiteral,
    /// Legacy octal escape such as `"\051"` in strict code
    StrictOctalEscape,
    /// `\8` or `\9` in strict code
    StrictEightOrNineEscape,
    /// Octal escape in a template literal
    TemplateOctalEscape,
    /// Malformed escape sequence
    InvalidEscapeSequence,
    /// Malformed `\u` escape
    InvalidUnicodeEscape,
    /// Malformed `\x` escape
    InvalidHexEscape,
    /// Code point above U+10FFFF
    InvalidCodePoint,
    /// Escape producing a character not allowed in identifiers
    InvalidIdentifierEscape,
    /// Keyword written with unicode escapes
    EscapedKeyword,

    // Parser
    /// Reserved word used as an identifier
    UnexpectedReserved,
    /// Strict-mode reserved word used as an identifier
    UnexpectedStrictReserved,
    /// Invalid left-hand side of an assignment
    InvalidLhsInAssignment,
    /// Invalid operand of `++`/`--`
    InvalidLhsInUpdate,
    /// Invalid left-hand side of `for-in`/`for-of`
    InvalidLhsInFor,
    /// Invalid destructuring target
    InvalidDestructuringTarget,
    /// `{a = 1}` used as an expression
    ShorthandPropertyAssignment,
    /// Comma after a rest element
    TrailingCommaAfterRest,
    /// Rest element not in last position
    RestNotLast,
    /// Parenthesized pattern
    InvalidParenthesizedPattern,
    /// Redefinition of `__proto__` in an object literal
    DuplicateProto,
    /// Conflicting property definitions in an ES5 object literal
    DuplicateProperty,
    /// Identifier has already been declared
    VarRedeclaration,
    /// Parameter name repeated
    DuplicateParameter,
    /// Export name repeated
    DuplicateExport,
    /// Exported binding never declared
    UndefinedExport,
    /// `return` outside a function
    IllegalReturn,
    /// `break` without enclosing loop, switch or label
    IllegalBreak,
    /// `continue` without enclosing loop
    IllegalContinue,
    /// Label referenced but not defined
    UnknownLabel,
    /// Label declared twice in the same chain
    DuplicateLabel,
    /// `with` statement in strict code
    StrictWith,
    /// `delete identifier` in strict code
    StrictDelete,
    /// Binding or assigning `eval`/`arguments` in strict code
    StrictEvalArguments,
    /// Function declaration in a single-statement position
    FunctionInSingleStatement,
    /// Lexical declaration in a single-statement position
    LexicalInSingleStatement,
    /// More than one `default` clause in a switch
    MultipleDefaultsInSwitch,
    /// Line break after `throw`
    NewlineAfterThrow,
    /// `try` without `catch` or `finally`
    MissingCatchOrFinally,
    /// Initializer in a `for-in`/`for-of` head
    ForInOfInitializer,
    /// `for await` outside an async context
    InvalidForAwait,
    /// `for (async of ...)`
    ForOfAsync,
    /// `for (let of ...)` style ambiguity
    ForOfLet,
    /// import/export outside a module
    ModuleDeclarationInScript,
    /// import/export not at top level
    ModuleDeclarationNotTopLevel,
    /// `import.meta` outside a module
    ImportMetaOutsideModule,
    /// Unknown meta property
    InvalidMetaProperty,
    /// `new.target` outside a function
    NewTargetOutsideFunction,
    /// `super` outside a method
    SuperOutsideMethod,
    /// `super()` outside a derived constructor
    SuperCallOutsideConstructor,
    /// Class has two constructors
    DuplicateConstructor,
    /// Constructor declared as getter, setter, generator or async
    SpecialConstructor,
    /// Static member named `prototype`
    StaticPrototype,
    /// Field named `constructor`
    ConstructorField,
    /// `arguments` in a field initializer or static block
    ArgumentsInClassInit,
    /// Private name declared twice
    DuplicatePrivateName,
    /// Private name used but never declared
    UndeclaredPrivateName,
    /// `delete this.#x`
    PrivateNameDelete,
    /// `#constructor`
    PrivateConstructor,
    /// `new a?.b()`
    OptionalChainNewCallee,
    /// ``a?.b`x` ``
    OptionalChainTemplate,
    /// `a ?? b || c` without parentheses
    MixedCoalesce,
    /// `-a ** b`
    UnparenthesizedUnaryExponent,
    /// `yield` in parameter defaults
    YieldInParameter,
    /// `await` in parameter defaults
    AwaitInParameter,
    /// `await` used as an identifier where it is reserved
    AwaitIdentifier,
    /// `yield` used as an identifier where it is reserved
    YieldIdentifier,
    /// `await` in a class static block
    AwaitInStaticBlock,
    /// Line break before `=>`
    LineBreakBeforeArrow,
    /// `"use strict"` in a function with non-simple parameters
    UseStrictNonSimpleParams,
    /// `let` as a lexically bound name
    LetInLexicalBinding,
    /// Getter with parameters
    GetterArity,
    /// Setter without exactly one parameter
    SetterArity,
    /// Setter with a rest parameter
    SetterRestParameter,
    /// `const` without initializer
    ConstWithoutInit,
    /// Destructuring declaration without initializer
    PatternWithoutInit,
    /// String literal export name without `from`
    InvalidExportLocal,
    /// Decorator in an invalid position
    InvalidDecorator,
    /// `using` declaration in an invalid position
    InvalidUsingDeclaration,
    /// Nesting deeper than the configured recursion limit
    StackOverflow,
    /// Module specifier or attribute value is not a string
    InvalidImportAttributes,

    // Regular expressions
    /// Unknown or misplaced regex flag
    RegExpInvalidFlags,
    /// Regex flag repeated
    RegExpDuplicateFlag,
    /// `(` without `)`
    RegExpUnterminatedGroup,
    /// `)` without `(`
    RegExpUnmatchedParen,
    /// Lone `{`, `}` or `]` in Unicode mode
    RegExpLoneQuantifierBrackets,
    /// `[` without `]`
    RegExpUnterminatedCharacterClass,
    /// Malformed `(?` group
    RegExpInvalidGroup,
    /// Quantifier with no preceding atom
    RegExpNothingToRepeat,
    /// Quantifier applied to something that cannot be quantified
    RegExpInvalidQuantifier,
    /// `{` quantifier not closed in Unicode mode
    RegExpIncompleteQuantifier,
    /// `{2,1}`
    RegExpRangeOutOfOrder,
    /// `[z-a]`
    RegExpClassRangeOutOfOrder,
    /// Class escape used as a range bound in Unicode mode
    RegExpInvalidCharacterClass,
    /// Identity escape not allowed in Unicode mode
    RegExpInvalidEscape,
    /// Malformed `\u` escape in Unicode mode
    RegExpInvalidUnicodeEscape,
    /// Decimal escape beyond the group count in Unicode mode
    RegExpInvalidDecimalEscape,
    /// Malformed `\k` escape
    RegExpInvalidNamedReference,
    /// `\k<name>` naming no group
    RegExpInvalidNamedCaptureReferenced,
    /// Malformed group name
    RegExpInvalidCaptureGroupName,
    /// Group name repeated in the same alternative
    RegExpDuplicateCaptureGroupName,
    /// Unknown `\p{...}` property
    RegExpInvalidPropertyName,
    /// Malformed set operation in `v` mode
    RegExpInvalidClassSetOperation,
    /// Reserved character in a `v` mode class
    RegExpInvalidClassSetCharacter,
    /// Negated class that may contain strings in `v` mode
    RegExpNegatedClassContainsStrings,

    // Regular expression conversion failures
    /// Backreference the host engine evaluates differently
    RegExpInconvertibleBackreference,
    /// Property escape without a host translation
    RegExpInconvertibleProperty,
    /// Quantifier bound beyond host limits
    RegExpInconvertibleQuantifier,
    /// `v` flag patterns
    RegExpInconvertibleUnicodeSets,
    /// Lone surrogate the host engine cannot represent
    RegExpInconvertibleSurrogate,
    /// Host engine rejected the adapted pattern
    RegExpConversionFailed,
}

/// A syntax error or regex conversion failure.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorCode, ErrorKind, ParseError, SourcePosition};
///
/// let error = ParseError::new(
///     ErrorKind::SyntaxError,
///     ErrorCode::UnexpectedToken,
///     "Unexpected token",
///     SourcePosition::new(1, 4, 4),
/// );
///
/// assert_eq!(error.to_string(), "Unexpected token (1:4)");
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message} ({}:{})", .position.line, .position.column)]
pub struct ParseError {
    /// Syntax error or conversion failure
    pub kind: ErrorKind,
    /// Stable identity of the diagnostic
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Where the error was detected
    pub position: SourcePosition,
    /// Source file name, when the caller provided one
    pub source_file: Option<String>,
}

impl ParseError {
    /// Create an error without a source file
    pub fn new(
        kind: ErrorKind,
        code: ErrorCode,
        message: impl Into<String>,
        position: SourcePosition,
    ) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            position,
            source_file: None,
        }
    }

    /// Attach the name of the file the error belongs to
    pub fn with_source_file(mut self, source_file: Option<String>) -> Self {
        self.source_file = source_file;
        self
    }

    /// Byte offset of the error
    pub fn index(&self) -> usize {
        self.position.offset
    }

    /// Whether this is a regex conversion failure rather than a syntax error
    pub fn is_conversion_failure(&self) -> bool {
        self.kind == ErrorKind::RegExpConversionError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_names() {
        assert_eq!(ErrorCode::VarRedeclaration.as_str(), "VarRedeclaration");
        assert_eq!(ErrorCode::RegExpRangeOutOfOrder.as_str(), "RegExpRangeOutOfOrder");
    }

    #[test]
    fn test_parse_error_display() {
        let error = ParseError::new(
            ErrorKind::SyntaxError,
            ErrorCode::UnexpectedToken,
            "Unexpected token",
            SourcePosition::new(3, 7, 40),
        );
        assert_eq!(error.to_string(), "Unexpected token (3:7)");
        assert!(!error.is_conversion_failure());
    }

    #[test]
    fn test_source_file_attached() {
        let error = ParseError::new(
            ErrorKind::RegExpConversionError,
            ErrorCode::RegExpConversionFailed,
            "x",
            SourcePosition::default(),
        )
        .with_source_file(Some("a.js".to_string()));
        assert_eq!(error.source_file.as_deref(), Some("a.js"));
        assert!(error.is_conversion_failure());
    }
}
