//! Parser configuration
//!
//! [`ParserOptions`] is a plain struct with a [`Default`] implementation and
//! `with_*` builder methods. Extension callbacks are boxed closures; the
//! recoverable-error policy is the [`ErrorHandler`] trait.

use crate::ast::Node;
use crate::token::{Comment, Token};
use core_types::{ParseError, SourcePosition};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Targeted ECMAScript version.
///
/// Versions are totally ordered; [`EcmaVersion::Experimental`] sits above
/// every published edition and gates decorators, import attributes, the
/// regex `v` flag, duplicate named groups and `using` declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EcmaVersion {
    /// ECMAScript 3
    ES3,
    /// ECMAScript 5
    ES5,
    /// ECMAScript 2015
    ES2015,
    /// ECMAScript 2016
    ES2016,
    /// ECMAScript 2017
    ES2017,
    /// ECMAScript 2018
    ES2018,
    /// ECMAScript 2019
    ES2019,
    /// ECMAScript 2020
    ES2020,
    /// ECMAScript 2021
    ES2021,
    /// ECMAScript 2022
    ES2022,
    /// ECMAScript 2023
    ES2023,
    /// Proposals not yet part of a published edition
    Experimental,
}

impl EcmaVersion {
    /// Alias of [`EcmaVersion::ES2015`]
    pub const ES6: EcmaVersion = EcmaVersion::ES2015;
    /// Alias of [`EcmaVersion::ES2016`]
    pub const ES7: EcmaVersion = EcmaVersion::ES2016;
    /// Alias of [`EcmaVersion::ES2017`]
    pub const ES8: EcmaVersion = EcmaVersion::ES2017;
    /// Alias of [`EcmaVersion::ES2018`]
    pub const ES9: EcmaVersion = EcmaVersion::ES2018;
    /// Alias of [`EcmaVersion::ES2019`]
    pub const ES10: EcmaVersion = EcmaVersion::ES2019;
    /// Alias of [`EcmaVersion::ES2020`]
    pub const ES11: EcmaVersion = EcmaVersion::ES2020;
    /// Alias of [`EcmaVersion::ES2021`]
    pub const ES12: EcmaVersion = EcmaVersion::ES2021;
    /// Alias of [`EcmaVersion::ES2022`]
    pub const ES13: EcmaVersion = EcmaVersion::ES2022;
    /// Alias of [`EcmaVersion::ES2023`]
    pub const ES14: EcmaVersion = EcmaVersion::ES2023;
    /// Latest published edition
    pub const LATEST: EcmaVersion = EcmaVersion::ES2023;

    /// Resolve an edition number (`3`, `5`..`14`) or a year (`2015`..`2023`)
    pub fn from_number(n: u32) -> Option<EcmaVersion> {
        let version = match n {
            3 => EcmaVersion::ES3,
            5 => EcmaVersion::ES5,
            6 | 2015 => EcmaVersion::ES2015,
            7 | 2016 => EcmaVersion::ES2016,
            8 | 2017 => EcmaVersion::ES2017,
            9 | 2018 => EcmaVersion::ES2018,
            10 | 2019 => EcmaVersion::ES2019,
            11 | 2020 => EcmaVersion::ES2020,
            12 | 2021 => EcmaVersion::ES2021,
            13 | 2022 => EcmaVersion::ES2022,
            14 | 2023 => EcmaVersion::ES2023,
            _ => return None,
        };
        Some(version)
    }
}

impl Default for EcmaVersion {
    fn default() -> Self {
        EcmaVersion::LATEST
    }
}

impl std::str::FromStr for EcmaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "latest" => return Ok(EcmaVersion::LATEST),
            "experimental" | "next" => return Ok(EcmaVersion::Experimental),
            _ => {}
        }
        let digits = lower.strip_prefix("es").unwrap_or(&lower);
        digits
            .parse::<u32>()
            .ok()
            .and_then(EcmaVersion::from_number)
            .ok_or_else(|| format!("unknown ECMAScript version '{}'", s))
    }
}

/// Whether the input is a script or a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Classic script
    #[default]
    Script,
    /// ECMAScript module (strict, import/export allowed)
    Module,
    /// Parsed as a script, retried as a module when module syntax is found
    Unknown,
}

/// Policy for reserved words used as identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllowReserved {
    /// Reserved words may be used as identifiers
    Yes,
    /// Reserved words are rejected as identifiers, but allowed as property names
    #[default]
    No,
    /// Reserved words are rejected everywhere, including property names
    Never,
}

/// How regular expression literals are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RegExpParseMode {
    /// Scan the literal only
    Skip,
    /// Validate the pattern against the ECMAScript grammar
    #[default]
    Validate,
    /// Validate and adapt the pattern for the host engine
    AdaptToInterpreted,
    /// As [`RegExpParseMode::AdaptToInterpreted`], tuned for repeated matching
    AdaptToCompiled,
}

impl RegExpParseMode {
    /// Whether an adapted host pattern is produced
    pub fn adapts(self) -> bool {
        matches!(
            self,
            RegExpParseMode::AdaptToInterpreted | RegExpParseMode::AdaptToCompiled
        )
    }
}

/// Policy for recoverable errors.
///
/// The handler sees every recoverable error first. Returning `None`
/// suppresses the error; returning `Some` (possibly rewritten) passes it on
/// to the tolerant-mode decision.
pub trait ErrorHandler {
    /// Inspect, rewrite or suppress a recoverable error
    fn on_recoverable_error(&mut self, error: ParseError) -> Option<ParseError> {
        Some(error)
    }
}

/// Handler that passes every error through unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {}

/// Called with every token consumed by the parser
pub type OnToken = Box<dyn FnMut(&Token)>;
/// Called with every comment skipped by the tokenizer
pub type OnComment = Box<dyn FnMut(&Comment)>;
/// Called with the end offset and position of the token after which a
/// semicolon was inserted, or after which a trailing comma appeared
pub type OnPosition = Box<dyn FnMut(usize, SourcePosition)>;
/// Called with every finished AST node
pub type OnNode = Box<dyn FnMut(&Node)>;

/// Default recursion limit for nested grammar productions
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Configuration for [`Tokenizer`](crate::Tokenizer) and [`Parser`](crate::Parser)
pub struct ParserOptions {
    /// Targeted ECMAScript version
    pub ecma_version: EcmaVersion,
    /// Reserved words as identifiers
    pub allow_reserved: AllowReserved,
    /// Permit `return` at the top level
    pub allow_return_outside_function: bool,
    /// Permit import/export declarations anywhere
    pub allow_import_export_everywhere: bool,
    /// Permit top-level `await` in scripts
    pub allow_await_outside_function: bool,
    /// Permit `new.target` at the top level
    pub allow_new_target_outside_function: bool,
    /// Permit `super` outside methods
    pub allow_super_outside_method: bool,
    /// Permit `using` declarations at the top level of scripts
    pub allow_top_level_using: bool,
    /// Permit a `#!` line at the start of the input
    pub allow_hashbang: bool,
    /// Report private names that no enclosing class declares
    pub check_private_fields: bool,
    /// Emit `ParenthesizedExpression` nodes
    pub preserve_parens: bool,
    /// Regular expression processing
    pub regexp_parse_mode: RegExpParseMode,
    /// Match timeout recorded on adapted host patterns
    pub regex_timeout: Option<Duration>,
    /// Record recoverable errors and keep parsing
    pub tolerant: bool,
    /// Recoverable error policy
    pub error_handler: Option<Box<dyn ErrorHandler>>,
    /// Token callback
    pub on_token: Option<OnToken>,
    /// Comment callback
    pub on_comment: Option<OnComment>,
    /// Automatic semicolon insertion callback
    pub on_inserted_semicolon: Option<OnPosition>,
    /// Trailing comma callback
    pub on_trailing_comma: Option<OnPosition>,
    /// Node callback
    pub on_node: Option<OnNode>,
    /// Recursion guard limit
    pub max_recursion_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            ecma_version: EcmaVersion::LATEST,
            allow_reserved: AllowReserved::No,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_await_outside_function: false,
            allow_new_target_outside_function: false,
            allow_super_outside_method: false,
            allow_top_level_using: false,
            allow_hashbang: false,
            check_private_fields: true,
            preserve_parens: false,
            regexp_parse_mode: RegExpParseMode::Validate,
            regex_timeout: None,
            tolerant: false,
            error_handler: None,
            on_token: None,
            on_comment: None,
            on_inserted_semicolon: None,
            on_trailing_comma: None,
            on_node: None,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("ecma_version", &self.ecma_version)
            .field("allow_reserved", &self.allow_reserved)
            .field("allow_return_outside_function", &self.allow_return_outside_function)
            .field("allow_import_export_everywhere", &self.allow_import_export_everywhere)
            .field("allow_await_outside_function", &self.allow_await_outside_function)
            .field("allow_new_target_outside_function", &self.allow_new_target_outside_function)
            .field("allow_super_outside_method", &self.allow_super_outside_method)
            .field("allow_top_level_using", &self.allow_top_level_using)
            .field("allow_hashbang", &self.allow_hashbang)
            .field("check_private_fields", &self.check_private_fields)
            .field("preserve_parens", &self.preserve_parens)
            .field("regexp_parse_mode", &self.regexp_parse_mode)
            .field("regex_timeout", &self.regex_timeout)
            .field("tolerant", &self.tolerant)
            .field("error_handler", &self.error_handler.is_some())
            .field("max_recursion_depth", &self.max_recursion_depth)
            .finish_non_exhaustive()
    }
}

impl ParserOptions {
    /// Options with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a specific ECMAScript version
    pub fn with_ecma_version(mut self, version: EcmaVersion) -> Self {
        self.ecma_version = version;
        self
    }

    /// Set the reserved-word policy
    pub fn with_allow_reserved(mut self, allow: AllowReserved) -> Self {
        self.allow_reserved = allow;
        self
    }

    /// Permit top-level `return`
    pub fn with_allow_return_outside_function(mut self, allow: bool) -> Self {
        self.allow_return_outside_function = allow;
        self
    }

    /// Permit import/export anywhere
    pub fn with_allow_import_export_everywhere(mut self, allow: bool) -> Self {
        self.allow_import_export_everywhere = allow;
        self
    }

    /// Permit top-level `await` in scripts
    pub fn with_allow_await_outside_function(mut self, allow: bool) -> Self {
        self.allow_await_outside_function = allow;
        self
    }

    /// Permit `new.target` at the top level
    pub fn with_allow_new_target_outside_function(mut self, allow: bool) -> Self {
        self.allow_new_target_outside_function = allow;
        self
    }

    /// Permit `super` anywhere
    pub fn with_allow_super_outside_method(mut self, allow: bool) -> Self {
        self.allow_super_outside_method = allow;
        self
    }

    /// Permit top-level `using` in scripts
    pub fn with_allow_top_level_using(mut self, allow: bool) -> Self {
        self.allow_top_level_using = allow;
        self
    }

    /// Permit a hashbang line
    pub fn with_allow_hashbang(mut self, allow: bool) -> Self {
        self.allow_hashbang = allow;
        self
    }

    /// Toggle undeclared private name checks
    pub fn with_check_private_fields(mut self, check: bool) -> Self {
        self.check_private_fields = check;
        self
    }

    /// Emit `ParenthesizedExpression` nodes
    pub fn with_preserve_parens(mut self, preserve: bool) -> Self {
        self.preserve_parens = preserve;
        self
    }

    /// Set the regular expression mode
    pub fn with_regexp_parse_mode(mut self, mode: RegExpParseMode) -> Self {
        self.regexp_parse_mode = mode;
        self
    }

    /// Set the host regex match timeout
    pub fn with_regex_timeout(mut self, timeout: Duration) -> Self {
        self.regex_timeout = Some(timeout);
        self
    }

    /// Keep parsing after recoverable errors
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Install a recoverable error handler
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Install a token callback
    pub fn with_on_token(mut self, callback: impl FnMut(&Token) + 'static) -> Self {
        self.on_token = Some(Box::new(callback));
        self
    }

    /// Install a comment callback
    pub fn with_on_comment(mut self, callback: impl FnMut(&Comment) + 'static) -> Self {
        self.on_comment = Some(Box::new(callback));
        self
    }

    /// Install a semicolon insertion callback
    pub fn with_on_inserted_semicolon(
        mut self,
        callback: impl FnMut(usize, SourcePosition) + 'static,
    ) -> Self {
        self.on_inserted_semicolon = Some(Box::new(callback));
        self
    }

    /// Install a trailing comma callback
    pub fn with_on_trailing_comma(
        mut self,
        callback: impl FnMut(usize, SourcePosition) + 'static,
    ) -> Self {
        self.on_trailing_comma = Some(Box::new(callback));
        self
    }

    /// Install a node callback
    pub fn with_on_node(mut self, callback: impl FnMut(&Node) + 'static) -> Self {
        self.on_node = Some(Box::new(callback));
        self
    }

    /// Set the recursion guard limit
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering_and_aliases() {
        assert!(EcmaVersion::ES5 < EcmaVersion::ES6);
        assert_eq!(EcmaVersion::ES14, EcmaVersion::ES2023);
        assert!(EcmaVersion::LATEST < EcmaVersion::Experimental);
    }

    #[test]
    fn test_version_from_str() {
        assert_eq!("es6".parse::<EcmaVersion>(), Ok(EcmaVersion::ES2015));
        assert_eq!("2020".parse::<EcmaVersion>(), Ok(EcmaVersion::ES2020));
        assert_eq!("latest".parse::<EcmaVersion>(), Ok(EcmaVersion::LATEST));
        assert_eq!("experimental".parse::<EcmaVersion>(), Ok(EcmaVersion::Experimental));
        assert!("es4".parse::<EcmaVersion>().is_err());
    }

    #[test]
    fn test_builder() {
        let options = ParserOptions::new()
            .with_ecma_version(EcmaVersion::ES5)
            .with_tolerant(true)
            .with_max_recursion_depth(10);
        assert_eq!(options.ecma_version, EcmaVersion::ES5);
        assert!(options.tolerant);
        assert_eq!(options.max_recursion_depth, 10);
    }

    #[test]
    fn test_regexp_mode_adapts() {
        assert!(!RegExpParseMode::Validate.adapts());
        assert!(RegExpParseMode::AdaptToCompiled.adapts());
    }
}
