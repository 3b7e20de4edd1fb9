//! Regular expression validation and translation.
//!
//! [`RegExpParser`] checks a pattern and its flags against the ECMAScript
//! grammar (including the Annex B extensions outside Unicode mode) and, when
//! asked to, rewrites the pattern into the syntax of the host engine
//! (`fancy_regex`) so that it keeps JavaScript semantics:
//!
//! - `.` does not match line terminators unless the `s` flag is set
//! - `^` and `$` follow the `m` flag
//! - `\d`, `\w`, `\s` and `\b` use the JavaScript character sets
//! - named groups become numbered groups with a separate descriptor table
//!
//! Constructs the host engine cannot express are reported as conversion
//! failures instead of syntax errors.

mod class;
mod groups;
pub mod unicode;

use crate::error::{conversion_error, syntax_error, ParseResult};
use crate::options::{EcmaVersion, RegExpParseMode};
use class::{is_surrogate_pair, push_host_char, CharSet};
use core_types::{ErrorCode, ParseError, SourcePosition};
use fancy_regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::trace;
use unicode::{legacy_case_variants, resolve_property, UnicodeProperty};

/// Maximum group nesting before the pattern is rejected
const MAX_NESTING: usize = 512;

/// Backtracking budget for adapted expressions
const BACKTRACK_LIMIT: usize = 1_000_000;

/// Compiled-size limits for the delegated automata
const INTERPRETED_SIZE_LIMIT: usize = 1 << 20;
const COMPILED_SIZE_LIMIT: usize = 10 << 20;

/// Line terminators for `.` and the multiline anchors
const LINE_TERMINATORS: &str = "\\n\\r\\x{2028}\\x{2029}";

/// Options for a single pattern
#[derive(Debug, Clone)]
pub struct RegExpOptions {
    /// Language version whose regex grammar applies
    pub ecma_version: EcmaVersion,
    /// Validation only, or validation plus adaptation
    pub mode: RegExpParseMode,
    /// Match timeout recorded on adapted expressions
    pub timeout: Option<Duration>,
    /// Position of the first pattern character in the enclosing source
    pub base: SourcePosition,
}

impl Default for RegExpOptions {
    fn default() -> Self {
        Self {
            ecma_version: EcmaVersion::LATEST,
            mode: RegExpParseMode::Validate,
            timeout: None,
            base: SourcePosition::new(1, 0, 0),
        }
    }
}

/// A capturing group of the original pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturingGroup {
    /// 1-based group number
    pub index: usize,
    /// Group name, if any
    pub name: Option<String>,
    /// Byte offset of the opening parenthesis within the pattern
    pub start: usize,
}

/// A pattern rewritten for the host engine
#[derive(Debug, Clone, Serialize)]
pub struct AdaptedRegExp {
    /// Host pattern text
    pub pattern: String,
    /// The built host expression
    #[serde(skip)]
    pub regex: Regex,
    /// Capturing groups of the original pattern, by number
    pub groups: Vec<CapturingGroup>,
    /// Timeout the caller should apply to matching
    pub timeout: Option<Duration>,
}

impl PartialEq for AdaptedRegExp {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.groups == other.groups
            && self.timeout == other.timeout
    }
}

impl AdaptedRegExp {
    /// Host group number of the group with the given name
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups
            .iter()
            .find(|group| group.name.as_deref() == Some(name))
            .map(|group| group.index)
    }
}

/// Outcome of parsing a pattern that passed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RegExpParseResult {
    /// Valid; no adaptation was requested
    Validated,
    /// Valid and rewritten for the host engine
    Adapted(AdaptedRegExp),
    /// Valid, but the host engine cannot express it
    ConversionFailed(ParseError),
}

impl RegExpParseResult {
    /// The adapted expression, if there is one
    pub fn adapted(&self) -> Option<&AdaptedRegExp> {
        match self {
            RegExpParseResult::Adapted(adapted) => Some(adapted),
            _ => None,
        }
    }
}

/// Flags after validation
#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    ignore_case: bool,
    multiline: bool,
    dot_all: bool,
    unicode: bool,
    unicode_sets: bool,
}

/// What an atom emitted, for quantifier handling
#[derive(Debug, Clone, Copy)]
enum AtomKind {
    Char(u32),
    Group,
    Other,
}

#[derive(Debug)]
enum Repeat {
    Star,
    Plus,
    Optional,
    Braced { min: String, max: Option<String>, exact: bool },
}

#[derive(Debug)]
struct Quantifier {
    repeat: Repeat,
    lazy: bool,
}

/// Validates a pattern and optionally adapts it for the host engine.
///
/// # Examples
///
/// ```
/// use ecma_parser::regexp::{RegExpOptions, RegExpParseResult, RegExpParser};
/// use ecma_parser::RegExpParseMode;
///
/// let options = RegExpOptions {
///     mode: RegExpParseMode::AdaptToInterpreted,
///     ..RegExpOptions::default()
/// };
/// let result = RegExpParser::new("(?<year>\\d{4})", "u", options).parse().unwrap();
/// let adapted = result.adapted().unwrap();
/// assert_eq!(adapted.group_index("year"), Some(1));
/// assert!(adapted.regex.is_match("in 2024").unwrap());
/// ```
pub struct RegExpParser<'a> {
    pattern: &'a str,
    flags: &'a str,
    options: RegExpOptions,
    chars: Vec<char>,
    offsets: Vec<usize>,
    pos: usize,
    unicode: bool,
    unicode_sets: bool,
    ignore_case: bool,
    multiline: bool,
    dot_all: bool,
    named_groups: bool,
    groups: Vec<CapturingGroup>,
    closed: Vec<bool>,
    capture_count: usize,
    depth: usize,
    out: String,
    conversion: Option<ParseError>,
}

impl<'a> RegExpParser<'a> {
    /// Create a parser for `pattern` with `flags`
    pub fn new(pattern: &'a str, flags: &'a str, options: RegExpOptions) -> Self {
        let (offsets, chars): (Vec<usize>, Vec<char>) = pattern.char_indices().unzip();
        Self {
            pattern,
            flags,
            options,
            chars,
            offsets,
            pos: 0,
            unicode: false,
            unicode_sets: false,
            ignore_case: false,
            multiline: false,
            dot_all: false,
            named_groups: false,
            groups: Vec::new(),
            closed: Vec::new(),
            capture_count: 0,
            depth: 0,
            out: String::new(),
            conversion: None,
        }
    }

    /// Validate the pattern and, depending on the mode, adapt it
    pub fn parse(mut self) -> ParseResult<RegExpParseResult> {
        let flags = self.parse_flags()?;
        self.unicode = flags.unicode || flags.unicode_sets;
        self.unicode_sets = flags.unicode_sets;
        self.ignore_case = flags.ignore_case;
        self.multiline = flags.multiline;
        self.dot_all = flags.dot_all;

        self.scan_groups()?;
        self.closed = vec![false; self.groups.len() + 1];
        self.parse_pattern()?;

        if !self.options.mode.adapts() {
            return Ok(RegExpParseResult::Validated);
        }
        if self.unicode_sets {
            self.inconvertible(
                0,
                ErrorCode::RegExpInconvertibleUnicodeSets,
                "Unicode sets mode cannot be expressed by the host engine",
            );
        }
        if let Some(error) = self.conversion.take() {
            return Ok(RegExpParseResult::ConversionFailed(error));
        }
        self.build()
    }

    fn build(self) -> ParseResult<RegExpParseResult> {
        let mut pattern = String::with_capacity(self.out.len() + 4);
        // Without `u`, case variants are spelled out during translation.
        if self.ignore_case && self.unicode {
            pattern.push_str("(?i)");
        }
        pattern.push_str(&self.out);
        let size_limit = match self.options.mode {
            RegExpParseMode::AdaptToCompiled => COMPILED_SIZE_LIMIT,
            _ => INTERPRETED_SIZE_LIMIT,
        };
        trace!(source = self.pattern, host = %pattern, "adapting regular expression");
        let built = RegexBuilder::new(&pattern)
            .backtrack_limit(BACKTRACK_LIMIT)
            .delegate_size_limit(size_limit)
            .build();
        match built {
            Ok(regex) => Ok(RegExpParseResult::Adapted(AdaptedRegExp {
                pattern,
                regex,
                groups: self.groups,
                timeout: self.options.timeout,
            })),
            Err(error) => Ok(RegExpParseResult::ConversionFailed(conversion_error(
                ErrorCode::RegExpConversionFailed,
                format!("Cannot convert regular expression: {}", error),
                self.position(0),
            ))),
        }
    }

    fn parse_flags(&self) -> ParseResult<Flags> {
        let version = self.options.ecma_version;
        let mut flags = Flags::default();
        let mut seen = String::new();
        for (index, flag) in self.flags.char_indices() {
            let available = match flag {
                'g' | 'i' | 'm' => true,
                'u' | 'y' => version >= EcmaVersion::ES2015,
                's' => version >= EcmaVersion::ES2018,
                'd' => version >= EcmaVersion::ES2022,
                'v' => version >= EcmaVersion::Experimental,
                _ => false,
            };
            let position = self.flag_position(index);
            if !available {
                return Err(syntax_error(
                    ErrorCode::RegExpInvalidFlags,
                    "Invalid regular expression flags",
                    position,
                ));
            }
            if seen.contains(flag) {
                return Err(syntax_error(
                    ErrorCode::RegExpDuplicateFlag,
                    "Duplicate regular expression flag",
                    position,
                ));
            }
            seen.push(flag);
            match flag {
                'i' => flags.ignore_case = true,
                'm' => flags.multiline = true,
                's' => flags.dot_all = true,
                'u' => flags.unicode = true,
                'v' => flags.unicode_sets = true,
                _ => {}
            }
        }
        if flags.unicode && flags.unicode_sets {
            return Err(syntax_error(
                ErrorCode::RegExpInvalidFlags,
                "Invalid regular expression flags",
                self.flag_position(0),
            ));
        }
        Ok(flags)
    }

    fn flag_position(&self, index: usize) -> SourcePosition {
        // Flags follow the closing slash
        let offset = self.pattern.len() + 1 + index;
        let base = self.options.base;
        SourcePosition::new(base.line, base.column + offset as u32, base.offset + offset)
    }

    fn position(&self, index: usize) -> SourcePosition {
        let offset = self
            .offsets
            .get(index)
            .copied()
            .unwrap_or(self.pattern.len());
        let base = self.options.base;
        SourcePosition::new(base.line, base.column + offset as u32, base.offset + offset)
    }

    pub(crate) fn error(&self, index: usize, code: ErrorCode, message: &str) -> ParseError {
        syntax_error(
            code,
            format!("Invalid regular expression: /{}/: {}", self.pattern, message),
            self.position(index),
        )
    }

    /// Record the first construct the host engine cannot express
    pub(crate) fn inconvertible(&mut self, index: usize, code: ErrorCode, message: &str) {
        if self.options.mode.adapts() && self.conversion.is_none() {
            self.conversion = Some(conversion_error(
                code,
                format!("Cannot convert regular expression /{}/: {}", self.pattern, message),
                self.position(index),
            ));
        }
    }

    /// Ignore-case matching by the non-Unicode canonicalization
    pub(crate) fn legacy_ignore_case(&self) -> bool {
        self.ignore_case && !self.unicode
    }

    pub(crate) fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.current() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_pattern(&mut self) -> ParseResult<()> {
        self.disjunction()?;
        match self.current() {
            None => Ok(()),
            Some(')') => Err(self.error(self.pos, ErrorCode::RegExpUnmatchedParen, "Unmatched ')'")),
            Some(_) => Err(self.error(
                self.pos,
                ErrorCode::RegExpLoneQuantifierBrackets,
                "Lone quantifier brackets",
            )),
        }
    }

    fn disjunction(&mut self) -> ParseResult<()> {
        self.alternative()?;
        while self.eat('|') {
            self.out.push('|');
            self.alternative()?;
        }
        let start = self.pos;
        if self.eat_quantifier(true)?.is_some() {
            return Err(self.error(start, ErrorCode::RegExpNothingToRepeat, "Nothing to repeat"));
        }
        if self.current() == Some('{') {
            return Err(self.error(
                start,
                ErrorCode::RegExpLoneQuantifierBrackets,
                "Lone quantifier brackets",
            ));
        }
        Ok(())
    }

    fn alternative(&mut self) -> ParseResult<()> {
        while self.pos < self.chars.len() && self.term()? {}
        Ok(())
    }

    fn term(&mut self) -> ParseResult<bool> {
        let start = self.pos;
        let out_start = self.out.len();
        let captures_before = self.capture_count;
        if let Some(quantifiable) = self.assertion()? {
            if quantifiable {
                if let Some(quantifier) = self.eat_quantifier(false)? {
                    let captures = self.capture_count > captures_before;
                    self.quantify_lookahead(out_start, quantifier, captures);
                }
            }
            return Ok(true);
        }
        let atom = if self.unicode {
            self.atom()?
        } else {
            self.extended_atom()?
        };
        let Some(kind) = atom else {
            return Ok(false);
        };
        if let Some(quantifier) = self.eat_quantifier(false)? {
            self.apply_quantifier(out_start, kind, quantifier, start);
        }
        Ok(true)
    }

    fn enter_group(&mut self, at: usize) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(at, ErrorCode::StackOverflow, "Groups nested too deeply"));
        }
        Ok(())
    }

    /// Returns `Some(quantifiable)` when an assertion was read
    fn assertion(&mut self) -> ParseResult<Option<bool>> {
        let start = self.pos;
        match self.current() {
            Some('^') => {
                self.pos += 1;
                if self.multiline {
                    self.out
                        .push_str(&format!("(?:^|(?<=[{}]))", LINE_TERMINATORS));
                } else {
                    self.out.push('^');
                }
                return Ok(Some(false));
            }
            Some('$') => {
                self.pos += 1;
                if self.multiline {
                    self.out
                        .push_str(&format!("(?:$|(?=[{}]))", LINE_TERMINATORS));
                } else {
                    self.out.push('$');
                }
                return Ok(Some(false));
            }
            Some('\\') if matches!(self.peek(1), Some('b' | 'B')) => {
                let negated = self.peek(1) == Some('B');
                self.pos += 2;
                self.out.push_str(if negated {
                    "(?:(?<=[A-Za-z0-9_])(?=[A-Za-z0-9_])|(?<![A-Za-z0-9_])(?![A-Za-z0-9_]))"
                } else {
                    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))"
                });
                return Ok(Some(false));
            }
            Some('(') if self.peek(1) == Some('?') => {}
            _ => return Ok(None),
        }

        let lookbehind = self.peek(2) == Some('<')
            && self.options.ecma_version >= EcmaVersion::ES2018
            && matches!(self.peek(3), Some('=' | '!'));
        let head = if lookbehind { 4 } else { 3 };
        let negative = match self.chars.get(start + head - 1) {
            Some('=') => false,
            Some('!') => true,
            _ => return Ok(None),
        };
        self.pos += head;
        self.enter_group(start)?;
        self.out.push_str(match (lookbehind, negative) {
            (false, false) => "(?=",
            (false, true) => "(?!",
            (true, false) => "(?<=",
            (true, true) => "(?<!",
        });
        self.disjunction()?;
        if !self.eat(')') {
            return Err(self.error(start, ErrorCode::RegExpUnterminatedGroup, "Unterminated group"));
        }
        self.depth -= 1;
        self.out.push(')');
        Ok(Some(!lookbehind && !self.unicode))
    }

    /// Atom in Unicode mode
    fn atom(&mut self) -> ParseResult<Option<AtomKind>> {
        let start = self.pos;
        let Some(ch) = self.current() else {
            return Ok(None);
        };
        match ch {
            '\\' => match self.atom_escape()? {
                Some(kind) => Ok(Some(kind)),
                None => Err(self.error(start, ErrorCode::RegExpInvalidEscape, "Invalid escape")),
            },
            '.' => {
                self.pos += 1;
                self.emit_dot();
                Ok(Some(AtomKind::Other))
            }
            '[' => {
                self.character_class()?;
                Ok(Some(AtomKind::Other))
            }
            '(' => {
                self.group()?;
                Ok(Some(AtomKind::Group))
            }
            '^' | '$' | '*' | '+' | '?' | ')' | ']' | '{' | '}' | '|' => Ok(None),
            _ => {
                self.pos += 1;
                self.emit_char(ch as u32, start);
                Ok(Some(AtomKind::Char(ch as u32)))
            }
        }
    }

    /// Atom outside Unicode mode, with the Annex B extensions
    fn extended_atom(&mut self) -> ParseResult<Option<AtomKind>> {
        let start = self.pos;
        let Some(ch) = self.current() else {
            return Ok(None);
        };
        match ch {
            '\\' => {
                if let Some(kind) = self.atom_escape()? {
                    return Ok(Some(kind));
                }
                // `\c` without a control letter matches a backslash
                self.pos = start + 1;
                self.emit_char('\\' as u32, start);
                Ok(Some(AtomKind::Char('\\' as u32)))
            }
            '.' => {
                self.pos += 1;
                self.emit_dot();
                Ok(Some(AtomKind::Other))
            }
            '[' => {
                self.character_class()?;
                Ok(Some(AtomKind::Other))
            }
            '(' => {
                self.group()?;
                Ok(Some(AtomKind::Group))
            }
            '{' => {
                if self.eat_braced_quantifier(true)?.is_some() {
                    return Err(self.error(start, ErrorCode::RegExpNothingToRepeat, "Nothing to repeat"));
                }
                self.pos = start + 1;
                self.emit_char('{' as u32, start);
                Ok(Some(AtomKind::Char('{' as u32)))
            }
            '^' | '$' | '*' | '+' | '?' | ')' | '|' => Ok(None),
            _ => {
                self.pos += 1;
                self.emit_char(ch as u32, start);
                Ok(Some(AtomKind::Char(ch as u32)))
            }
        }
    }

    fn group(&mut self) -> ParseResult<()> {
        let start = self.pos;
        self.pos += 1;
        let capturing = if self.eat('?') {
            if self.eat(':') {
                false
            } else if self.current() == Some('<') && self.options.ecma_version >= EcmaVersion::ES2018 {
                let Some((_, next)) =
                    groups::read_group_name(&self.chars, self.pos + 1, self.options.ecma_version)
                else {
                    return Err(self.error(
                        self.pos + 1,
                        ErrorCode::RegExpInvalidCaptureGroupName,
                        "Invalid capture group name",
                    ));
                };
                self.pos = next;
                true
            } else {
                return Err(self.error(start, ErrorCode::RegExpInvalidGroup, "Invalid group"));
            }
        } else {
            true
        };
        self.enter_group(start)?;
        let index = if capturing {
            self.capture_count += 1;
            self.out.push('(');
            Some(self.capture_count)
        } else {
            self.out.push_str("(?:");
            None
        };
        self.disjunction()?;
        if !self.eat(')') {
            return Err(self.error(start, ErrorCode::RegExpUnterminatedGroup, "Unterminated group"));
        }
        self.depth -= 1;
        self.out.push(')');
        if let Some(index) = index {
            if let Some(closed) = self.closed.get_mut(index) {
                *closed = true;
            }
        }
        Ok(())
    }

    /// `\` outside a class. `Ok(None)` means the backslash is literal
    /// (only possible outside Unicode mode).
    fn atom_escape(&mut self) -> ParseResult<Option<AtomKind>> {
        let start = self.pos;
        self.pos += 1;
        let Some(ch) = self.current() else {
            return Err(self.error(start, ErrorCode::RegExpInvalidEscape, "\\ at end of pattern"));
        };

        if ('1'..='9').contains(&ch) {
            let digits_start = self.pos;
            let digits = self.eat_decimal().unwrap_or_default();
            let in_range = compare_decimal(&digits, &self.groups.len().to_string()) != Ordering::Greater;
            if in_range {
                let index = digits.parse::<usize>().unwrap_or(0);
                self.emit_backreference(&[index], start);
                return Ok(Some(AtomKind::Other));
            }
            if self.unicode {
                return Err(self.error(
                    start,
                    ErrorCode::RegExpInvalidDecimalEscape,
                    "Invalid decimal escape",
                ));
            }
            self.pos = digits_start;
        }

        if let Some(mut set) = self.character_class_escape()? {
            if self.legacy_ignore_case() {
                set.close_over_legacy_case();
            }
            set.emit(false, &mut self.out);
            return Ok(Some(AtomKind::Other));
        }
        if let Some(cp) = self.character_escape(true)? {
            self.emit_char(cp, start);
            return Ok(Some(AtomKind::Char(cp)));
        }
        if ch == 'k' && self.named_groups {
            self.pos += 1;
            if self.current() == Some('<') {
                if let Some((name, next)) =
                    groups::read_group_name(&self.chars, self.pos + 1, self.options.ecma_version)
                {
                    let indices = self.groups_named(&name);
                    if indices.is_empty() {
                        return Err(self.error(
                            start,
                            ErrorCode::RegExpInvalidNamedCaptureReferenced,
                            "Invalid named capture referenced",
                        ));
                    }
                    self.pos = next;
                    self.emit_backreference(&indices, start);
                    return Ok(Some(AtomKind::Other));
                }
            }
            return Err(self.error(
                start,
                ErrorCode::RegExpInvalidNamedReference,
                "Invalid named reference",
            ));
        }
        if self.unicode {
            let (code, message) = match ch {
                'c' | 'u' => (ErrorCode::RegExpInvalidUnicodeEscape, "Invalid unicode escape"),
                '0'..='9' => (ErrorCode::RegExpInvalidDecimalEscape, "Invalid decimal escape"),
                _ => (ErrorCode::RegExpInvalidEscape, "Invalid escape"),
            };
            return Err(self.error(start, code, message));
        }
        self.pos = start;
        Ok(None)
    }

    /// `\d`, `\s`, `\w`, their negations and `\p{...}`, positioned on the
    /// letter
    pub(crate) fn character_class_escape(&mut self) -> ParseResult<Option<CharSet>> {
        let start = self.pos;
        match self.current() {
            Some(letter @ ('d' | 'D' | 's' | 'S' | 'w' | 'W')) => {
                self.pos += 1;
                Ok(Some(self.builtin_class(letter)))
            }
            Some(letter @ ('p' | 'P'))
                if self.unicode && self.options.ecma_version >= EcmaVersion::ES2018 =>
            {
                self.pos += 1;
                self.property_escape(letter == 'P', start).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn property_escape(&mut self, negated: bool, start: usize) -> ParseResult<CharSet> {
        let invalid = |parser: &Self| {
            parser.error(start, ErrorCode::RegExpInvalidPropertyName, "Invalid property name")
        };
        if !self.eat('{') {
            return Err(invalid(self));
        }
        let name = self.eat_while(|ch| ch.is_ascii_alphabetic() || ch == '_');
        let value = if self.eat('=') {
            Some(self.eat_while(|ch| ch.is_ascii_alphanumeric() || ch == '_'))
        } else {
            None
        };
        if !self.eat('}') {
            return Err(invalid(self));
        }
        let property = resolve_property(&name, value.as_deref(), self.unicode_sets)
            .ok_or_else(|| invalid(self))?;
        match property {
            UnicodeProperty::GeneralCategory(canonical) => {
                let mut set = CharSet::default();
                let letter = if negated { 'P' } else { 'p' };
                set.add_property(format!("\\{}{{{}}}", letter, canonical));
                Ok(set)
            }
            UnicodeProperty::Strings if negated => Err(invalid(self)),
            UnicodeProperty::Strings => Ok(CharSet::strings()),
            UnicodeProperty::Script(_) | UnicodeProperty::Binary => {
                self.inconvertible(
                    start,
                    ErrorCode::RegExpInconvertibleProperty,
                    "Only General_Category properties can be converted",
                );
                Ok(CharSet::default())
            }
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current().filter(|&ch| predicate(ch)) {
            text.push(ch);
            self.pos += 1;
        }
        text
    }

    /// A CharacterEscape, positioned after the backslash. `combine` joins
    /// escaped surrogate pairs into one code point.
    pub(crate) fn character_escape(&mut self, combine: bool) -> ParseResult<Option<u32>> {
        let start = self.pos;
        let Some(ch) = self.current() else {
            return Ok(None);
        };
        let value = match ch {
            'f' => 0x0C,
            'n' => 0x0A,
            'r' => 0x0D,
            't' => 0x09,
            'v' => 0x0B,
            'c' => match self.peek(1) {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 2;
                    return Ok(Some(letter as u32 % 32));
                }
                _ => return Ok(None),
            },
            '0' if !self.peek(1).is_some_and(|next| next.is_ascii_digit()) => 0,
            'x' => match groups::read_hex(&self.chars, start + 1, 2) {
                Some(value) => {
                    self.pos += 3;
                    return Ok(Some(value));
                }
                None if self.unicode => {
                    return Err(self.error(start - 1, ErrorCode::RegExpInvalidEscape, "Invalid escape"))
                }
                None => 'x' as u32,
            },
            'u' => {
                let unicode = self.unicode;
                match groups::read_unicode_escape(&self.chars, start, unicode) {
                    Some((value, next)) => {
                        self.pos = next;
                        if !unicode && combine {
                            return Ok(Some(self.combine_legacy_pair(value)));
                        }
                        return Ok(Some(value));
                    }
                    None if unicode => {
                        return Err(self.error(
                            start - 1,
                            ErrorCode::RegExpInvalidUnicodeEscape,
                            "Invalid unicode escape",
                        ))
                    }
                    None => 'u' as u32,
                }
            }
            '0'..='7' if !self.unicode => return Ok(Some(self.legacy_octal())),
            _ if self.unicode => {
                if is_syntax_character(ch) || ch == '/' {
                    ch as u32
                } else {
                    return Ok(None);
                }
            }
            'k' if self.named_groups => return Ok(None),
            _ => ch as u32,
        };
        self.pos += 1;
        Ok(Some(value))
    }

    /// Outside Unicode mode `💩` is two code units that match
    /// one astral character; join them for the host.
    fn combine_legacy_pair(&mut self, lead: u32) -> u32 {
        if self.current() == Some('\\') && self.peek(1) == Some('u') {
            if let Some(trail) = groups::read_hex(&self.chars, self.pos + 2, 4) {
                if is_surrogate_pair(lead, trail) {
                    self.pos += 6;
                    return crate::character::from_surrogate_pair(lead, trail);
                }
            }
        }
        lead
    }

    fn legacy_octal(&mut self) -> u32 {
        let mut value = 0u32;
        let first = self.current().and_then(|ch| ch.to_digit(8)).unwrap_or(0);
        let max_digits = if first <= 3 { 3 } else { 2 };
        for _ in 0..max_digits {
            match self.current().and_then(|ch| ch.to_digit(8)) {
                Some(digit) => {
                    value = value * 8 + digit;
                    self.pos += 1;
                }
                None => break,
            }
        }
        value
    }

    fn eat_decimal(&mut self) -> Option<String> {
        let digits = self.eat_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    }

    fn eat_quantifier(&mut self, no_error: bool) -> ParseResult<Option<Quantifier>> {
        let repeat = match self.current() {
            Some('*') => {
                self.pos += 1;
                Repeat::Star
            }
            Some('+') => {
                self.pos += 1;
                Repeat::Plus
            }
            Some('?') => {
                self.pos += 1;
                Repeat::Optional
            }
            Some('{') => match self.eat_braced_quantifier(no_error)? {
                Some(repeat) => repeat,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        let lazy = self.eat('?');
        Ok(Some(Quantifier { repeat, lazy }))
    }

    fn eat_braced_quantifier(&mut self, no_error: bool) -> ParseResult<Option<Repeat>> {
        let start = self.pos;
        if self.eat('{') {
            if let Some(min) = self.eat_decimal() {
                let (max, exact) = if self.eat(',') {
                    (self.eat_decimal(), false)
                } else {
                    (Some(min.clone()), true)
                };
                if self.eat('}') {
                    if let Some(max) = &max {
                        if compare_decimal(&min, max) == Ordering::Greater {
                            return Err(self.error(
                                start,
                                ErrorCode::RegExpRangeOutOfOrder,
                                "numbers out of order in {} quantifier",
                            ));
                        }
                    }
                    return Ok(Some(Repeat::Braced { min, max, exact }));
                }
            }
            if self.unicode && !no_error {
                return Err(self.error(
                    start,
                    ErrorCode::RegExpIncompleteQuantifier,
                    "Incomplete quantifier",
                ));
            }
            self.pos = start;
        }
        Ok(None)
    }

    fn apply_quantifier(&mut self, out_start: usize, kind: AtomKind, quantifier: Quantifier, at: usize) {
        if let AtomKind::Char(cp) = kind {
            if cp > 0xFFFF && !self.unicode {
                self.inconvertible(
                    at,
                    ErrorCode::RegExpInconvertibleSurrogate,
                    "A quantified astral character needs the u flag",
                );
            }
        }
        if !matches!(kind, AtomKind::Group) {
            self.out.insert_str(out_start, "(?:");
            self.out.push(')');
        }
        match quantifier.repeat {
            Repeat::Star => self.out.push('*'),
            Repeat::Plus => self.out.push('+'),
            Repeat::Optional => self.out.push('?'),
            Repeat::Braced { min, max, exact } => {
                let Some(min) = self.host_bound(&min, at) else {
                    return;
                };
                let text = match (max, exact) {
                    (_, true) => format!("{{{}}}", min),
                    (None, false) => format!("{{{},}}", min),
                    (Some(max), false) => match self.host_bound(&max, at) {
                        Some(max) => format!("{{{},{}}}", min, max),
                        None => return,
                    },
                };
                self.out.push_str(&text);
            }
        }
        if quantifier.lazy {
            self.out.push('?');
        }
    }

    /// Annex B lets a lookahead be quantified, which the host rejects.
    /// A lookahead that may run zero times never constrains the match and
    /// leaves its groups unset; one that must run is equivalent to a
    /// single run.
    fn quantify_lookahead(&mut self, out_start: usize, quantifier: Quantifier, captures: bool) {
        let optional = match quantifier.repeat {
            Repeat::Star | Repeat::Optional => true,
            Repeat::Plus => false,
            Repeat::Braced { min, .. } => compare_decimal(&min, "0") == Ordering::Equal,
        };
        if !optional {
            return;
        }
        if captures {
            // Keep the groups so later group numbers do not shift
            self.out.insert_str(out_start, "(?:(?!)");
            self.out.push_str("|)");
        } else {
            self.out.truncate(out_start);
        }
    }

    fn host_bound(&mut self, digits: &str, at: usize) -> Option<u32> {
        match digits.parse::<u32>() {
            Ok(value) if value <= i32::MAX as u32 => Some(value),
            _ => {
                self.inconvertible(
                    at,
                    ErrorCode::RegExpInconvertibleQuantifier,
                    "Quantifier bound is too large",
                );
                None
            }
        }
    }

    fn emit_dot(&mut self) {
        if self.dot_all {
            self.out.push_str("(?s:.)");
        } else {
            self.out.push_str(&format!("[^{}]", LINE_TERMINATORS));
        }
    }

    fn emit_char(&mut self, cp: u32, at: usize) {
        if (0xD800..=0xDFFF).contains(&cp) {
            self.inconvertible(
                at,
                ErrorCode::RegExpInconvertibleSurrogate,
                "Lone surrogates cannot be matched by the host engine",
            );
            return;
        }
        let variants: &[u32] = if self.legacy_ignore_case() {
            legacy_case_variants(cp)
        } else {
            &[]
        };
        if variants.is_empty() {
            push_host_char(&mut self.out, cp);
        } else {
            let mut set = CharSet::default();
            for &variant in variants {
                set.add(variant);
            }
            set.emit(false, &mut self.out);
        }
    }

    fn emit_backreference(&mut self, indices: &[usize], at: usize) {
        let closed: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| self.closed.get(index).copied().unwrap_or(false))
            .collect();
        if closed.is_empty() {
            self.inconvertible(
                at,
                ErrorCode::RegExpInconvertibleBackreference,
                "Backreferences to groups that are not yet closed cannot be converted",
            );
            return;
        }
        if self.ignore_case {
            self.inconvertible(
                at,
                ErrorCode::RegExpInconvertibleBackreference,
                "Backreferences cannot be converted with the i flag",
            );
            return;
        }
        // A group that did not participate matches the empty string.
        let host = closed.iter().rev().fold(String::new(), |rest, index| {
            if rest.is_empty() {
                format!("(?({0})\\{0})", index)
            } else {
                format!("(?({0})\\{0}|{1})", index, rest)
            }
        });
        self.out.push_str(&host);
    }
}

fn is_syntax_character(ch: char) -> bool {
    matches!(
        ch,
        '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
    )
}

/// Compare two decimal digit strings by numeric value
fn compare_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Validate a pattern, returning the first syntax error
pub fn validate_regexp(pattern: &str, flags: &str, ecma_version: EcmaVersion) -> ParseResult<()> {
    let options = RegExpOptions {
        ecma_version,
        ..RegExpOptions::default()
    };
    RegExpParser::new(pattern, flags, options).parse().map(|_| ())
}

/// Validate and adapt a pattern for the host engine
pub fn adapt_regexp(pattern: &str, flags: &str, options: RegExpOptions) -> ParseResult<RegExpParseResult> {
    let options = if options.mode.adapts() {
        options
    } else {
        RegExpOptions {
            mode: RegExpParseMode::AdaptToInterpreted,
            ..options
        }
    };
    RegExpParser::new(pattern, flags, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapt(pattern: &str, flags: &str) -> RegExpParseResult {
        adapt_regexp(pattern, flags, RegExpOptions::default()).unwrap()
    }

    fn adapted(pattern: &str, flags: &str) -> AdaptedRegExp {
        match adapt(pattern, flags) {
            RegExpParseResult::Adapted(adapted) => adapted,
            other => panic!("expected adapted regex for /{}/{}, got {:?}", pattern, flags, other),
        }
    }

    fn error_code(pattern: &str, flags: &str) -> ErrorCode {
        validate_regexp(pattern, flags, EcmaVersion::LATEST)
            .unwrap_err()
            .code
    }

    #[test]
    fn test_validate_only_returns_validated() {
        let result = RegExpParser::new("a+b", "g", RegExpOptions::default())
            .parse()
            .unwrap();
        assert_eq!(result, RegExpParseResult::Validated);
    }

    #[test]
    fn test_flags() {
        assert_eq!(error_code("a", "gg"), ErrorCode::RegExpDuplicateFlag);
        assert_eq!(error_code("a", "x"), ErrorCode::RegExpInvalidFlags);
        assert!(validate_regexp("a", "dgimsuy", EcmaVersion::LATEST).is_ok());
        assert!(validate_regexp("a", "s", EcmaVersion::ES2015).is_err());
        assert!(validate_regexp("a", "v", EcmaVersion::Experimental).is_ok());
        assert!(validate_regexp("a", "uv", EcmaVersion::Experimental).is_err());
    }

    #[test]
    fn test_empty_classes() {
        let never = adapted("[]", "");
        assert!(!never.regex.is_match("a").unwrap());
        let any = adapted("[^]", "");
        assert!(any.regex.is_match("\n").unwrap());
    }

    #[test]
    fn test_quantifier_errors() {
        assert_eq!(error_code("a{2,1}", ""), ErrorCode::RegExpRangeOutOfOrder);
        assert_eq!(error_code("*", ""), ErrorCode::RegExpNothingToRepeat);
        assert_eq!(error_code("a**", ""), ErrorCode::RegExpNothingToRepeat);
        assert_eq!(error_code("{1}", ""), ErrorCode::RegExpNothingToRepeat);
        assert_eq!(error_code("a{", "u"), ErrorCode::RegExpIncompleteQuantifier);
        assert_eq!(error_code("}", "u"), ErrorCode::RegExpLoneQuantifierBrackets);
        assert!(validate_regexp("a{", "", EcmaVersion::LATEST).is_ok());
        assert!(validate_regexp("}]", "", EcmaVersion::LATEST).is_ok());
    }

    #[test]
    fn test_group_errors() {
        assert_eq!(error_code("(a", ""), ErrorCode::RegExpUnterminatedGroup);
        assert_eq!(error_code("a)", ""), ErrorCode::RegExpUnmatchedParen);
        assert_eq!(error_code("(?a)", ""), ErrorCode::RegExpInvalidGroup);
        assert_eq!(error_code("[a", ""), ErrorCode::RegExpUnterminatedCharacterClass);
        assert_eq!(error_code("(?<1a>x)", ""), ErrorCode::RegExpInvalidCaptureGroupName);
        assert_eq!(error_code("\\k<b>(?<a>x)", ""), ErrorCode::RegExpInvalidNamedCaptureReferenced);
    }

    #[test]
    fn test_duplicate_group_names() {
        assert_eq!(
            error_code("(?<a>x)(?<a>y)", ""),
            ErrorCode::RegExpDuplicateCaptureGroupName
        );
        assert_eq!(
            error_code("(?<a>x)|(?<a>y)", ""),
            ErrorCode::RegExpDuplicateCaptureGroupName
        );
        assert!(validate_regexp("(?<a>x)|(?<a>y)", "", EcmaVersion::Experimental).is_ok());
        assert!(validate_regexp("(?:(?<a>x)|(?<a>y))\\k<a>", "", EcmaVersion::Experimental).is_ok());
        assert!(validate_regexp("(?:(?<a>x)|(?<a>y))(?<a>z)", "", EcmaVersion::Experimental).is_err());
    }

    #[test]
    fn test_class_errors() {
        assert_eq!(error_code("[z-a]", ""), ErrorCode::RegExpClassRangeOutOfOrder);
        assert_eq!(error_code("[\\d-z]", "u"), ErrorCode::RegExpInvalidCharacterClass);
        assert!(validate_regexp("[\\d-z]", "", EcmaVersion::LATEST).is_ok());
    }

    #[test]
    fn test_unicode_mode_escapes() {
        assert_eq!(error_code("\\a", "u"), ErrorCode::RegExpInvalidEscape);
        assert_eq!(error_code("\\u{110000}", "u"), ErrorCode::RegExpInvalidUnicodeEscape);
        assert_eq!(error_code("\\1", "u"), ErrorCode::RegExpInvalidDecimalEscape);
        assert_eq!(error_code("\\p{Foo}", "u"), ErrorCode::RegExpInvalidPropertyName);
        assert!(validate_regexp("\\a\\1\\p", "", EcmaVersion::LATEST).is_ok());
    }

    #[test]
    fn test_unicode_sets() {
        let version = EcmaVersion::Experimental;
        assert!(validate_regexp("[\\p{L}--[a-z]]", "v", version).is_ok());
        assert!(validate_regexp("[[a-z]&&[aeiou]]", "v", version).is_ok());
        assert!(validate_regexp("[\\q{abc|d}]", "v", version).is_ok());
        assert_eq!(
            validate_regexp("[^\\q{abc}]", "v", version).unwrap_err().code,
            ErrorCode::RegExpNegatedClassContainsStrings
        );
        assert_eq!(
            validate_regexp("[a&&&b]", "v", version).unwrap_err().code,
            ErrorCode::RegExpInvalidClassSetOperation
        );
        let options = RegExpOptions {
            ecma_version: version,
            mode: RegExpParseMode::AdaptToInterpreted,
            ..RegExpOptions::default()
        };
        let result = RegExpParser::new("[a]", "v", options).parse().unwrap();
        assert!(matches!(
            result,
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleUnicodeSets
        ));
    }

    #[test]
    fn test_dot_matches_astral_code_point() {
        let regex = adapted("^.$", "u").regex;
        assert!(regex.is_match("\u{1F4A9}").unwrap());
        assert!(!regex.is_match("\n").unwrap());
        let dot_all = adapted("^.$", "s").regex;
        assert!(dot_all.is_match("\n").unwrap());
    }

    #[test]
    fn test_multiline_anchors() {
        let regex = adapted("^b$", "m").regex;
        assert!(regex.is_match("a\nb\nc").unwrap());
        assert!(!adapted("^b$", "").regex.is_match("a\nb\nc").unwrap());
    }

    #[test]
    fn test_js_character_sets() {
        let word = adapted("^\\w+$", "").regex;
        assert!(word.is_match("abc_123").unwrap());
        assert!(!word.is_match("\u{e9}").unwrap());
        let digits = adapted("^\\d$", "").regex;
        assert!(!digits.is_match("\u{0663}").unwrap());
        let space = adapted("^\\s$", "").regex;
        assert!(space.is_match("\u{feff}").unwrap());
        let boundary = adapted("\\bfoo\\b", "").regex;
        assert!(boundary.is_match("a foo b").unwrap());
        assert!(!boundary.is_match("afoo").unwrap());
    }

    #[test]
    fn test_named_groups_become_numbered() {
        let adapted = adapted("(?<year>\\d{4})-(?<month>\\d{2})", "");
        assert_eq!(adapted.group_index("month"), Some(2));
        let captures = adapted.regex.captures("2024-05").unwrap().unwrap();
        assert_eq!(captures.get(2).map(|m| m.as_str()), Some("05"));
    }

    #[test]
    fn test_backreferences() {
        let regex = adapted("(a)\\1", "").regex;
        assert!(regex.is_match("aa").unwrap());
        let named = adapted("(?<q>['\"]).*?\\k<q>", "").regex;
        assert!(named.is_match("'x'").unwrap());
        assert!(matches!(
            adapt("\\1(a)", ""),
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleBackreference
        ));
    }

    #[test]
    fn test_backreference_to_unset_group_matches_empty() {
        let optional = adapted("(a)?\\1b", "").regex;
        assert!(optional.is_match("b").unwrap());
        assert!(optional.is_match("aab").unwrap());
        let alternative = adapted("(?:(a)|b)\\1c", "").regex;
        assert!(alternative.is_match("bc").unwrap());
        assert!(alternative.is_match("aac").unwrap());
        assert!(!alternative.is_match("ac").unwrap());
    }

    #[test]
    fn test_duplicate_named_backreference() {
        let options = RegExpOptions {
            ecma_version: EcmaVersion::Experimental,
            mode: RegExpParseMode::AdaptToInterpreted,
            ..RegExpOptions::default()
        };
        let result = RegExpParser::new("^(?:(?<a>x)|(?<a>y))\\k<a>z$", "", options)
            .parse()
            .unwrap();
        let regex = &result.adapted().unwrap().regex;
        assert!(regex.is_match("xxz").unwrap());
        assert!(regex.is_match("yyz").unwrap());
        assert!(!regex.is_match("xz").unwrap());
        assert!(!regex.is_match("xyz").unwrap());
    }

    #[test]
    fn test_case_insensitive() {
        assert!(adapted("abc", "i").regex.is_match("ABC").unwrap());
        assert!(adapted("^[a-z]+$", "i").regex.is_match("ABC").unwrap());
        assert!(adapted("^\u{3c3}$", "i").regex.is_match("\u{3a3}").unwrap());
        assert!(adapted("^\u{3c3}$", "i").regex.is_match("\u{3c2}").unwrap());
    }

    #[test]
    fn test_case_insensitive_without_u_keeps_ascii_apart() {
        assert!(!adapted("^k$", "i").regex.is_match("\u{212a}").unwrap());
        assert!(!adapted("^s$", "i").regex.is_match("\u{17f}").unwrap());
        assert!(!adapted("\\w", "i").regex.is_match("\u{17f}\u{212a}").unwrap());
        assert!(!adapted("[a-z]", "i").regex.is_match("\u{17f}").unwrap());
        assert!(adapted("^[^a-z]$", "i").regex.is_match("\u{212a}").unwrap());
        assert!(!adapted("^\u{df}$", "i").regex.is_match("\u{1e9e}").unwrap());

        assert!(adapted("^k$", "iu").regex.is_match("\u{212a}").unwrap());
        assert!(adapted("^\\w$", "iu").regex.is_match("\u{17f}").unwrap());
    }

    #[test]
    fn test_case_insensitive_backreference_is_inconvertible() {
        assert!(matches!(
            adapt("(a)\\1", "i"),
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleBackreference
        ));
    }

    #[test]
    fn test_conversion_failures() {
        assert!(matches!(
            adapt("\\p{Script=Greek}", "u"),
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleProperty
        ));
        assert!(matches!(
            adapt("\\uD800", ""),
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleSurrogate
        ));
        assert!(matches!(
            adapt("a{2147483648}", ""),
            RegExpParseResult::ConversionFailed(ref error)
                if error.code == ErrorCode::RegExpInconvertibleQuantifier
        ));
    }

    #[test]
    fn test_general_category_is_adapted() {
        let regex = adapted("^\\p{Lu}+$", "u").regex;
        assert!(regex.is_match("ABC").unwrap());
        assert!(!regex.is_match("abc").unwrap());
    }

    #[test]
    fn test_escaped_surrogate_pair() {
        let regex = adapted("^\\uD83D\\uDCA9$", "").regex;
        assert!(regex.is_match("\u{1F4A9}").unwrap());
        let regex = adapted("^[\\u{1F4A9}]$", "u").regex;
        assert!(regex.is_match("\u{1F4A9}").unwrap());
    }

    #[test]
    fn test_error_positions_are_offset_by_base() {
        let options = RegExpOptions {
            base: SourcePosition::new(3, 5, 40),
            ..RegExpOptions::default()
        };
        let error = RegExpParser::new("ab)", "", options).parse().unwrap_err();
        assert_eq!(error.position.offset, 42);
        assert_eq!(error.position.column, 7);
        assert_eq!(error.position.line, 3);
    }

    #[test]
    fn test_legacy_annex_b_forms() {
        let octal = adapted("^\\101$", "").regex;
        assert!(octal.is_match("A").unwrap());
        let control = adapted("^\\c$", "").regex;
        assert!(control.is_match("\\c").unwrap());
        let lookahead = validate_regexp("(?=a)*", "", EcmaVersion::LATEST);
        assert!(lookahead.is_ok());
        assert_eq!(error_code("(?=a)*", "u"), ErrorCode::RegExpNothingToRepeat);
    }

    #[test]
    fn test_quantified_lookahead() {
        let optional = adapted("(?=a)*b", "").regex;
        assert!(optional.is_match("b").unwrap());
        let required = adapted("^(?=a)+\\w", "").regex;
        assert!(required.is_match("ab").unwrap());
        assert!(!required.is_match("b").unwrap());
        let bounded = adapted("^(?=a){0}b", "").regex;
        assert!(bounded.is_match("b").unwrap());

        let capturing = adapted("^(?=(a))?(b)$", "");
        let captures = capturing.regex.captures("b").unwrap().unwrap();
        assert!(captures.get(1).is_none());
        assert_eq!(captures.get(2).map(|m| m.as_str()), Some("b"));
    }
}
