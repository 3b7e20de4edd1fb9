//! Character classes: the code-point set accumulator used to rewrite them
//! for the host engine, and the class grammars of both flag modes

use super::unicode::{
    legacy_case_groups, JS_DIGITS, JS_WHITESPACE, JS_WORD, JS_WORD_UNICODE_IGNORE_CASE,
};
use super::RegExpParser;
use crate::character::{is_lead_surrogate, is_trail_surrogate};
use crate::error::ParseResult;
use core_types::ErrorCode;
use std::cmp::Ordering;

const MAX_CODE_POINT: u32 = 0x10FFFF;
const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// A set of code points plus host-native property escapes
#[derive(Debug, Clone, Default)]
pub(crate) struct CharSet {
    ranges: Vec<(u32, u32)>,
    properties: Vec<String>,
    strings: bool,
}

impl CharSet {
    pub(crate) fn from_ranges(ranges: &[(u32, u32)]) -> Self {
        Self {
            ranges: ranges.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn add(&mut self, cp: u32) {
        self.ranges.push((cp, cp));
    }

    pub(crate) fn add_range(&mut self, lo: u32, hi: u32) {
        self.ranges.push((lo, hi));
    }

    pub(crate) fn add_property(&mut self, escape: String) {
        self.properties.push(escape);
    }

    pub(crate) fn extend(&mut self, other: CharSet) {
        self.ranges.extend(other.ranges);
        self.properties.extend(other.properties);
        self.strings |= other.strings;
    }

    /// Sorted, merged ranges with the surrogate block removed
    fn normalized(&self) -> Vec<(u32, u32)> {
        let mut sorted = self.ranges.clone();
        sorted.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(sorted.len());
        for (lo, hi) in sorted {
            match merged.last_mut() {
                Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        let mut result = Vec::with_capacity(merged.len());
        for (lo, hi) in merged {
            if hi < SURROGATES.0 || lo > SURROGATES.1 {
                result.push((lo, hi));
                continue;
            }
            if lo < SURROGATES.0 {
                result.push((lo, SURROGATES.0 - 1));
            }
            if hi > SURROGATES.1 {
                result.push((SURROGATES.1 + 1, hi));
            }
        }
        result
    }

    /// Add every code unit that equals a member under ignore-case
    /// matching without `u`
    pub(crate) fn close_over_legacy_case(&mut self) {
        let ranges = self.normalized();
        let contains = |cp: u32| {
            ranges
                .binary_search_by(|&(lo, hi)| {
                    if hi < cp {
                        Ordering::Less
                    } else if lo > cp {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    }
                })
                .is_ok()
        };
        for group in legacy_case_groups() {
            if group.iter().any(|&cp| contains(cp)) {
                for &cp in group {
                    self.add(cp);
                }
            }
        }
    }

    /// Write the set in host syntax
    pub(crate) fn emit(&self, negated: bool, out: &mut String) {
        let ranges = self.normalized();
        if ranges.is_empty() && self.properties.is_empty() {
            out.push_str(if negated { "(?s:.)" } else { "(?!)" });
            return;
        }
        out.push('[');
        if negated {
            out.push('^');
        }
        for (lo, hi) in ranges {
            push_host_char(out, lo);
            if hi > lo {
                out.push('-');
                push_host_char(out, hi);
            }
        }
        for property in &self.properties {
            out.push_str(property);
        }
        out.push(']');
    }
}

/// Every scalar value not covered by `ranges` (which must be sorted)
fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut result = Vec::new();
    let mut next = 0u32;
    for &(lo, hi) in ranges {
        if lo > next {
            result.push((next, lo - 1));
        }
        next = hi + 1;
    }
    if next <= MAX_CODE_POINT {
        result.push((next, MAX_CODE_POINT));
    }
    result
}

/// Append one code point as a host literal
pub(crate) fn push_host_char(out: &mut String, cp: u32) {
    match char::from_u32(cp) {
        Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => out.push(ch),
        _ => out.push_str(&format!("\\x{{{:X}}}", cp)),
    }
}

/// One element of a non-`v` class
pub(crate) enum ClassAtom {
    Char(u32),
    Set(CharSet),
}

fn is_class_set_syntax_character(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '[' | ']' | '{' | '}' | '/' | '-' | '\\' | '|'
    )
}

fn is_class_set_reserved_double_punctuator(ch: char) -> bool {
    matches!(
        ch,
        '&' | '!' | '#' | '$' | '%' | '*' | '+' | ',' | '.' | ':' | ';' | '<' | '=' | '>' | '?'
            | '@' | '^' | '`' | '~'
    )
}

fn is_class_set_reserved_punctuator(ch: char) -> bool {
    matches!(
        ch,
        '&' | '-' | '!' | '#' | '%' | ',' | ':' | ';' | '<' | '=' | '>' | '@' | '`' | '~'
    )
}

impl<'a> RegExpParser<'a> {
    /// The set denoted by `\d`, `\s`, `\w` and their negations
    pub(crate) fn builtin_class(&self, letter: char) -> CharSet {
        let ranges: &[(u32, u32)] = match letter.to_ascii_lowercase() {
            'd' => JS_DIGITS,
            's' => JS_WHITESPACE,
            _ if self.unicode && self.ignore_case => JS_WORD_UNICODE_IGNORE_CASE,
            _ => JS_WORD,
        };
        if letter.is_ascii_uppercase() {
            CharSet::from_ranges(&complement(ranges))
        } else {
            CharSet::from_ranges(ranges)
        }
    }

    /// `[ ... ]`, positioned on the opening bracket
    pub(crate) fn character_class(&mut self) -> ParseResult<()> {
        let start = self.pos;
        self.pos += 1;
        if self.unicode_sets {
            self.class_set_class(start)?;
            return Ok(());
        }
        let negated = self.eat('^');
        let mut set = CharSet::default();
        loop {
            let atom_start = self.pos;
            let Some(left) = self.class_atom()? else {
                break;
            };
            if !self.eat('-') {
                self.add_class_atom(&mut set, left, atom_start);
                continue;
            }
            let right_start = self.pos;
            match self.class_atom()? {
                Some(right) => match (left, right) {
                    (ClassAtom::Char(lo), ClassAtom::Char(hi)) => {
                        if lo > hi {
                            return Err(self.error(
                                atom_start,
                                ErrorCode::RegExpClassRangeOutOfOrder,
                                "Range out of order in character class",
                            ));
                        }
                        set.add_range(lo, hi);
                    }
                    (left, right) => {
                        if self.unicode {
                            return Err(self.error(
                                atom_start,
                                ErrorCode::RegExpInvalidCharacterClass,
                                "Invalid character class",
                            ));
                        }
                        self.add_class_atom(&mut set, left, atom_start);
                        set.add('-' as u32);
                        self.add_class_atom(&mut set, right, right_start);
                    }
                },
                None => {
                    self.add_class_atom(&mut set, left, atom_start);
                    set.add('-' as u32);
                }
            }
        }
        if !self.eat(']') {
            return Err(self.error(
                start,
                ErrorCode::RegExpUnterminatedCharacterClass,
                "Unterminated character class",
            ));
        }
        if self.legacy_ignore_case() {
            set.close_over_legacy_case();
        }
        set.emit(negated, &mut self.out);
        Ok(())
    }

    fn add_class_atom(&mut self, set: &mut CharSet, atom: ClassAtom, at: usize) {
        match atom {
            ClassAtom::Char(cp) => {
                if (SURROGATES.0..=SURROGATES.1).contains(&cp) {
                    self.inconvertible(
                        at,
                        ErrorCode::RegExpInconvertibleSurrogate,
                        "Lone surrogates cannot be matched by the host engine",
                    );
                } else if cp > 0xFFFF && !self.unicode {
                    self.inconvertible(
                        at,
                        ErrorCode::RegExpInconvertibleSurrogate,
                        "Astral characters in a class need the u flag",
                    );
                }
                set.add(cp);
            }
            ClassAtom::Set(inner) => set.extend(inner),
        }
    }

    fn class_atom(&mut self) -> ParseResult<Option<ClassAtom>> {
        let start = self.pos;
        match self.current() {
            None | Some(']') => Ok(None),
            Some('\\') => {
                self.pos += 1;
                if let Some(atom) = self.class_escape()? {
                    return Ok(Some(atom));
                }
                if self.unicode {
                    let invalid_class_escape = self
                        .current()
                        .is_some_and(|ch| ch == 'c' || ch.is_ascii_digit());
                    let message = if invalid_class_escape {
                        "Invalid class escape"
                    } else {
                        "Invalid escape"
                    };
                    return Err(self.error(start, ErrorCode::RegExpInvalidEscape, message));
                }
                // Backslash that starts no escape
                self.pos = start + 1;
                Ok(Some(ClassAtom::Char('\\' as u32)))
            }
            Some(ch) => {
                self.pos += 1;
                Ok(Some(ClassAtom::Char(ch as u32)))
            }
        }
    }

    fn class_escape(&mut self) -> ParseResult<Option<ClassAtom>> {
        let start = self.pos;
        match self.current() {
            None => {
                return Err(self.error(
                    start,
                    ErrorCode::RegExpInvalidEscape,
                    "\\ at end of pattern",
                ))
            }
            Some('b') => {
                self.pos += 1;
                return Ok(Some(ClassAtom::Char(0x08)));
            }
            Some('-') if self.unicode => {
                self.pos += 1;
                return Ok(Some(ClassAtom::Char('-' as u32)));
            }
            Some('c') if !self.unicode => {
                if let Some(&next) = self.chars.get(self.pos + 1) {
                    if next.is_ascii_digit() || next == '_' {
                        self.pos += 2;
                        return Ok(Some(ClassAtom::Char(next as u32 % 32)));
                    }
                }
            }
            Some(ch) if ch.is_ascii_digit() && ch != '0' && self.unicode => return Ok(None),
            _ => {}
        }
        if let Some(set) = self.character_class_escape()? {
            return Ok(Some(ClassAtom::Set(set)));
        }
        Ok(self
            .character_escape(self.unicode)?
            .map(ClassAtom::Char))
    }

    /// `[ ... ]` in `v` mode, positioned after the opening bracket.
    /// Returns whether the class may match strings.
    fn class_set_class(&mut self, start: usize) -> ParseResult<bool> {
        let negated = self.eat('^');
        let strings = self.class_set_expression()?;
        if !self.eat(']') {
            return Err(match self.current() {
                None => self.error(
                    start,
                    ErrorCode::RegExpUnterminatedCharacterClass,
                    "Unterminated character class",
                ),
                Some(_) => self.error(
                    self.pos,
                    ErrorCode::RegExpInvalidClassSetCharacter,
                    "Invalid character in character class",
                ),
            });
        }
        if negated && strings {
            return Err(self.error(
                start,
                ErrorCode::RegExpNegatedClassContainsStrings,
                "Negated character class may contain strings",
            ));
        }
        Ok(strings)
    }

    fn class_set_expression(&mut self) -> ParseResult<bool> {
        let mut strings = false;
        if self.class_set_range()? {
            // union continues below
        } else if let Some(operand) = self.class_set_operand()? {
            strings = operand;
            let start = self.pos;
            while self.eat_pair('&', '&') {
                if self.current() != Some('&') {
                    if let Some(operand) = self.class_set_operand()? {
                        strings = strings && operand;
                        continue;
                    }
                }
                return Err(self.invalid_set_operation());
            }
            if start != self.pos {
                return Ok(strings);
            }
            while self.eat_pair('-', '-') {
                if self.class_set_operand()?.is_some() {
                    continue;
                }
                return Err(self.invalid_set_operation());
            }
            if start != self.pos {
                return Ok(strings);
            }
        } else {
            return Ok(false);
        }
        loop {
            if self.class_set_range()? {
                continue;
            }
            match self.class_set_operand()? {
                Some(operand) => strings |= operand,
                None => return Ok(strings),
            }
        }
    }

    fn invalid_set_operation(&self) -> core_types::ParseError {
        self.error(
            self.pos,
            ErrorCode::RegExpInvalidClassSetOperation,
            "Invalid set operation in character class",
        )
    }

    fn eat_pair(&mut self, first: char, second: char) -> bool {
        if self.current() == Some(first) && self.peek(1) == Some(second) {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn class_set_range(&mut self) -> ParseResult<bool> {
        let start = self.pos;
        if let Some(lo) = self.class_set_character()? {
            if self.eat('-') {
                if let Some(hi) = self.class_set_character()? {
                    if lo > hi {
                        return Err(self.error(
                            start,
                            ErrorCode::RegExpClassRangeOutOfOrder,
                            "Range out of order in character class",
                        ));
                    }
                    return Ok(true);
                }
            }
        }
        self.pos = start;
        Ok(false)
    }

    /// Returns `Some(may_contain_strings)` when an operand was read
    fn class_set_operand(&mut self) -> ParseResult<Option<bool>> {
        if self.class_set_character()?.is_some() {
            return Ok(Some(false));
        }
        if let Some(strings) = self.class_string_disjunction()? {
            return Ok(Some(strings));
        }
        self.nested_class()
    }

    fn nested_class(&mut self) -> ParseResult<Option<bool>> {
        let start = self.pos;
        if self.eat('[') {
            return self.class_set_class(start).map(Some);
        }
        if self.eat('\\') {
            if let Some(set) = self.character_class_escape()? {
                return Ok(Some(set.may_contain_strings()));
            }
            self.pos = start;
        }
        Ok(None)
    }

    fn class_string_disjunction(&mut self) -> ParseResult<Option<bool>> {
        let start = self.pos;
        if !self.eat_pair('\\', 'q') {
            return Ok(None);
        }
        if !self.eat('{') {
            return Err(self.error(start, ErrorCode::RegExpInvalidEscape, "Invalid escape"));
        }
        let mut strings = self.class_string()?;
        while self.eat('|') {
            strings |= self.class_string()?;
        }
        if !self.eat('}') {
            return Err(self.error(
                self.pos,
                ErrorCode::RegExpInvalidClassSetCharacter,
                "Invalid character in class string disjunction",
            ));
        }
        Ok(Some(strings))
    }

    fn class_string(&mut self) -> ParseResult<bool> {
        let mut count = 0;
        while self.class_set_character()?.is_some() {
            count += 1;
        }
        Ok(count != 1)
    }

    fn class_set_character(&mut self) -> ParseResult<Option<u32>> {
        let start = self.pos;
        let Some(ch) = self.current() else {
            return Ok(None);
        };
        if ch == '\\' {
            self.pos += 1;
            if let Some(cp) = self.character_escape(true)? {
                return Ok(Some(cp));
            }
            if let Some(next) = self.current() {
                if is_class_set_reserved_punctuator(next) {
                    self.pos += 1;
                    return Ok(Some(next as u32));
                }
                if next == 'b' {
                    self.pos += 1;
                    return Ok(Some(0x08));
                }
            }
            self.pos = start;
            return Ok(None);
        }
        if is_class_set_reserved_double_punctuator(ch) && self.peek(1) == Some(ch) {
            return Ok(None);
        }
        if is_class_set_syntax_character(ch) {
            return Ok(None);
        }
        self.pos += 1;
        Ok(Some(ch as u32))
    }
}

impl CharSet {
    /// The set of a property of strings
    pub(crate) fn strings() -> Self {
        Self {
            strings: true,
            ..Self::default()
        }
    }

    pub(crate) fn may_contain_strings(&self) -> bool {
        self.strings
    }
}

/// Whether `lead` and `trail` form a surrogate pair
pub(crate) fn is_surrogate_pair(lead: u32, trail: u32) -> bool {
    is_lead_surrogate(lead) && is_trail_surrogate(trail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(set: &CharSet, negated: bool) -> String {
        let mut out = String::new();
        set.emit(negated, &mut out);
        out
    }

    #[test]
    fn test_empty_sets() {
        let set = CharSet::default();
        assert_eq!(emitted(&set, false), "(?!)");
        assert_eq!(emitted(&set, true), "(?s:.)");
    }

    #[test]
    fn test_ranges_are_merged() {
        let mut set = CharSet::default();
        set.add_range('a' as u32, 'f' as u32);
        set.add_range('d' as u32, 'z' as u32);
        set.add('0' as u32);
        assert_eq!(emitted(&set, false), "[0a-z]");
    }

    #[test]
    fn test_surrogates_removed() {
        let mut set = CharSet::default();
        set.add_range(0xD000, 0xE000);
        assert_eq!(emitted(&set, false), "[\\x{D000}-\\x{D7FF}\\x{E000}]");
    }

    #[test]
    fn test_complement() {
        let ranges = complement(&[(0x30, 0x39)]);
        assert_eq!(ranges, vec![(0, 0x2F), (0x3A, MAX_CODE_POINT)]);
        assert_eq!(complement(&[(0, MAX_CODE_POINT)]), vec![]);
    }

    #[test]
    fn test_surrogate_pair() {
        assert!(is_surrogate_pair(0xD83D, 0xDCA9));
        assert!(!is_surrogate_pair(0xDCA9, 0xD83D));
    }
}
