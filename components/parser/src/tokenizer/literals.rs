//! Literal scanning: identifiers, numbers, strings, templates and regular
//! expression literals

use super::Tokenizer;
use crate::character::{
    from_surrogate_pair, is_identifier_char, is_identifier_start, is_lead_surrogate,
    is_new_line, is_trail_surrogate,
};
use crate::error::ParseResult;
use crate::options::{EcmaVersion, RegExpParseMode};
use crate::regexp::{RegExpOptions, RegExpParseResult, RegExpParser};
use crate::token::{is_keyword, RegExpValue, TokenType, TokenValue};
use core_types::{ErrorCode, ParseError};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use tracing::debug;

/// Accumulates cooked string values.
///
/// Escaped surrogate pairs are combined; unpaired surrogates become U+FFFD.
#[derive(Default)]
pub(crate) struct CookedBuilder {
    out: String,
    pending_lead: Option<u32>,
}

impl CookedBuilder {
    pub(crate) fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush();
        self.out.push_str(text);
    }

    pub(crate) fn push_code_point(&mut self, cp: u32) {
        if is_lead_surrogate(cp) {
            self.flush();
            self.pending_lead = Some(cp);
            return;
        }
        if is_trail_surrogate(cp) {
            let ch = match self.pending_lead.take() {
                Some(lead) => char::from_u32(from_surrogate_pair(lead, cp)),
                None => None,
            };
            self.out.push(ch.unwrap_or(char::REPLACEMENT_CHARACTER));
            return;
        }
        self.flush();
        self.out
            .push(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    fn flush(&mut self) {
        if self.pending_lead.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    pub(crate) fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

impl<'a> Tokenizer<'a> {
    /// Read an identifier or keyword
    pub(crate) fn read_word(&mut self) -> ParseResult<()> {
        let word = self.read_word1()?;
        let module = self.in_module();
        let ty = if is_keyword(&word, self.options.ecma_version, module) {
            TokenType::from_keyword(&word).unwrap_or(TokenType::Name)
        } else {
            TokenType::Name
        };
        let value = match ty.keyword() {
            Some(keyword) => TokenValue::Punct(keyword),
            None => TokenValue::Str(word),
        };
        self.finish_token(ty, value)
    }

    /// Read an identifier name, decoding `\u` escapes
    pub(crate) fn read_word1(&mut self) -> ParseResult<String> {
        self.contains_esc = false;
        let mut word = String::new();
        let mut first = true;
        let mut chunk_start = self.pos;
        while self.pos < self.input.len() {
            let ch = self.full_char_code_at_pos();
            if is_identifier_char(ch) {
                self.pos += char::from_u32(ch).map_or(1, char::len_utf8);
            } else if ch == u32::from(b'\\') {
                self.contains_esc = true;
                word.push_str(&self.input[chunk_start..self.pos]);
                let esc_start = self.pos;
                self.pos += 1;
                if self.byte_at(self.pos) != b'u' {
                    return Err(self.raise(
                        self.pos,
                        ErrorCode::InvalidUnicodeEscape,
                        "Expecting Unicode escape sequence \\uXXXX",
                    ));
                }
                self.pos += 1;
                let esc = self.read_code_point()?;
                let valid = if first {
                    is_identifier_start(esc)
                } else {
                    is_identifier_char(esc)
                };
                match char::from_u32(esc) {
                    Some(ch) if valid => word.push(ch),
                    _ => {
                        return Err(self.raise(
                            esc_start,
                            ErrorCode::InvalidIdentifierEscape,
                            "Invalid Unicode escape",
                        ))
                    }
                }
                chunk_start = self.pos;
            } else {
                break;
            }
            first = false;
        }
        word.push_str(&self.input[chunk_start..self.pos]);
        Ok(word)
    }

    /// Read digits in `radix`.
    ///
    /// With `len`, exactly that many digits are required and separators are
    /// not allowed. Returns `None` when no (or too few) digits were read.
    pub(crate) fn read_int(
        &mut self,
        radix: u32,
        len: Option<usize>,
        maybe_legacy_octal: bool,
    ) -> ParseResult<Option<u64>> {
        let allow_separators = self.options.ecma_version >= EcmaVersion::ES2021 && len.is_none();
        let is_legacy_octal = maybe_legacy_octal && self.byte_at(self.pos) == b'0';
        let start = self.pos;
        let mut total: u64 = 0;
        let mut last = 0u8;
        let limit = len.unwrap_or(usize::MAX);
        let mut i = 0;
        while i < limit {
            let code = self.byte_at(self.pos);
            if allow_separators && code == b'_' {
                if is_legacy_octal {
                    self.raise_recoverable(
                        self.pos,
                        ErrorCode::InvalidNumericSeparator,
                        "Numeric separator is not allowed in legacy octal numeric literals",
                    )?;
                }
                if last == b'_' {
                    self.raise_recoverable(
                        self.pos,
                        ErrorCode::InvalidNumericSeparator,
                        "Numeric separator must be exactly one underscore",
                    )?;
                }
                if i == 0 {
                    self.raise_recoverable(
                        self.pos,
                        ErrorCode::InvalidNumericSeparator,
                        "Numeric separator is not allowed at the first of digits",
                    )?;
                }
                last = code;
                i += 1;
                self.pos += 1;
                continue;
            }
            let Some(val) = (code as char).to_digit(radix) else {
                break;
            };
            last = code;
            total = total.saturating_mul(u64::from(radix)).saturating_add(u64::from(val));
            i += 1;
            self.pos += 1;
        }
        if allow_separators && last == b'_' {
            self.raise_recoverable(
                self.pos - 1,
                ErrorCode::InvalidNumericSeparator,
                "Numeric separator is not allowed at the last of digits",
            )?;
        }
        if self.pos == start || len.is_some_and(|len| self.pos - start != len) {
            return Ok(None);
        }
        Ok(Some(total))
    }

    /// Read `0x`, `0o` or `0b` literals
    pub(crate) fn read_radix_number(&mut self, radix: u32) -> ParseResult<()> {
        self.pos += 2;
        let digits_start = self.pos;
        if self.read_int(radix, None, false)?.is_none() {
            return Err(self.raise(
                self.start + 2,
                ErrorCode::InvalidNumber,
                format!("Expected number in radix {}", radix),
            ));
        }
        let digits: String = self.input[digits_start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if self.options.ecma_version >= EcmaVersion::ES2020 && self.byte_at(self.pos) == b'n' {
            let value = BigInt::parse_bytes(digits.as_bytes(), radix).unwrap_or_default();
            self.pos += 1;
            self.check_identifier_after_number()?;
            return self.finish_token(TokenType::BigInt, TokenValue::BigInt(value));
        }
        self.check_identifier_after_number()?;
        let value = BigUint::parse_bytes(digits.as_bytes(), radix)
            .and_then(|n| n.to_f64())
            .unwrap_or(f64::INFINITY);
        self.finish_token(TokenType::Num, TokenValue::Number(value))
    }

    fn check_identifier_after_number(&self) -> ParseResult<()> {
        if is_identifier_start(self.full_char_code_at_pos()) {
            return Err(self.raise(
                self.pos,
                ErrorCode::IdentifierAfterNumber,
                "Identifier directly after number",
            ));
        }
        Ok(())
    }

    /// Read a decimal (or legacy octal) literal
    pub(crate) fn read_number(&mut self, starts_with_dot: bool) -> ParseResult<()> {
        let start = self.pos;
        if !starts_with_dot && self.read_int(10, None, true)?.is_none() {
            return Err(self.raise(start, ErrorCode::InvalidNumber, "Invalid number"));
        }
        let mut octal = self.pos - start >= 2 && self.byte_at(start) == b'0';
        if octal {
            self.mark_octal(start, ErrorCode::StrictOctalLiteral);
            if self.strict {
                self.raise_recoverable(
                    start,
                    ErrorCode::StrictOctalLiteral,
                    "Octal literals are not allowed in strict mode",
                )?;
            }
        }
        let mut next = self.byte_at(self.pos);
        if !octal
            && !starts_with_dot
            && self.options.ecma_version >= EcmaVersion::ES2020
            && next == b'n'
        {
            let digits: String = self.input[start..self.pos]
                .chars()
                .filter(|&c| c != '_')
                .collect();
            let value = BigInt::parse_bytes(digits.as_bytes(), 10).unwrap_or_default();
            self.pos += 1;
            self.check_identifier_after_number()?;
            return self.finish_token(TokenType::BigInt, TokenValue::BigInt(value));
        }
        if octal && self.input[start..self.pos].contains(['8', '9']) {
            octal = false;
        }
        if next == b'.' && !octal {
            self.pos += 1;
            self.read_int(10, None, false)?;
            next = self.byte_at(self.pos);
        }
        if (next == b'e' || next == b'E') && !octal {
            self.pos += 1;
            if matches!(self.byte_at(self.pos), b'+' | b'-') {
                self.pos += 1;
            }
            if self.read_int(10, None, false)?.is_none() {
                return Err(self.raise(start, ErrorCode::InvalidNumber, "Invalid number"));
            }
        }
        self.check_identifier_after_number()?;

        let text: String = self.input[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let value = if octal {
            BigUint::parse_bytes(text.as_bytes(), 8)
                .and_then(|n| n.to_f64())
                .unwrap_or(f64::INFINITY)
        } else {
            text.parse::<f64>()
                .map_err(|_| self.raise(start, ErrorCode::InvalidNumber, "Invalid number"))?
        };
        self.finish_token(TokenType::Num, TokenValue::Number(value))
    }

    fn mark_octal(&mut self, pos: usize, code: ErrorCode) {
        if self.octal_mark.is_none() {
            self.octal_mark = Some((pos, code));
        }
    }

    /// Read a string literal delimited by `quote`
    pub(crate) fn read_string(&mut self, quote: u8) -> ParseResult<()> {
        self.pos += 1;
        let mut out = CookedBuilder::default();
        let mut chunk_start = self.pos;
        loop {
            if self.pos >= self.input.len() {
                return Err(self.raise(
                    self.start,
                    ErrorCode::UnterminatedString,
                    "Unterminated string constant",
                ));
            }
            let ch = self.full_char_code_at_pos();
            if ch == u32::from(quote) {
                break;
            }
            if ch == u32::from(b'\\') {
                out.push_str(&self.input[chunk_start..self.pos]);
                if let Some(cp) = self.read_escaped_char(false)? {
                    out.push_code_point(cp);
                }
                chunk_start = self.pos;
            } else if ch == 0x2028 || ch == 0x2029 {
                if self.options.ecma_version < EcmaVersion::ES2019 {
                    return Err(self.raise(
                        self.start,
                        ErrorCode::UnterminatedString,
                        "Unterminated string constant",
                    ));
                }
                self.pos += 3;
                self.cur_line += 1;
                self.line_start = self.pos;
            } else {
                if is_new_line(ch) {
                    return Err(self.raise(
                        self.start,
                        ErrorCode::UnterminatedString,
                        "Unterminated string constant",
                    ));
                }
                self.pos += char::from_u32(ch).map_or(1, char::len_utf8);
            }
        }
        out.push_str(&self.input[chunk_start..self.pos]);
        self.pos += 1;
        self.finish_token(TokenType::String, TokenValue::Str(out.finish()))
    }

    /// Report a bad escape. Inside template chunks (ES2018+) the error only
    /// switches the chunk to the invalid-template form.
    fn invalid_string_token(&mut self, pos: usize, code: ErrorCode, message: &str) -> ParseError {
        if self.in_template_element && self.options.ecma_version >= EcmaVersion::ES2018 {
            self.invalid_template_escape = true;
        }
        self.raise(pos, code, message)
    }

    /// Read the escape after a backslash. Returns `None` for line continuations.
    pub(crate) fn read_escaped_char(&mut self, in_template: bool) -> ParseResult<Option<u32>> {
        self.pos += 1;
        let ch = self.full_char_code_at_pos();
        self.pos += char::from_u32(ch).map_or(1, char::len_utf8);
        let cp = match ch {
            0x6E => 0x0A,                     // n
            0x72 => 0x0D,                     // r
            0x74 => 0x09,                     // t
            0x62 => 0x08,                     // b
            0x76 => 0x0B,                     // v
            0x66 => 0x0C,                     // f
            0x78 => self.read_hex_char(2)?,   // x
            0x75 => self.read_code_point()?,  // u
            0x0D => {
                if self.byte_at(self.pos) == b'\n' {
                    self.pos += 1;
                }
                self.cur_line += 1;
                self.line_start = self.pos;
                return Ok(None);
            }
            0x0A | 0x2028 | 0x2029 => {
                self.cur_line += 1;
                self.line_start = self.pos;
                return Ok(None);
            }
            0x38 | 0x39 => {
                // \8 and \9
                self.mark_octal(self.pos - 2, ErrorCode::StrictEightOrNineEscape);
                if in_template {
                    return Err(self.invalid_string_token(
                        self.pos - 1,
                        ErrorCode::InvalidEscapeSequence,
                        "Invalid escape sequence in template string",
                    ));
                }
                if self.strict {
                    self.raise_recoverable(
                        self.pos - 1,
                        ErrorCode::StrictEightOrNineEscape,
                        "Invalid escape sequence",
                    )?;
                }
                ch
            }
            0x30..=0x37 => {
                let digits_start = self.pos - 1;
                let mut len = 1;
                while len < 3 && (b'0'..=b'7').contains(&self.byte_at(digits_start + len)) {
                    len += 1;
                }
                let mut octal_str = &self.input[digits_start..digits_start + len];
                let mut octal = u32::from_str_radix(octal_str, 8).unwrap_or(0);
                if octal > 255 {
                    octal_str = &octal_str[..octal_str.len() - 1];
                    octal = u32::from_str_radix(octal_str, 8).unwrap_or(0);
                }
                let octal_len = octal_str.len();
                self.pos = digits_start + octal_len;
                let next = self.byte_at(self.pos);
                if octal_str != "0" || next == b'8' || next == b'9' {
                    let escape_pos = digits_start - 1;
                    self.mark_octal(escape_pos, ErrorCode::StrictOctalEscape);
                    if in_template {
                        return Err(self.invalid_string_token(
                            escape_pos,
                            ErrorCode::TemplateOctalEscape,
                            "Octal literal in template string",
                        ));
                    }
                    if self.strict {
                        self.raise_recoverable(
                            escape_pos,
                            ErrorCode::StrictOctalEscape,
                            "Octal literal in strict mode",
                        )?;
                    }
                }
                octal
            }
            _ => ch,
        };
        Ok(Some(cp))
    }

    fn read_hex_char(&mut self, len: usize) -> ParseResult<u32> {
        let code_pos = self.pos;
        match self.read_int(16, Some(len), false)? {
            Some(n) => Ok(n as u32),
            None => Err(self.invalid_string_token(
                code_pos,
                ErrorCode::InvalidHexEscape,
                "Bad character escape sequence",
            )),
        }
    }

    /// Read the code point of a `\u` escape (after the `u`)
    pub(crate) fn read_code_point(&mut self) -> ParseResult<u32> {
        if self.byte_at(self.pos) != b'{' {
            return self.read_hex_char(4);
        }
        if self.options.ecma_version < EcmaVersion::ES2015 {
            return Err(self.raise(
                self.pos,
                ErrorCode::InvalidUnicodeEscape,
                "Unexpected token {",
            ));
        }
        self.pos += 1;
        let code_pos = self.pos;
        let len = self.input[self.pos..].find('}').unwrap_or(0);
        let code = match self.read_int(16, Some(len), false)? {
            Some(code) if len > 0 => code,
            _ => {
                return Err(self.invalid_string_token(
                    code_pos,
                    ErrorCode::InvalidUnicodeEscape,
                    "Bad character escape sequence",
                ))
            }
        };
        self.pos += 1;
        if code > 0x10FFFF {
            return Err(self.invalid_string_token(
                code_pos,
                ErrorCode::InvalidCodePoint,
                "Code point out of bounds",
            ));
        }
        Ok(code as u32)
    }

    /// Read a template chunk, falling back to the invalid-template form when
    /// the chunk contains a malformed escape
    pub(crate) fn try_read_template_token(&mut self) -> ParseResult<()> {
        self.in_template_element = true;
        let result = self.read_tmpl_token();
        self.in_template_element = false;
        match result {
            Err(_) if self.invalid_template_escape => {
                self.invalid_template_escape = false;
                self.read_invalid_template_token()
            }
            other => other,
        }
    }

    fn read_tmpl_token(&mut self) -> ParseResult<()> {
        let mut out = CookedBuilder::default();
        let mut chunk_start = self.pos;
        loop {
            if self.pos >= self.input.len() {
                return Err(self.raise(
                    self.start,
                    ErrorCode::UnterminatedTemplate,
                    "Unterminated template",
                ));
            }
            let ch = self.byte_at(self.pos);
            if ch == b'`' || (ch == b'$' && self.byte_at(self.pos + 1) == b'{') {
                if self.pos == self.start
                    && matches!(self.ty, TokenType::Template | TokenType::InvalidTemplate)
                {
                    if ch == b'$' {
                        return self.finish_op(TokenType::DollarBraceL, 2);
                    }
                    return self.finish_op(TokenType::BackQuote, 1);
                }
                out.push_str(&self.input[chunk_start..self.pos]);
                let raw = normalize_line_endings(&self.input[self.start..self.pos]);
                return self.finish_token(
                    TokenType::Template,
                    TokenValue::Template {
                        cooked: Some(out.finish()),
                        raw,
                    },
                );
            }
            if ch == b'\\' {
                out.push_str(&self.input[chunk_start..self.pos]);
                if let Some(cp) = self.read_escaped_char(true)? {
                    out.push_code_point(cp);
                }
                chunk_start = self.pos;
            } else if ch == b'\r' || ch == b'\n' {
                out.push_str(&self.input[chunk_start..self.pos]);
                self.pos += 1;
                if ch == b'\r' && self.byte_at(self.pos) == b'\n' {
                    self.pos += 1;
                }
                out.push_str("\n");
                self.cur_line += 1;
                self.line_start = self.pos;
                chunk_start = self.pos;
            } else {
                let cp = self.full_char_code_at_pos();
                self.pos += char::from_u32(cp).map_or(1, char::len_utf8);
                if cp == 0x2028 || cp == 0x2029 {
                    self.cur_line += 1;
                    self.line_start = self.pos;
                }
            }
        }
    }

    fn read_invalid_template_token(&mut self) -> ParseResult<()> {
        while self.pos < self.input.len() {
            match self.byte_at(self.pos) {
                b'\\' => self.pos += 1,
                b'$' if self.byte_at(self.pos + 1) == b'{' => {
                    return self.finish_invalid_template();
                }
                b'`' => return self.finish_invalid_template(),
                b'\r' | b'\n' => {
                    if self.byte_at(self.pos) == b'\r' && self.byte_at(self.pos + 1) == b'\n' {
                        self.pos += 1;
                    }
                    self.cur_line += 1;
                    self.line_start = self.pos + 1;
                }
                _ => {
                    let cp = self.full_char_code_at_pos();
                    if cp == 0x2028 || cp == 0x2029 {
                        self.cur_line += 1;
                        self.line_start = self.pos + 3;
                    }
                    self.pos += char::from_u32(cp).map_or(1, char::len_utf8);
                    continue;
                }
            }
            self.pos += 1;
        }
        Err(self.raise(
            self.start,
            ErrorCode::UnterminatedTemplate,
            "Unterminated template",
        ))
    }

    fn finish_invalid_template(&mut self) -> ParseResult<()> {
        let raw = normalize_line_endings(&self.input[self.start..self.pos]);
        self.finish_token(
            TokenType::InvalidTemplate,
            TokenValue::Template { cooked: None, raw },
        )
    }

    /// Read a regular expression literal (after the opening slash)
    pub(crate) fn read_regexp(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let Some(ch) = self.input[self.pos..].chars().next() else {
                return Err(self.raise(
                    start,
                    ErrorCode::UnterminatedRegExp,
                    "Unterminated regular expression",
                ));
            };
            if is_new_line(ch as u32) {
                return Err(self.raise(
                    start,
                    ErrorCode::UnterminatedRegExp,
                    "Unterminated regular expression",
                ));
            }
            if !escaped {
                match ch {
                    '[' => in_class = true,
                    ']' if in_class => in_class = false,
                    '/' if !in_class => break,
                    _ => {}
                }
                escaped = ch == '\\';
            } else {
                escaped = false;
            }
            self.pos += ch.len_utf8();
        }
        let pattern = self.input[start..self.pos].to_string();
        self.pos += 1;
        let flags_start = self.pos;
        let flags = self.read_word1()?;
        if self.contains_esc {
            return Err(self.raise(
                flags_start,
                ErrorCode::RegExpInvalidFlags,
                "Unexpected token",
            ));
        }

        let result = if self.options.regexp_parse_mode == RegExpParseMode::Skip {
            None
        } else {
            self.parse_regexp_literal(&pattern, &flags, start)?
        };
        self.finish_token(
            TokenType::Regexp,
            TokenValue::RegExp(Box::new(RegExpValue {
                pattern,
                flags,
                result,
            })),
        )
    }

    fn parse_regexp_literal(
        &mut self,
        pattern: &str,
        flags: &str,
        start: usize,
    ) -> ParseResult<Option<RegExpParseResult>> {
        let options = RegExpOptions {
            ecma_version: self.options.ecma_version,
            mode: self.options.regexp_parse_mode,
            timeout: self.options.regex_timeout,
            base: self.position_at(start),
        };
        match RegExpParser::new(pattern, flags, options).parse() {
            Ok(RegExpParseResult::ConversionFailed(error)) => {
                debug!(pattern, code = error.code.as_str(), "regex conversion failed");
                let error = error.with_source_file(self.source_file.clone());
                self.report_recoverable(error.clone())?;
                Ok(Some(RegExpParseResult::ConversionFailed(error)))
            }
            Ok(result) => Ok(Some(result)),
            Err(error) => {
                self.report_recoverable(error.with_source_file(self.source_file.clone()))?;
                Ok(None)
            }
        }
    }
}

/// Raw template text uses `\n` for every `\r\n` and `\r`
fn normalize_line_endings(raw: &str) -> String {
    if !raw.contains('\r') {
        return raw.to_string();
    }
    raw.replace("\r\n", "\n").replace('\r', "\n")
}
