//! ECMAScript tokenizer
//!
//! A pull-based scanner: the parser calls [`Tokenizer::next`] to consume the
//! current token and scan the following one. Only the current and the last
//! token are kept. A context stack tracks braces, parens, templates and
//! function keywords so that `/` can be classified as division or as the
//! start of a regular expression literal.

mod context;
mod literals;

pub use context::TokContext;

use crate::character::{is_identifier_char, is_identifier_start, is_new_line};
use crate::error::{syntax_error, ParseResult};
use crate::options::{EcmaVersion, ParserOptions, SourceType};
use crate::token::{Comment, CommentKind, Token, TokenType, TokenValue};
use core_types::{get_line_info, is_line_break, ErrorCode, ParseError, SourceLocation, SourcePosition};
use tracing::trace;

/// Stateful scanner over a source text range
pub struct Tokenizer<'a> {
    pub(crate) options: ParserOptions,
    /// Source text, truncated to the end of the scanned range
    pub(crate) input: &'a str,
    pub(crate) range_start: usize,
    pub(crate) source_type: SourceType,
    pub(crate) source_file: Option<String>,

    pub(crate) pos: usize,
    pub(crate) line_start: usize,
    pub(crate) cur_line: u32,

    /// Current token
    pub(crate) ty: TokenType,
    pub(crate) value: TokenValue,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) start_loc: SourcePosition,
    pub(crate) end_loc: SourcePosition,

    /// Last consumed token
    pub(crate) last_tok_start: usize,
    pub(crate) last_tok_end: usize,
    pub(crate) last_tok_start_loc: SourcePosition,
    pub(crate) last_tok_end_loc: SourcePosition,

    pub(crate) context: Vec<TokContext>,
    pub(crate) expr_allowed: bool,
    pub(crate) strict: bool,
    pub(crate) contains_esc: bool,
    /// First legacy octal literal or escape (and its code) in the current token
    pub(crate) octal_mark: Option<(usize, ErrorCode)>,
    pub(crate) diagnostics: Vec<ParseError>,

    in_template_element: bool,
    invalid_template_escape: bool,
    started: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over the whole of `input`
    pub fn new(input: &'a str, source_type: SourceType, options: ParserOptions) -> Self {
        Self::with_range(input, 0, input.len(), source_type, None, options)
    }

    /// Create a tokenizer over `input[start..start + length]`.
    ///
    /// Offsets and line numbers stay relative to the whole of `input`.
    pub fn with_range(
        input: &'a str,
        start: usize,
        length: usize,
        source_type: SourceType,
        source_file: Option<String>,
        options: ParserOptions,
    ) -> Self {
        let mut tokenizer = Self {
            options,
            input: "",
            range_start: 0,
            source_type,
            source_file: None,
            pos: 0,
            line_start: 0,
            cur_line: 1,
            ty: TokenType::Eof,
            value: TokenValue::None,
            start: 0,
            end: 0,
            start_loc: SourcePosition::default(),
            end_loc: SourcePosition::default(),
            last_tok_start: 0,
            last_tok_end: 0,
            last_tok_start_loc: SourcePosition::default(),
            last_tok_end_loc: SourcePosition::default(),
            context: Vec::new(),
            expr_allowed: true,
            strict: false,
            contains_esc: false,
            octal_mark: None,
            diagnostics: Vec::new(),
            in_template_element: false,
            invalid_template_escape: false,
            started: false,
        };
        tokenizer.reset(input, start, length, source_type, source_file);
        tokenizer
    }

    /// Reinitialize all scanning state for a new input, keeping the options
    pub fn reset(
        &mut self,
        input: &'a str,
        start: usize,
        length: usize,
        source_type: SourceType,
        source_file: Option<String>,
    ) {
        let end = start.saturating_add(length).min(input.len());
        let start = start.min(end);
        self.input = &input[..end];
        self.range_start = start;
        self.source_type = source_type;
        self.source_file = source_file;

        let loc = get_line_info(self.input, start);
        self.pos = start;
        self.cur_line = loc.line;
        self.line_start = start - loc.column as usize;

        self.ty = TokenType::Eof;
        self.value = TokenValue::None;
        self.start = start;
        self.end = start;
        self.start_loc = loc;
        self.end_loc = loc;
        self.last_tok_start = start;
        self.last_tok_end = start;
        self.last_tok_start_loc = loc;
        self.last_tok_end_loc = loc;

        self.context.clear();
        self.context.push(TokContext::BraceStatement);
        self.expr_allowed = true;
        self.strict = source_type == SourceType::Module;
        self.contains_esc = false;
        self.octal_mark = None;
        self.diagnostics.clear();
        self.in_template_element = false;
        self.invalid_template_escape = false;
        self.started = false;

        if self.pos == 0
            && (self.options.allow_hashbang || self.options.ecma_version >= EcmaVersion::ES2023)
            && self.input.starts_with("#!")
        {
            self.skip_line_comment(2, CommentKind::Hashbang);
        }
    }

    /// Options the tokenizer was created with
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Whether the input is scanned as a module
    pub fn in_module(&self) -> bool {
        self.source_type == SourceType::Module
    }

    /// Whether strict mode code is being scanned
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Type of the current token
    pub fn token_type(&self) -> TokenType {
        self.ty
    }

    /// Recoverable errors recorded in tolerant mode
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    /// Snapshot of the current token
    pub fn current_token(&self) -> Token {
        Token {
            token_type: self.ty,
            value: self.value.clone(),
            start: self.start,
            end: self.end,
            loc: SourceLocation::new(self.start_loc, self.end_loc),
        }
    }

    /// Consume the current token and scan the next one
    pub fn next(&mut self) -> ParseResult<()> {
        self.next_with(false)
    }

    pub(crate) fn next_with(&mut self, ignore_escape_in_keyword: bool) -> ParseResult<()> {
        if let Some(keyword) = self.ty.keyword() {
            if !ignore_escape_in_keyword && self.contains_esc {
                self.raise_recoverable(
                    self.start,
                    ErrorCode::EscapedKeyword,
                    format!("Escape sequence in keyword {}", keyword),
                )?;
            }
        }
        if self.started && self.options.on_token.is_some() {
            let token = self.current_token();
            if let Some(on_token) = self.options.on_token.as_mut() {
                on_token(&token);
            }
        }
        self.last_tok_end = self.end;
        self.last_tok_start = self.start;
        self.last_tok_end_loc = self.end_loc;
        self.last_tok_start_loc = self.start_loc;
        self.next_token()
    }

    /// [`Tokenizer::next`] followed by a snapshot of the new token
    pub fn get_token(&mut self) -> ParseResult<Token> {
        self.next()?;
        Ok(self.current_token())
    }

    /// Iterate over the remaining tokens, excluding the end-of-input token
    pub fn into_tokens(self) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            done: false,
        }
    }

    /// Scan the token at `pos`
    pub(crate) fn next_token(&mut self) -> ParseResult<()> {
        self.started = true;
        self.octal_mark = None;
        let cur = self.cur_context();
        if !cur.preserve_space() {
            self.skip_space()?;
        }
        self.start = self.pos;
        self.start_loc = self.cur_position();
        if self.pos >= self.input.len() {
            return self.finish_token(TokenType::Eof, TokenValue::None);
        }
        if cur == TokContext::QuoteTemplate {
            return self.try_read_template_token();
        }
        let code = self.full_char_code_at_pos();
        self.read_token(code)
    }

    fn read_token(&mut self, code: u32) -> ParseResult<()> {
        if is_identifier_start(code) || code == u32::from(b'\\') {
            return self.read_word();
        }
        self.get_token_from_code(code)
    }

    pub(crate) fn finish_token(&mut self, ty: TokenType, value: TokenValue) -> ParseResult<()> {
        self.end = self.pos;
        self.end_loc = self.cur_position();
        let prev = self.ty;
        self.ty = ty;
        self.value = value;
        self.update_context(prev);
        Ok(())
    }

    pub(crate) fn finish_op(&mut self, ty: TokenType, size: usize) -> ParseResult<()> {
        let text = operator_text(&self.input[self.pos..self.pos + size]);
        self.pos += size;
        self.finish_token(ty, TokenValue::Punct(text))
    }

    fn get_token_from_code(&mut self, code: u32) -> ParseResult<()> {
        let es6 = self.options.ecma_version >= EcmaVersion::ES2015;
        match char::from_u32(code).unwrap_or('\u{FFFD}') {
            '.' => self.read_token_dot(),
            '(' => self.finish_op(TokenType::ParenL, 1),
            ')' => self.finish_op(TokenType::ParenR, 1),
            ';' => self.finish_op(TokenType::Semi, 1),
            ',' => self.finish_op(TokenType::Comma, 1),
            '[' => self.finish_op(TokenType::BracketL, 1),
            ']' => self.finish_op(TokenType::BracketR, 1),
            '{' => self.finish_op(TokenType::BraceL, 1),
            '}' => self.finish_op(TokenType::BraceR, 1),
            ':' => self.finish_op(TokenType::Colon, 1),
            '`' if es6 => self.finish_op(TokenType::BackQuote, 1),
            '@' if self.options.ecma_version >= EcmaVersion::Experimental => {
                self.finish_op(TokenType::At, 1)
            }
            '0' => match self.byte_at(self.pos + 1) {
                b'x' | b'X' => self.read_radix_number(16),
                b'o' | b'O' if es6 => self.read_radix_number(8),
                b'b' | b'B' if es6 => self.read_radix_number(2),
                _ => self.read_number(false),
            },
            '1'..='9' => self.read_number(false),
            quote @ ('"' | '\'') => self.read_string(quote as u8),
            '/' => self.read_token_slash(),
            '%' | '*' => self.read_token_mult_modulo_exp(code as u8),
            '|' | '&' => self.read_token_pipe_amp(code as u8),
            '^' => self.read_token_caret(),
            '+' | '-' => self.read_token_plus_min(code as u8),
            '<' | '>' => self.read_token_lt_gt(code as u8),
            '=' | '!' => self.read_token_eq_excl(code as u8),
            '?' => self.read_token_question(),
            '~' => self.finish_op(TokenType::Prefix, 1),
            '#' => self.read_token_number_sign(),
            _ => Err(self.unexpected_character(self.pos, code)),
        }
    }

    fn unexpected_character(&self, pos: usize, code: u32) -> ParseError {
        let ch = char::from_u32(code).unwrap_or('\u{FFFD}');
        self.raise(
            pos,
            ErrorCode::UnexpectedCharacter,
            format!("Unexpected character '{}'", ch),
        )
    }

    fn read_token_dot(&mut self) -> ParseResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next.is_ascii_digit() {
            return self.read_number(true);
        }
        if self.options.ecma_version >= EcmaVersion::ES2015
            && next == b'.'
            && self.byte_at(self.pos + 2) == b'.'
        {
            return self.finish_op(TokenType::Ellipsis, 3);
        }
        self.finish_op(TokenType::Dot, 1)
    }

    fn read_token_slash(&mut self) -> ParseResult<()> {
        if self.expr_allowed {
            self.pos += 1;
            return self.read_regexp();
        }
        if self.byte_at(self.pos + 1) == b'=' {
            return self.finish_op(TokenType::Assign, 2);
        }
        self.finish_op(TokenType::Slash, 1)
    }

    fn read_token_mult_modulo_exp(&mut self, code: u8) -> ParseResult<()> {
        let mut next = self.byte_at(self.pos + 1);
        let mut size = 1;
        let mut ty = if code == b'*' {
            TokenType::Star
        } else {
            TokenType::Modulo
        };
        if self.options.ecma_version >= EcmaVersion::ES2016 && code == b'*' && next == b'*' {
            size += 1;
            ty = TokenType::StarStar;
            next = self.byte_at(self.pos + 2);
        }
        if next == b'=' {
            return self.finish_op(TokenType::Assign, size + 1);
        }
        self.finish_op(ty, size)
    }

    fn read_token_pipe_amp(&mut self, code: u8) -> ParseResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == code {
            if self.options.ecma_version >= EcmaVersion::ES2021
                && self.byte_at(self.pos + 2) == b'='
            {
                return self.finish_op(TokenType::Assign, 3);
            }
            let ty = if code == b'|' {
                TokenType::LogicalOr
            } else {
                TokenType::LogicalAnd
            };
            return self.finish_op(ty, 2);
        }
        if next == b'=' {
            return self.finish_op(TokenType::Assign, 2);
        }
        let ty = if code == b'|' {
            TokenType::BitwiseOr
        } else {
            TokenType::BitwiseAnd
        };
        self.finish_op(ty, 1)
    }

    fn read_token_caret(&mut self) -> ParseResult<()> {
        if self.byte_at(self.pos + 1) == b'=' {
            return self.finish_op(TokenType::Assign, 2);
        }
        self.finish_op(TokenType::BitwiseXor, 1)
    }

    fn read_token_plus_min(&mut self, code: u8) -> ParseResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == code {
            if next == b'-'
                && !self.in_module()
                && self.byte_at(self.pos + 2) == b'>'
                && (self.last_tok_end == self.range_start
                    || self.has_line_break(self.last_tok_end, self.pos))
            {
                // `-->` at the start of a line is a comment
                self.skip_line_comment(3, CommentKind::Line);
                self.skip_space()?;
                return self.next_token();
            }
            return self.finish_op(TokenType::IncDec, 2);
        }
        if next == b'=' {
            return self.finish_op(TokenType::Assign, 2);
        }
        self.finish_op(TokenType::PlusMin, 1)
    }

    fn read_token_lt_gt(&mut self, code: u8) -> ParseResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == code {
            let size = if code == b'>' && self.byte_at(self.pos + 2) == b'>' {
                3
            } else {
                2
            };
            if self.byte_at(self.pos + size) == b'=' {
                return self.finish_op(TokenType::Assign, size + 1);
            }
            return self.finish_op(TokenType::BitShift, size);
        }
        if next == b'!'
            && code == b'<'
            && !self.in_module()
            && self.byte_at(self.pos + 2) == b'-'
            && self.byte_at(self.pos + 3) == b'-'
        {
            // `<!--` is a line comment in scripts
            self.skip_line_comment(4, CommentKind::Line);
            self.skip_space()?;
            return self.next_token();
        }
        let size = if next == b'=' { 2 } else { 1 };
        self.finish_op(TokenType::Relational, size)
    }

    fn read_token_eq_excl(&mut self, code: u8) -> ParseResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == b'=' {
            let size = if self.byte_at(self.pos + 2) == b'=' { 3 } else { 2 };
            return self.finish_op(TokenType::Equality, size);
        }
        if code == b'=' && next == b'>' && self.options.ecma_version >= EcmaVersion::ES2015 {
            return self.finish_op(TokenType::Arrow, 2);
        }
        let ty = if code == b'=' {
            TokenType::Eq
        } else {
            TokenType::Prefix
        };
        self.finish_op(ty, 1)
    }

    fn read_token_question(&mut self) -> ParseResult<()> {
        let version = self.options.ecma_version;
        if version >= EcmaVersion::ES2020 {
            let next = self.byte_at(self.pos + 1);
            if next == b'.' && !self.byte_at(self.pos + 2).is_ascii_digit() {
                return self.finish_op(TokenType::QuestionDot, 2);
            }
            if next == b'?' {
                if version >= EcmaVersion::ES2021 && self.byte_at(self.pos + 2) == b'=' {
                    return self.finish_op(TokenType::Assign, 3);
                }
                return self.finish_op(TokenType::Coalesce, 2);
            }
        }
        self.finish_op(TokenType::Question, 1)
    }

    fn read_token_number_sign(&mut self) -> ParseResult<()> {
        let mut code = u32::from(b'#');
        if self.options.ecma_version >= EcmaVersion::ES2022 {
            self.pos += 1;
            code = self.full_char_code_at_pos();
            if is_identifier_start(code) || code == u32::from(b'\\') {
                let word = self.read_word1()?;
                return self.finish_token(TokenType::PrivateId, TokenValue::Str(word));
            }
        }
        Err(self.unexpected_character(self.pos, code))
    }

    /// Skip whitespace, line terminators and comments
    pub(crate) fn skip_space(&mut self) -> ParseResult<()> {
        while self.pos < self.input.len() {
            match self.byte_at(self.pos) {
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'\r' => {
                    self.pos += 1;
                    if self.byte_at(self.pos) == b'\n' {
                        self.pos += 1;
                    }
                    self.new_line();
                }
                b'\n' => {
                    self.pos += 1;
                    self.new_line();
                }
                b'/' => match self.byte_at(self.pos + 1) {
                    b'*' => self.skip_block_comment()?,
                    b'/' => self.skip_line_comment(2, CommentKind::Line),
                    _ => break,
                },
                byte if byte < 0x80 => break,
                _ => {
                    let code = self.full_char_code_at_pos();
                    let width = char_width(code);
                    if is_new_line(code) {
                        self.pos += width;
                        self.new_line();
                    } else if crate::character::is_white_space(code) {
                        self.pos += width;
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn new_line(&mut self) {
        self.cur_line += 1;
        self.line_start = self.pos;
    }

    fn skip_block_comment(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let start_loc = self.cur_position();
        let Some(rel_end) = self.input[start + 2..].find("*/") else {
            return Err(self.raise(
                start,
                ErrorCode::UnterminatedComment,
                "Unterminated comment",
            ));
        };
        let end = start + 2 + rel_end;
        self.pos = end + 2;
        self.count_lines(start + 2, end);
        self.push_comment(CommentKind::Block, start + 2, end, start, start_loc);
        Ok(())
    }

    pub(crate) fn skip_line_comment(&mut self, start_skip: usize, kind: CommentKind) {
        let start = self.pos;
        let start_loc = self.cur_position();
        self.pos += start_skip;
        while let Some(ch) = self.input[self.pos..].chars().next() {
            if is_line_break(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        self.push_comment(kind, start + start_skip, self.pos, start, start_loc);
    }

    fn push_comment(
        &mut self,
        kind: CommentKind,
        text_start: usize,
        text_end: usize,
        start: usize,
        start_loc: SourcePosition,
    ) {
        if let Some(on_comment) = self.options.on_comment.as_mut() {
            let comment = Comment {
                kind,
                text: self.input[text_start..text_end].to_string(),
                start,
                end: self.pos,
                loc: SourceLocation::new(
                    start_loc,
                    SourcePosition::new(
                        self.cur_line,
                        (self.pos - self.line_start) as u32,
                        self.pos,
                    ),
                ),
            };
            on_comment(&comment);
        }
    }

    /// Advance line bookkeeping over the line breaks in `input[from..to]`
    pub(crate) fn count_lines(&mut self, from: usize, to: usize) {
        let mut chars = self.input[from..to].char_indices().peekable();
        while let Some((index, ch)) = chars.next() {
            if !is_line_break(ch) {
                continue;
            }
            let mut next = from + index + ch.len_utf8();
            if ch == '\r' {
                if let Some(&(lf, '\n')) = chars.peek() {
                    chars.next();
                    next = from + lf + 1;
                }
            }
            self.cur_line += 1;
            self.line_start = next;
        }
    }

    /// Whether `input[from..to]` contains a line terminator
    pub(crate) fn has_line_break(&self, from: usize, to: usize) -> bool {
        let to = to.min(self.input.len());
        from < to && self.input[from..to].chars().any(is_line_break)
    }

    /// Position just past whitespace and comments starting at `pos`, without
    /// touching the tokenizer state
    pub(crate) fn skip_white_space_from(&self, mut pos: usize) -> usize {
        let bytes = self.input.as_bytes();
        while pos < bytes.len() {
            match bytes[pos] {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C => pos += 1,
                b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                    while let Some(ch) = self.input[pos..].chars().next() {
                        if is_line_break(ch) {
                            break;
                        }
                        pos += ch.len_utf8();
                    }
                }
                b'/' if bytes.get(pos + 1) == Some(&b'*') => match self.input[pos + 2..].find("*/") {
                    Some(rel) => pos += rel + 4,
                    None => return bytes.len(),
                },
                byte if byte < 0x80 => break,
                _ => match self.input[pos..].chars().next() {
                    Some(ch)
                        if is_line_break(ch) || crate::character::is_white_space(ch as u32) =>
                    {
                        pos += ch.len_utf8()
                    }
                    _ => break,
                },
            }
        }
        pos
    }

    /// The identifier word starting at `pos`, if one starts there
    pub(crate) fn word_at(&self, pos: usize) -> Option<&'a str> {
        let input = self.input;
        let first = input[pos.min(input.len())..].chars().next()?;
        if !is_identifier_start(first as u32) {
            return None;
        }
        let mut end = pos + first.len_utf8();
        while let Some(ch) = input[end..].chars().next() {
            if !is_identifier_char(ch as u32) {
                break;
            }
            end += ch.len_utf8();
        }
        Some(&input[pos..end])
    }

    /// Byte at `pos`, or 0 past the end of input
    pub(crate) fn byte_at(&self, pos: usize) -> u8 {
        self.input.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Code point at the current position, or 0 past the end of input
    pub(crate) fn full_char_code_at_pos(&self) -> u32 {
        self.input
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, |ch| ch as u32)
    }

    /// Line and column of the current scanning position
    pub(crate) fn cur_position(&self) -> SourcePosition {
        SourcePosition::new(
            self.cur_line,
            (self.pos - self.line_start) as u32,
            self.pos,
        )
    }

    /// Line and column of an arbitrary offset
    pub(crate) fn position_at(&self, pos: usize) -> SourcePosition {
        if pos == self.start {
            return self.start_loc;
        }
        if pos == self.last_tok_start {
            return self.last_tok_start_loc;
        }
        if pos == self.last_tok_end {
            return self.last_tok_end_loc;
        }
        get_line_info(self.input, pos)
    }

    /// Build a fatal syntax error at `pos`
    pub(crate) fn raise(&self, pos: usize, code: ErrorCode, message: impl Into<String>) -> ParseError {
        syntax_error(code, message, self.position_at(pos))
            .with_source_file(self.source_file.clone())
    }

    /// Report a recoverable error at `pos`.
    ///
    /// The error handler may suppress or rewrite the error. In tolerant mode
    /// the error is recorded and parsing continues, otherwise it is returned.
    pub(crate) fn raise_recoverable(
        &mut self,
        pos: usize,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> ParseResult<()> {
        let error = self.raise(pos, code, message);
        self.report_recoverable(error)
    }

    /// Route an already-built error through the recoverable error channel
    pub(crate) fn report_recoverable(&mut self, error: ParseError) -> ParseResult<()> {
        let error = match self.options.error_handler.as_mut() {
            Some(handler) => handler.on_recoverable_error(error),
            None => Some(error),
        };
        let Some(error) = error else {
            return Ok(());
        };
        if self.options.tolerant {
            trace!(code = error.code.as_str(), offset = error.index(), "recoverable error recorded");
            self.diagnostics.push(error);
            Ok(())
        } else {
            Err(error)
        }
    }
}

/// Iterator over the tokens of a [`Tokenizer`]
pub struct Tokens<'a> {
    tokenizer: Tokenizer<'a>,
    done: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = ParseResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokenizer.get_token() {
            Ok(token) if token.token_type == TokenType::Eof => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// Tokenize a whole script or module
///
/// # Examples
///
/// ```
/// use ecma_parser::{tokenize, ParserOptions, SourceType, TokenType};
///
/// let tokens = tokenize("a / b", SourceType::Script, ParserOptions::default()).unwrap();
/// assert_eq!(tokens[1].token_type, TokenType::Slash);
/// ```
pub fn tokenize(
    input: &str,
    source_type: SourceType,
    options: ParserOptions,
) -> ParseResult<Vec<Token>> {
    Tokenizer::new(input, source_type, options)
        .into_tokens()
        .collect()
}

fn char_width(code: u32) -> usize {
    char::from_u32(code).map_or(1, char::len_utf8)
}

/// Intern operator text so punctuator tokens can carry `&'static str`
fn operator_text(text: &str) -> &'static str {
    const OPERATORS: &[&str] = &[
        "(", ")", ";", ",", "[", "]", "{", "}", ":", "`", "@", ".", "...", "?", "?.", "??",
        "??=", "=>", "=", "==", "===", "!", "!=", "!==", "+", "++", "+=", "-", "--", "-=", "*",
        "**", "*=", "**=", "/", "/=", "%", "%=", "<", "<=", "<<", "<<=", ">", ">=", ">>", ">>=",
        ">>>", ">>>=", "&", "&&", "&=", "&&=", "|", "||", "|=", "||=", "^", "^=", "~", "${",
    ];
    OPERATORS
        .iter()
        .copied()
        .find(|op| *op == text)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegExpParseMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn types(source: &str) -> Vec<TokenType> {
        tokenize(source, SourceType::Script, ParserOptions::default())
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_tokenizer_empty_source() {
        assert!(types("").is_empty());
        assert!(types("  // comment\n /* block */ ").is_empty());
    }

    #[test]
    fn test_punctuator_maximal_munch() {
        assert_eq!(
            types("a >>>= b >>> c >> d > e"),
            vec![
                TokenType::Name,
                TokenType::Assign,
                TokenType::Name,
                TokenType::BitShift,
                TokenType::Name,
                TokenType::BitShift,
                TokenType::Name,
                TokenType::Relational,
                TokenType::Name,
            ]
        );
    }

    #[test]
    fn test_regex_after_operator_divide_after_operand() {
        assert_eq!(
            types("x = /a/g"),
            vec![TokenType::Name, TokenType::Eq, TokenType::Regexp]
        );
        assert_eq!(
            types("x / a / g"),
            vec![
                TokenType::Name,
                TokenType::Slash,
                TokenType::Name,
                TokenType::Slash,
                TokenType::Name,
            ]
        );
    }

    #[test]
    fn test_regex_after_block_and_divide_after_paren() {
        assert_eq!(types("{}/a/")[2], TokenType::Regexp);
        assert_eq!(types("(a)/b/c")[3], TokenType::Slash);
    }

    #[test]
    fn test_regex_after_function_declaration() {
        let tys = types("function f(){}\n/a/");
        assert_eq!(tys.last(), Some(&TokenType::Regexp));
    }

    #[test]
    fn test_template_nesting() {
        assert_eq!(
            types("`a${ {b: `c${d}`}.b }e`"),
            vec![
                TokenType::BackQuote,
                TokenType::Template,
                TokenType::DollarBraceL,
                TokenType::BraceL,
                TokenType::Name,
                TokenType::Colon,
                TokenType::BackQuote,
                TokenType::Template,
                TokenType::DollarBraceL,
                TokenType::Name,
                TokenType::BraceR,
                TokenType::Template,
                TokenType::BackQuote,
                TokenType::BraceR,
                TokenType::Dot,
                TokenType::Name,
                TokenType::BraceR,
                TokenType::Template,
                TokenType::BackQuote,
            ]
        );
    }

    #[test]
    fn test_html_comments_only_in_scripts() {
        assert!(types("<!-- hidden\n--> also hidden").is_empty());
        let module = tokenize("a <!--b", SourceType::Module, ParserOptions::default()).unwrap();
        assert_eq!(module[1].token_type, TokenType::Relational);
    }

    #[test]
    fn test_hashbang() {
        let options = ParserOptions::default().with_ecma_version(EcmaVersion::ES2023);
        let tokens = tokenize("#!/usr/bin/env node\nx", SourceType::Script, options).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].loc.start.line, 2);
    }

    #[test]
    fn test_locations() {
        let tokens =
            tokenize("a\r\n  bc\u{2028}d", SourceType::Script, ParserOptions::default()).unwrap();
        assert_eq!((tokens[1].loc.start.line, tokens[1].loc.start.column), (2, 2));
        assert_eq!(tokens[1].start, 5);
        assert_eq!(tokens[2].loc.start.line, 3);
        assert_eq!(tokens[2].loc.start, get_line_info("a\r\n  bc\u{2028}d", tokens[2].start));
    }

    #[test]
    fn test_sub_range() {
        let source = "skip\nab + cd";
        let mut tokenizer = Tokenizer::with_range(
            source,
            5,
            7,
            SourceType::Script,
            None,
            ParserOptions::default(),
        );
        let first = tokenizer.get_token().unwrap();
        assert_eq!(first.value, TokenValue::Str("ab".to_string()));
        assert_eq!(first.loc.start.line, 2);
        let rest: Vec<_> = tokenizer.into_tokens().map(|t| t.unwrap().token_type).collect();
        assert_eq!(rest, vec![TokenType::PlusMin, TokenType::Name]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let source = "let x = `a${1}` / 2; /re/g.test(x)";
        let mut tokenizer = Tokenizer::new(source, SourceType::Script, ParserOptions::default());
        let mut first = Vec::new();
        loop {
            let token = tokenizer.get_token().unwrap();
            if token.token_type == TokenType::Eof {
                break;
            }
            first.push(token);
        }
        tokenizer.reset(source, 0, source.len(), SourceType::Script, None);
        let second: Vec<_> = tokenizer.into_tokens().map(|t| t.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_on_comment_and_on_token_callbacks() {
        let comments = Rc::new(RefCell::new(Vec::new()));
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&comments);
        let counter = Rc::clone(&count);
        let options = ParserOptions::default()
            .with_on_comment(move |c| sink.borrow_mut().push(c.clone()))
            .with_on_token(move |_| *counter.borrow_mut() += 1);
        let tokens = tokenize("a /* b */ // c\nd", SourceType::Script, options).unwrap();
        assert_eq!(tokens.len(), 2);
        let comments = comments.borrow();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].kind, CommentKind::Block);
        assert_eq!(comments[0].text, " b ");
        assert_eq!(comments[1].text, " c");
        // `a` and `d` are reported when consumed
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("a /* b", SourceType::Script, ParserOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedComment);
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a \u{0001}", SourceType::Script, ParserOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedCharacter);
    }

    #[test]
    fn test_private_name() {
        let tokens = tokenize("#x", SourceType::Script, ParserOptions::default()).unwrap();
        assert_eq!(tokens[0].token_type, TokenType::PrivateId);
        assert_eq!(tokens[0].value, TokenValue::Str("x".to_string()));
    }

    #[test]
    fn test_regex_skip_mode_has_no_result() {
        let options = ParserOptions::default().with_regexp_parse_mode(RegExpParseMode::Skip);
        let tokens = tokenize("/(/", SourceType::Script, options).unwrap();
        match &tokens[0].value {
            TokenValue::RegExp(re) => assert!(re.result.is_none()),
            other => panic!("expected regexp, got {:?}", other),
        }
    }
}
