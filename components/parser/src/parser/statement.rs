//! Statement parsing, directive prologues and function bodies

use super::class::ClassPosition;
use super::expression::FunctionFlags;
use super::lval::is_simple_param_list;
use super::{DestructuringErrors, ForInit, Label, LabelKind, Marker, Parser};
use crate::ast::{Node, NodeKind, VariableKind};
use crate::error::ParseResult;
use crate::character::is_identifier_start;
use crate::options::{EcmaVersion, SourceType};
use crate::scope::{BindingType, ScopeFlags};
use crate::token::TokenType;
use core_types::{ErrorCode, ParseError};
use tracing::trace;

/// Single-statement position a statement is parsed in.
///
/// Declarations are restricted in these positions; sloppy mode still
/// accepts plain function declarations after `if` and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementContext {
    If,
    Label,
    IfLabel,
    /// Body of a loop or `with`
    Body,
}

impl StatementContext {
    fn labeled(context: Option<StatementContext>) -> StatementContext {
        match context {
            None | Some(StatementContext::Label) => StatementContext::Label,
            Some(StatementContext::If | StatementContext::IfLabel) => StatementContext::IfLabel,
            Some(StatementContext::Body) => StatementContext::Body,
        }
    }
}

impl<'a> Parser<'a> {
    /// Program body up to end of input
    pub(super) fn parse_top_level(
        &mut self,
        marker: Marker,
        source_type: SourceType,
    ) -> ParseResult<Node> {
        let mut body = self.parse_directives(TokenType::Eof, true)?.0;
        while self.tok.ty != TokenType::Eof {
            body.push(self.parse_statement(None, true)?);
        }
        if self.tok.in_module() {
            for (name, pos) in std::mem::take(&mut self.undefined_exports) {
                self.raise_recoverable(
                    pos,
                    ErrorCode::UndefinedExport,
                    format!("Export '{}' is not defined", name),
                )?;
            }
        }
        self.next()?;
        let source_type = if source_type == SourceType::Unknown {
            SourceType::Script
        } else {
            source_type
        };
        Ok(self.finish_node(marker, NodeKind::Program { source_type, body }))
    }

    /// Parse the directive prologue in front of `close`.
    ///
    /// Strict mode starts right after a `"use strict"` directive. Legacy
    /// octal escapes in earlier directives and in the token already read
    /// past the directive are reported at their own position. Returns the
    /// statements parsed and whether `"use strict"` was seen.
    fn parse_directives(&mut self, close: TokenType, top_level: bool) -> ParseResult<(Vec<Node>, bool)> {
        let mut body = Vec::new();
        let mut use_strict = false;
        if self.version() < EcmaVersion::ES5 {
            return Ok((body, use_strict));
        }
        let mut octal = None;
        while self.tok.ty == TokenType::String && self.tok.ty != close {
            let token_octal = self.tok.octal_mark;
            let mut statement = self.parse_statement(None, top_level)?;
            let Some(directive) = self.directive_text(&statement) else {
                body.push(statement);
                break;
            };
            // Tokens read in strict mode were already checked by the tokenizer.
            if !self.tok.strict && octal.is_none() {
                octal = token_octal;
            }
            if directive == "use strict" {
                use_strict = true;
                if !self.tok.strict {
                    trace!(start = statement.start, "strict mode directive");
                    self.tok.strict = true;
                    let pending = [octal.take(), self.tok.octal_mark];
                    for (pos, code) in pending.into_iter().flatten() {
                        self.raise_recoverable(pos, code, "Octal literal in strict mode")?;
                    }
                }
            }
            if let NodeKind::ExpressionStatement { directive: slot, .. } = &mut statement.kind {
                *slot = Some(directive);
            }
            body.push(statement);
        }
        Ok((body, use_strict))
    }

    /// Raw text of a string-literal expression statement that can be a
    /// directive; parenthesized strings are not directives
    fn directive_text(&self, statement: &Node) -> Option<String> {
        let NodeKind::ExpressionStatement { expression, .. } = &statement.kind else {
            return None;
        };
        if !expression.is_string_literal() {
            return None;
        }
        if !matches!(self.tok.byte_at(statement.start), b'"' | b'\'') {
            return None;
        }
        Some(self.tok.input[expression.start + 1..expression.end - 1].to_string())
    }

    /// Body of a function whose scope has already been entered.
    ///
    /// Returns the body and whether it is a concise arrow body.
    pub(super) fn parse_function_body(
        &mut self,
        start: usize,
        id: Option<&Node>,
        params: &[Node],
        is_arrow: bool,
        is_method: bool,
        for_init: ForInit,
    ) -> ParseResult<(Node, bool)> {
        if is_arrow && self.tok.ty != TokenType::BraceL {
            let body = self.parse_maybe_assign(for_init, None)?;
            self.check_params(params, false)?;
            self.exit_scope();
            return Ok((body, true));
        }

        let old_strict = self.tok.strict;
        let old_labels = std::mem::take(&mut self.labels);
        let marker = self.start_node();
        self.expect(TokenType::BraceL)?;
        let (mut body, use_strict) = self.parse_directives(TokenType::BraceR, false)?;
        let simple = is_simple_param_list(params);
        if use_strict && self.version() >= EcmaVersion::ES2016 && !simple {
            self.raise_recoverable(
                start,
                ErrorCode::UseStrictNonSimpleParams,
                "Illegal 'use strict' directive in function with non-simple parameter list",
            )?;
        }
        let allow_duplicates = !old_strict && !use_strict && !is_arrow && !is_method && simple;
        self.check_params(params, allow_duplicates)?;
        if self.tok.strict {
            if let Some(id) = id {
                self.check_lval_simple(id, BindingType::Outside, None)?;
            }
        }
        while self.tok.ty != TokenType::BraceR {
            body.push(self.parse_statement(None, false)?);
        }
        if use_strict && !old_strict {
            self.tok.strict = false;
        }
        self.next()?;
        let block = self.finish_node(marker, NodeKind::BlockStatement { body });
        self.labels = old_labels;
        self.exit_scope();
        Ok((block, false))
    }

    /// One statement or declaration
    pub(super) fn parse_statement(
        &mut self,
        context: Option<StatementContext>,
        top_level: bool,
    ) -> ParseResult<Node> {
        self.guarded(|p| p.parse_statement_inner(context, top_level))
    }

    fn parse_statement_inner(
        &mut self,
        context: Option<StatementContext>,
        top_level: bool,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        if self.is_let(context) {
            if context.is_some() {
                return Err(self.lexical_in_single_statement());
            }
            self.next()?;
            return self.parse_var_statement(marker, VariableKind::Let);
        }

        match self.tok.ty {
            TokenType::Break | TokenType::Continue => self.parse_break_continue(marker),
            TokenType::Debugger => {
                self.next()?;
                self.semicolon()?;
                Ok(self.finish_node(marker, NodeKind::DebuggerStatement))
            }
            TokenType::Do => self.parse_do(marker),
            TokenType::For => self.parse_for(marker),
            TokenType::Function => {
                if let Some(context) = context {
                    let allowed = !self.tok.strict
                        && matches!(context, StatementContext::If | StatementContext::Label);
                    if !allowed && self.version() >= EcmaVersion::ES2015 {
                        return Err(self.raise(
                            self.tok.start,
                            ErrorCode::FunctionInSingleStatement,
                            "In strict mode code, functions can only be declared at top level or inside a block",
                        ));
                    }
                }
                self.parse_function_statement(marker, false, context.is_none())
            }
            TokenType::Class => {
                if context.is_some() {
                    return Err(self.lexical_in_single_statement());
                }
                self.parse_class(marker, ClassPosition::Statement, Vec::new())
            }
            TokenType::At => self.parse_decorated_statement(marker, context, top_level),
            TokenType::If => self.parse_if(marker),
            TokenType::Return => self.parse_return(marker),
            TokenType::Switch => self.parse_switch(marker),
            TokenType::Throw => self.parse_throw(marker),
            TokenType::Try => self.parse_try(marker),
            TokenType::Const | TokenType::Var => {
                let kind = if self.tok.ty == TokenType::Const {
                    VariableKind::Const
                } else {
                    VariableKind::Var
                };
                if context.is_some() && kind != VariableKind::Var {
                    return Err(self.lexical_in_single_statement());
                }
                self.next()?;
                self.parse_var_statement(marker, kind)
            }
            TokenType::While => self.parse_while(marker),
            TokenType::With => self.parse_with(marker),
            TokenType::BraceL => self.parse_block(true),
            TokenType::Semi => {
                self.next()?;
                Ok(self.finish_node(marker, NodeKind::EmptyStatement))
            }
            TokenType::Export | TokenType::Import => {
                if self.version() >= EcmaVersion::ES2020 && self.tok.ty == TokenType::Import {
                    let next = self.tok.skip_white_space_from(self.tok.end);
                    if matches!(self.tok.byte_at(next), b'(' | b'.') {
                        let expr = self.parse_expr(ForInit::No, None)?;
                        return self.parse_expression_statement(marker, expr);
                    }
                }
                self.check_module_declaration(top_level)?;
                if self.tok.ty == TokenType::Import {
                    self.parse_import(marker)
                } else {
                    self.parse_export(marker, Vec::new(), top_level)
                }
            }
            _ => {
                if self.is_async_function() {
                    if context.is_some() {
                        return Err(self.raise(
                            self.tok.start,
                            ErrorCode::FunctionInSingleStatement,
                            "Async functions can only be declared at the top level or inside a block",
                        ));
                    }
                    self.next()?;
                    return self.parse_function_statement(marker, true, true);
                }
                if let Some(kind) = self.using_kind(false) {
                    return self.parse_using_statement(marker, kind, context, top_level);
                }
                let starts_with_name = self.tok.ty == TokenType::Name;
                let expr = self.parse_expr(ForInit::No, None)?;
                if starts_with_name
                    && matches!(expr.kind, NodeKind::Identifier { .. })
                    && self.eat(TokenType::Colon)?
                {
                    return self.parse_labeled_statement(marker, expr, context);
                }
                self.parse_expression_statement(marker, expr)
            }
        }
    }

    fn lexical_in_single_statement(&self) -> ParseError {
        self.raise(
            self.tok.start,
            ErrorCode::LexicalInSingleStatement,
            "Lexical declaration cannot appear in a single-statement context",
        )
    }

    /// Reject module declarations outside the module top level
    fn check_module_declaration(&self, top_level: bool) -> ParseResult<()> {
        if self.tok.options.allow_import_export_everywhere {
            return Ok(());
        }
        if !top_level {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::ModuleDeclarationNotTopLevel,
                "'import' and 'export' may only appear at the top level",
            ));
        }
        if !self.tok.in_module() {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::ModuleDeclarationInScript,
                "'import' and 'export' may appear only with 'sourceType: module'",
            ));
        }
        Ok(())
    }

    /// Decorators followed by a class declaration or an export
    fn parse_decorated_statement(
        &mut self,
        marker: Marker,
        context: Option<StatementContext>,
        top_level: bool,
    ) -> ParseResult<Node> {
        if self.version() < EcmaVersion::Experimental {
            return Err(self.unexpected());
        }
        if context.is_some() {
            return Err(self.lexical_in_single_statement());
        }
        let decorators = self.parse_decorators()?;
        match self.tok.ty {
            TokenType::Class => self.parse_class(marker, ClassPosition::Statement, decorators),
            TokenType::Export => {
                self.check_module_declaration(top_level)?;
                self.parse_export(marker, decorators, top_level)
            }
            _ => Err(self.raise(
                self.tok.start,
                ErrorCode::InvalidDecorator,
                "Decorators must precede a class declaration",
            )),
        }
    }

    /// `let` starts a lexical declaration here rather than an expression
    fn is_let(&self, context: Option<StatementContext>) -> bool {
        if self.version() < EcmaVersion::ES2015 || !self.is_contextual("let") {
            return false;
        }
        let next = self.tok.skip_white_space_from(self.tok.end);
        let next_byte = self.tok.byte_at(next);
        if matches!(next_byte, b'[' | b'\\') {
            return true;
        }
        if context.is_some() {
            return false;
        }
        if next_byte == b'{' {
            return true;
        }
        let Some(word) = self.tok.word_at(next) else {
            return false;
        };
        if self.tok.byte_at(next + word.len()) == b'\\' {
            return true;
        }
        !matches!(word, "in" | "instanceof")
    }

    /// `async function` on one line
    pub(super) fn is_async_function(&self) -> bool {
        if self.version() < EcmaVersion::ES2017 || !self.is_contextual("async") {
            return false;
        }
        let next = self.tok.skip_white_space_from(self.tok.end);
        !self.tok.has_line_break(self.tok.end, next) && self.tok.word_at(next) == Some("function")
    }

    /// `using x` or `await using x` starts a declaration here
    fn using_kind(&self, is_for: bool) -> Option<VariableKind> {
        if self.version() < EcmaVersion::Experimental {
            return None;
        }
        let is_await = if self.is_contextual("using") {
            false
        } else if self.is_contextual("await") {
            true
        } else {
            return None;
        };
        let mut next = self.tok.skip_white_space_from(self.tok.end);
        if self.tok.has_line_break(self.tok.end, next) {
            return None;
        }
        if is_await {
            if self.tok.word_at(next) != Some("using") {
                return None;
            }
            let after_using = next + "using".len();
            next = self.tok.skip_white_space_from(after_using);
            if self.tok.has_line_break(after_using, next) {
                return None;
            }
        }
        if self.tok.byte_at(next) == b'\\' {
            return Some(if is_await {
                VariableKind::AwaitUsing
            } else {
                VariableKind::Using
            });
        }
        let first = self.tok.input.get(next..)?.chars().next()?;
        if !is_identifier_start(first as u32) {
            return None;
        }
        let word = self.tok.word_at(next)?;
        if self.tok.byte_at(next + word.len()) != b'\\'
            && (matches!(word, "in" | "instanceof") || (is_for && word == "of"))
        {
            return None;
        }
        Some(if is_await {
            VariableKind::AwaitUsing
        } else {
            VariableKind::Using
        })
    }

    fn parse_using_statement(
        &mut self,
        marker: Marker,
        kind: VariableKind,
        context: Option<StatementContext>,
        top_level: bool,
    ) -> ParseResult<Node> {
        if context.is_some() {
            return Err(self.lexical_in_single_statement());
        }
        if top_level && !self.tok.in_module() && !self.tok.options.allow_top_level_using {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::InvalidUsingDeclaration,
                "Using declaration cannot appear in the top level when source type is `script`",
            ));
        }
        if kind == VariableKind::AwaitUsing {
            if !self.can_await() {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::InvalidUsingDeclaration,
                    "Await using cannot appear outside of async function",
                ));
            }
            self.next()?;
        }
        self.next()?;
        let declarations = self.parse_var(false, kind)?;
        self.semicolon()?;
        Ok(self.finish_node(marker, NodeKind::VariableDeclaration { kind, declarations }))
    }

    fn parse_break_continue(&mut self, marker: Marker) -> ParseResult<Node> {
        let is_break = self.tok.ty == TokenType::Break;
        self.next()?;
        let label = if self.eat(TokenType::Semi)? || self.insert_semicolon() {
            None
        } else if self.tok.ty != TokenType::Name {
            return Err(self.unexpected());
        } else {
            let label = self.parse_ident(false)?;
            self.semicolon()?;
            Some(label)
        };

        let target = label.as_ref().and_then(|label| label.identifier_name());
        let found = self.labels.iter().any(|known| {
            let name_matches = target.is_none() || known.name.as_deref() == target;
            name_matches
                && ((known.kind.is_some() && (is_break || known.kind == Some(LabelKind::Loop)))
                    || (target.is_some() && is_break))
        });
        if !found {
            let keyword = if is_break { "break" } else { "continue" };
            let (code, message) = match (target, is_break) {
                (Some(name), _) if !self.labels.iter().any(|l| l.name.as_deref() == Some(name)) => {
                    (ErrorCode::UnknownLabel, format!("Undefined label '{}'", name))
                }
                (_, true) => (ErrorCode::IllegalBreak, format!("Unsyntactic {}", keyword)),
                (_, false) => (ErrorCode::IllegalContinue, format!("Unsyntactic {}", keyword)),
            };
            return Err(self.raise(marker.start, code, message));
        }

        let label = label.map(Box::new);
        let kind = if is_break {
            NodeKind::BreakStatement { label }
        } else {
            NodeKind::ContinueStatement { label }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn loop_label() -> Label {
        Label {
            name: None,
            kind: Some(LabelKind::Loop),
            statement_start: None,
        }
    }

    fn parse_do(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        self.labels.push(Self::loop_label());
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        self.labels.pop();
        self.expect(TokenType::While)?;
        let test = self.parse_paren_expression()?;
        if self.version() >= EcmaVersion::ES2015 {
            self.eat(TokenType::Semi)?;
        } else {
            self.semicolon()?;
        }
        Ok(self.finish_node(
            marker,
            NodeKind::DoWhileStatement {
                body: Box::new(body),
                test: Box::new(test),
            },
        ))
    }

    fn parse_while(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        self.labels.push(Self::loop_label());
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        self.labels.pop();
        Ok(self.finish_node(
            marker,
            NodeKind::WhileStatement {
                test: Box::new(test),
                body: Box::new(body),
            },
        ))
    }

    /// Any of the `for` statement forms
    fn parse_for(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let await_at = if self.version() >= EcmaVersion::ES2018
            && self.can_await()
            && self.eat_contextual("await")?
        {
            Some(self.tok.last_tok_start)
        } else {
            None
        };
        self.labels.push(Self::loop_label());
        self.enter_scope(ScopeFlags::empty());
        self.expect(TokenType::ParenL)?;

        if self.tok.ty == TokenType::Semi {
            if let Some(pos) = await_at {
                return Err(self.invalid_for_await(pos));
            }
            return self.parse_for_rest(marker, None);
        }

        let is_let = self.is_let(None);
        if matches!(self.tok.ty, TokenType::Var | TokenType::Const) || is_let {
            let init_marker = self.start_node();
            let kind = if is_let {
                VariableKind::Let
            } else if self.tok.ty == TokenType::Const {
                VariableKind::Const
            } else {
                VariableKind::Var
            };
            self.next()?;
            let declarations = self.parse_var(true, kind)?;
            let init = self.finish_node(
                init_marker,
                NodeKind::VariableDeclaration { kind, declarations },
            );
            return self.parse_for_after_init(marker, init, await_at);
        }

        let starts_with_let = self.is_contextual("let");
        if let Some(kind) = self.using_kind(true) {
            let init_marker = self.start_node();
            if kind == VariableKind::AwaitUsing {
                self.next()?;
            }
            self.next()?;
            let declarations = self.parse_var(true, kind)?;
            let init = self.finish_node(
                init_marker,
                NodeKind::VariableDeclaration { kind, declarations },
            );
            return self.parse_for_after_init(marker, init, await_at);
        }

        let contains_esc = self.tok.contains_esc;
        let mut refs = DestructuringErrors::default();
        let init_start = self.tok.start;
        let init = if await_at.is_some() {
            self.parse_expr_subscripts(Some(&mut refs), ForInit::Await)?
        } else {
            self.parse_expr(ForInit::Yes, Some(&mut refs))?
        };

        let is_for_of = self.version() >= EcmaVersion::ES2015 && self.is_contextual("of");
        if self.tok.ty == TokenType::In || is_for_of {
            let mut is_await = false;
            if let Some(pos) = await_at {
                if self.tok.ty == TokenType::In {
                    return Err(self.invalid_for_await(pos));
                }
                is_await = true;
            } else if is_for_of
                && self.version() >= EcmaVersion::ES2017
                && init.start == init_start
                && !contains_esc
                && init.identifier_name() == Some("async")
            {
                return Err(self.raise(
                    init.start,
                    ErrorCode::ForOfAsync,
                    "The left-hand side of a for-of loop may not be 'async'",
                ));
            }
            if starts_with_let && is_for_of {
                return Err(self.raise(
                    init.start,
                    ErrorCode::ForOfLet,
                    "The left-hand side of a for-of loop may not start with 'let'",
                ));
            }
            if !is_for_target(&init) {
                return Err(self.raise(
                    init.start,
                    ErrorCode::InvalidLhsInFor,
                    "Invalid left-hand side in for-loop",
                ));
            }
            let init = self.to_assignable(init, false, Some(&mut refs))?;
            self.check_lval_pattern(&init, BindingType::None, None)?;
            return self.parse_for_in(marker, init, is_await);
        }
        self.check_expression_errors(Some(&refs))?;
        if let Some(pos) = await_at {
            return Err(self.invalid_for_await(pos));
        }
        self.parse_for_rest(marker, Some(init))
    }

    fn invalid_for_await(&self, pos: usize) -> ParseError {
        self.raise(
            pos,
            ErrorCode::InvalidForAwait,
            "'for await' requires a for-of loop",
        )
    }

    fn parse_for_after_init(
        &mut self,
        marker: Marker,
        init: Node,
        await_at: Option<usize>,
    ) -> ParseResult<Node> {
        let single = matches!(
            &init.kind,
            NodeKind::VariableDeclaration { declarations, .. } if declarations.len() == 1
        );
        let is_for_of = self.version() >= EcmaVersion::ES2015 && self.is_contextual("of");
        if single && (self.tok.ty == TokenType::In || is_for_of) {
            if self.tok.ty == TokenType::In {
                if let Some(pos) = await_at {
                    return Err(self.invalid_for_await(pos));
                }
            }
            return self.parse_for_in(marker, init, await_at.is_some());
        }
        if let Some(pos) = await_at {
            return Err(self.invalid_for_await(pos));
        }
        self.parse_for_rest(marker, Some(init))
    }

    /// `; test; update) body` of a classic `for`
    fn parse_for_rest(&mut self, marker: Marker, init: Option<Node>) -> ParseResult<Node> {
        self.expect(TokenType::Semi)?;
        let test = if self.tok.ty == TokenType::Semi {
            None
        } else {
            Some(Box::new(self.parse_expr(ForInit::No, None)?))
        };
        self.expect(TokenType::Semi)?;
        let update = if self.tok.ty == TokenType::ParenR {
            None
        } else {
            Some(Box::new(self.parse_expr(ForInit::No, None)?))
        };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        self.exit_scope();
        self.labels.pop();
        Ok(self.finish_node(
            marker,
            NodeKind::ForStatement {
                init: init.map(Box::new),
                test,
                update,
                body: Box::new(body),
            },
        ))
    }

    /// `in right) body` or `of right) body`
    fn parse_for_in(&mut self, marker: Marker, left: Node, is_await: bool) -> ParseResult<Node> {
        let is_for_in = self.tok.ty == TokenType::In;
        self.next()?;
        if let NodeKind::VariableDeclaration { kind, declarations } = &left.kind {
            if let Some(first) = declarations.first() {
                if let NodeKind::VariableDeclarator { id, init: Some(_) } = &first.kind {
                    let annex_b = is_for_in
                        && self.version() >= EcmaVersion::ES2017
                        && !self.tok.strict
                        && *kind == VariableKind::Var
                        && matches!(id.kind, NodeKind::Identifier { .. });
                    if !annex_b {
                        let what = if is_for_in { "for-in" } else { "for-of" };
                        return Err(self.raise(
                            left.start,
                            ErrorCode::ForInOfInitializer,
                            format!("{} loop variable declaration may not have an initializer", what),
                        ));
                    }
                }
            }
        }
        let right = if is_for_in {
            self.parse_expr(ForInit::No, None)?
        } else {
            self.parse_maybe_assign(ForInit::No, None)?
        };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        self.exit_scope();
        self.labels.pop();
        let (left, right, body) = (Box::new(left), Box::new(right), Box::new(body));
        let kind = if is_for_in {
            NodeKind::ForInStatement { left, right, body }
        } else {
            NodeKind::ForOfStatement {
                left,
                right,
                body,
                is_await,
            }
        };
        Ok(self.finish_node(marker, kind))
    }

    /// Declarator list of a `var`, `let`, `const` or `using` declaration
    pub(super) fn parse_var(&mut self, is_for: bool, kind: VariableKind) -> ParseResult<Vec<Node>> {
        let mut declarations = Vec::new();
        loop {
            let marker = self.start_node();
            let id = self.parse_var_id(kind)?;
            let in_or_of = self.tok.ty == TokenType::In
                || (self.version() >= EcmaVersion::ES2015 && self.is_contextual("of"));
            let init = if self.eat(TokenType::Eq)? {
                let for_init = if is_for { ForInit::Yes } else { ForInit::No };
                Some(Box::new(self.parse_maybe_assign(for_init, None)?))
            } else if kind == VariableKind::Const && !in_or_of {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::ConstWithoutInit,
                    "Missing initializer in const declaration",
                ));
            } else if matches!(kind, VariableKind::Using | VariableKind::AwaitUsing) && !in_or_of {
                return Err(self.raise(
                    self.tok.last_tok_end,
                    ErrorCode::InvalidUsingDeclaration,
                    format!("Missing initializer in {} declaration", kind.as_str()),
                ));
            } else if !matches!(id.kind, NodeKind::Identifier { .. }) && !(is_for && in_or_of) {
                return Err(self.raise(
                    self.tok.last_tok_end,
                    ErrorCode::PatternWithoutInit,
                    "Complex binding patterns require an initialization value",
                ));
            } else {
                None
            };
            declarations.push(self.finish_node(
                marker,
                NodeKind::VariableDeclarator {
                    id: Box::new(id),
                    init,
                },
            ));
            if !self.eat(TokenType::Comma)? {
                return Ok(declarations);
            }
        }
    }

    fn parse_var_id(&mut self, kind: VariableKind) -> ParseResult<Node> {
        let id = if matches!(kind, VariableKind::Using | VariableKind::AwaitUsing) {
            self.parse_ident(false)?
        } else {
            self.parse_binding_atom()?
        };
        let binding = if kind == VariableKind::Var {
            BindingType::Var
        } else {
            BindingType::Lexical
        };
        self.check_lval_pattern(&id, binding, None)?;
        Ok(id)
    }

    /// Declaration after `var`, `let` or `const` has been consumed
    pub(super) fn parse_var_statement(&mut self, marker: Marker, kind: VariableKind) -> ParseResult<Node> {
        let declarations = self.parse_var(false, kind)?;
        self.semicolon()?;
        Ok(self.finish_node(marker, NodeKind::VariableDeclaration { kind, declarations }))
    }

    fn parse_if(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(Some(StatementContext::If), false)?;
        let alternate = if self.eat(TokenType::Else)? {
            Some(Box::new(self.parse_statement(Some(StatementContext::If), false)?))
        } else {
            None
        };
        Ok(self.finish_node(
            marker,
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
        ))
    }

    fn parse_return(&mut self, marker: Marker) -> ParseResult<Node> {
        if !self.in_function() && !self.tok.options.allow_return_outside_function {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::IllegalReturn,
                "'return' outside of function",
            ));
        }
        self.next()?;
        let argument = if self.eat(TokenType::Semi)? || self.insert_semicolon() {
            None
        } else {
            let argument = self.parse_expr(ForInit::No, None)?;
            self.semicolon()?;
            Some(Box::new(argument))
        };
        Ok(self.finish_node(marker, NodeKind::ReturnStatement { argument }))
    }

    fn parse_switch(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenType::BraceL)?;
        self.labels.push(Label {
            name: None,
            kind: Some(LabelKind::Switch),
            statement_start: None,
        });
        self.enter_scope(ScopeFlags::empty());

        let mut cases = Vec::new();
        let mut current: Option<(Marker, Option<Box<Node>>, Vec<Node>)> = None;
        let mut saw_default = false;
        while self.tok.ty != TokenType::BraceR {
            if matches!(self.tok.ty, TokenType::Case | TokenType::Default) {
                let is_case = self.tok.ty == TokenType::Case;
                if let Some((case_marker, test, consequent)) = current.take() {
                    cases.push(self.finish_node(case_marker, NodeKind::SwitchCase { test, consequent }));
                }
                let case_marker = self.start_node();
                self.next()?;
                let test = if is_case {
                    Some(Box::new(self.parse_expr(ForInit::No, None)?))
                } else {
                    if saw_default {
                        self.raise_recoverable(
                            self.tok.last_tok_start,
                            ErrorCode::MultipleDefaultsInSwitch,
                            "Multiple default clauses",
                        )?;
                    }
                    saw_default = true;
                    None
                };
                self.expect(TokenType::Colon)?;
                current = Some((case_marker, test, Vec::new()));
            } else {
                let statement = match current.as_ref() {
                    Some(_) => self.parse_statement(None, false)?,
                    None => return Err(self.unexpected()),
                };
                if let Some((_, _, consequent)) = current.as_mut() {
                    consequent.push(statement);
                }
            }
        }
        self.exit_scope();
        if let Some((case_marker, test, consequent)) = current.take() {
            cases.push(self.finish_node(case_marker, NodeKind::SwitchCase { test, consequent }));
        }
        self.next()?;
        self.labels.pop();
        Ok(self.finish_node(
            marker,
            NodeKind::SwitchStatement {
                discriminant: Box::new(discriminant),
                cases,
            },
        ))
    }

    fn parse_throw(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        if self.tok.has_line_break(self.tok.last_tok_end, self.tok.start) {
            return Err(self.raise(
                self.tok.last_tok_end,
                ErrorCode::NewlineAfterThrow,
                "Illegal newline after throw",
            ));
        }
        let argument = self.parse_expr(ForInit::No, None)?;
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ThrowStatement {
                argument: Box::new(argument),
            },
        ))
    }

    fn parse_try(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let block = self.parse_block(true)?;
        let mut handler = None;
        if self.tok.ty == TokenType::Catch {
            let clause_marker = self.start_node();
            self.next()?;
            let param = if self.eat(TokenType::ParenL)? {
                Some(Box::new(self.parse_catch_clause_param()?))
            } else {
                if self.version() < EcmaVersion::ES2019 {
                    return Err(self.unexpected());
                }
                self.enter_scope(ScopeFlags::empty());
                None
            };
            let body = self.parse_block(false)?;
            self.exit_scope();
            handler = Some(Box::new(self.finish_node(
                clause_marker,
                NodeKind::CatchClause {
                    param,
                    body: Box::new(body),
                },
            )));
        }
        let finalizer = if self.eat(TokenType::Finally)? {
            Some(Box::new(self.parse_block(true)?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(
                marker.start,
                ErrorCode::MissingCatchOrFinally,
                "Missing catch or finally clause",
            ));
        }
        Ok(self.finish_node(
            marker,
            NodeKind::TryStatement {
                block: Box::new(block),
                handler,
                finalizer,
            },
        ))
    }

    /// `(param)` of a catch clause; opens the clause scope
    fn parse_catch_clause_param(&mut self) -> ParseResult<Node> {
        let param = self.parse_binding_atom()?;
        let simple = matches!(param.kind, NodeKind::Identifier { .. });
        if simple {
            self.enter_scope(ScopeFlags::SIMPLE_CATCH);
            self.check_lval_pattern(&param, BindingType::SimpleCatch, None)?;
        } else {
            self.enter_scope(ScopeFlags::empty());
            self.check_lval_pattern(&param, BindingType::Lexical, None)?;
        }
        self.expect(TokenType::ParenR)?;
        Ok(param)
    }

    fn parse_with(&mut self, marker: Marker) -> ParseResult<Node> {
        if self.tok.strict {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::StrictWith,
                "'with' in strict mode",
            ));
        }
        self.next()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(Some(StatementContext::Body), false)?;
        Ok(self.finish_node(
            marker,
            NodeKind::WithStatement {
                object: Box::new(object),
                body: Box::new(body),
            },
        ))
    }

    fn parse_labeled_statement(
        &mut self,
        marker: Marker,
        label: Node,
        context: Option<StatementContext>,
    ) -> ParseResult<Node> {
        let name = label.identifier_name().unwrap_or_default().to_string();
        if self.labels.iter().any(|known| known.name.as_deref() == Some(name.as_str())) {
            return Err(self.raise(
                label.start,
                ErrorCode::DuplicateLabel,
                format!("Label '{}' is already declared", name),
            ));
        }
        let kind = if self.tok.ty.is_loop() {
            Some(LabelKind::Loop)
        } else if self.tok.ty == TokenType::Switch {
            Some(LabelKind::Switch)
        } else {
            None
        };
        // Labels stacked on the same statement share its kind.
        let statement_start = self.tok.start;
        for known in self.labels.iter_mut().rev() {
            if known.statement_start != Some(marker.start) {
                break;
            }
            known.statement_start = Some(statement_start);
            known.kind = kind;
        }
        self.labels.push(Label {
            name: Some(name),
            kind,
            statement_start: Some(statement_start),
        });
        let body = self.parse_statement(Some(StatementContext::labeled(context)), false)?;
        self.labels.pop();
        Ok(self.finish_node(
            marker,
            NodeKind::LabeledStatement {
                label: Box::new(label),
                body: Box::new(body),
            },
        ))
    }

    pub(super) fn parse_expression_statement(&mut self, marker: Marker, expression: Node) -> ParseResult<Node> {
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ExpressionStatement {
                expression: Box::new(expression),
                directive: None,
            },
        ))
    }

    /// `{ statements }`, optionally in a fresh lexical scope
    pub(super) fn parse_block(&mut self, new_scope: bool) -> ParseResult<Node> {
        let marker = self.start_node();
        self.expect(TokenType::BraceL)?;
        if new_scope {
            self.enter_scope(ScopeFlags::empty());
        }
        let mut body = Vec::new();
        while self.tok.ty != TokenType::BraceR {
            body.push(self.parse_statement(None, false)?);
        }
        self.next()?;
        if new_scope {
            self.exit_scope();
        }
        Ok(self.finish_node(marker, NodeKind::BlockStatement { body }))
    }

    /// Function declaration; `async` has been consumed when `is_async`
    pub(super) fn parse_function_statement(
        &mut self,
        marker: Marker,
        is_async: bool,
        declaration_position: bool,
    ) -> ParseResult<Node> {
        self.next()?;
        let flags = if declaration_position {
            FunctionFlags::STATEMENT
        } else {
            FunctionFlags::STATEMENT | FunctionFlags::HANGING
        };
        self.parse_function(marker, flags, is_async, ForInit::No)
    }
}

/// Expressions allowed on the left of `for-in`/`for-of`
fn is_for_target(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Identifier { .. }
        | NodeKind::MemberExpression { .. }
        | NodeKind::ObjectExpression { .. }
        | NodeKind::ArrayExpression { .. }
        | NodeKind::ObjectPattern { .. }
        | NodeKind::ArrayPattern { .. }
        | NodeKind::ChainExpression { .. } => true,
        NodeKind::ParenthesizedExpression { expression } => is_for_target(expression),
        _ => false,
    }
}
