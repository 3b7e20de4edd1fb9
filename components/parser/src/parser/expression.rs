//! Expression parsing
//!
//! Operator precedence is handled by precedence climbing over
//! [`TokenType::binop`]. Parenthesized lists, object literals and array
//! literals are parsed as expressions and converted to patterns afterwards
//! when an `=` or `=>` shows that they were patterns all along.

use super::{DestructuringErrors, ForInit, Marker, Parser};
use crate::ast::{Function, LiteralValue, Node, NodeKind, PropertyKind, TemplateValue};
use crate::error::ParseResult;
use crate::options::{AllowReserved, EcmaVersion, SourceType};
use crate::scope::ScopeFlags;
use crate::token::{TokenType, TokenValue};
use crate::tokenizer::TokContext;
use bitflags::bitflags;
use core_types::{ErrorCode, SourcePosition};
use std::collections::HashMap;

bitflags! {
    /// How a `function` keyword was reached
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct FunctionFlags: u8 {
        /// Declaration rather than expression
        const STATEMENT = 0b001;
        /// Sole body of an `if` or label in sloppy mode
        const HANGING = 0b010;
        /// `export default function () {}`
        const NULLABLE_ID = 0b100;
    }
}

/// Result of one step of the subscript loop
enum Subscript {
    Next { node: Node, optional: bool },
    Done(Node),
}

/// Keys already seen in an object literal
#[derive(Default)]
struct PropertyClash {
    proto: bool,
    /// Data, getter, setter
    seen: HashMap<String, [bool; 3]>,
}

impl<'a> Parser<'a> {
    /// Comma-separated expression
    pub(super) fn parse_expr(
        &mut self,
        for_init: ForInit,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let expr = self.parse_maybe_assign(for_init, refs.as_deref_mut())?;
        if self.tok.ty != TokenType::Comma {
            return Ok(expr);
        }
        let mut expressions = vec![expr];
        while self.eat(TokenType::Comma)? {
            expressions.push(self.parse_maybe_assign(for_init, refs.as_deref_mut())?);
        }
        Ok(self.finish_node(
            Marker { start, loc },
            NodeKind::SequenceExpression { expressions },
        ))
    }

    /// Assignment expression, or anything of higher precedence
    pub(super) fn parse_maybe_assign(
        &mut self,
        for_init: ForInit,
        refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        self.guarded(|p| p.parse_maybe_assign_inner(for_init, refs))
    }

    fn parse_maybe_assign_inner(
        &mut self,
        for_init: ForInit,
        refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        if self.is_contextual("yield") {
            if self.in_generator() {
                return self.parse_yield(for_init);
            }
            // Outside generators `yield` is an identifier.
            self.tok.expr_allowed = false;
        }

        let own = refs.is_none();
        let mut own_errors = DestructuringErrors::default();
        let refs: &mut DestructuringErrors = match refs {
            Some(refs) => refs,
            None => &mut own_errors,
        };
        let old_paren_assign = refs.parenthesized_assign.take();
        let old_trailing_comma = refs.trailing_comma.take();
        let old_double_proto = refs.double_proto;

        let (start, loc) = (self.tok.start, self.tok.start_loc);
        if matches!(self.tok.ty, TokenType::ParenL | TokenType::Name) {
            self.potential_arrow_at = Some(self.tok.start);
            self.potential_arrow_in_for_await = for_init == ForInit::Await;
        }
        let left = self.parse_maybe_conditional(for_init, Some(&mut *refs))?;

        if self.tok.ty.is_assign() {
            let operator = self.operator_text();
            let is_plain = self.tok.ty == TokenType::Eq;
            let left = if is_plain {
                self.to_assignable(left, false, Some(&mut *refs))?
            } else {
                left
            };
            if !own {
                refs.parenthesized_assign = None;
                refs.trailing_comma = None;
                refs.double_proto = None;
            }
            if refs.shorthand_assign.is_some_and(|pos| pos >= left.start) {
                refs.shorthand_assign = None;
            }
            if is_plain {
                self.check_lval_pattern(&left, crate::scope::BindingType::None, None)?;
            } else {
                self.check_lval_simple(&left, crate::scope::BindingType::None, None)?;
            }
            self.next()?;
            let right = self.parse_maybe_assign(for_init, None)?;
            if old_double_proto.is_some() {
                refs.double_proto = old_double_proto;
            }
            return Ok(self.finish_node(
                Marker { start, loc },
                NodeKind::AssignmentExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            ));
        } else if own {
            self.check_expression_errors(Some(&*refs))?;
        }
        if old_paren_assign.is_some() {
            refs.parenthesized_assign = old_paren_assign;
        }
        if old_trailing_comma.is_some() {
            refs.trailing_comma = old_trailing_comma;
        }
        Ok(left)
    }

    /// `test ? consequent : alternate`
    fn parse_maybe_conditional(
        &mut self,
        for_init: ForInit,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let expr = self.parse_expr_ops(for_init, refs.as_deref_mut())?;
        if Self::has_expression_errors(refs.as_deref()) {
            return Ok(expr);
        }
        if !self.eat(TokenType::Question)? {
            return Ok(expr);
        }
        let consequent = self.parse_maybe_assign(ForInit::No, None)?;
        self.expect(TokenType::Colon)?;
        let alternate = self.parse_maybe_assign(for_init, None)?;
        Ok(self.finish_node(
            Marker { start, loc },
            NodeKind::ConditionalExpression {
                test: Box::new(expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    fn parse_expr_ops(
        &mut self,
        for_init: ForInit,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let expr = self.parse_maybe_unary(refs.as_deref_mut(), false, false, for_init)?;
        if Self::has_expression_errors(refs.as_deref()) {
            return Ok(expr);
        }
        if expr.start == start && matches!(expr.kind, NodeKind::ArrowFunctionExpression(_)) {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, loc, -1, for_init)
    }

    /// Fold binary operators binding tighter than `min_prec` onto `left`
    fn parse_expr_op(
        &mut self,
        mut left: Node,
        left_start: usize,
        left_loc: SourcePosition,
        min_prec: i8,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        loop {
            let ty = self.tok.ty;
            let mut prec = ty.binop();
            if prec < 0 || (for_init.is_set() && ty == TokenType::In) || prec <= min_prec {
                return Ok(left);
            }
            let logical = matches!(ty, TokenType::LogicalOr | TokenType::LogicalAnd);
            let coalesce = ty == TokenType::Coalesce;
            if coalesce {
                // `??` binds like `&&` so that mixing is caught below.
                prec = TokenType::LogicalAnd.binop();
            }
            let operator = self.operator_text();
            self.next()?;
            let (start, loc) = (self.tok.start, self.tok.start_loc);
            let operand = self.parse_maybe_unary(None, false, false, for_init)?;
            let right = self.parse_expr_op(operand, start, loc, prec, for_init)?;
            left = self.build_binary(
                Marker {
                    start: left_start,
                    loc: left_loc,
                },
                left,
                right,
                operator,
                logical || coalesce,
            )?;
            if (logical && self.tok.ty == TokenType::Coalesce)
                || (coalesce && matches!(self.tok.ty, TokenType::LogicalOr | TokenType::LogicalAnd))
            {
                self.raise_recoverable(
                    self.tok.start,
                    ErrorCode::MixedCoalesce,
                    "Logical expressions and coalesce expressions cannot be mixed. Wrap either by parentheses",
                )?;
            }
        }
    }

    fn build_binary(
        &mut self,
        marker: Marker,
        left: Node,
        right: Node,
        operator: String,
        logical: bool,
    ) -> ParseResult<Node> {
        if matches!(right.kind, NodeKind::PrivateIdentifier { .. }) {
            return Err(self.raise(
                right.start,
                ErrorCode::UnexpectedToken,
                "Private identifier can only be left side of binary expression",
            ));
        }
        let (left, right) = (Box::new(left), Box::new(right));
        let kind = if logical {
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            }
        } else {
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            }
        };
        Ok(self.finish_node(marker, kind))
    }

    /// Prefix operators, `await`, postfix updates and `**`
    pub(super) fn parse_maybe_unary(
        &mut self,
        refs: Option<&mut DestructuringErrors>,
        saw_unary: bool,
        inc_dec: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        self.guarded(|p| p.parse_maybe_unary_inner(refs, saw_unary, inc_dec, for_init))
    }

    fn parse_maybe_unary_inner(
        &mut self,
        mut refs: Option<&mut DestructuringErrors>,
        mut saw_unary: bool,
        inc_dec: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let expr = if self.is_contextual("await") && self.can_await() {
            saw_unary = true;
            self.parse_await(for_init)?
        } else if self.tok.ty.is_prefix() {
            let marker = self.start_node();
            let update = self.tok.ty == TokenType::IncDec;
            let operator = self.operator_text();
            self.next()?;
            let argument = self.parse_maybe_unary(None, true, update, for_init)?;
            self.check_expression_errors(refs.as_deref())?;
            if update {
                self.check_update_target(&argument)?;
            } else if self.tok.strict && operator == "delete" && is_local_variable_access(&argument) {
                self.raise_recoverable(
                    marker.start,
                    ErrorCode::StrictDelete,
                    "Deleting local variable in strict mode",
                )?;
            } else if operator == "delete" && is_private_field_access(&argument) {
                self.raise_recoverable(
                    marker.start,
                    ErrorCode::PrivateNameDelete,
                    "Private fields can not be deleted",
                )?;
            } else {
                saw_unary = true;
            }
            let argument = Box::new(argument);
            let kind = if update {
                NodeKind::UpdateExpression {
                    operator,
                    prefix: true,
                    argument,
                }
            } else {
                NodeKind::UnaryExpression {
                    operator,
                    prefix: true,
                    argument,
                }
            };
            self.finish_node(marker, kind)
        } else if !saw_unary && self.tok.ty == TokenType::PrivateId {
            if (for_init.is_set() || self.private_names.is_empty())
                && self.tok.options.check_private_fields
            {
                return Err(self.unexpected());
            }
            let expr = self.parse_private_ident()?;
            // `#x` alone is only valid as the left side of `in`.
            if self.tok.ty != TokenType::In {
                return Err(self.unexpected());
            }
            expr
        } else {
            let mut expr = self.parse_expr_subscripts(refs.as_deref_mut(), for_init)?;
            if Self::has_expression_errors(refs.as_deref()) {
                return Ok(expr);
            }
            while self.tok.ty.is_postfix() && !self.can_insert_semicolon() {
                let operator = self.operator_text();
                self.check_update_target(&expr)?;
                self.next()?;
                expr = self.finish_node(
                    Marker { start, loc },
                    NodeKind::UpdateExpression {
                        operator,
                        prefix: false,
                        argument: Box::new(expr),
                    },
                );
            }
            expr
        };

        if !inc_dec && self.tok.ty == TokenType::StarStar {
            self.next()?;
            if saw_unary {
                return Err(self.raise(
                    self.tok.last_tok_start,
                    ErrorCode::UnparenthesizedUnaryExponent,
                    "Unary operator used immediately before exponentiation expression. Parenthesis must be used to disambiguate operator precedence",
                ));
            }
            let right = self.parse_maybe_unary(None, false, false, for_init)?;
            return self.build_binary(Marker { start, loc }, expr, right, "**".to_string(), false);
        }
        Ok(expr)
    }

    /// An atom followed by member accesses, calls and tagged templates
    pub(super) fn parse_expr_subscripts(
        &mut self,
        mut refs: Option<&mut DestructuringErrors>,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let expr = self.parse_expr_atom(refs.as_deref_mut(), for_init, false)?;
        if matches!(expr.kind, NodeKind::ArrowFunctionExpression(_))
            && &self.tok.input[self.tok.last_tok_start..self.tok.last_tok_end] != ")"
        {
            return Ok(expr);
        }
        let result = self.parse_subscripts(expr, start, loc, false, for_init)?;
        if let Some(refs) = refs {
            if matches!(result.kind, NodeKind::MemberExpression { .. }) {
                let covered = |pos: Option<usize>| pos.is_some_and(|pos| pos >= result.start);
                if covered(refs.parenthesized_assign) {
                    refs.parenthesized_assign = None;
                }
                if covered(refs.parenthesized_bind) {
                    refs.parenthesized_bind = None;
                }
                if covered(refs.trailing_comma) {
                    refs.trailing_comma = None;
                }
            }
        }
        Ok(result)
    }

    pub(super) fn parse_subscripts(
        &mut self,
        base: Node,
        start: usize,
        loc: SourcePosition,
        no_calls: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let maybe_async_arrow = self.version() >= EcmaVersion::ES2017
            && base.identifier_name() == Some("async")
            && self.tok.last_tok_end == base.end
            && !self.can_insert_semicolon()
            && base.end - base.start == 5
            && self.potential_arrow_at == Some(base.start);
        let mut optional_chained = false;
        let mut base = base;
        loop {
            match self.parse_subscript(
                base,
                Marker { start, loc },
                no_calls,
                maybe_async_arrow,
                optional_chained,
                for_init,
            )? {
                Subscript::Next { node, optional } => {
                    optional_chained |= optional;
                    base = node;
                }
                Subscript::Done(node) => {
                    if optional_chained {
                        return Ok(self.finish_node(
                            Marker { start, loc },
                            NodeKind::ChainExpression {
                                expression: Box::new(node),
                            },
                        ));
                    }
                    return Ok(node);
                }
            }
        }
    }

    fn parse_subscript(
        &mut self,
        base: Node,
        marker: Marker,
        no_calls: bool,
        maybe_async_arrow: bool,
        optional_chained: bool,
        for_init: ForInit,
    ) -> ParseResult<Subscript> {
        let optional =
            self.version() >= EcmaVersion::ES2020 && self.eat(TokenType::QuestionDot)?;
        if no_calls && optional {
            return Err(self.raise(
                self.tok.last_tok_start,
                ErrorCode::OptionalChainNewCallee,
                "Optional chaining cannot appear in the callee of new expressions",
            ));
        }

        let computed = self.eat(TokenType::BracketL)?;
        if computed
            || (optional && !matches!(self.tok.ty, TokenType::ParenL | TokenType::BackQuote))
            || self.eat(TokenType::Dot)?
        {
            let property = if computed {
                let property = self.parse_expr(ForInit::No, None)?;
                self.expect(TokenType::BracketR)?;
                property
            } else if self.tok.ty == TokenType::PrivateId && !matches!(base.kind, NodeKind::Super) {
                self.parse_private_ident()?
            } else {
                self.parse_ident(self.tok.options.allow_reserved != AllowReserved::Never)?
            };
            let node = self.finish_node(
                marker,
                NodeKind::MemberExpression {
                    object: Box::new(base),
                    property: Box::new(property),
                    computed,
                    optional,
                },
            );
            return Ok(Subscript::Next { node, optional });
        }

        if !no_calls && self.eat(TokenType::ParenL)? {
            let mut refs = DestructuringErrors::default();
            let saved = self.take_function_positions();
            let arguments = self.parse_expr_list(
                TokenType::ParenR,
                self.version() >= EcmaVersion::ES2017,
                false,
                Some(&mut refs),
            )?;
            if maybe_async_arrow && !optional && self.eat_arrow()? {
                self.check_pattern_errors(Some(&mut refs), false)?;
                self.check_yield_await_in_default_params()?;
                if let Some(pos) = self.await_ident_pos {
                    return Err(self.raise(
                        pos,
                        ErrorCode::AwaitIdentifier,
                        "Cannot use 'await' as identifier inside an async function",
                    ));
                }
                self.restore_function_positions(saved);
                let params = arguments.into_iter().flatten().collect();
                let arrow = self.parse_arrow_expression(marker, params, true, for_init)?;
                return Ok(Subscript::Done(arrow));
            }
            self.check_expression_errors(Some(&refs))?;
            self.yield_pos = saved.yield_pos.or(self.yield_pos);
            self.await_pos = saved.await_pos.or(self.await_pos);
            self.await_ident_pos = saved.await_ident_pos.or(self.await_ident_pos);
            let node = self.finish_node(
                marker,
                NodeKind::CallExpression {
                    callee: Box::new(base),
                    arguments: arguments.into_iter().flatten().collect(),
                    optional,
                },
            );
            return Ok(Subscript::Next { node, optional });
        }

        if self.tok.ty == TokenType::BackQuote {
            if optional || optional_chained {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::OptionalChainTemplate,
                    "Optional chaining cannot appear in the tag of tagged template expressions",
                ));
            }
            let quasi = self.parse_template(true)?;
            let node = self.finish_node(
                marker,
                NodeKind::TaggedTemplateExpression {
                    tag: Box::new(base),
                    quasi: Box::new(quasi),
                },
            );
            return Ok(Subscript::Next {
                node,
                optional: false,
            });
        }
        Ok(Subscript::Done(base))
    }

    /// Consume `=>` when it can start an arrow body here
    fn eat_arrow(&mut self) -> ParseResult<bool> {
        if self.tok.ty != TokenType::Arrow {
            return Ok(false);
        }
        if self.can_insert_semicolon() {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::LineBreakBeforeArrow,
                "Line terminator not permitted before arrow",
            ));
        }
        self.next()?;
        Ok(true)
    }

    /// Primary expression
    pub(super) fn parse_expr_atom(
        &mut self,
        refs: Option<&mut DestructuringErrors>,
        for_init: ForInit,
        for_new: bool,
    ) -> ParseResult<Node> {
        // A `/` or `/=` in operand position starts a regular expression.
        if self.tok.ty == TokenType::Slash
            || (self.tok.ty == TokenType::Assign && self.tok.value.as_str() == Some("/="))
        {
            self.tok.pos = self.tok.start + 1;
            self.tok.read_regexp()?;
        }

        let can_be_arrow = self.potential_arrow_at == Some(self.tok.start);
        match self.tok.ty {
            TokenType::Super => {
                if !self.allow_super() {
                    return Err(self.raise(
                        self.tok.start,
                        ErrorCode::SuperOutsideMethod,
                        "'super' keyword outside a method",
                    ));
                }
                let marker = self.start_node();
                self.next()?;
                if self.tok.ty == TokenType::ParenL
                    && !(self.scopes.allow_direct_super()
                        || self.tok.options.allow_super_outside_method)
                {
                    return Err(self.raise(
                        marker.start,
                        ErrorCode::SuperCallOutsideConstructor,
                        "super() call outside constructor of a subclass",
                    ));
                }
                if !matches!(
                    self.tok.ty,
                    TokenType::Dot | TokenType::BracketL | TokenType::ParenL
                ) {
                    return Err(self.unexpected());
                }
                Ok(self.finish_node(marker, NodeKind::Super))
            }
            TokenType::This => {
                let marker = self.start_node();
                self.next()?;
                Ok(self.finish_node(marker, NodeKind::ThisExpression))
            }
            TokenType::Name => self.parse_name_atom(can_be_arrow, for_init),
            TokenType::Regexp
            | TokenType::Num
            | TokenType::BigInt
            | TokenType::String => self.parse_literal(),
            TokenType::Null | TokenType::True | TokenType::False => {
                let marker = self.start_node();
                let (value, raw) = match self.tok.ty {
                    TokenType::Null => (LiteralValue::Null, "null"),
                    TokenType::True => (LiteralValue::Boolean(true), "true"),
                    _ => (LiteralValue::Boolean(false), "false"),
                };
                self.next()?;
                Ok(self.finish_node(
                    marker,
                    NodeKind::Literal {
                        value,
                        raw: raw.to_string(),
                    },
                ))
            }
            TokenType::ParenL => {
                let start = self.tok.start;
                let expr = self.parse_paren_and_distinguish(can_be_arrow, for_init)?;
                if let Some(refs) = refs {
                    if refs.parenthesized_assign.is_none() && !is_simple_assign_target(&expr) {
                        refs.parenthesized_assign = Some(start);
                    }
                    if refs.parenthesized_bind.is_none() {
                        refs.parenthesized_bind = Some(start);
                    }
                }
                Ok(expr)
            }
            TokenType::BracketL => {
                let marker = self.start_node();
                self.next()?;
                let elements = self.parse_expr_list(TokenType::BracketR, true, true, refs)?;
                Ok(self.finish_node(marker, NodeKind::ArrayExpression { elements }))
            }
            TokenType::BraceL => {
                self.tok.override_context(TokContext::BraceExpression);
                self.parse_obj(false, refs)
            }
            TokenType::Function => {
                let marker = self.start_node();
                self.next()?;
                self.parse_function(marker, FunctionFlags::empty(), false, for_init)
            }
            TokenType::Class => {
                let marker = self.start_node();
                self.parse_class(marker, super::class::ClassPosition::Expression, Vec::new())
            }
            TokenType::At => {
                let marker = self.start_node();
                let decorators = self.parse_decorators()?;
                if self.tok.ty != TokenType::Class {
                    return Err(self.raise(
                        self.tok.start,
                        ErrorCode::InvalidDecorator,
                        "Decorators must precede a class",
                    ));
                }
                self.parse_class(marker, super::class::ClassPosition::Expression, decorators)
            }
            TokenType::New => self.parse_new(),
            TokenType::BackQuote => self.parse_template(false),
            TokenType::Import if self.version() >= EcmaVersion::ES2020 => {
                self.parse_expr_import(for_new)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Identifier in expression position: a reference, an arrow parameter
    /// or the start of an async function or arrow
    fn parse_name_atom(&mut self, can_be_arrow: bool, for_init: ForInit) -> ParseResult<Node> {
        let marker = self.start_node();
        let contains_esc = self.tok.contains_esc;
        let id = self.parse_ident(false)?;
        let is_async = !contains_esc && id.identifier_name() == Some("async");

        if self.version() >= EcmaVersion::ES2017
            && is_async
            && !self.can_insert_semicolon()
            && self.tok.ty == TokenType::Function
        {
            self.next()?;
            match self.tok.cur_context() {
                TokContext::FunctionStatement => {
                    self.tok.override_context(TokContext::FunctionExpression)
                }
                TokContext::FunctionGenerator => {
                    self.tok.override_context(TokContext::FunctionExpressionGenerator)
                }
                _ => {}
            }
            return self.parse_function(marker, FunctionFlags::empty(), true, for_init);
        }

        if can_be_arrow && !self.can_insert_semicolon() {
            if self.eat(TokenType::Arrow)? {
                return self.parse_arrow_expression(marker, vec![id], false, for_init);
            }
            if self.version() >= EcmaVersion::ES2017
                && is_async
                && self.tok.ty == TokenType::Name
                && (!self.potential_arrow_in_for_await
                    || self.tok.value.as_str() != Some("of")
                    || self.tok.contains_esc)
            {
                let param = self.parse_ident(false)?;
                if self.can_insert_semicolon() || !self.eat(TokenType::Arrow)? {
                    return Err(self.unexpected());
                }
                return self.parse_arrow_expression(marker, vec![param], true, for_init);
            }
        }
        if can_be_arrow && self.tok.ty == TokenType::Arrow {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::LineBreakBeforeArrow,
                "Line terminator not permitted before arrow",
            ));
        }
        Ok(id)
    }

    /// String, numeric, BigInt or regular expression literal
    pub(super) fn parse_literal(&mut self) -> ParseResult<Node> {
        let marker = self.start_node();
        let value = match &self.tok.value {
            TokenValue::Str(value) if self.tok.ty == TokenType::String => {
                LiteralValue::String(value.clone())
            }
            TokenValue::Number(value) => LiteralValue::Number(*value),
            TokenValue::BigInt(value) => LiteralValue::BigInt(value.to_string()),
            TokenValue::RegExp(value) => LiteralValue::RegExp(value.clone()),
            _ => return Err(self.unexpected()),
        };
        let raw = self.tok.input[self.tok.start..self.tok.end].to_string();
        self.next()?;
        Ok(self.finish_node(marker, NodeKind::Literal { value, raw }))
    }

    /// `(expression)` as required after `if`, `while`, `switch` and `with`
    pub(super) fn parse_paren_expression(&mut self) -> ParseResult<Node> {
        self.expect(TokenType::ParenL)?;
        let expr = self.parse_expr(ForInit::No, None)?;
        self.expect(TokenType::ParenR)?;
        Ok(expr)
    }

    /// Parenthesized expression or arrow function parameters
    fn parse_paren_and_distinguish(
        &mut self,
        can_be_arrow: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        if self.version() < EcmaVersion::ES2015 {
            let expr = self.parse_paren_expression()?;
            return Ok(self.wrap_parens(marker, expr));
        }

        let allow_trailing_comma = self.version() >= EcmaVersion::ES2017;
        self.next()?;
        let (inner_start, inner_loc) = (self.tok.start, self.tok.start_loc);
        let mut list = Vec::new();
        let mut first = true;
        let mut last_is_comma = false;
        let mut refs = DestructuringErrors::default();
        let saved_yield = self.yield_pos.take();
        let saved_await = self.await_pos.take();
        let mut spread_start = None;
        // `await_ident_pos` is kept so that `await` nested in parameters
        // is still seen by the enclosing async arrow.
        while self.tok.ty != TokenType::ParenR {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
            }
            if allow_trailing_comma && self.after_trailing_comma(TokenType::ParenR, false)? {
                last_is_comma = true;
                break;
            }
            if self.tok.ty == TokenType::Ellipsis {
                spread_start = Some(self.tok.start);
                list.push(self.parse_rest_binding()?);
                if self.tok.ty == TokenType::Comma {
                    self.raise_recoverable(
                        self.tok.start,
                        ErrorCode::TrailingCommaAfterRest,
                        "Comma is not permitted after the rest element",
                    )?;
                }
                break;
            }
            list.push(self.parse_maybe_assign(ForInit::No, Some(&mut refs))?);
        }
        let (inner_end, inner_end_loc) = (self.tok.last_tok_end, self.tok.last_tok_end_loc);
        self.expect(TokenType::ParenR)?;

        if can_be_arrow && self.eat_arrow()? {
            self.check_pattern_errors(Some(&mut refs), false)?;
            self.check_yield_await_in_default_params()?;
            self.yield_pos = saved_yield;
            self.await_pos = saved_await;
            return self.parse_arrow_expression(marker, list, false, for_init);
        }

        if list.is_empty() || last_is_comma {
            return Err(self.unexpected_at(self.tok.last_tok_start));
        }
        if let Some(pos) = spread_start {
            return Err(self.unexpected_at(pos));
        }
        self.check_expression_errors(Some(&refs))?;
        self.yield_pos = saved_yield.or(self.yield_pos);
        self.await_pos = saved_await.or(self.await_pos);

        let expr = if list.len() == 1 {
            list.remove(0)
        } else {
            self.finish_node_at(
                Marker {
                    start: inner_start,
                    loc: inner_loc,
                },
                NodeKind::SequenceExpression { expressions: list },
                inner_end,
                inner_end_loc,
            )
        };
        Ok(self.wrap_parens(marker, expr))
    }

    pub(super) fn wrap_parens(&mut self, marker: Marker, expr: Node) -> Node {
        if !self.tok.options.preserve_parens {
            return expr;
        }
        self.finish_node(
            marker,
            NodeKind::ParenthesizedExpression {
                expression: Box::new(expr),
            },
        )
    }

    /// Comma-separated expressions up to `close`; `None` entries are holes
    pub(super) fn parse_expr_list(
        &mut self,
        close: TokenType,
        allow_trailing_comma: bool,
        allow_empty: bool,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Vec<Option<Node>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if allow_trailing_comma && self.after_trailing_comma(close, true)? {
                    break;
                }
            }
            if allow_empty && self.tok.ty == TokenType::Comma {
                elements.push(None);
            } else if self.tok.ty == TokenType::Ellipsis {
                let spread = self.parse_spread(refs.as_deref_mut())?;
                if let Some(refs) = refs.as_deref_mut() {
                    if self.tok.ty == TokenType::Comma && refs.trailing_comma.is_none() {
                        refs.trailing_comma = Some(self.tok.start);
                    }
                }
                elements.push(Some(spread));
            } else {
                elements.push(Some(self.parse_maybe_assign(ForInit::No, refs.as_deref_mut())?));
            }
        }
        Ok(elements)
    }

    /// `new callee(args)` or `new.target`
    fn parse_new(&mut self) -> ParseResult<Node> {
        self.guarded(|p| p.parse_new_inner())
    }

    fn parse_new_inner(&mut self) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        if self.version() >= EcmaVersion::ES2015 && self.tok.ty == TokenType::Dot {
            let meta = self.finish_node(
                marker,
                NodeKind::Identifier {
                    name: "new".to_string(),
                },
            );
            self.next()?;
            let contains_esc = self.tok.contains_esc;
            let property = self.parse_ident(true)?;
            if property.identifier_name() != Some("target") {
                self.raise_recoverable(
                    property.start,
                    ErrorCode::InvalidMetaProperty,
                    "The only valid meta property for new is 'new.target'",
                )?;
            }
            if contains_esc {
                self.raise_recoverable(
                    marker.start,
                    ErrorCode::InvalidMetaProperty,
                    "'new.target' must not contain escaped characters",
                )?;
            }
            if !self.allow_new_target() {
                self.raise_recoverable(
                    marker.start,
                    ErrorCode::NewTargetOutsideFunction,
                    "'new.target' can only be used in functions and class static block",
                )?;
            }
            return Ok(self.finish_node(
                marker,
                NodeKind::MetaProperty {
                    meta: Box::new(meta),
                    property: Box::new(property),
                },
            ));
        }

        let (start, loc) = (self.tok.start, self.tok.start_loc);
        let atom = self.parse_expr_atom(None, ForInit::No, true)?;
        let callee = self.parse_subscripts(atom, start, loc, true, ForInit::No)?;
        let arguments = if self.eat(TokenType::ParenL)? {
            self.parse_expr_list(
                TokenType::ParenR,
                self.version() >= EcmaVersion::ES2017,
                false,
                None,
            )?
            .into_iter()
            .flatten()
            .collect()
        } else {
            Vec::new()
        };
        Ok(self.finish_node(
            marker,
            NodeKind::NewExpression {
                callee: Box::new(callee),
                arguments,
            },
        ))
    }

    /// `import(...)` or `import.meta`
    fn parse_expr_import(&mut self, for_new: bool) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        match self.tok.ty {
            TokenType::ParenL if !for_new => self.parse_dynamic_import(marker),
            TokenType::Dot => {
                let meta = self.finish_node(
                    marker,
                    NodeKind::Identifier {
                        name: "import".to_string(),
                    },
                );
                self.parse_import_meta(marker, meta)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_dynamic_import(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let source = self.parse_maybe_assign(ForInit::No, None)?;
        let mut options = None;
        if self.version() >= EcmaVersion::Experimental {
            if !self.eat(TokenType::ParenR)? {
                self.expect(TokenType::Comma)?;
                if !self.after_trailing_comma(TokenType::ParenR, true)? {
                    options = Some(Box::new(self.parse_maybe_assign(ForInit::No, None)?));
                    if !self.eat(TokenType::ParenR)? {
                        self.expect(TokenType::Comma)?;
                        if !self.after_trailing_comma(TokenType::ParenR, true)? {
                            return Err(self.unexpected());
                        }
                    }
                }
            }
        } else if !self.eat(TokenType::ParenR)? {
            let error_pos = self.tok.start;
            if self.eat(TokenType::Comma)? && self.eat(TokenType::ParenR)? {
                self.raise_recoverable(
                    error_pos,
                    ErrorCode::UnexpectedToken,
                    "Trailing comma is not allowed in import()",
                )?;
            } else {
                return Err(self.unexpected_at(error_pos));
            }
        }
        Ok(self.finish_node(
            marker,
            NodeKind::ImportExpression {
                source: Box::new(source),
                options,
            },
        ))
    }

    fn parse_import_meta(&mut self, marker: Marker, meta: Node) -> ParseResult<Node> {
        self.next()?;
        let contains_esc = self.tok.contains_esc;
        let property = self.parse_ident(true)?;
        if property.identifier_name() != Some("meta") {
            self.raise_recoverable(
                property.start,
                ErrorCode::InvalidMetaProperty,
                "The only valid meta property for import is 'import.meta'",
            )?;
        }
        if contains_esc {
            self.raise_recoverable(
                marker.start,
                ErrorCode::InvalidMetaProperty,
                "'import.meta' must not contain escaped characters",
            )?;
        }
        if !self.tok.in_module() && !self.tok.options.allow_import_export_everywhere {
            let message = "Cannot use 'import.meta' outside a module";
            if self.source_type == SourceType::Unknown {
                // Lets `parse` retry the input as a module.
                return Err(self.raise(marker.start, ErrorCode::ImportMetaOutsideModule, message));
            }
            self.raise_recoverable(marker.start, ErrorCode::ImportMetaOutsideModule, message)?;
        }
        Ok(self.finish_node(
            marker,
            NodeKind::MetaProperty {
                meta: Box::new(meta),
                property: Box::new(property),
            },
        ))
    }

    /// Template literal; the current token is the opening backquote
    pub(super) fn parse_template(&mut self, is_tagged: bool) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        let mut expressions = Vec::new();
        let (element, mut tail) = self.parse_template_element(is_tagged)?;
        let mut quasis = vec![element];
        while !tail {
            if self.tok.ty == TokenType::Eof {
                return Err(self.raise(
                    self.tok.pos,
                    ErrorCode::UnterminatedTemplate,
                    "Unterminated template literal",
                ));
            }
            self.expect(TokenType::DollarBraceL)?;
            expressions.push(self.parse_expr(ForInit::No, None)?);
            self.expect(TokenType::BraceR)?;
            let (element, is_tail) = self.parse_template_element(is_tagged)?;
            quasis.push(element);
            tail = is_tail;
        }
        self.next()?;
        Ok(self.finish_node(
            marker,
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            },
        ))
    }

    fn parse_template_element(&mut self, is_tagged: bool) -> ParseResult<(Node, bool)> {
        let marker = self.start_node();
        let value = match &self.tok.value {
            TokenValue::Template { cooked, raw } => TemplateValue {
                cooked: cooked.clone(),
                raw: raw.clone(),
            },
            _ => return Err(self.unexpected()),
        };
        if self.tok.ty == TokenType::InvalidTemplate && !is_tagged {
            self.raise_recoverable(
                self.tok.start,
                ErrorCode::InvalidEscapeSequence,
                "Bad escape sequence in untagged template literal",
            )?;
        }
        self.next()?;
        let tail = self.tok.ty == TokenType::BackQuote;
        let node = self.finish_node(marker, NodeKind::TemplateElement { value, tail });
        Ok((node, tail))
    }

    /// Object literal, or object pattern when `is_pattern`
    pub(super) fn parse_obj(
        &mut self,
        is_pattern: bool,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
        let mut clash = PropertyClash::default();
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.version() >= EcmaVersion::ES5
                    && self.after_trailing_comma(TokenType::BraceR, true)?
                {
                    break;
                }
            }
            let property = self.parse_property(is_pattern, refs.as_deref_mut())?;
            if !is_pattern {
                self.check_prop_clash(&property, &mut clash, refs.as_deref_mut())?;
            }
            properties.push(property);
        }
        let kind = if is_pattern {
            NodeKind::ObjectPattern { properties }
        } else {
            NodeKind::ObjectExpression { properties }
        };
        Ok(self.finish_node(marker, kind))
    }

    fn parse_property(
        &mut self,
        is_pattern: bool,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        if self.version() >= EcmaVersion::ES2018 && self.eat(TokenType::Ellipsis)? {
            if is_pattern {
                let argument = self.parse_ident(false)?;
                if self.tok.ty == TokenType::Comma {
                    self.raise_recoverable(
                        self.tok.start,
                        ErrorCode::TrailingCommaAfterRest,
                        "Comma is not permitted after the rest element",
                    )?;
                }
                return Ok(self.finish_node(
                    marker,
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                ));
            }
            let argument = self.parse_maybe_assign(ForInit::No, refs.as_deref_mut())?;
            if self.tok.ty == TokenType::Comma {
                if let Some(refs) = refs.as_deref_mut() {
                    if refs.trailing_comma.is_none() {
                        refs.trailing_comma = Some(self.tok.start);
                    }
                }
            }
            return Ok(self.finish_node(
                marker,
                NodeKind::SpreadElement {
                    argument: Box::new(argument),
                },
            ));
        }

        let mut is_generator = false;
        if self.version() >= EcmaVersion::ES2015 && !is_pattern {
            is_generator = self.eat(TokenType::Star)?;
        }
        let contains_esc = self.tok.contains_esc;
        let (mut key, mut computed) = self.parse_property_name()?;
        let mut is_async = false;
        if !is_pattern
            && !contains_esc
            && self.version() >= EcmaVersion::ES2017
            && !is_generator
            && self.is_async_prop(&key, computed)
        {
            is_async = true;
            is_generator = self.version() >= EcmaVersion::ES2018 && self.eat(TokenType::Star)?;
            (key, computed) = self.parse_property_name()?;
        }
        self.parse_property_value(
            marker,
            key,
            computed,
            PropertyFlags {
                is_pattern,
                is_generator,
                is_async,
                contains_esc,
            },
            refs,
        )
    }

    fn is_async_prop(&self, key: &Node, computed: bool) -> bool {
        !computed
            && key.identifier_name() == Some("async")
            && (matches!(
                self.tok.ty,
                TokenType::Name
                    | TokenType::Num
                    | TokenType::String
                    | TokenType::BracketL
                    | TokenType::BigInt
            ) || self.tok.ty.keyword().is_some()
                || (self.version() >= EcmaVersion::ES2018 && self.tok.ty == TokenType::Star))
            && !self.tok.has_line_break(self.tok.last_tok_end, self.tok.start)
    }

    fn parse_property_value(
        &mut self,
        marker: Marker,
        key: Node,
        computed: bool,
        flags: PropertyFlags,
        mut refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let PropertyFlags {
            is_pattern,
            is_generator,
            is_async,
            contains_esc,
        } = flags;
        if (is_generator || is_async) && self.tok.ty == TokenType::Colon {
            return Err(self.unexpected());
        }

        if self.eat(TokenType::Colon)? {
            let value = if is_pattern {
                let (start, loc) = (self.tok.start, self.tok.start_loc);
                self.parse_maybe_default(start, loc, None)?
            } else {
                self.parse_maybe_assign(ForInit::No, refs)?
            };
            return Ok(self.property(marker, key, value, PropertyKind::Init, false, false, computed));
        }

        if self.version() >= EcmaVersion::ES2015 && self.tok.ty == TokenType::ParenL {
            if is_pattern {
                return Err(self.unexpected());
            }
            let value = self.parse_method(is_generator, is_async, false)?;
            return Ok(self.property(marker, key, value, PropertyKind::Init, true, false, computed));
        }

        let accessor = match key.identifier_name() {
            Some("get") => Some(PropertyKind::Get),
            Some("set") => Some(PropertyKind::Set),
            _ => None,
        };
        if let Some(kind) = accessor {
            if !is_pattern
                && !contains_esc
                && !computed
                && self.version() >= EcmaVersion::ES5
                && !matches!(
                    self.tok.ty,
                    TokenType::Comma | TokenType::BraceR | TokenType::Eq
                )
            {
                if is_generator || is_async {
                    return Err(self.unexpected());
                }
                let (key, computed) = self.parse_property_name()?;
                let value = self.parse_method(false, false, false)?;
                self.check_accessor_arity(kind == PropertyKind::Get, &value)?;
                return Ok(self.property(marker, key, value, kind, false, false, computed));
            }
        }

        if self.version() >= EcmaVersion::ES2015 && !computed {
            if let Some(name) = key.identifier_name().map(str::to_string) {
                if is_generator || is_async {
                    return Err(self.unexpected());
                }
                self.check_unreserved(&name, key.start, key.end)?;
                if name == "await" && self.await_ident_pos.is_none() {
                    self.await_ident_pos = Some(marker.start);
                }
                let value = if is_pattern {
                    self.parse_maybe_default(marker.start, marker.loc, Some(key.clone()))?
                } else if self.tok.ty == TokenType::Eq && refs.is_some() {
                    if let Some(refs) = refs.as_deref_mut() {
                        if refs.shorthand_assign.is_none() {
                            refs.shorthand_assign = Some(self.tok.start);
                        }
                    }
                    self.parse_maybe_default(marker.start, marker.loc, Some(key.clone()))?
                } else {
                    key.clone()
                };
                return Ok(self.property(marker, key, value, PropertyKind::Init, false, true, false));
            }
        }
        Err(self.unexpected())
    }

    #[allow(clippy::too_many_arguments)]
    fn property(
        &mut self,
        marker: Marker,
        key: Node,
        value: Node,
        kind: PropertyKind,
        method: bool,
        shorthand: bool,
        computed: bool,
    ) -> Node {
        self.finish_node(
            marker,
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                method,
                shorthand,
                computed,
            },
        )
    }

    /// Getter and setter parameter counts
    pub(super) fn check_accessor_arity(&mut self, is_getter: bool, value: &Node) -> ParseResult<()> {
        let NodeKind::FunctionExpression(function) = &value.kind else {
            return Ok(());
        };
        if is_getter {
            if !function.params.is_empty() {
                self.raise_recoverable(
                    value.start,
                    ErrorCode::GetterArity,
                    "getter should have no params",
                )?;
            }
        } else if function.params.len() != 1 {
            self.raise_recoverable(
                value.start,
                ErrorCode::SetterArity,
                "setter should have exactly one param",
            )?;
        } else if matches!(function.params[0].kind, NodeKind::RestElement { .. }) {
            self.raise_recoverable(
                function.params[0].start,
                ErrorCode::SetterRestParameter,
                "Setter cannot use rest params",
            )?;
        }
        Ok(())
    }

    /// Property key; the flag is true for `[computed]` keys
    pub(super) fn parse_property_name(&mut self) -> ParseResult<(Node, bool)> {
        if self.version() >= EcmaVersion::ES2015 && self.eat(TokenType::BracketL)? {
            let key = self.parse_maybe_assign(ForInit::No, None)?;
            self.expect(TokenType::BracketR)?;
            return Ok((key, true));
        }
        let key = if matches!(
            self.tok.ty,
            TokenType::Num | TokenType::String | TokenType::BigInt
        ) {
            self.parse_literal()?
        } else {
            self.parse_ident(self.tok.options.allow_reserved != AllowReserved::Never)?
        };
        Ok((key, false))
    }

    /// Duplicate `__proto__` and, before ES2015, duplicate keys
    fn check_prop_clash(
        &mut self,
        property: &Node,
        clash: &mut PropertyClash,
        refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<()> {
        let NodeKind::Property {
            key,
            kind,
            method,
            shorthand,
            computed,
            ..
        } = &property.kind
        else {
            return Ok(());
        };
        if self.version() >= EcmaVersion::ES2015 && (*computed || *method || *shorthand) {
            return Ok(());
        }
        let name = match &key.kind {
            NodeKind::Identifier { name } => name.clone(),
            NodeKind::Literal { value, .. } => match value {
                LiteralValue::String(value) | LiteralValue::BigInt(value) => value.clone(),
                LiteralValue::Number(value) => number_key(*value),
                LiteralValue::Boolean(value) => value.to_string(),
                LiteralValue::Null => "null".to_string(),
                LiteralValue::RegExp(_) => return Ok(()),
            },
            _ => return Ok(()),
        };

        if self.version() >= EcmaVersion::ES2015 {
            if name == "__proto__" && *kind == PropertyKind::Init {
                if clash.proto {
                    match refs {
                        Some(refs) => {
                            if refs.double_proto.is_none() {
                                refs.double_proto = Some(key.start);
                            }
                        }
                        None => self.raise_recoverable(
                            key.start,
                            ErrorCode::DuplicateProto,
                            "Redefinition of __proto__ property",
                        )?,
                    }
                }
                clash.proto = true;
            }
            return Ok(());
        }

        let slot = match kind {
            PropertyKind::Init => 0,
            PropertyKind::Get => 1,
            PropertyKind::Set => 2,
        };
        let redefinition = match clash.seen.get(&name) {
            Some(seen) if slot == 0 => (self.tok.strict && seen[0]) || seen[1] || seen[2],
            Some(seen) => seen[0] || seen[slot],
            None => false,
        };
        clash.seen.entry(name).or_default()[slot] = true;
        if redefinition {
            self.raise_recoverable(
                key.start,
                ErrorCode::DuplicateProperty,
                "Redefinition of property",
            )?;
        }
        Ok(())
    }

    /// Object or class method body; returns a `FunctionExpression`
    pub(super) fn parse_method(
        &mut self,
        is_generator: bool,
        is_async: bool,
        allow_direct_super: bool,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        let saved = self.take_function_positions();
        let mut flags = ScopeFlags::function(is_async, is_generator) | ScopeFlags::SUPER;
        if allow_direct_super {
            flags |= ScopeFlags::DIRECT_SUPER;
        }
        self.enter_scope(flags);
        self.expect(TokenType::ParenL)?;
        let params: Vec<Node> = self
            .parse_binding_list(TokenType::ParenR, false, self.version() >= EcmaVersion::ES2017)?
            .into_iter()
            .flatten()
            .collect();
        self.check_yield_await_in_default_params()?;
        let (body, _) =
            self.parse_function_body(marker.start, None, &params, false, true, ForInit::No)?;
        self.restore_function_positions(saved);
        Ok(self.finish_node(
            marker,
            NodeKind::FunctionExpression(Function {
                id: None,
                params,
                body: Box::new(body),
                generator: is_generator,
                is_async,
                expression: false,
            }),
        ))
    }

    /// Arrow function whose parameters have already been parsed
    pub(super) fn parse_arrow_expression(
        &mut self,
        marker: Marker,
        params: Vec<Node>,
        is_async: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let saved = self.take_function_positions();
        self.enter_scope(ScopeFlags::function(is_async, false) | ScopeFlags::ARROW);
        let params = self.to_assignable_params(params)?;
        let (body, expression) =
            self.parse_function_body(marker.start, None, &params, true, false, for_init)?;
        self.restore_function_positions(saved);
        Ok(self.finish_node(
            marker,
            NodeKind::ArrowFunctionExpression(Function {
                id: None,
                params,
                body: Box::new(body),
                generator: false,
                is_async,
                expression,
            }),
        ))
    }

    /// Function declaration or expression; `function` has been consumed
    pub(super) fn parse_function(
        &mut self,
        marker: Marker,
        flags: FunctionFlags,
        is_async: bool,
        for_init: ForInit,
    ) -> ParseResult<Node> {
        let mut generator = false;
        if self.version() >= EcmaVersion::ES2018
            || (self.version() >= EcmaVersion::ES2015 && !is_async)
        {
            if self.tok.ty == TokenType::Star && flags.contains(FunctionFlags::HANGING) {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::FunctionInSingleStatement,
                    "Generators can only be declared at the top level or inside a block",
                ));
            }
            generator = self.eat(TokenType::Star)?;
        }

        let mut id = None;
        if flags.contains(FunctionFlags::STATEMENT)
            && !(flags.contains(FunctionFlags::NULLABLE_ID) && self.tok.ty != TokenType::Name)
        {
            let ident = self.parse_ident(false)?;
            if !flags.contains(FunctionFlags::HANGING) {
                let binding = if self.tok.strict || generator || is_async {
                    if self.scopes.treat_functions_as_var() {
                        crate::scope::BindingType::Var
                    } else {
                        crate::scope::BindingType::Lexical
                    }
                } else {
                    crate::scope::BindingType::Function
                };
                self.check_lval_simple(&ident, binding, None)?;
            }
            id = Some(ident);
        }

        let saved = self.take_function_positions();
        self.enter_scope(ScopeFlags::function(is_async, generator));
        if !flags.contains(FunctionFlags::STATEMENT) && self.tok.ty == TokenType::Name {
            id = Some(self.parse_ident(false)?);
        }

        self.expect(TokenType::ParenL)?;
        let params: Vec<Node> = self
            .parse_binding_list(TokenType::ParenR, false, self.version() >= EcmaVersion::ES2017)?
            .into_iter()
            .flatten()
            .collect();
        self.check_yield_await_in_default_params()?;
        let (body, _) =
            self.parse_function_body(marker.start, id.as_ref(), &params, false, false, for_init)?;
        self.restore_function_positions(saved);

        let function = Function {
            id: id.map(Box::new),
            params,
            body: Box::new(body),
            generator,
            is_async,
            expression: false,
        };
        let kind = if flags.contains(FunctionFlags::STATEMENT) {
            NodeKind::FunctionDeclaration(function)
        } else {
            NodeKind::FunctionExpression(function)
        };
        Ok(self.finish_node(marker, kind))
    }

    /// Report identifiers that are reserved in the current context
    pub(super) fn check_unreserved(&mut self, name: &str, start: usize, end: usize) -> ParseResult<()> {
        if self.in_generator() && name == "yield" {
            self.raise_recoverable(
                start,
                ErrorCode::YieldIdentifier,
                "Cannot use 'yield' as identifier inside a generator",
            )?;
        }
        if self.in_async() && name == "await" {
            self.raise_recoverable(
                start,
                ErrorCode::AwaitIdentifier,
                "Cannot use 'await' as identifier inside an async function",
            )?;
        }
        if self.scopes.in_class_field_init() && name == "arguments" {
            self.raise_recoverable(
                start,
                ErrorCode::ArgumentsInClassInit,
                "Cannot use 'arguments' in class field initializer",
            )?;
        }
        if self.scopes.in_class_static_block() && matches!(name, "arguments" | "await") {
            let code = if name == "await" {
                ErrorCode::AwaitInStaticBlock
            } else {
                ErrorCode::ArgumentsInClassInit
            };
            return Err(self.raise(
                start,
                code,
                format!("Cannot use {} in class static initialization block", name),
            ));
        }
        if crate::token::is_keyword(name, self.version(), self.tok.in_module()) {
            return Err(self.raise(
                start,
                ErrorCode::UnexpectedReserved,
                format!("Unexpected keyword '{}'", name),
            ));
        }
        if self.version() < EcmaVersion::ES2015 && self.tok.input[start..end].contains('\\') {
            return Ok(());
        }
        let reserved = if self.tok.strict {
            self.is_strict_reserved(name)
        } else {
            self.is_reserved(name)
        };
        if reserved {
            if !self.in_async() && name == "await" {
                self.raise_recoverable(
                    start,
                    ErrorCode::AwaitIdentifier,
                    "Cannot use keyword 'await' outside an async function",
                )?;
            }
            let code = if self.is_reserved(name) {
                ErrorCode::UnexpectedReserved
            } else {
                ErrorCode::UnexpectedStrictReserved
            };
            self.raise_recoverable(start, code, format!("The keyword '{}' is reserved", name))?;
        }
        Ok(())
    }

    /// Identifier; `liberal` accepts keywords, as after `.`
    pub(super) fn parse_ident(&mut self, liberal: bool) -> ParseResult<Node> {
        let marker = self.start_node();
        let name = self.parse_ident_name()?;
        self.tok.next_with(liberal)?;
        let node = self.finish_node(marker, NodeKind::Identifier { name });
        if !liberal {
            if let NodeKind::Identifier { name } = &node.kind {
                let name = name.clone();
                self.check_unreserved(&name, node.start, node.end)?;
                if name == "await" && self.await_ident_pos.is_none() {
                    self.await_ident_pos = Some(node.start);
                }
            }
        }
        Ok(node)
    }

    fn parse_ident_name(&mut self) -> ParseResult<String> {
        if self.tok.ty == TokenType::Name {
            return Ok(self.name_value());
        }
        let Some(keyword) = self.tok.ty.keyword() else {
            return Err(self.unexpected());
        };
        // `class` and `function` pushed a context when read as keywords.
        let after_dot = self.tok.last_tok_end == self.tok.last_tok_start + 1
            && self.tok.byte_at(self.tok.last_tok_start) == b'.';
        if matches!(keyword, "class" | "function") && !after_dot {
            self.tok.pop_context();
        }
        self.tok.ty = TokenType::Name;
        Ok(keyword.to_string())
    }

    /// `#name`, recorded for the enclosing class body
    pub(super) fn parse_private_ident(&mut self) -> ParseResult<Node> {
        if self.tok.ty != TokenType::PrivateId {
            return Err(self.unexpected());
        }
        let marker = self.start_node();
        let name = self.name_value();
        self.next()?;
        let node = self.finish_node(marker, NodeKind::PrivateIdentifier { name: name.clone() });
        if self.tok.options.check_private_fields {
            match self.private_names.last_mut() {
                Some(scope) => scope.used.push((name, node.start)),
                None => {
                    return Err(self.raise(
                        node.start,
                        ErrorCode::UndeclaredPrivateName,
                        format!("Private field '#{}' must be declared in an enclosing class", name),
                    ))
                }
            }
        }
        Ok(node)
    }

    fn parse_yield(&mut self, for_init: ForInit) -> ParseResult<Node> {
        if self.yield_pos.is_none() {
            self.yield_pos = Some(self.tok.start);
        }
        let marker = self.start_node();
        self.next()?;
        let (argument, delegate) = if self.tok.ty == TokenType::Semi
            || self.can_insert_semicolon()
            || (self.tok.ty != TokenType::Star && !self.tok.ty.starts_expr())
        {
            (None, false)
        } else {
            let delegate = self.eat(TokenType::Star)?;
            (Some(Box::new(self.parse_maybe_assign(for_init, None)?)), delegate)
        };
        Ok(self.finish_node(marker, NodeKind::YieldExpression { argument, delegate }))
    }

    fn parse_await(&mut self, for_init: ForInit) -> ParseResult<Node> {
        if self.await_pos.is_none() {
            self.await_pos = Some(self.tok.start);
        }
        let marker = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_unary(None, true, false, for_init)?;
        Ok(self.finish_node(
            marker,
            NodeKind::AwaitExpression {
                argument: Box::new(argument),
            },
        ))
    }

    /// Source text of the current operator token
    fn operator_text(&self) -> String {
        self.tok
            .value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| self.tok.input[self.tok.start..self.tok.end].to_string())
    }
}

#[derive(Debug, Clone, Copy)]
struct PropertyFlags {
    is_pattern: bool,
    is_generator: bool,
    is_async: bool,
    contains_esc: bool,
}

fn is_simple_assign_target(node: &Node) -> bool {
    match &node.kind {
        NodeKind::ParenthesizedExpression { expression } => is_simple_assign_target(expression),
        NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } => true,
        _ => false,
    }
}

fn is_local_variable_access(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Identifier { .. } => true,
        NodeKind::ParenthesizedExpression { expression } => is_local_variable_access(expression),
        _ => false,
    }
}

fn is_private_field_access(node: &Node) -> bool {
    match &node.kind {
        NodeKind::MemberExpression { property, .. } => {
            matches!(property.kind, NodeKind::PrivateIdentifier { .. })
        }
        NodeKind::ChainExpression { expression } => is_private_field_access(expression),
        NodeKind::ParenthesizedExpression { expression } => is_private_field_access(expression),
        _ => false,
    }
}

/// Property key of a numeric literal, formatted the way `String(n)` does
fn number_key(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == value.trunc() && value.abs() < 1e21 {
        return format!("{}", value as i128);
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::number_key;
    use crate::ast::{LiteralValue, NodeKind};
    use crate::options::{EcmaVersion, ParserOptions};
    use core_types::ErrorCode;

    fn operator(node: &NodeKind) -> &str {
        match node {
            NodeKind::BinaryExpression { operator, .. }
            | NodeKind::LogicalExpression { operator, .. }
            | NodeKind::AssignmentExpression { operator, .. } => operator,
            other => panic!("no operator on {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let expr = expression("a + b * c ** d ** e");
        let NodeKind::BinaryExpression { operator, right, .. } = &expr.kind else {
            panic!("not binary");
        };
        assert_eq!(operator, "+");
        let NodeKind::BinaryExpression { right: power, .. } = &right.kind else {
            panic!("not binary");
        };
        // `**` is right associative.
        let NodeKind::BinaryExpression { left, right, .. } = &power.kind else {
            panic!("not binary");
        };
        assert_eq!(left.identifier_name(), Some("c"));
        assert_eq!(operator_of(right), "**");
    }

    fn operator_of(node: &crate::ast::Node) -> &str {
        operator(&node.kind)
    }

    #[test]
    fn test_logical_and_coalesce() {
        assert_eq!(operator_of(&expression("a ?? b")), "??");
        assert_eq!(operator_of(&expression("a || b && c")), "||");
        assert_eq!(script_error("a ?? b || c"), ErrorCode::MixedCoalesce);
        assert_eq!(script_error("a && b ?? c"), ErrorCode::MixedCoalesce);
        assert!(script("(a ?? b) || c; a ?? (b && c)").is_ok());
    }

    #[test]
    fn test_unary_exponent_needs_parens() {
        assert_eq!(script_error("-a ** 2"), ErrorCode::UnparenthesizedUnaryExponent);
        assert!(script("(-a) ** 2; -(a ** 2); a ** -b").is_ok());
    }

    #[test]
    fn test_arrow_versus_sequence() {
        assert_eq!(expression("(a, b) => a").type_name(), "ArrowFunctionExpression");
        let sequence = expression("(a, b)");
        assert_eq!(sequence.type_name(), "SequenceExpression");
        assert_eq!((sequence.start, sequence.end), (1, 5));
        assert_eq!(expression("async (a) => a").type_name(), "ArrowFunctionExpression");
        assert_eq!(expression("async(a)").type_name(), "CallExpression");
        assert_eq!(expression("async a => a").type_name(), "ArrowFunctionExpression");
        assert_eq!(script_error("()"), ErrorCode::UnexpectedToken);
        assert_eq!(script_error("(a, ...b)"), ErrorCode::UnexpectedToken);
        assert_eq!(script_error("(a)\n=> a"), ErrorCode::LineBreakBeforeArrow);
    }

    #[test]
    fn test_arrow_body_kinds() {
        let NodeKind::ArrowFunctionExpression(concise) = expression("x => x * 2").into_kind() else {
            panic!("not an arrow");
        };
        assert!(concise.expression);
        let NodeKind::ArrowFunctionExpression(block) = expression("x => { return x }").into_kind() else {
            panic!("not an arrow");
        };
        assert!(!block.expression);
        assert_eq!(block.body.type_name(), "BlockStatement");
    }

    #[test]
    fn test_optional_chains() {
        let expr = expression("a?.b.c");
        let NodeKind::ChainExpression { expression: chain } = &expr.kind else {
            panic!("not a chain");
        };
        assert_eq!(chain.type_name(), "MemberExpression");
        assert_eq!(expression("a?.[0]?.(1)").type_name(), "ChainExpression");
        assert_eq!(script_error("new a?.b()"), ErrorCode::OptionalChainNewCallee);
        assert_eq!(script_error("a?.b`c`"), ErrorCode::OptionalChainTemplate);
        assert_eq!(script_error("a?.b = 1"), ErrorCode::InvalidLhsInAssignment);
    }

    #[test]
    fn test_regexp_in_operand_position() {
        let expr = expression("x = /=ab/g");
        let NodeKind::AssignmentExpression { right, .. } = &expr.kind else {
            panic!("not an assignment");
        };
        let NodeKind::Literal { value, raw } = &right.kind else {
            panic!("not a literal");
        };
        assert!(matches!(value, LiteralValue::RegExp(_)));
        assert_eq!(raw, "/=ab/g");
        assert_eq!(expression("a / b / c").type_name(), "BinaryExpression");
    }

    #[test]
    fn test_object_literals() {
        let expr = expression("({ a, b: 1, [c]: 2, d() {}, get e() { return 1 }, set e(v) {}, async *f() {}, ...g })");
        let NodeKind::ObjectExpression { properties } = &expr.kind else {
            panic!("not an object");
        };
        assert_eq!(properties.len(), 8);
        assert_eq!(properties[7].type_name(), "SpreadElement");
        assert_eq!(script_error("({ a = 1 })"), ErrorCode::ShorthandPropertyAssignment);
        assert!(script("({ a = 1 } = b)").is_ok());
        assert_eq!(script_error("({ get a(b) {} })"), ErrorCode::GetterArity);
        assert_eq!(script_error("({ set a() {} })"), ErrorCode::SetterArity);
        assert_eq!(script_error("({ set a(...b) {} })"), ErrorCode::SetterRestParameter);
    }

    #[test]
    fn test_duplicate_proto() {
        assert_eq!(script_error("({ __proto__: 1, __proto__: 2 })"), ErrorCode::DuplicateProto);
        assert!(script("({ __proto__: 1, __proto__: 2 } = a)").is_ok());
        assert!(script("({ __proto__: 1, ['__proto__']: 2, __proto__() {} })").is_ok());
    }

    #[test]
    fn test_es5_duplicate_keys() {
        let es5 = || ParserOptions::default().with_ecma_version(EcmaVersion::ES5);
        assert!(with_options("({ a: 1, a: 2 })", es5()).is_ok());
        assert_eq!(
            with_options("'use strict'; ({ a: 1, 'a': 2 })", es5()).unwrap_err().code,
            ErrorCode::DuplicateProperty
        );
        assert_eq!(
            with_options("({ get a() {}, a: 1 })", es5()).unwrap_err().code,
            ErrorCode::DuplicateProperty
        );
        assert_eq!(
            with_options("({ 1: 1, 1.0: 2, get 1() {} })", es5()).unwrap_err().code,
            ErrorCode::DuplicateProperty
        );
    }

    #[test]
    fn test_number_keys() {
        assert_eq!(number_key(1.0), "1");
        assert_eq!(number_key(0.5), "0.5");
        assert_eq!(number_key(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_templates() {
        let expr = expression("`a${b}c${d}`");
        let NodeKind::TemplateLiteral { quasis, expressions } = &expr.kind else {
            panic!("not a template");
        };
        assert_eq!(quasis.len(), 3);
        assert_eq!(expressions.len(), 2);
        assert_eq!(expression("tag`\\unicode`").type_name(), "TaggedTemplateExpression");
        assert_eq!(script_error("`\\unicode`"), ErrorCode::InvalidEscapeSequence);
    }

    #[test]
    fn test_new_and_meta_properties() {
        let expr = expression("new a.b.c(1)");
        let NodeKind::NewExpression { callee, arguments } = &expr.kind else {
            panic!("not new");
        };
        assert_eq!(callee.type_name(), "MemberExpression");
        assert_eq!(arguments.len(), 1);
        assert_eq!(expression("new new a()()").type_name(), "NewExpression");
        assert!(script("function f() { return new.target }").is_ok());
        assert_eq!(script_error("new.target"), ErrorCode::NewTargetOutsideFunction);
        assert_eq!(script_error("function f() { new.foo }"), ErrorCode::InvalidMetaProperty);
        assert!(module("import.meta.url").is_ok());
        assert_eq!(script_error("import.meta"), ErrorCode::ImportMetaOutsideModule);
    }

    #[test]
    fn test_dynamic_import() {
        assert_eq!(expression("import('a')").type_name(), "ImportExpression");
        assert_eq!(script_error("import('a', 'b')"), ErrorCode::UnexpectedToken);
        let experimental = ParserOptions::default().with_ecma_version(EcmaVersion::Experimental);
        assert!(with_options("import('a', { with: {} })", experimental).is_ok());
        assert_eq!(script_error("new import('a')"), ErrorCode::UnexpectedToken);
    }

    #[test]
    fn test_yield_and_await() {
        assert!(script("function* g() { yield; yield 1; yield* g(); }").is_ok());
        assert!(script("var yield = 1; var await = 2;").is_ok());
        assert_eq!(script_error("function* g() { var yield; }"), ErrorCode::YieldIdentifier);
        assert!(script("async function f() { await x; }").is_ok());
        assert_eq!(script_error("async function f() { var await; }"), ErrorCode::AwaitIdentifier);
        assert_eq!(script_error("function* g(a = yield) {}"), ErrorCode::YieldInParameter);
        assert_eq!(
            script_error("async function f() { (a = await 1) => a }"),
            ErrorCode::AwaitInParameter
        );
        assert!(module("await x;").is_ok());
    }

    #[test]
    fn test_super_and_private_names() {
        assert_eq!(script_error("super.a"), ErrorCode::SuperOutsideMethod);
        assert!(script("({ m() { return super.m() } })").is_ok());
        assert_eq!(script_error("({ m() { super() } })"), ErrorCode::SuperCallOutsideConstructor);
        assert!(script("class A { #x; m(o) { return #x in o } }").is_ok());
        assert_eq!(script_error("class A { #x; m() { delete this.#x } }"), ErrorCode::PrivateNameDelete);
        assert_eq!(script_error("this.#x"), ErrorCode::UndeclaredPrivateName);
    }

    #[test]
    fn test_strict_delete() {
        assert_eq!(script_error("'use strict'; delete x;"), ErrorCode::StrictDelete);
        assert!(script("'use strict'; delete x.y;").is_ok());
        assert!(script("delete x;").is_ok());
    }

    #[test]
    fn test_spans() {
        let expr = expression("foo(bar, baz)");
        assert_eq!((expr.start, expr.end), (0, 13));
        assert_eq!(expr.loc.start.column, 0);
        assert_eq!(expr.loc.end.column, 13);
    }
}
