//! Assignment targets and binding patterns
//!
//! Expressions parsed before their role is known are converted into
//! patterns here, and every binding is checked and declared on the scope
//! stack.

use super::{DestructuringErrors, ForInit, Marker, Parser};
use crate::ast::{Node, NodeKind, PropertyKind};
use crate::error::ParseResult;
use crate::options::EcmaVersion;
use crate::scope::BindingType;
use crate::token::TokenType;
use core_types::{ErrorCode, SourcePosition};
use std::collections::HashSet;

impl<'a> Parser<'a> {
    /// Reinterpret an expression as an assignment or binding target
    pub(super) fn to_assignable(
        &mut self,
        node: Node,
        is_binding: bool,
        refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        if self.version() < EcmaVersion::ES2015 {
            self.check_pattern_errors(refs, true)?;
            return Ok(node);
        }
        let (start, end, loc) = (node.start, node.end, node.loc);
        let kind = match node.into_kind() {
            NodeKind::Identifier { name } => {
                if self.in_async() && name == "await" {
                    return Err(self.raise(
                        start,
                        ErrorCode::AwaitIdentifier,
                        "Cannot use 'await' as identifier inside an async function",
                    ));
                }
                NodeKind::Identifier { name }
            }
            kind @ (NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. }) => kind,
            NodeKind::ObjectExpression { properties } => {
                self.check_pattern_errors(refs, true)?;
                let mut converted = Vec::with_capacity(properties.len());
                for property in properties {
                    let property = self.to_assignable(property, is_binding, None)?;
                    if let NodeKind::RestElement { argument } = &property.kind {
                        if matches!(
                            argument.kind,
                            NodeKind::ArrayPattern { .. } | NodeKind::ObjectPattern { .. }
                        ) {
                            return Err(self.raise(
                                argument.start,
                                ErrorCode::InvalidDestructuringTarget,
                                "Unexpected token",
                            ));
                        }
                    }
                    converted.push(property);
                }
                NodeKind::ObjectPattern {
                    properties: converted,
                }
            }
            NodeKind::Property {
                key,
                value,
                kind,
                method,
                shorthand,
                computed,
            } => {
                if kind != PropertyKind::Init || method {
                    return Err(self.raise(
                        key.start,
                        ErrorCode::InvalidDestructuringTarget,
                        "Object pattern can't contain getter or setter",
                    ));
                }
                let value = Box::new(self.to_assignable(*value, is_binding, None)?);
                NodeKind::Property {
                    key,
                    value,
                    kind,
                    method,
                    shorthand,
                    computed,
                }
            }
            NodeKind::ArrayExpression { elements } => {
                self.check_pattern_errors(refs, true)?;
                NodeKind::ArrayPattern {
                    elements: self.to_assignable_list(elements, is_binding)?,
                }
            }
            NodeKind::SpreadElement { argument } => {
                let argument = self.to_assignable(*argument, is_binding, None)?;
                if matches!(argument.kind, NodeKind::AssignmentPattern { .. }) {
                    return Err(self.raise(
                        argument.start,
                        ErrorCode::InvalidDestructuringTarget,
                        "Rest elements cannot have a default value",
                    ));
                }
                NodeKind::RestElement {
                    argument: Box::new(argument),
                }
            }
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                if operator != "=" {
                    return Err(self.raise(
                        left.end,
                        ErrorCode::InvalidLhsInAssignment,
                        "Only '=' operator can be used for specifying default value.",
                    ));
                }
                let left = Box::new(self.to_assignable(*left, is_binding, None)?);
                NodeKind::AssignmentPattern { left, right }
            }
            NodeKind::ParenthesizedExpression { expression } => {
                NodeKind::ParenthesizedExpression {
                    expression: Box::new(self.to_assignable(*expression, is_binding, refs)?),
                }
            }
            kind @ NodeKind::ChainExpression { .. } => {
                self.raise_recoverable(
                    start,
                    ErrorCode::InvalidLhsInAssignment,
                    "Optional chaining cannot appear in left-hand side",
                )?;
                kind
            }
            kind @ NodeKind::MemberExpression { .. } if !is_binding => kind,
            _ => {
                let code = if is_binding {
                    ErrorCode::InvalidDestructuringTarget
                } else {
                    ErrorCode::InvalidLhsInAssignment
                };
                return Err(self.raise(start, code, "Assigning to rvalue"));
            }
        };
        Ok(Node::new(start, end, loc, kind))
    }

    /// Convert the elements of an array literal or an argument list
    pub(super) fn to_assignable_list(
        &mut self,
        elements: Vec<Option<Node>>,
        is_binding: bool,
    ) -> ParseResult<Vec<Option<Node>>> {
        let mut converted = Vec::with_capacity(elements.len());
        for element in elements {
            converted.push(match element {
                Some(element) => Some(self.to_assignable(element, is_binding, None)?),
                None => None,
            });
        }
        if self.version() == EcmaVersion::ES2015 && is_binding {
            if let Some(Some(last)) = converted.last() {
                if let NodeKind::RestElement { argument } = &last.kind {
                    if !matches!(argument.kind, NodeKind::Identifier { .. }) {
                        return Err(self.unexpected_at(argument.start));
                    }
                }
            }
        }
        Ok(converted)
    }

    /// Convert parsed arrow arguments into parameters
    pub(super) fn to_assignable_params(&mut self, params: Vec<Node>) -> ParseResult<Vec<Node>> {
        let params = params.into_iter().map(Some).collect();
        Ok(self
            .to_assignable_list(params, true)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// `...argument` in an expression list
    pub(super) fn parse_spread(
        &mut self,
        refs: Option<&mut DestructuringErrors>,
    ) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_assign(ForInit::No, refs)?;
        Ok(self.finish_node(
            marker,
            NodeKind::SpreadElement {
                argument: Box::new(argument),
            },
        ))
    }

    /// `...pattern` in a binding list
    pub(super) fn parse_rest_binding(&mut self) -> ParseResult<Node> {
        let marker = self.start_node();
        self.next()?;
        if self.version() == EcmaVersion::ES2015 && self.tok.ty != TokenType::Name {
            return Err(self.unexpected());
        }
        let argument = self.parse_binding_atom()?;
        Ok(self.finish_node(
            marker,
            NodeKind::RestElement {
                argument: Box::new(argument),
            },
        ))
    }

    /// Identifier, array pattern or object pattern
    pub(super) fn parse_binding_atom(&mut self) -> ParseResult<Node> {
        self.guarded(|p| p.parse_binding_atom_inner())
    }

    fn parse_binding_atom_inner(&mut self) -> ParseResult<Node> {
        if self.version() >= EcmaVersion::ES2015 {
            match self.tok.ty {
                TokenType::BracketL => {
                    let marker = self.start_node();
                    self.next()?;
                    let elements = self.parse_binding_list(TokenType::BracketR, true, true)?;
                    return Ok(self.finish_node(marker, NodeKind::ArrayPattern { elements }));
                }
                TokenType::BraceL => return self.parse_obj(true, None),
                _ => {}
            }
        }
        self.parse_ident(false)
    }

    /// Comma-separated patterns up to `close`
    pub(super) fn parse_binding_list(
        &mut self,
        close: TokenType,
        allow_empty: bool,
        allow_trailing_comma: bool,
    ) -> ParseResult<Vec<Option<Node>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
            }
            if allow_empty && self.tok.ty == TokenType::Comma {
                elements.push(None);
            } else if allow_trailing_comma && self.after_trailing_comma(close, true)? {
                break;
            } else if self.tok.ty == TokenType::Ellipsis {
                elements.push(Some(self.parse_rest_binding()?));
                if self.tok.ty == TokenType::Comma {
                    self.raise_recoverable(
                        self.tok.start,
                        ErrorCode::TrailingCommaAfterRest,
                        "Comma is not permitted after the rest element",
                    )?;
                }
                self.expect(close)?;
                break;
            } else {
                let (start, loc) = (self.tok.start, self.tok.start_loc);
                let element = self.parse_binding_atom()?;
                elements.push(Some(self.parse_maybe_default(start, loc, Some(element))?));
            }
        }
        Ok(elements)
    }

    /// Optional `= default` after a binding target
    pub(super) fn parse_maybe_default(
        &mut self,
        start: usize,
        loc: SourcePosition,
        left: Option<Node>,
    ) -> ParseResult<Node> {
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if self.version() < EcmaVersion::ES2015 || !self.eat(TokenType::Eq)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(ForInit::No, None)?;
        Ok(self.finish_node(
            Marker { start, loc },
            NodeKind::AssignmentPattern {
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    /// Check a simple target (identifier or member) and declare bindings.
    ///
    /// `clashes` collects parameter names when duplicates are not allowed.
    pub(super) fn check_lval_simple(
        &mut self,
        expr: &Node,
        binding: BindingType,
        clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        let is_bind = binding != BindingType::None;
        match &expr.kind {
            NodeKind::Identifier { name } => {
                if self.tok.strict && self.is_strict_bind_reserved(name) {
                    let code = if matches!(name.as_str(), "eval" | "arguments") {
                        ErrorCode::StrictEvalArguments
                    } else {
                        ErrorCode::UnexpectedStrictReserved
                    };
                    let verb = if is_bind { "Binding" } else { "Assigning to" };
                    self.raise_recoverable(
                        expr.start,
                        code,
                        format!("{} {} in strict mode", verb, name),
                    )?;
                }
                if is_bind {
                    if binding == BindingType::Lexical && name == "let" {
                        self.raise_recoverable(
                            expr.start,
                            ErrorCode::LetInLexicalBinding,
                            "let is disallowed as a lexically bound name",
                        )?;
                    }
                    if let Some(clashes) = clashes {
                        if !clashes.insert(name.clone()) {
                            self.raise_recoverable(
                                expr.start,
                                ErrorCode::DuplicateParameter,
                                "Argument name clash",
                            )?;
                        }
                    }
                    if binding != BindingType::Outside {
                        self.declare_name(name, binding, expr.start)?;
                    }
                }
                Ok(())
            }
            NodeKind::ChainExpression { .. } => self.raise_recoverable(
                expr.start,
                ErrorCode::InvalidLhsInAssignment,
                "Optional chaining cannot appear in left-hand side",
            ),
            NodeKind::MemberExpression { .. } => {
                if is_bind {
                    self.raise_recoverable(
                        expr.start,
                        ErrorCode::InvalidDestructuringTarget,
                        "Binding member expression",
                    )?;
                }
                Ok(())
            }
            NodeKind::ParenthesizedExpression { expression } => {
                if is_bind {
                    self.raise_recoverable(
                        expr.start,
                        ErrorCode::InvalidParenthesizedPattern,
                        "Binding parenthesized body",
                    )?;
                }
                self.check_lval_simple(expression, binding, clashes)
            }
            _ => {
                let code = if is_bind {
                    ErrorCode::InvalidDestructuringTarget
                } else {
                    ErrorCode::InvalidLhsInAssignment
                };
                let verb = if is_bind { "Binding" } else { "Assigning to" };
                Err(self.raise(expr.start, code, format!("{} rvalue", verb)))
            }
        }
    }

    /// Check an assignment or binding target that may be a pattern
    pub(super) fn check_lval_pattern(
        &mut self,
        expr: &Node,
        binding: BindingType,
        mut clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        match &expr.kind {
            NodeKind::ObjectPattern { properties } => {
                for property in properties {
                    self.check_lval_inner_pattern(property, binding, clashes.as_deref_mut())?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements } => {
                for element in elements.iter().flatten() {
                    self.check_lval_inner_pattern(element, binding, clashes.as_deref_mut())?;
                }
                Ok(())
            }
            _ => self.check_lval_simple(expr, binding, clashes),
        }
    }

    fn check_lval_inner_pattern(
        &mut self,
        expr: &Node,
        binding: BindingType,
        clashes: Option<&mut HashSet<String>>,
    ) -> ParseResult<()> {
        match &expr.kind {
            NodeKind::Property { value, .. } => {
                self.check_lval_inner_pattern(value, binding, clashes)
            }
            NodeKind::AssignmentPattern { left, .. } => {
                self.check_lval_pattern(left, binding, clashes)
            }
            NodeKind::RestElement { argument } => {
                self.check_lval_pattern(argument, binding, clashes)
            }
            _ => self.check_lval_pattern(expr, binding, clashes),
        }
    }

    /// `++`/`--` operand
    pub(super) fn check_update_target(&mut self, expr: &Node) -> ParseResult<()> {
        if !is_simple_target(expr) {
            return Err(self.raise(
                expr.start,
                ErrorCode::InvalidLhsInUpdate,
                "Invalid left-hand side expression in prefix/postfix operation",
            ));
        }
        self.check_lval_simple(expr, BindingType::None, None)
    }

    /// Declare function parameters, reporting duplicates unless allowed
    pub(super) fn check_params(&mut self, params: &[Node], allow_duplicates: bool) -> ParseResult<()> {
        let mut names = HashSet::new();
        for param in params {
            let clashes = if allow_duplicates {
                None
            } else {
                Some(&mut names)
            };
            self.check_lval_inner_pattern(param, BindingType::Var, clashes)?;
        }
        Ok(())
    }
}

/// Identifiers and member accesses, possibly parenthesized
pub(super) fn is_simple_target(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Identifier { .. }
        | NodeKind::MemberExpression { .. }
        | NodeKind::ChainExpression { .. } => true,
        NodeKind::ParenthesizedExpression { expression } => is_simple_target(expression),
        _ => false,
    }
}

/// Whether every parameter is a plain identifier
pub(super) fn is_simple_param_list(params: &[Node]) -> bool {
    params
        .iter()
        .all(|param| matches!(param.kind, NodeKind::Identifier { .. }))
}
