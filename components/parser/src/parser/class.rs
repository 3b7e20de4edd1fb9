//! Classes, class elements, private names and decorators

use super::{ForInit, Marker, Parser, PrivateNameKind, PrivateNameScope};
use crate::ast::{Class, LiteralValue, MethodKind, Node, NodeKind};
use crate::error::ParseResult;
use crate::options::EcmaVersion;
use crate::scope::{BindingType, ScopeFlags};
use crate::token::TokenType;
use core_types::ErrorCode;

/// Where a class is being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ClassPosition {
    /// Declaration; the name is required
    Statement,
    /// `export default class`; the name is optional
    NullableStatement,
    Expression,
}

impl ClassPosition {
    fn is_statement(self) -> bool {
        self != ClassPosition::Expression
    }
}

/// Contextual modifiers in front of a class element name
#[derive(Debug, Default)]
struct ElementHead {
    is_static: bool,
    is_async: bool,
    is_generator: bool,
    accessor: Option<MethodKind>,
    /// A modifier that turned out to be the element name
    key_name: Option<&'static str>,
}

impl<'a> Parser<'a> {
    /// Class declaration or expression starting at the `class` keyword
    pub(super) fn parse_class(
        &mut self,
        marker: Marker,
        position: ClassPosition,
        decorators: Vec<Node>,
    ) -> ParseResult<Node> {
        self.expect(TokenType::Class)?;
        let old_strict = self.tok.strict;
        self.tok.strict = true;

        let id = if self.tok.ty == TokenType::Name {
            let id = self.parse_ident(false)?;
            if position.is_statement() {
                self.check_lval_simple(&id, BindingType::Lexical, None)?;
            }
            Some(Box::new(id))
        } else if position == ClassPosition::Statement {
            return Err(self.unexpected());
        } else {
            None
        };

        let super_class = if self.eat(TokenType::Extends)? {
            Some(Box::new(self.parse_expr_subscripts(None, ForInit::No)?))
        } else {
            None
        };

        self.private_names.push(PrivateNameScope::default());
        let body_marker = self.start_node();
        self.expect(TokenType::BraceL)?;
        let mut body = Vec::new();
        let mut had_constructor = false;
        while self.tok.ty != TokenType::BraceR {
            let Some(element) = self.parse_class_element(super_class.is_some())? else {
                continue;
            };
            match &element.kind {
                NodeKind::MethodDefinition {
                    kind: MethodKind::Constructor,
                    ..
                } => {
                    if had_constructor {
                        self.raise_recoverable(
                            element.start,
                            ErrorCode::DuplicateConstructor,
                            "Duplicate constructor in the same class",
                        )?;
                    }
                    had_constructor = true;
                }
                _ => self.declare_private_name(&element)?,
            }
            body.push(element);
        }
        self.tok.strict = old_strict;
        self.next()?;
        let body = self.finish_node(body_marker, NodeKind::ClassBody { body });
        self.exit_class_body()?;

        let class = Class {
            id,
            super_class,
            body: Box::new(body),
            decorators,
        };
        let kind = if position.is_statement() {
            NodeKind::ClassDeclaration(class)
        } else {
            NodeKind::ClassExpression(class)
        };
        Ok(self.finish_node(marker, kind))
    }

    /// Record a private element, rejecting conflicting redeclarations
    fn declare_private_name(&mut self, element: &Node) -> ParseResult<()> {
        let (key, next) = match &element.kind {
            NodeKind::MethodDefinition {
                key,
                kind,
                is_static,
                ..
            } => {
                let next = match (kind, is_static) {
                    (MethodKind::Get, false) => PrivateNameKind::InstanceGetter,
                    (MethodKind::Set, false) => PrivateNameKind::InstanceSetter,
                    (MethodKind::Get, true) => PrivateNameKind::StaticGetter,
                    (MethodKind::Set, true) => PrivateNameKind::StaticSetter,
                    _ => PrivateNameKind::Complete,
                };
                (key, next)
            }
            NodeKind::PropertyDefinition { key, .. } => (key, PrivateNameKind::Complete),
            _ => return Ok(()),
        };
        let NodeKind::PrivateIdentifier { name } = &key.kind else {
            return Ok(());
        };
        let Some(scope) = self.private_names.last_mut() else {
            return Ok(());
        };

        use PrivateNameKind::*;
        let updated = match (scope.declared.get(name).copied(), next) {
            (None, next) => Some(next),
            (Some(InstanceGetter), InstanceSetter)
            | (Some(InstanceSetter), InstanceGetter)
            | (Some(StaticGetter), StaticSetter)
            | (Some(StaticSetter), StaticGetter) => Some(Complete),
            _ => None,
        };
        match updated {
            Some(kind) => {
                scope.declared.insert(name.clone(), kind);
            }
            None => self.raise_recoverable(
                key.start,
                ErrorCode::DuplicatePrivateName,
                format!("Identifier '#{}' has already been declared", name),
            )?,
        }
        Ok(())
    }

    /// Resolve the names used in the class body just finished.
    ///
    /// Names the body does not declare move to the enclosing class, or are
    /// reported when there is none.
    fn exit_class_body(&mut self) -> ParseResult<()> {
        let Some(PrivateNameScope { declared, used }) = self.private_names.pop() else {
            return Ok(());
        };
        if !self.tok.options.check_private_fields {
            return Ok(());
        }
        for (name, start) in used {
            if declared.contains_key(&name) {
                continue;
            }
            match self.private_names.last_mut() {
                Some(parent) => parent.used.push((name, start)),
                None => self.raise_recoverable(
                    start,
                    ErrorCode::UndeclaredPrivateName,
                    format!("Private field '#{}' must be declared in an enclosing class", name),
                )?,
            }
        }
        Ok(())
    }

    /// One class element; `None` for a stray `;`
    fn parse_class_element(&mut self, constructor_allows_super: bool) -> ParseResult<Option<Node>> {
        if self.eat(TokenType::Semi)? {
            return Ok(None);
        }
        let marker = self.start_node();
        let decorators = if self.tok.ty == TokenType::At {
            if self.version() < EcmaVersion::Experimental {
                return Err(self.unexpected());
            }
            self.parse_decorators()?
        } else {
            Vec::new()
        };

        let mut head = ElementHead::default();
        if self.eat_contextual("static")? {
            if self.version() >= EcmaVersion::ES2022 && self.tok.ty == TokenType::BraceL {
                if !decorators.is_empty() {
                    return Err(self.raise(
                        marker.start,
                        ErrorCode::InvalidDecorator,
                        "Decorators are not valid on static blocks",
                    ));
                }
                self.next()?;
                return self.parse_class_static_block(marker).map(Some);
            }
            if self.is_class_element_name_start() || self.tok.ty == TokenType::Star {
                head.is_static = true;
            } else {
                head.key_name = Some("static");
            }
        }
        if head.key_name.is_none()
            && self.version() >= EcmaVersion::ES2017
            && self.eat_contextual("async")?
        {
            if (self.is_class_element_name_start() || self.tok.ty == TokenType::Star)
                && !self.can_insert_semicolon()
            {
                head.is_async = true;
            } else {
                head.key_name = Some("async");
            }
        }
        if head.key_name.is_none()
            && (self.version() >= EcmaVersion::ES2018 || !head.is_async)
            && self.eat(TokenType::Star)?
        {
            head.is_generator = true;
        }
        if head.key_name.is_none() && !head.is_async && !head.is_generator {
            let accessor = if self.is_contextual("get") {
                Some((MethodKind::Get, "get"))
            } else if self.is_contextual("set") {
                Some((MethodKind::Set, "set"))
            } else {
                None
            };
            if let Some((kind, word)) = accessor {
                self.next()?;
                if self.is_class_element_name_start() {
                    head.accessor = Some(kind);
                } else {
                    head.key_name = Some(word);
                }
            }
        }

        let (key, computed) = match head.key_name {
            Some(name) => {
                let key_marker =
                    self.start_node_at(self.tok.last_tok_start, self.tok.last_tok_start_loc);
                let key = self.finish_node(
                    key_marker,
                    NodeKind::Identifier {
                        name: name.to_string(),
                    },
                );
                (key, false)
            }
            None => self.parse_class_element_name()?,
        };

        let is_method = self.version() < EcmaVersion::ES2022
            || self.tok.ty == TokenType::ParenL
            || head.accessor.is_some()
            || head.is_generator
            || head.is_async;
        let element = if is_method {
            self.parse_class_method(marker, key, computed, head, decorators, constructor_allows_super)?
        } else {
            self.parse_class_field(marker, key, computed, head.is_static, decorators)?
        };
        Ok(Some(element))
    }

    fn is_class_element_name_start(&self) -> bool {
        matches!(
            self.tok.ty,
            TokenType::Name
                | TokenType::PrivateId
                | TokenType::Num
                | TokenType::BigInt
                | TokenType::String
                | TokenType::BracketL
        ) || self.tok.ty.keyword().is_some()
    }

    fn parse_class_element_name(&mut self) -> ParseResult<(Node, bool)> {
        if self.tok.ty == TokenType::PrivateId {
            if self.tok.value.as_str() == Some("constructor") {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::PrivateConstructor,
                    "Classes can't have an element named '#constructor'",
                ));
            }
            return Ok((self.parse_private_ident()?, false));
        }
        self.parse_property_name()
    }

    fn parse_class_method(
        &mut self,
        marker: Marker,
        key: Node,
        computed: bool,
        head: ElementHead,
        decorators: Vec<Node>,
        constructor_allows_super: bool,
    ) -> ParseResult<Node> {
        let is_constructor = !head.is_static && has_key_name(&key, computed, "constructor");
        if is_constructor {
            let problem = if head.accessor.is_some() {
                Some("Constructor can't have get/set modifier")
            } else if head.is_generator {
                Some("Constructor can't be a generator")
            } else if head.is_async {
                Some("Constructor can't be an async method")
            } else {
                None
            };
            if let Some(message) = problem {
                return Err(self.raise(key.start, ErrorCode::SpecialConstructor, message));
            }
        } else if head.is_static && has_key_name(&key, computed, "prototype") {
            return Err(self.raise(
                key.start,
                ErrorCode::StaticPrototype,
                "Classes may not have a static property named prototype",
            ));
        }

        let kind = if is_constructor {
            MethodKind::Constructor
        } else {
            head.accessor.unwrap_or(MethodKind::Method)
        };
        let allow_direct_super = is_constructor && constructor_allows_super;
        let value = self.parse_method(head.is_generator, head.is_async, allow_direct_super)?;
        if let Some(accessor) = head.accessor {
            self.check_accessor_arity(accessor == MethodKind::Get, &value)?;
        }
        Ok(self.finish_node(
            marker,
            NodeKind::MethodDefinition {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                computed,
                is_static: head.is_static,
                decorators,
            },
        ))
    }

    fn parse_class_field(
        &mut self,
        marker: Marker,
        key: Node,
        computed: bool,
        is_static: bool,
        decorators: Vec<Node>,
    ) -> ParseResult<Node> {
        if has_key_name(&key, computed, "constructor") {
            return Err(self.raise(
                key.start,
                ErrorCode::ConstructorField,
                "Classes can't have a field named 'constructor'",
            ));
        }
        if is_static && has_key_name(&key, computed, "prototype") {
            return Err(self.raise(
                key.start,
                ErrorCode::StaticPrototype,
                "Classes can't have a static field named 'prototype'",
            ));
        }
        let value = if self.eat(TokenType::Eq)? {
            self.enter_scope(ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::SUPER);
            let value = self.parse_maybe_assign(ForInit::No, None);
            self.exit_scope();
            Some(Box::new(value?))
        } else {
            None
        };
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::PropertyDefinition {
                key: Box::new(key),
                value,
                computed,
                is_static,
                decorators,
            },
        ))
    }

    /// `static { ... }` after the opening brace
    fn parse_class_static_block(&mut self, marker: Marker) -> ParseResult<Node> {
        let old_labels = std::mem::take(&mut self.labels);
        self.enter_scope(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::SUPER);
        let mut body = Vec::new();
        while self.tok.ty != TokenType::BraceR {
            body.push(self.parse_statement(None, false)?);
        }
        self.next()?;
        self.exit_scope();
        self.labels = old_labels;
        Ok(self.finish_node(marker, NodeKind::StaticBlock { body }))
    }

    /// Zero or more `@decorator` entries
    pub(super) fn parse_decorators(&mut self) -> ParseResult<Vec<Node>> {
        let mut decorators = Vec::new();
        while self.tok.ty == TokenType::At {
            let marker = self.start_node();
            self.next()?;
            let expression = self.parse_decorator_expression()?;
            decorators.push(self.finish_node(
                marker,
                NodeKind::Decorator {
                    expression: Box::new(expression),
                },
            ));
        }
        Ok(decorators)
    }

    /// `(expr)`, or a dotted name optionally followed by one argument list
    fn parse_decorator_expression(&mut self) -> ParseResult<Node> {
        let marker = self.start_node();
        if self.eat(TokenType::ParenL)? {
            let expression = self.parse_expr(ForInit::No, None)?;
            self.expect(TokenType::ParenR)?;
            return Ok(self.wrap_parens(marker, expression));
        }

        let mut expression = self.parse_ident(false)?;
        while self.eat(TokenType::Dot)? {
            let property = if self.tok.ty == TokenType::PrivateId {
                self.parse_private_ident()?
            } else {
                self.parse_ident(true)?
            };
            expression = self.finish_node(
                marker,
                NodeKind::MemberExpression {
                    object: Box::new(expression),
                    property: Box::new(property),
                    computed: false,
                    optional: false,
                },
            );
        }
        if self.eat(TokenType::ParenL)? {
            let allow_trailing_comma = self.version() >= EcmaVersion::ES2017;
            let arguments = self
                .parse_expr_list(TokenType::ParenR, allow_trailing_comma, false, None)?
                .into_iter()
                .flatten()
                .collect();
            expression = self.finish_node(
                marker,
                NodeKind::CallExpression {
                    callee: Box::new(expression),
                    arguments,
                    optional: false,
                },
            );
        }
        Ok(expression)
    }
}

/// Non-computed key spelled `name`, as identifier or string
fn has_key_name(key: &Node, computed: bool, name: &str) -> bool {
    if computed {
        return false;
    }
    match &key.kind {
        NodeKind::Identifier { name: key_name } => key_name == name,
        NodeKind::Literal {
            value: LiteralValue::String(value),
            ..
        } => value == name,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::ast::{MethodKind, NodeKind};
    use crate::options::{EcmaVersion, ParserOptions, SourceType};
    use crate::Parser;
    use core_types::ErrorCode;

    fn class_body(source: &str) -> Vec<crate::ast::Node> {
        let statements = body(script(source).unwrap());
        let NodeKind::ClassDeclaration(class) = &statements[0].kind else {
            panic!("not a class declaration");
        };
        match &class.body.kind {
            NodeKind::ClassBody { body } => body.clone(),
            _ => panic!("not a class body"),
        }
    }

    #[test]
    fn test_class_elements() {
        let elements = class_body(
            "class A { constructor() {} static m() {} get x() { return 1 } set x(v) {} \
             async *gen() {} #p = 1; static { this.y = 2 } static = 1; get; async\nm2() {} }",
        );
        let kinds: Vec<_> = elements.iter().map(|element| element.type_name()).collect();
        assert_eq!(
            kinds,
            vec![
                "MethodDefinition",
                "MethodDefinition",
                "MethodDefinition",
                "MethodDefinition",
                "MethodDefinition",
                "PropertyDefinition",
                "StaticBlock",
                "PropertyDefinition",
                "PropertyDefinition",
                "PropertyDefinition",
                "MethodDefinition",
            ]
        );
        assert!(matches!(
            elements[0].kind,
            NodeKind::MethodDefinition {
                kind: MethodKind::Constructor,
                ..
            }
        ));
        assert!(matches!(
            elements[1].kind,
            NodeKind::MethodDefinition {
                is_static: true,
                ..
            }
        ));
        assert!(matches!(
            elements[3].kind,
            NodeKind::MethodDefinition {
                kind: MethodKind::Set,
                ..
            }
        ));
        // `static = 1` and `get;` are fields named by the modifier.
        let NodeKind::PropertyDefinition { key, is_static, .. } = &elements[7].kind else {
            panic!("not a field");
        };
        assert_eq!(key.identifier_name(), Some("static"));
        assert!(!is_static);
    }

    #[test]
    fn test_constructor_rules() {
        assert_eq!(
            script_error("class A { constructor() {} constructor() {} }"),
            ErrorCode::DuplicateConstructor
        );
        assert_eq!(script_error("class A { get constructor() {} }"), ErrorCode::SpecialConstructor);
        assert_eq!(script_error("class A { *constructor() {} }"), ErrorCode::SpecialConstructor);
        assert_eq!(script_error("class A { constructor = 1 }"), ErrorCode::ConstructorField);
        assert_eq!(script_error("class A { #constructor() {} }"), ErrorCode::PrivateConstructor);
        assert_eq!(script_error("class A { static prototype() {} }"), ErrorCode::StaticPrototype);
        assert_eq!(script_error("class A { static prototype = 1 }"), ErrorCode::StaticPrototype);
        assert!(script("class A { static constructor() {} prototype() {} ['constructor'] = 1 }").is_ok());
    }

    #[test]
    fn test_super_in_classes() {
        assert!(script("class A extends B { constructor() { super() } }").is_ok());
        assert_eq!(
            script_error("class A { constructor() { super() } }"),
            ErrorCode::SuperCallOutsideConstructor
        );
        assert_eq!(
            script_error("class A extends B { m() { super() } }"),
            ErrorCode::SuperCallOutsideConstructor
        );
        assert!(script("class A { x = super.y; static { super.z } }").is_ok());
    }

    #[test]
    fn test_private_names() {
        assert!(script("class A { get #a() {} set #a(v) {} }").is_ok());
        assert_eq!(
            script_error("class A { #a; #a; }"),
            ErrorCode::DuplicatePrivateName
        );
        assert_eq!(
            script_error("class A { get #a() {} static set #a(v) {} }"),
            ErrorCode::DuplicatePrivateName
        );
        assert_eq!(script_error("class A { m() { this.#b } }"), ErrorCode::UndeclaredPrivateName);
        assert!(script("class A { #a; m() { class B { n() { this.#a } } } }").is_ok());
        assert!(script("class A { m() { this.#late } #late = 1 }").is_ok());
        let options = ParserOptions::default().with_check_private_fields(false);
        assert!(with_options("class A { m() { this.#b } }", options).is_ok());
    }

    #[test]
    fn test_class_strictness() {
        assert_eq!(script_error("class A { m() { with (a) {} } }"), ErrorCode::StrictWith);
        assert!(script("class A {} with (a) {}").is_ok());
        assert_eq!(script_error("class A { x = arguments }"), ErrorCode::ArgumentsInClassInit);
        assert_eq!(script_error("class A { static { await } }"), ErrorCode::AwaitInStaticBlock);
        assert_eq!(script_error("class {}"), ErrorCode::UnexpectedToken);
        assert!(script("(class {})").is_ok());
        assert_eq!(script_error("class A {} class A {}"), ErrorCode::VarRedeclaration);
    }

    #[test]
    fn test_static_block_labels_are_isolated() {
        assert_eq!(
            script_error("a: while (x) { class A { static { break a; } } }"),
            ErrorCode::UnknownLabel
        );
    }

    #[test]
    fn test_decorators() {
        let options = ParserOptions::default().with_ecma_version(EcmaVersion::Experimental);
        let source = "@a.b @c(1) @(d[0]) class A { @e m() {} @f x; }";
        let mut parser = Parser::new(source, SourceType::Script, options);
        let program = parser.parse().unwrap();
        let NodeKind::ClassDeclaration(class) = &body(program)[0].kind else {
            panic!("not a class declaration");
        };
        assert_eq!(class.decorators.len(), 3);
        let NodeKind::ClassBody { body: elements } = &class.body.kind else {
            panic!("not a class body");
        };
        assert!(matches!(&elements[0].kind, NodeKind::MethodDefinition { decorators, .. } if decorators.len() == 1));
        assert!(matches!(&elements[1].kind, NodeKind::PropertyDefinition { decorators, .. } if decorators.len() == 1));

        assert_eq!(script_error("@a class A {}"), ErrorCode::UnexpectedCharacter);
        let options = ParserOptions::default().with_ecma_version(EcmaVersion::Experimental);
        let error = Parser::new("@a let x;", SourceType::Script, options)
            .parse()
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidDecorator);
    }
}
