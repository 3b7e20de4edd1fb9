//! Import and export declarations

use super::class::ClassPosition;
use super::expression::FunctionFlags;
use super::{ForInit, Marker, Parser};
use crate::ast::{LiteralValue, Node, NodeKind};
use crate::error::ParseResult;
use crate::options::{AllowReserved, EcmaVersion};
use crate::scope::BindingType;
use crate::token::TokenType;
use core_types::ErrorCode;
use std::collections::HashSet;

impl<'a> Parser<'a> {
    /// `import` declaration; the keyword is the current token
    pub(super) fn parse_import(&mut self, marker: Marker) -> ParseResult<Node> {
        self.next()?;
        let specifiers = if self.tok.ty == TokenType::String {
            Vec::new()
        } else {
            let specifiers = self.parse_import_specifiers()?;
            self.expect_contextual("from")?;
            specifiers
        };
        let source = self.parse_module_source()?;
        let attributes = self.parse_with_clause()?;
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ImportDeclaration {
                specifiers,
                source: Box::new(source),
                attributes,
            },
        ))
    }

    fn parse_import_specifiers(&mut self) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        if self.tok.ty == TokenType::Name {
            let marker = self.start_node();
            let local = self.parse_ident(false)?;
            self.check_lval_simple(&local, BindingType::Lexical, None)?;
            nodes.push(self.finish_node(
                marker,
                NodeKind::ImportDefaultSpecifier {
                    local: Box::new(local),
                },
            ));
            if !self.eat(TokenType::Comma)? {
                return Ok(nodes);
            }
        }
        if self.tok.ty == TokenType::Star {
            let marker = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_ident(false)?;
            self.check_lval_simple(&local, BindingType::Lexical, None)?;
            nodes.push(self.finish_node(
                marker,
                NodeKind::ImportNamespaceSpecifier {
                    local: Box::new(local),
                },
            ));
            return Ok(nodes);
        }

        self.expect(TokenType::BraceL)?;
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if !first {
                self.expect(TokenType::Comma)?;
                if self.after_trailing_comma(TokenType::BraceR, true)? {
                    break;
                }
            }
            first = false;
            nodes.push(self.parse_import_specifier()?);
        }
        Ok(nodes)
    }

    fn parse_import_specifier(&mut self) -> ParseResult<Node> {
        let marker = self.start_node();
        let imported = self.parse_module_export_name()?;
        let local = if self.eat_contextual("as")? {
            self.parse_ident(false)?
        } else {
            if let NodeKind::Identifier { name } = &imported.kind {
                self.check_unreserved(name, imported.start, imported.end)?;
            }
            imported.clone()
        };
        self.check_lval_simple(&local, BindingType::Lexical, None)?;
        Ok(self.finish_node(
            marker,
            NodeKind::ImportSpecifier {
                imported: Box::new(imported),
                local: Box::new(local),
            },
        ))
    }

    /// String literal naming the module
    fn parse_module_source(&mut self) -> ParseResult<Node> {
        if self.tok.ty != TokenType::String {
            return Err(self.unexpected());
        }
        self.parse_literal()
    }

    /// `with { key: "value", ... }` import attributes
    fn parse_with_clause(&mut self) -> ParseResult<Vec<Node>> {
        if self.version() < EcmaVersion::Experimental || !self.eat(TokenType::With)? {
            return Ok(Vec::new());
        }
        self.expect(TokenType::BraceL)?;
        let mut attributes = Vec::new();
        let mut keys = HashSet::new();
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if !first {
                self.expect(TokenType::Comma)?;
                if self.after_trailing_comma(TokenType::BraceR, true)? {
                    break;
                }
            }
            first = false;

            let marker = self.start_node();
            let key = if self.tok.ty == TokenType::String {
                self.parse_literal()?
            } else {
                self.parse_ident(self.tok.options.allow_reserved != AllowReserved::Never)?
            };
            self.expect(TokenType::Colon)?;
            if self.tok.ty != TokenType::String {
                return Err(self.unexpected());
            }
            let value = self.parse_literal()?;
            if let Some(name) = export_name(&key) {
                if !keys.insert(name.to_string()) {
                    self.raise_recoverable(
                        key.start,
                        ErrorCode::InvalidImportAttributes,
                        format!("Duplicate attribute key '{}'", name),
                    )?;
                }
            }
            attributes.push(self.finish_node(
                marker,
                NodeKind::ImportAttribute {
                    key: Box::new(key),
                    value: Box::new(value),
                },
            ));
        }
        Ok(attributes)
    }

    /// Identifier or, from ES2022, string literal naming an export
    fn parse_module_export_name(&mut self) -> ParseResult<Node> {
        if self.version() >= EcmaVersion::ES2022 && self.tok.ty == TokenType::String {
            return self.parse_literal();
        }
        self.parse_ident(true)
    }

    /// `export` declaration; the keyword is the current token.
    ///
    /// `decorators` were written in front of `export`. Export names are
    /// only tracked for top-level declarations.
    pub(super) fn parse_export(
        &mut self,
        marker: Marker,
        decorators: Vec<Node>,
        top_level: bool,
    ) -> ParseResult<Node> {
        self.next()?;
        if !decorators.is_empty() {
            let class_follows = self.tok.ty == TokenType::Class
                || (self.tok.ty == TokenType::Default
                    && self.tok.word_at(self.tok.skip_white_space_from(self.tok.end)) == Some("class"));
            if !class_follows {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::InvalidDecorator,
                    "Decorators must precede a class declaration",
                ));
            }
        }

        if self.eat(TokenType::Star)? {
            return self.parse_export_all(marker, top_level);
        }

        if self.eat(TokenType::Default)? {
            if top_level {
                self.check_export("default", self.tok.last_tok_start)?;
            }
            let declaration = self.parse_export_default_declaration(decorators)?;
            return Ok(self.finish_node(
                marker,
                NodeKind::ExportDefaultDeclaration {
                    declaration: Box::new(declaration),
                },
            ));
        }

        if self.should_parse_export_statement() {
            let declaration = if self.tok.ty == TokenType::Class {
                let class_marker = self.start_node();
                self.parse_class(class_marker, ClassPosition::Statement, decorators)?
            } else {
                self.parse_statement(None, false)?
            };
            if top_level {
                self.check_declaration_export(&declaration)?;
            }
            return Ok(self.finish_node(
                marker,
                NodeKind::ExportNamedDeclaration {
                    declaration: Some(Box::new(declaration)),
                    specifiers: Vec::new(),
                    source: None,
                    attributes: Vec::new(),
                },
            ));
        }

        let specifiers = self.parse_export_specifiers(top_level)?;
        let (source, attributes) = if self.eat_contextual("from")? {
            let source = self.parse_module_source()?;
            (Some(Box::new(source)), self.parse_with_clause()?)
        } else {
            for specifier in &specifiers {
                let NodeKind::ExportSpecifier { local, .. } = &specifier.kind else {
                    continue;
                };
                match &local.kind {
                    NodeKind::Identifier { name } => {
                        self.check_unreserved(name, local.start, local.end)?;
                        self.check_local_export(name, local.start);
                    }
                    _ => {
                        return Err(self.raise(
                            local.start,
                            ErrorCode::InvalidExportLocal,
                            "A string literal cannot be used as an exported binding without `from`",
                        ))
                    }
                }
            }
            (None, Vec::new())
        };
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ExportNamedDeclaration {
                declaration: None,
                specifiers,
                source,
                attributes,
            },
        ))
    }

    /// `export * [as name] from "source"` after the `*`
    fn parse_export_all(&mut self, marker: Marker, top_level: bool) -> ParseResult<Node> {
        let exported = if self.version() >= EcmaVersion::ES2020 && self.eat_contextual("as")? {
            let exported = self.parse_module_export_name()?;
            if top_level {
                if let Some(name) = export_name(&exported) {
                    self.check_export(name, exported.start)?;
                }
            }
            Some(Box::new(exported))
        } else {
            None
        };
        self.expect_contextual("from")?;
        let source = self.parse_module_source()?;
        let attributes = self.parse_with_clause()?;
        self.semicolon()?;
        Ok(self.finish_node(
            marker,
            NodeKind::ExportAllDeclaration {
                exported,
                source: Box::new(source),
                attributes,
            },
        ))
    }

    fn parse_export_default_declaration(&mut self, mut decorators: Vec<Node>) -> ParseResult<Node> {
        let is_async = self.is_async_function();
        if self.tok.ty == TokenType::Function || is_async {
            let marker = self.start_node();
            self.next()?;
            if is_async {
                self.next()?;
            }
            let flags = FunctionFlags::STATEMENT | FunctionFlags::NULLABLE_ID;
            return self.parse_function(marker, flags, is_async, ForInit::No);
        }
        let marker = self.start_node();
        if self.tok.ty == TokenType::At && self.version() >= EcmaVersion::Experimental {
            if !decorators.is_empty() {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::InvalidDecorator,
                    "Decorators can be placed before or after 'export', not both",
                ));
            }
            decorators = self.parse_decorators()?;
            if self.tok.ty != TokenType::Class {
                return Err(self.raise(
                    self.tok.start,
                    ErrorCode::InvalidDecorator,
                    "Decorators must precede a class declaration",
                ));
            }
        }
        if self.tok.ty == TokenType::Class {
            return self.parse_class(marker, ClassPosition::NullableStatement, decorators);
        }
        let declaration = self.parse_maybe_assign(ForInit::No, None)?;
        self.semicolon()?;
        Ok(declaration)
    }

    fn should_parse_export_statement(&self) -> bool {
        matches!(
            self.tok.ty,
            TokenType::Var | TokenType::Const | TokenType::Class | TokenType::Function
        ) || (self.tok.ty == TokenType::At && self.version() >= EcmaVersion::Experimental)
            || (self.is_contextual("let") && self.version() >= EcmaVersion::ES2015)
            || self.is_async_function()
    }

    fn parse_export_specifiers(&mut self, top_level: bool) -> ParseResult<Vec<Node>> {
        self.expect(TokenType::BraceL)?;
        let mut nodes = Vec::new();
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if !first {
                self.expect(TokenType::Comma)?;
                if self.after_trailing_comma(TokenType::BraceR, true)? {
                    break;
                }
            }
            first = false;

            let marker = self.start_node();
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_contextual("as")? {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            if top_level {
                if let Some(name) = export_name(&exported) {
                    self.check_export(name, exported.start)?;
                }
            }
            nodes.push(self.finish_node(
                marker,
                NodeKind::ExportSpecifier {
                    local: Box::new(local),
                    exported: Box::new(exported),
                },
            ));
        }
        Ok(nodes)
    }

    /// Record an exported name, reporting duplicates
    fn check_export(&mut self, name: &str, pos: usize) -> ParseResult<()> {
        if !self.exports.insert(name.to_string()) {
            self.raise_recoverable(
                pos,
                ErrorCode::DuplicateExport,
                format!("Duplicate export '{}'", name),
            )?;
        }
        Ok(())
    }

    /// Names bound by an exported declaration
    fn check_declaration_export(&mut self, declaration: &Node) -> ParseResult<()> {
        match &declaration.kind {
            NodeKind::VariableDeclaration { declarations, .. } => {
                for declarator in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = &declarator.kind {
                        self.check_pattern_export(id)?;
                    }
                }
                Ok(())
            }
            NodeKind::FunctionDeclaration(function) => match &function.id {
                Some(id) => self.check_pattern_export(id),
                None => Ok(()),
            },
            NodeKind::ClassDeclaration(class) => match &class.id {
                Some(id) => self.check_pattern_export(id),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn check_pattern_export(&mut self, pattern: &Node) -> ParseResult<()> {
        match &pattern.kind {
            NodeKind::Identifier { name } => self.check_export(name, pattern.start),
            NodeKind::ObjectPattern { properties } => {
                for property in properties {
                    self.check_pattern_export(property)?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements } => {
                for element in elements.iter().flatten() {
                    self.check_pattern_export(element)?;
                }
                Ok(())
            }
            NodeKind::Property { value, .. } => self.check_pattern_export(value),
            NodeKind::AssignmentPattern { left, .. } => self.check_pattern_export(left),
            NodeKind::RestElement { argument } => self.check_pattern_export(argument),
            _ => Ok(()),
        }
    }

    /// Remember a locally exported name not declared at top level so far
    fn check_local_export(&mut self, name: &str, pos: usize) {
        if !self.scopes.top_level_declares(name) {
            self.undefined_exports.push((name.to_string(), pos));
        }
    }
}

/// Name carried by an identifier or string literal
fn export_name(node: &Node) -> Option<&str> {
    match &node.kind {
        NodeKind::Identifier { name } => Some(name),
        NodeKind::Literal {
            value: LiteralValue::String(value),
            ..
        } => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::ast::NodeKind;
    use crate::options::{EcmaVersion, ParserOptions, SourceType};
    use crate::Parser;
    use core_types::ErrorCode;

    fn experimental_module(source: &str) -> crate::error::ParseResult<crate::ast::Node> {
        let options = ParserOptions::default().with_ecma_version(EcmaVersion::Experimental);
        Parser::new(source, SourceType::Module, options).parse()
    }

    #[test]
    fn test_import_forms() {
        let statements = body(
            module(
                "import 'a'; import b from 'b'; import * as c from 'c'; \
                 import d, { e, f as g, 'h-i' as h } from 'd'; import j, * as k from 'j';",
            )
            .unwrap(),
        );
        assert!(statements.iter().all(|s| s.type_name() == "ImportDeclaration"));
        let NodeKind::ImportDeclaration { specifiers, .. } = &statements[3].kind else {
            panic!("not an import");
        };
        let kinds: Vec<_> = specifiers.iter().map(|s| s.type_name()).collect();
        assert_eq!(
            kinds,
            vec!["ImportDefaultSpecifier", "ImportSpecifier", "ImportSpecifier", "ImportSpecifier"]
        );
        assert_eq!(module_error("import { 'a' } from 'a';"), ErrorCode::InvalidDestructuringTarget);
        assert_eq!(module_error("import a from 'a'; let a;"), ErrorCode::VarRedeclaration);
        assert_eq!(module_error("import { if } from 'a';"), ErrorCode::UnexpectedReserved);
    }

    #[test]
    fn test_export_forms() {
        let statements = body(
            module(
                "export var a = 1; export let [b, { c }] = d; export function e() {} \
                 export class F {} export { a as g, b as 'h h' }; export * from 'i'; \
                 export * as ns from 'j'; export { k } from 'k'; export default 1;",
            )
            .unwrap(),
        );
        let kinds: Vec<_> = statements.iter().map(|s| s.type_name()).collect();
        assert_eq!(
            kinds,
            vec![
                "ExportNamedDeclaration",
                "ExportNamedDeclaration",
                "ExportNamedDeclaration",
                "ExportNamedDeclaration",
                "ExportNamedDeclaration",
                "ExportAllDeclaration",
                "ExportAllDeclaration",
                "ExportNamedDeclaration",
                "ExportDefaultDeclaration",
            ]
        );
    }

    #[test]
    fn test_export_default_declarations() {
        for (source, kind) in [
            ("export default function () {}", "FunctionDeclaration"),
            ("export default async function named() {}", "FunctionDeclaration"),
            ("export default class {}", "ClassDeclaration"),
            ("export default (class {});", "ClassExpression"),
            ("export default a = 1;", "AssignmentExpression"),
        ] {
            let statements = body(module(source).unwrap());
            let NodeKind::ExportDefaultDeclaration { declaration } = &statements[0].kind else {
                panic!("not a default export: {}", source);
            };
            assert_eq!(declaration.type_name(), kind, "{}", source);
        }
    }

    #[test]
    fn test_duplicate_and_undefined_exports() {
        assert_eq!(module_error("export var a; export { a };"), ErrorCode::DuplicateExport);
        assert_eq!(module_error("export default 1; export default 2;"), ErrorCode::DuplicateExport);
        assert_eq!(
            module_error("export function f() {} export * as f from 'f';"),
            ErrorCode::DuplicateExport
        );
        assert_eq!(module_error("export { missing };"), ErrorCode::UndefinedExport);
        assert!(module("export { later }; var later;").is_ok());
        assert!(module("let a; export { a as b, a as c };").is_ok());
        assert_eq!(module_error("export { 'a' };"), ErrorCode::InvalidExportLocal);
        assert!(module("export { 'a' } from 'a';").is_ok());
    }

    #[test]
    fn test_import_attributes() {
        assert!(experimental_module("import a from 'a' with { type: 'json' };").is_ok());
        assert!(experimental_module("export * from 'a' with { 'type': 'json', };").is_ok());
        assert_eq!(
            experimental_module("import a from 'a' with { type: 'json', type: 'css' };")
                .unwrap_err()
                .code,
            ErrorCode::InvalidImportAttributes
        );
        assert_eq!(
            experimental_module("import a from 'a' with { type: json };").unwrap_err().code,
            ErrorCode::UnexpectedToken
        );
        assert_eq!(module_error("import a from 'a' with { type: 'json' };"), ErrorCode::UnexpectedToken);
    }

    #[test]
    fn test_decorated_exports() {
        assert!(experimental_module("@a export class A {}").is_ok());
        assert!(experimental_module("export @a class A {}").is_ok());
        assert!(experimental_module("export default @a class {}").is_ok());
        assert!(experimental_module("@a export default class {}").is_ok());
        assert_eq!(
            experimental_module("@a export const b = 1;").unwrap_err().code,
            ErrorCode::InvalidDecorator
        );
        assert_eq!(
            experimental_module("@a export default @b class {}").unwrap_err().code,
            ErrorCode::InvalidDecorator
        );
    }

    #[test]
    fn test_unknown_source_type_retries_as_module() {
        let mut parser = Parser::new("import a from 'a';", SourceType::Unknown, ParserOptions::default());
        let program = parser.parse().unwrap();
        assert!(matches!(
            program.kind,
            NodeKind::Program {
                source_type: SourceType::Module,
                ..
            }
        ));
        let mut parser = Parser::new("var a = 1;", SourceType::Unknown, ParserOptions::default());
        assert!(matches!(
            parser.parse().unwrap().kind,
            NodeKind::Program {
                source_type: SourceType::Script,
                ..
            }
        ));
    }
}
