//! Recursive descent parser for ECMAScript
//!
//! The parser pulls tokens from a [`Tokenizer`] one at a time and builds an
//! ESTree-shaped [`Node`] tree. Binding analysis runs while parsing: every
//! declaration is recorded on a [`ScopeStack`] so that redeclarations,
//! strict mode violations and misplaced `await`/`yield`/`super` are reported
//! at the point where they are found.
//!
//! Ambiguous prefixes such as `(a, b)` (arrow parameters or a parenthesized
//! sequence) and `{a = 1}` (pattern or object literal) are parsed as
//! expressions first. Errors that only apply to one interpretation are
//! parked in [`DestructuringErrors`] until the ambiguity is resolved.

mod class;
mod expression;
mod lval;
mod module;
mod statement;

use crate::ast::{Node, NodeKind};
use crate::error::{unexpected_eof, ParseResult};
use crate::options::{EcmaVersion, ParserOptions, SourceType};
use crate::scope::{BindingType, ScopeFlags, ScopeStack};
use crate::token::TokenType;
use crate::tokenizer::Tokenizer;
use core_types::{ErrorCode, ParseError, SourceLocation, SourcePosition};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Native stack that must remain before entering a nested production
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each stack segment allocated once the red zone is reached
const STACK_SEGMENT_SIZE: usize = 4 * 1024 * 1024;

/// Whether an expression is the head of a `for` statement.
///
/// Inside a `for` head `in` is not a binary operator, and `for await`
/// heads must not start an `async` arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ForInit {
    No,
    Yes,
    Await,
}

impl ForInit {
    fn is_set(self) -> bool {
        self != ForInit::No
    }
}

/// Start offset and position of a node under construction
#[derive(Debug, Clone, Copy)]
pub(crate) struct Marker {
    start: usize,
    loc: SourcePosition,
}

/// Deferred errors of an expression that may still become a pattern.
///
/// `shorthand_assign` and `double_proto` are errors if the expression stays
/// an expression; `trailing_comma`, `parenthesized_assign` and
/// `parenthesized_bind` are errors if it is reinterpreted as a pattern.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DestructuringErrors {
    shorthand_assign: Option<usize>,
    trailing_comma: Option<usize>,
    parenthesized_assign: Option<usize>,
    parenthesized_bind: Option<usize>,
    double_proto: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Loop,
    Switch,
}

#[derive(Debug, Clone)]
struct Label {
    /// `None` for the implicit labels of loops and switches
    name: Option<String>,
    kind: Option<LabelKind>,
    statement_start: Option<usize>,
}

/// Which accessor halves of a private name have been declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivateNameKind {
    Complete,
    InstanceGetter,
    InstanceSetter,
    StaticGetter,
    StaticSetter,
}

/// Private names of one class body
#[derive(Debug, Default)]
struct PrivateNameScope {
    declared: HashMap<String, PrivateNameKind>,
    /// Names referenced but not (yet) declared, with their offsets
    used: Vec<(String, usize)>,
}

/// ECMAScript parser
///
/// # Examples
///
/// ```
/// use ecma_parser::{NodeKind, Parser, ParserOptions, SourceType};
///
/// let mut parser = Parser::new("let answer = 42;", SourceType::Script, ParserOptions::default());
/// let program = parser.parse().unwrap();
/// match &program.kind {
///     NodeKind::Program { body, .. } => assert_eq!(body.len(), 1),
///     _ => unreachable!(),
/// }
/// ```
pub struct Parser<'a> {
    tok: Tokenizer<'a>,
    source: &'a str,
    range_start: usize,
    range_length: usize,
    source_type: SourceType,
    source_file: Option<String>,

    scopes: ScopeStack,
    labels: Vec<Label>,
    /// First `yield` in the current function's parameters or body
    yield_pos: Option<usize>,
    /// First `await` in the current function's parameters or body
    await_pos: Option<usize>,
    /// First `await` used as an identifier
    await_ident_pos: Option<usize>,
    /// Start of the token where an arrow function may begin
    potential_arrow_at: Option<usize>,
    potential_arrow_in_for_await: bool,
    private_names: Vec<PrivateNameScope>,
    exports: HashSet<String>,
    undefined_exports: Vec<(String, usize)>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over the whole of `input`
    pub fn new(input: &'a str, source_type: SourceType, options: ParserOptions) -> Self {
        Self::with_range(input, 0, input.len(), source_type, None, options)
    }

    /// Create a parser over `input[start..start + length]`
    pub fn with_range(
        input: &'a str,
        start: usize,
        length: usize,
        source_type: SourceType,
        source_file: Option<String>,
        options: ParserOptions,
    ) -> Self {
        let tok = Tokenizer::with_range(
            input,
            start,
            length,
            tokenizer_source_type(source_type),
            source_file.clone(),
            options,
        );
        Self {
            tok,
            source: input,
            range_start: start,
            range_length: length,
            source_type,
            source_file,
            scopes: ScopeStack::new(source_type == SourceType::Module),
            labels: Vec::new(),
            yield_pos: None,
            await_pos: None,
            await_ident_pos: None,
            potential_arrow_at: None,
            potential_arrow_in_for_await: false,
            private_names: Vec::new(),
            exports: HashSet::new(),
            undefined_exports: Vec::new(),
            depth: 0,
        }
    }

    /// Point the parser at a new input, keeping the options
    pub fn reset(
        &mut self,
        input: &'a str,
        start: usize,
        length: usize,
        source_type: SourceType,
        source_file: Option<String>,
    ) {
        self.source = input;
        self.range_start = start;
        self.range_length = length;
        self.source_type = source_type;
        self.source_file = source_file;
        self.restart(tokenizer_source_type(source_type));
    }

    /// Options the parser was created with
    pub fn options(&self) -> &ParserOptions {
        self.tok.options()
    }

    /// Recoverable errors recorded in tolerant mode
    pub fn diagnostics(&self) -> &[ParseError] {
        self.tok.diagnostics()
    }

    /// Parse the input according to the configured source type.
    ///
    /// [`SourceType::Unknown`] parses a script and, when the input turns
    /// out to contain import or export declarations, parses it again as a
    /// module.
    pub fn parse(&mut self) -> ParseResult<Node> {
        match self.source_type {
            SourceType::Unknown => match self.parse_as(SourceType::Script) {
                Err(error)
                    if matches!(
                        error.code,
                        ErrorCode::ModuleDeclarationInScript | ErrorCode::ImportMetaOutsideModule
                    ) =>
                {
                    debug!("module syntax found, parsing again as a module");
                    self.parse_as(SourceType::Module)
                }
                result => result,
            },
            source_type => self.parse_as(source_type),
        }
    }

    /// Parse the input as a classic script
    pub fn parse_script(&mut self) -> ParseResult<Node> {
        self.parse_as(SourceType::Script)
    }

    /// Parse the input as a module
    pub fn parse_module(&mut self) -> ParseResult<Node> {
        self.parse_as(SourceType::Module)
    }

    /// Parse the input as a single expression
    pub fn parse_expression(&mut self) -> ParseResult<Node> {
        self.restart(tokenizer_source_type(self.source_type));
        self.tok.next()?;
        let expr = self.parse_expr(ForInit::No, None)?;
        if self.tok.ty != TokenType::Eof {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn parse_as(&mut self, source_type: SourceType) -> ParseResult<Node> {
        self.restart(source_type);
        debug!(
            ?source_type,
            start = self.range_start,
            length = self.range_length,
            "parse start"
        );
        let marker = self.start_node();
        self.tok.next()?;
        let program = self.parse_top_level(marker, source_type);
        match &program {
            Ok(_) => debug!(diagnostics = self.tok.diagnostics().len(), "parse finished"),
            Err(error) => debug!(code = error.code.as_str(), offset = error.index(), "parse failed"),
        }
        program
    }

    fn restart(&mut self, source_type: SourceType) {
        self.tok.reset(
            self.source,
            self.range_start,
            self.range_length,
            source_type,
            self.source_file.clone(),
        );
        self.scopes.reset(source_type == SourceType::Module);
        self.scopes.enter(ScopeFlags::TOP);
        self.labels.clear();
        self.yield_pos = None;
        self.await_pos = None;
        self.await_ident_pos = None;
        self.potential_arrow_at = None;
        self.potential_arrow_in_for_await = false;
        self.private_names.clear();
        self.exports.clear();
        self.undefined_exports.clear();
        self.depth = 0;
    }

    // Token utilities

    fn version(&self) -> EcmaVersion {
        self.tok.options.ecma_version
    }

    fn next(&mut self) -> ParseResult<()> {
        self.tok.next()
    }

    fn eat(&mut self, ty: TokenType) -> ParseResult<bool> {
        if self.tok.ty == ty {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, ty: TokenType) -> ParseResult<()> {
        if self.eat(ty)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Current token is the identifier `name`, written without escapes
    fn is_contextual(&self, name: &str) -> bool {
        self.tok.ty == TokenType::Name
            && self.tok.value.as_str() == Some(name)
            && !self.tok.contains_esc
    }

    fn eat_contextual(&mut self, name: &str) -> ParseResult<bool> {
        if !self.is_contextual(name) {
            return Ok(false);
        }
        self.next()?;
        Ok(true)
    }

    fn expect_contextual(&mut self, name: &str) -> ParseResult<()> {
        if self.eat_contextual(name)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Name of the current identifier token
    fn name_value(&self) -> String {
        self.tok.value.as_str().unwrap_or_default().to_string()
    }

    fn can_insert_semicolon(&self) -> bool {
        matches!(self.tok.ty, TokenType::Eof | TokenType::BraceR)
            || self.tok.has_line_break(self.tok.last_tok_end, self.tok.start)
    }

    fn insert_semicolon(&mut self) -> bool {
        if !self.can_insert_semicolon() {
            return false;
        }
        let (end, loc) = (self.tok.last_tok_end, self.tok.last_tok_end_loc);
        if let Some(callback) = self.tok.options.on_inserted_semicolon.as_mut() {
            callback(end, loc);
        }
        true
    }

    fn semicolon(&mut self) -> ParseResult<()> {
        if self.eat(TokenType::Semi)? || self.insert_semicolon() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume `close` after a trailing comma; `consume` false leaves it
    fn after_trailing_comma(&mut self, close: TokenType, consume: bool) -> ParseResult<bool> {
        if self.tok.ty != close {
            return Ok(false);
        }
        let (start, loc) = (self.tok.last_tok_start, self.tok.last_tok_start_loc);
        if let Some(callback) = self.tok.options.on_trailing_comma.as_mut() {
            callback(start, loc);
        }
        if consume {
            self.next()?;
        }
        Ok(true)
    }

    // Errors

    fn raise(&self, pos: usize, code: ErrorCode, message: impl Into<String>) -> ParseError {
        self.tok.raise(pos, code, message)
    }

    fn raise_recoverable(
        &mut self,
        pos: usize,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> ParseResult<()> {
        self.tok.raise_recoverable(pos, code, message)
    }

    /// Error for the current token
    fn unexpected(&self) -> ParseError {
        if self.tok.ty == TokenType::Eof {
            return unexpected_eof(self.tok.start_loc)
                .with_source_file(self.source_file.clone());
        }
        let text = &self.tok.input[self.tok.start..self.tok.end];
        self.raise(
            self.tok.start,
            ErrorCode::UnexpectedToken,
            format!("Unexpected token '{}'", text),
        )
    }

    /// Error for the token at `pos`
    fn unexpected_at(&self, pos: usize) -> ParseError {
        if pos == self.tok.start {
            return self.unexpected();
        }
        self.raise(pos, ErrorCode::UnexpectedToken, "Unexpected token")
    }

    // Nodes

    fn start_node(&self) -> Marker {
        Marker {
            start: self.tok.start,
            loc: self.tok.start_loc,
        }
    }

    fn start_node_at(&self, start: usize, loc: SourcePosition) -> Marker {
        Marker { start, loc }
    }

    fn finish_node(&mut self, marker: Marker, kind: NodeKind) -> Node {
        let (end, end_loc) = (self.tok.last_tok_end, self.tok.last_tok_end_loc);
        self.finish_node_at(marker, kind, end, end_loc)
    }

    fn finish_node_at(
        &mut self,
        marker: Marker,
        kind: NodeKind,
        end: usize,
        end_loc: SourcePosition,
    ) -> Node {
        let node = Node::new(
            marker.start,
            end,
            SourceLocation::new(marker.loc, end_loc),
            kind,
        );
        if let Some(callback) = self.tok.options.on_node.as_mut() {
            callback(&node);
        }
        node
    }

    // Recursion guard

    /// Run a nested production under the depth limit, moving to a fresh
    /// stack segment when the native stack runs low
    fn guarded<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.tok.options.max_recursion_depth {
            return Err(self.raise(
                self.tok.start,
                ErrorCode::StackOverflow,
                "Maximum nesting depth exceeded",
            ));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || parse(self));
        self.depth = self.depth.saturating_sub(1);
        result
    }

    // Scopes

    fn enter_scope(&mut self, flags: ScopeFlags) {
        self.scopes.enter(flags);
    }

    fn exit_scope(&mut self) {
        self.scopes.exit();
    }

    fn declare_name(&mut self, name: &str, binding: BindingType, pos: usize) -> ParseResult<()> {
        let declared = self.scopes.declare(name, binding);
        if declared.top_level && self.tok.in_module() {
            self.undefined_exports.retain(|(export, _)| export != name);
        }
        if declared.redeclared {
            self.raise_recoverable(
                pos,
                ErrorCode::VarRedeclaration,
                format!("Identifier '{}' has already been declared", name),
            )?;
        }
        Ok(())
    }

    fn in_function(&self) -> bool {
        self.scopes.in_function()
    }

    fn in_generator(&self) -> bool {
        self.scopes.in_generator()
    }

    fn in_async(&self) -> bool {
        self.scopes.in_async()
    }

    /// `await` is an operator at the current position
    fn can_await(&self) -> bool {
        self.scopes.can_await().unwrap_or_else(|| {
            (self.tok.in_module() && self.version() >= EcmaVersion::ES2022)
                || self.tok.options.allow_await_outside_function
        })
    }

    fn allow_super(&self) -> bool {
        self.scopes.allow_super() || self.tok.options.allow_super_outside_method
    }

    fn allow_new_target(&self) -> bool {
        self.scopes.allow_new_target() || self.tok.options.allow_new_target_outside_function
    }

    /// Report `yield` or `await` expressions found in parameter defaults
    fn check_yield_await_in_default_params(&self) -> ParseResult<()> {
        if let Some(yield_pos) = self.yield_pos {
            if self.await_pos.map_or(true, |await_pos| yield_pos < await_pos) {
                return Err(self.raise(
                    yield_pos,
                    ErrorCode::YieldInParameter,
                    "Yield expression cannot be a default value",
                ));
            }
        }
        if let Some(await_pos) = self.await_pos {
            return Err(self.raise(
                await_pos,
                ErrorCode::AwaitInParameter,
                "Await expression cannot be a default value",
            ));
        }
        Ok(())
    }

    /// Save and clear the per-function `yield`/`await` positions
    fn take_function_positions(&mut self) -> FunctionPositions {
        FunctionPositions {
            yield_pos: self.yield_pos.take(),
            await_pos: self.await_pos.take(),
            await_ident_pos: self.await_ident_pos.take(),
        }
    }

    fn restore_function_positions(&mut self, saved: FunctionPositions) {
        self.yield_pos = saved.yield_pos;
        self.await_pos = saved.await_pos;
        self.await_ident_pos = saved.await_ident_pos;
    }

    // Destructuring errors

    /// Report errors that make an expression invalid as a pattern
    fn check_pattern_errors(
        &mut self,
        refs: Option<&mut DestructuringErrors>,
        is_assign: bool,
    ) -> ParseResult<()> {
        let Some(refs) = refs else {
            return Ok(());
        };
        if let Some(pos) = refs.trailing_comma {
            self.raise_recoverable(
                pos,
                ErrorCode::TrailingCommaAfterRest,
                "Comma is not permitted after the rest element",
            )?;
        }
        let parens = if is_assign {
            refs.parenthesized_assign
        } else {
            refs.parenthesized_bind
        };
        if let Some(pos) = parens {
            if is_assign {
                self.raise_recoverable(
                    pos,
                    ErrorCode::InvalidLhsInAssignment,
                    "Assigning to rvalue",
                )?;
            } else {
                self.raise_recoverable(
                    pos,
                    ErrorCode::InvalidParenthesizedPattern,
                    "Parenthesized pattern",
                )?;
            }
        }
        Ok(())
    }

    /// Whether the expression has errors that only a pattern could excuse
    fn has_expression_errors(refs: Option<&DestructuringErrors>) -> bool {
        refs.is_some_and(|refs| refs.shorthand_assign.is_some() || refs.double_proto.is_some())
    }

    /// Report errors that make a would-be pattern invalid as an expression
    fn check_expression_errors(&mut self, refs: Option<&DestructuringErrors>) -> ParseResult<()> {
        let Some(refs) = refs else {
            return Ok(());
        };
        if let Some(pos) = refs.shorthand_assign {
            return Err(self.raise(
                pos,
                ErrorCode::ShorthandPropertyAssignment,
                "Shorthand property assignments are valid only in destructuring patterns",
            ));
        }
        if let Some(pos) = refs.double_proto {
            self.raise_recoverable(
                pos,
                ErrorCode::DuplicateProto,
                "Redefinition of __proto__ property",
            )?;
        }
        Ok(())
    }

    // Reserved words

    fn is_reserved(&self, name: &str) -> bool {
        self.tok.options.allow_reserved != crate::options::AllowReserved::Yes
            && crate::token::is_reserved_word(name, self.version(), self.tok.in_module())
    }

    fn is_strict_reserved(&self, name: &str) -> bool {
        self.is_reserved(name) || crate::token::is_strict_reserved_word(name)
    }

    fn is_strict_bind_reserved(&self, name: &str) -> bool {
        self.is_strict_reserved(name) || matches!(name, "eval" | "arguments")
    }
}

/// Saved per-function positions, see [`Parser::take_function_positions`]
#[derive(Debug, Clone, Copy)]
struct FunctionPositions {
    yield_pos: Option<usize>,
    await_pos: Option<usize>,
    await_ident_pos: Option<usize>,
}

fn tokenizer_source_type(source_type: SourceType) -> SourceType {
    match source_type {
        SourceType::Unknown => SourceType::Script,
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) fn script(source: &str) -> ParseResult<Node> {
        Parser::new(source, SourceType::Script, ParserOptions::default()).parse()
    }

    pub(crate) fn module(source: &str) -> ParseResult<Node> {
        Parser::new(source, SourceType::Module, ParserOptions::default()).parse()
    }

    pub(crate) fn with_options(source: &str, options: ParserOptions) -> ParseResult<Node> {
        Parser::new(source, SourceType::Script, options).parse()
    }

    /// Error code of a source that must fail as a script
    pub(crate) fn script_error(source: &str) -> ErrorCode {
        match script(source) {
            Ok(program) => panic!("expected {:?} to fail, got {:?}", source, program),
            Err(error) => error.code,
        }
    }

    pub(crate) fn module_error(source: &str) -> ErrorCode {
        match module(source) {
            Ok(program) => panic!("expected {:?} to fail, got {:?}", source, program),
            Err(error) => error.code,
        }
    }

    /// Top-level statements of a program
    pub(crate) fn body(program: Node) -> Vec<Node> {
        match program.into_kind() {
            NodeKind::Program { body, .. } => body,
            other => panic!("not a program: {:?}", other),
        }
    }

    /// Expression of the single expression statement in `source`
    pub(crate) fn expression(source: &str) -> Node {
        let mut statements = body(script(source).unwrap());
        assert_eq!(statements.len(), 1, "{}", source);
        match statements.remove(0).into_kind() {
            NodeKind::ExpressionStatement { expression, .. } => *expression,
            other => panic!("not an expression statement: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_program_spans_whole_input() {
        let program = script("  a;\n b;  ").unwrap();
        assert_eq!(program.start, 0);
        assert_eq!(program.end, 10);
        assert_eq!(program.loc.start.line, 1);
        assert_eq!(program.loc.end.line, 2);
    }

    #[test]
    fn test_unknown_source_type_falls_back_to_module() {
        let mut parser = Parser::new(
            "import a from 'a'; export { a };",
            SourceType::Unknown,
            ParserOptions::default(),
        );
        let program = parser.parse().unwrap();
        match program.into_kind() {
            NodeKind::Program { source_type, body } => {
                assert_eq!(source_type, SourceType::Module);
                assert_eq!(body.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_source_type_prefers_script() {
        let mut parser = Parser::new("with (a) b;", SourceType::Unknown, ParserOptions::default());
        let program = parser.parse().unwrap();
        assert!(matches!(
            program.kind,
            NodeKind::Program {
                source_type: SourceType::Script,
                ..
            }
        ));
    }

    #[test]
    fn test_import_meta_switches_unknown_to_module() {
        let mut parser = Parser::new("import.meta.url", SourceType::Unknown, ParserOptions::default());
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut parser = Parser::new("let a = 1;", SourceType::Script, ParserOptions::default());
        let first = parser.parse().unwrap();
        let second = parser.parse().unwrap();
        assert_eq!(first, second);

        parser.reset("x + y", 0, 5, SourceType::Script, None);
        let third = parser.parse().unwrap();
        assert_eq!(body(third).len(), 1);
    }

    #[test]
    fn test_with_range_offsets_positions() {
        let source = "ignored; a + b; ignored";
        let mut parser = Parser::with_range(
            source,
            9,
            6,
            SourceType::Script,
            None,
            ParserOptions::default(),
        );
        let program = parser.parse().unwrap();
        assert_eq!(program.start, 9);
        assert_eq!(program.end, 15);
        let statements = body(program);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].start, 9);
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let mut parser = Parser::new("a + b", SourceType::Script, ParserOptions::default());
        assert_eq!(parser.parse_expression().unwrap().type_name(), "BinaryExpression");

        let mut parser = Parser::new("a b", SourceType::Script, ParserOptions::default());
        assert_eq!(
            parser.parse_expression().unwrap_err().code,
            ErrorCode::UnexpectedToken
        );
    }

    #[test]
    fn test_recursion_limit() {
        let source = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        let options = ParserOptions::default().with_max_recursion_depth(20);
        let error = with_options(&source, options).unwrap_err();
        assert_eq!(error.code, ErrorCode::StackOverflow);
        assert!(script(&source).is_ok());
    }

    #[test]
    fn test_deep_nesting_on_spawned_thread() {
        std::thread::spawn(|| {
            let blocks = format!("{}{}", "{".repeat(255), "}".repeat(255));
            assert!(script(&blocks).is_ok());

            let arrays = format!("x = {}{}", "[".repeat(255), "]".repeat(255));
            assert_eq!(script(&arrays).unwrap_err().code, ErrorCode::StackOverflow);

            let parens = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
            let options = ParserOptions::default().with_max_recursion_depth(10_000);
            assert!(with_options(&parens, options).is_ok());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_long_chains_parse_and_drop() {
        let members = format!("x = a{}", ".b".repeat(50_000));
        assert!(script(&members).is_ok());
        let sum = format!("x = {}a", "a + ".repeat(100_000));
        assert!(script(&sum).is_ok());
    }

    #[test]
    fn test_tolerant_mode_collects_diagnostics() {
        let options = ParserOptions::default().with_tolerant(true);
        let mut parser = Parser::new("let a; let a; ({ __proto__: 1, __proto__: 2 });", SourceType::Script, options);
        let program = parser.parse().unwrap();
        assert_eq!(body(program).len(), 3);
        let codes: Vec<_> = parser.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::VarRedeclaration, ErrorCode::DuplicateProto]);
    }

    #[test]
    fn test_callbacks_fire() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let semicolons = Rc::new(RefCell::new(Vec::new()));
        let commas = Rc::new(RefCell::new(Vec::new()));
        let semicolon_sink = Rc::clone(&semicolons);
        let comma_sink = Rc::clone(&commas);
        let options = ParserOptions::default()
            .with_on_inserted_semicolon(move |pos, _| semicolon_sink.borrow_mut().push(pos))
            .with_on_trailing_comma(move |pos, _| comma_sink.borrow_mut().push(pos));
        let mut parser = Parser::new("f(a,)\nb", SourceType::Script, options);
        parser.parse().unwrap();
        assert_eq!(*semicolons.borrow(), vec![5, 7]);
        assert_eq!(*commas.borrow(), vec![3]);
    }
}
