//! Contract tests for the ecma_parser API
//!
//! These tests verify the parser component implements its contract correctly.

use core_types::{ErrorCode, ErrorKind, ParseError};
use ecma_parser::{
    adapt_regexp, parse, tokenize, validate_regexp, CommentKind, EcmaVersion, ErrorHandler,
    LiteralValue, NodeKind, Parser, ParserOptions, RegExpOptions, RegExpParseMode,
    RegExpParseResult, SourceType, TokenType, TokenValue, Tokenizer,
};
use std::cell::RefCell;
use std::rc::Rc;

fn parse_script(source: &str) -> Result<ecma_parser::Node, ParseError> {
    parse(source, SourceType::Script, ParserOptions::default())
}

fn program_body(program: ecma_parser::Node) -> Vec<ecma_parser::Node> {
    match program.into_kind() {
        NodeKind::Program { body, .. } => body,
        other => panic!("expected a program, got {}", other.type_name()),
    }
}

// =============================================================================
// Tokenizer Contract Tests
// =============================================================================

#[test]
fn test_tokenize_returns_tokens_without_eof() {
    let tokens = tokenize("let x = 42;", SourceType::Script, ParserOptions::default()).unwrap();
    let types: Vec<_> = tokens.iter().map(|token| token.token_type).collect();
    assert_eq!(
        types,
        vec![
            TokenType::Name,
            TokenType::Name,
            TokenType::Eq,
            TokenType::Num,
            TokenType::Semi
        ]
    );
    assert_eq!(tokens[3].value, TokenValue::Number(42.0));
    assert_eq!((tokens[3].start, tokens[3].end), (8, 10));
}

#[test]
fn test_tokenizer_iterator_yields_results() {
    let tokenizer = Tokenizer::new("a\n/b/g", SourceType::Script, ParserOptions::default());
    let tokens: Vec<_> = tokenizer.into_tokens().collect::<Result<_, _>>().unwrap();
    // After an identifier and a newline, `/` is division.
    assert_eq!(tokens[1].token_type, TokenType::Slash);
}

#[test]
fn test_regexp_after_operator() {
    let tokens = tokenize("x = /a+/gi", SourceType::Script, ParserOptions::default()).unwrap();
    assert_eq!(tokens[2].token_type, TokenType::Regexp);
    let TokenValue::RegExp(value) = &tokens[2].value else {
        panic!("expected a regexp value");
    };
    assert_eq!(value.pattern, "a+");
    assert_eq!(value.flags, "gi");
}

#[test]
fn test_tokenizer_reports_invalid_character() {
    let error = tokenize("a # b", SourceType::Script, ParserOptions::default()).unwrap_err();
    assert_eq!(error.kind, ErrorKind::SyntaxError);
    assert_eq!(error.position.line, 1);
}

// =============================================================================
// Parser Contract Tests
// =============================================================================

#[test]
fn test_parser_new_and_parse() {
    let mut parser = Parser::new("let x = 42;", SourceType::Script, ParserOptions::default());
    let program = parser.parse().unwrap();
    assert_eq!(program.type_name(), "Program");
    assert_eq!((program.start, program.end), (0, 11));
}

#[test]
fn test_parse_expression() {
    let mut parser = Parser::new("a + b * c", SourceType::Script, ParserOptions::default());
    let expr = parser.parse_expression().unwrap();
    let NodeKind::BinaryExpression { operator, right, .. } = &expr.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(operator, "+");
    assert_eq!(right.type_name(), "BinaryExpression");
}

#[test]
fn test_parse_sub_range() {
    let source = "ignored; let x = 1; ignored";
    let mut parser = Parser::with_range(source, 9, 10, SourceType::Script, None, ParserOptions::default());
    let body = program_body(parser.parse().unwrap());
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].start, 9);
}

#[test]
fn test_parser_reports_syntax_error_with_position() {
    let error = parse_script("let x = ;").unwrap_err();
    assert_eq!(error.code, ErrorCode::UnexpectedToken);
    assert_eq!(error.index(), 8);
    assert_eq!(error.position.column, 8);
    assert_eq!(error.to_string(), "Unexpected token ';' (1:8)");
}

#[test]
fn test_parser_error_carries_source_file() {
    let source = "var a = ;";
    let mut parser = Parser::with_range(
        source,
        0,
        source.len(),
        SourceType::Script,
        Some("input.js".to_string()),
        ParserOptions::default(),
    );
    let error = parser.parse().unwrap_err();
    assert_eq!(error.source_file.as_deref(), Some("input.js"));
}

#[test]
fn test_unexpected_end_of_input() {
    let error = parse_script("function f() {").unwrap_err();
    assert_eq!(error.code, ErrorCode::UnexpectedEndOfInput);
}

// =============================================================================
// Language Feature Tests
// =============================================================================

#[test]
fn test_modern_syntax_parses() {
    let sources = [
        "const add = (a, b) => a + b;",
        "const msg = `hello ${name}`;",
        "const { a, b: [c = 1, ...d], ...e } = obj;",
        "const arr = [...other, 1];",
        "async function load() { await data; for await (const x of y); }",
        "class Foo extends Bar { #x = 1; static { init(); } get x() { return this.#x; } }",
        "const x = obj?.prop?.[key]?.(arg);",
        "const x = a ?? b;",
        "a ||= b; c &&= d; e ??= f;",
        "const big = 123n, sep = 1_000_000;",
        "function* gen() { yield* inner(); }",
        "label1: for (var i = 0; i <= 0; i++) { for (;;) { continue label1; } }",
        "var obj = { get await() { return 1; }, set break(v) {}, if: 1 };",
        "{\na:\n1 \n} \n3",
        "var x = 0;\nvar y = 0;\nx\n++y",
    ];
    for source in sources {
        assert!(parse_script(source).is_ok(), "failed to parse: {}", source);
    }
}

#[test]
fn test_module_syntax_parses() {
    let source = "import a, { b as c } from 'm'; export const d = await c; export default a;";
    let program = parse(source, SourceType::Module, ParserOptions::default()).unwrap();
    assert_eq!(program_body(program).len(), 3);
}

#[test]
fn test_ecma_version_gates_syntax() {
    let es5 = ParserOptions::default().with_ecma_version(EcmaVersion::ES5);
    assert!(parse("let\nx", SourceType::Script, es5).is_ok());
    let es5 = ParserOptions::default().with_ecma_version(EcmaVersion::ES5);
    assert!(parse("() => 1", SourceType::Script, es5).is_err());
    let es2019 = ParserOptions::default().with_ecma_version(EcmaVersion::ES2019);
    assert!(parse("a ?? b", SourceType::Script, es2019).is_err());
}

#[test]
fn test_literal_values() {
    let body = program_body(parse_script("'a\\u0062c'; 0x10; 1e3;").unwrap());
    let values: Vec<_> = body
        .iter()
        .map(|statement| match &statement.kind {
            NodeKind::ExpressionStatement { expression, .. } => match &expression.kind {
                NodeKind::Literal { value, .. } => value.clone(),
                _ => panic!("expected a literal"),
            },
            _ => panic!("expected an expression statement"),
        })
        .collect();
    assert_eq!(
        values,
        vec![
            LiteralValue::String("abc".to_string()),
            LiteralValue::Number(16.0),
            LiteralValue::Number(1000.0)
        ]
    );
}

// =============================================================================
// Options And Callbacks
// =============================================================================

#[test]
fn test_on_comment_callback() {
    let comments = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&comments);
    let options = ParserOptions::default().with_on_comment(move |comment| sink.borrow_mut().push(comment.clone()));
    parse("// line\n/* block */ x;", SourceType::Script, options).unwrap();
    let comments = comments.borrow();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].kind, CommentKind::Line);
    assert_eq!(comments[0].text, " line");
    assert_eq!(comments[1].kind, CommentKind::Block);
    assert_eq!(comments[1].text, " block ");
}

#[test]
fn test_on_token_and_on_node_callbacks() {
    let tokens = Rc::new(RefCell::new(0usize));
    let nodes = Rc::new(RefCell::new(Vec::new()));
    let token_sink = Rc::clone(&tokens);
    let node_sink = Rc::clone(&nodes);
    let options = ParserOptions::default()
        .with_on_token(move |_| *token_sink.borrow_mut() += 1)
        .with_on_node(move |node| node_sink.borrow_mut().push(node.type_name()));
    parse("f(1);", SourceType::Script, options).unwrap();
    assert_eq!(*tokens.borrow(), 6);
    assert_eq!(
        *nodes.borrow(),
        vec!["Identifier", "Literal", "CallExpression", "ExpressionStatement", "Program"]
    );
}

#[test]
fn test_inserted_semicolon_and_trailing_comma_callbacks() {
    let semicolons = Rc::new(RefCell::new(Vec::new()));
    let commas = Rc::new(RefCell::new(Vec::new()));
    let semicolon_sink = Rc::clone(&semicolons);
    let comma_sink = Rc::clone(&commas);
    let options = ParserOptions::default()
        .with_on_inserted_semicolon(move |pos, _| semicolon_sink.borrow_mut().push(pos))
        .with_on_trailing_comma(move |pos, _| comma_sink.borrow_mut().push(pos));
    parse("a\nf(b,)", SourceType::Script, options).unwrap();
    assert_eq!(*semicolons.borrow(), vec![1, 7]);
    assert_eq!(*commas.borrow(), vec![5]);
}

#[test]
fn test_tolerant_mode_collects_recoverable_errors() {
    let options = ParserOptions::default().with_tolerant(true);
    let mut parser = Parser::new("'use strict'; var eval; with (a) {}", SourceType::Script, options);
    // `with` in strict mode is not recoverable.
    assert_eq!(parser.parse().unwrap_err().code, ErrorCode::StrictWith);

    let options = ParserOptions::default().with_tolerant(true);
    let mut parser = Parser::new("let a; let a; ({ __proto__: 1, __proto__: 2 });", SourceType::Script, options);
    assert!(parser.parse().is_ok());
    let codes: Vec<_> = parser.diagnostics().iter().map(|error| error.code).collect();
    assert_eq!(codes, vec![ErrorCode::VarRedeclaration, ErrorCode::DuplicateProto]);
}

struct IgnoreRedeclarations;

impl ErrorHandler for IgnoreRedeclarations {
    fn on_recoverable_error(&mut self, error: ParseError) -> Option<ParseError> {
        (error.code != ErrorCode::VarRedeclaration).then_some(error)
    }
}

#[test]
fn test_error_handler_can_suppress_errors() {
    let options = ParserOptions::default().with_error_handler(IgnoreRedeclarations);
    assert!(parse("let a; var a;", SourceType::Script, options).is_ok());
    let options = ParserOptions::default().with_error_handler(IgnoreRedeclarations);
    assert!(parse("'use strict'; var eval;", SourceType::Script, options).is_err());
}

#[test]
fn test_recursion_limit() {
    let source = format!("{}1{}", "(".repeat(60), ")".repeat(60));
    let options = ParserOptions::default().with_max_recursion_depth(50);
    let error = parse(&source, SourceType::Script, options).unwrap_err();
    assert_eq!(error.code, ErrorCode::StackOverflow);
    assert!(parse_script(&source).is_ok());
}

#[test]
fn test_hashbang() {
    assert!(parse_script("#!/usr/bin/env node\nx;").is_ok());
    let es2022 = ParserOptions::default().with_ecma_version(EcmaVersion::ES2022);
    assert!(parse("#!/usr/bin/env node\nx;", SourceType::Script, es2022).is_err());
    let allowed = ParserOptions::default()
        .with_ecma_version(EcmaVersion::ES2022)
        .with_allow_hashbang(true);
    assert!(parse("#!/usr/bin/env node\nx;", SourceType::Script, allowed).is_ok());
}

// =============================================================================
// Regular Expression Contract Tests
// =============================================================================

#[test]
fn test_validate_regexp() {
    assert!(validate_regexp("(?<year>\\d{4})-\\k<year>", "u", EcmaVersion::LATEST).is_ok());
    assert!(validate_regexp("a{2,1}", "", EcmaVersion::LATEST).is_err());
    assert!(validate_regexp("[z-a]", "", EcmaVersion::LATEST).is_err());
    assert!(validate_regexp("a", "gg", EcmaVersion::LATEST).is_err());
}

#[test]
fn test_adapt_regexp_builds_host_regex() {
    let options = RegExpOptions {
        mode: RegExpParseMode::AdaptToInterpreted,
        ..RegExpOptions::default()
    };
    let result = adapt_regexp("(?<word>[a-z]+)\\s\\k<word>", "", options).unwrap();
    let adapted = result.adapted().expect("pattern should adapt");
    assert_eq!(adapted.group_index("word"), Some(1));
    assert!(adapted.regex.is_match("hello hello").unwrap());
}

#[test]
fn test_regexp_literals_are_checked_while_parsing() {
    let error = parse_script("x = /(?<a>.)(?<a>.)/;").unwrap_err();
    assert_eq!(error.kind, ErrorKind::SyntaxError);

    let options = ParserOptions::default().with_regexp_parse_mode(RegExpParseMode::Skip);
    assert!(parse("x = /(?<a>.)(?<a>.)/;", SourceType::Script, options).is_ok());

    let options = ParserOptions::default().with_regexp_parse_mode(RegExpParseMode::AdaptToInterpreted);
    let body = program_body(parse("/a|b/", SourceType::Script, options).unwrap());
    let NodeKind::ExpressionStatement { expression, .. } = &body[0].kind else {
        panic!("expected an expression statement");
    };
    let NodeKind::Literal {
        value: LiteralValue::RegExp(value),
        ..
    } = &expression.kind
    else {
        panic!("expected a regexp literal");
    };
    assert!(matches!(value.result, Some(RegExpParseResult::Adapted(_))));
}

// =============================================================================
// Serialization Contract Tests
// =============================================================================

#[test]
fn test_ast_serializes_as_estree_json() {
    let program = parse_script("x = 1").unwrap();
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["type"], "Program");
    assert_eq!(json["sourceType"], "script");
    assert_eq!(json["body"][0]["type"], "ExpressionStatement");
    assert_eq!(json["body"][0]["expression"]["operator"], "=");
    assert_eq!(json["body"][0]["expression"]["right"]["value"], 1.0);
}
