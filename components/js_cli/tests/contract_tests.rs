//! Contract tests for js_cli component
//!
//! These tests verify that the component meets its contract:
//! - Driver struct with tokens, parse, expression and regex methods
//! - Settings mapping onto parser options
//! - Proper error handling

use js_cli::{CliError, CliResult, Driver, Settings};
use std::fs;

/// Test Driver::new keeps the settings
#[test]
fn contract_driver_new() {
    let settings = Settings {
        tolerant: true,
        ..Settings::default()
    };
    let driver = Driver::new(settings);
    assert!(driver.settings().tolerant);
}

/// Test Driver::parse with a simple program
#[test]
fn contract_driver_parse_simple() {
    let driver = Driver::default();
    let result = driver.parse("let x = 42;", None);
    assert!(result.is_ok());
    assert!(result.unwrap().contains("VariableDeclaration [0..11] let"));
}

/// Test Driver::parse on a file read from disk
#[test]
fn contract_driver_parse_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("test.js");
    fs::write(&file_path, "function f(a) { return a; }").unwrap();

    let path = file_path.to_str().unwrap();
    let source = Driver::read_source(path).unwrap();
    let outline = Driver::default().parse(&source, Some(path)).unwrap();
    assert!(outline.contains("FunctionDeclaration"));
    assert!(outline.contains("ReturnStatement"));
}

/// Test missing files produce Io errors
#[test]
fn contract_read_missing_file() {
    let result: CliResult<String> = Driver::read_source("/nonexistent/missing.js");
    assert!(matches!(result, Err(CliError::Io(_))));
}

/// Test syntax errors carry the file name and position
#[test]
fn contract_syntax_error_display() {
    let err = Driver::default().parse("var a = ;", Some("bad.js")).unwrap_err();
    match err {
        CliError::Parse(error) => {
            assert_eq!(error.source_file.as_deref(), Some("bad.js"));
            assert_eq!(error.to_string(), "Unexpected token ';' (1:8)");
        }
        other => panic!("expected a parse error, got {}", other),
    }
}

/// Test JSON output is valid ESTree
#[test]
fn contract_json_output() {
    let settings = Settings {
        json: true,
        ..Settings::default()
    };
    let out = Driver::new(settings).parse("a.b()", None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let expression = &value["program"]["body"][0]["expression"];
    assert_eq!(expression["type"], "CallExpression");
    assert_eq!(expression["callee"]["type"], "MemberExpression");
}

/// Test regex translation output as JSON
#[test]
fn contract_regex_json() {
    let settings = Settings {
        json: true,
        ..Settings::default()
    };
    let out = Driver::new(settings).regex("(?<d>\\d)", "u", false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["Adapted"]["groups"][0]["name"], "d");
}

/// Test invalid regex is a parse error
#[test]
fn contract_regex_invalid() {
    let err = Driver::default().regex("(", "", true).unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
}
