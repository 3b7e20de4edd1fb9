//! Unit tests for the test harness

use ecma_parser::EcmaVersion;
use std::collections::HashSet;
use test262_harness::{Test262Harness, TestFile, TestResult, DEFAULT_UNSUPPORTED_FEATURES};

fn test_file(frontmatter: &str, body: &str) -> TestFile {
    let source = format!("/*---\ndescription: unit\n{}---*/\n{}", frontmatter, body);
    TestFile::from_source("unit.js", source).unwrap()
}

#[test]
fn test_harness_creation() {
    let harness = Test262Harness::new();
    assert_eq!(harness.ecma_version(), EcmaVersion::Experimental);
    for feature in DEFAULT_UNSUPPORTED_FEATURES {
        assert!(harness.unsupported_features().contains(*feature));
    }
}

#[test]
fn test_add_and_remove_unsupported_feature() {
    let mut harness = Test262Harness::new();
    harness.add_unsupported_feature("decorators");
    assert!(harness.unsupported_features().contains("decorators"));
    harness.remove_unsupported_feature("decorators");
    assert!(!harness.unsupported_features().contains("decorators"));
}

#[test]
fn test_with_custom_features() {
    let features: HashSet<String> = ["CustomFeature".to_string()].into_iter().collect();
    let harness = Test262Harness::with_unsupported_features(features);
    assert!(harness.unsupported_features().contains("CustomFeature"));
    assert!(!harness.unsupported_features().contains("json-modules"));
}

#[test]
fn test_positive_test_passes() {
    let mut harness = Test262Harness::new();
    assert_eq!(harness.run_test(&test_file("", "var x = 1 + 1;\n")), TestResult::Pass);
}

#[test]
fn test_negative_parse_test_passes_on_syntax_error() {
    let mut harness = Test262Harness::new();
    let test = test_file("negative:\n  phase: parse\n  type: SyntaxError\n", "var class = 1;\n");
    assert_eq!(harness.run_test(&test), TestResult::Pass);
}

#[test]
fn test_negative_parse_test_fails_when_accepted() {
    let mut harness = Test262Harness::new();
    let test = test_file("negative:\n  phase: parse\n  type: SyntaxError\n", "var x = 1;\n");
    assert!(harness.run_test(&test).is_fail());
}

#[test]
fn test_strict_run_is_checked() {
    let mut harness = Test262Harness::new();
    // Valid sloppy code, rejected in the strict run
    let result = harness.run_test(&test_file("", "with (a) {}\n"));
    match result {
        TestResult::Fail(reason) => assert!(reason.starts_with("[strict]")),
        other => panic!("expected a failure, got {:?}", other),
    }
    assert!(harness.run_test(&test_file("flags: [noStrict]\n", "with (a) {}\n")).is_pass());
}

#[test]
fn test_module_flag() {
    let mut harness = Test262Harness::new();
    let test = test_file("flags: [module]\n", "export default 1;\n");
    assert!(harness.run_test(&test).is_pass());
}

#[test]
fn test_runtime_negative_only_needs_to_parse() {
    let mut harness = Test262Harness::new();
    let test = test_file("negative:\n  phase: runtime\n  type: ReferenceError\n", "x;\n");
    assert!(harness.run_test(&test).is_pass());
}

#[test]
fn test_unsupported_feature_is_skipped() {
    let mut harness = Test262Harness::new();
    let test = test_file("features: [import-defer]\n", "x;\n");
    assert!(harness.run_test(&test).is_skip());
}

#[test]
fn test_ecma_version_applies() {
    let mut harness = Test262Harness::new().with_ecma_version(EcmaVersion::ES5);
    assert!(harness.run_test(&test_file("", "var f = () => 1;\n")).is_fail());
}

#[test]
fn test_result_predicates() {
    assert!(TestResult::Pass.is_pass());
    assert!(TestResult::Fail("error".to_string()).is_fail());
    assert!(TestResult::Skip("reason".to_string()).is_skip());
    assert!(!TestResult::Skip("reason".to_string()).is_pass());
}
