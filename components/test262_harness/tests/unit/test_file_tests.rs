//! Unit tests for test file and metadata parsing

use ecma_parser::SourceType;
use std::collections::HashSet;
use test262_harness::{ParseRun, TestFile, TestMetadata, STRICT_PREFIX};

#[test]
fn test_parse_basic_metadata() {
    let source = r#"/*---
description: Test for addition operator
info: |
  The addition operator either performs string concatenation
  or numeric addition.
esid: sec-addition-operator-plus
---*/
1 + 1;
"#;

    let metadata = TestMetadata::parse(source).unwrap();
    assert_eq!(metadata.description, "Test for addition operator");
    assert_eq!(metadata.esid.as_deref(), Some("sec-addition-operator-plus"));
    assert!(metadata.negative.is_none());
}

#[test]
fn test_parse_negative_expectation_parse_phase() {
    let source = r#"/*---
description: Early error for reserved word
negative:
  phase: parse
  type: SyntaxError
---*/
var class = 1;
"#;

    let metadata = TestMetadata::parse(source).unwrap();
    let neg = metadata.negative.as_ref().unwrap();
    assert_eq!(neg.phase, "parse");
    assert_eq!(neg.error_type, "SyntaxError");
    assert!(metadata.expects_parse_error());
    assert_eq!(metadata.expected_error_type(), Some("SyntaxError"));
}

#[test]
fn test_runtime_negative_is_not_a_parse_error() {
    let source = r#"/*---
description: Runtime error for undefined variable
negative:
  phase: runtime
  type: ReferenceError
---*/
undefinedVar;
"#;

    let metadata = TestMetadata::parse(source).unwrap();
    assert!(!metadata.expects_parse_error());
    assert_eq!(metadata.expected_error_type(), Some("ReferenceError"));
}

#[test]
fn test_parse_flags_and_features() {
    let source = r#"/*---
description: Flags
flags: [onlyStrict]
features: [class-fields-private, decorators]
includes: [propertyHelper.js]
---*/
"#;

    let metadata = TestMetadata::parse(source).unwrap();
    assert!(metadata.is_strict_only());
    assert!(!metadata.is_module());
    assert_eq!(metadata.features, vec!["class-fields-private", "decorators"]);
    assert_eq!(metadata.includes, vec!["propertyHelper.js"]);

    let unsupported: HashSet<String> = ["decorators".to_string()].into_iter().collect();
    assert_eq!(metadata.unsupported_features(&unsupported), vec!["decorators"]);
}

#[test]
fn test_missing_frontmatter() {
    assert!(TestMetadata::parse("var x = 1;").is_err());
}

#[test]
fn test_invalid_yaml() {
    let source = "/*---\ndescription: [unclosed\n---*/\n";
    assert!(TestMetadata::parse(source).is_err());
}

#[test]
fn test_parse_runs_follow_flags() {
    let runs = |flags: &str| {
        let source = format!("/*---\ndescription: runs\nflags: [{}]\n---*/\n", flags);
        TestMetadata::parse(&source).unwrap().parse_runs()
    };
    let sloppy = ParseRun {
        source_type: SourceType::Script,
        strict: false,
    };
    let strict = ParseRun {
        source_type: SourceType::Script,
        strict: true,
    };

    assert_eq!(runs(""), vec![sloppy, strict]);
    assert_eq!(runs("onlyStrict"), vec![strict]);
    assert_eq!(runs("noStrict"), vec![sloppy]);
    assert_eq!(runs("raw"), vec![sloppy]);
    assert_eq!(
        runs("module"),
        vec![ParseRun {
            source_type: SourceType::Module,
            strict: false
        }]
    );
    assert_eq!(strict.label(), "strict");
}

#[test]
fn test_source_for_strict_run() {
    let test = TestFile::from_source("dir/name.js", "/*---\ndescription: x\n---*/\nx;\n").unwrap();
    assert_eq!(test.name(), "name");
    let strict = test.source_for(ParseRun {
        source_type: SourceType::Script,
        strict: true,
    });
    assert!(strict.starts_with(STRICT_PREFIX));
    assert!(strict.ends_with("x;\n"));
    assert!(!test.is_fixture());
}
