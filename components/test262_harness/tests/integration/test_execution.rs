//! Integration tests for test execution

use std::fs;
use tempfile::TempDir;
use test262_harness::{Test262Harness, TestFile, TestReport};

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_run_simple_passing_test() {
    let temp_dir = TempDir::new().unwrap();
    write(
        &temp_dir,
        "simple_pass.js",
        "/*---\ndescription: Simple passing test\n---*/\nvar x = 1 + 1;\n",
    );

    let test_file = TestFile::load(temp_dir.path().join("simple_pass.js")).unwrap();
    let mut harness = Test262Harness::new();
    assert!(harness.run_test(&test_file).is_pass());
}

#[test]
fn test_run_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(
        &temp_dir,
        "language/pass.js",
        "/*---\ndescription: passes\nflags: [module]\n---*/\nimport x from './dep_FIXTURE.js';\n",
    );
    write(&temp_dir, "language/dep_FIXTURE.js", "export default 1;\n");
    write(
        &temp_dir,
        "language/early.js",
        "/*---\ndescription: early error\nnegative:\n  phase: parse\n  type: SyntaxError\n---*/\nlet let = 1;\n",
    );
    write(
        &temp_dir,
        "language/wrong.js",
        "/*---\ndescription: should be rejected\nnegative:\n  phase: parse\n  type: SyntaxError\n---*/\n1;\n",
    );
    write(
        &temp_dir,
        "language/skipped.js",
        "/*---\ndescription: skipped\nfeatures: [source-phase-imports]\n---*/\nimport source x from 'y';\n",
    );
    write(&temp_dir, "language/no_frontmatter.js", "x;\n");
    write(&temp_dir, "language/readme.md", "not a test");

    let mut harness = Test262Harness::new();
    let report = harness.run_directory(temp_dir.path());

    assert_eq!(report.total, 5);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 2);
    assert!(report.failures[0].path.ends_with("wrong.js"));
    assert!(report.failures[0].reason.contains("parsed successfully"));
    assert_eq!(harness.test_count(), 5);
    assert_eq!(harness.pass_count(), 2);
    assert_eq!(harness.fail_count(), 1);
    assert_eq!(harness.skip_count(), 2);

    let json = report.to_json().unwrap();
    assert_eq!(TestReport::from_json(&json).unwrap(), report);

    harness.clear_results();
    assert_eq!(harness.test_count(), 0);
}
