//! Unit tests for the report builder

use test262_harness::{ReportBuilder, TestReport, TestResult};

fn report_with(results: Vec<(&str, TestResult)>) -> TestReport {
    let mut report = TestReport::new();
    for (path, result) in results {
        report.add_result(path, result);
    }
    report
}

#[test]
fn test_empty_builder() {
    let builder = ReportBuilder::new();
    assert_eq!(builder.count(), 0);
    assert_eq!(builder.build(), TestReport::new());
}

#[test]
fn test_build_merges_reports() {
    let mut builder = ReportBuilder::new();
    builder
        .add_report(report_with(vec![("a.js", TestResult::Pass)]))
        .add_report(report_with(vec![
            ("b.js", TestResult::Fail("bad".to_string())),
            ("c.js", TestResult::Skip("skip".to_string())),
        ]));

    let combined = builder.build();
    assert_eq!(builder.count(), 2);
    assert_eq!(combined.total, 3);
    assert_eq!(combined.passed, 1);
    assert_eq!(combined.failed, 1);
    assert_eq!(combined.skipped, 1);
    assert_eq!(combined.failures[0].path, "b.js");
}
