//! Unit tests for report generation

use test262_harness::{TestOutcome, TestReport, TestResult};

#[test]
fn test_new_report() {
    let report = TestReport::new();
    assert_eq!(report.total, 0);
    assert_eq!(report.passed, 0);
    assert!(report.failures.is_empty());
    assert!(report.skips.is_empty());
    assert!(report.is_success());
}

#[test]
fn test_add_results() {
    let mut report = TestReport::new();
    report.add_result("a.js", TestResult::Pass);
    report.add_result("b.js", TestResult::Fail("error".to_string()));
    report.add_result("c.js", TestResult::Skip("feature".to_string()));

    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.failures,
        vec![TestOutcome {
            path: "b.js".to_string(),
            reason: "error".to_string()
        }]
    );
    assert_eq!(report.skips[0].path, "c.js");
    assert!(!report.is_success());
}

#[test]
fn test_pass_rates() {
    let mut report = TestReport::new();
    assert_eq!(report.pass_rate(), 0.0);
    report.add_result("a.js", TestResult::Pass);
    report.add_result("b.js", TestResult::Fail("x".to_string()));
    report.add_result("c.js", TestResult::Skip("y".to_string()));
    report.add_result("d.js", TestResult::Skip("y".to_string()));

    assert!((report.pass_rate() - 25.0).abs() < 1e-9);
    assert!((report.effective_pass_rate() - 50.0).abs() < 1e-9);
}

#[test]
fn test_summary_text() {
    let mut report = TestReport::new();
    report.add_result("a.js", TestResult::Pass);
    let summary = report.summary();
    assert!(summary.contains("Total: 1"));
    assert!(summary.contains("Passed: 1 (100.0%)"));
}

#[test]
fn test_detailed_summary_limits_failures() {
    let mut report = TestReport::new();
    for i in 0..3 {
        report.add_result(&format!("{}.js", i), TestResult::Fail("bad".to_string()));
    }
    let detailed = report.detailed_summary(2);
    assert!(detailed.contains("0.js"));
    assert!(detailed.contains("1.js"));
    assert!(!detailed.contains("2.js"));
    assert!(detailed.contains("... and 1 more"));
}

#[test]
fn test_json_round_trip() {
    let mut report = TestReport::new();
    report.add_result("a.js", TestResult::Fail("bad".to_string()));
    let json = report.to_json().unwrap();
    assert!(json.contains("\"failed\": 1"));
    assert_eq!(TestReport::from_json(&json).unwrap(), report);
}
