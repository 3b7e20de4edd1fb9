use crate::harness::TestResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A failed or skipped test with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Path of the test file
    pub path: String,
    /// Why the test failed or was skipped
    pub reason: String,
}

/// Test run report with statistics and failure details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Total number of tests run
    pub total: usize,
    /// Number of tests that passed
    pub passed: usize,
    /// Number of tests that failed
    pub failed: usize,
    /// Number of tests that were skipped
    pub skipped: usize,
    /// Failed tests
    pub failures: Vec<TestOutcome>,
    /// Skipped tests
    pub skips: Vec<TestOutcome>,
}

impl TestReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test result to the report
    pub fn add_result(&mut self, path: &str, result: TestResult) {
        self.total += 1;
        let outcome = |reason| TestOutcome {
            path: path.to_string(),
            reason,
        };
        match result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail(reason) => {
                self.failed += 1;
                self.failures.push(outcome(reason));
            }
            TestResult::Skip(reason) => {
                self.skipped += 1;
                self.skips.push(outcome(reason));
            }
        }
    }

    /// Calculate the pass rate as a percentage
    pub fn pass_rate(&self) -> f64 {
        percentage(self.passed, self.total)
    }

    /// Calculate the effective pass rate (excluding skips)
    pub fn effective_pass_rate(&self) -> f64 {
        percentage(self.passed, self.total - self.skipped)
    }

    /// Generate a human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Test262 Parse Results:\n\
             Total: {}\n\
             Passed: {} ({:.1}%)\n\
             Failed: {}\n\
             Skipped: {}\n\
             Effective Pass Rate: {:.1}%",
            self.total,
            self.passed,
            self.pass_rate(),
            self.failed,
            self.skipped,
            self.effective_pass_rate()
        )
    }

    /// Generate a detailed report listing up to `limit` failures
    pub fn detailed_summary(&self, limit: usize) -> String {
        let mut output = self.summary();

        if !self.failures.is_empty() {
            output.push_str("\n\nFailures:\n");
            for failure in self.failures.iter().take(limit) {
                let _ = writeln!(output, "  - {}\n    Reason: {}", failure.path, failure.reason);
            }
            if self.failures.len() > limit {
                let _ = writeln!(output, "  ... and {} more", self.failures.len() - limit);
            }
        }

        output
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: &TestReport) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.failures.extend(other.failures.iter().cloned());
        self.skips.extend(other.skips.iter().cloned());
    }

    /// Check if no test failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Export report as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import report from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Report builder for aggregating multiple test runs
#[derive(Debug, Default)]
pub struct ReportBuilder {
    reports: Vec<TestReport>,
}

impl ReportBuilder {
    /// Create a new report builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report to be aggregated
    pub fn add_report(&mut self, report: TestReport) -> &mut Self {
        self.reports.push(report);
        self
    }

    /// Build an aggregated report from all added reports
    pub fn build(&self) -> TestReport {
        let mut combined = TestReport::new();
        for report in &self.reports {
            combined.merge(report);
        }
        combined
    }

    /// Get number of reports added
    pub fn count(&self) -> usize {
        self.reports.len()
    }
}
