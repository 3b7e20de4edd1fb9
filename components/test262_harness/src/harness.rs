use crate::report::TestReport;
use crate::test_file::{ParseRun, TestFile};
use core_types::ErrorKind;
use ecma_parser::{EcmaVersion, Parser, ParserOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Test262 features whose syntax the parser does not implement
pub const DEFAULT_UNSUPPORTED_FEATURES: &[&str] = &[
    "import-defer",
    "regexp-modifiers",
    "source-phase-imports",
    "source-phase-imports-module-source",
    "json-modules",
];

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestResult {
    /// Test passed successfully
    Pass,
    /// Test failed with reason
    Fail(String),
    /// Test was skipped with reason
    Skip(String),
}

impl TestResult {
    /// Check if the result is a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }

    /// Check if the result is a failure
    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail(_))
    }

    /// Check if the result is a skip
    pub fn is_skip(&self) -> bool {
        matches!(self, TestResult::Skip(_))
    }
}

/// Parse-phase Test262 conformance harness
///
/// Each test is parsed once per mode its flags require. Tests with a
/// `negative` parse-phase expectation pass when every parse fails with a
/// SyntaxError; all other tests pass when every parse succeeds.
pub struct Test262Harness {
    /// Language version the parser runs at
    ecma_version: EcmaVersion,
    /// Features that cause a test to be skipped
    unsupported_features: HashSet<String>,
    /// Results of executed tests
    results: BTreeMap<String, TestResult>,
}

impl Test262Harness {
    /// Create a harness with the default unsupported features
    pub fn new() -> Self {
        Self::with_unsupported_features(
            DEFAULT_UNSUPPORTED_FEATURES
                .iter()
                .map(|feature| feature.to_string())
                .collect(),
        )
    }

    /// Create a harness that skips tests requiring any of `features`
    pub fn with_unsupported_features(features: HashSet<String>) -> Self {
        Self {
            ecma_version: EcmaVersion::Experimental,
            unsupported_features: features,
            results: BTreeMap::new(),
        }
    }

    /// Set the language version
    pub fn with_ecma_version(mut self, version: EcmaVersion) -> Self {
        self.ecma_version = version;
        self
    }

    /// Language version the parser runs at
    pub fn ecma_version(&self) -> EcmaVersion {
        self.ecma_version
    }

    /// Mark a feature as unsupported
    pub fn add_unsupported_feature(&mut self, feature: &str) {
        self.unsupported_features.insert(feature.to_string());
    }

    /// Mark a feature as supported again
    pub fn remove_unsupported_feature(&mut self, feature: &str) {
        self.unsupported_features.remove(feature);
    }

    /// Get the set of unsupported features
    pub fn unsupported_features(&self) -> &HashSet<String> {
        &self.unsupported_features
    }

    /// Run a single test
    pub fn run_test(&mut self, test: &TestFile) -> TestResult {
        let missing = test.metadata.unsupported_features(&self.unsupported_features);
        if !missing.is_empty() {
            return TestResult::Skip(format!("Unsupported features: {:?}", missing));
        }

        let result = test
            .metadata
            .parse_runs()
            .into_iter()
            .map(|run| self.run_parse(test, run))
            .find(|result| !result.is_pass())
            .unwrap_or(TestResult::Pass);
        if let TestResult::Fail(reason) = &result {
            debug!(path = %test.path, %reason, "test failed");
        }
        result
    }

    fn run_parse(&self, test: &TestFile, run: ParseRun) -> TestResult {
        let source = test.source_for(run);
        let options = ParserOptions::default().with_ecma_version(self.ecma_version);
        let outcome = Parser::new(&source, run.source_type, options).parse();

        if test.metadata.expects_parse_error() {
            match outcome {
                Err(error) if error.kind == ErrorKind::SyntaxError => {
                    match test.metadata.expected_error_type() {
                        Some("SyntaxError") | None => TestResult::Pass,
                        Some(other) => TestResult::Fail(format!(
                            "[{}] Expected {} but got SyntaxError: {}",
                            run.label(),
                            other,
                            error
                        )),
                    }
                }
                Err(error) => TestResult::Fail(format!(
                    "[{}] Expected SyntaxError but got: {}",
                    run.label(),
                    error
                )),
                Ok(_) => TestResult::Fail(format!(
                    "[{}] Expected parse error but parsed successfully",
                    run.label()
                )),
            }
        } else {
            match outcome {
                Ok(_) => TestResult::Pass,
                Err(error) => TestResult::Fail(format!("[{}] Parse error: {}", run.label(), error)),
            }
        }
    }

    /// Run all tests in a directory
    pub fn run_directory<P: AsRef<Path>>(&mut self, dir: P) -> TestReport {
        let mut report = TestReport::new();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "js")
                    .unwrap_or(false)
            });

        for entry in walker {
            let path = entry.path().to_string_lossy().to_string();
            if path.contains("_FIXTURE") {
                continue;
            }
            let result = match TestFile::load(&path) {
                Ok(test) => self.run_test(&test),
                Err(e) => TestResult::Skip(format!("Could not load test: {}", e)),
            };
            report.add_result(&path, result.clone());
            self.results.insert(path, result);
        }

        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "test262 run finished"
        );
        report
    }

    /// Get all test results, ordered by path
    pub fn results(&self) -> &BTreeMap<String, TestResult> {
        &self.results
    }

    /// Clear all test results
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    /// Get number of tests run
    pub fn test_count(&self) -> usize {
        self.results.len()
    }

    /// Get number of passing tests
    pub fn pass_count(&self) -> usize {
        self.results.values().filter(|r| r.is_pass()).count()
    }

    /// Get number of failing tests
    pub fn fail_count(&self) -> usize {
        self.results.values().filter(|r| r.is_fail()).count()
    }

    /// Get number of skipped tests
    pub fn skip_count(&self) -> usize {
        self.results.values().filter(|r| r.is_skip()).count()
    }
}

impl Default for Test262Harness {
    fn default() -> Self {
        Self::new()
    }
}
