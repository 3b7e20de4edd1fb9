//! Test262 Conformance Test Harness
//!
//! This crate runs the parse phase of Test262, the official ECMAScript
//! conformance test suite, against the ecma_parser crate: positive tests must
//! parse, negative parse-phase tests must be rejected with a SyntaxError.

#![warn(missing_docs)]

pub mod harness;
pub mod report;
pub mod test_file;

pub use harness::{Test262Harness, TestResult, DEFAULT_UNSUPPORTED_FEATURES};
pub use report::{ReportBuilder, TestOutcome, TestReport};
pub use test_file::{NegativeExpectation, ParseRun, TestFile, TestMetadata, STRICT_PREFIX};
