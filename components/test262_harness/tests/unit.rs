//! Unit tests for test262_harness

#[path = "unit/harness_tests.rs"]
mod harness_tests;

#[path = "unit/report_builder_tests.rs"]
mod report_builder_tests;

#[path = "unit/report_tests.rs"]
mod report_tests;

#[path = "unit/test_file_tests.rs"]
mod test_file_tests;
