//! Integration tests for test262_harness

#[path = "integration/test_execution.rs"]
mod test_execution;
