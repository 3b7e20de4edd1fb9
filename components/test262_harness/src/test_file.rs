use ecma_parser::SourceType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Prefix Test262 prescribes for strict-mode runs
pub const STRICT_PREFIX: &str = "\"use strict\";\n";

/// Test262 negative test expectation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NegativeExpectation {
    /// Phase where error is expected: "parse", "resolution", or "runtime"
    pub phase: String,
    /// Error type expected (e.g., "SyntaxError", "ReferenceError")
    #[serde(rename = "type")]
    pub error_type: String,
}

/// Test262 test metadata parsed from YAML frontmatter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestMetadata {
    /// Human-readable description of what the test verifies
    pub description: String,
    /// Expected error for negative tests
    pub negative: Option<NegativeExpectation>,
    /// Helper files that must be loaded before the test
    pub includes: Vec<String>,
    /// Test execution flags (e.g., "onlyStrict", "noStrict", "module", "raw")
    pub flags: HashSet<String>,
    /// ECMAScript features required by this test
    pub features: Vec<String>,
    /// ES section identifier
    pub esid: Option<String>,
}

/// One way of parsing a test file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRun {
    /// Goal symbol
    pub source_type: SourceType,
    /// Whether [`STRICT_PREFIX`] is prepended
    pub strict: bool,
}

impl ParseRun {
    /// Short label used in failure reports
    pub fn label(&self) -> &'static str {
        match (self.source_type, self.strict) {
            (SourceType::Module, _) => "module",
            (_, true) => "strict",
            (_, false) => "sloppy",
        }
    }
}

impl TestMetadata {
    /// Parse YAML frontmatter from test file source
    ///
    /// Test262 files contain metadata in a YAML block between `/*---` and `---*/`
    pub fn parse(source: &str) -> Result<Self, String> {
        let re = Regex::new(r"(?s)/\*---\r?\n(.*?)\r?\n?---\*/")
            .map_err(|e| format!("Failed to compile regex: {}", e))?;

        let yaml = re
            .captures(source)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or("No YAML frontmatter found in test file")?;

        serde_yaml::from_str(yaml)
            .map_err(|e| format!("Failed to parse YAML frontmatter: {}", e))
    }

    /// Get list of features required by this test that appear in `unsupported`
    pub fn unsupported_features(&self, unsupported: &HashSet<String>) -> Vec<String> {
        self.features
            .iter()
            .filter(|f| unsupported.contains(*f))
            .cloned()
            .collect()
    }

    /// Check if test expects an early (parse-phase) error
    pub fn expects_parse_error(&self) -> bool {
        self.negative
            .as_ref()
            .map(|n| matches!(n.phase.as_str(), "parse" | "early"))
            .unwrap_or(false)
    }

    /// Get the expected error type for negative tests
    pub fn expected_error_type(&self) -> Option<&str> {
        self.negative.as_ref().map(|n| n.error_type.as_str())
    }

    /// Check if test requires strict mode only
    pub fn is_strict_only(&self) -> bool {
        self.flags.contains("onlyStrict")
    }

    /// Check if test requires non-strict mode only
    pub fn is_no_strict(&self) -> bool {
        self.flags.contains("noStrict")
    }

    /// Check if test is an ES module test
    pub fn is_module(&self) -> bool {
        self.flags.contains("module")
    }

    /// Check if test should run unmodified
    pub fn is_raw(&self) -> bool {
        self.flags.contains("raw")
    }

    /// Parses this test requires, per the Test262 flag rules
    pub fn parse_runs(&self) -> Vec<ParseRun> {
        let run = |source_type, strict| ParseRun { source_type, strict };
        if self.is_module() {
            vec![run(SourceType::Module, false)]
        } else if self.is_strict_only() {
            vec![run(SourceType::Script, true)]
        } else if self.is_no_strict() || self.is_raw() {
            vec![run(SourceType::Script, false)]
        } else {
            vec![run(SourceType::Script, false), run(SourceType::Script, true)]
        }
    }
}

/// Test262 test file with source and parsed metadata
#[derive(Debug, Clone)]
pub struct TestFile {
    /// Path to the test file
    pub path: String,
    /// Source code of the test
    pub source: String,
    /// Parsed metadata from YAML frontmatter
    pub metadata: TestMetadata,
}

impl TestFile {
    /// Build a test from in-memory source
    pub fn from_source(path: impl Into<String>, source: impl Into<String>) -> Result<Self, String> {
        let source = source.into();
        let metadata = TestMetadata::parse(&source)?;
        Ok(Self {
            path: path.into(),
            source,
            metadata,
        })
    }

    /// Load a test file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or("Invalid path encoding")?
            .to_string();

        let source =
            std::fs::read_to_string(&path_str).map_err(|e| format!("Failed to read file: {}", e))?;

        Self::from_source(path_str, source)
    }

    /// Get the test name (file name without extension)
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.path)
    }

    /// Whether this is a fixture imported by other tests rather than a test
    pub fn is_fixture(&self) -> bool {
        self.path.contains("_FIXTURE")
    }

    /// Source text for `run`
    pub fn source_for(&self, run: ParseRun) -> String {
        if run.strict {
            format!("{}{}", STRICT_PREFIX, self.source)
        } else {
            self.source.clone()
        }
    }
}
