//! Command execution
//!
//! The Driver turns CLI settings into parser options and renders the results
//! of the tokens, parse and regex commands as text or JSON.

use crate::cli::Settings;
use crate::error::{CliError, CliResult};
use ecma_parser::{
    adapt_regexp, validate_regexp, Comment, Node, Parser, RegExpOptions, RegExpParseMode,
    RegExpParseResult, Tokenizer,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::Read;
use std::rc::Rc;
use tracing::debug;

/// Runs commands against the configured parser settings
#[derive(Debug, Clone, Default)]
pub struct Driver {
    settings: Settings,
}

impl Driver {
    /// Create a driver
    ///
    /// # Example
    /// ```
    /// use js_cli::{Driver, Settings};
    ///
    /// let driver = Driver::new(Settings::default());
    /// let outline = driver.parse("x = 1", None).unwrap();
    /// assert!(outline.starts_with("Program"));
    /// ```
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access to the settings, used by REPL commands
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read a source file, `-` meaning stdin
    pub fn read_source(path: &str) -> CliResult<String> {
        if path == "-" {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        } else {
            Ok(std::fs::read_to_string(path)?)
        }
    }

    /// Render the token stream of `source`
    pub fn tokens(&self, source: &str) -> CliResult<String> {
        let tokenizer = Tokenizer::new(
            source,
            self.settings.source_type(),
            self.settings.parser_options(),
        );
        let tokens = tokenizer.into_tokens().collect::<Result<Vec<_>, _>>()?;
        debug!(count = tokens.len(), "tokenized");

        if self.settings.json {
            return Ok(serde_json::to_string_pretty(&tokens)?);
        }
        let mut out = String::new();
        for token in &tokens {
            let _ = writeln!(
                out,
                "{}:{}\t{:<12}\t{}",
                token.loc.start.line,
                token.loc.start.column,
                token.token_type.label(),
                token.raw(source)
            );
        }
        Ok(out)
    }

    /// Parse `source` as a program and render the tree
    pub fn parse(&self, source: &str, source_file: Option<&str>) -> CliResult<String> {
        let comments = Rc::new(RefCell::new(Vec::new()));
        let mut options = self.settings.parser_options();
        if self.settings.comments {
            let sink = Rc::clone(&comments);
            options = options.with_on_comment(move |comment: &Comment| sink.borrow_mut().push(comment.clone()));
        }
        let mut parser = Parser::with_range(
            source,
            0,
            source.len(),
            self.settings.source_type(),
            source_file.map(str::to_string),
            options,
        );
        let program = parser.parse()?;
        let diagnostics = parser.diagnostics().to_vec();
        debug!(diagnostics = diagnostics.len(), "parsed program");

        let comments = comments.borrow();
        if self.settings.json {
            let mut output = json!({ "program": program });
            if self.settings.tolerant {
                output["diagnostics"] = serde_json::to_value(&diagnostics)?;
            }
            if self.settings.comments {
                output["comments"] = serde_json::to_value(&*comments)?;
            }
            return Ok(serde_json::to_string_pretty(&output)?);
        }

        let mut out = render_outline(&program)?;
        for comment in comments.iter() {
            let _ = writeln!(out, "comment {:?} [{}..{}] {:?}", comment.kind, comment.start, comment.end, comment.text);
        }
        for diagnostic in &diagnostics {
            let _ = writeln!(out, "warning: {}", diagnostic);
        }
        Ok(out)
    }

    /// Parse `source` as a single expression and render the tree
    pub fn expression(&self, source: &str) -> CliResult<String> {
        let mut parser = Parser::new(
            source,
            self.settings.source_type(),
            self.settings.parser_options(),
        );
        let expression = parser.parse_expression()?;
        if self.settings.json {
            return Ok(serde_json::to_string_pretty(&expression)?);
        }
        render_outline(&expression)
    }

    /// Validate or translate a regular expression
    pub fn regex(&self, pattern: &str, flags: &str, validate_only: bool) -> CliResult<String> {
        if validate_only {
            validate_regexp(pattern, flags, self.settings.ecma_version)?;
            return Ok(if self.settings.json {
                json!({ "valid": true }).to_string()
            } else {
                "valid".to_string()
            });
        }

        let options = RegExpOptions {
            ecma_version: self.settings.ecma_version,
            mode: RegExpParseMode::AdaptToInterpreted,
            ..RegExpOptions::default()
        };
        let result = adapt_regexp(pattern, flags, options)?;
        if self.settings.json {
            return Ok(serde_json::to_string_pretty(&result)?);
        }
        match result {
            RegExpParseResult::Adapted(adapted) => {
                let mut out = format!("adapted: {}\n", adapted.pattern);
                for group in &adapted.groups {
                    let _ = writeln!(
                        out,
                        "group {}: {}",
                        group.index,
                        group.name.as_deref().unwrap_or("(unnamed)")
                    );
                }
                Ok(out)
            }
            RegExpParseResult::ConversionFailed(error) => Ok(format!("valid, not convertible: {}", error)),
            RegExpParseResult::Validated => Ok("valid".to_string()),
        }
    }
}

/// Render an indented outline of a node tree, one line per node
pub fn render_outline(node: &Node) -> CliResult<String> {
    let value = serde_json::to_value(node)?;
    let mut out = String::new();
    outline_value(&value, None, 0, &mut out);
    Ok(out)
}

fn outline_value(value: &Value, field: Option<&str>, depth: usize, out: &mut String) {
    match value {
        Value::Object(map) if map.contains_key("type") => {
            let indent = "  ".repeat(depth);
            let label = field.map(|name| format!("{}: ", name)).unwrap_or_default();
            let node_type = map.get("type").and_then(Value::as_str).unwrap_or("?");
            let span = match (map.get("start"), map.get("end")) {
                (Some(start), Some(end)) => format!(" [{}..{}]", start, end),
                _ => String::new(),
            };
            let detail = ["name", "raw", "operator", "kind"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(|text| format!(" {}", text))
                .unwrap_or_default();
            let _ = writeln!(out, "{}{}{}{}{}", indent, label, node_type, span, detail);
            for (key, child) in map {
                if !matches!(key.as_str(), "type" | "start" | "end" | "loc") {
                    outline_value(child, Some(key), depth + 1, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                outline_value(item, field, depth, out);
            }
        }
        _ => {}
    }
}

impl From<Settings> for Driver {
    fn from(settings: Settings) -> Self {
        Driver::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecma_parser::EcmaVersion;

    fn driver() -> Driver {
        Driver::new(Settings::default())
    }

    #[test]
    fn test_outline_lists_nodes() {
        let outline = driver().parse("x = 1", None).unwrap();
        let lines: Vec<_> = outline.lines().collect();
        assert_eq!(lines[0], "Program [0..5]");
        assert_eq!(lines[1], "  body: ExpressionStatement [0..5]");
        assert_eq!(lines[2], "    expression: AssignmentExpression [0..5] =");
        assert_eq!(lines[3], "      left: Identifier [0..1] x");
        assert_eq!(lines[4], "      right: Literal [4..5] 1");
    }

    #[test]
    fn test_tokens_text() {
        let out = driver().tokens("a + 1").unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1:0\t"));
        assert!(lines[0].ends_with("\ta"));
        assert!(lines[2].ends_with("\t1"));
    }

    #[test]
    fn test_tokens_json() {
        let settings = Settings {
            json: true,
            ..Settings::default()
        };
        let out = Driver::new(settings).tokens("a").unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["start"], 0);
    }

    #[test]
    fn test_parse_error_is_returned() {
        let err = driver().parse("let = ;", Some("bad.js")).unwrap_err();
        let CliError::Parse(error) = err else {
            panic!("expected a parse error");
        };
        assert_eq!(error.source_file.as_deref(), Some("bad.js"));
    }

    #[test]
    fn test_tolerant_json_includes_diagnostics() {
        let settings = Settings {
            json: true,
            tolerant: true,
            ..Settings::default()
        };
        let out = Driver::new(settings).parse("let a; let a;", None).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["program"]["type"], "Program");
        assert_eq!(value["diagnostics"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_comments_are_reported() {
        let settings = Settings {
            comments: true,
            ..Settings::default()
        };
        let out = Driver::new(settings).parse("// hi\nx", None).unwrap();
        assert!(out.contains("comment Line [0..5] \" hi\""));
    }

    #[test]
    fn test_module_flag() {
        assert!(driver().parse("export default 1", None).is_err());
        let settings = Settings {
            module: true,
            ..Settings::default()
        };
        assert!(Driver::new(settings).parse("export default 1", None).is_ok());
    }

    #[test]
    fn test_version_flag() {
        let settings = Settings {
            ecma_version: EcmaVersion::ES5,
            ..Settings::default()
        };
        assert!(Driver::new(settings).parse("f = () => 1;", None).is_err());
    }

    #[test]
    fn test_expression() {
        let out = driver().expression("a?.b").unwrap();
        assert!(out.starts_with("ChainExpression [0..4]"));
    }

    #[test]
    fn test_regex_modes() {
        assert_eq!(driver().regex("a+", "g", true).unwrap(), "valid");
        let out = driver().regex("(?<x>a)(b)", "", false).unwrap();
        assert!(out.contains("group 1: x"));
        assert!(out.contains("group 2: (unnamed)"));
        assert!(driver().regex("a{2,1}", "", true).is_err());
    }
}
