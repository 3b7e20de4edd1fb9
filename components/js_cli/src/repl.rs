//! REPL (Read-Parse-Print Loop) implementation

use crate::driver::Driver;
use crate::error::{CliError, CliResult};
use ecma_parser::EcmaVersion;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What the REPL prints for each input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    /// Syntax tree of the input as a program
    Parse,
    /// Syntax tree of the input as a single expression
    Expression,
    /// Token stream
    Tokens,
}

/// Run the interactive REPL
///
/// # Arguments
/// * `driver` - The Driver whose settings the session uses and updates
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(driver: &mut Driver) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("ecma-parse v{}", env!("CARGO_PKG_VERSION"));
    println!("Type ECMAScript source, .help for commands, or .exit to quit.");
    println!();

    let mut mode = ReplMode::Parse;
    let mut line_buffer = String::new();

    loop {
        let prompt = if line_buffer.is_empty() { "> " } else { "... " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if line_buffer.is_empty() {
                    if trimmed.is_empty() {
                        continue;
                    }
                    if matches!(trimmed, ".exit" | "exit" | "quit") {
                        break;
                    }
                    if trimmed.starts_with('.') {
                        println!("{}", handle_repl_command(trimmed, driver, &mut mode));
                        continue;
                    }
                } else {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                match evaluate(driver, mode, &line_buffer) {
                    Ok(output) => print!("{}", output),
                    // Keep reading until the construct is closed
                    Err(e) if e.is_incomplete_input() => continue,
                    Err(e) => eprintln!("{}", e),
                }
                let _ = editor.add_history_entry(line_buffer.as_str());
                line_buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if line_buffer.is_empty() {
                    println!("Press Ctrl-D or type .exit to quit");
                } else {
                    println!("^C");
                    line_buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Run one complete input through the driver
pub fn evaluate(driver: &Driver, mode: ReplMode, input: &str) -> CliResult<String> {
    let output = match mode {
        ReplMode::Parse => driver.parse(input, None)?,
        ReplMode::Expression => driver.expression(input)?,
        ReplMode::Tokens => driver.tokens(input)?,
    };
    Ok(if output.ends_with('\n') {
        output
    } else {
        output + "\n"
    })
}

/// Handle special REPL commands, returning the text to show
fn handle_repl_command(command: &str, driver: &mut Driver, mode: &mut ReplMode) -> String {
    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };
    let settings = driver.settings_mut();
    match name {
        ".help" => [
            "REPL Commands:",
            "  .help            - Show this help message",
            "  .parse           - Print the syntax tree of each input (default)",
            "  .expr            - Parse each input as a single expression",
            "  .tokens          - Print the tokens of each input",
            "  .module          - Toggle module parsing",
            "  .json            - Toggle JSON output",
            "  .tolerant        - Toggle tolerant mode",
            "  .version <ver>   - Set the language version",
            "  .exit            - Exit the REPL",
        ]
        .join("\n"),
        ".parse" => {
            *mode = ReplMode::Parse;
            "mode: parse".to_string()
        }
        ".expr" => {
            *mode = ReplMode::Expression;
            "mode: expression".to_string()
        }
        ".tokens" => {
            *mode = ReplMode::Tokens;
            "mode: tokens".to_string()
        }
        ".module" => {
            settings.module = !settings.module;
            settings.detect = false;
            format!("module: {}", on_off(settings.module))
        }
        ".json" => {
            settings.json = !settings.json;
            format!("json: {}", on_off(settings.json))
        }
        ".tolerant" => {
            settings.tolerant = !settings.tolerant;
            format!("tolerant: {}", on_off(settings.tolerant))
        }
        ".version" => match argument.parse::<EcmaVersion>() {
            Ok(version) => {
                settings.ecma_version = version;
                format!("version: {:?}", version)
            }
            Err(e) => e,
        },
        _ => format!("Unknown command: {}\nType .help for available commands", command),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Settings;

    #[test]
    fn test_incomplete_input_is_detected() {
        let driver = Driver::new(Settings::default());
        let err = evaluate(&driver, ReplMode::Parse, "function f() {").unwrap_err();
        assert!(err.is_incomplete_input());
        let err = evaluate(&driver, ReplMode::Parse, "let x = `a${").unwrap_err();
        assert!(err.is_incomplete_input());
        let err = evaluate(&driver, ReplMode::Parse, "let = ;").unwrap_err();
        assert!(!err.is_incomplete_input());
    }

    #[test]
    fn test_evaluate_modes() {
        let driver = Driver::new(Settings::default());
        let tree = evaluate(&driver, ReplMode::Parse, "x").unwrap();
        assert!(tree.starts_with("Program"));
        let expr = evaluate(&driver, ReplMode::Expression, "x").unwrap();
        assert_eq!(expr, "Identifier [0..1] x\n");
        let tokens = evaluate(&driver, ReplMode::Tokens, "x y").unwrap();
        assert_eq!(tokens.lines().count(), 2);
    }

    #[test]
    fn test_commands_update_settings() {
        let mut driver = Driver::new(Settings::default());
        let mut mode = ReplMode::Parse;

        assert_eq!(handle_repl_command(".module", &mut driver, &mut mode), "module: on");
        assert!(driver.settings().module);
        assert_eq!(handle_repl_command(".tokens", &mut driver, &mut mode), "mode: tokens");
        assert_eq!(mode, ReplMode::Tokens);
        assert_eq!(
            handle_repl_command(".version 5", &mut driver, &mut mode),
            "version: ES5"
        );
        assert_eq!(driver.settings().ecma_version, EcmaVersion::ES5);
        assert!(handle_repl_command(".version es99", &mut driver, &mut mode).contains("unknown"));
        assert!(handle_repl_command(".bogus", &mut driver, &mut mode).starts_with("Unknown command"));
    }
}
