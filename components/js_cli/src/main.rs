//! ecma-parse
//!
//! Entry point for the parser command line tool. Parses CLI arguments and
//! delegates to the Driver.

use clap::Parser as ClapParser;
use js_cli::{logging, repl, Cli, CliError, CliResult, Command, Driver};

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) if output.is_empty() || output.ends_with('\n') => print!("{}", output),
        Ok(output) => println!("{}", output),
        Err(CliError::Parse(e)) => {
            eprintln!("SyntaxError: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> CliResult<String> {
    let mut driver = Driver::new(cli.settings);
    match cli.command {
        Some(Command::Tokens { file }) => driver.tokens(&Driver::read_source(&file)?),
        Some(Command::Parse { file }) => driver.parse(&Driver::read_source(&file)?, Some(&file)),
        Some(Command::Expr { source }) => driver.expression(&source),
        Some(Command::Regex {
            pattern,
            flags,
            validate_only,
        }) => driver.regex(&pattern, &flags, validate_only),
        Some(Command::Repl) | None => {
            repl::run_repl(&mut driver)?;
            Ok(String::new())
        }
    }
}
