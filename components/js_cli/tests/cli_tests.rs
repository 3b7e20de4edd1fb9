//! CLI argument parsing tests
//!
//! Tests for verifying clap argument parsing works correctly

use clap::Parser as ClapParser;
use ecma_parser::{EcmaVersion, SourceType};
use js_cli::{Cli, Command};

/// Test parsing no arguments (REPL by default)
#[test]
fn cli_parse_no_args() {
    let cli = Cli::try_parse_from(["ecma-parse"]).unwrap();

    assert!(cli.command.is_none());
    assert!(!cli.settings.module);
    assert!(!cli.settings.json);
    assert!(!cli.settings.tolerant);
    assert_eq!(cli.settings.ecma_version, EcmaVersion::LATEST);
    assert_eq!(cli.settings.source_type(), SourceType::Script);
}

/// Test the parse subcommand
#[test]
fn cli_parse_subcommand() {
    let cli = Cli::try_parse_from(["ecma-parse", "parse", "script.js"]).unwrap();

    assert!(matches!(cli.command, Some(Command::Parse { ref file }) if file == "script.js"));
}

/// Test the tokens subcommand with stdin
#[test]
fn cli_tokens_subcommand_stdin() {
    let cli = Cli::try_parse_from(["ecma-parse", "tokens", "-"]).unwrap();

    assert!(matches!(cli.command, Some(Command::Tokens { ref file }) if file == "-"));
}

/// Test global flags after the subcommand
#[test]
fn cli_global_flags() {
    let cli = Cli::try_parse_from(["ecma-parse", "parse", "a.mjs", "--module", "--json", "-t"]).unwrap();

    assert!(cli.settings.module);
    assert!(cli.settings.json);
    assert!(cli.settings.tolerant);
    assert_eq!(cli.settings.source_type(), SourceType::Module);
}

/// Test --detect selects the unknown source type
#[test]
fn cli_detect_source_type() {
    let cli = Cli::try_parse_from(["ecma-parse", "--detect", "parse", "a.js"]).unwrap();

    assert_eq!(cli.settings.source_type(), SourceType::Unknown);
}

/// Test --module and --detect conflict
#[test]
fn cli_module_conflicts_with_detect() {
    assert!(Cli::try_parse_from(["ecma-parse", "--module", "--detect", "parse", "a.js"]).is_err());
}

/// Test version spellings
#[test]
fn cli_ecma_version_values() {
    for (value, expected) in [
        ("5", EcmaVersion::ES5),
        ("es2015", EcmaVersion::ES2015),
        ("11", EcmaVersion::ES2020),
        ("latest", EcmaVersion::LATEST),
        ("experimental", EcmaVersion::Experimental),
    ] {
        let cli = Cli::try_parse_from(["ecma-parse", "-e", value]).unwrap();
        assert_eq!(cli.settings.ecma_version, expected, "value {}", value);
    }
}

/// Test invalid version is rejected
#[test]
fn cli_invalid_ecma_version() {
    assert!(Cli::try_parse_from(["ecma-parse", "--ecma-version", "4"]).is_err());
}

/// Test the regex subcommand
#[test]
fn cli_regex_subcommand() {
    let cli = Cli::try_parse_from(["ecma-parse", "regex", "a+b", "gi", "--validate-only"]).unwrap();

    match cli.command {
        Some(Command::Regex {
            pattern,
            flags,
            validate_only,
        }) => {
            assert_eq!(pattern, "a+b");
            assert_eq!(flags, "gi");
            assert!(validate_only);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

/// Test regex flags default to empty
#[test]
fn cli_regex_default_flags() {
    let cli = Cli::try_parse_from(["ecma-parse", "regex", "a"]).unwrap();

    assert!(matches!(cli.command, Some(Command::Regex { ref flags, .. }) if flags.is_empty()));
}
