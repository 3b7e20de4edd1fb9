//! Command line argument definitions

use clap::{Args, Parser, Subcommand};
use ecma_parser::{EcmaVersion, ParserOptions, SourceType};

/// ECMAScript tokenizer, parser and regular expression checker
#[derive(Debug, Parser)]
#[command(name = "ecma-parse", version, about)]
pub struct Cli {
    /// Command to run; starts the REPL when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Parser settings shared by all commands
    #[command(flatten)]
    pub settings: Settings,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a file
    Tokens {
        /// Source file, or `-` for stdin
        file: String,
    },
    /// Parse a file and print its syntax tree
    Parse {
        /// Source file, or `-` for stdin
        file: String,
    },
    /// Parse an inline expression and print its syntax tree
    Expr {
        /// Expression source text
        source: String,
    },
    /// Validate a regular expression and show its host translation
    Regex {
        /// Pattern body, without slashes
        pattern: String,
        /// Flag characters
        #[arg(default_value = "")]
        flags: String,
        /// Only validate, do not translate
        #[arg(long)]
        validate_only: bool,
    },
    /// Start an interactive session
    Repl,
}

/// Parser settings
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Parse as an ES module
    #[arg(short, long, global = true, conflicts_with = "detect")]
    pub module: bool,

    /// Parse as a script, retrying as a module when module syntax is found
    #[arg(long, global = true)]
    pub detect: bool,

    /// Language version (3, 5, 6..14, 2015..2023, latest, experimental)
    #[arg(short = 'e', long, global = true, default_value = "latest", value_parser = parse_version)]
    pub ecma_version: EcmaVersion,

    /// Collect recoverable errors instead of failing
    #[arg(short, long, global = true)]
    pub tolerant: bool,

    /// Emit JSON instead of the text outline
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Include `ParenthesizedExpression` nodes
    #[arg(long, global = true)]
    pub preserve_parens: bool,

    /// Report comments alongside the syntax tree
    #[arg(long, global = true)]
    pub comments: bool,
}

impl Settings {
    /// Source type selected by the flags
    pub fn source_type(&self) -> SourceType {
        if self.module {
            SourceType::Module
        } else if self.detect {
            SourceType::Unknown
        } else {
            SourceType::Script
        }
    }

    /// Parser options selected by the flags
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions::default()
            .with_ecma_version(self.ecma_version)
            .with_tolerant(self.tolerant)
            .with_preserve_parens(self.preserve_parens)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module: false,
            detect: false,
            ecma_version: EcmaVersion::LATEST,
            tolerant: false,
            json: false,
            preserve_parens: false,
            comments: false,
        }
    }
}

fn parse_version(value: &str) -> Result<EcmaVersion, String> {
    value.parse()
}
