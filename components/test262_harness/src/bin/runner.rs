//! Test262 Parse Runner
//!
//! Runs the parse phase of Test262 directories against ecma_parser and prints
//! a summary or a JSON report.

use clap::Parser as ClapParser;
use ecma_parser::EcmaVersion;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use test262_harness::{ReportBuilder, Test262Harness};
use tracing_subscriber::EnvFilter;

/// Run Test262 parse-phase tests
#[derive(Debug, ClapParser)]
#[command(name = "test262_runner", version, about)]
struct Args {
    /// Test directories, e.g. `test262/test/language`
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// Language version to parse at
    #[arg(short = 'e', long, default_value = "experimental", value_parser = parse_version)]
    ecma_version: EcmaVersion,

    /// Additional features to skip
    #[arg(long = "skip-feature")]
    skip_features: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Number of failures to list in the text summary
    #[arg(long, default_value_t = 50)]
    max_failures: usize,
}

fn parse_version(value: &str) -> Result<EcmaVersion, String> {
    value.parse()
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
    let args = Args::parse();

    let mut harness = Test262Harness::new().with_ecma_version(args.ecma_version);
    for feature in &args.skip_features {
        harness.add_unsupported_feature(feature);
    }

    let started = Instant::now();
    let mut builder = ReportBuilder::new();
    for dir in &args.dirs {
        if !dir.is_dir() {
            eprintln!("Error: {} is not a directory", dir.display());
            return ExitCode::from(2);
        }
        builder.add_report(harness.run_directory(dir));
    }
    let report = builder.build();

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        println!("{}", report.detailed_summary(args.max_failures));
        println!("Elapsed: {:.2?}", started.elapsed());
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
