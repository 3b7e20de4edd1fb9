//! ECMAScript Parser CLI Library
//!
//! Provides the Driver struct and supporting modules for the `ecma-parse`
//! command line tool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod driver;
pub mod error;
pub mod logging;
pub mod repl;

pub use cli::{Cli, Command, Settings};
pub use driver::Driver;
pub use error::{CliError, CliResult};
