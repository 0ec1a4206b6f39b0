//! CLI module
//!
//! Command-line argument parsing for the bank server binary.

pub mod args;

pub use args::{parse_args, CliArgs};
