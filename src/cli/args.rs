//! Command-line arguments for the bank server

use clap::Parser;
use std::path::PathBuf;

/// Serve bank accounts over the delimited text protocol
#[derive(Parser, Debug)]
#[command(name = "bank-server")]
#[command(about = "In-memory bank server speaking the ##-delimited ATM protocol", long_about = None)]
pub struct CliArgs {
    /// Account data file loaded at startup
    #[arg(
        value_name = "ACCOUNTS",
        default_value = "accounts.txt",
        help = "Path to the newline-delimited account file"
    )]
    pub accounts_file: PathBuf,

    /// Interface to listen on
    #[arg(
        long = "host",
        value_name = "HOST",
        default_value = "127.0.0.1",
        help = "Host address to bind the listener to"
    )]
    pub host: String,

    /// TCP port to listen on
    #[arg(
        long = "port",
        value_name = "PORT",
        default_value_t = 65432,
        help = "TCP port to bind the listener to"
    )]
    pub port: u16,
}

/// Parse command-line arguments using clap
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
