//! I/O module
//!
//! Startup-time ingestion of the newline-delimited account file.

pub mod account_file;

pub use account_file::load_accounts;
