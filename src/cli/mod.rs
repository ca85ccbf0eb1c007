//! # CLI Module
//!
//! Command-line entry for the `currency-nf` binary: one process per network function.
//!
//! ```bash
//! currency-nf <NF_ID> [--config PATH] [--currency-data PATH]
//! ```
//!
//! - `NF_ID` - this network function's id, an integer ≥ 1 listed in the shared configuration
//! - `--config` - shared configuration file (env `NF_SHARED_CONFIG`, default `config/nf.yaml`)
//! - `--currency-data` - `{"CODE": rate}` JSON file replacing the built-in rate table
//!   (env `NF_CURRENCY_DATA`)
//!
//! The process reads transactions as JSON lines from stdin and writes deliveries as JSON
//! lines to stdout; logs go to stderr. It exits 0 once stdin is exhausted and every unit has
//! drained, and non-zero on an initialization error or a unit failure.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use clap::Parser;
//! use nf_dispatch::cli::{run_cli, Cli};
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;


pub use commands::{run_cli, run_with_transport, Cli};
