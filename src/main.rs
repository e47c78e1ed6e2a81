//! # Yum Metadata CLI
//!
//! This is the binary entry point for the `yum-metadata` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into user-friendly
//!   output.
//!
//! The metadata logic lives in the `yum_metadata` library crate; the binary
//! only wires configuration, scheduler and registry together.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
