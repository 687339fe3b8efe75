//! # auto-latexmk CLI
//!
//! This is the binary entry point for the `auto-latexmk` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and colored output.
//! - Handing off to the compile command, which drives the library.
//!
//! The core logic lives in the `auto_latexmk` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
