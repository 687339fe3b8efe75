//! CLI argument parsing, logging setup and command dispatch

use anyhow::Result;
use auto_latexmk::output::OutputConfig;
use clap::Parser;
use env_logger::{Env, WriteStyle};

use crate::commands;

/// Compile every main .tex file below a directory in parallel with latexmk
#[derive(Parser, Debug)]
#[command(name = "auto-latexmk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    compile: commands::compile::CompileArgs,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["always", "never", "auto"]
    )]
    color: String,

    /// Set log level (error, warn, info, debug, trace); --verbose implies debug
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        let level = if self.compile.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        };
        init_logging(level, &output);

        commands::compile::execute(self.compile, &output)
    }
}

/// Route `log` records to stderr. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str, output: &OutputConfig) {
    let write_style = if output.use_color {
        WriteStyle::Always
    } else {
        WriteStyle::Never
    };
    // A logger may already be installed when running under tests.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .write_style(write_style)
        .try_init();
}
