//! Compile command implementation
//!
//! Runs the whole pipeline over one root directory:
//! 1. Optional pre-clean of `.aux/` directories
//! 2. Discovery of main `.tex` files
//! 3. Parallel compilation with `latexmk`
//! 4. Summary report, plus the JSON log when requested
//!
//! `--dry-run` stops after discovery and touches nothing on disk.

use anyhow::Result;
use clap::builder::RangedU64ValueParser;
use clap::Args;
use log::{debug, error};
use std::path::PathBuf;
use std::time::Duration;

use auto_latexmk::clean::clean_aux_dirs;
use auto_latexmk::discovery::discover;
use auto_latexmk::executor::{CompileOptions, DEFAULT_PROGRAM};
use auto_latexmk::output::OutputConfig;
use auto_latexmk::report::{print_summary, render_plan, write_log, ConsoleReporter};
use auto_latexmk::scheduler::{default_jobs, run_all};
use auto_latexmk::task::{Engine, InclusionMode};

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Root directory to search for .tex files
    #[arg(value_name = "ROOT_DIR", default_value = ".")]
    pub root_dir: PathBuf,

    /// Enable verbose output and write the JSON log
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: only show failed tasks while compiling
    #[arg(short, long)]
    pub quiet: bool,

    /// Default LaTeX engine for files that do not ask for one
    #[arg(
        long,
        value_enum,
        default_value_t = Engine::Xelatex,
        env = "AUTO_LATEXMK_ENGINE"
    )]
    pub engine: Engine,

    /// Remove .aux/ directories before compiling
    #[arg(long)]
    pub pre_clean: bool,

    /// Do not compile .tex files
    #[arg(long)]
    pub no_compile: bool,

    /// Only compile files explicitly marked with '% auto-latexmk include'
    #[arg(long)]
    pub only_include: bool,

    /// Show which .tex files would be compiled without compiling or cleaning
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// The latexmk executable to run
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_PROGRAM,
        env = "AUTO_LATEXMK_PROGRAM"
    )]
    pub latexmk: PathBuf,

    /// Per-file compilation timeout in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 180,
        env = "AUTO_LATEXMK_TIMEOUT",
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub timeout: u64,

    /// Number of parallel workers (defaults to the number of CPUs)
    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub jobs: Option<usize>,

    /// Write auto-latexmk.log to the current directory even without --verbose
    #[arg(long)]
    pub log: bool,
}

/// Execute the compile command
pub fn execute(args: CompileArgs, output: &OutputConfig) -> Result<()> {
    let mode = InclusionMode::from_only_include(args.only_include);

    debug!("Root directory: {}", args.root_dir.display());
    debug!("Default engine: {}", args.engine);
    debug!("Only include mode: {}", args.only_include);

    if args.dry_run {
        let tasks = discover(&args.root_dir, args.engine, mode);
        print!("{}", render_plan(&tasks));
        return Ok(());
    }

    if args.pre_clean {
        let report = clean_aux_dirs(&args.root_dir);
        debug!("Removed {} .aux directories", report.removed.len());
        println!("Pre-clean completed.");
    }

    if args.no_compile {
        println!("Compilation skipped.");
        return Ok(());
    }

    let tasks = discover(&args.root_dir, args.engine, mode);
    let options = CompileOptions {
        program: args.latexmk.into_os_string(),
        timeout: Duration::from_secs(args.timeout),
    };
    let jobs = args.jobs.unwrap_or_else(default_jobs);

    let mut reporter = ConsoleReporter::new(output.clone(), args.quiet);
    let results = run_all(tasks, &options, jobs, &mut reporter)?;
    print_summary(output, &results);

    if args.verbose || args.log {
        let cwd = std::env::current_dir()?;
        if let Err(e) = write_log(&results, &cwd) {
            error!("{}", e);
        }
    }

    Ok(())
}
