//! # Result Reporting
//!
//! Turns a batch of [`BuildResult`]s into what the user sees: one line per
//! completed task while the batch runs, a summary afterwards, and optionally
//! a JSON Lines log on disk.
//!
//! Failed tasks are always shown with their command and diagnostic, even in
//! quiet mode. Formatting, color included, lives in `render_*` functions that
//! return strings; the printing wrappers only write them to stdout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::error::{Error, Result};
use crate::output::{paint, symbol, OutputConfig, Tone};
use crate::scheduler::ProgressSink;
use crate::task::{BuildResult, BuildTask};

/// File name of the persisted JSON Lines log.
pub const LOG_FILE_NAME: &str = "auto-latexmk.log";

/// Success and failure counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Count successes and failures.
pub fn summarize(results: &[BuildResult]) -> Summary {
    results.iter().fold(Summary::default(), |mut summary, result| {
        if result.succeeded() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        summary
    })
}

/// `k/N` with `k` right-aligned to the width of `N`.
pub fn counter(completed: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{:>width$}/{}", completed, total, width = width)
}

fn failure_details(result: &BuildResult) -> [String; 2] {
    [
        format!("full_command:\n{}", result.command_line()),
        format!("error_msg:\n{}", result.diagnostic().unwrap_or_default()),
    ]
}

/// A failure headline in red followed by its command and diagnostic.
fn render_failure(config: &OutputConfig, headline: &str, result: &BuildResult) -> String {
    let mut out = paint(config, Tone::Failure, headline);
    out.push('\n');
    for detail in failure_details(result) {
        out.push_str(&paint(config, Tone::Detail, &detail));
        out.push('\n');
    }
    out
}

/// The status line printed when a task completes.
pub fn render_progress_line(
    config: &OutputConfig,
    result: &BuildResult,
    completed: usize,
    total: usize,
) -> String {
    let mark = if result.succeeded() {
        symbol(config, "✓", "ok")
    } else {
        "x"
    };
    format!(
        " [{}] ({}) {} ({}) ({:.2}s)",
        mark,
        counter(completed, total),
        result.task.source_path.display(),
        result.task.engine,
        result.elapsed_seconds
    )
}

/// The end-of-batch report: counts, then every failed task.
pub fn render_summary(config: &OutputConfig, results: &[BuildResult]) -> String {
    let summary = summarize(results);
    let mut out = format!(
        "Succeeded: {}   Failed: {}\n",
        summary.succeeded, summary.failed
    );
    if summary.failed == 0 {
        return out;
    }

    out.push_str("Failed tasks:\n");
    for result in results.iter().filter(|r| !r.succeeded()) {
        let headline = format!(
            " [x] {} ({})",
            result.task.source_path.display(),
            result.task.engine
        );
        out.push_str(&render_failure(config, &headline, result));
    }
    out
}

/// Print the end-of-batch report and return its counts.
pub fn print_summary(config: &OutputConfig, results: &[BuildResult]) -> Summary {
    print!("{}", render_summary(config, results));
    summarize(results)
}

/// The `--dry-run` listing of planned tasks.
pub fn render_plan(tasks: &[BuildTask]) -> String {
    let total = tasks.len();
    let mut out = format!("[Dry-run] {} tasks detected:\n", total);
    for (i, task) in tasks.iter().enumerate() {
        out.push_str(&format!(
            "  ({}) {}  ({})\n",
            counter(i + 1, total),
            task.source_path.display(),
            task.engine
        ));
    }
    out.push_str("Dry-run finished. No compilation or pre-clean executed.\n");
    out
}

/// Write every result as one JSON object per line to `auto-latexmk.log` in `dir`.
///
/// Any existing log in `dir` is overwritten.
pub fn write_log(results: &[BuildResult], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(LOG_FILE_NAME);
    let log_error = |message: String| Error::LogWrite {
        path: path.clone(),
        message,
    };

    let file = File::create(&path).map_err(|e| log_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    for result in results {
        serde_json::to_writer(&mut writer, result).map_err(|e| log_error(e.to_string()))?;
        writer
            .write_all(b"\n")
            .map_err(|e| log_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| log_error(e.to_string()))?;

    debug!("Compilation results successfully written to {}", path.display());
    Ok(path)
}

/// Live terminal reporter used by the CLI.
///
/// Shows a progress bar while the batch runs (only when stdout is a
/// terminal) and prints a status line per result. In quiet mode only
/// failures are printed.
pub struct ConsoleReporter {
    config: OutputConfig,
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(config: OutputConfig, quiet: bool) -> Self {
        Self {
            config,
            quiet,
            bar: None,
        }
    }

    fn print(&self, f: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl ProgressSink for ConsoleReporter {
    fn on_start(&mut self, total: usize) {
        println!("Processing {} tasks in parallel...", total);
        if total == 0 || !console::Term::stdout().is_term() {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:30} {pos}/{len}")
        {
            bar.set_style(style);
        }
        self.bar = Some(bar);
    }

    fn on_result(&mut self, result: &BuildResult, completed: usize, total: usize) {
        if result.succeeded() && self.quiet {
            if let Some(bar) = &self.bar {
                bar.inc(1);
            }
            return;
        }

        let line = render_progress_line(&self.config, result, completed, total);
        let config = &self.config;
        self.print(|| {
            if result.succeeded() {
                println!("{}", paint(config, Tone::Success, &line));
            } else {
                print!("{}", render_failure(config, &line, result));
            }
        });
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
