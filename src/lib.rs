//! # auto-latexmk
//!
//! Finds the main LaTeX documents in a directory tree and builds all of them
//! in parallel with `latexmk`, then reports which builds failed and why.
//!
//! ## Quick Example
//!
//! ```no_run
//! use auto_latexmk::discovery::discover;
//! use auto_latexmk::executor::CompileOptions;
//! use auto_latexmk::report::summarize;
//! use auto_latexmk::scheduler::{default_jobs, run_all, NoProgress};
//! use auto_latexmk::task::{Engine, InclusionMode};
//! use std::path::Path;
//!
//! let tasks = discover(Path::new("thesis"), Engine::Xelatex, InclusionMode::Default);
//! let results = run_all(tasks, &CompileOptions::default(), default_jobs(), &mut NoProgress)?;
//! let summary = summarize(&results);
//! println!("{} built, {} failed", summary.succeeded, summary.failed);
//! # Ok::<(), auto_latexmk::error::Error>(())
//! ```
//!
//! ## Execution Flow
//!
//! 1.  **Discovery (`discovery`)**: Walk the tree, skipping `.git` and `.aux`,
//!     and keep every `.tex` file the classifier accepts.
//! 2.  **Classification (`classify`)**: Decide from file content whether a
//!     file is a main document and which engine it needs.
//! 3.  **Scheduling (`scheduler`)**: Run one `latexmk` per task on a worker
//!     pool, streaming results back as they finish.
//! 4.  **Execution (`executor`)**: Invoke `latexmk` with a timeout and turn
//!     every outcome into a `BuildResult`.
//! 5.  **Reporting (`report`)**: Print progress and a summary, and optionally
//!     persist a JSON Lines log.
//!
//! `clean` removes `.aux/` directories ahead of a run.

pub mod classify;
pub mod clean;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod output;
pub mod report;
pub mod scheduler;
pub mod task;

#[cfg(test)]
mod classify_proptest;
