//! # Parallel Scheduler
//!
//! Fans a batch of [`BuildTask`]s out over a fixed-size `rayon` thread pool
//! and hands each [`BuildResult`] to a [`ProgressSink`] as soon as it
//! completes.
//!
//! Workers never share mutable state. Each one owns its task, runs it inside
//! a panic boundary and sends the result down an `mpsc` channel. The calling
//! thread is the only consumer of that channel, so the completion counter and
//! all progress output live in one place.
//!
//! Every task is attempted exactly once. A panicking worker still produces a
//! result: a [`Outcome::FailedInternalError`] carrying the panic message.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::{debug, error};

use crate::error::Result;
use crate::executor::{self, CompileOptions};
use crate::task::{BuildResult, BuildTask, Outcome};

/// Receives scheduler events on the coordinating thread.
pub trait ProgressSink {
    /// Called once before any result arrives.
    fn on_start(&mut self, _total: usize) {}

    /// Called for each result, in completion order. `completed` runs from 1 to `total`.
    fn on_result(&mut self, result: &BuildResult, completed: usize, total: usize);

    /// Called once after the last result.
    fn on_finish(&mut self) {}
}

/// A sink that discards every event.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_result(&mut self, _result: &BuildResult, _completed: usize, _total: usize) {}
}

/// Number of workers used when none is requested: the host's available parallelism.
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Compile every task with `latexmk` on `jobs` workers.
pub fn run_all(
    tasks: Vec<BuildTask>,
    options: &CompileOptions,
    jobs: usize,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<BuildResult>> {
    let options = options.clone();
    run_with(tasks, jobs, progress, move |task| executor::execute(task, &options))
}

/// Run `compile` for every task on `jobs` workers, reporting results as they complete.
///
/// The returned vector is in completion order and holds one result per task.
pub fn run_with<F>(
    tasks: Vec<BuildTask>,
    jobs: usize,
    progress: &mut dyn ProgressSink,
    compile: F,
) -> Result<Vec<BuildResult>>
where
    F: Fn(BuildTask) -> BuildResult + Send + Sync + 'static,
{
    let total = tasks.len();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("auto-latexmk-worker-{}", i))
        // Only reached if a job panics outside its own boundary; its result is then lost.
        .panic_handler(|payload| error!("Error running task: {}", panic_message(&*payload)))
        .build()?;
    debug!("Running {} tasks on {} workers", total, pool.current_num_threads());

    let compile = Arc::new(compile);
    let (tx, rx) = mpsc::channel();
    for task in tasks {
        let tx = tx.clone();
        let compile = Arc::clone(&compile);
        pool.spawn(move || {
            let fallback = task.clone();
            let result = panic::catch_unwind(AssertUnwindSafe(|| (*compile)(task)))
                .unwrap_or_else(|payload| worker_panicked(fallback, &*payload));
            // The receiver lives until every sender is gone.
            let _ = tx.send(result);
        });
    }
    drop(tx);

    progress.on_start(total);
    let mut results = Vec::with_capacity(total);
    for result in rx {
        let completed = results.len() + 1;
        progress.on_result(&result, completed, total);
        results.push(result);
    }
    progress.on_finish();

    if results.len() != total {
        error!(
            "{} of {} tasks produced no result",
            total - results.len(),
            total
        );
    }

    Ok(results)
}

fn worker_panicked(task: BuildTask, payload: &(dyn Any + Send)) -> BuildResult {
    let message = format!("worker panicked: {}", panic_message(payload));
    error!(
        "Error running task: {} ({})",
        task.source_path.display(),
        message
    );
    BuildResult {
        task,
        outcome: Outcome::FailedInternalError { message },
        elapsed_seconds: 0.0,
        invoked_command: Vec::new(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
