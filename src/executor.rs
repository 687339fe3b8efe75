//! # Compilation Executor
//!
//! Runs `latexmk` for a single [`BuildTask`] and always returns a
//! [`BuildResult`], whatever happens to the subprocess.
//!
//! The output directory is the task's working directory and intermediate
//! files go to `<working_dir>/.aux`. Both are passed explicitly, so tasks in
//! different directories never write to the same place.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::discovery::AUX_DIR_NAME;
use crate::task::{BuildResult, BuildTask, Outcome};

/// Default wall-clock limit for one compilation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Default build tool.
pub const DEFAULT_PROGRAM: &str = "latexmk";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum time left for draining stderr after the tool exits near its deadline.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Appended to the diagnostic when stderr was still open at the deadline.
pub const STDERR_TRUNCATED: &str = "[stderr truncated: pipe still open at deadline]";

/// How to invoke the build tool.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Program to run, looked up on `PATH` when not a path.
    pub program: OsString,
    pub timeout: Duration,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            program: OsString::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The full argument vector for `task`, program first and source file last.
pub fn build_command(task: &BuildTask, options: &CompileOptions) -> Vec<String> {
    let out_dir = &task.working_dir;
    let aux_dir = task.working_dir.join(AUX_DIR_NAME);

    vec![
        options.program.to_string_lossy().into_owned(),
        "-file-line-error".to_string(),
        "-halt-on-error".to_string(),
        "-interaction=nonstopmode".to_string(),
        "-synctex=1".to_string(),
        task.engine.flag(),
        format!("-auxdir={}", path_arg(&aux_dir)),
        format!("-outdir={}", path_arg(out_dir)),
        path_arg(&task.source_path),
    ]
}

/// Compile one task. Never panics on subprocess failure and never returns an error.
pub fn execute(task: BuildTask, options: &CompileOptions) -> BuildResult {
    let invoked_command = build_command(&task, options);
    debug!(
        "Compiling {} ({})",
        task.source_path.display(),
        task.engine
    );
    debug!("Full command: {}", invoked_command.join(" "));

    let start = Instant::now();
    let outcome = run(&invoked_command, &task.working_dir, options.timeout);
    let elapsed_seconds = start.elapsed().as_secs_f64();

    match &outcome {
        Outcome::Succeeded => debug!("Successfully compiled {}", task.source_path.display()),
        Outcome::FailedTimeout => {
            error!("Compilation of {} timed out.", task.source_path.display())
        }
        Outcome::FailedExitCode { .. } => {
            error!("Failed to compile {}", task.source_path.display())
        }
        Outcome::FailedInternalError { message } => error!(
            "Error during compilation of {}: {}",
            task.source_path.display(),
            message
        ),
    }

    BuildResult {
        task,
        outcome,
        elapsed_seconds,
        invoked_command,
    }
}

fn run(command: &[String], working_dir: &Path, timeout: Duration) -> Outcome {
    let Some((program, args)) = command.split_first() else {
        return Outcome::FailedInternalError {
            message: "empty command".to_string(),
        };
    };

    let spawned = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return Outcome::FailedInternalError {
                message: e.to_string(),
            }
        }
    };

    let deadline = Instant::now() + timeout;
    let stderr_chunks = child.stderr.take().map(spawn_stderr_reader);

    // Readers are never joined: descendants of the tool may keep the pipe open.
    match wait_with_deadline(&mut child, deadline) {
        Ok(Some(status)) if status.success() => Outcome::Succeeded,
        Ok(Some(status)) => Outcome::FailedExitCode {
            code: status.code(),
            stderr: collect_stderr(stderr_chunks, deadline),
        },
        Ok(None) => Outcome::FailedTimeout,
        Err(e) => Outcome::FailedInternalError {
            message: e.to_string(),
        },
    }
}

/// Waits for `child`, killing it once `deadline` has passed.
///
/// Returns `Ok(None)` when the deadline was hit.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // Already-exited races surface as an error from kill; either way reap it.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Streams stderr in chunks; the channel closes at EOF or on a read error.
fn spawn_stderr_reader(mut pipe: ChildStderr) -> StderrChunks {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Ok(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    });
    rx
}

type StderrChunks = Receiver<std::io::Result<Vec<u8>>>;

/// Drains stderr until EOF or `deadline`, whichever comes first.
fn collect_stderr(chunks: Option<StderrChunks>, deadline: Instant) -> String {
    let Some(chunks) = chunks else {
        return String::new();
    };
    let deadline = deadline.max(Instant::now() + STDERR_GRACE);

    let mut bytes = Vec::new();
    let mut note = None;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match chunks.recv_timeout(remaining) {
            Ok(Ok(chunk)) => bytes.extend_from_slice(&chunk),
            Ok(Err(e)) => {
                note = Some(format!("failed to read stderr: {}", e));
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                debug!("stderr still open at deadline, keeping partial output");
                note = Some(STDERR_TRUNCATED.to_string());
                break;
            }
        }
    }

    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if let Some(note) = note {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&note);
    }
    text
}
