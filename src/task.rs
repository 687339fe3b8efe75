//! # Build Tasks and Results
//!
//! The value types that flow through the pipeline: discovery produces
//! [`BuildTask`]s, the executor turns each one into exactly one
//! [`BuildResult`], and the reporter consumes the results.
//!
//! Both types are plain owned data. They are moved across the worker pool
//! boundary by value and never mutated after construction.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// The LaTeX engine `latexmk` should drive for a given file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Engine {
    /// XeLaTeX, the default engine.
    Xelatex,
    /// pdfLaTeX. Reported under its `latexmk` alias `pdf`.
    Pdflatex,
    /// LuaLaTeX.
    Lualatex,
}

impl Engine {
    /// All supported engines, in the order the `% !TEX` directive is checked.
    pub const ALL: [Engine; 3] = [Engine::Xelatex, Engine::Pdflatex, Engine::Lualatex];

    /// The engine's program name as written in `% !TEX` directives.
    pub fn program_name(self) -> &'static str {
        match self {
            Engine::Xelatex => "xelatex",
            Engine::Pdflatex => "pdflatex",
            Engine::Lualatex => "lualatex",
        }
    }

    /// The short name used on the `latexmk` command line and in reports.
    ///
    /// `pdflatex` is normalized to `latexmk`'s canonical `pdf` alias.
    pub fn alias(self) -> &'static str {
        match self {
            Engine::Xelatex => "xelatex",
            Engine::Pdflatex => "pdf",
            Engine::Lualatex => "lualatex",
        }
    }

    /// The `latexmk` flag selecting this engine, e.g. `-xelatex`.
    pub fn flag(self) -> String {
        format!("-{}", self.alias())
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl Serialize for Engine {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.alias())
    }
}

/// How `% auto-latexmk` directives select files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InclusionMode {
    /// Every main file is built unless it says `exclude` or `skip`.
    #[default]
    Default,
    /// Only main files that say `include` are built.
    IncludeOnly,
}

impl InclusionMode {
    pub fn from_only_include(only_include: bool) -> Self {
        if only_include {
            InclusionMode::IncludeOnly
        } else {
            InclusionMode::Default
        }
    }
}

/// A main `.tex` file selected for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    /// Absolute path of the main file. Always lives directly in `working_dir`.
    pub source_path: PathBuf,
    /// Directory `latexmk` runs in; also receives the PDF and the `.aux/` directory.
    pub working_dir: PathBuf,
    pub engine: Engine,
    /// The line that decided the engine, when it was not the default.
    pub detection_note: Option<String>,
}

/// Terminal state of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    FailedExitCode {
        /// `None` when the process was ended by a signal.
        code: Option<i32>,
        stderr: String,
    },
    FailedTimeout,
    FailedInternalError {
        message: String,
    },
}

impl Outcome {
    /// Diagnostic text recorded for timed-out compilations.
    pub const TIMEOUT_MESSAGE: &'static str = "Compilation timed out.";

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    /// Stable name of the state, as written to the JSON log.
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::FailedExitCode { .. } => "failed_exit_code",
            Outcome::FailedTimeout => "failed_timeout",
            Outcome::FailedInternalError { .. } => "failed_internal_error",
        }
    }

    /// Error text for failed outcomes, `None` on success.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded => None,
            Outcome::FailedExitCode { stderr, .. } => Some(stderr.as_str()),
            Outcome::FailedTimeout => Some(Self::TIMEOUT_MESSAGE),
            Outcome::FailedInternalError { message } => Some(message.as_str()),
        }
    }
}

/// The outcome of compiling one [`BuildTask`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    pub task: BuildTask,
    pub outcome: Outcome,
    pub elapsed_seconds: f64,
    /// Exact argument vector handed to the build tool, program first.
    pub invoked_command: Vec<String>,
}

impl BuildResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.outcome.diagnostic()
    }

    /// The invoked command joined with spaces, for display.
    pub fn command_line(&self) -> String {
        self.invoked_command.join(" ")
    }
}

/// Flat on-disk shape of a [`BuildResult`], one JSON object per log line.
#[derive(Serialize)]
struct BuildResultRecord<'a> {
    source_path: &'a PathBuf,
    working_dir: &'a PathBuf,
    engine: Engine,
    detection_note: Option<&'a str>,
    succeeded: bool,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    elapsed_seconds: f64,
    diagnostic: Option<&'a str>,
    invoked_command: &'a [String],
}

impl Serialize for BuildResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let exit_code = match &self.outcome {
            Outcome::FailedExitCode { code, .. } => *code,
            _ => None,
        };
        BuildResultRecord {
            source_path: &self.task.source_path,
            working_dir: &self.task.working_dir,
            engine: self.task.engine,
            detection_note: self.task.detection_note.as_deref(),
            succeeded: self.succeeded(),
            outcome: self.outcome.name(),
            exit_code,
            elapsed_seconds: self.elapsed_seconds,
            diagnostic: self.diagnostic(),
            invoked_command: &self.invoked_command,
        }
        .serialize(serializer)
    }
}
