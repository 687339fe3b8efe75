//! # Error Handling
//!
//! Centralized error type for the `auto-latexmk` library, built with
//! `thiserror`.
//!
//! Errors here never cross a task boundary. Classification problems degrade
//! to "not a main file" or "default engine", and compilation problems are
//! folded into a failed [`BuildResult`](crate::task::BuildResult). What is
//! left are the failures of the batch machinery itself: building the worker
//! pool, writing the JSON log, and removing `.aux/` directories.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for auto-latexmk operations
#[derive(Error, Debug)]
pub enum Error {
    /// The JSON log could not be written.
    #[error("Failed to write log file {}: {message}", path.display())]
    LogWrite { path: PathBuf, message: String },

    /// An auxiliary directory could not be removed during pre-clean.
    #[error("Failed to delete {}: {message}", path.display())]
    Clean { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
