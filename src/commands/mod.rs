//! # CLI Command Implementations
//!
//! `auto-latexmk` has a single command. Its arguments and `execute` function
//! live in [`compile`]; the `execute` function orchestrates discovery,
//! pre-clean, the parallel build and reporting by calling into the
//! `auto_latexmk` library.

pub mod compile;
