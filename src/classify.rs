//! # Main-File Classification
//!
//! Decides whether a `.tex` file is a compilable entry point and which
//! engine it needs. Everything here is a pure function of the file content
//! and the caller's mode/default engine.
//!
//! ## Main files
//!
//! A file is a main file when it contains `\documentclass` anywhere. The
//! first three lines may additionally carry a directive:
//!
//! ```latex
//! % auto-latexmk exclude
//! ```
//!
//! In [`InclusionMode::Default`] a file is built unless a directive says
//! `exclude` or `skip`. In [`InclusionMode::IncludeOnly`] a file is built
//! only when a directive says `include`.
//!
//! ## Engine detection
//!
//! 1. A first line like `% !TEX program = lualatex` wins outright.
//! 2. Otherwise, a line mentioning `ctex` before `\begin{document}` forces
//!    XeLaTeX.
//! 3. Otherwise the caller's default engine is used.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::task::{Engine, InclusionMode};

/// Marker of a top-level LaTeX document.
pub const DOCUMENT_ROOT_MARKER: &str = r"\documentclass";

/// Marker that ends the preamble.
pub const BODY_START_MARKER: &str = r"\begin{document}";

/// Preamble token that forces XeLaTeX (the `ctex` CJK packages and classes).
pub const CJK_MARKUP_TOKEN: &str = "ctex";

/// Only this many leading lines are checked for inclusion directives.
const DIRECTIVE_LINES: usize = 3;

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^%\s*auto-latexmk\b:?(.*)$").unwrap());

static ENGINE_OVERRIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^%\s*!TEX\b").unwrap());

/// Inclusion flags gathered from the leading directive lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Directives {
    include: bool,
    exclude: bool,
}

fn scan_directives<'a>(lines: impl Iterator<Item = &'a str>) -> Directives {
    let mut directives = Directives::default();
    for line in lines.take(DIRECTIVE_LINES) {
        let Some(captures) = DIRECTIVE_RE.captures(line.trim()) else {
            continue;
        };
        let keywords = captures[1].to_lowercase();
        if keywords.contains("exclude") || keywords.contains("skip") {
            directives.exclude = true;
        }
        if keywords.contains("include") {
            directives.include = true;
        }
    }
    directives
}

/// Classify already-loaded file content.
pub fn is_main_source(content: &str, mode: InclusionMode) -> bool {
    if !content.contains(DOCUMENT_ROOT_MARKER) {
        return false;
    }

    let directives = scan_directives(content.lines());
    match mode {
        InclusionMode::Default => !directives.exclude,
        InclusionMode::IncludeOnly => directives.include,
    }
}

/// Returns true when the file at `path` should be compiled under `mode`.
///
/// Unreadable files (including non-UTF-8 ones) are never main files.
pub fn is_main_file(path: &Path, mode: InclusionMode) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => is_main_source(&content, mode),
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            false
        }
    }
}

/// The engine chosen for a file, with the line that triggered the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineChoice {
    pub engine: Engine,
    pub note: Option<String>,
}

impl EngineChoice {
    fn default_for(engine: Engine) -> Self {
        Self { engine, note: None }
    }

    fn detected(engine: Engine, line: &str) -> Self {
        Self {
            engine,
            note: Some(line.to_string()),
        }
    }
}

fn engine_override(first_line: &str) -> Option<Engine> {
    if !ENGINE_OVERRIDE_RE.is_match(first_line) {
        return None;
    }
    let lowered = first_line.to_lowercase();
    Engine::ALL
        .into_iter()
        .find(|engine| lowered.contains(engine.program_name()))
}

/// Detect the engine from a line source, reading no further than needed.
pub fn detect_engine_in<R: BufRead>(
    reader: R,
    default_engine: Engine,
) -> io::Result<EngineChoice> {
    let mut lines = reader.lines();

    let Some(first) = lines.next().transpose()? else {
        return Ok(EngineChoice::default_for(default_engine));
    };
    let first = first.trim();
    if let Some(engine) = engine_override(first) {
        return Ok(EngineChoice::detected(engine, first));
    }

    let preamble = std::iter::once(Ok(first.to_string())).chain(lines);
    for line in preamble {
        let line = line?;
        let line = line.trim();
        if line.contains(BODY_START_MARKER) {
            break;
        }
        if line.contains(CJK_MARKUP_TOKEN) {
            return Ok(EngineChoice::detected(Engine::Xelatex, line));
        }
    }

    Ok(EngineChoice::default_for(default_engine))
}

/// Detect the engine for the file at `path`.
///
/// Read errors fall back to `default_engine` with no note.
pub fn detect_engine(path: &Path, default_engine: Engine) -> EngineChoice {
    let detected =
        File::open(path).and_then(|file| detect_engine_in(BufReader::new(file), default_engine));
    match detected {
        Ok(choice) => choice,
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            EngineChoice::default_for(default_engine)
        }
    }
}
