//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, LaTeX snippets and a fake `latexmk`
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("a/main.tex", docs::ARTICLE);
//!     fixture.command().arg("--dry-run").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::docs;
    pub use super::TestFixture;
}

/// LaTeX sources used across tests.
#[allow(dead_code)]
pub mod docs {
    /// A minimal main document.
    pub const ARTICLE: &str = r"\documentclass{article}
\begin{document}
Hello.
\end{document}
";

    /// A main document that opts out of automatic builds.
    pub const EXCLUDED: &str = r"% auto-latexmk exclude
\documentclass{article}
\begin{document}
Not built.
\end{document}
";

    /// A main document that opts in under --only-include.
    pub const INCLUDED: &str = r"% auto-latexmk include
\documentclass{article}
\begin{document}
Built on request.
\end{document}
";

    /// A main document pinned to pdfLaTeX.
    pub const PDFLATEX: &str = r"% !TEX pdflatex
\documentclass{article}
\begin{document}
pdf.
\end{document}
";

    /// A main document using the ctex class, which needs XeLaTeX.
    pub const CTEX: &str = r"\documentclass{ctexart}
\begin{document}
你好
\end{document}
";

    /// A chapter fragment without \documentclass.
    pub const CHAPTER: &str = r"\section{Chapter}
Some text.
";
}

/// Body of the fake `latexmk`: fails for sources whose path contains
/// `broken`, hangs for `slow`, and otherwise writes a PDF next to the source.
#[allow(dead_code)]
pub const FAKE_LATEXMK: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  *broken*) echo "! LaTeX Error: broken document" >&2; exit 1 ;;
  *slow*) exec sleep 30 ;;
esac
touch "${last%.tex}.pdf"
exit 0
"#;

/// A test fixture that provides a temporary directory tree of `.tex` files.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("a/main.tex", docs::ARTICLE)
///     .with_file("a/chapter.tex", docs::CHAPTER);
///
/// fixture.command().arg("--dry-run").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create an empty directory.
    #[allow(dead_code)]
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Canonical form of the fixture root, as discovery reports it.
    #[allow(dead_code)]
    pub fn canonical_path(&self) -> PathBuf {
        self.path().canonicalize().expect("Failed to canonicalize")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Install the fake `latexmk` outside the scanned tree and return its path.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn fake_latexmk(&self, tools: &assert_fs::TempDir) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = tools.child("latexmk");
        script.write_str(FAKE_LATEXMK).expect("Failed to write fake latexmk");
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake latexmk executable");
        script.path().to_path_buf()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory with colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("auto-latexmk");
        cmd.current_dir(self.path())
            .env_remove("AUTO_LATEXMK_ENGINE")
            .env_remove("AUTO_LATEXMK_PROGRAM")
            .env_remove("AUTO_LATEXMK_TIMEOUT")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("a/b/main.tex", docs::ARTICLE);
        assert!(fixture.path().join("a/b/main.tex").exists());
    }
}
