//! Property-based tests for main-file classification.
//!
//! These tests use proptest to generate random file contents and verify that
//! the inclusion and engine-detection rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::classify::{detect_engine_in, is_main_source};
    use crate::task::{Engine, InclusionMode};
    use proptest::prelude::*;
    use std::io::Cursor;

    fn any_engine() -> impl Strategy<Value = Engine> {
        prop::sample::select(Engine::ALL.to_vec())
    }

    fn any_mode() -> impl Strategy<Value = InclusionMode> {
        prop_oneof![Just(InclusionMode::Default), Just(InclusionMode::IncludeOnly)]
    }

    /// Arbitrary lines that never contain a backslash, so never a `\documentclass`.
    fn body_without_marker() -> impl Strategy<Value = String> {
        prop::collection::vec("[^\\\\\n]{0,40}", 0..20).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        /// Property: a file without `\documentclass` is never a main file
        #[test]
        fn no_root_marker_is_never_main(body in body_without_marker(), mode in any_mode()) {
            prop_assert!(!is_main_source(&body, mode));
            let with_include = format!("% auto-latexmk include\n{}", body);
            prop_assert!(!is_main_source(&with_include, mode));
        }

        /// Property: exclude/skip in the first three lines excludes in both modes
        #[test]
        fn exclude_directive_always_excludes(
            keyword in prop::sample::select(vec!["exclude", "skip", "EXCLUDE", "Skip"]),
            position in 0usize..3,
            mode in any_mode(),
        ) {
            let mut lines = vec!["%".to_string(); 3];
            lines[position] = format!("% auto-latexmk {}", keyword);
            let content = format!("{}\n\\documentclass{{article}}\n", lines.join("\n"));
            prop_assert!(!is_main_source(&content, mode));
        }

        /// Property: include-only mode keeps files marked include
        #[test]
        fn include_directive_selects_in_include_only_mode(position in 0usize..3, body in body_without_marker()) {
            let mut lines = vec!["%".to_string(); 3];
            lines[position] = "% auto-latexmk include".to_string();
            let content = format!("{}\n\\documentclass{{book}}\n{}", lines.join("\n"), body);
            prop_assert!(is_main_source(&content, InclusionMode::IncludeOnly));
            prop_assert!(is_main_source(&content, InclusionMode::Default));
        }

        /// Property: the first-line override beats both ctex and the default
        #[test]
        fn first_line_override_wins(engine in any_engine(), default in any_engine()) {
            let content = format!(
                "% !TEX program = {}\n\\documentclass{{ctexart}}\n\\usepackage{{ctex}}\n\\begin{{document}}\n",
                engine.program_name()
            );
            let choice = detect_engine_in(Cursor::new(content), default).unwrap();
            prop_assert_eq!(choice.engine, engine);
        }

        /// Property: without override or ctex, the default engine is used verbatim
        #[test]
        fn default_engine_is_used_verbatim(default in any_engine(), body in body_without_marker()) {
            prop_assume!(!body.contains("ctex") && !body.trim_start().starts_with('%'));
            let content = format!("{}\n\\begin{{document}}\nctex\n", body);
            let choice = detect_engine_in(Cursor::new(content), default).unwrap();
            prop_assert_eq!(choice.engine, default);
            prop_assert_eq!(choice.note, None);
        }

        /// Property: classification is deterministic
        #[test]
        fn classification_is_deterministic(body in ".{0,200}", mode in any_mode()) {
            prop_assert_eq!(is_main_source(&body, mode), is_main_source(&body, mode));
        }
    }
}
