//! CLI output formatting for a finished run.
//!
//! Per-page progress goes through `tracing` while the run happens. Once the
//! walk is exhausted, a summary groups pages by outcome, with paths shown
//! relative to the site root:
//!
//! ```text
//! Updated
//! 001 index.html
//! 002 blog/index.html
//!
//! Failed
//! 001 drafts/broken.html
//!     No partial named 'sidebar'
//!
//! Updated 2 pages, 5 unchanged, 1 failed
//! ```
//!
//! Unchanged pages are only counted, not listed.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O, so they can be
//! tested directly; `print_*` wrappers write them to stdout.

use crate::update::{PageFailure, UpdateSummary};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to the site root, with `/` separators.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn failure_lines(index: usize, failure: &PageFailure, root: &Path) -> Vec<String> {
    let header = match &failure.path {
        Some(path) => display_path(path, root),
        None => "(site walk)".to_string(),
    };
    vec![
        format!("{} {}", format_index(index), header),
        format!("{}{}", indent(1), failure.error),
    ]
}

/// Format the end-of-run summary.
pub fn format_summary(summary: &UpdateSummary, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.updated.is_empty() {
        lines.push("Updated".to_string());
        for (i, path) in summary.updated.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), display_path(path, root)));
        }
        lines.push(String::new());
    }

    if !summary.failed.is_empty() {
        lines.push("Failed".to_string());
        for (i, failure) in summary.failed.iter().enumerate() {
            lines.extend(failure_lines(i + 1, failure, root));
        }
        lines.push(String::new());
    }

    if summary.total() == 0 {
        lines.push(format!("No pages found under {}", root.display()));
    } else {
        lines.push(format!(
            "Updated {}, {} unchanged, {} failed",
            plural(summary.updated.len(), "page"),
            summary.unchanged.len(),
            summary.failed.len()
        ));
    }

    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(summary: &UpdateSummary, root: &Path) {
    for line in format_summary(summary, root) {
        println!("{}", line);
    }
}
