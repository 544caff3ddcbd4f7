//! Output formatting for updated pages.
//!
//! The [`Formatter`] trait is the seam between the updater and whatever
//! pretty-prints the serialized document. The production implementation is
//! [`Prettier`], which shells out to an external formatter; [`Unformatted`]
//! passes markup through untouched and backs `--no-format` and the tests.
//!
//! Whatever the formatter returns is finished with
//! [`tidy_boolean_attributes`] before it is written.

mod prettier;

pub use prettier::Prettier;

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{0}` not found. Please install it first, or run with --no-format")]
    NotFound(String),
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Formatter output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Turns a serialized page into its final on-disk form.
pub trait Formatter {
    /// Format `html`. `path` is the page being formatted, for formatters that
    /// pick options per file.
    fn format(&self, html: &str, path: &Path) -> Result<String, FormatError>;
}

/// Leaves markup exactly as serialized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unformatted;

impl Formatter for Unformatted {
    fn format(&self, html: &str, _path: &Path) -> Result<String, FormatError> {
        Ok(html.to_string())
    }
}

/// Drop the empty value the serializer writes for boolean-style attributes.
///
/// `<script defer="">` becomes `<script defer>`, `<head data-partial="">`
/// becomes `<head data-partial>`.
pub fn tidy_boolean_attributes(html: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"([\w\-])="""#).unwrap());
    re.replace_all(html, "$1").into_owned()
}
