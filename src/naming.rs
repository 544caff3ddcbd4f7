//! Centralized filename conventions for pages and partials.
//!
//! Every file the updater cares about is an `.html` file. A leading `_` (the
//! escape marker) makes a file private: it is never treated as a page, and
//! partials live in files named this way.
//!
//! ## Partial Names
//!
//! A partial's name is its file name with the marker and extension removed:
//! - `_head.html` → `head`
//! - `_site-footer.html` → `site-footer`
//! - `index.html` → not a partial (no marker)
//! - `_notes.txt` → not a partial (not markup)

use std::path::Path;

/// Leading character that hides a file from the page walk.
pub const ESCAPE_MARKER: char = '_';

/// Extension shared by pages and partials.
pub const MARKUP_EXTENSION: &str = ".html";

/// Whether a file name ends with the markup extension.
pub fn is_markup(file_name: &str) -> bool {
    file_name.ends_with(MARKUP_EXTENSION)
}

/// Whether a file name starts with the escape marker.
pub fn is_private(file_name: &str) -> bool {
    file_name.starts_with(ESCAPE_MARKER)
}

/// Extract the partial name from a file name like `_head.html`.
///
/// Returns `None` for anything that isn't a private markup file, and for a
/// bare `_.html` which would yield an empty name.
pub fn partial_name(file_name: &str) -> Option<String> {
    let name = file_name
        .strip_prefix(ESCAPE_MARKER)?
        .strip_suffix(MARKUP_EXTENSION)?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// File name holding the partial called `name`.
pub fn partial_file_name(name: &str) -> String {
    format!("{ESCAPE_MARKER}{name}{MARKUP_EXTENSION}")
}

/// Lossy file name of a path, empty when the path has none.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
