//! Lazy traversal of a site tree.
//!
//! [`PageWalker`] wraps a depth-first [`walkdir`] traversal and filters it down
//! to the files the updater acts on. Nothing is collected up front: each call to
//! `next` reads only as much of the tree as it needs to find the next match, so
//! the driver can finish one page before the next one is discovered.
//!
//! ## Filters
//!
//! | Mode | Yields |
//! |------|--------|
//! | [`WalkMode::Pages`] | `*.html` files whose name does not start with `_` |
//! | [`WalkMode::Partials`] | `*.html` files whose name starts with `_` |
//!
//! Directories are always descended, whatever their name. Entries come back in
//! directory-listing order, which differs between platforms and filesystems;
//! callers must not rely on it being sorted.
//!
//! Symbolic links are not followed, so a link pointing back up the tree cannot
//! cause an endless walk.

use crate::naming;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Which side of the escape-marker convention to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Regular pages: markup files without the escape marker.
    Pages,
    /// Partials: markup files carrying the escape marker.
    Partials,
}

impl WalkMode {
    /// Whether a file name is collected in this mode.
    pub fn accepts(self, file_name: &str) -> bool {
        if !naming::is_markup(file_name) {
            return false;
        }
        match self {
            WalkMode::Pages => !naming::is_private(file_name),
            WalkMode::Partials => naming::is_private(file_name),
        }
    }
}

/// Depth-first iterator over matching files under a root.
///
/// Traversal errors (an unreadable directory, a file vanishing mid-walk) are
/// yielded as `Err` items; the walk continues past them.
pub struct PageWalker {
    entries: walkdir::IntoIter,
    mode: WalkMode,
}

impl PageWalker {
    pub fn new(root: impl AsRef<Path>, mode: WalkMode) -> Self {
        Self {
            entries: WalkDir::new(root).follow_links(false).into_iter(),
            mode,
        }
    }

    /// Walk the pages under `root`.
    pub fn pages(root: impl AsRef<Path>) -> Self {
        Self::new(root, WalkMode::Pages)
    }

    /// Walk the partial files under `dir`.
    pub fn partials(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, WalkMode::Partials)
    }

    pub fn mode(&self) -> WalkMode {
        self.mode
    }
}

impl Iterator for PageWalker {
    type Item = Result<PathBuf, walkdir::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };
            if !is_file(&entry) {
                continue;
            }
            if self.mode.accepts(&entry.file_name().to_string_lossy()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

fn is_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
