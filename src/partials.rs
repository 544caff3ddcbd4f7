//! Partial registry: named HTML fragments shared across pages.
//!
//! # Design
//!
//! Building the registry only *indexes* the partials directory: every
//! `_name.html` file found (recursively) becomes an empty slot keyed by
//! `name`. When two files define the same name, the one nearest the top of the
//! directory wins (ties go to the first path in sort order) and a warning
//! names both. Nothing is read or parsed until a page asks for that partial, so
//! partials a site no longer references cost nothing.
//!
//! The first [`PartialRegistry::resolve`] for a name reads the file, parses it,
//! and keeps the element carrying the marker attribute. Later lookups return
//! the cached [`Partial`] without touching the filesystem again; the cache
//! lives as long as the registry, which the driver creates once per run.
//!
//! ## Copies, not moves
//!
//! A cached partial is shared by every page that references it. Inserting the
//! cached node itself would move it out of the cache on the first page and
//! leave later pages with a detached, empty node. [`Partial::instantiate`]
//! hands out a deep copy per insertion instead.

use crate::dom::{self, Document};
use crate::naming;
use crate::walk::PageWalker;
use kuchikiki::NodeRef;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug)]
pub enum PartialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot index partials: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No partial named '{0}'")]
    UnknownPartial(String),
    #[error("Partial '{name}' has no element marked with {attribute}: {path}")]
    MissingMarker {
        name: String,
        attribute: String,
        path: PathBuf,
    },
    #[error("Partial file is not valid UTF-8: {0}")]
    Encoding(PathBuf),
}

/// A resolved partial: the marked element from a partial file.
#[derive(Debug)]
pub struct Partial {
    name: String,
    source: PathBuf,
    content: NodeRef,
}

impl Partial {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the partial was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The cached node. Never insert this directly; see [`Partial::instantiate`].
    pub fn content(&self) -> &NodeRef {
        &self.content
    }

    /// A fresh copy of the partial, ready to insert into a page.
    ///
    /// The copy's marker attribute is set to the partial name, so the region
    /// stays a placeholder and a later run refreshes it in place.
    pub fn instantiate(&self, marker_attribute: &str) -> NodeRef {
        let copy = dom::deep_clone(&self.content);
        if let Some(element) = copy.clone().into_element_ref() {
            dom::set_attribute(&element, marker_attribute, &self.name);
        }
        copy
    }
}

/// Slot for one indexed partial; filled on first lookup.
#[derive(Debug)]
struct Slot {
    path: PathBuf,
    partial: Option<Partial>,
}

/// Lazily loaded, process-lifetime cache of partials.
#[derive(Debug)]
pub struct PartialRegistry {
    marker_attribute: String,
    slots: BTreeMap<String, Slot>,
}

impl PartialRegistry {
    /// Index every partial file under `dir` without reading any of them.
    ///
    /// A missing or unreadable directory is an error: every page would fail
    /// anyway.
    pub fn index(dir: &Path, marker_attribute: &str) -> Result<Self, PartialError> {
        let mut slots = BTreeMap::new();
        for path in PageWalker::partials(dir) {
            let path = path?;
            let Some(name) = naming::partial_name(&naming::file_name_of(&path)) else {
                continue;
            };
            match slots.entry(name) {
                Entry::Vacant(entry) => {
                    trace!(partial = %entry.key(), path = %path.display(), "indexed partial");
                    entry.insert(Slot {
                        path,
                        partial: None,
                    });
                }
                Entry::Occupied(mut entry) => {
                    let slot = entry.get_mut();
                    let ignored = if precedence(&path) < precedence(&slot.path) {
                        std::mem::replace(&mut slot.path, path)
                    } else {
                        path
                    };
                    warn!(
                        partial = %entry.key(),
                        kept = %entry.get().path.display(),
                        ignored = %ignored.display(),
                        "duplicate partial name, keeping the shallowest file"
                    );
                }
            }
        }
        debug!(count = slots.len(), dir = %dir.display(), "indexed partials");
        Ok(Self {
            marker_attribute: marker_attribute.to_string(),
            slots,
        })
    }

    /// Names of every indexed partial, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `name` has already been read and parsed.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.partial.is_some())
    }

    /// Look up a partial, loading it on first use.
    pub fn resolve(&mut self, name: &str) -> Result<&Partial, PartialError> {
        let marker_attribute = &self.marker_attribute;
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| PartialError::UnknownPartial(name.to_string()))?;

        let partial = match slot.partial.take() {
            Some(partial) => {
                trace!(partial = name, "partial cache hit");
                partial
            }
            None => {
                debug!(partial = name, path = %slot.path.display(), "loading partial");
                load_partial(name, &slot.path, marker_attribute)?
            }
        };
        Ok(slot.partial.insert(partial))
    }
}

/// Ordering among files that define the same name: fewer path components
/// first, then path order.
fn precedence(path: &Path) -> (usize, &Path) {
    (path.components().count(), path)
}

fn load_partial(name: &str, path: &Path, marker_attribute: &str) -> Result<Partial, PartialError> {
    let bytes = fs::read(path)?;
    let html = String::from_utf8(bytes).map_err(|_| PartialError::Encoding(path.to_path_buf()))?;
    let document = Document::parse(&html);

    let missing = || PartialError::MissingMarker {
        name: name.to_string(),
        attribute: marker_attribute.to_string(),
        path: path.to_path_buf(),
    };
    // The attribute is validated by config, so a selector error means "not found".
    let element = document
        .select_first(&format!("[{marker_attribute}]"))
        .ok()
        .flatten()
        .ok_or_else(missing)?;

    let content = element.as_node().clone();
    content.detach();
    Ok(Partial {
        name: name.to_string(),
        source: path.to_path_buf(),
        content,
    })
}
