//! Page metadata propagated when the head partial is injected.
//!
//! The head partial is shared by every page, so it carries generic values.
//! Right after it lands in a page, the page-specific parts are put back:
//!
//! | Target | Source |
//! |--------|--------|
//! | `<title>` | the page's own title, captured before injection |
//! | `og:title` | trimmed text of the first `<h1>` |
//! | `og:url` | site origin + page path, `index.html` dropped |
//! | `og:description` | first `<p>`, trimmed, whitespace runs collapsed |
//!
//! A target missing from the partial is skipped. A missing source leaves the
//! target as the partial wrote it.

use crate::dom::{self, Document, DomError};
use std::path::{Component, Path};

const INDEX_FILE: &str = "index.html";

/// What [`propagate_head_metadata`] changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadMetadata {
    pub title_restored: bool,
    pub og_title: Option<String>,
    pub og_url: Option<String>,
    pub og_description: Option<String>,
}

/// Canonical absolute URL for a page.
///
/// The page path is taken relative to `root`, joined with `/`, and a trailing
/// `index.html` segment is dropped so directory indexes end in `/`.
///
/// ```
/// use partial_pages::metadata::canonical_url;
/// use std::path::Path;
///
/// let url = canonical_url(
///     "https://jakemiki.me",
///     Path::new("/site"),
///     Path::new("/site/blog/index.html"),
/// );
/// assert_eq!(url, "https://jakemiki.me/blog/");
/// ```
pub fn canonical_url(origin: &str, root: &Path, page: &Path) -> String {
    let relative = page.strip_prefix(root).unwrap_or(page);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let mut path = segments.join("/");
    if path == INDEX_FILE {
        path.clear();
    } else if let Some(dir) = path.strip_suffix(INDEX_FILE)
        && dir.ends_with('/')
    {
        path.truncate(dir.len());
    }

    format!("{}/{}", origin.trim_end_matches('/'), path)
}

/// Fill page-specific head values after the head partial was injected.
///
/// `page_title` is the page title from before injection, empty when the page
/// had no `<title>`. It always replaces the partial's generic title.
pub fn propagate_head_metadata(
    document: &Document,
    page_title: &str,
    url: &str,
) -> Result<HeadMetadata, DomError> {
    let mut applied = HeadMetadata {
        title_restored: document.set_title(page_title),
        ..HeadMetadata::default()
    };

    if let Some(meta) = document.meta_property("og:title")?
        && let Some(heading) = document.first_text("h1")?
    {
        dom::set_attribute(&meta, "content", &heading);
        applied.og_title = Some(heading);
    }

    if let Some(meta) = document.meta_property("og:url")? {
        dom::set_attribute(&meta, "content", url);
        applied.og_url = Some(url.to_string());
    }

    if let Some(meta) = document.meta_property("og:description")?
        && let Some(paragraph) = document.first_text("p")?
    {
        let description = dom::collapse_whitespace(&paragraph);
        dom::set_attribute(&meta, "content", &description);
        applied.og_description = Some(description);
    }

    Ok(applied)
}
