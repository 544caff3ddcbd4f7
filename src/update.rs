//! Page updates: inject partials, patch head metadata, format, write back.
//!
//! ## Pipeline per page
//!
//! ```text
//! read → parse → capture title → replace placeholders → serialize
//!      → format → tidy boolean attributes → write (if changed)
//! ```
//!
//! Every step up to the write happens in memory, so a failure anywhere leaves
//! the file on disk exactly as it was.
//!
//! ## Driving a run
//!
//! [`update_pages`] takes pages from the walker one at a time and finishes
//! each (including the formatter round trip and the write) before asking for
//! the next. Errors stop only the page they belong to: they are logged with the
//! page path, recorded in the [`UpdateSummary`], and the walk moves on.

use crate::config::LoadedConfig;
use crate::dom::{self, Document, DomError};
use crate::formatter::{FormatError, Formatter, Prettier, Unformatted, tidy_boolean_attributes};
use crate::metadata::{self, HeadMetadata};
use crate::partials::{PartialError, PartialRegistry};
use crate::walk::PageWalker;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Page is not valid UTF-8: {0}")]
    Parse(#[from] std::string::FromUtf8Error),
    #[error("Document error: {0}")]
    Dom(#[from] DomError),
    #[error(transparent)]
    Partial(#[from] PartialError),
    #[error("Formatting failed: {0}")]
    Format(#[from] FormatError),
}

/// Per-run settings shared by every page.
#[derive(Debug, Clone)]
pub struct UpdateSettings {
    /// Site root; page URLs are built relative to it.
    pub root: PathBuf,
    /// Origin prepended to page paths for `og:url`.
    pub site_origin: String,
    /// Attribute naming the partial a placeholder wants.
    pub marker_attribute: String,
    /// Partial that triggers head metadata propagation.
    pub head_partial: String,
}

impl UpdateSettings {
    pub fn from_config(root: impl Into<PathBuf>, loaded: &LoadedConfig) -> Self {
        let config = &loaded.config;
        Self {
            root: root.into(),
            site_origin: config.origin().to_string(),
            marker_attribute: config.marker_attribute.clone(),
            head_partial: config.head_partial.clone(),
        }
    }

    /// Canonical URL of `page`.
    pub fn page_url(&self, page: &Path) -> String {
        metadata::canonical_url(&self.site_origin, &self.root, page)
    }
}

/// A page after partial injection, before formatting.
#[derive(Debug, Clone)]
pub struct TransformedPage {
    pub html: String,
    /// Partial names injected, in document order.
    pub replaced: Vec<String>,
    /// Metadata applied when the head partial was injected.
    pub head: Option<HeadMetadata>,
}

/// What happened to a page that was processed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The file was rewritten.
    Updated,
    /// The result matched the file on disk; nothing was written.
    Unchanged,
}

/// Inject partials into a page's markup.
///
/// `page` is only used to build the canonical URL; nothing is read or written.
pub fn transform_page(
    html: &str,
    page: &Path,
    settings: &UpdateSettings,
    registry: &mut PartialRegistry,
) -> Result<TransformedPage, UpdateError> {
    let document = Document::parse(html);
    // Injecting the head partial replaces the page's <title>. An untitled
    // page counts as titled "".
    let page_title = document.title().unwrap_or_default();

    let mut replaced = Vec::new();
    let mut head = None;

    for placeholder in document.placeholders(&settings.marker_attribute)? {
        debug!(partial = %placeholder.name, "replacing partial");
        let partial = registry.resolve(&placeholder.name)?;
        let content = partial.instantiate(&settings.marker_attribute);
        dom::replace(placeholder.element.as_node(), content);

        if placeholder.name == settings.head_partial {
            let url = settings.page_url(page);
            head = Some(metadata::propagate_head_metadata(
                &document,
                &page_title,
                &url,
            )?);
        }
        replaced.push(placeholder.name);
    }

    Ok(TransformedPage {
        html: document.serialize()?,
        replaced,
        head,
    })
}

/// Update one page in place.
pub fn update_page(
    page: &Path,
    settings: &UpdateSettings,
    registry: &mut PartialRegistry,
    formatter: &dyn Formatter,
) -> Result<PageOutcome, UpdateError> {
    let original = String::from_utf8(fs::read(page)?)?;
    let transformed = transform_page(&original, page, settings, registry)?;
    debug!(partials = ?transformed.replaced, "injected partials");
    if let Some(head) = &transformed.head {
        debug!(
            title_restored = head.title_restored,
            og_title = ?head.og_title,
            og_url = ?head.og_url,
            og_description = ?head.og_description,
            "applied head metadata"
        );
    }
    let formatted = formatter.format(&transformed.html, page)?;
    let output = tidy_boolean_attributes(&formatted);

    if output == original {
        return Ok(PageOutcome::Unchanged);
    }
    fs::write(page, output)?;
    Ok(PageOutcome::Updated)
}

/// A page (or walk step) that failed.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// `None` when the walk itself failed before naming a page.
    pub path: Option<PathBuf>,
    pub error: String,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub failed: Vec<PageFailure>,
}

impl UpdateSummary {
    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Update every page the iterator yields, one after another.
pub fn update_pages<I>(
    pages: I,
    settings: &UpdateSettings,
    registry: &mut PartialRegistry,
    formatter: &dyn Formatter,
) -> UpdateSummary
where
    I: IntoIterator<Item = Result<PathBuf, walkdir::Error>>,
{
    let mut summary = UpdateSummary::default();

    for page in pages {
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "error while walking site");
                summary.failed.push(PageFailure {
                    path: err.path().map(Path::to_path_buf),
                    error: err.to_string(),
                });
                continue;
            }
        };

        info!("updating page {}...", page.display());
        match update_page(&page, settings, registry, formatter) {
            Ok(PageOutcome::Updated) => {
                info!("updating page {} done.", page.display());
                summary.updated.push(page);
            }
            Ok(PageOutcome::Unchanged) => {
                info!("page {} already up to date.", page.display());
                summary.unchanged.push(page);
            }
            Err(err) => {
                error!(error = %err, "error when updating {}", page.display());
                summary.failed.push(PageFailure {
                    path: Some(page),
                    error: err.to_string(),
                });
            }
        }
    }

    summary
}

/// Pick the formatter for a run.
pub fn formatter_for(loaded: &LoadedConfig, no_format: bool) -> Box<dyn Formatter> {
    if no_format || !loaded.config.format.enabled {
        debug!("formatting disabled");
        Box::new(Unformatted)
    } else {
        Box::new(Prettier::new(
            loaded.config.format.command.clone(),
            loaded.formatter_config_path(),
        ))
    }
}

/// Index partials under `root` and update every page there.
///
/// Fails only when the partials directory can't be indexed; page-level errors
/// end up in the returned summary.
pub fn run(
    root: &Path,
    loaded: &LoadedConfig,
    formatter: &dyn Formatter,
) -> Result<UpdateSummary, PartialError> {
    let settings = UpdateSettings::from_config(root, loaded);
    let partials_dir = root.join(&loaded.config.partials_dir);
    let mut registry = PartialRegistry::index(&partials_dir, &settings.marker_attribute)?;
    if registry.is_empty() {
        warn!("no partials found in {}", partials_dir.display());
    } else {
        info!(
            partials = registry.len(),
            "using partials from {}",
            partials_dir.display()
        );
        debug!(names = ?registry.names().collect::<Vec<_>>(), "indexed partials");
    }

    Ok(update_pages(
        PageWalker::pages(root),
        &settings,
        &mut registry,
        formatter,
    ))
}
