//! # Partial Pages
//!
//! Keeps the shared fragments of a hand-written static site in sync. Headers,
//! footers and the `<head>` block live once under `_partials/`; every page
//! marks where a fragment belongs with a placeholder element:
//!
//! ```html
//! <footer data-partial="footer"></footer>
//! ```
//!
//! Running the updater over the site root replaces each placeholder with a
//! fresh copy of the named partial, fills in the page's Open Graph metadata,
//! and re-formats the page.
//!
//! # Pipeline
//!
//! ```text
//! 1. Index    _partials/  →  PartialRegistry   (names only, parsed on first use)
//! 2. Walk     site root   →  *.html pages      (lazy, one page at a time)
//! 3. Update   each page   →  page rewritten    (substitute → metadata → format)
//! ```
//!
//! A failing page is logged and counted; the walk moves on to the next one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`update`] | Per-page update pipeline and the whole-site driver |
//! | [`partials`] | Lazy registry of named partial fragments |
//! | [`walk`] | Filesystem walker yielding markup files for pages or partials |
//! | [`metadata`] | Canonical URLs and `<head>` metadata propagation |
//! | [`dom`] | Thin wrapper over the HTML tree: parse, select, replace, serialize |
//! | [`formatter`] | Output formatting through Prettier, plus the boolean attribute tidy-up |
//! | [`favicon`] | Light/dark favicon toggle script |
//! | [`config`] | `partial-pages.toml` loading, validation, and stock defaults |
//! | [`naming`] | `_name.html` file naming convention |
//! | [`output`] | CLI output formatting of the run summary |
//!
//! # Design Decisions
//!
//! ## Placeholders Stay Addressable
//!
//! Every inserted copy of a partial carries `data-partial="<name>"`, so the
//! updated page is itself a valid input. Running the tool twice gives the same
//! bytes; the second run reports every page as unchanged and writes nothing.
//!
//! ## Formatting Is External
//!
//! The HTML serializer emits compact markup. Pages are run through Prettier so
//! diffs stay readable in version control. The formatter sits behind the
//! [`formatter::Formatter`] trait; `--no-format` swaps in a pass-through.

pub mod config;
pub mod dom;
pub mod favicon;
pub mod formatter;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod partials;
pub mod update;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
