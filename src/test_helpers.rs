//! Shared test utilities for the partial-pages test suite.
//!
//! [`TestSite`] builds a throwaway site tree in a temp directory, laid out the
//! way the updater expects:
//!
//! ```text
//! <tmp>/
//! ├── _partials/
//! │   ├── _head.html
//! │   └── _footer.html
//! ├── index.html
//! └── blog/index.html
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! site.partial("footer", "<footer data-partial>© me</footer>");
//! let page = site.page("index.html", "<div data-partial=\"footer\"></div>");
//! let mut registry = site.registry();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{LoadedConfig, UpdaterConfig};
use crate::naming;
use crate::partials::PartialRegistry;
use crate::update::UpdateSettings;

// =========================================================================
// Partial files
// =========================================================================

/// Write `_name.html` into `dir` and return its path.
pub fn write_partial(dir: &Path, name: &str, html: &str) -> PathBuf {
    let path = dir.join(naming::partial_file_name(name));
    fs::write(&path, html).unwrap();
    path
}

// =========================================================================
// Site fixture
// =========================================================================

/// A temp-directory site with a `_partials/` directory and default config.
pub struct TestSite {
    tmp: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("_partials")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn partials_dir(&self) -> PathBuf {
        self.root().join("_partials")
    }

    /// Add a partial to `_partials/`.
    pub fn partial(&self, name: &str, html: &str) -> PathBuf {
        write_partial(&self.partials_dir(), name, html)
    }

    /// Add a page at `relative` (parent directories created as needed).
    pub fn page(&self, relative: &str, html: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, html).unwrap();
        path
    }

    /// Registry over the current contents of `_partials/`.
    pub fn registry(&self) -> PartialRegistry {
        PartialRegistry::index(&self.partials_dir(), "data-partial").unwrap()
    }

    pub fn loaded_config(&self) -> LoadedConfig {
        Self::config_for(self.root())
    }

    pub fn settings(&self) -> UpdateSettings {
        UpdateSettings::from_config(self.root(), &self.loaded_config())
    }

    /// Stock config with relative paths resolving under `dir`.
    pub fn config_for(dir: &Path) -> LoadedConfig {
        LoadedConfig {
            config: UpdaterConfig::default(),
            source: None,
            base_dir: dir.to_path_buf(),
        }
    }
}
