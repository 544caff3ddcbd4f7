//! Updater configuration.
//!
//! Handles loading, validating, and merging `partial-pages.toml`. Stock
//! defaults are overridden by a user config file; the file is optional and
//! sparse, so it only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! The config lives next to the tool, not next to the site:
//!
//! 1. `--config <FILE>` when given on the command line.
//! 2. `partial-pages.toml` in the directory holding the executable.
//! 3. Stock defaults when neither exists.
//!
//! Relative paths inside the file (the formatter config) resolve against the
//! directory the config file lives in, or the executable's directory when
//! running on stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_origin = "https://jakemiki.me"  # Prefix for og:url canonical URLs
//! partials_dir = "_partials"           # Relative to the site root
//! marker_attribute = "data-partial"    # Attribute naming the partial to inject
//! head_partial = "head"                # Partial that triggers metadata updates
//!
//! [format]
//! enabled = true
//! command = ["prettier"]               # Program plus leading arguments
//! config = ".prettierrc"               # Formatter options file
//!
//! [favicon]
//! light = "/assets/favicon-light.ico"  # Used when the OS prefers light
//! dark = "/assets/favicon.ico"         # Used otherwise
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up next to the executable.
pub const CONFIG_FILENAME: &str = "partial-pages.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Updater configuration loaded from `partial-pages.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Scheme and host prepended to page paths for `og:url`.
    pub site_origin: String,
    /// Directory holding `_name.html` partial files, relative to the site root.
    pub partials_dir: String,
    /// Attribute marking placeholders (value = partial name) and the root
    /// element of each partial file.
    pub marker_attribute: String,
    /// Partial whose insertion propagates title and Open Graph metadata.
    pub head_partial: String,
    /// External formatter settings.
    pub format: FormatConfig,
    /// Icons swapped by the favicon script.
    pub favicon: FaviconConfig,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            site_origin: "https://jakemiki.me".to_string(),
            partials_dir: "_partials".to_string(),
            marker_attribute: "data-partial".to_string(),
            head_partial: "head".to_string(),
            format: FormatConfig::default(),
            favicon: FaviconConfig::default(),
        }
    }
}

impl UpdaterConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.site_origin.starts_with("http://") || self.site_origin.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "site_origin must start with http:// or https://".into(),
            ));
        }
        if !is_attribute_name(&self.marker_attribute) {
            return Err(ConfigError::Validation(format!(
                "marker_attribute '{}' is not a valid attribute name",
                self.marker_attribute
            )));
        }
        if self.partials_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "partials_dir must not be empty".into(),
            ));
        }
        if self.head_partial.trim().is_empty() {
            return Err(ConfigError::Validation(
                "head_partial must not be empty".into(),
            ));
        }
        if self.format.command.is_empty() {
            return Err(ConfigError::Validation(
                "format.command must have at least one element".into(),
            ));
        }
        Ok(())
    }

    /// Site origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.site_origin.trim_end_matches('/')
    }
}

/// Attribute names end up inside CSS selectors, so keep them plain.
fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// External formatter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Run the formatter at all. `--no-format` overrides this to `false`.
    pub enabled: bool,
    /// Program and leading arguments, e.g. `["npx", "prettier"]`.
    pub command: Vec<String>,
    /// Formatter options file, relative to the config directory.
    pub config: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["prettier".to_string()],
            config: ".prettierrc".to_string(),
        }
    }
}

/// Favicon paths for the color-scheme toggle script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaviconConfig {
    /// Icon used while `(prefers-color-scheme: light)` matches.
    pub light: String,
    /// Icon used otherwise.
    pub dark: String,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            light: "/assets/favicon-light.ico".to_string(),
            dark: "/assets/favicon.ico".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// A loaded config together with the directory relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: UpdaterConfig,
    /// Config file that was read, `None` for stock defaults.
    pub source: Option<PathBuf>,
    /// Base directory for relative paths inside the config.
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    /// Formatter options file with relative paths resolved.
    pub fn formatter_config_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.format.config)
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(UpdaterConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<UpdaterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: UpdaterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file, merged over stock defaults.
pub fn load_config_file(path: &Path) -> Result<UpdaterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Directory holding the running executable.
pub fn install_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Find and load the updater config.
///
/// An explicit path must exist. Without one, `partial-pages.toml` next to the
/// executable is used when present, stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from(explicit, install_dir())
}

fn load_config_from(
    explicit: Option<&Path>,
    install_dir: Option<PathBuf>,
) -> Result<LoadedConfig, ConfigError> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => install_dir
            .as_ref()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .filter(|path| path.is_file()),
    };

    match candidate {
        Some(path) => {
            let config = load_config_file(&path)?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            Ok(LoadedConfig {
                config,
                source: Some(path),
                base_dir,
            })
        }
        None => Ok(LoadedConfig {
            config: UpdaterConfig::default(),
            source: None,
            base_dir: install_dir.unwrap_or_default(),
        }),
    }
}

/// Returns a fully-commented stock `partial-pages.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# partial-pages configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# This file is read from next to the partial-pages executable, or from the
# path given with --config. Unknown keys will cause an error.

# Scheme and host used to build og:url canonical URLs.
site_origin = "https://jakemiki.me"

# Directory holding partial files (_name.html), relative to the site root.
partials_dir = "_partials"

# Attribute marking placeholders in pages. Its value names the partial to
# inject. Each partial file marks its root element with the same attribute.
marker_attribute = "data-partial"

# Injecting this partial also restores the page title and fills og:title,
# og:url and og:description from the page content.
head_partial = "head"

# ---------------------------------------------------------------------------
# Formatting
# ---------------------------------------------------------------------------
[format]
# Run the external formatter on every updated page.
enabled = true

# Program plus leading arguments. It receives the page on stdin and must
# print the formatted page on stdout.
command = ["prettier"]

# Formatter options file, relative to this config file's directory.
config = ".prettierrc"

# ---------------------------------------------------------------------------
# Favicon toggle script
# ---------------------------------------------------------------------------
[favicon]
# Icon shown while the OS prefers a light color scheme.
light = "/assets/favicon-light.ico"

# Icon shown otherwise.
dark = "/assets/favicon.ico"
"##
}
