//! Color-scheme aware favicon.
//!
//! Sites updated by this tool ship a small script that swaps the favicon when
//! the visitor's OS switches between light and dark mode. The decision is a
//! two-state toggle re-evaluated from the media query on every change event;
//! nothing is remembered between page loads.
//!
//! The script lives in `static/favicon.js` and is embedded in the binary.
//! [`script`] fills in the configured icon paths; `partial-pages
//! favicon-script` prints the result.

use crate::config::FaviconConfig;

const SCRIPT_TEMPLATE: &str = include_str!("../static/favicon.js");

/// The two states of the toggle. The script picks `Light` when
/// `(prefers-color-scheme: light)` matches and `Dark` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

/// Icon the script selects for `scheme`.
pub fn icon_href(scheme: ColorScheme, icons: &FaviconConfig) -> &str {
    match scheme {
        ColorScheme::Light => &icons.light,
        ColorScheme::Dark => &icons.dark,
    }
}

/// The favicon toggle script with the configured icon paths.
pub fn script(icons: &FaviconConfig) -> String {
    [
        ("__LIGHT_ICON__", ColorScheme::Light),
        ("__DARK_ICON__", ColorScheme::Dark),
    ]
    .into_iter()
    .fold(SCRIPT_TEMPLATE.to_string(), |js, (marker, scheme)| {
        js.replace(marker, &js_string(icon_href(scheme, icons)))
    })
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    // A JSON string is a valid JS string literal.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_scheme_selects_light_icon() {
        let icons = FaviconConfig::default();
        assert_eq!(icon_href(ColorScheme::Light, &icons), "/assets/favicon-light.ico");
    }

    #[test]
    fn dark_scheme_selects_default_icon() {
        let icons = FaviconConfig::default();
        assert_eq!(icon_href(ColorScheme::Dark, &icons), "/assets/favicon.ico");
    }

    #[test]
    fn script_embeds_configured_icons() {
        let icons = FaviconConfig {
            light: "/img/sun.png".to_string(),
            dark: "/img/moon.png".to_string(),
        };
        let js = script(&icons);
        assert!(js.contains(r#"colorSchemeMedia.matches ? "/img/sun.png" : "/img/moon.png""#));
        assert!(!js.contains("__LIGHT_ICON__"));
        assert!(!js.contains("__DARK_ICON__"));
    }

    #[test]
    fn script_listens_for_changes() {
        let js = script(&FaviconConfig::default());
        assert!(js.contains("(prefers-color-scheme: light)"));
        assert!(js.contains(r#"addEventListener("change", changeFavicon)"#));
        assert!(js.contains("addListener(changeFavicon)"));
    }

    #[test]
    fn icon_paths_are_escaped() {
        let icons = FaviconConfig {
            light: r#"/a"b.ico"#.to_string(),
            dark: "/d.ico".to_string(),
        };
        assert!(script(&icons).contains(r#""/a\"b.ico""#));
    }
}
