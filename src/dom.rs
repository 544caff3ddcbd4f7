//! Typed access to a parsed HTML document.
//!
//! Pages and partials are parsed with [`kuchikiki`] (an html5ever tree with
//! interior mutability). Everything the updater needs from the tree goes
//! through the small API here, so lookups that may find nothing return
//! `Option` instead of silently doing nothing.

use kuchikiki::traits::TendrilSink;
use kuchikiki::{ElementData, NodeData, NodeDataRef, NodeRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
    #[error("Serialization failed: {0}")]
    Serialize(#[from] std::io::Error),
    #[error("Serialized document is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// An element handle inside a [`Document`].
pub type Element = NodeDataRef<ElementData>;

/// A placeholder element and the partial name it references.
pub struct Placeholder {
    pub element: Element,
    pub name: String,
}

/// A full HTML document (doctype, `<html>`, `<head>`, `<body>`).
#[derive(Debug, Clone)]
pub struct Document {
    root: NodeRef,
}

impl Document {
    /// Parse markup as a complete document.
    ///
    /// HTML parsing never fails: malformed input is repaired the way a browser
    /// would repair it.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
        }
    }

    /// First element matching `selector`, if any.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element>, DomError> {
        // Validate the selector separately so a typo isn't reported as "absent".
        self.root
            .select(selector)
            .map_err(|()| DomError::InvalidSelector(selector.to_string()))?;
        Ok(self.root.select_first(selector).ok())
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let matches = self
            .root
            .select(selector)
            .map_err(|()| DomError::InvalidSelector(selector.to_string()))?;
        Ok(matches.collect())
    }

    /// Document title: text of the first `<title>`, whitespace collapsed.
    ///
    /// `None` when the document has no `<title>` element at all.
    pub fn title(&self) -> Option<String> {
        self.root
            .select_first("title")
            .ok()
            .map(|title| collapse_whitespace(&title.text_contents()))
    }

    /// Replace the text of the first `<title>`.
    ///
    /// Returns `false` when the document has no `<title>` to update.
    pub fn set_title(&self, title: &str) -> bool {
        let Ok(element) = self.root.select_first("title") else {
            return false;
        };
        let node = element.as_node();
        for child in node.children().collect::<Vec<_>>() {
            child.detach();
        }
        node.append(NodeRef::new_text(title));
        true
    }

    /// Trimmed text content of the first element matching `selector`.
    pub fn first_text(&self, selector: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .select_first(selector)?
            .map(|element| element.text_contents().trim().to_string()))
    }

    /// The `<meta property="…">` element for an Open Graph property.
    pub fn meta_property(&self, property: &str) -> Result<Option<Element>, DomError> {
        self.select_first(&format!(r#"meta[property="{property}"]"#))
    }

    /// Every element carrying `attribute`, snapshotted in document order.
    ///
    /// The list is taken before any replacement, so content inserted while
    /// processing it is never revisited in the same pass.
    pub fn placeholders(&self, attribute: &str) -> Result<Vec<Placeholder>, DomError> {
        Ok(self
            .select_all(&format!("[{attribute}]"))?
            .into_iter()
            .map(|element| {
                let name = get_attribute(&element, attribute).unwrap_or_default();
                Placeholder { element, name }
            })
            .collect())
    }

    /// Serialize the whole document, doctype included.
    pub fn serialize(&self) -> Result<String, DomError> {
        let mut buf = Vec::new();
        self.root.serialize(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

pub fn get_attribute(element: &Element, name: &str) -> Option<String> {
    element
        .attributes
        .borrow()
        .get(name)
        .map(|value| value.to_string())
}

pub fn set_attribute(element: &Element, name: &str, value: &str) {
    element
        .attributes
        .borrow_mut()
        .insert(name, value.to_string());
}

/// Put `replacement` where `target` is and detach `target` from the tree.
pub fn replace(target: &NodeRef, replacement: NodeRef) {
    target.insert_before(replacement);
    target.detach();
}

/// Copy a node and its whole subtree into a new, parentless tree.
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    let data = match node.data() {
        NodeData::Element(element) => NodeData::Element(ElementData {
            name: element.name.clone(),
            attributes: element.attributes.clone(),
            template_contents: element.template_contents.as_ref().map(deep_clone),
        }),
        other => other.clone(),
    };
    let copy = NodeRef::new(data);
    for child in node.children() {
        copy.append(deep_clone(&child));
    }
    copy
}

/// Collapse every run of ASCII whitespace into one space and trim the ends.
///
/// Non-breaking spaces (`&nbsp;`) are content, not layout, and are kept.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  My
     Page </title>
  <meta property="og:title" content="">
</head>
<body>
  <h1>  Hello World  </h1>
  <p>first</p>
  <p>second</p>
  <nav data-partial="nav"></nav>
  <footer data-partial="footer">old</footer>
</body>
</html>"#;

    #[test]
    fn title_is_whitespace_collapsed() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.title().as_deref(), Some("My Page"));
    }

    #[test]
    fn missing_title_is_none() {
        let doc = Document::parse("<p>no head</p>");
        assert_eq!(doc.title(), None);
        assert!(!doc.set_title("ignored"));
    }

    #[test]
    fn set_title_replaces_text() {
        let doc = Document::parse(PAGE);
        assert!(doc.set_title("Other"));
        assert_eq!(doc.title().as_deref(), Some("Other"));
        assert!(doc.serialize().unwrap().contains("<title>Other</title>"));
    }

    #[test]
    fn first_text_is_trimmed() {
        let doc = Document::parse(PAGE);
        assert_eq!(
            doc.first_text("h1").unwrap().as_deref(),
            Some("Hello World")
        );
        assert_eq!(doc.first_text("p").unwrap().as_deref(), Some("first"));
        assert_eq!(doc.first_text("h2").unwrap(), None);
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let doc = Document::parse(PAGE);
        assert!(matches!(
            doc.select_all("[[nope"),
            Err(DomError::InvalidSelector(_))
        ));
    }

    #[test]
    fn meta_property_lookup() {
        let doc = Document::parse(PAGE);
        let meta = doc.meta_property("og:title").unwrap().unwrap();
        set_attribute(&meta, "content", "Hi");
        assert_eq!(get_attribute(&meta, "content").as_deref(), Some("Hi"));
        assert!(doc.meta_property("og:url").unwrap().is_none());
    }

    #[test]
    fn placeholders_in_document_order() {
        let doc = Document::parse(PAGE);
        let names: Vec<String> = doc
            .placeholders("data-partial")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["nav", "footer"]);
    }

    #[test]
    fn replace_swaps_node_in_place() {
        let doc = Document::parse(PAGE);
        let footer = doc.select_first("footer").unwrap().unwrap();
        let fragment = Document::parse("<aside>new</aside>");
        let aside = fragment.select_first("aside").unwrap().unwrap();

        replace(footer.as_node(), deep_clone(aside.as_node()));

        let html = doc.serialize().unwrap();
        assert!(html.contains("<aside>new</aside>"));
        assert!(!html.contains("<footer"));
        // The source document keeps its own node.
        assert!(fragment.serialize().unwrap().contains("<aside>new</aside>"));
    }

    #[test]
    fn deep_clone_is_independent() {
        let doc = Document::parse(r#"<div id="a" class="x"><span>text</span></div>"#);
        let div = doc.select_first("#a").unwrap().unwrap();
        let copy = deep_clone(div.as_node());

        let copy_el = copy.clone().into_element_ref().unwrap();
        set_attribute(&copy_el, "class", "y");
        assert_eq!(get_attribute(&div, "class").as_deref(), Some("x"));
        assert_eq!(copy.text_contents(), "text");
        assert!(copy != *div.as_node());
    }

    #[test]
    fn serialize_keeps_doctype() {
        let doc = Document::parse(PAGE);
        assert!(doc.serialize().unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn collapse_whitespace_handles_newlines() {
        assert_eq!(
            collapse_whitespace("  Line one\n  Line two \t"),
            "Line one Line two"
        );
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn collapse_whitespace_keeps_non_breaking_spaces() {
        assert_eq!(
            collapse_whitespace("  10\u{a0}km \n  away "),
            "10\u{a0}km away"
        );
    }
}
