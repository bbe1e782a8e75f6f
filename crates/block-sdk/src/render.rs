//! Render element builder API.
//!
//! Block renderers return structured render elements (never raw HTML).
//! The kernel turns the finished tree into markup via its theme layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A render element in the output tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderElement {
    #[serde(rename = "#type")]
    pub element_type: String,
    /// Identity of the content block this element was rendered from.
    #[serde(rename = "#key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "#tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "#value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "#format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(
        rename = "#attributes",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub attributes: BTreeMap<String, String>,
    #[serde(rename = "#children", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderElement>,
}

impl RenderElement {
    /// True for a fragment with nothing inside it.
    pub fn is_empty(&self) -> bool {
        self.element_type == "fragment" && self.children.is_empty() && self.value.is_none()
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Space-separated class list, if any.
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }

    /// Depth-first, pre-order iterator over this element and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of elements in the tree that carry a block key.
    pub fn count_keyed(&self) -> usize {
        self.walk().filter(|el| el.key.is_some()).count()
    }

    /// Keys of all keyed elements, in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.walk().filter_map(|el| el.key.as_deref()).collect()
    }

    /// Find the element rendered for the given block id.
    pub fn find_by_key(&self, key: &str) -> Option<&RenderElement> {
        self.walk().find(|el| el.key.as_deref() == Some(key))
    }
}

/// Iterator returned by [`RenderElement::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a RenderElement>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a RenderElement;

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.stack.pop()?;
        self.stack.extend(el.children.iter().rev());
        Some(el)
    }
}

/// Builder for constructing render elements.
pub struct ElementBuilder {
    element_type: String,
    key: Option<String>,
    tag: Option<String>,
    value: Option<String>,
    format: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    children: Vec<RenderElement>,
}

impl ElementBuilder {
    fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.into(),
            key: None,
            tag: None,
            value: None,
            format: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, element: RenderElement) -> Self {
        self.children.push(element);
        self
    }

    pub fn children(mut self, elements: impl IntoIterator<Item = RenderElement>) -> Self {
        self.children.extend(elements);
        self
    }

    pub fn build(self) -> RenderElement {
        let mut attributes = self.attrs;
        if !self.classes.is_empty() {
            attributes.insert("class".into(), self.classes.join(" "));
        }

        RenderElement {
            element_type: self.element_type,
            key: self.key,
            tag: self.tag,
            value: self.value,
            format: self.format,
            attributes,
            children: self.children,
        }
    }
}

/// Create a container element (a tag wrapping children).
pub fn container(tag: &str) -> ElementBuilder {
    ElementBuilder::new("container").tag(tag)
}

/// Create a markup element with an HTML tag and plain text value.
pub fn markup(tag: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("markup").tag(tag);
    b.value = Some(value.into());
    b.format = Some("plain_text".into());
    b
}

/// Create a markup element with a text format (for filtered HTML, etc.).
pub fn filtered_markup(tag: &str, value: &str, format: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("markup").tag(tag);
    b.value = Some(value.into());
    b.format = Some(format.into());
    b
}

/// Create a bare text node (escaped, no wrapping tag).
pub fn text(value: &str) -> RenderElement {
    let mut b = ElementBuilder::new("text");
    b.value = Some(value.into());
    b.format = Some("plain_text".into());
    b.build()
}

/// Create a link element.
pub fn link(href: &str, text: &str) -> ElementBuilder {
    markup("a", text).attr("href", href)
}

/// Create an image element.
pub fn image(src: &str, alt: &str) -> ElementBuilder {
    ElementBuilder::new("image")
        .tag("img")
        .attr("src", src)
        .attr("alt", alt)
}

/// Create a fragment: children without a wrapping tag.
pub fn fragment() -> ElementBuilder {
    ElementBuilder::new("fragment")
}

/// Empty output.
pub fn empty() -> RenderElement {
    fragment().build()
}
