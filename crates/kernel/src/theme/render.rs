//! Render tree consumer - converts RenderElement trees to HTML.
//!
//! An element type can be overridden with a Tera template named
//! `elements/{type}--{tag}.html` or `elements/{type}.html`. Without one (or if
//! the template fails) the element is rendered inline. Rendering never fails.

use std::fmt::Write;

use tera::{Context as TeraContext, Tera};
use tracing::warn;
use vitrine_sdk::render::RenderElement;

use crate::content::{FilterPipeline, html_escape};

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "source"];

/// Consumer that converts RenderElement trees to HTML.
pub struct RenderTreeConsumer {
    _private: (),
}

impl RenderTreeConsumer {
    /// Create a new render tree consumer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Render a RenderElement tree to HTML.
    pub fn render(&self, tera: &Tera, element: &RenderElement) -> String {
        self.render_element(tera, element)
    }

    /// Render a single element and its children.
    fn render_element(&self, tera: &Tera, element: &RenderElement) -> String {
        let children_html = self.render_children(tera, element);

        if let Some(template_name) = self.template_for(tera, element) {
            let mut context = TeraContext::new();
            context.insert("element", element);
            context.insert("children", &children_html);
            context.insert("class", element.class().unwrap_or(""));
            if let Some(value) = &element.value {
                context.insert("value", &self.process_value(value, element.format.as_deref()));
            }

            match tera.render(&template_name, &context) {
                Ok(html) => return html,
                Err(e) => warn!(
                    template = %template_name,
                    error = %e,
                    "element template failed; rendering inline"
                ),
            }
        }

        self.render_inline(element, &children_html)
    }

    /// Render element children in order.
    fn render_children(&self, tera: &Tera, element: &RenderElement) -> String {
        element
            .children
            .iter()
            .map(|child| self.render_element(tera, child))
            .collect()
    }

    /// Most specific template that exists for an element, if any.
    fn template_for(&self, tera: &Tera, element: &RenderElement) -> Option<String> {
        let mut suggestions = Vec::with_capacity(2);
        if let Some(tag) = &element.tag {
            suggestions.push(format!("elements/{}--{}.html", element.element_type, tag));
        }
        suggestions.push(format!("elements/{}.html", element.element_type));

        suggestions
            .into_iter()
            .find(|name| tera.get_template(name).is_ok())
    }

    /// Process a value through the appropriate filter pipeline.
    fn process_value(&self, value: &str, format: Option<&str>) -> String {
        let format_name = format.unwrap_or("plain_text");
        FilterPipeline::for_format(format_name).process(value)
    }

    /// Render an element inline when no template is available.
    fn render_inline(&self, element: &RenderElement, children: &str) -> String {
        let value = element
            .value
            .as_ref()
            .map(|v| self.process_value(v, element.format.as_deref()))
            .unwrap_or_default();

        match element.element_type.as_str() {
            // No tag to carry attributes; preview attributes on fragment
            // blocks stay in the render tree only.
            "fragment" => children.to_string(),
            "text" => value,
            _ => {
                let tag = match element.tag.as_deref() {
                    Some(tag) if is_valid_name(tag) => tag,
                    Some(tag) => {
                        warn!(tag, "invalid tag name; rendering as div");
                        "div"
                    }
                    None => return self.render_untagged(element, &value, children),
                };
                let attrs = self.attributes_string(element);

                if VOID_ELEMENTS.contains(&tag) {
                    return format!("<{tag}{attrs} />");
                }
                format!("<{tag}{attrs}>{value}{children}</{tag}>")
            }
        }
    }

    /// Unknown element without a tag - wrap in a div.
    fn render_untagged(&self, element: &RenderElement, value: &str, children: &str) -> String {
        let mut class = format!("element element--{}", html_escape(&element.element_type));
        if let Some(extra) = element.class() {
            write!(class, " {}", html_escape(extra)).ok();
        }
        format!("<div class=\"{class}\">{value}{children}</div>")
    }

    /// Attributes as an HTML string, values escaped. Attributes with invalid
    /// names are dropped.
    fn attributes_string(&self, element: &RenderElement) -> String {
        element
            .attributes
            .iter()
            .filter(|(name, _)| is_valid_name(name))
            .map(|(name, value)| format!(" {}=\"{}\"", name, html_escape(value)))
            .collect()
    }
}

impl Default for RenderTreeConsumer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag and attribute names: ASCII letters, digits, `-`, `_` and `:`, starting
/// with a letter.
fn is_valid_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}
