//! Standard site block renderers.
//!
//! Each renderer reads the fields it knows about and degrades a missing or
//! malformed field to empty output without affecting its siblings. Child
//! slots are rendered through the [`RenderContext`], which keys every child
//! by its block id.

use serde_json::Value;
use vitrine_sdk::render::{self, RenderElement};
use vitrine_sdk::types::{Asset, ContentNode, FieldValue};

use super::richtext;
use super::tree::RenderContext;

/// Container widths understood by the design system.
const CONTAINER_WIDTHS: &[&str] = &["full", "wide", "narrow"];

/// Grid gaps understood by the design system.
const GRID_GAPS: &[&str] = &["none", "small", "medium", "large"];

/// Button variants understood by the design system.
const BUTTON_VARIANTS: &[&str] = &["primary", "secondary", "ghost"];

/// Maximum number of grid columns the design system provides classes for.
const MAX_GRID_COLUMNS: usize = 12;

// ---------------------------------------------------------------------------
// Layout blocks
// ---------------------------------------------------------------------------

/// Render a page block.
/// Fields: `body` (child slot).
pub fn render_page(node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement {
    render::container("main")
        .class("page")
        .children(cx.render_slot(node, "body"))
        .build()
}

/// Render a container block.
/// Fields: `width` ("full" | "wide" | "narrow"), `content` (child slot).
pub fn render_container(node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement {
    let width = node
        .text("width")
        .map(str::trim)
        .filter(|w| CONTAINER_WIDTHS.contains(w))
        .unwrap_or("default");

    render::container("section")
        .class("container")
        .class(&format!("container--{width}"))
        .children(cx.render_slot(node, "content"))
        .build()
}

/// Render a grid block.
/// Fields: `columns` (child slot), `gap` ("none" | "small" | "medium" | "large").
pub fn render_grid(node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement {
    let columns = cx.render_slot(node, "columns");
    let count = columns.len().clamp(1, MAX_GRID_COLUMNS);

    let mut grid = render::container("div")
        .class("grid")
        .class(&format!("grid--cols-{count}"));
    if let Some(gap) = node
        .text("gap")
        .map(str::trim)
        .filter(|g| GRID_GAPS.contains(g))
    {
        grid = grid.class(&format!("grid--gap-{gap}"));
    }
    grid.children(columns).build()
}

// ---------------------------------------------------------------------------
// Typography
// ---------------------------------------------------------------------------

/// Render a headline block.
/// Fields: `text`, `level` (1-6, default 2).
pub fn render_headline(node: &ContentNode, _cx: &RenderContext<'_>) -> RenderElement {
    let Some(text) = node.text("text").filter(|t| !t.trim().is_empty()) else {
        return render::empty();
    };
    let level = node
        .number("level")
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(1.0, 6.0) as u8)
        .unwrap_or(2);

    render::markup(&format!("h{level}"), text)
        .class("headline")
        .build()
}

/// Render a text block.
/// Fields: `text` (author HTML string, or a rich text document).
pub fn render_text(node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement {
    match node.field("text") {
        Some(FieldValue::Text(html)) if !html.trim().is_empty() => {
            render::filtered_markup("div", html, "filtered_html")
                .class("text")
                .build()
        }
        Some(FieldValue::Raw(doc)) if richtext::is_document(doc) => render::container("div")
            .class("text")
            .children(richtext::render_document(doc, cx))
            .build(),
        _ => render::empty(),
    }
}

// ---------------------------------------------------------------------------
// Controls and media
// ---------------------------------------------------------------------------

/// Render a button block.
/// Fields: `label`, `link` (URL string or CMS link object), `variant`,
/// `new_tab`.
///
/// A button whose link is missing or unsafe still renders, as a non-link.
pub fn render_button(node: &ContentNode, _cx: &RenderContext<'_>) -> RenderElement {
    let Some(label) = node.text("label").filter(|l| !l.trim().is_empty()) else {
        return render::empty();
    };
    let variant = node
        .text("variant")
        .map(str::trim)
        .filter(|v| BUTTON_VARIANTS.contains(v))
        .unwrap_or("primary");
    let class = format!("button--{variant}");

    match resolve_link(node, "link") {
        Some(href) => {
            let mut button = render::link(&href, label).class("button").class(&class);
            if node.flag("new_tab").unwrap_or(false) {
                button = button
                    .attr("target", "_blank")
                    .attr("rel", "noopener noreferrer");
            }
            button.build()
        }
        None => render::markup("span", label)
            .class("button")
            .class(&class)
            .build(),
    }
}

/// Render an image block.
/// Fields: `image` (asset), `caption`.
pub fn render_image(node: &ContentNode, _cx: &RenderContext<'_>) -> RenderElement {
    let Some(asset) = node.asset("image").filter(|a| a.is_valid()) else {
        return render::empty();
    };

    let mut figure = render::container("figure")
        .class("image")
        .child(image_element(asset));
    if let Some(caption) = node.text("caption").filter(|c| !c.trim().is_empty()) {
        figure = figure.child(render::markup("figcaption", caption).build());
    }
    figure.build()
}

/// Render a slideshow block.
/// Fields: `images` (assets), `autoplay`, `interval` (milliseconds).
///
/// Assets without a URL are skipped; the remaining slides keep their order.
pub fn render_slideshow(node: &ContentNode, _cx: &RenderContext<'_>) -> RenderElement {
    let slides = node
        .assets("images")
        .into_iter()
        .filter(|asset| asset.is_valid())
        .map(|asset| {
            render::container("figure")
                .class("slideshow__slide")
                .child(image_element(asset))
                .build()
        });

    let mut slideshow = render::container("div").class("slideshow");
    if node.flag("autoplay").unwrap_or(false) {
        slideshow = slideshow.attr("data-autoplay", "true");
        if let Some(interval) = node.number("interval").filter(|n| *n > 0.0 && n.is_finite()) {
            slideshow = slideshow.attr("data-interval", &format!("{}", interval.round() as u64));
        }
    }
    slideshow.children(slides).build()
}

/// `<img>` for an asset, with dimensions when the CMS knows them.
fn image_element(asset: &Asset) -> RenderElement {
    let mut img = render::image(asset.url.trim(), &asset.alt);
    if let (Some(width), Some(height)) = (asset.width, asset.height) {
        img = img
            .attr("width", &width.to_string())
            .attr("height", &height.to_string());
    }
    img.attr("loading", "lazy").build()
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Resolve a link field to a safe href.
///
/// Accepts a plain URL string or a CMS link object. Anything that does not
/// resolve to a safe href yields `None`.
pub fn resolve_link(node: &ContentNode, field: &str) -> Option<String> {
    let href = match node.field(field)? {
        FieldValue::Text(url) => url.trim().to_string(),
        FieldValue::Raw(link) => link_object_href(link)?,
        _ => return None,
    };
    is_safe_href(&href).then_some(href)
}

/// Href for a CMS link object (`{ "linktype": ..., "url": ..., "cached_url": ... }`).
pub fn link_object_href(link: &Value) -> Option<String> {
    let base = match str_field(link, "linktype").unwrap_or("url") {
        "story" => {
            let slug = str_field(link, "cached_url").or_else(|| str_field(link, "url"))?;
            format!("/{}", slug.trim_start_matches('/'))
        }
        "email" => {
            let address = str_field(link, "email").or_else(|| str_field(link, "url"))?;
            format!("mailto:{}", address.trim_start_matches("mailto:"))
        }
        _ => str_field(link, "url")
            .or_else(|| str_field(link, "cached_url"))?
            .to_string(),
    };

    match str_field(link, "anchor") {
        Some(anchor) => Some(format!("{base}#{anchor}")),
        None => Some(base),
    }
}

/// A non-empty, trimmed string member of a JSON object.
fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validate that an href uses a safe scheme or is site-relative.
///
/// `//host` and `/\host` resolve to another host and are not site-relative.
pub fn is_safe_href(href: &str) -> bool {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("/\\") {
        return false;
    }
    let lower = trimmed.to_ascii_lowercase();
    ["https://", "http://", "mailto:", "tel:", "/", "#"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::block_types::BlockRegistry;
    use crate::content::tree::{RenderOptions, TreeRenderer};
    use serde_json::json;

    fn render(node: &ContentNode) -> RenderElement {
        let registry = BlockRegistry::with_standard_types();
        TreeRenderer::new(&registry, RenderOptions::default()).render(node)
    }

    #[test]
    fn page_renders_body_in_order() {
        let page = ContentNode::new("r1", "page").with_field(
            "body",
            vec![
                ContentNode::new("a", "headline").with_field("text", "One"),
                ContentNode::new("b", "headline").with_field("text", "Two"),
            ],
        );
        let out = render(&page);
        assert_eq!(out.tag.as_deref(), Some("main"));
        assert_eq!(out.keys(), vec!["r1", "a", "b"]);
    }

    #[test]
    fn page_without_body_renders_no_children() {
        let out = render(&ContentNode::new("r1", "page"));
        assert!(out.children.is_empty());

        let out = render(&ContentNode::new("r1", "page").with_field("body", Vec::<ContentNode>::new()));
        assert!(out.children.is_empty());
    }

    #[test]
    fn container_width_classes() {
        let full = render(&ContentNode::new("c1", "container").with_field("width", "full"));
        assert_eq!(full.class(), Some("container container--full"));

        let odd = render(&ContentNode::new("c1", "container").with_field("width", "\" onload=\""));
        assert_eq!(odd.class(), Some("container container--default"));

        let none = render(&ContentNode::new("c1", "container"));
        assert_eq!(none.class(), Some("container container--default"));
    }

    #[test]
    fn grid_counts_columns() {
        let grid = ContentNode::new("g1", "grid")
            .with_field("gap", "small")
            .with_field(
                "columns",
                vec![
                    ContentNode::new("c1", "container"),
                    ContentNode::new("c2", "container"),
                    ContentNode::new("c3", "container"),
                ],
            );
        let out = render(&grid);
        assert_eq!(out.class(), Some("grid grid--cols-3 grid--gap-small"));
        assert_eq!(out.children.len(), 3);
    }

    #[test]
    fn headline_levels() {
        let h = render(&ContentNode::new("h", "headline").with_field("text", "T").with_field("level", 3.0));
        assert_eq!(h.tag.as_deref(), Some("h3"));

        let h = render(&ContentNode::new("h", "headline").with_field("text", "T").with_field("level", "9"));
        assert_eq!(h.tag.as_deref(), Some("h6"));

        let h = render(&ContentNode::new("h", "headline").with_field("text", "T"));
        assert_eq!(h.tag.as_deref(), Some("h2"));
    }

    #[test]
    fn headline_without_text_is_empty() {
        let out = render(&ContentNode::new("h", "headline").with_field("level", 1.0));
        assert!(out.children.is_empty());
        assert!(out.tag.is_none());
        assert_eq!(out.key.as_deref(), Some("h"));
    }

    #[test]
    fn text_block_uses_filtered_html() {
        let out = render(&ContentNode::new("t", "text").with_field("text", "<p>Hi</p>"));
        assert_eq!(out.format.as_deref(), Some("filtered_html"));
        assert_eq!(out.class(), Some("text"));
    }

    #[test]
    fn button_with_story_link() {
        let node = ContentNode::new("b", "button")
            .with_field("label", "About")
            .with_field(
                "link",
                FieldValue::Raw(json!({ "linktype": "story", "cached_url": "about-us", "anchor": "team" })),
            );
        let out = render(&node);
        assert_eq!(out.tag.as_deref(), Some("a"));
        assert_eq!(out.attr("href"), Some("/about-us#team"));
        assert_eq!(out.class(), Some("button button--primary"));
    }

    #[test]
    fn button_with_unsafe_link_is_not_a_link() {
        let node = ContentNode::new("b", "button")
            .with_field("label", "Click")
            .with_field("variant", "ghost")
            .with_field("link", "javascript:alert(1)");
        let out = render(&node);
        assert_eq!(out.tag.as_deref(), Some("span"));
        assert!(out.attr("href").is_none());
        assert_eq!(out.class(), Some("button button--ghost"));
    }

    #[test]
    fn button_new_tab() {
        let node = ContentNode::new("b", "button")
            .with_field("label", "Docs")
            .with_field("link", "https://example.com")
            .with_field("new_tab", true);
        let out = render(&node);
        assert_eq!(out.attr("target"), Some("_blank"));
        assert_eq!(out.attr("rel"), Some("noopener noreferrer"));
    }

    #[test]
    fn image_with_dimensions_and_caption() {
        let node = ContentNode::new("i", "image")
            .with_field("image", Asset::new("/a.png", "A").with_dimensions(800, 600))
            .with_field("caption", "Caption");
        let out = render(&node);
        assert_eq!(out.tag.as_deref(), Some("figure"));
        let img = &out.children[0];
        assert_eq!(img.attr("src"), Some("/a.png"));
        assert_eq!(img.attr("width"), Some("800"));
        assert_eq!(out.children[1].tag.as_deref(), Some("figcaption"));
    }

    #[test]
    fn image_without_url_is_empty() {
        let node = ContentNode::new("i", "image")
            .with_field("image", Asset::new("", "Missing"))
            .with_field("caption", "Caption");
        let out = render(&node);
        assert!(out.children.is_empty());
    }

    #[test]
    fn slideshow_skips_malformed_assets() {
        let node = ContentNode::new("s", "slideshow")
            .with_field(
                "images",
                vec![Asset::new("/a.png", "A"), Asset::new("", "broken"), Asset::new("/b.png", "B")],
            )
            .with_field("autoplay", true)
            .with_field("interval", "5000");
        let out = render(&node);
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.children[1].children[0].attr("src"), Some("/b.png"));
        assert_eq!(out.attr("data-autoplay"), Some("true"));
        assert_eq!(out.attr("data-interval"), Some("5000"));
    }

    #[test]
    fn link_object_variants() {
        assert_eq!(
            link_object_href(&json!({ "linktype": "url", "url": "https://example.com" })),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            link_object_href(&json!({ "linktype": "email", "email": "hi@example.com" })),
            Some("mailto:hi@example.com".to_string())
        );
        assert_eq!(
            link_object_href(&json!({ "linktype": "story", "cached_url": "" })),
            None
        );
    }

    #[test]
    fn safe_href_schemes() {
        assert!(is_safe_href("https://example.com"));
        assert!(is_safe_href("/about"));
        assert!(is_safe_href("#top"));
        assert!(is_safe_href("MAILTO:me@example.com"));
        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("data:text/html,hi"));
        assert!(!is_safe_href(""));
        assert!(!is_safe_href("//evil.example/x"));
        assert!(!is_safe_href("/\\evil.example"));
        assert!(!is_safe_href("  //evil.example"));
    }

    #[test]
    fn button_with_protocol_relative_link_is_not_a_link() {
        let node = ContentNode::new("b", "button")
            .with_field("label", "Go")
            .with_field("link", "//evil.example/phish");
        let out = render(&node);
        assert_eq!(out.tag.as_deref(), Some("span"));
        assert!(out.attr("href").is_none());
    }
}
