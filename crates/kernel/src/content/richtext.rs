//! Rich text documents.
//!
//! The CMS stores rich text as a JSON document tree (`{"type": "doc",
//! "content": [...]}`). This module turns such a document into render
//! elements. Text is always emitted as escaped text nodes, never as raw HTML.
//! Blocks embedded in the document go back through the tree renderer, so
//! they get the same registry lookup, fallback, and depth accounting as any
//! other block.

use serde_json::Value;
use tracing::debug;
use vitrine_sdk::render::{self, RenderElement};

use super::block_render::is_safe_href;
use super::tree::RenderContext;
use crate::source::storyblok;

/// Nesting limit for document nodes (lists in quotes in lists...).
const MAX_DOCUMENT_DEPTH: usize = 64;

/// Check whether a value looks like a rich text document.
pub fn is_document(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("doc")
}

/// Render the top-level content of a rich text document.
pub fn render_document(doc: &Value, cx: &RenderContext<'_>) -> Vec<RenderElement> {
    render_content(doc, cx, 0)
}

fn render_content(node: &Value, cx: &RenderContext<'_>, depth: usize) -> Vec<RenderElement> {
    let Some(content) = node.get("content").and_then(Value::as_array) else {
        return Vec::new();
    };
    if depth >= MAX_DOCUMENT_DEPTH {
        debug!(depth, "rich text nested too deeply; truncating");
        return Vec::new();
    }
    content
        .iter()
        .flat_map(|child| render_node(child, cx, depth + 1))
        .collect()
}

fn render_node(node: &Value, cx: &RenderContext<'_>, depth: usize) -> Vec<RenderElement> {
    let wrap = |tag: &str| {
        vec![
            render::container(tag)
                .children(render_content(node, cx, depth))
                .build(),
        ]
    };

    match node.get("type").and_then(Value::as_str).unwrap_or("") {
        "paragraph" => wrap("p"),
        "heading" => {
            let level = node
                .pointer("/attrs/level")
                .and_then(Value::as_u64)
                .unwrap_or(2)
                .clamp(1, 6);
            wrap(&format!("h{level}"))
        }
        "bullet_list" => wrap("ul"),
        "ordered_list" => wrap("ol"),
        "list_item" => wrap("li"),
        "blockquote" => wrap("blockquote"),
        "code_block" => vec![
            render::container("pre")
                .child(
                    render::container("code")
                        .children(render_content(node, cx, depth))
                        .build(),
                )
                .build(),
        ],
        "horizontal_rule" => vec![render::container("hr").build()],
        "hard_break" => vec![render::container("br").build()],
        "image" => render_image(node).into_iter().collect(),
        "text" => render_text(node).into_iter().collect(),
        "blok" => render_embedded_blocks(node, cx),
        other => {
            debug!(node_type = other, "skipping unsupported rich text node");
            Vec::new()
        }
    }
}

fn render_image(node: &Value) -> Option<RenderElement> {
    let src = node
        .pointer("/attrs/src")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| is_safe_href(s))?;
    let alt = node
        .pointer("/attrs/alt")
        .and_then(Value::as_str)
        .unwrap_or("");
    Some(render::image(src, alt).build())
}

fn render_text(node: &Value) -> Option<RenderElement> {
    let text = node.get("text").and_then(Value::as_str)?;
    let mut element = render::text(text);

    let marks = node
        .get("marks")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for mark in marks {
        element = apply_mark(element, mark);
    }
    Some(element)
}

fn apply_mark(inner: RenderElement, mark: &Value) -> RenderElement {
    let tag = match mark.get("type").and_then(Value::as_str).unwrap_or("") {
        "bold" => "strong",
        "italic" => "em",
        "strike" => "s",
        "underline" => "u",
        "code" => "code",
        "superscript" => "sup",
        "subscript" => "sub",
        "link" => return apply_link(inner, mark),
        _ => return inner,
    };
    render::container(tag).child(inner).build()
}

fn apply_link(inner: RenderElement, mark: &Value) -> RenderElement {
    let href = mark
        .pointer("/attrs/href")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    let href = match mark
        .pointer("/attrs/anchor")
        .and_then(Value::as_str)
        .filter(|a| !a.is_empty())
    {
        Some(anchor) => format!("{href}#{anchor}"),
        None => href.to_string(),
    };
    if !is_safe_href(&href) {
        return inner;
    }

    let mut link = render::container("a").attr("href", &href);
    if mark.pointer("/attrs/target").and_then(Value::as_str) == Some("_blank") {
        link = link
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer");
    }
    link.child(inner).build()
}

/// Blocks embedded in a document (`{"type": "blok", "attrs": {"body": [...]}}`).
fn render_embedded_blocks(node: &Value, cx: &RenderContext<'_>) -> Vec<RenderElement> {
    let Some(body) = node.pointer("/attrs/body").and_then(Value::as_array) else {
        return Vec::new();
    };
    body.iter()
        .filter_map(storyblok::node_from_value)
        .map(|child| cx.render_subtree(&child))
        .collect()
}
