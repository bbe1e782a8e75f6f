//! Tree renderer.
//!
//! Walks a content tree depth-first, resolving each node's type tag against
//! the [`BlockRegistry`] and producing one keyed [`RenderElement`] per node.
//! The walk is pure: input nodes are never mutated and no state survives a
//! render pass, so one registry can serve any number of concurrent passes.
//!
//! Nothing in here fails. Unknown types and excess nesting become a visible
//! placeholder; missing or malformed fields are the individual renderer's
//! business and degrade to empty output.

use tracing::{debug_span, warn};
use vitrine_sdk::render::{self, RenderElement};
use vitrine_sdk::types::ContentNode;

use super::block_types::BlockRegistry;

/// Default nesting ceiling.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Attribute carrying the visual-editor payload in preview mode.
pub const EDITABLE_ATTR: &str = "data-blok-c";
/// Attribute carrying the visual-editor block identity in preview mode.
pub const EDITABLE_UID_ATTR: &str = "data-blok-uid";

/// Per-pass render options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit editable-region attributes for the visual editor.
    pub preview: bool,
    /// Nodes at this depth or deeper (the root is depth 0) render as a
    /// placeholder.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Why a node was rendered as a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No renderer is registered for the node's type.
    UnknownType,
    /// The node sits at or below the nesting ceiling.
    TooDeep,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::UnknownType => "unknown",
            FallbackReason::TooDeep => "depth",
        }
    }
}

/// Renders content trees against a registry.
pub struct TreeRenderer<'a> {
    registry: &'a BlockRegistry,
    options: RenderOptions,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(registry: &'a BlockRegistry, options: RenderOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render a whole tree.
    pub fn render(&self, root: &ContentNode) -> RenderElement {
        let span = debug_span!(
            "render",
            root = %root.id,
            block_type = %root.block_type,
            preview = self.options.preview
        );
        let _guard = span.enter();
        self.render_at(root, 0)
    }

    fn render_at(&self, node: &ContentNode, depth: usize) -> RenderElement {
        let mut element = if depth >= self.options.max_depth {
            warn!(
                id = %node.id,
                block_type = %node.block_type,
                depth,
                max_depth = self.options.max_depth,
                "content nested too deeply; rendering placeholder"
            );
            render_fallback(node, FallbackReason::TooDeep, self.options.max_depth)
        } else {
            match self.registry.resolve(&node.block_type) {
                Some(renderer) => {
                    let cx = RenderContext { tree: self, depth };
                    renderer.render(node, &cx)
                }
                None => {
                    warn!(
                        id = %node.id,
                        block_type = %node.block_type,
                        "no renderer registered for block type; rendering placeholder"
                    );
                    render_fallback(node, FallbackReason::UnknownType, self.options.max_depth)
                }
            }
        };

        // A renderer that hands back a child's output as its own must not
        // steal the child's key.
        if element.key.is_some() {
            element = render::fragment().child(element).build();
        }
        element.key = Some(node.id.clone());

        // Fragments (empty or pass-through blocks) keep these in the tree;
        // HTML output has no element to put them on.
        if self.options.preview {
            let (payload, uid) = editable_attributes(node);
            element.set_attr(EDITABLE_ATTR, payload);
            element.set_attr(EDITABLE_UID_ATTR, uid);
        }

        element
    }
}

/// Handle given to block renderers for recursing into their children.
#[derive(Clone, Copy)]
pub struct RenderContext<'r> {
    tree: &'r TreeRenderer<'r>,
    depth: usize,
}

impl<'r> RenderContext<'r> {
    /// Render one nested node one level deeper than the current one.
    pub fn render_subtree(&self, node: &ContentNode) -> RenderElement {
        self.tree.render_at(node, self.depth + 1)
    }

    /// Render every node of a child slot, in order. Each element is keyed by
    /// its node's id. An absent or empty slot yields nothing.
    pub fn render_slot(&self, node: &ContentNode, field: &str) -> Vec<RenderElement> {
        node.children(field)
            .iter()
            .map(|child| self.render_subtree(child))
            .collect()
    }

    /// Depth of the node currently being rendered (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn preview(&self) -> bool {
        self.tree.options.preview
    }

    pub fn options(&self) -> RenderOptions {
        self.tree.options
    }

    pub fn registry(&self) -> &BlockRegistry {
        self.tree.registry
    }
}

/// Visible placeholder for a node that cannot be rendered.
pub fn render_fallback(node: &ContentNode, reason: FallbackReason, max_depth: usize) -> RenderElement {
    let message = match reason {
        FallbackReason::UnknownType => format!(
            "Unknown block type \"{}\" (id {})",
            node.block_type, node.id
        ),
        FallbackReason::TooDeep => format!(
            "Block \"{}\" (id {}) is nested deeper than {max_depth} levels",
            node.block_type, node.id
        ),
    };

    render::container("div")
        .class("block-fallback")
        .attr("data-block-type", &node.block_type)
        .attr("data-block-id", &node.id)
        .attr("data-block-reason", reason.as_str())
        .child(render::markup("p", &message).build())
        .build()
}

/// Editor payload and uid for a node.
///
/// Uses the CMS-provided marker when it parses, otherwise derives the payload
/// from the node's id and type.
fn editable_attributes(node: &ContentNode) -> (String, String) {
    let uid = format!("{}-{}", node.id, node.block_type);
    let payload = node
        .editor_meta()
        .and_then(parse_editor_comment)
        .unwrap_or_else(|| {
            serde_json::json!({ "name": node.block_type, "uid": node.id }).to_string()
        });
    (payload, uid)
}

/// Extract the JSON body of a `<!--#storyblok#{...}-->` marker.
fn parse_editor_comment(meta: &str) -> Option<String> {
    let body = meta
        .trim()
        .strip_prefix("<!--#storyblok#")?
        .strip_suffix("-->")?;
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.is_object().then(|| value.to_string())
}
