//! Block registry.
//!
//! Maps a block type tag to the renderer responsible for it. The registry is
//! assembled once at startup and shared read-only afterwards. Lookups never
//! fail: an unregistered tag resolves to `None` and the tree renderer shows
//! its placeholder instead.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use vitrine_sdk::render::RenderElement;
use vitrine_sdk::types::ContentNode;

use super::block_render;
use super::tree::RenderContext;

/// Render capability for one block type.
///
/// Implementations read whichever fields they need from the node and recurse
/// into the child slots they own through [`RenderContext::render_slot`] or
/// [`RenderContext::render_subtree`].
pub trait BlockRenderer: Send + Sync {
    fn render(&self, node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement;
}

impl<F> BlockRenderer for F
where
    F: Fn(&ContentNode, &RenderContext<'_>) -> RenderElement + Send + Sync,
{
    fn render(&self, node: &ContentNode, cx: &RenderContext<'_>) -> RenderElement {
        self(node, cx)
    }
}

/// Registry of block renderers, keyed by type tag.
#[derive(Clone, Default)]
pub struct BlockRegistry {
    renderers: HashMap<String, Arc<dyn BlockRenderer>>,
}

impl BlockRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the standard site blocks.
    pub fn with_standard_types() -> Self {
        let mut registry = Self::new();
        registry.register_standard_types();
        registry
    }

    /// Register the 8 standard blocks: page, container, grid, headline,
    /// text, button, image, slideshow.
    pub fn register_standard_types(&mut self) {
        self.register("page", block_render::render_page);
        self.register("container", block_render::render_container);
        self.register("grid", block_render::render_grid);
        self.register("headline", block_render::render_headline);
        self.register("text", block_render::render_text);
        self.register("button", block_render::render_button);
        self.register("image", block_render::render_image);
        self.register("slideshow", block_render::render_slideshow);
    }

    /// Register a renderer for a type tag. A later registration for the same
    /// tag replaces the earlier one.
    pub fn register<R: BlockRenderer + 'static>(&mut self, type_name: &str, renderer: R) {
        if self
            .renderers
            .insert(type_name.to_string(), Arc::new(renderer))
            .is_some()
        {
            debug!(type_name, "block renderer replaced");
        }
    }

    /// Register a closure as a renderer.
    pub fn register_fn<F>(&mut self, type_name: &str, render: F)
    where
        F: Fn(&ContentNode, &RenderContext<'_>) -> RenderElement + Send + Sync + 'static,
    {
        self.register(type_name, render);
    }

    /// Look up the renderer for a type tag (exact match).
    pub fn resolve(&self, type_name: &str) -> Option<&dyn BlockRenderer> {
        self.renderers.get(type_name).map(|r| r.as_ref())
    }

    /// Check whether a block type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.renderers.contains_key(type_name)
    }

    /// Return the number of registered block types.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// List all registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
