//! Content rendering.
//!
//! This module provides:
//! - BlockRegistry: Maps block type tags to their renderers
//! - TreeRenderer: Walks a content tree and builds the render tree
//! - Standard block renderers for the site's design system
//! - FilterPipeline: Text format filtering for security

pub mod block_render;
pub mod block_types;
mod filter;
pub mod richtext;
pub mod tree;

pub use block_types::{BlockRegistry, BlockRenderer};
pub use filter::{FilterPipeline, TextFilter, html_escape};
pub use tree::{
    DEFAULT_MAX_DEPTH, EDITABLE_ATTR, EDITABLE_UID_ATTR, FallbackReason, RenderContext,
    RenderOptions, TreeRenderer, render_fallback,
};
