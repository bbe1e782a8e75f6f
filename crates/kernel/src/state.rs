//! Application state shared across render passes.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};
use vitrine_sdk::render::RenderElement;
use vitrine_sdk::types::ContentNode;

use crate::config::Config;
use crate::content::{BlockRegistry, RenderOptions, TreeRenderer};
use crate::error::AppResult;
use crate::source::{ContentSource, FileSource};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Block renderers, assembled once at startup.
    registry: Arc<BlockRegistry>,

    /// Where content trees come from.
    source: Arc<dyn ContentSource>,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,

    /// Default options for render passes.
    options: RenderOptions,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// A template directory that fails to load is logged and replaced by an
    /// empty engine, so output falls back to inline rendering.
    pub fn new(config: &Config) -> Result<Self> {
        let registry = Arc::new(BlockRegistry::with_standard_types());
        info!(block_types = registry.len(), "block registry ready");

        if !config.content_dir.is_dir() {
            warn!(
                content_dir = %config.content_dir.display(),
                "content directory does not exist"
            );
        }
        let source: Arc<dyn ContentSource> = Arc::new(FileSource::new(&config.content_dir));

        let theme = match &config.template_dir {
            Some(dir) => Self::load_theme(dir),
            None => ThemeEngine::empty(),
        };

        let options = RenderOptions::default()
            .preview(config.preview)
            .max_depth(config.max_depth);

        Ok(Self::from_parts(registry, source, Arc::new(theme), options))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        registry: Arc<BlockRegistry>,
        source: Arc<dyn ContentSource>,
        theme: Arc<ThemeEngine>,
        options: RenderOptions,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                registry,
                source,
                theme,
                options,
            }),
        }
    }

    fn load_theme(template_dir: &Path) -> ThemeEngine {
        info!(template_dir = %template_dir.display(), "loading templates from directory");
        ThemeEngine::new(template_dir)
            .inspect_err(
                |e| warn!(error = ?e, "failed to load templates, using empty engine"),
            )
            .unwrap_or_else(|_| ThemeEngine::empty())
    }

    /// Get the block registry.
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.inner.registry
    }

    /// Get the content source.
    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.inner.source
    }

    /// Get the theme engine.
    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    /// Get the default render options.
    pub fn options(&self) -> RenderOptions {
        self.inner.options
    }

    /// Fetch the content tree for a story.
    pub fn load_story(&self, slug: &str) -> AppResult<ContentNode> {
        let root = self.inner.source.fetch_content_tree(slug)?;
        debug!(
            slug,
            root = %root.id,
            nodes = root.subtree_len(),
            "content tree loaded"
        );
        Ok(root)
    }

    /// Fetch a story and render it with the default options.
    pub fn render_story(&self, slug: &str) -> AppResult<RenderElement> {
        self.render_story_with(slug, self.inner.options)
    }

    /// Fetch a story and render it with explicit options.
    pub fn render_story_with(&self, slug: &str, options: RenderOptions) -> AppResult<RenderElement> {
        let root = self.load_story(slug)?;
        Ok(self.render_tree(&root, options))
    }

    /// Render an already-fetched content tree.
    pub fn render_tree(&self, root: &ContentNode, options: RenderOptions) -> RenderElement {
        TreeRenderer::new(&self.inner.registry, options).render(root)
    }

    /// Fetch a story and render it to an HTML fragment.
    pub fn render_story_html(&self, slug: &str, options: RenderOptions) -> AppResult<String> {
        let element = self.render_story_with(slug, options)?;
        Ok(self.inner.theme.render_element(&element))
    }

    /// Fetch a story and render it to a complete HTML document.
    ///
    /// The document title is the root block's `title` field, or the slug.
    pub fn render_story_document(&self, slug: &str, options: RenderOptions) -> AppResult<String> {
        let root = self.load_story(slug)?;
        let element = self.render_tree(&root, options);
        let content = self.inner.theme.render_element(&element);
        let title = root
            .text("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(slug);
        Ok(self
            .inner
            .theme
            .render_page(slug, title, &content, options.preview))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.inner.registry)
            .field("theme", &self.inner.theme)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, SourceError};
    use crate::error::AppError;

    fn state() -> AppState {
        let source = MemorySource::new()
            .with_story(
                "home",
                ContentNode::new("r1", "page")
                    .with_field("title", "Welcome")
                    .with_field(
                        "body",
                        vec![ContentNode::new("h1", "headline").with_field("text", "Hello")],
                    ),
            )
            .unwrap();
        AppState::from_parts(
            Arc::new(BlockRegistry::with_standard_types()),
            Arc::new(source),
            Arc::new(ThemeEngine::empty()),
            RenderOptions::default(),
        )
    }

    #[test]
    fn test_render_story_html() {
        let html = state()
            .render_story_html("/", RenderOptions::default())
            .unwrap();
        assert_eq!(
            html,
            "<main class=\"page\"><h2 class=\"headline\">Hello</h2></main>"
        );
    }

    #[test]
    fn test_render_story_document_title() {
        let html = state()
            .render_story_document("home", RenderOptions::default())
            .unwrap();
        assert!(html.contains("<title>Welcome</title>"));
    }

    #[test]
    fn test_missing_story_is_not_found() {
        let err = state().render_story("missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, AppError::Source(SourceError::NotFound(_))));
    }

    #[test]
    fn test_new_without_templates() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            content_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let state = AppState::new(&config).unwrap();
        assert_eq!(state.registry().len(), 8);
        assert_eq!(state.options(), RenderOptions::default());
    }
}
