//! Theme engine with Tera templates and suggestion resolution.

use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::Tera;
use tracing::{debug, warn};
use vitrine_sdk::render::RenderElement;

use super::render::RenderTreeConsumer;
use crate::content::html_escape;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Cache mapping suggestion lists to resolved template names.
    suggestion_cache: DashMap<String, String>,
    /// Render tree consumer for RenderElement → HTML.
    render_consumer: RenderTreeConsumer,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            suggestion_cache: DashMap::new(),
            render_consumer: RenderTreeConsumer::new(),
        })
    }

    /// Create a theme engine with no templates; everything renders inline.
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
            suggestion_cache: DashMap::new(),
            render_consumer: RenderTreeConsumer::new(),
        }
    }

    /// Add a template from a string (overrides, tests).
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, source)
            .with_context(|| format!("failed to add template {name}"))?;
        self.clear_cache();
        Ok(())
    }

    /// Resolve the best template from a list of suggestions.
    ///
    /// Templates are tried in order; the first one that exists is returned.
    /// Results are cached for performance.
    ///
    /// Example suggestions: `["page--blog--first-post", "page--blog", "page"]`
    pub fn resolve_template(&self, suggestions: &[&str]) -> Option<String> {
        if suggestions.is_empty() {
            return None;
        }

        let cache_key = suggestions.join("|");
        if let Some(cached) = self.suggestion_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        for suggestion in suggestions {
            let template_name = format!("{suggestion}.html");
            if self.tera.get_template(&template_name).is_ok() {
                self.suggestion_cache
                    .insert(cache_key, template_name.clone());
                return Some(template_name);
            }
        }

        // Negative results are not cached so templates added later are found.
        None
    }

    /// Render a RenderElement tree to HTML.
    pub fn render_element(&self, element: &RenderElement) -> String {
        self.render_consumer.render(&self.tera, element)
    }

    /// Get page template suggestions for a story slug.
    ///
    /// `blog/first-post` yields `page--blog--first-post`, `page--blog`, `page`.
    pub fn page_suggestions(slug: &str) -> Vec<String> {
        let segments: Vec<&str> = slug
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut suggestions: Vec<String> = (1..=segments.len())
            .rev()
            .map(|n| format!("page--{}", segments[..n].join("--")))
            .collect();
        suggestions.push("page".to_string());
        suggestions
    }

    /// Render a full HTML document around rendered content.
    ///
    /// Uses the most specific `page*.html` template when one exists, otherwise
    /// a minimal built-in document.
    pub fn render_page(&self, slug: &str, title: &str, content: &str, preview: bool) -> String {
        let suggestions = Self::page_suggestions(slug);
        let suggestion_refs: Vec<&str> = suggestions.iter().map(|s| s.as_str()).collect();

        if let Some(template) = self.resolve_template(&suggestion_refs) {
            let mut context = tera::Context::new();
            context.insert("title", title);
            context.insert("content", content);
            context.insert("slug", slug);
            context.insert("preview", &preview);

            match self.tera.render(&template, &context) {
                Ok(html) => return html,
                Err(e) => warn!(
                    template = %template,
                    error = %e,
                    "page template failed; using built-in document"
                ),
            }
        }

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n</head>\n<body>\n{content}\n</body>\n</html>\n",
            html_escape(title)
        )
    }

    /// Clear the suggestion cache (useful for development hot-reload).
    pub fn clear_cache(&self) {
        self.suggestion_cache.clear();
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.suggestion_cache.len())
            .finish()
    }
}
