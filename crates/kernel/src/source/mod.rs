//! Content sources.
//!
//! A [`ContentSource`] hands the renderer a fully materialized, normalized
//! content tree. Fetching, caching, and retry policy belong to the source;
//! the renderer never performs I/O.

pub mod storyblok;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use vitrine_sdk::types::ContentNode;

/// Story slug used when the identifier is empty (the site root).
pub const HOME_SLUG: &str = "home";

/// Errors raised while fetching a content tree.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("story not found: {0}")]
    NotFound(String),

    #[error("invalid story identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("failed to read story file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse story {identifier}")]
    Parse {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("story {0} has no renderable root block")]
    Malformed(String),
}

/// Something that can fetch a content tree by story identifier.
pub trait ContentSource: Send + Sync {
    fn fetch_content_tree(&self, identifier: &str) -> Result<ContentNode, SourceError>;
}

/// Normalize a story identifier into a slug.
///
/// Leading and trailing slashes are ignored, and the empty identifier maps to
/// [`HOME_SLUG`]. Nested slugs (`blog/first-post`) are allowed; path
/// traversal and absolute paths are not.
pub fn normalize_slug(identifier: &str) -> Result<String, SourceError> {
    let trimmed = identifier.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(HOME_SLUG.to_string());
    }

    let valid = trimmed.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    });
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(SourceError::InvalidIdentifier(identifier.to_string()))
    }
}

/// In-memory stories, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    stories: HashMap<String, ContentNode>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a story. The slug is normalized the same way lookups are.
    pub fn insert(&mut self, slug: &str, root: ContentNode) -> Result<(), SourceError> {
        self.stories.insert(normalize_slug(slug)?, root);
        Ok(())
    }

    pub fn with_story(mut self, slug: &str, root: ContentNode) -> Result<Self, SourceError> {
        self.insert(slug, root)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

impl ContentSource for MemorySource {
    fn fetch_content_tree(&self, identifier: &str) -> Result<ContentNode, SourceError> {
        let slug = normalize_slug(identifier)?;
        self.stories
            .get(&slug)
            .cloned()
            .ok_or(SourceError::NotFound(slug))
    }
}

/// Stories stored as JSON files, one per slug: `{root}/{slug}.json`.
///
/// Files hold either a CMS story response or a bare root block; see
/// [`storyblok::normalize_story`].
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a slug.
    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{slug}.json"))
    }
}

impl ContentSource for FileSource {
    fn fetch_content_tree(&self, identifier: &str) -> Result<ContentNode, SourceError> {
        let slug = normalize_slug(identifier)?;
        let path = self.path_for(&slug);
        debug!(slug = %slug, path = %path.display(), "loading story");

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(slug));
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
                identifier: slug.clone(),
                source,
            })?;
        storyblok::normalize_story(&slug, &value)
    }
}
