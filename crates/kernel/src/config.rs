//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::content::DEFAULT_MAX_DEPTH;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding story JSON files (default: ./content).
    pub content_dir: PathBuf,

    /// Directory holding Tera template overrides. When None, everything
    /// renders inline.
    pub template_dir: Option<PathBuf>,

    /// Render with visual-editor attributes (default: false).
    pub preview: bool,

    /// Nesting ceiling for content trees (default: 32).
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("./content"),
            template_dir: None,
            preview: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let content_dir = lookup("VITRINE_CONTENT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.content_dir);

        let template_dir = lookup("VITRINE_TEMPLATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let preview = match lookup("VITRINE_PREVIEW") {
            Some(v) => parse_bool(&v).context("VITRINE_PREVIEW must be a boolean")?,
            None => defaults.preview,
        };

        let max_depth = match lookup("VITRINE_MAX_DEPTH") {
            Some(v) => v
                .trim()
                .parse()
                .context("VITRINE_MAX_DEPTH must be a valid usize")?,
            None => defaults.max_depth,
        };
        if max_depth == 0 {
            anyhow::bail!("VITRINE_MAX_DEPTH must be at least 1");
        }

        Ok(Self {
            content_dir,
            template_dir,
            preview,
            max_depth,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
