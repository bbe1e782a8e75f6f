//! Vitrine Kernel Library
//!
//! Renders CMS content trees into render trees and HTML. The `vitrine`
//! binary is a thin CLI over this library.

pub mod config;
pub mod content;
pub mod error;
pub mod source;
pub mod state;
pub mod theme;

pub use config::Config;
pub use content::{BlockRegistry, BlockRenderer, RenderContext, RenderOptions, TreeRenderer};
pub use error::{AppError, AppResult};
pub use source::{ContentSource, FileSource, MemorySource, SourceError};
pub use state::AppState;
pub use theme::ThemeEngine;
