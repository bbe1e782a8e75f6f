//! Vitrine Block SDK
//!
//! Content tree types and the render element builder API shared by the
//! kernel and every block renderer.

pub mod render;
pub mod types;
