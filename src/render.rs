//! Image-render collaborator seam.
//!
//! The pipeline only needs `render(text) -> (path, content_hash)`; the
//! actual rasterization (template image, Devanagari font stack) lives
//! outside this crate. `DisabledRenderer` keeps meme-less deployments on the
//! text-only path, and the orchestrator degrades to text-only when a
//! configured renderer fails.

use std::path::PathBuf;

use anyhow::{bail, Result};

pub trait MemeRenderer: Send + Sync {
    /// Render `text` onto the meme template. Returns the image path and a
    /// stable content hash used as the media reference in history.
    fn render(&self, text: &str) -> Result<(PathBuf, String)>;

    fn name(&self) -> &'static str;
}

/// Used when no renderer is wired up; the orchestrator falls back to
/// text-only publishing.
pub struct DisabledRenderer;

impl MemeRenderer for DisabledRenderer {
    fn render(&self, _text: &str) -> Result<(PathBuf, String)> {
        bail!("no meme renderer configured")
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Test double: pretends every render succeeded, with a deterministic hash.
pub struct MockRenderer;

impl MemeRenderer for MockRenderer {
    fn render(&self, text: &str) -> Result<(PathBuf, String)> {
        let hash = crate::store::fingerprint(&[text, "meme-template"]);
        Ok((PathBuf::from(format!("out/meme_{hash}.jpg")), hash))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
