pub mod chunking;
pub mod ollama;

use crate::Result;

/// Maps a text string to a fixed-dimension embedding vector.
///
/// Implementations signal failure per call; pipeline callers decide
/// whether a failed embedding skips one unit or aborts the run.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
