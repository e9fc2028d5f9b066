
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for passage chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target characters per chunk.
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the
    /// next chunk. Must stay below `chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

/// Split a transcript into overlapping, word-safe passages.
///
/// A cursor walks the text in `chunk_size`-character windows. When a
/// window ends mid-text, it is pulled back to the last space inside it
/// so no word is split. Each window is emitted trimmed (whitespace-only
/// windows are dropped) and the cursor advances by
/// `chunk_size - overlap`, falling forward to the window end whenever
/// a pulled-back boundary would stall it. Counts are characters, not
/// bytes, so multi-byte input never splits a code point.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    debug_assert!(config.overlap < config.chunk_size);

    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let proposed = start + config.chunk_size;
        let mut end = proposed;

        if proposed < len {
            // Pull the boundary back to the last space in the window.
            // A space at the very start of the window is no boundary.
            if let Some(pos) = chars[start..proposed].iter().rposition(|&c| c == ' ') {
                if pos > 0 {
                    end = start + pos;
                }
            }
        }

        let window: String = chars[start..end.min(len)].iter().collect();
        let chunk = window.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        let next = end.saturating_sub(config.overlap);
        start = if next > start { next } else { end };
    }

    debug!("Split text into {} chunks", chunks.len());
    chunks
}
