
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::embeddings::Embedder;
use crate::embeddings::chunking::{ChunkingConfig, chunk_text};
use crate::ocr::{OcrEngine, is_supported_image};
use crate::store::{NewPassage, VectorStore};

/// What happened to one source document during an indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// OCR produced text; `stored` passages were embedded and added,
    /// `failed_chunks` were skipped on embedding failure.
    Indexed {
        stored: usize,
        failed_chunks: usize,
    },
    /// OCR ran but found no text; the document was skipped.
    NoText,
    /// The store already holds passages for this document.
    AlreadyIndexed,
    /// OCR itself failed for this document.
    Failed(String),
}

/// Statistics about an indexing run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub documents_discovered: usize,
    pub documents_indexed: usize,
    pub documents_without_text: usize,
    pub documents_already_indexed: usize,
    pub documents_failed: usize,
    pub chunks_embedded: usize,
    pub chunks_failed: usize,
    pub duration: Duration,
}

/// Full report of an indexing run: aggregate stats plus the outcome
/// of every discovered document, in scan order.
#[derive(Debug)]
pub struct IndexReport {
    pub stats: IndexStats,
    pub outcomes: Vec<(String, DocumentOutcome)>,
}

/// Batch pipeline turning a directory of document images into stored
/// passage embeddings: OCR each image, chunk the transcript, embed
/// each chunk, add it to the store, and persist once at the end.
///
/// Per-unit failures (one image, one chunk) are recorded and skipped;
/// only store persistence failures abort the run.
pub struct Indexer<'a> {
    ocr: &'a dyn OcrEngine,
    embedder: &'a dyn Embedder,
    store: &'a VectorStore,
    chunking: ChunkingConfig,
}

impl<'a> Indexer<'a> {
    #[inline]
    pub fn new(
        ocr: &'a dyn OcrEngine,
        embedder: &'a dyn Embedder,
        store: &'a VectorStore,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            ocr,
            embedder,
            store,
            chunking,
        }
    }

    /// Index every supported image under `documents_dir`. Documents
    /// the store already knows are skipped, so re-running picks up
    /// only new files. `on_document` fires once per discovered file,
    /// before it is processed, for progress display.
    #[inline]
    pub fn index_directory(
        &self,
        documents_dir: &Path,
        mut on_document: impl FnMut(&str),
    ) -> Result<IndexReport> {
        let started = Instant::now();
        let documents = discover_documents(documents_dir)?;
        info!(
            "Discovered {} candidate documents in {}",
            documents.len(),
            documents_dir.display()
        );

        let already_indexed = self
            .store
            .indexed_documents()
            .context("Failed to read indexed documents from the store")?;

        let mut stats = IndexStats {
            documents_discovered: documents.len(),
            ..IndexStats::default()
        };
        let mut outcomes = Vec::with_capacity(documents.len());

        for path in &documents {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            on_document(&name);

            let outcome = if already_indexed.contains(&name) {
                debug!("Skipping {}: already indexed", name);
                DocumentOutcome::AlreadyIndexed
            } else {
                self.index_document(path, &name)
            };

            match &outcome {
                DocumentOutcome::Indexed {
                    stored,
                    failed_chunks,
                } => {
                    stats.documents_indexed += 1;
                    stats.chunks_embedded += stored;
                    stats.chunks_failed += failed_chunks;
                }
                DocumentOutcome::NoText => stats.documents_without_text += 1,
                DocumentOutcome::AlreadyIndexed => stats.documents_already_indexed += 1,
                DocumentOutcome::Failed(_) => stats.documents_failed += 1,
            }
            outcomes.push((name, outcome));
        }

        self.store.save().context("Failed to persist the index")?;

        stats.duration = started.elapsed();
        info!(
            "Indexing finished: {} documents indexed, {} chunks embedded, {} chunks failed in {:?}",
            stats.documents_indexed, stats.chunks_embedded, stats.chunks_failed, stats.duration
        );

        Ok(IndexReport { stats, outcomes })
    }

    fn index_document(&self, path: &Path, name: &str) -> DocumentOutcome {
        let text = match self.ocr.extract_text(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR failed for {}: {}", name, e);
                return DocumentOutcome::Failed(e.to_string());
            }
        };

        if text.is_empty() {
            debug!("No text found in {}", name);
            return DocumentOutcome::NoText;
        }

        let chunks = chunk_text(&text, &self.chunking);
        if chunks.is_empty() {
            return DocumentOutcome::NoText;
        }

        let chunk_count = chunks.len();
        let mut stored = 0;
        let mut failed_chunks = 0;

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let vector = match self.embedder.embed(&chunk) {
                Ok(vector) => vector,
                Err(e) => {
                    warn!("Embedding failed for chunk {} of {}: {}", chunk_index, name, e);
                    failed_chunks += 1;
                    continue;
                }
            };

            match self.store.add(
                &vector,
                NewPassage {
                    source_document: name.to_string(),
                    text: chunk,
                    chunk_index,
                    chunk_count,
                },
            ) {
                Ok(id) => {
                    debug!("Stored chunk {} of {} as passage {}", chunk_index, name, id);
                    stored += 1;
                }
                Err(e) => {
                    warn!("Failed to store chunk {} of {}: {}", chunk_index, name, e);
                    failed_chunks += 1;
                }
            }
        }

        DocumentOutcome::Indexed {
            stored,
            failed_chunks,
        }
    }
}

/// Supported image files directly under `documents_dir`, sorted by
/// name so runs are deterministic. A missing directory is an empty
/// scan, not an error.
#[inline]
pub fn discover_documents(documents_dir: &Path) -> Result<Vec<PathBuf>> {
    if !documents_dir.exists() {
        return Ok(Vec::new());
    }

    let mut documents: Vec<PathBuf> = fs::read_dir(documents_dir)
        .with_context(|| format!("Failed to read {}", documents_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();
    documents.sort();
    Ok(documents)
}
