
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Result, ScandexError};

/// Characters of stored passage text carried into a hit preview.
const PREVIEW_CHARS: usize = 200;

/// Distance metric, fixed when the store is created.
///
/// The variant owns its "better" direction: every score comparison in
/// the store and in document ranking goes through [`Metric::cmp_scores`]
/// or [`Metric::ranks_before`], so L2 results sort ascending and cosine
/// results sort descending without callers hardcoding either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Euclidean distance; lower is better, 0.0 is a perfect match.
    #[default]
    L2,
    /// Cosine similarity; higher is better, 1.0 is a perfect match.
    Cosine,
}

impl Metric {
    /// Score a stored vector against a query vector. Both slices must
    /// have the same length.
    #[inline]
    pub fn score(self, query: &[f32], stored: &[f32]) -> f32 {
        match self {
            Metric::L2 => query
                .iter()
                .zip(stored)
                .map(|(a, b)| {
                    let d = a - b;
                    d * d
                })
                .sum::<f32>()
                .sqrt(),
            Metric::Cosine => {
                let dot: f32 = query.iter().zip(stored).map(|(a, b)| a * b).sum();
                let norm_q = query.iter().map(|a| a * a).sum::<f32>().sqrt();
                let norm_s = stored.iter().map(|b| b * b).sum::<f32>().sqrt();
                if norm_q == 0.0 || norm_s == 0.0 {
                    0.0
                } else {
                    dot / (norm_q * norm_s)
                }
            }
        }
    }

    /// Ordering that ranks better scores first under this metric.
    #[inline]
    pub fn cmp_scores(self, a: f32, b: f32) -> Ordering {
        let ascending = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            Metric::L2 => ascending,
            Metric::Cosine => ascending.reverse(),
        }
    }

    /// Whether score `a` ranks strictly ahead of score `b`.
    #[inline]
    pub fn ranks_before(self, a: f32, b: f32) -> bool {
        self.cmp_scores(a, b) == Ordering::Less
    }
}

/// One indexed passage: the metadata stored alongside a vector.
///
/// Records are immutable once created. The `id` is the join key to the
/// vector index: `records[i].id == i`, and vector `i` occupies the
/// `i`-th dimension-sized slot of the flat vector buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub id: u64,
    pub source_document: String,
    pub text: String,
    pub chunk_index: usize,
    pub chunk_count: usize,
}

/// Metadata for a passage about to be added; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassage {
    pub source_document: String,
    pub text: String,
    pub chunk_index: usize,
    pub chunk_count: usize,
}

/// A passage-level search result. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub source_document: String,
    pub text_preview: String,
    pub score: f32,
}

/// Binary index artifact layout. The flat vector buffer holds
/// `vectors.len() / dimension` embeddings in insertion order.
#[derive(Serialize)]
struct IndexSnapshotRef<'a> {
    dimension: u32,
    vectors: &'a [f32],
}

#[derive(Deserialize)]
struct IndexSnapshot {
    dimension: u32,
    vectors: Vec<f32>,
}

#[derive(Debug, Default)]
struct StoreInner {
    vectors: Vec<f32>,
    records: Vec<PassageRecord>,
}

/// Append-only store of fixed-dimension embedding vectors with
/// parallel passage metadata and exact nearest-neighbor search.
///
/// Persistence is a matched artifact pair: a binary index snapshot and
/// a JSON metadata array whose position equals the passage id. Both
/// are written via temp-file-and-rename so a crash mid-save never
/// leaves the pair disagreeing on count.
#[derive(Debug)]
pub struct VectorStore {
    index_path: PathBuf,
    metadata_path: PathBuf,
    dimension: usize,
    metric: Metric,
    inner: RwLock<StoreInner>,
}

impl VectorStore {
    /// Open a store backed by the given artifact paths.
    ///
    /// When both artifacts exist they are loaded and cross-checked;
    /// any disagreement surfaces as [`ScandexError::CorruptArtifact`].
    /// A missing artifact (or a partial pair) means "no index yet" and
    /// the store starts empty.
    #[inline]
    pub fn open<P: AsRef<Path>>(
        index_path: P,
        metadata_path: P,
        dimension: usize,
        metric: Metric,
    ) -> Result<Self> {
        let index_path = index_path.as_ref().to_path_buf();
        let metadata_path = metadata_path.as_ref().to_path_buf();

        if dimension == 0 {
            return Err(ScandexError::Config(
                "vector dimension must be non-zero".to_string(),
            ));
        }

        let inner = if index_path.exists() && metadata_path.exists() {
            load_artifacts(&index_path, &metadata_path, dimension)?
        } else {
            if index_path.exists() != metadata_path.exists() {
                warn!(
                    "Found a partial artifact pair at {} / {}; starting with an empty index",
                    index_path.display(),
                    metadata_path.display()
                );
            } else {
                debug!("No persisted index found, starting with an empty index");
            }
            StoreInner::default()
        };

        Ok(Self {
            index_path,
            metadata_path,
            dimension,
            metric,
            inner: RwLock::new(inner),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Append a vector and its passage metadata, returning the
    /// assigned id. Ids are sequential and equal the insertion order;
    /// the write lock serializes concurrent adds so ids never collide.
    #[inline]
    pub fn add(&self, vector: &[f32], passage: NewPassage) -> Result<u64> {
        if vector.len() != self.dimension {
            return Err(ScandexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let mut inner = self.write_lock()?;
        let id = inner.records.len() as u64;
        inner.vectors.extend_from_slice(vector);
        inner.records.push(PassageRecord {
            id,
            source_document: passage.source_document,
            text: passage.text,
            chunk_index: passage.chunk_index,
            chunk_count: passage.chunk_count,
        });
        debug!("Stored passage {} ({} total)", id, inner.records.len());
        Ok(id)
    }

    /// Exact nearest-neighbor search: scores every stored vector under
    /// the configured metric and returns the `top_k` best hits.
    ///
    /// An empty store yields an empty result, not an error. Ties are
    /// broken by insertion order (lower id first), and a `top_k`
    /// larger than the stored count returns every stored passage.
    #[inline]
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(ScandexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let inner = self.read_lock()?;
        if inner.records.is_empty() {
            debug!("Search against an empty index");
            return Ok(Vec::new());
        }

        let mut scored: Vec<(u64, f32)> = inner
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, stored)| (i as u64, self.metric.score(query, stored)))
            .collect();
        scored.sort_by(|a, b| self.metric.cmp_scores(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(top_k);

        let hits = scored
            .into_iter()
            .map(|(id, score)| {
                let record = &inner.records[id as usize];
                SearchHit {
                    id,
                    source_document: record.source_document.clone(),
                    text_preview: preview(&record.text),
                    score,
                }
            })
            .collect();
        Ok(hits)
    }

    /// Number of stored passages.
    #[inline]
    pub fn passage_count(&self) -> Result<usize> {
        Ok(self.read_lock()?.records.len())
    }

    /// Distinct source documents with at least one stored passage.
    #[inline]
    pub fn indexed_documents(&self) -> Result<HashSet<String>> {
        let inner = self.read_lock()?;
        Ok(inner
            .records
            .iter()
            .map(|r| r.source_document.clone())
            .collect())
    }

    /// Persist the artifact pair.
    ///
    /// Each artifact is written to a temporary sibling and renamed into
    /// place, index first, so no reader or crash observes an index
    /// whose count disagrees with its metadata.
    #[inline]
    pub fn save(&self) -> Result<()> {
        let inner = self.read_lock()?;

        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let index_bytes = bincode::serialize(&IndexSnapshotRef {
            dimension: self.dimension as u32,
            vectors: &inner.vectors,
        })
        .map_err(|e| ScandexError::Other(e.into()))?;
        write_atomic(&self.index_path, &index_bytes)?;

        let metadata_bytes =
            serde_json::to_vec(&inner.records).map_err(|e| ScandexError::Other(e.into()))?;
        write_atomic(&self.metadata_path, &metadata_bytes)?;

        info!(
            "Saved {} passages to {}",
            inner.records.len(),
            self.index_path.display()
        );
        Ok(())
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| ScandexError::Other(anyhow::anyhow!("vector store lock poisoned")))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| ScandexError::Other(anyhow::anyhow!("vector store lock poisoned")))
    }
}

fn load_artifacts(index_path: &Path, metadata_path: &Path, dimension: usize) -> Result<StoreInner> {
    let index_bytes = fs::read(index_path)?;
    let snapshot: IndexSnapshot = bincode::deserialize(&index_bytes).map_err(|e| {
        ScandexError::CorruptArtifact(format!(
            "failed to decode index artifact {}: {e}",
            index_path.display()
        ))
    })?;

    if snapshot.dimension as usize != dimension {
        return Err(ScandexError::CorruptArtifact(format!(
            "index artifact has dimension {}, store is configured for {}",
            snapshot.dimension, dimension
        )));
    }
    if snapshot.vectors.len() % dimension != 0 {
        return Err(ScandexError::CorruptArtifact(format!(
            "index artifact holds {} values, not a multiple of dimension {}",
            snapshot.vectors.len(),
            dimension
        )));
    }

    let metadata_raw = fs::read_to_string(metadata_path)?;
    let records: Vec<PassageRecord> = serde_json::from_str(&metadata_raw).map_err(|e| {
        ScandexError::CorruptArtifact(format!(
            "failed to decode metadata artifact {}: {e}",
            metadata_path.display()
        ))
    })?;

    let vector_count = snapshot.vectors.len() / dimension;
    if records.len() != vector_count {
        return Err(ScandexError::CorruptArtifact(format!(
            "index artifact holds {} vectors but metadata artifact holds {} records",
            vector_count,
            records.len()
        )));
    }
    for (i, record) in records.iter().enumerate() {
        if record.id != i as u64 {
            return Err(ScandexError::CorruptArtifact(format!(
                "metadata record at position {} carries id {}",
                i, record.id
            )));
        }
    }

    info!(
        "Loaded persisted index with {} passages from {}",
        vector_count,
        index_path.display()
    );
    Ok(StoreInner {
        vectors: snapshot.vectors,
        records,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
