
use anyhow::{Context, Result};
use tracing::debug;

use crate::embeddings::Embedder;
use crate::ranking::{self, DocumentMatch};
use crate::store::VectorStore;

/// Passage hits fetched per requested document. Several passages of
/// one document can occupy the head of the passage ranking, so the
/// store is over-fetched before document-level aggregation to keep
/// the result page from starving.
pub const OVERFETCH_FACTOR: usize = 10;

/// Run a natural-language query end to end: embed it, over-fetch
/// passage hits from the store, and collapse them into a ranked
/// document list. A failed query embedding surfaces immediately.
#[inline]
pub fn search_documents(
    store: &VectorStore,
    embedder: &dyn Embedder,
    query: &str,
    top_k_documents: usize,
) -> Result<Vec<DocumentMatch>> {
    let query_vector = embedder.embed(query).context("Failed to embed the query")?;

    let fetch = top_k_documents.saturating_mul(OVERFETCH_FACTOR).max(1);
    debug!(
        "Fetching up to {} passages for {} requested documents",
        fetch, top_k_documents
    );
    let hits = store
        .search(&query_vector, fetch)
        .context("Passage search failed")?;

    Ok(ranking::aggregate(&hits, top_k_documents, store.metric()))
}
