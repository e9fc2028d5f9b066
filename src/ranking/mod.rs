
use std::collections::HashMap;

use tracing::debug;

use crate::store::{Metric, SearchHit};

/// One ranked source document, collapsed from its passage-level hits.
/// Carries the best passage's score and preview.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMatch {
    pub source_document: String,
    pub best_score: f32,
    pub best_preview: String,
}

/// Collapse passage-level hits into a ranked list of unique source
/// documents.
///
/// Hits are grouped by document; each group keeps its single best
/// score under `metric`, and groups are sorted better-first. Equal
/// scores keep the order in which their documents first appeared in
/// `hits`, so the ranking is deterministic for a fixed input.
#[inline]
pub fn aggregate(hits: &[SearchHit], top_k_documents: usize, metric: Metric) -> Vec<DocumentMatch> {
    let mut matches: Vec<DocumentMatch> = Vec::new();
    let mut by_document: HashMap<&str, usize> = HashMap::new();

    for hit in hits {
        match by_document.get(hit.source_document.as_str()) {
            Some(&slot) => {
                if metric.ranks_before(hit.score, matches[slot].best_score) {
                    matches[slot].best_score = hit.score;
                    matches[slot].best_preview = hit.text_preview.clone();
                }
            }
            None => {
                by_document.insert(&hit.source_document, matches.len());
                matches.push(DocumentMatch {
                    source_document: hit.source_document.clone(),
                    best_score: hit.score,
                    best_preview: hit.text_preview.clone(),
                });
            }
        }
    }

    // Stable sort keeps first-encountered order for equal scores.
    matches.sort_by(|a, b| metric.cmp_scores(a.best_score, b.best_score));
    matches.truncate(top_k_documents);

    debug!(
        "Aggregated {} passage hits into {} document matches",
        hits.len(),
        matches.len()
    );
    matches
}
