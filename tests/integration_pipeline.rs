//! End-to-end pipeline tests: index a directory of stub documents,
//! persist the store, reopen it from disk, and query it.

use scandex::ScandexError;
use scandex::embeddings::Embedder;
use scandex::embeddings::chunking::ChunkingConfig;
use scandex::indexer::Indexer;
use scandex::ocr::OcrEngine;
use scandex::query::search_documents;
use scandex::store::{Metric, VectorStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DIMENSION: usize = 16;

/// OCR stand-in keyed by file name; unknown files fail like an
/// unreadable image would.
struct StubOcr {
    texts: HashMap<String, String>,
}

impl OcrEngine for StubOcr {
    fn extract_text(&self, image: &Path) -> scandex::Result<String> {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .cloned()
            .ok_or_else(|| ScandexError::Ocr(format!("unreadable image: {name}")))
    }
}

/// Deterministic embedding: a bag-of-bytes profile of the text, so
/// identical texts land on identical vectors.
struct ByteProfileEmbedder;

impl Embedder for ByteProfileEmbedder {
    fn embed(&self, text: &str) -> scandex::Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIMENSION];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % DIMENSION] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }
}

fn write_fixture_images(raw_dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(raw_dir).expect("create raw dir");
    for name in names {
        std::fs::write(raw_dir.join(name), []).expect("create image file");
    }
}

fn artifact_paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (
        dir.path().join("index").join("index.bin"),
        dir.path().join("index").join("metadata.json"),
    )
}

#[test]
fn index_persist_reopen_and_query() {
    let dir = TempDir::new().expect("tempdir");
    let raw_dir = dir.path().join("raw");
    write_fixture_images(&raw_dir, &["invoice.png", "note.png", "blank.png"]);

    let invoice_text = "invoice total amount due 42 dollars payable on receipt";
    let note_text = "meeting notes tuesday agenda and action items";
    let ocr = StubOcr {
        texts: HashMap::from([
            ("invoice.png".to_string(), invoice_text.to_string()),
            ("note.png".to_string(), note_text.to_string()),
            ("blank.png".to_string(), String::new()),
        ]),
    };

    let (index_path, metadata_path) = artifact_paths(&dir);
    let store = VectorStore::open(&index_path, &metadata_path, DIMENSION, Metric::L2)
        .expect("store should open");
    let indexer = Indexer::new(&ocr, &ByteProfileEmbedder, &store, ChunkingConfig::default());

    let report = indexer
        .index_directory(&raw_dir, |_| {})
        .expect("indexing should succeed");

    assert_eq!(report.stats.documents_discovered, 3);
    assert_eq!(report.stats.documents_indexed, 2);
    assert_eq!(report.stats.documents_without_text, 1);
    assert!(index_path.exists());
    assert!(metadata_path.exists());

    // A fresh store over the same artifacts serves the same index.
    let reopened = VectorStore::open(&index_path, &metadata_path, DIMENSION, Metric::L2)
        .expect("reopen should succeed");
    assert_eq!(
        reopened.passage_count().expect("count"),
        store.passage_count().expect("count")
    );

    let matches = search_documents(&reopened, &ByteProfileEmbedder, invoice_text, 3)
        .expect("query should succeed");

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].source_document, "invoice.png");
    assert_eq!(matches[0].best_score, 0.0);
    assert!(matches[0].best_preview.starts_with("invoice total amount due"));
    assert_eq!(matches[1].source_document, "note.png");
}

#[test]
fn multi_chunk_documents_collapse_to_one_result() {
    let dir = TempDir::new().expect("tempdir");
    let raw_dir = dir.path().join("raw");
    write_fixture_images(&raw_dir, &["ledger.png", "memo.png"]);

    // Long enough to split into several overlapping passages.
    let ledger_text = (0..120)
        .map(|i| format!("entry{i} ledger balance"))
        .collect::<Vec<_>>()
        .join(" ");
    let memo_text = "short memo about the office plants";
    let ocr = StubOcr {
        texts: HashMap::from([
            ("ledger.png".to_string(), ledger_text.clone()),
            ("memo.png".to_string(), memo_text.to_string()),
        ]),
    };

    let (index_path, metadata_path) = artifact_paths(&dir);
    let store = VectorStore::open(&index_path, &metadata_path, DIMENSION, Metric::L2)
        .expect("store should open");
    let chunking = ChunkingConfig {
        chunk_size: 120,
        overlap: 30,
    };
    let indexer = Indexer::new(&ocr, &ByteProfileEmbedder, &store, chunking);

    let report = indexer
        .index_directory(&raw_dir, |_| {})
        .expect("indexing should succeed");
    assert!(report.stats.chunks_embedded > 3);

    // Every ledger passage is a near-neighbor of this query, but the
    // ranking must collapse them into a single document entry.
    let matches = search_documents(&store, &ByteProfileEmbedder, &ledger_text, 5)
        .expect("query should succeed");

    let ledger_entries = matches
        .iter()
        .filter(|m| m.source_document == "ledger.png")
        .count();
    assert_eq!(ledger_entries, 1);
    assert!(matches.len() <= 2);
}

#[test]
fn reindexing_appends_only_new_documents() {
    let dir = TempDir::new().expect("tempdir");
    let raw_dir = dir.path().join("raw");
    write_fixture_images(&raw_dir, &["first.png"]);

    let mut texts = HashMap::from([(
        "first.png".to_string(),
        "the first scanned page".to_string(),
    )]);

    let (index_path, metadata_path) = artifact_paths(&dir);
    {
        let store = VectorStore::open(&index_path, &metadata_path, DIMENSION, Metric::L2)
            .expect("store should open");
        let ocr = StubOcr {
            texts: texts.clone(),
        };
        let indexer = Indexer::new(&ocr, &ByteProfileEmbedder, &store, ChunkingConfig::default());
        indexer.index_directory(&raw_dir, |_| {}).expect("first run");
    }

    // A later run over the reopened store picks up only the new file.
    write_fixture_images(&raw_dir, &["second.png"]);
    texts.insert(
        "second.png".to_string(),
        "the second scanned page".to_string(),
    );

    let store = VectorStore::open(&index_path, &metadata_path, DIMENSION, Metric::L2)
        .expect("reopen should succeed");
    let ocr = StubOcr { texts };
    let indexer = Indexer::new(&ocr, &ByteProfileEmbedder, &store, ChunkingConfig::default());
    let report = indexer
        .index_directory(&raw_dir, |_| {})
        .expect("second run");

    assert_eq!(report.stats.documents_already_indexed, 1);
    assert_eq!(report.stats.documents_indexed, 1);
    assert_eq!(store.passage_count().expect("count"), 2);

    let docs = store.indexed_documents().expect("docs");
    assert!(docs.contains("first.png"));
    assert!(docs.contains("second.png"));
}
