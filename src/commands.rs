use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::indexer::{DocumentOutcome, Indexer, discover_documents};
use crate::ocr::{OcrEngine, TesseractOcr};
use crate::query;
use crate::store::VectorStore;

fn open_store(config: &Config) -> Result<VectorStore> {
    let store = VectorStore::open(
        config.index_file(),
        config.metadata_file(),
        config.ollama.embedding_dimension as usize,
        config.index.metric,
    )?;
    Ok(store)
}

/// Scan the raw documents folder, run the indexing pipeline, and
/// print the run report.
#[inline]
pub fn run_index(config: &Config, force: bool) -> Result<()> {
    let raw_dir = config.raw_documents_dir();
    fs::create_dir_all(&raw_dir)
        .with_context(|| format!("Failed to create {}", raw_dir.display()))?;

    let documents = discover_documents(&raw_dir)?;
    if documents.is_empty() {
        println!("{}", style("No documents found.").yellow());
        println!(
            "Add scanned images (png, jpg, tiff, ...) to {} and re-run.",
            style(raw_dir.display()).cyan()
        );
        return Ok(());
    }

    if force {
        clear_artifacts(config)?;
    }

    let ocr = TesseractOcr::new(&config.ocr);
    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let store = open_store(config)?;
    let indexer = Indexer::new(&ocr, &client, &store, config.chunking.clone());

    println!(
        "Found {} documents to process.",
        style(documents.len()).bold()
    );

    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    let report = indexer.index_directory(&raw_dir, |name| {
        bar.set_message(name.to_string());
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    for (name, outcome) in &report.outcomes {
        match outcome {
            DocumentOutcome::NoText => println!(
                "{}",
                style(format!("Skipped {name} (no text found)")).yellow()
            ),
            DocumentOutcome::Failed(reason) => {
                println!("{}", style(format!("Failed {name}: {reason}")).red());
            }
            DocumentOutcome::Indexed { failed_chunks, .. } if *failed_chunks > 0 => println!(
                "{}",
                style(format!("Indexed {name} ({failed_chunks} chunks failed to embed)")).yellow()
            ),
            _ => {}
        }
    }

    let stats = &report.stats;
    println!();
    println!("{}", style("Indexing complete!").bold().green());
    println!("  Documents indexed: {}", stats.documents_indexed);
    if stats.documents_already_indexed > 0 {
        println!("  Already indexed: {}", stats.documents_already_indexed);
    }
    if stats.documents_without_text > 0 {
        println!("  Without text: {}", stats.documents_without_text);
    }
    if stats.documents_failed > 0 {
        println!("  Failed: {}", stats.documents_failed);
    }
    println!(
        "  Passages embedded: {} ({} failed)",
        stats.chunks_embedded, stats.chunks_failed
    );
    println!("  Duration: {:.2?}", stats.duration);
    println!(
        "  Database stored at: {}",
        style(config.index_dir().display()).cyan()
    );

    Ok(())
}

/// Search indexed documents with a natural-language query and print
/// the ranked results.
#[inline]
pub fn run_search(config: &Config, query_text: &str, top_k: usize) -> Result<()> {
    if !config.index_file().exists() {
        println!("{}", style("Index not found.").red());
        println!("Run {} first.", style("scandex index").yellow());
        return Ok(());
    }

    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let store = open_store(config)?;

    let matches = query::search_documents(&store, &client, query_text, top_k)?;

    if matches.is_empty() {
        println!("{}", style("No matches found.").yellow());
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Results for: '{query_text}'")).bold()
    );
    for (rank, result) in matches.iter().enumerate() {
        let preview = result.best_preview.replace('\n', " ");
        println!(
            "{:>3}. {} {}",
            rank + 1,
            style(format!("{:.4}", result.best_score)).cyan(),
            style(&result.source_document).magenta()
        );
        println!("     {}", style(preview).dim());
    }

    Ok(())
}

/// Report index size and location plus embedding server health.
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    println!("{}", style("Scandex Status").bold().cyan());
    println!();

    println!("{}", style("Index:").bold());
    if config.index_file().exists() && config.metadata_file().exists() {
        let store = open_store(config)?;
        let passages = store.passage_count()?;
        let documents = store.indexed_documents()?;
        println!("  Passages: {}", style(passages).bold());
        println!("  Documents: {}", style(documents.len()).bold());
        if !documents.is_empty() {
            let sample = documents.iter().sorted().take(5).join(", ");
            println!("  e.g. {}", style(sample).dim());
        }
    } else {
        println!("  {}", style("No index found.").yellow());
    }
    println!(
        "  Location: {}",
        style(config.index_dir().display()).dim()
    );
    println!(
        "  Dimension: {}, metric: {:?}",
        config.ollama.embedding_dimension, config.index.metric
    );

    println!();
    println!("{}", style("Embedding server:").bold());
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => println!(
                "  {} {}:{} ({})",
                style("Connected:").green(),
                config.ollama.host,
                config.ollama.port,
                config.ollama.model
            ),
            Err(e) => println!("  {} {e:#}", style("Unhealthy:").yellow()),
        },
        Err(e) => println!("  {} {e:#}", style("Unavailable:").red()),
    }

    Ok(())
}

/// Run OCR on a single image, print the transcript, and optionally
/// save it under the extracts folder.
#[inline]
pub fn run_extract(config: &Config, image: &str, save: bool) -> Result<()> {
    let direct = PathBuf::from(image);
    let image_path = if direct.exists() {
        direct
    } else {
        config.raw_documents_dir().join(image)
    };
    if !image_path.exists() {
        bail!("File not found: {}", image_path.display());
    }

    let ocr = TesseractOcr::new(&config.ocr);
    let text = ocr.extract_text(&image_path)?;

    if text.is_empty() {
        println!("{}", style("No text found.").yellow());
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Extracted text from {}:", image_path.display()))
            .bold()
            .green()
    );
    println!();
    println!("{text}");

    if save {
        let extracts = config.extracts_dir();
        fs::create_dir_all(&extracts)
            .with_context(|| format!("Failed to create {}", extracts.display()))?;
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "extract".to_string());
        let output_path = extracts.join(format!("{stem}.txt"));
        fs::write(&output_path, &text)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!();
        println!(
            "{}",
            style(format!("Saved transcript to: {}", output_path.display())).dim()
        );
    }

    Ok(())
}

fn clear_artifacts(config: &Config) -> Result<()> {
    for path in [config.index_file(), config.metadata_file()] {
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    info!("Cleared index artifacts for a forced re-index");
    Ok(())
}
