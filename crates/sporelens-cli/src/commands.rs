//! Handler functions for the document commands.
//!
//! Each handler loads what it needs, runs the library operation, and writes
//! human-readable (or JSON) output to the given writer.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sporelens_content::{
    classify_field, order_fields, resolve_path, ExtractMode, PerspectiveExtractor,
};
use sporelens_core::{load_documents, Document, FieldPath, SporelensConfig};
use sporelens_fts::{
    CollectionSummary, InputEvent, PerspectiveAggregator, RankOptions, RankedResult,
    SearchService, Visibility, WeightedSearchEngine,
};

use crate::{Error, Result};

fn find_document<'d>(documents: &'d [Document], id: &str) -> Result<&'d Document> {
    documents
        .iter()
        .find(|doc| doc.id() == id)
        .ok_or_else(|| sporelens_core::Error::not_found("document", id).into())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(sporelens_core::Error::from)?;
    writeln!(out)?;
    Ok(())
}

// ============================================================================
// search
// ============================================================================

/// Options for [`cmd_search`].
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    /// Overrides `search.min_score`.
    pub min_score: Option<f64>,
    /// Dim instead of hide non-matching documents.
    pub show_dimmed: bool,
    /// Emit JSON.
    pub json: bool,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    summary: &'a CollectionSummary,
    results: Vec<&'a RankedResult>,
}

/// Rank a document collection against a query.
pub fn cmd_search<W: Write>(
    config: &SporelensConfig,
    docs: &Path,
    query: &str,
    args: &SearchArgs,
    out: &mut W,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(min_score) = args.min_score {
        config.search.min_score = min_score;
        config.validate()?;
    }

    let documents = load_documents(docs)?;
    let engine = WeightedSearchEngine::from_config(&config, Arc::new(config.build_taxonomy()?));

    let mut options = RankOptions::from(&config.search);
    if args.show_dimmed {
        options.hide_unmatched = false;
    }

    let ranking = PerspectiveAggregator::new(options).rank(query, engine.score_all(&documents, query));

    if args.json {
        let output = SearchOutput {
            summary: &ranking.summary,
            results: ranking
                .ordered
                .iter()
                .filter(|r| r.visibility != Visibility::Hidden)
                .collect(),
        };
        return write_json(out, &output);
    }

    for ranked in &ranking.ordered {
        let result = &ranked.result;
        match ranked.visibility {
            Visibility::Visible => {
                let perspectives: Vec<&str> =
                    result.matched_perspectives.iter().map(String::as_str).collect();
                if perspectives.is_empty() {
                    writeln!(out, "{:>8.2}  {}", result.score, result.doc_id)?;
                } else {
                    writeln!(
                        out,
                        "{:>8.2}  {}  [{}]",
                        result.score,
                        result.doc_id,
                        perspectives.join(", ")
                    )?;
                }
            }
            Visibility::Dimmed => writeln!(out, "{:>8}  {} (no match)", "-", result.doc_id)?,
            Visibility::Hidden => {}
        }
    }

    let summary = &ranking.summary;
    writeln!(out, "{} of {} visible", summary.visible_count, summary.total_count)?;
    if !summary.perspective_hit_counts.is_empty() {
        let hits: Vec<String> = summary
            .perspective_hit_counts
            .iter()
            .map(|(perspective, count)| format!("{perspective}={count}"))
            .collect();
        writeln!(out, "perspectives: {}", hits.join(", "))?;
    }
    Ok(())
}

// ============================================================================
// classify
// ============================================================================

/// Print presentation categories for a document or one of its fields.
///
/// An object is listed field by field in display order; any other value is
/// classified on its own.
pub fn cmd_classify<W: Write>(docs: &Path, id: &str, path: Option<&str>, out: &mut W) -> Result<()> {
    let documents = load_documents(docs)?;
    let document = find_document(&documents, id)?;

    let (name, target) = match path {
        Some(raw) => {
            let path = FieldPath::new(raw);
            let value = resolve_path(document.data(), &path)
                .ok_or_else(|| sporelens_core::Error::not_found("field", raw))?;
            (path.last_key().unwrap_or(raw).to_string(), value)
        }
        None => (String::new(), document.data()),
    };

    match target {
        Value::Object(map) => {
            for field in order_fields(map) {
                writeln!(
                    out,
                    "{:<28} {:<12} {:>5}",
                    field.name, field.classification.category, field.classification.priority
                )?;
            }
        }
        value => {
            let classification = classify_field(&name, value);
            writeln!(out, "{} {}", classification.category, classification.priority)?;
        }
    }
    Ok(())
}

// ============================================================================
// extract
// ============================================================================

/// Extract a field across perspectives and print the map as JSON.
pub fn cmd_extract<W: Write>(
    config: &SporelensConfig,
    docs: &Path,
    id: &str,
    path: Option<&str>,
    perspectives: &[String],
    deep: bool,
    out: &mut W,
) -> Result<()> {
    let documents = load_documents(docs)?;
    let document = find_document(&documents, id)?;
    let extractor = PerspectiveExtractor::new(Arc::new(config.build_taxonomy()?));
    let mode = if deep {
        ExtractMode::Deep
    } else {
        ExtractMode::Simple
    };

    let found = extractor.extract(document, path, perspectives, mode);
    write_json(out, &found)
}

// ============================================================================
// replay
// ============================================================================

/// Parse a JSON-lines event stream. Blank lines are skipped.
pub fn parse_events(content: &str) -> Result<Vec<InputEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| Error::Event {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Feed an event file through a spawned [`SearchService`], printing each
/// output event as one JSON line.
pub async fn cmd_replay<W: Write>(
    config: &SporelensConfig,
    docs: &Path,
    events: &Path,
    out: &mut W,
) -> Result<()> {
    let documents = load_documents(docs)?;
    let content = tokio::fs::read_to_string(events)
        .await
        .map_err(|e| sporelens_core::Error::io_with_path(e, events))?;
    let inputs = parse_events(&content)?;

    let handle = SearchService::from_config(config, documents)?.spawn(inputs.len().max(1));
    let mut published = handle.subscribe();

    for input in inputs {
        handle.send(input).await?;
        let event = published
            .recv()
            .await
            .map_err(|e| sporelens_core::Error::service(e.to_string()))?;
        serde_json::to_writer(&mut *out, &event).map_err(sporelens_core::Error::from)?;
        writeln!(out)?;
    }

    let service = handle.shutdown().await?;
    log::info!(
        "Replayed events over {} document(s), final cycle {}",
        service.documents().len(),
        service.ranking().cycle
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
