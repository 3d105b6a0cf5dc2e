//! Event-driven search service.
//!
//! [`SearchService`] is the thin adapter between an input source and the
//! synchronous core. It is constructed once per session and owns:
//!
//! - the document collection (parsed once, shared read-only),
//! - the [`WeightedSearchEngine`], [`PerspectiveAggregator`] and
//!   [`PerspectiveExtractor`],
//! - the set of displayed fields and the active perspective set.
//!
//! Input arrives as [`InputEvent`]s, either by direct [`SearchService::handle`]
//! calls or over a `tokio::sync::mpsc` channel ([`SearchService::run`],
//! [`SearchService::spawn`]). Each event runs one cycle to completion.
//!
//! Output is published three ways:
//!
//! - the latest [`RankingSnapshot`] and field views on `watch` channels,
//!   replaced whole with `send_replace` so readers never see a mix of two
//!   cycles,
//! - [`OutputEvent`]s on a `broadcast` channel,
//! - registered observer callbacks.
//!
//! # Usage
//!
//! ```rust
//! use serde_json::json;
//! use sporelens_core::{Document, SporelensConfig};
//! use sporelens_fts::service::{InputEvent, OutputEvent, SearchService};
//!
//! let docs = vec![Document::new("a", json!({"commonName": "Fly Agaric"}))];
//! let mut service = SearchService::from_config(&SporelensConfig::default(), docs).unwrap();
//!
//! let event = service.handle(InputEvent::QueryChanged { query: "agaric".into() });
//! match event {
//!     OutputEvent::SearchCompleted(summary) => assert_eq!(summary.visible_count, 1),
//!     _ => unreachable!(),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sporelens_content::{ExtractMode, PerspectiveExtractor, PerspectiveValueMap};
use sporelens_core::{Document, Error, FieldPath, Result, SporelensConfig};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::aggregate::{PerspectiveAggregator, Ranking};
use crate::engine::WeightedSearchEngine;
use crate::types::{CollectionSummary, RankOptions};

/// Capacity of the output event channel.
const EVENT_CAPACITY: usize = 64;

// ============================================================================
// Events
// ============================================================================

/// Events consumed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A new (already debounced) query string.
    QueryChanged {
        /// Raw query text.
        query: String,
    },
    /// The active perspective selection changed.
    ActivePerspectivesChanged {
        /// Selected perspective names; empty means all.
        perspectives: Vec<String>,
    },
}

/// Events published by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutputEvent {
    /// A search cycle finished.
    SearchCompleted(CollectionSummary),
    /// Displayed fields were re-extracted for a new perspective set.
    ViewsRefreshed {
        /// Active perspectives as received.
        perspectives: Vec<String>,
        /// Number of field views published.
        field_count: usize,
    },
}

// ============================================================================
// Published state
// ============================================================================

/// The visibility annotation of one completed search cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshot {
    /// Monotonic cycle number; `0` is the initial unfiltered state.
    pub cycle: u64,
    /// The ranking produced by that cycle.
    pub ranking: Ranking,
}

/// A field shown in some document view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedField {
    /// Collection index of the document the field belongs to.
    pub doc_index: usize,
    /// Field path; `None` with [`ExtractMode::Deep`] shows whole perspectives.
    pub path: Option<FieldPath>,
    /// Extraction mode.
    #[serde(default)]
    pub mode: ExtractMode,
}

impl DisplayedField {
    /// A simple-mode field.
    pub fn new(doc_index: usize, path: impl Into<FieldPath>) -> Self {
        Self {
            doc_index,
            path: Some(path.into()),
            mode: ExtractMode::Simple,
        }
    }
}

/// Values extracted for one displayed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// Identifier of the document at `docIndex`.
    pub doc_id: String,
    /// The field being shown.
    #[serde(flatten)]
    pub field: DisplayedField,
    /// Values keyed by originating perspective.
    pub values: PerspectiveValueMap,
}

type Observer = Box<dyn Fn(&OutputEvent) + Send + Sync>;

// ============================================================================
// SearchService
// ============================================================================

/// Session-scoped search service.
pub struct SearchService {
    documents: Arc<[Document]>,
    engine: WeightedSearchEngine,
    aggregator: PerspectiveAggregator,
    extractor: PerspectiveExtractor,
    displayed: Vec<DisplayedField>,
    active: Vec<String>,
    cycle: u64,
    ranking_tx: watch::Sender<Arc<RankingSnapshot>>,
    views_tx: watch::Sender<Arc<Vec<FieldView>>>,
    events_tx: broadcast::Sender<OutputEvent>,
    observers: Vec<Observer>,
}

impl SearchService {
    /// Assemble a service from its parts.
    ///
    /// Every displayable field of every document is shown initially, and the
    /// initial snapshot is the unfiltered (empty query) ranking.
    pub fn new(
        documents: Vec<Document>,
        engine: WeightedSearchEngine,
        aggregator: PerspectiveAggregator,
        extractor: PerspectiveExtractor,
    ) -> Self {
        let documents: Arc<[Document]> = documents.into();
        let displayed = documents
            .iter()
            .enumerate()
            .flat_map(|(index, doc)| {
                extractor
                    .displayable_paths(doc)
                    .into_iter()
                    .map(move |path| DisplayedField::new(index, path))
            })
            .collect();

        let initial = aggregator.rank("", engine.score_all(&documents, ""));
        let (ranking_tx, _) = watch::channel(Arc::new(RankingSnapshot {
            cycle: 0,
            ranking: initial,
        }));
        let (views_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let mut service = Self {
            documents,
            engine,
            aggregator,
            extractor,
            displayed,
            active: Vec::new(),
            cycle: 0,
            ranking_tx,
            views_tx,
            events_tx,
            observers: Vec::new(),
        };
        service.refresh_views();
        service
    }

    /// Build a service from configuration.
    pub fn from_config(config: &SporelensConfig, documents: Vec<Document>) -> Result<Self> {
        config.validate()?;
        let taxonomy = Arc::new(config.build_taxonomy()?);
        Ok(Self::new(
            documents,
            WeightedSearchEngine::from_config(config, Arc::clone(&taxonomy)),
            PerspectiveAggregator::new(RankOptions::from(&config.search)),
            PerspectiveExtractor::new(taxonomy),
        ))
    }

    /// The document collection.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Collection index of the first document with the given identifier.
    pub fn position_of(&self, doc_id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id() == doc_id)
    }

    /// Currently active perspectives.
    pub fn active_perspectives(&self) -> &[String] {
        &self.active
    }

    /// Replace the displayed field set and re-extract.
    pub fn display(&mut self, fields: Vec<DisplayedField>) {
        self.displayed = fields;
        self.refresh_views();
    }

    /// Register a callback invoked for every output event.
    pub fn on_event<F>(&mut self, observer: F)
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Subscribe to output events.
    pub fn subscribe(&self) -> broadcast::Receiver<OutputEvent> {
        self.events_tx.subscribe()
    }

    /// Watch ranking snapshots.
    pub fn watch_ranking(&self) -> watch::Receiver<Arc<RankingSnapshot>> {
        self.ranking_tx.subscribe()
    }

    /// Watch field views.
    pub fn watch_views(&self) -> watch::Receiver<Arc<Vec<FieldView>>> {
        self.views_tx.subscribe()
    }

    /// The latest ranking snapshot.
    pub fn ranking(&self) -> Arc<RankingSnapshot> {
        Arc::clone(&self.ranking_tx.borrow())
    }

    /// The latest field views.
    pub fn views(&self) -> Arc<Vec<FieldView>> {
        Arc::clone(&self.views_tx.borrow())
    }

    /// Run one cycle for an input event and publish the result.
    pub fn handle(&mut self, event: InputEvent) -> OutputEvent {
        let output = match event {
            InputEvent::QueryChanged { query } => self.search(&query),
            InputEvent::ActivePerspectivesChanged { perspectives } => {
                self.active = perspectives;
                let field_count = self.refresh_views();
                OutputEvent::ViewsRefreshed {
                    perspectives: self.active.clone(),
                    field_count,
                }
            }
        };
        self.publish(&output);
        output
    }

    fn search(&mut self, query: &str) -> OutputEvent {
        let results = self.engine.score_all(&self.documents, query);
        let ranking = self.aggregator.rank(query, results);
        let summary = ranking.summary.clone();

        self.cycle += 1;
        self.ranking_tx.send_replace(Arc::new(RankingSnapshot {
            cycle: self.cycle,
            ranking,
        }));
        log::debug!(
            "Search cycle {} for {:?}: {}/{} visible",
            self.cycle,
            summary.query,
            summary.visible_count,
            summary.total_count
        );
        OutputEvent::SearchCompleted(summary)
    }

    fn refresh_views(&mut self) -> usize {
        let mut views = Vec::with_capacity(self.displayed.len());
        for field in &self.displayed {
            let Some(doc) = self.documents.get(field.doc_index) else {
                log::warn!(
                    "Displayed field refers to document #{} outside the collection",
                    field.doc_index
                );
                continue;
            };
            let values = self.extractor.extract(
                doc,
                field.path.as_ref().map(FieldPath::as_str),
                self.active.as_slice(),
                field.mode,
            );
            views.push(FieldView {
                doc_id: doc.id().to_string(),
                field: field.clone(),
                values,
            });
        }
        let count = views.len();
        self.views_tx.send_replace(Arc::new(views));
        count
    }

    fn publish(&self, event: &OutputEvent) {
        for observer in &self.observers {
            observer(event);
        }
        // No subscribers is not an error
        let _ = self.events_tx.send(event.clone());
    }

    /// Consume input events until the channel closes, then hand the service
    /// back.
    pub async fn run(mut self, mut input: mpsc::Receiver<InputEvent>) -> Self {
        log::info!(
            "Search service started over {} document(s)",
            self.documents.len()
        );
        while let Some(event) = input.recv().await {
            self.handle(event);
        }
        log::info!("Search service stopped after {} search cycle(s)", self.cycle);
        self
    }

    /// Move the service onto a tokio task and return a handle to it.
    pub fn spawn(self, capacity: usize) -> SearchHandle {
        let (input, rx) = mpsc::channel(capacity);
        let ranking = self.watch_ranking();
        let views = self.watch_views();
        let events = self.events_tx.clone();
        let task = tokio::spawn(self.run(rx));
        SearchHandle {
            input,
            ranking,
            views,
            events,
            task,
        }
    }
}

impl fmt::Debug for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchService")
            .field("documents", &self.documents.len())
            .field("displayed", &self.displayed.len())
            .field("active", &self.active)
            .field("cycle", &self.cycle)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ============================================================================
// SearchHandle
// ============================================================================

/// Handle to a spawned [`SearchService`].
#[derive(Debug)]
pub struct SearchHandle {
    input: mpsc::Sender<InputEvent>,
    ranking: watch::Receiver<Arc<RankingSnapshot>>,
    views: watch::Receiver<Arc<Vec<FieldView>>>,
    events: broadcast::Sender<OutputEvent>,
    task: JoinHandle<SearchService>,
}

impl SearchHandle {
    /// Queue an input event.
    pub async fn send(&self, event: InputEvent) -> Result<()> {
        self.input
            .send(event)
            .await
            .map_err(|_| Error::service("search service is not running"))
    }

    /// A sender for other producers.
    pub fn sender(&self) -> mpsc::Sender<InputEvent> {
        self.input.clone()
    }

    /// Subscribe to output events.
    pub fn subscribe(&self) -> broadcast::Receiver<OutputEvent> {
        self.events.subscribe()
    }

    /// Watch ranking snapshots.
    pub fn watch_ranking(&self) -> watch::Receiver<Arc<RankingSnapshot>> {
        self.ranking.clone()
    }

    /// Watch field views.
    pub fn watch_views(&self) -> watch::Receiver<Arc<Vec<FieldView>>> {
        self.views.clone()
    }

    /// Close the input channel and wait for the service to drain it.
    ///
    /// Other [`SearchHandle::sender`] clones keep the service alive until
    /// they are dropped too.
    pub async fn shutdown(self) -> Result<SearchService> {
        drop(self.input);
        self.task
            .await
            .map_err(|e| Error::service(format!("search task failed: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn documents() -> Vec<Document> {
        vec![
            Document::new(
                "fly-agaric",
                json!({
                    "commonName": "Fly Agaric",
                    "taxonomy": {"genus": "Amanita", "family": "Amanitaceae"},
                    "edibilityAndSafety": {"edibility": "poisonous"}
                }),
            ),
            Document::new(
                "turkey-tail",
                json!({
                    "commonName": "Turkey Tail",
                    "taxonomy": {"genus": "Trametes"},
                    "ecologyAndHabitat": {"substrate": ["dead wood", "soil"]}
                }),
            ),
            Document::new(
                "chanterelle",
                json!({
                    "commonName": "Golden Chanterelle",
                    "ecologyAndHabitat": {"habitat": "mossy wood"}
                }),
            ),
        ]
    }

    fn service() -> SearchService {
        SearchService::from_config(&SporelensConfig::default(), documents()).unwrap()
    }

    fn summary(event: OutputEvent) -> CollectionSummary {
        match event {
            OutputEvent::SearchCompleted(summary) => summary,
            other => panic!("expected SearchCompleted, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_snapshot_is_unfiltered() {
        let service = service();
        let snapshot = service.ranking();
        assert_eq!(snapshot.cycle, 0);
        assert_eq!(snapshot.ranking.summary.visible_count, 3);
        assert_eq!(snapshot.ranking.summary.total_count, 3);
    }

    #[test]
    fn test_query_changed_publishes_summary() {
        let mut service = service();
        let summary = summary(service.handle(InputEvent::QueryChanged {
            query: "wood".to_string(),
        }));
        assert_eq!(summary.query, "wood");
        assert_eq!(summary.visible_count, 2);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.matched_perspectives, vec!["ecologyAndHabitat"]);
        assert_eq!(summary.perspective_hit_counts.get("ecologyAndHabitat"), Some(&2));

        let snapshot = service.ranking();
        assert_eq!(snapshot.cycle, 1);
        assert!(snapshot.ranking.visible.contains(&1));
        assert!(!snapshot.ranking.visible.contains(&0));
    }

    #[test]
    fn test_no_match_query() {
        let mut service = service();
        let summary = summary(service.handle(InputEvent::QueryChanged {
            query: "xyz123notfound".to_string(),
        }));
        assert_eq!(summary.visible_count, 0);
        assert!(summary.matched_perspectives.is_empty());
    }

    #[test]
    fn test_short_query_shows_everything() {
        let mut service = service();
        service.handle(InputEvent::QueryChanged {
            query: "wood".to_string(),
        });
        let summary = summary(service.handle(InputEvent::QueryChanged {
            query: "w".to_string(),
        }));
        assert_eq!(summary.visible_count, 3);
    }

    #[test]
    fn test_latest_cycle_replaces_snapshot() {
        let mut service = service();
        let mut rx = service.watch_ranking();
        service.handle(InputEvent::QueryChanged {
            query: "agaric".to_string(),
        });
        service.handle(InputEvent::QueryChanged {
            query: "trametes".to_string(),
        });

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.cycle, 2);
        assert_eq!(snapshot.ranking.summary.query, "trametes");
        assert_eq!(
            snapshot.ranking.visible.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_initial_views_cover_displayable_fields() {
        let service = service();
        let views = service.views();
        assert!(views.iter().any(|v| {
            v.doc_id == "fly-agaric"
                && v.field.doc_index == 0
                && v.field.path.as_ref().map(FieldPath::as_str) == Some("taxonomy.genus")
                && v.values.get("taxonomy") == Some(&json!("Amanita"))
        }));
    }

    #[test]
    fn test_active_perspectives_changed_re_extracts() {
        let mut service = service();
        let turkey_tail = service.position_of("turkey-tail").unwrap();
        service.display(vec![DisplayedField::new(turkey_tail, "substrate")]);

        let event = service.handle(InputEvent::ActivePerspectivesChanged {
            perspectives: vec!["taxonomy".to_string()],
        });
        assert_eq!(
            event,
            OutputEvent::ViewsRefreshed {
                perspectives: vec!["taxonomy".to_string()],
                field_count: 1
            }
        );
        assert!(service.views()[0].values.is_empty());

        service.handle(InputEvent::ActivePerspectivesChanged {
            perspectives: vec!["ecologyAndHabitat".to_string()],
        });
        let views = service.views();
        assert_eq!(
            views[0].values.get("ecologyAndHabitat"),
            Some(&json!(["dead wood", "soil"]))
        );
        assert_eq!(service.active_perspectives(), ["ecologyAndHabitat"]);
    }

    #[test]
    fn test_unknown_displayed_document_is_skipped() {
        let mut service = service();
        service.display(vec![
            DisplayedField::new(9, "commonName"),
            DisplayedField::new(2, "commonName"),
        ]);
        let views = service.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].doc_id, "chanterelle");
        assert_eq!(views[0].values.get("root"), Some(&json!("Golden Chanterelle")));
    }

    #[test]
    fn test_documents_sharing_an_id_stay_distinct() {
        let docs = vec![
            Document::new("x", json!({"commonName": "Fly Agaric"})),
            Document::new("x", json!({"commonName": "Panther Agaric"})),
            Document::new("x", json!({"commonName": "Chanterelle"})),
        ];
        let mut service = SearchService::from_config(&SporelensConfig::default(), docs).unwrap();
        service.display(vec![
            DisplayedField::new(0, "commonName"),
            DisplayedField::new(2, "commonName"),
        ]);
        let views = service.views();
        assert_eq!(views[0].values.get("root"), Some(&json!("Fly Agaric")));
        assert_eq!(views[1].values.get("root"), Some(&json!("Chanterelle")));

        let summary = summary(service.handle(InputEvent::QueryChanged {
            query: "agaric".to_string(),
        }));
        assert_eq!(summary.visible_count, 2);
        let snapshot = service.ranking();
        assert_eq!(snapshot.ranking.visible.len(), 2);
        assert_eq!(snapshot.ranking.visibility_of(2), Some(crate::Visibility::Hidden));
    }

    #[test]
    fn test_positional_ids_do_not_merge_views() {
        let docs = sporelens_core::parse_documents(
            r#"[{"id": "1", "commonName": "Fly Agaric"}, {"commonName": "Chanterelle"}]"#,
        )
        .unwrap();
        let mut service = SearchService::from_config(&SporelensConfig::default(), docs).unwrap();
        service.display(vec![
            DisplayedField::new(0, "commonName"),
            DisplayedField::new(1, "commonName"),
        ]);
        let views = service.views();
        assert_eq!(views[1].doc_id, "#1");
        assert_eq!(views[1].values.get("root"), Some(&json!("Chanterelle")));
    }

    #[test]
    fn test_observers_are_called() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut service = service();
        let sink = Arc::clone(&seen);
        service.on_event(move |event| {
            if let OutputEvent::SearchCompleted(summary) = event {
                sink.lock().unwrap().push(summary.query.clone());
            }
        });

        service.handle(InputEvent::QueryChanged {
            query: "agaric".to_string(),
        });
        service.handle(InputEvent::QueryChanged {
            query: "tail".to_string(),
        });
        assert_eq!(*seen.lock().unwrap(), vec!["agaric", "tail"]);
    }

    #[test]
    fn test_input_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"query_changed","query":"wood"}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::QueryChanged {
                query: "wood".to_string()
            }
        );

        let event: InputEvent = serde_json::from_str(
            r#"{"type":"active_perspectives_changed","perspectives":["chemistry"]}"#,
        )
        .unwrap();
        assert!(matches!(event, InputEvent::ActivePerspectivesChanged { .. }));
    }

    #[test]
    fn test_output_event_json() {
        let mut service = service();
        let event = service.handle(InputEvent::QueryChanged {
            query: "wood".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "search_completed");
        assert_eq!(json["visibleCount"], 2);
        assert_eq!(json["perspectiveHitCounts"]["ecologyAndHabitat"], 2);

        let event = OutputEvent::ViewsRefreshed {
            perspectives: vec![],
            field_count: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["fieldCount"], 4);
    }

    #[tokio::test]
    async fn test_run_over_channel() {
        let service = service();
        let mut events = service.subscribe();
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(service.run(rx));

        tx.send(InputEvent::QueryChanged {
            query: "agaric".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        let event = events.recv().await.unwrap();
        assert_eq!(summary(event).visible_count, 1);

        let service = task.await.unwrap();
        assert_eq!(service.ranking().cycle, 1);
    }

    #[tokio::test]
    async fn test_spawned_handle() {
        let handle = service().spawn(8);
        let mut events = handle.subscribe();
        let mut ranking = handle.watch_ranking();

        handle
            .send(InputEvent::QueryChanged {
                query: "chanterelle".to_string(),
            })
            .await
            .unwrap();

        let summary = summary(events.recv().await.unwrap());
        assert_eq!(summary.visible_count, 1);

        ranking.changed().await.unwrap();
        assert!(ranking.borrow().ranking.visible.contains(&2));

        let service = handle.shutdown().await.unwrap();
        assert_eq!(service.documents().len(), 3);
    }

    fn _assert_send<T: Send>() {}
    #[test]
    fn test_service_is_send() {
        _assert_send::<SearchService>();
        _assert_send::<SearchHandle>();
    }
}
