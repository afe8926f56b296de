// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search provider.
//!
//! `SearchEngine` is a cheap, cloneable handle. Every clone shares one
//! corpus, one set of default options, one (lazily spawned) worker, and one
//! `results` channel, so any component holding a handle sees the same state.
//!
//! # Lifecycle
//!
//! ```text
//!   Literal(non-empty) ──────────────────────────────┐
//!   Supplier ──(spawned at build)──▶ resolve ────────┤
//!   Default  ──(mount)──▶ GET /data/search.json ─────┴──▶ Ready
//! ```
//!
//! Until `Ready`, `search` answers "Search Data is loading". A failed
//! supplier or fetch is logged and the engine simply stays loading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::corpus::{flatten_catalog, unwrap_envelope, CorpusSource, CorpusState, CorpusSupplier};
use super::matcher::run_search;
use super::worker::{PendingSearch, ResultsSlot, SearchWorker};
use crate::catalog::{CatalogFetcher, HttpCatalogFetcher};
use crate::config::{ExecutionMode, SearchSettings};
use crate::error::SearchError;
use crate::types::{SearchDocument, SearchOptions, SearchResponse, LOADING_MESSAGE};

/// What a `search` call produced.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Matched inline; results are final.
    Ready(Vec<SearchDocument>),
    /// Posted to the worker; await the pending handle (or watch `results`).
    Pending(PendingSearch),
    /// Corpus not built yet.
    Loading { message: String },
}

impl SearchOutcome {
    /// Resolve to a final response, waiting on the worker if needed.
    pub async fn resolve(self) -> Result<SearchResponse, SearchError> {
        match self {
            SearchOutcome::Ready(results) => Ok(SearchResponse::Results { results }),
            SearchOutcome::Pending(pending) => {
                let results = pending.wait().await?;
                Ok(SearchResponse::Results { results })
            }
            SearchOutcome::Loading { message } => Ok(SearchResponse::Loading { message }),
        }
    }

    /// Blocking counterpart of `resolve` for non-async callers.
    pub fn resolve_blocking(self) -> Result<SearchResponse, SearchError> {
        match self {
            SearchOutcome::Ready(results) => Ok(SearchResponse::Results { results }),
            SearchOutcome::Pending(pending) => {
                let results = pending.wait_blocking()?;
                Ok(SearchResponse::Results { results })
            }
            SearchOutcome::Loading { message } => Ok(SearchResponse::Loading { message }),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchOutcome::Loading { .. })
    }
}

struct EngineInner {
    corpus: RwLock<CorpusState>,
    options: RwLock<SearchOptions>,
    execution: ExecutionMode,
    fetch_on_mount: bool,
    origin: Option<String>,
    fetcher: Arc<dyn CatalogFetcher>,
    mounted: AtomicBool,
    worker: Mutex<Option<SearchWorker>>,
    worker_unavailable: AtomicBool,
    slot: Arc<ResultsSlot>,
    ready: watch::Sender<bool>,
}

impl EngineInner {
    /// `Uninitialized → Ready`. Later attempts are ignored.
    fn install(&self, docs: Vec<SearchDocument>) {
        let mut corpus = self.corpus.write();
        if corpus.is_ready() {
            warn!("search corpus already built; ignoring second population");
            return;
        }
        debug!(docs = docs.len(), "search corpus ready");
        *corpus = CorpusState::Ready(Arc::new(docs));
        drop(corpus);
        self.ready.send_replace(true);
    }
}

/// Builder for `SearchEngine`.
#[derive(Default)]
pub struct SearchEngineBuilder {
    source: CorpusSource,
    settings: SearchSettings,
    fetcher: Option<Arc<dyn CatalogFetcher>>,
}

impl SearchEngineBuilder {
    pub fn source(mut self, source: CorpusSource) -> Self {
        self.source = source;
        self
    }

    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn default_options(mut self, options: SearchOptions) -> Self {
        self.settings.default_search_options = options;
        self
    }

    pub fn execution(mut self, execution: ExecutionMode) -> Self {
        self.settings.execution = execution;
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.settings.origin = Some(origin.into());
        self
    }

    /// Override how the default catalog snapshot is fetched.
    pub fn catalog_fetcher(mut self, fetcher: Arc<dyn CatalogFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the engine. A `Supplier` source starts resolving immediately on
    /// the current Tokio runtime.
    pub fn build(self) -> SearchEngine {
        let SearchSettings {
            corpus: _,
            default_search_options,
            execution,
            origin,
        } = self.settings;
        let source = self.source.resolve();
        let (ready, _) = watch::channel(false);

        let inner = Arc::new(EngineInner {
            corpus: RwLock::new(CorpusState::Uninitialized),
            options: RwLock::new(default_search_options),
            execution,
            fetch_on_mount: matches!(source, CorpusSource::Default),
            origin,
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(HttpCatalogFetcher::new())),
            mounted: AtomicBool::new(false),
            worker: Mutex::new(None),
            worker_unavailable: AtomicBool::new(false),
            slot: Arc::new(ResultsSlot::new()),
            ready,
        });

        match source {
            CorpusSource::Literal(docs) => inner.install(docs),
            CorpusSource::Supplier(supplier) => spawn_supplier(&inner, supplier),
            CorpusSource::Default => {}
        }

        SearchEngine { inner }
    }
}

fn spawn_supplier(inner: &Arc<EngineInner>, supplier: CorpusSupplier) {
    let Ok(runtime) = Handle::try_current() else {
        error!("corpus supplier needs a Tokio runtime; search data will stay loading");
        return;
    };
    let inner = inner.clone();
    runtime.spawn(async move {
        match supplier().await {
            Ok(raw) => match flatten_catalog(unwrap_envelope(raw)) {
                Some(docs) => inner.install(docs),
                None => error!("corpus supplier returned a malformed payload"),
            },
            Err(err) => error!(error = %err, "corpus supplier failed"),
        }
    });
}

/// Fuzzy search provider. Clone freely; clones share state.
#[derive(Clone)]
pub struct SearchEngine {
    inner: Arc<EngineInner>,
}

impl SearchEngine {
    pub fn builder() -> SearchEngineBuilder {
        SearchEngineBuilder::default()
    }

    /// Engine over `source` configured by `settings`.
    pub fn new(source: CorpusSource, settings: SearchSettings) -> Self {
        Self::builder().source(source).settings(settings).build()
    }

    /// Engine whose source is the inline corpus in `settings` (or the
    /// default snapshot if that's empty).
    pub fn from_settings(settings: SearchSettings) -> Self {
        let source = CorpusSource::Literal(settings.corpus.clone());
        Self::new(source, settings)
    }

    /// Lifecycle hook: start the default catalog fetch.
    ///
    /// Only engines built with the `Default` source fetch, and only once per
    /// engine. Returns the background task the first time it's launched.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if !self.inner.fetch_on_mount {
            return None;
        }
        // A mount that cannot launch the fetch leaves the engine mountable.
        let Some(origin) = self.inner.origin.clone() else {
            error!("no origin configured; cannot fetch the search catalog");
            return None;
        };
        let Ok(runtime) = Handle::try_current() else {
            error!("catalog fetch needs a Tokio runtime; search data will stay loading");
            return None;
        };
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            debug!("search engine already mounted");
            return None;
        }

        let inner = self.inner.clone();
        Some(runtime.spawn(async move {
            match inner.fetcher.fetch_catalog(&origin).await {
                Ok(raw) => match flatten_catalog(raw) {
                    Some(docs) => inner.install(docs),
                    None => error!(origin = %origin, "search catalog payload is malformed"),
                },
                Err(err) => error!(origin = %origin, error = %err, "failed to fetch search catalog"),
            }
        }))
    }

    /// Search the corpus with `options`, or the stored defaults.
    pub fn search(&self, query: &str, options: Option<SearchOptions>) -> SearchOutcome {
        let corpus = match &*self.inner.corpus.read() {
            CorpusState::Uninitialized => None,
            CorpusState::Ready(docs) => Some(docs.clone()),
        };
        let Some(corpus) = corpus else {
            warn!("{}", LOADING_MESSAGE);
            return SearchOutcome::Loading {
                message: LOADING_MESSAGE.to_string(),
            };
        };

        let options = options.unwrap_or_else(|| self.inner.options.read().clone());
        let id = self.inner.slot.next_id();

        if self.inner.execution == ExecutionMode::Worker {
            if let Some(pending) = self.submit_to_worker(&corpus, id, query, &options) {
                return SearchOutcome::Pending(pending);
            }
        }

        let results = run_search(&corpus, query, &options);
        self.inner.slot.publish(id, results.clone());
        SearchOutcome::Ready(results)
    }

    /// `search`, resolved.
    ///
    /// A query overtaken by a newer one resolves to whatever the results
    /// channel holds at that point instead of `SearchError::Superseded`.
    /// Errors are left for a worker that failed or went away.
    pub async fn query(
        &self,
        query: &str,
        options: Option<SearchOptions>,
    ) -> Result<SearchResponse, SearchError> {
        match self.search(query, options).resolve().await {
            Err(SearchError::Superseded) => {
                debug!(query, "query superseded; answering with latest results");
                Ok(SearchResponse::Results {
                    results: self.inner.slot.current(),
                })
            }
            other => other,
        }
    }

    fn submit_to_worker(
        &self,
        corpus: &Arc<Vec<SearchDocument>>,
        id: u64,
        query: &str,
        options: &SearchOptions,
    ) -> Option<PendingSearch> {
        if self.inner.worker_unavailable.load(Ordering::SeqCst) {
            return None;
        }
        let mut worker = self.inner.worker.lock();
        if worker.is_none() {
            match SearchWorker::spawn(corpus.as_ref().clone(), self.inner.slot.clone()) {
                Ok(spawned) => *worker = Some(spawned),
                Err(err) => {
                    warn!(error = %err, "search worker unavailable; matching inline");
                    self.inner.worker_unavailable.store(true, Ordering::SeqCst);
                    return None;
                }
            }
        }

        let submitted = worker
            .as_ref()
            .map(|w| w.submit(id, query.to_string(), options.clone()));
        match submitted {
            Some(Ok(pending)) => Some(pending),
            _ => {
                warn!("search worker went away; respawning on next query");
                *worker = None;
                None
            }
        }
    }

    /// Overwrite the default options used when `search` gets none.
    pub fn set_search_options(&self, options: SearchOptions) {
        *self.inner.options.write() = options;
    }

    pub fn search_options(&self) -> SearchOptions {
        self.inner.options.read().clone()
    }

    /// Reactive view of the most recent results.
    pub fn results(&self) -> watch::Receiver<Vec<SearchDocument>> {
        self.inner.slot.subscribe()
    }

    pub fn current_results(&self) -> Vec<SearchDocument> {
        self.inner.slot.current()
    }

    pub fn state(&self) -> CorpusState {
        self.inner.corpus.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.corpus.read().is_ready()
    }

    pub fn execution(&self) -> ExecutionMode {
        self.inner.execution
    }

    /// Wait until the corpus is built. Never returns if it never is.
    pub async fn ready(&self) {
        let mut rx = self.inner.ready.subscribe();
        // Sender lives in `inner`, which we hold, so this can't error
        let _ = rx.wait_for(|ready| *ready).await;
    }
}
