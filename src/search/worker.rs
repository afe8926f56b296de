// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Off-thread search execution.
//!
//! The worker is a plain OS thread that owns a private copy of the corpus.
//! It's seeded once, then receives queries as typed messages over a channel
//! and answers each on its own oneshot. Nothing is shared with the host
//! except the results slot, which the worker publishes into as replies land.
//!
//! Requests carry a monotonically increasing id. Two rules keep overlapping
//! queries sane:
//! - a queued query is skipped if a newer one has already been issued
//! - the results slot only ever moves forward, so a late reply for an old
//!   query can't clobber the answer to a newer one

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, warn};

use super::matcher::run_search;
use crate::error::SearchError;
use crate::types::{SearchDocument, SearchOptions};

type Reply = Result<Vec<SearchDocument>, SearchError>;

/// Messages understood by the worker thread.
pub(crate) enum WorkerMessage {
    Seed(Vec<SearchDocument>),
    Query {
        id: u64,
        query: String,
        options: SearchOptions,
        reply: oneshot::Sender<Reply>,
    },
}

/// The shared "latest results" value plus request id bookkeeping.
pub(crate) struct ResultsSlot {
    tx: watch::Sender<Vec<SearchDocument>>,
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl ResultsSlot {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            tx,
            issued: AtomicU64::new(0),
            applied: Mutex::new(0),
        }
    }

    /// Allocate the next request id.
    pub(crate) fn next_id(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Has a newer request been issued since `id`?
    pub(crate) fn is_superseded(&self, id: u64) -> bool {
        self.issued.load(Ordering::SeqCst) > id
    }

    /// Publish `results` for request `id` unless something newer already landed.
    pub(crate) fn publish(&self, id: u64, results: Vec<SearchDocument>) -> bool {
        let mut applied = self.applied.lock();
        if id <= *applied {
            debug!(id, applied = *applied, "discarding stale search results");
            return false;
        }
        *applied = id;
        self.tx.send_replace(results);
        true
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Vec<SearchDocument>> {
        self.tx.subscribe()
    }

    pub(crate) fn current(&self) -> Vec<SearchDocument> {
        self.tx.borrow().clone()
    }
}

/// A query handed to the worker whose answer hasn't been collected yet.
#[derive(Debug)]
pub struct PendingSearch {
    id: u64,
    rx: oneshot::Receiver<Reply>,
}

impl PendingSearch {
    /// Request id, for correlating with the `results` channel.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the worker's answer.
    pub async fn wait(self) -> Reply {
        self.rx.await.unwrap_or(Err(SearchError::Disconnected))
    }

    /// Block the current thread until the worker answers.
    ///
    /// Must not be called from inside an async context.
    pub fn wait_blocking(self) -> Reply {
        self.rx.blocking_recv().unwrap_or(Err(SearchError::Disconnected))
    }
}

/// Handle to a running worker thread. Dropping it shuts the worker down.
pub(crate) struct SearchWorker {
    sender: mpsc::Sender<WorkerMessage>,
}

impl SearchWorker {
    /// Spawn the thread and seed it with its own copy of the corpus.
    pub(crate) fn spawn(
        corpus: Vec<SearchDocument>,
        slot: std::sync::Arc<ResultsSlot>,
    ) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("storefront-search".to_string())
            .spawn(move || worker_loop(receiver, &slot))?;

        let docs = corpus.len();
        sender
            .send(WorkerMessage::Seed(corpus))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "search worker exited"))?;
        debug!(docs, "search worker spawned and seeded");
        Ok(Self { sender })
    }

    /// Post a query. The reply arrives on the returned `PendingSearch`.
    pub(crate) fn submit(
        &self,
        id: u64,
        query: String,
        options: SearchOptions,
    ) -> Result<PendingSearch, SearchError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(WorkerMessage::Query {
                id,
                query,
                options,
                reply,
            })
            .map_err(|_| SearchError::Disconnected)?;
        Ok(PendingSearch { id, rx })
    }
}

fn worker_loop(receiver: mpsc::Receiver<WorkerMessage>, slot: &ResultsSlot) {
    let mut corpus: Option<Vec<SearchDocument>> = None;

    while let Ok(message) = receiver.recv() {
        match message {
            WorkerMessage::Seed(docs) => {
                if corpus.is_some() {
                    warn!("search worker re-seeded; keeping the first corpus");
                    continue;
                }
                corpus = Some(docs);
            }
            WorkerMessage::Query {
                id,
                query,
                options,
                reply,
            } => {
                if slot.is_superseded(id) {
                    debug!(id, "skipping superseded query");
                    let _ = reply.send(Err(SearchError::Superseded));
                    continue;
                }
                let Some(docs) = corpus.as_deref() else {
                    error!(id, "search worker queried before it was seeded");
                    let _ = reply.send(Err(SearchError::Worker("corpus not seeded".to_string())));
                    continue;
                };

                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| run_search(docs, &query, &options)));
                match outcome {
                    Ok(results) => {
                        slot.publish(id, results.clone());
                        // Caller may have stopped waiting; the slot still has it
                        let _ = reply.send(Ok(results));
                    }
                    Err(_) => {
                        error!(id, query = %query, "search worker failed to match query");
                        let _ = reply.send(Err(SearchError::Worker("matcher panicked".to_string())));
                    }
                }
            }
        }
    }
    debug!("search worker shutting down");
}
