// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Where the corpus comes from, and what state it's in.
//!
//! A corpus is built exactly once per engine. It can arrive three ways:
//! handed over as a literal list, produced by an async supplier, or fetched
//! from the storefront's `/data/search.json` snapshot once the engine is
//! mounted. The snapshot is a mapping of named sub-collections (`products`,
//! `articles`, ...) to document arrays, so both async paths flatten it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::types::SearchDocument;

/// A boxed, `Send`-able future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type a corpus supplier may reject with.
pub type SupplierError = Box<dyn std::error::Error + Send + Sync>;

/// Async function producing raw catalog data.
pub type CorpusSupplier =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Value, SupplierError>> + Send + Sync>;

/// How the engine obtains its corpus. Chosen once, at construction.
#[derive(Clone)]
pub enum CorpusSource {
    /// Documents supplied up front. An empty list behaves like `Default`.
    Literal(Vec<SearchDocument>),
    /// Resolved in the background right after construction.
    Supplier(CorpusSupplier),
    /// Fetched from `{origin}/data/search.json` once mounted.
    Default,
}

impl CorpusSource {
    /// Wrap an async closure as a `Supplier`.
    pub fn supplier<F, Fut>(supplier: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, SupplierError>> + Send + 'static,
    {
        let supplier: CorpusSupplier =
            Arc::new(move || -> BoxFuture<'static, _> { Box::pin(supplier()) });
        CorpusSource::Supplier(supplier)
    }

    /// Collapse an empty literal into `Default`.
    pub(crate) fn resolve(self) -> Self {
        match self {
            CorpusSource::Literal(docs) if docs.is_empty() => CorpusSource::Default,
            other => other,
        }
    }
}

impl Default for CorpusSource {
    fn default() -> Self {
        CorpusSource::Default
    }
}

impl fmt::Debug for CorpusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusSource::Literal(docs) => f.debug_tuple("Literal").field(&docs.len()).finish(),
            CorpusSource::Supplier(_) => f.write_str("Supplier(..)"),
            CorpusSource::Default => f.write_str("Default"),
        }
    }
}

/// Lifecycle of an engine's corpus. `Uninitialized → Ready`, never back.
#[derive(Debug, Clone, Default)]
pub enum CorpusState {
    #[default]
    Uninitialized,
    Ready(Arc<Vec<SearchDocument>>),
}

impl CorpusState {
    pub fn is_ready(&self) -> bool {
        matches!(self, CorpusState::Ready(_))
    }

    pub fn len(&self) -> usize {
        match self {
            CorpusState::Uninitialized => 0,
            CorpusState::Ready(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strip a `{"data": ...}` response envelope, if there is one.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Flatten raw catalog data into one ordered document list.
///
/// - object: every value, in key order, flattened one level
/// - array: every element, flattened one level
///
/// Anything that isn't a JSON object after flattening is not a document and
/// gets dropped with a warning. Returns `None` when the payload is neither
/// an object nor an array, which callers treat as malformed.
pub fn flatten_catalog(value: Value) -> Option<Vec<SearchDocument>> {
    let groups: Vec<Value> = match value {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        _ => return None,
    };

    let mut docs = Vec::new();
    let mut skipped = 0usize;
    for group in groups {
        match group {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Object(doc) => docs.push(doc),
                        _ => skipped += 1,
                    }
                }
            }
            Value::Object(doc) => docs.push(doc),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "dropped non-document entries from catalog");
    }
    Some(docs)
}
