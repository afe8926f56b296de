//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation. It holds
//! the canonical fixtures (a small apparel catalog) and in-memory stand-ins
//! for the two network seams, `CatalogFetcher` and `DataSource`.

#![doc(hidden)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::catalog::CatalogFetcher;
use crate::collections::{DataSource, JsonDataSource};
use crate::error::FetchError;
use crate::types::{Collection, Cursor, Product, ProductPage, SearchDocument};

// =============================================================================
// RECORDS
// =============================================================================

pub fn make_product(id: &str, title: &str) -> Product {
    Product::new(id).with_field("title", title)
}

/// Collection whose products are titled after their ids.
pub fn make_collection(handle: &str, product_ids: &[&str]) -> Collection {
    Collection::new(handle).with_products(
        product_ids
            .iter()
            .map(|id| make_product(id, &format!("Product {id}")))
            .collect(),
    )
}

/// Unwrap a JSON object literal into a search document.
///
/// Panics on anything but an object; fixtures are written by hand.
pub fn make_search_doc(value: Value) -> SearchDocument {
    match value {
        Value::Object(doc) => doc,
        other => panic!("search document must be an object, got {other}"),
    }
}

pub fn shirts() -> Collection {
    make_collection("shirts", &["p1"]).with_field("title", "Shirts")
}

pub fn hats() -> Collection {
    make_collection("hats", &["h1"]).with_field("title", "Hats")
}

// =============================================================================
// SEARCH CATALOG
// =============================================================================

fn product_docs() -> Vec<Value> {
    vec![
        json!({ "title": "Oxford Shirt", "vendor": "Acme", "tags": ["shirts", "cotton"], "price": 49 }),
        json!({ "title": "Linen Shirt", "vendor": "Northwind", "tags": ["shirts", "summer"], "price": 59 }),
        json!({ "title": "Sun Hat", "vendor": "Acme", "tags": ["hats", "summer"], "price": 25 }),
        json!({ "title": "Straw Hat", "vendor": "Northwind", "tags": ["hats"], "price": 30 }),
        json!({ "title": "Wool Beanie", "vendor": "Acme", "tags": ["hats", "winter"], "price": 18 }),
        json!({ "title": "Summer Dress", "vendor": "Contoso", "tags": ["dresses", "summer"], "price": 80 }),
    ]
}

fn article_docs() -> Vec<Value> {
    vec![json!({ "title": "Caring for Linen", "tags": ["guides"] })]
}

/// The catalog as a flat document list (products, then articles).
pub fn catalog_docs() -> Vec<SearchDocument> {
    product_docs()
        .into_iter()
        .chain(article_docs())
        .map(make_search_doc)
        .collect()
}

/// The catalog as `/data/search.json` publishes it.
pub fn catalog_payload() -> Value {
    json!({
        "articles": article_docs(),
        "products": product_docs(),
    })
}

// =============================================================================
// STUB CATALOG FETCHER
// =============================================================================

enum StubCatalog {
    Ok(Value),
    Status(u16),
}

/// `CatalogFetcher` answering from memory and counting calls.
pub struct StubCatalogFetcher {
    response: StubCatalog,
    calls: AtomicUsize,
}

impl StubCatalogFetcher {
    pub fn ok(payload: Value) -> Self {
        Self {
            response: StubCatalog::Ok(payload),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch fails with this HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            response: StubCatalog::Status(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogFetcher for StubCatalogFetcher {
    async fn fetch_catalog(&self, origin: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubCatalog::Ok(payload) => Ok(payload.clone()),
            StubCatalog::Status(status) => Err(FetchError::Status {
                status: *status,
                url: format!("{origin}{}", crate::catalog::CATALOG_PATH),
            }),
        }
    }
}

// =============================================================================
// STUB DATA SOURCE
// =============================================================================

/// `DataSource` over a `JsonDataSource`, with call counters, injectable
/// failures, and an optional delay so overlapping calls really overlap.
pub struct StubDataSource {
    inner: JsonDataSource,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    collection_calls: AtomicUsize,
    page_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

impl StubDataSource {
    /// Default catalog: `shirts` with one product, `hats` with three paged
    /// two at a time.
    pub fn new() -> Self {
        Self::with_collections(
            vec![shirts(), make_collection("hats", &["h1", "h2", "h3"]).with_field("title", "Hats")],
            2,
        )
    }

    pub fn with_collections(collections: Vec<Collection>, page_size: usize) -> Self {
        Self {
            inner: JsonDataSource::new(collections, page_size),
            failing: Mutex::new(HashSet::new()),
            delay: None,
            collection_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            product_calls: AtomicUsize::new(0),
        }
    }

    /// Make every call touching `handle` fail.
    pub fn failing(self, handle: &str) -> Self {
        self.fail(handle);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail(&self, handle: &str) {
        self.failing.lock().insert(handle.to_string());
    }

    pub fn heal(&self, handle: &str) {
        self.failing.lock().remove(handle);
    }

    pub fn collection_calls(&self) -> usize {
        self.collection_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self, handle: &str) -> Result<(), FetchError> {
        if self.failing.lock().contains(handle) {
            return Err(FetchError::Source(format!("injected failure for {handle}")));
        }
        Ok(())
    }
}

impl Default for StubDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for StubDataSource {
    async fn fetch_collection(&self, handle: &str) -> Result<Collection, FetchError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(handle)?;
        self.inner.fetch_collection(handle).await
    }

    async fn fetch_collection_page(
        &self,
        handle: &str,
        cursor: Option<Cursor>,
    ) -> Result<ProductPage, FetchError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(handle)?;
        self.inner.fetch_collection_page(handle, cursor).await
    }

    async fn fetch_products(&self, ids: &[String]) -> Result<Vec<Product>, FetchError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(id) = ids.iter().find(|id| self.failing.lock().contains(*id)) {
            return Err(FetchError::Source(format!("injected failure for {id}")));
        }
        self.inner.fetch_products(ids).await
    }
}
