//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use storefront::{
    Collection, CollectionSettings, CollectionStore, CorpusSource, ExecutionMode, SearchDocument,
    SearchEngine, SearchOptions, SearchResponse,
};
use tempfile::NamedTempFile;

// Re-export canonical test utilities from storefront::testing
pub use storefront::testing::{
    catalog_docs, catalog_payload, hats, make_collection, make_product, make_search_doc, shirts,
    StubCatalogFetcher, StubDataSource,
};

/// How long stubs sleep when a test needs calls to overlap.
pub const OVERLAP_DELAY: Duration = Duration::from_millis(50);

// ============================================================================
// ENGINES
// ============================================================================

pub fn literal_engine(mode: ExecutionMode) -> SearchEngine {
    SearchEngine::builder()
        .source(CorpusSource::Literal(catalog_docs()))
        .execution(mode)
        .build()
}

/// Engine waiting on the default snapshot, served by `fetcher`.
pub fn default_engine(fetcher: Arc<StubCatalogFetcher>) -> SearchEngine {
    SearchEngine::builder()
        .origin("https://shop.test")
        .execution(ExecutionMode::Inline)
        .catalog_fetcher(fetcher)
        .build()
}

/// Run a query to completion and return the documents.
pub async fn results(
    engine: &SearchEngine,
    query: &str,
    options: Option<SearchOptions>,
) -> Vec<SearchDocument> {
    match engine.query(query, options).await.expect("search failed") {
        SearchResponse::Results { results } => results,
        SearchResponse::Loading { message } => panic!("engine still loading: {message}"),
    }
}

pub fn titles(docs: &[SearchDocument]) -> Vec<String> {
    docs.iter()
        .map(|d| d["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// STORES
// ============================================================================

pub fn store_with(
    source: StubDataSource,
    initial: Vec<Collection>,
) -> (CollectionStore, Arc<StubDataSource>) {
    let source = Arc::new(source);
    let store = CollectionStore::new(
        source.clone(),
        CollectionSettings {
            initial,
            page_size: 2,
        },
    );
    (store, source)
}

pub fn empty_store() -> (CollectionStore, Arc<StubDataSource>) {
    store_with(StubDataSource::new(), Vec::new())
}

pub fn handles(collections: &[Collection]) -> Vec<String> {
    collections.iter().map(|c| c.handle.clone()).collect()
}

pub fn product_ids(collection: &Collection) -> Vec<String> {
    collection.products.iter().map(|p| p.id.clone()).collect()
}

// ============================================================================
// FILES
// ============================================================================

/// Write `value` to a temp JSON file that lives as long as the handle.
pub fn json_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", value).expect("write temp file");
    file
}
