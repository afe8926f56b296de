//! Client-side state for a storefront: fuzzy catalog search and a
//! collection cache.
//!
//! Two providers, independent of each other. Each is a cheap cloneable
//! handle whose clones share state, with callable operations plus
//! `tokio::sync::watch` receivers a UI layer can subscribe to.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │  catalog.rs  │────▶│   search/    │────▶│    fuzzy/        │
//! │ (GET /data/  │     │ (corpus,     │     │ (approximate     │
//! │  search.json)│     │  worker,     │     │  substring score)│
//! └──────────────┘     │  engine)     │     └──────────────────┘
//!                      └──────────────┘
//! ┌──────────────┐     ┌──────────────┐
//! │ DataSource   │────▶│ collections/ │
//! │ (async trait)│     │ (merge,store)│
//! └──────────────┘     └──────────────┘
//! ```
//!
//! | Module        | Provides                                               |
//! |---------------|--------------------------------------------------------|
//! | `types`       | Product, Collection, ProductList, SearchOptions        |
//! | `search`      | `SearchEngine`, corpus lifecycle, background worker    |
//! | `collections` | `CollectionStore`, `DataSource`, merge policy          |
//! | `config`      | `StorefrontConfig` (serde JSON)                        |
//! | `error`       | `FetchError`, `SearchError`, `ConfigError`             |
//!
//! # Usage
//!
//! ```ignore
//! use storefront::{CorpusSource, SearchEngine, SearchSettings};
//!
//! let engine = SearchEngine::new(CorpusSource::Literal(docs), SearchSettings::default());
//! let response = engine.query("oxford", None).await?;
//! ```

pub mod catalog;
pub mod collections;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod search;
pub mod testing;
mod types;
mod utils;

pub use catalog::{catalog_url, CatalogFetcher, HttpCatalogFetcher, CATALOG_PATH};
pub use collections::{
    AddCollections, AddReport, CollectionStore, DataSource, JsonDataSource, LoadOutcome,
    MergeMethod,
};
pub use config::{
    CollectionSettings, ExecutionMode, SearchSettings, StorefrontConfig, DEFAULT_PAGE_SIZE,
};
pub use error::{ConfigError, FetchError, SearchError};
pub use search::{
    flatten_catalog, unwrap_envelope, CorpusSource, CorpusState, PendingSearch, SearchEngine,
    SearchEngineBuilder, SearchOutcome,
};
pub use types::{
    Collection, Cursor, Product, ProductList, ProductPage, SearchDocument, SearchOptions,
    SearchResponse, LOADING_MESSAGE,
};
pub use utils::{field_values, fold};
