// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The shapes that flow between the data source, the providers, and the UI.
//!
//! Catalog records are deliberately loose: the storefront SDK owns their
//! schema, so everything beyond an identity key rides along in a flattened
//! `serde_json` map. The only fields this crate interprets are:
//!
//! | Type          | Interpreted fields                         |
//! |---------------|--------------------------------------------|
//! | `Product`     | `id` (identity for de-duplication)         |
//! | `Collection`  | `handle`, `products`, `productLists`       |
//! | `ProductList` | `cursor`, `hasNextPage`, `slugs`           |
//!
//! # Invariants
//!
//! - **Collection**: `handle` is unique within a `CollectionStore`.
//! - **Collection.products**: no two products share an `id` after a merge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A searchable record. No fixed schema; match keys come from `SearchOptions`.
pub type SearchDocument = Map<String, Value>;

/// Opaque resume token handed out by the data source.
pub type Cursor = String;

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// A product as returned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identity key. Two products with the same id are the same product.
    pub id: String,
    /// Everything else the data source sent (title, price, images, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Pagination metadata for a collection's member list.
///
/// Two ways to page: by opaque `cursor` (the common case), or by a known
/// list of product ids in `slugs` that get resolved a page at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    #[serde(default = "default_list_handle")]
    pub handle: String,
    #[serde(default)]
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slugs: Vec<String>,
}

fn default_list_handle() -> String {
    "default".to_string()
}

impl ProductList {
    /// Cursor-paginated list positioned at `cursor`.
    pub fn with_cursor(cursor: Option<Cursor>) -> Self {
        Self {
            handle: default_list_handle(),
            has_next_page: cursor.is_some(),
            cursor,
            slugs: Vec::new(),
        }
    }

    /// Id-paginated list over `slugs`.
    pub fn with_slugs(slugs: Vec<String>) -> Self {
        Self {
            handle: default_list_handle(),
            cursor: None,
            has_next_page: !slugs.is_empty(),
            slugs,
        }
    }

    pub fn paginates_by_slug(&self) -> bool {
        !self.slugs.is_empty()
    }

    /// Slug lists use the cursor as an offset into `slugs`.
    pub fn slug_offset(&self) -> usize {
        self.cursor
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
    }

    /// Whether another page can be fetched.
    ///
    /// Slug lists answer from their own offset, so a hand-written
    /// `{ "slugs": [...] }` without `hasNextPage` still pages.
    pub fn has_more(&self) -> bool {
        if self.paginates_by_slug() {
            self.slug_offset() < self.slugs.len()
        } else {
            self.has_next_page
        }
    }
}

/// A named grouping of products with optional paginated membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub handle: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub product_lists: Option<Vec<ProductList>>,
    /// Descriptive fields (title, description, image, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Collection {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            products: Vec::new(),
            product_lists: None,
            fields: Map::new(),
        }
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_product_lists(mut self, lists: Vec<ProductList>) -> Self {
        self.product_lists = Some(lists);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The list that drives pagination (the first one).
    pub fn primary_list(&self) -> Option<&ProductList> {
        self.product_lists.as_ref().and_then(|lists| lists.first())
    }

    pub fn primary_list_mut(&mut self) -> Option<&mut ProductList> {
        self.product_lists.as_mut().and_then(|lists| lists.first_mut())
    }

    /// Does the pagination metadata say more members can be fetched?
    pub fn has_more_products(&self) -> bool {
        self.primary_list().is_some_and(ProductList::has_more)
    }

    pub fn contains_product(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }
}

/// One page of collection members from the data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Fuzzy matching parameters.
///
/// `relevance_threshold` follows the fuzzy scorer's convention: 0.0 accepts
/// only perfect matches, 1.0 accepts anything. Values are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub relevance_threshold: f64,
    pub keys: Vec<String>,
    /// Keep at most this many ranked results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Fold "café" and "cafe" together before scoring.
    #[serde(default)]
    pub ignore_diacritics: bool,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.5,
            keys: vec!["title".to_string()],
            limit: None,
            ignore_diacritics: false,
            case_sensitive: false,
        }
    }
}

impl SearchOptions {
    pub fn new<I, S>(relevance_threshold: f64, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relevance_threshold,
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Message returned while the corpus has not been built yet.
pub const LOADING_MESSAGE: &str = "Search Data is loading";

/// Fully resolved answer to a search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Results { results: Vec<SearchDocument> },
    Loading { message: String },
}

impl SearchResponse {
    pub fn loading() -> Self {
        SearchResponse::Loading {
            message: LOADING_MESSAGE.to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchResponse::Loading { .. })
    }

    /// The matched documents, or an empty slice while loading.
    pub fn results(&self) -> &[SearchDocument] {
        match self {
            SearchResponse::Results { results } => results,
            SearchResponse::Loading { .. } => &[],
        }
    }
}
