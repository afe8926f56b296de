// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The storefront SDK, as far as the collection cache is concerned.
//!
//! Three async calls, all fallible. The store never retries; a failure is
//! logged and reported back to whoever asked.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{ConfigError, FetchError};
use crate::types::{Collection, Cursor, Product, ProductPage};

/// Async source of collection and product data.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Collection metadata (products may be empty).
    async fn fetch_collection(&self, handle: &str) -> Result<Collection, FetchError>;

    /// A page of members. `None` asks for the first page.
    async fn fetch_collection_page(
        &self,
        handle: &str,
        cursor: Option<Cursor>,
    ) -> Result<ProductPage, FetchError>;

    /// Resolve products by id. Unknown ids are left out.
    async fn fetch_products(&self, ids: &[String]) -> Result<Vec<Product>, FetchError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCatalog {
    collections: Vec<Collection>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    page_size: Option<usize>,
}

/// `DataSource` backed by a static JSON export.
///
/// Each collection's full member list is served in `page_size` chunks;
/// cursors are stringified offsets.
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    collections: HashMap<String, Collection>,
    products: HashMap<String, Product>,
    page_size: usize,
}

impl JsonDataSource {
    pub fn new(collections: Vec<Collection>, page_size: usize) -> Self {
        let mut products = HashMap::new();
        for product in collections.iter().flat_map(|c| c.products.iter()) {
            products
                .entry(product.id.clone())
                .or_insert_with(|| product.clone());
        }
        Self {
            collections: collections
                .into_iter()
                .map(|c| (c.handle.clone(), c))
                .collect(),
            products,
            page_size: page_size.max(1),
        }
    }

    /// Parse `{ "collections": [...], "products": [...], "pageSize": n }`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let catalog: JsonCatalog = serde_json::from_str(raw)?;
        let mut source = Self::new(
            catalog.collections,
            catalog.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        for product in catalog.products {
            source.products.insert(product.id.clone(), product);
        }
        Ok(source)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Every collection handle in the export, sorted.
    pub fn handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.collections.keys().cloned().collect();
        handles.sort();
        handles
    }

    fn collection(&self, handle: &str) -> Result<&Collection, FetchError> {
        self.collections
            .get(handle)
            .ok_or_else(|| FetchError::NotFound(handle.to_string()))
    }
}

#[async_trait]
impl DataSource for JsonDataSource {
    async fn fetch_collection(&self, handle: &str) -> Result<Collection, FetchError> {
        let mut collection = self.collection(handle)?.clone();
        collection.products.clear();
        collection.product_lists = None;
        Ok(collection)
    }

    async fn fetch_collection_page(
        &self,
        handle: &str,
        cursor: Option<Cursor>,
    ) -> Result<ProductPage, FetchError> {
        let all = &self.collection(handle)?.products;
        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| FetchError::Source(format!("bad cursor {c:?} for {handle}")))?,
        };
        let start = offset.min(all.len());
        let end = (start + self.page_size).min(all.len());
        Ok(ProductPage {
            products: all[start..end].to_vec(),
            next_cursor: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn fetch_products(&self, ids: &[String]) -> Result<Vec<Product>, FetchError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .collect())
    }
}
