// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Construction-time configuration for both providers.
//!
//! Everything here is plain serde data so a storefront can ship it as JSON:
//!
//! ```json
//! {
//!   "search": {
//!     "defaultSearchOptions": { "relevanceThreshold": 0.4, "keys": ["title", "tags"] },
//!     "execution": "worker",
//!     "origin": "https://shop.example"
//!   },
//!   "collections": { "initial": [], "pageSize": 30 }
//! }
//! ```
//!
//! Async corpus suppliers can't be expressed in JSON; pass a
//! `CorpusSource::Supplier` to `SearchEngine::new` for that.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Collection, SearchDocument, SearchOptions};

/// Default number of product ids resolved per slug page.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Where matching runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Persistent background thread, falling back to inline if it can't spawn.
    #[default]
    Worker,
    /// Always match synchronously on the caller's thread.
    Inline,
}

/// Search provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// Eager corpus. Empty means "fetch the default snapshot on mount".
    pub corpus: Vec<SearchDocument>,
    pub default_search_options: SearchOptions,
    pub execution: ExecutionMode,
    /// Site origin the default snapshot is fetched from.
    pub origin: Option<String>,
}

/// Collection provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionSettings {
    pub initial: Vec<Collection>,
    pub page_size: usize,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            initial: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorefrontConfig {
    pub search: SearchSettings,
    pub collections: CollectionSettings,
}

impl StorefrontConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
