// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fetching the default search catalog snapshot.
//!
//! Storefront builds publish a JSON snapshot of everything searchable at
//! `/data/search.json`, relative to the site origin. The engine fetches it
//! once, in the background, when mounted.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Path of the catalog snapshot, relative to the origin.
pub const CATALOG_PATH: &str = "/data/search.json";

/// Anything that can produce the raw catalog snapshot for an origin.
#[async_trait]
pub trait CatalogFetcher: Send + Sync + 'static {
    async fn fetch_catalog(&self, origin: &str) -> Result<Value, FetchError>;
}

/// Resolve the snapshot URL for `origin`. Any path on the origin is ignored.
pub fn catalog_url(origin: &str) -> Result<Url, FetchError> {
    let base = Url::parse(origin).map_err(|e| FetchError::Url(format!("{origin}: {e}")))?;
    base.join(CATALOG_PATH)
        .map_err(|e| FetchError::Url(format!("{origin}: {e}")))
}

/// `CatalogFetcher` over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpCatalogFetcher {
    http: reqwest::Client,
}

impl HttpCatalogFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_catalog(&self, origin: &str) -> Result<Value, FetchError> {
        let url = catalog_url(origin)?;
        debug!(url = %url, "fetching search catalog");

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
