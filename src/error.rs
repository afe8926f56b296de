// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types.
//!
//! A corpus that is still loading is not an error: it's reported as
//! `SearchResponse::Loading`. Everything here is a genuine failure that the
//! providers log at the boundary before handing it back.

use thiserror::Error;

/// Failure talking to the catalog endpoint or the collection data source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(String),

    #[error("collection not found: {0}")]
    NotFound(String),

    #[error("data source: {0}")]
    Source(String),
}

/// Failure of a single search round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The worker rejected or choked on the request.
    #[error("search worker: {0}")]
    Worker(String),

    /// A newer query was issued before this one ran.
    #[error("superseded by a newer query")]
    Superseded,

    /// The worker went away before replying.
    #[error("search worker disconnected")]
    Disconnected,
}

/// Failure loading a `StorefrontConfig` or a fixture file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
}
