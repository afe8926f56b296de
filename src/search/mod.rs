// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search: where the rubber meets the road.
//!
//! The corpus gets built once (literal, supplier, or default snapshot), then
//! every query is fuzzy-matched against it, on a background worker when one
//! can be spawned and inline otherwise.

mod corpus;
mod engine;
mod matcher;
mod worker;

pub use corpus::{
    flatten_catalog, unwrap_envelope, BoxFuture, CorpusSource, CorpusState, CorpusSupplier,
    SupplierError,
};
pub use engine::{SearchEngine, SearchEngineBuilder, SearchOutcome};
pub use matcher::{rank, run_search, Hit};
pub use worker::PendingSearch;
