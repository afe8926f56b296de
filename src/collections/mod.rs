// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Collections: a handle-keyed cache in front of the storefront SDK.
//!
//! - `source`: the async `DataSource` seam plus a JSON-backed implementation
//! - `merge`: conflict policy when a handle is added twice
//! - `store`: `CollectionStore`, the provider itself

mod merge;
mod source;
mod store;

pub use merge::{append_unique, apply, merge_into, MergeMethod};
pub use source::{DataSource, JsonDataSource};
pub use store::{AddCollections, AddReport, CollectionStore, LoadOutcome};
