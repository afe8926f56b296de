// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the storefront command-line interface.
//!
//! Two subcommands, one per provider: `search` loads a corpus (from a local
//! JSON file or a live storefront origin) and runs one query against it, and
//! `collections` drives a `CollectionStore` over a JSON export so you can see
//! merging and pagination without a real backend.

pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "storefront",
    about = "Storefront search and collection cache tooling",
    version
)]
pub struct Cli {
    /// Optional storefront config (JSON); flags override its values
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fuzzy-search a catalog and print the ranked documents
    Search {
        /// Local corpus file: a document array or a `search.json` snapshot
        #[arg(long, conflicts_with = "origin", required_unless_present = "origin")]
        corpus: Option<String>,

        /// Storefront origin to fetch `/data/search.json` from
        #[arg(long)]
        origin: Option<String>,

        /// Search query
        #[arg(short, long)]
        query: String,

        /// Comma-separated document keys to match against
        #[arg(short, long, value_delimiter = ',')]
        keys: Option<Vec<String>>,

        /// Relevance threshold: 0.0 is exact only, 1.0 matches anything
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Maximum number of results to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Match on the calling thread instead of the background worker
        #[arg(long)]
        inline: bool,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Load collections from a JSON export and print them
    Collections {
        /// JSON export: `{ "collections": [...], "products": [...], "pageSize": n }`
        #[arg(short, long)]
        source: String,

        /// Handles to fetch (repeatable). Defaults to every collection in the export.
        #[arg(long = "handle")]
        handles: Vec<String>,

        /// Load every remaining page of each fetched collection
        #[arg(long)]
        load_more: bool,

        /// Print collections as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
