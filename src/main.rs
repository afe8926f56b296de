use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};

use storefront::{
    flatten_catalog, unwrap_envelope, AddCollections, CollectionStore, CorpusSource,
    ExecutionMode, HttpCatalogFetcher, JsonDataSource, LoadOutcome, SearchEngine, SearchResponse,
    StorefrontConfig,
};

/// Upper bound on the catalog request, connect through body.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

mod cli;
use cli::{display, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StorefrontConfig::load(path)
            .with_context(|| format!("failed to load config {path}"))?,
        None => StorefrontConfig::default(),
    };

    match cli.command {
        Commands::Search {
            corpus,
            origin,
            query,
            keys,
            threshold,
            limit,
            inline,
            json,
        } => {
            let args = SearchArgs {
                corpus,
                origin,
                keys,
                threshold,
                limit,
                inline,
            };
            run_search(config, args, &query, json).await
        }
        Commands::Collections {
            source,
            handles,
            load_more,
            json,
        } => run_collections(config, &source, handles, load_more, json).await,
    }
}

struct SearchArgs {
    corpus: Option<String>,
    origin: Option<String>,
    keys: Option<Vec<String>>,
    threshold: Option<f64>,
    limit: Option<usize>,
    inline: bool,
}

/// Read a corpus file: a document array, a keyed snapshot, or either
/// wrapped in `{ "data": ... }`.
fn read_corpus(path: &str) -> Result<CorpusSource> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("{path} is not JSON"))?;
    let Some(docs) = flatten_catalog(unwrap_envelope(value)) else {
        bail!("{path} is neither a document array nor a catalog snapshot");
    };
    if docs.is_empty() {
        bail!("{path} contains no documents");
    }
    info!(docs = docs.len(), path, "loaded search corpus");
    Ok(CorpusSource::Literal(docs))
}

async fn run_search(
    config: StorefrontConfig,
    args: SearchArgs,
    query: &str,
    json: bool,
) -> Result<()> {
    let mut settings = config.search;
    if let Some(keys) = args.keys {
        settings.default_search_options.keys = keys;
    }
    if let Some(threshold) = args.threshold {
        settings.default_search_options.relevance_threshold = threshold;
    }
    if let Some(limit) = args.limit {
        settings.default_search_options.limit = Some(limit);
    }
    if args.inline {
        settings.execution = ExecutionMode::Inline;
    }
    if let Some(origin) = args.origin {
        settings.origin = Some(origin);
    }

    let source = match &args.corpus {
        Some(path) => read_corpus(path)?,
        None => CorpusSource::Default,
    };
    let http = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let engine = SearchEngine::builder()
        .source(source)
        .settings(settings)
        .catalog_fetcher(Arc::new(HttpCatalogFetcher::with_client(http)))
        .build();

    if let Some(task) = engine.mount() {
        task.await.context("catalog fetch task panicked")?;
    }
    if !engine.is_ready() {
        bail!("search catalog could not be loaded (see log for details)");
    }

    let response = engine.query(query, None).await?;
    let results = match response {
        SearchResponse::Results { results } => results,
        SearchResponse::Loading { message } => bail!(message),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        display::print_results(query, &results);
    }
    Ok(())
}

async fn run_collections(
    config: StorefrontConfig,
    source_path: &str,
    handles: Vec<String>,
    load_more: bool,
    json: bool,
) -> Result<()> {
    let source = JsonDataSource::load(source_path)
        .with_context(|| format!("failed to load collections from {source_path}"))?;
    let handles = if handles.is_empty() {
        source.handles()
    } else {
        handles
    };

    let store = CollectionStore::new(Arc::new(source), config.collections);
    let report = store.add_collections(AddCollections::handles(handles.clone())).await;
    for (handle, err) in &report.failed {
        warn!(handle = %handle, error = %err, "skipping collection");
    }

    if load_more {
        for handle in &handles {
            loop {
                let outcome = store.load_collection_products(handle).await?;
                if !json {
                    eprintln!("{} {}", handle, display::outcome_label(outcome));
                }
                if !matches!(outcome, LoadOutcome::Loaded { .. }) {
                    break;
                }
            }
        }
    }

    let collections = store.get_collections(Some(&handles));
    if json {
        println!("{}", serde_json::to_string_pretty(&collections)?);
    } else {
        for collection in &collections {
            display::print_collection(collection);
        }
    }

    if report.is_complete_success() {
        Ok(())
    } else {
        bail!("{} collection(s) failed to load", report.failed.len())
    }
}
