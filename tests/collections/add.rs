//! add_collections: direct inserts, merge vs replace, fetch by handle.

use std::time::Duration;

use serde_json::json;
use storefront::{AddCollections, Collection, FetchError, MergeMethod};

use super::common::{
    empty_store, handles, hats, make_collection, product_ids, shirts, store_with, StubDataSource,
    OVERLAP_DELAY,
};

// ============================================================================
// DIRECT
// ============================================================================

#[tokio::test]
async fn test_new_handle_grows_store_by_one() {
    let (store, _) = store_with(StubDataSource::new(), vec![shirts()]);
    let report = store.add_collections(AddCollections::collections(vec![hats()])).await;

    assert_eq!(store.len(), 2);
    assert_eq!(report.added, vec!["hats"]);
    assert_eq!(handles(&store.snapshot()), vec!["shirts", "hats"]);
}

#[tokio::test]
async fn test_merge_adds_only_new_product_ids() {
    let (store, _) = store_with(StubDataSource::new(), vec![shirts()]);
    let incoming = make_collection("shirts", &["p1", "p2"]);

    let report = store.add_collections(AddCollections::collections(vec![incoming])).await;

    assert_eq!(report.merged, vec!["shirts"]);
    assert_eq!(store.len(), 1);
    let merged = store.get_collection("shirts").unwrap();
    assert_eq!(product_ids(&merged), vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_replace_overwrites_entry_exactly() {
    let (store, _) = store_with(StubDataSource::new(), vec![shirts(), hats()]);
    let incoming = make_collection("shirts", &["p9"]).with_field("title", "New Shirts");

    let report = store
        .add_collections(
            AddCollections::collections(vec![incoming.clone()]).method(MergeMethod::Replace),
        )
        .await;

    assert_eq!(report.replaced, vec!["shirts"]);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get_collection("shirts").unwrap(), incoming);
    // Position is kept
    assert_eq!(handles(&store.snapshot()), vec!["shirts", "hats"]);
}

#[tokio::test]
async fn test_duplicates_within_one_call_collapse() {
    let (store, _) = empty_store();
    store
        .add_collections(AddCollections::collections(vec![
            make_collection("shirts", &["p1"]),
            make_collection("shirts", &["p2"]),
        ]))
        .await;

    assert_eq!(store.len(), 1);
    assert_eq!(product_ids(&store.get_collection("shirts").unwrap()), vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_empty_request_is_a_no_op() {
    let (store, source) = store_with(StubDataSource::new(), vec![shirts()]);
    let report = store.add_collections(AddCollections::default()).await;

    assert!(report.added.is_empty() && report.failed.is_empty());
    assert_eq!(store.len(), 1);
    assert_eq!(source.collection_calls(), 0);
}

// ============================================================================
// BY HANDLE
// ============================================================================

#[tokio::test]
async fn test_fetch_shirts_into_empty_store() {
    let (store, source) = empty_store();
    let report = store.add_collections(AddCollections::handles(["shirts"])).await;

    assert!(report.is_complete_success());
    assert_eq!(store.len(), 1);
    let shirts = store.get_collection("shirts").unwrap();
    assert_eq!(shirts.products.len(), 1);
    assert_eq!(shirts.fields["title"], json!("Shirts"));
    assert_eq!(source.collection_calls(), 1);
    assert_eq!(source.page_calls(), 1);
}

#[tokio::test]
async fn test_known_handles_are_not_refetched() {
    let (store, source) = store_with(StubDataSource::new(), vec![shirts()]);
    let report = store.add_collections(AddCollections::handles(["shirts", "hats"])).await;

    assert_eq!(report.skipped, vec!["shirts"]);
    assert_eq!(report.added, vec!["hats"]);
    assert_eq!(source.collection_calls(), 1);
}

#[tokio::test]
async fn test_partial_failure_keeps_the_rest() {
    let source = StubDataSource::new().failing("hats");
    let (store, _) = store_with(source, Vec::new());

    let report = store.add_collections(AddCollections::handles(["hats", "shirts"])).await;

    assert_eq!(report.added, vec!["shirts"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "hats");
    assert!(matches!(report.failed[0].1, FetchError::Source(_)));
    assert!(!report.is_complete_success());
    assert_eq!(handles(&store.snapshot()), vec!["shirts"]);
}

#[tokio::test]
async fn test_unknown_handle_is_reported_not_found() {
    let (store, _) = empty_store();
    let report = store.add_collections(AddCollections::handles(["socks"])).await;

    assert!(store.is_empty());
    assert!(matches!(&report.failed[0].1, FetchError::NotFound(h) if h == "socks"));
}

#[tokio::test]
async fn test_fetched_collection_records_next_page() {
    let (store, _) = empty_store();
    store.add_collections(AddCollections::handles(["hats"])).await;

    let hats = store.get_collection("hats").unwrap();
    assert_eq!(product_ids(&hats), vec!["h1", "h2"]);
    assert!(hats.has_more_products());
}

#[tokio::test]
async fn test_concurrent_adds_fetch_once() {
    let source = StubDataSource::new().with_delay(OVERLAP_DELAY);
    let (store, source) = store_with(source, Vec::new());

    let (a, b) = tokio::join!(
        store.add_collections(AddCollections::handles(["shirts"])),
        store.add_collections(AddCollections::handles(["shirts"])),
    );

    assert_eq!(a.added.len() + b.added.len(), 1);
    assert_eq!(a.skipped.len() + b.skipped.len(), 1);
    assert_eq!(source.collection_calls(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_cancelled_add_releases_its_handles() {
    let source = StubDataSource::new().with_delay(OVERLAP_DELAY);
    let (store, _) = store_with(source, Vec::new());

    let cancelled = tokio::time::timeout(
        Duration::from_millis(5),
        store.add_collections(AddCollections::handles(["shirts", "hats"])),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(store.is_empty());

    let report = store.add_collections(AddCollections::handles(["shirts", "hats"])).await;
    assert_eq!(report.added, vec!["shirts", "hats"]);
    assert!(report.skipped.is_empty());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_subscribers_see_every_add() {
    let (store, _) = empty_store();
    let mut rx = store.collections();

    store.add_collections(AddCollections::collections(vec![shirts()])).await;
    assert!(rx.has_changed().unwrap());
    let seen: Vec<Collection> = rx.borrow_and_update().clone();
    assert_eq!(handles(&seen), vec!["shirts"]);

    store.remove_collections(None);
    assert!(rx.borrow_and_update().is_empty());
}
