//! load_collection_products: cursor pages, slug pages, guards.

use storefront::{AddCollections, Collection, LoadOutcome, ProductList};

use super::common::{
    empty_store, make_collection, make_product, product_ids, store_with, StubDataSource,
    OVERLAP_DELAY,
};

async fn store_with_hats() -> (storefront::CollectionStore, std::sync::Arc<StubDataSource>) {
    let (store, source) = empty_store();
    store.add_collections(AddCollections::handles(["hats"])).await;
    (store, source)
}

fn slug_collection(handle: &str, slugs: &[&str]) -> Collection {
    Collection::new(handle).with_product_lists(vec![ProductList::with_slugs(
        slugs.iter().map(|s| s.to_string()).collect(),
    )])
}

// ============================================================================
// CURSOR
// ============================================================================

#[tokio::test]
async fn test_next_page_is_appended_in_order() {
    let (store, source) = store_with_hats().await;
    assert_eq!(product_ids(&store.get_collection("hats").unwrap()), vec!["h1", "h2"]);

    let outcome = store.load_collection_products("hats").await.unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
    let hats = store.get_collection("hats").unwrap();
    assert_eq!(product_ids(&hats), vec!["h1", "h2", "h3"]);
    assert!(!hats.has_more_products());
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn test_exhausted_collection_does_not_fetch() {
    let (store, source) = store_with_hats().await;
    store.load_collection_products("hats").await.unwrap();

    let outcome = store.load_collection_products("hats").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Exhausted);
    assert_eq!(source.page_calls(), 2);
}

#[tokio::test]
async fn test_collection_without_lists_is_exhausted() {
    let (store, source) = store_with(StubDataSource::new(), vec![make_collection("shirts", &["p1"])]);
    assert_eq!(
        store.load_collection_products("shirts").await.unwrap(),
        LoadOutcome::Exhausted
    );
    assert_eq!(source.page_calls(), 0);
}

#[tokio::test]
async fn test_unknown_handle() {
    let (store, source) = empty_store();
    assert_eq!(
        store.load_collection_products("socks").await.unwrap(),
        LoadOutcome::Unknown
    );
    assert_eq!(source.page_calls(), 0);
}

#[tokio::test]
async fn test_failed_page_leaves_collection_untouched() {
    let (store, source) = store_with_hats().await;
    let before = store.get_collection("hats").unwrap();

    source.fail("hats");
    assert!(store.load_collection_products("hats").await.is_err());
    assert_eq!(store.get_collection("hats").unwrap(), before);

    // The in-flight guard was released; a retry goes through
    source.heal("hats");
    assert_eq!(
        store.load_collection_products("hats").await.unwrap(),
        LoadOutcome::Loaded { count: 1 }
    );
}

#[tokio::test]
async fn test_concurrent_loads_append_one_page() {
    let source = StubDataSource::new().with_delay(OVERLAP_DELAY);
    let (store, source) = store_with(source, Vec::new());
    store.add_collections(AddCollections::handles(["hats"])).await;
    let calls_before = source.page_calls();

    let (a, b) = tokio::join!(
        store.load_collection_products("hats"),
        store.load_collection_products("hats"),
    );
    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| matches!(o, LoadOutcome::InFlight));

    assert_eq!(outcomes, vec![LoadOutcome::Loaded { count: 1 }, LoadOutcome::InFlight]);
    assert_eq!(source.page_calls(), calls_before + 1);
    assert_eq!(product_ids(&store.get_collection("hats").unwrap()), vec!["h1", "h2", "h3"]);
}

#[tokio::test]
async fn test_different_handles_load_independently() {
    let source = StubDataSource::with_collections(
        vec![
            make_collection("hats", &["h1", "h2", "h3"]),
            make_collection("socks", &["s1", "s2", "s3"]),
        ],
        2,
    )
    .with_delay(OVERLAP_DELAY);
    let (store, _) = store_with(source, Vec::new());
    store.add_collections(AddCollections::handles(["hats", "socks"])).await;

    let (a, b) = tokio::join!(
        store.load_collection_products("hats"),
        store.load_collection_products("socks"),
    );
    assert_eq!(a.unwrap(), LoadOutcome::Loaded { count: 1 });
    assert_eq!(b.unwrap(), LoadOutcome::Loaded { count: 1 });
}

// ============================================================================
// SLUGS
// ============================================================================

#[tokio::test]
async fn test_slug_pages_resolve_ids_in_batches() {
    let (store, source) = store_with(
        StubDataSource::new(),
        vec![slug_collection("featured", &["h1", "h2", "h3", "p1"])],
    );

    assert_eq!(
        store.load_collection_products("featured").await.unwrap(),
        LoadOutcome::Loaded { count: 2 }
    );
    assert_eq!(
        store.load_collection_products("featured").await.unwrap(),
        LoadOutcome::Loaded { count: 2 }
    );
    assert_eq!(
        store.load_collection_products("featured").await.unwrap(),
        LoadOutcome::Exhausted
    );

    let featured = store.get_collection("featured").unwrap();
    assert_eq!(product_ids(&featured), vec!["h1", "h2", "h3", "p1"]);
    assert!(!featured.has_more_products());
    assert_eq!(source.product_calls(), 2);
}

#[tokio::test]
async fn test_slug_page_skips_loaded_products() {
    let featured = slug_collection("featured", &["h1", "h2"])
        .with_products(vec![make_product("h1", "Already here")]);
    let (store, source) = store_with(StubDataSource::new(), vec![featured]);

    let outcome = store.load_collection_products("featured").await.unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
    let featured = store.get_collection("featured").unwrap();
    assert_eq!(product_ids(&featured), vec!["h1", "h2"]);
    assert_eq!(featured.products[0].fields["title"], "Already here");
    assert_eq!(source.product_calls(), 1);
}

#[tokio::test]
async fn test_slug_page_failure_keeps_offset() {
    let (store, source) = store_with(
        StubDataSource::new(),
        vec![slug_collection("featured", &["h1", "h2"])],
    );
    source.fail("h2");
    assert!(store.load_collection_products("featured").await.is_err());

    let featured = store.get_collection("featured").unwrap();
    assert!(featured.products.is_empty());
    assert_eq!(featured.primary_list().unwrap().cursor, None);
}
