//! remove_collections and get_collections.

use super::common::{handles, hats, make_collection, shirts, store_with, StubDataSource};

fn three_collections() -> Vec<storefront::Collection> {
    vec![shirts(), hats(), make_collection("socks", &["s1"])]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_remove_exactly_the_named_handles() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    let removed = store.remove_collections(Some(&strings(&["hats"])));

    assert_eq!(removed, 1);
    assert_eq!(handles(&store.snapshot()), vec!["shirts", "socks"]);
}

#[test]
fn test_remove_unknown_handle_changes_nothing() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    assert_eq!(store.remove_collections(Some(&strings(&["jackets"]))), 0);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_remove_all() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    assert_eq!(store.remove_collections(None), 3);
    assert!(store.is_empty());
}

#[test]
fn test_get_in_requested_order() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    let found = store.get_collections(Some(&strings(&["socks", "shirts"])));
    assert_eq!(handles(&found), vec!["socks", "shirts"]);
}

#[test]
fn test_get_shirts_and_hats() {
    let (store, _) = store_with(StubDataSource::new(), vec![shirts(), hats()]);
    let found = store.get_collections(Some(&strings(&["shirts", "hats"])));
    assert_eq!(found.len(), 2);
    assert_eq!(handles(&found), vec!["shirts", "hats"]);
}

#[test]
fn test_get_skips_unknown_handles() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    let found = store.get_collections(Some(&strings(&["jackets", "hats"])));
    assert_eq!(handles(&found), vec!["hats"]);
}

#[test]
fn test_get_all_preserves_store_order() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    assert_eq!(handles(&store.get_collections(None)), vec!["shirts", "hats", "socks"]);
}

#[test]
fn test_get_single() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    assert_eq!(store.get_collection("hats"), Some(hats()));
    assert_eq!(store.get_collection("jackets"), None);
}

#[test]
fn test_results_are_snapshots() {
    let (store, _) = store_with(StubDataSource::new(), three_collections());
    let before = store.get_collections(None);
    store.remove_collections(None);
    assert_eq!(before.len(), 3, "earlier reads are unaffected");
}
