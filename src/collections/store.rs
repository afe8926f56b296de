// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The collection provider.
//!
//! One ordered `Vec<Collection>` behind a write lock, republished on a watch
//! channel after every mutation so readers always see a whole snapshot.
//!
//! **Invariant**: no two entries share a `handle`, at any observable time.
//!
//! Network work never happens under the lock. Fetches run first, then the
//! results are applied in one short critical section that re-checks the
//! invariant. Two guards keep concurrent callers from doubling up:
//! - `fetching`: handles currently being fetched by `add_collections`
//! - `paginating`: handles with a page request in flight

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::merge::{append_unique, apply, MergeMethod};
use super::source::DataSource;
use crate::config::CollectionSettings;
use crate::error::FetchError;
use crate::types::{Collection, Cursor, ProductList};

/// Arguments to `add_collections`. Set `collections` or `handles`.
#[derive(Debug, Clone, Default)]
pub struct AddCollections {
    pub collections: Option<Vec<Collection>>,
    pub handles: Option<Vec<String>>,
    pub method: MergeMethod,
}

impl AddCollections {
    /// Add these collections directly.
    pub fn collections(collections: Vec<Collection>) -> Self {
        Self {
            collections: Some(collections),
            ..Self::default()
        }
    }

    /// Fetch and add these handles.
    pub fn handles<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handles: Some(handles.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: MergeMethod) -> Self {
        self.method = method;
        self
    }
}

/// Per-handle outcome of an `add_collections` call.
#[derive(Debug, Default)]
pub struct AddReport {
    /// New entries appended to the store.
    pub added: Vec<String>,
    /// Existing entries merged into.
    pub merged: Vec<String>,
    /// Existing entries overwritten.
    pub replaced: Vec<String>,
    /// Handles not fetched: already present or already being fetched.
    pub skipped: Vec<String>,
    /// Handles whose fetch failed.
    pub failed: Vec<(String, FetchError)>,
}

impl AddReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What `load_collection_products` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Appended `count` new products.
    Loaded { count: usize },
    /// No more pages.
    Exhausted,
    /// No collection with that handle.
    Unknown,
    /// Another call is already paging this handle.
    InFlight,
}

/// Where the next page comes from.
enum PagePlan {
    Cursor(Option<Cursor>),
    /// Slug lists always store the new offset, so `has_more` stays exact.
    Slugs { ids: Vec<String>, end: usize, total: usize },
}

enum Applied {
    Added,
    Merged,
    Replaced,
}

struct StoreInner {
    source: Arc<dyn DataSource>,
    collections: RwLock<Vec<Collection>>,
    tx: watch::Sender<Vec<Collection>>,
    fetching: Mutex<HashSet<String>>,
    paginating: Mutex<HashSet<String>>,
    page_size: usize,
}

/// Removes a handle from an in-flight set when dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    handle: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.handle);
    }
}

/// In-memory collection cache. Clone freely; clones share state.
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<StoreInner>,
}

impl CollectionStore {
    /// Store seeded with `settings.initial` (duplicates merged by handle).
    pub fn new(source: Arc<dyn DataSource>, settings: CollectionSettings) -> Self {
        let mut initial: Vec<Collection> = Vec::with_capacity(settings.initial.len());
        for collection in settings.initial {
            upsert(&mut initial, collection, MergeMethod::Merge);
        }
        let (tx, _rx) = watch::channel(initial.clone());

        Self {
            inner: Arc::new(StoreInner {
                source,
                collections: RwLock::new(initial),
                tx,
                fetching: Mutex::new(HashSet::new()),
                paginating: Mutex::new(HashSet::new()),
                page_size: settings.page_size.max(1),
            }),
        }
    }

    /// Apply `f` under the write lock, then publish the new snapshot.
    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<Collection>) -> R) -> R {
        let mut collections = self.inner.collections.write();
        let out = f(&mut collections);
        self.inner.tx.send_replace(collections.clone());
        out
    }

    // ====================================================================
    // Add
    // ====================================================================

    /// Add collections directly, or fetch them by handle.
    ///
    /// With `collections`, the call never suspends. With `handles`, each
    /// missing handle is fetched concurrently and independently; failures
    /// are reported per handle while the rest still land.
    pub async fn add_collections(&self, request: AddCollections) -> AddReport {
        let AddCollections {
            collections,
            handles,
            method,
        } = request;

        match (collections, handles) {
            (Some(collections), _) => self.insert_collections(collections, method),
            (None, Some(handles)) => self.fetch_and_insert(handles).await,
            (None, None) => AddReport::default(),
        }
    }

    /// Synchronous half of `add_collections`.
    pub fn insert_collections(&self, collections: Vec<Collection>, method: MergeMethod) -> AddReport {
        let mut report = AddReport::default();
        self.mutate(|store| {
            for collection in collections {
                let handle = collection.handle.clone();
                match upsert(store, collection, method) {
                    Applied::Added => report.added.push(handle),
                    Applied::Merged => report.merged.push(handle),
                    Applied::Replaced => report.replaced.push(handle),
                }
            }
        });
        report
    }

    async fn fetch_and_insert(&self, handles: Vec<String>) -> AddReport {
        let mut report = AddReport::default();

        // Each guard releases its handle even if this future is dropped
        // mid-fetch; dropping the JoinSet aborts the outstanding tasks.
        let mut to_fetch: Vec<InFlightGuard<'_>> = Vec::new();
        {
            let present = self.inner.collections.read();
            let mut fetching = self.inner.fetching.lock();
            for handle in handles {
                let known = present.iter().any(|c| c.handle == handle);
                if known || fetching.contains(&handle) {
                    debug!(handle = %handle, "collection already present or in flight");
                    report.skipped.push(handle);
                    continue;
                }
                fetching.insert(handle.clone());
                to_fetch.push(InFlightGuard {
                    set: &self.inner.fetching,
                    handle,
                });
            }
        }
        if to_fetch.is_empty() {
            return report;
        }

        let mut tasks = JoinSet::new();
        for (index, guard) in to_fetch.iter().enumerate() {
            let source = self.inner.source.clone();
            let handle = guard.handle.clone();
            tasks.spawn(async move { (index, fetch_with_first_page(source.as_ref(), &handle).await) });
        }

        let mut fetched: Vec<Option<Result<Collection, FetchError>>> =
            to_fetch.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => fetched[index] = Some(result),
                Err(err) => error!(error = %err, "collection fetch task failed"),
            }
        }

        for (guard, result) in to_fetch.into_iter().zip(fetched) {
            let handle = guard.handle.clone();
            match result {
                Some(Ok(mut collection)) => {
                    collection.handle = handle.clone();
                    match self.mutate(|store| upsert(store, collection, MergeMethod::Merge)) {
                        Applied::Added => report.added.push(handle.clone()),
                        _ => report.merged.push(handle.clone()),
                    }
                }
                Some(Err(err)) => {
                    error!(handle = %handle, error = %err, "failed to fetch collection");
                    report.failed.push((handle.clone(), err));
                }
                None => {
                    report.failed.push((
                        handle.clone(),
                        FetchError::Source("fetch task aborted".to_string()),
                    ));
                }
            }
            drop(guard);
        }
        report
    }

    // ====================================================================
    // Remove / read
    // ====================================================================

    /// Remove entries by handle, or everything when `handles` is `None`.
    /// Returns how many entries were removed.
    pub fn remove_collections(&self, handles: Option<&[String]>) -> usize {
        self.mutate(|store| {
            let before = store.len();
            match handles {
                Some(handles) => store.retain(|c| !handles.contains(&c.handle)),
                None => store.clear(),
            }
            before - store.len()
        })
    }

    /// Entries for `handles` in request order (unknowns skipped), or all
    /// entries in store order when `None`.
    pub fn get_collections(&self, handles: Option<&[String]>) -> Vec<Collection> {
        let store = self.inner.collections.read();
        match handles {
            Some(handles) => handles
                .iter()
                .filter_map(|h| store.iter().find(|c| &c.handle == h).cloned())
                .collect(),
            None => store.clone(),
        }
    }

    pub fn get_collection(&self, handle: &str) -> Option<Collection> {
        self.inner
            .collections
            .read()
            .iter()
            .find(|c| c.handle == handle)
            .cloned()
    }

    /// Reactive view of the whole store.
    pub fn collections(&self) -> watch::Receiver<Vec<Collection>> {
        self.inner.tx.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Collection> {
        self.inner.collections.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.collections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ====================================================================
    // Pagination
    // ====================================================================

    /// Fetch the next page of `handle`'s members and append them.
    ///
    /// Unknown or fully loaded collections resolve without fetching. A call
    /// that overlaps another for the same handle returns `InFlight` instead
    /// of fetching the same page twice. On fetch failure the collection is
    /// left untouched.
    pub async fn load_collection_products(&self, handle: &str) -> Result<LoadOutcome, FetchError> {
        if !self.inner.paginating.lock().insert(handle.to_string()) {
            debug!(handle, "page load already in flight");
            return Ok(LoadOutcome::InFlight);
        }
        let _guard = InFlightGuard {
            set: &self.inner.paginating,
            handle: handle.to_string(),
        };

        let plan = {
            let store = self.inner.collections.read();
            let Some(collection) = store.iter().find(|c| c.handle == handle) else {
                return Ok(LoadOutcome::Unknown);
            };
            match plan_next_page(collection, self.inner.page_size) {
                Some(plan) => plan,
                None => return Ok(LoadOutcome::Exhausted),
            }
        };

        let (products, cursor, has_next) = match plan {
            PagePlan::Cursor(cursor) => {
                let page = self
                    .inner
                    .source
                    .fetch_collection_page(handle, cursor)
                    .await
                    .inspect_err(|err| error!(handle, error = %err, "failed to load collection page"))?;
                let has_next = page.next_cursor.is_some();
                (page.products, page.next_cursor, has_next)
            }
            PagePlan::Slugs { ids, end, total } => {
                let products = if ids.is_empty() {
                    Vec::new()
                } else {
                    self.inner
                        .source
                        .fetch_products(&ids)
                        .await
                        .inspect_err(|err| error!(handle, error = %err, "failed to load collection products"))?
                };
                (products, Some(end.to_string()), end < total)
            }
        };

        Ok(self.mutate(|store| {
            let Some(collection) = store.iter_mut().find(|c| c.handle == handle) else {
                debug!(handle, "collection removed while its page was loading");
                return LoadOutcome::Unknown;
            };
            let count = append_unique(&mut collection.products, products);
            if let Some(list) = collection.primary_list_mut() {
                list.has_next_page = has_next;
                list.cursor = cursor;
            }
            LoadOutcome::Loaded { count }
        }))
    }
}

/// Insert or combine one collection, keeping handles unique.
fn upsert(store: &mut Vec<Collection>, collection: Collection, method: MergeMethod) -> Applied {
    match store.iter_mut().find(|c| c.handle == collection.handle) {
        Some(existing) => {
            apply(existing, collection, method);
            match method {
                MergeMethod::Merge => Applied::Merged,
                MergeMethod::Replace => Applied::Replaced,
            }
        }
        None => {
            store.push(collection);
            Applied::Added
        }
    }
}

/// Decide what to fetch next, or `None` if the collection is fully loaded.
fn plan_next_page(collection: &Collection, page_size: usize) -> Option<PagePlan> {
    let list = collection.primary_list()?;
    if !list.has_more() {
        return None;
    }
    if list.paginates_by_slug() {
        let offset = list.slug_offset();
        let end = (offset + page_size).min(list.slugs.len());
        let ids = list.slugs[offset..end]
            .iter()
            .filter(|id| !collection.contains_product(id))
            .cloned()
            .collect();
        return Some(PagePlan::Slugs {
            ids,
            end,
            total: list.slugs.len(),
        });
    }
    Some(PagePlan::Cursor(list.cursor.clone()))
}

/// Fetch a collection plus its first page of members.
async fn fetch_with_first_page(
    source: &dyn DataSource,
    handle: &str,
) -> Result<Collection, FetchError> {
    let mut collection = source.fetch_collection(handle).await?;
    let page = source.fetch_collection_page(handle, None).await?;
    append_unique(&mut collection.products, page.products);

    let by_slug = collection
        .primary_list()
        .is_some_and(ProductList::paginates_by_slug);
    if !by_slug {
        match collection.primary_list_mut() {
            Some(list) => {
                list.has_next_page = page.next_cursor.is_some();
                list.cursor = page.next_cursor;
            }
            None => collection.product_lists = Some(vec![ProductList::with_cursor(page.next_cursor)]),
        }
    }
    Ok(collection)
}
