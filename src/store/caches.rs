use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    bookmarks::{
        Collection, CollectionCreate, CollectionUpdate, Tag, TagCreate, ALL_COLLECTION_ID,
    },
    gateway::{Gateway, GatewayError},
};

use super::in_flight::InFlight;

#[derive(Debug)]
struct CacheState<T> {
    items: Vec<T>,
    in_flight: usize,
    latest: u64,
    error: Option<String>,
}

/// Replace-on-fetch list shared by the tag and collection caches.
#[derive(Debug)]
struct Cache<T> {
    state: RwLock<CacheState<T>>,
}

impl<T: Clone> Cache<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            state: RwLock::new(CacheState {
                items,
                in_flight: 0,
                latest: 0,
                error: None,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a fetch and returns its ticket. The fetch counts as loading
    /// until the returned guard is dropped.
    fn begin(&self) -> (u64, InFlight<'_, CacheState<T>>) {
        let mut state = self.write();
        state.in_flight += 1;
        state.latest += 1;
        state.error = None;
        let guard = InFlight::new(&self.state, |s: &mut CacheState<T>| s.in_flight -= 1);
        (state.latest, guard)
    }

    /// Applies a fetch result unless a newer fetch was issued after it.
    fn finish(&self, ticket: u64, result: Result<Vec<T>, String>, fallback: Vec<T>) {
        let mut state = self.write();
        if ticket != state.latest {
            log::debug!("dropping cache response #{ticket}, #{} is newer", state.latest);
            return;
        }
        match result {
            Ok(items) => state.items = items,
            Err(message) => {
                state.items = fallback;
                state.error = Some(message);
            }
        }
    }

    fn items(&self) -> Vec<T> {
        self.read().items.clone()
    }

    fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    fn set_error(&self, err: &GatewayError, fallback: &str) {
        log::warn!("{fallback}: {err:?}");
        self.write().error = Some(err.message_or(fallback));
    }
}

/// Last fetched tags, in server order. Falls back to an empty list when a
/// fetch fails.
pub struct TagCache {
    gateway: Arc<dyn Gateway>,
    cache: Cache<Tag>,
}

impl TagCache {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            cache: Cache::new(Vec::new()),
        }
    }

    pub async fn fetch(&self) {
        let (ticket, _in_flight) = self.cache.begin();
        let result = self.gateway.list_tags().await.map_err(|err| {
            log::warn!("failed to fetch tags: {err:?}");
            err.message_or("Failed to load tags")
        });
        self.cache.finish(ticket, result, Vec::new());
    }

    pub fn add_locally(&self, tag: Tag) {
        self.cache.write().items.push(tag);
    }

    pub fn remove_locally(&self, id: &str) {
        self.cache.write().items.retain(|t| t.id != id);
    }

    pub async fn create(&self, tag_create: TagCreate) -> Option<Tag> {
        match self.gateway.create_tag(tag_create).await {
            Ok(tag) => {
                self.add_locally(tag.clone());
                Some(tag)
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to create tag");
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.gateway.delete_tag(id).await {
            Ok(success) => {
                if success {
                    self.remove_locally(id);
                }
                success
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to delete tag");
                false
            }
        }
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.cache.items()
    }

    pub fn find(&self, id: &str) -> Option<Tag> {
        self.cache.read().items.iter().find(|t| t.id == id).cloned()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.cache.error()
    }
}

/// Last fetched collections, always led by the synthetic "All Bookmarks"
/// entry. Falls back to just that entry when a fetch fails.
pub struct CollectionCache {
    gateway: Arc<dyn Gateway>,
    cache: Cache<Collection>,
}

impl CollectionCache {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            cache: Cache::new(vec![Collection::all_bookmarks()]),
        }
    }

    pub async fn fetch(&self) {
        let (ticket, _in_flight) = self.cache.begin();
        let result = self
            .gateway
            .list_collections()
            .await
            .map(|collections| {
                std::iter::once(Collection::all_bookmarks())
                    .chain(collections.into_iter().filter(|c| !c.is_all()))
                    .collect::<Vec<_>>()
            })
            .map_err(|err| {
                log::warn!("failed to fetch collections: {err:?}");
                err.message_or("Failed to load collections")
            });
        self.cache
            .finish(ticket, result, vec![Collection::all_bookmarks()]);
    }

    /// Refreshes one collection from the backend, replacing or appending it.
    /// The synthetic "all" entry is answered locally.
    pub async fn load(&self, id: &str) -> Option<Collection> {
        if id == ALL_COLLECTION_ID {
            return Some(Collection::all_bookmarks());
        }

        match self.gateway.get_collection(id).await {
            Ok(collection) => {
                let mut state = self.cache.write();
                match state.items.iter_mut().find(|c| c.id == collection.id) {
                    Some(existing) => *existing = collection.clone(),
                    None => state.items.push(collection.clone()),
                }
                Some(collection)
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to load collection");
                None
            }
        }
    }

    pub fn add_locally(&self, collection: Collection) {
        if collection.is_all() {
            return;
        }
        self.cache.write().items.push(collection);
    }

    pub fn remove_locally(&self, id: &str) {
        self.cache
            .write()
            .items
            .retain(|c| c.is_all() || c.id != id);
    }

    pub async fn create(&self, collection_create: CollectionCreate) -> Option<Collection> {
        match self.gateway.create_collection(collection_create).await {
            Ok(collection) => {
                self.add_locally(collection.clone());
                Some(collection)
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to create collection");
                None
            }
        }
    }

    pub async fn update(
        &self,
        id: &str,
        collection_update: CollectionUpdate,
    ) -> Option<Collection> {
        match self.gateway.update_collection(id, collection_update).await {
            Ok(collection) => {
                let mut state = self.cache.write();
                if let Some(existing) = state.items.iter_mut().find(|c| c.id == collection.id) {
                    *existing = collection.clone();
                }
                Some(collection)
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to update collection");
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.gateway.delete_collection(id).await {
            Ok(success) => {
                if success {
                    self.remove_locally(id);
                }
                success
            }
            Err(err) => {
                self.cache.set_error(&err, "Failed to delete collection");
                false
            }
        }
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.cache.items()
    }

    pub fn find(&self, id: &str) -> Option<Collection> {
        self.cache.read().items.iter().find(|c| c.id == id).cloned()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.cache.error()
    }
}
