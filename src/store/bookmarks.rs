use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::{
    bookmarks::{Bookmark, BookmarkCreate, BookmarkUpdate, Tag},
    gateway::{Gateway, GatewayError},
};

use super::{
    filter::filter_bookmarks,
    in_flight::InFlight,
    selection::{FilterType, SortBy, VectorSearch, ViewMode, ViewSelection},
};

/// Cap on semantic search results; the backend never returns more.
pub const DEFAULT_SEARCH_LIMIT: usize = 15;

/// Where the rendered list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderSource {
    Local,
    Search { query: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub source: RenderSource,
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Default)]
struct BookmarkState {
    bookmarks: Vec<Bookmark>,
    selection: ViewSelection,
    vector_search: Option<VectorSearch>,
    error: Option<String>,

    fetches_in_flight: usize,
    searches_in_flight: usize,
    // tickets of the most recently issued requests
    latest_fetch: u64,
    latest_search: u64,
}

/// The bookmark view-state engine.
///
/// Owns the fetched bookmark list, the view selection and the active semantic
/// search. Async operations never return gateway failures; they store a
/// readable message in [`BookmarkStore::error`] and keep the previous data.
///
/// Overlapping fetches (and overlapping searches) are allowed. Only the
/// response of the most recently issued request is applied; older responses
/// are dropped whenever they arrive.
pub struct BookmarkStore {
    gateway: Arc<dyn Gateway>,
    state: RwLock<BookmarkState>,
    search_limit: usize,
}

impl BookmarkStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_options(gateway, DEFAULT_SEARCH_LIMIT, ViewSelection::default())
    }

    pub fn with_options(
        gateway: Arc<dyn Gateway>,
        search_limit: usize,
        selection: ViewSelection,
    ) -> Self {
        Self {
            gateway,
            state: RwLock::new(BookmarkState {
                selection,
                ..Default::default()
            }),
            search_limit,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BookmarkState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BookmarkState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_error(&self, err: &GatewayError, fallback: &str) {
        let message = err.message_or(fallback);
        log::warn!("{fallback}: {err:?}");
        self.write().error = Some(message);
    }

    pub async fn fetch_bookmarks(&self) {
        let (ticket, _in_flight) = {
            let mut state = self.write();
            state.fetches_in_flight += 1;
            state.latest_fetch += 1;
            let guard = InFlight::new(&self.state, |s: &mut BookmarkState| {
                s.fetches_in_flight -= 1
            });
            (state.latest_fetch, guard)
        };

        let result = self.gateway.list_bookmarks().await;

        let mut state = self.write();
        if ticket != state.latest_fetch {
            log::debug!(
                "dropping bookmarks response #{ticket}, #{} is newer",
                state.latest_fetch
            );
            return;
        }

        match result {
            Ok(bookmarks) => {
                log::debug!("fetched {} bookmarks", bookmarks.len());
                state.bookmarks = bookmarks;
                state.error = None;
            }
            Err(err) => {
                log::warn!("failed to fetch bookmarks: {err:?}");
                state.error = Some(err.message_or("Failed to load bookmarks"));
            }
        }
    }

    /// Runs a semantic search and makes its result the display override.
    ///
    /// A blank query stores an empty result without touching the gateway.
    /// On failure the previous search result is left as it was.
    pub async fn search_bookmarks(&self, query: &str) {
        let query = query.trim().to_string();

        let (ticket, _in_flight) = {
            let mut state = self.write();
            state.latest_search += 1;

            if query.is_empty() {
                state.vector_search = Some(VectorSearch {
                    query,
                    results: Vec::new(),
                });
                return;
            }

            state.searches_in_flight += 1;
            let guard = InFlight::new(&self.state, |s: &mut BookmarkState| {
                s.searches_in_flight -= 1
            });
            (state.latest_search, guard)
        };

        let result = self
            .gateway
            .search_bookmarks(&query, self.search_limit)
            .await;

        let mut state = self.write();

        if ticket != state.latest_search {
            log::debug!("dropping search response #{ticket} for {query:?}");
            return;
        }

        match result {
            Ok(results) => {
                log::debug!("search {query:?} returned {} bookmarks", results.len());
                state.vector_search = Some(VectorSearch { query, results });
            }
            Err(err) => {
                log::warn!("search {query:?} failed: {err:?}");
                state.error = Some(err.message_or("Failed to search bookmarks"));
            }
        }
    }

    #[allow(dead_code)]
    pub fn clear_vector_search(&self) {
        let mut state = self.write();
        // an in-flight search must not resurrect the cleared result
        state.latest_search += 1;
        state.vector_search = None;
    }

    pub fn set_selected_collection(&self, id: &str) {
        self.write().selection.collection = id.to_string();
    }

    pub fn toggle_tag(&self, id: &str) {
        self.write().selection.toggle_tag(id);
    }

    pub fn clear_tags(&self) {
        self.write().selection.tags.clear();
    }

    pub fn set_filter_type(&self, filter_type: FilterType) {
        self.write().selection.filter_type = filter_type;
    }

    pub fn set_sort_by(&self, sort_by: SortBy) {
        self.write().selection.sort_by = sort_by;
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) {
        self.write().selection.view_mode = view_mode;
    }

    /// Clears selected tags and the filter type. Sort order and collection stay.
    #[allow(dead_code)]
    pub fn clear_filters(&self) {
        let mut state = self.write();
        state.selection.tags.clear();
        state.selection.filter_type = FilterType::All;
    }

    #[allow(dead_code)]
    pub fn dismiss_error(&self) {
        self.write().error = None;
    }

    #[allow(dead_code)]
    pub fn filtered_bookmarks(&self, tags: &[Tag]) -> Vec<Bookmark> {
        let state = self.read();
        filter_bookmarks(&state.bookmarks, &state.selection, tags)
    }

    /// The list to display: the semantic search result if it has any
    /// bookmarks, the locally filtered list otherwise. Local filters are never
    /// applied to search results.
    pub fn rendered(&self, tags: &[Tag]) -> Rendered {
        let state = self.read();

        match &state.vector_search {
            Some(search) if !search.results.is_empty() => Rendered {
                source: RenderSource::Search {
                    query: search.query.clone(),
                },
                bookmarks: search.results.clone(),
            },
            _ => Rendered {
                source: RenderSource::Local,
                bookmarks: filter_bookmarks(&state.bookmarks, &state.selection, tags),
            },
        }
    }

    #[allow(dead_code)]
    pub fn is_showing_vector_search(&self) -> bool {
        self.read()
            .vector_search
            .as_ref()
            .is_some_and(|s| !s.results.is_empty())
    }

    pub fn has_active_filters(&self) -> bool {
        self.read().selection.has_active_filters()
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.read().bookmarks.clone()
    }

    pub fn selection(&self) -> ViewSelection {
        self.read().selection.clone()
    }

    #[allow(dead_code)]
    pub fn vector_search(&self) -> Option<VectorSearch> {
        self.read().vector_search.clone()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.read().fetches_in_flight > 0
    }

    #[allow(dead_code)]
    pub fn is_searching(&self) -> bool {
        self.read().searches_in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Asks the backend for its favorites. The local list is left alone.
    pub async fn fetch_favorites(&self) -> Option<Vec<Bookmark>> {
        match self.gateway.list_favorites().await {
            Ok(favorites) => Some(favorites),
            Err(err) => {
                self.set_error(&err, "Failed to load favorites");
                None
            }
        }
    }

    pub async fn create_bookmark(&self, bmark_create: BookmarkCreate) -> Option<Bookmark> {
        match self.gateway.create_bookmark(bmark_create).await {
            Ok(bmark) => {
                log::info!("created bookmark {}", bmark.id);
                self.fetch_bookmarks().await;
                Some(bmark)
            }
            Err(err) => {
                self.set_error(&err, "Failed to create bookmark");
                None
            }
        }
    }

    pub async fn update_bookmark(&self, id: &str, bmark_update: BookmarkUpdate) -> Option<Bookmark> {
        match self.gateway.update_bookmark(id, bmark_update).await {
            Ok(bmark) => {
                self.fetch_bookmarks().await;
                Some(bmark)
            }
            Err(err) => {
                self.set_error(&err, "Failed to update bookmark");
                None
            }
        }
    }

    pub async fn delete_bookmark(&self, id: &str) -> bool {
        match self.gateway.delete_bookmark(id).await {
            Ok(true) => {
                log::info!("deleted bookmark {id}");
                self.fetch_bookmarks().await;
                true
            }
            Ok(false) => false,
            Err(err) => {
                self.set_error(&err, "Failed to delete bookmark");
                false
            }
        }
    }

    pub async fn set_favorite(&self, id: &str, favorite: bool) -> bool {
        let result = if favorite {
            self.gateway.add_favorite(id).await.map(|_| true)
        } else {
            self.gateway.remove_favorite(id).await
        };

        match result {
            Ok(true) => {
                self.fetch_bookmarks().await;
                true
            }
            Ok(false) => false,
            Err(err) => {
                self.set_error(&err, "Failed to update favorite");
                false
            }
        }
    }
}
