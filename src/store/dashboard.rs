use std::sync::Arc;

use crate::{
    bookmarks::{Bookmark, BookmarkCreate},
    config::Config,
    gateway::Gateway,
};

use super::{
    bookmarks::{BookmarkStore, Rendered, DEFAULT_SEARCH_LIMIT},
    caches::{CollectionCache, TagCache},
    detail::BookmarkDetail,
    selection::{SortBy, ViewMode, ViewSelection},
};

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub search_limit: usize,
    pub default_sort: SortBy,
    pub default_view_mode: ViewMode,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            default_sort: SortBy::default(),
            default_view_mode: ViewMode::default(),
        }
    }
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            search_limit: config.search_limit,
            default_sort: config.default_sort,
            default_view_mode: config.default_view_mode,
        }
    }
}

/// One dashboard session: the bookmark engine plus the tag and collection
/// caches, all talking to the same gateway.
pub struct Dashboard {
    bookmarks: BookmarkStore,
    tags: TagCache,
    collections: CollectionCache,
    detail: BookmarkDetail,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn Gateway>, options: DashboardOptions) -> Self {
        let selection = ViewSelection {
            sort_by: options.default_sort,
            view_mode: options.default_view_mode,
            ..Default::default()
        };

        Self {
            bookmarks: BookmarkStore::with_options(
                gateway.clone(),
                options.search_limit,
                selection,
            ),
            tags: TagCache::new(gateway.clone()),
            collections: CollectionCache::new(gateway.clone()),
            detail: BookmarkDetail::new(gateway),
        }
    }

    /// Initial load of all three lists, concurrently.
    pub async fn mount(&self) {
        tokio::join!(
            self.bookmarks.fetch_bookmarks(),
            self.tags.fetch(),
            self.collections.fetch(),
        );
        log::debug!(
            "dashboard mounted: {} bookmarks, {} tags, {} collections",
            self.bookmarks.bookmarks().len(),
            self.tags.tags().len(),
            self.collections.collections().len()
        );
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn tags(&self) -> &TagCache {
        &self.tags
    }

    pub fn collections(&self) -> &CollectionCache {
        &self.collections
    }

    pub fn detail(&self) -> &BookmarkDetail {
        &self.detail
    }

    /// What to display right now, resolved against the current tag cache.
    pub fn rendered(&self) -> Rendered {
        self.bookmarks.rendered(&self.tags.tags())
    }

    /// Switches collection from the navigation; tag selection is reset.
    pub fn select_collection(&self, id: &str) {
        self.bookmarks.set_selected_collection(id);
        self.bookmarks.clear_tags();
    }

    /// Refetches the tag and collection lists, whose counts a bookmark
    /// mutation changes.
    pub async fn refresh_counts(&self) {
        tokio::join!(self.tags.fetch(), self.collections.fetch());
    }

    pub async fn create_bookmark(&self, bmark_create: BookmarkCreate) -> Option<Bookmark> {
        let created = self.bookmarks.create_bookmark(bmark_create).await;
        if created.is_some() {
            self.refresh_counts().await;
        }
        created
    }

    pub async fn delete_bookmark(&self, id: &str) -> bool {
        let deleted = self.bookmarks.delete_bookmark(id).await;
        if deleted {
            self.refresh_counts().await;
        }
        deleted
    }

    pub fn dispose(self) {
        log::debug!("dashboard disposed");
    }
}
