use async_trait::async_trait;

use crate::bookmarks::{
    Bookmark, BookmarkCreate, BookmarkUpdate, Collection, CollectionCreate, CollectionUpdate,
    Tag, TagCreate,
};

use super::errors::GatewayError;

/// Remote source of bookmarks, tags and collections.
///
/// Ids are the domain string ids. Implementations that talk to a numeric-id
/// backend reject ids they cannot convert with [`GatewayError::InvalidId`].
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, GatewayError>;

    async fn get_bookmark(&self, id: &str) -> Result<Bookmark, GatewayError>;

    /// Semantic search. Results are ordered by relevance, most relevant first.
    async fn search_bookmarks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Bookmark>, GatewayError>;

    async fn create_bookmark(&self, bmark_create: BookmarkCreate)
        -> Result<Bookmark, GatewayError>;

    async fn update_bookmark(
        &self,
        id: &str,
        bmark_update: BookmarkUpdate,
    ) -> Result<Bookmark, GatewayError>;

    async fn delete_bookmark(&self, id: &str) -> Result<bool, GatewayError>;

    async fn list_favorites(&self) -> Result<Vec<Bookmark>, GatewayError>;

    async fn add_favorite(&self, id: &str) -> Result<Bookmark, GatewayError>;

    async fn remove_favorite(&self, id: &str) -> Result<bool, GatewayError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError>;

    async fn create_tag(&self, tag_create: TagCreate) -> Result<Tag, GatewayError>;

    async fn delete_tag(&self, id: &str) -> Result<bool, GatewayError>;

    async fn list_collections(&self) -> Result<Vec<Collection>, GatewayError>;

    async fn get_collection(&self, id: &str) -> Result<Collection, GatewayError>;

    async fn create_collection(
        &self,
        collection_create: CollectionCreate,
    ) -> Result<Collection, GatewayError>;

    async fn update_collection(
        &self,
        id: &str,
        collection_update: CollectionUpdate,
    ) -> Result<Collection, GatewayError>;

    async fn delete_collection(&self, id: &str) -> Result<bool, GatewayError>;
}
