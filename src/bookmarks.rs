use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, hash::Hash, str::FromStr};

/// Id of the client-only "All Bookmarks" collection.
pub const ALL_COLLECTION_ID: &str = "all";

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,

    pub title: String,
    pub url: String,
    pub description: String,
    pub collection_id: String,
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
    pub is_favorite: bool,
    pub has_dark_icon: bool,
}

impl Hash for Bookmark {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub icon: CollectionIcon,
    pub color: String,
    pub count: u64,
}

impl Collection {
    /// The synthetic "no collection filter" entry. Never persisted remotely.
    pub fn all_bookmarks() -> Self {
        Self {
            id: ALL_COLLECTION_ID.to_string(),
            name: "All Bookmarks".to_string(),
            icon: CollectionIcon::Bookmark,
            color: "neutral".to_string(),
            count: 0,
        }
    }

    pub fn is_all(&self) -> bool {
        self.id == ALL_COLLECTION_ID
    }
}

/// Symbolic icon key of a collection. Unknown keys render as a plain folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CollectionIcon {
    Bookmark,
    Palette,
    Code,
    Wrench,
    BookOpen,
    Sparkles,
    #[default]
    Folder,
}

impl CollectionIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionIcon::Bookmark => "bookmark",
            CollectionIcon::Palette => "palette",
            CollectionIcon::Code => "code",
            CollectionIcon::Wrench => "wrench",
            CollectionIcon::BookOpen => "book-open",
            CollectionIcon::Sparkles => "sparkles",
            CollectionIcon::Folder => "folder",
        }
    }
}

impl From<&str> for CollectionIcon {
    fn from(key: &str) -> Self {
        match key {
            "bookmark" => CollectionIcon::Bookmark,
            "palette" => CollectionIcon::Palette,
            "code" => CollectionIcon::Code,
            "wrench" => CollectionIcon::Wrench,
            "book-open" => CollectionIcon::BookOpen,
            "sparkles" => CollectionIcon::Sparkles,
            _ => CollectionIcon::Folder,
        }
    }
}

impl From<String> for CollectionIcon {
    fn from(key: String) -> Self {
        CollectionIcon::from(key.as_str())
    }
}

impl From<CollectionIcon> for String {
    fn from(icon: CollectionIcon) -> Self {
        icon.as_str().to_string()
    }
}

impl FromStr for CollectionIcon {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CollectionIcon::from(s))
    }
}

impl Display for CollectionIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBookmark {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub collection_id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "deserialize_null_as_false")]
    pub has_dark_icon: bool,
}

impl From<ApiBookmark> for Bookmark {
    fn from(b: ApiBookmark) -> Self {
        Bookmark {
            id: b.id.to_string(),
            title: b.title,
            url: b.url,
            description: b.description,
            collection_id: b.collection_id.to_string(),
            tags: b.tags,
            created_at: b.created_at,
            is_favorite: b.is_favorite,
            has_dark_icon: b.has_dark_icon,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiTag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl From<ApiTag> for Tag {
    fn from(t: ApiTag) -> Self {
        Tag {
            id: t.id.to_string(),
            name: t.name,
            color: t.color,
            count: t.count,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiCollection {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub count: u64,
}

impl From<ApiCollection> for Collection {
    fn from(c: ApiCollection) -> Self {
        Collection {
            id: c.id.to_string(),
            icon: CollectionIcon::from(c.icon.as_str()),
            name: c.name,
            color: c.color,
            count: c.count,
        }
    }
}

/// The backend emits naive `isoformat()` timestamps; RFC 3339 with an offset
/// is accepted too and normalized to UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    NaiveDateTime::from_str(raw).map_err(|err| format!("invalid timestamp {raw:?}: {err}"))
}

fn deserialize_null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookmarkCreate {
    pub title: String,
    pub url: String,
    pub description: String,
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookmarkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CollectionCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_bookmark_conversion() {
        let raw = r#"{
            "id": 7,
            "title": "Rust",
            "url": "https://rust-lang.org",
            "description": "",
            "collectionId": 3,
            "tags": ["lang"],
            "createdAt": "2024-05-01T10:20:30.123456",
            "isFavorite": true,
            "hasDarkIcon": null
        }"#;

        let bmark: Bookmark = serde_json::from_str::<ApiBookmark>(raw).unwrap().into();
        assert_eq!(bmark.id, "7");
        assert_eq!(bmark.collection_id, "3");
        assert!(bmark.is_favorite);
        assert!(!bmark.has_dark_icon);
        assert_eq!(bmark.created_at.to_string(), "2024-05-01 10:20:30.123456");
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let ts = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01 10:00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_collection_icon_fallback() {
        assert_eq!(CollectionIcon::from("book-open"), CollectionIcon::BookOpen);
        assert_eq!(CollectionIcon::from("rocket"), CollectionIcon::Folder);
        assert_eq!(CollectionIcon::from(""), CollectionIcon::Folder);

        let c: Collection = ApiCollection {
            id: 2,
            name: "Design".to_string(),
            icon: "palette".to_string(),
            color: "pink".to_string(),
            count: 4,
        }
        .into();
        assert_eq!(c.icon, CollectionIcon::Palette);
        assert!(!c.is_all());
        assert!(Collection::all_bookmarks().is_all());
    }
}
