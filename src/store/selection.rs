use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::bookmarks::{Bookmark, ALL_COLLECTION_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    #[default]
    All,
    Favorites,
    WithTags,
    WithoutTags,
}

impl FilterType {
    pub fn matches(&self, bmark: &Bookmark) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Favorites => bmark.is_favorite,
            FilterType::WithTags => !bmark.tags.is_empty(),
            FilterType::WithoutTags => bmark.tags.is_empty(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::All => "all",
            FilterType::Favorites => "favorites",
            FilterType::WithTags => "with-tags",
            FilterType::WithoutTags => "without-tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    DateNewest,
    DateOldest,
    TitleAz,
    TitleZa,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::DateNewest => "date-newest",
            SortBy::DateOldest => "date-oldest",
            SortBy::TitleAz => "title-az",
            SortBy::TitleZa => "title-za",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

macro_rules! kebab_str_impls {
    ($ty:ty, $what:literal) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as clap::ValueEnum>::from_str(s.trim(), true)
                    .map_err(|_| anyhow::anyhow!("unknown {} {s:?}", $what))
            }
        }
    };
}

kebab_str_impls!(FilterType, "filter type");
kebab_str_impls!(SortBy, "sort key");

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

kebab_str_impls!(ViewMode, "view mode");

/// Everything the user picked that controls what gets rendered,
/// minus the semantic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSelection {
    pub collection: String,
    pub tags: BTreeSet<String>,
    pub filter_type: FilterType,
    pub sort_by: SortBy,
    pub view_mode: ViewMode,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            collection: ALL_COLLECTION_ID.to_string(),
            tags: BTreeSet::new(),
            filter_type: FilterType::default(),
            sort_by: SortBy::default(),
            view_mode: ViewMode::default(),
        }
    }
}

impl ViewSelection {
    pub fn is_all_collection(&self) -> bool {
        self.collection == ALL_COLLECTION_ID
    }

    /// Toggles membership of `id`; returns whether it is selected afterwards.
    pub fn toggle_tag(&mut self, id: &str) -> bool {
        if self.tags.remove(id) {
            false
        } else {
            self.tags.insert(id.to_string());
            true
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.tags.is_empty()
            || self.filter_type != FilterType::All
            || self.sort_by != SortBy::DateNewest
    }
}

/// Active semantic search: the query and its results, most relevant first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorSearch {
    pub query: String,
    pub results: Vec<Bookmark>,
}
