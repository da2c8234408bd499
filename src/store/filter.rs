use std::cmp::Ordering;

use crate::bookmarks::{Bookmark, Tag};

use super::selection::{SortBy, ViewSelection};

/// Derives the locally filtered and sorted list.
///
/// A bookmark is kept iff it is in the selected collection (unless that is
/// "all"), carries every selected tag, and matches the filter type. Selected
/// tag ids are resolved to names through `tags`; an id with no matching tag
/// imposes no constraint. The sort is stable, so equal keys keep the order of
/// `bookmarks`.
pub fn filter_bookmarks(
    bookmarks: &[Bookmark],
    selection: &ViewSelection,
    tags: &[Tag],
) -> Vec<Bookmark> {
    let required_tags = selection
        .tags
        .iter()
        .filter_map(|id| tags.iter().find(|t| &t.id == id))
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>();

    let mut filtered = bookmarks
        .iter()
        .filter(|b| selection.is_all_collection() || b.collection_id == selection.collection)
        .filter(|b| {
            required_tags
                .iter()
                .all(|name| b.tags.iter().any(|t| t == name))
        })
        .filter(|b| selection.filter_type.matches(b))
        .cloned()
        .collect::<Vec<_>>();

    // slice::sort_by is stable
    filtered.sort_by(|a, b| compare(selection.sort_by, a, b));

    filtered
}

fn compare(sort_by: SortBy, a: &Bookmark, b: &Bookmark) -> Ordering {
    match sort_by {
        SortBy::DateNewest => b.created_at.cmp(&a.created_at),
        SortBy::DateOldest => a.created_at.cmp(&b.created_at),
        SortBy::TitleAz => compare_titles(&a.title, &b.title),
        SortBy::TitleZa => compare_titles(&b.title, &a.title),
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
