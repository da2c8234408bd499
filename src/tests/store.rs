use std::sync::Arc;
use std::time::Duration;

use crate::bookmarks::{Bookmark, BookmarkCreate};
use crate::store::bookmarks::BookmarkStore;
use crate::store::{FilterType, RenderSource, SortBy, ViewMode};

use super::mock::{bmark, tag, MockCall, MockGateway};

fn ids(bookmarks: &[Bookmark]) -> Vec<&str> {
    bookmarks.iter().map(|b| b.id.as_str()).collect()
}

fn two_bookmarks() -> Vec<Bookmark> {
    vec![
        bmark("1", "B", "10", &[], false, 100),
        bmark("2", "A", "10", &["x"], true, 200),
    ]
}

fn create_store(gateway: MockGateway) -> (BookmarkStore, Arc<MockGateway>) {
    let gateway = Arc::new(gateway);
    (BookmarkStore::new(gateway.clone()), gateway)
}

#[tokio::test]
async fn test_fetch_replaces_list_and_clears_error() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    assert!(store.bookmarks().is_empty());

    gateway.fail_bookmarks(Some("boom"));
    store.fetch_bookmarks().await;
    assert_eq!(store.error().as_deref(), Some("boom"));

    gateway.fail_bookmarks(None);
    store.fetch_bookmarks().await;
    assert_eq!(ids(&store.bookmarks()), vec!["1", "2"]);
    assert_eq!(store.error(), None);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_list() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));

    store.fetch_bookmarks().await;
    assert_eq!(store.bookmarks().len(), 2);

    gateway.fail_bookmarks(Some("Request failed with status 503 Service Unavailable"));
    store.fetch_bookmarks().await;

    assert_eq!(ids(&store.bookmarks()), vec!["1", "2"]);
    assert_eq!(
        store.error().as_deref(),
        Some("Request failed with status 503 Service Unavailable")
    );

    store.dismiss_error();
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_failed_fetch_without_message_uses_fallback() {
    let (store, gateway) = create_store(MockGateway::new());
    gateway.fail_bookmarks(Some(""));

    store.fetch_bookmarks().await;
    assert_eq!(store.error().as_deref(), Some("Failed to load bookmarks"));
}

#[tokio::test]
async fn test_selection_intents() {
    let (store, _) = create_store(MockGateway::new());

    store.set_selected_collection("10");
    store.toggle_tag("1");
    store.toggle_tag("2");
    store.set_filter_type(FilterType::WithTags);
    store.set_sort_by(SortBy::TitleZa);
    store.set_view_mode(ViewMode::List);

    let sel = store.selection();
    assert_eq!(sel.collection, "10");
    assert_eq!(sel.tags.len(), 2);
    assert_eq!(sel.filter_type, FilterType::WithTags);
    assert_eq!(sel.sort_by, SortBy::TitleZa);
    assert_eq!(sel.view_mode, ViewMode::List);
    assert!(store.has_active_filters());

    // switching collection on the engine keeps tags
    store.set_selected_collection("all");
    assert_eq!(store.selection().tags.len(), 2);

    store.clear_filters();
    let sel = store.selection();
    assert!(sel.tags.is_empty());
    assert_eq!(sel.filter_type, FilterType::All);
    assert_eq!(sel.sort_by, SortBy::TitleZa);

    store.toggle_tag("3");
    store.clear_tags();
    assert!(store.selection().tags.is_empty());
}

#[tokio::test]
async fn test_toggle_tag_twice_is_noop_and_order_free() {
    let (a, _) = create_store(MockGateway::new());
    let (b, _) = create_store(MockGateway::new());

    a.toggle_tag("1");
    a.toggle_tag("1");
    assert_eq!(a.selection(), b.selection());

    a.toggle_tag("1");
    a.toggle_tag("2");
    b.toggle_tag("2");
    b.toggle_tag("1");
    assert_eq!(a.selection(), b.selection());
}

#[tokio::test]
async fn test_filtered_bookmarks_scenario() {
    let (store, _) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;

    store.set_filter_type(FilterType::Favorites);
    store.set_sort_by(SortBy::TitleAz);
    assert_eq!(ids(&store.filtered_bookmarks(&[])), vec!["2"]);

    store.set_filter_type(FilterType::WithoutTags);
    store.set_sort_by(SortBy::DateNewest);
    assert_eq!(ids(&store.filtered_bookmarks(&[])), vec!["1"]);

    // derivation does not touch the owned list
    assert_eq!(ids(&store.bookmarks()), vec!["1", "2"]);
}

#[tokio::test]
async fn test_search_overrides_local_filters() {
    let results = vec![
        bmark("5", "five", "10", &["rust"], false, 1),
        bmark("9", "nine", "20", &[], false, 2),
    ];
    let (store, gateway) = create_store(
        MockGateway::new()
            .with_bookmarks(two_bookmarks())
            .with_search_results(results),
    );
    store.fetch_bookmarks().await;

    store.set_selected_collection("10");
    store.set_filter_type(FilterType::Favorites);
    store.search_bookmarks("rust").await;

    let rendered = store.rendered(&[tag("1", "rust")]);
    assert_eq!(
        rendered.source,
        RenderSource::Search {
            query: "rust".to_string()
        }
    );
    assert_eq!(ids(&rendered.bookmarks), vec!["5", "9"]);
    assert!(store.is_showing_vector_search());
    assert_eq!(gateway.calls(), vec![MockCall::ListBookmarks, MockCall::Search("rust".to_string(), 15)]);

    // selections stay live while the search shows
    assert_eq!(store.selection().filter_type, FilterType::Favorites);

    store.clear_vector_search();
    let rendered = store.rendered(&[]);
    assert_eq!(rendered.source, RenderSource::Local);
    assert_eq!(ids(&rendered.bookmarks), vec!["2"]);
    assert!(store.vector_search().is_none());
}

#[tokio::test]
async fn test_empty_search_result_falls_back_to_local() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;

    store.search_bookmarks("nothing matches").await;

    let rendered = store.rendered(&[]);
    assert_eq!(rendered.source, RenderSource::Local);
    assert_eq!(ids(&rendered.bookmarks), vec!["2", "1"]);
    assert!(!store.is_showing_vector_search());
    assert_eq!(gateway.count(|c| matches!(c, MockCall::Search(..))), 1);
}

#[tokio::test]
async fn test_blank_query_never_hits_gateway() {
    let (store, gateway) = create_store(
        MockGateway::new().with_search_results(vec![bmark("5", "five", "10", &[], false, 1)]),
    );

    store.search_bookmarks("rust").await;
    assert!(store.is_showing_vector_search());

    for query in ["", "   ", "\t\n"] {
        store.search_bookmarks(query).await;
        let search = store.vector_search().unwrap();
        assert!(search.results.is_empty());
        assert_eq!(search.query, "");
    }

    assert_eq!(gateway.count(|c| matches!(c, MockCall::Search(..))), 1);
    assert!(!store.is_showing_vector_search());
}

#[tokio::test]
async fn test_search_query_is_trimmed() {
    let (store, gateway) = create_store(MockGateway::new());

    store.search_bookmarks("  rust  ").await;
    assert_eq!(gateway.calls(), vec![MockCall::Search("rust".to_string(), 15)]);
}

#[tokio::test]
async fn test_failed_search_keeps_previous_result() {
    let (store, gateway) = create_store(
        MockGateway::new().with_search_results(vec![bmark("5", "five", "10", &[], false, 1)]),
    );

    store.search_bookmarks("rust").await;
    gateway.fail_search(Some("OpenAI API key not configured or invalid. Set API_KEY in .env."));
    store.search_bookmarks("python").await;

    let search = store.vector_search().unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(ids(&search.results), vec!["5"]);
    assert_eq!(
        store.error().as_deref(),
        Some("OpenAI API key not configured or invalid. Set API_KEY in .env.")
    );
    assert!(!store.is_searching());
}

#[tokio::test]
async fn test_search_limit_is_passed_through() {
    let gateway = Arc::new(MockGateway::new());
    let store = BookmarkStore::with_options(gateway.clone(), 5, Default::default());

    store.search_bookmarks("rust").await;
    assert_eq!(gateway.calls(), vec![MockCall::Search("rust".to_string(), 5)]);
}

#[tokio::test]
async fn test_latest_issued_fetch_wins() {
    let (store, gateway) = create_store(MockGateway::new());
    let older = vec![bmark("old", "old", "10", &[], false, 1)];
    let newer = vec![bmark("new", "new", "10", &[], false, 2)];

    let release_older = gateway.queue_fetch(Ok(older));
    let release_newer = gateway.queue_fetch(Ok(newer));

    let driver = async {
        // newer response lands first, older one afterwards
        let _ = release_newer.send(());
        while store.bookmarks().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(store.is_loading());
        let _ = release_older.send(());
    };

    tokio::join!(store.fetch_bookmarks(), store.fetch_bookmarks(), driver);

    assert_eq!(ids(&store.bookmarks()), vec!["new"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_stale_fetch_error_is_ignored() {
    let (store, gateway) = create_store(MockGateway::new());

    let release_older = gateway.queue_fetch(Err("stale failure"));
    let release_newer = gateway.queue_fetch(Ok(two_bookmarks()));

    let driver = async {
        let _ = release_newer.send(());
        while store.bookmarks().is_empty() {
            tokio::task::yield_now().await;
        }
        let _ = release_older.send(());
    };

    tokio::join!(store.fetch_bookmarks(), store.fetch_bookmarks(), driver);

    assert_eq!(store.bookmarks().len(), 2);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_cleared_search_is_not_resurrected() {
    let (store, gateway) = create_store(MockGateway::new());
    let release = gateway.queue_search(Ok(vec![bmark("5", "five", "10", &[], false, 1)]));

    let driver = async {
        while !store.is_searching() {
            tokio::task::yield_now().await;
        }
        store.clear_vector_search();
        let _ = release.send(());
    };

    tokio::join!(store.search_bookmarks("rust"), driver);

    assert!(store.vector_search().is_none());
    assert!(!store.is_showing_vector_search());
}

#[tokio::test]
async fn test_create_bookmark_refetches() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;

    let created = store
        .create_bookmark(BookmarkCreate {
            title: "New".to_string(),
            url: "https://example.com/new".to_string(),
            collection_id: "10".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(store.bookmarks().len(), 3);
    assert!(store.bookmarks().contains(&created));
    assert_eq!(gateway.count(|c| *c == MockCall::ListBookmarks), 2);
}

#[tokio::test]
async fn test_failed_mutations_store_error() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;
    gateway.fail_mutations(Some("Bookmark not found"));

    assert!(!store.delete_bookmark("1").await);
    assert_eq!(store.error().as_deref(), Some("Bookmark not found"));
    assert_eq!(store.bookmarks().len(), 2);

    store.dismiss_error();
    assert!(store.create_bookmark(BookmarkCreate::default()).await.is_none());
    assert_eq!(store.error().as_deref(), Some("Bookmark not found"));
}

#[tokio::test]
async fn test_favorite_round_trip() {
    let (store, _) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;

    assert!(store.set_favorite("1", true).await);
    store.set_filter_type(FilterType::Favorites);
    assert_eq!(store.filtered_bookmarks(&[]).len(), 2);

    assert!(store.set_favorite("2", false).await);
    assert_eq!(ids(&store.filtered_bookmarks(&[])), vec!["1"]);

    assert!(!store.set_favorite("404", false).await);
}

#[tokio::test]
async fn test_delete_bookmark_refetches() {
    let (store, _) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    store.fetch_bookmarks().await;

    assert!(store.delete_bookmark("1").await);
    assert_eq!(ids(&store.bookmarks()), vec!["2"]);

    // already gone
    assert!(!store.delete_bookmark("1").await);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_cancelled_fetch_releases_loading_flag() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));
    let _held = gateway.queue_fetch(Ok(vec![bmark("old", "old", "10", &[], false, 1)]));

    let res = tokio::time::timeout(Duration::from_millis(20), store.fetch_bookmarks()).await;
    assert!(res.is_err());
    assert!(!store.is_loading());
    assert!(store.bookmarks().is_empty());

    store.fetch_bookmarks().await;
    assert_eq!(ids(&store.bookmarks()), vec!["1", "2"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_cancelled_search_releases_searching_flag() {
    let (store, gateway) = create_store(MockGateway::new());
    let _held = gateway.queue_search(Ok(vec![bmark("5", "five", "10", &[], false, 1)]));

    tokio::select! {
        _ = store.search_bookmarks("rust") => panic!("held search completed"),
        _ = tokio::time::sleep(Duration::from_millis(20)) => {}
    }

    assert!(!store.is_searching());
    assert!(store.vector_search().is_none());
}

#[tokio::test]
async fn test_fetch_favorites_leaves_local_list_alone() {
    let (store, gateway) = create_store(MockGateway::new().with_bookmarks(two_bookmarks()));

    let favorites = store.fetch_favorites().await.unwrap();
    assert_eq!(ids(&favorites), vec!["2"]);
    assert!(store.bookmarks().is_empty());
    assert_eq!(gateway.calls(), vec![MockCall::ListFavorites]);

    gateway.fail_bookmarks(Some(""));
    assert!(store.fetch_favorites().await.is_none());
    assert_eq!(store.error().as_deref(), Some("Failed to load favorites"));
}
