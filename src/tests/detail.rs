use std::sync::Arc;

use crate::store::detail::BookmarkDetail;

use super::mock::{bmark, MockCall, MockGateway};

fn create_detail() -> (BookmarkDetail, Arc<MockGateway>) {
    let gateway = Arc::new(MockGateway::new().with_bookmarks(vec![
        bmark("1", "Rust book", "10", &["rust"], true, 300),
        bmark("2", "Axum docs", "10", &[], false, 200),
    ]));
    (BookmarkDetail::new(gateway.clone()), gateway)
}

#[tokio::test]
async fn test_load_bookmark() {
    let (detail, gateway) = create_detail();
    assert!(detail.bookmark().is_none());

    detail.load("2").await;

    assert_eq!(detail.bookmark().unwrap().title, "Axum docs");
    assert_eq!(detail.error(), None);
    assert!(!detail.is_loading());
    assert_eq!(gateway.calls(), vec![MockCall::GetBookmark("2".to_string())]);
}

#[tokio::test]
async fn test_missing_bookmark_clears_previous() {
    let (detail, _) = create_detail();

    detail.load("1").await;
    assert!(detail.bookmark().is_some());

    detail.load("404").await;
    assert!(detail.bookmark().is_none());
    assert_eq!(detail.error().as_deref(), Some("Bookmark not found"));
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let (detail, gateway) = create_detail();
    gateway.fail_bookmarks(Some(""));

    detail.load("1").await;
    assert_eq!(detail.error().as_deref(), Some("Failed to load bookmark"));

    gateway.fail_bookmarks(None);
    detail.load("1").await;
    assert_eq!(detail.error(), None);
    assert_eq!(detail.bookmark().unwrap().id, "1");
}
