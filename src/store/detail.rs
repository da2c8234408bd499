use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    bookmarks::Bookmark,
    gateway::{Gateway, GatewayError},
};

use super::in_flight::InFlight;

#[derive(Debug, Default)]
struct DetailState {
    bookmark: Option<Bookmark>,
    error: Option<String>,
    in_flight: usize,
    latest: u64,
}

/// Single bookmark loaded by id, for a detail view.
pub struct BookmarkDetail {
    gateway: Arc<dyn Gateway>,
    state: RwLock<DetailState>,
}

/// 404s read as "not found"; everything else as a load failure.
fn load_error(err: &GatewayError) -> String {
    match err.status() {
        Some(404) => err.message_or("Bookmark not found"),
        _ => err.message_or("Failed to load bookmark"),
    }
}

impl BookmarkDetail {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(DetailState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DetailState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DetailState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads bookmark `id`. The previous bookmark is kept while loading and
    /// dropped if the load fails.
    pub async fn load(&self, id: &str) {
        let (ticket, _in_flight) = {
            let mut state = self.write();
            state.in_flight += 1;
            state.latest += 1;
            state.error = None;
            let guard = InFlight::new(&self.state, |s: &mut DetailState| s.in_flight -= 1);
            (state.latest, guard)
        };

        let result = self.gateway.get_bookmark(id).await;

        let mut state = self.write();
        if ticket != state.latest {
            log::debug!("dropping bookmark {id} response #{ticket}");
            return;
        }

        match result {
            Ok(bmark) => state.bookmark = Some(bmark),
            Err(err) => {
                log::warn!("failed to load bookmark {id}: {err:?}");
                state.bookmark = None;
                state.error = Some(load_error(&err));
            }
        }
    }

    pub fn bookmark(&self) -> Option<Bookmark> {
        self.read().bookmark.clone()
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }
}
