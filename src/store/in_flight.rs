use std::sync::{PoisonError, RwLock};

/// Holds one unit of an in-flight counter and gives it back on drop.
///
/// A request future dropped mid-await still releases its slot, so loading
/// flags cannot stay raised.
pub(super) struct InFlight<'a, S> {
    state: &'a RwLock<S>,
    release: fn(&mut S),
}

impl<'a, S> InFlight<'a, S> {
    /// The caller has already incremented the counter under the write lock.
    pub(super) fn new(state: &'a RwLock<S>, release: fn(&mut S)) -> Self {
        Self { state, release }
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        (self.release)(&mut state);
    }
}
