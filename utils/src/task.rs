//! Cooperative cancellation and async handles for blocking searches.
//!
//! Searches are CPU-bound and run on rayon pools, so they never await. A
//! [`CancelToken`] is polled by the workers between batches; an async caller
//! gets a [`SearchHandle`] that runs the search on tokio's blocking pool.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A token that is cancelled when either `self` or the returned child is.
    ///
    /// Cancelling the child leaves `self` untouched.
    pub fn child(&self) -> ChildToken {
        ChildToken {
            parent: self.clone(),
            own: CancelToken::new(),
        }
    }
}

/// Cancellation scoped to one search but still driven by an outer token.
#[derive(Clone, Debug)]
pub struct ChildToken {
    parent: CancelToken,
    own: CancelToken,
}

impl ChildToken {
    pub fn cancel(&self) {
        self.own.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.own.is_cancelled() || self.parent.is_cancelled()
    }

    /// A token that cancels this child alone, for handing to a
    /// [`SearchHandle`].
    pub fn handle(&self) -> CancelToken {
        self.own.clone()
    }
}

/// A search running on the blocking pool.
#[derive(Debug)]
pub struct SearchHandle<T> {
    token: CancelToken,
    task: JoinHandle<T>,
}

impl<T> SearchHandle<T> {
    /// Ask the search to stop at its next batch boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the search. A panic inside the search surfaces as `Err`.
    pub async fn join(self) -> Result<T, JoinError> {
        self.task.await
    }
}

/// Run `search` on tokio's blocking pool with `token` as its cancellation
/// flag. Must be called from within a tokio runtime.
pub fn spawn_search<T, F>(token: CancelToken, search: F) -> SearchHandle<T>
where
    F: FnOnce(CancelToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let worker_token = token.clone();
    let task = tokio::task::spawn_blocking(move || search(worker_token));
    SearchHandle { token, task }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn child_sees_parent_but_not_vice_versa() {
        let parent = CancelToken::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn handle_cancels_only_its_child() {
        let parent = CancelToken::new();
        let child = parent.child();
        let sibling = parent.child();
        child.handle().cancel();
        assert!(child.is_cancelled());
        assert!(!sibling.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let caught = std::panic::catch_unwind(|| panic!("lane {} failed", 3)).unwrap_err();
        assert_eq!(panic_message(&*caught), "lane 3 failed");
        let caught = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*caught), "static");
    }

    #[tokio::test]
    async fn handle_returns_search_result() {
        let handle = spawn_search(CancelToken::new(), |_| 6 * 7);
        assert_eq!(handle.join().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancel_stops_a_polling_search() {
        let handle = spawn_search(CancelToken::new(), |token| {
            let mut spins = 0u64;
            while !token.is_cancelled() {
                spins += 1;
                std::thread::sleep(Duration::from_millis(1));
            }
            spins
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        assert!(handle.join().await.is_ok());
    }

    #[tokio::test]
    async fn panics_surface_as_join_errors() {
        let handle = spawn_search(CancelToken::new(), |_| -> u8 { panic!("boom") });
        assert!(handle.join().await.unwrap_err().is_panic());
    }
}
