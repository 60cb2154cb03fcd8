//! Shareable completion handle for namespace loads.

use std::future::Future;
use std::pin::Pin;
use std::task::{
    Context,
    Poll,
};

use futures::FutureExt;
use futures::future::{
    BoxFuture,
    Shared,
};

use crate::error::LoadError;

/// The tier that produced a namespace's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    PersistentCache,
    Remote,
    Fallback,
}

/// How a load settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// Data was already in memory for the current locale.
    Resident,
    Loaded(Tier),
    /// Every tier missed. Lookups echo keys until a later reload succeeds.
    Unavailable,
}

impl LoadOutcome {
    /// Whether data is now resident for the requested key.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Resident | Self::Loaded(_))
    }
}

pub type LoadResult = Result<LoadOutcome, LoadError>;

/// A pending or settled namespace load.
///
/// Clones observe the same outcome. Use [`LoadHandle::same_as`] to check
/// whether two handles refer to the same load.
#[derive(Clone)]
#[must_use = "a load handle does nothing unless awaited or dropped on purpose"]
pub struct LoadHandle(Shared<BoxFuture<'static, LoadResult>>);

impl LoadHandle {
    pub(crate) fn new(future: impl Future<Output = LoadResult> + Send + 'static) -> Self {
        Self(future.boxed().shared())
    }

    pub(crate) fn ready(result: LoadResult) -> Self {
        Self::new(futures::future::ready(result))
    }

    /// Returns `true` when both handles share one underlying load.
    ///
    /// Only meaningful while the load is pending.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }

    /// The outcome, if the load has already settled.
    #[must_use]
    pub fn peek(&self) -> Option<&LoadResult> {
        self.0.peek()
    }
}

impl Future for LoadHandle {
    type Output = LoadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl std::fmt::Debug for LoadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LoadHandle").field(&self.peek()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[tokio::test]
    async fn clones_share_one_outcome() {
        let handle = LoadHandle::new(async { Ok(LoadOutcome::Loaded(Tier::Remote)) });
        let clone = handle.clone();

        assert_that!(handle.same_as(&clone), eq(true));
        assert_that!(clone.await, ok(eq(&LoadOutcome::Loaded(Tier::Remote))));
        assert!(matches!(handle.peek(), Some(Ok(LoadOutcome::Loaded(Tier::Remote)))));
    }

    #[tokio::test]
    async fn independent_handles_differ() {
        let a = LoadHandle::new(async { Ok(LoadOutcome::Unavailable) });
        let b = LoadHandle::new(async { Ok(LoadOutcome::Unavailable) });

        assert_that!(a.same_as(&b), eq(false));
    }

    #[tokio::test]
    async fn ready_handle_is_settled() {
        let handle = LoadHandle::ready(Err(LoadError::InvalidNamespace("a/b".to_string())));

        assert_that!(handle.await, err(eq(&LoadError::InvalidNamespace("a/b".to_string()))));
    }

    #[test]
    fn ready_handle_completes_on_first_poll() {
        let mut task = tokio_test::task::spawn(LoadHandle::ready(Ok(LoadOutcome::Resident)));

        let result = tokio_test::assert_ready!(task.poll());

        assert_that!(result, ok(eq(&LoadOutcome::Resident)));
    }

    #[test]
    fn clones_wake_when_load_settles() {
        let (tx, rx) = futures::channel::oneshot::channel::<LoadResult>();
        let handle = LoadHandle::new(async move { rx.await.unwrap_or(Ok(LoadOutcome::Unavailable)) });
        let mut first = tokio_test::task::spawn(handle.clone());
        let mut second = tokio_test::task::spawn(handle);

        tokio_test::assert_pending!(first.poll());
        tokio_test::assert_pending!(second.poll());

        tx.send(Ok(LoadOutcome::Loaded(Tier::PersistentCache))).unwrap();

        assert!(first.is_woken());
        assert_that!(
            tokio_test::assert_ready!(first.poll()),
            ok(eq(&LoadOutcome::Loaded(Tier::PersistentCache)))
        );
        assert_that!(
            tokio_test::assert_ready!(second.poll()),
            ok(eq(&LoadOutcome::Loaded(Tier::PersistentCache)))
        );
    }

    #[test]
    fn availability() {
        assert!(LoadOutcome::Resident.is_available());
        assert!(LoadOutcome::Loaded(Tier::Fallback).is_available());
        assert!(!LoadOutcome::Unavailable.is_available());
    }
}
