//! The URL side of synchronization.
//!
//! A [`UrlRouter`] exposes the current query as a `watch` channel (the
//! reactive source) and two write operations: an in-place replace that adds
//! no history entry, and a full navigation used as a redirect while
//! rendering on the server.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use lotview_filters::{parse_search, UrlQuery};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::SyncError;

/// Where the current render is executing. Selects how an invalid filter is
/// removed from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Server render: issue a real redirect so no content is served for the
    /// invalid filter.
    Server,
    /// Browser: replace the URL in place.
    Client,
}

pub trait UrlRouter {
    /// The router's current query.
    fn current_query(&self) -> UrlQuery;

    /// A receiver that observes every query change, starting at the current one.
    fn subscribe(&self) -> watch::Receiver<UrlQuery>;

    /// Rewrites the query without adding a history entry.
    fn replace(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Performs a full navigation (redirect) to the query.
    fn navigate(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// Writes `query` with the operation appropriate to `mode`.
///
/// # Errors
///
/// Propagates the router's [`SyncError`].
pub async fn rewrite<R: UrlRouter>(
    router: &R,
    query: UrlQuery,
    mode: RenderMode,
) -> Result<(), SyncError> {
    match mode {
        RenderMode::Server => router.navigate(query).await,
        RenderMode::Client => router.replace(query).await,
    }
}

/// Marks the receiver's value as seen after a write of `written` that replaced
/// `before`. Returns the observed query when an outside change raced the write.
pub(crate) fn settle_write(
    rx: &mut watch::Receiver<UrlQuery>,
    before: &UrlQuery,
    written: &UrlQuery,
) -> Option<UrlQuery> {
    let observed = rx.borrow_and_update();
    (*observed != *written && *observed != *before).then(|| observed.clone())
}

/// A write the [`MemoryRouter`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterCall {
    Replace(UrlQuery),
    Navigate(UrlQuery),
}

#[derive(Debug)]
struct RouterInner {
    query: watch::Sender<UrlQuery>,
    calls: Mutex<Vec<RouterCall>>,
    reject_writes: Mutex<Option<String>>,
}

/// In-process router backed by a `watch` channel. Used by the CLI harness
/// and by tests; it records every write for inspection.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    inner: Arc<RouterInner>,
}

impl MemoryRouter {
    #[must_use]
    pub fn new(initial: UrlQuery) -> Self {
        let (query, _) = watch::channel(initial);
        Self {
            inner: Arc::new(RouterInner {
                query,
                calls: Mutex::new(Vec::new()),
                reject_writes: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn from_search(search: &str) -> Self {
        Self::new(parse_search(search))
    }

    /// Changes the query from outside the app, as back/forward navigation
    /// or a manual address-bar edit would. Not recorded as a call.
    pub fn push_external(&self, query: UrlQuery) {
        self.inner.query.send_replace(query);
    }

    /// Makes every subsequent write fail with `reason` (`None` restores writes).
    pub fn reject_writes(&self, reason: Option<&str>) {
        *self
            .inner
            .reject_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reason.map(str::to_string);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RouterCall> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn replace_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RouterCall::Replace(_)))
            .count()
    }

    #[must_use]
    pub fn navigate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RouterCall::Navigate(_)))
            .count()
    }
}

impl RouterInner {
    fn write(&self, action: &'static str, call: RouterCall) -> Result<(), SyncError> {
        if let Some(reason) = self
            .reject_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(SyncError::Navigation { action, reason });
        }
        let query = match &call {
            RouterCall::Replace(q) | RouterCall::Navigate(q) => q.clone(),
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        self.query.send_replace(query);
        Ok(())
    }
}

impl UrlRouter for MemoryRouter {
    fn current_query(&self) -> UrlQuery {
        self.inner.query.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<UrlQuery> {
        self.inner.query.subscribe()
    }

    fn replace(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            // Writes settle on a later turn, like a real router's promise.
            tokio::task::yield_now().await;
            inner.write("replace", RouterCall::Replace(query))
        }
    }

    fn navigate(&self, query: UrlQuery) -> impl Future<Output = Result<(), SyncError>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            tokio::task::yield_now().await;
            inner.write("navigate", RouterCall::Navigate(query))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replace_updates_query_and_records_call() {
        let router = MemoryRouter::from_search("?utm=x");
        let mut rx = router.subscribe();
        let next = parse_search("utm=x&search=barn");

        router.replace(next.clone()).await.unwrap();

        assert_eq!(router.current_query(), next);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), next);
        assert_eq!(router.calls(), vec![RouterCall::Replace(next)]);
    }

    #[tokio::test]
    async fn rewrite_picks_operation_by_mode() {
        let router = MemoryRouter::new(UrlQuery::new());
        rewrite(&router, UrlQuery::new(), RenderMode::Server)
            .await
            .unwrap();
        rewrite(&router, UrlQuery::new(), RenderMode::Client)
            .await
            .unwrap();
        assert_eq!(router.navigate_count(), 1);
        assert_eq!(router.replace_count(), 1);
    }

    #[tokio::test]
    async fn rejected_write_leaves_query_untouched() {
        let router = MemoryRouter::from_search("?search=old");
        router.reject_writes(Some("navigation aborted"));
        let err = router
            .replace(parse_search("search=new"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Navigation { action: "replace", .. }));
        assert_eq!(router.current_query(), parse_search("search=old"));
        assert!(router.calls().is_empty());
    }

    #[test]
    fn push_external_is_not_recorded() {
        let router = MemoryRouter::new(UrlQuery::new());
        router.push_external(parse_search("tag=sale"));
        assert!(router.calls().is_empty());
        assert_eq!(router.current_query(), parse_search("tag=sale"));
    }
}
