use std::fmt::Display;
use std::future::Future;

use futures::Stream;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;

use super::{ChangeEvent, ChangeFeed, Collection};

/// State of a live query.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Result of the last successful load.
    pub data: Option<T>,
    /// `true` until the first load finishes.
    pub loading: bool,
    /// Message from the last failed load; cleared by the next success.
    pub error: Option<String>,
}

impl<T> Snapshot<T> {
    const fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    const fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Receiving side of a live query.
///
/// Dropping every clone of a subscription stops its reload task.
#[derive(Debug, Clone)]
pub struct Subscription<T> {
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// A subscription with nothing to watch (for example, no signed-in user).
    /// Never loading, never any data.
    #[must_use]
    pub fn idle() -> Self {
        let (_tx, rx) = watch::channel(Snapshot::idle());
        Self { rx }
    }

    /// The latest snapshot.
    #[must_use]
    pub fn current(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot. Returns `None` once no more updates can
    /// arrive.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `ready`, returning it.
    ///
    /// Returns `None` if the subscription ends first.
    pub async fn wait_for(
        &mut self,
        mut ready: impl FnMut(&Snapshot<T>) -> bool,
    ) -> Option<Snapshot<T>> {
        self.rx.wait_for(|snapshot| ready(snapshot)).await.ok().map(|s| s.clone())
    }

    /// Stream the current snapshot and every later one.
    pub fn into_stream(mut self) -> impl Stream<Item = Snapshot<T>> {
        async_stream::stream! {
            let first = self.rx.borrow_and_update().clone();
            yield first;
            while self.rx.changed().await.is_ok() {
                let next = self.rx.borrow_and_update().clone();
                yield next;
            }
        }
    }
}

/// Which change events trigger a reload.
#[derive(Debug, Clone)]
struct Filter {
    collection: Collection,
    id: Option<String>,
}

impl Filter {
    fn matches(&self, event: &ChangeEvent) -> bool {
        event.collection == self.collection
            && self.id.as_ref().is_none_or(|id| event.id.as_ref() == Some(id))
    }
}

/// Watch a whole collection: reload on any change to it.
pub fn watch_collection<T, E, F, Fut>(
    feed: &ChangeFeed,
    collection: Collection,
    loader: F,
) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send,
{
    spawn(
        feed,
        Filter {
            collection,
            id: None,
        },
        loader,
    )
}

/// Watch one record: reload on changes whose key equals `id`.
pub fn watch_document<T, E, F, Fut>(
    feed: &ChangeFeed,
    collection: Collection,
    id: impl ToString,
    loader: F,
) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send,
{
    spawn(
        feed,
        Filter {
            collection,
            id: Some(id.to_string()),
        },
        loader,
    )
}

fn spawn<T, E, F, Fut>(feed: &ChangeFeed, filter: Filter, loader: F) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send,
{
    let (tx, rx) = watch::channel(Snapshot::loading());
    // Subscribe before the first load so no change is missed in between.
    let mut events = feed.subscribe();

    tokio::spawn(async move {
        loop {
            match loader().await {
                Ok(data) => tx.send_modify(|snapshot| {
                    snapshot.data = Some(data);
                    snapshot.loading = false;
                    snapshot.error = None;
                }),
                Err(e) => {
                    tracing::error!(collection = ?filter.collection, id = ?filter.id, error = %e, "live query failed");
                    tx.send_modify(|snapshot| {
                        snapshot.loading = false;
                        snapshot.error = Some(e.to_string());
                    });
                }
            }

            // Wait for a relevant change, or stop once nobody is listening.
            loop {
                tokio::select! {
                    () = tx.closed() => return,
                    event = events.recv() => match event {
                        Ok(event) if filter.matches(&event) => break,
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "live query lagged, reloading");
                            break;
                        }
                        Err(RecvError::Closed) => {
                            tx.closed().await;
                            return;
                        }
                    },
                }
            }

            // Coalesce a burst of changes into the one reload.
            loop {
                match events.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }

            if tx.is_closed() {
                return;
            }
        }
    });

    Subscription { rx }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::StreamExt;

    use super::*;
    use crate::live::ChangeOp;

    fn counting_loader(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<Result<usize, String>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn change(collection: Collection, id: i32) -> ChangeEvent {
        ChangeEvent::new(collection, id, ChangeOp::Update)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_then_data() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_collection(&feed, Collection::Orders, counting_loader(&calls));

        let first = sub.current();
        assert!(first.loading);
        assert!(first.data.is_none());
        assert!(first.error.is_none());

        let loaded = sub.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(loaded.data, Some(1));
        assert!(loaded.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloads_on_matching_change_only() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_collection(&feed, Collection::Orders, counting_loader(&calls));
        sub.wait_for(|s| s.data == Some(1)).await.unwrap();

        feed.publish(change(Collection::Contacts, 1));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        feed.publish(change(Collection::Orders, 4));
        let reloaded = sub.wait_for(|s| s.data == Some(2)).await.unwrap();
        assert!(!reloaded.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_collection(&feed, Collection::Products, counting_loader(&calls));
        sub.wait_for(|s| s.data == Some(1)).await.unwrap();

        for id in 0..5 {
            feed.publish(change(Collection::Products, id));
        }
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sub.current().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_filters_by_id() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_document(&feed, Collection::Cart, 7, counting_loader(&calls));
        sub.wait_for(|s| s.data == Some(1)).await.unwrap();

        feed.publish(change(Collection::Cart, 8));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        feed.publish(change(Collection::Cart, 7));
        sub.wait_for(|s| s.data == Some(2)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_previous_data() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n == 0 {
                Ok("first".to_owned())
            } else {
                Err("connection reset")
            })
        };
        let mut sub = watch_collection(&feed, Collection::Users, loader);
        sub.wait_for(|s| s.data.is_some()).await.unwrap();

        feed.publish(change(Collection::Users, 1));
        let failed = sub.wait_for(|s| s.error.is_some()).await.unwrap();
        assert_eq!(failed.data.as_deref(), Some("first"));
        assert_eq!(failed.error.as_deref(), Some("connection reset"));
        assert!(!failed.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lag_forces_reload() {
        let feed = ChangeFeed::new(2);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_collection(&feed, Collection::Orders, counting_loader(&calls));
        sub.wait_for(|s| s.data == Some(1)).await.unwrap();

        // Unrelated events overflow the buffer before the task runs.
        for id in 0..5 {
            feed.publish(change(Collection::Contacts, id));
        }
        sub.wait_for(|s| s.data == Some(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_idle_subscription() {
        let mut sub = Subscription::<Vec<i32>>::idle();
        let snapshot = sub.current();
        assert!(!snapshot.loading);
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());
        assert!(sub.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_stops_after_unsubscribe() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sub = watch_collection(&feed, Collection::Orders, counting_loader(&calls));
        sub.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(feed.receiver_count(), 1);

        drop(sub);
        settle().await;
        assert_eq!(feed.receiver_count(), 0);

        feed.publish(change(Collection::Orders, 1));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_yields_updates() {
        let feed = ChangeFeed::new(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = watch_collection(&feed, Collection::Products, counting_loader(&calls));
        let mut stream = Box::pin(sub.into_stream());

        let mut seen = stream.next().await.unwrap();
        while seen.data != Some(1) {
            seen = stream.next().await.unwrap();
        }
        feed.publish(change(Collection::Products, 1));
        while seen.data != Some(2) {
            seen = stream.next().await.unwrap();
        }
        assert!(seen.error.is_none());
    }
}
