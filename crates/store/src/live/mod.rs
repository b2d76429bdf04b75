//! Live change feed and snapshot subscriptions.
//!
//! Row triggers call `pg_notify('shop_changes', ...)` with a small JSON
//! payload. One [`ChangeFeed`] per process holds a `PgListener` on that
//! channel and fans the parsed [`ChangeEvent`]s out over a broadcast
//! channel. [`watch_collection`] and [`watch_document`] turn the feed into
//! `watch` channels of [`Snapshot`]s that reload when their data changes.

mod snapshot;

use std::time::Duration;

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

pub use snapshot::{Snapshot, Subscription, watch_collection, watch_document};

/// Notification channel the row triggers publish on.
pub const CHANNEL: &str = "shop_changes";

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Tables that publish changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Collection {
    #[serde(rename = "product")]
    Products,
    #[serde(rename = "customer_order")]
    Orders,
    #[serde(rename = "contact_message")]
    Contacts,
    #[serde(rename = "user_account")]
    Users,
    #[serde(rename = "admin_flag")]
    Admins,
    #[serde(rename = "cart_item")]
    Cart,
    #[serde(rename = "wishlist_item")]
    Wishlist,
    #[serde(rename = "product_rating")]
    Ratings,
}

/// Row operation that caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row change.
///
/// `id` is the row key named by the trigger: the row id for top-level
/// tables, the owning user id for carts, wishlists and admin flags, and the
/// product id for ratings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: Option<String>,
    pub op: ChangeOp,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(collection: Collection, id: impl ToString, op: ChangeOp) -> Self {
        Self {
            collection,
            id: Some(id.to_string()),
            op,
        }
    }

    /// Parse a notification payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for payloads from unknown tables or in an
    /// unexpected shape.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Process-wide fan-out of [`ChangeEvent`]s.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// A feed with no database listener. Events arrive only via
    /// [`ChangeFeed::publish`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Start listening on [`CHANNEL`] and return the feed.
    ///
    /// The listener task reconnects after connection errors; notifications
    /// sent while disconnected are lost, so subscribers also reload when
    /// they lag.
    #[must_use]
    pub fn listen(pool: PgPool) -> Self {
        let feed = Self::new(256);
        let tx = feed.tx.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = run_listener(&pool, &tx).await {
                    tracing::warn!(error = %e, "change feed listener failed, reconnecting");
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });
        feed
    }

    /// Inject an event.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Forward notifications until the connection fails.
async fn run_listener(
    pool: &PgPool,
    tx: &broadcast::Sender<ChangeEvent>,
) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    tracing::info!(channel = CHANNEL, "change feed listening");

    loop {
        let notification = listener.recv().await?;
        match ChangeEvent::parse(notification.payload()) {
            Ok(event) => {
                tracing::debug!(?event, "change received");
                let _ = tx.send(event);
            }
            Err(e) => {
                tracing::warn!(error = %e, payload = notification.payload(), "bad change payload");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trigger_payload() {
        let event =
            ChangeEvent::parse(r#"{"collection":"customer_order","id":"12","op":"UPDATE"}"#)
                .unwrap();
        assert_eq!(event, ChangeEvent::new(Collection::Orders, 12, ChangeOp::Update));

        let cart = ChangeEvent::parse(r#"{"collection":"cart_item","id":"3","op":"DELETE"}"#)
            .unwrap();
        assert_eq!(cart.collection, Collection::Cart);
        assert_eq!(cart.id.as_deref(), Some("3"));
    }

    #[test]
    fn test_unknown_table_rejected() {
        assert!(ChangeEvent::parse(r#"{"collection":"audit","id":"1","op":"INSERT"}"#).is_err());
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();
        feed.publish(ChangeEvent::new(Collection::Products, 1, ChangeOp::Insert));
        assert_eq!(rx.recv().await.unwrap().collection, Collection::Products);
    }
}
