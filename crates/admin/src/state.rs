//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use afrah_store::ErrorBus;
use afrah_store::live::ChangeFeed;

use crate::config::AdminConfig;

/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    feed: ChangeFeed,
    errors: ErrorBus,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, feed: ChangeFeed, errors: ErrorBus) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                feed,
                errors,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Change events that drive the live views.
    #[must_use]
    pub fn feed(&self) -> &ChangeFeed {
        &self.inner.feed
    }

    /// Where access-rule denials are reported.
    #[must_use]
    pub fn errors(&self) -> &ErrorBus {
        &self.inner.errors
    }
}
