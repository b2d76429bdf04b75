//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use afrah_store::ErrorBus;
use afrah_store::live::ChangeFeed;

use crate::config::StorefrontConfig;
use crate::content::SiteInfo;
use crate::search::SearchIndex;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    site: SiteInfo,
    errors: ErrorBus,
    feed: ChangeFeed,
    search: SearchIndex,
}

impl AppState {
    /// Build the state and start the search cache invalidation task.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, feed: ChangeFeed, errors: ErrorBus) -> Self {
        let site = SiteInfo::new(&config.contact);
        let search = SearchIndex::new();
        search.spawn_invalidation(&feed);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                site,
                errors,
                feed,
                search,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn site(&self) -> &SiteInfo {
        &self.inner.site
    }

    /// Where access-rule denials are reported.
    #[must_use]
    pub fn errors(&self) -> &ErrorBus {
        &self.inner.errors
    }

    #[must_use]
    pub fn feed(&self) -> &ChangeFeed {
        &self.inner.feed
    }

    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.inner.search
    }
}
