//! Product name search for the header search box.
//!
//! The whole catalog is cached in memory for five minutes and matched by
//! case-insensitive substring. Product changes on the live feed drop the
//! cache early so new and renamed products show up immediately.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tokio::sync::broadcast::error::RecvError;
use tracing::instrument;

use afrah_store::live::{ChangeFeed, Collection};
use afrah_store::models::Product;
use afrah_store::{ProductRepository, RepositoryError};

/// Results shown in the dropdown.
pub const MAX_RESULTS: usize = 5;

/// Queries this short or shorter show nothing.
const MIN_QUERY_CHARS: usize = 2;

const CATALOG_TTL: Duration = Duration::from_secs(300);

/// One dropdown row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub slug: String,
    pub name: String,
    pub image: String,
    pub price: String,
}

impl From<&Product> for SearchHit {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            image: product.main_image().to_owned(),
            price: product.price.display(),
        }
    }
}

/// Cached catalog for search.
#[derive(Clone)]
pub struct SearchIndex {
    catalog: Cache<(), Arc<Vec<Product>>>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Cache::builder()
                .max_capacity(1)
                .time_to_live(CATALOG_TTL)
                .build(),
        }
    }

    /// Products whose name contains `query`, at most [`MAX_RESULTS`].
    ///
    /// # Errors
    ///
    /// Returns the repository error if the catalog has to be loaded and the
    /// query fails.
    #[instrument(skip(self, pool))]
    pub async fn search(
        &self,
        pool: &PgPool,
        query: &str,
    ) -> Result<Vec<SearchHit>, Arc<RepositoryError>> {
        if !is_searchable(query) {
            return Ok(Vec::new());
        }
        let catalog = self
            .catalog
            .try_get_with((), async {
                tracing::debug!("loading search catalog");
                ProductRepository::new(pool).list().await.map(Arc::new)
            })
            .await?;
        Ok(matching(&catalog, query))
    }

    /// Drop the cached catalog.
    pub fn invalidate(&self) {
        self.catalog.invalidate_all();
    }

    /// Invalidate on every product change until the feed closes.
    pub fn spawn_invalidation(&self, feed: &ChangeFeed) -> tokio::task::JoinHandle<()> {
        let index = self.clone();
        let mut events = feed.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.collection == Collection::Products => index.invalidate(),
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => index.invalidate(),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Case-insensitive name match, catalog order, capped at [`MAX_RESULTS`].
///
/// The query is used as typed; spaces count towards the minimum length.
#[must_use]
pub fn matching(catalog: &[Product], query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    if needle.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&needle))
        .take(MAX_RESULTS)
        .map(SearchHit::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use afrah_core::{ProductId, Taka};
    use afrah_store::live::{ChangeEvent, ChangeOp};

    use super::*;

    fn product(id: i32, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            slug: afrah_core::create_slug(name),
            description: String::new(),
            category: "Dates".to_owned(),
            images: Vec::new(),
            price: Taka::from_whole(450),
            original_price: None,
            stock: 10,
            is_new: false,
            rating_total: 0,
            rating_count: 0,
            sales: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_short_queries_match_nothing() {
        let catalog = vec![product(1, "Ajwa Dates")];
        assert!(matching(&catalog, "").is_empty());
        assert!(matching(&catalog, "a").is_empty());
        assert_eq!(matching(&catalog, "aj").len(), 1);
    }

    #[test]
    fn test_query_used_as_typed() {
        let catalog = vec![product(1, "Ajwa Dates")];
        assert_eq!(matching(&catalog, "a ").len(), 1);
        assert!(matching(&catalog, " aj").is_empty());
        assert!(is_searchable(" a"));
        assert!(!is_searchable(" "));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let catalog = vec![
            product(1, "Ajwa Dates"),
            product(2, "Medjool Dates"),
            product(3, "Date Palm Gur"),
            product(4, "Chia Seeds"),
        ];
        let hits = matching(&catalog, "DATE");
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["Ajwa Dates", "Medjool Dates", "Date Palm Gur"]);
        assert_eq!(hits[0].slug, "ajwa-dates");
        assert_eq!(hits[0].price, "৳450.00");
        assert_eq!(hits[0].image, afrah_store::models::PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_results_capped() {
        let catalog: Vec<_> = (1..=8).map(|i| product(i, &format!("Cashew Nuts {i}"))).collect();
        assert_eq!(matching(&catalog, "nuts").len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_product_change_invalidates_cache() {
        let index = SearchIndex::new();
        index
            .catalog
            .insert((), Arc::new(vec![product(1, "Ajwa Dates")]))
            .await;
        let feed = ChangeFeed::new(8);
        let _task = index.spawn_invalidation(&feed);

        feed.publish(ChangeEvent::new(Collection::Orders, 1, ChangeOp::Insert));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(index.catalog.get(&()).await.is_some());

        feed.publish(ChangeEvent::new(Collection::Products, 1, ChangeOp::Update));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(index.catalog.get(&()).await.is_none());
    }
}
