//! Product rating repository.

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::{ProductId, RatingAggregate, Stars, UserId};

use crate::RepositoryError;

pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a customer's rating and update the product's aggregate.
    ///
    /// Read-modify-write under a row lock on the product, so concurrent
    /// ratings cannot lose an update to the sum or count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %product_id, user_id = %user_id, stars = stars.get()))]
    pub async fn rate(
        &self,
        product_id: ProductId,
        user_id: UserId,
        stars: Stars,
    ) -> Result<RatingAggregate, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (total, count): (i32, i32) = sqlx::query_as(
            "SELECT rating_total, rating_count FROM shop.product WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let previous: Option<i16> = sqlx::query_scalar(
            "SELECT stars FROM shop.product_rating WHERE product_id = $1 AND user_id = $2",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let previous = previous
            .map(|s| Stars::new(i32::from(s)))
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("stored rating: {e}")))?;

        let updated = RatingAggregate::new(total, count).apply(previous, stars);

        sqlx::query(
            "INSERT INTO shop.product_rating (product_id, user_id, stars) VALUES ($1, $2, $3) \
             ON CONFLICT (product_id, user_id) DO UPDATE SET stars = EXCLUDED.stars, updated_at = now()",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(i16::from(stars.get()))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE shop.product SET rating_total = $2, rating_count = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(product_id)
        .bind(updated.total)
        .bind(updated.count)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// The customer's current rating of a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<Option<Stars>, RepositoryError> {
        let stars: Option<i16> = sqlx::query_scalar(
            "SELECT stars FROM shop.product_rating WHERE product_id = $1 AND user_id = $2",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(stars.and_then(|s| Stars::new(i32::from(s)).ok()))
    }
}
