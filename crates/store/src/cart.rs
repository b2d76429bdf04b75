//! Cart repository (`users/{uid}/cart`).

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::{CartItemId, ProductId, UserId};

use crate::RepositoryError;
use crate::models::{CartLine, NewOrder, Order, OrderLine};
use crate::orders::place_in;
use crate::products::product_columns;

/// Repository for a signed-in customer's cart.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the cart. Adding a product already in the cart bumps
    /// its quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartItemId>(
            "INSERT INTO shop.cart_item (user_id, product_id, quantity) \
             SELECT $1, p.id, $3 FROM shop.product p WHERE p.id = $2 \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = shop.cart_item.quantity + EXCLUDED.quantity, added_at = now() \
             RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.max(1))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(id)
    }

    /// Cart lines joined with their products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(concat!(
            "SELECT c.id AS cart_item_id, c.quantity, ",
            product_columns!(),
            " FROM shop.cart_item c JOIN shop.product p ON p.id = c.product_id \
             WHERE c.user_id = $1 ORDER BY c.added_at, c.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    /// Remove one cart entry. Entries belonging to other users are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry is not in this cart.
    #[instrument(skip(self), fields(user_id = %user_id, cart_item_id = %id))]
    pub async fn remove(&self, user_id: UserId, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of units in the cart (header badge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM shop.cart_item WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Turn the whole cart into one order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::EmptyCart` if there is nothing to order and
    /// `RepositoryError::InsufficientStock` if any line cannot be filled; in
    /// both cases the cart is left as it was.
    #[instrument(skip(self, order), fields(user_id = %user_id))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        order: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines: Vec<OrderLine> = sqlx::query_as::<_, (ProductId, i32)>(
            "SELECT product_id, quantity FROM shop.cart_item WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect();

        if lines.is_empty() {
            return Err(RepositoryError::EmptyCart);
        }

        let placed = place_in(&mut *tx, order, &lines).await?;

        sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(order_id = %placed.id, "cart checked out");
        Ok(placed)
    }
}
