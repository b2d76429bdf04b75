//! Order repository.
//!
//! Placing an order and changing its status both move product stock, so they
//! run in one transaction with the affected product rows locked.

use std::collections::{BTreeMap, HashMap};

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use afrah_core::{OrderId, OrderStatus, ProductId, StockEffect, Taka, UserId};

use crate::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, OrderLine, OrderRow, OrderStats};

const ORDER_COLUMNS: &str = "id, user_id, customer_name, address, phone, payment_method, \
                             status, total_price, created_at";

/// Repository for orders and their items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for the given lines.
    ///
    /// Stock is decremented and sales incremented for every line in the same
    /// transaction as the order insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a product no longer exists and
    /// `RepositoryError::InsufficientStock` if a line asks for more than is on
    /// hand.
    #[instrument(skip(self, order, lines), fields(user_id = ?order.user_id, lines = lines.len()))]
    pub async fn place(
        &self,
        order: &NewOrder,
        lines: &[OrderLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let placed = place_in(&mut *tx, order, lines).await?;
        tx.commit().await?;
        tracing::info!(order_id = %placed.id, total = %placed.total_price, "order placed");
        Ok(placed)
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        self.with_items(rows).await
    }

    /// The `limit` most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        self.with_items(rows).await
    }

    /// A customer's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        self.with_items(rows).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Change an order's status, releasing or reserving stock as needed.
    ///
    /// Returns the order as it is after the change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist and
    /// `RepositoryError::InsufficientStock` when re-opening a cancelled order
    /// whose products have since sold out.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: String =
            sqlx::query_scalar("SELECT status FROM shop.customer_order WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;
        let current: OrderStatus = current
            .parse()
            .map_err(|e: String| RepositoryError::DataCorruption(format!("{e} in database")))?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, product_name, unit_price, quantity \
             FROM shop.order_item WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        match StockEffect::between(current, status) {
            StockEffect::Release => {
                for item in &items {
                    let Some(product_id) = item.product_id else {
                        continue;
                    };
                    sqlx::query(
                        "UPDATE shop.product SET stock = stock + $2, \
                         sales = GREATEST(sales - $2, 0), updated_at = now() WHERE id = $1",
                    )
                    .bind(product_id)
                    .bind(item.quantity)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            StockEffect::Reserve => {
                for item in &items {
                    let Some(product_id) = item.product_id else {
                        continue;
                    };
                    take_stock(&mut *tx, product_id, item.quantity).await?;
                }
            }
            StockEffect::None => {}
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE shop.customer_order SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(from = %current, to = %status, "order status changed");
        row.into_order(items)
    }

    /// Dashboard counts and revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            "SELECT \
               (SELECT COUNT(*) FROM shop.customer_order) AS total_orders, \
               (SELECT COUNT(*) FROM shop.customer_order WHERE status = 'Pending') AS pending_orders, \
               (SELECT COALESCE(SUM(total_price), 0) FROM shop.customer_order \
                 WHERE status <> 'Cancelled') AS revenue, \
               (SELECT COUNT(*) FROM shop.product) AS product_count, \
               (SELECT COUNT(*) FROM shop.user_account) AS user_count, \
               (SELECT COUNT(*) FROM shop.contact_message) AS message_count",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    async fn with_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, product_name, unit_price, quantity \
             FROM shop.order_item WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}

/// Merge duplicate products and order lines by product id, so rows are
/// always locked in the same order.
pub(crate) fn normalize_lines(lines: &[OrderLine]) -> Vec<OrderLine> {
    let mut merged: BTreeMap<ProductId, i32> = BTreeMap::new();
    for line in lines.iter().filter(|line| line.quantity > 0) {
        *merged.entry(line.product_id).or_default() += line.quantity;
    }
    merged
        .into_iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect()
}

#[derive(sqlx::FromRow)]
struct LockedProduct {
    name: String,
    price: Taka,
}

/// Lock the product row, check stock, and move `quantity` from stock to sales.
async fn take_stock(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: i32,
) -> Result<LockedProduct, RepositoryError> {
    let (name, price, stock): (String, Taka, i32) =
        sqlx::query_as("SELECT name, price, stock FROM shop.product WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

    if stock < quantity {
        return Err(RepositoryError::InsufficientStock {
            product: name,
            available: stock,
        });
    }

    sqlx::query(
        "UPDATE shop.product SET stock = stock - $2, sales = sales + $2, updated_at = now() \
         WHERE id = $1",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    Ok(LockedProduct { name, price })
}

/// Insert an order and its items inside an open transaction.
pub(crate) async fn place_in(
    conn: &mut PgConnection,
    order: &NewOrder,
    lines: &[OrderLine],
) -> Result<Order, RepositoryError> {
    let lines = normalize_lines(lines);
    if lines.is_empty() {
        return Err(RepositoryError::EmptyCart);
    }

    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = take_stock(conn, line.product_id, line.quantity).await?;
        priced.push((line, product));
    }
    let total: Taka = priced
        .iter()
        .map(|(line, product)| product.price * line.quantity)
        .sum();

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO shop.customer_order \
         (user_id, customer_name, address, phone, payment_method, total_price) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.user_id)
    .bind(&order.customer_name)
    .bind(&order.address)
    .bind(order.phone.as_str())
    .bind(order.payment_method.as_str())
    .bind(total)
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for (line, product) in priced {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO shop.order_item (order_id, product_id, product_name, unit_price, quantity) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, order_id, product_id, product_name, unit_price, quantity",
        )
        .bind(row.id)
        .bind(line.product_id)
        .bind(product.name)
        .bind(product.price)
        .bind(line.quantity)
        .fetch_one(&mut *conn)
        .await?;
        items.push(item);
    }

    row.into_order(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, quantity: i32) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_normalize_merges_and_sorts() {
        let lines = normalize_lines(&[line(7, 1), line(2, 3), line(7, 2)]);
        assert_eq!(lines, vec![line(2, 3), line(7, 3)]);
    }

    #[test]
    fn test_normalize_drops_non_positive() {
        assert!(normalize_lines(&[line(1, 0), line(2, -1)]).is_empty());
    }
}
