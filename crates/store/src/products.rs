//! Product repository.

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::{ProductId, create_slug};

use crate::RepositoryError;
use crate::models::{Product, ProductInput};

/// Column list for [`Product`], qualified with the `p` alias.
macro_rules! product_columns {
    () => {
        "p.id, p.name, p.slug, p.description, p.category, p.images, p.price, \
         p.original_price, p.stock, p.is_new, p.rating_total, p.rating_count, p.sales, \
         p.created_at, p.updated_at"
    };
}
pub(crate) use product_columns;

/// Repository for catalog reads and admin product edits.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Products in one category (by display name), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p WHERE p.category = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Top sellers by `sales`, descending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn best_sellers(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p ORDER BY p.sales DESC, p.id ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Fetch several products by id. Missing ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM shop.product p WHERE p.id = ANY($1) ORDER BY p.name"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Create a product. The slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another product has the same slug.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "INSERT INTO shop.product AS p \
             (name, slug, description, category, images, price, original_price, stock, is_new) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            product_columns!()
        ))
        .bind(&input.name)
        .bind(create_slug(&input.name))
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.images)
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.stock)
        .bind(input.is_new)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "a product with this name"))?;
        Ok(product)
    }

    /// Update the editable fields. Rating sum/count and sales are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(concat!(
            "UPDATE shop.product AS p SET \
             name = $2, slug = $3, description = $4, category = $5, images = $6, \
             price = $7, original_price = $8, stock = $9, is_new = $10, updated_at = now() \
             WHERE p.id = $1 RETURNING ",
            product_columns!()
        ))
        .bind(id)
        .bind(&input.name)
        .bind(create_slug(&input.name))
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.images)
        .bind(input.price)
        .bind(input.original_price)
        .bind(input.stock)
        .bind(input.is_new)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "a product with this name"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
