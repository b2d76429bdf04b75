//! Template view models shared by several pages.

use sqlx::PgPool;

use afrah_core::{ProductId, RatingAggregate, Stars};
use afrah_store::WishlistRepository;
use afrah_store::models::Product;

use crate::models::CurrentUser;

/// A product tile with the viewer's wishlist state.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub product: Product,
    pub wishlisted: bool,
}

impl ProductCard {
    #[must_use]
    pub fn list(products: Vec<Product>, wishlist: &[ProductId]) -> Vec<Self> {
        products
            .into_iter()
            .map(|product| Self {
                wishlisted: wishlist.contains(&product.id),
                product,
            })
            .collect()
    }

    /// `"-20%"` when the product is discounted.
    #[must_use]
    pub fn discount_label(&self) -> Option<String> {
        let original = self.product.compare_at()?.amount();
        let price = self.product.price.amount();
        let percent = ((original - price) / original * rust_decimal::Decimal::ONE_HUNDRED).round();
        Some(format!("-{percent}%"))
    }
}

/// Heart toggle on product cards and the product page.
#[derive(Debug, Clone, Copy)]
pub struct WishlistButton {
    pub product_id: ProductId,
    pub wishlisted: bool,
}

impl ProductCard {
    #[must_use]
    pub const fn wishlist_button(&self) -> WishlistButton {
        WishlistButton {
            product_id: self.product.id,
            wishlisted: self.wishlisted,
        }
    }
}

/// Star rating widget on the product page.
#[derive(Debug, Clone)]
pub struct RatingView {
    pub slug: String,
    pub aggregate: RatingAggregate,
    /// The viewer's own rating.
    pub mine: Option<Stars>,
    pub signed_in: bool,
}

/// One of the five stars in a [`RatingView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarSlot {
    pub value: u8,
    pub filled: bool,
}

impl RatingView {
    /// Stars filled up to the viewer's rating, or the rounded average when
    /// they have not rated.
    #[must_use]
    pub fn slots(&self) -> Vec<StarSlot> {
        let filled = self
            .mine
            .map_or_else(|| self.aggregate.rounded_stars(), Stars::get);
        (1..=5)
            .map(|value| StarSlot {
                value,
                filled: value <= filled,
            })
            .collect()
    }
}

/// Ids of the products on the viewer's wishlist; empty when signed out or
/// when the lookup fails.
pub async fn wishlist_ids(pool: &PgPool, user: Option<&CurrentUser>) -> Vec<ProductId> {
    let Some(user) = user else {
        return Vec::new();
    };
    WishlistRepository::new(pool)
        .product_ids(user.id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load wishlist ids");
            Vec::new()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use afrah_core::Taka;

    use super::*;

    fn product(id: i32, price: i64, original: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: "Medjool Dates".to_owned(),
            slug: "medjool-dates".to_owned(),
            description: "Soft and rich.".to_owned(),
            category: "Dates".to_owned(),
            images: Vec::new(),
            price: Taka::from_whole(price),
            original_price: original.map(Taka::from_whole),
            stock: 10,
            is_new: false,
            rating_total: 0,
            rating_count: 0,
            sales: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cards_mark_wishlisted() {
        let cards = ProductCard::list(
            vec![product(1, 100, None), product(2, 200, None)],
            &[ProductId::new(2)],
        );
        assert!(!cards[0].wishlisted);
        assert!(cards[1].wishlisted);
    }

    #[test]
    fn test_rating_slots_prefer_own_rating() {
        let mut view = RatingView {
            slug: "medjool-dates".to_owned(),
            aggregate: RatingAggregate::new(9, 2),
            mine: None,
            signed_in: true,
        };
        let filled = |v: &RatingView| v.slots().iter().filter(|s| s.filled).count();
        assert_eq!(filled(&view), 5);

        view.mine = Some(Stars::new(2).unwrap());
        assert_eq!(filled(&view), 2);
        assert_eq!(view.slots().len(), 5);
    }

    #[test]
    fn test_discount_label() {
        let cards = ProductCard::list(
            vec![product(1, 800, Some(1000)), product(2, 500, Some(400))],
            &[],
        );
        assert_eq!(cards[0].discount_label().as_deref(), Some("-20%"));
        assert_eq!(cards[1].discount_label(), None);
    }
}
