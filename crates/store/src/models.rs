//! Records read from and written to the `shop` schema.

use chrono::{DateTime, Utc};
use serde::Serialize;

use afrah_core::{
    CartItemId, Email, MessageId, OrderId, OrderItemId, OrderStatus, PaymentMethod, Phone,
    ProductId, RatingAggregate, Taka, UserId,
};

use crate::RepositoryError;

/// Image shown when a product has no images.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.jpg";

/// A catalog product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Category display name.
    pub category: String,
    /// Image URLs; the first is the main image.
    pub images: Vec<String>,
    pub price: Taka,
    pub original_price: Option<Taka>,
    pub stock: i32,
    pub is_new: bool,
    pub rating_total: i32,
    pub rating_count: i32,
    pub sales: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn rating(&self) -> RatingAggregate {
        RatingAggregate::new(self.rating_total, self.rating_count)
    }

    #[must_use]
    pub fn main_image(&self) -> &str {
        self.images.first().map_or(PLACEHOLDER_IMAGE, String::as_str)
    }

    /// The crossed-out price, shown only when it is above the current price.
    #[must_use]
    pub fn compare_at(&self) -> Option<Taka> {
        self.original_price.filter(|original| *original > self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields an admin edits on the product form. The slug is derived from the
/// name; ratings and sales are never touched by the form.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub price: Taka,
    pub original_price: Option<Taka>,
    pub stock: i32,
    pub is_new: bool,
}

/// A placed order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub total_price: Taka,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// `"Premium Ajwa Dates"` or `"Premium Ajwa Dates + 2 more"`.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.items.as_slice() {
            [] => String::new(),
            [only] => only.product_name.clone(),
            [first, rest @ ..] => format!("{} + {} more", first.product_name, rest.len()),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Raw `customer_order` row; statuses are stored as text.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub payment_method: String,
    pub status: String,
    pub total_price: Taka,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub(crate) fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let payment_method = self.payment_method.parse().map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "invalid payment method in database: {}",
                self.payment_method
            ))
        })?;
        let status = self.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("{e} in database"))
        })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            address: self.address,
            phone: self.phone,
            payment_method,
            status,
            total_price: self.total_price,
            created_at: self.created_at,
            items,
        })
    }
}

/// One line of an order. The product name and unit price are copied at
/// checkout so later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Taka,
    pub quantity: i32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Taka {
        self.unit_price * self.quantity
    }
}

/// Customer details entered at checkout.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub address: String,
    pub phone: Phone,
    pub payment_method: PaymentMethod,
}

/// A product and quantity to order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Dashboard figures.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    /// Sum of all orders except cancelled ones.
    pub revenue: Taka,
    pub product_count: i64,
    pub user_count: i64,
    pub message_count: i64,
}

/// A contact form submission.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub subject: String,
    pub message: String,
}

/// A customer profile.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: Email,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A profile with its password hash, for login only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub password_hash: String,
}

/// A profile with its admin flag, for the back-office user list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserWithRole {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub is_admin: bool,
}

/// A cart entry joined with its product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub cart_item_id: CartItemId,
    pub quantity: i32,
    #[sqlx(flatten)]
    pub product: Product,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Taka {
        self.product.price * self.quantity
    }
}

/// Cart total: Σ price × quantity.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Taka {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: i64, original: Option<i64>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Medjool Dates".to_owned(),
            slug: "medjool-dates".to_owned(),
            description: "Soft and sweet.".to_owned(),
            category: "Dates".to_owned(),
            images: vec![],
            price: Taka::from_whole(price),
            original_price: original.map(Taka::from_whole),
            stock: 3,
            is_new: false,
            rating_total: 0,
            rating_count: 0,
            sales: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(name: &str, price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: None,
            product_name: name.to_owned(),
            unit_price: Taka::from_whole(price),
            quantity,
        }
    }

    #[test]
    fn test_compare_at_only_when_discounted() {
        assert_eq!(product(500, Some(650)).compare_at(), Some(Taka::from_whole(650)));
        assert_eq!(product(500, Some(400)).compare_at(), None);
        assert_eq!(product(500, None).compare_at(), None);
    }

    #[test]
    fn test_main_image_falls_back() {
        let mut p = product(1, None);
        assert_eq!(p.main_image(), PLACEHOLDER_IMAGE);
        p.images = vec!["https://img/a.jpg".to_owned(), "https://img/b.jpg".to_owned()];
        assert_eq!(p.main_image(), "https://img/a.jpg");
    }

    #[test]
    fn test_cart_total() {
        let lines = vec![
            CartLine {
                cart_item_id: CartItemId::new(1),
                quantity: 2,
                product: product(450, None),
            },
            CartLine {
                cart_item_id: CartItemId::new(2),
                quantity: 1,
                product: product(120, None),
            },
        ];
        assert_eq!(cart_total(&lines).display(), "৳1020.00");
    }

    #[test]
    fn test_order_summary() {
        let row = OrderRow {
            id: OrderId::new(3),
            user_id: None,
            customer_name: "Sadia".to_owned(),
            address: "House 4, Road 2, Dhanmondi".to_owned(),
            phone: "01712345678".to_owned(),
            payment_method: "nagad".to_owned(),
            status: "Shipped".to_owned(),
            total_price: Taka::from_whole(900),
            created_at: Utc::now(),
        };
        let order = row
            .into_order(vec![item("Pure Gur", 300, 2), item("Chia Seeds", 150, 2)])
            .unwrap();
        assert_eq!(order.summary(), "Pure Gur + 1 more");
        assert_eq!(order.item_count(), 4);
        assert_eq!(order.items[0].line_total(), Taka::from_whole(600));
    }

    #[test]
    fn test_corrupt_status_is_reported() {
        let row = OrderRow {
            id: OrderId::new(3),
            user_id: None,
            customer_name: String::new(),
            address: String::new(),
            phone: String::new(),
            payment_method: "cod".to_owned(),
            status: "Lost".to_owned(),
            total_price: Taka::ZERO,
            created_at: Utc::now(),
        };
        assert!(matches!(
            row.into_order(vec![]),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
