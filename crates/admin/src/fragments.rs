//! Table fragments shared by full pages and the live views.
//!
//! Each page template includes its fragment, and the `/live/*` streams
//! render the same fragment on every change. Page structs carry the same
//! field names so the include resolves against either.

use askama::Template;
use askama_web::WebTemplate;
use sqlx::PgPool;

use afrah_core::UserId;
use afrah_store::models::{ContactMessage, Order, OrderStats, Product, UserProfile, UserWithRole};
use afrah_store::{ContactRepository, OrderRepository, RepositoryError, UserRepository};

/// Orders shown on the dashboard.
pub const RECENT_ORDERS: i64 = 5;

/// Dashboard figures plus the latest orders.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: OrderStats,
    pub recent: Vec<Order>,
}

impl Dashboard {
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn load(pool: &PgPool) -> Result<Self, RepositoryError> {
        let orders = OrderRepository::new(pool);
        Ok(Self {
            stats: orders.stats().await?,
            recent: orders.recent(RECENT_ORDERS).await?,
        })
    }

    #[must_use]
    pub fn revenue(&self) -> String {
        self.stats.revenue.display()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/dashboard.html")]
pub struct DashboardFragment {
    pub dashboard: Dashboard,
    pub live_error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/orders_table.html")]
pub struct OrdersFragment {
    pub orders: Vec<Order>,
    pub live_error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/products_table.html")]
pub struct ProductsFragment {
    pub products: Vec<Product>,
}

/// A user table row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub profile: UserProfile,
    pub is_admin: bool,
    pub initials: String,
}

impl From<UserWithRole> for UserRow {
    fn from(user: UserWithRole) -> Self {
        Self {
            initials: afrah_core::short_initials(&user.profile.display_name),
            profile: user.profile,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/users_table.html")]
pub struct UsersFragment {
    pub users: Vec<UserRow>,
    /// The signed-in admin, whose own access cannot be revoked here.
    pub me: UserId,
    pub live_error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/messages_list.html")]
pub struct MessagesFragment {
    pub messages: Vec<ContactMessage>,
    pub live_error: Option<String>,
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn load_orders(pool: &PgPool) -> Result<Vec<Order>, RepositoryError> {
    OrderRepository::new(pool).list().await
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn load_users(pool: &PgPool) -> Result<Vec<UserRow>, RepositoryError> {
    let users = UserRepository::new(pool).list_with_roles().await?;
    Ok(users.into_iter().map(UserRow::from).collect())
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn load_messages(pool: &PgPool) -> Result<Vec<ContactMessage>, RepositoryError> {
    ContactRepository::new(pool).list().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use afrah_core::{Email, MessageId};

    use super::*;

    fn user(id: i32, name: &str, is_admin: bool) -> UserRow {
        UserWithRole {
            profile: UserProfile {
                id: UserId::new(id),
                display_name: name.to_owned(),
                email: Email::parse(&format!("user{id}@example.com")).unwrap(),
                photo_url: None,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            },
            is_admin,
        }
        .into()
    }

    #[test]
    fn test_users_fragment_hides_self_revoke() {
        let html = UsersFragment {
            users: vec![user(1, "Afrah Owner", true), user(2, "Karim Ahmed", false)],
            me: UserId::new(1),
            live_error: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("Karim Ahmed"));
        assert!(html.contains("KA"));
        assert!(html.contains("Make Admin"));
        assert!(!html.contains("Remove Admin"));
    }

    #[test]
    fn test_messages_fragment_empty_and_error() {
        let html = MessagesFragment {
            messages: Vec::new(),
            live_error: Some("connection reset".to_owned()),
        }
        .render()
        .unwrap();
        assert!(html.contains("No messages yet."));
        assert!(html.contains("connection reset"));
    }

    #[test]
    fn test_messages_fragment_lists_sender() {
        let html = MessagesFragment {
            messages: vec![ContactMessage {
                id: MessageId::new(3),
                name: "Sadia Islam".to_owned(),
                email: "sadia@example.com".to_owned(),
                phone: None,
                subject: "Bulk order".to_owned(),
                message: "Do you deliver to Sylhet?".to_owned(),
                created_at: Utc.with_ymd_and_hms(2025, 5, 2, 10, 30, 0).unwrap(),
            }],
            live_error: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("Sadia Islam"));
        assert!(html.contains("/messages/3/delete"));
        assert!(html.contains("May 2, 2025"));
    }

    #[test]
    fn test_dashboard_fragment_shows_revenue() {
        let html = DashboardFragment {
            dashboard: Dashboard {
                stats: OrderStats {
                    total_orders: 12,
                    pending_orders: 3,
                    revenue: afrah_core::Taka::from_whole(18_500),
                    product_count: 40,
                    user_count: 9,
                    message_count: 2,
                },
                recent: Vec::new(),
            },
            live_error: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("৳18500.00"));
        assert!(html.contains("No orders yet."));
    }
}
