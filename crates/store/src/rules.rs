//! Access rules for every record path.
//!
//! Handlers describe what they are about to touch as a [`DocPath`] plus an
//! [`Operation`] and ask [`authorize`] whether the current [`Actor`] may do
//! it. Denials are reported on the [`ErrorBus`](crate::ErrorBus).
//!
//! | path | get | list | create | update | delete |
//! |---|---|---|---|---|---|
//! | `products[/id]` | any | any | admin | admin | admin |
//! | `products/{id}/ratings` | - | - | user | user | - |
//! | `orders[/id]` | admin or owner | admin (users: own) | any | admin | admin |
//! | `contacts[/id]` | admin | admin | any | - | admin |
//! | `users/{uid}` | self or admin | admin | self | self or admin | admin |
//! | `users/{uid}/cart[/id]` | self | self | self | self | self |
//! | `users/{uid}/wishlist[/id]` | self | self | self | self | self |
//! | `admins[/uid]` | self or admin | admin | admin | admin | admin |

use core::fmt;

use serde::{Deserialize, Serialize};

use afrah_core::{CartItemId, MessageId, OrderId, ProductId, UserId};

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(UserId),
    /// A signed-in user whose admin flag is set.
    Admin(UserId),
}

impl Actor {
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) | Self::Admin(id) => Some(*id),
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    fn is(&self, uid: UserId) -> bool {
        self.user_id() == Some(uid)
    }
}

/// What is being done to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
    /// Create or update; allowed only when both are.
    Write,
}

impl Operation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record or collection path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocPath {
    Products,
    Product(ProductId),
    ProductRatings(ProductId),
    Orders,
    /// A single order; `owner` is the customer who placed it, if signed in.
    Order {
        id: OrderId,
        owner: Option<UserId>,
    },
    /// The orders placed by one customer.
    UserOrders(UserId),
    Contacts,
    Contact(MessageId),
    Users,
    User(UserId),
    Cart(UserId),
    CartItem(UserId, CartItemId),
    Wishlist(UserId),
    WishlistItem(UserId, ProductId),
    Admins,
    Admin(UserId),
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::Product(id) => write!(f, "products/{id}"),
            Self::ProductRatings(id) => write!(f, "products/{id}/ratings"),
            Self::Orders => f.write_str("orders"),
            Self::Order { id, .. } => write!(f, "orders/{id}"),
            Self::UserOrders(uid) => write!(f, "orders?userId={uid}"),
            Self::Contacts => f.write_str("contacts"),
            Self::Contact(id) => write!(f, "contacts/{id}"),
            Self::Users => f.write_str("users"),
            Self::User(uid) => write!(f, "users/{uid}"),
            Self::Cart(uid) => write!(f, "users/{uid}/cart"),
            Self::CartItem(uid, id) => write!(f, "users/{uid}/cart/{id}"),
            Self::Wishlist(uid) => write!(f, "users/{uid}/wishlist"),
            Self::WishlistItem(uid, id) => write!(f, "users/{uid}/wishlist/{id}"),
            Self::Admins => f.write_str("admins"),
            Self::Admin(uid) => write!(f, "admins/{uid}"),
        }
    }
}

/// Whether `actor` may perform `op` on `path`.
#[must_use]
pub fn authorize(actor: &Actor, path: &DocPath, op: Operation) -> bool {
    use Operation::{Create, Delete, Get, List, Update, Write};

    if op == Write {
        return authorize(actor, path, Create) && authorize(actor, path, Update);
    }

    let admin = actor.is_admin();
    let signed_in = actor.user_id().is_some();

    match path {
        DocPath::Products | DocPath::Product(_) => match op {
            Get | List => true,
            _ => admin,
        },
        DocPath::ProductRatings(_) => matches!(op, Create | Update) && signed_in,
        DocPath::Orders => match op {
            Create => true,
            List => admin,
            _ => false,
        },
        DocPath::Order { owner, .. } => match op {
            Get => admin || owner.is_some_and(|uid| actor.is(uid)),
            Create => true,
            Update | Delete => admin,
            _ => false,
        },
        DocPath::UserOrders(uid) => matches!(op, Get | List) && (admin || actor.is(*uid)),
        DocPath::Contacts => match op {
            Create => true,
            List => admin,
            _ => false,
        },
        DocPath::Contact(_) => match op {
            Get | Delete => admin,
            Create => true,
            _ => false,
        },
        DocPath::Users => op == List && admin,
        DocPath::User(uid) => match op {
            Get | Update => admin || actor.is(*uid),
            Create => actor.is(*uid),
            Delete => admin,
            _ => false,
        },
        DocPath::Cart(uid)
        | DocPath::CartItem(uid, _)
        | DocPath::Wishlist(uid)
        | DocPath::WishlistItem(uid, _) => actor.is(*uid),
        DocPath::Admins => op == List && admin,
        DocPath::Admin(uid) => match op {
            Get => admin || actor.is(*uid),
            _ => admin,
        },
    }
}
