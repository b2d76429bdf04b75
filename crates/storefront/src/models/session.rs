//! Types stored in the session.

use serde::{Deserialize, Serialize};

use afrah_core::{Email, UserId};
use afrah_store::models::UserProfile;
use afrah_store::rules::Actor;

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::User(self.id)
    }

    /// Header avatar text.
    #[must_use]
    pub fn initials(&self) -> String {
        afrah_core::short_initials(&self.display_name)
    }
}

/// The rules actor for an optional signed-in user.
#[must_use]
pub fn actor_of(user: Option<&CurrentUser>) -> Actor {
    user.map_or(Actor::Anonymous, CurrentUser::actor)
}

impl From<UserProfile> for CurrentUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
        }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// A toast to show on the next page render.
    pub const FLASH_TOAST: &str = "flash_toast";
}
