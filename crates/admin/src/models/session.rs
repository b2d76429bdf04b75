//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use afrah_core::{Email, UserId};
use afrah_store::models::UserProfile;
use afrah_store::rules::Actor;

/// Session-stored admin identity.
///
/// Only proves who signed in. Whether they are still an admin is checked
/// against `shop.admin_flag` on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}

impl CurrentAdmin {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::Admin(self.id)
    }

    #[must_use]
    pub fn initials(&self) -> String {
        afrah_core::short_initials(&self.display_name)
    }
}

impl From<UserProfile> for CurrentAdmin {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// A toast to show on the next page render.
    pub const FLASH_TOAST: &str = "flash_toast";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new(7),
            email: Email::parse("nusrat@afrahorganic.com").unwrap(),
            display_name: "Nusrat Jahan".to_owned(),
        }
    }

    #[test]
    fn test_actor_is_admin() {
        assert_eq!(admin().actor(), Actor::Admin(UserId::new(7)));
        assert!(admin().actor().is_admin());
    }

    #[test]
    fn test_session_round_trip() {
        let json = serde_json::to_string(&admin()).unwrap();
        let back: CurrentAdmin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, admin());
        assert_eq!(back.initials(), "NJ");
    }
}
