//! Response bodies shared across handlers.

use janconnect_core::user::UserProfile;
use serde::Serialize;

/// `{"message": "..."}` acknowledgement, e.g. "Project removed".
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login and admin-registration response: the profile fields plus the bearer token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

/// A message plus the affected account (public registration, approval).
#[derive(Debug, Serialize)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: UserProfile,
}
