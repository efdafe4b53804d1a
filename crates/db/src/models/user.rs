//! User row model and DTOs.

use janconnect_core::roles::Role;
use janconnect_core::types::{DbId, Timestamp};
use janconnect_core::user::{UserProfile, UserSummary};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub agency_id: Option<DbId>,
    pub state: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            agency: self.agency_id,
            state: self.state.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// DTO for inserting a user. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub agency_id: Option<DbId>,
    pub state: Option<String>,
    pub is_active: bool,
}

/// DTO for an admin update. Values are final: the handler merges the patch
/// onto the stored row and normalises the role scope first.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub agency_id: Option<DbId>,
    pub state: Option<String>,
    pub is_active: bool,
}

/// `{id, name, email}` projection used when populating projects.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummaryRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

impl From<UserSummaryRow> for UserSummary {
    fn from(row: UserSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}
