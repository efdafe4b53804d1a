//! The closed set of account roles.
//!
//! Labels must match the `chk_users_role` constraint in the users migration.

use crate::types::labeled_enum;

pub const ROLE_MOSJE_ADMIN: &str = "MoSJE-Admin";
pub const ROLE_STATE_ADMIN: &str = "State-Admin";
pub const ROLE_AGENCY_USER: &str = "Agency-User";

labeled_enum! {
    /// Account role. Decides both what a user may do and how their reads are scoped.
    Role, "role" {
        MosjeAdmin => "MoSJE-Admin",
        StateAdmin => "State-Admin",
        AgencyUser => "Agency-User",
    }
}

impl Role {
    /// Ministry-level administrator with unrestricted scope.
    pub fn is_ministry_admin(self) -> bool {
        self == Role::MosjeAdmin
    }

    /// `State-Admin` or higher.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::MosjeAdmin | Role::StateAdmin)
    }
}
