//! First-run creation of a ministry administrator.
//!
//! Every other account needs an admin to exist (to register or approve it),
//! so a fresh database gets one MoSJE-Admin from the environment.

use janconnect_core::roles::Role;
use janconnect_core::user::normalize_email;
use janconnect_core::validation::{validate_account_email, validate_password_strength};
use janconnect_db::models::user::CreateUser;
use janconnect_db::repositories::UserRepo;
use janconnect_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

const DEFAULT_ADMIN_NAME: &str = "MoSJE Administrator";

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl BootstrapAdmin {
    /// Read the bootstrap account from the environment.
    ///
    /// | Env Var                    | Required | Default               |
    /// |----------------------------|----------|-----------------------|
    /// | `BOOTSTRAP_ADMIN_EMAIL`    | yes      | --                    |
    /// | `BOOTSTRAP_ADMIN_PASSWORD` | yes      | --                    |
    /// | `BOOTSTRAP_ADMIN_NAME`     | no       | `MoSJE Administrator` |
    ///
    /// Returns `None` unless both email and password are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("BOOTSTRAP_ADMIN_EMAIL")
            .ok()
            .filter(|e| !e.trim().is_empty())?;
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())?;
        let name =
            std::env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.into());
        Some(Self {
            name,
            email,
            password,
        })
    }
}

/// Create the bootstrap admin unless a MoSJE-Admin already exists.
///
/// Returns `true` if an account was created.
pub async fn ensure_ministry_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::exists_with_role(pool, Role::MosjeAdmin).await? {
        tracing::debug!("MoSJE-Admin present, skipping bootstrap");
        return Ok(false);
    }

    validate_account_email(&admin.email).map_err(AppError::InternalError)?;
    validate_password_strength(&admin.password).map_err(AppError::InternalError)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: admin.name.clone(),
            email: normalize_email(&admin.email),
            password_hash,
            role: Role::MosjeAdmin,
            agency_id: None,
            state: None,
            is_active: true,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap MoSJE-Admin created");
    Ok(true)
}
