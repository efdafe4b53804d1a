//! Role-gated extractors.
//!
//! Each extractor wraps [`AuthUser`] and asks the shared authorization rules
//! for a role-level answer. The user management routes use them, as do the
//! agency and project create routes; everything else authorizes per record.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use janconnect_core::access::{authorize, Operation, Target};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// MoSJE-Admin only. Rejects with 403 "Not authorized as admin".
///
/// ```ignore
/// async fn approve(RequireMinistryAdmin(admin): RequireMinistryAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireMinistryAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireMinistryAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user.actor(), Operation::Update, &Target::Users)?;
        Ok(RequireMinistryAdmin(user))
    }
}

/// State-Admin or MoSJE-Admin. Rejects with 403
/// "Not authorized as state admin or higher".
pub struct RequireStateAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireStateAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user.actor(), Operation::Read, &Target::Users)?;
        Ok(RequireStateAdmin(user))
    }
}
