//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use janconnect_core::access::Actor;
use janconnect_core::roles::Role;
use janconnect_core::types::DbId;
use janconnect_core::user::UserProfile;
use janconnect_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The account behind the request's `Authorization: Bearer <token>` header.
///
/// The user row is reloaded on every request, so deleted or deactivated
/// accounts are rejected even while their token is still valid.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<UserProfile>> {
///     tracing::info!(user_id = auth.user_id, role = %auth.role, "handling request");
///     Ok(Json(auth.profile))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    pub profile: UserProfile,
}

impl AuthUser {
    /// The caller as seen by the authorization rules.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            state: self.profile.state.clone(),
            agency: self.profile.agency,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::unauthorized("Not authorized, token failed")
        })?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        if !user.is_active {
            return Err(AppError::unauthorized("User account is inactive"));
        }

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
            profile: user.profile(),
        })
    }
}
