//! Handlers for the `/users` resource: authentication, self-service profile
//! and the ministry admin's account management.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use janconnect_core::error::CoreError;
use janconnect_core::patch::{keep_or, keep_or_clear};
use janconnect_core::roles::Role;
use janconnect_core::scope::UserQuery;
use janconnect_core::types::DbId;
use janconnect_core::user::{
    normalize_email, resolve_scope, LoginRequest, PasswordChange, ProfilePatch, RegisterRequest,
    RejectRequest, UserPatch, UserProfile, ValidRegistration,
};
use janconnect_core::validation::validate_account_email;
use janconnect_db::models::user::{CreateUser, UpdateUser, User};
use janconnect_db::repositories::{AgencyRepo, UserRepo};
use janconnect_events::{AccountEvent, Recipient};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireMinistryAdmin, RequireStateAdmin};
use crate::response::{AuthResponse, MessageResponse, UserMessageResponse};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_NOT_FOUND: &str = "User not found";
const ALREADY_ACTIVE: &str = "User is already active";

// ---------------------------------------------------------------------------
// Authentication & registration
// ---------------------------------------------------------------------------

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(AppError::validation("Please provide email and password"));
    };

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&email))
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let matches = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    if !user.is_active {
        return Err(AppError::unauthorized("User account is inactive"));
    }

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(auth_response(&state, &user)?))
}

/// POST /api/users/register
///
/// Admin-created accounts are active immediately.
pub async fn register(
    State(state): State<AppState>,
    RequireMinistryAdmin(admin): RequireMinistryAdmin,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let registration = input.into_valid()?;
    let user = create_account(&state, registration, true).await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        created_by = admin.user_id,
        "User registered by admin"
    );
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// POST /api/users/register-public
///
/// Self-registration creates an inactive account awaiting ministry approval.
pub async fn register_public(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserMessageResponse>)> {
    let registration = input.into_valid()?;
    if registration.role == Role::MosjeAdmin {
        return Err(AppError::validation(
            "Public registration is only available for Agency-User and State-Admin roles",
        ));
    }
    let user = create_account(&state, registration, false).await?;

    tracing::info!(user_id = user.id, role = %user.role, "Pending registration received");
    Ok((
        StatusCode::CREATED,
        Json(UserMessageResponse {
            message: "Registration successful. Your account is pending approval.".to_string(),
            user: user.profile(),
        }),
    ))
}

async fn create_account(
    state: &AppState,
    registration: ValidRegistration,
    is_active: bool,
) -> AppResult<User> {
    if let Some(agency_id) = registration.scope.agency {
        AgencyRepo::find_by_id(&state.pool, agency_id)
            .await?
            .ok_or_else(|| AppError::not_found("Agency not found"))?;
    }

    if UserRepo::find_by_email(&state.pool, &registration.email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("User already exists".to_string()).into());
    }

    let password_hash = hash_password(&registration.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    // A concurrent duplicate still trips uq_users_email and maps to the same 400.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            role: registration.role,
            agency_id: registration.scope.agency,
            state: registration.scope.state,
            is_active,
        },
    )
    .await?;
    Ok(user)
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = generate_access_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    Ok(AuthResponse {
        user: user.profile(),
        token,
    })
}

// ---------------------------------------------------------------------------
// Self-service
// ---------------------------------------------------------------------------

/// GET /api/users/me
pub async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(auth.profile)
}

/// PUT /api/users/me
///
/// Only name and email are self-editable; role and scope are admin-managed.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<ProfilePatch>,
) -> AppResult<Json<UserProfile>> {
    input.validate()?;
    let name = input.name.map(|n| n.trim().to_string());
    let email = input.email.as_deref().map(normalize_email);

    if let Some(email) = &email {
        if let Some(other) = UserRepo::find_by_email(&state.pool, email).await? {
            if other.id != auth.user_id {
                return Err(CoreError::Conflict("User already exists".to_string()).into());
            }
        }
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, name.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
    Ok(Json(user.profile()))
}

/// PUT /api/users/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<PasswordChange>,
) -> AppResult<Json<MessageResponse>> {
    let (current, new) = input.into_parts()?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    let matches = verify_password(&current, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    let password_hash = hash_password(&new)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    RequireStateAdmin(_): RequireStateAdmin,
    ApiQuery(params): ApiQuery<UserQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let users = UserRepo::list(&state.pool, &params).await?;
    Ok(Json(users.iter().map(User::profile).collect()))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireMinistryAdmin(admin): RequireMinistryAdmin,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UserPatch>,
) -> AppResult<Json<UserProfile>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    let mut name = user.name;
    let mut email = user.email;
    let mut role = user.role;
    let mut agency = user.agency_id;
    let mut user_state = user.state;
    let mut is_active = user.is_active;

    keep_or(&mut name, input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()));
    if let Some(new_email) = input.email {
        let new_email = normalize_email(&new_email);
        validate_account_email(&new_email).map_err(CoreError::Validation)?;
        email = new_email;
    }
    keep_or(&mut role, input.role);
    keep_or_clear(&mut agency, input.agency);
    keep_or_clear(&mut user_state, input.state);
    keep_or(&mut is_active, input.is_active);

    let scope = resolve_scope(role, agency, user_state)?;
    if let Some(agency_id) = scope.agency {
        AgencyRepo::find_by_id(&state.pool, agency_id)
            .await?
            .ok_or_else(|| AppError::not_found("Agency not found"))?;
    }

    let updated = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            name,
            email,
            role,
            agency_id: scope.agency,
            state: scope.state,
            is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");
    Ok(Json(updated.profile()))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireMinistryAdmin(admin): RequireMinistryAdmin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found(USER_NOT_FOUND));
    }
    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    Ok(Json(MessageResponse::new("User removed")))
}

/// PUT /api/users/{id}/approve
///
/// Activates a pending account and queues the approval email. The UPDATE is
/// conditional on the account being inactive, so only one of two racing
/// approvals succeeds and notifies.
pub async fn approve(
    State(state): State<AppState>,
    RequireMinistryAdmin(admin): RequireMinistryAdmin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<UserMessageResponse>> {
    let Some(user) = UserRepo::activate(&state.pool, id).await? else {
        return Err(pending_lookup_error(&state, id).await);
    };

    let recipient = recipient(&state, &user).await?;
    state.event_bus.publish(AccountEvent::approved(recipient));

    tracing::info!(user_id = id, approved_by = admin.user_id, "User approved");
    Ok(Json(UserMessageResponse {
        message: "User approved successfully".to_string(),
        user: user.profile(),
    }))
}

/// DELETE /api/users/{id}/reject
///
/// Deletes a pending account outright, then queues the rejection email.
/// The body `{"reason": "..."}` is optional.
pub async fn reject(
    State(state): State<AppState>,
    RequireMinistryAdmin(admin): RequireMinistryAdmin,
    ApiPath(id): ApiPath<DbId>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let input: RejectRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
    };

    // Resolve the agency name before the row disappears.
    let Some(pending) = UserRepo::find_by_id(&state.pool, id).await? else {
        return Err(AppError::not_found(USER_NOT_FOUND));
    };
    if pending.is_active {
        return Err(AppError::validation(ALREADY_ACTIVE));
    }
    let recipient = recipient(&state, &pending).await?;

    if UserRepo::delete_pending(&state.pool, id).await?.is_none() {
        return Err(pending_lookup_error(&state, id).await);
    }
    state
        .event_bus
        .publish(AccountEvent::rejected(recipient, input.reason));

    tracing::info!(user_id = id, rejected_by = admin.user_id, "User registration rejected");
    Ok(Json(MessageResponse::new("User registration rejected")))
}

/// Explain why a conditional write on a pending account matched nothing.
async fn pending_lookup_error(state: &AppState, id: DbId) -> AppError {
    match UserRepo::find_by_id(&state.pool, id).await {
        Ok(Some(_)) => AppError::validation(ALREADY_ACTIVE),
        Ok(None) => AppError::not_found(USER_NOT_FOUND),
        Err(e) => e.into(),
    }
}

/// Snapshot of the account for the notification, with the agency's display name.
async fn recipient(state: &AppState, user: &User) -> AppResult<Recipient> {
    let agency = match user.agency_id {
        Some(agency_id) => Some(
            AgencyRepo::find_by_id(&state.pool, agency_id)
                .await?
                .map(|a| a.name)
                .unwrap_or_else(|| agency_id.to_string()),
        ),
        None => None,
    };
    Ok(Recipient {
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        agency,
        state: user.state.clone(),
    })
}
