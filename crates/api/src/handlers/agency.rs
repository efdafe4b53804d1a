//! Handlers for the `/agencies` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use janconnect_core::access::{authorize, Operation, Target};
use janconnect_core::agency::{Agency, AgencyFields, AgencyPatch, NewAgency, PublicAgency};
use janconnect_core::scope::{agency_filter, AgencyQuery};
use janconnect_core::types::DbId;
use janconnect_db::repositories::AgencyRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStateAdmin;
use crate::response::MessageResponse;
use crate::state::AppState;

const AGENCY_NOT_FOUND: &str = "Agency not found";

/// GET /api/agencies
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<AgencyQuery>,
) -> AppResult<Json<Vec<Agency>>> {
    let filter = agency_filter(&auth.actor(), query);
    let agencies = AgencyRepo::list(&state.pool, &filter).await?;
    Ok(Json(agencies.into_iter().map(Agency::from).collect()))
}

/// GET /api/agencies/public
///
/// Active agencies for the registration picker. Unauthenticated.
pub async fn list_public(State(state): State<AppState>) -> AppResult<Json<Vec<PublicAgency>>> {
    let agencies = AgencyRepo::list_active(&state.pool).await?;
    Ok(Json(
        agencies
            .into_iter()
            .map(|row| PublicAgency::from(&Agency::from(row)))
            .collect(),
    ))
}

/// GET /api/agencies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Agency>> {
    let agency = find(&state, id).await?;
    authorize(
        &auth.actor(),
        Operation::Read,
        &Target::Agency {
            id: Some(agency.id),
            state: &agency.state,
        },
    )?;
    Ok(Json(agency))
}

/// POST /api/agencies
///
/// Agency-Users are turned away before the body is looked at.
pub async fn create(
    State(state): State<AppState>,
    RequireStateAdmin(auth): RequireStateAdmin,
    ApiJson(input): ApiJson<NewAgency>,
) -> AppResult<(StatusCode, Json<Agency>)> {
    let fields = input.into_fields()?;
    authorize(
        &auth.actor(),
        Operation::Create,
        &Target::Agency {
            id: None,
            state: &fields.state,
        },
    )?;

    let agency = Agency::from(AgencyRepo::create(&state.pool, &fields).await?);
    tracing::info!(agency_id = agency.id, state = %agency.state, created_by = auth.user_id, "Agency created");
    Ok((StatusCode::CREATED, Json(agency)))
}

/// PUT /api/agencies/{id}
///
/// A State-Admin must own both the stored and the resulting state.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<AgencyPatch>,
) -> AppResult<Json<Agency>> {
    let actor = auth.actor();
    let agency = find(&state, id).await?;
    authorize(
        &actor,
        Operation::Update,
        &Target::Agency {
            id: Some(id),
            state: &agency.state,
        },
    )?;

    let mut fields = AgencyFields::from(&agency);
    input.apply(&mut fields)?;
    if fields.state != agency.state {
        authorize(
            &actor,
            Operation::Update,
            &Target::Agency {
                id: Some(id),
                state: &fields.state,
            },
        )?;
    }

    let updated = AgencyRepo::update(&state.pool, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found(AGENCY_NOT_FOUND))?;
    tracing::info!(agency_id = id, updated_by = auth.user_id, "Agency updated");
    Ok(Json(Agency::from(updated)))
}

/// DELETE /api/agencies/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let agency = find(&state, id).await?;
    authorize(
        &auth.actor(),
        Operation::Delete,
        &Target::Agency {
            id: Some(id),
            state: &agency.state,
        },
    )?;

    if !AgencyRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found(AGENCY_NOT_FOUND));
    }
    tracing::info!(agency_id = id, deleted_by = auth.user_id, "Agency deleted");
    Ok(Json(MessageResponse::new("Agency removed")))
}

async fn find(state: &AppState, id: DbId) -> AppResult<Agency> {
    AgencyRepo::find_by_id(&state.pool, id)
        .await?
        .map(Agency::from)
        .ok_or_else(|| AppError::not_found(AGENCY_NOT_FOUND))
}
