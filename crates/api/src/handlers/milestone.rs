//! Handlers for milestones, nested under `/projects/{id}/milestone`.
//!
//! Both operations respond with the whole populated project, as the tracker
//! re-renders the project after every milestone change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use janconnect_core::access::{authorize, Operation};
use janconnect_core::milestone::apply_status;
use janconnect_core::patch::keep_or_clear;
use janconnect_core::project::{MilestonePatch, NewMilestone, ProjectDetail};
use janconnect_core::types::DbId;
use janconnect_db::models::milestone::UpdateMilestone;
use janconnect_db::repositories::MilestoneRepo;

use super::project::{find_row, populate, target_of};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const MILESTONE_NOT_FOUND: &str = "Milestone not found";

/// POST /api/projects/{id}/milestone
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(project_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<NewMilestone>,
) -> AppResult<(StatusCode, Json<ProjectDetail>)> {
    let row = find_row(&state, project_id).await?;
    authorize(&auth.actor(), Operation::AddMilestone, &target_of(&row.fields()))?;
    let (description, deadline) = input.validate()?;

    let milestone =
        MilestoneRepo::create(&state.pool, project_id, &description, deadline, auth.user_id)
            .await?;
    tracing::info!(project_id, milestone_id = milestone.id, added_by = auth.user_id, "Milestone added");

    let row = find_row(&state, project_id).await?;
    Ok((StatusCode::CREATED, Json(populate(&state, row).await?)))
}

/// PUT /api/projects/{id}/milestone/{milestone_id}
///
/// Completing a milestone stamps `completedDate` once; reverting to Pending
/// keeps the stamp.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((project_id, milestone_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<MilestonePatch>,
) -> AppResult<Json<ProjectDetail>> {
    let row = find_row(&state, project_id).await?;
    authorize(&auth.actor(), Operation::UpdateMilestone, &target_of(&row.fields()))?;

    let current = MilestoneRepo::find(&state.pool, project_id, milestone_id)
        .await?
        .ok_or_else(|| AppError::not_found(MILESTONE_NOT_FOUND))?;

    let (status, completed_date) =
        apply_status(current.status, current.completed_date, input.status, Utc::now());
    let mut evidence_url = current.evidence_url;
    let mut remarks = current.remarks;
    keep_or_clear(&mut evidence_url, input.evidence_url);
    keep_or_clear(&mut remarks, input.remarks);

    MilestoneRepo::update(
        &state.pool,
        project_id,
        milestone_id,
        &UpdateMilestone {
            status,
            completed_date,
            evidence_url,
            remarks,
        },
        auth.user_id,
    )
    .await?
    .ok_or_else(|| AppError::not_found(MILESTONE_NOT_FOUND))?;
    tracing::info!(project_id, milestone_id, status = %status, updated_by = auth.user_id, "Milestone updated");

    let row = find_row(&state, project_id).await?;
    Ok(Json(populate(&state, row).await?))
}
