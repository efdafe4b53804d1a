//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use janconnect_core::access::{authorize, Operation, ProjectAccess, Target};
use janconnect_core::project::{NewProject, ProjectDetail, ProjectFields, ProjectPatch};
use janconnect_core::scope::{project_filter, ProjectQuery};
use janconnect_core::stats::ProjectStats;
use janconnect_core::types::DbId;
use janconnect_db::models::project::ProjectRow;
use janconnect_db::repositories::{AgencyRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStateAdmin;
use crate::response::MessageResponse;
use crate::state::AppState;

pub(crate) const PROJECT_NOT_FOUND: &str = "Project not found";
const AGENCIES_NOT_FOUND: &str = "One or both agencies not found";

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ProjectQuery>,
) -> AppResult<Json<Vec<ProjectDetail>>> {
    let filter = project_filter(&auth.actor(), query);
    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    Ok(Json(projects))
}

/// GET /api/projects/stats/summary
///
/// Aggregates over exactly the set `GET /api/projects` would return.
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ProjectQuery>,
) -> AppResult<Json<ProjectStats>> {
    let filter = project_filter(&auth.actor(), query);
    let stats = ProjectRepo::stats(&state.pool, &filter).await?;
    Ok(Json(stats))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let project = ProjectRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(PROJECT_NOT_FOUND))?;
    authorize(
        &auth.actor(),
        Operation::Read,
        &Target::Project(ProjectAccess {
            state: &project.state,
            implementing_agency: project.implementing_agency_id,
            executing_agency: project.executing_agency_id,
        }),
    )?;
    Ok(Json(project))
}

/// POST /api/projects
///
/// Role gate, then field checks, then the state check, then agency lookup.
pub async fn create(
    State(state): State<AppState>,
    RequireStateAdmin(auth): RequireStateAdmin,
    ApiJson(input): ApiJson<NewProject>,
) -> AppResult<(StatusCode, Json<ProjectDetail>)> {
    let (fields, milestones) = input.into_fields()?;
    authorize(&auth.actor(), Operation::Create, &target_of(&fields))?;
    ensure_agencies_exist(
        &state,
        &[fields.implementing_agency_id, fields.executing_agency_id],
    )
    .await?;

    let row = ProjectRepo::create(&state.pool, &fields, auth.user_id, &milestones).await?;
    tracing::info!(
        project_id = row.id,
        state = %row.state,
        milestones = milestones.len(),
        created_by = auth.user_id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(populate(&state, row).await?)))
}

/// PUT /api/projects/{id}
///
/// A State-Admin must own both the stored and the resulting state.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ProjectPatch>,
) -> AppResult<Json<ProjectDetail>> {
    let actor = auth.actor();
    let row = find_row(&state, id).await?;
    let mut fields = row.fields();
    authorize(&actor, Operation::Update, &target_of(&fields))?;

    let referenced = input.referenced_agencies();
    input.apply(&mut fields)?;
    if fields.state != row.state {
        authorize(&actor, Operation::Update, &target_of(&fields))?;
    }
    ensure_agencies_exist(&state, &referenced).await?;

    let updated = ProjectRepo::update(&state.pool, id, &fields, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(PROJECT_NOT_FOUND))?;
    tracing::info!(project_id = id, status = %updated.status, updated_by = auth.user_id, "Project updated");
    Ok(Json(populate(&state, updated).await?))
}

/// DELETE /api/projects/{id}
///
/// Milestones go with the project (ON DELETE CASCADE).
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let row = find_row(&state, id).await?;
    authorize(&auth.actor(), Operation::Delete, &target_of(&row.fields()))?;

    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found(PROJECT_NOT_FOUND));
    }
    tracing::info!(project_id = id, deleted_by = auth.user_id, "Project deleted");
    Ok(Json(MessageResponse::new("Project removed")))
}

pub(crate) fn target_of(fields: &ProjectFields) -> Target<'_> {
    Target::Project(ProjectAccess {
        state: &fields.state,
        implementing_agency: fields.implementing_agency_id,
        executing_agency: fields.executing_agency_id,
    })
}

pub(crate) async fn find_row(state: &AppState, id: DbId) -> AppResult<ProjectRow> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(PROJECT_NOT_FOUND))
}

/// Populate a freshly written row for the response.
pub(crate) async fn populate(state: &AppState, row: ProjectRow) -> AppResult<ProjectDetail> {
    ProjectRepo::populate(&state.pool, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalError("Populated project missing".to_string()))
}

async fn ensure_agencies_exist(state: &AppState, ids: &[DbId]) -> AppResult<()> {
    if ids.is_empty() || AgencyRepo::all_exist(&state.pool, ids).await? {
        Ok(())
    } else {
        Err(AppError::not_found(AGENCIES_NOT_FOUND))
    }
}
