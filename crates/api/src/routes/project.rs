//! Route definitions for the `/projects` resource and its milestones.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{milestone, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                   -> list      (scoped)
/// POST   /                                   -> create
/// GET    /stats/summary                      -> stats     (scoped)
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
/// POST   /{id}/milestone                     -> milestone::add
/// PUT    /{id}/milestone/{milestone_id}      -> milestone::update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/stats/summary", get(project::stats))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/milestone", post(milestone::add))
        .route("/{id}/milestone/{milestone_id}", put(milestone::update))
}
