//! Route definitions for the `/agencies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::agency;
use crate::state::AppState;

/// Routes mounted at `/agencies`.
///
/// ```text
/// GET    /          -> list        (scoped)
/// POST   /          -> create
/// GET    /public    -> list_public (unauthenticated)
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(agency::list).post(agency::create))
        .route("/public", get(agency::list_public))
        .route(
            "/{id}",
            get(agency::get_by_id)
                .put(agency::update)
                .delete(agency::delete),
        )
}
