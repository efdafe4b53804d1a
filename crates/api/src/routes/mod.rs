pub mod agency;
pub mod health;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /users       auth, profile and account administration
/// /agencies    agency registry
/// /projects    projects, milestones and stats
/// /health      liveness + database check
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user::router())
        .nest("/agencies", agency::router())
        .nest("/projects", project::router())
        .merge(health::router())
}
