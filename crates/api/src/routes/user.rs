//! Route definitions for the `/users` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /login              -> login            (public)
/// POST   /register-public    -> register_public  (public, pending approval)
/// POST   /register           -> register         (MoSJE-Admin)
/// GET    /me                 -> me
/// PUT    /me                 -> update_me
/// PUT    /password           -> change_password
/// GET    /                   -> list             (State-Admin or higher)
/// PUT    /{id}               -> update           (MoSJE-Admin)
/// DELETE /{id}               -> delete           (MoSJE-Admin)
/// PUT    /{id}/approve       -> approve          (MoSJE-Admin)
/// DELETE /{id}/reject        -> reject           (MoSJE-Admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(user::login))
        .route("/register-public", post(user::register_public))
        .route("/register", post(user::register))
        .route("/me", get(user::me).put(user::update_me))
        .route("/password", put(user::change_password))
        .route("/", get(user::list))
        .route("/{id}", put(user::update).delete(user::delete))
        .route("/{id}/approve", put(user::approve))
        .route("/{id}/reject", delete(user::reject))
}
