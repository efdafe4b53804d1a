//! Async actions: dispatch `Pending`, call the API, then dispatch the result
//! or the server's error message into the owning slice.
//!
//! Every thunk also returns the error so callers can branch on it.

use std::future::Future;

use janconnect_core::agency::{AgencyPatch, NewAgency};
use janconnect_core::milestone::Milestone;
use janconnect_core::project::{MilestonePatch, NewMilestone, NewProject, ProjectPatch};
use janconnect_core::scope::{AgencyQuery, ProjectQuery, UserQuery};
use janconnect_core::types::DbId;
use janconnect_core::user::{ProfilePatch, RegisterRequest, UserPatch};

use crate::analytics::toggle_patch;
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::store::{Action, AgencyAction, AuthAction, ProjectAction, Store, UserAction};

#[derive(Debug, Clone, Copy)]
enum Slice {
    Auth,
    Projects,
    Agencies,
    Users,
}

impl Slice {
    fn pending(self) -> Action {
        match self {
            Slice::Auth => Action::Auth(AuthAction::Pending),
            Slice::Projects => Action::Projects(ProjectAction::Pending),
            Slice::Agencies => Action::Agencies(AgencyAction::Pending),
            Slice::Users => Action::Users(UserAction::Pending),
        }
    }

    fn failed(self, message: String) -> Action {
        match self {
            Slice::Auth => Action::Auth(AuthAction::Failed(message)),
            Slice::Projects => Action::Projects(ProjectAction::Failed(message)),
            Slice::Agencies => Action::Agencies(AgencyAction::Failed(message)),
            Slice::Users => Action::Users(UserAction::Failed(message)),
        }
    }
}

async fn track<T>(
    store: &mut Store,
    slice: Slice,
    request: impl Future<Output = Result<T, ClientError>>,
    done: impl FnOnce(T) -> Action,
) -> Result<(), ClientError> {
    store.dispatch(slice.pending());
    match request.await {
        Ok(value) => {
            store.dispatch(done(value));
            Ok(())
        }
        Err(e) => {
            tracing::warn!(?slice, error = %e, "request failed");
            store.dispatch(slice.failed(e.message()));
            Err(e)
        }
    }
}

// ---- auth ---------------------------------------------------------------

/// Log in and keep the token on `api` for later calls.
pub async fn login(
    api: &mut ApiClient,
    store: &mut Store,
    email: &str,
    password: &str,
) -> Result<(), ClientError> {
    store.dispatch(Slice::Auth.pending());
    match api.login(email, password).await {
        Ok(session) => {
            api.set_token(Some(session.token.clone()));
            store.dispatch(Action::Auth(AuthAction::LoggedIn(session)));
            Ok(())
        }
        Err(e) => {
            store.dispatch(Slice::Auth.failed(e.message()));
            Err(e)
        }
    }
}

pub fn logout(api: &mut ApiClient, store: &mut Store) {
    api.set_token(None);
    store.dispatch(Action::Auth(AuthAction::LoggedOut));
}

/// Public signup. Does not log in: the account awaits approval.
pub async fn register_public(
    api: &ApiClient,
    store: &mut Store,
    req: &RegisterRequest,
) -> Result<(), ClientError> {
    track(store, Slice::Auth, api.register_public(req), |r| {
        Action::Auth(AuthAction::Registered(r.message))
    })
    .await
}

pub async fn load_profile(api: &ApiClient, store: &mut Store) -> Result<(), ClientError> {
    track(store, Slice::Auth, api.me(), |u| {
        Action::Auth(AuthAction::ProfileLoaded(u))
    })
    .await
}

pub async fn update_profile(
    api: &ApiClient,
    store: &mut Store,
    patch: &ProfilePatch,
) -> Result<(), ClientError> {
    track(store, Slice::Auth, api.update_me(patch), |u| {
        Action::Auth(AuthAction::ProfileLoaded(u))
    })
    .await
}

// ---- projects -----------------------------------------------------------

pub async fn fetch_projects(
    api: &ApiClient,
    store: &mut Store,
    query: &ProjectQuery,
) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.list_projects(query), |p| {
        Action::Projects(ProjectAction::Loaded(p))
    })
    .await
}

pub async fn fetch_project(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.get_project(id), |p| {
        Action::Projects(ProjectAction::LoadedOne(p))
    })
    .await
}

pub async fn fetch_stats(
    api: &ApiClient,
    store: &mut Store,
    query: &ProjectQuery,
) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.project_stats(query), |s| {
        Action::Projects(ProjectAction::StatsLoaded(s))
    })
    .await
}

pub async fn create_project(
    api: &ApiClient,
    store: &mut Store,
    project: &NewProject,
) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.create_project(project), |p| {
        Action::Projects(ProjectAction::Created(p))
    })
    .await
}

pub async fn update_project(
    api: &ApiClient,
    store: &mut Store,
    id: DbId,
    patch: &ProjectPatch,
) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.update_project(id, patch), |p| {
        Action::Projects(ProjectAction::Updated(p))
    })
    .await
}

pub async fn delete_project(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    track(store, Slice::Projects, api.delete_project(id), |_| {
        Action::Projects(ProjectAction::Deleted(id))
    })
    .await
}

pub async fn add_milestone(
    api: &ApiClient,
    store: &mut Store,
    project_id: DbId,
    milestone: &NewMilestone,
) -> Result<(), ClientError> {
    track(
        store,
        Slice::Projects,
        api.add_milestone(project_id, milestone),
        |p| Action::Projects(ProjectAction::Updated(p)),
    )
    .await
}

pub async fn update_milestone(
    api: &ApiClient,
    store: &mut Store,
    project_id: DbId,
    milestone_id: DbId,
    patch: &MilestonePatch,
) -> Result<(), ClientError> {
    track(
        store,
        Slice::Projects,
        api.update_milestone(project_id, milestone_id, patch),
        |p| Action::Projects(ProjectAction::Updated(p)),
    )
    .await
}

/// Flip a milestone between Pending and Completed.
pub async fn toggle_milestone(
    api: &ApiClient,
    store: &mut Store,
    milestone: &Milestone,
) -> Result<(), ClientError> {
    update_milestone(
        api,
        store,
        milestone.project_id,
        milestone.id,
        &toggle_patch(milestone),
    )
    .await
}

// ---- agencies -----------------------------------------------------------

pub async fn fetch_agencies(
    api: &ApiClient,
    store: &mut Store,
    query: &AgencyQuery,
) -> Result<(), ClientError> {
    track(store, Slice::Agencies, api.list_agencies(query), |a| {
        Action::Agencies(AgencyAction::Loaded(a))
    })
    .await
}

pub async fn fetch_agency(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    track(store, Slice::Agencies, api.get_agency(id), |a| {
        Action::Agencies(AgencyAction::LoadedOne(a))
    })
    .await
}

pub async fn create_agency(
    api: &ApiClient,
    store: &mut Store,
    agency: &NewAgency,
) -> Result<(), ClientError> {
    track(store, Slice::Agencies, api.create_agency(agency), |a| {
        Action::Agencies(AgencyAction::Created(a))
    })
    .await
}

pub async fn update_agency(
    api: &ApiClient,
    store: &mut Store,
    id: DbId,
    patch: &AgencyPatch,
) -> Result<(), ClientError> {
    track(store, Slice::Agencies, api.update_agency(id, patch), |a| {
        Action::Agencies(AgencyAction::Updated(a))
    })
    .await
}

pub async fn delete_agency(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    track(store, Slice::Agencies, api.delete_agency(id), |_| {
        Action::Agencies(AgencyAction::Deleted(id))
    })
    .await
}

// ---- users --------------------------------------------------------------

pub async fn fetch_users(
    api: &ApiClient,
    store: &mut Store,
    query: &UserQuery,
) -> Result<(), ClientError> {
    track(store, Slice::Users, api.list_users(query), |u| {
        Action::Users(UserAction::Loaded(u))
    })
    .await
}

pub async fn update_user(
    api: &ApiClient,
    store: &mut Store,
    id: DbId,
    patch: &UserPatch,
) -> Result<(), ClientError> {
    track(store, Slice::Users, api.update_user(id, patch), |u| {
        Action::Users(UserAction::Updated(u))
    })
    .await
}

/// Deleting yourself is refused here; the server does not check it.
pub async fn delete_user(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    if store.state().auth.user().is_some_and(|me| me.id == id) {
        let message = "You cannot delete your own account".to_string();
        store.dispatch(Slice::Users.failed(message.clone()));
        return Err(ClientError::Api {
            status: 400,
            message,
        });
    }
    track(store, Slice::Users, api.delete_user(id), |_| {
        Action::Users(UserAction::Removed(id))
    })
    .await
}

pub async fn approve_user(api: &ApiClient, store: &mut Store, id: DbId) -> Result<(), ClientError> {
    track(store, Slice::Users, api.approve_user(id), |r| {
        Action::Users(UserAction::Updated(r.user))
    })
    .await
}

pub async fn reject_user(
    api: &ApiClient,
    store: &mut Store,
    id: DbId,
    reason: Option<&str>,
) -> Result<(), ClientError> {
    track(store, Slice::Users, api.reject_user(id, reason), |_| {
        Action::Users(UserAction::Removed(id))
    })
    .await
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::store::fixtures::{project, session};
    use crate::store::LoadState;

    /// Serve `router` under `/api` on an ephemeral port; returns the API root.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().nest("/api", router);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    fn mock_server() -> Router {
        Router::new()
            .route(
                "/users/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "correct-horse" {
                        (StatusCode::OK, Json(serde_json::to_value(session()).unwrap()))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Invalid email or password", "code": "UNAUTHORIZED"})),
                        )
                    }
                }),
            )
            .route(
                "/projects",
                get(|headers: HeaderMap| async move {
                    match bearer(&headers) {
                        Some("tok") => (
                            StatusCode::OK,
                            Json(json!([project(1, "Hostel Pune", "Maharashtra")])),
                        ),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Not authorized, no token", "code": "UNAUTHORIZED"})),
                        ),
                    }
                }),
            )
            .route(
                "/users/{id}/reject",
                delete(|Json(body): Json<Value>| async move {
                    assert_eq!(body["reason"], "Invalid agency selected");
                    Json(json!({"message": "User registration rejected"}))
                }),
            )
    }

    #[tokio::test]
    async fn login_stores_session_and_token() {
        let mut api = ApiClient::new(serve(mock_server()).await);
        let mut store = Store::new();

        login(&mut api, &mut store, "user1@example.org", "correct-horse")
            .await
            .unwrap();

        assert_eq!(api.token(), Some("tok"));
        assert_eq!(store.state().auth.status, LoadState::Success);
        assert_eq!(store.state().auth.user().map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn failed_login_records_server_message() {
        let mut api = ApiClient::new(serve(mock_server()).await);
        let mut store = Store::new();

        let err = login(&mut api, &mut store, "user1@example.org", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(
            store.state().auth.status.error(),
            Some("Invalid email or password")
        );
        assert!(api.token().is_none());
    }

    #[tokio::test]
    async fn fetch_projects_requires_token() {
        let mut api = ApiClient::new(serve(mock_server()).await);
        let mut store = Store::new();

        assert!(fetch_projects(&api, &mut store, &ProjectQuery::default())
            .await
            .is_err());
        assert_eq!(
            store.state().projects.status.error(),
            Some("Not authorized, no token")
        );

        login(&mut api, &mut store, "user1@example.org", "correct-horse")
            .await
            .unwrap();
        fetch_projects(&api, &mut store, &ProjectQuery::default())
            .await
            .unwrap();
        assert_eq!(store.state().projects.status, LoadState::Success);
        assert_eq!(store.state().projects.projects[0].title, "Hostel Pune");
    }

    #[tokio::test]
    async fn reject_sends_reason_and_removes_user() {
        let api = ApiClient::new(serve(mock_server()).await);
        let mut store = Store::new();
        store.dispatch(Action::Users(UserAction::Loaded(vec![
            crate::store::fixtures::user(5, false),
        ])));

        reject_user(&api, &mut store, 5, Some("Invalid agency selected"))
            .await
            .unwrap();
        assert!(store.state().users.users.is_empty());
    }

    #[tokio::test]
    async fn deleting_own_account_is_refused_locally() {
        let api = ApiClient::new("http://127.0.0.1:9/api");
        let mut store = Store::new();
        store.dispatch(Action::Auth(AuthAction::LoggedIn(session())));

        let err = delete_user(&api, &mut store, 1).await.unwrap_err();
        assert_eq!(err.message(), "You cannot delete your own account");
        assert_eq!(
            store.state().users.status.error(),
            Some("You cannot delete your own account")
        );
    }

    #[tokio::test]
    async fn logout_drops_token_and_state() {
        let mut api = ApiClient::new(serve(mock_server()).await);
        let mut store = Store::new();
        login(&mut api, &mut store, "user1@example.org", "correct-horse")
            .await
            .unwrap();

        logout(&mut api, &mut store);
        assert!(api.token().is_none());
        assert!(store.state().auth.session.is_none());
    }
}
