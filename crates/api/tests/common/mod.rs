#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use janconnect_api::auth::jwt::{generate_access_token, JwtConfig};
use janconnect_api::auth::password::hash_password;
use janconnect_api::config::ServerConfig;
use janconnect_api::router::build_app_router;
use janconnect_api::state::AppState;
use janconnect_core::agency::{AgencyFields, AgencyType, NodalOfficer};
use janconnect_core::roles::Role;
use janconnect_core::types::DbId;
use janconnect_db::models::agency::AgencyRow;
use janconnect_db::models::user::{CreateUser, User};
use janconnect_db::repositories::{AgencyRepo, UserRepo};
use janconnect_events::EventBus;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const PASSWORD: &str = "test-password-123";

/// A `ServerConfig` with a fixed JWT secret and no bootstrap admin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_days: 30,
        },
        client_url: "http://localhost:3000".to_string(),
        bootstrap_admin: None,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Build the production router (same middleware stack) over `state`.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_agency(pool: &PgPool, name: &str, state: &str) -> AgencyRow {
    AgencyRepo::create(
        pool,
        &AgencyFields {
            name: name.to_string(),
            agency_type: AgencyType::Implementing,
            state: state.to_string(),
            district: Some("Pune".to_string()),
            nodal_officer: NodalOfficer {
                name: "R. Deshmukh".to_string(),
                email: "nodal@example.gov.in".to_string(),
                phone: "9822012345".to_string(),
            },
            address: None,
            is_active: true,
        },
    )
    .await
    .expect("agency creation should succeed")
}

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    role: Role,
    agency: Option<DbId>,
    state: Option<&str>,
    is_active: bool,
) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
            role,
            agency_id: agency,
            state: state.map(str::to_string),
            is_active,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role, &test_config().jwt).expect("token should encode")
}

pub async fn ministry_admin(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "admin@mosje.gov.in", Role::MosjeAdmin, None, None, true).await;
    let token = token_for(&user);
    (user, token)
}

pub async fn state_admin(pool: &PgPool, state: &str) -> (User, String) {
    let email = format!("{}@state.gov.in", state.to_lowercase().replace(' ', "-"));
    let user = create_user(pool, &email, Role::StateAdmin, None, Some(state), true).await;
    let token = token_for(&user);
    (user, token)
}

pub async fn agency_user(pool: &PgPool, email: &str, agency: DbId) -> (User, String) {
    let user = create_user(pool, email, Role::AgencyUser, Some(agency), None, true).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
