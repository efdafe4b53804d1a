//! REST API client for the JanConnect backend.
//!
//! One method per endpoint under `/api`. Authenticated calls send the stored
//! bearer token; a non-2xx answer becomes [`ClientError::Api`] carrying the
//! server's `message`.

use janconnect_core::agency::{Agency, AgencyPatch, NewAgency, PublicAgency};
use janconnect_core::project::{MilestonePatch, NewMilestone, NewProject, ProjectDetail, ProjectPatch};
use janconnect_core::scope::{AgencyQuery, ProjectQuery, UserQuery};
use janconnect_core::stats::ProjectStats;
use janconnect_core::types::DbId;
use janconnect_core::user::{
    LoginRequest, PasswordChange, ProfilePatch, RegisterRequest, RejectRequest, UserPatch,
    UserProfile,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A logged-in account: the profile plus its bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

/// `{message}` acknowledgement returned by deletes and password changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub message: String,
}

/// `{message, user}` returned by public registration and approval.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserMessage {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub version: String,
    pub db_healthy: bool,
}

/// HTTP client for one JanConnect server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// * `base_url` - API root including the `/api` prefix, e.g.
    ///   `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // ---- users ----------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.send(self.request(Method::POST, "/users/login").json(&body))
            .await
    }

    /// Self-service signup; the account stays inactive until approved.
    pub async fn register_public(&self, req: &RegisterRequest) -> Result<UserMessage, ClientError> {
        self.send(self.request(Method::POST, "/users/register-public").json(req))
            .await
    }

    /// Admin-created account, active immediately.
    pub async fn register(&self, req: &RegisterRequest) -> Result<Session, ClientError> {
        self.send(self.request(Method::POST, "/users/register").json(req))
            .await
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.send(self.request(Method::GET, "/users/me")).await
    }

    pub async fn update_me(&self, patch: &ProfilePatch) -> Result<UserProfile, ClientError> {
        self.send(self.request(Method::PUT, "/users/me").json(patch))
            .await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<Message, ClientError> {
        let body = PasswordChange {
            current_password: Some(current.to_string()),
            new_password: Some(new.to_string()),
        };
        self.send(self.request(Method::PUT, "/users/password").json(&body))
            .await
    }

    pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<UserProfile>, ClientError> {
        self.send(self.request(Method::GET, "/users").query(query))
            .await
    }

    pub async fn update_user(&self, id: DbId, patch: &UserPatch) -> Result<UserProfile, ClientError> {
        self.send(self.request(Method::PUT, &format!("/users/{id}")).json(patch))
            .await
    }

    pub async fn delete_user(&self, id: DbId) -> Result<Message, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/users/{id}")))
            .await
    }

    pub async fn approve_user(&self, id: DbId) -> Result<UserMessage, ClientError> {
        self.send(self.request(Method::PUT, &format!("/users/{id}/approve")))
            .await
    }

    /// Reject a pending registration. The reason, if any, goes into the
    /// rejection email.
    pub async fn reject_user(&self, id: DbId, reason: Option<&str>) -> Result<Message, ClientError> {
        let mut request = self.request(Method::DELETE, &format!("/users/{id}/reject"));
        if let Some(reason) = reason {
            request = request.json(&RejectRequest {
                reason: Some(reason.to_string()),
            });
        }
        self.send(request).await
    }

    // ---- agencies -------------------------------------------------------

    pub async fn list_agencies(&self, query: &AgencyQuery) -> Result<Vec<Agency>, ClientError> {
        self.send(self.request(Method::GET, "/agencies").query(query))
            .await
    }

    /// Active agencies for the signup picker; no token needed.
    pub async fn list_public_agencies(&self) -> Result<Vec<PublicAgency>, ClientError> {
        self.send(self.request(Method::GET, "/agencies/public"))
            .await
    }

    pub async fn get_agency(&self, id: DbId) -> Result<Agency, ClientError> {
        self.send(self.request(Method::GET, &format!("/agencies/{id}")))
            .await
    }

    pub async fn create_agency(&self, agency: &NewAgency) -> Result<Agency, ClientError> {
        self.send(self.request(Method::POST, "/agencies").json(agency))
            .await
    }

    pub async fn update_agency(&self, id: DbId, patch: &AgencyPatch) -> Result<Agency, ClientError> {
        self.send(self.request(Method::PUT, &format!("/agencies/{id}")).json(patch))
            .await
    }

    pub async fn delete_agency(&self, id: DbId) -> Result<Message, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/agencies/{id}")))
            .await
    }

    // ---- projects -------------------------------------------------------

    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<ProjectDetail>, ClientError> {
        self.send(self.request(Method::GET, "/projects").query(query))
            .await
    }

    pub async fn project_stats(&self, query: &ProjectQuery) -> Result<ProjectStats, ClientError> {
        self.send(self.request(Method::GET, "/projects/stats/summary").query(query))
            .await
    }

    pub async fn get_project(&self, id: DbId) -> Result<ProjectDetail, ClientError> {
        self.send(self.request(Method::GET, &format!("/projects/{id}")))
            .await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<ProjectDetail, ClientError> {
        self.send(self.request(Method::POST, "/projects").json(project))
            .await
    }

    pub async fn update_project(
        &self,
        id: DbId,
        patch: &ProjectPatch,
    ) -> Result<ProjectDetail, ClientError> {
        self.send(self.request(Method::PUT, &format!("/projects/{id}")).json(patch))
            .await
    }

    pub async fn delete_project(&self, id: DbId) -> Result<Message, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/projects/{id}")))
            .await
    }

    /// Returns the whole project with the new milestone appended.
    pub async fn add_milestone(
        &self,
        project_id: DbId,
        milestone: &NewMilestone,
    ) -> Result<ProjectDetail, ClientError> {
        self.send(
            self.request(Method::POST, &format!("/projects/{project_id}/milestone"))
                .json(milestone),
        )
        .await
    }

    pub async fn update_milestone(
        &self,
        project_id: DbId,
        milestone_id: DbId,
        patch: &MilestonePatch,
    ) -> Result<ProjectDetail, ClientError> {
        self.send(
            self.request(
                Method::PUT,
                &format!("/projects/{project_id}/milestone/{milestone_id}"),
            )
            .json(patch),
        )
        .await
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.send(self.request(Method::GET, "/health")).await
    }

    // ---- plumbing -------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Check the status code and deserialize the JSON body on success.
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %body, "API request failed");
            return Err(ClientError::from_body(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(api.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn session_reads_flattened_login_body() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Asha Patil",
            "email": "asha@example.org",
            "role": "State-Admin",
            "agency": null,
            "state": "Maharashtra",
            "isActive": true,
            "createdAt": "2024-01-15T10:00:00Z",
            "token": "abc.def.ghi"
        }))
        .unwrap();
        assert_eq!(session.token, "abc.def.ghi");
        assert_eq!(session.user.state.as_deref(), Some("Maharashtra"));
    }

    #[test]
    fn requests_carry_bearer_token_once_set() {
        let mut api = ApiClient::new("http://localhost:5000/api");
        let anon = api.request(Method::GET, "/users/me").build().unwrap();
        assert!(anon.headers().get("authorization").is_none());

        api.set_token(Some("tok".into()));
        let authed = api.request(Method::GET, "/users/me").build().unwrap();
        assert_eq!(authed.headers()["authorization"], "Bearer tok");
        assert_eq!(authed.url().as_str(), "http://localhost:5000/api/users/me");
    }
}
