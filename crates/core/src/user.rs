//! User account wire types and role-scope rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::patch::nullable;
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Public representation of an account. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub agency: Option<DbId>,
    pub state: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// `{id, name, email}` as embedded in populated projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

/// The scoping attributes of an account after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScope {
    pub agency: Option<DbId>,
    pub state: Option<String>,
}

/// Enforce "exactly the scoping attribute the role needs" and clear the other.
///
/// Agency-User keeps only `agency`, State-Admin keeps only `state`, MoSJE-Admin
/// keeps neither.
pub fn resolve_scope(
    role: Role,
    agency: Option<DbId>,
    state: Option<String>,
) -> Result<UserScope, CoreError> {
    let state = state.filter(|s| !s.trim().is_empty());
    match role {
        Role::AgencyUser => match agency {
            Some(agency) => Ok(UserScope {
                agency: Some(agency),
                state: None,
            }),
            None => Err(CoreError::Validation(
                "Agency-User must be assigned to an agency".to_string(),
            )),
        },
        Role::StateAdmin => match state {
            Some(state) => Ok(UserScope {
                agency: None,
                state: Some(state),
            }),
            None => Err(CoreError::Validation(
                "State-Admin must be assigned to a state".to_string(),
            )),
        },
        Role::MosjeAdmin => Ok(UserScope {
            agency: None,
            state: None,
        }),
    }
}

/// Body of both registration endpoints.
///
/// Every field is optional on the wire so a missing field yields the
/// "all required fields" message rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    pub name: Option<String>,
    /// Checked after trimming and lowercasing.
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub agency: Option<DbId>,
    pub state: Option<String>,
}

/// A registration that passed every field and scope check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub scope: UserScope,
}

impl RegisterRequest {
    pub fn into_valid(self) -> Result<ValidRegistration, CoreError> {
        crate::validation::require_fields(&[
            self.name.as_deref(),
            self.email.as_deref(),
            self.password.as_deref(),
        ])?;
        let Some(role) = self.role else {
            return Err(CoreError::Validation(
                crate::validation::MISSING_FIELDS_MESSAGE.to_string(),
            ));
        };
        self.validate()?;
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        crate::validation::validate_account_email(&email).map_err(CoreError::Validation)?;

        let scope = resolve_scope(role, self.agency, self.state)?;
        Ok(ValidRegistration {
            name: self.name.unwrap_or_default().trim().to_string(),
            email,
            password: self.password.unwrap_or_default(),
            role,
            scope,
        })
    }
}

/// Emails are stored lowercase and trimmed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Body of `POST /users/login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `PUT /users/{id}` (ministry admin).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub agency: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Body of `PUT /users/me`. Only name and email are self-editable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(email) = &self.email {
            crate::validation::validate_account_email(&normalize_email(email))
                .map_err(CoreError::Validation)?;
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::Validation("Please provide a name".to_string()));
        }
        Ok(())
    }
}

/// Body of `PUT /users/password`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl PasswordChange {
    /// Returns `(current, new)` once both are present and the new one is long enough.
    pub fn into_parts(self) -> Result<(String, String), CoreError> {
        let (Some(current), Some(new)) = (self.current_password, self.new_password) else {
            return Err(CoreError::Validation(
                "Please provide current and new password".to_string(),
            ));
        };
        crate::validation::validate_password_strength(&new).map_err(CoreError::Validation)?;
        Ok((current, new))
    }
}

/// Optional body of `DELETE /users/{id}/reject`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}
