//! Role-scoped list filters.
//!
//! A list request is reduced to a filter value here; the db crate renders it
//! into SQL. The caller's scope is applied first and explicit query
//! parameters are AND-merged on top, so a parameter can only narrow.

use serde::{Deserialize, Serialize};

use crate::access::Actor;
use crate::agency::{Agency, AgencyType};
use crate::project::{Component, ProjectDetail, ProjectStatus};
use crate::roles::Role;
use crate::types::DbId;

/// The slice of records a caller may list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordScope {
    All,
    State(String),
    /// Projects where the agency implements or executes; for agency listings,
    /// that single agency.
    Agency(DbId),
    Nothing,
}

impl RecordScope {
    pub fn for_projects(actor: &Actor) -> Self {
        match actor.role {
            Role::MosjeAdmin => RecordScope::All,
            Role::StateAdmin => match &actor.state {
                Some(state) => RecordScope::State(state.clone()),
                None => RecordScope::Nothing,
            },
            Role::AgencyUser => match actor.agency {
                Some(agency) => RecordScope::Agency(agency),
                None => RecordScope::Nothing,
            },
        }
    }

    /// Agencies follow the same shape as projects.
    pub fn for_agencies(actor: &Actor) -> Self {
        Self::for_projects(actor)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Query string of `GET /projects` and `GET /projects/stats/summary`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub state: Option<String>,
    pub status: Option<ProjectStatus>,
    pub component: Option<Component>,
    pub implementing_agency: Option<DbId>,
    pub executing_agency: Option<DbId>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    pub scope: RecordScope,
    /// Explicit state filter; only ever set for ministry admins.
    pub state: Option<String>,
    pub status: Option<ProjectStatus>,
    pub component: Option<Component>,
    pub implementing_agency: Option<DbId>,
    pub executing_agency: Option<DbId>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
}

/// Build the effective project filter for `actor`.
pub fn project_filter(actor: &Actor, query: ProjectQuery) -> ProjectFilter {
    let scope = RecordScope::for_projects(actor);
    let state = match scope {
        RecordScope::All => non_blank(query.state),
        _ => None,
    };
    ProjectFilter {
        scope,
        state,
        status: query.status,
        component: query.component,
        implementing_agency: query.implementing_agency,
        executing_agency: query.executing_agency,
        search: non_blank(query.search),
    }
}

impl ProjectFilter {
    /// In-memory evaluation, identical in meaning to the SQL rendering.
    pub fn matches(&self, project: &ProjectDetail) -> bool {
        let in_scope = match &self.scope {
            RecordScope::All => true,
            RecordScope::State(state) => &project.state == state,
            RecordScope::Agency(agency) => project.involves_agency(*agency),
            RecordScope::Nothing => false,
        };
        in_scope
            && self.state.as_ref().is_none_or(|s| &project.state == s)
            && self.status.is_none_or(|s| project.status == s)
            && self.component.is_none_or(|c| project.component == c)
            && self
                .implementing_agency
                .is_none_or(|a| project.implementing_agency_id == a)
            && self
                .executing_agency
                .is_none_or(|a| project.executing_agency_id == a)
            && self.search.as_ref().is_none_or(|needle| {
                project
                    .title
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

// ---------------------------------------------------------------------------
// Agencies
// ---------------------------------------------------------------------------

/// Query string of `GET /agencies`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyQuery {
    #[serde(rename = "type")]
    pub agency_type: Option<AgencyType>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyFilter {
    pub scope: RecordScope,
    pub agency_type: Option<AgencyType>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

pub fn agency_filter(actor: &Actor, query: AgencyQuery) -> AgencyFilter {
    let scope = RecordScope::for_agencies(actor);
    let state = match scope {
        RecordScope::All => non_blank(query.state),
        _ => None,
    };
    AgencyFilter {
        scope,
        agency_type: query.agency_type,
        state,
        is_active: query.is_active,
    }
}

impl AgencyFilter {
    pub fn matches(&self, agency: &Agency) -> bool {
        let in_scope = match &self.scope {
            RecordScope::All => true,
            RecordScope::State(state) => &agency.state == state,
            RecordScope::Agency(id) => agency.id == *id,
            RecordScope::Nothing => false,
        };
        in_scope
            && self.agency_type.is_none_or(|t| agency.agency_type == t)
            && self.state.as_ref().is_none_or(|s| &agency.state == s)
            && self.is_active.is_none_or(|a| agency.is_active == a)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Query string of `GET /users`. User listing is not role-scoped.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub role: Option<Role>,
    pub state: Option<String>,
    pub agency: Option<DbId>,
    pub is_active: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
