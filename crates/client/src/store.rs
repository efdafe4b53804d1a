//! Client-side state container.
//!
//! One slice per resource. A slice owns its data plus a [`LoadState`] for the
//! request in flight, and changes only through its reducer. [`Store::dispatch`]
//! routes an [`Action`] to the slice it names.

use janconnect_core::agency::Agency;
use janconnect_core::project::ProjectDetail;
use janconnect_core::stats::ProjectStats;
use janconnect_core::types::DbId;
use janconnect_core::user::UserProfile;

use crate::api::Session;

/// Lifecycle of the most recent request a slice issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// Confirmation shown after a public signup.
    pub message: Option<String>,
    pub status: LoadState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Pending,
    LoggedIn(Session),
    /// Public signup accepted; the account awaits approval.
    Registered(String),
    ProfileLoaded(UserProfile),
    Failed(String),
    LoggedOut,
    Reset,
}

impl AuthState {
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::Pending => self.status = LoadState::Loading,
            AuthAction::LoggedIn(session) => {
                self.session = Some(session);
                self.status = LoadState::Success;
            }
            AuthAction::Registered(message) => {
                self.message = Some(message);
                self.status = LoadState::Success;
            }
            AuthAction::ProfileLoaded(user) => {
                if let Some(session) = &mut self.session {
                    session.user = user;
                }
                self.status = LoadState::Success;
            }
            AuthAction::Failed(message) => self.status = LoadState::Error(message),
            AuthAction::LoggedOut => *self = AuthState::default(),
            AuthAction::Reset => {
                self.status = LoadState::Idle;
                self.message = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectsState {
    pub projects: Vec<ProjectDetail>,
    /// The project open in the detail view.
    pub project: Option<ProjectDetail>,
    pub stats: Option<ProjectStats>,
    pub status: LoadState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectAction {
    Pending,
    Loaded(Vec<ProjectDetail>),
    LoadedOne(ProjectDetail),
    Created(ProjectDetail),
    /// A project came back changed (edit, milestone added or updated).
    Updated(ProjectDetail),
    Deleted(DbId),
    StatsLoaded(ProjectStats),
    Failed(String),
    ClearProject,
    Reset,
}

impl ProjectsState {
    pub fn reduce(&mut self, action: ProjectAction) {
        match action {
            ProjectAction::Pending => self.status = LoadState::Loading,
            ProjectAction::Loaded(projects) => {
                self.projects = projects;
                self.status = LoadState::Success;
            }
            ProjectAction::LoadedOne(project) => {
                self.project = Some(project);
                self.status = LoadState::Success;
            }
            ProjectAction::Created(project) => {
                self.projects.push(project);
                self.status = LoadState::Success;
            }
            ProjectAction::Updated(project) => {
                replace_by_id(&mut self.projects, project.clone(), |p| p.id);
                self.project = Some(project);
                self.status = LoadState::Success;
            }
            ProjectAction::Deleted(id) => {
                self.projects.retain(|p| p.id != id);
                if self.project.as_ref().is_some_and(|p| p.id == id) {
                    self.project = None;
                }
                self.status = LoadState::Success;
            }
            ProjectAction::StatsLoaded(stats) => {
                self.stats = Some(stats);
                self.status = LoadState::Success;
            }
            ProjectAction::Failed(message) => self.status = LoadState::Error(message),
            ProjectAction::ClearProject => self.project = None,
            ProjectAction::Reset => self.status = LoadState::Idle,
        }
    }
}

// ---------------------------------------------------------------------------
// Agencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgenciesState {
    pub agencies: Vec<Agency>,
    pub agency: Option<Agency>,
    pub status: LoadState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgencyAction {
    Pending,
    Loaded(Vec<Agency>),
    LoadedOne(Agency),
    Created(Agency),
    Updated(Agency),
    Deleted(DbId),
    Failed(String),
    Reset,
}

impl AgenciesState {
    pub fn reduce(&mut self, action: AgencyAction) {
        match action {
            AgencyAction::Pending => self.status = LoadState::Loading,
            AgencyAction::Loaded(agencies) => {
                self.agencies = agencies;
                self.status = LoadState::Success;
            }
            AgencyAction::LoadedOne(agency) => {
                self.agency = Some(agency);
                self.status = LoadState::Success;
            }
            AgencyAction::Created(agency) => {
                self.agencies.push(agency);
                self.status = LoadState::Success;
            }
            AgencyAction::Updated(agency) => {
                replace_by_id(&mut self.agencies, agency.clone(), |a| a.id);
                if self.agency.as_ref().is_some_and(|a| a.id == agency.id) {
                    self.agency = Some(agency);
                }
                self.status = LoadState::Success;
            }
            AgencyAction::Deleted(id) => {
                self.agencies.retain(|a| a.id != id);
                if self.agency.as_ref().is_some_and(|a| a.id == id) {
                    self.agency = None;
                }
                self.status = LoadState::Success;
            }
            AgencyAction::Failed(message) => self.status = LoadState::Error(message),
            AgencyAction::Reset => self.status = LoadState::Idle,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersState {
    pub users: Vec<UserProfile>,
    pub status: LoadState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Pending,
    Loaded(Vec<UserProfile>),
    /// An account changed server-side (edit or approval).
    Updated(UserProfile),
    /// Deleted or rejected.
    Removed(DbId),
    Failed(String),
    Reset,
}

impl UsersState {
    /// Accounts awaiting approval.
    pub fn pending(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.iter().filter(|u| !u.is_active)
    }

    pub fn reduce(&mut self, action: UserAction) {
        match action {
            UserAction::Pending => self.status = LoadState::Loading,
            UserAction::Loaded(users) => {
                self.users = users;
                self.status = LoadState::Success;
            }
            UserAction::Updated(user) => {
                replace_by_id(&mut self.users, user, |u| u.id);
                self.status = LoadState::Success;
            }
            UserAction::Removed(id) => {
                self.users.retain(|u| u.id != id);
                self.status = LoadState::Success;
            }
            UserAction::Failed(message) => self.status = LoadState::Error(message),
            UserAction::Reset => self.status = LoadState::Idle,
        }
    }
}

fn replace_by_id<T>(items: &mut [T], item: T, id: impl Fn(&T) -> DbId) {
    let target = id(&item);
    if let Some(slot) = items.iter_mut().find(|existing| id(existing) == target) {
        *slot = item;
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Auth(AuthAction),
    Projects(ProjectAction),
    Agencies(AgencyAction),
    Users(UserAction),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub projects: ProjectsState,
    pub agencies: AgenciesState,
    pub users: UsersState,
}

#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::trace!(?action, "dispatch");
        match action {
            Action::Auth(a) => {
                // Logging out drops every slice's data along with the session.
                if matches!(a, AuthAction::LoggedOut) {
                    self.state = AppState::default();
                } else {
                    self.state.auth.reduce(a);
                }
            }
            Action::Projects(a) => self.state.projects.reduce(a),
            Action::Agencies(a) => self.state.agencies.reduce(a),
            Action::Users(a) => self.state.users.reduce(a),
        }
    }
}
