//! Role-based authorization.
//!
//! [`authorize`] is the single decision point for who may do what to which
//! record. Handlers describe the attempted [`Operation`] and the [`Target`]
//! it touches; the answer is either `Ok(())` or a `Forbidden` error carrying
//! the caller-facing message.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated caller, reduced to what authorization needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    pub state: Option<String>,
    pub agency: Option<DbId>,
}

impl Actor {
    fn in_state(&self, state: &str) -> bool {
        self.state.as_deref() == Some(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    AddMilestone,
    UpdateMilestone,
}

/// Project attributes that decide access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess<'a> {
    pub state: &'a str,
    pub implementing_agency: DbId,
    pub executing_agency: DbId,
}

impl ProjectAccess<'_> {
    fn involves(&self, agency: Option<DbId>) -> bool {
        agency.is_some_and(|a| a == self.implementing_agency || a == self.executing_agency)
    }
}

/// The record an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Accounts other than the caller's own (listing, admin management).
    Users,
    /// The caller's own account.
    OwnProfile,
    /// An agency; `id` is `None` for one that does not exist yet.
    Agency { id: Option<DbId>, state: &'a str },
    Project(ProjectAccess<'a>),
}

/// Decide whether `actor` may perform `op` on `target`.
pub fn authorize(actor: &Actor, op: Operation, target: &Target<'_>) -> Result<(), CoreError> {
    if decide(actor, op, target) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(denial_message(op, target).to_string()))
    }
}

/// Boolean form of [`authorize`].
pub fn is_allowed(actor: &Actor, op: Operation, target: &Target<'_>) -> bool {
    decide(actor, op, target)
}

fn decide(actor: &Actor, op: Operation, target: &Target<'_>) -> bool {
    use Operation::*;

    match (actor.role, target) {
        (_, Target::OwnProfile) => matches!(op, Read | Update),

        (Role::MosjeAdmin, _) => true,

        (Role::StateAdmin, Target::Users) => op == Read,
        (Role::StateAdmin, Target::Agency { state, .. }) => {
            matches!(op, Read | Create | Update) && actor.in_state(state)
        }
        (Role::StateAdmin, Target::Project(project)) => {
            matches!(op, Read | Create | Update | AddMilestone | UpdateMilestone)
                && actor.in_state(project.state)
        }

        (Role::AgencyUser, Target::Users) => false,
        (Role::AgencyUser, Target::Agency { id, .. }) => {
            op == Read && id.is_some() && *id == actor.agency
        }
        (Role::AgencyUser, Target::Project(project)) => {
            matches!(op, Read | UpdateMilestone) && project.involves(actor.agency)
        }
    }
}

fn denial_message(op: Operation, target: &Target<'_>) -> &'static str {
    use Operation::*;

    match (target, op) {
        (Target::Users, Read) => "Not authorized as state admin or higher",
        (Target::Users, _) | (_, Delete | Approve | Reject) => "Not authorized as admin",
        (Target::OwnProfile, _) => "Not authorized",
        (Target::Agency { .. }, Read) => "Not authorized to view this agency",
        (Target::Agency { .. }, Create) => "Not authorized to create agencies in this state",
        (Target::Agency { .. }, _) => "Not authorized to update agencies in this state",
        (Target::Project(_), Read) => "Not authorized to view this project",
        (Target::Project(_), Create) => "Not authorized to create projects in this state",
        (Target::Project(_), Update) => "Not authorized to update projects in this state",
        (Target::Project(_), AddMilestone | UpdateMilestone) => {
            "Not authorized to update this project"
        }
    }
}
