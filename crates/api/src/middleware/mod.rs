//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated, active account behind a Bearer token.
//! - [`rbac::RequireMinistryAdmin`] -- user management (MoSJE-Admin only).
//! - [`rbac::RequireStateAdmin`] -- user listing (State-Admin or higher).

pub mod auth;
pub mod rbac;
