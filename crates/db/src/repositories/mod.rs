//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

mod filter;

pub mod agency_repo;
pub mod milestone_repo;
pub mod project_repo;
pub mod user_repo;

pub use agency_repo::AgencyRepo;
pub use milestone_repo::MilestoneRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
