//! Request handlers, one module per resource.

pub mod agency;
pub mod health;
pub mod milestone;
pub mod project;
pub mod user;
