//! JanConnect domain core.
//!
//! Pure domain rules shared by the database, API and client crates: entity
//! enums and wire types, field validation, the role/operation authorization
//! table, and the scoped filter builder. Nothing in here performs I/O.

pub mod access;
pub mod agency;
pub mod error;
pub mod milestone;
pub mod patch;
pub mod project;
pub mod roles;
pub mod scope;
pub mod stats;
pub mod types;
pub mod user;
pub mod validation;
