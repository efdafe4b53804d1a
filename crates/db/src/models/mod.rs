//! Row structs for each table.
//!
//! Each submodule contains a `FromRow` struct matching the table and the
//! conversion into the `janconnect-core` wire type, plus insert/update DTOs
//! where the repository needs them.

pub mod agency;
pub mod milestone;
pub mod project;
pub mod user;
