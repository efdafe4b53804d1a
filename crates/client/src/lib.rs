//! JanConnect client library.
//!
//! A typed HTTP client for every REST endpoint, an explicit state store with
//! one slice per resource, async thunks that drive the store through a
//! request, and analytics computed over fetched projects.

pub mod analytics;
pub mod api;
pub mod error;
pub mod store;
pub mod thunks;

pub use api::{ApiClient, Session};
pub use error::ClientError;
pub use store::{Action, LoadState, Store};
