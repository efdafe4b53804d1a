use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: janconnect_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Account events (approval/rejection) for the notification service.
    pub event_bus: Arc<janconnect_events::EventBus>,
}
