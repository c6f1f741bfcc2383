use std::sync::Arc;

use crate::gateway::ProfileGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One gateway per process: the local UI is its single caller.
    pub gateway: Arc<ProfileGateway>,
}
