//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::session::{SessionResult, WhiteboardConfig, WhiteboardService};

/// Shared application state.
pub struct AppState {
    /// Session operations.
    pub service: WhiteboardService,
}

impl AppState {
    /// Wrap an already-built service.
    #[must_use]
    pub fn new(service: WhiteboardService) -> Arc<Self> {
        Arc::new(Self { service })
    }

    /// Create application state from configuration.
    ///
    /// # Errors
    /// Returns an error if the store or summarizer cannot be created.
    pub async fn from_config(config: &WhiteboardConfig) -> SessionResult<Arc<Self>> {
        let service = WhiteboardService::from_config(config).await?;
        Ok(Self::new(service))
    }
}
