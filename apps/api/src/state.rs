use std::sync::Arc;

use crate::config::Config;
use crate::screening::pipeline::PipelineOrchestrator;
use crate::screening::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: PipelineOrchestrator,
    /// Read side of the profile store, for lookups and rankings.
    pub profiles: Arc<dyn ProfileStore>,
}
