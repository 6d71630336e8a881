use std::sync::Arc;

use crate::pipeline::runner::Pipeline;

/// Shared application state injected into all route handlers via Axum
/// extractors. The pipeline owns the provider clients; requests share it
/// read-only.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
