use std::sync::Arc;
use crate::application::services::PipelineService;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Pipeline de detección por frame (sin estado entre frames).
    pub pipeline: Arc<PipelineService>,
}
