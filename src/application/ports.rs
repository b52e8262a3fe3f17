use async_trait::async_trait;
use ndarray::{Array4, ArrayD};

use crate::domain::{errors::DomainResult, model::{ModelId, ModelInfo}};

/// Backend de inferencia: `[1, 3, S, S]` -> `[1, N, 5 + C]`.
///
/// Es el único punto de suspensión del pipeline. Si el backend no admite
/// llamadas concurrentes, la implementación debe serializarlas.
#[async_trait]
pub trait InferencePort: Send + Sync {
    async fn infer(&self, input: Array4<f32>) -> DomainResult<ArrayD<f32>>;
    fn info(&self) -> ModelInfo;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
