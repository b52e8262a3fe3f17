use anyhow::Result;
use async_trait::async_trait;
use ndarray::{Array4, ArrayD, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::application::ports::InferencePort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{ModelId, ModelInfo};

// Los errores crudos de ORT se registran aquí y salen saneados.
impl From<ort::Error> for DomainError {
    fn from(e: ort::Error) -> Self {
        tracing::error!(error = %e, "ORT inference error");
        DomainError::OperationFailed("error interno de inferencia".into())
    }
}

/// Opciones de carga de la sesión ONNX.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub intra_threads: usize,
    pub cuda: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { intra_threads: 4, cuda: false }
    }
}

/// Backend ONNX Runtime. `Session::run` necesita `&mut`, así que la sesión
/// vive tras un `Mutex` y cada llamada se ejecuta en el pool bloqueante de Tokio.
pub struct OnnxYoloEngine {
    session: Arc<Mutex<Session>>,
    info: ModelInfo,
}

impl OnnxYoloEngine {
    pub fn load(model: &ModelId, input_size: u32, classes: usize, opts: &EngineOptions) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(opts.intra_threads)?;
        let mut device = "cpu";

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        if opts.cuda {
            let cuda = CUDAExecutionProvider::default().build();
            match builder.clone().with_execution_providers([cuda]) {
                Ok(builder_with_cuda) => {
                    builder = builder_with_cuda;
                    device = "cuda";
                }
                Err(e) => warn!("CUDA no disponible, se usa CPU: {}", e),
            }
        }

        // Con `ort` sin default-features, usamos commit_from_memory.
        let model_bytes = fs::read(&model.onnx_path)?;
        debug!("Modelo {}: {:.2} MB", model.name, model_bytes.len() as f64 / (1024.0 * 1024.0));
        let session = builder.commit_from_memory(&model_bytes)?;
        info!("Modelo {} cargado en {} (entrada {}x{})", model.name, device, input_size, input_size);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            info: ModelInfo {
                name: model.name.clone(),
                input_size: [input_size, input_size],
                classes,
                precision: "fp32".into(),
                device: device.into(),
            },
        })
    }

    fn run(session: &Mutex<Session>, input: Array4<f32>) -> DomainResult<ArrayD<f32>> {
        let input_shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let (data, _) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, data))?;

        let mut session = session
            .lock()
            .map_err(|_| DomainError::OperationFailed("Lock de sesión envenenado".into()))?;
        let outputs = session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.into_iter().map(|&x| x as usize).collect();
        ArrayD::from_shape_vec(IxDyn(&dims), data_out.to_vec()).map_err(|e| DomainError::InvalidOutputShape {
            expected: format!("{:?}", dims),
            got: e.to_string(),
        })
    }
}

#[async_trait]
impl InferencePort for OnnxYoloEngine {
    async fn infer(&self, input: Array4<f32>) -> DomainResult<ArrayD<f32>> {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || Self::run(&session, input))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("tarea de inferencia abortada: {}", e)))?
    }

    fn info(&self) -> ModelInfo {
        self.info.clone()
    }
}
