use serde::{Deserialize, Serialize};

use crate::domain::model::{DetectorParams, ModelInfo};

/// Parámetros de query de `POST /api/detect`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectQuery {
    /// Marca de captura del cliente (ms desde epoch).
    pub timestamp: Option<i64>,
    pub frame_id: Option<String>,
}

/// Mensaje de texto del WebSocket: imagen en base64 más la marca de captura del cliente.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsFrameRequest {
    pub frame_id: Option<String>,
    pub capture_ts: Option<i64>,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsInfoResponse {
    pub models: Vec<ModelInfo>,
    pub device: String,
    pub backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub model_input_size: u32,
    pub classes: usize,
}

impl From<&DetectorParams> for ConfigResponse {
    fn from(p: &DetectorParams) -> Self {
        Self {
            confidence_threshold: p.conf_threshold,
            iou_threshold: p.iou_threshold,
            model_input_size: p.input_size,
            classes: p.class_names.len(),
        }
    }
}
