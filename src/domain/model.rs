use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};
use super::labels::COCO_CLASSES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,      // logical name, e.g. "yolov5n"
    pub onnx_path: String, // filesystem path
}

/// Configuración inmutable del pipeline, compartida entre frames.
#[derive(Debug, Clone)]
pub struct DetectorParams {
    pub input_size: u32,       // 320 para CPU, 640 en variantes grandes
    pub conf_threshold: f32,   // 0..1, estricto (>)
    pub iou_threshold: f32,    // 0..1
    pub class_names: &'static [&'static str],
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            input_size: 320,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            class_names: &COCO_CLASSES,
        }
    }
}

impl DetectorParams {
    pub fn validate(&self) -> DomainResult<()> {
        if self.input_size == 0 {
            return Err(DomainError::InvalidInput("input_size debe ser > 0".into()));
        }
        for (name, value) in [("conf_threshold", self.conf_threshold), ("iou_threshold", self.iou_threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidInput(format!("{} fuera de [0,1]: {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Descripción del modelo cargado, expuesta en `/api/models/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub input_size: [u32; 2],
    pub classes: usize,
    pub precision: String,
    pub device: String,
}
