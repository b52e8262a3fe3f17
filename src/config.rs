use clap::Parser;

use crate::adapters::onnx::yolo_engine::EngineOptions;
use crate::domain::model::{DetectorParams, ModelId};

/// Servidor de detección YOLO por frame (HTTP + WebSocket).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Dirección de escucha
    #[arg(long, env = "DETECT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "DETECT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Modelo ONNX con cabeza YOLOv5 `[1, N, 85]`; si no existe se arranca en modo degradado
    #[arg(long, env = "DETECT_MODEL", default_value = "models/yolov5n.onnx", value_name = "FILE")]
    pub model: String,

    #[arg(long, env = "DETECT_MODEL_NAME", default_value = "yolov5n")]
    pub model_name: String,

    /// Lado de la entrada cuadrada del modelo (320 en CPU, 640 en variantes grandes)
    #[arg(long, env = "DETECT_INPUT_SIZE", default_value_t = 320)]
    pub input_size: u32,

    /// Umbral de confianza (0.0 - 1.0), estricto
    #[arg(long, env = "DETECT_CONF_THRESHOLD", default_value_t = 0.25, value_name = "THRESHOLD")]
    pub conf_threshold: f32,

    /// Umbral IoU de NMS (0.0 - 1.0)
    #[arg(long, env = "DETECT_IOU_THRESHOLD", default_value_t = 0.45, value_name = "THRESHOLD")]
    pub iou_threshold: f32,

    #[arg(long, env = "DETECT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Intentar registrar el proveedor CUDA
    #[arg(long, env = "DETECT_CUDA")]
    pub cuda: bool,

    /// Carpeta de archivos estáticos servida como fallback
    #[arg(long, env = "DETECT_STATIC_DIR", default_value = "static")]
    pub static_dir: String,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            input_size: self.input_size,
            conf_threshold: self.conf_threshold,
            iou_threshold: self.iou_threshold,
            ..Default::default()
        }
    }

    pub fn model_id(&self) -> ModelId {
        ModelId {
            name: self.model_name.clone(),
            onnx_path: self.model.clone(),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            intra_threads: self.intra_threads,
            cuda: self.cuda,
        }
    }
}
