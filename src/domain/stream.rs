use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::detection::Detection;

/// Marcas de tiempo (ms desde epoch) del protocolo de latencia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub capture_ts: i64,
    pub recv_ts: i64,
    pub inference_ts: i64,
}

/// Registro que viaja por el cable, idéntico en HTTP y WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub frame_id: String,
    #[serde(flatten)]
    pub timing: FrameTiming,
    pub detections: Vec<Detection>,
}

pub fn summarize_detections(detections: &[Detection]) -> String {
    let mut counts = BTreeMap::new();
    for det in detections {
        *counts.entry(det.label.as_str()).or_insert(0) += 1;
    }
    counts.iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}
