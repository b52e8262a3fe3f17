use serde::{Deserialize, Serialize};

/// Caja candidata en el espacio del modelo (píxeles del lienzo letterbox), antes de NMS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
    /// Fila del tensor de salida de la que procede; desempata el orden en NMS.
    pub index: usize,
}

impl CandidateBox {
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32, confidence: f32, class_id: usize, index: usize) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence,
            class_id,
            index,
        }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }
}

/// Detección final, normalizada a [0,1] sobre la imagen original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}
