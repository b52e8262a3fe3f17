use std::cmp::Ordering;

use super::detection::CandidateBox;

const IOU_EPS: f32 = 1e-6;

/// Intersección sobre unión con épsilon en el denominador para cajas de área nula.
pub fn iou(a: &CandidateBox, b: &CandidateBox) -> f32 {
    let xx1 = a.x1.max(b.x1);
    let yy1 = a.y1.max(b.y1);
    let xx2 = a.x2.min(b.x2);
    let yy2 = a.y2.min(b.y2);

    let inter = (xx2 - xx1).max(0.0) * (yy2 - yy1).max(0.0);
    inter / (a.area() + b.area() - inter + IOU_EPS)
}

/// Umbral de confianza estricto seguido de NMS voraz independiente de la clase.
///
/// El resultado sale en orden de selección (mayor confianza primero). Con
/// confianzas iguales manda el índice original del candidato.
pub fn suppress(candidates: Vec<CandidateBox>, conf_threshold: f32, iou_threshold: f32) -> Vec<CandidateBox> {
    let mut pending: Vec<CandidateBox> = candidates
        .into_iter()
        .filter(|c| c.confidence > conf_threshold)
        .collect();

    pending.sort_by(|a, b| match b.confidence.total_cmp(&a.confidence) {
        Ordering::Equal => a.index.cmp(&b.index),
        other => other,
    });

    let mut suppressed = vec![false; pending.len()];
    let mut kept = Vec::new();

    for i in 0..pending.len() {
        if suppressed[i] {
            continue;
        }
        let best = pending[i];
        kept.push(best);

        for (j, other) in pending.iter().enumerate().skip(i + 1) {
            if !suppressed[j] && iou(&best, other) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    kept
}
