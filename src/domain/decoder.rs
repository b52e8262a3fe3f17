use ndarray::{ArrayViewD, Axis, Ix2};
use tracing::debug;

use super::detection::CandidateBox;
use super::errors::{DomainError, DomainResult};

/// cx, cy, w, h, objectness
const BOX_FIELDS: usize = 5;

/// Decodifica la salida cruda de una cabeza YOLOv5 `[1, N, 5 + C]`.
///
/// Devuelve una caja por fila, sin filtrar. `confidence = obj * max(cls)` y el
/// argmax desempata a favor del índice de clase más bajo.
pub fn decode(output: ArrayViewD<'_, f32>) -> DomainResult<Vec<CandidateBox>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 || shape[2] <= BOX_FIELDS {
        return Err(DomainError::InvalidOutputShape {
            expected: "[1, N, 5+C]".into(),
            got: format!("{:?}", shape),
        });
    }

    let rows = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|e| DomainError::InvalidOutputShape {
            expected: "[N, 5+C]".into(),
            got: e.to_string(),
        })?;

    let candidates: Vec<CandidateBox> = rows
        .outer_iter()
        .enumerate()
        .map(|(index, row)| {
            let (class_id, class_score) = argmax(row.iter().skip(BOX_FIELDS).copied());
            CandidateBox::from_center(row[0], row[1], row[2], row[3], row[4] * class_score, class_id, index)
        })
        .collect();

    debug!("Decoder: {} candidatos, {} clases", candidates.len(), shape[2] - BOX_FIELDS);
    Ok(candidates)
}

// Sólo un valor estrictamente mayor desplaza al actual: el empate se queda con el primero.
fn argmax(scores: impl Iterator<Item = f32>) -> (usize, f32) {
    let mut best = (0, f32::NEG_INFINITY);
    for (idx, score) in scores.enumerate() {
        if score > best.1 {
            best = (idx, score);
        }
    }
    if best.1 == f32::NEG_INFINITY {
        best.1 = 0.0;
    }
    best
}
