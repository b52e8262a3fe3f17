use super::detection::{CandidateBox, Detection};
use super::errors::{DomainError, DomainResult};
use super::geometry::LetterboxTransform;

/// Lleva las cajas supervivientes al espacio normalizado de la imagen original.
///
/// Las coordenadas fuera de [0,1] (cajas en la zona de padding) se recortan,
/// nunca se descartan. Un `class_id` fuera de la tabla es un error.
pub fn assemble(
    boxes: &[CandidateBox],
    transform: &LetterboxTransform,
    original_width: u32,
    original_height: u32,
    class_names: &[&str],
) -> DomainResult<Vec<Detection>> {
    let width = original_width as f32;
    let height = original_height as f32;

    boxes
        .iter()
        .map(|b| {
            let label = class_names.get(b.class_id).ok_or_else(|| {
                DomainError::InvariantViolation(format!(
                    "class_id {} fuera del vocabulario de {} clases",
                    b.class_id,
                    class_names.len()
                ))
            })?;

            let (x1, y1) = transform.inverse(b.x1, b.y1);
            let (x2, y2) = transform.inverse(b.x2, b.y2);
            let (xa, xb) = (unit(x1 / width), unit(x2 / width));
            let (ya, yb) = (unit(y1 / height), unit(y2 / height));

            Ok(Detection {
                label: label.to_string(),
                score: b.confidence,
                xmin: xa.min(xb),
                ymin: ya.min(yb),
                xmax: xa.max(xb),
                ymax: ya.max(yb),
            })
        })
        .collect()
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::labels::COCO_CLASSES;

    fn cand(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize) -> CandidateBox {
        CandidateBox { x1, y1, x2, y2, confidence: 0.8, class_id, index: 0 }
    }

    #[test]
    fn undoes_letterbox_and_normalizes() {
        // 640x480 -> 320: escala 0.5, pad_y 40
        let t = LetterboxTransform::new(640, 480, 320);
        let boxes = [cand(80.0, 100.0, 160.0, 220.0, 0)];
        let dets = assemble(&boxes, &t, 640, 480, &COCO_CLASSES).unwrap();
        let d = &dets[0];
        assert_eq!(d.label, "person");
        assert_eq!(d.score, 0.8);
        assert!((d.xmin - 0.25).abs() < 1e-6);
        assert!((d.xmax - 0.5).abs() < 1e-6);
        assert!((d.ymin - 0.25).abs() < 1e-6);
        assert!((d.ymax - 0.75).abs() < 1e-6);
    }

    #[test]
    fn padding_region_box_is_clamped() {
        let t = LetterboxTransform::new(640, 480, 320);
        // enteramente dentro de la banda superior de padding
        let boxes = [cand(-20.0, 0.0, 400.0, 30.0, 2)];
        let d = &assemble(&boxes, &t, 640, 480, &COCO_CLASSES).unwrap()[0];
        assert_eq!((d.xmin, d.xmax), (0.0, 1.0));
        assert_eq!((d.ymin, d.ymax), (0.0, 0.0));
    }

    #[test]
    fn inverted_corners_are_reordered() {
        let t = LetterboxTransform::new(320, 320, 320);
        let boxes = [cand(200.0, 200.0, 100.0, 100.0, 0)];
        let d = &assemble(&boxes, &t, 320, 320, &COCO_CLASSES).unwrap()[0];
        assert!(d.xmin <= d.xmax && d.ymin <= d.ymax);
    }

    #[test]
    fn unknown_class_fails_loudly() {
        let t = LetterboxTransform::new(320, 320, 320);
        let boxes = [cand(0.0, 0.0, 10.0, 10.0, 80)];
        assert!(matches!(
            assemble(&boxes, &t, 320, 320, &COCO_CLASSES),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn preserves_order() {
        let t = LetterboxTransform::new(320, 320, 320);
        let boxes = [cand(0.0, 0.0, 10.0, 10.0, 41), cand(0.0, 0.0, 10.0, 10.0, 0)];
        let dets = assemble(&boxes, &t, 320, 320, &COCO_CLASSES).unwrap();
        assert_eq!(dets[0].label, "cup");
        assert_eq!(dets[1].label, "person");
    }
}
