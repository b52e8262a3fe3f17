use serde::{Deserialize, Serialize};

/// Transformación letterbox entre la imagen original y la entrada cuadrada del modelo.
///
/// `scale = min(S/h, S/w)`; la imagen escalada se centra en el lienzo de
/// `S x S` con padding truncado (el píxel sobrante va abajo/derecha).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterboxTransform {
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub model_size: u32,
}

impl LetterboxTransform {
    /// El llamador garantiza `width > 0` y `height > 0`.
    pub fn new(width: u32, height: u32, model_size: u32) -> Self {
        let size = model_size as f32;
        let scale = (size / height as f32).min(size / width as f32);
        let (scaled_w, scaled_h) = scaled_dims(width, height, scale, model_size);

        Self {
            scale,
            pad_x: (model_size - scaled_w) / 2,
            pad_y: (model_size - scaled_h) / 2,
            model_size,
        }
    }

    /// Dimensiones `(ancho, alto)` de la imagen redimensionada dentro del lienzo.
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        scaled_dims(width, height, self.scale, self.model_size)
    }

    /// Espacio original -> espacio del modelo.
    pub fn forward(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.pad_x as f32,
            y * self.scale + self.pad_y as f32,
        )
    }

    /// Espacio del modelo -> espacio original (en píxeles).
    pub fn inverse(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

// Nunca 0 (el resize lo necesita) ni mayor que el lienzo por redondeo.
fn scaled_dims(width: u32, height: u32, scale: f32, model_size: u32) -> (u32, u32) {
    let w = (width as f32 * scale).round() as u32;
    let h = (height as f32 * scale).round() as u32;
    (w.clamp(1, model_size), h.clamp(1, model_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_vga_into_320() {
        // 480 de alto x 640 de ancho
        let t = LetterboxTransform::new(640, 480, 320);
        assert_eq!(t.scale, 0.5);
        assert_eq!(t.scaled_size(640, 480), (320, 240));
        assert_eq!(t.pad_x, 0);
        assert_eq!(t.pad_y, 40);
    }

    #[test]
    fn portrait_pads_horizontally() {
        let t = LetterboxTransform::new(480, 640, 640);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.pad_x, 80);
        assert_eq!(t.pad_y, 0);
    }

    #[test]
    fn odd_remainder_truncates_pad() {
        // 320 x 317 -> la imagen escalada mide 317 de alto, sobran 3 píxeles
        let t = LetterboxTransform::new(320, 317, 320);
        let (_, h) = t.scaled_size(320, 317);
        assert_eq!(h, 317);
        assert_eq!(t.pad_y, 1);
        assert_eq!(t.pad_y * 2 + h + 1, 320);
    }

    #[test]
    fn inverse_undoes_forward() {
        let t = LetterboxTransform::new(1280, 720, 640);
        let (mx, my) = t.forward(100.0, 200.0);
        let (x, y) = t.inverse(mx, my);
        assert!((x - 100.0).abs() < 1e-3);
        assert!((y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let t = LetterboxTransform::new(4000, 1, 320);
        assert_eq!(t.scaled_size(4000, 1), (320, 1));
        assert_eq!(t.pad_y, 159);
    }
}
