use image::{
    imageops::{self, FilterType},
    ImageBuffer, Rgb, RgbImage,
};
use ndarray::Array4;

use super::errors::{DomainError, DomainResult};
use super::frame::{Frame, CHANNELS};
use super::geometry::LetterboxTransform;

/// Gris medio con el que se rellena el lienzo letterbox.
pub const PAD_VALUE: u8 = 114;

/// Tensor `[1, 3, S, S]` listo para el modelo junto con la transformación usada,
/// que el ensamblador necesita para deshacer el letterbox.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub tensor: Array4<f32>,
    pub transform: LetterboxTransform,
}

/// Redimensiona (lineal) y centra el frame en un lienzo `S x S` gris.
/// Conserva el orden de canales del frame.
pub fn letterbox(frame: &Frame, transform: &LetterboxTransform) -> DomainResult<RgbImage> {
    let source = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(frame.width(), frame.height(), frame.as_bytes())
        .ok_or_else(|| DomainError::InvalidInput("buffer de frame inconsistente".into()))?;

    let (scaled_w, scaled_h) = transform.scaled_size(frame.width(), frame.height());
    let resized = imageops::resize(&source, scaled_w, scaled_h, FilterType::Triangle);

    let size = transform.model_size;
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; CHANNELS]));
    imageops::replace(&mut canvas, &resized, transform.pad_x as i64, transform.pad_y as i64);
    Ok(canvas)
}

pub fn preprocess(frame: &Frame, model_size: u32) -> DomainResult<Preprocessed> {
    let transform = LetterboxTransform::new(frame.width(), frame.height(), model_size);
    let canvas = letterbox(frame, &transform)?;

    // HWC entrelazado -> NCHW planar RGB, normalizado a [0,1]
    let size = model_size as usize;
    let order = frame.order();
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for plane in 0..CHANNELS {
            tensor[[0, plane, y as usize, x as usize]] = pixel[order.source_channel(plane)] as f32 / 255.0;
        }
    }

    Ok(Preprocessed { tensor, transform })
}
