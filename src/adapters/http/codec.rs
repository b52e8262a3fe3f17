use base64::{prelude::BASE64_STANDARD, Engine};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::frame::{Frame, PixelOrder};

/// Decodifica JPEG/PNG/WebP/BMP a un [`Frame`] RGB de 3 canales.
/// El canal alfa se descarta y las imágenes en gris se expanden.
pub fn decode_frame(bytes: &[u8]) -> DomainResult<Frame> {
    if bytes.is_empty() {
        return Err(DomainError::InvalidInput("imagen vacía".into()));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| DomainError::InvalidInput(format!("no se pudo decodificar la imagen: {}", e)))?;
    let rgb = img.into_rgb8();
    let (width, height) = rgb.dimensions();
    Frame::new(width, height, PixelOrder::Rgb, rgb.into_raw())
}

/// Igual que [`decode_frame`] pero desde base64, admitiendo el prefijo `data:image/...;base64,`.
pub fn decode_base64_frame(encoded: &str) -> DomainResult<Frame> {
    let payload = match encoded.split_once(";base64,") {
        Some((_, data)) => data,
        None => encoded,
    };
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::InvalidInput(format!("base64 inválido: {}", e)))?;
    decode_frame(&bytes)
}
