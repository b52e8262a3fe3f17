use super::errors::{DomainError, DomainResult};

pub const CHANNELS: usize = 3;

/// Orden de canales del buffer entrelazado de un [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    Rgb,
    Bgr,
}

impl PixelOrder {
    /// Índice del canal de origen que alimenta el plano RGB `plane` (0 = R).
    pub fn source_channel(self, plane: usize) -> usize {
        match self {
            PixelOrder::Rgb => plane,
            PixelOrder::Bgr => CHANNELS - 1 - plane,
        }
    }
}

/// Imagen decodificada de 3 canales entrelazados (HWC), lista para el pipeline.
///
/// La capa de transporte la crea y el pipeline la consume una sola vez.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    order: PixelOrder,
    data: Vec<u8>,
}

impl Frame {
    /// Valida dimensiones y tamaño del buffer. Los frames degenerados
    /// (0 de ancho o alto) se rechazan aquí, antes de llegar al preprocesado.
    pub fn new(width: u32, height: u32, order: PixelOrder, data: Vec<u8>) -> DomainResult<Self> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidInput(format!(
                "dimensiones degeneradas {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(DomainError::InvalidInput(format!(
                "longitud de buffer {} distinta de la esperada {}",
                data.len(),
                expected
            )));
        }
        Ok(Self { width, height, order, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> PixelOrder {
        self.order
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
