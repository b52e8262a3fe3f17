use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    /// El backend de inferencia no está cargado o ha fallado.
    #[error("Inferencia no disponible: {0}")]
    InferenceUnavailable(String),
    #[error("Forma de salida del modelo inválida: esperada {expected}, recibida {got}")]
    InvalidOutputShape { expected: String, got: String },
    /// Ruptura del contrato entre el modelo y el decodificador.
    #[error("Invariante violado: {0}")]
    InvariantViolation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
