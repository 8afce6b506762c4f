// Archivo: errors.rs
// Propósito: definir los errores de la capa de almacenamiento y el alias
// Result<T> usado por los repositorios.
use thiserror::Error;

/// Errores comunes del almacén de solicitudes.
///
/// - `NotFound`: entidad no encontrada.
/// - `Conflict`: conflicto de concurrencia o violación de la disciplina de
///   historial (el historial sólo puede crecer de a una entrada).
/// - `Storage`: error al acceder al almacenamiento externo. Es la única
///   clase que un caller puede reintentar tal cual.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entidad no encontrada (solicitud o notificación).
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// Conflicto optimista (version/expected mismatch).
    #[error("Conflicto: {0}")]
    Conflict(String),
    /// Error genérico de almacenamiento (BD, pool, etc.).
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Otro tipo de error.
    #[error("Otro: {0}")]
    Other(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, StoreError>;
