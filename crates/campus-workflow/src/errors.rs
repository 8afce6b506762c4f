use campus_domain::Role;
use thiserror::Error;

// Errores comunes del motor de transiciones.
//
// Este enum centraliza los errores que pueden ocurrir durante una
// transición: errores de almacenamiento (`StoreError`), errores del dominio
// (`DomainError`), violaciones de precondición (aprobador fuera de turno,
// solicitud ya cerrada), conflictos de concurrencia y enrutado inválido.
//
// El motor nunca reintenta por su cuenta: la política de reintento es del
// caller, y sólo `Store(Storage(_))` es seguro de reintentar tal cual.
#[derive(Error, Debug)]
pub enum WorkflowError {
  /// Errores originados por la capa de almacenamiento de solicitudes.
  #[error("Error de almacenamiento: {0}")]
  Store(#[from] requests::StoreError),

  /// Errores originados por la entidad de dominio.
  #[error("Error de dominio: {0}")]
  Domain(#[from] campus_domain::DomainError),

  /// El actor no es el aprobador vigente de la solicitud.
  #[error("Aprobador fuera de turno: la solicitud espera a {expected} y actuó {got}")]
  WrongApprover { expected: Role, got: Role },

  /// La solicitud ya alcanzó un estado terminal (absorbente).
  #[error("Solicitud cerrada: {0}")]
  StaleOrTerminal(String),

  /// El guard de versión detectó una escritura concurrente ganadora.
  #[error("Modificación concurrente: {0}")]
  ConcurrentModification(String),

  /// El rol actual no pertenece a la plantilla del kind. Con las tablas de
  /// enrutado totales esto no debería ocurrir, pero es un error definido y
  /// no un panic.
  #[error("Enrutado inválido: {0}")]
  InvalidRouting(String),

  /// Errores de serialización/deserialización JSON.
  #[error("Error de serialización: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Errores de validación local (por ejemplo rechazo sin motivo).
  #[error("Error de validación: {0}")]
  Validation(String),

  /// Error genérico: captura otros tipos de errores no tipados.
  #[error("Otro error: {0}")]
  Other(String),
}
