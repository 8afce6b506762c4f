// Archivo: kind.rs
// Propósito: tipos de solicitud soportados. El `RequestKind` selecciona la
// plantilla de workflow aplicable; no existe un valor "desconocido" porque
// una solicitud sin plantilla no puede enrutar a ningún aprobador.
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enum para identificar los tipos de solicitud que soporta el workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
  Achievement,
  Certificate,
  Maintenance,
  LibraryResource,
  LibraryTiming,
}

impl RequestKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      RequestKind::Achievement => "achievement",
      RequestKind::Certificate => "certificate",
      RequestKind::Maintenance => "maintenance",
      RequestKind::LibraryResource => "library_resource",
      RequestKind::LibraryTiming => "library_timing",
    }
  }

  /// Lista completa de kinds, útil para registros y pruebas exhaustivas.
  pub fn all() -> &'static [RequestKind] {
    &[RequestKind::Achievement,
      RequestKind::Certificate,
      RequestKind::Maintenance,
      RequestKind::LibraryResource,
      RequestKind::LibraryTiming]
  }
}

impl fmt::Display for RequestKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for RequestKind {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "achievement" => Ok(RequestKind::Achievement),
      "certificate" => Ok(RequestKind::Certificate),
      "maintenance" => Ok(RequestKind::Maintenance),
      "library_resource" => Ok(RequestKind::LibraryResource),
      "library_timing" => Ok(RequestKind::LibraryTiming),
      other => Err(DomainError::ValidationError(format!("tipo de solicitud desconocido: {}", other))),
    }
  }
}
