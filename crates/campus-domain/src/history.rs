// Archivo: history.rs
// Propósito: entradas del historial de auditoría. El historial es una
// secuencia sólo-añadir: cada transición que cambia el estado agrega
// exactamente una entrada y las anteriores nunca se reescriben.
use crate::{DomainError, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Acción registrada por una entrada de historial.
///
/// `Forwarded` es la variante de aprobación intermedia: el aprobador dio el
/// visto bueno y la solicitud pasó a la siguiente etapa (`forwarded_to`).
/// `Approved` es la aprobación terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
  Approved,
  Forwarded,
  Rejected,
}

impl AuditAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      AuditAction::Approved => "approved",
      AuditAction::Forwarded => "forwarded",
      AuditAction::Rejected => "rejected",
    }
  }
}

impl fmt::Display for AuditAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for AuditAction {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "approved" => Ok(AuditAction::Approved),
      "forwarded" => Ok(AuditAction::Forwarded),
      "rejected" => Ok(AuditAction::Rejected),
      other => Err(DomainError::ValidationError(format!("acción desconocida: {}", other))),
    }
  }
}

/// Una entrada del historial: quién hizo qué, en qué rol y cuándo.
///
/// `forwarded_to` deja constancia explícita de la decisión de enrutado
/// cuando la acción es `Forwarded`. `command_id` es la clave de
/// idempotencia opcional que aportó el caller de la transición.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub role: Role,
  pub actor_name: String,
  pub action: AuditAction,
  pub comment: Option<String>,
  pub forwarded_to: Option<Role>,
  pub command_id: Option<uuid::Uuid>,
  pub at: DateTime<Utc>,
}
