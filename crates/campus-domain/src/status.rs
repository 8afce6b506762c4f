// Archivo: status.rs
// Propósito: estado de una solicitud modelado como el par (fase, etapa).
// La fase es el estado grueso (pending/approved/rejected) y la etapa es el
// rol asociado: dónde está pendiente, o dónde fue rechazada. El rol
// aprobador vigente se deriva del par en lugar de guardarse aparte, así la
// consistencia "aprobador no nulo sii pendiente" queda garantizada por
// construcción.
use crate::{DomainError, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fase gruesa de una solicitud. `Approved` y `Rejected` son absorbentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Pending,
  Approved,
  Rejected,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Pending => "pending",
      Phase::Approved => "approved",
      Phase::Rejected => "rejected",
    }
  }

  pub fn is_terminal(&self) -> bool {
    !matches!(self, Phase::Pending)
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Phase {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "pending" => Ok(Phase::Pending),
      "approved" => Ok(Phase::Approved),
      "rejected" => Ok(Phase::Rejected),
      other => Err(DomainError::ValidationError(format!("fase desconocida: {}", other))),
    }
  }
}

/// Estado completo de una solicitud: fase + etapa.
///
/// Combinaciones válidas:
/// - `pending` con etapa `Some(rol)`: pendiente en el worklist de ese rol.
/// - `rejected` con etapa `Some(rol)`: rechazada por ese rol.
/// - `approved` con etapa `None`: aprobación terminal (el último aprobador
///   queda registrado en el historial, no aquí).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
  phase: Phase,
  stage: Option<Role>,
}

impl RequestStatus {
  pub fn pending_at(role: Role) -> Self {
    Self { phase: Phase::Pending, stage: Some(role) }
  }

  pub fn approved_terminal() -> Self {
    Self { phase: Phase::Approved, stage: None }
  }

  pub fn rejected_at(role: Role) -> Self {
    Self { phase: Phase::Rejected, stage: Some(role) }
  }

  /// Reconstruye un estado desde sus partes persistidas, validando que la
  /// combinación sea una de las admitidas.
  pub fn from_parts(phase: Phase, stage: Option<Role>) -> Result<Self, DomainError> {
    match (phase, stage) {
      (Phase::Pending, None) => {
        Err(DomainError::ValidationError("estado pending sin etapa asociada".into()))
      }
      (Phase::Approved, Some(r)) => {
        Err(DomainError::ValidationError(format!("estado approved no admite etapa ({})", r)))
      }
      (phase, stage) => Ok(Self { phase, stage }),
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn stage(&self) -> Option<Role> {
    self.stage
  }

  /// Rol cuyo worklist contiene la solicitud; `None` en estados terminales.
  pub fn current_approver_role(&self) -> Option<Role> {
    match self.phase {
      Phase::Pending => self.stage,
      _ => None,
    }
  }

  pub fn is_terminal(&self) -> bool {
    self.phase.is_terminal()
  }

  /// Cadena legible derivada del par, por ejemplo "pending at hod" o
  /// "rejected at teacher". Los strings no se guardan: siempre se derivan.
  pub fn label(&self) -> String {
    match (self.phase, self.stage) {
      (Phase::Approved, _) => "approved".to_string(),
      (Phase::Pending, Some(r)) => format!("pending at {}", r),
      (Phase::Rejected, Some(r)) => format!("rejected at {}", r),
      // from_parts impide pending sin etapa; esta rama sólo cubre datos
      // construidos a mano.
      (phase, None) => phase.as_str().to_string(),
    }
  }
}
