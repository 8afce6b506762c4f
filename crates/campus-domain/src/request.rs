// Archivo: request.rs
// Propósito: la entidad central `WorkflowRequest` y sus cambios de estado
// puros. Los métodos de transición no hacen I/O: validan la precondición
// de fase, actualizan el par (fase, etapa) y añaden exactamente una entrada
// de historial. La orquestación (carga, gating por rol, persistencia,
// notificación) vive en campus-workflow.
use crate::{AuditAction, DomainError, HistoryEntry, Phase, RequestKind, RequestStatus, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Solicitud con workflow: el registro que viaja por la cadena de
/// aprobadores acumulando historial.
///
/// Invariantes que mantiene la propia entidad:
/// - el historial sólo crece y sus timestamps nunca retroceden;
/// - una vez en fase terminal no se admite ningún cambio más;
/// - cada cambio de estado añade exactamente una entrada de historial.
///
/// `version` es el token de concurrencia optimista: el repositorio lo
/// compara contra el valor esperado al persistir una transición.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRequest {
  id: Uuid,
  kind: RequestKind,
  subject_id: String,
  payload: JsonValue,
  status: RequestStatus,
  history: Vec<HistoryEntry>,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl WorkflowRequest {
  /// Crea una solicitud recién enviada, pendiente en la primera etapa de su
  /// plantilla. El historial arranca vacío: el envío no es una transición.
  pub fn submit(kind: RequestKind,
                subject_id: &str,
                payload: JsonValue,
                first_stage: Role)
                -> Result<Self, DomainError> {
    if subject_id.trim().is_empty() {
      return Err(DomainError::ValidationError("subject_id no puede estar vacío".to_string()));
    }
    if !payload.is_object() {
      return Err(DomainError::ValidationError("el payload debe ser un objeto JSON".to_string()));
    }
    let now = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              kind,
              subject_id: subject_id.trim().to_string(),
              payload,
              status: RequestStatus::pending_at(first_stage),
              history: Vec::new(),
              version: 0,
              created_at: now,
              updated_at: now })
  }

  /// Reconstruye una solicitud desde sus partes persistidas. Valida las
  /// mismas condiciones que `submit` más la coherencia fase/etapa.
  pub fn from_parts(id: Uuid,
                    kind: RequestKind,
                    subject_id: String,
                    payload: JsonValue,
                    status: RequestStatus,
                    history: Vec<HistoryEntry>,
                    version: i64,
                    created_at: DateTime<Utc>,
                    updated_at: DateTime<Utc>)
                    -> Result<Self, DomainError> {
    if subject_id.trim().is_empty() {
      return Err(DomainError::ValidationError("subject_id no puede estar vacío".to_string()));
    }
    if version < 0 {
      return Err(DomainError::ValidationError(format!("versión negativa: {}", version)));
    }
    Ok(Self { id, kind, subject_id, payload, status, history, version, created_at, updated_at })
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn kind(&self) -> RequestKind {
    self.kind
  }

  pub fn subject_id(&self) -> &str {
    &self.subject_id
  }

  pub fn payload(&self) -> &JsonValue {
    &self.payload
  }

  pub fn status(&self) -> RequestStatus {
    self.status
  }

  pub fn history(&self) -> &[HistoryEntry] {
    &self.history
  }

  pub fn version(&self) -> i64 {
    self.version
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn updated_at(&self) -> DateTime<Utc> {
    self.updated_at
  }

  /// Rol cuyo worklist contiene hoy esta solicitud (None si terminal).
  pub fn current_approver_role(&self) -> Option<Role> {
    self.status.current_approver_role()
  }

  pub fn is_terminal(&self) -> bool {
    self.status.is_terminal()
  }

  /// Indica si el historial ya registra una transición con esta clave de
  /// idempotencia.
  pub fn has_command(&self, command_id: &Uuid) -> bool {
    self.history.iter().any(|e| e.command_id.as_ref() == Some(command_id))
  }

  /// Fija la versión confirmada por el repositorio tras una escritura.
  pub fn set_version(&mut self, version: i64) {
    self.version = version;
  }

  /// Aprobación intermedia: la solicitud queda pendiente en `next` y la
  /// entrada registra la decisión de enrutado en `forwarded_to`.
  pub fn forward_to(&mut self,
                    next: Role,
                    acting_role: Role,
                    actor_name: &str,
                    comment: Option<String>,
                    command_id: Option<Uuid>)
                    -> Result<(), DomainError> {
    self.ensure_pending()?;
    self.status = RequestStatus::pending_at(next);
    self.push_entry(acting_role, actor_name, AuditAction::Forwarded, comment, Some(next), command_id);
    Ok(())
  }

  /// Aprobación terminal: fase `approved`, sin etapa, fuera de todo worklist.
  pub fn approve_final(&mut self,
                       acting_role: Role,
                       actor_name: &str,
                       comment: Option<String>,
                       command_id: Option<Uuid>)
                       -> Result<(), DomainError> {
    self.ensure_pending()?;
    self.status = RequestStatus::approved_terminal();
    self.push_entry(acting_role, actor_name, AuditAction::Approved, comment, None, command_id);
    Ok(())
  }

  /// Rechazo: la etapa registra dónde se rechazó. El motivo ya viene
  /// validado por el motor (aquí sólo se persiste).
  pub fn reject(&mut self,
                acting_role: Role,
                actor_name: &str,
                comment: String,
                command_id: Option<Uuid>)
                -> Result<(), DomainError> {
    self.ensure_pending()?;
    self.status = RequestStatus::rejected_at(acting_role);
    self.push_entry(acting_role, actor_name, AuditAction::Rejected, Some(comment), None, command_id);
    Ok(())
  }

  fn ensure_pending(&self) -> Result<(), DomainError> {
    if self.status.phase() != Phase::Pending {
      return Err(DomainError::ValidationError(format!("la solicitud {} ya es terminal ({})",
                                                      self.id,
                                                      self.status.label())));
    }
    Ok(())
  }

  fn push_entry(&mut self,
                role: Role,
                actor_name: &str,
                action: AuditAction,
                comment: Option<String>,
                forwarded_to: Option<Role>,
                command_id: Option<Uuid>) {
    // Timestamps del historial: nunca por detrás de la entrada anterior
    let now = Utc::now();
    let at = match self.history.last() {
      Some(prev) if prev.at > now => prev.at,
      _ => now,
    };
    self.history.push(HistoryEntry { role,
                                     actor_name: actor_name.to_string(),
                                     action,
                                     comment,
                                     forwarded_to,
                                     command_id,
                                     at });
    self.updated_at = at;
  }
}
