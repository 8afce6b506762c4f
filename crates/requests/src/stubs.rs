// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un repositorio de solicitudes (`InMemoryRequestRepository`) y uno
// de notificaciones (`InMemoryNotificationRepository`). No son durables y
// se usan para demos o pruebas locales; el control optimista y la
// disciplina de historial son los mismos que exige el contrato real.
use crate::domain::PersistResult;
use crate::errors::{Result, StoreError};
use crate::repository::{NotificationRepository, RequestRepository};
use campus_domain::{NotificationRecord, RequestKind, Role, WorkflowRequest};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Repositorio de solicitudes en memoria.
pub struct InMemoryRequestRepository {
    /// Solicitudes indexadas por id; el particionado por sujeto se resuelve
    /// filtrando, igual que harían los índices del almacén real.
    requests: Mutex<HashMap<Uuid, WorkflowRequest>>,
}

impl InMemoryRequestRepository {
    /// Crea una nueva instancia del repositorio en memoria.
    pub fn new() -> Self {
        Self { requests: Mutex::new(HashMap::new()) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `StoreError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, StoreError> {
        m.lock().map_err(|e| StoreError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    fn sorted_desc(mut items: Vec<WorkflowRequest>) -> Vec<WorkflowRequest> {
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        items
    }
}

impl Default for InMemoryRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRepository for InMemoryRequestRepository {
    /// Inserta la solicitud si su id no existe todavía.
    fn create_request(&self, request: &WorkflowRequest) -> Result<Uuid> {
        let mut map = self.lock(&self.requests)?;
        if map.contains_key(&request.id()) {
            return Err(StoreError::Conflict(format!("request {} ya existe", request.id())));
        }
        map.insert(request.id(), request.clone());
        Ok(request.id())
    }

    fn get_request(&self, request_id: &Uuid) -> Result<WorkflowRequest> {
        let map = self.lock(&self.requests)?;
        map.get(request_id)
           .cloned()
           .ok_or(StoreError::NotFound(format!("request {}", request_id)))
    }

    /// Persiste una transición aplicando control optimista por
    /// `expected_version` y deduplicación por `command_id` cuando la nueva
    /// entrada de historial lo trae.
    fn persist_transition(&self, request: &WorkflowRequest, expected_version: i64) -> Result<PersistResult> {
        let mut map = self.lock(&self.requests)?;
        let stored = map.get_mut(&request.id())
                        .ok_or(StoreError::NotFound(format!("request {}", request.id())))?;

        // Optimistic concurrency: check expected_version
        if stored.version() != expected_version {
            return Ok(PersistResult::Conflict);
        }

        // Idempotency: if the appended entry carries a command_id we already
        // recorded, return the current version (no change)
        if let Some(new_entry) = request.history().last() {
            if let Some(cmd_id) = new_entry.command_id {
                if stored.has_command(&cmd_id) {
                    return Ok(PersistResult::Ok { new_version: stored.version() });
                }
            }
        }

        // Append-only discipline: exactly one new history entry per write
        if request.history().len() != stored.history().len() + 1 {
            return Err(StoreError::Conflict(format!("historial pasó de {} a {} entradas; se esperaba +1",
                                                    stored.history().len(),
                                                    request.history().len())));
        }

        let new_version = stored.version().saturating_add(1);
        let mut updated = request.clone();
        updated.set_version(new_version);
        *stored = updated;
        Ok(PersistResult::Ok { new_version })
    }

    fn list_actionable(&self, role: Role) -> Result<Vec<WorkflowRequest>> {
        let map = self.lock(&self.requests)?;
        Ok(Self::sorted_desc(map.values()
                                .filter(|r| r.current_approver_role() == Some(role))
                                .cloned()
                                .collect()))
    }

    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<WorkflowRequest>> {
        let map = self.lock(&self.requests)?;
        Ok(Self::sorted_desc(map.values()
                                .filter(|r| r.subject_id() == subject_id)
                                .cloned()
                                .collect()))
    }

    fn list_by_kind(&self, kind: RequestKind) -> Result<Vec<WorkflowRequest>> {
        let map = self.lock(&self.requests)?;
        Ok(Self::sorted_desc(map.values().filter(|r| r.kind() == kind).cloned().collect()))
    }

    fn list_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowRequest>> {
        let map = self.lock(&self.requests)?;
        Ok(Self::sorted_desc(map.values().filter(|r| r.updated_at() > since).cloned().collect()))
    }
}

/// Almacén de notificaciones en memoria.
pub struct InMemoryNotificationRepository {
    records: Mutex<HashMap<Uuid, NotificationRecord>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self { records: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, HashMap<Uuid, NotificationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| StoreError::Storage(format!("mutex poisoned: {:?}", e)))
    }
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationRepository for InMemoryNotificationRepository {
    fn append(&self, record: &NotificationRecord) -> Result<Uuid> {
        let mut map = self.lock()?;
        map.insert(record.id, record.clone());
        Ok(record.id)
    }

    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<NotificationRecord>> {
        let map = self.lock()?;
        let mut items: Vec<NotificationRecord> =
            map.values().filter(|n| n.subject_id == subject_id).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    fn mark_read(&self, notification_id: &Uuid) -> Result<()> {
        let mut map = self.lock()?;
        let rec = map.get_mut(notification_id)
                     .ok_or(StoreError::NotFound(format!("notification {}", notification_id)))?;
        rec.read = true;
        Ok(())
    }
}
