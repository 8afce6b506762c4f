// Archivo: repository.rs
// Propósito: definir los traits `RequestRepository` y
// `NotificationRepository`. Describen el contrato que deben implementar las
// persistencias (Diesel, in-memory, etc.).
use crate::domain::PersistResult;
use crate::errors::Result;
use campus_domain::{NotificationRecord, RequestKind, Role, WorkflowRequest};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Contrato del almacén de solicitudes con workflow.
///
/// Lógicamente cada solicitud vive particionada por su `subject_id` bajo un
/// namespace por `kind`, con el historial como sub-colección del mismo
/// registro: estado e historial siempre viajan juntos en una escritura.
/// Toda mutación posterior al alta pasa por `persist_transition`; no existen
/// parches de campos sueltos.
pub trait RequestRepository: Send + Sync {
    /// Inserta una solicitud recién enviada. Falla con `Conflict` si el id
    /// ya existe.
    fn create_request(&self, request: &WorkflowRequest) -> Result<Uuid>;

    /// Carga una solicitud completa (estado + historial ordenado).
    fn get_request(&self, request_id: &Uuid) -> Result<WorkflowRequest>;

    /// Persiste el resultado de una transición. `expected_version` es el
    /// token optimista: si no coincide con la versión almacenada devuelve
    /// `PersistResult::Conflict` sin tocar nada. La escritura de estado y la
    /// nueva entrada de historial son atómicas (todo o nada).
    fn persist_transition(&self, request: &WorkflowRequest, expected_version: i64) -> Result<PersistResult>;

    /// Worklist de un rol: solicitudes en fase pending cuyo aprobador
    /// vigente es `role`, las más recientes primero.
    fn list_actionable(&self, role: Role) -> Result<Vec<WorkflowRequest>>;

    /// Solicitudes (en curso y terminales) de un sujeto, recientes primero.
    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<WorkflowRequest>>;

    /// Solicitudes de un kind, recientes primero. Lectura para los
    /// consumidores de reportes/exportación.
    fn list_by_kind(&self, kind: RequestKind) -> Result<Vec<WorkflowRequest>>;

    /// Solicitudes modificadas estrictamente después de `since`. Cursor de
    /// sondeo para refrescar worklists sin releer todo el almacén.
    fn list_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowRequest>>;
}

/// Contrato del almacén de notificaciones. Es un recurso independiente del
/// de solicitudes y puede fallar de forma independiente.
pub trait NotificationRepository: Send + Sync {
    /// Añade un registro de notificación.
    fn append(&self, record: &NotificationRecord) -> Result<Uuid>;

    /// Notificaciones de un sujeto, las más recientes primero.
    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<NotificationRecord>>;

    /// Marca una notificación como leída.
    fn mark_read(&self, notification_id: &Uuid) -> Result<()>;
}
