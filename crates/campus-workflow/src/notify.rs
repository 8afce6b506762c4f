// Archivo: notify.rs
// Propósito: emisor de notificaciones. Traduce la última entrada de
// historial a un `NotificationRecord` legible y lo añade al almacén de
// notificaciones. La escritura es fire-and-forget: un fallo aquí se loguea
// y la transición ya confirmada sigue siendo válida.
use campus_domain::{AuditAction, NotificationRecord, WorkflowRequest};
use requests::NotificationRepository;
use std::sync::Arc;

pub struct Notifier<N>
    where N: NotificationRepository
{
    store: Arc<N>,
}

impl<N> Notifier<N> where N: NotificationRepository
{
    pub fn new(store: Arc<N>) -> Self {
        Self { store }
    }

    /// Emite la notificación de la transición que acaba de confirmarse.
    pub fn notify_transition(&self, request: &WorkflowRequest) {
        let Some(record) = build_record(request) else {
            return;
        };
        if let Err(e) = self.store.append(&record) {
            log::warn!("no se pudo registrar la notificación de la solicitud {}: {}", request.id(), e);
        }
    }
}

/// Construye el registro a partir de la última entrada del historial.
/// Devuelve `None` si la solicitud no registra transiciones todavía.
fn build_record(request: &WorkflowRequest) -> Option<NotificationRecord> {
    let entry = request.history().last()?;
    let kind = request.kind();
    let (event, title, message) = match entry.action {
        AuditAction::Forwarded => {
            let next = entry.forwarded_to.map(|r| r.to_string()).unwrap_or_else(|| "next stage".to_string());
            (format!("{}_forwarded", kind),
             format!("{} request forwarded", kind),
             format!("approved by {} and forwarded to {}", entry.role, next))
        }
        AuditAction::Approved => {
            (format!("{}_approved", kind),
             format!("{} request approved", kind),
             format!("approved by {}", entry.role))
        }
        AuditAction::Rejected => {
            let reason = entry.comment.clone().unwrap_or_default();
            (format!("{}_rejected", kind),
             format!("{} request rejected", kind),
             format!("rejected by {}: {}", entry.role, reason))
        }
    };
    Some(NotificationRecord::new(request.subject_id(), event, title, message, request.id()))
}
