// Archivo: notification.rs
// Propósito: registro de notificación creado como efecto secundario de una
// transición. Vive en un almacén independiente del de solicitudes y su
// escritura es best-effort: perder una notificación nunca invalida la
// transición ya confirmada.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notificación dirigida al sujeto de una solicitud.
///
/// `event` es un código estable tipo "achievement_forwarded" para que los
/// consumidores filtren sin parsear `message`; `title` y `message` son el
/// texto legible que muestran los dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
  pub id: Uuid,
  pub subject_id: String,
  pub event: String,
  pub title: String,
  pub message: String,
  pub related_request_id: Uuid,
  pub read: bool,
  pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
  pub fn new(subject_id: &str, event: String, title: String, message: String, related_request_id: Uuid) -> Self {
    Self { id: Uuid::new_v4(),
           subject_id: subject_id.to_string(),
           event,
           title,
           message,
           related_request_id,
           read: false,
           created_at: Utc::now() }
  }
}
