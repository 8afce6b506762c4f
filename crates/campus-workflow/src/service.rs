// Archivo: service.rs
// Propósito: implementar `ApprovalService`, la capa orquestadora que expone
// las operaciones de alto nivel (crear solicitud, transicionar, consultar
// worklists y notificaciones). Esta capa es la que invocan los dashboards y
// el binario de administración.
use crate::engine::{Actor, TransitionAction, TransitionCommand, TransitionEngine};
use crate::errors::WorkflowError;
use crate::templates::WorkflowTemplate;
use campus_domain::{NotificationRecord, RequestKind, Role, WorkflowRequest};
use campus_persistence::{DieselNotificationRepository, DieselRequestRepository};
use chrono::{DateTime, Utc};
use requests::{NotificationRepository, RequestRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de alto nivel sobre solicitudes con workflow.
///
/// Orquesta el repositorio, el motor de transiciones y el almacén de
/// notificaciones. Los consumidores de lectura (dashboards, exportación)
/// usan los `list_*`; toda mutación pasa por `transition` y sus atajos.
pub struct ApprovalService<R, N>
    where R: RequestRepository,
          N: NotificationRepository
{
    repo: Arc<R>,
    notifications: Arc<N>,
    engine: TransitionEngine<R, N>,
}

impl<R, N> ApprovalService<R, N>
    where R: RequestRepository + 'static,
          N: NotificationRepository + 'static
{
    /// Crea el servicio inyectando ambos almacenes. El `TransitionEngine`
    /// se construye internamente y se reusa.
    pub fn new(repo: Arc<R>, notifications: Arc<N>) -> Self {
        let engine = TransitionEngine::new(repo.clone(), notifications.clone());
        Self { repo, notifications, engine }
    }

    /// Alta de una solicitud: siembra el estado con la primera etapa de la
    /// plantilla del kind y la deja en el worklist de ese rol. Devuelve el
    /// id asignado.
    pub fn create_request(&self,
                          kind: RequestKind,
                          subject_id: &str,
                          payload: serde_json::Value)
                          -> Result<Uuid, WorkflowError> {
        let first_stage = WorkflowTemplate::for_kind(kind).first_stage();
        let request = WorkflowRequest::submit(kind, subject_id, payload, first_stage)?;
        Ok(self.repo.create_request(&request)?)
    }

    /// Ejecuta un comando de transición completo.
    pub fn transition(&self, cmd: TransitionCommand) -> Result<WorkflowRequest, WorkflowError> {
        self.engine.transition(cmd)
    }

    /// Atajo: aprobación (o forward, según la plantilla) sin clave de
    /// idempotencia.
    pub fn approve(&self,
                   request_id: Uuid,
                   role: Role,
                   actor_name: &str,
                   comment: Option<String>)
                   -> Result<WorkflowRequest, WorkflowError> {
        self.transition(TransitionCommand { request_id,
                                            actor: Actor { name: actor_name.to_string(), role },
                                            action: TransitionAction::Approve,
                                            comment,
                                            command_id: None })
    }

    /// Atajo: rechazo con motivo obligatorio.
    pub fn reject(&self,
                  request_id: Uuid,
                  role: Role,
                  actor_name: &str,
                  comment: &str)
                  -> Result<WorkflowRequest, WorkflowError> {
        self.transition(TransitionCommand { request_id,
                                            actor: Actor { name: actor_name.to_string(), role },
                                            action: TransitionAction::Reject,
                                            comment: Some(comment.to_string()),
                                            command_id: None })
    }

    /// Solicitud completa (estado + historial).
    pub fn get_request(&self, request_id: &Uuid) -> Result<WorkflowRequest, WorkflowError> {
        Ok(self.repo.get_request(request_id)?)
    }

    /// Worklist de un rol, recientes primero.
    pub fn list_actionable(&self, role: Role) -> Result<Vec<WorkflowRequest>, WorkflowError> {
        Ok(self.repo.list_actionable(role)?)
    }

    /// Solicitudes de un sujeto, en curso y terminales.
    pub fn list_for_subject(&self, subject_id: &str) -> Result<Vec<WorkflowRequest>, WorkflowError> {
        Ok(self.repo.list_for_subject(subject_id)?)
    }

    /// Lectura por kind para reportes/exportación.
    pub fn list_by_kind(&self, kind: RequestKind) -> Result<Vec<WorkflowRequest>, WorkflowError> {
        Ok(self.repo.list_by_kind(kind)?)
    }

    /// Cursor de sondeo para refrescar worklists.
    pub fn list_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowRequest>, WorkflowError> {
        Ok(self.repo.list_updated_since(since)?)
    }

    /// Notificaciones de un sujeto, recientes primero.
    pub fn notifications_for(&self, subject_id: &str) -> Result<Vec<NotificationRecord>, WorkflowError> {
        Ok(self.notifications.list_for_subject(subject_id)?)
    }

    /// Marca una notificación como leída.
    pub fn mark_notification_read(&self, notification_id: &Uuid) -> Result<(), WorkflowError> {
        Ok(self.notifications.mark_read(notification_id)?)
    }
}

impl ApprovalService<DieselRequestRepository, DieselNotificationRepository> {
    /// Construye el servicio respaldado por la persistencia Diesel,
    /// leyendo la URL de la base del entorno (aplica migraciones embebidas
    /// si procede).
    pub fn new_from_env() -> Result<Self, WorkflowError> {
        let repo = campus_persistence::new_request_repo_from_env()?;
        let notifications = campus_persistence::new_notification_repo_from_env()?;
        Ok(Self::new(Arc::new(repo), Arc::new(notifications)))
    }
}
