// Archivo: engine.rs
// Propósito: implementar el `TransitionEngine`, el único punto de mutación
// de solicitudes. Valida las precondiciones, calcula el estado siguiente a
// través del enrutador, persiste de forma atómica con el guard de versión y
// dispara la notificación best-effort.
use crate::errors::WorkflowError;
use crate::notify::Notifier;
use crate::routing;
use campus_domain::{Role, WorkflowRequest};
use requests::{NotificationRepository, PersistResult, RequestRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Acción solicitada por el aprobador. `forward` no existe como acción
/// separada: una aprobación intermedia es un approve cuya plantilla todavía
/// devuelve una etapa siguiente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Approve,
    Reject,
}

/// Identidad del actor según la reporta el proveedor de identidad. El motor
/// confía en el rol declarado; la autorización más allá de "¿coincide con
/// el aprobador vigente?" es responsabilidad del proveedor.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

/// Comando de transición tal como lo envía un dashboard.
///
/// `command_id` es la clave de idempotencia opcional: un reintento con la
/// misma clave devuelve el estado ya confirmado en lugar de fallar con
/// `StaleOrTerminal` o duplicar historial.
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub request_id: Uuid,
    pub actor: Actor,
    pub action: TransitionAction,
    pub comment: Option<String>,
    pub command_id: Option<Uuid>,
}

/// Motor de transiciones sobre un repositorio inyectado.
///
/// Secuencia leer-validar-aplicar-escribir: la atomicidad frente a
/// transiciones concurrentes sobre la misma solicitud la garantiza el
/// `expected_version` que viaja a `persist_transition`; dos aprobadores
/// compitiendo producen un ganador y un `ConcurrentModification` (o un
/// `WrongApprover` si el perdedor releyó tarde), nunca dos escrituras.
pub struct TransitionEngine<R, N>
    where R: RequestRepository,
          N: NotificationRepository
{
    repo: Arc<R>,
    notifier: Notifier<N>,
}

impl<R, N> TransitionEngine<R, N>
    where R: RequestRepository,
          N: NotificationRepository
{
    /// Crea el motor inyectando el repositorio de solicitudes y el almacén
    /// de notificaciones (recursos independientes).
    pub fn new(repo: Arc<R>, notifications: Arc<N>) -> Self {
        Self { repo, notifier: Notifier::new(notifications) }
    }

    /// Ejecuta una transición completa. Ninguna precondición fallida muta
    /// estado; después de la validación la escritura es todo-o-nada.
    pub fn transition(&self, cmd: TransitionCommand) -> Result<WorkflowRequest, WorkflowError> {
        let mut request = self.repo.get_request(&cmd.request_id)?;

        // Idempotent replay: the command already landed, return as-is
        if let Some(command_id) = cmd.command_id {
            if request.has_command(&command_id) {
                return Ok(request);
            }
        }

        if request.is_terminal() {
            return Err(WorkflowError::StaleOrTerminal(format!("la solicitud {} ya está {}",
                                                              request.id(),
                                                              request.status().label())));
        }
        // Pendiente siempre tiene aprobador; from_parts lo garantiza
        let expected = match request.current_approver_role() {
            Some(role) => role,
            None => {
                return Err(WorkflowError::StaleOrTerminal(format!("la solicitud {} no tiene aprobador vigente",
                                                                  request.id())))
            }
        };
        if expected != cmd.actor.role {
            return Err(WorkflowError::WrongApprover { expected, got: cmd.actor.role });
        }

        let expected_version = request.version();
        match cmd.action {
            TransitionAction::Approve => {
                match routing::next_role(request.kind(), request.payload(), cmd.actor.role)? {
                    Some(next) => {
                        request.forward_to(next, cmd.actor.role, &cmd.actor.name, cmd.comment.clone(), cmd.command_id)?
                    }
                    None => request.approve_final(cmd.actor.role, &cmd.actor.name, cmd.comment.clone(), cmd.command_id)?,
                }
            }
            TransitionAction::Reject => {
                let reason = cmd.comment
                                .as_deref()
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string)
                                .ok_or_else(|| {
                                    WorkflowError::Validation("un rechazo requiere un motivo".to_string())
                                })?;
                request.reject(cmd.actor.role, &cmd.actor.name, reason, cmd.command_id)?;
            }
        }

        match self.repo.persist_transition(&request, expected_version)? {
            PersistResult::Ok { new_version } => request.set_version(new_version),
            PersistResult::Conflict => {
                return Err(WorkflowError::ConcurrentModification(format!("la solicitud {} cambió por debajo de la versión {}",
                                                                         cmd.request_id, expected_version)))
            }
        }

        // Side effect best-effort: nunca revierte la transición confirmada
        self.notifier.notify_transition(&request);

        Ok(request)
    }
}
