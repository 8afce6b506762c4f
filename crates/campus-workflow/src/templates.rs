// Archivo: templates.rs
// Propósito: registro de plantillas de workflow por tipo de solicitud. Una
// plantilla es o bien una cadena fija de etapas, o bien un flujo de dos
// niveles enrutado por la categoría del payload (mantenimiento).
use campus_domain::{RequestKind, Role};

/// Plantilla de workflow de un `RequestKind`.
///
/// - `FixedChain`: lista ordenada de etapas; después de que aprueba la
///   última, la solicitud es terminal.
/// - `CategoryRouted`: flujo de dos niveles. `intake` recibe la solicitud;
///   tras su aprobación, la categoría del payload (y sólo ella) decide el
///   especialista que la cierra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTemplate {
  FixedChain(&'static [Role]),
  CategoryRouted { intake: Role },
}

// Las cadenas definidas aquí nunca están vacías.
const ACHIEVEMENT: WorkflowTemplate = WorkflowTemplate::FixedChain(&[Role::Teacher, Role::Hod, Role::Principal]);
const CERTIFICATE: WorkflowTemplate = WorkflowTemplate::FixedChain(&[Role::Clerk, Role::Registrar, Role::Principal]);
const LIBRARY_RESOURCE: WorkflowTemplate = WorkflowTemplate::FixedChain(&[Role::Librarian, Role::Principal]);
const LIBRARY_TIMING: WorkflowTemplate = WorkflowTemplate::FixedChain(&[Role::Librarian, Role::Principal]);
const MAINTENANCE: WorkflowTemplate = WorkflowTemplate::CategoryRouted { intake: Role::Clerk };

impl WorkflowTemplate {
  /// Plantilla aplicable a un kind. El registro es total: todo kind tiene
  /// exactamente una plantilla.
  pub fn for_kind(kind: RequestKind) -> &'static WorkflowTemplate {
    match kind {
      RequestKind::Achievement => &ACHIEVEMENT,
      RequestKind::Certificate => &CERTIFICATE,
      RequestKind::Maintenance => &MAINTENANCE,
      RequestKind::LibraryResource => &LIBRARY_RESOURCE,
      RequestKind::LibraryTiming => &LIBRARY_TIMING,
    }
  }

  /// Primera etapa: el rol cuyo worklist recibe la solicitud recién creada.
  pub fn first_stage(&self) -> Role {
    match self {
      WorkflowTemplate::FixedChain(roles) => roles[0],
      WorkflowTemplate::CategoryRouted { intake } => *intake,
    }
  }
}
