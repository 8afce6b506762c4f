//! campus-workflow: motor de aprobaciones multi-etapa
//!
//! Crate que define las plantillas de workflow por tipo de solicitud, el
//! enrutador del siguiente aprobador, el `TransitionEngine` (el único punto
//! de mutación de solicitudes) y el `ApprovalService` que consumen los
//! dashboards. Usa `requests::RequestRepository` como contrato de
//! persistencia y `campus_persistence` para el wiring desde el entorno.

pub mod engine;
pub mod errors;
pub mod notify;
pub mod routing;
pub mod service;
pub mod templates;

pub use engine::{Actor, TransitionAction, TransitionCommand, TransitionEngine};
pub use errors::WorkflowError;
pub use service::ApprovalService;
pub use templates::WorkflowTemplate;
