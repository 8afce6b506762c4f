//! Crate `requests` — contrato de persistencia para solicitudes con workflow
//!
//! Este crate define el contrato de almacenamiento `RequestRepository` (y el
//! de notificaciones `NotificationRepository`) junto con implementaciones en
//! memoria útiles para pruebas. Los tipos de dominio (`WorkflowRequest`,
//! `NotificationRecord`) viven en `campus-domain`.
//!
//! Diseño resumido:
//! - Registro autocontenido: cada `WorkflowRequest` viaja con su historial,
//!   de modo que estado y auditoría se escriben en una sola operación.
//! - Locking optimista: `persist_transition` recibe un `expected_version` y
//!   devuelve `PersistResult::Conflict` cuando no coincide, en lugar de
//!   pisar silenciosamente la escritura concurrente.
//! - Idempotencia: si la entrada añadida trae `command_id` y ya estaba
//!   registrada, la escritura es un no-op con la versión vigente.
//!
//! Ejemplo rápido:
//! ```rust
//! use campus_domain::{RequestKind, Role, WorkflowRequest};
//! use requests::{InMemoryRequestRepository, RequestRepository};
//! use serde_json::json;
//!
//! let repo = InMemoryRequestRepository::new();
//! let req = WorkflowRequest::submit(RequestKind::Achievement,
//!                                   "stu-001",
//!                                   json!({"title": "hackathon"}),
//!                                   Role::Teacher).unwrap();
//! let id = repo.create_request(&req).unwrap();
//! assert_eq!(repo.get_request(&id).unwrap().current_approver_role(), Some(Role::Teacher));
//! ```
pub mod domain;
pub mod errors;
pub mod repository;
pub mod stubs;

pub use domain::*;
pub use errors::*;
pub use repository::*;
pub use stubs::*;
