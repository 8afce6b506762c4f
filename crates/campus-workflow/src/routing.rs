// Archivo: routing.rs
// Propósito: resolver el siguiente aprobador de una solicitud. Es una
// función pura de (kind, payload, rol actual): sin estado oculto y sin I/O,
// para poder probar la tabla de enrutado de forma exhaustiva.
use crate::errors::WorkflowError;
use crate::templates::WorkflowTemplate;
use campus_domain::{MaintenanceCategory, RequestKind, Role};
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Tabla categoría → especialista para mantenimiento. `Other` (y cualquier
/// categoría fuera de la tabla) cae en `Registrar`.
static CATEGORY_ROUTES: Lazy<HashMap<MaintenanceCategory, Role>> = Lazy::new(|| {
  HashMap::from([(MaintenanceCategory::Electrical, Role::ElectricalTechnician),
                 (MaintenanceCategory::Plumbing, Role::Plumber),
                 (MaintenanceCategory::Hvac, Role::HvacTechnician),
                 (MaintenanceCategory::Structural, Role::CivilSupervisor),
                 (MaintenanceCategory::Furniture, Role::Carpenter),
                 (MaintenanceCategory::Equipment, Role::StoreKeeper),
                 (MaintenanceCategory::Safety, Role::SafetyOfficer),
                 (MaintenanceCategory::Cleaning, Role::HousekeepingSupervisor),
                 (MaintenanceCategory::Landscaping, Role::Groundskeeper)])
});

/// Especialista que atiende una categoría de mantenimiento.
pub fn specialist_for(category: MaintenanceCategory) -> Role {
  *CATEGORY_ROUTES.get(&category).unwrap_or(&Role::Registrar)
}

/// Extrae la categoría del payload de mantenimiento. Ausente o no
/// reconocida se trata como `Other`, así el enrutado se mantiene total.
pub fn category_of(payload: &JsonValue) -> MaintenanceCategory {
  payload.get("category")
         .and_then(|v| v.as_str())
         .and_then(|s| s.parse::<MaintenanceCategory>().ok())
         .unwrap_or_default()
}

/// Calcula la siguiente etapa tras una aprobación de `current_role`.
///
/// `Ok(None)` significa TERMINAL: la aprobación que acaba de ocurrir cierra
/// la solicitud. `InvalidRouting` sólo puede dispararse si `current_role`
/// no pertenece a la plantilla del kind (un estado que el gating por rol
/// del motor impide alcanzar).
pub fn next_role(kind: RequestKind, payload: &JsonValue, current_role: Role) -> Result<Option<Role>, WorkflowError> {
  match WorkflowTemplate::for_kind(kind) {
    WorkflowTemplate::FixedChain(roles) => {
      let pos = roles.iter().position(|r| *r == current_role).ok_or_else(|| {
                                        WorkflowError::InvalidRouting(format!("el rol {} no es etapa de {}",
                                                                              current_role, kind))
                                      })?;
      Ok(roles.get(pos + 1).copied())
    }
    WorkflowTemplate::CategoryRouted { intake } => {
      // El siguiente salto depende de la categoría, no de la posición en
      // una cadena: intake → especialista, especialista → terminal.
      let specialist = specialist_for(category_of(payload));
      if current_role == *intake {
        Ok(Some(specialist))
      } else if current_role == specialist {
        Ok(None)
      } else {
        Err(WorkflowError::InvalidRouting(format!("el rol {} no participa en {} con categoría {}",
                                                  current_role,
                                                  kind,
                                                  category_of(payload))))
      }
    }
  }
}
