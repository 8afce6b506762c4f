// Archivo: category.rs
// Propósito: categorías de mantenimiento. A diferencia de `RequestKind`,
// el parseo aquí es total: cualquier valor no reconocido se trata como
// `Other`, de modo que el enrutado nunca puede fallar por una categoría
// escrita a mano en el payload.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categoría de una solicitud de mantenimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceCategory {
  Electrical,
  Plumbing,
  Hvac,
  Structural,
  Furniture,
  Equipment,
  Safety,
  Cleaning,
  Landscaping,
  Other,
}

impl MaintenanceCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      MaintenanceCategory::Electrical => "electrical",
      MaintenanceCategory::Plumbing => "plumbing",
      MaintenanceCategory::Hvac => "hvac",
      MaintenanceCategory::Structural => "structural",
      MaintenanceCategory::Furniture => "furniture",
      MaintenanceCategory::Equipment => "equipment",
      MaintenanceCategory::Safety => "safety",
      MaintenanceCategory::Cleaning => "cleaning",
      MaintenanceCategory::Landscaping => "landscaping",
      MaintenanceCategory::Other => "other",
    }
  }

  /// Todas las categorías definidas, para pruebas de totalidad del enrutado.
  pub fn all() -> &'static [MaintenanceCategory] {
    &[MaintenanceCategory::Electrical,
      MaintenanceCategory::Plumbing,
      MaintenanceCategory::Hvac,
      MaintenanceCategory::Structural,
      MaintenanceCategory::Furniture,
      MaintenanceCategory::Equipment,
      MaintenanceCategory::Safety,
      MaintenanceCategory::Cleaning,
      MaintenanceCategory::Landscaping,
      MaintenanceCategory::Other]
  }
}

impl fmt::Display for MaintenanceCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for MaintenanceCategory {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "electrical" => Ok(MaintenanceCategory::Electrical),
      "plumbing" => Ok(MaintenanceCategory::Plumbing),
      "hvac" => Ok(MaintenanceCategory::Hvac),
      "structural" => Ok(MaintenanceCategory::Structural),
      "furniture" => Ok(MaintenanceCategory::Furniture),
      "equipment" => Ok(MaintenanceCategory::Equipment),
      "safety" => Ok(MaintenanceCategory::Safety),
      "cleaning" => Ok(MaintenanceCategory::Cleaning),
      "landscaping" => Ok(MaintenanceCategory::Landscaping),
      _ => Ok(MaintenanceCategory::Other),
    }
  }
}

impl Default for MaintenanceCategory {
  fn default() -> Self {
    MaintenanceCategory::Other
  }
}
