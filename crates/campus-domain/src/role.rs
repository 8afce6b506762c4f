// Archivo: role.rs
// Propósito: catálogo cerrado de roles institucionales que participan en los
// flujos de aprobación, tanto en las cadenas fijas (teacher → hod →
// principal, etc.) como los especialistas a los que enruta mantenimiento.
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rol institucional que puede enviar o aprobar solicitudes.
///
/// La representación serializada es siempre snake_case y coincide con
/// `as_str`, de modo que el valor guardado en la base y el valor que
/// aparece en los worklists es el mismo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Student,
  Teacher,
  Hod,
  Principal,
  Clerk,
  Registrar,
  Librarian,
  Accounts,
  ElectricalTechnician,
  Plumber,
  HvacTechnician,
  CivilSupervisor,
  Carpenter,
  StoreKeeper,
  SafetyOfficer,
  HousekeepingSupervisor,
  Groundskeeper,
}

impl Role {
  /// Nombre canónico en snake_case (el mismo que usa serde).
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Student => "student",
      Role::Teacher => "teacher",
      Role::Hod => "hod",
      Role::Principal => "principal",
      Role::Clerk => "clerk",
      Role::Registrar => "registrar",
      Role::Librarian => "librarian",
      Role::Accounts => "accounts",
      Role::ElectricalTechnician => "electrical_technician",
      Role::Plumber => "plumber",
      Role::HvacTechnician => "hvac_technician",
      Role::CivilSupervisor => "civil_supervisor",
      Role::Carpenter => "carpenter",
      Role::StoreKeeper => "store_keeper",
      Role::SafetyOfficer => "safety_officer",
      Role::HousekeepingSupervisor => "housekeeping_supervisor",
      Role::Groundskeeper => "groundskeeper",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Role {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "student" => Ok(Role::Student),
      "teacher" => Ok(Role::Teacher),
      "hod" => Ok(Role::Hod),
      "principal" => Ok(Role::Principal),
      "clerk" => Ok(Role::Clerk),
      "registrar" => Ok(Role::Registrar),
      "librarian" => Ok(Role::Librarian),
      "accounts" => Ok(Role::Accounts),
      "electrical_technician" => Ok(Role::ElectricalTechnician),
      "plumber" => Ok(Role::Plumber),
      "hvac_technician" => Ok(Role::HvacTechnician),
      "civil_supervisor" => Ok(Role::CivilSupervisor),
      "carpenter" => Ok(Role::Carpenter),
      "store_keeper" => Ok(Role::StoreKeeper),
      "safety_officer" => Ok(Role::SafetyOfficer),
      "housekeeping_supervisor" => Ok(Role::HousekeepingSupervisor),
      "groundskeeper" => Ok(Role::Groundskeeper),
      other => Err(DomainError::ValidationError(format!("rol desconocido: {}", other))),
    }
  }
}
