// Archivo: domain.rs
// Propósito: tipos auxiliares del contrato de persistencia.
use serde::{Deserialize, Serialize};

/// Resultado de una escritura con control optimista.
///
/// `Ok` incluye la versión confirmada por el almacén; `Conflict` indica que
/// la versión esperada no coincidió y que el caller debe recargar la
/// solicitud antes de decidir si reintenta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistResult {
    Ok { new_version: i64 },
    Conflict,
}
