//! Persistencia Diesel para los traits `RequestRepository` y
//! `NotificationRepository`. Este archivo expone el módulo `schema`, los
//! repositorios concretos y los constructores desde el entorno. El backend
//! es Postgres con la feature `pg` (default) y SQLite en pruebas o cuando
//! `pg` está apagada.

mod notification_persistence;
mod request_persistence;
pub mod schema;

pub use notification_persistence::DieselNotificationRepository;
pub use request_persistence::{DieselRequestRepository, MIGRATIONS};

use requests::StoreError;

/// URL de la base tomada del entorno: `CAMPUS_DB_URL` con fallback a
/// `DATABASE_URL`. Carga `.env` si existe.
fn database_url_from_env() -> Result<String, StoreError> {
  dotenvy::dotenv().ok();
  std::env::var("CAMPUS_DB_URL").or_else(|_| std::env::var("DATABASE_URL"))
                                .map_err(|_| StoreError::Storage("CAMPUS_DB_URL/DATABASE_URL no definida".to_string()))
}

/// Repositorio de solicitudes respaldado por la base configurada en el
/// entorno. Aplica migraciones embebidas al construir el pool.
pub fn new_request_repo_from_env() -> Result<DieselRequestRepository, StoreError> {
  Ok(DieselRequestRepository::new(&database_url_from_env()?))
}

/// Repositorio de notificaciones respaldado por la misma configuración.
pub fn new_notification_repo_from_env() -> Result<DieselNotificationRepository, StoreError> {
  Ok(DieselNotificationRepository::new(&database_url_from_env()?))
}
