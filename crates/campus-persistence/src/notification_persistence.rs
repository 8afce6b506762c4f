use crate::request_persistence::{build_pool, DbConn, DbPool};
use crate::schema;
use crate::schema::notifications::dsl as notif_dsl;
use campus_domain::NotificationRecord;
use chrono::DateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use requests::{NotificationRepository, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Repo Diesel que implementa `NotificationRepository`. Usa su propio pool:
/// el almacén de notificaciones es un recurso independiente que puede
/// fallar sin afectar al de solicitudes.
pub struct DieselNotificationRepository {
  pool: Arc<DbPool>,
}

impl DieselNotificationRepository {
  pub fn new(database_url: &str) -> Self {
    DieselNotificationRepository { pool: build_pool(database_url) }
  }

  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>, StoreError> {
    self.pool.get().map_err(|e| StoreError::Storage(format!("pool: {}", e)))
  }
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::notifications)]
struct NotificationRow {
  pub id: String,
  pub subject_id: String,
  pub event: String,
  pub title: String,
  pub message: String,
  pub related_request_id: String,
  pub read_flag: bool,
  pub created_at_ts: i64,
}

fn to_row(record: &NotificationRecord) -> NotificationRow {
  NotificationRow { id: record.id.to_string(),
                    subject_id: record.subject_id.clone(),
                    event: record.event.clone(),
                    title: record.title.clone(),
                    message: record.message.clone(),
                    related_request_id: record.related_request_id.to_string(),
                    read_flag: record.read,
                    created_at_ts: record.created_at.timestamp_millis() }
}

fn from_row(row: NotificationRow) -> Result<NotificationRecord, StoreError> {
  let bad = |e: String| StoreError::Storage(format!("registro inválido: {}", e));
  Ok(NotificationRecord { id: Uuid::parse_str(&row.id).map_err(|e| bad(e.to_string()))?,
                          subject_id: row.subject_id,
                          event: row.event,
                          title: row.title,
                          message: row.message,
                          related_request_id: Uuid::parse_str(&row.related_request_id).map_err(|e| bad(e.to_string()))?,
                          read: row.read_flag,
                          created_at: DateTime::from_timestamp_millis(row.created_at_ts)
                                        .ok_or_else(|| bad(format!("timestamp {}", row.created_at_ts)))? })
}

impl NotificationRepository for DieselNotificationRepository {
  fn append(&self, record: &NotificationRecord) -> Result<Uuid, StoreError> {
    let mut conn = self.conn()?;
    let row = to_row(record);
    diesel::insert_into(notif_dsl::notifications).values(&row)
                                                 .execute(&mut conn)
                                                 .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    Ok(record.id)
  }

  fn list_for_subject(&self, subject_id: &str) -> Result<Vec<NotificationRecord>, StoreError> {
    let mut conn = self.conn()?;
    let rows = notif_dsl::notifications.filter(notif_dsl::subject_id.eq(subject_id))
                                       .order(notif_dsl::created_at_ts.desc())
                                       .load::<NotificationRow>(&mut conn)
                                       .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    rows.into_iter().map(from_row).collect()
  }

  fn mark_read(&self, notification_id: &Uuid) -> Result<(), StoreError> {
    let mut conn = self.conn()?;
    let id_s = notification_id.to_string();
    let updated = diesel::update(notif_dsl::notifications.filter(notif_dsl::id.eq(&id_s)))
                    .set(notif_dsl::read_flag.eq(true))
                    .execute(&mut conn)
                    .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    if updated == 0 {
      return Err(StoreError::NotFound(format!("notification {}", notification_id)));
    }
    Ok(())
  }
}
