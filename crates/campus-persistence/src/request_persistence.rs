use crate::schema;
use crate::schema::request_history::dsl as hist_dsl;
use crate::schema::requests::dsl as req_dsl;
use campus_domain::{AuditAction, HistoryEntry, Phase, RequestKind, RequestStatus, Role, WorkflowRequest};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::DatabaseErrorKind;
use diesel::result::Error as DieselError;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use requests::{PersistResult, RequestRepository, StoreError};
use std::sync::Arc;
use uuid::Uuid;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[cfg(all(feature = "pg", not(test)))]
pub(crate) type DbPool = Pool<ConnectionManager<PgConnection>>;
#[cfg(any(test, not(feature = "pg")))]
pub(crate) type DbPool = Pool<ConnectionManager<SqliteConnection>>;
#[cfg(all(feature = "pg", not(test)))]
pub(crate) type DbConn = PgConnection;
#[cfg(any(test, not(feature = "pg")))]
pub(crate) type DbConn = SqliteConnection;

/// Construye un pool para la URL dada y aplica las migraciones embebidas.
/// Los PRAGMAs sólo tienen efecto en SQLite; en Postgres se ignoran.
pub(crate) fn build_pool(database_url: &str) -> Arc<DbPool> {
  #[cfg(any(test, not(feature = "pg")))]
  let manager = ConnectionManager::<SqliteConnection>::new(database_url);
  #[cfg(all(feature = "pg", not(test)))]
  let manager = ConnectionManager::<PgConnection>::new(database_url);
  let pool = Pool::builder().max_size(4).build(manager).expect("no se pudo crear el pool de conexiones");
  if let Ok(mut c) = pool.get() {
    let _ = diesel::sql_query("PRAGMA journal_mode = WAL;").execute(&mut c);
    let _ = diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut c);
    log::debug!("aplicando migraciones embebidas");
    let _ = c.run_pending_migrations(MIGRATIONS);
  }
  Arc::new(pool)
}

/// Repo Diesel que implementa `RequestRepository`.
pub struct DieselRequestRepository {
  pool: Arc<DbPool>,
}

impl DieselRequestRepository {
  pub fn new(database_url: &str) -> Self {
    DieselRequestRepository { pool: build_pool(database_url) }
  }

  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>, StoreError> {
    self.pool.get().map_err(|e| StoreError::Storage(format!("pool: {}", e)))
  }

  /// Carga el historial de una solicitud y arma la entidad completa.
  fn hydrate(&self, conn: &mut DbConn, row: RequestRow) -> Result<WorkflowRequest, StoreError> {
    let rows = hist_dsl::request_history.filter(hist_dsl::request_id.eq(&row.id))
                                        .order(hist_dsl::seq.asc())
                                        .load::<HistoryRow>(conn)
                                        .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    let mut history = Vec::with_capacity(rows.len());
    for h in rows {
      history.push(history_from_row(h)?);
    }
    request_from_row(row, history)
  }

  fn hydrate_all(&self, conn: &mut DbConn, rows: Vec<RequestRow>) -> Result<Vec<WorkflowRequest>, StoreError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
      out.push(self.hydrate(conn, row)?);
    }
    Ok(out)
  }
}

// Diesel row structs
#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::requests)]
struct RequestRow {
  pub id: String,
  pub kind: String,
  pub subject_id: String,
  pub payload: String,
  pub phase: String,
  pub stage: Option<String>,
  pub version: i64,
  pub created_at_ts: i64,
  pub updated_at_ts: i64,
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::request_history)]
struct HistoryRow {
  pub id: String,
  pub request_id: String,
  pub seq: i64,
  pub role: String,
  pub actor_name: String,
  pub action: String,
  pub comment: Option<String>,
  pub forwarded_to: Option<String>,
  pub command_id: Option<String>,
  pub created_at_ts: i64,
}

fn request_to_row(request: &WorkflowRequest) -> RequestRow {
  let status = request.status();
  RequestRow { id: request.id().to_string(),
               kind: request.kind().as_str().to_string(),
               subject_id: request.subject_id().to_string(),
               payload: request.payload().to_string(),
               phase: status.phase().as_str().to_string(),
               stage: status.stage().map(|r| r.as_str().to_string()),
               version: request.version(),
               created_at_ts: request.created_at().timestamp_millis(),
               updated_at_ts: request.updated_at().timestamp_millis() }
}

fn history_to_row(request_id: &Uuid, seq: i64, entry: &HistoryEntry) -> HistoryRow {
  HistoryRow { id: Uuid::new_v4().to_string(),
               request_id: request_id.to_string(),
               seq,
               role: entry.role.as_str().to_string(),
               actor_name: entry.actor_name.clone(),
               action: entry.action.as_str().to_string(),
               comment: entry.comment.clone(),
               forwarded_to: entry.forwarded_to.map(|r| r.as_str().to_string()),
               command_id: entry.command_id.map(|u| u.to_string()),
               created_at_ts: entry.at.timestamp_millis() }
}

fn ts_from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
  DateTime::from_timestamp_millis(ms).ok_or_else(|| StoreError::Storage(format!("timestamp inválido: {}", ms)))
}

fn bad_row<E: std::fmt::Display>(e: E) -> StoreError {
  StoreError::Storage(format!("registro inválido: {}", e))
}

fn history_from_row(row: HistoryRow) -> Result<HistoryEntry, StoreError> {
  let role: Role = row.role.parse().map_err(bad_row)?;
  let action: AuditAction = row.action.parse().map_err(bad_row)?;
  let forwarded_to = match row.forwarded_to {
    Some(s) => Some(s.parse::<Role>().map_err(bad_row)?),
    None => None,
  };
  let command_id = match row.command_id {
    Some(s) => Some(Uuid::parse_str(&s).map_err(bad_row)?),
    None => None,
  };
  Ok(HistoryEntry { role,
                    actor_name: row.actor_name,
                    action,
                    comment: row.comment,
                    forwarded_to,
                    command_id,
                    at: ts_from_millis(row.created_at_ts)? })
}

fn request_from_row(row: RequestRow, history: Vec<HistoryEntry>) -> Result<WorkflowRequest, StoreError> {
  let id = Uuid::parse_str(&row.id).map_err(bad_row)?;
  let kind: RequestKind = row.kind.parse().map_err(bad_row)?;
  let phase: Phase = row.phase.parse().map_err(bad_row)?;
  let stage = match row.stage {
    Some(s) => Some(s.parse::<Role>().map_err(bad_row)?),
    None => None,
  };
  let status = RequestStatus::from_parts(phase, stage).map_err(bad_row)?;
  let payload: serde_json::Value = serde_json::from_str(&row.payload).map_err(bad_row)?;
  WorkflowRequest::from_parts(id,
                              kind,
                              row.subject_id,
                              payload,
                              status,
                              history,
                              row.version,
                              ts_from_millis(row.created_at_ts)?,
                              ts_from_millis(row.updated_at_ts)?).map_err(bad_row)
}

impl RequestRepository for DieselRequestRepository {
  /// Inserta la solicitud recién enviada; un id duplicado es `Conflict`.
  fn create_request(&self, request: &WorkflowRequest) -> Result<Uuid, StoreError> {
    let mut conn = self.conn()?;
    let row = request_to_row(request);
    match diesel::insert_into(req_dsl::requests).values(&row).execute(&mut conn) {
      Ok(_) => Ok(request.id()),
      Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
        Err(StoreError::Conflict(format!("request {} ya existe", request.id())))
      }
      Err(e) => Err(StoreError::Storage(format!("db: {}", e))),
    }
  }

  fn get_request(&self, request_id: &Uuid) -> Result<WorkflowRequest, StoreError> {
    let mut conn = self.conn()?;
    let id_s = request_id.to_string();
    let row = req_dsl::requests.filter(req_dsl::id.eq(&id_s))
                               .first::<RequestRow>(&mut conn)
                               .optional()
                               .map_err(|e| StoreError::Storage(format!("db: {}", e)))?
                               .ok_or(StoreError::NotFound(format!("request {}", request_id)))?;
    self.hydrate(&mut conn, row)
  }

  /// Actualización de estado + alta de la entrada de historial en una sola
  /// transacción, con guard de versión. Cero filas actualizadas distingue
  /// `Conflict` (la fila existe con otra versión) de `NotFound`.
  fn persist_transition(&self, request: &WorkflowRequest, expected_version: i64) -> Result<PersistResult, StoreError> {
    let mut conn = self.conn()?;
    let new_entry = match request.history().last() {
      Some(e) => e.clone(),
      None => return Err(StoreError::Conflict("transición sin entrada de historial".to_string())),
    };
    let id_s = request.id().to_string();
    let status = request.status();
    let seq = (request.history().len() as i64) - 1;
    let result = conn.transaction::<PersistResult, DieselError, _>(|conn| {
      // Idempotency: a command_id we already recorded is a no-op
      if let Some(cmd_id) = new_entry.command_id {
        let existing: i64 = hist_dsl::request_history.filter(hist_dsl::request_id.eq(&id_s))
                                                     .filter(hist_dsl::command_id.eq(cmd_id.to_string()))
                                                     .count()
                                                     .get_result(conn)?;
        if existing > 0 {
          let current: i64 = req_dsl::requests.filter(req_dsl::id.eq(&id_s))
                                              .select(req_dsl::version)
                                              .first(conn)?;
          return Ok(PersistResult::Ok { new_version: current });
        }
      }

      // Optimistic concurrency: the version is part of the predicate
      let updated =
        diesel::update(req_dsl::requests.filter(req_dsl::id.eq(&id_s))
                                        .filter(req_dsl::version.eq(expected_version)))
          .set((req_dsl::phase.eq(status.phase().as_str().to_string()),
                req_dsl::stage.eq(status.stage().map(|r| r.as_str().to_string())),
                req_dsl::version.eq(expected_version + 1),
                req_dsl::updated_at_ts.eq(request.updated_at().timestamp_millis())))
          .execute(conn)?;
      if updated == 0 {
        let exists: i64 = req_dsl::requests.filter(req_dsl::id.eq(&id_s)).count().get_result(conn)?;
        if exists == 0 {
          return Err(DieselError::NotFound);
        }
        return Ok(PersistResult::Conflict);
      }

      let hist_row = history_to_row(&request.id(), seq, &new_entry);
      diesel::insert_into(hist_dsl::request_history).values(&hist_row).execute(conn)?;
      Ok(PersistResult::Ok { new_version: expected_version + 1 })
    });
    match result {
      Ok(r) => Ok(r),
      Err(DieselError::NotFound) => Err(StoreError::NotFound(format!("request {}", request.id()))),
      Err(e) => Err(StoreError::Storage(format!("db: {}", e))),
    }
  }

  fn list_actionable(&self, role: Role) -> Result<Vec<WorkflowRequest>, StoreError> {
    let mut conn = self.conn()?;
    let rows = req_dsl::requests.filter(req_dsl::phase.eq(Phase::Pending.as_str()))
                                .filter(req_dsl::stage.eq(role.as_str().to_string()))
                                .order(req_dsl::created_at_ts.desc())
                                .load::<RequestRow>(&mut conn)
                                .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    self.hydrate_all(&mut conn, rows)
  }

  fn list_for_subject(&self, subject_id: &str) -> Result<Vec<WorkflowRequest>, StoreError> {
    let mut conn = self.conn()?;
    let rows = req_dsl::requests.filter(req_dsl::subject_id.eq(subject_id))
                                .order(req_dsl::created_at_ts.desc())
                                .load::<RequestRow>(&mut conn)
                                .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    self.hydrate_all(&mut conn, rows)
  }

  fn list_by_kind(&self, kind: RequestKind) -> Result<Vec<WorkflowRequest>, StoreError> {
    let mut conn = self.conn()?;
    let rows = req_dsl::requests.filter(req_dsl::kind.eq(kind.as_str()))
                                .order(req_dsl::created_at_ts.desc())
                                .load::<RequestRow>(&mut conn)
                                .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    self.hydrate_all(&mut conn, rows)
  }

  fn list_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<WorkflowRequest>, StoreError> {
    let mut conn = self.conn()?;
    let rows = req_dsl::requests.filter(req_dsl::updated_at_ts.gt(since.timestamp_millis()))
                                .order(req_dsl::created_at_ts.desc())
                                .load::<RequestRow>(&mut conn)
                                .map_err(|e| StoreError::Storage(format!("db: {}", e)))?;
    self.hydrate_all(&mut conn, rows)
  }
}
