use crate::domain::request::{NewUserRequest, UserRequest, UserRequestSummary};
use crate::domain::types::RequestState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

const USER_REQUEST_COLUMNS: &str = r#"
    id, calling_user_id, receiving_representative_id, request_object_id,
    confirmed, created_at, closed_at
"#;

// ==========================================
// UserRequestRepository - stage 1 requests
// ==========================================
pub struct UserRequestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRequestRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes (transaction scoped)
    // ==========================================

    /// Insert a request with its three required links, returns the new id
    pub fn insert_tx(tx: &Transaction, request: &NewUserRequest) -> RepositoryResult<i64> {
        tx.execute(
            r#"
            INSERT INTO user_request (
                calling_user_id, receiving_representative_id, request_object_id,
                confirmed, created_at
            ) VALUES (?1, ?2, ?3, 0, ?4)
            "#,
            params![
                request.calling_user_id,
                request.receiving_representative_id,
                request.request_object_id,
                request.created_at,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }

    /// Open -> Promoted. Returns affected rows (0 if already promoted).
    pub fn mark_confirmed_tx(tx: &Transaction, id: i64) -> RepositoryResult<usize> {
        let rows = tx.execute(
            "UPDATE user_request SET confirmed = 1 WHERE id = ?1 AND confirmed = 0",
            params![id],
        )?;
        Ok(rows)
    }

    pub fn delete_tx(tx: &Transaction, id: i64) -> RepositoryResult<usize> {
        let rows = tx.execute("DELETE FROM user_request WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    // ==========================================
    // Reads
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UserRequest>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<UserRequest>> {
        let sql = format!("SELECT {} FROM user_request WHERE id = ?1", USER_REQUEST_COLUMNS);
        let request = conn.query_row(&sql, params![id], map_row).optional()?;
        Ok(request)
    }

    /// Every request filed by one user, newest first
    pub fn find_by_caller(&self, calling_user_id: i64) -> RepositoryResult<Vec<UserRequest>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM user_request WHERE calling_user_id = ?1 ORDER BY created_at DESC, id DESC",
            USER_REQUEST_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let requests = stmt
            .query_map(params![calling_user_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(requests)
    }

    /// Open requests assigned to a representative, oldest first
    pub fn list_open_for_representative(
        &self,
        representative_id: i64,
    ) -> RepositoryResult<Vec<UserRequestSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT ur.id, ur.confirmed, u.alternative_id, u.username,
                   ur.receiving_representative_id, p.alternative_id, p.title, ur.created_at
            FROM user_request ur
            JOIN users u ON u.id = ur.calling_user_id
            JOIN post p ON p.id = ur.request_object_id
            WHERE ur.receiving_representative_id = ?1
              AND ur.confirmed = 0
              AND ur.closed_at IS NULL
            ORDER BY ur.created_at ASC, ur.id ASC
            "#,
        )?;

        let summaries = stmt
            .query_map(params![representative_id], |row| {
                Ok(UserRequestSummary {
                    id: row.get(0)?,
                    state: RequestState::from_confirmed(row.get(1)?),
                    calling_user_alternative_id: row.get(2)?,
                    calling_username: row.get(3)?,
                    receiving_representative_id: row.get(4)?,
                    post_alternative_id: row.get(5)?,
                    post_title: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(summaries)
    }

    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM user_request", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_row(row: &Row) -> SqliteResult<UserRequest> {
    Ok(UserRequest {
        id: row.get(0)?,
        calling_user_id: row.get(1)?,
        receiving_representative_id: row.get(2)?,
        request_object_id: row.get(3)?,
        confirmed: row.get(4)?,
        created_at: row.get(5)?,
        closed_at: row.get(6)?,
    })
}
