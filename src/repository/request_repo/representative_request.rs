use crate::domain::request::{
    NewRepresentativeRequest, RepresentativeRequest, RepresentativeRequestSummary,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

const REPR_REQUEST_COLUMNS: &str = r#"
    id, calling_user_request_id, representative_id, board_id,
    confirmed, created_at, closed_at
"#;

// ==========================================
// RepresentativeRequestRepository - stage 2 requests
// ==========================================
pub struct RepresentativeRequestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RepresentativeRequestRepository {
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

    pub fn insert_tx(tx: &Transaction, request: &NewRepresentativeRequest) -> RepositoryResult<i64> {
        tx.execute(
            r#"
            INSERT INTO representative_request (
                calling_user_request_id, representative_id, board_id,
                confirmed, created_at
            ) VALUES (?1, ?2, ?3, 0, ?4)
            "#,
            params![
                request.calling_user_request_id,
                request.representative_id,
                request.board_id,
                request.created_at,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }

    /// Board confirmation: confirmed = 1, closed_at = `closed_at`
    pub fn resolve_tx(tx: &Transaction, id: i64, closed_at: NaiveDateTime) -> RepositoryResult<usize> {
        let rows = tx.execute(
            r#"
            UPDATE representative_request
            SET confirmed = 1, closed_at = ?2
            WHERE id = ?1 AND confirmed = 0 AND closed_at IS NULL
            "#,
            params![id, closed_at],
        )?;
        Ok(rows)
    }

    pub fn delete_tx(tx: &Transaction, id: i64) -> RepositoryResult<usize> {
        let rows = tx.execute("DELETE FROM representative_request WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    // ==========================================
    // Reads
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<RepresentativeRequest>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<RepresentativeRequest>> {
        let sql = format!(
            "SELECT {} FROM representative_request WHERE id = ?1",
            REPR_REQUEST_COLUMNS
        );
        let request = conn.query_row(&sql, params![id], map_row).optional()?;
        Ok(request)
    }

    /// The stage-2 request promoted from a given UserRequest, if any
    pub fn find_by_user_request(&self, user_request_id: i64) -> RepositoryResult<Option<RepresentativeRequest>> {
        let conn = self.get_conn()?;
        Self::find_by_user_request_tx(&conn, user_request_id)
    }

    pub fn find_by_user_request_tx(
        conn: &Connection,
        user_request_id: i64,
    ) -> RepositoryResult<Option<RepresentativeRequest>> {
        let sql = format!(
            "SELECT {} FROM representative_request WHERE calling_user_request_id = ?1 LIMIT 1",
            REPR_REQUEST_COLUMNS
        );
        let request = conn
            .query_row(&sql, params![user_request_id], map_row)
            .optional()?;
        Ok(request)
    }

    /// Open requests assigned to a board, oldest first
    pub fn list_open_for_board(&self, board_id: i64) -> RepositoryResult<Vec<RepresentativeRequestSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT rr.id, rr.calling_user_request_id, rr.board_id,
                   u.alternative_id, u.username, p.alternative_id, p.title,
                   rr.confirmed, rr.created_at
            FROM representative_request rr
            JOIN users u ON u.id = rr.representative_id
            JOIN user_request ur ON ur.id = rr.calling_user_request_id
            JOIN post p ON p.id = ur.request_object_id
            WHERE rr.board_id = ?1
              AND rr.confirmed = 0
              AND rr.closed_at IS NULL
            ORDER BY rr.created_at ASC, rr.id ASC
            "#,
        )?;

        let summaries = stmt
            .query_map(params![board_id], |row| {
                Ok(RepresentativeRequestSummary {
                    id: row.get(0)?,
                    user_request_id: row.get(1)?,
                    board_id: row.get(2)?,
                    representative_alternative_id: row.get(3)?,
                    representative_username: row.get(4)?,
                    post_alternative_id: row.get(5)?,
                    post_title: row.get(6)?,
                    confirmed: row.get(7)?,
                    created_at: row.get(8)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(summaries)
    }

    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM representative_request", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_row(row: &Row) -> SqliteResult<RepresentativeRequest> {
    Ok(RepresentativeRequest {
        id: row.get(0)?,
        calling_user_request_id: row.get(1)?,
        representative_id: row.get(2)?,
        board_id: row.get(3)?,
        confirmed: row.get(4)?,
        created_at: row.get(5)?,
        closed_at: row.get(6)?,
    })
}
