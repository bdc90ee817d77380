// ==========================================
// Civic Escalation - Board Repository
// ==========================================

use crate::domain::board::Board;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct BoardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BoardRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Establish a new board
    pub fn insert(&self) -> RepositoryResult<Board> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn)
    }

    pub fn insert_with(conn: &Connection) -> RepositoryResult<Board> {
        let established_at = Utc::now().naive_utc();
        conn.execute(
            "INSERT INTO board (established_at) VALUES (?1)",
            params![established_at],
        )?;
        Ok(Board {
            id: conn.last_insert_rowid(),
            established_at,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Board>> {
        let conn = self.get_conn()?;
        let board = conn
            .query_row(
                "SELECT id, established_at FROM board WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Board {
                        id: row.get(0)?,
                        established_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(board)
    }

    /// All boards, ascending id
    pub fn list_all(&self) -> RepositoryResult<Vec<Board>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, established_at FROM board ORDER BY id ASC")?;
        let boards = stmt
            .query_map([], |row| {
                Ok(Board {
                    id: row.get(0)?,
                    established_at: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(boards)
    }
}
