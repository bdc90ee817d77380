// ==========================================
// Civic Escalation - User Repository
// ==========================================
// Rule: no business logic, only data mapping
// ==========================================

use crate::domain::user::{NewUser, Role, User};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const USER_COLUMNS: &str = r#"
    id, alternative_id, full_name, username, email, profession, age,
    password_hash, registered_at, type, board_id
"#;

// ==========================================
// UserRepository
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Register a user with a freshly generated alternative_id
    pub fn insert(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, new_user)
    }

    /// Insert on an existing connection or transaction
    pub fn insert_with(conn: &Connection, new_user: &NewUser) -> RepositoryResult<User> {
        let alternative_id = uuid::Uuid::new_v4().to_string();
        let registered_at = Utc::now().naive_utc();

        conn.execute(
            r#"
            INSERT INTO users (
                alternative_id, full_name, username, email, profession, age,
                password_hash, registered_at, type, board_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                alternative_id,
                new_user.full_name,
                new_user.username,
                new_user.email,
                new_user.profession,
                new_user.age,
                new_user.password_hash,
                registered_at,
                new_user.role.type_str(),
                new_user.role.board_id(),
            ],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            alternative_id,
            full_name: new_user.full_name.clone(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            profession: new_user.profession.clone(),
            age: new_user.age,
            password_hash: new_user.password_hash.clone(),
            registered_at,
            role: new_user.role,
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// Lookup inside the caller's transaction
    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![id], map_row)
            .optional()?;
        Ok(user)
    }

    /// Resolve the session identity handed over by the auth collaborator
    pub fn find_by_alternative_id(&self, alternative_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE alternative_id = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![alternative_id], map_row)
            .optional()?;
        Ok(user)
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![username], map_row)
            .optional()?;
        Ok(user)
    }

    /// All representatives, ascending id
    pub fn list_representatives(&self) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM users WHERE type = 'representative' ORDER BY id ASC",
            USER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(users)
    }

    /// Members of one board, ascending id
    pub fn list_board_members(&self, board_id: i64) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM users WHERE type = 'board_member' AND board_id = ?1 ORDER BY id ASC",
            USER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map(params![board_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(users)
    }
}

fn map_row(row: &Row) -> SqliteResult<User> {
    let type_str: String = row.get(9)?;
    let board_id: Option<i64> = row.get(10)?;
    let role = Role::from_db(&type_str, board_id).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Text,
            format!("unknown user type: {}", type_str).into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        alternative_id: row.get(1)?,
        full_name: row.get(2)?,
        username: row.get(3)?,
        email: row.get(4)?,
        profession: row.get(5)?,
        age: row.get(6)?,
        password_hash: row.get(7)?,
        registered_at: row.get(8)?,
        role,
    })
}
