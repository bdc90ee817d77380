// ==========================================
// Civic Escalation - SQLite connection and schema
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs
//   (foreign keys are per-connection in SQLite)
// - one busy_timeout for all connections
// - idempotent schema creation with a recorded schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version this code expects
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMAs to a connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// In-memory connection with the same configuration and schema (tests, tooling)
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create all tables and indexes if missing, then record the schema version.
///
/// Relationships are stored one way only:
/// - `post.outgoing_request` is derived from `user_request.request_object_id UNIQUE`
/// - board members are `users.board_id`, incoming requests are `representative_request.board_id`
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS board (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            established_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            alternative_id TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            profession TEXT NOT NULL,
            age INTEGER,
            password_hash TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('user', 'representative', 'board_member')),
            board_id INTEGER REFERENCES board(id),
            CHECK ((type = 'board_member') = (board_id IS NOT NULL))
        );

        CREATE TABLE IF NOT EXISTS post (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            alternative_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            upvotes INTEGER NOT NULL DEFAULT 0,
            private INTEGER NOT NULL DEFAULT 0,
            confirmed_for_deployment INTEGER NOT NULL DEFAULT 0,
            confirmed_for_insights INTEGER NOT NULL DEFAULT 0,
            original_author_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_request (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            calling_user_id INTEGER NOT NULL REFERENCES users(id),
            receiving_representative_id INTEGER NOT NULL REFERENCES users(id),
            request_object_id INTEGER NOT NULL UNIQUE REFERENCES post(id),
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            closed_at TEXT,
            CHECK (calling_user_id <> receiving_representative_id)
        );

        CREATE TABLE IF NOT EXISTS representative_request (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            calling_user_request_id INTEGER NOT NULL UNIQUE REFERENCES user_request(id),
            representative_id INTEGER NOT NULL REFERENCES users(id),
            board_id INTEGER NOT NULL REFERENCES board(id),
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            closed_at TEXT,
            CONSTRAINT user_req_repr_id_uniq UNIQUE (calling_user_request_id, representative_id)
        );

        CREATE TABLE IF NOT EXISTS request_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_user_request_representative
            ON user_request(receiving_representative_id, confirmed);
        CREATE INDEX IF NOT EXISTS idx_user_request_caller
            ON user_request(calling_user_id);
        CREATE INDEX IF NOT EXISTS idx_representative_request_board
            ON representative_request(board_id, confirmed);
        CREATE INDEX IF NOT EXISTS idx_request_log_ts
            ON request_log(action_ts);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Read schema_version (None if the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
