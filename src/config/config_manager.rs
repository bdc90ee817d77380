// ==========================================
// Civic Escalation - Config Manager
// ==========================================
// Storage: config_kv table (key -> value)
// Scope: typed getters with defaults, setters, JSON snapshot
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::domain::types::DeletePolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Build from the shared connection.
    ///
    /// The unified PRAGMAs are applied again (idempotent) so a connection
    /// opened elsewhere behaves the same.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Raw value of a key (None if unset)
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Self::read_value_tx(&conn, key)
    }

    /// Read a key inside the caller's transaction.
    ///
    /// Lifecycle operations already hold the connection lock, so they must
    /// use this instead of the instance getters.
    pub fn read_value_tx(conn: &Connection, key: &str) -> RepositoryResult<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Upsert a key
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    // ===== Request lifecycle =====

    /// Policy for deleting a UserRequest that is already promoted
    pub fn get_delete_policy(&self) -> RepositoryResult<DeletePolicy> {
        let conn = self.get_conn()?;
        Self::delete_policy_tx(&conn)
    }

    /// Transaction-scoped variant of [`get_delete_policy`](Self::get_delete_policy).
    /// Unknown values fall back to the default with a warning.
    pub fn delete_policy_tx(conn: &Connection) -> RepositoryResult<DeletePolicy> {
        let raw = match Self::read_value_tx(conn, config_keys::REQUEST_DELETE_POLICY)? {
            Some(v) => v,
            None => return Ok(DeletePolicy::default()),
        };

        Ok(DeletePolicy::from_str(&raw).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::REQUEST_DELETE_POLICY,
                raw_value = %raw,
                "unknown delete policy, using default"
            );
            DeletePolicy::default()
        }))
    }

    pub fn set_delete_policy(&self, policy: DeletePolicy) -> RepositoryResult<()> {
        self.set_config_value(config_keys::REQUEST_DELETE_POLICY, policy.to_db_str())
    }

    // ===== Audit =====

    /// Default page size for recent audit entries (default 50)
    pub fn get_recent_actions_limit(&self) -> RepositoryResult<i32> {
        let value = self.get_config_value(config_keys::RECENT_ACTIONS_LIMIT)?;
        Ok(value
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RECENT_ACTIONS_LIMIT))
    }

    pub fn set_recent_actions_limit(&self, limit: i32) -> RepositoryResult<()> {
        if limit <= 0 {
            return Err(RepositoryError::FieldValueError {
                field: config_keys::RECENT_ACTIONS_LIMIT.to_string(),
                message: format!("must be positive, got {}", limit),
            });
        }
        self.set_config_value(config_keys::RECENT_ACTIONS_LIMIT, &limit.to_string())
    }

    /// All keys as a JSON object string
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(json!(config_map).to_string())
    }
}

const DEFAULT_RECENT_ACTIONS_LIMIT: i32 = 50;

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    /// REJECT_IF_LINKED | CASCADE
    pub const REQUEST_DELETE_POLICY: &str = "request_delete_policy";

    pub const RECENT_ACTIONS_LIMIT: &str = "recent_actions_limit";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup() -> ConfigManager {
        ConfigManager::from_connection(Arc::new(Mutex::new(open_in_memory().unwrap()))).unwrap()
    }

    #[test]
    fn test_delete_policy_defaults_to_reject() {
        let config = setup();
        assert_eq!(config.get_delete_policy().unwrap(), DeletePolicy::RejectIfLinked);
    }

    #[test]
    fn test_delete_policy_round_trip() {
        let config = setup();
        config.set_delete_policy(DeletePolicy::Cascade).unwrap();
        assert_eq!(config.get_delete_policy().unwrap(), DeletePolicy::Cascade);

        config.set_delete_policy(DeletePolicy::RejectIfLinked).unwrap();
        assert_eq!(config.get_delete_policy().unwrap(), DeletePolicy::RejectIfLinked);
    }

    #[test]
    fn test_unknown_policy_falls_back() {
        let config = setup();
        config
            .set_config_value(config_keys::REQUEST_DELETE_POLICY, "shred")
            .unwrap();
        assert_eq!(config.get_delete_policy().unwrap(), DeletePolicy::RejectIfLinked);
    }

    #[test]
    fn test_recent_actions_limit() {
        let config = setup();
        assert_eq!(config.get_recent_actions_limit().unwrap(), 50);
        config.set_config_value(config_keys::RECENT_ACTIONS_LIMIT, "0").unwrap();
        assert_eq!(config.get_recent_actions_limit().unwrap(), 50);
        config.set_recent_actions_limit(10).unwrap();
        assert_eq!(config.get_recent_actions_limit().unwrap(), 10);
    }

    #[test]
    fn test_non_positive_limit_is_rejected() {
        let config = setup();
        config.set_recent_actions_limit(20).unwrap();

        let err = config.set_recent_actions_limit(-1).unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
        assert_eq!(config.get_recent_actions_limit().unwrap(), 20);
    }

    #[test]
    fn test_snapshot_contains_keys() {
        let config = setup();
        config.set_delete_policy(DeletePolicy::Cascade).unwrap();
        let snapshot: HashMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(
            snapshot.get(config_keys::REQUEST_DELETE_POLICY).map(String::as_str),
            Some("CASCADE")
        );
    }
}
