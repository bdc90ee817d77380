// ==========================================
// Civic Escalation - Application State
// ==========================================
// Scope: shared connection, repositories and API instances
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::RequestApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::RequestLifecycleManager;
use crate::repository::{
    ActionLogRepository, BoardRepository, LoadSnapshotRepository, PostRepository,
    RepresentativeRequestRepository, UserRepository, UserRequestRepository,
};

/// Everything an outer layer needs, built over one shared connection
pub struct AppState {
    pub db_path: String,

    pub request_api: Arc<RequestApi>,

    /// Collaborator contracts (`CurrentUser`, `GetPostByExternalId`)
    pub user_repo: Arc<UserRepository>,
    pub post_repo: Arc<PostRepository>,
    pub board_repo: Arc<BoardRepository>,

    pub load_repo: Arc<LoadSnapshotRepository>,
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// Open (or create) the store at `db_path` and wire every layer.
    ///
    /// The schema is created idempotently before any repository is built.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("cannot initialize schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repositories
        // ==========================================
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let post_repo = Arc::new(PostRepository::new(conn.clone()));
        let board_repo = Arc::new(BoardRepository::new(conn.clone()));
        let user_request_repo = Arc::new(UserRequestRepository::new(conn.clone()));
        let repr_request_repo = Arc::new(RepresentativeRequestRepository::new(conn.clone()));
        let load_repo = Arc::new(LoadSnapshotRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );

        // ==========================================
        // Engine + API
        // ==========================================
        let lifecycle = Arc::new(RequestLifecycleManager::new(conn));

        let request_api = Arc::new(RequestApi::new(
            lifecycle,
            user_request_repo,
            repr_request_repo,
            load_repo.clone(),
            action_log_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState ready");

        Ok(Self {
            db_path,
            request_api,
            user_repo,
            post_repo,
            board_repo,
            load_repo,
            config_manager,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// Default database path
// ==========================================

/// Resolve the database file.
///
/// `CIVIC_ESCALATION_DB_PATH` wins when set; otherwise the platform data
/// directory is used (a separate `-dev` directory in debug builds).
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CIVIC_ESCALATION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./civic_escalation.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("civic-escalation-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("civic-escalation");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("civic_escalation.db");
    }

    path.to_string_lossy().to_string()
}
