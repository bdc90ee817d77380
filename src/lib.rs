// ==========================================
// Civic Escalation - Core Library
// ==========================================
// Two-stage request routing: user -> representative -> board
// Stack: Rust + SQLite (rusqlite)
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain - entities and types
pub mod domain;

// Repositories - data access
pub mod repository;

// Engines - assignment and request lifecycle
pub mod engine;

// Configuration (config_kv)
pub mod config;

// Database infrastructure (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API - outer synchronous facade
pub mod api;

// Application wiring
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::types::{CandidateKind, DeletePolicy, RequestState};

pub use domain::{
    ActionLog, ActionType, Board, CandidateLoad, LoadOverview, Post, RepresentativeRequest, Role,
    User, UserRequest,
};

pub use engine::{AssignmentEngine, RequestError, RequestLifecycleManager};

pub use api::{ApiError, RequestApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Civic Escalation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
