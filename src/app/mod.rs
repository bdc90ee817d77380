// ==========================================
// Civic Escalation - Application Layer
// ==========================================
// Wiring for binaries and outer service layers
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
