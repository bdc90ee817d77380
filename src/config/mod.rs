// ==========================================
// Civic Escalation - Config Layer
// ==========================================
// Storage: config_kv table
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager};
