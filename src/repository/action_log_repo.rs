// ==========================================
// Civic Escalation - Request Audit Log Repository
// ==========================================
// Table: request_log
// Rule: lifecycle writes go through `insert_tx` inside the mutation's
// own transaction, so a rolled back mutation leaves no log row.
// ==========================================

mod core;
mod queries;


pub use self::core::ActionLogRepository;

/// Timestamp layout in request_log.action_ts (sortable as text)
pub(crate) const ACTION_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
