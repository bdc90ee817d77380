// ==========================================
// Civic Escalation - Board Domain Model
// ==========================================
// Members and incoming requests are derived by query, never stored here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub established_at: NaiveDateTime,
}
