// ==========================================
// Civic Escalation - Request Audit Log
// ==========================================
// Rule: every committed lifecycle mutation leaves exactly one row,
// written inside the mutation's own transaction.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,        // uuid v4
    pub action_type: String,      // ActionType db string
    pub action_ts: NaiveDateTime,
    pub actor: String,            // operator that triggered the mutation
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    pub fn new(action_type: ActionType, actor: &str, action_ts: NaiveDateTime) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_db_str().to_string(),
            action_ts,
            actor: actor.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateUserRequest,
    PromoteRequest,
    ResolveRepresentativeRequest,
    DeleteUserRequest,
    DeleteRepresentativeRequest,
}

impl ActionType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActionType::CreateUserRequest => "CREATE_USER_REQUEST",
            ActionType::PromoteRequest => "PROMOTE_REQUEST",
            ActionType::ResolveRepresentativeRequest => "RESOLVE_REPRESENTATIVE_REQUEST",
            ActionType::DeleteUserRequest => "DELETE_USER_REQUEST",
            ActionType::DeleteRepresentativeRequest => "DELETE_REPRESENTATIVE_REQUEST",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
