// ==========================================
// Civic Escalation - Domain Types
// ==========================================
// Scope: enums shared by entities, engines and config
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Request State
// ==========================================
// Open -> Promoted, no way back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Open,     // waiting on the representative
    Promoted, // escalated to a board
}

impl RequestState {
    /// Derive the state from the persisted `confirmed` flag
    pub fn from_confirmed(confirmed: bool) -> Self {
        if confirmed {
            RequestState::Promoted
        } else {
            RequestState::Open
        }
    }

    pub fn can_promote(&self) -> bool {
        matches!(self, RequestState::Open)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Open => write!(f, "OPEN"),
            RequestState::Promoted => write!(f, "PROMOTED"),
        }
    }
}

// ==========================================
// Delete Policy
// ==========================================
// Governs deletion of a UserRequest that still has a linked
// RepresentativeRequest. Stored in config_kv as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletePolicy {
    #[default]
    RejectIfLinked, // fail with Conflict, keeps the audit chain intact
    Cascade,        // delete the linked RepresentativeRequest as well
}

impl DeletePolicy {
    /// Parse a config value, unknown values yield None
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REJECT_IF_LINKED" => Some(DeletePolicy::RejectIfLinked),
            "CASCADE" => Some(DeletePolicy::Cascade),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeletePolicy::RejectIfLinked => "REJECT_IF_LINKED",
            DeletePolicy::Cascade => "CASCADE",
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Candidate Kind
// ==========================================
// Which escalation tier an assignment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateKind {
    Representative,
    Board,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateKind::Representative => write!(f, "REPRESENTATIVE"),
            CandidateKind::Board => write!(f, "BOARD"),
        }
    }
}
