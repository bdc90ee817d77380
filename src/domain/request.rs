// ==========================================
// Civic Escalation - Request Domain Models
// ==========================================
// Stage 1: UserRequest (user -> representative)
// Stage 2: RepresentativeRequest (representative -> board)
// Requests hold foreign ids only, no back-references.
// ==========================================

use crate::domain::types::RequestState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// UserRequest - stage 1
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    pub id: i64,
    pub calling_user_id: i64,
    pub receiving_representative_id: i64, // never equal to calling_user_id
    pub request_object_id: i64,           // the escalated post, unique
    pub confirmed: bool,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
}

impl UserRequest {
    pub fn state(&self) -> RequestState {
        RequestState::from_confirmed(self.confirmed)
    }
}

#[derive(Debug, Clone)]
pub struct NewUserRequest {
    pub calling_user_id: i64,
    pub receiving_representative_id: i64,
    pub request_object_id: i64,
    pub created_at: NaiveDateTime,
}

// ==========================================
// RepresentativeRequest - stage 2
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeRequest {
    pub id: i64,
    pub calling_user_request_id: i64, // unique
    pub representative_id: i64,       // copied from the parent's assignee
    pub board_id: i64,
    pub confirmed: bool, // set once the board resolves it
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
}

impl RepresentativeRequest {
    pub fn is_resolved(&self) -> bool {
        self.confirmed || self.closed_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewRepresentativeRequest {
    pub calling_user_request_id: i64,
    pub representative_id: i64,
    pub board_id: i64,
    pub created_at: NaiveDateTime,
}

// ==========================================
// Read models for listing
// ==========================================

/// Open stage-1 request as seen by its representative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequestSummary {
    pub id: i64,
    pub state: RequestState,
    pub calling_user_alternative_id: String,
    pub calling_username: String,
    pub receiving_representative_id: i64,
    pub post_alternative_id: String,
    pub post_title: String,
    pub created_at: NaiveDateTime,
}

/// Open stage-2 request as seen by its board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepresentativeRequestSummary {
    pub id: i64,
    pub user_request_id: i64,
    pub board_id: i64,
    pub representative_alternative_id: String,
    pub representative_username: String,
    pub post_alternative_id: String,
    pub post_title: String,
    pub confirmed: bool,
    pub created_at: NaiveDateTime,
}
