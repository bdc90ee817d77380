// ==========================================
// Civic Escalation - Post Domain Model
// ==========================================
// Authoring and rendering live in the posts collaborator. The core only
// needs identity, flags and the derived outgoing request.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub alternative_id: String,
    pub title: String,
    pub body: String,
    pub upvotes: i64,
    pub private: bool,
    pub confirmed_for_deployment: bool,
    pub confirmed_for_insights: bool,
    pub original_author_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    // derived from user_request.request_object_id
    pub outgoing_request: Option<i64>,
}

impl Post {
    pub fn is_escalated(&self) -> bool {
        self.outgoing_request.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub private: bool,
    pub original_author_id: i64,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: i64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            private: false,
            original_author_id: author_id,
        }
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }
}
