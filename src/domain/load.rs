// ==========================================
// Civic Escalation - Load Snapshot Model
// ==========================================
// Load = number of open (unconfirmed, unclosed) requests attached to a
// representative or a board.
// ==========================================

use serde::{Deserialize, Serialize};

/// One assignment candidate with its current load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLoad {
    pub candidate_id: i64,
    pub load: i64,
}

impl CandidateLoad {
    pub fn new(candidate_id: i64, load: i64) -> Self {
        Self { candidate_id, load }
    }
}

/// Loads of both tiers at one instant, ascending id within each tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOverview {
    pub representatives: Vec<CandidateLoad>,
    pub boards: Vec<CandidateLoad>,
}

impl LoadOverview {
    pub fn total_open_user_requests(&self) -> i64 {
        self.representatives.iter().map(|c| c.load).sum()
    }

    pub fn total_open_representative_requests(&self) -> i64 {
        self.boards.iter().map(|c| c.load).sum()
    }
}
