// ==========================================
// Civic Escalation - Assignment Engine
// ==========================================
// Least-loaded selection for both escalation tiers.
// Input: load snapshot (any order)
// Output: chosen candidate + explanation
// Rules:
// - only candidates at the global minimum load are eligible
// - ties break on ascending id, independent of input order
// - representatives never receive their own request; there is no
//   fallback to the next load level
// ==========================================

use crate::domain::load::CandidateLoad;
use crate::domain::types::CandidateKind;
use serde_json::json;
use thiserror::Error;

/// Why no candidate could be chosen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("no {kind} candidates available")]
    NoCandidates { kind: CandidateKind },

    #[error("only the requester (id={requester_id}) is at minimum load {min_load}")]
    OnlySelfAtMinimum { requester_id: i64, min_load: i64 },
}

/// Outcome of one selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub kind: CandidateKind,
    pub target_id: i64,
    pub load: i64,
    pub min_load: i64,
    pub tied: usize, // candidates sharing min_load, requester included
    pub reason: String,
}

// ==========================================
// AssignmentEngine
// ==========================================
/// Stateless; callers provide the snapshot read inside their transaction.
pub struct AssignmentEngine {}

impl AssignmentEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Pick the representative for a new UserRequest.
    ///
    /// `requester_id` is excluded even when it is the only candidate at
    /// the minimum; in that case the call fails instead of falling back.
    pub fn assign_representative(
        &self,
        candidates: &[CandidateLoad],
        requester_id: i64,
    ) -> Result<Assignment, AssignmentError> {
        self.select(CandidateKind::Representative, candidates, Some(requester_id))
    }

    /// Pick the board for a promoted request
    pub fn assign_board(&self, candidates: &[CandidateLoad]) -> Result<Assignment, AssignmentError> {
        self.select(CandidateKind::Board, candidates, None)
    }

    // ==========================================
    // Selection
    // ==========================================

    fn select(
        &self,
        kind: CandidateKind,
        candidates: &[CandidateLoad],
        excluded: Option<i64>,
    ) -> Result<Assignment, AssignmentError> {
        let min_load = candidates
            .iter()
            .map(|c| c.load)
            .min()
            .ok_or(AssignmentError::NoCandidates { kind })?;

        let mut at_minimum: Vec<&CandidateLoad> =
            candidates.iter().filter(|c| c.load == min_load).collect();
        at_minimum.sort_by_key(|c| c.candidate_id);

        let chosen = at_minimum
            .iter()
            .find(|c| Some(c.candidate_id) != excluded)
            .ok_or(AssignmentError::OnlySelfAtMinimum {
                requester_id: excluded.unwrap_or_default(),
                min_load,
            })?;

        tracing::debug!(
            kind = %kind,
            target_id = chosen.candidate_id,
            min_load,
            tied = at_minimum.len(),
            "assignment decided"
        );

        Ok(Assignment {
            kind,
            target_id: chosen.candidate_id,
            load: chosen.load,
            min_load,
            tied: at_minimum.len(),
            reason: Self::generate_reason(kind, chosen, &at_minimum, candidates.len(), excluded),
        })
    }

    fn generate_reason(
        kind: CandidateKind,
        chosen: &CandidateLoad,
        at_minimum: &[&CandidateLoad],
        candidate_count: usize,
        excluded: Option<i64>,
    ) -> String {
        let rule = if at_minimum.len() > 1 {
            "MIN_LOAD_TIE_LOWEST_ID"
        } else {
            "MIN_LOAD"
        };

        json!({
            "kind": kind.to_string(),
            "rule": rule,
            "target_id": chosen.candidate_id,
            "min_load": chosen.load,
            "tied_ids": at_minimum.iter().map(|c| c.candidate_id).collect::<Vec<_>>(),
            "candidate_count": candidate_count,
            "excluded_requester": excluded,
        })
        .to_string()
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loads(pairs: &[(i64, i64)]) -> Vec<CandidateLoad> {
        pairs.iter().map(|&(id, load)| CandidateLoad::new(id, load)).collect()
    }

    #[test]
    fn test_picks_unique_minimum() {
        let engine = AssignmentEngine::new();
        // R1(2), R2(0), R3(2), caller R1
        let result = engine
            .assign_representative(&loads(&[(1, 2), (2, 0), (3, 2)]), 1)
            .unwrap();
        assert_eq!(result.target_id, 2);
        assert_eq!(result.min_load, 0);
        assert_eq!(result.tied, 1);
    }

    #[test]
    fn test_requester_skipped_at_minimum() {
        let engine = AssignmentEngine::new();
        // R1(0) is the caller, R2(0)
        let result = engine
            .assign_representative(&loads(&[(1, 0), (2, 0)]), 1)
            .unwrap();
        assert_eq!(result.target_id, 2);
        assert_eq!(result.tied, 2);
    }

    #[test]
    fn test_no_fallback_to_next_level() {
        let engine = AssignmentEngine::new();
        let err = engine
            .assign_representative(&loads(&[(1, 0), (2, 3)]), 1)
            .unwrap_err();
        assert_eq!(
            err,
            AssignmentError::OnlySelfAtMinimum {
                requester_id: 1,
                min_load: 0
            }
        );
    }

    #[test]
    fn test_empty_sets_fail() {
        let engine = AssignmentEngine::new();
        assert_eq!(
            engine.assign_representative(&[], 7).unwrap_err(),
            AssignmentError::NoCandidates {
                kind: CandidateKind::Representative
            }
        );
        assert_eq!(
            engine.assign_board(&[]).unwrap_err(),
            AssignmentError::NoCandidates {
                kind: CandidateKind::Board
            }
        );
    }

    #[test]
    fn test_tie_break_ignores_input_order() {
        let engine = AssignmentEngine::new();
        let forward = loads(&[(3, 1), (5, 1), (9, 1)]);
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(engine.assign_board(&forward).unwrap().target_id, 3);
        assert_eq!(engine.assign_board(&reversed).unwrap().target_id, 3);
    }

    #[test]
    fn test_uniform_loads_are_stable() {
        let engine = AssignmentEngine::new();
        let snapshot = loads(&[(4, 2), (2, 2), (6, 2)]);
        let first = engine.assign_representative(&snapshot, 99).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.assign_representative(&snapshot, 99).unwrap(), first);
        }
        assert_eq!(first.target_id, 2);
    }

    #[test]
    fn test_never_returns_requester() {
        let engine = AssignmentEngine::new();
        for requester in 1..=4 {
            let snapshot = loads(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
            let result = engine.assign_representative(&snapshot, requester).unwrap();
            assert_ne!(result.target_id, requester);
        }
    }

    #[test]
    fn test_board_has_no_self_exclusion() {
        let engine = AssignmentEngine::new();
        let result = engine.assign_board(&loads(&[(1, 0)])).unwrap();
        assert_eq!(result.target_id, 1);
    }

    #[test]
    fn test_reason_is_json() {
        let engine = AssignmentEngine::new();
        let result = engine
            .assign_representative(&loads(&[(1, 0), (2, 0)]), 1)
            .unwrap();
        let reason: serde_json::Value = serde_json::from_str(&result.reason).unwrap();
        assert_eq!(reason["rule"], "MIN_LOAD_TIE_LOWEST_ID");
        assert_eq!(reason["target_id"], 2);
        assert_eq!(reason["excluded_requester"], 1);
    }
}
