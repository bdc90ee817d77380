// ==========================================
// Civic Escalation - Request Lifecycle Manager
// ==========================================
// Owns every mutation of the two request kinds.
// Each operation runs in one BEGIN IMMEDIATE transaction on the shared
// connection: snapshot, decision, writes and audit row commit together
// or not at all. A Transaction dropped without commit rolls back.
// State machine per UserRequest: Open -> Promoted, no way back.
// ==========================================

use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::request::{NewRepresentativeRequest, NewUserRequest};
use crate::domain::types::DeletePolicy;
use crate::domain::user::User;
use crate::engine::assignment::AssignmentEngine;
use crate::engine::error::{RequestError, RequestResult};
use crate::repository::error::RepositoryError;
use crate::repository::{
    ActionLogRepository, LoadSnapshotRepository, PostRepository, RepresentativeRequestRepository,
    UserRepository, UserRequestRepository,
};
use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub struct RequestLifecycleManager {
    conn: Arc<Mutex<Connection>>,
    engine: AssignmentEngine,
}

impl RequestLifecycleManager {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            engine: AssignmentEngine::new(),
        }
    }

    fn get_conn(&self) -> RequestResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RequestError::StorageError(format!("connection lock poisoned: {}", e)))
    }

    // ==========================================
    // CreateUserRequest
    // ==========================================

    /// Escalate a post to the least-loaded representative.
    ///
    /// # Errors
    /// - `NotFound`: post or caller missing
    /// - `Conflict`: the post already has an outgoing request
    /// - `Unassignable`: no representative other than the caller at minimum load
    pub fn create_user_request(
        &self,
        post_external_id: &str,
        caller: &User,
    ) -> RequestResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = begin_immediate(&mut conn)?;

        let post = PostRepository::find_by_alternative_id_tx(&tx, post_external_id)?
            .ok_or_else(|| RequestError::not_found("Post", post_external_id))?;
        let caller = UserRepository::find_by_id_tx(&tx, caller.id)?
            .ok_or_else(|| RequestError::not_found("User", caller.id))?;

        if let Some(existing) = post.outgoing_request {
            warn!(
                post_id = post.id,
                existing_request_id = existing,
                "post already escalated"
            );
            return Err(RequestError::Conflict(format!(
                "post {} already has outgoing request {}",
                post_external_id, existing
            )));
        }

        let loads = LoadSnapshotRepository::representative_loads_tx(&tx)?;
        let assignment = self.engine.assign_representative(&loads, caller.id)?;

        let now = Utc::now().naive_utc();
        let request_id = UserRequestRepository::insert_tx(
            &tx,
            &NewUserRequest {
                calling_user_id: caller.id,
                receiving_representative_id: assignment.target_id,
                request_object_id: post.id,
                created_at: now,
            },
        )?;

        let log = ActionLog::new(ActionType::CreateUserRequest, &caller.username, now)
            .with_payload(json!({
                "user_request_id": request_id,
                "post_id": post.id,
                "post_alternative_id": post.alternative_id,
                "calling_user_id": caller.id,
                "receiving_representative_id": assignment.target_id,
            }))
            .with_detail(assignment.reason);
        ActionLogRepository::insert_tx(&tx, &log)?;

        tx.commit().map_err(RepositoryError::transaction)?;

        info!(
            user_request_id = request_id,
            post_id = post.id,
            representative_id = assignment.target_id,
            load = assignment.load,
            "user request created"
        );
        Ok(request_id)
    }

    // ==========================================
    // PromoteToRepresentativeRequest
    // ==========================================

    /// Escalate an open UserRequest to the least-loaded board and confirm it.
    ///
    /// The new request carries the parent's representative.
    pub fn promote_request(&self, user_request_id: i64, operator: &str) -> RequestResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = begin_immediate(&mut conn)?;

        let user_request = UserRequestRepository::find_by_id_tx(&tx, user_request_id)?
            .ok_or_else(|| RequestError::not_found("UserRequest", user_request_id))?;

        if let Some(existing) =
            RepresentativeRequestRepository::find_by_user_request_tx(&tx, user_request_id)?
        {
            warn!(user_request_id, existing_id = existing.id, "request already promoted");
            return Err(RequestError::Conflict(format!(
                "user request {} already promoted to representative request {}",
                user_request_id, existing.id
            )));
        }
        if !user_request.state().can_promote() {
            warn!(user_request_id, state = %user_request.state(), "request not open");
            return Err(RequestError::Conflict(format!(
                "user request {} is {}",
                user_request_id,
                user_request.state()
            )));
        }

        let loads = LoadSnapshotRepository::board_loads_tx(&tx)?;
        let assignment = self.engine.assign_board(&loads)?;

        let now = Utc::now().naive_utc();
        let repr_request_id = RepresentativeRequestRepository::insert_tx(
            &tx,
            &NewRepresentativeRequest {
                calling_user_request_id: user_request_id,
                representative_id: user_request.receiving_representative_id,
                board_id: assignment.target_id,
                created_at: now,
            },
        )?;

        if UserRequestRepository::mark_confirmed_tx(&tx, user_request_id)? != 1 {
            return Err(RequestError::Conflict(format!(
                "user request {} changed during promotion",
                user_request_id
            )));
        }

        let log = ActionLog::new(ActionType::PromoteRequest, operator, now)
            .with_payload(json!({
                "user_request_id": user_request_id,
                "representative_request_id": repr_request_id,
                "representative_id": user_request.receiving_representative_id,
                "board_id": assignment.target_id,
            }))
            .with_detail(assignment.reason);
        ActionLogRepository::insert_tx(&tx, &log)?;

        tx.commit().map_err(RepositoryError::transaction)?;

        info!(
            user_request_id,
            representative_request_id = repr_request_id,
            board_id = assignment.target_id,
            "request promoted"
        );
        Ok(repr_request_id)
    }

    // ==========================================
    // ResolveRepresentativeRequest
    // ==========================================

    /// Board confirmation: closes a stage-2 request
    pub fn resolve_representative_request(
        &self,
        repr_request_id: i64,
        operator: &str,
    ) -> RequestResult<()> {
        let mut conn = self.get_conn()?;
        let tx = begin_immediate(&mut conn)?;

        let repr_request = RepresentativeRequestRepository::find_by_id_tx(&tx, repr_request_id)?
            .ok_or_else(|| RequestError::not_found("RepresentativeRequest", repr_request_id))?;
        if repr_request.is_resolved() {
            return Err(RequestError::Conflict(format!(
                "representative request {} already resolved",
                repr_request_id
            )));
        }

        let now = Utc::now().naive_utc();
        RepresentativeRequestRepository::resolve_tx(&tx, repr_request_id, now)?;

        let log = ActionLog::new(ActionType::ResolveRepresentativeRequest, operator, now)
            .with_payload(json!({
                "representative_request_id": repr_request_id,
                "board_id": repr_request.board_id,
            }));
        ActionLogRepository::insert_tx(&tx, &log)?;

        tx.commit().map_err(RepositoryError::transaction)?;

        info!(
            representative_request_id = repr_request_id,
            board_id = repr_request.board_id,
            "representative request resolved"
        );
        Ok(())
    }

    // ==========================================
    // Deletes
    // ==========================================

    /// Delete a UserRequest; a linked RepresentativeRequest is handled by
    /// the configured `request_delete_policy`.
    pub fn delete_user_request(&self, user_request_id: i64, operator: &str) -> RequestResult<()> {
        let mut conn = self.get_conn()?;
        let tx = begin_immediate(&mut conn)?;

        let user_request = UserRequestRepository::find_by_id_tx(&tx, user_request_id)?
            .ok_or_else(|| RequestError::not_found("UserRequest", user_request_id))?;
        let linked = RepresentativeRequestRepository::find_by_user_request_tx(&tx, user_request_id)?;
        let policy = ConfigManager::delete_policy_tx(&tx)?;

        let cascaded_id = match (&linked, policy) {
            (None, _) => None,
            (Some(child), DeletePolicy::RejectIfLinked) => {
                warn!(
                    user_request_id,
                    representative_request_id = child.id,
                    "delete rejected, request is linked"
                );
                return Err(RequestError::Conflict(format!(
                    "user request {} is linked to representative request {}",
                    user_request_id, child.id
                )));
            }
            (Some(child), DeletePolicy::Cascade) => {
                RepresentativeRequestRepository::delete_tx(&tx, child.id)?;
                Some(child.id)
            }
        };
        UserRequestRepository::delete_tx(&tx, user_request_id)?;

        let now = Utc::now().naive_utc();
        let log = ActionLog::new(ActionType::DeleteUserRequest, operator, now).with_payload(json!({
            "user_request_id": user_request_id,
            "post_id": user_request.request_object_id,
            "policy": policy.to_db_str(),
            "cascaded_representative_request_id": cascaded_id,
        }));
        ActionLogRepository::insert_tx(&tx, &log)?;

        tx.commit().map_err(RepositoryError::transaction)?;

        info!(user_request_id, policy = %policy, cascaded = cascaded_id.is_some(), "user request deleted");
        Ok(())
    }

    /// Delete a RepresentativeRequest together with its parent UserRequest
    pub fn delete_representative_request(
        &self,
        repr_request_id: i64,
        operator: &str,
    ) -> RequestResult<()> {
        let mut conn = self.get_conn()?;
        let tx = begin_immediate(&mut conn)?;

        let repr_request = RepresentativeRequestRepository::find_by_id_tx(&tx, repr_request_id)?
            .ok_or_else(|| RequestError::not_found("RepresentativeRequest", repr_request_id))?;

        // child first, the parent is still referenced until then
        RepresentativeRequestRepository::delete_tx(&tx, repr_request_id)?;
        UserRequestRepository::delete_tx(&tx, repr_request.calling_user_request_id)?;

        let now = Utc::now().naive_utc();
        let log = ActionLog::new(ActionType::DeleteRepresentativeRequest, operator, now)
            .with_payload(json!({
                "representative_request_id": repr_request_id,
                "user_request_id": repr_request.calling_user_request_id,
                "board_id": repr_request.board_id,
            }));
        ActionLogRepository::insert_tx(&tx, &log)?;

        tx.commit().map_err(RepositoryError::transaction)?;

        info!(
            representative_request_id = repr_request_id,
            user_request_id = repr_request.calling_user_request_id,
            "representative request deleted"
        );
        Ok(())
    }
}

/// Take the write lock up front so the load snapshot stays valid until commit
fn begin_immediate(conn: &mut Connection) -> RequestResult<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| RepositoryError::transaction(e).into())
}
