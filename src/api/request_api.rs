// ==========================================
// Civic Escalation - Request API
// ==========================================
// Outer synchronous facade over the lifecycle manager and read repos.
// Validates input, delegates, maps errors to ApiError.
// `operator` is recorded in the audit log only; authorization belongs to
// the caller.
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::load::LoadOverview;
use crate::domain::request::{RepresentativeRequestSummary, UserRequest, UserRequestSummary};
use crate::domain::user::User;
use crate::engine::RequestLifecycleManager;
use crate::repository::{
    ActionLogRepository, LoadSnapshotRepository, RepresentativeRequestRepository,
    UserRequestRepository,
};

pub struct RequestApi {
    lifecycle: Arc<RequestLifecycleManager>,
    user_request_repo: Arc<UserRequestRepository>,
    repr_request_repo: Arc<RepresentativeRequestRepository>,
    load_repo: Arc<LoadSnapshotRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl RequestApi {
    pub fn new(
        lifecycle: Arc<RequestLifecycleManager>,
        user_request_repo: Arc<UserRequestRepository>,
        repr_request_repo: Arc<RepresentativeRequestRepository>,
        load_repo: Arc<LoadSnapshotRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            lifecycle,
            user_request_repo,
            repr_request_repo,
            load_repo,
            action_log_repo,
            config_manager,
        }
    }

    // ==========================================
    // Mutations
    // ==========================================

    /// Escalate a post on behalf of the authenticated caller.
    ///
    /// # Returns
    /// The new UserRequest id
    pub fn create_user_request(&self, post_external_id: &str, caller: &User) -> ApiResult<i64> {
        if post_external_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("post id must not be empty".to_string()));
        }
        Ok(self.lifecycle.create_user_request(post_external_id.trim(), caller)?)
    }

    /// # Returns
    /// The new RepresentativeRequest id
    pub fn promote_request(&self, user_request_id: i64, operator: &str) -> ApiResult<i64> {
        validate_operator(operator)?;
        Ok(self.lifecycle.promote_request(user_request_id, operator)?)
    }

    pub fn resolve_representative_request(&self, id: i64, operator: &str) -> ApiResult<()> {
        validate_operator(operator)?;
        Ok(self.lifecycle.resolve_representative_request(id, operator)?)
    }

    pub fn delete_user_request(&self, id: i64, operator: &str) -> ApiResult<()> {
        validate_operator(operator)?;
        Ok(self.lifecycle.delete_user_request(id, operator)?)
    }

    pub fn delete_representative_request(&self, id: i64, operator: &str) -> ApiResult<()> {
        validate_operator(operator)?;
        Ok(self.lifecycle.delete_representative_request(id, operator)?)
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn list_open_requests_for_representative(
        &self,
        representative_id: i64,
    ) -> ApiResult<Vec<UserRequestSummary>> {
        Ok(self
            .user_request_repo
            .list_open_for_representative(representative_id)?)
    }

    pub fn list_open_requests_for_board(
        &self,
        board_id: i64,
    ) -> ApiResult<Vec<RepresentativeRequestSummary>> {
        Ok(self.repr_request_repo.list_open_for_board(board_id)?)
    }

    /// Every request the user filed, any state
    pub fn list_requests_by_caller(&self, caller: &User) -> ApiResult<Vec<UserRequest>> {
        Ok(self.user_request_repo.find_by_caller(caller.id)?)
    }

    pub fn get_load_overview(&self) -> ApiResult<LoadOverview> {
        Ok(self.load_repo.overview()?)
    }

    // ==========================================
    // Audit log
    // ==========================================

    /// Latest audit entries, newest first. `None` uses the configured default.
    pub fn list_recent_actions(&self, limit: Option<i32>) -> ApiResult<Vec<ActionLog>> {
        let limit = self.resolve_limit(limit)?;
        Ok(self.action_log_repo.find_recent(limit)?)
    }

    pub fn get_action(&self, action_id: &str) -> ApiResult<ActionLog> {
        if action_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("action id must not be empty".to_string()));
        }
        self.action_log_repo
            .find_by_id(action_id.trim())?
            .ok_or_else(|| ApiError::NotFound(format!("ActionLog(id={})", action_id)))
    }

    /// Entries recorded for one operator, newest first
    pub fn list_actions_by_operator(
        &self,
        operator: &str,
        limit: Option<i32>,
    ) -> ApiResult<Vec<ActionLog>> {
        validate_operator(operator)?;
        let limit = self.resolve_limit(limit)?;
        Ok(self.action_log_repo.find_by_actor(operator, limit)?)
    }

    pub fn list_actions_by_type(
        &self,
        action_type: ActionType,
        limit: Option<i32>,
    ) -> ApiResult<Vec<ActionLog>> {
        let limit = self.resolve_limit(limit)?;
        Ok(self
            .action_log_repo
            .find_by_action_type(action_type.to_db_str(), limit)?)
    }

    fn resolve_limit(&self, limit: Option<i32>) -> ApiResult<i32> {
        match limit {
            Some(n) if n <= 0 => Err(ApiError::InvalidInput(format!(
                "limit must be positive, got {}",
                n
            ))),
            Some(n) => Ok(n),
            None => Ok(self.config_manager.get_recent_actions_limit()?),
        }
    }

    // ==========================================
    // Configuration
    // ==========================================

    /// Default page size for the audit listings above
    pub fn set_recent_actions_limit(&self, limit: i32) -> ApiResult<()> {
        Ok(self.config_manager.set_recent_actions_limit(limit)?)
    }
}

fn validate_operator(operator: &str) -> ApiResult<()> {
    if operator.trim().is_empty() {
        return Err(ApiError::InvalidInput("operator must not be empty".to_string()));
    }
    Ok(())
}
