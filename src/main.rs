// ==========================================
// Civic Escalation - Entry point
// ==========================================
// Opens (or initializes) the store and reports current loads.
// Usage: civic-escalation [db_path]
// ==========================================

use civic_escalation::app::{get_default_db_path, AppState};
use std::process::ExitCode;

fn main() -> ExitCode {
    civic_escalation::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", civic_escalation::APP_NAME, civic_escalation::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    tracing::info!(db_path = %db_path, "using database");

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "AppState initialization failed");
            return ExitCode::FAILURE;
        }
    };

    match state.config_manager.get_delete_policy() {
        Ok(policy) => tracing::info!(policy = %policy, "request delete policy"),
        Err(e) => tracing::warn!(error = %e, "cannot read delete policy"),
    }

    let overview = match state.request_api.get_load_overview() {
        Ok(overview) => overview,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "cannot read loads");
            return ExitCode::FAILURE;
        }
    };

    for rep in &overview.representatives {
        tracing::info!(representative_id = rep.candidate_id, load = rep.load, "representative load");
    }
    for board in &overview.boards {
        tracing::info!(board_id = board.candidate_id, load = board.load, "board load");
    }
    tracing::info!(
        open_user_requests = overview.total_open_user_requests(),
        open_representative_requests = overview.total_open_representative_requests(),
        "load snapshot"
    );

    ExitCode::SUCCESS
}
