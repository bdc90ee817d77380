// ==========================================
// Civic Escalation - Repository Layer
// ==========================================
// Scope: data access, hides SQL from engines
// Rules: no business logic, parameterized queries only
// Repositories share one Arc<Mutex<Connection>>; `*_tx` functions run
// inside a transaction owned by the caller.
// ==========================================

pub mod action_log_repo;
pub mod board_repo;
pub mod error;
pub mod load_repo;
pub mod post_repo;
pub mod request_repo;
pub mod user_repo;

pub use action_log_repo::ActionLogRepository;
pub use board_repo::BoardRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use load_repo::LoadSnapshotRepository;
pub use post_repo::PostRepository;
pub use request_repo::{RepresentativeRequestRepository, UserRequestRepository};
pub use user_repo::UserRepository;
