// ==========================================
// Civic Escalation - Engine Layer
// ==========================================
// Business rules only; SQL lives in the repositories.
// Every assignment carries a JSON reason.
// ==========================================

pub mod assignment;
pub mod error;
pub mod request_lifecycle;

pub use assignment::{Assignment, AssignmentEngine, AssignmentError};
pub use error::{RequestError, RequestResult};
pub use request_lifecycle::RequestLifecycleManager;
