// ==========================================
// Civic Escalation - API Layer
// ==========================================
// Synchronous facade consumed by an outer HTTP/RPC layer
// ==========================================

pub mod error;
pub mod request_api;

pub use error::{ApiError, ApiResult};
pub use request_api::RequestApi;
