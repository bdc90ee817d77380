// ==========================================
// Civic Escalation - Request Repositories
// ==========================================
// Tables: user_request (stage 1), representative_request (stage 2)
// Rule: writes are `*_tx` functions so the lifecycle manager can compose
// them inside one transaction; no business rules here.
// ==========================================

mod representative_request;
mod user_request;


pub use representative_request::RepresentativeRequestRepository;
pub use user_request::UserRequestRepository;
