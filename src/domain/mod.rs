// ==========================================
// Civic Escalation - Domain Layer
// ==========================================
// Scope: entities, value types, read models
// Rule: no data access, no engine logic
// ==========================================

pub mod action_log;
pub mod board;
pub mod load;
pub mod post;
pub mod request;
pub mod types;
pub mod user;

pub use action_log::{ActionLog, ActionType};
pub use board::Board;
pub use load::{CandidateLoad, LoadOverview};
pub use post::{NewPost, Post};
pub use request::{
    NewRepresentativeRequest, NewUserRequest, RepresentativeRequest,
    RepresentativeRequestSummary, UserRequest, UserRequestSummary,
};
pub use types::{CandidateKind, DeletePolicy, RequestState};
pub use user::{NewUser, Role, User, UserShortInfo};
