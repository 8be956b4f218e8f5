//! Live workout sessions.
//!
//! Sessions are shared records mutated by independent callers with no
//! transactions. Membership changes go through a verify-and-retry loop
//! (see [`membership`]).

pub mod controller;
pub mod invite;
pub mod membership;
pub mod session;

pub use controller::LiveSessionController;
pub use invite::{generate_invite_code, normalize_invite_code, INVITE_CHARSET};
pub use membership::MembershipPolicy;
pub use session::{CreateOptions, LiveSession, SessionPatch, SessionStatus};

use uuid::Uuid;

use crate::storage::DatabaseError;

/// Live session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error("Session is full: {0}")]
    SessionFull(Uuid),

    #[error("Session has ended: {0}")]
    Ended(Uuid),

    #[error("Could not verify participant change for session {0}")]
    ConcurrencyConflict(Uuid),

    #[error("No unused invite code found")]
    CodeGenerationExhausted,

    #[error("Invalid status transition from {} to {}", from.as_str(), to.as_str())]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
