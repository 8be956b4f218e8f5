//! Participant-set mutation.
//!
//! The store offers no atomic set update, so every change is a
//! read, modify, unconditional write, then a re-read to confirm the write
//! survived. A concurrent writer working from an older snapshot can clobber
//! the change; the re-read catches that and the loop retries with linear
//! backoff.

use std::time::Duration;
use uuid::Uuid;

use super::controller::LiveSessionController;
use super::SessionError;

/// Membership protocol parameters.
#[derive(Debug, Clone)]
pub struct MembershipPolicy {
    /// Read-write-verify rounds before giving up (at least 1).
    pub max_attempts: u32,
    /// Sleep `attempt * backoff_step` after a failed verify.
    pub backoff_step: Duration,
    pub invite_code_length: usize,
    pub invite_code_attempts: u32,
    /// How far back `pending_invite_for` looks.
    pub invite_window: chrono::Duration,
    pub enforce_status_order: bool,
    pub default_max_participants: u32,
}

impl Default for MembershipPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(100),
            invite_code_length: 6,
            invite_code_attempts: 3,
            invite_window: chrono::Duration::hours(3),
            enforce_status_order: false,
            default_max_participants: 10,
        }
    }
}

impl LiveSessionController {
    /// Add `user` to a session's participants.
    ///
    /// Idempotent. If the write cannot be verified within the attempt
    /// bound, one last write is forced from a fresh read and its result
    /// returned without verification.
    pub async fn add_participant(
        &self,
        session_id: Uuid,
        user: Uuid,
    ) -> Result<Vec<Uuid>, SessionError> {
        let mut session = self.get(session_id).await?;

        for attempt in 1..=self.policy.max_attempts {
            session.participant_ids = self.read_participants(session_id).await?;
            if session.has_participant(user) {
                return Ok(session.participant_ids);
            }
            if session.is_full() {
                return Err(SessionError::SessionFull(session_id));
            }

            session.participant_ids.push(user);
            self.sessions
                .set_participants(session_id, &session.participant_ids)
                .await?;

            let verified = self.read_participants(session_id).await?;
            if verified.contains(&user) {
                tracing::debug!(%session_id, %user, attempt, "Participant added");
                return Ok(verified);
            }

            tracing::debug!(%session_id, %user, attempt, "Add not visible after write, retrying");
            self.backoff(attempt).await;
        }

        session.participant_ids = self.read_participants(session_id).await?;
        if !session.has_participant(user) {
            if session.is_full() {
                return Err(SessionError::SessionFull(session_id));
            }
            session.participant_ids.push(user);
            self.sessions
                .set_participants(session_id, &session.participant_ids)
                .await?;
        }
        tracing::warn!(
            %session_id,
            %user,
            attempts = self.policy.max_attempts,
            "Forced participant write after failed verification"
        );
        Ok(session.participant_ids)
    }

    /// Remove `user` from a session's participants.
    ///
    /// Fails with `ConcurrencyConflict` when removal cannot be verified
    /// within the attempt bound. Removing an absent user is a no-op.
    pub async fn remove_participant(
        &self,
        session_id: Uuid,
        user: Uuid,
    ) -> Result<Vec<Uuid>, SessionError> {
        for attempt in 1..=self.policy.max_attempts {
            let participants = self.read_participants(session_id).await?;
            if !participants.contains(&user) {
                return Ok(participants);
            }

            let remaining: Vec<Uuid> = participants.into_iter().filter(|id| *id != user).collect();
            self.sessions
                .set_participants(session_id, &remaining)
                .await?;

            let verified = self.read_participants(session_id).await?;
            if !verified.contains(&user) {
                tracing::debug!(%session_id, %user, attempt, "Participant removed");
                return Ok(verified);
            }

            tracing::debug!(%session_id, %user, attempt, "Removal not visible after write, retrying");
            self.backoff(attempt).await;
        }

        tracing::warn!(%session_id, %user, "Could not verify participant removal");
        Err(SessionError::ConcurrencyConflict(session_id))
    }

    async fn read_participants(&self, session_id: Uuid) -> Result<Vec<Uuid>, SessionError> {
        self.sessions
            .get_participants(session_id)
            .await?
            .ok_or(SessionError::NotFound(session_id))
    }

    async fn backoff(&self, attempt: u32) {
        tokio::time::sleep(self.policy.backoff_step * attempt).await;
    }
}
