//! Live session controller.
//!
//! Creates sessions, moves them through their lifecycle and relays invites
//! and join requests. Participant-set mutation lives in
//! [`membership`](super::membership).

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::invite::{generate_invite_code, normalize_invite_code};
use super::membership::MembershipPolicy;
use super::session::{CreateOptions, LiveSession, SessionPatch, SessionStatus};
use super::SessionError;
use crate::social::notify::{display_name_or_default, Notification, NotificationDispatcher};
use crate::storage::{ProfileStore, SessionStore};

/// Live session controller.
pub struct LiveSessionController {
    pub(super) sessions: Arc<dyn SessionStore>,
    pub(super) profiles: Arc<dyn ProfileStore>,
    pub(super) notifier: NotificationDispatcher,
    pub(super) policy: MembershipPolicy,
}

impl LiveSessionController {
    /// Create a new live session controller.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileStore>,
        notifier: NotificationDispatcher,
        policy: MembershipPolicy,
    ) -> Self {
        Self {
            sessions,
            profiles,
            notifier,
            policy,
        }
    }

    /// Create a pending session hosted by `host`.
    ///
    /// Participants are `host` followed by `initial_members` in order,
    /// duplicates dropped.
    pub async fn create(
        &self,
        host: Uuid,
        initial_members: &[Uuid],
        options: CreateOptions,
    ) -> Result<LiveSession, SessionError> {
        let mut participants = vec![host];
        for member in initial_members {
            if !participants.contains(member) {
                participants.push(*member);
            }
        }

        let max = options
            .max_participants
            .unwrap_or(self.policy.default_max_participants);
        let mut session = LiveSession::new(host, participants, max);
        if session.participant_ids.len() > max as usize {
            return Err(SessionError::SessionFull(session.id));
        }
        session.workout_name = options.workout_name;

        if !options.with_invite_code {
            self.sessions.insert_session(&session).await?;
            tracing::info!(session_id = %session.id, %host, "Created live session");
            return Ok(session);
        }

        for attempt in 1..=self.policy.invite_code_attempts {
            session.invite_code = Some(generate_invite_code(self.policy.invite_code_length));
            match self.sessions.insert_session(&session).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %session.id,
                        %host,
                        invite_code = session.invite_code.as_deref().unwrap_or_default(),
                        "Created live session"
                    );
                    return Ok(session);
                }
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!(attempt, "Invite code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(SessionError::CodeGenerationExhausted)
    }

    /// Get a session.
    pub async fn get(&self, session_id: Uuid) -> Result<LiveSession, SessionError> {
        self.sessions
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound(session_id))
    }

    /// Fail with `NotAuthorized` unless `by` leads or hosts the session.
    pub async fn ensure_in_charge(&self, session_id: Uuid, by: Uuid) -> Result<LiveSession, SessionError> {
        let session = self.get(session_id).await?;
        if by != session.leader_id && by != session.host_id {
            return Err(SessionError::NotAuthorized);
        }
        Ok(session)
    }

    /// Hand leadership to another user. Single unconditional write.
    pub async fn transfer_leadership(
        &self,
        session_id: Uuid,
        new_leader: Uuid,
    ) -> Result<(), SessionError> {
        match self.sessions.set_leader(session_id, new_leader).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Err(SessionError::NotFound(session_id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(%session_id, %new_leader, "Transferred leadership");
        Ok(())
    }

    /// Move a session to `status`, writing `patch` alongside.
    ///
    /// `started_at`/`ended_at` default to now when entering active/ended and
    /// the session has none yet.
    pub async fn advance(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        mut patch: SessionPatch,
    ) -> Result<LiveSession, SessionError> {
        let current = self.get(session_id).await?;

        if self.policy.enforce_status_order && status.order() < current.status.order() {
            return Err(SessionError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let now = Utc::now();
        if status == SessionStatus::Active && patch.started_at.is_none() && current.started_at.is_none() {
            patch.started_at = Some(now);
        }
        if status == SessionStatus::Ended && patch.ended_at.is_none() && current.ended_at.is_none() {
            patch.ended_at = Some(now);
        }

        self.sessions.update_status(session_id, status, &patch).await?;
        tracing::info!(
            %session_id,
            from = current.status.as_str(),
            to = status.as_str(),
            "Session status changed"
        );

        Ok(LiveSession {
            status,
            started_at: patch.started_at.or(current.started_at),
            ended_at: patch.ended_at.or(current.ended_at),
            workout_name: patch.workout_name.or(current.workout_name),
            ..current
        })
    }

    /// Look up an open session by invite code.
    pub async fn find_by_invite_code(&self, code: &str) -> Result<Option<LiveSession>, SessionError> {
        let code = normalize_invite_code(code);
        if code.is_empty() {
            return Ok(None);
        }
        let session = self.sessions.find_by_invite_code(&code).await?;
        Ok(session.filter(|s| s.status.is_open()))
    }

    /// Most recent open session, hosted by someone else, that lists `user`
    /// and was created within the invite window.
    pub async fn pending_invite_for(&self, user: Uuid) -> Result<Option<LiveSession>, SessionError> {
        let since = Utc::now() - self.policy.invite_window;
        let sessions = self
            .sessions
            .sessions_with_participant(user, &[SessionStatus::Pending, SessionStatus::Active], since)
            .await?;
        Ok(sessions.into_iter().find(|s| s.host_id != user))
    }

    /// Invite `to` into a session. Membership is created on accept.
    pub async fn invite(&self, session_id: Uuid, from: Uuid, to: Uuid) -> Result<(), SessionError> {
        let session = self.get(session_id).await?;
        if !session.status.is_open() {
            return Err(SessionError::Ended(session_id));
        }
        if !session.has_participant(from) {
            return Err(SessionError::NotAuthorized);
        }

        let name = display_name_or_default(self.profiles.as_ref(), from).await;
        self.notifier
            .dispatch(Notification::live_invite(to, from, &name, session_id))
            .await;
        Ok(())
    }

    /// Accept an invite: join the session and tell the host.
    pub async fn accept_invite(&self, session_id: Uuid, user: Uuid) -> Result<Vec<Uuid>, SessionError> {
        let participants = self.add_participant(session_id, user).await?;

        let session = self.get(session_id).await?;
        if session.host_id != user {
            let name = display_name_or_default(self.profiles.as_ref(), user).await;
            self.notifier
                .dispatch(Notification::live_accept(session.host_id, user, &name, session_id))
                .await;
        }
        Ok(participants)
    }

    /// Ask the session leader to let `user` in.
    pub async fn request_join(&self, session_id: Uuid, user: Uuid) -> Result<(), SessionError> {
        let session = self.get(session_id).await?;
        if !session.status.is_open() {
            return Err(SessionError::Ended(session_id));
        }

        let name = display_name_or_default(self.profiles.as_ref(), user).await;
        self.notifier
            .dispatch(Notification::join_request(session.leader_id, user, &name, session_id))
            .await;
        Ok(())
    }

    /// Turn down a join request. Only the leader or host may do this.
    pub async fn decline_join_request(
        &self,
        session_id: Uuid,
        by: Uuid,
        user: Uuid,
    ) -> Result<(), SessionError> {
        self.ensure_in_charge(session_id, by).await?;

        self.notifier
            .dispatch(Notification::join_declined(user, session_id))
            .await;
        Ok(())
    }
}
