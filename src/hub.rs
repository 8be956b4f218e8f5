//! Caller-bound facade over the social services.
//!
//! Every operation resolves the signed-in user first and fails with
//! [`HubError::NotAuthenticated`] before touching the store when there
//! is none.

use std::sync::Arc;
use uuid::Uuid;

use crate::leaderboards::{
    Leaderboard, LeaderboardEngine, LeaderboardError, LeaderboardType, StreakService,
    StrengthEntry,
};
use crate::live::{
    CreateOptions, LiveSession, LiveSessionController, SessionError, SessionPatch, SessionStatus,
};
use crate::social::notify::StoreNotifier;
use crate::social::{
    ActivityEntry, ActivityFeed, AuthContext, FeedError, FeedPage, Friend, FriendError,
    Friendship, NotificationDispatcher, PendingRequests, Profile, ProfileError, ProfileManager,
    ReactionAction, ReactionType, RelationshipManager, Scope, VisibilityUpdate, WorkoutSummary,
};
use crate::storage::{AppConfig, SocialStore};

/// All social services, acting on behalf of the signed-in user.
pub struct SocialHub {
    auth: Arc<dyn AuthContext>,
    profiles: ProfileManager,
    relationships: Arc<RelationshipManager>,
    feed: ActivityFeed,
    leaderboards: LeaderboardEngine,
    live: LiveSessionController,
    page_size: usize,
}

impl SocialHub {
    /// Wire every service to one SQLite store. Notifications are persisted
    /// to the store's notifications table.
    pub fn new(
        store: SocialStore,
        config: &AppConfig,
        auth: Arc<dyn AuthContext>,
        streaks: Arc<dyn StreakService>,
    ) -> Self {
        let store = Arc::new(store);
        let notifier = NotificationDispatcher::new(Arc::new(StoreNotifier::new(store.clone())));

        let relationships = Arc::new(RelationshipManager::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
        ));
        let feed = ActivityFeed::new(
            store.clone(),
            store.clone(),
            relationships.clone(),
            notifier.clone(),
        );
        let leaderboards =
            LeaderboardEngine::new(store.clone(), store.clone(), relationships.clone(), streaks);
        let live = LiveSessionController::new(
            store.clone(),
            store.clone(),
            notifier,
            config.live.membership_policy(),
        );

        Self {
            auth,
            profiles: ProfileManager::new(store),
            relationships,
            feed,
            leaderboards,
            live,
            page_size: config.feed.page_size.max(1),
        }
    }

    fn caller(&self) -> Result<Uuid, HubError> {
        self.auth.current_user_id().ok_or(HubError::NotAuthenticated)
    }

    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }

    pub fn relationships(&self) -> &RelationshipManager {
        &self.relationships
    }

    pub fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    pub fn leaderboards(&self) -> &LeaderboardEngine {
        &self.leaderboards
    }

    pub fn live(&self) -> &LiveSessionController {
        &self.live
    }

    // ========== Profile ==========

    /// Caller's profile, created with `display_name` on first use.
    pub async fn sign_up(&self, display_name: &str) -> Result<Profile, HubError> {
        let me = self.caller()?;
        Ok(self.profiles.get_or_create(me, display_name).await?)
    }

    pub async fn my_profile(&self) -> Result<Profile, HubError> {
        let me = self.caller()?;
        Ok(self.profiles.get(me).await?)
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, HubError> {
        let me = self.caller()?;
        Ok(self.profiles.update(me, profile).await?)
    }

    pub async fn set_visibility(&self, update: VisibilityUpdate) -> Result<Profile, HubError> {
        let me = self.caller()?;
        Ok(self.profiles.set_visibility(me, update).await?)
    }

    pub async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<Profile>, HubError> {
        let me = self.caller()?;
        Ok(self.profiles.search(me, query, limit).await?)
    }

    // ========== Friends ==========

    pub async fn send_friend_request(&self, to: Uuid) -> Result<Friendship, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.send_request(me, to).await?)
    }

    pub async fn accept_friend_request(&self, edge_id: Uuid) -> Result<Friendship, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.accept(edge_id, me).await?)
    }

    pub async fn decline_friend_request(&self, edge_id: Uuid) -> Result<Friendship, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.decline(edge_id, me).await?)
    }

    pub async fn cancel_friend_request(&self, edge_id: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.relationships.cancel(edge_id, me).await?)
    }

    pub async fn remove_friend(&self, edge_id: Uuid) -> Result<Friendship, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.remove_by(edge_id, me).await?)
    }

    pub async fn block_user(&self, target: Uuid) -> Result<Friendship, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.block(me, target).await?)
    }

    pub async fn friends(&self) -> Result<Vec<Friend>, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.list_friends(me).await?)
    }

    pub async fn pending_requests(&self) -> Result<PendingRequests, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.pending_requests(me).await?)
    }

    pub async fn friendship_with(&self, other: Uuid) -> Result<Option<Friendship>, HubError> {
        let me = self.caller()?;
        Ok(self.relationships.status(me, other).await?)
    }

    pub async fn nudge(&self, to: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.relationships.nudge(me, to).await?)
    }

    // ========== Feed ==========

    pub async fn publish_workout(
        &self,
        summary: WorkoutSummary,
    ) -> Result<Option<ActivityEntry>, HubError> {
        let me = self.caller()?;
        Ok(self.feed.publish(me, summary).await?)
    }

    /// One page of the caller's feed at the configured page size.
    pub async fn activity_feed(&self, scope: Scope, page: usize) -> Result<FeedPage, HubError> {
        let me = self.caller()?;
        Ok(self.feed.feed(me, scope, page, self.page_size).await?)
    }

    pub async fn toggle_reaction(
        &self,
        activity_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<ReactionAction, HubError> {
        let me = self.caller()?;
        Ok(self
            .feed
            .toggle_reaction(activity_id, me, reaction_type)
            .await?)
    }

    // ========== Leaderboards ==========

    pub async fn record_workout_volume(&self, volume_kg: f64) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.leaderboards.record_volume(me, volume_kg).await?)
    }

    pub async fn record_nutrition(&self, calories: f64, protein_g: f64) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self
            .leaderboards
            .record_nutrition(me, calories, protein_g)
            .await?)
    }

    pub async fn record_supplement(&self, water_ml: f64, creatine_g: f64) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self
            .leaderboards
            .record_supplement(me, water_ml, creatine_g)
            .await?)
    }

    pub async fn leaderboard(
        &self,
        entry_type: LeaderboardType,
        scope: Scope,
        limit: usize,
    ) -> Result<Leaderboard, HubError> {
        let me = self.caller()?;
        Ok(self.leaderboards.rank(me, entry_type, scope, limit).await?)
    }

    pub async fn strength_leaderboard(
        &self,
        exercise_name: &str,
        scope: Scope,
        limit: usize,
    ) -> Result<Vec<StrengthEntry>, HubError> {
        let me = self.caller()?;
        Ok(self
            .leaderboards
            .strength_ratio_rank(me, exercise_name, scope, limit)
            .await?)
    }

    // ========== Live sessions ==========

    pub async fn host_live_session(
        &self,
        members: &[Uuid],
        options: CreateOptions,
    ) -> Result<LiveSession, HubError> {
        let me = self.caller()?;
        Ok(self.live.create(me, members, options).await?)
    }

    pub async fn invite_to_session(&self, session_id: Uuid, to: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.live.invite(session_id, me, to).await?)
    }

    pub async fn accept_session_invite(&self, session_id: Uuid) -> Result<Vec<Uuid>, HubError> {
        let me = self.caller()?;
        Ok(self.live.accept_invite(session_id, me).await?)
    }

    /// Join an open session by its invite code.
    pub async fn join_by_code(&self, code: &str) -> Result<LiveSession, HubError> {
        let me = self.caller()?;
        let session = self
            .live
            .find_by_invite_code(code)
            .await?
            .ok_or_else(|| HubError::InvalidInviteCode(code.to_string()))?;
        let participant_ids = self.live.add_participant(session.id, me).await?;
        Ok(LiveSession {
            participant_ids,
            ..session
        })
    }

    pub async fn leave_session(&self, session_id: Uuid) -> Result<Vec<Uuid>, HubError> {
        let me = self.caller()?;
        Ok(self.live.remove_participant(session_id, me).await?)
    }

    pub async fn request_to_join(&self, session_id: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.live.request_join(session_id, me).await?)
    }

    pub async fn decline_join_request(&self, session_id: Uuid, user: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        Ok(self.live.decline_join_request(session_id, me, user).await?)
    }

    pub async fn pending_session_invite(&self) -> Result<Option<LiveSession>, HubError> {
        let me = self.caller()?;
        Ok(self.live.pending_invite_for(me).await?)
    }

    /// Hand leadership on. Only the current leader or the host may.
    pub async fn transfer_leadership(&self, session_id: Uuid, new_leader: Uuid) -> Result<(), HubError> {
        let me = self.caller()?;
        self.live.ensure_in_charge(session_id, me).await?;
        Ok(self.live.transfer_leadership(session_id, new_leader).await?)
    }

    pub async fn advance_session(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        patch: SessionPatch,
    ) -> Result<LiveSession, HubError> {
        let me = self.caller()?;
        self.live.ensure_in_charge(session_id, me).await?;
        Ok(self.live.advance(session_id, status, patch).await?)
    }
}

/// Hub errors.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("No open session for invite code {0}")]
    InvalidInviteCode(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Friends(#[from] FriendError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
