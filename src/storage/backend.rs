//! Store interfaces consumed by the social services.
//!
//! Each method is one independent round-trip. Nothing here is atomic
//! across calls; services layer their own conflict handling on top.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::leaderboards::{LeaderboardEntry, LeaderboardType, StrengthRow};
use crate::live::{LiveSession, SessionPatch, SessionStatus};
use crate::social::notify::Notification;
use crate::social::{ActivityEntry, Friendship, FriendshipStatus, Profile, Reaction, ReactionType};
use crate::storage::DatabaseError;

/// Profile records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError>;

    /// Batch lookup by id (IN-list). Unknown ids are skipped.
    async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DatabaseError>;

    async fn insert_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;

    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;

    /// Case-insensitive display name / email prefix search.
    async fn search_profiles(&self, query: &str, limit: usize)
        -> Result<Vec<Profile>, DatabaseError>;
}

/// Friendship edges. The store keeps one row per unordered pair.
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    async fn get_friendship(&self, id: Uuid) -> Result<Option<Friendship>, DatabaseError>;

    /// The edge between `a` and `b` in either orientation.
    async fn find_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, DatabaseError>;

    /// Fails with `UniqueViolation` if the pair already has a row.
    async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), DatabaseError>;

    /// Overwrite orientation, status and `updated_at` of an existing row.
    async fn update_friendship(&self, friendship: &Friendship) -> Result<(), DatabaseError>;

    async fn delete_friendship(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn friendships_as_requester(
        &self,
        user: Uuid,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DatabaseError>;

    async fn friendships_as_recipient(
        &self,
        user: Uuid,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DatabaseError>;
}

/// Activity entries and their reactions.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert_activity(&self, activity: &ActivityEntry) -> Result<(), DatabaseError>;

    async fn get_activity(&self, id: Uuid) -> Result<Option<ActivityEntry>, DatabaseError>;

    /// Newest first. `owners = None` means unscoped.
    async fn list_activities(
        &self,
        owners: Option<&[Uuid]>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, DatabaseError>;

    async fn get_reaction(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Reaction>, DatabaseError>;

    /// Fails with `UniqueViolation` if the user already reacted.
    async fn insert_reaction(&self, reaction: &Reaction) -> Result<(), DatabaseError>;

    async fn update_reaction_type(
        &self,
        id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<(), DatabaseError>;

    async fn delete_reaction(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// All reactions for a batch of activities (IN-list).
    async fn reactions_for(&self, activity_ids: &[Uuid]) -> Result<Vec<Reaction>, DatabaseError>;
}

/// Weekly leaderboard rows plus the two opaque server-side computations.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn get_entry(
        &self,
        user_id: Uuid,
        entry_type: LeaderboardType,
        week_start: NaiveDate,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError>;

    /// Fails with `UniqueViolation` if the user/type/week row exists.
    async fn insert_entry(&self, entry: &LeaderboardEntry) -> Result<(), DatabaseError>;

    async fn update_entry_value(&self, id: Uuid, value: f64) -> Result<(), DatabaseError>;

    /// Rows with `value > 0` for a week, highest first.
    async fn entries_for_week(
        &self,
        entry_type: LeaderboardType,
        week_start: NaiveDate,
        users: Option<&[Uuid]>,
    ) -> Result<Vec<LeaderboardEntry>, DatabaseError>;

    /// Per-user maximum load for one exercise.
    async fn strength_rows(&self, exercise_name: &str) -> Result<Vec<StrengthRow>, DatabaseError>;

    /// Exercise names ordered by number of distinct users who logged them.
    async fn popular_exercise_names(&self, limit: usize) -> Result<Vec<String>, DatabaseError>;
}

/// Live session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fails with `UniqueViolation` on an invite code collision.
    async fn insert_session(&self, session: &LiveSession) -> Result<(), DatabaseError>;

    async fn get_session(&self, id: Uuid) -> Result<Option<LiveSession>, DatabaseError>;

    async fn get_participants(&self, id: Uuid) -> Result<Option<Vec<Uuid>>, DatabaseError>;

    /// Unconditional overwrite of the participant list.
    async fn set_participants(&self, id: Uuid, participants: &[Uuid])
        -> Result<(), DatabaseError>;

    async fn set_leader(&self, id: Uuid, leader_id: Uuid) -> Result<(), DatabaseError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        patch: &SessionPatch,
    ) -> Result<(), DatabaseError>;

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<LiveSession>, DatabaseError>;

    /// Sessions listing `user` as a participant, created at or after `since`,
    /// with one of `statuses`, newest first.
    async fn sessions_with_participant(
        &self,
        user: Uuid,
        statuses: &[SessionStatus],
        since: DateTime<Utc>,
    ) -> Result<Vec<LiveSession>, DatabaseError>;
}

/// Persisted notification requests.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), DatabaseError>;

    async fn notifications_for(
        &self,
        recipient: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, DatabaseError>;
}
