//! Activity feed and reactions.
//!
//! Entries are immutable workout snapshots. Feeds page newest-first and
//! are enriched with owner profiles and reactions in one batched query
//! each per page.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::friends::{FriendError, RelationshipManager};
use super::notify::{display_name_or_default, Notification, NotificationDispatcher};
use super::types::{
    ActivityEntry, Reaction, ReactionAction, ReactionType, Scope, WorkoutSummary,
};
use crate::storage::{ActivityStore, DatabaseError, ProfileStore};

/// One page of the activity feed.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub entries: Vec<ActivityEntry>,
    pub page: usize,
    pub page_size: usize,
    /// A full page came back, so another one may exist.
    pub has_more: bool,
}

/// Activity feed manager.
pub struct ActivityFeed {
    activities: Arc<dyn ActivityStore>,
    profiles: Arc<dyn ProfileStore>,
    relationships: Arc<RelationshipManager>,
    notifier: NotificationDispatcher,
}

impl ActivityFeed {
    /// Create a new activity feed.
    pub fn new(
        activities: Arc<dyn ActivityStore>,
        profiles: Arc<dyn ProfileStore>,
        relationships: Arc<RelationshipManager>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            activities,
            profiles,
            relationships,
            notifier,
        }
    }

    /// Publish a completed workout.
    ///
    /// Returns `None` without writing anything when the owner does not
    /// share workouts.
    pub async fn publish(
        &self,
        owner: Uuid,
        summary: WorkoutSummary,
    ) -> Result<Option<ActivityEntry>, FeedError> {
        let profile = self
            .profiles
            .get_profile(owner)
            .await?
            .ok_or(FeedError::ProfileNotFound(owner))?;

        if !profile.share_workouts {
            tracing::debug!(%owner, "Workout sharing disabled, not publishing");
            return Ok(None);
        }

        let entry = ActivityEntry::from_summary(owner, summary);
        self.activities.insert_activity(&entry).await?;

        tracing::info!(%owner, activity_id = %entry.id, "Published activity");
        Ok(Some(entry))
    }

    /// Get one page of the feed for `user`.
    pub async fn feed(
        &self,
        user: Uuid,
        scope: Scope,
        page: usize,
        page_size: usize,
    ) -> Result<FeedPage, FeedError> {
        if page_size == 0 {
            return Err(FeedError::InvalidPageSize);
        }
        let Some(offset) = page.checked_mul(page_size) else {
            return Ok(FeedPage {
                entries: Vec::new(),
                page,
                page_size,
                has_more: false,
            });
        };

        let owners = match scope {
            Scope::Friends => Some(self.relationships.friend_ids(user).await?),
            Scope::Global => None,
        };

        let mut entries = self
            .activities
            .list_activities(owners.as_deref(), offset, page_size)
            .await?;

        self.enrich(&mut entries).await?;

        Ok(FeedPage {
            has_more: entries.len() == page_size,
            entries,
            page,
            page_size,
        })
    }

    async fn enrich(&self, entries: &mut [ActivityEntry]) -> Result<(), FeedError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut owner_ids: Vec<Uuid> = entries.iter().map(|e| e.user_id).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let activity_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();

        let (profiles, reactions) = futures::try_join!(
            self.profiles.profiles_by_ids(&owner_ids),
            self.activities.reactions_for(&activity_ids),
        )?;

        let profiles: HashMap<Uuid, _> = profiles.into_iter().map(|p| (p.id, p)).collect();
        let mut by_activity: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
        for reaction in reactions {
            by_activity
                .entry(reaction.activity_id)
                .or_default()
                .push(reaction);
        }

        for entry in entries.iter_mut() {
            entry.profile = profiles.get(&entry.user_id).cloned();
            entry.reactions = by_activity.remove(&entry.id).unwrap_or_default();
        }

        Ok(())
    }

    /// Toggle `user`'s reaction on an activity.
    ///
    /// No reaction inserts, the same type removes, another type replaces.
    pub async fn toggle_reaction(
        &self,
        activity_id: Uuid,
        user: Uuid,
        reaction_type: ReactionType,
    ) -> Result<ReactionAction, FeedError> {
        let activity = self
            .activities
            .get_activity(activity_id)
            .await?
            .ok_or(FeedError::ActivityNotFound(activity_id))?;

        let action = match self.activities.get_reaction(activity_id, user).await? {
            Some(existing) => self.apply_toggle(existing, reaction_type).await?,
            None => {
                let reaction = Reaction {
                    id: Uuid::new_v4(),
                    activity_id,
                    user_id: user,
                    reaction_type,
                    created_at: Utc::now(),
                };
                match self.activities.insert_reaction(&reaction).await {
                    Ok(()) => ReactionAction::Added,
                    Err(e) if e.is_unique_violation() => {
                        // A concurrent toggle inserted first; toggle against its row.
                        match self.activities.get_reaction(activity_id, user).await? {
                            Some(existing) => self.apply_toggle(existing, reaction_type).await?,
                            None => return Err(e.into()),
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        if action == ReactionAction::Added && activity.user_id != user {
            let name = display_name_or_default(self.profiles.as_ref(), user).await;
            self.notifier
                .dispatch(Notification::reaction(
                    activity.user_id,
                    user,
                    &name,
                    activity_id,
                    reaction_type.as_str(),
                ))
                .await;
        }

        tracing::debug!(%activity_id, %user, ?action, "Toggled reaction");
        Ok(action)
    }

    async fn apply_toggle(
        &self,
        existing: Reaction,
        reaction_type: ReactionType,
    ) -> Result<ReactionAction, FeedError> {
        if existing.reaction_type == reaction_type {
            self.activities.delete_reaction(existing.id).await?;
            Ok(ReactionAction::Removed)
        } else {
            self.activities
                .update_reaction_type(existing.id, reaction_type)
                .await?;
            Ok(ReactionAction::Updated)
        }
    }

    /// Reactions on one activity.
    pub async fn reactions(&self, activity_id: Uuid) -> Result<Vec<Reaction>, FeedError> {
        Ok(self.activities.reactions_for(&[activity_id]).await?)
    }
}

/// Feed errors.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(Uuid),

    #[error("Activity not found: {0}")]
    ActivityNotFound(Uuid),

    #[error("Page size must be positive")]
    InvalidPageSize,

    #[error(transparent)]
    Friends(#[from] FriendError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
