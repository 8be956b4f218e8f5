//! Profile management.
//!
//! Provides profile creation, updates of visibility flags and user search.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::Profile;
use crate::storage::{DatabaseError, ProfileStore};

/// Visibility flags a user may change on their own profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityUpdate {
    pub share_workouts: Option<bool>,
    pub show_streak: Option<bool>,
    pub leaderboard_opt_in: Option<bool>,
}

/// Profile manager.
pub struct ProfileManager {
    store: Arc<dyn ProfileStore>,
}

impl ProfileManager {
    /// Create a new profile manager.
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Get a profile.
    pub async fn get(&self, user_id: Uuid) -> Result<Profile, ProfileError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(ProfileError::NotFound(user_id))
    }

    /// Get or create a profile with the given display name.
    pub async fn get_or_create(
        &self,
        user_id: Uuid,
        display_name: &str,
    ) -> Result<Profile, ProfileError> {
        if let Some(profile) = self.store.get_profile(user_id).await? {
            return Ok(profile);
        }

        let name = display_name.trim();
        if name.is_empty() {
            return Err(ProfileError::InvalidDisplayName);
        }

        let profile = Profile::new(user_id, name);
        match self.store.insert_profile(&profile).await {
            Ok(()) => Ok(profile),
            // Created concurrently by another call; use the stored one.
            Err(e) if e.is_unique_violation() => self.get(user_id).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the editable fields of a profile. Only the owner may do this.
    pub async fn update(&self, by: Uuid, profile: &Profile) -> Result<Profile, ProfileError> {
        if by != profile.id {
            return Err(ProfileError::NotOwner);
        }
        if profile.display_name.trim().is_empty() {
            return Err(ProfileError::InvalidDisplayName);
        }
        if matches!(profile.starting_weight, Some(w) if !w.is_finite()) {
            return Err(ProfileError::InvalidWeight);
        }

        let current = self.get(profile.id).await?;
        let updated = Profile {
            created_at: current.created_at,
            updated_at: Utc::now(),
            ..profile.clone()
        };
        self.store.update_profile(&updated).await?;
        Ok(updated)
    }

    /// Change visibility flags on the caller's own profile.
    pub async fn set_visibility(
        &self,
        user_id: Uuid,
        update: VisibilityUpdate,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.get(user_id).await?;
        if let Some(v) = update.share_workouts {
            profile.share_workouts = v;
        }
        if let Some(v) = update.show_streak {
            profile.show_streak = v;
        }
        if let Some(v) = update.leaderboard_opt_in {
            profile.leaderboard_opt_in = v;
        }
        profile.updated_at = Utc::now();

        self.store.update_profile(&profile).await?;
        tracing::debug!(%user_id, "Updated visibility flags");
        Ok(profile)
    }

    /// Search other users by display name or email.
    pub async fn search(
        &self,
        caller: Uuid,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Profile>, ProfileError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        // One extra row so dropping the caller still fills the page.
        let mut hits = self.store.search_profiles(query, limit + 1).await?;
        hits.retain(|p| p.id != caller);
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Profile errors.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid display name")]
    InvalidDisplayName,

    #[error("Invalid starting weight")]
    InvalidWeight,

    #[error("Profiles can only be changed by their owner")]
    NotOwner,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
