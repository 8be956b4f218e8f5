//! Weekly leaderboard engine.
//!
//! Accumulates per-user weekly totals, snapshots streaks and ranks both
//! globally and among friends.

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::streaks::{StreakError, StreakService};
use super::strength::rank_strength;
use super::types::{LeaderboardEntry, LeaderboardType, RankedEntry, StrengthEntry};
use crate::social::friends::{FriendError, RelationshipManager};
use crate::social::{Profile, Scope};
use crate::storage::{DatabaseError, LeaderboardStore, ProfileStore};

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Week currently being accumulated, in the local calendar.
pub fn current_week_start() -> NaiveDate {
    week_start(Local::now().date_naive())
}

/// 1-based dense ranks for values already sorted best-first.
/// Equal values share a rank and the next distinct value takes the next one.
pub(crate) fn dense_ranks(values: impl IntoIterator<Item = f64>) -> Vec<u32> {
    let mut ranks = Vec::new();
    let mut previous: Option<f64> = None;
    let mut rank = 0u32;
    for value in values {
        if previous != Some(value) {
            rank += 1;
            previous = Some(value);
        }
        ranks.push(rank);
    }
    ranks
}

/// Ranked leaderboard for one category and week.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub entry_type: LeaderboardType,
    pub week_start: NaiveDate,
    pub entries: Vec<RankedEntry>,
    /// The viewer's own line, if it made the cut.
    pub viewer_entry: Option<RankedEntry>,
}

/// Leaderboard engine.
pub struct LeaderboardEngine {
    entries: Arc<dyn LeaderboardStore>,
    profiles: Arc<dyn ProfileStore>,
    relationships: Arc<RelationshipManager>,
    streaks: Arc<dyn StreakService>,
}

impl LeaderboardEngine {
    /// Create a new leaderboard engine.
    pub fn new(
        entries: Arc<dyn LeaderboardStore>,
        profiles: Arc<dyn ProfileStore>,
        relationships: Arc<RelationshipManager>,
        streaks: Arc<dyn StreakService>,
    ) -> Self {
        Self {
            entries,
            profiles,
            relationships,
            streaks,
        }
    }

    /// Record a finished workout's volume. Also counts the workout and
    /// refreshes streak snapshots.
    pub async fn record_volume(&self, user: Uuid, volume_kg: f64) -> Result<(), LeaderboardError> {
        if !self.opted_in(user).await? {
            return Ok(());
        }
        let week = current_week_start();
        self.write_value(user, LeaderboardType::Volume, week, volume_kg)
            .await?;
        self.write_value(user, LeaderboardType::TotalWorkouts, week, 1.0)
            .await?;
        self.write_streaks(user, week).await
    }

    /// Record logged calories and protein.
    pub async fn record_nutrition(
        &self,
        user: Uuid,
        calories: f64,
        protein_g: f64,
    ) -> Result<(), LeaderboardError> {
        if !self.opted_in(user).await? {
            return Ok(());
        }
        let week = current_week_start();
        self.write_value(user, LeaderboardType::Calories, week, calories)
            .await?;
        self.write_value(user, LeaderboardType::Protein, week, protein_g)
            .await
    }

    /// Record logged water and creatine.
    pub async fn record_supplement(
        &self,
        user: Uuid,
        water_ml: f64,
        creatine_g: f64,
    ) -> Result<(), LeaderboardError> {
        if !self.opted_in(user).await? {
            return Ok(());
        }
        let week = current_week_start();
        self.write_value(user, LeaderboardType::Water, week, water_ml)
            .await?;
        self.write_value(user, LeaderboardType::Creatine, week, creatine_g)
            .await
    }

    /// Snapshot the user's current streaks into this week's entries.
    pub async fn refresh_streak_entries(&self, user: Uuid) -> Result<(), LeaderboardError> {
        if !self.opted_in(user).await? {
            return Ok(());
        }
        self.write_streaks(user, current_week_start()).await
    }

    async fn write_streaks(&self, user: Uuid, week: NaiveDate) -> Result<(), LeaderboardError> {
        let (gym, nutrition, combined) = futures::try_join!(
            self.streaks.gym_streak(user),
            self.streaks.nutrition_streak(user),
            self.streaks.combined_streak(user),
        )?;

        self.write_value(user, LeaderboardType::GymStreak, week, gym as f64)
            .await?;
        self.write_value(user, LeaderboardType::NutritionStreak, week, nutrition as f64)
            .await?;
        self.write_value(user, LeaderboardType::CombinedStreak, week, combined as f64)
            .await?;

        tracing::debug!(%user, gym, nutrition, combined, "Refreshed streak entries");
        Ok(())
    }

    async fn opted_in(&self, user: Uuid) -> Result<bool, LeaderboardError> {
        let opted_in = self
            .profiles
            .get_profile(user)
            .await?
            .map(|p| p.leaderboard_opt_in)
            .unwrap_or(false);
        if !opted_in {
            tracing::debug!(%user, "Not opted into leaderboards, skipping");
        }
        Ok(opted_in)
    }

    /// Add to (or, for streak types, replace) the user's weekly value.
    async fn write_value(
        &self,
        user: Uuid,
        entry_type: LeaderboardType,
        week: NaiveDate,
        amount: f64,
    ) -> Result<(), LeaderboardError> {
        if let Some(existing) = self.entries.get_entry(user, entry_type, week).await? {
            return self.apply(&existing, amount).await;
        }

        let entry = LeaderboardEntry {
            id: Uuid::new_v4(),
            user_id: user,
            entry_type,
            week_start: week,
            value: amount,
            updated_at: Utc::now(),
        };
        match self.entries.insert_entry(&entry).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unique_violation() => {
                // Another writer created the row between our read and insert.
                match self.entries.get_entry(user, entry_type, week).await? {
                    Some(existing) => self.apply(&existing, amount).await,
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn apply(&self, existing: &LeaderboardEntry, amount: f64) -> Result<(), LeaderboardError> {
        let value = if existing.entry_type.is_snapshot() {
            amount
        } else {
            existing.value + amount
        };
        self.entries.update_entry_value(existing.id, value).await?;
        Ok(())
    }

    /// Rank this week's entries of one category.
    pub async fn rank(
        &self,
        viewer: Uuid,
        entry_type: LeaderboardType,
        scope: Scope,
        limit: usize,
    ) -> Result<Leaderboard, LeaderboardError> {
        let week = current_week_start();
        let users = self.scope_users(viewer, scope).await?;

        let mut rows = self
            .entries
            .entries_for_week(entry_type, week, users.as_deref())
            .await?;
        rows.truncate(limit);

        let profiles = self.profile_map(rows.iter().map(|r| r.user_id)).await?;
        let ranks = dense_ranks(rows.iter().map(|r| r.value));

        let entries: Vec<RankedEntry> = rows
            .into_iter()
            .zip(ranks)
            .map(|(row, rank)| {
                let profile = profiles.get(&row.user_id).cloned();
                RankedEntry {
                    rank,
                    user_id: row.user_id,
                    display_name: profile
                        .as_ref()
                        .map(|p| p.display_name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    value: row.value,
                    profile,
                    is_current_user: row.user_id == viewer,
                }
            })
            .collect();

        let viewer_entry = entries.iter().find(|e| e.is_current_user).cloned();
        Ok(Leaderboard {
            entry_type,
            week_start: week,
            entries,
            viewer_entry,
        })
    }

    /// Rank users by best lift of `exercise_name` relative to bodyweight.
    pub async fn strength_ratio_rank(
        &self,
        viewer: Uuid,
        exercise_name: &str,
        scope: Scope,
        limit: usize,
    ) -> Result<Vec<StrengthEntry>, LeaderboardError> {
        let mut rows = self.entries.strength_rows(exercise_name).await?;
        if let Some(users) = self.scope_users(viewer, scope).await? {
            rows.retain(|r| users.contains(&r.user_id));
        }

        let profiles = self.profile_map(rows.iter().map(|r| r.user_id)).await?;
        Ok(rank_strength(rows, &profiles, viewer, limit))
    }

    /// Exercise names logged by the most users.
    pub async fn popular_exercises(&self, limit: usize) -> Result<Vec<String>, LeaderboardError> {
        Ok(self.entries.popular_exercise_names(limit).await?)
    }

    async fn scope_users(&self, viewer: Uuid, scope: Scope) -> Result<Option<Vec<Uuid>>, LeaderboardError> {
        match scope {
            Scope::Global => Ok(None),
            Scope::Friends => Ok(Some(self.relationships.friend_ids(viewer).await?)),
        }
    }

    async fn profile_map(
        &self,
        users: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, Profile>, LeaderboardError> {
        let mut ids: Vec<Uuid> = users.collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let profiles = self.profiles.profiles_by_ids(&ids).await?;
        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Leaderboard errors.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Streak lookup failed: {0}")]
    Streak(#[from] StreakError),

    #[error(transparent)]
    Friends(#[from] FriendError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
