//! Streak source.
//!
//! Streak lengths are computed elsewhere (from workout and nutrition logs);
//! the leaderboard only snapshots them once a week.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Current streak lengths in days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakCounts {
    pub gym: u32,
    pub nutrition: u32,
    pub combined: u32,
}

/// External streak computation.
#[async_trait]
pub trait StreakService: Send + Sync {
    async fn gym_streak(&self, user: Uuid) -> Result<u32, StreakError>;

    async fn nutrition_streak(&self, user: Uuid) -> Result<u32, StreakError>;

    async fn combined_streak(&self, user: Uuid) -> Result<u32, StreakError>;
}

/// In-memory streak table. Users without an entry have no streak.
#[derive(Debug, Default)]
pub struct StaticStreaks {
    counts: RwLock<HashMap<Uuid, StreakCounts>>,
}

impl StaticStreaks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: Uuid, counts: StreakCounts) -> Result<(), StreakError> {
        self.counts
            .write()
            .map_err(|_| StreakError::Unavailable("streak table lock poisoned".to_string()))?
            .insert(user, counts);
        Ok(())
    }

    fn get(&self, user: Uuid) -> Result<StreakCounts, StreakError> {
        let counts = self
            .counts
            .read()
            .map_err(|_| StreakError::Unavailable("streak table lock poisoned".to_string()))?;
        Ok(counts.get(&user).copied().unwrap_or_default())
    }
}

#[async_trait]
impl StreakService for StaticStreaks {
    async fn gym_streak(&self, user: Uuid) -> Result<u32, StreakError> {
        Ok(self.get(user)?.gym)
    }

    async fn nutrition_streak(&self, user: Uuid) -> Result<u32, StreakError> {
        Ok(self.get(user)?.nutrition)
    }

    async fn combined_streak(&self, user: Uuid) -> Result<u32, StreakError> {
        Ok(self.get(user)?.combined)
    }
}

/// Streak lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum StreakError {
    #[error("Streak service unavailable: {0}")]
    Unavailable(String),
}
