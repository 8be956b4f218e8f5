//! Leaderboard types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::social::Profile;

/// Weekly leaderboard category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardType {
    Volume,
    Calories,
    Protein,
    Water,
    Creatine,
    TotalWorkouts,
    GymStreak,
    NutritionStreak,
    CombinedStreak,
}

impl LeaderboardType {
    pub const ALL: [LeaderboardType; 9] = [
        LeaderboardType::Volume,
        LeaderboardType::Calories,
        LeaderboardType::Protein,
        LeaderboardType::Water,
        LeaderboardType::Creatine,
        LeaderboardType::TotalWorkouts,
        LeaderboardType::GymStreak,
        LeaderboardType::NutritionStreak,
        LeaderboardType::CombinedStreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardType::Volume => "volume",
            LeaderboardType::Calories => "calories",
            LeaderboardType::Protein => "protein",
            LeaderboardType::Water => "water",
            LeaderboardType::Creatine => "creatine",
            LeaderboardType::TotalWorkouts => "total_workouts",
            LeaderboardType::GymStreak => "gym_streak",
            LeaderboardType::NutritionStreak => "nutrition_streak",
            LeaderboardType::CombinedStreak => "combined_streak",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Streak snapshots overwrite the weekly value instead of adding to it.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            LeaderboardType::GymStreak
                | LeaderboardType::NutritionStreak
                | LeaderboardType::CombinedStreak
        )
    }
}

/// Stored weekly value for one user and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_type: LeaderboardType,
    pub week_start: NaiveDate,
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

/// How a strength exercise loads the lifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    /// External load only (barbell, dumbbell, machine).
    Weighted,
    /// Own bodyweight plus an external load (weighted pull-up, dip).
    WeightedBodyweight,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Weighted => "weighted",
            ExerciseType::WeightedBodyweight => "weighted_bodyweight",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "weighted" => Some(ExerciseType::Weighted),
            "weighted_bodyweight" => Some(ExerciseType::WeightedBodyweight),
            _ => None,
        }
    }
}

/// Raw per-user maximum for one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthRow {
    pub user_id: Uuid,
    pub max_load_kg: f64,
    pub exercise_type: ExerciseType,
}

/// One ranked line of a leaderboard.
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub display_name: String,
    pub value: f64,
    pub profile: Option<Profile>,
    pub is_current_user: bool,
}

/// One ranked line of a strength-ratio leaderboard.
#[derive(Debug, Clone)]
pub struct StrengthEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub display_name: String,
    pub bodyweight_kg: f64,
    pub lifted_load_kg: f64,
    pub ratio: f64,
    pub exercise_type: ExerciseType,
    pub is_current_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_type_round_trip() {
        for t in LeaderboardType::ALL {
            assert_eq!(LeaderboardType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(LeaderboardType::from_str("distance"), None);
    }

    #[test]
    fn test_snapshot_types() {
        assert!(LeaderboardType::GymStreak.is_snapshot());
        assert!(LeaderboardType::CombinedStreak.is_snapshot());
        assert!(!LeaderboardType::Volume.is_snapshot());
        assert!(!LeaderboardType::TotalWorkouts.is_snapshot());
    }
}
