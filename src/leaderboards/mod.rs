//! Leaderboards module
//!
//! Provides weekly category leaderboards, streak snapshots and
//! strength-to-bodyweight rankings.

pub mod rankings;
pub mod streaks;
pub mod strength;
pub mod types;

// Re-export commonly used types
pub use rankings::{current_week_start, week_start, Leaderboard, LeaderboardEngine, LeaderboardError};
pub use streaks::{StaticStreaks, StreakCounts, StreakError, StreakService};
pub use types::*;
