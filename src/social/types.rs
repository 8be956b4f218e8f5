//! Core types for social features.
//!
//! Defines user profiles, friendship edges, activity entries, reactions
//! and the scoping enum shared by the feed and leaderboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile with visibility preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    /// Bodyweight in kilograms, used to normalize strength leaderboards.
    pub starting_weight: Option<f64>,
    /// Publish completed workouts to the activity feed.
    pub share_workouts: bool,
    /// Show the current streak to friends.
    pub show_streak: bool,
    /// Take part in weekly leaderboards.
    pub leaderboard_opt_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile with default visibility flags.
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            email: None,
            starting_weight: None,
            share_workouts: true,
            show_streak: true,
            leaderboard_opt_in: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bodyweight usable for ratio calculations, if any.
    pub fn bodyweight(&self) -> Option<f64> {
        self.starting_weight.filter(|w| *w > 0.0)
    }
}

/// Lifecycle status of a friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
    Blocked,
    Removed,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Declined => "declined",
            FriendshipStatus::Blocked => "blocked",
            FriendshipStatus::Removed => "removed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            "declined" => Some(FriendshipStatus::Declined),
            "blocked" => Some(FriendshipStatus::Blocked),
            "removed" => Some(FriendshipStatus::Removed),
            _ => None,
        }
    }

    /// Whether the edge still counts as a live relationship between the pair.
    pub fn is_active(&self) -> bool {
        !matches!(self, FriendshipStatus::Declined | FriendshipStatus::Removed)
    }
}

/// Directed friendship edge. One row exists per unordered pair of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Create a fresh edge from `requester` to `recipient`.
    pub fn new(requester_id: Uuid, recipient_id: Uuid, status: FriendshipStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id,
            recipient_id,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// The party on the other side of the edge from `user`.
    pub fn other_party(&self, user: Uuid) -> Uuid {
        if self.requester_id == user {
            self.recipient_id
        } else {
            self.requester_id
        }
    }

    /// Whether `user` is one of the two parties.
    pub fn involves(&self, user: Uuid) -> bool {
        self.requester_id == user || self.recipient_id == user
    }
}

/// Orientation-agnostic key for a pair of users.
pub fn pair_key(a: Uuid, b: Uuid) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

/// A friend resolved to their profile.
#[derive(Debug, Clone)]
pub struct Friend {
    pub friendship_id: Uuid,
    pub profile: Profile,
    pub since: DateTime<Utc>,
}

/// A pending request resolved to the other party's profile.
#[derive(Debug, Clone)]
pub struct FriendRequest {
    pub friendship: Friendship,
    pub profile: Option<Profile>,
}

/// Incoming and outgoing pending requests for one user.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    pub incoming: Vec<FriendRequest>,
    pub outgoing: Vec<FriendRequest>,
}

/// Summary of a completed workout, as handed over by the workout tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub workout_name: String,
    pub duration_seconds: u32,
    pub total_volume_kg: f64,
    pub exercise_names: Vec<String>,
    pub exercise_count: u32,
    pub set_count: u32,
}

/// Immutable feed entry for one completed workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_name: String,
    pub duration_seconds: u32,
    pub total_volume_kg: f64,
    pub exercise_names: Vec<String>,
    pub exercise_count: u32,
    pub set_count: u32,
    pub created_at: DateTime<Utc>,
    /// Owner profile, filled in when read through the feed.
    #[serde(default)]
    pub profile: Option<Profile>,
    /// Reactions, filled in when read through the feed.
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl ActivityEntry {
    /// Snapshot a workout summary for `user_id`.
    pub fn from_summary(user_id: Uuid, summary: WorkoutSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            workout_name: summary.workout_name,
            duration_seconds: summary.duration_seconds,
            total_volume_kg: summary.total_volume_kg,
            exercise_names: summary.exercise_names,
            exercise_count: summary.exercise_count,
            set_count: summary.set_count,
            created_at: Utc::now(),
            profile: None,
            reactions: Vec::new(),
        }
    }
}

/// Reaction type on an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    Like,
    Clap,
    Fire,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Clap => "clap",
            ReactionType::Fire => "fire",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "like" => Some(ReactionType::Like),
            "clap" => Some(ReactionType::Clap),
            "fire" => Some(ReactionType::Fire),
            _ => None,
        }
    }
}

/// One user's reaction to one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a reaction toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Added,
    Removed,
    Updated,
}

/// Audience for feeds and leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The caller plus accepted friends.
    #[default]
    Friends,
    /// Everyone.
    Global,
}

impl Scope {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "friends" => Some(Scope::Friends),
            "global" => Some(Scope::Global),
            _ => None,
        }
    }
}
