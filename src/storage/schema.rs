//! Database schema definitions.
//!
//! Uniqueness constraints double as the conflict detectors for the
//! social services: one friendship row per unordered pair, one reaction
//! per user and activity, one leaderboard row per user/type/week, and
//! globally unique invite codes.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- User profiles
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    email TEXT,
    starting_weight REAL,
    share_workouts INTEGER NOT NULL DEFAULT 1,
    show_streak INTEGER NOT NULL DEFAULT 1,
    leaderboard_opt_in INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Friendship edges, one row per unordered pair
CREATE TABLE IF NOT EXISTS friendships (
    id TEXT PRIMARY KEY,
    pair_key TEXT NOT NULL UNIQUE,
    requester_id TEXT NOT NULL,
    recipient_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_friendships_requester ON friendships(requester_id, status);
CREATE INDEX IF NOT EXISTS idx_friendships_recipient ON friendships(recipient_id, status);

-- Completed workout snapshots
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    workout_name TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL,
    total_volume_kg REAL NOT NULL,
    exercise_names_json TEXT NOT NULL,
    exercise_count INTEGER NOT NULL,
    set_count INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_created ON activities(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_activities_user ON activities(user_id, created_at DESC);

-- Reactions, at most one per user and activity
CREATE TABLE IF NOT EXISTS reactions (
    id TEXT PRIMARY KEY,
    activity_id TEXT NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    reaction_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(activity_id, user_id)
);

-- Weekly leaderboard values
CREATE TABLE IF NOT EXISTS leaderboard_entries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    entry_type TEXT NOT NULL,
    week_start TEXT NOT NULL,
    value REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, entry_type, week_start)
);

CREATE INDEX IF NOT EXISTS idx_leaderboard_week ON leaderboard_entries(entry_type, week_start, value DESC);

-- Logged strength sets, source for strength leaderboards
CREATE TABLE IF NOT EXISTS exercise_sets (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    exercise_name TEXT NOT NULL,
    exercise_type TEXT NOT NULL,
    weight_kg REAL NOT NULL,
    reps INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_exercise_sets_name ON exercise_sets(exercise_name, user_id);

-- Live workout sessions
CREATE TABLE IF NOT EXISTS live_sessions (
    id TEXT PRIMARY KEY,
    host_id TEXT NOT NULL,
    leader_id TEXT NOT NULL,
    participant_ids_json TEXT NOT NULL,
    status TEXT NOT NULL,
    invite_code TEXT UNIQUE,
    max_participants INTEGER NOT NULL,
    workout_name TEXT,
    created_at TEXT NOT NULL,
    started_at TEXT,
    ended_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_live_sessions_status ON live_sessions(status, created_at DESC);

-- Notification requests
CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    recipient_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_id, created_at DESC);
"#;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
