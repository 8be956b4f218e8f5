//! SQLite-backed social store.
//!
//! Provides persistence for:
//! - Profiles
//! - Friendship edges
//! - Activities and reactions
//! - Weekly leaderboard rows and logged strength sets
//! - Live sessions
//! - Notification requests
//!
//! Each trait method issues a single statement.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::sync::Arc;
use uuid::Uuid;

use crate::leaderboards::{ExerciseType, LeaderboardEntry, LeaderboardType, StrengthRow};
use crate::live::{LiveSession, SessionPatch, SessionStatus};
use crate::social::notify::{Notification, NotificationKind};
use crate::social::{
    pair_key, ActivityEntry, Friendship, FriendshipStatus, Profile, Reaction, ReactionType,
};
use crate::storage::backend::{
    ActivityStore, FriendshipStore, LeaderboardStore, NotificationStore, ProfileStore,
    SessionStore,
};
use crate::storage::database::{Database, DatabaseError};

const PROFILE_COLUMNS: &str = "id, display_name, email, starting_weight, share_workouts,
     show_streak, leaderboard_opt_in, created_at, updated_at";

const FRIENDSHIP_COLUMNS: &str =
    "id, requester_id, recipient_id, status, created_at, updated_at";

const ACTIVITY_COLUMNS: &str = "id, user_id, workout_name, duration_seconds, total_volume_kg,
     exercise_names_json, exercise_count, set_count, created_at";

const REACTION_COLUMNS: &str = "id, activity_id, user_id, reaction_type, created_at";

const ENTRY_COLUMNS: &str = "id, user_id, entry_type, week_start, value, updated_at";

const SESSION_COLUMNS: &str = "id, host_id, leader_id, participant_ids_json, status,
     invite_code, max_participants, workout_name, created_at, started_at, ended_at";

/// Social store for persisting social and live-session data.
#[derive(Clone)]
pub struct SocialStore {
    db: Arc<Database>,
}

impl SocialStore {
    /// Create a new social store over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store over a fresh in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?)))
    }

    /// Log one strength set. Strength leaderboards aggregate these rows.
    pub fn record_exercise_set(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        exercise_type: ExerciseType,
        weight_kg: f64,
        reps: u32,
    ) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO exercise_sets (id, user_id, exercise_name, exercise_type, weight_kg, reps, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    Uuid::new_v4().to_string(),
                    user_id.to_string(),
                    exercise_name,
                    exercise_type.as_str(),
                    weight_kg,
                    reps,
                    timestamp(&Utc::now()),
                ],
            )
        })?;
        Ok(())
    }
}

// ========== Row Mapping ==========

/// Fixed-width RFC 3339 so that stored timestamps sort lexicographically.
pub(crate) fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognised value: {0}")]
struct UnknownValue(String);

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn opt_time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn enum_at<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    parse(&s).ok_or_else(|| conversion_error(idx, UnknownValue(s)))
}

fn json_at<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_error(idx, e))
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: uuid_at(row, 0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        starting_weight: row.get(3)?,
        share_workouts: row.get(4)?,
        show_streak: row.get(5)?,
        leaderboard_opt_in: row.get(6)?,
        created_at: time_at(row, 7)?,
        updated_at: time_at(row, 8)?,
    })
}

fn row_to_friendship(row: &Row<'_>) -> rusqlite::Result<Friendship> {
    Ok(Friendship {
        id: uuid_at(row, 0)?,
        requester_id: uuid_at(row, 1)?,
        recipient_id: uuid_at(row, 2)?,
        status: enum_at(row, 3, FriendshipStatus::from_str)?,
        created_at: time_at(row, 4)?,
        updated_at: time_at(row, 5)?,
    })
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<ActivityEntry> {
    Ok(ActivityEntry {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        workout_name: row.get(2)?,
        duration_seconds: row.get(3)?,
        total_volume_kg: row.get(4)?,
        exercise_names: json_at(row, 5)?,
        exercise_count: row.get(6)?,
        set_count: row.get(7)?,
        created_at: time_at(row, 8)?,
        profile: None,
        reactions: Vec::new(),
    })
}

fn row_to_reaction(row: &Row<'_>) -> rusqlite::Result<Reaction> {
    Ok(Reaction {
        id: uuid_at(row, 0)?,
        activity_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        reaction_type: enum_at(row, 3, ReactionType::from_str)?,
        created_at: time_at(row, 4)?,
    })
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LeaderboardEntry> {
    let week: String = row.get(3)?;
    Ok(LeaderboardEntry {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        entry_type: enum_at(row, 2, LeaderboardType::from_str)?,
        week_start: week
            .parse::<NaiveDate>()
            .map_err(|e| conversion_error(3, e))?,
        value: row.get(4)?,
        updated_at: time_at(row, 5)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<LiveSession> {
    Ok(LiveSession {
        id: uuid_at(row, 0)?,
        host_id: uuid_at(row, 1)?,
        leader_id: uuid_at(row, 2)?,
        participant_ids: json_at(row, 3)?,
        status: enum_at(row, 4, SessionStatus::from_str)?,
        invite_code: row.get(5)?,
        max_participants: row.get(6)?,
        workout_name: row.get(7)?,
        created_at: time_at(row, 8)?,
        started_at: opt_time_at(row, 9)?,
        ended_at: opt_time_at(row, 10)?,
    })
}

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: uuid_at(row, 0)?,
        recipient_id: uuid_at(row, 1)?,
        kind: enum_at(row, 2, NotificationKind::from_str)?,
        title: row.get(3)?,
        body: row.get(4)?,
        payload: json_at(row, 5)?,
        created_at: time_at(row, 6)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn id_values(ids: &[Uuid]) -> Vec<Value> {
    ids.iter().map(|id| Value::Text(id.to_string())).collect()
}

/// Turn an UPDATE that touched nothing into an error.
fn require_row(changed: usize, table: &str, id: Uuid) -> Result<(), DatabaseError> {
    if changed == 0 {
        return Err(DatabaseError::NotFound(format!("{table} {id}")));
    }
    Ok(())
}

// ========== Profile Operations ==========

#[async_trait]
impl ProfileStore for SocialStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id.to_string()],
                row_to_profile,
            )
            .optional()
        })
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id IN ({})",
                placeholders(ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(id_values(ids)), row_to_profile)?;
            rows.collect()
        })
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, display_name, email, starting_weight, share_workouts,
                                       show_streak, leaderboard_opt_in, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    profile.id.to_string(),
                    profile.display_name,
                    profile.email,
                    profile.starting_weight,
                    profile.share_workouts,
                    profile.show_streak,
                    profile.leaderboard_opt_in,
                    timestamp(&profile.created_at),
                    timestamp(&profile.updated_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE profiles SET display_name = ?2, email = ?3, starting_weight = ?4,
                                     share_workouts = ?5, show_streak = ?6,
                                     leaderboard_opt_in = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    profile.id.to_string(),
                    profile.display_name,
                    profile.email,
                    profile.starting_weight,
                    profile.share_workouts,
                    profile.show_streak,
                    profile.leaderboard_opt_in,
                    timestamp(&profile.updated_at),
                ],
            )
        })?;
        require_row(changed, "profiles", profile.id)
    }

    async fn search_profiles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Profile>, DatabaseError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROFILE_COLUMNS} FROM profiles
                 WHERE lower(display_name) LIKE ?1 OR lower(COALESCE(email, '')) LIKE ?1
                 ORDER BY display_name ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![pattern, limit as i64], row_to_profile)?;
            rows.collect()
        })
    }
}

// ========== Friendship Operations ==========

#[async_trait]
impl FriendshipStore for SocialStore {
    async fn get_friendship(&self, id: Uuid) -> Result<Option<Friendship>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE id = ?1"),
                params![id.to_string()],
                row_to_friendship,
            )
            .optional()
        })
    }

    async fn find_pair(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE pair_key = ?1"),
                params![pair_key(a, b)],
                row_to_friendship,
            )
            .optional()
        })
    }

    async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO friendships (id, pair_key, requester_id, recipient_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    friendship.id.to_string(),
                    pair_key(friendship.requester_id, friendship.recipient_id),
                    friendship.requester_id.to_string(),
                    friendship.recipient_id.to_string(),
                    friendship.status.as_str(),
                    timestamp(&friendship.created_at),
                    timestamp(&friendship.updated_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn update_friendship(&self, friendship: &Friendship) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE friendships SET requester_id = ?2, recipient_id = ?3, status = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    friendship.id.to_string(),
                    friendship.requester_id.to_string(),
                    friendship.recipient_id.to_string(),
                    friendship.status.as_str(),
                    timestamp(&friendship.updated_at),
                ],
            )
        })?;
        require_row(changed, "friendships", friendship.id)
    }

    async fn delete_friendship(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM friendships WHERE id = ?1", params![id.to_string()])
        })?;
        Ok(())
    }

    async fn friendships_as_requester(
        &self,
        user: Uuid,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DatabaseError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FRIENDSHIP_COLUMNS} FROM friendships
                 WHERE requester_id = ?1 AND status = ?2
                 ORDER BY updated_at DESC"
            ))?;
            let rows =
                stmt.query_map(params![user.to_string(), status.as_str()], row_to_friendship)?;
            rows.collect()
        })
    }

    async fn friendships_as_recipient(
        &self,
        user: Uuid,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DatabaseError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FRIENDSHIP_COLUMNS} FROM friendships
                 WHERE recipient_id = ?1 AND status = ?2
                 ORDER BY updated_at DESC"
            ))?;
            let rows =
                stmt.query_map(params![user.to_string(), status.as_str()], row_to_friendship)?;
            rows.collect()
        })
    }
}

// ========== Activity Operations ==========

#[async_trait]
impl ActivityStore for SocialStore {
    async fn insert_activity(&self, activity: &ActivityEntry) -> Result<(), DatabaseError> {
        let names_json = serde_json::to_string(&activity.exercise_names)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activities (id, user_id, workout_name, duration_seconds, total_volume_kg,
                                         exercise_names_json, exercise_count, set_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    activity.id.to_string(),
                    activity.user_id.to_string(),
                    activity.workout_name,
                    activity.duration_seconds,
                    activity.total_volume_kg,
                    names_json,
                    activity.exercise_count,
                    activity.set_count,
                    timestamp(&activity.created_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<ActivityEntry>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
                params![id.to_string()],
                row_to_activity,
            )
            .optional()
        })
    }

    async fn list_activities(
        &self,
        owners: Option<&[Uuid]>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, DatabaseError> {
        let mut values = Vec::new();
        let filter = match owners {
            Some([]) => return Ok(Vec::new()),
            Some(ids) => {
                values.extend(id_values(ids));
                format!("WHERE user_id IN ({})", placeholders(ids.len()))
            }
            None => String::new(),
        };
        // Past the largest SQLite offset there is nothing left to page.
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(offset));

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities {filter}
                 ORDER BY created_at DESC, id DESC
                 LIMIT ? OFFSET ?"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), row_to_activity)?;
            rows.collect()
        })
    }

    async fn get_reaction(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Reaction>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {REACTION_COLUMNS} FROM reactions WHERE activity_id = ?1 AND user_id = ?2"
                ),
                params![activity_id.to_string(), user_id.to_string()],
                row_to_reaction,
            )
            .optional()
        })
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reactions (id, activity_id, user_id, reaction_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reaction.id.to_string(),
                    reaction.activity_id.to_string(),
                    reaction.user_id.to_string(),
                    reaction.reaction_type.as_str(),
                    timestamp(&reaction.created_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn update_reaction_type(
        &self,
        id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE reactions SET reaction_type = ?2 WHERE id = ?1",
                params![id.to_string(), reaction_type.as_str()],
            )
        })?;
        require_row(changed, "reactions", id)
    }

    async fn delete_reaction(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM reactions WHERE id = ?1", params![id.to_string()])
        })?;
        Ok(())
    }

    async fn reactions_for(&self, activity_ids: &[Uuid]) -> Result<Vec<Reaction>, DatabaseError> {
        if activity_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REACTION_COLUMNS} FROM reactions WHERE activity_id IN ({})
                 ORDER BY created_at ASC",
                placeholders(activity_ids.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(id_values(activity_ids)), row_to_reaction)?;
            rows.collect()
        })
    }
}

// ========== Leaderboard Operations ==========

#[async_trait]
impl LeaderboardStore for SocialStore {
    async fn get_entry(
        &self,
        user_id: Uuid,
        entry_type: LeaderboardType,
        week_start: NaiveDate,
    ) -> Result<Option<LeaderboardEntry>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries
                     WHERE user_id = ?1 AND entry_type = ?2 AND week_start = ?3"
                ),
                params![user_id.to_string(), entry_type.as_str(), week_start.to_string()],
                row_to_entry,
            )
            .optional()
        })
    }

    async fn insert_entry(&self, entry: &LeaderboardEntry) -> Result<(), DatabaseError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO leaderboard_entries (id, user_id, entry_type, week_start, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.id.to_string(),
                    entry.user_id.to_string(),
                    entry.entry_type.as_str(),
                    entry.week_start.to_string(),
                    entry.value,
                    timestamp(&entry.updated_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn update_entry_value(&self, id: Uuid, value: f64) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE leaderboard_entries SET value = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), value, timestamp(&Utc::now())],
            )
        })?;
        require_row(changed, "leaderboard_entries", id)
    }

    async fn entries_for_week(
        &self,
        entry_type: LeaderboardType,
        week_start: NaiveDate,
        users: Option<&[Uuid]>,
    ) -> Result<Vec<LeaderboardEntry>, DatabaseError> {
        let mut values = vec![
            Value::Text(entry_type.as_str().to_string()),
            Value::Text(week_start.to_string()),
        ];
        let filter = match users {
            Some([]) => return Ok(Vec::new()),
            Some(ids) => {
                values.extend(id_values(ids));
                format!("AND user_id IN ({})", placeholders(ids.len()))
            }
            None => String::new(),
        };

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries
                 WHERE entry_type = ? AND week_start = ? AND value > 0 {filter}
                 ORDER BY value DESC, updated_at ASC"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), row_to_entry)?;
            rows.collect()
        })
    }

    async fn strength_rows(&self, exercise_name: &str) -> Result<Vec<StrengthRow>, DatabaseError> {
        self.db.with_conn(|conn| {
            // SQLite takes the bare exercise_type column from the row holding MAX().
            let mut stmt = conn.prepare(
                "SELECT user_id, MAX(weight_kg) AS max_load, exercise_type
                 FROM exercise_sets
                 WHERE exercise_name = ?1 COLLATE NOCASE
                 GROUP BY user_id",
            )?;
            let rows = stmt.query_map(params![exercise_name], |row| {
                Ok(StrengthRow {
                    user_id: uuid_at(row, 0)?,
                    max_load_kg: row.get(1)?,
                    exercise_type: enum_at(row, 2, ExerciseType::from_str)?,
                })
            })?;
            rows.collect()
        })
    }

    async fn popular_exercise_names(&self, limit: usize) -> Result<Vec<String>, DatabaseError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT exercise_name, COUNT(DISTINCT user_id) AS lifters
                 FROM exercise_sets
                 GROUP BY exercise_name
                 ORDER BY lifters DESC, exercise_name ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, String>(0))?;
            rows.collect()
        })
    }
}

// ========== Live Session Operations ==========

#[async_trait]
impl SessionStore for SocialStore {
    async fn insert_session(&self, session: &LiveSession) -> Result<(), DatabaseError> {
        let participants_json = serde_json::to_string(&session.participant_ids)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO live_sessions (id, host_id, leader_id, participant_ids_json, status,
                                            invite_code, max_participants, workout_name,
                                            created_at, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    session.id.to_string(),
                    session.host_id.to_string(),
                    session.leader_id.to_string(),
                    participants_json,
                    session.status.as_str(),
                    session.invite_code,
                    session.max_participants,
                    session.workout_name,
                    timestamp(&session.created_at),
                    session.started_at.as_ref().map(timestamp),
                    session.ended_at.as_ref().map(timestamp),
                ],
            )
        })?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<LiveSession>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM live_sessions WHERE id = ?1"),
                params![id.to_string()],
                row_to_session,
            )
            .optional()
        })
    }

    async fn get_participants(&self, id: Uuid) -> Result<Option<Vec<Uuid>>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT participant_ids_json FROM live_sessions WHERE id = ?1",
                params![id.to_string()],
                |row| json_at::<Vec<Uuid>>(row, 0),
            )
            .optional()
        })
    }

    async fn set_participants(
        &self,
        id: Uuid,
        participants: &[Uuid],
    ) -> Result<(), DatabaseError> {
        let participants_json = serde_json::to_string(participants)?;
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE live_sessions SET participant_ids_json = ?2 WHERE id = ?1",
                params![id.to_string(), participants_json],
            )
        })?;
        require_row(changed, "live_sessions", id)
    }

    async fn set_leader(&self, id: Uuid, leader_id: Uuid) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE live_sessions SET leader_id = ?2 WHERE id = ?1",
                params![id.to_string(), leader_id.to_string()],
            )
        })?;
        require_row(changed, "live_sessions", id)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        patch: &SessionPatch,
    ) -> Result<(), DatabaseError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE live_sessions
                 SET status = ?2,
                     started_at = COALESCE(?3, started_at),
                     ended_at = COALESCE(?4, ended_at),
                     workout_name = COALESCE(?5, workout_name)
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    status.as_str(),
                    patch.started_at.as_ref().map(timestamp),
                    patch.ended_at.as_ref().map(timestamp),
                    patch.workout_name,
                ],
            )
        })?;
        require_row(changed, "live_sessions", id)
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<LiveSession>, DatabaseError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM live_sessions WHERE invite_code = ?1"),
                params![code],
                row_to_session,
            )
            .optional()
        })
    }

    async fn sessions_with_participant(
        &self,
        user: Uuid,
        statuses: &[SessionStatus],
        since: DateTime<Utc>,
    ) -> Result<Vec<LiveSession>, DatabaseError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let mut values = vec![Value::Text(timestamp(&since))];
        values.extend(
            statuses
                .iter()
                .map(|s| Value::Text(s.as_str().to_string())),
        );
        values.push(Value::Text(user.to_string()));

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM live_sessions
                 WHERE created_at >= ?
                   AND status IN ({})
                   AND EXISTS (SELECT 1 FROM json_each(participant_ids_json) WHERE json_each.value = ?)
                 ORDER BY created_at DESC",
                placeholders(statuses.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(values), row_to_session)?;
            rows.collect()
        })
    }
}

// ========== Notification Operations ==========

#[async_trait]
impl NotificationStore for SocialStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<(), DatabaseError> {
        let payload_json = serde_json::to_string(&notification.payload)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, recipient_id, kind, title, body, payload_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    notification.id.to_string(),
                    notification.recipient_id.to_string(),
                    notification.kind.as_str(),
                    notification.title,
                    notification.body,
                    payload_json,
                    timestamp(&notification.created_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn notifications_for(
        &self,
        recipient: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, DatabaseError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recipient_id, kind, title, body, payload_json, created_at
                 FROM notifications
                 WHERE recipient_id = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )?;
            let rows =
                stmt.query_map(params![recipient.to_string(), limit as i64], row_to_notification)?;
            rows.collect()
        })
    }
}
