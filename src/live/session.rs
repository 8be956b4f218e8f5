//! Live session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifecycle: `pending -> active -> ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "active" => Some(SessionStatus::Active),
            "ended" => Some(SessionStatus::Ended),
            _ => None,
        }
    }

    /// Position in the lifecycle.
    pub fn order(&self) -> u8 {
        match self {
            SessionStatus::Pending => 0,
            SessionStatus::Active => 1,
            SessionStatus::Ended => 2,
        }
    }

    /// Pending or active.
    pub fn is_open(&self) -> bool {
        !matches!(self, SessionStatus::Ended)
    }
}

/// A shared real-time workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSession {
    pub id: Uuid,
    pub host_id: Uuid,
    pub leader_id: Uuid,
    /// Ordered, no duplicates.
    pub participant_ids: Vec<Uuid>,
    pub status: SessionStatus,
    pub invite_code: Option<String>,
    pub max_participants: u32,
    pub workout_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl LiveSession {
    /// New pending session led by its host.
    pub fn new(host_id: Uuid, participant_ids: Vec<Uuid>, max_participants: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id,
            leader_id: host_id,
            participant_ids,
            status: SessionStatus::Pending,
            invite_code: None,
            max_participants,
            workout_name: None,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn has_participant(&self, user: Uuid) -> bool {
        self.participant_ids.contains(&user)
    }

    pub fn is_full(&self) -> bool {
        self.participant_ids.len() >= self.max_participants as usize
    }
}

/// Optional fields written together with a status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub workout_name: Option<String>,
}

/// Options for creating a session.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub with_invite_code: bool,
    /// Falls back to the configured default.
    pub max_participants: Option<u32>,
    pub workout_name: Option<String>,
}
