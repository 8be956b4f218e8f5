//! Notification side-channel.
//!
//! Services describe socially visible events as [`Notification`]s and hand
//! them to a [`NotificationDispatcher`]. Delivery is someone else's job:
//! a failed dispatch is logged and dropped so it never fails the operation
//! that triggered it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::storage::{DatabaseError, NotificationStore, ProfileStore};

/// Kind of socially visible event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
    FriendAccepted,
    Reaction,
    Nudge,
    LiveInvite,
    LiveAccept,
    JoinRequest,
    JoinDeclined,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::FriendAccepted => "friend_accepted",
            NotificationKind::Reaction => "reaction",
            NotificationKind::Nudge => "nudge",
            NotificationKind::LiveInvite => "live_invite",
            NotificationKind::LiveAccept => "live_accept",
            NotificationKind::JoinRequest => "join_request",
            NotificationKind::JoinDeclined => "join_declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "friend_request" => Some(NotificationKind::FriendRequest),
            "friend_accepted" => Some(NotificationKind::FriendAccepted),
            "reaction" => Some(NotificationKind::Reaction),
            "nudge" => Some(NotificationKind::Nudge),
            "live_invite" => Some(NotificationKind::LiveInvite),
            "live_accept" => Some(NotificationKind::LiveAccept),
            "join_request" => Some(NotificationKind::JoinRequest),
            "join_declined" => Some(NotificationKind::JoinDeclined),
            _ => None,
        }
    }
}

/// A notification creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            title: title.into(),
            body: body.into(),
            payload,
            created_at: Utc::now(),
        }
    }

    pub fn friend_request(recipient: Uuid, from: Uuid, from_name: &str, friendship_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::FriendRequest,
            "New friend request",
            format!("{} wants to be your friend", from_name),
            json!({ "friendship_id": friendship_id, "from_user_id": from }),
        )
    }

    pub fn friend_accepted(recipient: Uuid, by: Uuid, by_name: &str, friendship_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::FriendAccepted,
            "Friend request accepted",
            format!("{} accepted your friend request", by_name),
            json!({ "friendship_id": friendship_id, "user_id": by }),
        )
    }

    pub fn reaction(
        recipient: Uuid,
        from: Uuid,
        from_name: &str,
        activity_id: Uuid,
        reaction: &str,
    ) -> Self {
        Self::new(
            recipient,
            NotificationKind::Reaction,
            "New reaction",
            format!("{} reacted to your workout", from_name),
            json!({ "activity_id": activity_id, "user_id": from, "reaction": reaction }),
        )
    }

    pub fn nudge(recipient: Uuid, from: Uuid, from_name: &str) -> Self {
        Self::new(
            recipient,
            NotificationKind::Nudge,
            "Time to train",
            format!("{} nudged you to get a workout in", from_name),
            json!({ "user_id": from }),
        )
    }

    pub fn live_invite(recipient: Uuid, from: Uuid, from_name: &str, session_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::LiveInvite,
            "Live workout invite",
            format!("{} invited you to a live workout", from_name),
            json!({ "session_id": session_id, "user_id": from }),
        )
    }

    pub fn live_accept(recipient: Uuid, user: Uuid, user_name: &str, session_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::LiveAccept,
            "Invite accepted",
            format!("{} joined your live workout", user_name),
            json!({ "session_id": session_id, "user_id": user }),
        )
    }

    pub fn join_request(recipient: Uuid, user: Uuid, user_name: &str, session_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::JoinRequest,
            "Join request",
            format!("{} wants to join your live workout", user_name),
            json!({ "session_id": session_id, "user_id": user }),
        )
    }

    pub fn join_declined(recipient: Uuid, session_id: Uuid) -> Self {
        Self::new(
            recipient,
            NotificationKind::JoinDeclined,
            "Join request declined",
            "Your request to join the live workout was declined",
            json!({ "session_id": session_id }),
        )
    }
}

/// Sink for notification requests.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn create_notification(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Notifier that persists requests to the notifications table.
pub struct StoreNotifier {
    store: Arc<dyn NotificationStore>,
}

impl StoreNotifier {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for StoreNotifier {
    async fn create_notification(&self, notification: Notification) -> Result<(), NotifyError> {
        self.store.insert_notification(&notification).await?;
        Ok(())
    }
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn create_notification(&self, _notification: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Fire-and-forget front for a [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Dispatcher that discards every notification.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullNotifier))
    }

    /// Send a notification, logging and discarding any failure.
    pub async fn dispatch(&self, notification: Notification) {
        let kind = notification.kind;
        let recipient = notification.recipient_id;
        if let Err(e) = self.notifier.create_notification(notification).await {
            tracing::warn!(
                kind = kind.as_str(),
                %recipient,
                "Dropping notification: {}",
                e
            );
        }
    }
}

/// Display name for notification text. Lookup failures fall back to a
/// generic name since the triggering operation has already happened.
pub(crate) async fn display_name_or_default(profiles: &dyn ProfileStore, user: Uuid) -> String {
    match profiles.get_profile(user).await {
        Ok(Some(profile)) => profile.display_name,
        Ok(None) => "Someone".to_string(),
        Err(e) => {
            tracing::warn!(%user, "Profile lookup for notification failed: {}", e);
            "Someone".to_string()
        }
    }
}

/// Notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
