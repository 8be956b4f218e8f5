//! Social features module
//!
//! Provides profiles, friendships, the activity feed and notifications.

pub mod auth;
pub mod feed;
pub mod friends;
pub mod notify;
pub mod profile;
pub mod types;

// Re-export commonly used types
pub use auth::{AuthContext, StaticAuth};
pub use feed::{ActivityFeed, FeedError, FeedPage};
pub use friends::{FriendError, RelationshipManager};
pub use notify::{Notification, NotificationDispatcher, NotificationKind, Notifier};
pub use profile::{ProfileError, ProfileManager, VisibilityUpdate};
pub use types::*;
