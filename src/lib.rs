//! FitSocial - social layer of a fitness tracking application
//!
//! Friendships, a shared workout feed with reactions, weekly leaderboards
//! and live group workout sessions, persisted in SQLite.

pub mod hub;
pub mod leaderboards;
pub mod live;
pub mod social;
pub mod storage;

// Re-export commonly used types
pub use hub::{HubError, SocialHub};
pub use leaderboards::LeaderboardEngine;
pub use live::LiveSessionController;
pub use social::{ActivityFeed, ProfileManager, RelationshipManager};
pub use storage::config::AppConfig;
pub use storage::SocialStore;
