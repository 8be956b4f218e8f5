//! Storage module for database, store interfaces and configuration.

pub mod backend;
pub mod config;
pub mod database;
pub mod schema;
pub mod social_store;

pub use backend::{
    ActivityStore, FriendshipStore, LeaderboardStore, NotificationStore, ProfileStore,
    SessionStore,
};
pub use config::{AppConfig, ConfigError, DatabaseSettings, FeedSettings, LiveSettings};
pub use database::{Database, DatabaseError};
pub use social_store::SocialStore;
