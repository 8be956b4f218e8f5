//! Shared fixtures for integration tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use fitsocial::leaderboards::{LeaderboardEngine, StaticStreaks};
use fitsocial::live::{LiveSessionController, MembershipPolicy};
use fitsocial::social::notify::{Notification, NotificationKind, Notifier, NotifyError};
use fitsocial::social::{
    ActivityFeed, NotificationDispatcher, Profile, ProfileManager, RelationshipManager,
};
use fitsocial::storage::{ProfileStore, SocialStore};

/// Notifier that keeps everything it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: Uuid, kind: NotificationKind) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.recipient_id == recipient && n.kind == kind)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn create_notification(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Every service over one in-memory store.
pub struct World {
    pub store: Arc<SocialStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub streaks: Arc<StaticStreaks>,
    pub profiles: ProfileManager,
    pub relationships: Arc<RelationshipManager>,
    pub feed: ActivityFeed,
    pub leaderboards: LeaderboardEngine,
    pub live: Arc<LiveSessionController>,
}

impl World {
    pub fn new() -> Self {
        Self::with_store(SocialStore::open_in_memory().unwrap())
    }

    pub fn with_store(store: SocialStore) -> Self {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let streaks = Arc::new(StaticStreaks::new());

        let relationships = Arc::new(RelationshipManager::new(
            store.clone(),
            store.clone(),
            dispatcher.clone(),
        ));
        let feed = ActivityFeed::new(
            store.clone(),
            store.clone(),
            relationships.clone(),
            dispatcher.clone(),
        );
        let leaderboards = LeaderboardEngine::new(
            store.clone(),
            store.clone(),
            relationships.clone(),
            streaks.clone(),
        );
        let live = Arc::new(LiveSessionController::new(
            store.clone(),
            store.clone(),
            dispatcher,
            MembershipPolicy {
                backoff_step: std::time::Duration::from_millis(2),
                ..Default::default()
            },
        ));

        Self {
            profiles: ProfileManager::new(store.clone()),
            store,
            notifier,
            streaks,
            relationships,
            feed,
            leaderboards,
            live,
        }
    }

    /// Register a user with the given display name.
    pub async fn user(&self, name: &str) -> Uuid {
        self.profiles
            .get_or_create(Uuid::new_v4(), name)
            .await
            .unwrap()
            .id
    }

    /// Register a user with a known bodyweight.
    pub async fn weighed_user(&self, name: &str, kg: f64) -> Uuid {
        let id = self.user(name).await;
        let mut profile: Profile = self.store.get_profile(id).await.unwrap().unwrap();
        profile.starting_weight = Some(kg);
        self.profiles.update(id, &profile).await.unwrap();
        id
    }

    /// Make two users accepted friends.
    pub async fn befriend(&self, a: Uuid, b: Uuid) {
        let request = self.relationships.send_request(a, b).await.unwrap();
        self.relationships.accept(request.id, b).await.unwrap();
    }
}
