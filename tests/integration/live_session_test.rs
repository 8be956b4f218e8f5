//! Integration tests for live session membership

use std::sync::Arc;
use uuid::Uuid;

use fitsocial::live::{CreateOptions, SessionPatch, SessionStatus};
use fitsocial::social::notify::NotificationKind;
use fitsocial::storage::{Database, SessionStore, SocialStore};

use super::support::World;

/// Independent tasks adding different users all end up present.
#[tokio::test]
async fn test_concurrent_adds_from_tasks() {
    let world = World::new();
    let host = Uuid::new_v4();
    let session = world
        .live
        .create(host, &[], CreateOptions::default())
        .await
        .unwrap();

    let joiners: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let handles: Vec<_> = joiners
        .iter()
        .map(|user| {
            let live = Arc::clone(&world.live);
            let (session_id, user) = (session.id, *user);
            tokio::spawn(async move { live.add_participant(session_id, user).await })
        })
        .collect();

    for handle in handles {
        let participants = handle.await.unwrap().unwrap();
        assert!(participants.contains(&host));
    }

    let stored = world.store.get_participants(session.id).await.unwrap().unwrap();
    assert_eq!(stored[0], host);
    for user in &joiners {
        assert!(stored.contains(user), "missing {}", user);
    }
    assert_eq!(stored.len(), 5);
}

/// Adding the same user twice leaves one copy.
#[tokio::test]
async fn test_add_participant_idempotent() {
    let world = World::new();
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let session = world
        .live
        .create(host, &[guest], CreateOptions::default())
        .await
        .unwrap();

    let participants = world.live.add_participant(session.id, guest).await.unwrap();
    assert_eq!(participants, vec![host, guest]);
    let again = world.live.add_participant(session.id, guest).await.unwrap();
    assert_eq!(again, vec![host, guest]);
}

/// Invite, pending lookup, accept and leave.
#[tokio::test]
async fn test_invite_lifecycle() {
    let world = World::new();
    let host = world.user("Host").await;
    let guest = world.user("Guest").await;

    let session = world
        .live
        .create(
            host,
            &[guest],
            CreateOptions {
                workout_name: Some("Upper".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    world.live.invite(session.id, host, guest).await.unwrap();

    let pending = world.live.pending_invite_for(guest).await.unwrap().unwrap();
    assert_eq!(pending.id, session.id);
    assert_eq!(pending.workout_name.as_deref(), Some("Upper"));

    world.live.accept_invite(session.id, guest).await.unwrap();
    assert_eq!(
        world
            .notifier
            .sent_to(guest, NotificationKind::LiveInvite)
            .len(),
        1
    );
    assert_eq!(
        world
            .notifier
            .sent_to(host, NotificationKind::LiveAccept)
            .len(),
        1
    );

    world
        .live
        .advance(session.id, SessionStatus::Active, SessionPatch::default())
        .await
        .unwrap();
    assert!(world.live.pending_invite_for(guest).await.unwrap().is_some());

    let remaining = world.live.remove_participant(session.id, guest).await.unwrap();
    assert_eq!(remaining, vec![host]);
    assert!(world.live.pending_invite_for(guest).await.unwrap().is_none());

    world
        .live
        .advance(session.id, SessionStatus::Ended, SessionPatch::default())
        .await
        .unwrap();
    let ended = world.live.get(session.id).await.unwrap();
    assert_eq!(ended.status, SessionStatus::Ended);
    assert!(ended.started_at.is_some());
    assert!(ended.ended_at.is_some());
}

/// Invite codes survive a reopen of an on-disk database.
#[tokio::test]
async fn test_invite_code_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("social.db");
    let host = Uuid::new_v4();

    let code = {
        let world = World::with_store(SocialStore::new(Arc::new(Database::open(&path).unwrap())));
        let session = world
            .live
            .create(
                host,
                &[],
                CreateOptions {
                    with_invite_code: true,
                    max_participants: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        session.invite_code.unwrap()
    };

    let world = World::with_store(SocialStore::new(Arc::new(Database::open(&path).unwrap())));
    let found = world
        .live
        .find_by_invite_code(&code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.host_id, host);
    assert_eq!(found.max_participants, 4);
}
