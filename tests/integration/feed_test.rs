//! Integration tests for the activity feed and reactions

use fitsocial::social::notify::NotificationKind;
use fitsocial::social::{ReactionAction, ReactionType, Scope, WorkoutSummary};
use fitsocial::storage::ActivityStore;

use super::support::World;

fn workout(name: &str, volume: f64) -> WorkoutSummary {
    WorkoutSummary {
        workout_name: name.to_string(),
        duration_seconds: 2700,
        total_volume_kg: volume,
        exercise_names: vec!["Deadlift".to_string()],
        exercise_count: 1,
        set_count: 5,
    }
}

/// Friends scope shows self and friends only; global shows everyone.
#[tokio::test]
async fn test_feed_scopes() {
    let world = World::new();
    let me = world.user("Me").await;
    let friend = world.user("Friend").await;
    let stranger = world.user("Stranger").await;
    world.befriend(me, friend).await;

    world.feed.publish(me, workout("Mine", 1000.0)).await.unwrap();
    world.feed.publish(friend, workout("Theirs", 2000.0)).await.unwrap();
    world.feed.publish(stranger, workout("Other", 3000.0)).await.unwrap();

    let friends = world.feed.feed(me, Scope::Friends, 0, 10).await.unwrap();
    let mut names: Vec<_> = friends
        .entries
        .iter()
        .map(|e| e.workout_name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Mine", "Theirs"]);

    let global = world.feed.feed(me, Scope::Global, 0, 10).await.unwrap();
    assert_eq!(global.entries.len(), 3);
}

/// Pages are newest first and `has_more` tracks full pages.
#[tokio::test]
async fn test_feed_pagination() {
    let world = World::new();
    let me = world.user("Me").await;
    for i in 0..5 {
        world
            .feed
            .publish(me, workout(&format!("W{}", i), 100.0))
            .await
            .unwrap();
    }

    let first = world.feed.feed(me, Scope::Friends, 0, 2).await.unwrap();
    let second = world.feed.feed(me, Scope::Friends, 1, 2).await.unwrap();
    let third = world.feed.feed(me, Scope::Friends, 2, 2).await.unwrap();

    assert!(first.has_more);
    assert!(second.has_more);
    assert!(!third.has_more);
    assert_eq!(third.entries.len(), 1);

    let all: Vec<_> = first
        .entries
        .iter()
        .chain(second.entries.iter())
        .chain(third.entries.iter())
        .collect();
    assert_eq!(all.len(), 5);
    for pair in all.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

/// like -> fire -> fire walks Added, Updated, Removed, never two rows.
#[tokio::test]
async fn test_reaction_toggle_cycle() {
    let world = World::new();
    let owner = world.user("Owner").await;
    let fan = world.user("Fan").await;
    let entry = world
        .feed
        .publish(owner, workout("Legs", 8000.0))
        .await
        .unwrap()
        .unwrap();

    let steps = [
        (ReactionType::Like, ReactionAction::Added),
        (ReactionType::Fire, ReactionAction::Updated),
        (ReactionType::Fire, ReactionAction::Removed),
        (ReactionType::Clap, ReactionAction::Added),
    ];
    for (reaction, expected) in steps {
        let action = world
            .feed
            .toggle_reaction(entry.id, fan, reaction)
            .await
            .unwrap();
        assert_eq!(action, expected);
        assert!(world.store.reactions_for(&[entry.id]).await.unwrap().len() <= 1);
    }

    let reactions = world.feed.reactions(entry.id).await.unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].reaction_type, ReactionType::Clap);

    // Two Added steps, two notifications.
    assert_eq!(
        world
            .notifier
            .sent_to(owner, NotificationKind::Reaction)
            .len(),
        2
    );
}

/// Reacting to your own workout never notifies.
#[tokio::test]
async fn test_self_reaction_is_silent() {
    let world = World::new();
    let owner = world.user("Owner").await;
    let entry = world
        .feed
        .publish(owner, workout("Arms", 900.0))
        .await
        .unwrap()
        .unwrap();

    let action = world
        .feed
        .toggle_reaction(entry.id, owner, ReactionType::Fire)
        .await
        .unwrap();
    assert_eq!(action, ReactionAction::Added);
    assert!(world.notifier.sent().is_empty());
}

/// Feed entries carry every user's reaction.
#[tokio::test]
async fn test_feed_entries_carry_reactions() {
    let world = World::new();
    let owner = world.user("Owner").await;
    let a = world.user("A").await;
    let b = world.user("B").await;
    let entry = world
        .feed
        .publish(owner, workout("Back", 4000.0))
        .await
        .unwrap()
        .unwrap();

    world
        .feed
        .toggle_reaction(entry.id, a, ReactionType::Like)
        .await
        .unwrap();
    world
        .feed
        .toggle_reaction(entry.id, b, ReactionType::Clap)
        .await
        .unwrap();

    let page = world.feed.feed(owner, Scope::Global, 0, 10).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].reactions.len(), 2);
    assert_eq!(
        page.entries[0]
            .profile
            .as_ref()
            .map(|p| p.display_name.as_str()),
        Some("Owner")
    );
}
