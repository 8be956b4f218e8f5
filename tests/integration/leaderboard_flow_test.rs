//! Integration tests for weekly leaderboards

use fitsocial::leaderboards::{current_week_start, ExerciseType, LeaderboardType, StreakCounts};
use fitsocial::social::{Scope, VisibilityUpdate};
use fitsocial::storage::LeaderboardStore;

use super::support::World;

/// 50 then 30 makes 80 for the week.
#[tokio::test]
async fn test_weekly_volume_is_additive() {
    let world = World::new();
    let user = world.user("Lifter").await;

    world.leaderboards.record_volume(user, 50.0).await.unwrap();
    world.leaderboards.record_volume(user, 30.0).await.unwrap();

    let entry = world
        .store
        .get_entry(user, LeaderboardType::Volume, current_week_start())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.value, 80.0);

    let board = world
        .leaderboards
        .rank(user, LeaderboardType::TotalWorkouts, Scope::Global, 10)
        .await
        .unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].value, 2.0);
    assert!(board.entries[0].is_current_user);
}

/// Streak rows hold the latest snapshot rather than a sum.
#[tokio::test]
async fn test_streak_snapshots() {
    let world = World::new();
    let user = world.user("Streaker").await;
    world
        .streaks
        .set(user, StreakCounts { gym: 5, nutrition: 2, combined: 2 })
        .unwrap();

    world.leaderboards.record_volume(user, 100.0).await.unwrap();
    world.leaderboards.record_volume(user, 100.0).await.unwrap();

    let board = world
        .leaderboards
        .rank(user, LeaderboardType::GymStreak, Scope::Global, 10)
        .await
        .unwrap();
    assert_eq!(board.entries[0].value, 5.0);
}

/// Users who opt out stop accumulating.
#[tokio::test]
async fn test_opt_out_stops_recording() {
    let world = World::new();
    let user = world.user("Quiet").await;
    world
        .profiles
        .set_visibility(
            user,
            VisibilityUpdate {
                leaderboard_opt_in: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    world.leaderboards.record_volume(user, 500.0).await.unwrap();
    let board = world
        .leaderboards
        .rank(user, LeaderboardType::Volume, Scope::Global, 10)
        .await
        .unwrap();
    assert!(board.entries.is_empty());
}

/// Friends scope narrows the field before ranking.
#[tokio::test]
async fn test_friends_scope_reranks() {
    let world = World::new();
    let me = world.user("Me").await;
    let friend = world.user("Friend").await;
    let champion = world.user("Champion").await;
    world.befriend(me, friend).await;

    world.leaderboards.record_nutrition(me, 2000.0, 140.0).await.unwrap();
    world.leaderboards.record_nutrition(friend, 2500.0, 180.0).await.unwrap();
    world.leaderboards.record_nutrition(champion, 4000.0, 250.0).await.unwrap();

    let global = world
        .leaderboards
        .rank(me, LeaderboardType::Protein, Scope::Global, 10)
        .await
        .unwrap();
    assert_eq!(global.viewer_entry.map(|e| e.rank), Some(3));

    let friends = world
        .leaderboards
        .rank(me, LeaderboardType::Protein, Scope::Friends, 10)
        .await
        .unwrap();
    assert_eq!(friends.entries.len(), 2);
    assert_eq!(friends.entries[0].user_id, friend);
    assert_eq!(friends.viewer_entry.map(|e| e.rank), Some(2));
}

/// Weighted 100 kg and weighted-bodyweight +20 kg at 80 kg both score 1.25.
#[tokio::test]
async fn test_strength_ratio_equivalence() {
    let world = World::new();
    let dipper = world.weighed_user("Dipper", 80.0).await;
    let presser = world.weighed_user("Presser", 80.0).await;
    let unknown = world.user("No Scale").await;

    world
        .store
        .record_exercise_set(dipper, "Chest Press", ExerciseType::WeightedBodyweight, 20.0, 6)
        .unwrap();
    world
        .store
        .record_exercise_set(presser, "Chest Press", ExerciseType::Weighted, 100.0, 3)
        .unwrap();
    world
        .store
        .record_exercise_set(presser, "Chest Press", ExerciseType::Weighted, 90.0, 5)
        .unwrap();
    world
        .store
        .record_exercise_set(unknown, "Chest Press", ExerciseType::Weighted, 140.0, 1)
        .unwrap();

    let ranked = world
        .leaderboards
        .strength_ratio_rank(presser, "Chest Press", Scope::Global, 10)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 2);
    for entry in &ranked {
        assert_eq!(entry.ratio, 1.25);
        assert_eq!(entry.rank, 1);
        assert_eq!(entry.bodyweight_kg, 80.0);
        assert_eq!(entry.lifted_load_kg, 100.0);
    }
    assert!(ranked.iter().all(|e| e.user_id != unknown));
    assert_eq!(ranked.iter().filter(|e| e.is_current_user).count(), 1);

    // Friends scope with no friends leaves only the viewer.
    let mine = world
        .leaderboards
        .strength_ratio_rank(presser, "chest press", Scope::Friends, 10)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id, presser);
}
