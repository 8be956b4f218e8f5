//! Unit tests for social domain types

use uuid::Uuid;

use fitsocial::social::{
    pair_key, ActivityEntry, Friendship, FriendshipStatus, Profile, ReactionType, Scope,
    WorkoutSummary,
};

#[test]
fn test_friendship_status_activity() {
    assert!(FriendshipStatus::Pending.is_active());
    assert!(FriendshipStatus::Accepted.is_active());
    assert!(FriendshipStatus::Blocked.is_active());
    assert!(!FriendshipStatus::Declined.is_active());
    assert!(!FriendshipStatus::Removed.is_active());
}

#[test]
fn test_friendship_parties() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let edge = Friendship::new(a, b, FriendshipStatus::Pending);

    assert_eq!(edge.other_party(a), b);
    assert_eq!(edge.other_party(b), a);
    assert!(edge.involves(a));
    assert!(!edge.involves(Uuid::new_v4()));
    assert_eq!(pair_key(a, b), pair_key(b, a));
}

#[test]
fn test_profile_defaults() {
    let profile = Profile::new(Uuid::new_v4(), "Robin");
    assert!(profile.share_workouts);
    assert!(profile.show_streak);
    assert!(profile.leaderboard_opt_in);
    assert_eq!(profile.bodyweight(), None);
}

#[test]
fn test_activity_from_summary() {
    let owner = Uuid::new_v4();
    let entry = ActivityEntry::from_summary(
        owner,
        WorkoutSummary {
            workout_name: "Full Body".to_string(),
            duration_seconds: 3000,
            total_volume_kg: 6400.0,
            exercise_names: vec!["Squat".to_string(), "Row".to_string()],
            exercise_count: 2,
            set_count: 8,
        },
    );
    assert_eq!(entry.user_id, owner);
    assert_eq!(entry.workout_name, "Full Body");
    assert_eq!(entry.exercise_count, 2);
    assert!(entry.reactions.is_empty());
    assert!(entry.profile.is_none());
}

#[test]
fn test_parse_helpers() {
    assert_eq!(ReactionType::from_str("fire"), Some(ReactionType::Fire));
    assert_eq!(ReactionType::from_str("heart"), None);
    assert_eq!(Scope::from_str("global"), Some(Scope::Global));
    assert_eq!(Scope::default(), Scope::Friends);
}
