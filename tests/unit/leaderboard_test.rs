//! Unit tests for leaderboard calculations

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;
use uuid::Uuid;

use fitsocial::leaderboards::strength::{lifted_load, rank_strength};
use fitsocial::leaderboards::{week_start, ExerciseType, LeaderboardType, StrengthRow};
use fitsocial::social::Profile;

/// Every day of a week maps to the same Monday
#[test]
fn test_week_start_whole_week() {
    let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    for offset in 0..7 {
        let day = monday + chrono::Duration::days(offset);
        assert_eq!(week_start(day), monday);
    }
    let next = monday + chrono::Duration::days(7);
    assert_eq!(week_start(next), next);
    assert_eq!(week_start(next).weekday(), Weekday::Mon);
}

/// Leaderboard type names
#[test]
fn test_leaderboard_type_names() {
    assert_eq!(LeaderboardType::TotalWorkouts.as_str(), "total_workouts");
    assert_eq!(
        LeaderboardType::from_str("combined_streak"),
        Some(LeaderboardType::CombinedStreak)
    );
    assert_eq!(LeaderboardType::from_str("Volume"), None);
    assert_eq!(
        LeaderboardType::ALL
            .iter()
            .filter(|t| t.is_snapshot())
            .count(),
        3
    );
}

/// Lifted load by exercise type
#[test]
fn test_lifted_load() {
    assert_eq!(lifted_load(ExerciseType::Weighted, 75.0, 60.0), 60.0);
    assert_eq!(lifted_load(ExerciseType::WeightedBodyweight, 75.0, 10.0), 85.0);
    assert_eq!(lifted_load(ExerciseType::WeightedBodyweight, 75.0, 0.0), 75.0);
}

/// Dense ranking leaves no gaps after ties
#[test]
fn test_strength_ranking_dense() {
    let lifters: Vec<Profile> = ["A", "B", "C", "D"]
        .iter()
        .map(|name| {
            let mut p = Profile::new(Uuid::new_v4(), *name);
            p.starting_weight = Some(100.0);
            p
        })
        .collect();
    let loads = [150.0, 120.0, 150.0, 100.0];
    let rows: Vec<StrengthRow> = lifters
        .iter()
        .zip(loads)
        .map(|(p, load)| StrengthRow {
            user_id: p.id,
            max_load_kg: load,
            exercise_type: ExerciseType::Weighted,
        })
        .collect();
    let profiles: HashMap<Uuid, Profile> = lifters.iter().map(|p| (p.id, p.clone())).collect();

    let ranked = rank_strength(rows, &profiles, lifters[3].id, 10);
    let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 1, 2, 3]);
    assert_eq!(ranked[3].user_id, lifters[3].id);
    assert!(ranked[3].is_current_user);
    assert_eq!(ranked[3].display_name, "D");
}

/// Empty input ranks to nothing
#[test]
fn test_strength_ranking_empty() {
    assert!(rank_strength(Vec::new(), &HashMap::new(), Uuid::new_v4(), 10).is_empty());
}
