//! Strength-to-bodyweight ratio ranking.

use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use super::rankings::dense_ranks;
use super::types::{ExerciseType, StrengthEntry, StrengthRow};
use crate::social::Profile;

/// Total load moved in one rep.
pub fn lifted_load(exercise_type: ExerciseType, bodyweight_kg: f64, max_load_kg: f64) -> f64 {
    match exercise_type {
        ExerciseType::Weighted => max_load_kg,
        ExerciseType::WeightedBodyweight => bodyweight_kg + max_load_kg,
    }
}

/// Rank raw strength rows by lifted load over bodyweight.
///
/// Rows whose user has no profile, has not opted in, or has no positive
/// bodyweight are dropped before ranking.
pub fn rank_strength(
    rows: Vec<StrengthRow>,
    profiles: &HashMap<Uuid, Profile>,
    viewer: Uuid,
    limit: usize,
) -> Vec<StrengthEntry> {
    let mut scored: Vec<(StrengthRow, &Profile, f64, f64, f64)> = rows
        .into_iter()
        .filter_map(|row| {
            let profile = profiles.get(&row.user_id)?;
            if !profile.leaderboard_opt_in {
                return None;
            }
            let bodyweight = profile.bodyweight()?;
            let lifted = lifted_load(row.exercise_type, bodyweight, row.max_load_kg);
            Some((row, profile, bodyweight, lifted, lifted / bodyweight))
        })
        .collect();

    scored.sort_by(|a, b| b.4.partial_cmp(&a.4).unwrap_or(Ordering::Equal));
    scored.truncate(limit);

    let ranks = dense_ranks(scored.iter().map(|s| s.4));
    scored
        .into_iter()
        .zip(ranks)
        .map(|((row, profile, bodyweight, lifted, ratio), rank)| StrengthEntry {
            rank,
            user_id: row.user_id,
            display_name: profile.display_name.clone(),
            bodyweight_kg: bodyweight,
            lifted_load_kg: lifted,
            ratio,
            exercise_type: row.exercise_type,
            is_current_user: row.user_id == viewer,
        })
        .collect()
}
