//! Training volume: tonnage and INOL.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Exercise, Session, Tier, TrainingSet, normalize_exercise_name};
use crate::formulas::round3;

/// Floor on the INOL denominator, reached at or above 100% intensity.
const MIN_INOL_DENOMINATOR: f64 = 1.0;

/// Caveat on an INOL value whose intensity hit the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InolWarning {
    /// The set was at or above the anchor.
    IntensityCapped,
    /// At least one set in the exercise was capped.
    SetsCapped,
}

impl std::fmt::Display for InolWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InolWarning::IntensityCapped => write!(f, "Intensity >= 100% of 1RM; INOL capped"),
            InolWarning::SetsCapped => write!(f, "One or more sets at >= 100% intensity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InolResult {
    pub inol: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<InolWarning>,
}

/// Tonnage split across the three tiers. Absent tiers stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierTonnage {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
}

impl TierTonnage {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::T1 => self.t1,
            Tier::T2 => self.t2,
            Tier::T3 => self.t3,
        }
    }

    fn add(&mut self, tier: Tier, tonnage: f64) {
        match tier {
            Tier::T1 => self.t1 += tonnage,
            Tier::T2 => self.t2 += tonnage,
            Tier::T3 => self.t3 += tonnage,
        }
    }

    pub fn total(&self) -> f64 {
        self.t1 + self.t2 + self.t3
    }
}

pub fn set_tonnage(set: &TrainingSet) -> f64 {
    set.weight * set.reps as f64
}

pub fn exercise_tonnage(exercise: &Exercise) -> f64 {
    exercise.sets.iter().map(set_tonnage).sum()
}

pub fn session_tonnage(session: &Session) -> f64 {
    session.exercises.iter().map(exercise_tonnage).sum()
}

pub fn tonnage_by_tier(session: &Session) -> TierTonnage {
    let mut tonnage = TierTonnage::default();
    for exercise in &session.exercises {
        tonnage.add(exercise.tier, exercise_tonnage(exercise));
    }
    tonnage
}

/// Tonnage keyed by normalized exercise name. Repeated exercises merge.
pub fn tonnage_by_exercise(session: &Session) -> BTreeMap<String, f64> {
    let mut tonnage = BTreeMap::new();
    for exercise in &session.exercises {
        *tonnage
            .entry(normalize_exercise_name(&exercise.name))
            .or_insert(0.0) += exercise_tonnage(exercise);
    }
    tonnage
}

fn usable_anchor(anchor: Option<f64>) -> Option<f64> {
    anchor.filter(|a| *a > 0.0)
}

/// INOL of one set: reps / (100 - intensity%).
///
/// Returns None without a positive anchor. The denominator never drops
/// below 1, so sets at or above the anchor score exactly `reps` and carry
/// an `IntensityCapped` warning.
pub fn compute_inol(weight_kg: f64, reps: u32, anchor: Option<f64>) -> Option<InolResult> {
    let anchor = usable_anchor(anchor)?;

    let intensity = weight_kg / anchor * 100.0;
    let denominator = (100.0 - intensity).max(MIN_INOL_DENOMINATOR);

    Some(InolResult {
        inol: round3(reps as f64 / denominator),
        warning: (intensity >= 100.0).then_some(InolWarning::IntensityCapped),
    })
}

/// Sum of per-set INOL for an exercise.
pub fn exercise_inol(sets: &[TrainingSet], anchor: Option<f64>) -> Option<InolResult> {
    let anchor = usable_anchor(anchor)?;

    let mut total = 0.0;
    let mut capped = false;
    for result in sets
        .iter()
        .filter_map(|set| compute_inol(set.weight, set.reps, Some(anchor)))
    {
        total += result.inol;
        capped |= result.warning.is_some();
    }

    Some(InolResult {
        inol: round3(total),
        warning: capped.then_some(InolWarning::SetsCapped),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn make_session(exercises: Vec<Exercise>) -> Session {
        Session::new(
            "s1",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            exercises,
        )
    }

    fn sets(pairs: &[(f64, u32)]) -> Vec<TrainingSet> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (w, r))| TrainingSet::new(format!("set{}", i), *w, *r, None))
            .collect()
    }

    #[test]
    fn test_set_tonnage() {
        assert_eq!(set_tonnage(&TrainingSet::new("a", 100.0, 5, None)), 500.0);
        assert_eq!(set_tonnage(&TrainingSet::new("a", 62.5, 3, None)), 187.5);
    }

    #[test]
    fn test_exercise_and_session_tonnage() {
        let squat = Exercise::new("e1", "Squat", Tier::T1, sets(&[(100.0, 5), (100.0, 5)]));
        let row = Exercise::new("e2", "Row", Tier::T3, sets(&[(60.0, 10)]));
        assert_eq!(exercise_tonnage(&squat), 1000.0);

        let session = make_session(vec![squat, row]);
        assert_eq!(session_tonnage(&session), 1600.0);
    }

    #[test]
    fn test_tonnage_by_tier_reports_all_tiers() {
        let session = make_session(vec![Exercise::new(
            "e1",
            "Bench",
            Tier::T2,
            sets(&[(80.0, 8)]),
        )]);
        let tiers = tonnage_by_tier(&session);
        assert_eq!(tiers.t1, 0.0);
        assert_eq!(tiers.get(Tier::T2), 640.0);
        assert_eq!(tiers.t3, 0.0);
        assert_eq!(tiers.total(), session_tonnage(&session));
    }

    #[test]
    fn test_tonnage_by_exercise_merges_names() {
        let session = make_session(vec![
            Exercise::new("e1", "Leg  Press", Tier::T3, sets(&[(200.0, 10)])),
            Exercise::new("e2", " leg press", Tier::T3, sets(&[(220.0, 8)])),
        ]);
        let by_name = tonnage_by_exercise(&session);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name["leg press"], 3760.0);
    }

    #[test]
    fn test_inol_requires_anchor() {
        assert!(compute_inol(100.0, 5, None).is_none());
        assert!(compute_inol(100.0, 5, Some(0.0)).is_none());
        assert!(compute_inol(100.0, 5, Some(-150.0)).is_none());
        assert!(exercise_inol(&sets(&[(100.0, 5)]), None).is_none());
    }

    #[test]
    fn test_inol_basic() {
        // 80% intensity: 5 / 20 = 0.25
        let result = compute_inol(80.0, 5, Some(100.0)).unwrap();
        assert!(approx_eq(result.inol, 0.25, 1e-9));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_inol_capped_at_full_intensity() {
        let result = compute_inol(100.0, 3, Some(100.0)).unwrap();
        assert_eq!(result.inol, 3.0);
        assert_eq!(result.warning, Some(InolWarning::IntensityCapped));

        let result = compute_inol(110.0, 2, Some(100.0)).unwrap();
        assert_eq!(result.inol, 2.0);
        assert_eq!(result.warning, Some(InolWarning::IntensityCapped));
    }

    #[test]
    fn test_inol_near_cap_uses_floor() {
        // 99.5% intensity: denominator 0.5 floors to 1
        let result = compute_inol(99.5, 2, Some(100.0)).unwrap();
        assert_eq!(result.inol, 2.0);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_exercise_inol_sum() {
        // 0.25 + 0.25 + 0.3 = 0.8
        let result = exercise_inol(&sets(&[(80.0, 5), (80.0, 5), (90.0, 3)]), Some(100.0)).unwrap();
        assert!(approx_eq(result.inol, 0.8, 1e-9));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_exercise_inol_flags_capped_sets() {
        let result = exercise_inol(&sets(&[(80.0, 5), (105.0, 1)]), Some(100.0)).unwrap();
        assert!(approx_eq(result.inol, 1.25, 1e-9));
        assert_eq!(result.warning, Some(InolWarning::SetsCapped));
    }

    proptest! {
        #[test]
        fn prop_set_tonnage_bilinear(w in 0.5f64..500.0, r in 1u32..50) {
            prop_assert_eq!(set_tonnage(&TrainingSet::new("a", w, r, None)), w * r as f64);
        }

        #[test]
        fn prop_session_tonnage_decomposes(
            groups in proptest::collection::vec(
                proptest::collection::vec((1.0f64..300.0, 1u32..20), 1..6),
                1..5,
            )
        ) {
            let exercises: Vec<Exercise> = groups
                .iter()
                .enumerate()
                .map(|(i, g)| Exercise::new(format!("e{}", i), format!("lift {}", i), Tier::T2, sets(g)))
                .collect();
            let session = make_session(exercises);

            let by_exercise: f64 = session.exercises.iter().map(exercise_tonnage).sum();
            let by_set: f64 = session
                .exercises
                .iter()
                .flat_map(|e| e.sets.iter())
                .map(set_tonnage)
                .sum();
            let total = session_tonnage(&session);
            prop_assert!(approx_eq(total, by_exercise, 1e-6));
            prop_assert!(approx_eq(total, by_set, 1e-6));
        }

        #[test]
        fn prop_inol_bounded_by_reps(w in 1.0f64..400.0, r in 1u32..20, anchor in 1.0f64..400.0) {
            let result = compute_inol(w, r, Some(anchor)).unwrap();
            prop_assert!(result.inol >= 0.0);
            prop_assert!(result.inol <= r as f64);
        }
    }
}
