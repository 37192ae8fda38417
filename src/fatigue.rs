//! Fatigue signals derived from session history.
//!
//! Two independent checks scan the log: a drop in estimated max on a main
//! lift against its rolling 28-day best, and a run of sessions where the
//! top set of a main lift was taken to RPE 9.5 or above.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::domain::{Session, Tier};
use crate::formulas::best_e1rm;

/// Default relative e1RM drop that raises a flag.
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.05;

/// Default number of consecutive high-effort sessions that raises a flag.
pub const DEFAULT_STREAK_THRESHOLD: usize = 2;

/// Lookback for the rolling e1RM baseline (days).
pub const ROLLING_WINDOW_DAYS: i64 = 28;

/// Top-set RPE counted as high effort.
pub const HIGH_RPE: f64 = 9.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueKind {
    E1rmDrop,
    RpeStreak,
}

/// Structured payload of a fatigue flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum FatigueDetail {
    #[serde(rename = "e1rm_drop", rename_all = "camelCase")]
    E1rmDrop {
        current: f64,
        baseline: f64,
        /// Percentage, one decimal.
        drop_percent: f64,
    },
    #[serde(rename = "rpe_streak", rename_all = "camelCase")]
    RpeStreak { streak_count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueFlag {
    /// Normalized lift name.
    pub lift: String,
    pub message: String,
    #[serde(flatten)]
    pub detail: FatigueDetail,
}

impl FatigueFlag {
    pub fn kind(&self) -> FatigueKind {
        match self.detail {
            FatigueDetail::E1rmDrop { .. } => FatigueKind::E1rmDrop,
            FatigueDetail::RpeStreak { .. } => FatigueKind::RpeStreak,
        }
    }
}

/// Flags main lifts whose e1RM in `current` fell below the rolling best.
///
/// Only T1 main lifts of the current session are checked. The baseline is
/// the best T1 e1RM of the same lift in any other session dated within the
/// 28 days up to and including the current session. Lifts without a
/// baseline are skipped. A flag needs the drop to strictly exceed
/// `threshold` (a fraction, 0.05 = 5%).
pub fn check_e1rm_drop(current: &Session, sessions: &[Session], threshold: f64) -> Vec<FatigueFlag> {
    let window_start = current.date - Duration::days(ROLLING_WINDOW_DAYS);

    // Same-named T1 exercises in one session count as one lift
    let mut current_bests: Vec<(String, f64)> = Vec::new();
    for exercise in current.exercises.iter().filter(|e| e.is_primary_main_lift()) {
        let name = exercise.normalized_name();
        let best = best_e1rm(&exercise.sets);
        match current_bests.iter_mut().find(|(n, _)| *n == name) {
            Some((_, b)) => *b = b.max(best),
            None => current_bests.push((name, best)),
        }
    }

    let mut flags = Vec::new();

    for (name, current_best) in current_bests {
        if current_best <= 0.0 {
            continue;
        }

        let baseline = sessions
            .iter()
            .filter(|s| s.id != current.id && s.date >= window_start && s.date <= current.date)
            .flat_map(|s| s.exercises.iter())
            .filter(|e| e.tier == Tier::T1 && e.normalized_name() == name)
            .map(|e| best_e1rm(&e.sets))
            .fold(0.0, f64::max);

        if baseline <= 0.0 {
            continue;
        }

        let drop = (baseline - current_best) / baseline;
        if drop > threshold {
            flags.push(FatigueFlag {
                message: format!(
                    "{} e1RM dropped {:.1}% vs {}-day best",
                    name,
                    drop * 100.0,
                    ROLLING_WINDOW_DAYS
                ),
                lift: name,
                detail: FatigueDetail::E1rmDrop {
                    current: current_best,
                    baseline,
                    drop_percent: (drop * 1000.0).round() / 10.0,
                },
            });
        }
    }

    flags
}

/// Flags main lifts whose most recent sessions were all taken to RPE 9.5+.
///
/// Sessions are walked in date order. Per session and T1 main lift the top
/// set RPE is recorded (sets without RPE are ignored, and sessions with no
/// RPE for the lift do not count either way). The streak is counted back
/// from the latest entry and ends at the first entry below 9.5. A
/// threshold of 0 is treated as 1.
pub fn check_rpe_streak(sessions: &[Session], streak_threshold: usize) -> Vec<FatigueFlag> {
    let threshold = streak_threshold.max(1);

    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.date);

    let mut top_rpes: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for session in ordered {
        let mut session_tops: BTreeMap<String, f64> = BTreeMap::new();
        for exercise in session.exercises.iter().filter(|e| e.is_primary_main_lift()) {
            let Some(top) = exercise.sets.iter().filter_map(|s| s.rpe).reduce(f64::max) else {
                continue;
            };
            let entry = session_tops.entry(exercise.normalized_name()).or_insert(top);
            *entry = entry.max(top);
        }
        for (lift, top) in session_tops {
            top_rpes.entry(lift).or_default().push(top);
        }
    }

    top_rpes
        .into_iter()
        .filter_map(|(lift, tops)| {
            let streak = tops.iter().rev().take_while(|rpe| **rpe >= HIGH_RPE).count();
            (streak >= threshold).then(|| FatigueFlag {
                message: format!(
                    "{}: RPE >= {} for {} consecutive sessions",
                    lift, HIGH_RPE, streak
                ),
                lift,
                detail: FatigueDetail::RpeStreak {
                    streak_count: streak,
                },
            })
        })
        .collect()
}
