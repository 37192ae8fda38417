//! Analysis orchestration over a whole training history.
//!
//! This module combines the per-set formulas, volume metrics, record
//! detection and fatigue checks into the dashboard-level views: current
//! anchors, e1RM trends, competition scores and a full report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::competition::{dots, wilks};
use crate::domain::{MainLift, Session, Sex, TrainingSet, is_main_lift, normalize_exercise_name};
use crate::fatigue::{FatigueFlag, check_e1rm_drop, check_rpe_streak};
use crate::formulas::best_e1rm;
use crate::records::{PrRecord, replay_records};
use crate::settings::Settings;
use crate::volume::{
    InolResult, TierTonnage, exercise_inol, session_tonnage, tonnage_by_exercise, tonnage_by_tier,
};

/// Most recent T1 top-set e1RM of a main lift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub lift: MainLift,
    pub e1rm: f64,
    pub date: DateTime<Utc>,
    pub session_id: String,
}

/// One session's top e1RM for a lift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct E1rmPoint {
    pub date: DateTime<Utc>,
    pub e1rm: f64,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionScores {
    pub total: f64,
    pub bodyweight: f64,
    pub wilks: f64,
    pub dots: f64,
}

/// Volume view of a single session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub date: DateTime<Utc>,
    pub tonnage: f64,
    pub by_tier: TierTonnage,
    pub by_exercise: BTreeMap<String, f64>,
    /// INOL per exercise with an anchor to measure against.
    pub inol: BTreeMap<String, InolResult>,
}

/// Tier tonnage of one session, a point in the volume series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVolume {
    pub session_id: String,
    pub date: DateTime<Utc>,
    pub by_tier: TierTonnage,
}

/// Everything derived from a history, recomputed on each call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub session_count: usize,
    pub first_session: Option<DateTime<Utc>>,
    pub last_session: Option<DateTime<Utc>>,
    pub anchors: Vec<Anchor>,
    pub trends: BTreeMap<MainLift, Vec<E1rmPoint>>,
    pub competition: Option<CompetitionScores>,
    pub latest_session: Option<SessionSummary>,
    pub volume_history: Vec<SessionVolume>,
    pub records: Vec<PrRecord>,
    pub fatigue_flags: Vec<FatigueFlag>,
}

/// Sessions kept in the volume series.
pub const VOLUME_HISTORY_SESSIONS: usize = 20;

fn sorted_by_date(sessions: &[Session]) -> Vec<&Session> {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.date);
    ordered
}

fn latest_session(sessions: &[Session]) -> Option<&Session> {
    sessions.iter().max_by_key(|s| s.date)
}

/// Computes the current anchor of every main lift with T1 history.
///
/// Exercises only flagged as main lifts by manual override have no
/// canonical lift and therefore no anchor.
pub fn current_anchors(sessions: &[Session]) -> Vec<Anchor> {
    let mut anchors: BTreeMap<MainLift, Anchor> = BTreeMap::new();

    for session in sorted_by_date(sessions).into_iter().rev() {
        for exercise in session.exercises.iter().filter(|e| e.is_primary_main_lift()) {
            let Some(lift) = MainLift::from_exercise_name(&exercise.name) else {
                continue;
            };
            if anchors.contains_key(&lift) {
                continue;
            }

            let e1rm = best_e1rm(&exercise.sets);
            if e1rm > 0.0 {
                anchors.insert(
                    lift,
                    Anchor {
                        lift,
                        e1rm,
                        date: session.date,
                        session_id: session.id.clone(),
                    },
                );
            }
        }
    }

    anchors.into_values().collect()
}

/// Returns the anchor e1RM matching an exercise name, if any.
pub fn anchor_for(anchors: &[Anchor], exercise_name: &str) -> Option<f64> {
    let lift = MainLift::from_exercise_name(exercise_name)?;
    anchors.iter().find(|a| a.lift == lift).map(|a| a.e1rm)
}

/// Chronological top-e1RM series of one lift, one point per session.
fn lift_trend(lift: MainLift, ordered: &[&Session]) -> Vec<E1rmPoint> {
    ordered
        .iter()
        .filter_map(|session| {
            let best = session
                .exercises
                .iter()
                .filter(|e| {
                    is_main_lift(&e.name, e.is_main_lift)
                        && MainLift::from_exercise_name(&e.name) == Some(lift)
                })
                .map(|e| best_e1rm(&e.sets))
                .fold(0.0, f64::max);

            (best > 0.0).then(|| E1rmPoint {
                date: session.date,
                e1rm: best,
                session_id: session.id.clone(),
            })
        })
        .collect()
}

/// Computes e1RM trends for every main lift that has data.
///
/// Lifts are processed in parallel via rayon.
pub fn e1rm_trends(sessions: &[Session]) -> BTreeMap<MainLift, Vec<E1rmPoint>> {
    let ordered = sorted_by_date(sessions);

    MainLift::all()
        .par_iter()
        .filter_map(|&lift| {
            let points = lift_trend(lift, &ordered);
            (!points.is_empty()).then_some((lift, points))
        })
        .collect()
}

/// Sum of the squat, bench and deadlift anchors.
///
/// Returns None unless all three lifts have an anchor.
pub fn competition_total(anchors: &[Anchor]) -> Option<f64> {
    [MainLift::Squat, MainLift::Bench, MainLift::Deadlift]
        .iter()
        .map(|lift| anchors.iter().find(|a| a.lift == *lift).map(|a| a.e1rm))
        .sum()
}

/// Wilks and DOTS of the anchor total at a bodyweight.
pub fn competition_scores(
    anchors: &[Anchor],
    bodyweight_kg: f64,
    sex: Sex,
) -> Option<CompetitionScores> {
    let total = competition_total(anchors)?;
    Some(CompetitionScores {
        total,
        bodyweight: bodyweight_kg,
        wilks: wilks(total, bodyweight_kg, sex),
        dots: dots(total, bodyweight_kg, sex),
    })
}

/// Bodyweight recorded with the most recent session that has one.
pub fn latest_bodyweight(sessions: &[Session]) -> Option<f64> {
    sorted_by_date(sessions)
        .into_iter()
        .rev()
        .find_map(|s| s.wellness.bodyweight.filter(|bw| *bw > 0.0))
}

/// Summarizes the volume of one session.
pub fn summarize_session(session: &Session, anchors: &[Anchor]) -> SessionSummary {
    let mut sets_by_name: BTreeMap<String, (Vec<TrainingSet>, Option<f64>)> = BTreeMap::new();
    for exercise in &session.exercises {
        let entry = sets_by_name
            .entry(normalize_exercise_name(&exercise.name))
            .or_insert_with(|| (Vec::new(), anchor_for(anchors, &exercise.name)));
        entry.0.extend_from_slice(&exercise.sets);
    }

    let inol = sets_by_name
        .into_iter()
        .filter_map(|(name, (sets, anchor))| exercise_inol(&sets, anchor).map(|r| (name, r)))
        .collect();

    SessionSummary {
        session_id: session.id.clone(),
        date: session.date,
        tonnage: session_tonnage(session),
        by_tier: tonnage_by_tier(session),
        by_exercise: tonnage_by_exercise(session),
        inol,
    }
}

/// Chronological tier tonnage of the most recent `limit` sessions.
pub fn volume_history(sessions: &[Session], limit: usize) -> Vec<SessionVolume> {
    let ordered = sorted_by_date(sessions);
    let skip = ordered.len().saturating_sub(limit);

    ordered
        .into_iter()
        .skip(skip)
        .map(|s| SessionVolume {
            session_id: s.id.clone(),
            date: s.date,
            by_tier: tonnage_by_tier(s),
        })
        .collect()
}

/// Fatigue flags for the history as it stands.
///
/// The drop check runs against the most recent session; the streak check
/// covers every session.
pub fn active_fatigue_flags(sessions: &[Session], settings: &Settings) -> Vec<FatigueFlag> {
    let Some(latest) = latest_session(sessions) else {
        return Vec::new();
    };

    let mut flags = check_e1rm_drop(latest, sessions, settings.fatigue_drop_threshold);
    flags.extend(check_rpe_streak(sessions, settings.rpe_streak_threshold));
    flags
}

/// Builds the full report for a history.
///
/// `records` are the stored PR records; when empty the board is rebuilt by
/// replaying the sessions, with `new_id` naming the rebuilt records.
/// `bodyweight_kg` overrides the latest logged bodyweight for scoring.
pub fn analyze_history(
    sessions: &[Session],
    records: &[PrRecord],
    settings: &Settings,
    bodyweight_kg: Option<f64>,
    new_id: impl FnMut() -> String,
) -> TrainingReport {
    let anchors = current_anchors(sessions);
    log::debug!("{} anchor(s) from {} session(s)", anchors.len(), sessions.len());

    let competition = bodyweight_kg
        .or_else(|| latest_bodyweight(sessions))
        .and_then(|bw| competition_scores(&anchors, bw, settings.sex));

    let records = if records.is_empty() {
        replay_records(sessions, new_id)
    } else {
        records.to_vec()
    };

    let ordered = sorted_by_date(sessions);

    TrainingReport {
        session_count: sessions.len(),
        first_session: ordered.first().map(|s| s.date),
        last_session: ordered.last().map(|s| s.date),
        trends: e1rm_trends(sessions),
        competition,
        latest_session: latest_session(sessions).map(|s| summarize_session(s, &anchors)),
        volume_history: volume_history(sessions, VOLUME_HISTORY_SESSIONS),
        records,
        fatigue_flags: active_fatigue_flags(sessions, settings),
        anchors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Exercise, Tier};
    use chrono::{Duration, TimeZone};

    fn make_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn exercise(name: &str, tier: Tier, weight: f64, reps: u32) -> Exercise {
        Exercise::new(
            format!("ex-{}", name),
            name,
            tier,
            vec![TrainingSet::new("s", weight, reps, None)],
        )
    }

    fn make_session(id: &str, date: DateTime<Utc>, exercises: Vec<Exercise>) -> Session {
        Session::new(id, date, exercises)
    }

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("pr{}", n)
        }
    }

    fn powerlifting_history() -> Vec<Session> {
        let start = make_date(2025, 1, 1);
        vec![
            make_session(
                "a",
                start,
                vec![
                    exercise("Back Squat", Tier::T1, 180.0, 1),
                    exercise("Bench Press", Tier::T1, 120.0, 1),
                ],
            ),
            make_session(
                "b",
                start + Duration::days(7),
                vec![
                    exercise("Squat", Tier::T1, 170.0, 1),
                    exercise("Deadlift", Tier::T1, 220.0, 1),
                    exercise("Pendlay Row", Tier::T2, 90.0, 5),
                ],
            ),
        ]
    }

    #[test]
    fn test_anchors_use_most_recent_session() {
        let anchors = current_anchors(&powerlifting_history());
        assert_eq!(anchors.len(), 3);

        let squat = anchors.iter().find(|a| a.lift == MainLift::Squat).unwrap();
        assert_eq!(squat.e1rm, 170.0);
        assert_eq!(squat.session_id, "b");

        let bench = anchors.iter().find(|a| a.lift == MainLift::Bench).unwrap();
        assert_eq!(bench.session_id, "a");
    }

    #[test]
    fn test_anchors_ignore_non_t1() {
        let sessions = vec![make_session(
            "a",
            make_date(2025, 1, 1),
            vec![exercise("Squat", Tier::T2, 150.0, 1)],
        )];
        assert!(current_anchors(&sessions).is_empty());
    }

    #[test]
    fn test_anchor_for_matches_canonical_lift() {
        let anchors = current_anchors(&powerlifting_history());
        assert_eq!(anchor_for(&anchors, "Pause Squat"), Some(170.0));
        assert_eq!(anchor_for(&anchors, "Overhead Press"), None);
        assert_eq!(anchor_for(&anchors, "Pendlay Row"), None);
    }

    #[test]
    fn test_competition_total_requires_three_lifts() {
        let history = powerlifting_history();
        let anchors = current_anchors(&history);
        assert_eq!(competition_total(&anchors), Some(510.0));
        assert_eq!(competition_total(&current_anchors(&history[..1])), None);
    }

    #[test]
    fn test_competition_scores() {
        let anchors = current_anchors(&powerlifting_history());
        let scores = competition_scores(&anchors, 83.0, Sex::Male).unwrap();
        assert_eq!(scores.total, 510.0);
        assert!(scores.wilks > 300.0 && scores.wilks < 400.0);
        assert!(scores.dots > 300.0 && scores.dots < 400.0);
    }

    #[test]
    fn test_trends_are_chronological() {
        let mut history = powerlifting_history();
        history.reverse();
        let trends = e1rm_trends(&history);

        let squat = &trends[&MainLift::Squat];
        assert_eq!(squat.len(), 2);
        assert_eq!(squat[0].e1rm, 180.0);
        assert_eq!(squat[1].e1rm, 170.0);
        assert_eq!(trends[&MainLift::Deadlift].len(), 1);
        assert!(!trends.contains_key(&MainLift::OverheadPress));
    }

    #[test]
    fn test_latest_bodyweight() {
        let mut history = powerlifting_history();
        assert_eq!(latest_bodyweight(&history), None);
        history[0].wellness.bodyweight = Some(82.0);
        assert_eq!(latest_bodyweight(&history), Some(82.0));
        history[1].wellness.bodyweight = Some(83.4);
        assert_eq!(latest_bodyweight(&history), Some(83.4));
    }

    #[test]
    fn test_summarize_session_inol_against_anchor() {
        let history = powerlifting_history();
        let anchors = current_anchors(&history);
        let session = make_session(
            "c",
            make_date(2025, 1, 20),
            vec![
                exercise("Squat", Tier::T1, 136.0, 5),
                exercise("Leg Curl", Tier::T3, 40.0, 12),
            ],
        );

        let summary = summarize_session(&session, &anchors);
        assert_eq!(summary.tonnage, 680.0 + 480.0);
        assert_eq!(summary.by_tier.t1, 680.0);
        assert_eq!(summary.by_tier.t3, 480.0);
        // 136 / 170 = 80%: 5 / 20
        assert_eq!(summary.inol["squat"].inol, 0.25);
        assert!(!summary.inol.contains_key("leg curl"));
    }

    #[test]
    fn test_volume_history_is_chronological_and_capped() {
        let start = make_date(2025, 1, 1);
        let sessions: Vec<Session> = (0..25)
            .rev()
            .map(|i| {
                make_session(
                    &format!("s{}", i),
                    start + Duration::days(i),
                    vec![
                        exercise("Squat", Tier::T1, 100.0 + i as f64, 5),
                        exercise("Leg Curl", Tier::T3, 40.0, 10),
                    ],
                )
            })
            .collect();

        let series = volume_history(&sessions, VOLUME_HISTORY_SESSIONS);
        assert_eq!(series.len(), 20);
        assert_eq!(series[0].session_id, "s5");
        assert_eq!(series[19].session_id, "s24");
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series[19].by_tier.t1, 124.0 * 5.0);
        assert_eq!(series[19].by_tier.t2, 0.0);
        assert_eq!(series[19].by_tier.t3, 400.0);

        assert_eq!(volume_history(&sessions[..3], VOLUME_HISTORY_SESSIONS).len(), 3);
        assert!(volume_history(&[], VOLUME_HISTORY_SESSIONS).is_empty());
    }

    #[test]
    fn test_active_flags_use_latest_session() {
        let start = make_date(2025, 2, 1);
        let heavy = |id: &str, date, weight| {
            make_session(
                id,
                date,
                vec![Exercise::new(
                    "e",
                    "Bench",
                    Tier::T1,
                    vec![TrainingSet::new("s", weight, 1, Some(10.0))],
                )],
            )
        };
        let sessions = vec![
            heavy("x", start + Duration::days(14), 100.0),
            heavy("w", start, 120.0),
        ];

        let flags = active_fatigue_flags(&sessions, &Settings::default());
        assert_eq!(flags.len(), 2);
        assert!(active_fatigue_flags(&[], &Settings::default()).is_empty());
    }

    #[test]
    fn test_analyze_history_rebuilds_records() {
        let history = powerlifting_history();
        let report = analyze_history(&history, &[], &Settings::default(), Some(83.0), counter());

        assert_eq!(report.session_count, 2);
        assert_eq!(report.first_session, Some(make_date(2025, 1, 1)));
        assert_eq!(report.anchors.len(), 3);
        assert!(report.competition.is_some());
        assert_eq!(report.latest_session.as_ref().unwrap().session_id, "b");
        let volume: Vec<&str> = report.volume_history.iter().map(|v| v.session_id.as_str()).collect();
        assert_eq!(volume, ["a", "b"]);
        assert!(!report.records.is_empty());
        assert!(report.records.iter().all(|r| r.id.starts_with("pr")));
    }

    #[test]
    fn test_analyze_history_keeps_stored_records() {
        let history = powerlifting_history();
        let stored = replay_records(&history, || "stored".to_string());
        let report = analyze_history(&history, &stored, &Settings::default(), None, counter());
        assert_eq!(report.records, stored);
        assert!(report.competition.is_none());
    }
}
