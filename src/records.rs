//! Personal record detection and the record board.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Exercise, Session, TrainingSet, normalize_exercise_name};
use crate::formulas::best_e1rm;

/// Highest rep count tracked for weight-at-reps records.
pub const MAX_RECORD_REPS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Best estimated one-rep max.
    E1rm,
    /// Heaviest weight for an exact rep count.
    WeightAtReps,
}

/// A record beaten by a newly logged session, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCandidate {
    pub exercise_name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
}

/// A persisted personal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrRecord {
    pub id: String,
    pub exercise_name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    pub session_id: String,
    pub session_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
}

impl PrRecord {
    fn same_slot(&self, other: &PrRecord) -> bool {
        self.kind == other.kind
            && self.reps == other.reps
            && normalize_exercise_name(&self.exercise_name)
                == normalize_exercise_name(&other.exercise_name)
    }
}

/// Merges same-named exercises of a session, keeping first-seen order.
fn group_by_name(exercises: &[Exercise]) -> Vec<(String, Vec<TrainingSet>)> {
    let mut groups: Vec<(String, Vec<TrainingSet>)> = Vec::new();
    for exercise in exercises {
        let name = normalize_exercise_name(&exercise.name);
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, sets)) => sets.extend_from_slice(&exercise.sets),
            None => groups.push((name, exercise.sets.clone())),
        }
    }
    groups
}

/// Best prior value for a record slot, if any.
fn prior_best(records: &[&PrRecord], kind: RecordKind, reps: Option<u32>) -> Option<f64> {
    records
        .iter()
        .filter(|r| r.kind == kind && r.reps == reps)
        .map(|r| r.value)
        .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
}

/// Finds records a session's exercises beat.
///
/// For each exercise (same-named exercises merged) two checks run: the best
/// set e1RM against the prior e1RM record, and for every rep count 1..=10
/// the heaviest weight at exactly that count against the prior
/// weight-at-reps record. A value must strictly exceed the prior record.
pub fn detect_prs(exercises: &[Exercise], existing: &[PrRecord]) -> Vec<PrCandidate> {
    let mut candidates = Vec::new();

    for (name, sets) in group_by_name(exercises) {
        let prior: Vec<&PrRecord> = existing
            .iter()
            .filter(|r| normalize_exercise_name(&r.exercise_name) == name)
            .collect();

        let e1rm = best_e1rm(&sets);
        if e1rm > 0.0 {
            let previous = prior_best(&prior, RecordKind::E1rm, None);
            if previous.is_none_or(|p| e1rm > p) {
                candidates.push(PrCandidate {
                    exercise_name: name.clone(),
                    kind: RecordKind::E1rm,
                    value: e1rm,
                    reps: None,
                    previous_value: previous,
                });
            }
        }

        let mut heaviest_at_reps: BTreeMap<u32, f64> = BTreeMap::new();
        for set in sets
            .iter()
            .filter(|s| (1..=MAX_RECORD_REPS).contains(&s.reps) && s.weight > 0.0)
        {
            let heaviest = heaviest_at_reps.entry(set.reps).or_insert(set.weight);
            *heaviest = heaviest.max(set.weight);
        }

        for (reps, weight) in heaviest_at_reps {
            let previous = prior_best(&prior, RecordKind::WeightAtReps, Some(reps));
            if previous.is_none_or(|p| weight > p) {
                candidates.push(PrCandidate {
                    exercise_name: name.clone(),
                    kind: RecordKind::WeightAtReps,
                    value: weight,
                    reps: Some(reps),
                    previous_value: previous,
                });
            }
        }
    }

    candidates
}

/// Turns candidates into records linked to the session that set them.
///
/// `new_id` supplies the identity of each record.
pub fn candidates_to_records(
    candidates: Vec<PrCandidate>,
    session: &Session,
    mut new_id: impl FnMut() -> String,
) -> Vec<PrRecord> {
    candidates
        .into_iter()
        .map(|c| PrRecord {
            id: new_id(),
            exercise_name: c.exercise_name,
            kind: c.kind,
            value: c.value,
            reps: c.reps,
            session_id: session.id.clone(),
            session_date: session.date,
            previous_value: c.previous_value,
        })
        .collect()
}

/// Applies new records to a board, replacing any record in the same slot.
pub fn merge_records(existing: &[PrRecord], new: &[PrRecord]) -> Vec<PrRecord> {
    let mut board: Vec<PrRecord> = existing
        .iter()
        .filter(|old| !new.iter().any(|n| n.same_slot(old)))
        .cloned()
        .collect();
    board.extend(new.iter().cloned());
    board
}

/// Rebuilds the record board by replaying sessions in date order.
pub fn replay_records(sessions: &[Session], mut new_id: impl FnMut() -> String) -> Vec<PrRecord> {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.date);

    let mut board: Vec<PrRecord> = Vec::new();
    for session in ordered {
        let candidates = detect_prs(&session.exercises, &board);
        if candidates.is_empty() {
            continue;
        }
        log::debug!("session {} set {} record(s)", session.id, candidates.len());
        let records = candidates_to_records(candidates, session, &mut new_id);
        board = merge_records(&board, &records);
    }
    board
}
