//! Reading a training history from a JSON file.
//!
//! The file holds the logged sessions and, optionally, the stored PR
//! records and user settings. Sessions that break the data-model
//! invariants are skipped with a warning rather than failing the load.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::{Session, TrainingSet};
use crate::error::{HistoryError, ValidationError};
use crate::records::PrRecord;
use crate::settings::Settings;

const MIN_RPE: f64 = 5.0;
const MAX_RPE: f64 = 10.0;

/// A user's logged history, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub pr_records: Vec<PrRecord>,
}

/// Loads a training history from a JSON file.
///
/// # Errors
/// Returns HistoryError if the file is missing, unreadable, or not a
/// history document. Invalid sessions are dropped, not reported as errors.
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<History, HistoryError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HistoryError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| HistoryError::CannotRead(format!("{}: {}", path.display(), e)))?;

    parse_history(&content)
}

/// On-disk shape with sessions left untyped so one bad entry can be skipped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHistory {
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    sessions: Vec<serde_json::Value>,
    #[serde(default)]
    pr_records: Vec<PrRecord>,
}

/// Parses a history document, skipping invalid sessions.
///
/// A session is skipped when it does not deserialize (wrong types,
/// negative reps, missing fields) or fails validation.
pub fn parse_history(content: &str) -> Result<History, HistoryError> {
    let raw: RawHistory = serde_json::from_str(content)?;

    let mut sessions = Vec::with_capacity(raw.sessions.len());
    for (idx, value) in raw.sessions.into_iter().enumerate() {
        let label = value
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", idx));

        let session: Session = match serde_json::from_value(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("skipping session {}: {}", label, e);
                continue;
            }
        };

        if let Err(e) = validate_session(&session) {
            warn!("skipping session: {}", e);
            continue;
        }

        sessions.push(session);
    }

    Ok(History {
        settings: raw.settings,
        sessions,
        pr_records: raw.pr_records,
    })
}

/// Checks a session against the data-model invariants.
pub fn validate_session(session: &Session) -> Result<(), ValidationError> {
    if session.exercises.is_empty() {
        return Err(ValidationError::NoExercises {
            session: session.id.clone(),
        });
    }

    for exercise in &session.exercises {
        if exercise.sets.is_empty() {
            return Err(ValidationError::NoSets {
                session: session.id.clone(),
                exercise: exercise.name.clone(),
            });
        }
        for set in &exercise.sets {
            validate_set(set, &session.id)?;
        }
    }

    Ok(())
}

fn validate_set(set: &TrainingSet, session: &str) -> Result<(), ValidationError> {
    if !(set.weight > 0.0 && set.weight.is_finite()) {
        return Err(ValidationError::InvalidWeight {
            session: session.to_string(),
            value: set.weight,
        });
    }

    if set.reps < 1 {
        return Err(ValidationError::InvalidReps {
            session: session.to_string(),
            value: set.reps,
        });
    }

    if let Some(rpe) = set.rpe
        && !((MIN_RPE..=MAX_RPE).contains(&rpe) && (rpe * 2.0).fract() == 0.0)
    {
        return Err(ValidationError::InvalidRpe {
            session: session.to_string(),
            value: rpe,
        });
    }

    Ok(())
}
