//! Error types for loading a training history.

use thiserror::Error;

/// Errors that can occur when reading a history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("cannot read file: {0}")]
    CannotRead(String),

    #[error("invalid history format: {0}")]
    InvalidFormat(#[from] serde_json::Error),
}

/// A logged session that breaks the data-model invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("session {session} has no exercises")]
    NoExercises { session: String },

    #[error("exercise '{exercise}' in session {session} has no sets")]
    NoSets { session: String, exercise: String },

    #[error("invalid weight in session {session}: {value}")]
    InvalidWeight { session: String, value: f64 },

    #[error("invalid repetitions in session {session}: {value}")]
    InvalidReps { session: String, value: u32 },

    #[error("invalid RPE in session {session}: {value}")]
    InvalidRpe { session: String, value: f64 },
}
