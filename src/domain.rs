//! Domain types for logged training data.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exercise role within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Primary or competition lift.
    T1,
    /// Secondary lift.
    T2,
    /// Accessory work.
    T3,
}

impl Tier {
    /// Returns all tier variants.
    pub fn all() -> &'static [Tier] {
        &[Tier::T1, Tier::T2, Tier::T3]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::T1 => write!(f, "T1"),
            Tier::T2 => write!(f, "T2"),
            Tier::T3 => write!(f, "T3"),
        }
    }
}

/// Lifter sex, selecting the competition coefficient set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("unknown sex: {}", s)),
        }
    }
}

/// A single logged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub id: String,
    /// Load in kilograms.
    pub weight: f64,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
}

impl TrainingSet {
    /// Creates a new set.
    pub fn new(id: impl Into<String>, weight: f64, reps: u32, rpe: Option<f64>) -> Self {
        Self {
            id: id.into(),
            weight,
            reps,
            rpe,
        }
    }
}

/// An exercise performed within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub sets: Vec<TrainingSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_notes: Option<String>,
    /// Manual override for main-lift detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_main_lift: Option<bool>,
}

impl Exercise {
    /// Creates a new exercise without variation, notes or override.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tier: Tier,
        sets: Vec<TrainingSet>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tier,
            sets,
            variation: None,
            tech_notes: None,
            is_main_lift: None,
        }
    }

    /// Sets the manual main-lift override.
    pub fn with_main_lift_override(mut self, is_main_lift: bool) -> Self {
        self.is_main_lift = Some(is_main_lift);
        self
    }

    /// Returns the grouping key for this exercise.
    pub fn normalized_name(&self) -> String {
        normalize_exercise_name(&self.name)
    }

    /// Returns true if this is a T1 exercise counted as a main lift.
    pub fn is_primary_main_lift(&self) -> bool {
        self.tier == Tier::T1 && is_main_lift(&self.name, self.is_main_lift)
    }
}

/// Subjective readiness metrics recorded alongside a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wellness {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodyweight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<u8>,
}

/// A logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
    #[serde(flatten)]
    pub wellness: Wellness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    /// Creates a new session without wellness metrics.
    pub fn new(id: impl Into<String>, date: DateTime<Utc>, exercises: Vec<Exercise>) -> Self {
        Self {
            id: id.into(),
            date,
            exercises,
            wellness: Wellness::default(),
            notes: None,
        }
    }
}

/// Competition lifts recognized from free-text exercise names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainLift {
    Squat,
    Bench,
    Deadlift,
    OverheadPress,
}

struct LiftPattern {
    pattern: Regex,
    lift: MainLift,
}

// Order matters: the first matching pattern names the lift.
static MAIN_LIFT_PATTERNS: LazyLock<Vec<LiftPattern>> = LazyLock::new(|| {
    [
        (r"(?i)\bsquat\b", MainLift::Squat),
        (r"(?i)\bbench\b", MainLift::Bench),
        (r"(?i)\bdeadlift\b", MainLift::Deadlift),
        (r"(?i)\b(overhead\s*press|ohp)\b", MainLift::OverheadPress),
    ]
    .into_iter()
    .map(|(pattern, lift)| LiftPattern {
        pattern: Regex::new(pattern).expect("main lift pattern is a valid regex"),
        lift,
    })
    .collect()
});

impl MainLift {
    /// Returns all main lift variants.
    pub fn all() -> &'static [MainLift] {
        &[
            MainLift::Squat,
            MainLift::Bench,
            MainLift::Deadlift,
            MainLift::OverheadPress,
        ]
    }

    /// Returns the canonical lowercase name.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            MainLift::Squat => "squat",
            MainLift::Bench => "bench",
            MainLift::Deadlift => "deadlift",
            MainLift::OverheadPress => "overhead press",
        }
    }

    /// Recognizes a main lift inside a free-text exercise name.
    ///
    /// "Low Bar Squat" is a squat, "Close Grip Bench" a bench, "OHP" an
    /// overhead press. Returns None for anything else.
    pub fn from_exercise_name(name: &str) -> Option<MainLift> {
        MAIN_LIFT_PATTERNS
            .iter()
            .find(|p| p.pattern.is_match(name))
            .map(|p| p.lift)
    }
}

impl std::fmt::Display for MainLift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_exercise_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Decides whether an exercise counts as a main lift.
///
/// A manual override always wins over name matching.
pub fn is_main_lift(name: &str, manual_override: Option<bool>) -> bool {
    match manual_override {
        Some(is_main) => is_main,
        None => MainLift::from_exercise_name(name).is_some(),
    }
}
