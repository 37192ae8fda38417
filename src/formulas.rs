//! Estimated one-rep-max formulas and the per-set e1RM resolver.

use serde::Serialize;

use crate::domain::TrainingSet;

/// Reps above which formula estimates are flagged as less reliable.
const MAX_RELIABLE_REPS: u32 = 10;

/// Brzycki's denominator reaches zero at this rep count.
const BRZYCKI_SINGULAR_REPS: u32 = 37;

/// RTS percentage chart: rows are RPE 10.0 down to 6.0 in 0.5 steps,
/// columns are reps 1 through 10. Values are percent of 1RM.
const RTS_TABLE: [[f64; 10]; 9] = [
    [100.0, 95.5, 92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 73.9], // 10
    [97.8, 93.9, 90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.3], // 9.5
    [95.5, 92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 73.9, 71.5], // 9
    [93.9, 90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.3, 69.4], // 8.5
    [92.2, 89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 73.9, 71.5, 68.0], // 8
    [90.7, 87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.3, 69.4, 66.7], // 7.5
    [89.2, 86.3, 83.7, 81.1, 78.6, 76.2, 73.9, 71.5, 68.0, 65.3], // 7
    [87.8, 85.0, 82.4, 79.9, 77.4, 75.1, 72.3, 69.4, 66.7, 63.2], // 6.5
    [86.3, 83.7, 81.1, 78.6, 76.2, 73.9, 71.5, 68.0, 65.3, 61.3], // 6
];

const RTS_MAX_RPE: f64 = 10.0;

/// How an e1RM value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum E1rmMethod {
    /// RPE × reps lookup in the RTS chart.
    Rts,
    /// Mean of Brzycki and Epley.
    BrzyckiEpleyAvg,
    /// A single rep taken at face value.
    Identity,
}

/// Informational caveat attached to an e1RM estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum E1rmWarning {
    InvalidInput,
    HighReps,
}

impl std::fmt::Display for E1rmWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            E1rmWarning::InvalidInput => write!(f, "Invalid weight or reps"),
            E1rmWarning::HighReps => write!(f, "Reps > 10: e1RM estimate less reliable"),
        }
    }
}

/// Resolved e1RM for a single set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct E1rmResult {
    pub e1rm: f64,
    pub method: E1rmMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<E1rmWarning>,
}

/// Brzycki: w × 36 / (37 - r).
///
/// At or beyond 37 reps the denominator would vanish, so the result is
/// capped at w × 36.
pub fn brzycki(weight_kg: f64, reps: u32) -> f64 {
    if reps >= BRZYCKI_SINGULAR_REPS {
        return weight_kg * 36.0;
    }
    weight_kg * (36.0 / (37.0 - reps as f64))
}

/// Epley: w × (1 + r/30).
pub fn epley(weight_kg: f64, reps: u32) -> f64 {
    weight_kg * (1.0 + reps as f64 / 30.0)
}

/// Looks up percent of 1RM for an (RPE, reps) pair.
///
/// Returns None when the RPE is not on a tabulated half step between 6 and
/// 10, or when reps fall outside 1..=10. Never extrapolates.
pub fn rts_percentage(rpe: f64, reps: u32) -> Option<f64> {
    if !(1..=10).contains(&reps) {
        return None;
    }

    let steps = (RTS_MAX_RPE - rpe) * 2.0;
    if !steps.is_finite() || steps.fract() != 0.0 || steps < 0.0 {
        return None;
    }

    RTS_TABLE
        .get(steps as usize)
        .map(|row| row[(reps - 1) as usize])
}

/// Resolves the e1RM of one set.
///
/// Strategy, in order:
/// 1. RPE present and tabulated for this rep count: RTS lookup.
/// 2. A single rep: the weight itself.
/// 3. Otherwise the Brzycki/Epley average, warned above 10 reps.
///
/// A non-positive weight or zero reps yields a zero identity result with
/// an `InvalidInput` warning.
pub fn compute_e1rm(weight_kg: f64, reps: u32, rpe: Option<f64>) -> E1rmResult {
    if weight_kg <= 0.0 || reps < 1 {
        return E1rmResult {
            e1rm: 0.0,
            method: E1rmMethod::Identity,
            warning: Some(E1rmWarning::InvalidInput),
        };
    }

    // An RPE outside the chart silently falls through to the next strategy
    if let Some(percent) = rpe.and_then(|r| rts_percentage(r, reps))
        && percent > 0.0
    {
        return E1rmResult {
            e1rm: round2(weight_kg / (percent / 100.0)),
            method: E1rmMethod::Rts,
            warning: None,
        };
    }

    if reps == 1 {
        return E1rmResult {
            e1rm: weight_kg,
            method: E1rmMethod::Identity,
            warning: None,
        };
    }

    let avg = (brzycki(weight_kg, reps) + epley(weight_kg, reps)) / 2.0;

    E1rmResult {
        e1rm: round2(avg),
        method: E1rmMethod::BrzyckiEpleyAvg,
        warning: (reps > MAX_RELIABLE_REPS).then_some(E1rmWarning::HighReps),
    }
}

/// Returns the highest e1RM among the sets.
///
/// None when there are no sets or every estimate is zero. On ties the
/// first set wins.
pub fn max_e1rm_from_sets(sets: &[TrainingSet]) -> Option<E1rmResult> {
    sets.iter()
        .map(|set| compute_e1rm(set.weight, set.reps, set.rpe))
        .filter(|result| result.e1rm > 0.0)
        .fold(None, |best: Option<E1rmResult>, result| match best {
            Some(b) if b.e1rm >= result.e1rm => Some(b),
            _ => Some(result),
        })
}

/// Top e1RM value of the sets, or 0 when none.
pub fn best_e1rm(sets: &[TrainingSet]) -> f64 {
    max_e1rm_from_sets(sets).map_or(0.0, |r| r.e1rm)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
