//! User settings that parameterize the analysis.

use serde::{Deserialize, Serialize};

use crate::domain::Sex;
use crate::fatigue::{DEFAULT_DROP_THRESHOLD, DEFAULT_STREAK_THRESHOLD};
use crate::units::WeightUnit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Display unit. All stored and computed weights are kilograms.
    pub weight_unit: WeightUnit,
    /// Selects the Wilks/DOTS coefficient set.
    pub sex: Sex,
    /// Relative e1RM drop that raises a fatigue flag (0.05 = 5%).
    pub fatigue_drop_threshold: f64,
    /// Consecutive RPE 9.5+ sessions that raise a fatigue flag.
    pub rpe_streak_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Kg,
            sex: Sex::Male,
            fatigue_drop_threshold: DEFAULT_DROP_THRESHOLD,
            rpe_streak_threshold: DEFAULT_STREAK_THRESHOLD,
        }
    }
}
