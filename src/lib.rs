//! Strength training logbook analytics.
//!
//! Pure computations over an in-memory training history: estimated
//! one-rep maxes, tonnage and INOL, Wilks/DOTS scores, personal record
//! detection and fatigue flags.

pub mod analysis;
pub mod competition;
pub mod domain;
pub mod error;
pub mod fatigue;
pub mod formulas;
pub mod history;
pub mod records;
pub mod settings;
pub mod units;
pub mod volume;

pub use domain::{Exercise, MainLift, Session, Sex, Tier, TrainingSet};
pub use formulas::{E1rmResult, compute_e1rm, max_e1rm_from_sets};
pub use records::{PrCandidate, PrRecord, detect_prs};
pub use fatigue::{FatigueFlag, check_e1rm_drop, check_rpe_streak};
