//! Weight unit conversion.

use serde::{Deserialize, Serialize};

const KG_TO_LB: f64 = 2.20462;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            _ => Err(format!("unknown weight unit: {}", s)),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn kg_to_lb(kg: f64) -> f64 {
    round1(kg * KG_TO_LB)
}

pub fn lb_to_kg(lb: f64) -> f64 {
    round1(lb / KG_TO_LB)
}

/// Converts kilograms to the display unit, one decimal.
pub fn kg_to_display(kg: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => round1(kg),
        WeightUnit::Lb => kg_to_lb(kg),
    }
}

/// Converts a value entered in `unit` to kilograms.
pub fn parse_weight_to_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lb => lb_to_kg(value),
    }
}

pub fn format_weight(kg: f64, unit: WeightUnit) -> String {
    match unit {
        WeightUnit::Kg => format!("{} kg", kg_to_display(kg, unit)),
        WeightUnit::Lb => format!("{} lb", kg_to_display(kg, unit)),
    }
}
