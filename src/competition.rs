//! Bodyweight-normalized powerlifting scores.

use crate::domain::Sex;
use crate::formulas::round2;

/// Classic Wilks coefficients, ascending powers of bodyweight (x^0..x^5).
mod wilks_coefficients {
    pub const MALE: [f64; 6] = [
        -216.0475144,
        16.2606339,
        -0.002388645,
        -0.00113732,
        7.01863e-6,
        -1.291e-8,
    ];
    pub const FEMALE: [f64; 6] = [
        594.31747775582,
        -27.23842536447,
        0.82112226871,
        -0.00930733913,
        4.731582e-5,
        -9.054e-8,
    ];
}

/// DOTS coefficients, ascending powers of bodyweight (x^0..x^4).
mod dots_coefficients {
    pub const MALE: [f64; 5] = [
        -307.75076,
        24.0900756,
        -0.1918759221,
        0.0007391293,
        -0.000001093,
    ];
    pub const FEMALE: [f64; 5] = [
        -57.96288,
        13.6175032,
        -0.1126655495,
        0.0005158568,
        -0.0000010706,
    ];
}

/// Evaluates a polynomial given ascending coefficients (Horner's scheme).
fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Scores a total as `total × 500 / poly(bodyweight)`.
///
/// Returns 0 for a non-positive total or bodyweight, and when the
/// polynomial is non-positive (bodyweights far outside the human range).
fn scaled_score(total_kg: f64, bodyweight_kg: f64, coefficients: &[f64]) -> f64 {
    if total_kg <= 0.0 || bodyweight_kg <= 0.0 {
        return 0.0;
    }

    let denominator = polynomial(coefficients, bodyweight_kg);
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    round2(total_kg * (500.0 / denominator))
}

/// Wilks score of a powerlifting total.
pub fn wilks(total_kg: f64, bodyweight_kg: f64, sex: Sex) -> f64 {
    let coefficients = match sex {
        Sex::Male => &wilks_coefficients::MALE,
        Sex::Female => &wilks_coefficients::FEMALE,
    };
    scaled_score(total_kg, bodyweight_kg, coefficients)
}

/// DOTS score of a powerlifting total.
pub fn dots(total_kg: f64, bodyweight_kg: f64, sex: Sex) -> f64 {
    let coefficients = match sex {
        Sex::Male => &dots_coefficients::MALE,
        Sex::Female => &dots_coefficients::FEMALE,
    };
    scaled_score(total_kg, bodyweight_kg, coefficients)
}
