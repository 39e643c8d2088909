use crate::domain::model::{DistanceUnit, EfficiencyUnit};

pub const KM_PER_MILE: f64 = 1.60934;

/// Liters per 100 km at 1 mpg (US gallon).
pub const MPG_TO_L100_FACTOR: f64 = 235.214583;

pub const METERS_PER_KM: f64 = 1000.0;

pub const SECONDS_PER_MINUTE: f64 = 60.0;

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

pub fn to_km(value: f64, unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Km => value,
        DistanceUnit::Miles => miles_to_km(value),
    }
}

/// Normalizes an efficiency figure to liters per 100 km.
///
/// Returns 0 when `value` is not a positive finite number; callers must
/// check `value > 0` themselves before trusting a non-zero result.
pub fn to_liters_per_100km(value: f64, unit: EfficiencyUnit) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    match unit {
        EfficiencyUnit::KmPerLiter => 100.0 / value,
        EfficiencyUnit::Mpg => MPG_TO_L100_FACTOR / value,
    }
}

/// Inverse of [`to_liters_per_100km`]; 0 under the same conditions.
pub fn to_km_per_liter(value: f64, unit: EfficiencyUnit) -> f64 {
    match unit {
        EfficiencyUnit::KmPerLiter if value.is_finite() && value > 0.0 => value,
        EfficiencyUnit::KmPerLiter => 0.0,
        EfficiencyUnit::Mpg => match to_liters_per_100km(value, unit) {
            l100 if l100 > 0.0 => 100.0 / l100,
            _ => 0.0,
        },
    }
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

pub fn seconds_to_minutes(seconds: f64) -> i64 {
    (seconds / SECONDS_PER_MINUTE).round() as i64
}
