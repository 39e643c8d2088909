use crate::utils::error::{FillTripError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "km")]
    Km,
    #[serde(rename = "miles")]
    Miles,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Miles => "miles",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = FillTripError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Km),
            "miles" | "mi" => Ok(DistanceUnit::Miles),
            _ => Err(FillTripError::UnrecognizedUnit {
                kind: "distance unit",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EfficiencyUnit {
    #[default]
    #[serde(rename = "km/L")]
    KmPerLiter,
    #[serde(rename = "mpg")]
    Mpg,
}

impl EfficiencyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyUnit::KmPerLiter => "km/L",
            EfficiencyUnit::Mpg => "mpg",
        }
    }
}

impl FromStr for EfficiencyUnit {
    type Err = FillTripError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km/l" | "kmpl" => Ok(EfficiencyUnit::KmPerLiter),
            "mpg" => Ok(EfficiencyUnit::Mpg),
            _ => Err(FillTripError::UnrecognizedUnit {
                kind: "efficiency unit",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EfficiencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "PHP")]
    Php,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Php => "PHP",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Php => "₱",
            Currency::Usd => "$",
        }
    }

    /// Symbol followed by the amount at two decimals, e.g. `₱560.00`.
    pub fn format(&self, amount: f64) -> String {
        format_amount(amount, self.code())
    }
}

/// Formats an amount whose currency code came from an external record.
/// Unknown codes are printed as-is in place of a symbol, and an empty code means PHP.
pub fn format_amount(amount: f64, code: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let code = if code.is_empty() { "PHP" } else { code };
    match code.parse::<Currency>() {
        Ok(currency) => format!("{}{:.2}", currency.symbol(), amount),
        Err(_) => format!("{}{:.2}", code, amount),
    }
}

impl FromStr for Currency {
    type Err = FillTripError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PHP" => Ok(Currency::Php),
            "USD" => Ok(Currency::Usd),
            _ => Err(FillTripError::UnrecognizedUnit {
                kind: "currency",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FuelType {
    #[default]
    #[serde(rename = "Gasoline / Unleaded (91)")]
    Unleaded91,
    #[serde(rename = "Gasoline / Unleaded (95)")]
    Unleaded95,
    #[serde(rename = "Diesel")]
    Diesel,
    #[serde(rename = "Premium Gasoline (98)")]
    Premium98,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Unleaded91,
        FuelType::Unleaded95,
        FuelType::Diesel,
        FuelType::Premium98,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Unleaded91 => "Gasoline / Unleaded (91)",
            FuelType::Unleaded95 => "Gasoline / Unleaded (95)",
            FuelType::Diesel => "Diesel",
            FuelType::Premium98 => "Premium Gasoline (98)",
        }
    }
}

impl FromStr for FuelType {
    type Err = FillTripError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        let short = match wanted.as_str() {
            "91" | "unleaded" => Some(FuelType::Unleaded91),
            "95" => Some(FuelType::Unleaded95),
            "98" | "premium" => Some(FuelType::Premium98),
            _ => None,
        };
        short
            .or_else(|| {
                FuelType::ALL
                    .into_iter()
                    .find(|t| t.label().to_ascii_lowercase() == wanted)
            })
            .ok_or_else(|| FillTripError::UnrecognizedUnit {
                kind: "fuel type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleCategory {
    Car,
    #[serde(alias = "Moto")]
    Motorcycle,
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleCategory::Car => f.write_str("Car"),
            VehicleCategory::Motorcycle => f.write_str("Motorcycle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub make: String,
    pub model: String,
    pub typical_years: String,
    pub km_per_liter_avg: f64,
    pub category: VehicleCategory,
}

impl VehicleRecord {
    pub fn first_year(&self) -> &str {
        self.typical_years.split('-').next().unwrap_or("").trim()
    }

    /// Display label such as `2019 Toyota Vios`.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.first_year(), self.make, self.model)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInput {
    pub distance_value: f64,
    pub distance_unit: DistanceUnit,
    pub efficiency_value: f64,
    pub efficiency_unit: EfficiencyUnit,
    pub price_per_liter: f64,
    pub currency: Currency,
    pub fuel_type: FuelType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationResult {
    pub liters_needed: f64,
    pub total_cost: f64,
    pub currency: Currency,
}

/// Marks that a calculation's distance came from a planned route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteContext {
    pub start_name: String,
    pub end_name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(rename = "startLocationName")]
    pub start_name: String,
    #[serde(rename = "endLocationName")]
    pub end_name: String,
    pub distance_km: f64,
    pub efficiency_km_per_l: f64,
    pub liters_needed: f64,
    pub price_per_liter: f64,
    pub fuel_cost: f64,
    pub currency: Currency,
    pub fuel_type: FuelType,
    pub vehicle_label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// A route as consumed by the calculator: kilometers and whole minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_min: i64,
    pub geometry: Vec<[f64; 2]>,
    pub steps: Vec<String>,
}

impl RouteSummary {
    pub fn into_context(self, start_name: &str, end_name: &str) -> RouteContext {
        RouteContext {
            start_name: start_name.to_string(),
            end_name: end_name.to_string(),
            distance_km: self.distance_km,
        }
    }
}

/// A geocoder hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceMatch {
    pub name: String,
    pub coordinates: Coordinates,
}

/// A place stored on the user's account.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SavedPlace {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl SavedPlace {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            longitude: self.longitude,
            latitude: self.latitude,
        }
    }
}

/// A place to save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewPlace {
    pub fn new(name: &str, coordinates: Coordinates) -> Result<Self> {
        use crate::utils::validation::validate_entry_text;

        validate_entry_text("name", name)?;
        let Coordinates {
            longitude,
            latitude,
        } = coordinates;
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return Err(FillTripError::InvalidEntry {
                field: "coordinates".to_string(),
                reason: format!("{},{} is not a valid longitude,latitude", longitude, latitude),
            });
        }

        Ok(Self {
            name: name.trim().to_string(),
            latitude,
            longitude,
        })
    }
}

/// Result of saving a place; the service reports places it already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

/// A refuel entry as returned by the persistence service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelLogEntry {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vehicle_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub odometer_km: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub distance_unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liters: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_liter: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_cost: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub station: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: String,
}

impl FuelLogEntry {
    /// Fills the unit and currency defaults the service may leave blank.
    pub fn normalized(mut self) -> Self {
        if self.distance_unit.is_empty() {
            self.distance_unit = "km".to_string();
        }
        if self.fuel_unit.is_empty() {
            self.fuel_unit = "liters".to_string();
        }
        if self.currency.is_empty() {
            self.currency = Currency::Php.code().to_string();
        }
        self
    }
}

/// A saved trip as returned by the persistence service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLogEntry {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_location_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_location_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance_km: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub efficiency_km_per_l: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub liters_needed: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_liter: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fuel_cost: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vehicle_label: String,
}

impl TripLogEntry {
    pub fn normalized(mut self) -> Self {
        if self.currency.is_empty() {
            self.currency = Currency::Php.code().to_string();
        }
        self
    }
}

/// A refuel entry to submit. `total_cost` defaults to `liters * price_per_liter`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFuelLog {
    pub vehicle_name: String,
    pub odometer_km: f64,
    pub distance_unit: String,
    pub liters: f64,
    pub fuel_unit: String,
    pub price_per_liter: f64,
    pub total_cost: f64,
    pub fuel_type: FuelType,
    pub station: String,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl NewFuelLog {
    pub fn new(
        vehicle_name: &str,
        odometer_km: f64,
        liters: f64,
        price_per_liter: f64,
        total_cost: Option<f64>,
    ) -> Result<Self> {
        use crate::utils::validation::{validate_entry_amount, validate_entry_text};

        validate_entry_text("vehicleName", vehicle_name)?;
        validate_entry_amount("odometerKm", odometer_km)?;
        validate_entry_amount("liters", liters)?;
        validate_entry_amount("pricePerLiter", price_per_liter)?;

        Ok(Self {
            vehicle_name: vehicle_name.trim().to_string(),
            odometer_km,
            distance_unit: "km".to_string(),
            liters,
            fuel_unit: "liters".to_string(),
            price_per_liter,
            total_cost: total_cost.unwrap_or(liters * price_per_liter),
            fuel_type: FuelType::default(),
            station: String::new(),
            currency: Currency::default(),
            created_at: Utc::now(),
        })
    }
}

/// Coerces a JSON number or numeric string to `f64`; anything else, and NaN, is 0.
pub fn lenient_number(value: &serde_json::Value) -> f64 {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(lenient_number).unwrap_or(0.0))
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
