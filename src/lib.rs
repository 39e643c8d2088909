pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{DirectionsClient, HttpPersistence, NominatimClient};
pub use config::AppConfig;
pub use core::{
    catalog::VehicleCatalog,
    fuel_cost::{compute_fuel_cost, CalculationDraft},
    log_aggregator::{group_by_month, summarize, LogEntry, LogTotals, MonthGroup},
    matcher::{MatcherConfig, VehicleMatcher},
    trip_recorder::TripRecorder,
};
pub use domain::model::{
    CalculationInput, CalculationResult, Coordinates, Currency, DistanceUnit, EfficiencyUnit,
    FuelType, NewPlace, PlaceMatch, RouteContext, SaveOutcome, SavedPlace, TripRecord,
    VehicleCategory, VehicleRecord,
};
pub use utils::error::{FillTripError, Result};
