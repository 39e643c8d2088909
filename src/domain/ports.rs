use crate::domain::model::{
    Coordinates, FuelLogEntry, NewFuelLog, NewPlace, PlaceMatch, RouteSummary, SaveOutcome,
    SavedPlace, TripLogEntry, TripRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Write side of the persistence service used by the trip recorder.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn add_trip(&self, trip: &TripRecord) -> Result<()>;
}

/// Read side of the persistence service feeding the log aggregator.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn list_fuel_logs(&self) -> Result<Vec<FuelLogEntry>>;
    async fn list_trips(&self) -> Result<Vec<TripLogEntry>>;
    async fn add_fuel_log(&self, entry: &NewFuelLog) -> Result<()>;
    async fn delete_fuel_log(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, start: Coordinates, end: Coordinates) -> Result<RouteSummary>;
}

/// Saved places on the persistence service.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    async fn list_places(&self) -> Result<Vec<SavedPlace>>;
    async fn add_place(&self, place: &NewPlace) -> Result<SaveOutcome>;
    async fn delete_place(&self, id: i64) -> Result<bool>;
}

/// Free-text place search.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Queries too short to search yield no matches and no request.
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceMatch>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64;
}
