use crate::core::units::{to_km, to_km_per_liter};
use crate::domain::model::{
    CalculationInput, CalculationResult, RouteContext, TripRecord, VehicleRecord,
};
use crate::domain::ports::TripStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Packages a finished calculation for the persistence service.
pub fn build_trip_record(
    input: &CalculationInput,
    result: &CalculationResult,
    route: &RouteContext,
    vehicle: Option<&VehicleRecord>,
) -> TripRecord {
    TripRecord {
        start_name: route.start_name.clone(),
        end_name: route.end_name.clone(),
        distance_km: to_km(input.distance_value, input.distance_unit),
        efficiency_km_per_l: to_km_per_liter(input.efficiency_value, input.efficiency_unit),
        liters_needed: result.liters_needed,
        price_per_liter: input.price_per_liter,
        fuel_cost: result.total_cost,
        currency: result.currency,
        fuel_type: input.fuel_type,
        vehicle_label: vehicle.map(VehicleRecord::label).unwrap_or_default(),
        created_at: Utc::now(),
    }
}

/// Saves route-planned trips in the background. Failures are logged and dropped.
#[derive(Clone)]
pub struct TripRecorder {
    store: Arc<dyn TripStore>,
}

impl TripRecorder {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    /// Spawns the submission when the calculation came from a planned route
    /// and a user is signed in; otherwise does nothing.
    ///
    /// The returned handle may be dropped. Must be called inside a tokio runtime.
    pub fn maybe_record_trip(
        &self,
        input: &CalculationInput,
        result: &CalculationResult,
        route: Option<&RouteContext>,
        is_authenticated: bool,
        vehicle: Option<&VehicleRecord>,
    ) -> Option<JoinHandle<()>> {
        let route = route?;
        if !is_authenticated {
            tracing::debug!("Not signed in, trip not recorded");
            return None;
        }

        let record = build_trip_record(input, result, route, vehicle);
        let store = Arc::clone(&self.store);

        Some(tokio::spawn(async move {
            match store.add_trip(&record).await {
                Ok(()) => tracing::info!(
                    "Trip saved: {} -> {} ({:.1} km)",
                    record.start_name,
                    record.end_name,
                    record.distance_km
                ),
                Err(e) => tracing::warn!(
                    "Failed to save trip {} -> {}: {}",
                    record.start_name,
                    record.end_name,
                    e
                ),
            }
        }))
    }
}
