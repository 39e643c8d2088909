use crate::core::units::{to_km, to_liters_per_100km};
use crate::domain::model::{
    CalculationInput, CalculationResult, Currency, DistanceUnit, EfficiencyUnit, FuelType,
    RouteContext, VehicleRecord,
};
use crate::utils::error::{FillTripError, InputField, Result};
use crate::utils::validation::parse_positive;

/// Liters needed and total cost for a trip.
///
/// Only meaningful when distance, efficiency and price are all finite and
/// positive; [`CalculationDraft::to_input`] is the gate for that.
pub fn compute_fuel_cost(input: &CalculationInput) -> CalculationResult {
    let distance_km = to_km(input.distance_value, input.distance_unit);
    let l100 = to_liters_per_100km(input.efficiency_value, input.efficiency_unit);
    let liters_needed = (distance_km / 100.0) * l100;
    let total_cost = liters_needed * input.price_per_liter;

    tracing::debug!(
        distance_km,
        l100,
        liters_needed,
        total_cost,
        "computed fuel cost"
    );

    CalculationResult {
        liters_needed,
        total_cost,
        currency: input.currency,
    }
}

/// Calculator form state: raw text fields plus unit selections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculationDraft {
    pub distance: String,
    pub distance_unit: DistanceUnit,
    pub efficiency: String,
    pub efficiency_unit: EfficiencyUnit,
    pub price_per_liter: String,
    pub currency: Currency,
    pub fuel_type: FuelType,
    pub selected_vehicle: Option<VehicleRecord>,
}

impl CalculationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a draft whose distance comes from a planned route, always in km.
    pub fn from_route(route: &RouteContext) -> Self {
        Self {
            distance: format!("{:.2}", route.distance_km),
            distance_unit: DistanceUnit::Km,
            ..Self::default()
        }
    }

    /// Fields that block the calculation, in form order.
    pub fn missing_fields(&self) -> Vec<InputField> {
        [
            (InputField::Distance, &self.distance),
            (InputField::Efficiency, &self.efficiency),
            (InputField::FuelPrice, &self.price_per_liter),
        ]
        .into_iter()
        .filter(|(_, text)| parse_positive(text).is_none())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn can_calculate(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn to_input(&self) -> Result<CalculationInput> {
        match (
            parse_positive(&self.distance),
            parse_positive(&self.efficiency),
            parse_positive(&self.price_per_liter),
        ) {
            (Some(distance_value), Some(efficiency_value), Some(price_per_liter)) => {
                Ok(CalculationInput {
                    distance_value,
                    distance_unit: self.distance_unit,
                    efficiency_value,
                    efficiency_unit: self.efficiency_unit,
                    price_per_liter,
                    currency: self.currency,
                    fuel_type: self.fuel_type,
                })
            }
            _ => Err(FillTripError::InvalidInput {
                missing: self.missing_fields(),
            }),
        }
    }

    /// Prefills efficiency (km/L, two decimals) from a catalog vehicle.
    pub fn select_vehicle(&mut self, vehicle: &VehicleRecord) {
        self.efficiency = format!("{:.2}", vehicle.km_per_liter_avg);
        self.efficiency_unit = EfficiencyUnit::KmPerLiter;
        self.selected_vehicle = Some(vehicle.clone());
    }

    pub fn clear_vehicle(&mut self) {
        self.selected_vehicle = None;
        self.efficiency.clear();
    }

    pub fn vehicle_label(&self) -> String {
        self.selected_vehicle
            .as_ref()
            .map(VehicleRecord::label)
            .unwrap_or_default()
    }

    /// Clears the numeric fields and vehicle, keeping unit selections.
    pub fn clear(&mut self) {
        self.distance.clear();
        self.efficiency.clear();
        self.price_per_liter.clear();
        self.selected_vehicle = None;
    }

    /// Back to defaults; the route distance survives a reset.
    pub fn reset(&mut self, route: Option<&RouteContext>) {
        *self = match route {
            Some(route) => Self::from_route(route),
            None => Self::default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::KM_PER_MILE;
    use crate::domain::model::VehicleCategory;

    fn input(distance: f64, unit: DistanceUnit) -> CalculationInput {
        CalculationInput {
            distance_value: distance,
            distance_unit: unit,
            efficiency_value: 15.0,
            efficiency_unit: EfficiencyUnit::KmPerLiter,
            price_per_liter: 56.0,
            currency: Currency::Php,
            fuel_type: FuelType::Unleaded91,
        }
    }

    fn vios() -> VehicleRecord {
        VehicleRecord {
            id: "toyota-vios".to_string(),
            make: "Toyota".to_string(),
            model: "Vios".to_string(),
            typical_years: "2019-2023".to_string(),
            km_per_liter_avg: 15.5,
            category: VehicleCategory::Car,
        }
    }

    #[test]
    fn test_compute_fuel_cost_reference_trip() {
        let result = compute_fuel_cost(&input(150.0, DistanceUnit::Km));
        assert!((result.liters_needed - 10.0).abs() < 1e-9);
        assert!((result.total_cost - 560.0).abs() < 1e-9);
        assert_eq!(result.currency, Currency::Php);
    }

    #[test]
    fn test_miles_and_km_agree() {
        for distance in [1.0, 37.5, 150.0, 1234.56] {
            let km = compute_fuel_cost(&input(distance, DistanceUnit::Km));
            let miles = compute_fuel_cost(&input(distance / KM_PER_MILE, DistanceUnit::Miles));
            assert!((km.liters_needed - miles.liters_needed).abs() < 1e-9);
            assert!((km.total_cost - miles.total_cost).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mpg_input() {
        let mut calc = input(100.0, DistanceUnit::Km);
        calc.efficiency_value = 40.0;
        calc.efficiency_unit = EfficiencyUnit::Mpg;
        calc.currency = Currency::Usd;
        let result = compute_fuel_cost(&calc);
        assert!((result.liters_needed - 5.880).abs() < 1e-3);
        assert_eq!(result.currency, Currency::Usd);
    }

    #[test]
    fn test_draft_lists_missing_fields() {
        let draft = CalculationDraft {
            distance: "150".to_string(),
            efficiency: "0".to_string(),
            price_per_liter: "abc".to_string(),
            ..CalculationDraft::default()
        };
        assert!(!draft.can_calculate());
        assert_eq!(
            draft.missing_fields(),
            vec![InputField::Efficiency, InputField::FuelPrice]
        );
        match draft.to_input() {
            Err(FillTripError::InvalidInput { missing }) => {
                assert_eq!(missing, vec![InputField::Efficiency, InputField::FuelPrice]);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_to_input() {
        let draft = CalculationDraft {
            distance: "150".to_string(),
            efficiency: "15".to_string(),
            price_per_liter: "56".to_string(),
            ..CalculationDraft::default()
        };
        let input = draft.to_input().unwrap();
        assert_eq!(input.distance_value, 150.0);
        assert_eq!(input.distance_unit, DistanceUnit::Km);
        assert_eq!(input.fuel_type, FuelType::Unleaded91);
        assert_eq!(input.currency, Currency::Php);
    }

    #[test]
    fn test_select_vehicle_prefills_efficiency() {
        let mut draft = CalculationDraft {
            efficiency_unit: EfficiencyUnit::Mpg,
            ..CalculationDraft::default()
        };
        draft.select_vehicle(&vios());
        assert_eq!(draft.efficiency, "15.50");
        assert_eq!(draft.efficiency_unit, EfficiencyUnit::KmPerLiter);
        assert_eq!(draft.vehicle_label(), "2019 Toyota Vios");

        draft.clear_vehicle();
        assert!(draft.efficiency.is_empty());
        assert_eq!(draft.vehicle_label(), "");
    }

    #[test]
    fn test_reset_keeps_route_distance() {
        let route = RouteContext {
            start_name: "Makati".to_string(),
            end_name: "Tagaytay".to_string(),
            distance_km: 58.3,
        };
        let mut draft = CalculationDraft::from_route(&route);
        draft.distance_unit = DistanceUnit::Miles;
        draft.currency = Currency::Usd;
        draft.price_per_liter = "56".to_string();

        draft.reset(Some(&route));
        assert_eq!(draft.distance, "58.30");
        assert_eq!(draft.distance_unit, DistanceUnit::Km);
        assert_eq!(draft.currency, Currency::Php);
        assert!(draft.price_per_liter.is_empty());

        draft.reset(None);
        assert_eq!(draft, CalculationDraft::default());
    }
}
