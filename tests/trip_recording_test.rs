use anyhow::Result;
use filltrip::core::matcher::search;
use filltrip::{
    compute_fuel_cost, CalculationDraft, HttpPersistence, RouteContext, TripRecorder,
    VehicleCatalog,
};
use httpmock::prelude::*;
use std::sync::Arc;

fn route() -> RouteContext {
    RouteContext {
        start_name: "SM Megamall".to_string(),
        end_name: "Tagaytay Picnic Grove".to_string(),
        distance_km: 60.0,
    }
}

/// Route-planned calculation with a matched vehicle ends up in the trip store.
#[tokio::test]
async fn test_route_calculation_is_saved() -> Result<()> {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/filltrip-db/trips_add.php")
                .header("Authorization", "Bearer token-123")
                .json_body_partial(
                    r#"{
                        "startLocationName": "SM Megamall",
                        "endLocationName": "Tagaytay Picnic Grove",
                        "distanceKm": 60.0,
                        "currency": "PHP",
                        "fuelType": "Diesel",
                        "vehicleLabel": "2016 Mitsubishi Montero Sport"
                    }"#,
                );
            then.status(200)
                .json_body(serde_json::json!({"success": true, "trip": {"id": 99}}));
        })
        .await;

    let catalog = VehicleCatalog::embedded()?;
    let vehicle = search("montero", &catalog)[0].clone();

    let mut draft = CalculationDraft::from_route(&route());
    draft.select_vehicle(&vehicle);
    draft.price_per_liter = "62.50".to_string();
    draft.fuel_type = "Diesel".parse()?;

    let input = draft.to_input()?;
    let result = compute_fuel_cost(&input);
    assert!((result.liters_needed - 6.0).abs() < 1e-9);
    assert!((result.total_cost - 375.0).abs() < 1e-9);

    let store = HttpPersistence::new(&server.url("/filltrip-db")).with_auth_token("token-123");
    let recorder = TripRecorder::new(Arc::new(store));
    let handle = recorder
        .maybe_record_trip(
            &input,
            &result,
            Some(&route()),
            true,
            draft.selected_vehicle.as_ref(),
        )
        .expect("trip should be submitted");
    handle.await?;

    api_mock.assert_async().await;
    Ok(())
}

/// A failing store never turns into an error for the calculation.
#[tokio::test]
async fn test_failed_submission_is_swallowed() -> Result<()> {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/trips_add.php");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let mut draft = CalculationDraft::from_route(&route());
    draft.efficiency = "15".to_string();
    draft.price_per_liter = "56".to_string();
    let input = draft.to_input()?;
    let result = compute_fuel_cost(&input);

    let recorder = TripRecorder::new(Arc::new(HttpPersistence::new(&server.base_url())));
    let handle = recorder
        .maybe_record_trip(&input, &result, Some(&route()), true, None)
        .expect("trip should be submitted");
    handle.await?;

    api_mock.assert_async().await;
    assert!((result.total_cost - 224.0).abs() < 1e-9);
    Ok(())
}

/// Manual entry (no route) never reaches the store.
#[tokio::test]
async fn test_manual_entry_is_not_saved() -> Result<()> {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/trips_add.php");
            then.status(200).json_body(serde_json::json!({"success": true}));
        })
        .await;

    let draft = CalculationDraft {
        distance: "150".to_string(),
        efficiency: "15".to_string(),
        price_per_liter: "56".to_string(),
        ..CalculationDraft::default()
    };
    let input = draft.to_input()?;
    let result = compute_fuel_cost(&input);

    let recorder = TripRecorder::new(Arc::new(HttpPersistence::new(&server.base_url())));
    assert!(recorder
        .maybe_record_trip(&input, &result, None, true, None)
        .is_none());

    api_mock.assert_hits_async(0).await;
    Ok(())
}
