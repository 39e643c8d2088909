use crate::core::units::{meters_to_km, seconds_to_minutes};
use crate::domain::model::{Coordinates, RouteSummary};
use crate::domain::ports::RouteProvider;
use crate::utils::error::{FillTripError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    /// meters
    distance: f64,
    /// seconds
    duration: f64,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    maneuver: Maneuver,
}

#[derive(Debug, Deserialize)]
struct Maneuver {
    #[serde(default)]
    instruction: String,
}

/// Driving directions from a Mapbox-compatible endpoint.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl DirectionsClient {
    pub fn new(endpoint: &str, access_token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RouteProvider for DirectionsClient {
    async fn route(&self, start: Coordinates, end: Coordinates) -> Result<RouteSummary> {
        let url = format!(
            "{}/{},{};{},{}",
            self.endpoint, start.longitude, start.latitude, end.longitude, end.latitude
        );
        tracing::debug!("Requesting route: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("geometries", "geojson"),
                ("steps", "true"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are not always JSON; the message is best effort.
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<DirectionsResponse>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("directions request failed ({})", status));
            return Err(FillTripError::Routing { message });
        }

        let body: DirectionsResponse = response.json().await?;

        // Meters/seconds become km/minutes here, before any calculation sees them.
        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| FillTripError::Routing {
                message: "no route found".to_string(),
            })?;

        Ok(RouteSummary {
            distance_km: meters_to_km(route.distance),
            duration_min: seconds_to_minutes(route.duration),
            geometry: route.geometry.map(|g| g.coordinates).unwrap_or_default(),
            steps: route
                .legs
                .into_iter()
                .next()
                .map(|leg| leg.steps.into_iter().map(|s| s.maneuver.instruction).collect())
                .unwrap_or_default(),
        })
    }
}
