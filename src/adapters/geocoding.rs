use crate::domain::model::{Coordinates, PlaceMatch};
use crate::domain::ports::Geocoder;
use crate::utils::error::{FillTripError, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Shorter queries are not sent to the provider.
pub const MIN_QUERY_LEN: usize = 3;

const CLIENT_USER_AGENT: &str = concat!("FillTrip/", env!("CARGO_PKG_VERSION"));

/// Place search against a Nominatim-compatible `search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: String,
    country_codes: String,
    limit: usize,
}

impl NominatimClient {
    pub fn new(endpoint: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            country_codes: "ph".to_string(),
            limit: 5,
        })
    }

    /// Comma-separated ISO codes; empty searches worldwide.
    pub fn with_country_codes(mut self, codes: &str) -> Self {
        self.country_codes = codes.trim().to_string();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Nominatim sends `lat`/`lon` as strings.
fn coordinate(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn place_from(item: &Value) -> Option<PlaceMatch> {
    let name = item.get("display_name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(PlaceMatch {
        name: name.to_string(),
        coordinates: Coordinates {
            longitude: coordinate(item.get("lon"))?,
            latitude: coordinate(item.get("lat"))?,
        },
    })
}

#[async_trait::async_trait]
impl Geocoder for NominatimClient {
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceMatch>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let limit = self.limit.to_string();
        let mut params = vec![("format", "json"), ("limit", limit.as_str())];
        if !self.country_codes.is_empty() {
            params.push(("countrycodes", self.country_codes.as_str()));
        }
        params.push(("q", query));

        tracing::debug!("Searching places for '{}' at {}", query, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "en")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FillTripError::Geocoding {
                message: format!("search service unavailable ({})", status),
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(FillTripError::Geocoding {
                message: "empty response from search service".to_string(),
            });
        }
        let body: Value = serde_json::from_str(&text).map_err(|e| FillTripError::Geocoding {
            message: format!("invalid response format from search service: {}", e),
        })?;

        let Value::Array(items) = body else {
            tracing::warn!("Search service returned a non-list body");
            return Ok(Vec::new());
        };
        let places: Vec<PlaceMatch> = items.iter().filter_map(place_from).collect();
        tracing::debug!("{} of {} search results usable", places.len(), items.len());
        Ok(places)
    }
}
