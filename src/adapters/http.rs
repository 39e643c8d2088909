use crate::domain::model::{
    FuelLogEntry, NewFuelLog, NewPlace, SaveOutcome, SavedPlace, TripLogEntry, TripRecord,
};
use crate::domain::ports::{ConfigProvider, LogSource, PlaceStore, TripStore};
use crate::utils::error::{FillTripError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Response body shared by every persistence endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
    /// Older trip listings use `trips` instead of `items`.
    #[serde(default)]
    trips: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    trip: Option<serde_json::Value>,
    #[serde(default)]
    deleted: Option<bool>,
    #[serde(default)]
    duplicate: Option<bool>,
}

impl ApiEnvelope {
    fn into_items(self) -> Vec<serde_json::Value> {
        self.items.or(self.trips).unwrap_or_default()
    }
}

/// Client for the per-user trip/refuel store.
#[derive(Debug, Clone)]
pub struct HttpPersistence {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpPersistence {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base().trim_end_matches('/').to_string(),
            auth_token: config.auth_token().map(str::to_string),
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_envelope(response: Response) -> Result<ApiEnvelope> {
        let status = response.status();
        tracing::debug!("Persistence response status: {}", status);
        if !status.is_success() {
            return Err(FillTripError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        if !envelope.success {
            return Err(FillTripError::Persistence {
                message: envelope
                    .error
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(envelope)
    }

    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let url = self.url(endpoint);
        tracing::debug!("Making API request to: {}", url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        let envelope = Self::read_envelope(response).await?;
        Ok(decode_items(envelope.into_items(), endpoint))
    }
}

/// Decodes list items one by one; an item that does not fit is logged and skipped.
fn decode_items<T: DeserializeOwned>(items: Vec<serde_json::Value>, endpoint: &str) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Dropping malformed record from {}: {}", endpoint, e);
                None
            }
        })
        .collect();
    tracing::debug!("Decoded {}/{} records from {}", decoded.len(), total, endpoint);
    decoded
}

#[async_trait::async_trait]
impl TripStore for HttpPersistence {
    async fn add_trip(&self, trip: &TripRecord) -> Result<()> {
        let url = self.url("trips_add.php");
        tracing::debug!("Posting trip to: {}", url);
        let response = self
            .authorize(self.client.post(&url))
            .json(trip)
            .send()
            .await?;
        let envelope = Self::read_envelope(response).await?;
        if let Some(saved) = envelope.trip {
            tracing::debug!("Trip stored: {}", saved);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LogSource for HttpPersistence {
    async fn list_fuel_logs(&self) -> Result<Vec<FuelLogEntry>> {
        let entries: Vec<FuelLogEntry> = self.get_list("refuel_list.php").await?;
        Ok(entries.into_iter().map(FuelLogEntry::normalized).collect())
    }

    async fn list_trips(&self) -> Result<Vec<TripLogEntry>> {
        let entries: Vec<TripLogEntry> = self.get_list("trips_list.php").await?;
        Ok(entries.into_iter().map(TripLogEntry::normalized).collect())
    }

    async fn add_fuel_log(&self, entry: &NewFuelLog) -> Result<()> {
        let url = self.url("refuel_add.php");
        let response = self
            .authorize(self.client.post(&url))
            .json(entry)
            .send()
            .await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    async fn delete_fuel_log(&self, id: i64) -> Result<bool> {
        let url = self.url("refuel_delete.php");
        let response = self
            .authorize(self.client.post(&url))
            .form(&[("id", id.to_string())])
            .send()
            .await?;
        let envelope = Self::read_envelope(response).await?;
        Ok(envelope.deleted.unwrap_or(false))
    }
}

#[async_trait::async_trait]
impl PlaceStore for HttpPersistence {
    async fn list_places(&self) -> Result<Vec<SavedPlace>> {
        self.get_list("saved_places_list.php").await
    }

    async fn add_place(&self, place: &NewPlace) -> Result<SaveOutcome> {
        let url = self.url("saved_places_add.php");
        tracing::debug!("Saving place '{}' to: {}", place.name, url);
        let response = self
            .authorize(self.client.post(&url))
            .json(place)
            .send()
            .await?;
        let envelope = Self::read_envelope(response).await?;
        if envelope.duplicate.unwrap_or(false) {
            return Ok(SaveOutcome::AlreadySaved);
        }
        Ok(SaveOutcome::Saved)
    }

    async fn delete_place(&self, id: i64) -> Result<bool> {
        let url = self.url("saved_places_delete.php");
        let response = self
            .authorize(self.client.post(&url))
            .json(&serde_json::json!({ "id": id }))
            .send()
            .await?;
        let envelope = Self::read_envelope(response).await?;
        Ok(envelope.deleted.unwrap_or(false))
    }
}
