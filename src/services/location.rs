use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use crate::config;
use crate::models::Coordinates;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Free-text address resolver backed by the configured geocoding API.
/// Resolution is an enrichment step: any failure is logged and the
/// caller proceeds without coordinates.
pub struct LocationService {
    client: reqwest::Client,
}

impl LocationService {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    pub async fn resolve(&self, address: &str) -> Option<Coordinates> {
        let settings = &config::config().location;
        if !settings.enabled || address.trim().is_empty() {
            return None;
        }
        match self.lookup(address, settings).await {
            Ok(found) => found,
            Err(err) => {
                warn!(address = %address, error = %err, "Geocoding lookup failed");
                None
            }
        }
    }

    async fn lookup(
        &self,
        address: &str,
        settings: &config::LocationConfig,
    ) -> Result<Option<Coordinates>, reqwest::Error> {
        let response: GeocodeResponse = self
            .client
            .get(&settings.api_url)
            .query(&[("address", address), ("key", settings.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "OK" {
            warn!(address = %address, status = %response.status, "Geocoding returned no match");
            return Ok(None);
        }
        Ok(response.results.into_iter().next().map(|result| Coordinates {
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
            address: result.formatted_address,
            input: address.to_string(),
        }))
    }
}

impl Default for LocationService {
    fn default() -> Self {
        Self::new()
    }
}

pub static LOCATOR: Lazy<LocationService> = Lazy::new(LocationService::new);
