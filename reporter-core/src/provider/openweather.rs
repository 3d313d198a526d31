use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{error::WeatherError, model::WeatherPayload};

use super::WeatherSource;

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    endpoint: String,
    http: Client,
}

/// Error body OpenWeather sends along with non-success statuses,
/// e.g. `{"cod": "429", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { endpoint: endpoint.into(), http })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherPayload, WeatherError> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::Config);
        }

        debug!(endpoint = %self.endpoint, city, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(network_error)?;

        let status = res.status();
        let body = res.text().await.map_err(network_error)?;

        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(classify_failure(status, city, &body));
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Decode(e.to_string()))
    }
}

// The request URL carries the API key in its query string.
fn network_error(e: reqwest::Error) -> WeatherError {
    WeatherError::Network(e.without_url().to_string())
}

fn classify_failure(status: StatusCode, city: &str, body: &str) -> WeatherError {
    match status {
        StatusCode::UNAUTHORIZED => WeatherError::Auth,
        StatusCode::NOT_FOUND => WeatherError::NotFound { city: city.to_string() },
        _ => {
            let message = serde_json::from_str::<OwErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Unexpected error.".to_string());

            WeatherError::Api { status: status.as_u16(), message }
        }
    }
}
