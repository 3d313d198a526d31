use crate::{WeatherError, WeatherPayload};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Something that can answer "what is the weather in this city right now".
///
/// Implementations perform at most one request per call and never retry.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherPayload, WeatherError>;
}
