//! Flattening of the raw API payload into a [`WeatherRecord`].

use serde::Deserialize;
use tracing::debug;

use crate::{WeatherError, WeatherPayload, WeatherRecord};

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
}

/// Validate `payload` and extract the five reported fields.
///
/// Either every field is present with the right type or the whole parse
/// fails with [`WeatherError::Schema`].
pub fn parse_payload(payload: WeatherPayload) -> Result<WeatherRecord, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_value(payload).map_err(|e| {
        debug!(error = %e, "payload rejected");
        WeatherError::Schema
    })?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or(WeatherError::Schema)?;

    Ok(WeatherRecord {
        city: parsed.name,
        country: parsed.sys.country,
        temperature: format!("{:.1}", parsed.main.temp),
        humidity: (parsed.main.humidity as i64).to_string(),
        description,
    })
}
