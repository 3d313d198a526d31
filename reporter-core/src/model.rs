use serde::{Deserialize, Serialize};

/// Raw response body of the weather API, before any field extraction.
pub type WeatherPayload = serde_json::Value;

/// A city name as typed by the user: trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Returns `None` when `raw` is blank after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated observation, as displayed and as stored in the CSV log.
///
/// The serde names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Temperature (C)")]
    pub temperature: String,
    #[serde(rename = "Humidity (%)")]
    pub humidity: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl WeatherRecord {
    pub const HEADERS: [&'static str; 5] =
        ["City", "Country", "Temperature (C)", "Humidity (%)", "Description"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_trims_and_rejects_blank() {
        assert_eq!(CityQuery::parse("  Paris \n").unwrap().as_str(), "Paris");
        assert!(CityQuery::parse("").is_none());
        assert!(CityQuery::parse(" \t \r\n").is_none());
    }

    #[test]
    fn city_query_keeps_inner_whitespace() {
        let city = CityQuery::parse(" New York ").unwrap();
        assert_eq!(city.to_string(), "New York");
    }
}
