use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading a city name and summarizing the log.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "Missing API key. Set the OPENWEATHER_API_KEY environment variable \
         or run `weather-reporter configure`."
    )]
    Config,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized (HTTP 401): the API key was rejected. Check OPENWEATHER_API_KEY.")]
    Auth,

    #[error("City '{city}' not found.")]
    NotFound { city: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode API response as JSON: {0}")]
    Decode(String),

    #[error("API payload missing expected fields.")]
    Schema,

    #[error("Could not access CSV log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Log failures are reported as warnings; every other category ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WeatherError::Io { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        WeatherError::Io { path: path.into(), source: source.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_io_is_non_fatal() {
        let io = WeatherError::io("city_data.csv", std::io::Error::other("disk full"));
        assert!(!io.is_fatal());

        assert!(WeatherError::Config.is_fatal());
        assert!(WeatherError::Schema.is_fatal());
        assert!(WeatherError::NotFound { city: "Atlantis".into() }.is_fatal());
    }

    #[test]
    fn messages_carry_context() {
        let err = WeatherError::Api { status: 500, message: "Internal error".into() };
        assert_eq!(err.to_string(), "API error (HTTP 500): Internal error");

        let err = WeatherError::NotFound { city: "Atlantis".into() };
        assert!(err.to_string().contains("Atlantis"));

        let err = WeatherError::io("logs/city_data.csv", std::io::Error::other("denied"));
        let msg = err.to_string();
        assert!(msg.contains("logs/city_data.csv"));
        assert!(msg.contains("denied"));

        assert!(WeatherError::Config.to_string().contains("OPENWEATHER_API_KEY"));
    }
}
