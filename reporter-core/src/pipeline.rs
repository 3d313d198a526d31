//! The linear run: read a city, fetch, parse, report, persist, summarize.

use std::{
    fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use tracing::{debug, warn};

use crate::{
    WeatherError, WeatherRecord, csv_log, input::prompt_city, parse::parse_payload,
    provider::WeatherSource,
};

/// Where the run currently is. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CollectingInput,
    Fetching,
    Parsing,
    Reporting,
    Persisting,
    Summarizing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CollectingInput => "collecting input",
            Stage::Fetching => "fetching",
            Stage::Parsing => "parsing",
            Stage::Reporting => "reporting",
            Stage::Persisting => "persisting",
            Stage::Summarizing => "summarizing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a run stopped before producing a record.
#[derive(Debug)]
pub enum Failure {
    /// Input ended before a city name was entered.
    InputClosed,
    Weather(WeatherError),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::InputClosed => f.write_str("No city name entered before input ended."),
            Failure::Weather(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The record was fetched and reported. `persisted` is false when the log
    /// write was downgraded to a warning.
    Done { record: WeatherRecord, persisted: bool },
    Failed { stage: Stage, failure: Failure },
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Done { .. } => 0,
            Outcome::Failed { .. } => 1,
        }
    }
}

/// Render the report block for one record.
pub fn format_report(record: &WeatherRecord) -> String {
    format!(
        "Current weather for {}, {}:\n  Temperature: {} °C\n  Humidity: {}%\n  Description: {}",
        record.city, record.country, record.temperature, record.humidity, record.description
    )
}

#[derive(Debug)]
pub struct Pipeline<'a> {
    source: &'a dyn WeatherSource,
    api_key: String,
    csv_path: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn WeatherSource, api_key: Option<String>, csv_path: PathBuf) -> Self {
        Self { source, api_key: api_key.unwrap_or_default(), csv_path }
    }

    /// Run once against the given streams. Errors returned here are failures to
    /// write to `output` itself; pipeline failures are reported in the outcome.
    pub async fn run<R, W>(&self, input: &mut R, output: &mut W) -> io::Result<Outcome>
    where
        R: BufRead,
        W: Write,
    {
        let mut stage = Stage::CollectingInput;
        debug!(%stage, "entering stage");
        let Some(city) = prompt_city(input, output)? else {
            return fail(output, stage, Failure::InputClosed);
        };

        stage = Stage::Fetching;
        debug!(%stage, city = %city, "entering stage");
        let payload = match self.source.fetch(city.as_str(), &self.api_key).await {
            Ok(payload) => payload,
            Err(err) => return fail(output, stage, Failure::Weather(err)),
        };

        stage = Stage::Parsing;
        debug!(%stage, "entering stage");
        let record = match parse_payload(payload) {
            Ok(record) => record,
            Err(err) => return fail(output, stage, Failure::Weather(err)),
        };

        stage = Stage::Reporting;
        debug!(%stage, "entering stage");
        writeln!(output)?;
        writeln!(output, "{}", format_report(&record))?;

        stage = Stage::Persisting;
        debug!(%stage, path = %self.csv_path.display(), "entering stage");
        let persisted = match csv_log::append_record(&record, &self.csv_path) {
            Ok(()) => {
                writeln!(output, "\nSaved to {}", self.csv_path.display())?;
                true
            }
            Err(err) => {
                warn_user(output, &err)?;
                false
            }
        };

        stage = Stage::Summarizing;
        debug!(%stage, "entering stage");
        match csv_log::summarize(&self.csv_path) {
            Ok(Some(summary)) => writeln!(output, "\nCSV Summary:\n{summary}")?,
            Ok(None) => {}
            Err(err) => warn_user(output, &err)?,
        }

        stage = Stage::Done;
        debug!(%stage, persisted, "run finished");
        Ok(Outcome::Done { record, persisted })
    }
}

fn fail<W: Write>(output: &mut W, stage: Stage, failure: Failure) -> io::Result<Outcome> {
    debug!(%stage, error = %failure, "run failed");
    writeln!(output, "[ERROR] {failure}")?;
    Ok(Outcome::Failed { stage, failure })
}

fn warn_user<W: Write>(output: &mut W, err: &WeatherError) -> io::Result<()> {
    warn!(error = %err, "log file operation failed");
    writeln!(output, "[WARNING] {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OpenWeatherClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{fs, io::Cursor, time::Duration};
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, query_param},
    };

    const HEADER: &str = "City,Country,Temperature (C),Humidity (%),Description";

    fn london() -> serde_json::Value {
        json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 15.0, "humidity": 70 },
            "weather": [{ "description": "overcast clouds" }]
        })
    }

    async fn serve(status: u16, body: serde_json::Value) -> (MockServer, OpenWeatherClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        let client = OpenWeatherClient::new(
            format!("{}/data/2.5/weather", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap();
        (server, client)
    }

    async fn run_with(pipeline: &Pipeline<'_>, input: &str) -> (Outcome, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let outcome = pipeline.run(&mut reader, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn successful_run_reports_persists_and_summarizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&server)
            .await;
        let client = OpenWeatherClient::new(
            format!("{}/data/2.5/weather", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("city_data.csv");
        let pipeline = Pipeline::new(&client, Some("KEY".into()), csv_path.clone());

        let (outcome, out) = run_with(&pipeline, "  \nLondon\n").await;

        assert_eq!(outcome.exit_code(), 0);
        assert!(matches!(outcome, Outcome::Done { persisted: true, .. }));
        assert!(out.contains(
            "Current weather for London, GB:\n  Temperature: 15.0 °C\n  Humidity: 70%\n  Description: overcast clouds\n"
        ));
        assert!(out.contains("City name cannot be empty. Please try again."));
        assert!(out.contains("CSV Summary:\nTotal entries: 1\n- London — 15.0 °C"));
        assert!(!out.contains("[ERROR]"));

        let text = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text, format!("{HEADER}\nLondon,GB,15.0,70,overcast clouds\n"));
    }

    #[tokio::test]
    async fn repeated_runs_accumulate_in_summary() {
        let (_server, client) = serve(200, london()).await;
        let dir = TempDir::new().unwrap();
        let pipeline =
            Pipeline::new(&client, Some("KEY".into()), dir.path().join("city_data.csv"));

        run_with(&pipeline, "London\n").await;
        let (_, out) = run_with(&pipeline, "London\n").await;

        assert!(out.contains("Total entries: 2\n- London — 15.0 °C\n- London — 15.0 °C"));
    }

    #[tokio::test]
    async fn not_found_fails_without_touching_log() {
        let (_server, client) = serve(404, json!({ "cod": "404", "message": "city not found" })).await;
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("city_data.csv");
        let pipeline = Pipeline::new(&client, Some("KEY".into()), csv_path.clone());

        let (outcome, out) = run_with(&pipeline, "Atlantis\n").await;

        assert_eq!(outcome.exit_code(), 1);
        assert!(matches!(outcome, Outcome::Failed { stage: Stage::Fetching, .. }));
        assert!(out.contains("[ERROR] City 'Atlantis' not found."));
        assert!(!out.contains("CSV Summary"));
        assert!(!csv_path.exists());
    }

    #[tokio::test]
    async fn missing_key_fails_at_fetch() {
        let (_server, client) = serve(200, london()).await;
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(&client, None, dir.path().join("city_data.csv"));

        let (outcome, out) = run_with(&pipeline, "London\n").await;

        assert!(matches!(
            outcome,
            Outcome::Failed { stage: Stage::Fetching, failure: Failure::Weather(WeatherError::Config) }
        ));
        assert!(out.contains("[ERROR] Missing API key."));
    }

    #[tokio::test]
    async fn incomplete_payload_fails_at_parse() {
        let mut payload = london();
        payload["main"].as_object_mut().unwrap().remove("humidity");
        let (_server, client) = serve(200, payload).await;
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("city_data.csv");
        let pipeline = Pipeline::new(&client, Some("KEY".into()), csv_path.clone());

        let (outcome, out) = run_with(&pipeline, "London\n").await;

        assert!(matches!(outcome, Outcome::Failed { stage: Stage::Parsing, .. }));
        assert!(out.contains("[ERROR] API payload missing expected fields."));
        assert!(!out.contains("Current weather"));
        assert!(!csv_path.exists());
    }

    #[tokio::test]
    async fn log_failure_is_only_a_warning() {
        let (_server, client) = serve(200, london()).await;
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("missing_dir").join("city_data.csv");
        let pipeline = Pipeline::new(&client, Some("KEY".into()), csv_path);

        let (outcome, out) = run_with(&pipeline, "London\n").await;

        assert_eq!(outcome.exit_code(), 0);
        assert!(matches!(outcome, Outcome::Done { persisted: false, .. }));
        assert!(out.contains("Current weather for London, GB:"));
        assert!(out.contains("[WARNING] Could not access CSV log"));
        assert!(!out.contains("[ERROR]"));
        assert!(!out.contains("CSV Summary"));
    }

    #[tokio::test]
    async fn closed_input_fails_before_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(0)
            .mount(&server)
            .await;
        let client = OpenWeatherClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(&client, Some("KEY".into()), dir.path().join("log.csv"));

        let (outcome, out) = run_with(&pipeline, "\n\n").await;

        assert_eq!(outcome.exit_code(), 1);
        assert!(matches!(
            outcome,
            Outcome::Failed { stage: Stage::CollectingInput, failure: Failure::InputClosed }
        ));
        assert!(out.contains("[ERROR] No city name entered"));
    }

    #[test]
    fn report_block_layout() {
        let record = WeatherRecord {
            city: "Paris".into(),
            country: "FR".into(),
            temperature: "18.5".into(),
            humidity: "60".into(),
            description: "clear sky".into(),
        };

        assert_eq!(
            format_report(&record),
            "Current weather for Paris, FR:\n  Temperature: 18.5 °C\n  Humidity: 60%\n  Description: clear sky"
        );
    }
}
