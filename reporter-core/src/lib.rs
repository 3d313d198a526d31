//! Core library for the `weather-reporter` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The city prompt, weather fetch and payload validation
//! - The append-only CSV log and its summary
//! - The pipeline that ties these together
//!
//! It is used by `reporter-cli`, but the pipeline only needs a reader, a writer
//! and a [`WeatherSource`], so it can be driven from tests or other binaries.

pub mod config;
pub mod csv_log;
pub mod error;
pub mod input;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod provider;

pub use config::Config;
pub use csv_log::{LogSummary, append_record, summarize};
pub use error::WeatherError;
pub use model::{CityQuery, WeatherPayload, WeatherRecord};
pub use parse::parse_payload;
pub use pipeline::{Outcome, Pipeline, Stage};
pub use provider::{OpenWeatherClient, WeatherSource};
