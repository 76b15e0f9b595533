//! Process configuration
//!
//! Secrets and paths come from the environment (optionally via `.env`) and are
//! read once into [`Settings`]. The instrument and annotation tables are static.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::alpha_vantage::OutputSize;
use crate::models::{Annotation, AnnotationConfig, Instrument, InstrumentConfig};

/// Instruments charted on every run, in batch order
pub const INSTRUMENTS: &[(&str, &str)] = &[
    ("SPY", "S&P 500"),
    ("EWJ", "Nikkei 225"),
    ("IWM", "Russell 2000"),
    ("URTH", "MSCI World Index"),
    ("QQQ", "Nasdaq 100"),
];

/// Holdings tracked for yield: (symbol, note, purchase date as `YYYY-MM-DD`)
pub const ANNOTATIONS: &[(&str, &str, &str)] = &[
    ("SPY", "Bought on 2024-01-02", "2024-01-02"),
    ("QQQ", "Bought on 2024-03-15", "2024-03-15"),
];

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_DATA_DIR: &str = "data";

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),
    #[error("Invalid purchase date '{value}' for {symbol}, expected YYYY-MM-DD")]
    InvalidDate { symbol: String, value: String },
    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Everything the batch needs from the environment
#[derive(Clone)]
pub struct Settings {
    pub data_source_api_key: String,
    pub email_service_api_key: String,
    pub recipient_email: String,
    pub sender_email: String,
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
    pub prefer_cache: bool,
    pub output_size: OutputSize,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    ///
    /// Each required key also accepts the older variable name as a fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str, fallback: Option<&str>| {
            get(key)
                .or_else(|| fallback.and_then(|f| get(f)))
                .ok_or(ConfigError::MissingVar(key))
        };

        let data_source_api_key = require("DATA_SOURCE_API_KEY", Some("ALPHA_VANTAGE_API_KEY"))?;
        let email_service_api_key = require("EMAIL_SERVICE_API_KEY", Some("SENDGRID_API_KEY"))?;
        let recipient_email = require("RECIPIENT_EMAIL", None)?;
        let sender_email = require("SENDER_EMAIL", Some("EMAIL_ADDRESS"))?;

        let prefer_cache = match get("PREFER_CACHE") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: "PREFER_CACHE",
                value,
            })?,
            None => true,
        };

        let output_size = match get("DATA_SOURCE_OUTPUT_SIZE") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "DATA_SOURCE_OUTPUT_SIZE",
                value,
            })?,
            // Purchase dates sit well outside the 100-bar compact window
            None => OutputSize::Full,
        };

        Ok(Self {
            data_source_api_key,
            email_service_api_key,
            recipient_email,
            sender_email,
            output_dir: get("OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()).into(),
            data_dir: get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()).into(),
            prefer_cache,
            output_size,
        })
    }
}

// Keys stay out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("data_source_api_key", &"<redacted>")
            .field("email_service_api_key", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .field("sender_email", &self.sender_email)
            .field("output_dir", &self.output_dir)
            .field("data_dir", &self.data_dir)
            .field("prefer_cache", &self.prefer_cache)
            .field("output_size", &self.output_size)
            .finish()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The static instrument table as owned config
pub fn load_instruments() -> InstrumentConfig {
    INSTRUMENTS
        .iter()
        .map(|(symbol, description)| Instrument::new(*symbol, *description))
        .collect()
}

/// The static annotation table with purchase dates parsed
pub fn load_annotations() -> Result<AnnotationConfig, ConfigError> {
    parse_annotations(ANNOTATIONS)
}

/// Parse (symbol, note, purchase date) entries; a malformed date is an error
pub fn parse_annotations(entries: &[(&str, &str, &str)]) -> Result<AnnotationConfig, ConfigError> {
    entries
        .iter()
        .map(|(symbol, note, date)| {
            let purchase_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::InvalidDate {
                    symbol: symbol.to_string(),
                    value: date.to_string(),
                }
            })?;

            Ok((
                symbol.to_string(),
                Annotation {
                    symbol: symbol.to_string(),
                    note: note.to_string(),
                    purchase_date,
                },
            ))
        })
        .collect()
}
