use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::models::PricePoint;

/// How much history `TIME_SERIES_DAILY` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 bars
    Compact,
    /// Full available history
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("Unknown output size: '{}'. Use: compact, full", other)),
        }
    }
}

/// Response from `function=TIME_SERIES_DAILY`.
///
/// Alpha Vantage answers 200 even for failures and reports them in one of
/// `Error Message`, `Note` or `Information`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    #[serde(rename = "Meta Data")]
    pub meta_data: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaData {
    #[serde(rename = "2. Symbol")]
    pub symbol: String,
    #[serde(rename = "3. Last Refreshed")]
    pub last_refreshed: String,
}

/// One daily bar; Alpha Vantage encodes every number as a string.
/// Only the close is charted.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "4. close")]
    pub close: String,
}

impl DailyResponse {
    /// Convert to closing prices, surfacing any in-body provider error
    pub fn into_points(self) -> Result<Vec<PricePoint>, ApiError> {
        if let Some(message) = self.error_message {
            return Err(ApiError::Provider(message));
        }
        if let Some(note) = self.note {
            return Err(ApiError::RateLimited(note));
        }

        let time_series = match (self.time_series, self.information) {
            (Some(series), _) => series,
            (None, Some(info)) => return Err(ApiError::Provider(info)),
            (None, None) => {
                return Err(ApiError::DeserializationError(
                    "Response has no daily time series".to_string(),
                ))
            }
        };

        time_series
            .into_iter()
            .map(|(day, bar)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    ApiError::DeserializationError(format!("Bad bar date '{}': {}", day, e))
                })?;
                let close = bar.close.trim().parse::<f64>().map_err(|e| {
                    ApiError::DeserializationError(format!(
                        "Bad close '{}' on {}: {}",
                        bar.close, day, e
                    ))
                })?;
                Ok(PricePoint::new(date, close))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "SPY",
            "3. Last Refreshed": "2024-01-03",
            "4. Output Size": "Compact",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2024-01-03": {"1. open": "470.4300", "2. high": "471.1900", "3. low": "468.1700", "4. close": "468.7900", "5. volume": "103585873"},
            "2024-01-02": {"1. open": "472.1600", "2. high": "473.6700", "3. low": "470.4900", "4. close": "472.6500", "5. volume": "123623727"}
        }
    }"#;

    #[test]
    fn test_parse_daily_series() {
        let response: DailyResponse = serde_json::from_str(DAILY).expect("valid json");
        assert_eq!(response.meta_data.as_ref().map(|m| m.symbol.as_str()), Some("SPY"));

        let points = response.into_points().expect("points");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"));
        assert_eq!(points[0].close, 472.65);
        assert_eq!(points[1].close, 468.79);
    }

    #[test]
    fn test_error_message_body() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let response: DailyResponse = serde_json::from_str(body).expect("valid json");
        assert!(matches!(response.into_points(), Err(ApiError::Provider(_))));
    }

    #[test]
    fn test_note_is_rate_limit() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let response: DailyResponse = serde_json::from_str(body).expect("valid json");
        assert!(matches!(response.into_points(), Err(ApiError::RateLimited(_))));
    }

    #[test]
    fn test_information_without_series() {
        let body = r#"{"Information": "This is a premium endpoint."}"#;
        let response: DailyResponse = serde_json::from_str(body).expect("valid json");
        assert!(matches!(response.into_points(), Err(ApiError::Provider(_))));
    }

    #[test]
    fn test_bad_close_value() {
        let body = r#"{"Time Series (Daily)": {"2024-01-02": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "n/a", "5. volume": "1"}}}"#;
        let response: DailyResponse = serde_json::from_str(body).expect("valid json");
        assert!(matches!(
            response.into_points(),
            Err(ApiError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_output_size_parse() {
        assert_eq!("FULL".parse::<OutputSize>(), Ok(OutputSize::Full));
        assert_eq!("compact".parse::<OutputSize>(), Ok(OutputSize::Compact));
        assert!("weekly".parse::<OutputSize>().is_err());
    }
}
