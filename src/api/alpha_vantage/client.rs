use reqwest::Client as HttpClient;
use tracing::debug;

use super::models::{DailyResponse, OutputSize};
use crate::api::ApiError;
use crate::models::PricePoint;

/// Alpha Vantage REST client for daily price history
pub struct AlphaVantageClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    output_size: OutputSize,
}

impl AlphaVantageClient {
    const DEFAULT_BASE_URL: &'static str = "https://www.alphavantage.co";

    /// Create a new Alpha Vantage client
    pub fn new(api_key: String, output_size: OutputSize) -> Self {
        Self::with_base_url(api_key, output_size, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_key: String, output_size: OutputSize, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url,
            output_size,
        }
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }

    /// GET /query?function=TIME_SERIES_DAILY
    ///
    /// Returns the closing price of every bar in the response, oldest first.
    pub async fn get_daily(&self, symbol: &str) -> Result<Vec<PricePoint>, ApiError> {
        debug!("Requesting daily series for {} ({})", symbol, self.output_size);

        let response = self
            .http_client
            .get(self.query_url())
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", self.output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let body = response
            .json::<DailyResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?;

        if let Some(meta) = &body.meta_data {
            debug!("{} last refreshed {}", meta.symbol, meta.last_refreshed);
        }

        body.into_points()
    }
}
