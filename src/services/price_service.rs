use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::alpha_vantage::AlphaVantageClient;
use crate::api::ApiError;
use crate::models::{PricePoint, PriceSeries};
use crate::store::SeriesCache;

/// Neither the cache nor the remote provider produced bars for a symbol
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
}

/// Remote daily-close provider
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn daily_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, ApiError>;
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    async fn daily_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, ApiError> {
        self.get_daily(symbol).await
    }
}

/// Supplies the daily series for one symbol
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str, prefer_cache: bool) -> Result<PriceSeries, SourceError>;
}

/// Price source that reads the local cache first when asked to and otherwise
/// fetches remotely, refreshing the cache after every successful fetch
pub struct CachedPriceSource<P> {
    provider: P,
    cache: SeriesCache,
}

impl<P: QuoteProvider> CachedPriceSource<P> {
    pub fn new(provider: P, cache: SeriesCache) -> Self {
        Self { provider, cache }
    }
}

#[async_trait]
impl<P: QuoteProvider> PriceSource for CachedPriceSource<P> {
    async fn fetch(&self, symbol: &str, prefer_cache: bool) -> Result<PriceSeries, SourceError> {
        if prefer_cache {
            match self.cache.load(symbol) {
                Ok(Some(series)) => {
                    info!("Using cached data for {} ({} bars)", symbol, series.len());
                    return Ok(series);
                }
                Ok(None) => info!("Local data not found for {}", symbol),
                Err(e) => warn!("Cached data for {} unusable, fetching remotely: {}", symbol, e),
            }
        }

        let points = self
            .provider
            .daily_closes(symbol)
            .await
            .map_err(|e| SourceError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let series = PriceSeries::new(symbol, points);
        if series.is_empty() {
            return Err(SourceError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "provider returned no bars".to_string(),
            });
        }

        info!("Fetched {} bars for {}", series.len(), symbol);

        if let Err(e) = self.cache.store(&series) {
            warn!("Failed to cache data for {}: {}", symbol, e);
        }

        Ok(series)
    }
}
