use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{PricePoint, PriceSeries};

/// Column names recognised as the closing price, including the
/// `"4. close"` layout of older cache files.
const CLOSE_COLUMNS: &[&str] = &["close", "4. close"];

/// Errors reading or writing a cache file
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No close column in {0}")]
    MissingColumn(String),
    #[error("No usable rows in {0}")]
    Empty(String),
}

/// Per-symbol CSV files under one directory: `{dir}/{symbol}.csv`
#[derive(Debug, Clone)]
pub struct SeriesCache {
    dir: PathBuf,
}

impl SeriesCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    /// Load the cached series for `symbol`.
    ///
    /// Returns `Ok(None)` when no cache file exists. Rows whose date or close
    /// cannot be parsed, or whose close is not positive, are skipped.
    pub fn load(&self, symbol: &str) -> Result<Option<PriceSeries>, CacheError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Ok(None);
        }

        let points = read_points(&path)?;
        if points.is_empty() {
            return Err(CacheError::Empty(path.display().to_string()));
        }

        debug!("Loaded {} cached bars for {} from {}", points.len(), symbol, path.display());
        Ok(Some(PriceSeries::new(symbol, points)))
    }

    /// Write `series` to its cache file, replacing any previous contents
    pub fn store(&self, series: &PriceSeries) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(series.symbol());

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["date", "close"])?;
        for point in series.points() {
            writer.write_record([point.date.format("%Y-%m-%d").to_string(), point.close.to_string()])?;
        }
        writer.flush()?;

        debug!("Cached {} bars for {} at {}", series.len(), series.symbol(), path.display());
        Ok(path)
    }
}

fn read_points(path: &Path) -> Result<Vec<PricePoint>, CacheError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    // The date is the first column whatever its header says
    let close_idx = headers
        .iter()
        .position(|h| CLOSE_COLUMNS.contains(&h.trim()))
        .ok_or_else(|| CacheError::MissingColumn(path.display().to_string()))?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date = record
            .get(0)
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        let close = record
            .get(close_idx)
            .and_then(|c| c.trim().parse::<f64>().ok())
            .filter(|c| *c > 0.0);

        match (date, close) {
            (Some(date), Some(close)) => points.push(PricePoint::new(date, close)),
            _ => warn!("Skipping unusable cache row in {}: {:?}", path.display(), record),
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("market_digest_cache_{}_{}", tag, nanos))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn test_missing_file_is_none() {
        let cache = SeriesCache::new(temp_dir("missing"));
        assert!(cache.load("SPY").expect("load").is_none());
    }

    #[test]
    fn test_store_then_load() {
        let dir = temp_dir("store");
        let cache = SeriesCache::new(&dir);
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::new(date("2024-01-02"), 472.65),
                PricePoint::new(date("2024-01-03"), 468.79),
            ],
        );

        let path = cache.store(&series).expect("store");
        assert_eq!(path, dir.join("SPY.csv"));

        let loaded = cache.load("SPY").expect("load").expect("present");
        assert_eq!(loaded, series);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_reads_legacy_layout_descending() {
        let dir = temp_dir("legacy");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("QQQ.csv"),
            "date,1. open,2. high,3. low,4. close,5. volume\n\
             2024-01-03,1,1,1,400.5,10\n\
             2024-01-02,1,1,1,402.0,10\n\
             not-a-date,1,1,1,1.0,10\n\
             2024-01-01,1,1,1,0,10\n",
        )
        .expect("write");

        let loaded = SeriesCache::new(&dir).load("QQQ").expect("load").expect("present");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.points()[0].date, date("2024-01-02"));
        assert_eq!(loaded.last().map(|p| p.close), Some(400.5));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_close_column() {
        let dir = temp_dir("nocol");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("IWM.csv"), "date,open\n2024-01-02,1\n").expect("write");

        let err = SeriesCache::new(&dir).load("IWM").unwrap_err();
        assert!(matches!(err, CacheError::MissingColumn(_)));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dir = temp_dir("empty");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("EWJ.csv"), "date,close\n").expect("write");

        let err = SeriesCache::new(&dir).load("EWJ").unwrap_err();
        assert!(matches!(err, CacheError::Empty(_)));

        let _ = fs::remove_dir_all(dir);
    }
}
