//! On-disk storage for fetched price series

pub mod series_cache;

pub use series_cache::SeriesCache;
