//! Chart generation models

use std::path::PathBuf;

/// A chart image that has been written to disk for one instrument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub symbol: String,
    pub path: PathBuf,
}

impl RenderedChart {
    /// File name used when the chart is attached to the digest email
    pub fn file_name(&self) -> String {
        format!("{}.png", self.symbol)
    }
}
