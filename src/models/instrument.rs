//! Instrument and annotation configuration models

use chrono::NaiveDate;
use std::collections::HashMap;

/// A tracked symbol and the human-readable name used in chart titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub description: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            description: description.into(),
        }
    }
}

/// Operator note marking a holding for yield tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub symbol: String,
    pub note: String,
    pub purchase_date: NaiveDate,
}

/// Instruments in batch order
pub type InstrumentConfig = Vec<Instrument>;

/// Annotations keyed by symbol
pub type AnnotationConfig = HashMap<String, Annotation>;
