//! Yield models

use chrono::NaiveDate;

/// Purchase-relative and trailing-year yield for one annotated holding.
///
/// Only produced when the series has a bar on the exact purchase date.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldResult {
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    /// Percent change from the purchase bar to the last bar, rounded to 2 places
    pub yield_since_purchase_pct: f64,
    /// Percent change over the trailing year, `None` when no bar falls in that window
    pub yearly_yield_pct: Option<f64>,
}
