use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{PriceSeries, YieldResult};

/// Length of the trailing window used for the yearly yield
pub const TRAILING_YEAR_DAYS: i64 = 365;

/// Percent change from `purchase_price` to `current_price`, rounded to 2 places.
///
/// `purchase_price` must be non-zero; series prices are always positive.
pub fn calculate_yield(purchase_price: f64, current_price: f64) -> f64 {
    debug_assert!(purchase_price != 0.0, "yield against a zero purchase price");
    round_to_hundredths((current_price - purchase_price) / purchase_price * 100.0)
}

/// Round half away from zero at the second decimal
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Yield of a holding bought on `purchase_date`, measured at the last bar.
///
/// Returns `None` when the series has no bar on exactly `purchase_date`;
/// no neighbouring bar is substituted. The yearly yield is measured from the
/// first bar on or after `today - 365 days` and is `None` when that window
/// holds no bars.
pub fn compute(series: &PriceSeries, purchase_date: NaiveDate, today: NaiveDate) -> Option<YieldResult> {
    let current = series.last()?.close;

    let purchase_price = match series.price_on(purchase_date) {
        Some(price) => price,
        None => {
            debug!("No data available for {} on {}", series.symbol(), purchase_date);
            return None;
        }
    };

    let year_start = today - Duration::days(TRAILING_YEAR_DAYS);
    let yearly_yield_pct = series
        .first_on_or_after(year_start)
        .map(|bar| calculate_yield(bar.close, current));

    Some(YieldResult {
        purchase_price,
        purchase_date,
        yield_since_purchase_pct: calculate_yield(purchase_price, current),
        yearly_yield_pct,
    })
}
