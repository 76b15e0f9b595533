//! Daily price series models

use chrono::NaiveDate;

/// One daily closing price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for one symbol, sorted ascending by date with unique dates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from bars in any order.
    ///
    /// Bars with a zero, negative or non-finite close are dropped. The rest are
    /// sorted by date; when a date repeats only the first bar is kept.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.retain(|p| p.close.is_finite() && p.close > 0.0);
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent bar
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing price on exactly `date`
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].close)
    }

    /// Bars dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> &[PricePoint] {
        let idx = self.points.partition_point(|p| p.date < start);
        &self.points[idx..]
    }

    /// First bar dated on or after `start`
    pub fn first_on_or_after(&self, start: NaiveDate) -> Option<&PricePoint> {
        self.since(start).first()
    }

    /// The `n`th bar counting back from the end (1 is the last bar).
    ///
    /// Clamps to the first bar when the series is shorter than `n`.
    pub fn nth_from_end(&self, n: usize) -> Option<&PricePoint> {
        if self.points.is_empty() {
            return None;
        }
        let idx = self.points.len().saturating_sub(n.max(1));
        self.points.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn sample() -> PriceSeries {
        PriceSeries::new(
            "SPY",
            vec![
                PricePoint::new(date("2024-01-03"), 102.0),
                PricePoint::new(date("2024-01-01"), 100.0),
                PricePoint::new(date("2024-01-02"), 101.0),
            ],
        )
    }

    #[test]
    fn test_new_sorts_ascending() {
        let series = sample();
        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]);
        assert_eq!(series.last().map(|p| p.close), Some(102.0));
    }

    #[test]
    fn test_new_drops_repeated_dates() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::new(date("2024-01-01"), 100.0),
                PricePoint::new(date("2024-01-01"), 999.0),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.price_on(date("2024-01-01")), Some(100.0));
    }

    #[test]
    fn test_new_drops_non_positive_closes() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::new(date("2024-01-02"), 0.0),
                PricePoint::new(date("2024-01-03"), 470.0),
                PricePoint::new(date("2024-01-04"), -1.5),
                PricePoint::new(date("2024-01-05"), f64::NAN),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.price_on(date("2024-01-02")), None);
        assert_eq!(series.price_on(date("2024-01-03")), Some(470.0));
    }

    #[test]
    fn test_price_on_requires_exact_date() {
        let series = sample();
        assert_eq!(series.price_on(date("2024-01-02")), Some(101.0));
        assert_eq!(series.price_on(date("2024-01-04")), None);
        assert_eq!(series.price_on(date("2023-12-31")), None);
    }

    #[test]
    fn test_since_and_first_on_or_after() {
        let series = sample();
        assert_eq!(series.since(date("2024-01-02")).len(), 2);
        assert!(series.since(date("2024-02-01")).is_empty());
        assert_eq!(
            series.first_on_or_after(date("2023-06-01")).map(|p| p.close),
            Some(100.0)
        );
        assert!(series.first_on_or_after(date("2024-01-04")).is_none());
    }

    #[test]
    fn test_nth_from_end_clamps() {
        let series = sample();
        assert_eq!(series.nth_from_end(1).map(|p| p.close), Some(102.0));
        assert_eq!(series.nth_from_end(2).map(|p| p.close), Some(101.0));
        assert_eq!(series.nth_from_end(40).map(|p| p.close), Some(100.0));

        let empty = PriceSeries::new("SPY", Vec::new());
        assert!(empty.nth_from_end(20).is_none());
    }
}
