use crate::errors::Result;
use crate::models::price::{PriceSeries, SourceKind};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Inclusive calendar range requested from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[end - years, end]`
    pub fn years_back(end: NaiveDate, years: u32) -> Self {
        Self::new(crate::util::years_before(end, years), end)
    }
}

/// Base trait for price history sources
#[async_trait]
pub trait HistoryStrategy {
    /// Label of the tier this strategy implements
    fn source_kind(&self) -> SourceKind;

    /// Fetch daily OHLCV history for `symbol` within `range`.
    /// Any error is treated by the chain as a fall-through.
    async fn attempt(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries>;
}
