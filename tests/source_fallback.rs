use async_trait::async_trait;
use chrono::{Duration as Days, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stock_forecast::sources::base::{DateRange, HistoryStrategy};
use stock_forecast::sources::{synthetic, SharedStrategy};
use stock_forecast::{ForecastError, HistorySource, PriceBar, PriceSeries, Result, SourceKind};

/// 返回固定行数的假数据源，并记录调用次数
struct FixedRows {
    kind: SourceKind,
    rows: usize,
    calls: AtomicUsize,
}

impl FixedRows {
    fn new(kind: SourceKind, rows: usize) -> Arc<Self> {
        Arc::new(Self {
            kind,
            rows,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStrategy for FixedRows {
    fn source_kind(&self) -> SourceKind {
        self.kind
    }

    async fn attempt(&self, _symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bars = (0..self.rows)
            .map(|i| {
                let close = 10.0 + i as f64;
                PriceBar {
                    date: range.start + Days::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1_000.0,
                    adj_close: close,
                }
            })
            .collect();
        Ok(PriceSeries::from_bars(bars))
    }
}

struct Unreachable {
    calls: AtomicUsize,
}

#[async_trait]
impl HistoryStrategy for Unreachable {
    fn source_kind(&self) -> SourceKind {
        SourceKind::AlphaVantage
    }

    async fn attempt(&self, _symbol: &str, _range: &DateRange) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ForecastError::unavailable("alpha_vantage", "dns failure"))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

#[tokio::test]
async fn short_primary_falls_through_to_secondary() {
    let primary = FixedRows::new(SourceKind::Yahoo, 50);
    let secondary = FixedRows::new(SourceKind::AlphaVantage, 150);
    let strategies: Vec<SharedStrategy> = vec![primary.clone(), secondary.clone()];
    let source = HistorySource::new(strategies, 100, Duration::from_secs(5));

    let sourced = source.fetch("IBM", 5, today()).await;

    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
    assert_eq!(sourced.source, SourceKind::AlphaVantage);
    assert_eq!(sourced.series.len(), 150);
}

#[tokio::test]
async fn exactly_min_history_rows_is_rejected() {
    let primary = FixedRows::new(SourceKind::Yahoo, 100);
    let strategies: Vec<SharedStrategy> = vec![primary.clone()];
    let source = HistorySource::new(strategies, 100, Duration::from_secs(5));

    let sourced = source.fetch("IBM", 5, today()).await;

    assert_eq!(primary.calls(), 1);
    assert_eq!(sourced.source, SourceKind::Synthetic);
}

#[tokio::test]
async fn accepted_primary_skips_later_tiers() {
    let primary = FixedRows::new(SourceKind::Yahoo, 101);
    let secondary = FixedRows::new(SourceKind::AlphaVantage, 500);
    let strategies: Vec<SharedStrategy> = vec![primary.clone(), secondary.clone()];
    let source = HistorySource::new(strategies, 100, Duration::from_secs(5));

    let sourced = source.fetch("IBM", 5, today()).await;

    assert_eq!(sourced.source, SourceKind::Yahoo);
    assert_eq!(sourced.series.len(), 101);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn both_live_tiers_failing_still_yields_history() {
    let primary = FixedRows::new(SourceKind::Yahoo, 3);
    let secondary = Arc::new(Unreachable {
        calls: AtomicUsize::new(0),
    });
    let strategies: Vec<SharedStrategy> = vec![primary.clone(), secondary.clone()];
    let source = HistorySource::new(strategies, 100, Duration::from_secs(5));

    for symbol in ["AAA", "B", "GOOGL", "BRK.B", "X1"] {
        let sourced = source.fetch(symbol, 5, today()).await;
        assert_eq!(sourced.source, SourceKind::Synthetic);
        assert!(sourced.series.len() >= 100, "{} has {} rows", symbol, sourced.series.len());
    }
    assert_eq!(secondary.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn synthetic_tier_is_reproducible() {
    let source = HistorySource::new(Vec::new(), 100, Duration::from_secs(5));
    let first = source.fetch("AAA", 5, today()).await;
    let second = source.fetch("AAA", 5, today()).await;

    assert_eq!(first.series, second.series);
    assert_eq!(
        first.series,
        synthetic::generate("AAA", &DateRange::years_back(today(), 5))
    );
}
