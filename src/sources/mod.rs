pub mod alpha_vantage;
pub mod base;
pub mod synthetic;
pub mod yahoo;

use crate::config::Config;
use crate::errors::Result;
use crate::models::price::{PriceSeries, SourcedSeries, SourceKind};
use base::{DateRange, HistoryStrategy};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub type SharedStrategy = Arc<dyn HistoryStrategy + Send + Sync>;

/// 分级数据获取：依次尝试在线数据源，最后一级为合成数据
pub struct HistorySource {
    live: Vec<SharedStrategy>,
    terminal: SharedStrategy,
    min_history: usize,
    attempt_timeout: Duration,
}

impl HistorySource {
    /// 使用自定义在线数据源构建；合成数据源总是作为最后一级
    pub fn new(live: Vec<SharedStrategy>, min_history: usize, attempt_timeout: Duration) -> Self {
        Self {
            live,
            terminal: Arc::new(synthetic::SyntheticSource),
            min_history,
            attempt_timeout,
        }
    }

    /// 根据配置构建 Yahoo -> Alpha Vantage -> 合成数据 的默认链
    pub fn from_config(config: &Config) -> Result<Self> {
        let live: Vec<SharedStrategy> = if config.offline {
            info!("Offline mode: live sources disabled");
            Vec::new()
        } else {
            vec![
                Arc::new(yahoo::YahooSource::new(config.source_timeout)?),
                Arc::new(alpha_vantage::AlphaVantageSource::new(
                    &config.alpha_vantage_api_key,
                    config.source_timeout,
                )?),
            ]
        };

        Ok(Self::new(live, config.min_history, config.source_timeout))
    }

    /// 按尝试顺序列出所有数据源
    pub fn tiers(&self) -> Vec<SourceKind> {
        self.live
            .iter()
            .chain(std::iter::once(&self.terminal))
            .map(|s| s.source_kind())
            .collect()
    }

    /// 获取最近 `years_back` 年的日线数据
    pub async fn fetch(&self, symbol: &str, years_back: u32, today: chrono::NaiveDate) -> SourcedSeries {
        self.fetch_range(symbol, &DateRange::years_back(today, years_back)).await
    }

    /// Never fails: live faults, short results and timeouts fall through to the next tier.
    /// The terminal tier is taken as is, without the row threshold or timeout.
    pub async fn fetch_range(&self, symbol: &str, range: &DateRange) -> SourcedSeries {
        for strategy in &self.live {
            let kind = strategy.source_kind();
            match tokio::time::timeout(self.attempt_timeout, strategy.attempt(symbol, range)).await {
                Ok(Ok(series)) if series.len() > self.min_history => {
                    info!("Using {} history for {}: {} rows", kind, symbol, series.len());
                    return SourcedSeries { source: kind, series };
                }
                Ok(Ok(series)) => {
                    warn!(
                        "{} returned {} rows for {}, need more than {}",
                        kind,
                        series.len(),
                        symbol,
                        self.min_history
                    );
                }
                Ok(Err(e)) => warn!("{} error for {}: {}", kind, symbol, e),
                Err(_) => warn!("{} timed out after {:?} for {}", kind, self.attempt_timeout, symbol),
            }
        }

        let kind = self.terminal.source_kind();
        let series = match self.terminal.attempt(symbol, range).await {
            Ok(series) => series,
            Err(e) => {
                // 下游会按历史不足处理空序列
                error!("{} failed for {}: {}", kind, symbol, e);
                PriceSeries::default()
            }
        };
        if series.len() <= self.min_history {
            warn!(
                "{} history for {} has only {} rows, requested range is too short",
                kind,
                symbol,
                series.len()
            );
        }
        info!("Using {} history for {}: {} rows", kind, symbol, series.len());
        SourcedSeries { source: kind, series }
    }
}
