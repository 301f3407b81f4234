use crate::errors::{ForecastError, Result};
use crate::models::price::{PriceBar, PriceSeries, SourceKind};
use crate::sources::base::{DateRange, HistoryStrategy};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use log::{debug, info};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

const SOURCE_NAME: &str = "yahoo";
const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// 交易所相对 UTC 的秒数
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Vec<AdjCloseData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// 主数据源：Yahoo Finance 日线接口
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(ForecastError::RequestError)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default())).timestamp()
}

/// 代码作为单独的路径段写入，特殊字符会被转义
fn chart_url(base_url: &str, symbol: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ForecastError::unavailable(SOURCE_NAME, format!("bad base url {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ForecastError::unavailable(SOURCE_NAME, format!("base url {} cannot have a path", base_url)))?
        .pop_if_empty()
        .extend(&["v8", "finance", "chart", symbol]);
    Ok(url)
}

/// 解析 chart 接口返回，跳过任一字段缺失的行
pub fn parse_chart(body: &str) -> Result<Vec<PriceBar>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(ForecastError::unavailable(
            SOURCE_NAME,
            format!("{} - {}", error.code, error.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ForecastError::unavailable(SOURCE_NAME, "empty result"))?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::unavailable(SOURCE_NAME, "no quote data"))?;
    let adjclose = data.indicators.adjclose.into_iter().next().map(|a| a.adjclose);
    // 日期按交易所当地时间计算，缺少偏移时按 UTC
    let exchange = data
        .meta
        .and_then(|m| m.gmtoffset)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) else {
            continue;
        };
        let Some(stamp) = exchange.timestamp_opt(ts, 0).single() else {
            continue;
        };
        let adj_close = adjclose.as_ref().and_then(field).unwrap_or(close);

        bars.push(PriceBar {
            date: stamp.date_naive(),
            open,
            high,
            low,
            close,
            volume,
            adj_close,
        });
    }

    Ok(bars)
}

#[async_trait]
impl HistoryStrategy for YahooSource {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Yahoo
    }

    async fn attempt(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        let url = chart_url(&self.base_url, symbol)?;
        // period2 为开区间，向后多取一天
        let period1 = unix_seconds(range.start).to_string();
        let period2 = (unix_seconds(range.end) + 86_400).to_string();
        info!("Fetching Yahoo history for {} ({} ~ {})", symbol, range.start, range.end);

        let response = self
            .client
            .get(url)
            .query(&[
                ("interval", "1d"),
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
            ])
            .send()
            .await?;

        let text = response.text().await?;
        let bars = parse_chart(&text)?;
        debug!("Yahoo returned {} bars for {}", bars.len(), symbol);

        Ok(PriceSeries::from_bars(bars).restrict(range.start, range.end))
    }
}
