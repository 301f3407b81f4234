use crate::errors::{ForecastError, Result};
use crate::models::price::{PriceBar, PriceSeries, SourceKind};
use crate::sources::base::{DateRange, HistoryStrategy};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const SOURCE_NAME: &str = "alpha_vantage";
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const SERIES_KEY: &str = "Time Series (Daily)";

/// 供应商字段名到标准字段名的映射
const COLUMN_MAP: [(&str, &str); 5] = [
    ("1. open", "Open"),
    ("2. high", "High"),
    ("3. low", "Low"),
    ("4. close", "Close"),
    ("5. volume", "Volume"),
];

/// 备用数据源：Alpha Vantage 日线接口
pub struct AlphaVantageSource {
    client: Client,
    api_key: String,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
    request_interval: Duration,
}

impl AlphaVantageSource {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForecastError::RequestError)?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            last_request: Mutex::new(None),
            request_interval: Duration::from_millis(1000),
        })
    }

    // 免费额度有频率限制
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(time) = *last {
            let elapsed = time.elapsed();
            if elapsed < self.request_interval {
                let wait = self.request_interval - elapsed;
                debug!("Waiting {:?} for Alpha Vantage rate limit", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// 把一条供应商记录改名为标准字段并转换为浮点数
fn canonical_row(native: &serde_json::Map<String, Value>) -> Result<HashMap<&'static str, f64>> {
    let mut row = HashMap::with_capacity(COLUMN_MAP.len() + 1);
    for (native_key, canonical) in COLUMN_MAP {
        let raw = native
            .get(native_key)
            .ok_or_else(|| ForecastError::unavailable(SOURCE_NAME, format!("missing field {}", native_key)))?;
        let value = match raw {
            Value::String(s) => s.trim().parse::<f64>().map_err(|e| {
                ForecastError::unavailable(SOURCE_NAME, format!("{} is not numeric: {}", native_key, e))
            })?,
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ForecastError::unavailable(SOURCE_NAME, format!("{} out of range", native_key)))?,
            other => {
                return Err(ForecastError::unavailable(
                    SOURCE_NAME,
                    format!("{} has unexpected value {}", native_key, other),
                ))
            }
        };
        row.insert(canonical, value);
    }
    let close = row["Close"];
    row.insert("Adj Close", close);
    Ok(row)
}

/// 解析 `TIME_SERIES_DAILY` 返回并限制在请求的日期范围内
pub fn parse_daily(json: &Value, range: &DateRange) -> Result<PriceSeries> {
    let series = json.get(SERIES_KEY).and_then(|s| s.as_object()).ok_or_else(|| {
        // 超出频率限制时接口返回 Note / Information 字段
        let note = json
            .get("Note")
            .or_else(|| json.get("Information"))
            .or_else(|| json.get("Error Message"))
            .and_then(|v| v.as_str())
            .unwrap_or("missing daily time series");
        ForecastError::unavailable(SOURCE_NAME, note)
    })?;

    let mut bars = Vec::with_capacity(series.len());
    for (date_str, record) in series {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;
        if date < range.start || date > range.end {
            continue;
        }
        let record = record
            .as_object()
            .ok_or_else(|| ForecastError::unavailable(SOURCE_NAME, format!("malformed record for {}", date_str)))?;
        let row = canonical_row(record)?;

        bars.push(PriceBar {
            date,
            open: row["Open"],
            high: row["High"],
            low: row["Low"],
            close: row["Close"],
            volume: row["Volume"],
            adj_close: row["Adj Close"],
        });
    }

    Ok(PriceSeries::from_bars(bars))
}

#[async_trait]
impl HistoryStrategy for AlphaVantageSource {
    fn source_kind(&self) -> SourceKind {
        SourceKind::AlphaVantage
    }

    async fn attempt(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        info!("Fetching Alpha Vantage history for {}", symbol);

        self.wait_for_rate_limit().await;

        let response = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let json: Value = response.json().await?;
        let series = parse_daily(&json, range)?;
        debug!("Alpha Vantage returned {} bars for {}", series.len(), symbol);

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn remaps_coerces_filters_and_sorts() {
        let payload = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-03-08": { "1. open": "101.0", "2. high": "103.5", "3. low": "100.0", "4. close": "102.25", "5. volume": "4500" },
                "2024-03-06": { "1. open": "99.0", "2. high": "100.5", "3. low": "98.0", "4. close": "100.0", "5. volume": "3000" },
                "2024-03-07": { "1. open": "100.0", "2. high": "101.5", "3. low": "99.5", "4. close": "101.0", "5. volume": "3500" },
                "2023-12-29": { "1. open": "90.0", "2. high": "91.0", "3. low": "89.0", "4. close": "90.5", "5. volume": "1000" }
            }
        });

        let range = DateRange::new(ymd(2024, 1, 1), ymd(2024, 3, 8));
        let series = parse_daily(&payload, &range).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[0].date, ymd(2024, 3, 6));
        assert_eq!(series.closes(), vec![100.0, 101.0, 102.25]);
        let last = series.last().unwrap();
        assert_eq!(last.open, 101.0);
        assert_eq!(last.high, 103.5);
        assert_eq!(last.volume, 4500.0);
        assert_eq!(last.adj_close, last.close);
    }

    #[test]
    fn rate_limit_note_is_a_fault() {
        let payload = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." });
        let range = DateRange::new(ymd(2024, 1, 1), ymd(2024, 3, 8));
        match parse_daily(&payload, &range) {
            Err(ForecastError::SourceUnavailable { reason, .. }) => assert!(reason.contains("frequency")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_value_is_a_fault() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-03-08": { "1. open": "n/a", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1" }
            }
        });
        let range = DateRange::new(ymd(2024, 1, 1), ymd(2024, 3, 8));
        assert!(parse_daily(&payload, &range).is_err());
    }
}
