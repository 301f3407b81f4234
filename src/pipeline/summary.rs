use crate::models::forecast::{ForecastResult, HistoricalFit, NextWeek, PastWeek};
use crate::models::price::{PriceSeries, SourcedSeries};
use crate::util;
use chrono::NaiveDate;

pub const TRAILING_DAYS: usize = 7;

/// 最近一周收盘价及涨跌幅
pub fn past_week(series: &PriceSeries) -> PastWeek {
    let tail = series.tail(TRAILING_DAYS);
    let dates: Vec<NaiveDate> = tail.iter().map(|b| b.date).collect();
    let prices: Vec<f64> = tail.iter().map(|b| b.close).collect();
    let change_percent = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => util::percent_change(*first, *last),
        _ => 0.0,
    };

    PastWeek {
        dates: util::format_dates(&dates),
        prices,
        change_percent,
    }
}

/// 预测周：日期从 `today` 的下一天起只取工作日，与历史序列的日期无关
pub fn next_week(today: NaiveDate, predictions: Vec<f64>, current_price: f64) -> NextWeek {
    let dates = util::next_business_days(today, predictions.len());
    let change_percent = predictions
        .last()
        .map(|last| util::percent_change(current_price, *last))
        .unwrap_or(0.0);

    NextWeek {
        dates: util::format_dates(&dates),
        predictions,
        change_percent,
    }
}

pub fn assemble(
    symbol: &str,
    sourced: &SourcedSeries,
    predictions: Vec<f64>,
    today: NaiveDate,
    diagnostics: Option<HistoricalFit>,
) -> ForecastResult {
    let past_week = past_week(&sourced.series);
    let current_price = past_week.prices.last().copied().unwrap_or(0.0);
    let next_week = next_week(today, predictions, current_price);

    ForecastResult {
        success: true,
        company_name: symbol.to_string(),
        stock_symbol: symbol.to_string(),
        source: sourced.source,
        current_price,
        past_week,
        next_week,
        diagnostics,
    }
}
