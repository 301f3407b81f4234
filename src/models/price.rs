use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: f64,
}

/// 数据来源标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Yahoo,
    AlphaVantage,
    Synthetic,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Yahoo => "yahoo",
            SourceKind::AlphaVantage => "alpha_vantage",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Daily price history, strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 按日期升序排序并去除重复日期（保留最后出现的记录）
    pub fn from_bars(mut bars: Vec<PriceBar>) -> Self {
        // 稳定排序保证同日期记录保持原始先后顺序
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// 最近 n 条记录，不足时返回全部
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// 只保留闭区间内的记录
    pub fn restrict(self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            bars: self
                .bars
                .into_iter()
                .filter(|b| b.date >= start && b.date <= end)
                .collect(),
        }
    }
}

/// A series together with the tier that produced it.
#[derive(Debug, Clone)]
pub struct SourcedSeries {
    pub source: SourceKind,
    pub series: PriceSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
            adj_close: close,
        }
    }

    #[test]
    fn from_bars_sorts_and_dedups() {
        let series = PriceSeries::from_bars(vec![
            bar(2024, 1, 3, 3.0),
            bar(2024, 1, 1, 1.0),
            bar(2024, 1, 2, 2.0),
            bar(2024, 1, 2, 2.5),
        ]);
        assert_eq!(series.closes(), vec![1.0, 2.5, 3.0]);
        assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn tail_and_restrict() {
        let series = PriceSeries::from_bars((1..=10).map(|d| bar(2024, 1, d, d as f64)).collect());
        assert_eq!(series.tail(3).len(), 3);
        assert_eq!(series.tail(30).len(), 10);

        let start = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(series.restrict(start, end).closes(), vec![4.0, 5.0, 6.0]);
    }
}
