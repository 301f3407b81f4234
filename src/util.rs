use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

/// 展示用日期格式
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 回溯若干年的起始日期，2月29日会落到2月28日
pub fn years_before(end: NaiveDate, years: u32) -> NaiveDate {
    end.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

// 闭区间内的所有工作日
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d))
        .collect()
}

/// 从 `from` 的下一天开始逐日前进，收集 `count` 个工作日
pub fn next_business_days(from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = from;
    while dates.len() < count {
        cursor += Duration::days(1);
        if is_weekday(cursor) {
            dates.push(cursor);
        }
    }
    dates
}

/// 百分比变化，基准非正时返回 0
pub fn percent_change(base: f64, latest: f64) -> f64 {
    if base > 0.0 {
        (latest - base) / base * 100.0
    } else {
        0.0
    }
}

pub fn format_dates(dates: &[NaiveDate]) -> Vec<String> {
    dates
        .iter()
        .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .collect()
}
