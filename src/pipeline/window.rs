use crate::errors::{ForecastError, Result};
use std::collections::VecDeque;

/// Fixed-length model input backed by a ring buffer; `advance` keeps the length constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    values: VecDeque<f64>,
    size: usize,
}

impl Window {
    pub fn from_slice(values: &[f64]) -> Self {
        let mut buf = VecDeque::with_capacity(values.len());
        buf.extend(values.iter().copied());
        Self {
            values: buf,
            size: values.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.values.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// 丢弃最旧的值并追加新值
    pub fn advance(&mut self, next: f64) {
        if self.size == 0 {
            return;
        }
        self.values.pop_front();
        self.values.push_back(next);
        debug_assert_eq!(self.values.len(), self.size);
    }
}

/// 历史批量窗口：对每个 i in [window_size, len) 取 series[i-window_size..i]
pub fn sliding_windows(series: &[f64], window_size: usize) -> Vec<Window> {
    if window_size == 0 || series.len() <= window_size {
        return Vec::new();
    }
    (window_size..series.len())
        .map(|i| Window::from_slice(&series[i - window_size..i]))
        .collect()
}

/// 最近 `window_size` 个值，用于启动预测
pub fn trailing_window(series: &[f64], window_size: usize, symbol: &str) -> Result<Window> {
    if series.len() < window_size {
        return Err(ForecastError::InsufficientHistory {
            symbol: symbol.to_string(),
            required: window_size,
            available: series.len(),
        });
    }
    Ok(Window::from_slice(&series[series.len() - window_size..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_windows_cover_history() {
        let series: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let windows = sliding_windows(&series, 4);
        assert_eq!(windows.len(), 6);
        assert_eq!(windows[0].to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(windows[5].to_vec(), vec![5.0, 6.0, 7.0, 8.0]);
        assert!(windows.iter().all(|w| w.len() == 4));
    }

    #[test]
    fn sliding_windows_empty_when_too_short() {
        assert!(sliding_windows(&[1.0, 2.0], 2).is_empty());
        assert!(sliding_windows(&[1.0, 2.0], 5).is_empty());
    }

    #[test]
    fn trailing_window_takes_last_values() {
        let series: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let window = trailing_window(&series, 3, "AAA").unwrap();
        assert_eq!(window.to_vec(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn trailing_window_rejects_short_history() {
        let err = trailing_window(&[1.0; 99], 100, "AAA").unwrap_err();
        match err {
            ForecastError::InsufficientHistory { symbol, required, available } => {
                assert_eq!(symbol, "AAA");
                assert_eq!(required, 100);
                assert_eq!(available, 99);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn advance_keeps_length() {
        let mut window = Window::from_slice(&[1.0, 2.0, 3.0]);
        window.advance(4.0);
        assert_eq!(window.to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.len(), 3);
        assert_eq!(window.last(), Some(4.0));
    }
}
