use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;

/// 默认回溯年数
pub const DEFAULT_YEARS_BACK: u32 = 5;
/// 模型输入窗口长度
pub const DEFAULT_WINDOW_SIZE: usize = 100;
/// 预测步数（交易日）
pub const DEFAULT_HORIZON: usize = 7;
/// 数据源可接受的最少历史记录数，与窗口长度数值相同但含义不同
pub const DEFAULT_MIN_HISTORY: usize = 100;

pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub years_back: u32,
    pub window_size: usize,
    pub horizon: usize,
    pub min_history: usize,
    pub source_timeout: Duration,
    pub alpha_vantage_api_key: String,
    pub offline: bool,
    pub timezone: Option<Tz>,
    pub run_diagnostics: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            years_back: DEFAULT_YEARS_BACK,
            window_size: DEFAULT_WINDOW_SIZE,
            horizon: DEFAULT_HORIZON,
            min_history: DEFAULT_MIN_HISTORY,
            source_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: "demo".to_string(),
            offline: false,
            timezone: None,
            run_diagnostics: true,
        }
    }

    /// 读取环境变量覆盖默认值
    pub fn from_env() -> Self {
        let config = Self::new();
        match std::env::var(ALPHA_VANTAGE_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => config.with_alpha_vantage_api_key(key.trim()),
            _ => config,
        }
    }

    pub fn with_years_back(mut self, years: u32) -> Self {
        self.years_back = years;
        self
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_alpha_vantage_api_key(mut self, key: &str) -> Self {
        self.alpha_vantage_api_key = key.to_string();
        self
    }

    /// 离线模式只保留合成数据源
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_timezone(mut self, tz: Option<Tz>) -> Self {
        self.timezone = tz;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.run_diagnostics = enabled;
        self
    }

    /// 当前时间，配置了时区时按该时区计算
    pub fn now(&self) -> NaiveDateTime {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
