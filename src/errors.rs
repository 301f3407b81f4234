use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    #[error("Insufficient data for {symbol}. Need at least {required} days, got {available}.")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },

    #[error("Model inference failed: {0}")]
    ModelInference(String),

    #[error("Model artifact error: {0}")]
    ModelLoad(String),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// 流水线内部的意外失败，例如模型 panic
    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// 构造数据源不可用错误
    pub fn unavailable(source_name: &'static str, reason: impl Into<String>) -> Self {
        ForecastError::SourceUnavailable {
            source_name,
            reason: reason.into(),
        }
    }
}
