use crate::errors::ForecastError;
use crate::models::price::SourceKind;
use serde::Serialize;

/// 过去一周收盘价汇总
#[derive(Debug, Clone, Serialize)]
pub struct PastWeek {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub change_percent: f64,
}

/// 未来一周预测汇总
#[derive(Debug, Clone, Serialize)]
pub struct NextWeek {
    pub dates: Vec<String>,
    pub predictions: Vec<f64>,
    pub change_percent: f64,
}

/// 历史窗口上的模型拟合误差（原始价格单位）
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalFit {
    pub windows: usize,
    pub mae: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub success: bool,
    pub company_name: String,
    pub stock_symbol: String,
    pub source: SourceKind,
    pub current_price: f64,
    pub past_week: PastWeek,
    pub next_week: NextWeek,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<HistoricalFit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

/// Caller-visible outcome of one "predict for symbol" request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Success(ForecastResult),
    Failure(ErrorPayload),
}

impl PredictionResponse {
    /// 最外层边界：把内部错误转换为 `{error, traceback}`
    pub fn from_result(result: Result<ForecastResult, ForecastError>) -> Self {
        match result {
            Ok(forecast) => PredictionResponse::Success(forecast),
            Err(e) => {
                let traceback = match &e {
                    // 用户可见的业务错误无需附带诊断信息
                    ForecastError::InsufficientHistory { .. } | ForecastError::InvalidSymbol(_) => None,
                    other => Some(format!("{:?}", other)),
                };
                PredictionResponse::Failure(ErrorPayload {
                    error: e.to_string(),
                    traceback,
                })
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionResponse::Success(_))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
