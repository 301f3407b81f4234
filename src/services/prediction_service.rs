use crate::config::Config;
use crate::errors::{ForecastError, Result};
use crate::inference::SequenceModel;
use crate::models::forecast::{ForecastResult, HistoricalFit, PredictionResponse};
use crate::pipeline::normalizer::Scale;
use crate::pipeline::{diagnostics, forecaster, normalizer, summary, window};
use crate::sources::HistorySource;
use chrono::NaiveDateTime;
use log::{error, info, warn};
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinError;

pub type SharedModel = Arc<dyn SequenceModel + Send + Sync>;

/// 预测服务：串联数据获取、归一化、窗口构建、迭代预测与结果汇总
pub struct PredictionService {
    config: Config,
    history: HistorySource,
    model: SharedModel,
}

/// 去除空白并转为大写
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ForecastError::InvalidSymbol(raw.to_string()));
    }
    Ok(symbol)
}

impl PredictionService {
    /// 创建服务实例，模型窗口长度必须与配置一致
    pub fn new(config: Config, history: HistorySource, model: SharedModel) -> Result<Self> {
        if model.window_size() != config.window_size {
            return Err(ForecastError::ModelLoad(format!(
                "model expects windows of {}, configured window size is {}",
                model.window_size(),
                config.window_size
            )));
        }
        Ok(Self {
            config,
            history,
            model,
        })
    }

    /// 对外接口：任何失败都转换为错误载荷
    pub async fn predict(&self, raw_symbol: &str) -> PredictionResponse {
        self.predict_at(raw_symbol, self.config.now()).await
    }

    pub async fn predict_at(&self, raw_symbol: &str, now: NaiveDateTime) -> PredictionResponse {
        let result = self.forecast_at(raw_symbol, now).await;
        if let Err(e) = &result {
            warn!("Prediction for {:?} failed: {}", raw_symbol, e);
        }
        PredictionResponse::from_result(result)
    }

    pub async fn forecast_at(&self, raw_symbol: &str, now: NaiveDateTime) -> Result<ForecastResult> {
        let symbol = normalize_symbol(raw_symbol)?;
        let today = now.date();
        info!("Forecasting {} as of {}", symbol, now);

        let sourced = self.history.fetch(&symbol, self.config.years_back, today).await;
        let available = sourced.series.len();
        let insufficient = || ForecastError::InsufficientHistory {
            symbol: symbol.clone(),
            required: self.config.min_history,
            available,
        };
        if available < self.config.min_history {
            return Err(insufficient());
        }

        let closes = sourced.series.closes();
        let (scale, normalized) = normalizer::fit_transform(&closes).ok_or_else(insufficient)?;

        // 模型调用放到阻塞线程池，模型 panic 时转换为错误而不是中断调用方
        let stage = ModelStage {
            model: Arc::clone(&self.model),
            symbol: symbol.clone(),
            normalized,
            closes,
            scale,
            window_size: self.config.window_size,
            horizon: self.config.horizon,
            run_diagnostics: self.config.run_diagnostics,
        };
        let (fit, normalized_predictions) = tokio::task::spawn_blocking(move || stage.run())
            .await
            .map_err(|e| unexpected(&symbol, e))??;
        if let Some(fit) = &fit {
            info!(
                "{}: in-sample fit over {} windows, MAE {:.4}, RMSE {:.4}",
                symbol, fit.windows, fit.mae, fit.rmse
            );
        }
        let predictions = scale.inverse(&normalized_predictions);

        let result = summary::assemble(&symbol, &sourced, predictions, today, fit);
        info!(
            "{}: current {:.2}, forecast change {:.2}% ({})",
            symbol, result.current_price, result.next_week.change_percent, result.source
        );
        Ok(result)
    }
}

/// 模型相关的同步计算，所有输入均为自有数据以便移入阻塞线程
struct ModelStage {
    model: SharedModel,
    symbol: String,
    normalized: Vec<f64>,
    closes: Vec<f64>,
    scale: Scale,
    window_size: usize,
    horizon: usize,
    run_diagnostics: bool,
}

impl ModelStage {
    fn run(self) -> Result<(Option<HistoricalFit>, Vec<f64>)> {
        let fit = if self.run_diagnostics {
            diagnostics::historical_fit(
                self.model.as_ref(),
                &self.normalized,
                &self.closes,
                &self.scale,
                self.window_size,
            )?
        } else {
            None
        };

        let trailing = window::trailing_window(&self.normalized, self.window_size, &self.symbol)?;
        let predictions = forecaster::forecast(self.model.as_ref(), &trailing, self.horizon)?;
        Ok((fit, predictions))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn unexpected(symbol: &str, e: JoinError) -> ForecastError {
    let reason = if e.is_panic() {
        format!("model panicked: {}", panic_message(e.into_panic().as_ref()))
    } else {
        format!("model task failed: {}", e)
    };
    error!("Forecast for {} aborted: {}", symbol, reason);
    ForecastError::Unknown(reason)
}
