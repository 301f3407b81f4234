//! Model contract consumed by the forecasting pipeline and the
//! JSON-persisted linear window model loaded once at startup.

use crate::errors::{ForecastError, Result};
use crate::pipeline::window::Window;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Opaque sequence model: one normalized prediction per input window.
pub trait SequenceModel {
    /// Input window length the model was trained on
    fn window_size(&self) -> usize;

    /// Shape-preserving batch prediction
    fn predict(&self, batch: &[Window]) -> Result<Vec<f64>>;
}

/// 线性窗口模型：预测值 = 权重与窗口的点积 + 偏置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWindowModel {
    pub window_size: usize,
    /// 从最旧到最新
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearWindowModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        let model = Self {
            window_size: weights.len(),
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    /// 指数衰减权重，越新的值权重越大，权重和为 1
    pub fn exponential(window_size: usize, decay: f64) -> Result<Self> {
        if window_size == 0 || !(decay > 0.0 && decay <= 1.0) {
            return Err(ForecastError::ModelLoad(format!(
                "invalid exponential model parameters: window_size={}, decay={}",
                window_size, decay
            )));
        }
        let raw: Vec<f64> = (0..window_size)
            .map(|i| decay.powi((window_size - 1 - i) as i32))
            .collect();
        let total: f64 = raw.iter().sum();
        Self::new(raw.into_iter().map(|w| w / total).collect(), 0.0)
    }

    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ForecastError::ModelLoad("window_size must be positive".to_string()));
        }
        if self.weights.len() != self.window_size {
            return Err(ForecastError::ModelLoad(format!(
                "expected {} weights, found {}",
                self.window_size,
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ForecastError::ModelLoad("weights must be finite".to_string()));
        }
        Ok(())
    }

    /// 从 JSON 文件加载并校验窗口长度
    pub fn load(path: impl AsRef<Path>, expected_window: usize) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&text)?;
        model.validate()?;
        if model.window_size != expected_window {
            return Err(ForecastError::ModelLoad(format!(
                "{} was trained on windows of {}, configured window size is {}",
                path.display(),
                model.window_size,
                expected_window
            )));
        }
        info!("Loaded model from {} (window size {})", path.display(), model.window_size);
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl SequenceModel for LinearWindowModel {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn predict(&self, batch: &[Window]) -> Result<Vec<f64>> {
        batch
            .iter()
            .map(|window| {
                if window.len() != self.window_size {
                    return Err(ForecastError::ModelInference(format!(
                        "expected window of {}, got {}",
                        self.window_size,
                        window.len()
                    )));
                }
                let dot: f64 = window.iter().zip(&self.weights).map(|(v, w)| v * w).sum();
                Ok(dot + self.bias)
            })
            .collect()
    }
}
