use crate::errors::{ForecastError, Result};
use crate::inference::SequenceModel;
use crate::models::forecast::HistoricalFit;
use crate::pipeline::normalizer::Scale;
use crate::pipeline::window;

/// 在全部历史窗口上批量运行模型，按原始价格计算误差。
/// 窗口 i 的目标值是紧随其后的收盘价。
pub fn historical_fit<M>(
    model: &M,
    normalized: &[f64],
    closes: &[f64],
    scale: &Scale,
    window_size: usize,
) -> Result<Option<HistoricalFit>>
where
    M: SequenceModel + ?Sized,
{
    let windows = window::sliding_windows(normalized, window_size);
    if windows.is_empty() {
        return Ok(None);
    }

    let predictions = model.predict(&windows)?;
    if predictions.len() != windows.len() {
        return Err(ForecastError::ModelInference(format!(
            "batch of {} windows produced {} predictions",
            windows.len(),
            predictions.len()
        )));
    }

    let predicted = scale.inverse(&predictions);
    let actual = &closes[window_size..];
    let n = predicted.len() as f64;
    let (abs_sum, sq_sum) = predicted
        .iter()
        .zip(actual)
        .fold((0.0, 0.0), |(abs_sum, sq_sum), (p, a)| {
            let err = p - a;
            (abs_sum + err.abs(), sq_sum + err * err)
        });

    Ok(Some(HistoricalFit {
        windows: windows.len(),
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::LinearWindowModel;
    use crate::pipeline::normalizer;

    #[test]
    fn persistence_model_error_matches_step_size() {
        // 只看最后一个值的模型，在等差序列上误差恒为步长
        let mut weights = vec![0.0; 5];
        weights[4] = 1.0;
        let model = LinearWindowModel::new(weights, 0.0).unwrap();

        let closes: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let (scale, normalized) = normalizer::fit_transform(&closes).unwrap();
        let fit = historical_fit(&model, &normalized, &closes, &scale, 5).unwrap().unwrap();

        assert_eq!(fit.windows, 15);
        assert!((fit.mae - 2.0).abs() < 1e-9);
        assert!((fit.rmse - 2.0).abs() < 1e-9);
    }

    #[test]
    fn too_short_history_has_no_fit() {
        let model = LinearWindowModel::exponential(5, 0.9).unwrap();
        let closes = vec![1.0, 2.0, 3.0];
        let (scale, normalized) = normalizer::fit_transform(&closes).unwrap();
        assert!(historical_fit(&model, &normalized, &closes, &scale, 5).unwrap().is_none());
    }
}
