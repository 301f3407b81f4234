use crate::errors::{ForecastError, Result};
use crate::inference::SequenceModel;
use crate::pipeline::window::Window;
use log::debug;

/// 递归多步预测：每一步的预测值会作为下一步窗口的最新值。
/// 返回归一化后的预测值，长度恒等于 `horizon`。
pub fn forecast<M>(model: &M, trailing: &Window, horizon: usize) -> Result<Vec<f64>>
where
    M: SequenceModel + ?Sized,
{
    let mut window = trailing.clone();
    let size = window.len();
    let mut predictions = Vec::with_capacity(horizon);

    for step in 0..horizon {
        let next = predict_one(model, &window)?;
        debug!("forecast step {}: {:.6}", step + 1, next);
        predictions.push(next);
        window.advance(next);
        debug_assert_eq!(window.len(), size);
    }

    Ok(predictions)
}

fn predict_one<M>(model: &M, window: &Window) -> Result<f64>
where
    M: SequenceModel + ?Sized,
{
    let output = model.predict(std::slice::from_ref(window))?;
    match output.as_slice() {
        [value] if value.is_finite() => Ok(*value),
        [value] => Err(ForecastError::ModelInference(format!("non-finite prediction {}", value))),
        other => Err(ForecastError::ModelInference(format!(
            "expected 1 prediction, got {}",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 记录每次调用的窗口，预测值为窗口末值加 0.01
    struct Recording {
        size: usize,
        seen: RefCell<Vec<Vec<f64>>>,
    }

    impl SequenceModel for Recording {
        fn window_size(&self) -> usize {
            self.size
        }

        fn predict(&self, batch: &[Window]) -> Result<Vec<f64>> {
            let mut out = Vec::new();
            for window in batch {
                self.seen.borrow_mut().push(window.to_vec());
                out.push(window.last().unwrap_or(0.0) + 0.01);
            }
            Ok(out)
        }
    }

    struct Broken;

    impl SequenceModel for Broken {
        fn window_size(&self) -> usize {
            3
        }

        fn predict(&self, _batch: &[Window]) -> Result<Vec<f64>> {
            Ok(vec![])
        }
    }

    #[test]
    fn feeds_predictions_back_into_window() {
        let model = Recording {
            size: 4,
            seen: RefCell::new(Vec::new()),
        };
        let trailing = Window::from_slice(&[0.1, 0.2, 0.3, 0.4]);
        let out = forecast(&model, &trailing, 7).unwrap();

        assert_eq!(out.len(), 7);
        let seen = model.seen.borrow();
        assert_eq!(seen.len(), 7);
        assert!(seen.iter().all(|w| w.len() == 4));
        // 第二步的窗口包含第一步的预测
        assert_eq!(seen[1][3], out[0]);
        assert_eq!(seen[1][0], 0.2);
        // 原窗口不被修改
        assert_eq!(trailing.to_vec(), vec![0.1, 0.2, 0.3, 0.4]);
        assert!((out[6] - 0.47).abs() < 1e-9);
    }

    #[test]
    fn zero_horizon_is_empty() {
        let model = Recording {
            size: 2,
            seen: RefCell::new(Vec::new()),
        };
        assert!(forecast(&model, &Window::from_slice(&[0.0, 1.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn shape_mismatch_is_inference_failure() {
        let err = forecast(&Broken, &Window::from_slice(&[0.0, 0.5, 1.0]), 7).unwrap_err();
        assert!(matches!(err, ForecastError::ModelInference(_)));
    }
}
