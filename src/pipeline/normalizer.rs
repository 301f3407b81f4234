/// Min-max scale fitted over a single column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// 空序列返回 None
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { min, max })
    }

    fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }

    pub fn inverse_one(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.transform_one(*v)).collect()
    }

    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.inverse_one(*v)).collect()
    }
}

/// 拟合并转换到 [0, 1]
pub fn fit_transform(values: &[f64]) -> Option<(Scale, Vec<f64>)> {
    let scale = Scale::fit(values)?;
    let normalized = scale.transform(values);
    Some((scale, normalized))
}
