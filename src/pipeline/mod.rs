//! Windowed forecasting pipeline: normalize closes, build windows, run the
//! recursive forecast and assemble the weekly summary.

pub mod diagnostics;
pub mod forecaster;
pub mod normalizer;
pub mod summary;
pub mod window;
