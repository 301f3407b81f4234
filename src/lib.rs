// 公开导出的模块，供外部使用
pub mod config;
pub mod errors;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use errors::{ForecastError, Result};
pub use inference::{LinearWindowModel, SequenceModel};
pub use models::forecast::{ForecastResult, PredictionResponse};
pub use models::price::{PriceBar, PriceSeries, SourceKind};
pub use services::prediction_service::PredictionService;
pub use sources::HistorySource;
