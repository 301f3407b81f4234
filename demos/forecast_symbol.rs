use stock_forecast::{Config, HistorySource, LinearWindowModel, PredictionResponse, PredictionService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // 离线模式：只使用合成数据
    let config = Config::new().with_offline(true);
    let model = LinearWindowModel::exponential(config.window_size, 0.9)?;
    let history = HistorySource::from_config(&config)?;
    let service = PredictionService::new(config, history, Arc::new(model))?;

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    match service.predict(&symbol).await {
        PredictionResponse::Success(result) => {
            println!("股票: {} (数据来源: {})", result.stock_symbol, result.source);
            println!("当前价格: {:.2}", result.current_price);

            println!("\n过去一周 ({:+.2}%):", result.past_week.change_percent);
            for (date, price) in result.past_week.dates.iter().zip(&result.past_week.prices) {
                println!("{:<12} {:>10.2}", date, price);
            }

            println!("\n未来一周预测 ({:+.2}%):", result.next_week.change_percent);
            for (date, price) in result.next_week.dates.iter().zip(&result.next_week.predictions) {
                println!("{:<12} {:>10.2}", date, price);
            }
        }
        PredictionResponse::Failure(payload) => {
            println!("预测失败: {}", payload.error);
        }
    }

    Ok(())
}
