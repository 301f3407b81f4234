use stock_forecast::config::{Config, DEFAULT_HORIZON, DEFAULT_MIN_HISTORY, DEFAULT_WINDOW_SIZE, DEFAULT_YEARS_BACK};
use stock_forecast::services::prediction_service::{normalize_symbol, PredictionService};
use stock_forecast::{HistorySource, LinearWindowModel};

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

fn symbol_arg() -> Arg<'static> {
    Arg::with_name("symbol")
        .short('s')
        .long("symbol")
        .value_name("SYMBOL")
        .help("Ticker symbol, e.g. AAPL")
        .required(true)
        .takes_value(true)
}

fn offline_arg() -> Arg<'static> {
    Arg::with_name("offline")
        .long("offline")
        .help("Skip live sources and use the synthetic history")
        .takes_value(false)
}

fn years_arg() -> Arg<'static> {
    Arg::with_name("years")
        .short('y')
        .long("years")
        .value_name("YEARS")
        .help("Years of history to request")
        .takes_value(true)
}

fn parse_or<T: std::str::FromStr>(matches: &ArgMatches, name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(v) => v
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for --{}: {} ({})", name, v, e)),
        None => Ok(default),
    }
}

/// 两个子命令共用的参数
fn base_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    Ok(Config::from_env()
        .with_years_back(parse_or(matches, "years", DEFAULT_YEARS_BACK)?)
        .with_offline(matches.is_present("offline")))
}

/// predict 子命令的完整配置
fn predict_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = base_config(matches)?
        .with_window_size(parse_or(matches, "window", DEFAULT_WINDOW_SIZE)?)
        .with_horizon(parse_or(matches, "horizon", DEFAULT_HORIZON)?)
        .with_min_history(parse_or(matches, "min-history", DEFAULT_MIN_HISTORY)?)
        .with_source_timeout(Duration::from_secs(parse_or(matches, "timeout", 30u64)?))
        .with_diagnostics(!matches.is_present("no-diagnostics"));

    if let Some(tz) = matches.value_of("tz") {
        let tz: Tz = tz.parse().map_err(|e| anyhow!("invalid timezone {}: {}", tz, e))?;
        config = config.with_timezone(Some(tz));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let app = App::new("stock_forecast")
        .version("1.0.0")
        .about("Short-horizon stock price forecasting")
        .subcommand(
            SubCommand::with_name("predict")
                .about("Forecast the next business days for a symbol")
                .arg(symbol_arg())
                .arg(
                    Arg::with_name("model")
                        .short('m')
                        .long("model")
                        .value_name("PATH")
                        .help("Model artifact (JSON)")
                        .takes_value(true)
                        .default_value("artifacts/window_model.json"),
                )
                .arg(years_arg())
                .arg(
                    Arg::with_name("window")
                        .long("window")
                        .value_name("SIZE")
                        .help("Model input window length")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("horizon")
                        .long("horizon")
                        .value_name("DAYS")
                        .help("Number of business days to forecast")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("min-history")
                        .long("min-history")
                        .value_name("ROWS")
                        .help("Minimum history rows a source must return")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Timeout for each live source attempt")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("tz")
                        .long("tz")
                        .value_name("ZONE")
                        .help("IANA timezone used for \"now\" (default: local time)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("no-diagnostics")
                        .long("no-diagnostics")
                        .help("Skip the in-sample fit over historical windows")
                        .takes_value(false),
                )
                .arg(offline_arg()),
        )
        .subcommand(
            SubCommand::with_name("history")
                .about("Show the history the source chain resolves for a symbol")
                .arg(symbol_arg())
                .arg(years_arg())
                .arg(offline_arg())
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("predict") {
        let config = predict_config(matches)?;
        let model_path = matches.value_of("model").unwrap_or("artifacts/window_model.json");

        // 模型只在启动时加载一次
        let model = LinearWindowModel::load(model_path, config.window_size)
            .with_context(|| format!("failed to load model from {}", model_path))?;
        let history = HistorySource::from_config(&config)?;
        let service = PredictionService::new(config, history, Arc::new(model))?;

        let symbol = matches.value_of("symbol").unwrap_or_default();
        let response = service.predict(symbol).await;
        println!("{}", response.to_json()?);
    } else if let Some(matches) = matches.subcommand_matches("history") {
        let config = base_config(matches)?;
        let limit = parse_or(matches, "limit", 10usize)?;
        let symbol = normalize_symbol(matches.value_of("symbol").unwrap_or_default())?;

        let history = HistorySource::from_config(&config)?;
        let chain: Vec<String> = history.tiers().iter().map(|k| k.to_string()).collect();
        info!("Source chain: {}", chain.join(" -> "));
        let sourced = history
            .fetch(&symbol, config.years_back, config.now().date())
            .await;

        info!("{}: {} records from {}", symbol, sourced.series.len(), sourced.source);
        info!("{:-<76}", "");
        info!(
            "{:<12} {:<10} {:<10} {:<10} {:<10} {:<10} {:<12}",
            "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"
        );
        info!("{:-<76}", "");

        for bar in sourced.series.tail(limit).iter().rev() {
            info!(
                "{:<12} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<12.0}",
                bar.date, bar.open, bar.high, bar.low, bar.close, bar.adj_close, bar.volume
            );
        }

        if sourced.series.len() > limit {
            info!("... and {} more records", sourced.series.len() - limit);
        } else if sourced.series.is_empty() {
            info!("No daily data available for this symbol");
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
