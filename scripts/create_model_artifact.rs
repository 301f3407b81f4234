use stock_forecast::config::DEFAULT_WINDOW_SIZE;
use stock_forecast::LinearWindowModel;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // 参数：输出路径、窗口长度、衰减系数
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "artifacts/window_model.json".to_string());
    let window_size = match args.next() {
        Some(v) => v.parse::<usize>()?,
        None => DEFAULT_WINDOW_SIZE,
    };
    let decay = match args.next() {
        Some(v) => v.parse::<f64>()?,
        None => 0.9,
    };

    let model = LinearWindowModel::exponential(window_size, decay)?;

    // 确保目录存在
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    model.save(&path)?;

    println!("成功创建模型文件 {} (窗口 {}, 衰减 {})", path, window_size, decay);
    Ok(())
}
