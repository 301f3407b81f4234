use std::env;
use std::path::Path;

fn main() {
    // 获取项目根目录
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    // 检查默认模型文件是否存在
    let model_file = Path::new(&manifest_dir).join("artifacts").join("window_model.json");
    if !model_file.exists() {
        println!("cargo:warning=artifacts/window_model.json not found. The CLI needs a model artifact.");
        println!("cargo:warning=Please run 'cargo run --bin create_model_artifact' to generate one.");
    } else {
        println!("cargo:rerun-if-changed=artifacts/window_model.json");
    }
}
