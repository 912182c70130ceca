use anyhow::Result;
use clap::Parser;
use tpad_capture::config::{self, Config};
use tpad_capture::{logger, App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // 先加载 .env，其中的 RUST_LOG 才会生效
    config::load_dotenv();

    // 初始化日志
    logger::init();

    // 环境变量为默认值，命令行参数优先
    let config = Cli::parse().apply(Config::from_env());

    // 初始化并运行应用
    let _stats = App::initialize(config).await?.run().await?;

    Ok(())
}
