use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rti_agent::utils::logging;
use rti_agent::{App, Config};
use tracing::{debug, info};

/// 把公民查询整理成正式 RTI 申请
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 只处理这一条查询并输出最终上下文；不给出时批量处理提交目录
    #[arg(long)]
    query: Option<String>,

    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // .env 中的变量先于配置加载
    let dotenv_path = Config::load_dotenv(None);

    // 加载配置
    let config = Config::load(args.config.as_deref())?;

    // 初始化日志（guard 需要一直持有）
    let _log_guard = logging::init(&config)?;

    match dotenv_path {
        Some(path) => info!("✓ 已加载 .env 文件: {}", path.display()),
        None => debug!("未找到 .env 文件，仅使用环境变量"),
    }

    // 初始化并运行应用
    let app = App::initialize(config).await?;

    match args.query {
        Some(query) => {
            let result = app.process_query(&query).await;
            app.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&result?)?);
        }
        None => {
            let outcome = app.run().await;
            app.shutdown().await;
            outcome?;
        }
    }

    Ok(())
}
