use anyhow::Result;
use quiz_genius::app::App;
use quiz_genius::config::Config;
use quiz_genius::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置；第一个命令行参数可覆盖任务文件路径
    let mut config = Config::from_env();
    if let Some(job_file) = std::env::args().nth(1) {
        config.job_file = job_file;
    }

    // 运行应用
    App::new(config).run().await?;

    Ok(())
}
