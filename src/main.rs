mod backup;
mod config;
mod package_manager;
mod tui;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 加载配置（不存在时使用默认值）
    let config = config::Config::load_or_default()?;
    log::info!(
        "使用 {} (软件源: {})，备份目录 {}",
        config.winget_path,
        config.source,
        config.backup_dir.display()
    );

    tui::run(config).await?;

    Ok(())
}
