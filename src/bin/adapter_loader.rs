//! AdapterLoader 主程序 - 配置驱动运行
//!
//! 启动内置适配器，运行到 Ctrl-C 后停止

use adapter_loader::{
    builtin_registry,
    config::{generate_default_config_file, ConfigManager},
    core::component_registry::registry,
    init_tracing, AdapterHost, LoaderConfig,
};
use anyhow::Context;
use std::env;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "adapter_loader.yaml";

/// 程序入口点
#[tokio::main]
async fn main() {
    if let Err(e) = run_main().await {
        tracing::error!("adapter loader failed: {:#}", e);
        std::process::exit(1);
    }
}

/// 主要逻辑函数
async fn run_main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => run_with_config(ConfigManager::new_default().get_config().clone()).await,
        2 => match args[1].as_str() {
            "init" => generate_config_file().await,
            "-h" | "--help" => {
                print_usage();
                Ok(())
            }
            path => run_with_config_file(path).await,
        },
        _ => {
            print_usage();
            Ok(())
        }
    }
}

/// 使用配置文件运行
async fn run_with_config_file(config_path: &str) -> anyhow::Result<()> {
    if !Path::new(config_path).exists() {
        init_tracing(&Default::default());
        tracing::error!(path = config_path, "configuration file does not exist");
        tracing::info!("run 'adapter_loader init' to generate {}", DEFAULT_CONFIG_PATH);
        return Ok(());
    }

    let config_manager = ConfigManager::load_from_file(config_path)
        .await
        .with_context(|| format!("failed to load {}", config_path))?;
    run_with_config(config_manager.get_config().clone()).await
}

async fn run_with_config(config: LoaderConfig) -> anyhow::Result<()> {
    init_tracing(&config.logging);
    ConfigManager::from_config(config.clone()).validate()?;

    let adapters = Arc::new(builtin_registry()?);
    tracing::info!(packages = ?adapters.package_names(), "adapter packages registered");

    let host = AdapterHost::with_components(&config, adapters, registry())?;
    if let Err(e) = host.run_until_ctrl_c().await {
        // 启动失败后退出前停止已启动的适配器
        if let Err(stop_error) = host.stop().await {
            tracing::warn!(error = %stop_error, "stop after failed start was incomplete");
        }
        return Err(e.into());
    }

    tracing::info!("adapter loader stopped");
    Ok(())
}

/// 生成默认配置文件
async fn generate_config_file() -> anyhow::Result<()> {
    init_tracing(&Default::default());
    generate_default_config_file(DEFAULT_CONFIG_PATH).await?;
    tracing::info!(path = DEFAULT_CONFIG_PATH, "default configuration written");
    Ok(())
}

/// 打印使用说明
fn print_usage() {
    println!("AdapterLoader");
    println!();
    println!("用法:");
    println!("  adapter_loader                    # 使用默认配置运行");
    println!("  adapter_loader init               # 生成默认配置文件");
    println!("  adapter_loader <config_file>      # 使用指定配置文件运行");
    println!();
    println!("配置文件格式: YAML 或 TOML（按扩展名）");
}
