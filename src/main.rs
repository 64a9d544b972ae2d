// servicebox 命令行入口
//
// 加载配置、初始化日志、注册点击追踪服务，然后解析指定的标识并输出统计信息

#![allow(clippy::uninlined_format_args)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use servicebox::app::{ClickService, ClickTrackingProvider, FinanceService, WebhookService};
use servicebox::config::AppConfig;
use servicebox::logging::init_logging;
use servicebox::{measure_performance, Container, Injectable};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "servicebox")]
#[command(version, about = "servicebox - 依赖注入容器演示")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 日志格式 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// 关闭循环依赖检测
    #[arg(long, global = true)]
    no_cycle_detection: bool,

    /// Webhook 共享密钥
    #[arg(long, global = true)]
    webhook_secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析一个或多个标识
    Resolve {
        /// 要解析的标识，默认解析全部示例服务
        ids: Vec<String>,
    },
    /// 列出已注册的标识
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path.clone()),
        None => AppConfig::load(),
    }
    .context("加载配置失败")?;

    apply_overrides(&cli, &mut config);
    init_logging(config.logging.to_logging_config()?)?;

    let container = Arc::new(build_container(&cli, &config)?);

    match cli.command {
        Commands::List => {
            for id in container.registered_ids() {
                let lifetime = if container.is_shared(&id) { "shared" } else { "transient" };
                println!("{:<24} {}", id, lifetime);
            }
        }
        Commands::Resolve { ids } => {
            let ids = if ids.is_empty() { default_ids() } else { ids };
            let mut failures = 0;

            for id in &ids {
                let result = measure_performance!("resolve", id, { container.make(id) });
                match result {
                    Ok(_) => println!("✅ {}", id),
                    Err(e) => {
                        failures += 1;
                        println!("❌ {}: {}", id, e);
                    }
                }
            }

            println!("{}", container.stats().performance_summary());

            if failures > 0 {
                anyhow::bail!("{} of {} identifiers could not be resolved", failures, ids.len());
            }
        }
    }

    Ok(())
}

/// 命令行参数优先于配置文件和环境变量
fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if cli.no_cycle_detection {
        config.container.detect_cycles = false;
    }
}

fn build_container(cli: &Cli, config: &AppConfig) -> anyhow::Result<Container> {
    tracing::debug!(
        detect_cycles = config.container.detect_cycles,
        collect_stats = config.container.collect_stats,
        logging = ?config.logging,
        "Building container"
    );

    let provider = match &cli.webhook_secret {
        Some(secret) => ClickTrackingProvider::with_webhook_secret(secret.clone()),
        None => ClickTrackingProvider::new(),
    };

    let mut container = Container::with_config(config.container.clone());
    container.register_provider(provider)?;
    container.boot()?;

    Ok(container)
}

fn default_ids() -> Vec<String> {
    vec![
        ClickService::key(),
        WebhookService::key(),
        FinanceService::key(),
    ]
}
