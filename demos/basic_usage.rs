//! PrismLog 基本使用示例
//!
//! 运行: cargo run --example basic_usage
//!
//! 设置 INFLUX_ADDRESS 等环境变量后会额外写入 InfluxDB。

use prism_log::env_config::EnvConfig;
use prism_log::{get_diagnostics, LogLevel, LoggerFactory, PrismLogError, WriterKind};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 库自身的生命周期日志走 tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut writers = vec![WriterKind::Console, WriterKind::File];
    if EnvConfig::has_influx_config() {
        writers.push(WriterKind::Database);
    }

    let logger = LoggerFactory::default()
        .with_level(LogLevel::Debug)
        .with_service_name("demo")
        .with_log_directory("logs")
        .with_caller()
        .with_stack_error()
        .with_error_observer(Arc::new(|e: &PrismLogError| {
            eprintln!("background write failed: {}", e);
        }))
        .with_writers(&writers)
        .await?
        .build();

    logger.debug("demo started");
    logger.infof(format_args!("using {} writer(s)", writers.len()));

    let db = logger.with_scope("db");
    db.infov(
        "connected",
        &[json!("pool_size"), json!(8), json!("read_only"), json!(false)],
    );
    db.warnv("slow query", &[json!("elapsed_ms"), json!(812.5)]);

    if let Err(e) = std::fs::read_to_string("/nonexistent/prism.toml") {
        logger.err(&PrismLogError::from(e));
    }

    if let Err(e) = logger.log(LogLevel::Info, "odd", &[json!("dangling")]) {
        logger.errorv("rejected call", &[json!("reason"), json!(e.to_string())]);
    }

    logger.shutdown().await?;

    let stats = get_diagnostics();
    println!(
        "emitted={} failed={} points_written={}",
        stats.events_emitted, stats.events_failed, stats.points_written
    );
    Ok(())
}
