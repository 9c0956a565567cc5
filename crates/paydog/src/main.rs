use anyhow::Result;
use clap::Parser;
use paydog::config::{self, Cli};
use tracing::{error, info};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // the appender flushes only while this guard is alive
    let _guard = logger_init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let build_cfg = cfg.build_config()?;

    match paydog::run(&cli, &cfg, &build_cfg).await {
        Ok(receipt) => {
            info!("transfer {} done", receipt.txid);
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Err(e) => {
            error!("transfer failed: {}", e);
            println!("{}", paydog::failure(&e));
            std::process::exit(1);
        }
    }
}

fn logger_init() -> WorkerGuard {
    let formatting_layer = fmt::layer().pretty().with_writer(std::io::stderr);
    let file_appender = RollingFileAppender::new(Rotation::HOURLY, "logs/paydog", "paydog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG)
        .boxed();

    Registry::default()
        .with(formatting_layer)
        .with(file_layer)
        .with(EnvFilter::from_default_env())
        .init();

    guard
}
