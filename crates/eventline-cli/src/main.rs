//! Eventline demo entry point.

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use eventline_cli::cli::Cli;
use eventline_cli::demo::{self, Producer};

/// Simulated handler work; `New` events take twice as long.
const HANDLER_WORK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> eventline_runtime::Result<()> {
    let config = cli.runtime_config()?;
    let (min_delay, max_delay) = cli.pacing()?;

    let mut runtime = demo::build_runtime(config)?;
    demo::register_handlers(&runtime, HANDLER_WORK).await;
    runtime.start()?;

    let producer = Producer::new(runtime.pipeline(), min_delay, max_delay).with_limit(cli.count);

    tokio::select! {
        result = producer.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received");
        }
    }

    println!("Shutting down, draining {} queued events", runtime.queue().len());
    runtime.shutdown().await?;

    let stats = runtime.stats();
    println!(
        "Dispatched {} events ({} unroutable, {} failed)",
        stats.handled, stats.unroutable, stats.failed
    );

    Ok(())
}
