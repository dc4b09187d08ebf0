// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! transaction-monitor: runs the transaction pipeline for a fixed time.

use clap::Parser;
use rivulet::{Event, RivuletError};
use rivulet_demo::transactions::{monitor_pipeline, MonitorConfig};
use std::time::Duration;
use tracing::{error, info, warn};

/// Generates periodic transactions, converts the large ones and handles them per origin.
#[derive(Parser, Debug)]
#[command(name = "transaction-monitor", version, about)]
struct Cli {
    /// Tick period in milliseconds.
    #[arg(long, env = "RIVULET_PERIOD_MS", default_value_t = 1000)]
    period_ms: u64,

    /// Only transactions strictly above this amount are converted.
    #[arg(long, env = "RIVULET_THRESHOLD", default_value_t = 500.0)]
    threshold: f64,

    /// Conversion rate applied to the amount.
    #[arg(long, env = "RIVULET_RATE", default_value_t = 0.1)]
    rate: f64,

    /// Number of distinct origins.
    #[arg(long, env = "RIVULET_ORIGINS", default_value_t = 3)]
    origins: u64,

    /// Seconds to run before disposing the subscription.
    #[arg(long, env = "RIVULET_RUN_SECS", default_value_t = 10)]
    run_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rivulet_demo::init_logging();
    let cli = Cli::parse();

    let config = MonitorConfig {
        period: Duration::from_millis(cli.period_ms),
        threshold: cli.threshold,
        rate: cli.rate,
        origins: cli.origins,
        limit: None,
    };
    let pipeline = monitor_pipeline(&config)?.on_handler_error(|e| warn!("handler failed: {e}"));

    info!(?config, run_secs = cli.run_secs, "starting transaction monitor");
    let subscription = pipeline.subscribe(
        |event: Event| println!("{event}"),
        |e: RivuletError| error!("pipeline failed: {e}"),
    );

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(cli.run_secs)) => info!("run time elapsed"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
        state = subscription.closed() => info!(?state, "pipeline terminated"),
    }

    subscription.dispose();
    info!(state = ?subscription.state(), "transaction monitor stopped");
    Ok(())
}
