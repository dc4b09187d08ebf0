// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! parallel-sum: sums a range of integers across a fixed pool.

use clap::Parser;
use rivulet_demo::parallel_sum::parallel_sum;
use tracing::info;

/// Sums `0..count` by splitting it into one contiguous range per thread.
#[derive(Parser, Debug)]
#[command(name = "parallel-sum", version, about)]
struct Cli {
    /// Upper bound (exclusive) of the summed range.
    #[arg(long, env = "RIVULET_COUNT", default_value_t = 10)]
    count: u64,

    /// Number of ranges and pool workers.
    #[arg(long, env = "RIVULET_THREADS", default_value_t = 4)]
    threads: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rivulet_demo::init_logging();
    let cli = Cli::parse();

    let total = parallel_sum(cli.count, cli.threads).await?;
    info!(count = cli.count, threads = cli.threads, "sum complete");
    println!("{total}");
    Ok(())
}
