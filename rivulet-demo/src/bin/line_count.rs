// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! line-count: counts the lines of every file in a directory in parallel.

use clap::Parser;
use rivulet_demo::line_count::{count_all, list_files};
use std::path::PathBuf;
use tracing::{info, warn};

/// Counts the lines of each file in a directory on a bounded pool.
#[derive(Parser, Debug)]
#[command(name = "line-count", version, about)]
struct Cli {
    /// Directory whose files are counted.
    #[arg(long, env = "RIVULET_DIR", default_value = ".")]
    dir: PathBuf,

    /// Worker count; one per file when omitted.
    #[arg(long, env = "RIVULET_POOL_SIZE")]
    pool_size: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rivulet_demo::init_logging();
    let cli = Cli::parse();

    let files = list_files(&cli.dir)?;
    info!(dir = %cli.dir.display(), files = files.len(), "listing done");

    let mut failures = 0;
    for (path, outcome) in count_all(files, cli.pool_size).await? {
        match outcome {
            Ok(lines) => println!("{}: {lines}", path.display()),
            Err(e) => {
                failures += 1;
                warn!(path = %path.display(), "could not count lines: {e}");
            }
        }
    }

    info!(failures, "line count finished");
    Ok(())
}
