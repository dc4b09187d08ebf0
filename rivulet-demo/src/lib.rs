// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Building blocks of the `rivulet` command-line programs.
//!
//! Each binary under `src/bin` is a thin `clap` front end over one of these
//! modules, so the behavior can be exercised from tests without a process.

pub mod line_count;
pub mod parallel_sum;
pub mod transactions;

/// Installs a `tracing` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
