// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Summing `0..count` by splitting it into contiguous ranges.

use rivulet::{run_all, Result, RivuletError};
use std::ops::Range;
use tracing::info;

/// Splits `0..count` into `parts` contiguous ranges of equal length.
///
/// The last range absorbs the remainder, so the ranges always cover every
/// element exactly once.
///
/// # Errors
///
/// Returns [`RivuletError::InvalidConfig`] when `parts` is zero.
pub fn partition(count: u64, parts: usize) -> Result<Vec<Range<u64>>> {
    if parts == 0 {
        return Err(RivuletError::invalid_config("cannot split into zero ranges"));
    }
    let chunk = count / parts as u64;
    Ok((0..parts as u64)
        .map(|index| {
            let start = index * chunk;
            let end = if index + 1 == parts as u64 {
                count
            } else {
                start + chunk
            };
            start..end
        })
        .collect())
}

fn overflow(start: u64, end: u64) -> RivuletError {
    RivuletError::invalid_config(format!("sum of {start}..{end} overflows u64"))
}

/// Sum of `0..count`, or `None` when it does not fit in a `u64`.
pub fn checked_total(count: u64) -> Option<u64> {
    let count = u128::from(count);
    u64::try_from(count * count.saturating_sub(1) / 2).ok()
}

/// Sums `0..count` on a pool of `threads` workers, one range per worker.
///
/// # Errors
///
/// Returns [`RivuletError::InvalidConfig`] when `threads` is zero or the sum
/// overflows a `u64`, and [`RivuletError::Task`] if a worker panicked.
pub async fn parallel_sum(count: u64, threads: usize) -> Result<u64> {
    if checked_total(count).is_none() {
        return Err(overflow(0, count));
    }
    let ranges = partition(count, threads)?;
    let tasks: Vec<_> = ranges
        .into_iter()
        .enumerate()
        .map(|(worker, range)| {
            move || {
                let (start, end) = (range.start, range.end);
                info!(worker, start, end, "summing range");
                let sum = (start..end).try_fold(0u64, u64::checked_add);
                let sum = sum.ok_or_else(|| overflow(start, end))?;
                info!(worker, sum, "range done");
                Ok::<_, RivuletError>(sum)
            }
        })
        .collect();

    run_all(tasks, threads)
        .await?
        .into_iter()
        .try_fold(0u64, |total, partial| {
            let partial = partial?;
            total.checked_add(partial).ok_or_else(|| overflow(0, count))
        })
}
