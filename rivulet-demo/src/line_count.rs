// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Counting lines of many files on a bounded pool.

use rivulet::{BoundedExecutor, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Regular files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Fails when `dir` cannot be read.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Number of lines in `path`. A final line without a trailing newline counts.
///
/// # Errors
///
/// Fails when the file cannot be opened or read.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = 0;
    for line in reader.split(b'\n') {
        line?;
        lines += 1;
    }
    Ok(lines)
}

/// Counts the lines of every file, at most `pool_size` at a time.
///
/// The pool defaults to one worker per file. Each file gets its own result,
/// in the order given, and a failing file does not affect the others.
///
/// # Errors
///
/// Returns [`rivulet::RivuletError::InvalidConfig`] for an explicit pool size
/// of zero.
pub async fn count_all(
    files: Vec<PathBuf>,
    pool_size: Option<usize>,
) -> Result<Vec<(PathBuf, Result<usize>)>> {
    let executor = BoundedExecutor::new(pool_size.unwrap_or(files.len().max(1)))?;
    info!("counting lines of {} files on a pool of {}", files.len(), executor.pool_size());

    let tasks: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            move || {
                let lines = count_lines(&path)?;
                debug!(path = %path.display(), lines, "counted");
                Ok::<_, io::Error>(lines)
            }
        })
        .collect();

    let results = executor.run_all(tasks).await?;
    Ok(files.into_iter().zip(results).collect())
}
