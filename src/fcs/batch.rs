//! Directory scanning and multi-file reading.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{probe_path, FcsError, FcsReader};
use crate::frame::Frame;

/// Files directly inside `dir` whose header probes as FCS, sorted by path
pub fn scan_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, FcsError> {
    let dir = dir.as_ref();
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if probe_path(&path) {
            found.push(path);
        } else {
            debug!("Skipping non-FCS file {}", path.display());
        }
    }
    found.sort();
    info!("Found {} FCS files in {}", found.len(), dir.display());
    Ok(found)
}

/// Parse many files independently.
///
/// Results come back in input order, one per path; a failing file does not
/// stop the others. With the `parallel` feature files are parsed on a rayon
/// pool sized by `threads` (all cores when `None`).
pub fn read_batch(
    paths: &[PathBuf],
    reader: &FcsReader,
    threads: Option<usize>,
) -> Vec<Result<Frame, FcsError>> {
    let read_one = |path: &PathBuf| {
        let result = reader.read_path(path);
        if let Err(e) = &result {
            warn!("Failed to read {}: {}", path.display(), e);
        }
        result
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let run = || paths.par_iter().map(read_one).collect::<Vec<_>>();
        match threads {
            Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!("Could not build a {}-thread pool ({}), using the global pool", n, e);
                    run()
                }
            },
            None => run(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        if threads.is_some_and(|n| n > 1) {
            debug!("Built without the parallel feature; reading sequentially");
        }
        paths.iter().map(read_one).collect()
    }
}
