//! Bin packer (C5)
//!
//! First-Fit Decreasing: sort test files by weight descending (ties broken
//! by path ascending), then place each file into the currently lightest
//! bin, breaking ties by smallest bin index. Empty bins are allowed and are
//! always present in the output.

use std::path::{Path, PathBuf};

use crate::model::WeightedFiles;

/// Packs `files` into exactly `n.max(1)` bins, minimising the maximum bin
/// load. `files` is a [`WeightedFiles`] (a `BTreeMap`) so iteration and the
/// path tie-break are both already in lexicographic order.
pub fn pack(files: &WeightedFiles, n: u32) -> Vec<Vec<PathBuf>> {
    let n = n.max(1) as usize;

    let mut entries: Vec<(&Path, u32)> = files.iter().map(|(p, &w)| (p.as_path(), w)).collect();
    // BTreeMap iteration is already path-ascending; stable-sort by weight
    // descending preserves that as the tie-break.
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut bins: Vec<Vec<PathBuf>> = vec![Vec::new(); n];
    let mut loads = vec![0u64; n];

    for (path, weight) in entries {
        let target = loads
            .iter()
            .enumerate()
            .min_by_key(|&(idx, &load)| (load, idx))
            .map(|(idx, _)| idx)
            .expect("n is at least 1");

        bins[target].push(path.to_path_buf());
        loads[target] += weight as u64;
    }

    bins
}
