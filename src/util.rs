//! Shared numeric constants, grids, seeded RNGs and data-directory layout.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Additive smoothing applied before taking the logarithm of a degree or a probability.
///
/// Keeps `log(0)` finite for isolated nodes and for candidates that a model gives zero mass.
pub const LOG_SMOOTH: f64 = 1e-20;

/// `ln(x + LOG_SMOOTH)`
#[inline(always)]
pub fn smoothed_ln(x: f64) -> f64 {
    (x + LOG_SMOOTH).ln()
}

/// Half-open floating point grid `[start, stop)` with the given step.
///
/// Matches `numpy.arange`: the grid has `ceil((stop - start) / step)` points and
/// point `i` is `start + i * step`, so accumulated rounding never shifts later points.
///
/// Returns an empty grid when `step` is not strictly positive or `stop <= start`.
///
/// # Example
///
/// ```
/// use netgrowth::util::arange;
///
/// let xs = arange(0.0, 1.01, 0.05);
/// assert_eq!(xs.len(), 21);
/// assert_eq!(xs[0], 0.0);
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(stop > start) {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Creates a seeded random number generator.
///
/// The sequence is deterministic for a given seed, which is what makes a figure
/// reproducible from its configuration alone.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Location of synthesized edge lists and processed choice sets under a data directory.
///
/// ```text
/// <root>/synth_graphs/<graph>.csv   edge lists
/// <root>/choices/<graph>.csv        choice sets
/// <root>/choices/<graph>.json       settings the choice sets came from
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Edge list of the named synthetic graph
    pub fn graph(&self, name: &str) -> PathBuf {
        self.root.join("synth_graphs").join(format!("{}.csv", name))
    }

    /// Choice sets extracted from the named graph
    pub fn choices(&self, name: &str) -> PathBuf {
        self.root.join("choices").join(format!("{}.csv", name))
    }

    /// Settings the named choice sets were synthesized from
    pub fn provenance(&self, name: &str) -> PathBuf {
        self.root.join("choices").join(format!("{}.json", name))
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub(crate) fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
