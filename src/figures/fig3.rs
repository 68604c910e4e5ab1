use rand::Rng;
use std::path::PathBuf;

use super::{output_error, results_writer};
use crate::config::{Config, GraphSpec};
use crate::error::NetgrowthError;
use crate::synth::make_rp_graph;

/// Degree histograms of graphs grown over the configured `(r, p)` grid
///
/// Only the distribution is written; the power-law fits are left to the plotting stage.
pub(super) fn run<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<PathBuf>, NetgrowthError> {
    let settings = &config.fig3;
    let path = config.results_dir.join("fig3_data.csv");
    let mut writer = results_writer(&path)?;
    writer
        .write_record(["r", "p", "deg", "count"])
        .map_err(|e| output_error(&path, e))?;

    for &(r, p) in &settings.grid {
        let mut spec = GraphSpec::rp_grid_point(r, p).with_n_max(settings.n_max);
        spec.m = settings.m;
        spec.seed_clique = settings.seed_clique;
        let (graph, _) = make_rp_graph(&spec.options(), rng)?;
        let counts = graph.degree_counts();
        tracing::debug!(
            "{}: {} distinct degrees, max degree {:?}",
            spec.title(),
            counts.len(),
            counts.keys().last()
        );
        for (deg, count) in counts {
            writer
                .write_record([
                    format!("{:.2}", r),
                    format!("{:.2}", p),
                    deg.to_string(),
                    count.to_string(),
                ])
                .map_err(|e| output_error(&path, e))?;
        }
    }
    writer.flush().map_err(|e| output_error(&path, e))?;

    Ok(vec![path])
}
