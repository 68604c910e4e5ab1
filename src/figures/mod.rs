//! CSV inputs for the paper figures.
//!
//! Each figure is an independent block that synthesizes or loads choice data, fits or
//! evaluates models and writes one or two CSV files to the results directory. Every
//! block draws from its own RNG seeded with `config.seed + <figure number>`, so a block
//! gives the same output whether it runs alone or after the others.

mod fig1;
mod fig2;
mod fig3;
mod fig4;
mod fig5;

pub use fig1::{likelihood_surface, SurfacePoint};

use csv::WriterBuilder;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::{Config, GraphSpec};
use crate::data::ChoiceData;
use crate::error::NetgrowthError;
use crate::synth::{make_rp_graph, process_all_edges, write_edge_list};
use crate::util::{create_parent, create_rng, DataPaths};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Figure {
    /// Likelihood surface of the uniform / preferential mixture
    LikelihoodSurface,
    /// Non-parametric attachment function
    AttachmentFunction,
    /// Degree distributions of (r,p) graphs
    DegreeDistributions,
    /// Log-likelihood of misspecified mixtures
    Misspecified,
    /// Non-parametric estimates per generating model
    PerModelEstimates,
}

impl Figure {
    pub const ALL: [Figure; 5] = [
        Figure::LikelihoodSurface,
        Figure::AttachmentFunction,
        Figure::DegreeDistributions,
        Figure::Misspecified,
        Figure::PerModelEstimates,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Figure::LikelihoodSurface => 1,
            Figure::AttachmentFunction => 2,
            Figure::DegreeDistributions => 3,
            Figure::Misspecified => 4,
            Figure::PerModelEstimates => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.number() == n)
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "figure {}", self.number())
    }
}

/// Run one figure block and return the files it wrote
pub fn run_figure(figure: Figure, config: &Config) -> Result<Vec<PathBuf>, NetgrowthError> {
    let mut rng = create_rng(config.seed.wrapping_add(u64::from(figure.number())));
    tracing::info!("Generating data for {}", figure);
    let files = match figure {
        Figure::LikelihoodSurface => fig1::run(config, &mut rng)?,
        Figure::AttachmentFunction => fig2::run(config, &mut rng)?,
        Figure::DegreeDistributions => fig3::run(config, &mut rng)?,
        Figure::Misspecified => fig4::run(config, &mut rng)?,
        Figure::PerModelEstimates => fig5::run(config, &mut rng)?,
    };
    for file in &files {
        tracing::info!("Wrote {}", file.display());
    }
    Ok(files)
}

/// Run the given blocks in figure order
pub fn run_all(figures: &[Figure], config: &Config) -> Result<Vec<PathBuf>, NetgrowthError> {
    let mut selected = figures.to_vec();
    selected.sort();
    selected.dedup();
    let mut files = Vec::new();
    for figure in selected {
        files.extend(run_figure(figure, config)?);
    }
    Ok(files)
}

/// Settings a choice file was synthesized from, stored next to it as JSON
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Provenance {
    pub seed: u64,
    pub graph: GraphSpec,
}

impl Provenance {
    pub(crate) fn new(seed: u64, graph: &GraphSpec) -> Self {
        Self {
            seed,
            graph: graph.clone(),
        }
    }

    /// The record stored for the named graph, if any
    pub(crate) fn read(paths: &DataPaths, name: &str) -> Option<Self> {
        let file = File::open(paths.provenance(name)).ok()?;
        serde_json::from_reader(std::io::BufReader::new(file)).ok()
    }

    fn write(&self, paths: &DataPaths) -> Result<(), NetgrowthError> {
        let path = paths.provenance(&self.graph.name);
        create_parent(&path).map_err(|e| output_error(&path, e))?;
        let file = File::create(&path).map_err(|e| output_error(&path, e))?;
        serde_json::to_writer_pretty(file, self).map_err(|e| output_error(&path, e))
    }
}

/// Grow the graph, store its edge list and turn it into choice sets on disk
///
/// The graph settings and the run seed are recorded next to the choice file.
pub(crate) fn synthesize<R: Rng + ?Sized>(
    spec: &GraphSpec,
    paths: &DataPaths,
    seed: u64,
    rng: &mut R,
) -> Result<ChoiceData, NetgrowthError> {
    let (graph, edges) = make_rp_graph(&spec.options(), rng)?;
    tracing::info!(
        "Synthesized {} ({}): {} nodes, {} edges",
        spec.name,
        spec.title(),
        graph.n_nodes(),
        graph.n_edges()
    );
    write_edge_list(&edges, paths.graph(&spec.name))?;
    let data = process_all_edges(paths, &spec.name, spec.n_alt, false, rng)?;
    Provenance::new(seed, spec).write(paths)?;
    Ok(data)
}

/// CSV writer for a results file, creating missing directories
pub(crate) fn results_writer(path: &Path) -> Result<csv::Writer<File>, NetgrowthError> {
    create_parent(path).map_err(|e| output_error(path, e))?;
    let file = File::create(path).map_err(|e| output_error(path, e))?;
    Ok(WriterBuilder::new().has_headers(false).from_writer(file))
}

pub(crate) fn output_error(path: &Path, e: impl ToString) -> NetgrowthError {
    NetgrowthError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_numbers() {
        for (i, figure) in Figure::ALL.iter().enumerate() {
            assert_eq!(figure.number() as usize, i + 1);
            assert_eq!(Figure::from_number(figure.number()), Some(*figure));
        }
        assert_eq!(Figure::from_number(0), None);
        assert_eq!(Figure::from_number(6), None);
        assert_eq!(Figure::Misspecified.to_string(), "figure 4");
    }
}
