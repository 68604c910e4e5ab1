//! Run configuration for the figure pipeline.
//!
//! Every field has a default, so an empty JSON object (or no file at all) reproduces the
//! published figure inputs. Fields given in a file override the defaults one by one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::synth::{Graph, RpGraphOptions};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Could not parse configuration: {0}")]
    Parse(String),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// A synthetic graph together with the choice extraction applied to it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphSpec {
    /// File stem under `synth_graphs/` and `choices/`
    pub name: String,
    pub r: f64,
    pub p: f64,
    pub n_max: usize,
    /// Edges per new node
    pub m: usize,
    /// Size of the complete seed graph; `None` starts from the complete graph on `m + 1`
    /// nodes
    #[serde(default)]
    pub seed_clique: Option<usize>,
    /// Negative candidates per choice set
    pub n_alt: usize,
}

impl GraphSpec {
    pub fn new(name: impl Into<String>, r: f64, p: f64) -> Self {
        Self {
            name: name.into(),
            r,
            p,
            n_max: 2000,
            m: 1,
            seed_clique: None,
            n_alt: 20,
        }
    }

    /// Undirected graph grown from a clique, named after its parameters
    /// (`g-1.00-0.50-u-fig3`)
    pub fn rp_grid_point(r: f64, p: f64) -> Self {
        Self {
            name: format!("g-{:.2}-{:.2}-u-fig3", r, p),
            r,
            p,
            n_max: 10000,
            m: 5,
            seed_clique: Some(10),
            n_alt: 100,
        }
    }

    pub fn with_n_max(mut self, n_max: usize) -> Self {
        self.n_max = n_max;
        self
    }

    pub fn with_n_alt(mut self, n_alt: usize) -> Self {
        self.n_alt = n_alt;
        self
    }

    /// Label used in figure CSVs, e.g. `r=1.00, p=0.50`
    pub fn title(&self) -> String {
        format!("r={:.2}, p={:.2}", self.r, self.p)
    }

    pub fn options(&self) -> RpGraphOptions {
        let options = RpGraphOptions::new(self.n_max, self.r, self.p).with_edges_per_node(self.m);
        match self.seed_clique {
            Some(n) => options.with_seed_graph(Graph::complete(n, false)),
            None => options,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            field: format!("{}.{}", field, self.name),
            reason,
        };
        if self.name.is_empty() {
            return Err(ConfigError::Invalid {
                field: field.to_string(),
                reason: "graph name is empty".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.r) || !(0.0..=1.0).contains(&self.p) {
            return Err(invalid(format!(
                "r = {} and p = {} must lie in [0, 1]",
                self.r, self.p
            )));
        }
        if self.m == 0 {
            return Err(invalid("m must be positive".to_string()));
        }
        if self.n_alt == 0 {
            return Err(invalid("n_alt must be positive".to_string()));
        }
        Ok(())
    }
}

/// Likelihood surface and EM trace
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Fig1Config {
    /// Choice file to analyse; synthesized from `graph` when absent
    pub choices: Option<PathBuf>,
    pub graph: GraphSpec,
    /// Grid step for both `alpha` in `[0, 2)` and `p` in `[0, 1)`
    pub step: f64,
    pub n_rounds: usize,
    pub etol: f64,
    pub initial_alpha: f64,
}

impl Default for Fig1Config {
    fn default() -> Self {
        Self {
            choices: None,
            graph: GraphSpec::new("fig1_pa", 1.0, 0.5),
            step: 0.01,
            n_rounds: 100,
            etol: 0.001,
            initial_alpha: 0.25,
        }
    }
}

/// Attachment function of a nearly preferential graph
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Fig2Config {
    pub graph: GraphSpec,
    pub max_deg: usize,
}

impl Default for Fig2Config {
    fn default() -> Self {
        Self {
            graph: GraphSpec::new("test_pa", 1.0, 0.01),
            max_deg: 100,
        }
    }
}

/// Degree distributions over an `(r, p)` grid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Fig3Config {
    pub grid: Vec<(f64, f64)>,
    pub n_max: usize,
    pub m: usize,
    pub seed_clique: Option<usize>,
}

impl Default for Fig3Config {
    fn default() -> Self {
        let values = [0.0, 0.5, 1.0];
        Self {
            grid: values
                .iter()
                .flat_map(|&r| values.iter().map(move |&p| (r, p)))
                .collect(),
            n_max: 10000,
            m: 5,
            seed_clique: Some(10),
        }
    }
}

/// Misspecified mixtures evaluated along their weight
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Fig4Config {
    pub graphs: Vec<GraphSpec>,
    /// Step of the weight grid `[0, 1]`
    pub step: f64,
}

impl Default for Fig4Config {
    fn default() -> Self {
        Self {
            graphs: vec![
                GraphSpec::rp_grid_point(1.0, 0.5),
                GraphSpec::rp_grid_point(0.5, 1.0),
            ],
            step: 0.05,
        }
    }
}

/// Non-parametric attachment functions of the figure 4 graphs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Fig5Config {
    pub max_deg: usize,
}

impl Default for Fig5Config {
    fn default() -> Self {
        Self { max_deg: 100 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub seed: u64,
    pub show_progress: bool,
    pub fig1: Fig1Config,
    pub fig2: Fig2Config,
    pub fig3: Fig3Config,
    pub fig4: Fig4Config,
    pub fig5: Fig5Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            seed: 0,
            show_progress: false,
            fig1: Fig1Config::default(),
            fig2: Fig2Config::default(),
            fig3: Fig3Config::default(),
            fig4: Fig4Config::default(),
            fig5: Fig5Config::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable progress bars for long sweeps
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("{} is not a positive number", value),
                })
            }
        };
        positive("fig1.step", self.fig1.step)?;
        positive("fig4.step", self.fig4.step)?;
        if self.fig1.etol < 0.0 {
            return Err(ConfigError::Invalid {
                field: "fig1.etol".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        self.fig1.graph.validate("fig1.graph")?;
        self.fig2.graph.validate("fig2.graph")?;
        for graph in &self.fig4.graphs {
            graph.validate("fig4.graphs")?;
        }
        for &(r, p) in &self.fig3.grid {
            if !(0.0..=1.0).contains(&r) || !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid {
                    field: "fig3.grid".to_string(),
                    reason: format!("(r, p) = ({}, {}) is outside [0, 1]", r, p),
                });
            }
        }
        if self.fig3.m == 0 {
            return Err(ConfigError::Invalid {
                field: "fig3.m".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
