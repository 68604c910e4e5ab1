use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::logit::LogitError;
use crate::synth::GraphError;

#[derive(Error, Debug)]
pub enum NetgrowthError {
    #[error("Error in the choice data: {0}")]
    Data(#[from] DataError),
    #[error("Error while synthesizing a graph: {0}")]
    Graph(#[from] GraphError),
    #[error("Error in a choice model: {0}")]
    Logit(#[from] LogitError),
    #[error("Error in the configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Error writing {path}: {reason}")]
    Output { path: String, reason: String },
}
