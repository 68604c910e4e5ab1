use thiserror::Error;

use crate::data::DataError;

/// Errors raised while synthesizing graphs or extracting choice sets from them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A mixing probability outside `[0, 1]`
    #[error("Invalid probability: {name} = {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    /// Every new node must add at least one edge
    #[error("Number of edges per node must be positive")]
    NoEdgesPerNode,
    /// The seed graph is already larger than the requested graph
    #[error("Seed graph has {seed} nodes, more than the requested {n_max}")]
    SeedTooLarge { seed: usize, n_max: usize },
    /// The seed graph and the options disagree on edge direction
    #[error("Seed graph directedness ({seed}) does not match the requested directedness ({requested})")]
    DirectionMismatch { seed: bool, requested: bool },
    /// Error encountered when reading or writing an edge list
    #[error("CSV error: {0}")]
    CSVError(String),
    /// Error in the extracted choice data
    #[error(transparent)]
    Data(#[from] DataError),
}
