//! Discrete-choice models of attachment.
//!
//! Every model assigns, within each [crate::ChoiceSet], a probability to every candidate
//! and is scored by the log-likelihood of the candidates that were actually chosen.
//!
//! - [DegreeModel]: non-parametric attachment function, one utility per degree
//! - [LogDegreeModel]: utility `alpha * ln(deg)`, so `alpha = 1` is linear preferential
//!   attachment
//! - [MixedLogitModel]: a weighted mixture of [Component]s (uniform, log-degree,
//!   uniform over friends-of-friends) fitted by expectation-maximization
//!
//! ```ignore
//! use netgrowth::prelude::*;
//!
//! let data = read_choices("data/choices/test_pa.csv")?;
//! let mut m = MixedLogitModel::new("fig1_em", &data);
//! m.add_uniform_model();
//! m.add_log_degree_model(None);
//! m.set_params(1, &[0.25])?;
//! let stats = m.fit(100, 1e-3)?;
//! stats.write_csv("results/fig1_data_em.csv")?;
//! ```

mod component;
mod degree;
mod design;
mod error;
mod mixed;

pub(crate) use component::log_degree_probability;
pub use component::{Component, DEFAULT_ALPHA_BOUNDS};
pub use degree::{DegreeModel, LogDegreeModel};
pub use design::LogitFit;
pub use error::LogitError;
pub use mixed::{EmRound, FitStats, MixedLogitModel};
