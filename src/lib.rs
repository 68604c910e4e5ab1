pub mod config;
pub mod data;
pub mod error;
pub mod figures;
pub mod logit;
pub mod synth;
pub mod util;

pub use crate::config::{Config, ConfigError, GraphSpec};
pub use crate::data::*;
pub use crate::figures::{run_all, run_figure, Figure};
pub use crate::logit::{DegreeModel, LogDegreeModel, MixedLogitModel};
pub use error::NetgrowthError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            parser::{read_choices, read_choices_from_reader},
            ChoiceData, ChoiceSet, DataError,
        };
    }
    pub mod models {
        pub use crate::logit::{
            Component, DegreeModel, FitStats, LogDegreeModel, LogitError, MixedLogitModel,
        };
    }
    pub mod synth {
        pub use crate::synth::{
            make_rp_graph, process_all_edges, process_edges, read_edge_list, write_edge_list,
            Edge, Graph, RpGraphOptions,
        };
    }

    pub use crate::config::{Config, GraphSpec};
    pub use crate::data::*;
    pub use crate::logit::{Component, DegreeModel, FitStats, LogDegreeModel, MixedLogitModel};
    pub use crate::synth::{make_rp_graph, process_edges, Graph, RpGraphOptions};
    pub use crate::util::{arange, create_rng, DataPaths, LOG_SMOOTH};
    pub use crate::NetgrowthError;
}
