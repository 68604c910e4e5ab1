//! Synthetic growing graphs and their conversion into choice sets.
//!
//! [make_rp_graph] grows a graph under the (r,p) attachment rule and returns the
//! time-ordered edge list; [process_edges] replays such an edge list and turns every
//! attachment to an existing node into a [crate::ChoiceSet] with sampled alternatives.

mod error;
pub mod generate;
pub mod graph;
pub mod process;

pub use error::GraphError;
pub use generate::{make_rp_graph, read_edge_list, write_edge_list, Edge, RpGraphOptions};
pub use graph::Graph;
pub use process::{process_all_edges, process_edges};
