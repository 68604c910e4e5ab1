//! Choice datasets: one row per candidate of a growth event, grouped into choice sets.
//!
//! A dataset is usually produced by [crate::synth::process_edges] and read back with
//! [read_choices]. The CSV layout is one row per candidate:
//!
//! ```text
//! choice_id,y,deg,fof
//! 0,1,3,0
//! 0,0,1,1
//! 0,0,7,0
//! ```
//!
//! where `y` marks the candidate that was actually chosen, `deg` is its degree at the time
//! of the choice and `fof` whether it was a friend-of-friend of the chooser.

pub mod error;
pub mod parser;
pub mod structs;

pub use error::DataError;
pub use parser::read_choices;
pub use structs::{ChoiceData, ChoiceSet};
