pub mod choices;

pub use choices::{read_choices, read_choices_from_reader};
