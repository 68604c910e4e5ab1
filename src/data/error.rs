use thiserror::Error;

/// Errors raised while building or reading choice data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Error encountered when reading or writing CSV data
    #[error("CSV error: {0}")]
    CSVError(String),
    /// A choice set without a chosen alternative
    #[error("Choice set {id} has no chosen alternative")]
    NoChoice { id: usize },
    /// A choice set where more than one alternative is marked as chosen
    #[error("Choice set {id} has {count} chosen alternatives, expected exactly one")]
    MultipleChoices { id: usize, count: usize },
    /// Degrees must be finite and non-negative
    #[error("Invalid degree {value} in choice set {id}")]
    InvalidDegree { id: usize, value: f64 },
    /// Per-candidate columns of different lengths
    #[error("Choice set {id} has {degrees} degrees but {flags} friend-of-friend flags")]
    LengthMismatch {
        id: usize,
        degrees: usize,
        flags: usize,
    },
    /// Index of the chosen alternative is outside the set
    #[error("Chosen index {chosen} is out of range for choice set {id} with {len} alternatives")]
    ChosenOutOfRange { id: usize, chosen: usize, len: usize },
}
