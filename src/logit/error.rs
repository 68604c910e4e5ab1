use thiserror::Error;

/// Errors raised while evaluating or fitting choice models
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogitError {
    /// Fitting needs at least one choice set
    #[error("No choice sets to fit")]
    EmptyData,
    /// A mixed logit without components has no likelihood
    #[error("Model {model} has no components")]
    NoComponents { model: String },
    /// Component index out of range
    #[error("Model {model} has no component {index}")]
    UnknownComponent { model: String, index: usize },
    /// Wrong number of parameters for a component
    #[error("Component {component} takes {expected} parameters, got {got}")]
    ParameterCount {
        component: &'static str,
        expected: usize,
        got: usize,
    },
    /// Parameter outside the component bounds
    #[error("Parameter {value} of {component} is outside its bounds [{lower}, {upper}]")]
    OutOfBounds {
        component: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// Mixing weights must be non-negative, one per component, summing to one
    #[error("Invalid mixing weights: {reason}")]
    InvalidWeights { reason: String },
    /// The optimizer failed or returned no parameters
    #[error("Optimizer error: {0}")]
    Optimizer(String),
    /// The log-likelihood was not finite
    #[error("Non-finite log-likelihood {value}")]
    NonFinite { value: f64 },
    /// Error encountered when writing fit statistics
    #[error("CSV error: {0}")]
    CSVError(String),
}

impl From<argmin::core::Error> for LogitError {
    fn from(e: argmin::core::Error) -> Self {
        LogitError::Optimizer(e.to_string())
    }
}
