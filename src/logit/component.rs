use crate::data::ChoiceSet;
use crate::util::smoothed_ln;

use super::LogitError;

/// Search interval for a free log-degree exponent
pub const DEFAULT_ALPHA_BOUNDS: (f64, f64) = (-10.0, 10.0);

/// A sub-model of a [super::MixedLogitModel]
///
/// Each component assigns a probability to every candidate of a choice set.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Every candidate is equally likely
    Uniform,
    /// Conditional logit on `alpha * ln(deg)`
    ///
    /// The exponent is searched within `bounds`; equal bounds pin it.
    LogDegree { alpha: f64, bounds: (f64, f64) },
    /// Uniform over the friend-of-friend candidates, zero for the others
    UniformFof,
}

impl Component {
    /// A log-degree component starting at `alpha = 1`, clamped into `bounds`
    pub fn log_degree(bounds: Option<(f64, f64)>) -> Self {
        let bounds = bounds.unwrap_or(DEFAULT_ALPHA_BOUNDS);
        Component::LogDegree {
            alpha: 1.0_f64.clamp(bounds.0, bounds.1),
            bounds,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Component::Uniform => "uniform",
            Component::LogDegree { .. } => "log_degree",
            Component::UniformFof => "uniform_fof",
        }
    }

    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Component::LogDegree { .. } => &["alpha"],
            Component::Uniform | Component::UniformFof => &[],
        }
    }

    pub fn params(&self) -> Vec<f64> {
        match self {
            Component::LogDegree { alpha, .. } => vec![*alpha],
            Component::Uniform | Component::UniformFof => Vec::new(),
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Component::LogDegree { bounds, .. } => Some(*bounds),
            Component::Uniform | Component::UniformFof => None,
        }
    }

    /// Whether the component has a parameter left for the fit to move
    pub fn is_free(&self) -> bool {
        self.bounds().is_some_and(|(lower, upper)| lower < upper)
    }

    /// Replace the parameters of the component
    ///
    /// # Errors
    ///
    /// Fails on a wrong parameter count or a value outside the component bounds.
    pub fn set_params(&mut self, params: &[f64]) -> Result<(), LogitError> {
        let expected = self.param_names().len();
        if params.len() != expected {
            return Err(LogitError::ParameterCount {
                component: self.name(),
                expected,
                got: params.len(),
            });
        }
        if let Component::LogDegree { alpha, bounds } = self {
            let value = params[0];
            if !(bounds.0..=bounds.1).contains(&value) {
                return Err(LogitError::OutOfBounds {
                    component: "log_degree",
                    value,
                    lower: bounds.0,
                    upper: bounds.1,
                });
            }
            *alpha = value;
        }
        Ok(())
    }

    /// Probability this component gives to the chosen candidate of `set`
    pub fn chosen_probability(&self, set: &ChoiceSet) -> f64 {
        match self {
            Component::Uniform => 1.0 / set.len() as f64,
            Component::LogDegree { alpha, .. } => log_degree_probability(*alpha, set),
            Component::UniformFof => {
                if set.chosen_is_fof() {
                    1.0 / set.n_fof() as f64
                } else {
                    0.0
                }
            }
        }
    }

    /// Probabilities over all candidates of `set`
    pub fn probabilities(&self, set: &ChoiceSet) -> Vec<f64> {
        match self {
            Component::Uniform => vec![1.0 / set.len() as f64; set.len()],
            Component::LogDegree { alpha, .. } => {
                let utilities = log_degree_utilities(*alpha, set);
                let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let exp: Vec<f64> = utilities.iter().map(|u| (u - max).exp()).collect();
                let total: f64 = exp.iter().sum();
                exp.into_iter().map(|e| e / total).collect()
            }
            Component::UniformFof => {
                let n_fof = set.n_fof();
                set.fof()
                    .iter()
                    .map(|&f| if f { 1.0 / n_fof as f64 } else { 0.0 })
                    .collect()
            }
        }
    }
}

fn log_degree_utilities(alpha: f64, set: &ChoiceSet) -> Vec<f64> {
    set.degrees()
        .iter()
        .map(|&d| alpha * smoothed_ln(d))
        .collect()
}

/// `deg^alpha / sum(deg^alpha)` for the chosen candidate, evaluated in log space
pub(crate) fn log_degree_probability(alpha: f64, set: &ChoiceSet) -> f64 {
    let utilities = log_degree_utilities(alpha, set);
    let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = utilities.iter().map(|u| (u - max).exp()).sum();
    (utilities[set.chosen()] - max).exp() / total
}
