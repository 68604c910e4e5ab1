use argmin::{
    core::{CostFunction, Error, Executor, State},
    solver::brent::BrentOpt,
};
use ndarray::{Array1, Array2, Axis};
use std::io::Write;
use std::path::Path;

use super::{Component, LogitError};
use crate::data::ChoiceData;
use crate::util::{create_parent, smoothed_ln};

/// Mixing weights may undershoot zero by this much before they are rejected
const NEGATIVE_WEIGHT_TOL: f64 = 1e-12;
/// Allowed deviation of the weight sum from one
const WEIGHT_SUM_TOL: f64 = 1e-9;
const BRENT_MAX_ITERS: u64 = 100;

/// A weighted mixture of attachment components
///
/// The probability of the chosen candidate of set `i` is `sum_k pk * P_k(chosen_i)`.
/// Components are added with the `add_*` methods; every addition resets the weights to
/// uniform. The model borrows its data, so one dataset can back several models.
#[derive(Debug, Clone)]
pub struct MixedLogitModel<'a> {
    name: String,
    data: &'a ChoiceData,
    components: Vec<Component>,
    weights: Vec<f64>,
}

/// Parameters and log-likelihood after one EM round
///
/// Round 0 holds the starting point.
#[derive(Debug, Clone, PartialEq)]
pub struct EmRound {
    pub round: usize,
    pub log_likelihood: f64,
    pub weights: Vec<f64>,
    pub params: Vec<f64>,
}

/// Trace of an EM fit, one [EmRound] per row
#[derive(Debug, Clone, PartialEq)]
pub struct FitStats {
    columns: Vec<String>,
    rounds: Vec<EmRound>,
}

impl<'a> MixedLogitModel<'a> {
    pub fn new(name: impl Into<String>, data: &'a ChoiceData) -> Self {
        Self {
            name: name.into(),
            data,
            components: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_component(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        let n = self.components.len();
        self.weights = vec![1.0 / n as f64; n];
        self
    }

    pub fn add_uniform_model(&mut self) -> &mut Self {
        self.add_component(Component::Uniform)
    }

    /// Add a log-degree component searching `alpha` within `bounds`
    ///
    /// `None` uses [super::DEFAULT_ALPHA_BOUNDS]; equal bounds pin `alpha` to that value.
    pub fn add_log_degree_model(&mut self, bounds: Option<(f64, f64)>) -> &mut Self {
        self.add_component(Component::log_degree(bounds))
    }

    pub fn add_uniform_fof_model(&mut self) -> &mut Self {
        self.add_component(Component::UniformFof)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Replace the mixing weights
    ///
    /// # Errors
    ///
    /// Fails unless there is one weight per component, no weight is negative and the
    /// weights sum to one. Tiny negative values from floating point grids are clamped to 0.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<(), LogitError> {
        if weights.len() != self.components.len() {
            return Err(LogitError::InvalidWeights {
                reason: format!(
                    "expected {} weights, got {}",
                    self.components.len(),
                    weights.len()
                ),
            });
        }
        if let Some(w) = weights
            .iter()
            .find(|w| !w.is_finite() || **w < -NEGATIVE_WEIGHT_TOL)
        {
            return Err(LogitError::InvalidWeights {
                reason: format!("weight {} is negative or not finite", w),
            });
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOL {
            return Err(LogitError::InvalidWeights {
                reason: format!("weights sum to {}", sum),
            });
        }
        self.weights = weights.iter().map(|w| w.max(0.0)).collect();
        Ok(())
    }

    /// Set the parameters of component `index`
    pub fn set_params(&mut self, index: usize, params: &[f64]) -> Result<(), LogitError> {
        let model = self.name.clone();
        self.components
            .get_mut(index)
            .ok_or(LogitError::UnknownComponent { model, index })?
            .set_params(params)
    }

    fn check(&self) -> Result<(), LogitError> {
        if self.components.is_empty() {
            return Err(LogitError::NoComponents {
                model: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Probability each component gives to the chosen candidate, one row per choice set
    pub fn component_probabilities(&self) -> Array2<f64> {
        let mut probs = Array2::zeros((self.data.len(), self.components.len()));
        for (i, set) in self.data.iter().enumerate() {
            for (k, component) in self.components.iter().enumerate() {
                probs[[i, k]] = component.chosen_probability(set);
            }
        }
        probs
    }

    fn mixture_ll(&self, probs: &Array2<f64>) -> f64 {
        let weights = Array1::from(self.weights.clone());
        probs.dot(&weights).mapv(smoothed_ln).sum()
    }

    /// `sum_i ln(sum_k pk * P_k(chosen_i) + LOG_SMOOTH)`
    pub fn log_likelihood(&self) -> Result<f64, LogitError> {
        self.check()?;
        Ok(self.mixture_ll(&self.component_probabilities()))
    }

    fn params(&self) -> Vec<f64> {
        self.components.iter().flat_map(|c| c.params()).collect()
    }

    fn round(&self, round: usize, log_likelihood: f64) -> EmRound {
        EmRound {
            round,
            log_likelihood,
            weights: self.weights.clone(),
            params: self.params(),
        }
    }

    /// Fit weights and free component parameters by expectation-maximization
    ///
    /// Each round computes the responsibility of every component for every choice, sets
    /// the weights to the mean responsibilities and refits free one-parameter components
    /// on their responsibility-weighted log-likelihood with Brent's method. Fitting stops
    /// after `n_rounds` rounds or once a round improves the log-likelihood by less than
    /// `etol`.
    pub fn fit(&mut self, n_rounds: usize, etol: f64) -> Result<FitStats, LogitError> {
        self.check()?;
        if self.data.is_empty() {
            return Err(LogitError::EmptyData);
        }

        let mut probs = self.component_probabilities();
        let mut ll = self.mixture_ll(&probs);
        let mut stats = FitStats::new(&self.components);
        stats.rounds.push(self.round(0, ll));
        tracing::debug!("[{}] round 0: ll = {:.4}", self.name, ll);

        for round in 1..=n_rounds {
            let resp = self.responsibilities(&probs);
            if let Some(mean) = resp.mean_axis(Axis(0)) {
                self.weights = mean.to_vec();
            }

            for k in 0..self.components.len() {
                if !self.components[k].is_free() {
                    continue;
                }
                let column = resp.column(k).to_vec();
                let alpha = self.refit_component(k, &column)?;
                self.components[k].set_params(&[alpha])?;
            }

            probs = self.component_probabilities();
            let next = self.mixture_ll(&probs);
            if !next.is_finite() {
                return Err(LogitError::NonFinite { value: next });
            }
            let gain = next - ll;
            ll = next;
            stats.rounds.push(self.round(round, ll));
            tracing::debug!(
                "[{}] round {}: ll = {:.4}, gain = {:.3e}, weights = {:?}",
                self.name,
                round,
                ll,
                gain,
                self.weights
            );
            if gain < etol {
                break;
            }
        }

        tracing::info!(
            "[{}] EM finished after {} rounds: ll = {:.4}",
            self.name,
            stats.rounds.len() - 1,
            ll
        );
        Ok(stats)
    }

    /// Posterior share of each component in each choice
    ///
    /// A choice no component can explain falls back to the current weights.
    fn responsibilities(&self, probs: &Array2<f64>) -> Array2<f64> {
        let mut resp = probs.clone();
        for mut row in resp.rows_mut() {
            row.iter_mut()
                .zip(&self.weights)
                .for_each(|(p, w)| *p *= w);
            let total = row.sum();
            if total > 0.0 {
                row.mapv_inplace(|r| r / total);
            } else {
                row.iter_mut()
                    .zip(&self.weights)
                    .for_each(|(r, w)| *r = *w);
            }
        }
        resp
    }

    fn refit_component(&self, k: usize, weights: &[f64]) -> Result<f64, LogitError> {
        let (lower, upper) = self.components[k]
            .bounds()
            .ok_or(LogitError::ParameterCount {
                component: self.components[k].name(),
                expected: 0,
                got: 1,
            })?;
        let cost = WeightedComponentCost {
            component: &self.components[k],
            data: self.data,
            weights,
        };
        let result = Executor::new(cost, BrentOpt::new(lower, upper))
            .configure(|state| state.max_iters(BRENT_MAX_ITERS))
            .run()?;
        result
            .state()
            .get_best_param()
            .copied()
            .ok_or_else(|| LogitError::Optimizer("Brent search returned no parameter".to_string()))
    }
}

/// Responsibility-weighted negative log-likelihood of one component, as a function of its
/// single parameter
struct WeightedComponentCost<'a> {
    component: &'a Component,
    data: &'a ChoiceData,
    weights: &'a [f64],
}

impl CostFunction for WeightedComponentCost<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let mut component = self.component.clone();
        component.set_params(&[*param])?;
        Ok(-self
            .data
            .iter()
            .zip(self.weights)
            .map(|(set, w)| w * smoothed_ln(component.chosen_probability(set)))
            .sum::<f64>())
    }
}

impl FitStats {
    fn new(components: &[Component]) -> Self {
        let labels = component_labels(components);
        let mut columns = vec!["round".to_string(), "ll".to_string()];
        columns.extend(labels.iter().map(|l| format!("p_{}", l)));
        for (label, component) in labels.iter().zip(components) {
            columns.extend(
                component
                    .param_names()
                    .iter()
                    .map(|p| format!("{}_{}", label, p)),
            );
        }
        Self {
            columns,
            rounds: Vec::new(),
        }
    }

    /// Column names of the CSV output
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rounds(&self) -> &[EmRound] {
        &self.rounds
    }

    /// The final round
    pub fn last(&self) -> Option<&EmRound> {
        self.rounds.last()
    }

    /// Write the trace as CSV, creating missing parent directories
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), LogitError> {
        let path = path.as_ref();
        create_parent(path).map_err(|e| LogitError::CSVError(e.to_string()))?;
        let file = std::fs::File::create(path)
            .map_err(|e| LogitError::CSVError(format!("{}: {}", path.display(), e)))?;
        self.write_to(file)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), LogitError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer
            .write_record(&self.columns)
            .map_err(|e| LogitError::CSVError(e.to_string()))?;
        for round in &self.rounds {
            let mut record = vec![round.round.to_string(), round.log_likelihood.to_string()];
            record.extend(round.weights.iter().map(|w| w.to_string()));
            record.extend(round.params.iter().map(|p| p.to_string()));
            writer
                .write_record(&record)
                .map_err(|e| LogitError::CSVError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| LogitError::CSVError(e.to_string()))?;
        Ok(())
    }
}

/// Component names, suffixed with their position when a name repeats
fn component_labels(components: &[Component]) -> Vec<String> {
    components
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let repeated = components.iter().filter(|o| o.name() == c.name()).count() > 1;
            if repeated {
                format!("{}{}", c.name(), k)
            } else {
                c.name().to_string()
            }
        })
        .collect()
}
