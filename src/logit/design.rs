//! Conditional logit over sparse candidate features, fitted by L-BFGS.
//!
//! Every candidate carries at most one active feature `(index, value)`; its utility is
//! `theta[index] * value`, or zero without a feature. That covers both the one-hot degree
//! bins of [super::DegreeModel] and the single `ln(deg)` regressor of
//! [super::LogDegreeModel].

use argmin::{
    core::{CostFunction, Error, Executor, Gradient, State},
    solver::{linesearch::MoreThuenteLineSearch, quasinewton::LBFGS},
};
use argmin_math::ArgminL2Norm;
use nalgebra::DMatrix;
use std::collections::BTreeMap;

use super::LogitError;

const LBFGS_MEMORY: usize = 7;
const MAX_ITERS: u64 = 500;
const GRAD_TOL: f64 = 1e-8;
const COST_TOL: f64 = 1e-12;
/// Eigenvalues below this fraction of the largest one are treated as zero
const EIGEN_EPS: f64 = 1e-10;
/// Squared weight on dropped directions above which a parameter counts as not identified
const DROPPED_LOADING: f64 = 1e-6;

pub(crate) type Feature = Option<(usize, f64)>;

#[derive(Debug, Clone)]
struct DesignSet {
    chosen: usize,
    features: Vec<Feature>,
}

#[derive(Debug, Clone)]
pub(crate) struct LogitDesign {
    n_params: usize,
    sets: Vec<DesignSet>,
}

/// Result of a conditional logit fit
#[derive(Debug, Clone, PartialEq)]
pub struct LogitFit {
    /// Maximum likelihood estimate
    pub theta: Vec<f64>,
    /// Standard errors from the inverse observed information
    pub se: Vec<f64>,
    pub log_likelihood: f64,
    pub iterations: u64,
}

impl LogitDesign {
    pub(crate) fn new(n_params: usize) -> Self {
        Self {
            n_params,
            sets: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, chosen: usize, features: Vec<Feature>) {
        self.sets.push(DesignSet { chosen, features });
    }

    /// Softmax over the candidates of one set, together with the log-probability of the
    /// chosen candidate
    fn probabilities(&self, set: &DesignSet, theta: &[f64]) -> (Vec<f64>, f64) {
        let utilities: Vec<f64> = set
            .features
            .iter()
            .map(|f| f.map_or(0.0, |(i, x)| theta[i] * x))
            .collect();
        let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = utilities.iter().map(|u| (u - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        let log_chosen = utilities[set.chosen] - max - total.ln();
        (exp.into_iter().map(|e| e / total).collect(), log_chosen)
    }

    pub(crate) fn log_likelihood(&self, theta: &[f64]) -> f64 {
        self.sets
            .iter()
            .map(|set| self.probabilities(set, theta).1)
            .sum()
    }

    /// Gradient of the log-likelihood
    pub(crate) fn gradient(&self, theta: &[f64]) -> Vec<f64> {
        let mut grad = vec![0.0; self.n_params];
        for set in &self.sets {
            let (probs, _) = self.probabilities(set, theta);
            if let Some((i, x)) = set.features[set.chosen] {
                grad[i] += x;
            }
            for (feature, p) in set.features.iter().zip(&probs) {
                if let Some((i, x)) = feature {
                    grad[*i] -= p * x;
                }
            }
        }
        grad
    }

    /// Observed information, the negative Hessian of the log-likelihood
    ///
    /// Per set this is the covariance of the features under the model probabilities.
    pub(crate) fn information(&self, theta: &[f64]) -> DMatrix<f64> {
        let mut info = DMatrix::zeros(self.n_params, self.n_params);
        for set in &self.sets {
            let (probs, _) = self.probabilities(set, theta);
            let mut mean: BTreeMap<usize, f64> = BTreeMap::new();
            for (feature, p) in set.features.iter().zip(&probs) {
                if let Some((i, x)) = feature {
                    info[(*i, *i)] += p * x * x;
                    *mean.entry(*i).or_insert(0.0) += p * x;
                }
            }
            for (&a, &ma) in &mean {
                for (&b, &mb) in &mean {
                    info[(a, b)] -= ma * mb;
                }
            }
        }
        info
    }

    /// Maximize the log-likelihood from `theta0`
    pub(crate) fn fit(&self, theta0: Vec<f64>) -> Result<LogitFit, LogitError> {
        if self.sets.is_empty() {
            return Err(LogitError::EmptyData);
        }
        if theta0.len() != self.n_params {
            return Err(LogitError::ParameterCount {
                component: "conditional_logit",
                expected: self.n_params,
                got: theta0.len(),
            });
        }
        if self.n_params == 0 {
            let log_likelihood = self.log_likelihood(&[]);
            return Ok(LogitFit {
                theta: Vec::new(),
                se: Vec::new(),
                log_likelihood,
                iterations: 0,
            });
        }

        let linesearch: MoreThuenteLineSearch<Vec<f64>, Vec<f64>, f64> =
            MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, LBFGS_MEMORY)
            .with_tolerance_grad(GRAD_TOL)?
            .with_tolerance_cost(COST_TOL)?;
        let result = Executor::new(NegLogLikelihood { design: self }, solver)
            .configure(|state| state.param(theta0).max_iters(MAX_ITERS))
            .run()?;

        let state = result.state();
        let theta = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| LogitError::Optimizer("solver returned no parameters".to_string()))?;
        let log_likelihood = -state.get_best_cost();
        if !log_likelihood.is_finite() {
            return Err(LogitError::NonFinite {
                value: log_likelihood,
            });
        }
        let iterations = state.get_iter();

        tracing::debug!(
            "L-BFGS finished after {} iterations ({:?}): ll = {:.6}, ||grad|| = {:.3e}",
            iterations,
            state.get_termination_status(),
            log_likelihood,
            self.gradient(&theta).l2_norm()
        );

        let se = standard_errors(&self.information(&theta));
        Ok(LogitFit {
            theta,
            se,
            log_likelihood,
            iterations,
        })
    }
}

/// Exposes a [LogitDesign] to `argmin` as the negative log-likelihood
struct NegLogLikelihood<'a> {
    design: &'a LogitDesign,
}

impl CostFunction for NegLogLikelihood<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let ll = self.design.log_likelihood(theta);
        if !ll.is_finite() {
            return Err(LogitError::NonFinite { value: ll }.into());
        }
        Ok(-ll)
    }
}

impl Gradient for NegLogLikelihood<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.design.gradient(theta).into_iter().map(|g| -g).collect())
    }
}

/// Standard errors from the pseudo-inverse of the observed information
///
/// The information matrix is symmetric, so its pseudo-inverse is built from the
/// eigendecomposition, dropping directions with (numerically) zero curvature. A parameter
/// with weight on a dropped direction is not identified and gets a `NaN` standard error.
pub(crate) fn standard_errors(info: &DMatrix<f64>) -> Vec<f64> {
    let n = info.nrows();
    if n == 0 {
        return Vec::new();
    }
    let eigen = info.clone().symmetric_eigen();
    let largest = eigen.eigenvalues.iter().fold(0.0_f64, |m, l| m.max(l.abs()));
    let cutoff = EIGEN_EPS * largest.max(f64::MIN_POSITIVE);

    let mut variances = vec![0.0; n];
    let mut dropped_loading = vec![0.0; n];
    let mut dropped = 0;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        let v = eigen.eigenvectors.column(k);
        if lambda <= cutoff {
            dropped += 1;
            for (i, load) in dropped_loading.iter_mut().enumerate() {
                *load += v[i] * v[i];
            }
            continue;
        }
        for (i, var) in variances.iter_mut().enumerate() {
            *var += v[i] * v[i] / lambda;
        }
    }
    if dropped > 0 {
        let unidentified = dropped_loading
            .iter()
            .filter(|l| **l > DROPPED_LOADING)
            .count();
        tracing::warn!(
            "Information matrix is singular: dropped {} of {} directions, {} parameters not identified",
            dropped,
            n,
            unidentified
        );
    }
    variances
        .into_iter()
        .zip(dropped_loading)
        .map(|(var, load)| if load > DROPPED_LOADING { f64::NAN } else { var.sqrt() })
        .collect()
}
