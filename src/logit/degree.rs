use crate::data::ChoiceData;
use crate::util::smoothed_ln;

use super::design::{LogitDesign, LogitFit};
use super::LogitError;

/// Non-parametric attachment function
///
/// A conditional logit with one utility coefficient per degree `0..=max_deg`; larger
/// degrees are pooled into `max_deg`. Only differences between utilities are identified,
/// so the smallest degree observed among the candidates is the reference with coefficient
/// and standard error zero. Degrees that never occur among the candidates are reported as
/// `NaN`. A degree chosen every time it is offered has no finite estimate; its coefficient
/// drifts upwards and its standard error is reported as `NaN`.
///
/// Under linear preferential attachment the coefficients follow `ln(k) - ln(k_ref)`.
#[derive(Debug, Clone)]
pub struct DegreeModel {
    max_deg: usize,
    u: Vec<f64>,
    se: Vec<f64>,
    fit: Option<LogitFit>,
}

impl DegreeModel {
    pub fn new(max_deg: usize) -> Self {
        Self {
            max_deg,
            u: vec![f64::NAN; max_deg + 1],
            se: vec![f64::NAN; max_deg + 1],
            fit: None,
        }
    }

    pub fn max_deg(&self) -> usize {
        self.max_deg
    }

    fn bin(&self, deg: f64) -> usize {
        (deg.round() as usize).min(self.max_deg)
    }

    /// Fit the attachment function by maximum likelihood
    pub fn fit(&mut self, data: &ChoiceData) -> Result<(), LogitError> {
        if data.is_empty() {
            return Err(LogitError::EmptyData);
        }

        let mut observed = vec![false; self.max_deg + 1];
        for set in data {
            for &deg in set.degrees() {
                observed[self.bin(deg)] = true;
            }
        }
        let reference = observed
            .iter()
            .position(|o| *o)
            .ok_or(LogitError::EmptyData)?;

        let mut index: Vec<Option<usize>> = vec![None; self.max_deg + 1];
        let mut n_params = 0;
        for (bin, slot) in index.iter_mut().enumerate() {
            if observed[bin] && bin != reference {
                *slot = Some(n_params);
                n_params += 1;
            }
        }

        let mut design = LogitDesign::new(n_params);
        for set in data {
            let features = set
                .degrees()
                .iter()
                .map(|&deg| index[self.bin(deg)].map(|i| (i, 1.0)))
                .collect();
            design.push(set.chosen(), features);
        }

        let fit = design.fit(vec![0.0; n_params])?;
        for bin in 0..=self.max_deg {
            let (u, se) = match index[bin] {
                Some(i) => (fit.theta[i], fit.se[i]),
                None if bin == reference => (0.0, 0.0),
                None => (f64::NAN, f64::NAN),
            };
            self.u[bin] = u;
            self.se[bin] = se;
        }
        tracing::info!(
            "Degree model: {} coefficients, reference degree {}, ll = {:.4}",
            n_params,
            reference,
            fit.log_likelihood
        );
        self.fit = Some(fit);
        Ok(())
    }

    /// Utility per degree, `NaN` for unobserved degrees
    pub fn coefficients(&self) -> &[f64] {
        &self.u
    }

    pub fn standard_errors(&self) -> &[f64] {
        &self.se
    }

    /// Log-likelihood at the estimate, `None` before fitting
    pub fn log_likelihood(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.log_likelihood)
    }
}

/// Conditional logit on `alpha * ln(deg)`
///
/// `alpha = 1` is linear preferential attachment, `alpha = 0` uniform attachment.
/// Degrees above `max_deg` are pooled into `max_deg` as in [DegreeModel].
#[derive(Debug, Clone)]
pub struct LogDegreeModel {
    max_deg: usize,
    fit: Option<LogitFit>,
}

impl LogDegreeModel {
    pub fn new(max_deg: usize) -> Self {
        Self { max_deg, fit: None }
    }

    pub fn fit(&mut self, data: &ChoiceData) -> Result<(), LogitError> {
        let mut design = LogitDesign::new(1);
        for set in data {
            let features = set
                .degrees()
                .iter()
                .map(|&deg| Some((0, smoothed_ln(deg.min(self.max_deg as f64)))))
                .collect();
            design.push(set.chosen(), features);
        }
        let fit = design.fit(vec![0.0])?;
        tracing::info!(
            "Log-degree model: alpha = {:.4} (se {:.4}), ll = {:.4}",
            fit.theta[0],
            fit.se[0],
            fit.log_likelihood
        );
        self.fit = Some(fit);
        Ok(())
    }

    /// Estimated exponent, `NaN` before fitting
    pub fn alpha(&self) -> f64 {
        self.fit.as_ref().map_or(f64::NAN, |f| f.theta[0])
    }

    /// Standard error of the exponent, `NaN` before fitting
    pub fn standard_error(&self) -> f64 {
        self.fit.as_ref().map_or(f64::NAN, |f| f.se[0])
    }

    pub fn log_likelihood(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.log_likelihood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChoiceSet;
    use crate::synth::{make_rp_graph, process_edges, RpGraphOptions};
    use crate::util::create_rng;
    use approx::assert_relative_eq;

    fn pa_data() -> ChoiceData {
        let options = RpGraphOptions::new(2000, 1.0, 0.0);
        let (_, edges) = make_rp_graph(&options, &mut create_rng(21)).unwrap();
        process_edges(&edges, 20, false, &mut create_rng(22)).unwrap()
    }

    #[test]
    fn degree_model_on_handmade_sets() {
        // Degree 2 beats degree 1 three times out of four; degree 4 is pooled into 3
        let mut sets = Vec::new();
        for (i, chosen) in [1, 1, 1, 0].into_iter().enumerate() {
            sets.push(ChoiceSet::new(i, vec![1.0, 2.0], vec![false; 2], chosen).unwrap());
        }
        sets.push(ChoiceSet::new(4, vec![4.0, 1.0], vec![false; 2], 1).unwrap());
        sets.push(ChoiceSet::new(5, vec![4.0, 1.0], vec![false; 2], 0).unwrap());
        let data = ChoiceData::new(sets);

        let mut model = DegreeModel::new(3);
        model.fit(&data).unwrap();
        let u = model.coefficients();
        let se = model.standard_errors();

        assert!(u[0].is_nan() && se[0].is_nan());
        assert_eq!((u[1], se[1]), (0.0, 0.0));
        assert_relative_eq!(u[2], 3.0_f64.ln(), epsilon = 1e-3);
        assert_relative_eq!(u[3], 0.0, epsilon = 1e-3);
        assert!(se[2] > 0.0 && se[3] > 0.0);
        assert!(model.log_likelihood().unwrap() < 0.0);
    }

    #[test]
    fn always_chosen_degree_is_not_identified() {
        // A large, well identified comparison of degrees 1 and 2 next to a degree that wins
        // every set it appears in
        let mut sets = Vec::new();
        for i in 0..6000 {
            let chosen = usize::from(i % 3 != 0);
            sets.push(ChoiceSet::new(i, vec![1.0, 2.0], vec![false; 2], chosen).unwrap());
        }
        for i in 6000..6003 {
            sets.push(ChoiceSet::new(i, vec![1.0, 3.0], vec![false; 2], 1).unwrap());
        }
        let data = ChoiceData::new(sets);

        let mut model = DegreeModel::new(3);
        model.fit(&data).unwrap();
        let u = model.coefficients();
        let se = model.standard_errors();

        assert_relative_eq!(u[2], 2.0_f64.ln(), epsilon = 1e-3);
        assert!(se[2] > 0.0 && se[2] < 0.1, "se[2] = {}", se[2]);
        assert!(u[3] > 5.0, "u[3] = {}", u[3]);
        assert!(se[3].is_nan() || se[3] > 1.0, "se[3] = {}", se[3]);
    }

    #[test]
    fn degree_model_tracks_log_degree_under_preferential_attachment() {
        let data = pa_data();
        let mut model = DegreeModel::new(20);
        model.fit(&data).unwrap();
        let u = model.coefficients();

        // Reference is degree 1; u[k] should be close to ln(k)
        assert_eq!(u[1], 0.0);
        assert!((u[2] - 2.0_f64.ln()).abs() < 0.3, "u[2] = {}", u[2]);
        assert!((u[4] - 4.0_f64.ln()).abs() < 0.4, "u[4] = {}", u[4]);
        assert!(u[4] > u[2]);
    }

    #[test]
    fn log_degree_recovers_linear_attachment() {
        let data = pa_data();
        let mut model = LogDegreeModel::new(100);
        assert!(model.alpha().is_nan());
        model.fit(&data).unwrap();
        assert!((model.alpha() - 1.0).abs() < 0.15, "alpha = {}", model.alpha());
        assert!(model.standard_error() > 0.0 && model.standard_error() < 0.1);
    }

    #[test]
    fn uniform_attachment_gives_flat_exponent() {
        let options = RpGraphOptions::new(2000, 1.0, 1.0);
        let (_, edges) = make_rp_graph(&options, &mut create_rng(31)).unwrap();
        let data = process_edges(&edges, 20, false, &mut create_rng(32)).unwrap();
        let mut model = LogDegreeModel::new(100);
        model.fit(&data).unwrap();
        assert!(model.alpha().abs() < 0.15, "alpha = {}", model.alpha());
    }

    #[test]
    fn empty_data_is_an_error() {
        let empty = ChoiceData::default();
        assert_eq!(
            DegreeModel::new(10).fit(&empty).unwrap_err(),
            LogitError::EmptyData
        );
        assert_eq!(
            LogDegreeModel::new(10).fit(&empty).unwrap_err(),
            LogitError::EmptyData
        );
    }
}
