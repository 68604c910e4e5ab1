use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rayon::prelude::*;
use std::path::PathBuf;

use super::{output_error, results_writer, synthesize};
use crate::config::Config;
use crate::data::{read_choices, ChoiceData};
use crate::error::NetgrowthError;
use crate::logit::{log_degree_probability, MixedLogitModel};
use crate::util::{arange, smoothed_ln, DataPaths};

/// One point of the likelihood surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub alpha: f64,
    pub p: f64,
    pub ll: f64,
}

/// Log-likelihood of the mixture `p * uniform + (1 - p) * PA_alpha` over a grid
///
/// Points are ordered by `alpha`, then `p`. The preferential scores of a given `alpha` are
/// computed once and reused for every `p`; the `alpha` rows are evaluated in parallel.
pub fn likelihood_surface(
    data: &ChoiceData,
    alphas: &[f64],
    ps: &[f64],
    show_progress: bool,
) -> Vec<SurfacePoint> {
    let uniform: Vec<f64> = data.iter().map(|set| 1.0 / set.len() as f64).collect();

    let progress = if show_progress {
        let bar = ProgressBar::new(alphas.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})") {
            bar.set_style(style);
        }
        bar.set_message("Likelihood surface");
        Some(bar)
    } else {
        None
    };

    let rows: Vec<Vec<SurfacePoint>> = alphas
        .par_iter()
        .map(|&alpha| {
            let pa: Vec<f64> = data
                .iter()
                .map(|set| log_degree_probability(alpha, set))
                .collect();
            let row = ps
                .iter()
                .map(|&p| {
                    let ll = uniform
                        .iter()
                        .zip(&pa)
                        .map(|(u, a)| smoothed_ln(p * u + (1.0 - p) * a))
                        .sum();
                    SurfacePoint { alpha, p, ll }
                })
                .collect();
            if let Some(bar) = &progress {
                bar.inc(1);
            }
            row
        })
        .collect();

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    rows.into_iter().flatten().collect()
}

pub(super) fn run<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<PathBuf>, NetgrowthError> {
    let settings = &config.fig1;
    let data = match &settings.choices {
        Some(path) => read_choices(path)?,
        None => synthesize(
            &settings.graph,
            &DataPaths::new(&config.data_dir),
            config.seed,
            rng,
        )?,
    };
    tracing::info!("Figure 1 data: {}", data);

    let alphas = arange(0.0, 2.0, settings.step);
    let ps = arange(0.0, 1.0, settings.step);
    let surface = likelihood_surface(&data, &alphas, &ps, config.show_progress);

    let path = config.results_dir.join("fig1_data.csv");
    let mut writer = results_writer(&path)?;
    writer
        .write_record(["alpha", "p", "ll"])
        .map_err(|e| output_error(&path, e))?;
    for point in &surface {
        writer
            .write_record([
                point.alpha.to_string(),
                point.p.to_string(),
                point.ll.to_string(),
            ])
            .map_err(|e| output_error(&path, e))?;
    }
    writer.flush().map_err(|e| output_error(&path, e))?;

    let mut model = MixedLogitModel::new("fig1_em", &data);
    model.add_uniform_model().add_log_degree_model(None);
    model.set_params(1, &[settings.initial_alpha])?;
    let stats = model.fit(settings.n_rounds, settings.etol)?;
    let em_path = config.results_dir.join("fig1_data_em.csv");
    stats.write_csv(&em_path)?;

    Ok(vec![path, em_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChoiceSet;
    use crate::logit::MixedLogitModel;
    use approx::assert_relative_eq;

    fn data() -> ChoiceData {
        ChoiceData::new(vec![
            ChoiceSet::new(0, vec![1.0, 3.0], vec![false, false], 1).unwrap(),
            ChoiceSet::new(1, vec![2.0, 2.0, 4.0], vec![false; 3], 0).unwrap(),
            ChoiceSet::new(2, vec![0.0, 5.0], vec![false; 2], 0).unwrap(),
        ])
    }

    #[test]
    fn surface_is_ordered_by_alpha_then_p() {
        let alphas = arange(0.0, 2.0, 0.5);
        let ps = arange(0.0, 1.0, 0.25);
        let surface = likelihood_surface(&data(), &alphas, &ps, false);
        assert_eq!(surface.len(), 16);
        assert_eq!((surface[0].alpha, surface[0].p), (0.0, 0.0));
        assert_eq!((surface[1].alpha, surface[1].p), (0.0, 0.25));
        assert_eq!((surface[4].alpha, surface[4].p), (0.5, 0.0));
        assert_eq!(surface[15].alpha, 1.5);
    }

    #[test]
    fn surface_matches_mixed_logit_likelihood() {
        let data = data();
        let surface = likelihood_surface(&data, &[1.0], &[0.3], false);

        let mut model = MixedLogitModel::new("check", &data);
        model
            .add_uniform_model()
            .add_log_degree_model(Some((1.0, 1.0)));
        model.set_weights(&[0.3, 0.7]).unwrap();
        assert_relative_eq!(
            surface[0].ll,
            model.log_likelihood().unwrap(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn alpha_zero_is_uniform() {
        // With alpha = 0 the mixture is uniform whatever p is
        let surface = likelihood_surface(&data(), &[0.0], &[0.0, 0.5], false);
        let expected = 0.5_f64.ln() + (1.0_f64 / 3.0).ln() + 0.5_f64.ln();
        assert_relative_eq!(surface[0].ll, expected, epsilon = 1e-10);
        assert_relative_eq!(surface[1].ll, expected, epsilon = 1e-10);
    }
}
