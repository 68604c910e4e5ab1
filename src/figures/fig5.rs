use rand::Rng;
use std::path::PathBuf;

use super::{output_error, results_writer, synthesize, Provenance};
use crate::config::Config;
use crate::data::read_choices;
use crate::error::NetgrowthError;
use crate::logit::DegreeModel;
use crate::util::DataPaths;

/// Non-parametric attachment function of every figure 4 graph
///
/// Reuses the choice files left by figure 4 when they were synthesized with the current seed
/// and graph settings. Missing or stale files are synthesized again.
pub(super) fn run<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<PathBuf>, NetgrowthError> {
    let paths = DataPaths::new(&config.data_dir);
    let path = config.results_dir.join("fig5_data.csv");
    let mut writer = results_writer(&path)?;
    writer
        .write_record(["data", "deg", "coef", "se"])
        .map_err(|e| output_error(&path, e))?;

    for spec in &config.fig4.graphs {
        let choices = paths.choices(&spec.name);
        let current = Provenance::new(config.seed, spec);
        let data = match Provenance::read(&paths, &spec.name) {
            Some(stored) if stored == current && choices.exists() => {
                tracing::debug!("Reusing {}", choices.display());
                read_choices(&choices)?
            }
            Some(_) => {
                tracing::warn!(
                    "{} was synthesized with other settings, synthesizing it again",
                    choices.display()
                );
                synthesize(spec, &paths, config.seed, rng)?
            }
            None if choices.exists() => {
                tracing::warn!(
                    "{} has no settings record, synthesizing it again",
                    choices.display()
                );
                synthesize(spec, &paths, config.seed, rng)?
            }
            None => synthesize(spec, &paths, config.seed, rng)?,
        };

        let mut model = DegreeModel::new(config.fig5.max_deg);
        model.fit(&data)?;
        let title = spec.title();
        for (deg, (coef, se)) in model
            .coefficients()
            .iter()
            .zip(model.standard_errors())
            .enumerate()
        {
            writer
                .write_record([
                    title.clone(),
                    deg.to_string(),
                    coef.to_string(),
                    se.to_string(),
                ])
                .map_err(|e| output_error(&path, e))?;
        }
    }
    writer.flush().map_err(|e| output_error(&path, e))?;

    Ok(vec![path])
}
