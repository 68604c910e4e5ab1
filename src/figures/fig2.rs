use rand::Rng;
use std::path::PathBuf;

use super::{output_error, results_writer, synthesize};
use crate::config::Config;
use crate::error::NetgrowthError;
use crate::logit::{DegreeModel, LogDegreeModel};
use crate::util::DataPaths;

pub(super) fn run<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<PathBuf>, NetgrowthError> {
    let settings = &config.fig2;
    let data = synthesize(
        &settings.graph,
        &DataPaths::new(&config.data_dir),
        config.seed,
        rng,
    )?;

    let mut degree = DegreeModel::new(settings.max_deg);
    degree.fit(&data)?;
    let mut log_degree = LogDegreeModel::new(settings.max_deg);
    log_degree.fit(&data)?;

    let path = config.results_dir.join("fig2_data.csv");
    let mut writer = results_writer(&path)?;
    writer
        .write_record(["deg", "coef", "se"])
        .map_err(|e| output_error(&path, e))?;
    for (deg, (coef, se)) in degree
        .coefficients()
        .iter()
        .zip(degree.standard_errors())
        .enumerate()
    {
        writer
            .write_record([deg.to_string(), coef.to_string(), se.to_string()])
            .map_err(|e| output_error(&path, e))?;
    }
    writer
        .write_record([
            "alpha".to_string(),
            log_degree.alpha().to_string(),
            log_degree.standard_error().to_string(),
        ])
        .map_err(|e| output_error(&path, e))?;
    writer.flush().map_err(|e| output_error(&path, e))?;

    Ok(vec![path])
}
