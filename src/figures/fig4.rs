use rand::Rng;
use std::path::PathBuf;

use super::{output_error, results_writer, synthesize};
use crate::config::Config;
use crate::error::NetgrowthError;
use crate::logit::MixedLogitModel;
use crate::util::{arange, DataPaths};

/// Log-likelihood of two misspecified mixtures along their mixing weight
///
/// - `p`: uniform with weight `x`, linear preferential attachment with `1 - x` (copy model)
/// - `r`: uniform with weight `x`, uniform over friends-of-friends with `1 - x`
pub(super) fn run<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Vec<PathBuf>, NetgrowthError> {
    let paths = DataPaths::new(&config.data_dir);
    let xs = arange(0.0, 1.0 + config.fig4.step / 5.0, config.fig4.step);

    let path = config.results_dir.join("fig4_data.csv");
    let mut writer = results_writer(&path)?;
    writer
        .write_record(["data", "model", "p", "ll"])
        .map_err(|e| output_error(&path, e))?;

    for spec in &config.fig4.graphs {
        let data = synthesize(spec, &paths, config.seed, rng)?;
        let title = spec.title();

        let mut copy = MixedLogitModel::new("copy", &data);
        copy.add_uniform_model()
            .add_log_degree_model(Some((1.0, 1.0)));
        let mut jr = MixedLogitModel::new("jr", &data);
        jr.add_uniform_model().add_uniform_fof_model();

        for (label, model) in [("p", &mut copy), ("r", &mut jr)] {
            for &x in &xs {
                model.set_weights(&[x, 1.0 - x])?;
                writer
                    .write_record([
                        title.clone(),
                        label.to_string(),
                        x.to_string(),
                        model.log_likelihood()?.to_string(),
                    ])
                    .map_err(|e| output_error(&path, e))?;
            }
        }
    }
    writer.flush().map_err(|e| output_error(&path, e))?;

    Ok(vec![path])
}
