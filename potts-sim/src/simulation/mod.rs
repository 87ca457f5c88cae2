pub mod model;

pub use model::{CorrelatorSample, PottsModel};

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use validator::Validate;

use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::parallel::par_over_models;
use crate::statistics::{Statistics, SweepResult};

/// Run the full Monte Carlo loop (warm-up + measurement) for one model.
///
/// Each step is one [`PottsModel::update`] in `config.update_mode`. After
/// `warmup_updates` steps, every `measure_interval`-th step records the
/// energy per site, the magnetization and their squares.
///
/// `on_update` is called once per update (useful for progress bars).
pub fn run_sweep_loop(
    model: &mut PottsModel,
    config: &SimConfig,
    interrupted: &AtomicBool,
    on_update: &(dyn Fn() + Sync),
) -> Result<SweepResult> {
    config.validate()?;

    let use_cluster = config.update_mode.use_cluster();
    let mut energy_stat = Statistics::new(1);
    let mut energy2_stat = Statistics::new(2);
    let mut mag_stat = Statistics::new(1);
    let mut mag2_stat = Statistics::new(2);
    let mut update_size_stat = Statistics::new(1);

    debug!(
        n_updates = config.n_updates,
        warmup_updates = config.warmup_updates,
        cluster = use_cluster,
        "starting sweep loop"
    );

    for update_id in 0..config.n_updates {
        if interrupted.load(Ordering::Relaxed) {
            debug!(update_id, "sweep loop interrupted");
            return Err(Error::Interrupted);
        }
        on_update();

        let changed = model.update(use_cluster);
        update_size_stat.update(changed as f64);

        if update_id == config.warmup_updates {
            debug!(update_id, "warm-up finished");
        }
        if update_id < config.warmup_updates
            || (update_id - config.warmup_updates) % config.measure_interval != 0
        {
            continue;
        }

        let e = model.average_site_energy();
        let m = model.magnetization();
        energy_stat.update(e);
        energy2_stat.update(e);
        mag_stat.update(m);
        mag2_stat.update(m);
    }

    debug!(n_measurements = energy_stat.count, "sweep loop finished");

    Ok(SweepResult {
        energy: energy_stat.average(),
        energy2: energy2_stat.average(),
        magnetization: mag_stat.average(),
        magnetization2: mag2_stat.average(),
        mean_update_size: update_size_stat.average(),
        n_measurements: energy_stat.count,
    })
}

/// Run the sweep loop over independent models and average the results.
///
/// Each model is processed by [`run_sweep_loop`] on its own rayon task, then
/// results are averaged via [`SweepResult::aggregate`]. For a single model the
/// call is made directly, skipping rayon thread-pool overhead.
pub fn run_ensemble(
    models: &mut [PottsModel],
    config: &SimConfig,
    interrupted: &AtomicBool,
    on_update: &(dyn Fn() + Sync),
) -> Result<SweepResult> {
    if models.len() == 1 {
        return run_sweep_loop(&mut models[0], config, interrupted, on_update);
    }

    let results = par_over_models(models, config.sequential, |model| {
        run_sweep_loop(model, config, interrupted, on_update)
    });
    let results: Vec<SweepResult> = results.into_iter().collect::<Result<Vec<_>>>()?;

    SweepResult::aggregate(&results)
        .ok_or_else(|| Error::Configuration("ensemble holds no models".into()))
}
