use std::sync::atomic::AtomicBool;
use std::time::Instant;

use potts_sim::{run_ensemble, Lattice, PottsConfig, PottsModel, SimConfig, UpdateMode};
use tracing_subscriber::EnvFilter;

const L: usize = 64;
const Q: u8 = 3;
const N_MODELS: usize = 8;
const N_UPDATES: usize = 200_000;
const BETA: f64 = 1.0;

fn main() -> potts_sim::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut models = Vec::with_capacity(N_MODELS);
    for seed in 0..N_MODELS as u64 {
        let config = PottsConfig::new(vec![L, L], Q).with_seed(42 + seed);
        let mut model = PottsModel::new(Lattice::hypercubic(2, 1.0)?, &config)?;
        model.set_interaction_parameters(vec![1.0, 0.5])?;
        model.set_beta(BETA);
        models.push(model);
    }

    let interrupted = AtomicBool::new(false);

    for mode in [UpdateMode::Metropolis, UpdateMode::Cluster] {
        let config = SimConfig {
            n_updates: N_UPDATES,
            warmup_updates: N_UPDATES / 4,
            measure_interval: 100,
            update_mode: mode,
            sequential: false,
        };

        println!(
            "Lattice: {}x{}  |  q: {}  |  Models: {}  |  Updates: {}  |  Mode: {:?}",
            L, L, Q, N_MODELS, N_UPDATES, mode
        );

        let t0 = Instant::now();
        let res = run_ensemble(&mut models, &config, &interrupted, &|| {})?;
        let elapsed = t0.elapsed().as_secs_f64();

        let per_update = elapsed / N_UPDATES as f64 * 1e6;
        println!(
            "e = {:.4}  m = {:.4}  c = {:.4}  size = {:.2}",
            res.energy,
            res.magnetization,
            res.specific_heat(BETA, L * L),
            res.mean_update_size
        );
        println!("Total: {:.3} s  |  {:.3} us/update", elapsed, per_update);
        println!("{}", "-".repeat(70));
    }
    Ok(())
}
