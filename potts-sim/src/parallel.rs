use rayon::prelude::*;

use crate::simulation::PottsModel;

/// Apply `body` to every model, optionally on the rayon pool.
///
/// Each task owns exactly one model and its random stream, so no state is
/// shared between tasks. Results come back in model order.
///
/// When `sequential` is true, models are processed on the current thread
/// (no rayon overhead, best when an outer level already saturates the cores).
pub fn par_over_models<T: Send>(
    models: &mut [PottsModel],
    sequential: bool,
    body: impl Fn(&mut PottsModel) -> T + Send + Sync,
) -> Vec<T> {
    if sequential {
        models.iter_mut().map(body).collect()
    } else {
        models.par_iter_mut().map(body).collect()
    }
}
