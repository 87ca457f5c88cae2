use tracing::trace;

use super::site::Neighbor;
use crate::error::{Error, Result};

/// Two neighbor distances closer than this belong to the same shell.
pub const SHELL_TOLERANCE: f64 = 1e-6;

/// Neighbors of one site sharing (within [`SHELL_TOLERANCE`]) the same distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    radius: f64,
    neighbors: Vec<Neighbor>,
}

impl Shell {
    fn start(first: Neighbor) -> Self {
        Self {
            radius: first.distance(),
            neighbors: vec![first],
        }
    }

    /// Distance of the first neighbor in the shell.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// Partition each sorted neighbor list into distance shells, shell 0 nearest.
///
/// A new shell starts whenever consecutive distances differ by more than
/// [`SHELL_TOLERANCE`]. Lists with non-finite distances or out of order by
/// more than the tolerance cannot be partitioned and are rejected.
pub fn determine_nn_shells(neighbours: &[Vec<Neighbor>]) -> Result<Vec<Vec<Shell>>> {
    neighbours
        .iter()
        .enumerate()
        .map(|(site, list)| partition(site, list))
        .collect()
}

fn partition(site: usize, list: &[Neighbor]) -> Result<Vec<Shell>> {
    let mut shells: Vec<Shell> = Vec::new();
    let mut prev: Option<f64> = None;

    for nb in list {
        let r = nb.distance();
        if !r.is_finite() {
            return Err(Error::NumericInstability(format!(
                "site {site}: non-finite distance to neighbor {}",
                nb.index
            )));
        }
        match (prev, shells.last_mut()) {
            (Some(p), _) if r < p - SHELL_TOLERANCE => {
                return Err(Error::NumericInstability(format!(
                    "site {site}: neighbor list not sorted by distance ({r} after {p})"
                )));
            }
            (Some(p), Some(shell)) if r - p <= SHELL_TOLERANCE => shell.neighbors.push(nb.clone()),
            _ => shells.push(Shell::start(nb.clone())),
        }
        prev = Some(r);
    }

    trace!(site, n_shells = shells.len(), "partitioned neighbor shells");
    Ok(shells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn nb(index: usize, x: f64) -> Neighbor {
        Neighbor::new(index, DVector::from_vec(vec![x, 0.0]))
    }

    #[test]
    fn test_partition_by_tolerance() {
        let lists = vec![vec![
            nb(1, 1.0),
            nb(2, 1.0 + 5e-7),
            nb(3, 1.0 + 9e-7),
            nb(4, 2.0),
            nb(5, 2.0),
            nb(6, 3.0),
        ]];
        let shells = determine_nn_shells(&lists).unwrap();
        assert_eq!(shells.len(), 1);
        let sizes: Vec<usize> = shells[0].iter().map(Shell::len).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
        assert!((shells[0][0].radius() - 1.0).abs() < 1e-12);
        assert!((shells[0][2].radius() - 3.0).abs() < 1e-12);

        // consecutive norms: <= tol inside a shell, > tol across shells
        for (k, shell) in shells[0].iter().enumerate() {
            for w in shell.neighbors().windows(2) {
                assert!((w[1].distance() - w[0].distance()).abs() <= SHELL_TOLERANCE);
            }
            if let Some(next) = shells[0].get(k + 1) {
                let last = shell.neighbors().last().unwrap().distance();
                assert!(next.neighbors()[0].distance() - last > SHELL_TOLERANCE);
            }
        }
    }

    #[test]
    fn test_empty_list_has_no_shells() {
        let shells = determine_nn_shells(&[vec![]]).unwrap();
        assert!(shells[0].is_empty());
    }

    #[test]
    fn test_unsorted_rejected() {
        let lists = vec![vec![nb(1, 2.0), nb(2, 1.0)]];
        assert!(matches!(
            determine_nn_shells(&lists),
            Err(Error::NumericInstability(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let lists = vec![vec![nb(1, 1.0), nb(2, f64::NAN)]];
        assert!(matches!(
            determine_nn_shells(&lists),
            Err(Error::NumericInstability(_))
        ));
    }
}
