use crate::geometry::Shell;

/// Grow a cluster from `seed` by depth-first search over neighbor shells.
///
/// Only the first `n_shells` shells of each site are visited.
/// `should_add(site, neighbor, shell)` decides whether to add each
/// not-yet-visited neighbor; it is called once per (site, neighbor entry).
/// Caller owns buffers: `in_cluster` must be all-false, `stack` must be empty.
#[inline]
pub(super) fn grow_cluster(
    shells: &[Vec<Shell>],
    n_shells: usize,
    seed: usize,
    in_cluster: &mut [bool],
    stack: &mut Vec<usize>,
    mut should_add: impl FnMut(usize, usize, usize) -> bool,
) {
    in_cluster[seed] = true;
    stack.push(seed);

    while let Some(site) = stack.pop() {
        for (k, shell) in shells[site].iter().take(n_shells).enumerate() {
            for nb in shell.neighbors() {
                if !in_cluster[nb.index] && should_add(site, nb.index, k) {
                    in_cluster[nb.index] = true;
                    stack.push(nb.index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Crystal, Lattice};
    use std::collections::HashSet;

    // 4×4 periodic square lattice:
    //
    //    0  1  2  3
    //    4  5  6  7
    //    8  9 10 11
    //   12 13 14 15
    //
    // Shell 0 holds the 4 nearest neighbors, shell 1 the 4 diagonals.

    fn shells_4x4() -> Vec<Vec<Shell>> {
        let mut cr = Crystal::new(Lattice::hypercubic(2, 1.0).unwrap());
        cr.set_size(vec![4, 4]).unwrap();
        cr.set_periodic(true);
        cr.add_box_sites().unwrap();
        cr.neighbour_shells(1).unwrap()
    }

    fn grow(
        shells: &[Vec<Shell>],
        n_shells: usize,
        seed: usize,
        should_add: impl FnMut(usize, usize, usize) -> bool,
    ) -> HashSet<usize> {
        let n = shells.len();
        let mut in_cluster = vec![false; n];
        let mut stack = Vec::new();
        grow_cluster(shells, n_shells, seed, &mut in_cluster, &mut stack, should_add);
        assert!(stack.is_empty());
        (0..n).filter(|&i| in_cluster[i]).collect()
    }

    #[test]
    fn test_site_based_growth() {
        let shells = shells_4x4();
        // only the active sites {0, 1, 5} spread the cluster
        let active: HashSet<usize> = [0, 1, 5].into_iter().collect();
        let cluster = grow(&shells, 1, 0, |site, _nb, _k| active.contains(&site));
        // 0 → {1, 3, 4, 12}; 1 → {2, 5, 13}; 5 → {6, 9}
        let expected: HashSet<usize> = [0, 1, 2, 3, 4, 5, 6, 9, 12, 13].into_iter().collect();
        assert_eq!(cluster, expected);
    }

    #[test]
    fn test_shell_limit() {
        let shells = shells_4x4();
        let nearest = grow(&shells, 1, 5, |site, _nb, _k| site == 5);
        assert_eq!(nearest, [1, 4, 5, 6, 9].into_iter().collect());

        let with_diagonals = grow(&shells, 2, 5, |site, _nb, _k| site == 5);
        assert_eq!(with_diagonals.len(), 9);

        let diagonals_only = grow(&shells, 2, 5, |site, _nb, k| site == 5 && k == 1);
        assert_eq!(diagonals_only, [0, 2, 5, 8, 10].into_iter().collect());
    }

    #[test]
    fn test_isolated_seed() {
        let shells = shells_4x4();
        let cluster = grow(&shells, 2, 7, |_, _, _| false);
        assert_eq!(cluster, [7].into_iter().collect());
    }
}
