use super::utils::grow_cluster;
use crate::geometry::Shell;
use crate::mcmc::propose_spin;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

/// Wolff-style cluster update seeded at `seed`.
///
/// A bond from a cluster site to a neighbor in shell `k` is satisfied when
/// the two spins agree (`J_k > 0`) or differ (`J_k < 0`); satisfied bonds to
/// unvisited neighbors are activated with probability `1 - exp(-beta·|J_k|)`.
/// Shells with `J_k = 0` carry no bonds. Once the cluster is complete every
/// member receives the same freshly drawn spin, different from the seed's.
///
/// Returns the cluster size.
#[cfg_attr(feature = "profile", inline(never))]
pub fn wolff_update(
    field: &mut [u8],
    shells: &[Vec<Shell>],
    couplings: &[f64],
    beta: f64,
    q: u8,
    seed: usize,
    rng: &mut Xoshiro256StarStar,
) -> usize {
    let n_sites = field.len();
    let p_add: Vec<f64> = couplings
        .iter()
        .map(|j| 1.0 - (-beta * j.abs()).exp())
        .collect();

    let mut in_cluster = vec![false; n_sites];
    let mut stack = Vec::with_capacity(n_sites);

    grow_cluster(
        shells,
        couplings.len(),
        seed,
        &mut in_cluster,
        &mut stack,
        |site, nb, k| {
            let j = couplings[k];
            let satisfied = if j > 0.0 {
                field[nb] == field[site]
            } else if j < 0.0 {
                field[nb] != field[site]
            } else {
                false
            };
            satisfied && rng.gen::<f64>() < p_add[k]
        },
    );

    let new_spin = propose_spin(field[seed], q, rng);
    let mut size = 0;
    for (spin, &inside) in field.iter_mut().zip(&in_cluster) {
        if inside {
            *spin = new_spin;
            size += 1;
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Crystal, Lattice};
    use rand::SeedableRng;

    fn square_shells(l: usize, periodic: bool) -> Vec<Vec<Shell>> {
        let mut cr = Crystal::new(Lattice::hypercubic(2, 1.0).unwrap());
        cr.set_size(vec![l, l]).unwrap();
        cr.set_periodic(periodic);
        cr.add_box_sites().unwrap();
        cr.neighbour_shells(1).unwrap()
    }

    #[test]
    fn test_aligned_cluster_flips_everything() {
        let shells = square_shells(4, true);
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let mut field = vec![2u8; 16];
        let size = wolff_update(&mut field, &shells, &[1.0], 50.0, 3, 6, &mut rng);
        assert_eq!(size, 16);
        let s = field[0];
        assert_ne!(s, 2);
        assert!(field.iter().all(|&x| x == s));
    }

    #[test]
    fn test_antiferromagnetic_cluster() {
        let shells = square_shells(4, true);
        let mut rng = Xoshiro256StarStar::seed_from_u64(12);
        let mut field: Vec<u8> = (0..16).map(|i| (((i / 4) + (i % 4)) % 2) as u8).collect();
        let seed_spin = field[0];
        let size = wolff_update(&mut field, &shells, &[-1.0], 50.0, 2, 0, &mut rng);
        assert_eq!(size, 16);
        assert!(field.iter().all(|&x| x != seed_spin));
    }

    #[test]
    fn test_zero_coupling_or_temperature_gives_single_site() {
        let shells = square_shells(4, true);
        let mut rng = Xoshiro256StarStar::seed_from_u64(13);

        let mut field = vec![0u8; 16];
        assert_eq!(wolff_update(&mut field, &shells, &[0.0], 50.0, 2, 3, &mut rng), 1);
        assert_eq!(field.iter().filter(|&&x| x == 1).count(), 1);
        assert_eq!(field[3], 1);

        let mut field = vec![0u8; 16];
        assert_eq!(wolff_update(&mut field, &shells, &[1.0], 0.0, 2, 3, &mut rng), 1);

        let mut field = vec![0u8; 16];
        assert_eq!(wolff_update(&mut field, &shells, &[], 50.0, 2, 3, &mut rng), 1);
    }

    #[test]
    fn test_cluster_stops_at_domain_wall() {
        // left half 0, right half 1 on an open 4x4 box
        let shells = square_shells(4, false);
        let mut rng = Xoshiro256StarStar::seed_from_u64(14);
        let mut field: Vec<u8> = (0..16).map(|i| u8::from(i % 4 >= 2)).collect();
        let size = wolff_update(&mut field, &shells, &[1.0], 50.0, 2, 0, &mut rng);
        assert_eq!(size, 8);
        assert!(field.iter().all(|&x| x == 1));
    }
}
