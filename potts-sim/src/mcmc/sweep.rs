use crate::geometry::Shell;
use crate::spins::site_energy;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

/// Draw a spin uniformly from the `q - 1` values different from `current`.
#[inline]
pub fn propose_spin(current: u8, q: u8, rng: &mut Xoshiro256StarStar) -> u8 {
    let r = rng.gen_range(0..q - 1);
    if r >= current {
        r + 1
    } else {
        r
    }
}

/// Single-spin Metropolis move at `site`.
///
/// Proposes a different spin, accepts it when the site energy does not rise,
/// otherwise with probability `exp(-beta * ΔE)`. Returns whether the move was
/// accepted; a rejected move leaves the field untouched.
#[allow(clippy::too_many_arguments)]
#[cfg_attr(feature = "profile", inline(never))]
pub fn metropolis_step(
    field: &mut [u8],
    shells: &[Vec<Shell>],
    couplings: &[f64],
    h: f64,
    beta: f64,
    q: u8,
    site: usize,
    rng: &mut Xoshiro256StarStar,
) -> bool {
    let old_spin = field[site];
    let e_site = site_energy(field, site, &shells[site], couplings, h);
    field[site] = propose_spin(old_spin, q, rng);
    let e_trial = site_energy(field, site, &shells[site], couplings, h);

    if e_trial <= e_site || rng.gen::<f64>() < (-beta * (e_trial - e_site)).exp() {
        return true;
    }
    field[site] = old_spin;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Crystal, Lattice};
    use rand::SeedableRng;

    fn ring_shells(n: usize) -> Vec<Vec<Shell>> {
        let mut cr = Crystal::new(Lattice::hypercubic(1, 1.0).unwrap());
        cr.set_size(vec![n]).unwrap();
        cr.set_periodic(true);
        cr.add_box_sites().unwrap();
        cr.neighbour_shells(1).unwrap()
    }

    #[test]
    fn test_propose_spin_differs_and_covers() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let s = propose_spin(2, 5, &mut rng);
            assert_ne!(s, 2);
            assert!(s < 5);
            seen[s as usize] = true;
        }
        assert_eq!(seen, [true, true, false, true, true]);
        for _ in 0..100 {
            assert_eq!(propose_spin(0, 2, &mut rng), 1);
            assert_eq!(propose_spin(1, 2, &mut rng), 0);
        }
    }

    #[test]
    fn test_downhill_always_accepted() {
        // site 0 is the only misaligned spin on a ferromagnetic ring
        let shells = ring_shells(6);
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        for _ in 0..50 {
            let mut field = vec![1u8, 0, 0, 0, 0, 0];
            assert!(metropolis_step(&mut field, &shells, &[1.0], 0.0, 0.1, 2, 0, &mut rng));
            assert_eq!(field, vec![0; 6]);
        }
    }

    #[test]
    fn test_uphill_rejected_at_low_temperature() {
        let shells = ring_shells(6);
        let mut rng = Xoshiro256StarStar::seed_from_u64(4);
        let mut field = vec![0u8; 6];
        for site in 0..6 {
            assert!(!metropolis_step(&mut field, &shells, &[1.0], 0.0, 1e3, 2, site, &mut rng));
        }
        assert_eq!(field, vec![0; 6]);
    }

    #[test]
    fn test_uphill_accepted_at_infinite_temperature() {
        let shells = ring_shells(6);
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut field = vec![0u8; 6];
        assert!(metropolis_step(&mut field, &shells, &[1.0], 0.0, 0.0, 2, 2, &mut rng));
        assert_eq!(field[2], 1);
    }
}
