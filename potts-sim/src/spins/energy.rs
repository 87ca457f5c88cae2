use crate::geometry::Shell;

/// Energy of site `i`.
///
/// `E_i = Σ_k -J_k/2 · (# neighbors in shell k with the same spin) - H·[s_i == 0]`
///
/// `couplings[k]` applies to shell `k`; shells beyond `couplings.len()` and
/// couplings beyond the available shells contribute nothing. Positive `J`
/// favors alignment.
#[inline]
pub fn site_energy(field: &[u8], i: usize, shells: &[Shell], couplings: &[f64], h: f64) -> f64 {
    let si = field[i];
    let mut energy = 0.0;
    for (shell, &j) in shells.iter().zip(couplings) {
        if j == 0.0 {
            continue;
        }
        let same = shell
            .neighbors()
            .iter()
            .filter(|nb| field[nb.index] == si)
            .count();
        energy -= j / 2.0 * same as f64;
    }
    if si == 0 {
        energy -= h;
    }
    energy
}

/// Sum of [`site_energy`] over every site.
pub fn total_energy(field: &[u8], shells: &[Vec<Shell>], couplings: &[f64], h: f64) -> f64 {
    (0..field.len())
        .map(|i| site_energy(field, i, &shells[i], couplings, h))
        .sum()
}

/// Mean spin value over the field.
pub fn magnetization(field: &[u8]) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    field.iter().map(|&s| s as f64).sum::<f64>() / field.len() as f64
}
