/// Signed lattice-step offsets inside a hypercube of half-width `n_steps`.
///
/// Yields every offset whose per-axis magnitude lies in `[0, n_steps]`,
/// excluding the all-zero offset. Magnitudes advance like an odometer (last
/// axis fastest); for each magnitude vector every sign pattern of its nonzero
/// axes is produced, positive first. Axes at magnitude zero carry no sign, so
/// each offset appears exactly once and the total count is
/// `(2 * n_steps + 1)^n_dims - 1`.
#[derive(Debug, Clone)]
pub struct ShellOffsets {
    n_steps: usize,
    magnitudes: Vec<usize>,
    /// Axes with nonzero magnitude in the current odometer position.
    active: Vec<usize>,
    /// Next sign pattern; bit `k` set means `active[k]` steps backward.
    sign_mask: usize,
    done: bool,
}

impl ShellOffsets {
    pub fn new(n_dims: usize, n_steps: usize) -> Self {
        Self {
            n_steps,
            magnitudes: vec![0; n_dims],
            active: Vec::new(),
            sign_mask: 0,
            done: n_dims == 0 || n_steps == 0,
        }
    }

    /// Move the odometer one position. Returns false once every magnitude
    /// vector has been visited.
    fn advance(&mut self) -> bool {
        for d in (0..self.magnitudes.len()).rev() {
            if self.magnitudes[d] < self.n_steps {
                self.magnitudes[d] += 1;
                self.active = (0..self.magnitudes.len())
                    .filter(|&a| self.magnitudes[a] != 0)
                    .collect();
                self.sign_mask = 0;
                return true;
            }
            self.magnitudes[d] = 0;
        }
        false
    }
}

impl Iterator for ShellOffsets {
    type Item = Vec<isize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.active.is_empty() || self.sign_mask >= 1 << self.active.len() {
            if !self.advance() {
                self.done = true;
                return None;
            }
        }

        let mut offset = vec![0isize; self.magnitudes.len()];
        for (k, &axis) in self.active.iter().enumerate() {
            let m = self.magnitudes[axis] as isize;
            offset[axis] = if self.sign_mask & (1 << k) == 0 { m } else { -m };
        }
        self.sign_mask += 1;
        Some(offset)
    }
}
