use nalgebra::DVector;

/// Row-major strides for a box of extent `size`: `strides[d] = product of size[d+1..]`.
pub fn strides(size: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; size.len()];
    for d in (0..size.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * size[d + 1];
    }
    strides
}

/// Mixed-radix decomposition of a flat index against the box size.
pub fn coords_of(index: usize, size: &[usize]) -> Vec<usize> {
    strides(size)
        .iter()
        .zip(size)
        .map(|(&stride, &extent)| (index / stride) % extent)
        .collect()
}

/// Flat index of a box coordinate (inverse of [`coords_of`]).
pub fn index_of(coord: &[usize], size: &[usize]) -> usize {
    coord
        .iter()
        .zip(strides(size))
        .map(|(&c, stride)| c * stride)
        .sum()
}

/// One absolute lattice point of a crystal.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Sequential index within the crystal.
    pub index: usize,
    /// Box coordinate, consistent with `index` under the crystal's box size.
    pub coord: Vec<usize>,
    /// Absolute position.
    pub position: DVector<f64>,
}

impl Site {
    pub fn new(index: usize, position: DVector<f64>, size: &[usize]) -> Self {
        Self {
            index,
            coord: coords_of(index, size),
            position,
        }
    }

    pub fn from_coord(coord: Vec<usize>, position: DVector<f64>, size: &[usize]) -> Self {
        Self {
            index: index_of(&coord, size),
            coord,
            position,
        }
    }
}

/// Entry of a neighbor list: the peer site and its displacement from the
/// site owning the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub displacement: DVector<f64>,
}

impl Neighbor {
    pub fn new(index: usize, displacement: DVector<f64>) -> Self {
        Self {
            index,
            displacement,
        }
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.displacement.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides() {
        assert_eq!(strides(&[3, 4]), vec![4, 1]);
        assert_eq!(strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(strides(&[5]), vec![1]);
        assert!(strides(&[]).is_empty());
    }

    #[test]
    fn test_coords_index_roundtrip() {
        let size = [2, 3, 4];
        for i in 0..24 {
            let c = coords_of(i, &size);
            assert!(c.iter().zip(&size).all(|(&c, &s)| c < s));
            assert_eq!(index_of(&c, &size), i);
        }
        // Site 11 of a 3x4 box = (2, 3)
        assert_eq!(coords_of(11, &[3, 4]), vec![2, 3]);
    }

    #[test]
    fn test_site_constructors_agree() {
        let size = [3, 4];
        let pos = DVector::from_vec(vec![1.0, 2.0]);
        let a = Site::new(6, pos.clone(), &size);
        let b = Site::from_coord(vec![1, 2], pos, &size);
        assert_eq!(a, b);
    }

    #[test]
    fn test_neighbor_distance() {
        let nb = Neighbor::new(3, DVector::from_vec(vec![3.0, -4.0]));
        assert!((nb.distance() - 5.0).abs() < 1e-12);
    }
}
