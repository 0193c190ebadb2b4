//! Cubic reshaping of flattened triangle enumerations.

use ndarray::Array3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot reshape {actual} bispectrum values into a {n}x{n}x{n} cube ({expected} expected)")]
pub struct CubeShapeError {
    pub n: usize,
    pub expected: usize,
    pub actual: usize,
}

/// Reshapes a flat triangle enumeration into an (N, N, N) cube.
///
/// The flat order is the row-major triple loop over the wavenumber grid for
/// all three triangle sides. Anything shorter (an equilateral-only
/// enumeration, say) is a hard error, never a truncated cube.
pub fn reshape_cube(flat: Vec<f64>, n: usize) -> Result<Array3<f64>, CubeShapeError> {
    let expected = n * n * n;
    let actual = flat.len();
    if actual != expected {
        return Err(CubeShapeError {
            n,
            expected,
            actual,
        });
    }
    Array3::from_shape_vec((n, n, n), flat).map_err(|_| CubeShapeError {
        n,
        expected,
        actual,
    })
}

/// Combined bispectrum and its three constituent halo terms, each (N, N, N).
#[derive(Debug, Clone, PartialEq)]
pub struct BispectrumDecomposition {
    pub combined: Array3<f64>,
    pub one_halo: Array3<f64>,
    pub two_halo: Array3<f64>,
    pub three_halo: Array3<f64>,
}

impl BispectrumDecomposition {
    /// Grid length N shared by all four cubes.
    pub fn grid_len(&self) -> usize {
        self.combined.dim().0
    }
}

#[cfg(test)]
mod tests {
    use super::{reshape_cube, CubeShapeError};

    #[test]
    fn reshape_and_flatten_round_trip() {
        for n in 1..=4 {
            let flat: Vec<f64> = (0..n * n * n).map(|value| value as f64).collect();
            let cube = reshape_cube(flat.clone(), n).expect("cube");
            assert_eq!(cube.dim(), (n, n, n));
            let back: Vec<f64> = cube.iter().copied().collect();
            assert_eq!(back, flat);
        }
    }

    #[test]
    fn reshape_follows_the_triple_loop_order() {
        let cube = reshape_cube((0..8).map(|value| value as f64).collect(), 2).expect("cube");
        assert_eq!(cube[(0, 0, 0)], 0.0);
        assert_eq!(cube[(0, 0, 1)], 1.0);
        assert_eq!(cube[(0, 1, 0)], 2.0);
        assert_eq!(cube[(1, 0, 0)], 4.0);
        assert_eq!(cube[(1, 1, 1)], 7.0);
    }

    #[test]
    fn short_sequences_are_rejected_not_truncated() {
        let error = reshape_cube(vec![1.0, 2.0, 3.0], 3).expect_err("3 != 27");
        assert_eq!(
            error,
            CubeShapeError {
                n: 3,
                expected: 27,
                actual: 3,
            }
        );
    }
}
