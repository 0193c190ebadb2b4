//! Shared numerical primitives for the pipeline glue.

/// Trapezoidal rule over an arbitrary monotonic abscissa grid.
///
/// Returns `None` when the grids disagree in length or hold fewer than two
/// samples.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mut integral = 0.0;
    for index in 1..xs.len() {
        integral += 0.5 * (xs[index] - xs[index - 1]) * (ys[index] + ys[index - 1]);
    }
    Some(integral)
}

/// Discrete 1-D Gaussian filter in index space.
///
/// `sigma` is measured in samples. The kernel is truncated at four standard
/// deviations and renormalised so a constant signal passes through unchanged;
/// boundaries are mirrored.
pub fn gaussian_filter_1d(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || !sigma.is_finite() || sigma <= 0.0 {
        return values.to_vec();
    }

    let radius = ((4.0 * sigma + 0.5) as isize).max(1);
    let mut kernel = Vec::with_capacity((2 * radius + 1) as usize);
    for offset in -radius..=radius {
        let scaled = offset as f64 / sigma;
        kernel.push((-0.5 * scaled * scaled).exp());
    }
    let norm: f64 = kernel.iter().sum();

    let len = values.len() as isize;
    (0..len)
        .map(|center| {
            let weighted: f64 = kernel
                .iter()
                .enumerate()
                .map(|(tap, weight)| {
                    let index = reflect_index(center + tap as isize - radius, len);
                    weight * values[index]
                })
                .sum();
            weighted / norm
        })
        .collect()
}

/// Mirror-at-the-edges index folding: ... d c b a | a b c d | d c b a ...
fn reflect_index(index: isize, len: isize) -> usize {
    let period = 2 * len;
    let mut folded = index.rem_euclid(period);
    if folded >= len {
        folded = period - 1 - folded;
    }
    folded as usize
}

/// Piecewise-linear interpolation over a non-decreasing grid, clamped at both
/// ends. Returns `None` for degenerate or unsorted grids.
pub fn interpolate_linear(x: f64, x_grid: &[f64], y_grid: &[f64]) -> Option<f64> {
    if x_grid.len() < 2 || x_grid.len() != y_grid.len() {
        return None;
    }
    if !x_grid.windows(2).all(|window| window[0] <= window[1]) {
        return None;
    }

    if x <= x_grid[0] {
        return Some(y_grid[0]);
    }
    let last = x_grid.len() - 1;
    if x >= x_grid[last] {
        return Some(y_grid[last]);
    }

    let upper = x_grid
        .windows(2)
        .position(|window| x <= window[1])
        .map(|index| index + 1)?;
    let lower = upper - 1;
    let x0 = x_grid[lower];
    let x1 = x_grid[upper];
    if x1 == x0 {
        return Some(y_grid[upper]);
    }

    let fraction = (x - x0) / (x1 - x0);
    Some(y_grid[lower] + fraction * (y_grid[upper] - y_grid[lower]))
}

#[cfg(test)]
mod tests {
    use super::{gaussian_filter_1d, interpolate_linear, trapezoid};

    #[test]
    fn trapezoid_integrates_a_linear_function_exactly() {
        let xs = [0.0, 0.5, 1.5, 2.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 1.0).collect();
        let integral = trapezoid(&xs, &ys).expect("integral");
        assert!((integral - 8.0).abs() < 1.0e-12);
    }

    #[test]
    fn trapezoid_rejects_mismatched_or_short_grids() {
        assert_eq!(trapezoid(&[0.0, 1.0], &[1.0]), None);
        assert_eq!(trapezoid(&[0.0], &[1.0]), None);
    }

    #[test]
    fn gaussian_filter_preserves_a_constant_signal() {
        let values = vec![2.5; 32];
        let smoothed = gaussian_filter_1d(&values, 3.0);
        for value in smoothed {
            assert!((value - 2.5).abs() < 1.0e-12);
        }
    }

    #[test]
    fn gaussian_filter_flattens_an_impulse_symmetrically() {
        let mut values = vec![0.0; 21];
        values[10] = 1.0;
        let smoothed = gaussian_filter_1d(&values, 2.0);

        assert!(smoothed[10] < 1.0);
        for offset in 1..=8 {
            assert!(
                (smoothed[10 - offset] - smoothed[10 + offset]).abs() < 1.0e-12,
                "response should be symmetric at offset {offset}"
            );
        }
        let mass: f64 = smoothed.iter().sum();
        assert!((mass - 1.0).abs() < 1.0e-9, "mass was {mass}");
    }

    #[test]
    fn gaussian_filter_with_nonpositive_sigma_is_identity() {
        let values = vec![1.0, 4.0, 9.0];
        assert_eq!(gaussian_filter_1d(&values, 0.0), values);
        assert_eq!(gaussian_filter_1d(&values, -1.0), values);
    }

    #[test]
    fn interpolation_clamps_and_interpolates() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 40.0];
        assert_eq!(interpolate_linear(0.5, &xs, &ys), Some(10.0));
        assert_eq!(interpolate_linear(5.0, &xs, &ys), Some(40.0));
        assert_eq!(interpolate_linear(3.0, &xs, &ys), Some(30.0));
    }

    #[test]
    fn interpolation_rejects_unsorted_grids() {
        assert_eq!(interpolate_linear(0.5, &[1.0, 0.0], &[1.0, 2.0]), None);
        assert_eq!(interpolate_linear(0.5, &[1.0], &[1.0]), None);
    }
}
