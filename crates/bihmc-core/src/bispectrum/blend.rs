//! Two-stage generalised power-mean blending of the halo terms.

use crate::domain::BlendingExponents;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlendError {
    #[error("{term} term has {actual} values, expected {expected}")]
    LengthMismatch {
        term: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Combines the three halo terms elementwise:
///
/// ```text
/// S = (B1^a1 + B2^a1)^(a2 / a1)
/// B = (S + B3^a2)^(1 / a2)
/// ```
///
/// `a1` shapes the one-halo/two-halo transition, `a2` the transition into the
/// perturbative three-halo regime; unit exponents reduce to the plain sum.
/// Contributions are assumed non-negative: fractional exponents of negative
/// values yield NaN, exactly as in the reference combination.
pub fn blend_contributions(
    one_halo: &[f64],
    two_halo: &[f64],
    three_halo: &[f64],
    exponents: BlendingExponents,
) -> Result<Vec<f64>, BlendError> {
    check_length("two-halo", one_halo.len(), two_halo.len())?;
    check_length("three-halo", one_halo.len(), three_halo.len())?;

    let a1 = exponents.alpha1();
    let a2 = exponents.alpha2();

    Ok(one_halo
        .iter()
        .zip(two_halo)
        .zip(three_halo)
        .map(|((&b1, &b2), &b3)| {
            let inner = b1.powf(a1) + b2.powf(a1);
            (inner.powf(a2 / a1) + b3.powf(a2)).powf(1.0 / a2)
        })
        .collect())
}

fn check_length(term: &'static str, expected: usize, actual: usize) -> Result<(), BlendError> {
    if actual != expected {
        return Err(BlendError::LengthMismatch {
            term,
            expected,
            actual,
        });
    }
    Ok(())
}
