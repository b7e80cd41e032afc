//! Formal power series over sequences of `f64` coefficients.
//!
//! A sequence `[a0, a1, a2, ...]` stands for `a0 + a1*x + a2*x^2 + ...`.
//! Finite sequences are polynomials; infinite ones are power series.
//! Every operation here is lazy: the n-th output coefficient only pulls the
//! first n+1 coefficients of each input, so operations compose over
//! infinite series.
//!
//! # Examples
//!
//! ```rust
//! use timeseq::numeric::{self, add, square};
//! use timeseq::sequence::SequenceExt;
//!
//! // cos^2 + sin^2 == 1 holds coefficient by coefficient.
//! let cos2 = square(numeric::cos_series()).unwrap();
//! let sin2 = square(numeric::sin_series()).unwrap();
//! let mut one = add(cos2, sin2);
//! let coefficients = one.take(8).unwrap();
//! assert!((coefficients[0] - 1.0).abs() < 1e-10);
//! assert!(coefficients[1..].iter().all(|c| c.abs() < 1e-10));
//! ```

mod generators;
mod series;

pub use self::generators::{
    cos_series, exp_series, factorial, fibonacci, hamming, sin_series, Hamming,
};
pub use self::series::{
    add, compose, derivative, divide, integral, inverse, multiply, negate, scale, square,
    subtract, Compose, Derivative, Integral, Inverse, Product, Sum,
};

use crate::error::Result;
use crate::sequence::{Sequence, SequenceExt};

/// Evaluates `c0 + c1*x + c2*x^2 + ...` by Horner's scheme.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::horner;
///
/// // 1 + 2x + 3x^2 at x = 2
/// assert_eq!(horner(&[1.0, 2.0, 3.0], 2.0), 17.0);
/// assert_eq!(horner(&[], 5.0), 0.0);
/// ```
pub fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc.mul_add(x, c))
}

/// Evaluates the first `terms` coefficients of a series at `x`.
///
/// Safe on infinite series: only `terms` coefficients are pulled.
pub fn evaluate<S: Sequence<Item = f64>>(coefficients: S, x: f64, terms: usize) -> Result<f64> {
    Ok(horner(&coefficients.limit(terms).take_all()?, x))
}

/// The n-th coefficient of the Cauchy product of two coefficient prefixes.
/// Coefficients beyond either prefix count as zero.
pub(crate) fn convolve_at(left: &[f64], right: &[f64], n: usize) -> f64 {
    let start = (n + 1).saturating_sub(right.len());
    let end = n.min(left.len().saturating_sub(1));
    if left.is_empty() || start > end {
        return 0.0;
    }
    (start..=end).map(|i| left[i] * right[n - i]).sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::sequence::source;

    #[test]
    fn evaluate_truncates_infinite_series() {
        // e ~ sum 1/k!
        let e = evaluate(exp_series(), 1.0, 20).unwrap();
        assert_abs_diff_eq!(e, std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn evaluate_matches_horner_on_polynomials() {
        let value = evaluate(source::of(vec![1.0, -3.0, 0.5]), 4.0, 10).unwrap();
        assert_eq!(value, horner(&[1.0, -3.0, 0.5], 4.0));
        assert_eq!(value, -3.0);
    }

    #[test]
    fn convolve_at_ignores_missing_coefficients() {
        assert_eq!(convolve_at(&[1.0, 2.0], &[3.0, 4.0], 0), 3.0);
        assert_eq!(convolve_at(&[1.0, 2.0], &[3.0, 4.0], 1), 10.0);
        assert_eq!(convolve_at(&[1.0, 2.0], &[3.0, 4.0], 2), 8.0);
        assert_eq!(convolve_at(&[1.0, 2.0], &[3.0, 4.0], 3), 0.0);
        assert_eq!(convolve_at(&[], &[3.0], 0), 0.0);
    }

    #[test]
    fn sine_series_evaluates_close_to_sin() {
        let x = 0.75;
        assert_abs_diff_eq!(evaluate(sin_series(), x, 25).unwrap(), x.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(evaluate(cos_series(), x, 25).unwrap(), x.cos(), epsilon = 1e-12);
    }
}
