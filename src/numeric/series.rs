use super::convolve_at;
use crate::error::{Result, SeqError};
use crate::sequence::combinators::Map;
use crate::sequence::tee::{tee, Fork};
use crate::sequence::{exhausted, Sequence, SequenceExt};
use crate::weak::Tolerance;

/// Coefficient-wise `left + factor * right`, padding the shorter input with
/// zeros.
pub struct Sum<A, B> {
    left: A,
    right: B,
    factor: f64,
    // left coefficient read before `right` failed
    held: Option<f64>,
}

impl<A, B> Sequence for Sum<A, B>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    type Item = f64;

    fn has_next(&mut self) -> bool {
        self.held.is_some() || self.left.has_next() || self.right.has_next()
    }

    fn try_next(&mut self) -> Result<f64> {
        if !self.has_next() {
            return exhausted();
        }
        let a = match self.held.take() {
            Some(a) => a,
            None => self.left.pull()?.unwrap_or(0.0),
        };
        let b = match self.right.pull() {
            Ok(b) => b.unwrap_or(0.0),
            Err(err) => {
                self.held = Some(a);
                return Err(err);
            }
        };
        Ok(a + self.factor * b)
    }
}

/// Coefficient-wise sum. The result is as long as the longer input.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::add;
/// use timeseq::sequence::{source, SequenceExt};
///
/// // (1 + 2x) + (3 + 0x + 5x^2)
/// let mut sum = add(source::of(vec![1.0, 2.0]), source::of(vec![3.0, 0.0, 5.0]));
/// assert_eq!(sum.take_all().unwrap(), vec![4.0, 2.0, 5.0]);
/// ```
pub fn add<A, B>(left: A, right: B) -> Sum<A, B>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    Sum {
        left,
        right,
        factor: 1.0,
        held: None,
    }
}

pub fn subtract<A, B>(left: A, right: B) -> Sum<A, B>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    Sum {
        left,
        right,
        factor: -1.0,
        held: None,
    }
}

pub fn scale<S>(seq: S, factor: f64) -> Map<S, impl FnMut(f64) -> f64>
where
    S: Sequence<Item = f64>,
{
    seq.map(move |c| c * factor)
}

pub fn negate<S>(seq: S) -> Map<S, impl FnMut(f64) -> f64>
where
    S: Sequence<Item = f64>,
{
    scale(seq, -1.0)
}

/// Cauchy product of two coefficient sequences.
///
/// Keeps every coefficient pulled so far from both factors. For two
/// polynomials of lengths `m` and `n` the product has `m + n - 1`
/// coefficients.
pub struct Product<A, B> {
    left: A,
    right: B,
    left_coeffs: Vec<f64>,
    right_coeffs: Vec<f64>,
    index: usize,
}

impl<A, B> Sequence for Product<A, B>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    type Item = f64;

    fn has_next(&mut self) -> bool {
        self.left.has_next()
            || self.right.has_next()
            || self.index + 1 < self.left_coeffs.len() + self.right_coeffs.len()
    }

    fn try_next(&mut self) -> Result<f64> {
        if !self.has_next() {
            return exhausted();
        }
        if self.left_coeffs.len() <= self.index {
            if let Some(a) = self.left.pull()? {
                self.left_coeffs.push(a);
            }
        }
        if self.right_coeffs.len() <= self.index {
            if let Some(b) = self.right.pull()? {
                self.right_coeffs.push(b);
            }
        }
        let coefficient = convolve_at(&self.left_coeffs, &self.right_coeffs, self.index);
        self.index += 1;
        Ok(coefficient)
    }
}

/// Multiplies two series. Both factors must have at least one coefficient.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::multiply;
/// use timeseq::sequence::{source, SequenceExt};
///
/// // (1 + x)(1 - x) = 1 - x^2
/// let mut product = multiply(source::of(vec![1.0, 1.0]), source::of(vec![1.0, -1.0])).unwrap();
/// assert_eq!(product.take_all().unwrap(), vec![1.0, 0.0, -1.0]);
/// ```
pub fn multiply<A, B>(mut left: A, mut right: B) -> Result<Product<A, B>>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    if !left.has_next() || !right.has_next() {
        return Err(SeqError::invalid_argument(
            "cannot multiply by an empty series",
        ));
    }
    Ok(Product {
        left,
        right,
        left_coeffs: Vec::new(),
        right_coeffs: Vec::new(),
        index: 0,
    })
}

/// Multiplies a series by itself, traversing it once.
pub fn square<S>(seq: S) -> Result<Product<Fork<S>, Fork<S>>>
where
    S: Sequence<Item = f64>,
{
    let mut forks = tee(seq, 2);
    match (forks.pop(), forks.pop()) {
        (Some(right), Some(left)) => multiply(left, right),
        _ => Err(SeqError::invalid_argument("square needs two forks")),
    }
}

/// The reciprocal series `1 / a`.
///
/// Infinite even for polynomial input.
pub struct Inverse<S> {
    inner: S,
    coeffs: Vec<f64>,
    result: Vec<f64>,
}

impl<S: Sequence<Item = f64>> Sequence for Inverse<S> {
    type Item = f64;

    fn has_next(&mut self) -> bool {
        true
    }

    fn try_next(&mut self) -> Result<f64> {
        let n = self.result.len();
        let leading = self.coeffs[0];
        let coefficient = if n == 0 {
            1.0 / leading
        } else {
            if self.coeffs.len() <= n {
                if let Some(a) = self.inner.pull()? {
                    self.coeffs.push(a);
                }
            }
            let tail: f64 = (1..=n)
                .filter_map(|i| self.coeffs.get(i).map(|a| a * self.result[n - i]))
                .sum();
            -tail / leading
        };
        self.result.push(coefficient);
        Ok(coefficient)
    }
}

/// Builds `1 / seq`. Fails if `seq` is empty or its leading coefficient is
/// within `tolerance` of zero.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::inverse;
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::Tolerance;
///
/// // 1 / (1 - x) = 1 + x + x^2 + ...
/// let mut geometric = inverse(source::of(vec![1.0, -1.0]), Tolerance::default()).unwrap();
/// assert_eq!(geometric.take(4).unwrap(), vec![1.0, 1.0, 1.0, 1.0]);
/// ```
pub fn inverse<S>(mut seq: S, tolerance: Tolerance) -> Result<Inverse<S>>
where
    S: Sequence<Item = f64>,
{
    let leading = seq
        .pull()?
        .ok_or_else(|| SeqError::invalid_argument("cannot invert an empty series"))?;
    if leading.abs() <= tolerance.epsilon() {
        return Err(SeqError::invalid_argument(format!(
            "cannot invert a series with leading coefficient {leading}"
        )));
    }
    Ok(Inverse {
        inner: seq,
        coeffs: vec![leading],
        result: Vec::new(),
    })
}

/// `numerator / denominator` as `numerator * (1 / denominator)`.
pub fn divide<A, B>(
    numerator: A,
    denominator: B,
    tolerance: Tolerance,
) -> Result<Product<A, Inverse<B>>>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    multiply(numerator, inverse(denominator, tolerance)?)
}

/// Composition `outer(inner(x))`.
///
/// The inner series must have a zero constant term so that each output
/// coefficient depends on finitely many terms. The powers `inner^k` are
/// kept as growing prefixes. May emit trailing zero coefficients when the
/// inputs are polynomials.
pub struct Compose<A, B> {
    outer: A,
    inner: B,
    outer_coeffs: Vec<f64>,
    inner_coeffs: Vec<f64>,
    powers: Vec<Vec<f64>>,
    index: usize,
}

impl<A, B> Compose<A, B> {
    fn degree(&self) -> usize {
        self.outer_coeffs.len().saturating_sub(1) * self.inner_coeffs.len().saturating_sub(1)
    }

    fn extend_powers(&mut self, n: usize) {
        if self.powers.is_empty() {
            self.powers.push(Vec::new());
        }
        self.powers[0].push(if n == 0 { 1.0 } else { 0.0 });
        for k in 1..self.powers.len() {
            let coefficient = convolve_at(&self.inner_coeffs, &self.powers[k - 1], n);
            self.powers[k].push(coefficient);
        }
        if n >= 1 {
            let previous = &self.powers[n - 1];
            let next: Vec<f64> = (0..=n)
                .map(|j| convolve_at(&self.inner_coeffs, previous, j))
                .collect();
            self.powers.push(next);
        }
    }
}

impl<A, B> Sequence for Compose<A, B>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    type Item = f64;

    fn has_next(&mut self) -> bool {
        self.outer.has_next() || self.inner.has_next() || self.index <= self.degree()
    }

    fn try_next(&mut self) -> Result<f64> {
        if !self.has_next() {
            return exhausted();
        }
        let n = self.index;
        if self.inner_coeffs.len() <= n {
            if let Some(b) = self.inner.pull()? {
                self.inner_coeffs.push(b);
            }
        }
        if self.outer_coeffs.len() <= n {
            if let Some(a) = self.outer.pull()? {
                self.outer_coeffs.push(a);
            }
        }
        self.extend_powers(n);
        let coefficient = self
            .outer_coeffs
            .iter()
            .zip(self.powers.iter())
            .map(|(a, power)| a * power[n])
            .sum();
        self.index += 1;
        Ok(coefficient)
    }
}

/// Builds `outer(inner(x))`. Fails if either series is empty or `inner`
/// has a constant term outside `tolerance`.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::compose;
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::Tolerance;
///
/// // (1 + y)^2 with y = 2x  ->  1 + 4x + 4x^2
/// let outer = source::of(vec![1.0, 2.0, 1.0]);
/// let inner = source::of(vec![0.0, 2.0]);
/// let mut composed = compose(outer, inner, Tolerance::default()).unwrap();
/// assert_eq!(composed.take_all().unwrap(), vec![1.0, 4.0, 4.0]);
/// ```
pub fn compose<A, B>(mut outer: A, mut inner: B, tolerance: Tolerance) -> Result<Compose<A, B>>
where
    A: Sequence<Item = f64>,
    B: Sequence<Item = f64>,
{
    if !outer.has_next() {
        return Err(SeqError::invalid_argument(
            "cannot compose an empty outer series",
        ));
    }
    let constant = inner
        .pull()?
        .ok_or_else(|| SeqError::invalid_argument("cannot compose with an empty inner series"))?;
    if constant.abs() > tolerance.epsilon() {
        return Err(SeqError::invalid_argument(format!(
            "inner series must have a zero constant term, got {constant}"
        )));
    }
    Ok(Compose {
        outer,
        inner,
        outer_coeffs: Vec::new(),
        inner_coeffs: vec![0.0],
        powers: Vec::new(),
        index: 0,
    })
}

/// Term-wise derivative `[a1, 2*a2, 3*a3, ...]`.
pub struct Derivative<S> {
    inner: S,
    index: usize,
}

impl<S: Sequence<Item = f64>> Derivative<S> {
    fn skip_constant(&mut self) -> Result<()> {
        if self.index == 0 {
            self.inner.pull()?;
            self.index = 1;
        }
        Ok(())
    }
}

impl<S: Sequence<Item = f64>> Sequence for Derivative<S> {
    type Item = f64;

    fn has_next(&mut self) -> bool {
        // a failed skip is reported by `try_next`
        self.skip_constant().is_err() || self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<f64> {
        self.skip_constant()?;
        let a = self.inner.try_next()?;
        let coefficient = a * self.index as f64;
        self.index += 1;
        Ok(coefficient)
    }
}

/// Differentiates a series term by term. The constant term is dropped, so
/// a single-coefficient series has an empty derivative.
pub fn derivative<S: Sequence<Item = f64>>(seq: S) -> Derivative<S> {
    Derivative {
        inner: seq,
        index: 0,
    }
}

/// Term-wise integral with zero constant: `[0, a0, a1/2, a2/3, ...]`.
pub struct Integral<S> {
    inner: S,
    index: usize,
}

impl<S: Sequence<Item = f64>> Sequence for Integral<S> {
    type Item = f64;

    fn has_next(&mut self) -> bool {
        self.index == 0 || self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<f64> {
        if self.index == 0 {
            self.index = 1;
            return Ok(0.0);
        }
        let a = self.inner.try_next()?;
        let coefficient = a / self.index as f64;
        self.index += 1;
        Ok(coefficient)
    }
}

/// Integrates a series term by term with integration constant zero.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::{exp_series, integral};
/// use timeseq::sequence::SequenceExt;
///
/// // the integral of exp(x) is exp(x) - 1
/// let mut shifted = integral(exp_series());
/// assert_eq!(shifted.take(3).unwrap(), vec![0.0, 1.0, 0.5]);
/// ```
pub fn integral<S: Sequence<Item = f64>>(seq: S) -> Integral<S> {
    Integral {
        inner: seq,
        index: 0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::numeric::{cos_series, exp_series, sin_series};
    use crate::sequence::source;

    fn assert_coefficients(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-10);
        }
    }

    #[test]
    fn sum_pads_with_zeros() {
        let sum = add(source::of(vec![1.0, 2.0]), source::of(vec![10.0, 20.0, 30.0]));
        assert_eq!(sum.limit(10).take_all().unwrap(), vec![11.0, 22.0, 30.0]);
        let difference = subtract(source::of(vec![1.0]), source::of(vec![1.0, 1.0]));
        assert_eq!(difference.limit(10).take_all().unwrap(), vec![0.0, -1.0]);
    }

    #[test]
    fn sum_keeps_the_left_coefficient_when_right_fails() {
        let mut forks = crate::sequence::tee::tee_bounded::<_, 1>(source::of(vec![1.0, 2.0]), 2);
        let mut slow = forks.pop().unwrap();
        let fast = forks.pop().unwrap();
        let mut sum = add(source::of(vec![10.0, 20.0]), fast);

        assert_eq!(sum.try_next(), Ok(11.0));
        assert_eq!(sum.try_next(), Err(SeqError::BufferOverflow { capacity: 1 }));
        assert_eq!(slow.take(1).unwrap(), vec![1.0]);
        assert_eq!(sum.take_all().unwrap(), vec![22.0]);
    }

    #[test]
    fn scale_and_negate() {
        let mut scaled = scale(source::of(vec![1.0, -2.0]), 3.0);
        assert_eq!(scaled.take_all().unwrap(), vec![3.0, -6.0]);
        assert_eq!(negate(source::of(vec![1.0])).take_all().unwrap(), vec![-1.0]);
    }

    #[test]
    fn product_of_polynomials_has_expected_length() {
        let mut product =
            multiply(source::of(vec![1.0, 2.0, 3.0]), source::of(vec![4.0, 5.0])).unwrap();
        assert_eq!(product.take_all().unwrap(), vec![4.0, 13.0, 22.0, 15.0]);
    }

    #[test]
    fn multiply_rejects_empty_factors() {
        let result = multiply(source::empty::<f64>(), source::of(vec![1.0]));
        assert!(matches!(result, Err(SeqError::InvalidArgument(_))));
        let result = multiply(source::of(vec![1.0]), source::empty::<f64>());
        assert!(matches!(result, Err(SeqError::InvalidArgument(_))));
    }

    #[test]
    fn square_traverses_once() {
        let mut pulls = 0;
        let counted = source::of(vec![1.0, 1.0]).peek(|_| pulls += 1);
        let squared = square(counted).unwrap().take_all().unwrap();
        assert_eq!(squared, vec![1.0, 2.0, 1.0]);
        assert_eq!(pulls, 2);
    }

    #[test]
    fn series_times_its_inverse_is_one() {
        let t = vec![2.0, -3.0, 0.5, 7.0];
        let inverted = inverse(source::of(t.clone()), Tolerance::default()).unwrap();
        let mut product = multiply(source::of(t), inverted).unwrap();
        let mut expected = vec![0.0; 12];
        expected[0] = 1.0;
        assert_coefficients(&product.take(12).unwrap(), &expected);
    }

    #[test]
    fn inverse_rejects_degenerate_input() {
        let tolerance = Tolerance::new(1e-6).unwrap();
        assert!(inverse(source::empty::<f64>(), tolerance).is_err());
        assert!(inverse(source::of(vec![1e-9, 1.0]), tolerance).is_err());
    }

    #[test]
    fn divide_recovers_a_factor() {
        // (1 + x)(2 - x) / (2 - x) = 1 + x
        let numerator = multiply(source::of(vec![1.0, 1.0]), source::of(vec![2.0, -1.0])).unwrap();
        let mut quotient =
            divide(numerator, source::of(vec![2.0, -1.0]), Tolerance::default()).unwrap();
        assert_coefficients(&quotient.take(6).unwrap(), &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn pythagorean_identity_on_taylor_coefficients() {
        let mut one = add(square(cos_series()).unwrap(), square(sin_series()).unwrap());
        let mut expected = vec![0.0; 14];
        expected[0] = 1.0;
        assert_coefficients(&one.take(14).unwrap(), &expected);
    }

    #[test]
    fn compose_exp_with_a_polynomial() {
        // exp(2x) = sum (2x)^k / k!
        let mut composed =
            compose(exp_series(), source::of(vec![0.0, 2.0]), Tolerance::default()).unwrap();
        assert_coefficients(
            &composed.take(5).unwrap(),
            &[1.0, 2.0, 2.0, 8.0 / 6.0, 16.0 / 24.0],
        );
    }

    #[test]
    fn compose_two_infinite_series() {
        // 1/(1-y) with y = sin(x): 1 + x + x^2 + 5/6 x^3 + ...
        let outer = inverse(source::of(vec![1.0, -1.0]), Tolerance::default()).unwrap();
        let mut composed = compose(outer, sin_series(), Tolerance::default()).unwrap();
        assert_coefficients(&composed.take(4).unwrap(), &[1.0, 1.0, 1.0, 5.0 / 6.0]);
    }

    #[test]
    fn compose_rejects_constant_inner_term() {
        let result = compose(
            source::of(vec![1.0]),
            source::of(vec![0.5, 1.0]),
            Tolerance::default(),
        );
        assert!(matches!(result, Err(SeqError::InvalidArgument(_))));
    }

    #[test]
    fn derivative_and_integral_are_inverse_up_to_constant() {
        assert_eq!(
            derivative(source::of(vec![5.0, 1.0, 1.0, 1.0])).take_all().unwrap(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(
            integral(source::of(vec![1.0, 2.0, 3.0])).take_all().unwrap(),
            vec![0.0, 1.0, 1.0, 1.0]
        );
        let mut exp_again = derivative(exp_series());
        let mut exp = exp_series();
        assert_coefficients(&exp_again.take(8).unwrap(), &exp.take(8).unwrap());
        assert!(!derivative(source::of(vec![3.0])).has_next());
    }
}
