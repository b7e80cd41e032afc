use std::collections::VecDeque;

use crate::error::{Result, SeqError};
use crate::sequence::{source, Sequence, SequenceExt};

/// `0, 1, 1, 2, 3, 5, ...` as `f64`.
pub fn fibonacci() -> impl Sequence<Item = f64> {
    source::binary_generator(0.0, 1.0, |a, b| a + b)
}

/// `0!, 1!, 2!, ...` as `f64`.
pub fn factorial() -> impl Sequence<Item = f64> {
    source::unary_generator((0.0f64, 1.0f64), |&(n, f)| (n + 1.0, f * (n + 1.0))).map(|(_, f)| f)
}

/// Taylor coefficients of `exp(x)`: `1 / k!`.
pub fn exp_series() -> impl Sequence<Item = f64> {
    factorial().map(|f| 1.0 / f)
}

/// Taylor coefficients of `sin(x)`: `0, 1, 0, -1/3!, 0, 1/5!, ...`.
pub fn sin_series() -> impl Sequence<Item = f64> {
    exp_series().map2(source::cycle([0.0, 1.0, 0.0, -1.0]), |c, sign| c * sign)
}

/// Taylor coefficients of `cos(x)`: `1, 0, -1/2!, 0, 1/4!, ...`.
pub fn cos_series() -> impl Sequence<Item = f64> {
    exp_series().map2(source::cycle([1.0, 0.0, -1.0, 0.0]), |c, sign| c * sign)
}

/// Numbers whose prime factors all come from a fixed set of moduli, in
/// ascending order, starting with 1.
///
/// Each modulus keeps a cursor into the values produced so far; the next
/// value is the smallest `modulus * value_at_cursor`. Values no cursor can
/// reach any more are dropped from the front of the history. Values
/// saturate at `u64::MAX`.
///
/// # Examples
///
/// ```rust
/// use timeseq::numeric::hamming;
/// use timeseq::sequence::SequenceExt;
///
/// let mut regular = hamming(&[2, 3, 5]).unwrap();
/// assert_eq!(regular.take(10).unwrap(), vec![1, 2, 3, 4, 5, 6, 8, 9, 10, 12]);
/// ```
#[derive(Debug, Clone)]
pub struct Hamming {
    moduli: Vec<u64>,
    cursors: Vec<usize>,
    history: VecDeque<u64>,
    offset: usize,
}

impl Sequence for Hamming {
    type Item = u64;

    fn has_next(&mut self) -> bool {
        true
    }

    fn try_next(&mut self) -> Result<u64> {
        let current = self.history.back().copied().ok_or(SeqError::Exhausted)?;

        let candidates: Vec<u64> = self
            .moduli
            .iter()
            .zip(&self.cursors)
            .map(|(&m, &cursor)| m.saturating_mul(self.history[cursor - self.offset]))
            .collect();
        let next = candidates.iter().copied().min().unwrap_or(u64::MAX);
        for (cursor, candidate) in self.cursors.iter_mut().zip(candidates) {
            if candidate == next {
                *cursor += 1;
            }
        }
        self.history.push_back(next);

        let lowest = self.cursors.iter().copied().min().unwrap_or(self.offset);
        while self.offset < lowest {
            self.history.pop_front();
            self.offset += 1;
        }
        Ok(current)
    }
}

/// Fails if `moduli` is empty or contains a value below 2.
pub fn hamming(moduli: &[u64]) -> Result<Hamming> {
    if moduli.is_empty() {
        return Err(SeqError::invalid_argument("hamming needs at least one modulus"));
    }
    if let Some(bad) = moduli.iter().find(|&&m| m < 2) {
        return Err(SeqError::invalid_argument(format!(
            "hamming moduli must be at least 2, got {bad}"
        )));
    }
    let mut moduli = moduli.to_vec();
    moduli.sort_unstable();
    moduli.dedup();
    Ok(Hamming {
        cursors: vec![0; moduli.len()],
        moduli,
        history: VecDeque::from([1]),
        offset: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_starts_at_zero() {
        assert_eq!(
            fibonacci().take(10).unwrap(),
            vec![0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0]
        );
    }

    #[test]
    fn factorial_starts_at_zero_factorial() {
        assert_eq!(factorial().take(6).unwrap(), vec![1.0, 1.0, 2.0, 6.0, 24.0, 120.0]);
    }

    #[test]
    fn trigonometric_series_alternate() {
        let sin = sin_series().take(6).unwrap();
        assert_eq!(sin[..3], [0.0, 1.0, 0.0]);
        assert_eq!(sin[3], -1.0 / 6.0);
        assert_eq!(sin[5], 1.0 / 120.0);
        let cos = cos_series().take(5).unwrap();
        assert_eq!(cos, vec![1.0, 0.0, -0.5, 0.0, 1.0 / 24.0]);
    }

    #[test]
    fn hamming_with_single_modulus_is_powers() {
        assert_eq!(hamming(&[3]).unwrap().take(5).unwrap(), vec![1, 3, 9, 27, 81]);
    }

    #[test]
    fn hamming_ignores_repeated_moduli() {
        assert_eq!(hamming(&[2, 2, 3]).unwrap().take(6).unwrap(), vec![1, 2, 3, 4, 6, 8]);
    }

    #[test]
    fn hamming_keeps_history_bounded() {
        let mut regular = hamming(&[2, 3, 5]).unwrap();
        let values = regular.take(1000).unwrap();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values[999], 51_200_000);
        assert!(regular.history.len() < 1000);
    }

    #[test]
    fn hamming_rejects_bad_moduli() {
        assert!(matches!(hamming(&[]), Err(SeqError::InvalidArgument(_))));
        assert!(matches!(hamming(&[2, 1]), Err(SeqError::InvalidArgument(_))));
        assert!(matches!(hamming(&[0]), Err(SeqError::InvalidArgument(_))));
    }
}
