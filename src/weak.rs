//! Tolerance-aware equality and ordering.
//!
//! Grouping, deduplication and merging never compare keys with `==`. They ask
//! whether two keys are *weakly* equal under a [`Tolerance`]: floating-point
//! values within epsilon of each other are the same key, `None` equals `None`,
//! and `None` sorts below every present value.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{Result, SeqError};
use crate::pair::Pair;

/// The epsilon used by weak comparisons.
///
/// `Tolerance` is the only configuration the core carries. It is validated on
/// construction and copied freely into every combinator that compares keys.
///
/// # Examples
///
/// ```rust
/// use timeseq::{Tolerance, WeakEq};
///
/// let tolerance = Tolerance::new(0.01).unwrap();
/// assert!(1.0f64.weak_eq(&1.005, tolerance));
/// assert!(!1.0f64.weak_eq(&1.02, tolerance));
/// assert_eq!(Tolerance::default().epsilon(), 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    epsilon: f64,
}

impl Tolerance {
    /// Epsilon used when the caller does not supply one
    pub const DEFAULT_EPSILON: f64 = 1e-10;

    /// Creates a tolerance, rejecting negative or non-finite epsilons.
    pub fn new(epsilon: f64) -> Result<Tolerance> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(SeqError::invalid_argument(format!(
                "tolerance must be finite and non-negative, got {epsilon}"
            )));
        }
        Ok(Tolerance { epsilon })
    }

    /// A zero tolerance: floats must match exactly.
    pub const fn exact() -> Tolerance {
        Tolerance { epsilon: 0.0 }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            epsilon: Tolerance::DEFAULT_EPSILON,
        }
    }
}

/// Equality up to a [`Tolerance`].
pub trait WeakEq {
    /// Returns `true` if `self` and `other` are indistinguishable under `tolerance`.
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool;
}

/// Ordering consistent with [`WeakEq`]: weakly equal values compare `Equal`.
pub trait WeakOrd: WeakEq {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering;
}

macro_rules! weak_float {
    ($($t:ty),*) => {
        $(
            impl WeakEq for $t {
                fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
                    self == other || ((self - other).abs() as f64) < tolerance.epsilon
                }
            }

            impl WeakOrd for $t {
                fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
                    if self.weak_eq(other, tolerance) {
                        Ordering::Equal
                    } else {
                        self.partial_cmp(other).unwrap_or_else(|| self.total_cmp(other))
                    }
                }
            }
        )*
    };
}

macro_rules! weak_exact {
    ($($t:ty),*) => {
        $(
            impl WeakEq for $t {
                fn weak_eq(&self, other: &Self, _tolerance: Tolerance) -> bool {
                    self == other
                }
            }

            impl WeakOrd for $t {
                fn weak_cmp(&self, other: &Self, _tolerance: Tolerance) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

weak_float!(f32, f64);
weak_exact!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, str, String,
    NaiveDate, NaiveDateTime
);

impl<Tz: TimeZone> WeakEq for DateTime<Tz> {
    fn weak_eq(&self, other: &Self, _tolerance: Tolerance) -> bool {
        self == other
    }
}

impl<Tz: TimeZone> WeakOrd for DateTime<Tz> {
    fn weak_cmp(&self, other: &Self, _tolerance: Tolerance) -> Ordering {
        self.cmp(other)
    }
}

impl<T: WeakEq + ?Sized> WeakEq for &T {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        (**self).weak_eq(*other, tolerance)
    }
}

impl<T: WeakOrd + ?Sized> WeakOrd for &T {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        (**self).weak_cmp(*other, tolerance)
    }
}

impl<T: WeakEq> WeakEq for Option<T> {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.weak_eq(b, tolerance),
            _ => false,
        }
    }
}

impl<T: WeakOrd> WeakOrd for Option<T> {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        match (self, other) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.weak_cmp(b, tolerance),
        }
    }
}

impl<A: WeakEq, B: WeakEq> WeakEq for Pair<A, B> {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.first().weak_eq(other.first(), tolerance)
            && self.second().weak_eq(other.second(), tolerance)
    }
}

impl<A: WeakOrd, B: WeakOrd> WeakOrd for Pair<A, B> {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        self.first()
            .weak_cmp(other.first(), tolerance)
            .then_with(|| self.second().weak_cmp(other.second(), tolerance))
    }
}

impl<A: WeakEq, B: WeakEq> WeakEq for (A, B) {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.0.weak_eq(&other.0, tolerance) && self.1.weak_eq(&other.1, tolerance)
    }
}

impl<A: WeakOrd, B: WeakOrd> WeakOrd for (A, B) {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        self.0
            .weak_cmp(&other.0, tolerance)
            .then_with(|| self.1.weak_cmp(&other.1, tolerance))
    }
}

impl<T: WeakEq> WeakEq for [T] {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.weak_eq(b, tolerance))
    }
}

impl<T: WeakOrd> WeakOrd for [T] {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        for (a, b) in self.iter().zip(other.iter()) {
            match a.weak_cmp(b, tolerance) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.len().cmp(&other.len())
    }
}

impl<T: WeakEq> WeakEq for Vec<T> {
    fn weak_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.as_slice().weak_eq(other.as_slice(), tolerance)
    }
}

impl<T: WeakOrd> WeakOrd for Vec<T> {
    fn weak_cmp(&self, other: &Self, tolerance: Tolerance) -> Ordering {
        self.as_slice().weak_cmp(other.as_slice(), tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_tolerances() {
        assert!(Tolerance::new(-1.0).is_err());
        assert!(Tolerance::new(f64::NAN).is_err());
        assert!(Tolerance::new(f64::INFINITY).is_err());
        assert_eq!(Tolerance::new(0.5).unwrap().epsilon(), 0.5);
    }

    #[test]
    fn floats_within_epsilon_are_equal() {
        let tolerance = Tolerance::new(0.1).unwrap();
        assert!(1.0f64.weak_eq(&1.05, tolerance));
        assert!(!1.0f64.weak_eq(&1.2, tolerance));
        assert!(2.0f32.weak_eq(&2.05, tolerance));
        assert_eq!(1.0f64.weak_cmp(&1.05, tolerance), Ordering::Equal);
        assert_eq!(1.0f64.weak_cmp(&1.5, tolerance), Ordering::Less);
    }

    #[test]
    fn exact_tolerance_still_matches_identical_floats() {
        assert!(3.25f64.weak_eq(&3.25, Tolerance::exact()));
        assert!(f64::INFINITY.weak_eq(&f64::INFINITY, Tolerance::exact()));
        assert!(!3.25f64.weak_eq(&3.2500001, Tolerance::exact()));
    }

    #[test]
    fn none_is_the_minimum() {
        let tolerance = Tolerance::default();
        assert!(None::<f64>.weak_eq(&None, tolerance));
        assert!(!None.weak_eq(&Some(0.0f64), tolerance));
        assert_eq!(
            None.weak_cmp(&Some(f64::NEG_INFINITY), tolerance),
            Ordering::Less
        );
        assert_eq!(Some(1).weak_cmp(&None, tolerance), Ordering::Greater);
    }

    #[test]
    fn pairs_and_vectors_compare_element_wise() {
        let tolerance = Tolerance::new(0.01).unwrap();
        assert!(Pair::new(1, 2.0f64).weak_eq(&Pair::new(1, 2.001), tolerance));
        assert!(!Pair::new(1, 2.0f64).weak_eq(&Pair::new(2, 2.0), tolerance));
        assert!(vec![1.0f64, 2.0].weak_eq(&vec![1.001, 2.0], tolerance));
        assert!(!vec![1.0f64].weak_eq(&vec![1.0, 2.0], tolerance));
        assert_eq!(
            vec![1.0f64].weak_cmp(&vec![1.0, 2.0], tolerance),
            Ordering::Less
        );
    }

    #[test]
    fn timestamps_compare_exactly() {
        let a = DateTime::parse_from_rfc3339("2011-10-05T14:48:00.000Z").unwrap();
        let b = DateTime::parse_from_rfc3339("2011-10-05T14:58:00.000Z").unwrap();
        assert!(a.weak_eq(&a, Tolerance::default()));
        assert_eq!(a.weak_cmp(&b, Tolerance::default()), Ordering::Less);
    }
}
