//! Pull-based, possibly infinite sequences and their combinators.
//!
//! A [`Sequence`] differs from [`Iterator`] in one respect that the rest of
//! the crate relies on: it can be asked whether another element exists
//! without consuming it. Strong zips, merges and run grouping all need that
//! look-ahead, and `None` stays available as an ordinary element value.
//!
//! Sequences only do work when `has_next` or `try_next` is called. Infinite
//! sequences are first-class; [`SequenceExt::take_all`] and seedless
//! [`SequenceExt::reduce`] never return on them, so bound infinite input with
//! [`SequenceExt::limit`] or [`SequenceExt::take`] first.

pub mod combinators;
pub mod group;
pub mod merge;
pub mod source;
pub mod tee;
pub mod zip;

use crate::error::{Result, SeqError};
use crate::weak::{Tolerance, WeakEq};

use self::combinators::{Filter, Limit, Map, Map2, Peek};
use self::group::{GroupBy, KeepFirst, KeepLast};
use self::tee::Fork;

/// A stateful cursor over an ordered, possibly unbounded run of elements.
///
/// # Contract
///
/// * `has_next` never changes the logical position. Implementations may
///   buffer one element internally to answer it.
/// * `try_next` advances by exactly one element and fails with
///   [`SeqError::Exhausted`] when `has_next` is `false`.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, Sequence};
///
/// let mut seq = source::of([1, 2]);
/// assert!(seq.has_next());
/// assert!(seq.has_next());
/// assert_eq!(seq.try_next(), Ok(1));
/// assert_eq!(seq.try_next(), Ok(2));
/// assert!(!seq.has_next());
/// assert!(seq.try_next().is_err());
/// ```
pub trait Sequence {
    type Item;

    fn has_next(&mut self) -> bool;

    fn try_next(&mut self) -> Result<Self::Item>;

    /// Returns the next element, or `Ok(None)` once the sequence is
    /// exhausted. Any other failure of `try_next` is passed on.
    fn pull(&mut self) -> Result<Option<Self::Item>> {
        if !self.has_next() {
            return Ok(None);
        }
        match self.try_next() {
            Ok(item) => Ok(Some(item)),
            Err(SeqError::Exhausted) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        (**self).try_next()
    }
}

impl<S: Sequence + ?Sized> Sequence for &mut S {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        (**self).try_next()
    }
}

/// A type-erased sequence.
pub type BoxSeq<'a, T> = Box<dyn Sequence<Item = T> + 'a>;

/// Adapts a [`Sequence`] into a standard [`Iterator`].
#[derive(Debug, Clone)]
pub struct SeqIter<S> {
    inner: S,
}

impl<S: Sequence> Iterator for SeqIter<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Result<S::Item>> {
        self.inner.pull().transpose()
    }
}

/// Combinators available on every [`Sequence`].
pub trait SequenceExt: Sequence + Sized {
    /// Keeps only the elements accepted by `predicate`.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Filter::new(self, predicate)
    }

    /// Transforms every element with `f`.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: FnMut(Self::Item) -> U,
    {
        Map::new(self, f)
    }

    /// Combines this sequence pairwise with `other`, stopping at the shorter.
    fn map2<O, U, F>(self, other: O, f: F) -> Map2<Self, O, F>
    where
        O: Sequence,
        F: FnMut(Self::Item, O::Item) -> U,
    {
        Map2::new(self, other, f)
    }

    /// Calls `side_effect` once per element, just before handing it out.
    fn peek<F>(self, side_effect: F) -> Peek<Self, F>
    where
        F: FnMut(&Self::Item),
    {
        Peek::new(self, side_effect)
    }

    /// Yields at most the first `n` elements.
    fn limit(self, n: usize) -> Limit<Self> {
        Limit::new(self, n)
    }

    /// Eagerly collects up to `n` elements. Stops at the first failure other
    /// than exhaustion and returns it.
    fn take(&mut self, n: usize) -> Result<Vec<Self::Item>> {
        combinators::take(self, n)
    }

    /// Eagerly collects every remaining element. Never returns on an
    /// infinite sequence.
    fn take_all(&mut self) -> Result<Vec<Self::Item>> {
        combinators::take_all(self)
    }

    /// Left fold without a seed. Never returns on an infinite sequence.
    fn reduce<F>(self, op: F) -> Result<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        combinators::reduce(self, op)
    }

    /// Left fold from `seed`. Never returns on an infinite sequence.
    fn fold<A, F>(self, seed: A, f: F) -> Result<A>
    where
        F: FnMut(A, Self::Item) -> A,
    {
        combinators::fold(self, seed, f)
    }

    /// Splits into `n` independently consumable forks.
    fn tee(self, n: usize) -> Vec<Fork<Self>>
    where
        Self::Item: Clone,
    {
        tee::tee(self, n)
    }

    /// Groups consecutive elements whose keys are weakly equal.
    fn group_by<K, F>(self, key: F, tolerance: Tolerance) -> GroupBy<Self, F>
    where
        K: WeakEq,
        F: FnMut(&Self::Item) -> K,
    {
        GroupBy::new(self, key, tolerance)
    }

    /// Collapses runs of weakly equal keys to their first element.
    fn keep_first<K, F>(self, key: F, tolerance: Tolerance) -> KeepFirst<Self, K, F>
    where
        K: WeakEq,
        F: FnMut(&Self::Item) -> K,
    {
        KeepFirst::new(self, key, tolerance)
    }

    /// Same as [`SequenceExt::keep_first`].
    fn skip_duplicates<K, F>(self, key: F, tolerance: Tolerance) -> KeepFirst<Self, K, F>
    where
        K: WeakEq,
        F: FnMut(&Self::Item) -> K,
    {
        KeepFirst::new(self, key, tolerance)
    }

    /// Collapses runs of weakly equal keys to their last element.
    fn keep_last<K, F>(self, key: F, tolerance: Tolerance) -> KeepLast<Self, F>
    where
        K: WeakEq,
        F: FnMut(&Self::Item) -> K,
    {
        KeepLast::new(self, key, tolerance)
    }

    fn boxed<'a>(self) -> BoxSeq<'a, Self::Item>
    where
        Self: 'a,
    {
        Box::new(self)
    }

    fn iter(self) -> SeqIter<Self> {
        SeqIter { inner: self }
    }
}

impl<S: Sequence> SequenceExt for S {}

pub(crate) fn exhausted<T>() -> Result<T> {
    Err(SeqError::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_next_does_not_advance() {
        let mut seq = source::of(vec![Some(1), None, Some(3)]);
        for _ in 0..5 {
            assert!(seq.has_next());
        }
        assert_eq!(seq.take_all().unwrap(), vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn none_elements_are_not_exhaustion() {
        let mut seq = source::of(vec![None::<u8>, None]);
        assert_eq!(seq.pull(), Ok(Some(None)));
        assert_eq!(seq.pull(), Ok(Some(None)));
        assert_eq!(seq.pull(), Ok(None));
    }

    #[test]
    fn take_all_twice_yields_empty_second_time() {
        let mut seq = source::of(1..=4);
        assert_eq!(seq.take_all().unwrap().len(), 4);
        assert!(seq.take_all().unwrap().is_empty());
    }

    #[test]
    fn boxed_and_borrowed_sequences_delegate() {
        let mut boxed: BoxSeq<'_, i32> = source::of([1, 2, 3]).boxed();
        assert_eq!((&mut boxed).take(2).unwrap(), vec![1, 2]);
        assert_eq!(boxed.take_all().unwrap(), vec![3]);
    }

    #[test]
    fn iter_adapts_to_std() {
        let doubled: Result<Vec<i32>> = source::of([1, 2, 3]).iter().map(|x| x.map(|x| x * 2)).collect();
        assert_eq!(doubled, Ok(vec![2, 4, 6]));
    }

    #[test]
    fn pull_passes_on_failures_other_than_exhaustion() {
        let mut forks = tee::tee_bounded::<_, 2>(source::of(0..10), 2);
        let _slow = forks.pop();
        let mut fast = forks.pop().unwrap();
        assert_eq!(fast.take(2).unwrap(), vec![0, 1]);
        assert_eq!(fast.pull(), Err(SeqError::BufferOverflow { capacity: 2 }));
    }
}
