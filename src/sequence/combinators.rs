//! Element-wise combinators, bounded materialization and folds.

use super::{exhausted, Sequence};
use crate::error::{Result, SeqError};

/// Skips elements rejected by a predicate.
///
/// `has_next` has to look ahead for an accepted element, so one element is
/// buffered between calls. A failure met while looking ahead is buffered the
/// same way and handed out by the next `try_next`.
pub struct Filter<S: Sequence, P> {
    inner: S,
    predicate: P,
    buffered: Option<Result<S::Item>>,
}

impl<S: Sequence, P> Filter<S, P> {
    pub(crate) fn new(inner: S, predicate: P) -> Self {
        Filter {
            inner,
            predicate,
            buffered: None,
        }
    }
}

impl<S, P> Sequence for Filter<S, P>
where
    S: Sequence,
    P: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        if self.buffered.is_some() {
            return true;
        }
        loop {
            match self.inner.pull() {
                Ok(Some(item)) if (self.predicate)(&item) => {
                    self.buffered = Some(Ok(item));
                    return true;
                }
                Ok(Some(_)) => continue,
                Ok(None) => return false,
                Err(err) => {
                    self.buffered = Some(Err(err));
                    return true;
                }
            }
        }
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if !self.has_next() {
            return exhausted();
        }
        self.buffered.take().unwrap_or(Err(SeqError::Exhausted))
    }
}

pub struct Map<S, F> {
    inner: S,
    f: F,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(inner: S, f: F) -> Self {
        Map { inner, f }
    }
}

impl<S, U, F> Sequence for Map<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> U,
{
    type Item = U;

    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<U> {
        self.inner.try_next().map(&mut self.f)
    }
}

/// Pairwise transform of two sequences; ends with the shorter one.
pub struct Map2<A, B, F> {
    left: A,
    right: B,
    f: F,
}

impl<A, B, F> Map2<A, B, F> {
    pub(crate) fn new(left: A, right: B, f: F) -> Self {
        Map2 { left, right, f }
    }
}

impl<A, B, U, F> Sequence for Map2<A, B, F>
where
    A: Sequence,
    B: Sequence,
    F: FnMut(A::Item, B::Item) -> U,
{
    type Item = U;

    fn has_next(&mut self) -> bool {
        self.left.has_next() && self.right.has_next()
    }

    fn try_next(&mut self) -> Result<U> {
        if !self.has_next() {
            return exhausted();
        }
        let a = self.left.try_next()?;
        let b = self.right.try_next()?;
        Ok((self.f)(a, b))
    }
}

/// Forwards elements unchanged after showing each one to a callback.
pub struct Peek<S, F> {
    inner: S,
    side_effect: F,
}

impl<S, F> Peek<S, F> {
    pub(crate) fn new(inner: S, side_effect: F) -> Self {
        Peek { inner, side_effect }
    }
}

impl<S, F> Sequence for Peek<S, F>
where
    S: Sequence,
    F: FnMut(&S::Item),
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        let item = self.inner.try_next()?;
        (self.side_effect)(&item);
        Ok(item)
    }
}

/// Yields at most `remaining` more elements.
pub struct Limit<S> {
    inner: S,
    remaining: usize,
}

impl<S> Limit<S> {
    pub(crate) fn new(inner: S, remaining: usize) -> Self {
        Limit { inner, remaining }
    }
}

impl<S: Sequence> Sequence for Limit<S> {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        self.remaining > 0 && self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if self.remaining == 0 {
            return exhausted();
        }
        let item = self.inner.try_next()?;
        self.remaining -= 1;
        Ok(item)
    }
}

/// Collects up to `n` elements.
///
/// Elements pulled before a failure are consumed; the failure is returned
/// and the sequence is left where it stopped, so the caller can recover and
/// call again.
pub fn take<S: Sequence + ?Sized>(seq: &mut S, n: usize) -> Result<Vec<S::Item>> {
    let mut taken = Vec::with_capacity(n.min(1024));
    while taken.len() < n {
        match seq.pull()? {
            Some(item) => taken.push(item),
            None => break,
        }
    }
    Ok(taken)
}

pub fn take_all<S: Sequence + ?Sized>(seq: &mut S) -> Result<Vec<S::Item>> {
    let mut taken = Vec::new();
    while let Some(item) = seq.pull()? {
        taken.push(item);
    }
    Ok(taken)
}

/// Seedless left fold. A single element is returned without calling `op`.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::SeqError;
///
/// assert_eq!(source::of([1, 2, 3, 4]).reduce(|a, b| a * b), Ok(24));
/// assert_eq!(source::empty::<i32>().reduce(|a, b| a + b), Err(SeqError::EmptyReduction));
/// ```
pub fn reduce<S, F>(mut seq: S, mut op: F) -> Result<S::Item>
where
    S: Sequence,
    F: FnMut(S::Item, S::Item) -> S::Item,
{
    let mut acc = seq.pull()?.ok_or(SeqError::EmptyReduction)?;
    while let Some(item) = seq.pull()? {
        acc = op(acc, item);
    }
    Ok(acc)
}

pub fn fold<S, A, F>(mut seq: S, seed: A, mut f: F) -> Result<A>
where
    S: Sequence,
    F: FnMut(A, S::Item) -> A,
{
    let mut acc = seed;
    while let Some(item) = seq.pull()? {
        acc = f(acc, item);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::sequence::{source, tee};
    use crate::sequence::{Sequence, SequenceExt};
    use crate::SeqError;

    #[test]
    fn filter_looks_ahead() {
        let mut evens = source::of(1..=10).filter(|x| x % 2 == 0);
        assert!(evens.has_next());
        assert_eq!(evens.take_all().unwrap(), vec![2, 4, 6, 8, 10]);

        let mut none = source::of([1, 3, 5]).filter(|x| x % 2 == 0);
        assert!(!none.has_next());
        assert_eq!(none.try_next(), Err(SeqError::Exhausted));
    }

    #[test]
    fn filter_works_on_infinite_input() {
        let mut multiples = source::unary_generator(1u64, |n| n + 1).filter(|n| n % 7 == 0);
        assert_eq!(multiples.take(3).unwrap(), vec![7, 14, 21]);
    }

    #[test]
    fn map_preserves_length() {
        let mut squares = source::of([1, 2, 3]).map(|x| x * x);
        assert_eq!(squares.take_all().unwrap(), vec![1, 4, 9]);
    }

    #[test]
    fn map2_stops_at_shorter() {
        let mut sums = source::of([1, 2, 3]).map2(source::repeat(10), |a, b| a + b);
        assert_eq!(sums.take_all().unwrap(), vec![11, 12, 13]);

        let mut short = source::of([1, 2, 3]).map2(source::of([5]), |a, b| a * b);
        assert_eq!(short.take_all().unwrap(), vec![5]);
    }

    #[test]
    fn peek_runs_once_per_element() {
        let seen = RefCell::new(Vec::new());
        let mut seq = source::of(['a', 'b']).peek(|c| seen.borrow_mut().push(*c));
        assert!(seq.has_next());
        assert!(seen.borrow().is_empty());
        assert_eq!(seq.take_all().unwrap(), vec!['a', 'b']);
        assert_eq!(*seen.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn limit_bounds_infinite_input() {
        assert_eq!(source::repeat(1).limit(3).take_all().unwrap(), vec![1, 1, 1]);
        assert!(source::repeat(1).limit(0).take_all().unwrap().is_empty());
        assert_eq!(source::of([1, 2]).limit(5).take_all().unwrap(), vec![1, 2]);
    }

    #[test]
    fn take_stops_early_on_short_input() {
        let mut seq = source::of([1, 2]);
        assert_eq!(seq.take(5).unwrap(), vec![1, 2]);
        assert!(seq.take(5).unwrap().is_empty());
    }

    #[test]
    fn take_all_reports_a_blocked_bounded_fork() {
        let mut forks = tee::tee_bounded::<_, 3>(source::of(0..10), 2);
        let mut slow = forks.pop().unwrap();
        let mut fast = forks.pop().unwrap();

        assert_eq!(fast.take_all(), Err(SeqError::BufferOverflow { capacity: 3 }));
        assert!(fast.has_next());

        // the three elements read before the failure are gone from `fast`
        assert_eq!(slow.take(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(fast.take(3).unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn filter_hands_out_a_failure_met_while_looking_ahead() {
        let mut forks = tee::tee_bounded::<_, 2>(source::of(0..10), 2);
        let _slow = forks.pop().unwrap();
        let fast = forks.pop().unwrap();
        let mut odd = fast.filter(|x| x % 2 == 1);

        assert_eq!(odd.try_next(), Ok(1));
        assert!(odd.has_next());
        assert_eq!(odd.try_next(), Err(SeqError::BufferOverflow { capacity: 2 }));
        assert_eq!(odd.reduce(|a, b| a + b), Err(SeqError::BufferOverflow { capacity: 2 }));
    }

    #[test]
    fn reduce_single_element_skips_operator() {
        let result = source::singleton(42).reduce(|_, _| panic!("operator must not run"));
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn fold_returns_seed_for_empty_input() {
        assert_eq!(source::empty::<u8>().fold("seed", |acc, _| acc), Ok("seed"));
        let total = source::of(["a", "bb", "ccc"]).fold(0usize, |acc, s| acc + s.len());
        assert_eq!(total, Ok(6));
    }
}
