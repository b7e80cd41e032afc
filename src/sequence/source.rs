//! Primitive sequence constructors.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::marker::PhantomData;
use std::mem;

use super::{exhausted, Sequence};
use crate::error::Result;

/// A sequence that never has a next element.
#[derive(Debug)]
pub struct Empty<T> {
    _marker: PhantomData<T>,
}

impl<T> Sequence for Empty<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        false
    }

    fn try_next(&mut self) -> Result<T> {
        exhausted()
    }
}

/// A sequence with no elements. `try_next` always fails with
/// [`SeqError::Exhausted`](crate::SeqError::Exhausted).
pub fn empty<T>() -> Empty<T> {
    Empty {
        _marker: PhantomData,
    }
}

/// A sequence backed by any standard iterator.
///
/// This is the adapter for upstream collaborators: anything that can be
/// iterated can feed the core.
pub struct Source<I: Iterator> {
    inner: Peekable<I>,
}

impl<I: Iterator> Sequence for Source<I> {
    type Item = I::Item;

    fn has_next(&mut self) -> bool {
        self.inner.peek().is_some()
    }

    fn try_next(&mut self) -> Result<I::Item> {
        match self.inner.next() {
            Some(item) => Ok(item),
            None => exhausted(),
        }
    }
}

/// Wraps any iterable as a sequence.
///
/// The iterator is advanced one element ahead to answer `has_next`, so side
/// effects inside it run one element early.
///
/// # Parameters
///
/// * `values` - anything implementing [`IntoIterator`]; may be infinite
///
/// # Returns
///
/// A [`Source`] yielding the iterator's elements in order.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// let mut squares = source::from_iter((1..).map(|n| n * n));
/// assert_eq!(squares.take(4).unwrap(), vec![1, 4, 9, 16]);
/// ```
pub fn from_iter<I: IntoIterator>(values: I) -> Source<I::IntoIter> {
    Source {
        inner: values.into_iter().peekable(),
    }
}

/// A finite sequence over a fixed collection.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// assert_eq!(source::of(vec!['a', 'b']).take_all().unwrap(), vec!['a', 'b']);
/// ```
pub fn of<I: IntoIterator>(values: I) -> Source<I::IntoIter> {
    from_iter(values)
}

/// A sequence of exactly one element.
pub fn singleton<T>(value: T) -> Source<std::iter::Once<T>> {
    from_iter(std::iter::once(value))
}

/// Repeats one value, forever or a fixed number of times.
#[derive(Debug, Clone)]
pub struct Repeat<T> {
    value: T,
    remaining: Option<usize>,
}

impl<T: Clone> Sequence for Repeat<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        self.remaining != Some(0)
    }

    fn try_next(&mut self) -> Result<T> {
        match self.remaining {
            Some(0) => exhausted(),
            Some(n) => {
                self.remaining = Some(n - 1);
                Ok(self.value.clone())
            }
            None => Ok(self.value.clone()),
        }
    }
}

/// Yields clones of `value` forever.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// assert_eq!(source::repeat('x').limit(3).take_all().unwrap(), vec!['x', 'x', 'x']);
/// ```
pub fn repeat<T: Clone>(value: T) -> Repeat<T> {
    Repeat {
        value,
        remaining: None,
    }
}

/// Yields `n` clones of `value`; nothing when `n` is zero.
pub fn repeat_n<T: Clone>(value: T, n: usize) -> Repeat<T> {
    Repeat {
        value,
        remaining: Some(n),
    }
}

/// Endlessly repeats a finite list in order. An empty list yields nothing.
#[derive(Debug, Clone)]
pub struct Cycle<T> {
    values: Vec<T>,
    position: usize,
}

impl<T: Clone> Sequence for Cycle<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        !self.values.is_empty()
    }

    fn try_next(&mut self) -> Result<T> {
        if self.values.is_empty() {
            return exhausted();
        }
        let value = self.values[self.position].clone();
        self.position = (self.position + 1) % self.values.len();
        Ok(value)
    }
}

/// Collects `values` once and then cycles through them.
///
/// # Parameters
///
/// * `values` - a finite list; it is fully collected up front
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// let mut days = source::cycle(["sat", "sun"]);
/// assert_eq!(days.take(3).unwrap(), vec!["sat", "sun", "sat"]);
/// ```
pub fn cycle<T: Clone>(values: impl IntoIterator<Item = T>) -> Cycle<T> {
    Cycle {
        values: values.into_iter().collect(),
        position: 0,
    }
}

/// Infinite sequence `seed, f(seed), f(f(seed)), ...`.
pub struct UnaryGenerator<T, F> {
    state: T,
    f: F,
}

impl<T, F> Sequence for UnaryGenerator<T, F>
where
    F: FnMut(&T) -> T,
{
    type Item = T;

    fn has_next(&mut self) -> bool {
        true
    }

    fn try_next(&mut self) -> Result<T> {
        let next = (self.f)(&self.state);
        Ok(mem::replace(&mut self.state, next))
    }
}

/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// let mut powers = source::unary_generator(1u32, |x| x * 2);
/// assert_eq!(powers.take(5).unwrap(), vec![1, 2, 4, 8, 16]);
/// ```
pub fn unary_generator<T, F>(seed: T, f: F) -> UnaryGenerator<T, F>
where
    F: FnMut(&T) -> T,
{
    UnaryGenerator { state: seed, f }
}

/// Infinite sequence over a sliding pair of state: yields `a`, then moves
/// `(a, b)` to `(b, f(a, b))`.
pub struct BinaryGenerator<T, F> {
    a: T,
    b: T,
    f: F,
}

impl<T, F> Sequence for BinaryGenerator<T, F>
where
    F: FnMut(&T, &T) -> T,
{
    type Item = T;

    fn has_next(&mut self) -> bool {
        true
    }

    fn try_next(&mut self) -> Result<T> {
        let next = (self.f)(&self.a, &self.b);
        let b = mem::replace(&mut self.b, next);
        Ok(mem::replace(&mut self.a, b))
    }
}

pub fn binary_generator<T, F>(a: T, b: T, f: F) -> BinaryGenerator<T, F>
where
    F: FnMut(&T, &T) -> T,
{
    BinaryGenerator { a, b, f }
}

/// Infinite sequence that calls `supplier` for every element.
pub struct Generate<F> {
    supplier: F,
}

impl<T, F> Sequence for Generate<F>
where
    F: FnMut() -> T,
{
    type Item = T;

    fn has_next(&mut self) -> bool {
        true
    }

    fn try_next(&mut self) -> Result<T> {
        Ok((self.supplier)())
    }
}

pub fn generate<T, F>(supplier: F) -> Generate<F>
where
    F: FnMut() -> T,
{
    Generate { supplier }
}

/// Exhausts each input in turn.
pub struct Concat<S> {
    seqs: VecDeque<S>,
}

impl<S: Sequence> Sequence for Concat<S> {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        while let Some(front) = self.seqs.front_mut() {
            if front.has_next() {
                return true;
            }
            self.seqs.pop_front();
        }
        false
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if !self.has_next() {
            return exhausted();
        }
        match self.seqs.front_mut() {
            Some(front) => front.try_next(),
            None => exhausted(),
        }
    }
}

/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
///
/// let seqs = vec![source::of(vec![1, 2]), source::of(vec![]), source::of(vec![3])];
/// assert_eq!(source::concat(seqs).take_all().unwrap(), vec![1, 2, 3]);
/// ```
pub fn concat<S: Sequence>(seqs: impl IntoIterator<Item = S>) -> Concat<S> {
    Concat {
        seqs: seqs.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{BoxSeq, SequenceExt};
    use crate::SeqError;

    #[test]
    fn empty_has_nothing() {
        let mut seq = empty::<i32>();
        assert!(!seq.has_next());
        assert_eq!(seq.try_next(), Err(SeqError::Exhausted));
    }

    #[test]
    fn singleton_yields_once() {
        assert_eq!(singleton("x").take_all().unwrap(), vec!["x"]);
    }

    #[test]
    fn repeat_forever_and_bounded() {
        assert_eq!(repeat(7).take(4).unwrap(), vec![7, 7, 7, 7]);
        assert_eq!(repeat_n('z', 3).take_all().unwrap(), vec!['z', 'z', 'z']);
        assert!(!repeat_n(1, 0).has_next());
    }

    #[test]
    fn cycle_wraps_around() {
        assert_eq!(cycle([1, 2, 3]).take(7).unwrap(), vec![1, 2, 3, 1, 2, 3, 1]);
        assert!(!cycle(Vec::<u8>::new()).has_next());
    }

    #[test]
    fn unary_generator_starts_with_seed() {
        let mut naturals = unary_generator(0u64, |n| n + 1);
        assert_eq!(naturals.take(4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn binary_generator_slides_state() {
        let mut fib = binary_generator(0u64, 1, |a, b| a + b);
        assert_eq!(fib.take(10).unwrap(), vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
    }

    #[test]
    fn generate_calls_supplier_each_time() {
        let mut counter = 0;
        let mut seq = generate(move || {
            counter += 10;
            counter
        });
        assert_eq!(seq.take(3).unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let mut seq = concat(Vec::<Empty<i32>>::new());
        assert!(!seq.has_next());
        assert_eq!(concat(Vec::<Empty<i32>>::new()).fold(5, |a, b| a + b), Ok(5));
    }

    #[test]
    fn concat_mixes_finite_and_infinite() {
        let seqs: Vec<BoxSeq<'_, i32>> = vec![
            of(vec![1]).boxed(),
            empty().boxed(),
            repeat(9).boxed(),
        ];
        assert_eq!(concat(seqs).take(4).unwrap(), vec![1, 9, 9, 9]);
    }
}
