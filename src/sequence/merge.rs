//! N-way merge driven by a selector over the current heads.
//!
//! The merge keeps one head slot per input, `None` once that input is
//! exhausted. At each step the selector picks which head to hand out; the
//! slot is then refilled from the same input. Picking the smallest present
//! head turns this into a streaming sorted union.
//!
//! A head is only replaced once its refill has succeeded, so a merge whose
//! input fails can be called again after the failure is dealt with.

use std::cmp::Ordering;

use super::{exhausted, Sequence};
use crate::error::{Result, SeqError};

/// Interleaves several sequences in the order chosen by a selector.
///
/// The selector receives the current heads and returns the index to draw
/// from, or `None` when nothing should be drawn. A weak merge runs while any
/// head is present; a strong merge stops as soon as one input runs dry.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{merge, source, SequenceExt};
///
/// let inputs = vec![source::of(vec![0, 2]), source::of(vec![1, 3, 5, 7])];
/// let weak = merge::merge(inputs, merge::min_head, true);
/// assert_eq!(weak.limit(10).take_all().unwrap(), vec![0, 1, 2, 3, 5, 7]);
///
/// let inputs = vec![source::of(vec![0, 2]), source::of(vec![1, 3, 5, 7])];
/// let strong = merge::merge(inputs, merge::min_head, false);
/// assert_eq!(strong.limit(10).take_all().unwrap(), vec![0, 1, 2]);
/// ```
pub struct Merge<S: Sequence, F> {
    seqs: Vec<S>,
    heads: Vec<Option<S::Item>>,
    selector: F,
    weak: bool,
    failure: Option<SeqError>,
}

impl<S: Sequence, F> Merge<S, F> {
    fn prime(&mut self) -> Result<()> {
        while self.heads.len() < self.seqs.len() {
            let head = self.seqs[self.heads.len()].pull()?;
            self.heads.push(head);
        }
        Ok(())
    }
}

impl<S, F> Sequence for Merge<S, F>
where
    S: Sequence,
    F: FnMut(&[Option<S::Item>]) -> Option<usize>,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        if self.failure.is_some() {
            return true;
        }
        if let Err(err) = self.prime() {
            self.failure = Some(err);
            return true;
        }
        if self.heads.is_empty() {
            return false;
        }
        if self.weak {
            self.heads.iter().any(Option::is_some)
        } else {
            self.heads.iter().all(Option::is_some)
        }
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if !self.has_next() {
            return exhausted();
        }
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        let index = match (self.selector)(&self.heads) {
            Some(index) if index < self.heads.len() => index,
            _ => return exhausted(),
        };
        let refill = self.seqs[index].pull()?;
        match std::mem::replace(&mut self.heads[index], refill) {
            Some(item) => Ok(item),
            None => exhausted(),
        }
    }
}

pub fn merge<S, F>(seqs: impl IntoIterator<Item = S>, selector: F, weak: bool) -> Merge<S, F>
where
    S: Sequence,
    F: FnMut(&[Option<S::Item>]) -> Option<usize>,
{
    Merge {
        seqs: seqs.into_iter().collect(),
        heads: Vec::new(),
        selector,
        weak,
        failure: None,
    }
}

/// Selects the smallest present head; ties go to the lowest index and
/// exhausted inputs are never chosen.
pub fn min_head<T: PartialOrd>(heads: &[Option<T>]) -> Option<usize> {
    select_min_by(heads, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

/// Selects the head with the smallest key, using `cmp` to order keys.
pub fn select_min_by<T, C>(heads: &[Option<T>], mut cmp: C) -> Option<usize>
where
    C: FnMut(&T, &T) -> Ordering,
{
    let mut best: Option<(usize, &T)> = None;
    for (index, head) in heads.iter().enumerate() {
        if let Some(item) = head {
            match best {
                Some((_, current)) if cmp(item, current) != Ordering::Less => {}
                _ => best = Some((index, item)),
            }
        }
    }
    best.map(|(index, _)| index)
}

/// Builds a selector that picks the head whose `key` is smallest.
pub fn min_head_by<T, K, F>(mut key: F) -> impl FnMut(&[Option<T>]) -> Option<usize>
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    move |heads: &[Option<T>]| {
        select_min_by(heads, |a, b| {
            key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{source, tee, SequenceExt};
    use crate::{Pair, SeqError};

    #[test]
    fn strong_merge_stops_when_an_input_runs_dry() {
        let t = source::of(vec![1, 3, 5, 7]);
        let s = source::of(vec![0, 2]);
        assert_eq!(merge(vec![t, s], min_head, false).take_all().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn weak_merge_is_a_sorted_union() {
        let inputs = vec![
            source::of(vec![1, 4, 9]),
            source::of(vec![]),
            source::of(vec![2, 3, 10, 11]),
        ];
        assert_eq!(
            merge(inputs, min_head, true).take_all().unwrap(),
            vec![1, 2, 3, 4, 9, 10, 11]
        );
    }

    #[test]
    fn ties_prefer_the_first_input() {
        let a = source::of(vec![Pair::new(1, "a")]);
        let b = source::of(vec![Pair::new(1, "b")]);
        let merged = merge(vec![a, b], min_head_by(|p: &Pair<i32, &str>| *p.first()), true);
        let labels: Vec<&str> = merged.map(|p| *p.second()).take_all().unwrap();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn merges_infinite_inputs_lazily() {
        let evens = source::unary_generator(0u64, |x| x + 2);
        let odds = source::unary_generator(1u64, |x| x + 2);
        let mut merged = merge(vec![evens.boxed(), odds.boxed()], min_head, true);
        assert_eq!(merged.take(6).unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn selector_returning_none_ends_the_merge() {
        let mut merged = merge(vec![source::of(vec![1, 2])], |_: &[Option<i32>]| None, true);
        assert!(merged.has_next());
        assert!(merged.try_next().is_err());
    }

    #[test]
    fn failed_refill_keeps_the_head() {
        let mut forks = tee::tee_bounded::<_, 2>(source::of(0..10), 2);
        let slow = forks.pop().unwrap();
        let fast = forks.pop().unwrap();
        let mut merged = merge(vec![fast.boxed(), source::of(vec![1, 5]).boxed()], min_head, true);

        assert_eq!(merged.take(1).unwrap(), vec![0]);
        assert_eq!(merged.try_next(), Err(SeqError::BufferOverflow { capacity: 2 }));
        drop(slow);
        assert_eq!(merged.take_all().unwrap(), vec![1, 1, 2, 3, 4, 5, 5, 6, 7, 8, 9]);
    }
}
