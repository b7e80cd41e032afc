//! Forking one sequence into several independently consumable ones.
//!
//! All forks share a coordinator that owns the upstream sequence and one
//! queue per fork. A fork whose queue is empty pulls one element from
//! upstream and appends it to every live queue, so whatever one fork reads
//! first becomes visible to the others in the same order.
//!
//! The unbounded [`tee`] keeps every element that some live fork has not
//! read yet. [`tee_bounded`] stores each backlog in a fixed-capacity
//! `heapless::Deque` and refuses to pull past it. Dropping a fork releases
//! its queue.
//!
//! Forks share state through `Rc`, so they cannot leave the thread that
//! created them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use heapless::Deque;

use super::{exhausted, Sequence};
use crate::error::{Result, SeqError};

struct TeeState<S: Sequence> {
    upstream: S,
    queues: Vec<Option<VecDeque<S::Item>>>,
}

/// One of the sequences produced by [`tee`].
pub struct Fork<S: Sequence> {
    index: usize,
    state: Rc<RefCell<TeeState<S>>>,
}

/// Splits `seq` into `n` forks that each replay the whole sequence.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, tee, SequenceExt};
///
/// let mut forks = tee::tee(source::of(1..=3), 2);
/// let mut second = forks.pop().unwrap();
/// let mut first = forks.pop().unwrap();
/// assert_eq!(first.take(2).unwrap(), vec![1, 2]);
/// assert_eq!(second.take_all().unwrap(), vec![1, 2, 3]);
/// assert_eq!(first.take_all().unwrap(), vec![3]);
/// ```
pub fn tee<S>(seq: S, n: usize) -> Vec<Fork<S>>
where
    S: Sequence,
    S::Item: Clone,
{
    log::debug!("splitting sequence into {n} forks");
    let state = Rc::new(RefCell::new(TeeState {
        upstream: seq,
        queues: (0..n).map(|_| Some(VecDeque::new())).collect(),
    }));
    (0..n)
        .map(|index| Fork {
            index,
            state: Rc::clone(&state),
        })
        .collect()
}

impl<S> Sequence for Fork<S>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        let own_pending = state.queues[self.index]
            .as_ref()
            .is_some_and(|queue| !queue.is_empty());
        own_pending || state.upstream.has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        let mut state = self.state.borrow_mut();
        let TeeState { upstream, queues } = &mut *state;

        if let Some(item) = queues[self.index].as_mut().and_then(VecDeque::pop_front) {
            return Ok(item);
        }
        if !upstream.has_next() {
            return exhausted();
        }
        let item = upstream.try_next()?;
        for (i, queue) in queues.iter_mut().enumerate() {
            if i == self.index {
                continue;
            }
            if let Some(queue) = queue {
                queue.push_back(item.clone());
            }
        }
        Ok(item)
    }
}

impl<S: Sequence> Drop for Fork<S> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.queues[self.index] = None;
        }
    }
}

struct BoundedTeeState<S: Sequence, const CAP: usize> {
    upstream: S,
    queues: Vec<Option<Deque<S::Item, CAP>>>,
}

/// One of the sequences produced by [`tee_bounded`].
pub struct BoundedFork<S: Sequence, const CAP: usize> {
    index: usize,
    state: Rc<RefCell<BoundedTeeState<S, CAP>>>,
}

/// Like [`tee`], but no fork may fall more than `CAP` elements behind the
/// fastest one.
///
/// A `try_next` that would push past a full queue fails with
/// [`SeqError::BufferOverflow`] and leaves upstream untouched, so the caller
/// can drain the slow fork and retry.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, tee, Sequence, SequenceExt};
/// use timeseq::SeqError;
///
/// let mut forks = tee::tee_bounded::<_, 2>(source::of(1..=10), 2);
/// let mut slow = forks.pop().unwrap();
/// let mut fast = forks.pop().unwrap();
/// assert_eq!(fast.take(2).unwrap(), vec![1, 2]);
/// assert_eq!(fast.try_next(), Err(SeqError::BufferOverflow { capacity: 2 }));
/// assert_eq!(slow.take(1).unwrap(), vec![1]);
/// assert_eq!(fast.try_next(), Ok(3));
/// ```
pub fn tee_bounded<S, const CAP: usize>(seq: S, n: usize) -> Vec<BoundedFork<S, CAP>>
where
    S: Sequence,
    S::Item: Clone,
{
    log::debug!("splitting sequence into {n} forks with capacity {CAP}");
    let state = Rc::new(RefCell::new(BoundedTeeState {
        upstream: seq,
        queues: (0..n).map(|_| Some(Deque::new())).collect(),
    }));
    (0..n)
        .map(|index| BoundedFork {
            index,
            state: Rc::clone(&state),
        })
        .collect()
}

impl<S, const CAP: usize> Sequence for BoundedFork<S, CAP>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        let own_pending = state.queues[self.index]
            .as_ref()
            .is_some_and(|queue| !queue.is_empty());
        own_pending || state.upstream.has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        let mut state = self.state.borrow_mut();
        let BoundedTeeState { upstream, queues } = &mut *state;

        if let Some(item) = queues[self.index].as_mut().and_then(Deque::pop_front) {
            return Ok(item);
        }
        if !upstream.has_next() {
            return exhausted();
        }
        let blocked = queues
            .iter()
            .enumerate()
            .any(|(i, queue)| i != self.index && queue.as_ref().is_some_and(Deque::is_full));
        if blocked {
            log::warn!("fork {} blocked: a sibling holds {CAP} unread elements", self.index);
            return Err(SeqError::BufferOverflow { capacity: CAP });
        }

        let item = upstream.try_next()?;
        for (i, queue) in queues.iter_mut().enumerate() {
            if i == self.index {
                continue;
            }
            if let Some(queue) = queue {
                // capacity was checked above
                let _ = queue.push_back(item.clone());
            }
        }
        Ok(item)
    }
}

impl<S: Sequence, const CAP: usize> Drop for BoundedFork<S, CAP> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.queues[self.index] = None;
        }
    }
}
