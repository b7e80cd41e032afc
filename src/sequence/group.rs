//! Streaming run grouping over weakly equal keys.
//!
//! A run is a maximal stretch of consecutive elements whose keys are weakly
//! equal to the key of the run's first element. Detecting the end of a run
//! takes one element of look-ahead, which is buffered between calls. When
//! upstream fails partway through a run, the elements read so far are kept
//! and the run resumes on the next call.
//!
//! None of these combinators can finish a run that never ends: draining an
//! infinite run of one key loops forever unless the input is bounded with
//! `limit` or `take` first.

use std::mem;

use super::{exhausted, Sequence};
use crate::error::{Result, SeqError};
use crate::weak::{Tolerance, WeakEq};

/// Emits each run as a `Vec`.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::Tolerance;
///
/// let mut groups = source::of([1, 1, 2, 2, 2, 3]).group_by(|x| *x, Tolerance::default());
/// assert_eq!(groups.take_all().unwrap(), vec![vec![1, 1], vec![2, 2, 2], vec![3]]);
/// ```
pub struct GroupBy<S: Sequence, F> {
    inner: S,
    key: F,
    tolerance: Tolerance,
    run: Vec<S::Item>,
}

impl<S: Sequence, F> GroupBy<S, F> {
    pub(crate) fn new(inner: S, key: F, tolerance: Tolerance) -> Self {
        GroupBy {
            inner,
            key,
            tolerance,
            run: Vec::new(),
        }
    }
}

impl<S, K, F> Sequence for GroupBy<S, F>
where
    S: Sequence,
    K: WeakEq,
    F: FnMut(&S::Item) -> K,
{
    type Item = Vec<S::Item>;

    fn has_next(&mut self) -> bool {
        !self.run.is_empty() || self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<Vec<S::Item>> {
        if self.run.is_empty() {
            match self.inner.pull()? {
                Some(first) => self.run.push(first),
                None => return exhausted(),
            }
        }
        let run_key = (self.key)(&self.run[0]);
        while let Some(item) = self.inner.pull()? {
            if (self.key)(&item).weak_eq(&run_key, self.tolerance) {
                self.run.push(item);
            } else {
                return Ok(mem::replace(&mut self.run, vec![item]));
            }
        }
        Ok(mem::take(&mut self.run))
    }
}

/// Emits the first element of each run and skips the rest lazily.
pub struct KeepFirst<S: Sequence, K, F> {
    inner: S,
    key: F,
    tolerance: Tolerance,
    pending: Option<S::Item>,
    failure: Option<SeqError>,
    last_key: Option<K>,
}

impl<S: Sequence, K, F> KeepFirst<S, K, F> {
    pub(crate) fn new(inner: S, key: F, tolerance: Tolerance) -> Self {
        KeepFirst {
            inner,
            key,
            tolerance,
            pending: None,
            failure: None,
            last_key: None,
        }
    }
}

impl<S, K, F> Sequence for KeepFirst<S, K, F>
where
    S: Sequence,
    K: WeakEq,
    F: FnMut(&S::Item) -> K,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        if self.pending.is_some() || self.failure.is_some() {
            return true;
        }
        loop {
            let item = match self.inner.pull() {
                Ok(Some(item)) => item,
                Ok(None) => return false,
                Err(err) => {
                    self.failure = Some(err);
                    return true;
                }
            };
            let continues_run = match &self.last_key {
                Some(last) => (self.key)(&item).weak_eq(last, self.tolerance),
                None => false,
            };
            if !continues_run {
                self.pending = Some(item);
                return true;
            }
        }
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if !self.has_next() {
            return exhausted();
        }
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        match self.pending.take() {
            Some(item) => {
                self.last_key = Some((self.key)(&item));
                Ok(item)
            }
            None => exhausted(),
        }
    }
}

/// Emits the last element of each run. A run is only emitted once its
/// successor has been seen or upstream has ended.
///
/// `pending` holds the latest element of the run being read.
pub struct KeepLast<S: Sequence, F> {
    inner: S,
    key: F,
    tolerance: Tolerance,
    pending: Option<S::Item>,
}

impl<S: Sequence, F> KeepLast<S, F> {
    pub(crate) fn new(inner: S, key: F, tolerance: Tolerance) -> Self {
        KeepLast {
            inner,
            key,
            tolerance,
            pending: None,
        }
    }
}

impl<S, K, F> Sequence for KeepLast<S, F>
where
    S: Sequence,
    K: WeakEq,
    F: FnMut(&S::Item) -> K,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        self.pending.is_some() || self.inner.has_next()
    }

    fn try_next(&mut self) -> Result<S::Item> {
        if self.pending.is_none() {
            self.pending = self.inner.pull()?;
        }
        let run_key = match &self.pending {
            Some(first) => (self.key)(first),
            None => return exhausted(),
        };
        while let Some(item) = self.inner.pull()? {
            if (self.key)(&item).weak_eq(&run_key, self.tolerance) {
                self.pending = Some(item);
            } else {
                return self.pending.replace(item).ok_or(SeqError::Exhausted);
            }
        }
        self.pending.take().ok_or(SeqError::Exhausted)
    }
}
