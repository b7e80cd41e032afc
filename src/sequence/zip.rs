//! N-way zip and its inverse.

use std::mem;

use super::combinators::Map;
use super::tee::{tee, Fork};
use super::{exhausted, Sequence, SequenceExt};
use crate::error::Result;

/// Yields one tuple of heads per step.
///
/// A strong zip stops as soon as any input is exhausted. A weak zip keeps
/// going while any input has data, filling exhausted positions with `None`.
/// Zipping zero inputs yields nothing. If an input fails partway through a
/// tuple, the heads already read are kept for the next call.
pub struct Zip<S: Sequence> {
    seqs: Vec<S>,
    weak: bool,
    row: Vec<Option<S::Item>>,
}

impl<S: Sequence> Sequence for Zip<S> {
    type Item = Vec<Option<S::Item>>;

    fn has_next(&mut self) -> bool {
        if !self.row.is_empty() {
            return true;
        }
        if self.seqs.is_empty() {
            return false;
        }
        if self.weak {
            self.seqs.iter_mut().any(|s| s.has_next())
        } else {
            self.seqs.iter_mut().all(|s| s.has_next())
        }
    }

    fn try_next(&mut self) -> Result<Self::Item> {
        if !self.has_next() {
            return exhausted();
        }
        while self.row.len() < self.seqs.len() {
            let head = self.seqs[self.row.len()].pull()?;
            self.row.push(head);
        }
        Ok(mem::take(&mut self.row))
    }
}

/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, zip, SequenceExt};
///
/// let weak = zip::zip(vec![source::of(vec![1, 2]), source::of(vec![3])], true);
/// assert_eq!(
///     weak.limit(5).take_all().unwrap(),
///     vec![vec![Some(1), Some(3)], vec![Some(2), None]]
/// );
///
/// let strong = zip::zip(vec![source::of(vec![1, 2]), source::of(vec![3])], false);
/// assert_eq!(strong.limit(5).take_all().unwrap(), vec![vec![Some(1), Some(3)]]);
/// ```
pub fn zip<S: Sequence>(seqs: impl IntoIterator<Item = S>, weak: bool) -> Zip<S> {
    Zip {
        seqs: seqs.into_iter().collect(),
        weak,
        row: Vec::new(),
    }
}

type Column<T> = Box<dyn FnMut(Vec<T>) -> Option<T>>;

/// Splits a sequence of tuples into `width` column sequences.
///
/// The columns share one traversal of `seq` through [`tee`]. A tuple shorter
/// than `width` contributes `None` to the missing columns.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, zip, SequenceExt};
///
/// let rows = source::of(vec![vec![1, 10], vec![2], vec![3, 30]]);
/// let mut columns = zip::unzip(rows, 2);
/// let mut tens = columns.pop().unwrap();
/// let mut ones = columns.pop().unwrap();
/// assert_eq!(ones.take_all().unwrap(), vec![Some(1), Some(2), Some(3)]);
/// assert_eq!(tens.take_all().unwrap(), vec![Some(10), None, Some(30)]);
/// ```
pub fn unzip<S, T>(seq: S, width: usize) -> Vec<Map<Fork<S>, Column<T>>>
where
    S: Sequence<Item = Vec<T>>,
    T: Clone + 'static,
{
    tee(seq, width)
        .into_iter()
        .enumerate()
        .map(|(index, fork)| {
            let column: Column<T> = Box::new(move |tuple: Vec<T>| tuple.into_iter().nth(index));
            fork.map(column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{source, tee};
    use crate::SeqError;

    #[test]
    fn weak_zip_length_is_the_longest() {
        let seqs = vec![
            source::of(vec![1]).boxed(),
            source::of(vec![1, 2, 3]).boxed(),
            source::empty().boxed(),
        ];
        let rows = zip(seqs, true).take_all().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![None, Some(3), None]);
    }

    #[test]
    fn strong_zip_length_is_the_shortest() {
        let seqs = vec![
            source::of(vec![1, 2]).boxed(),
            source::repeat(0).boxed(),
            source::of(vec![7, 8, 9]).boxed(),
        ];
        let rows = zip(seqs, false).take_all().unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Some(1), Some(0), Some(7)],
                vec![Some(2), Some(0), Some(8)]
            ]
        );
    }

    #[test]
    fn weak_zip_reports_a_blocked_fork_instead_of_padding() {
        let mut forks = tee::tee_bounded::<_, 2>(source::of(0..5), 3);
        let mut slow = forks.pop().unwrap();
        let mut zipped = zip(forks, true);

        assert_eq!(zipped.take(2).unwrap(), vec![vec![Some(0), Some(0)], vec![Some(1), Some(1)]]);
        assert_eq!(zipped.try_next(), Err(SeqError::BufferOverflow { capacity: 2 }));
        assert_eq!(slow.take(2).unwrap(), vec![0, 1]);
        assert_eq!(zipped.try_next(), Ok(vec![Some(2), Some(2)]));
    }

    #[test]
    fn zip_of_nothing_is_empty() {
        let mut zipped = zip(Vec::<source::Empty<u8>>::new(), false);
        assert!(!zipped.has_next());
    }

    #[test]
    fn unzip_inverts_zip() {
        let zipped = zip(vec![source::of(vec![1, 2, 3]), source::of(vec![4, 5])], true);
        let mut columns = unzip(zipped, 2);
        let mut right = columns.pop().unwrap();
        let mut left = columns.pop().unwrap();
        assert_eq!(left.take_all().unwrap(), vec![Some(Some(1)), Some(Some(2)), Some(Some(3))]);
        assert_eq!(right.take_all().unwrap(), vec![Some(Some(4)), Some(Some(5)), Some(None)]);
    }
}
