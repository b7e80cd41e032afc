//! Streaming helpers over `(key, value)` samples: cleansing, bucketing and
//! merging sample streams.

use std::cmp::Ordering;
use std::mem;

use crate::error::Result;
use crate::pair::Pair;
use crate::sequence::{exhausted, merge, BoxSeq, Sequence, SequenceExt};
use crate::weak::{Tolerance, WeakEq};

/// Removes redundant samples.
///
/// Among consecutive samples with weakly equal keys only the last survives;
/// then among consecutive samples with weakly equal values only the first
/// survives. The result of cleansing is a minimal step description.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::timeseries::util::cleanse;
/// use timeseq::{Pair, Tolerance};
///
/// let samples = source::of(vec![
///     Pair::new(1, 1.0),
///     Pair::new(1, 2.0),
///     Pair::new(2, 2.0),
///     Pair::new(3, 4.0),
/// ]);
/// let mut cleansed = cleanse(samples, Tolerance::default());
/// assert_eq!(cleansed.take_all().unwrap(), vec![Pair::new(1, 2.0), Pair::new(3, 4.0)]);
/// ```
pub fn cleanse<S, K, V>(samples: S, tolerance: Tolerance) -> impl Sequence<Item = Pair<K, V>>
where
    S: Sequence<Item = Pair<K, V>>,
    K: WeakEq + Clone,
    V: WeakEq + Clone,
{
    samples
        .keep_last(|sample: &Pair<K, V>| sample.first().clone(), tolerance)
        .keep_first(|sample: &Pair<K, V>| sample.second().clone(), tolerance)
}

/// Arithmetic mean, the usual aggregator for [`compact`].
///
/// Returns `NaN` for an empty slice; [`compact`] never passes one.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Aggregates samples into buckets delimited by consecutive bucket keys.
///
/// Bucket `i` holds the samples with key in `[b_i, b_{i+1})`; the last
/// bucket is open-ended. Samples before the first bucket key are dropped and
/// empty buckets produce nothing. Output stops once the samples run out, so
/// `bucket_keys` may be infinite. A failure of either input is returned
/// from `try_next`, and the bucket being filled is kept for the next call.
///
/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::timeseries::util::{compact, mean};
/// use timeseq::Pair;
///
/// let samples = source::of((0..10).map(|t| Pair::new(t, t as f64)));
/// let buckets = source::unary_generator(0, |b| b + 4);
/// let mut compacted = compact(samples, buckets, |values: &[f64]| mean(values));
/// assert_eq!(
///     compacted.take_all().unwrap(),
///     vec![Pair::new(0, 1.5), Pair::new(4, 5.5), Pair::new(8, 8.5)]
/// );
/// ```
pub struct Compact<S: Sequence, B: Sequence, A, V, W> {
    samples: S,
    bucket_keys: B,
    aggregator: A,
    pending_sample: Option<S::Item>,
    bucket_start: Option<B::Item>,
    // `Some(None)` once the key after `bucket_start` is known not to exist
    bucket_end: Option<Option<B::Item>>,
    values: Vec<V>,
    buffered: Option<Result<Pair<B::Item, W>>>,
}

impl<S, B, A, K, V, W> Compact<S, B, A, V, W>
where
    S: Sequence<Item = Pair<K, V>>,
    B: Sequence<Item = K>,
    K: PartialOrd,
    A: FnMut(&[V]) -> W,
{
    fn advance(&mut self) -> Result<Option<Pair<K, W>>> {
        loop {
            if self.bucket_start.is_none() {
                self.bucket_start = self.bucket_keys.pull()?;
            }
            if self.bucket_end.is_none() {
                self.bucket_end = Some(self.bucket_keys.pull()?);
            }
            let (Some(start), Some(end)) = (&self.bucket_start, &self.bucket_end) else {
                return Ok(None);
            };

            loop {
                let sample = match self.pending_sample.take() {
                    Some(sample) => sample,
                    None => match self.samples.pull()? {
                        Some(sample) => sample,
                        None => break,
                    },
                };
                if sample.first() < start {
                    continue;
                }
                if matches!(end, Some(end) if sample.first() >= end) {
                    self.pending_sample = Some(sample);
                    break;
                }
                self.values.push(sample.into_parts().1);
            }

            let drained = self.pending_sample.is_none() && !self.samples.has_next();
            let Some(start) = self.bucket_start.take() else {
                return Ok(None);
            };
            self.bucket_start = self.bucket_end.take().flatten();
            if !self.values.is_empty() {
                let values = mem::take(&mut self.values);
                log::trace!("compacted {} samples into one bucket", values.len());
                return Ok(Some(Pair::new(start, (self.aggregator)(&values))));
            }
            if drained || self.bucket_start.is_none() {
                return Ok(None);
            }
        }
    }
}

impl<S, B, A, K, V, W> Sequence for Compact<S, B, A, V, W>
where
    S: Sequence<Item = Pair<K, V>>,
    B: Sequence<Item = K>,
    K: PartialOrd,
    A: FnMut(&[V]) -> W,
{
    type Item = Pair<K, W>;

    fn has_next(&mut self) -> bool {
        if self.buffered.is_none() {
            self.buffered = self.advance().transpose();
        }
        self.buffered.is_some()
    }

    fn try_next(&mut self) -> Result<Pair<K, W>> {
        if !self.has_next() {
            return exhausted();
        }
        self.buffered.take().unwrap_or_else(exhausted)
    }
}

pub fn compact<S, B, A, K, V, W>(
    samples: S,
    bucket_keys: B,
    aggregator: A,
) -> Compact<S, B, A, V, W>
where
    S: Sequence<Item = Pair<K, V>>,
    B: Sequence<Item = K>,
    K: PartialOrd,
    A: FnMut(&[V]) -> W,
{
    Compact {
        samples,
        bucket_keys,
        aggregator,
        pending_sample: None,
        bucket_start: None,
        bucket_end: None,
        values: Vec::new(),
        buffered: None,
    }
}

/// Merges several sample streams into one stream of combined observations.
///
/// Each output element carries a key and, per input, the most recent value
/// that input has reported at or before that key (`None` until it reports
/// anything). Samples from different inputs with weakly equal keys are
/// reported together.
pub struct SampleMerge<'a, K, V> {
    merged: BoxSeq<'a, (usize, Pair<K, V>)>,
    pending: Option<(usize, Pair<K, V>)>,
    // key of the observation being assembled
    current: Option<K>,
    latest: Vec<Option<V>>,
    tolerance: Tolerance,
}

impl<K, V> Sequence for SampleMerge<'_, K, V>
where
    K: WeakEq,
    V: Clone,
{
    type Item = Pair<K, Vec<Option<V>>>;

    fn has_next(&mut self) -> bool {
        self.pending.is_some() || self.current.is_some() || self.merged.has_next()
    }

    fn try_next(&mut self) -> Result<Self::Item> {
        if self.current.is_none() {
            let (index, sample) = match self.pending.take() {
                Some(head) => head,
                None => match self.merged.pull()? {
                    Some(head) => head,
                    None => return exhausted(),
                },
            };
            let (key, value) = sample.into_parts();
            self.latest[index] = Some(value);
            self.current = Some(key);
        }

        while let Some((index, sample)) = self.merged.pull()? {
            let same_key = matches!(
                &self.current,
                Some(key) if sample.first().weak_eq(key, self.tolerance)
            );
            if same_key {
                self.latest[index] = Some(sample.into_parts().1);
            } else {
                self.pending = Some((index, sample));
                break;
            }
        }
        match self.current.take() {
            Some(key) => Ok(Pair::new(key, self.latest.clone())),
            None => exhausted(),
        }
    }
}

/// # Examples
///
/// ```rust
/// use timeseq::sequence::{source, SequenceExt};
/// use timeseq::timeseries::util::merge_samples;
/// use timeseq::{Pair, Tolerance};
///
/// let a = source::of(vec![Pair::new(1, 'a'), Pair::new(3, 'b')]);
/// let b = source::of(vec![Pair::new(2, 'x'), Pair::new(3, 'y')]);
/// let mut merged = merge_samples(vec![a, b], Tolerance::default());
/// assert_eq!(
///     merged.take_all().unwrap(),
///     vec![
///         Pair::new(1, vec![Some('a'), None]),
///         Pair::new(2, vec![Some('a'), Some('x')]),
///         Pair::new(3, vec![Some('b'), Some('y')]),
///     ]
/// );
/// ```
pub fn merge_samples<'a, S, K, V>(
    inputs: impl IntoIterator<Item = S>,
    tolerance: Tolerance,
) -> SampleMerge<'a, K, V>
where
    S: Sequence<Item = Pair<K, V>> + 'a,
    K: PartialOrd + 'a,
    V: 'a,
{
    let tagged: Vec<BoxSeq<'a, (usize, Pair<K, V>)>> = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| input.map(move |sample| (index, sample)).boxed())
        .collect();
    let width = tagged.len();

    let by_key = |heads: &[Option<(usize, Pair<K, V>)>]| {
        merge::select_min_by(heads, |(_, a), (_, b)| {
            a.first().partial_cmp(b.first()).unwrap_or(Ordering::Equal)
        })
    };
    SampleMerge {
        merged: merge::merge(tagged, by_key, true).boxed(),
        pending: None,
        current: None,
        latest: (0..width).map(|_| None).collect(),
        tolerance,
    }
}

/// [`merge_samples`] followed by `combiner` on each set of latest values.
pub fn merge_with<'a, S, K, V, W, F>(
    inputs: impl IntoIterator<Item = S>,
    mut combiner: F,
    tolerance: Tolerance,
) -> impl Sequence<Item = Pair<K, W>> + 'a
where
    S: Sequence<Item = Pair<K, V>> + 'a,
    K: WeakEq + PartialOrd + 'a,
    V: Clone + 'a,
    F: FnMut(&[Option<V>]) -> W + 'a,
{
    merge_samples(inputs, tolerance).map(move |row| row.map_second(|values| combiner(&values)))
}
