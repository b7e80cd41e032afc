//! Right-continuous step functions over an ordered key domain.
//!
//! A [`TimeSeries`] records `(key, value)` steps: the value of a step applies
//! at its key and after, up to the next key. An entry with key `None` is the
//! default that applies before the first key. A value of `None` means "no
//! value" from that key on, which is how a series ends.

pub mod linearize;
mod merge;
pub mod util;

use crate::error::{Result, SeqError};
use crate::pair::Pair;
use crate::sequence::{source, Sequence, SequenceExt};
use crate::weak::{Tolerance, WeakEq};

pub use self::merge::TimeSeriesMerge;

/// One step: the key it starts at and the value it carries.
pub type Entry<K, V> = Pair<Option<K>, Option<V>>;

/// An immutable step function built from `(key, value)` observations.
///
/// Construction cleanses the input (the last value wins among equal keys,
/// then the first key wins among equal consecutive values), moves the default
/// entry to the front and checks that keys strictly increase.
///
/// # Examples
///
/// ```rust
/// use timeseq::{Pair, TimeSeries, Tolerance};
///
/// let series = TimeSeries::from_entries(
///     vec![
///         Pair::new(None, None),
///         Pair::new(Some(0), Some(7)),
///         Pair::new(Some(10), Some(17)),
///         Pair::new(Some(20), None),
///     ],
///     Tolerance::default(),
/// )
/// .unwrap();
///
/// assert_eq!(series.apply(&-10000), None);
/// assert_eq!(series.apply(&0), Some(&7));
/// assert_eq!(series.apply(&15), Some(&17));
/// assert_eq!(series.apply(&20), None);
/// assert_eq!(series.apply(&10000), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSeries<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> TimeSeries<K, V>
where
    K: WeakEq + PartialOrd + Clone,
    V: WeakEq + Clone,
{
    /// Builds a series from a sequence of entries.
    ///
    /// Fails with [`SeqError::InvalidArgument`] if more than one default entry
    /// survives cleansing or if keys do not strictly increase.
    pub fn new<S>(entries: S, tolerance: Tolerance) -> Result<TimeSeries<K, V>>
    where
        S: Sequence<Item = Entry<K, V>>,
    {
        let mut observed = 0usize;
        let cleansed = util::cleanse(entries.peek(|_| observed += 1), tolerance).take_all()?;

        let mut defaults = cleansed.iter().filter(|e| e.first().is_none());
        if defaults.nth(1).is_some() {
            return Err(SeqError::invalid_argument(
                "a time series may hold only one default entry",
            ));
        }
        let (mut ordered, keyed): (Vec<_>, Vec<_>) =
            cleansed.into_iter().partition(|e| e.first().is_none());

        for window in keyed.windows(2) {
            if window[0].first() >= window[1].first() {
                return Err(SeqError::invalid_argument(
                    "time series keys must be strictly increasing",
                ));
            }
        }
        ordered.extend(keyed);

        log::debug!(
            "built time series with {} entries from {observed} observations",
            ordered.len()
        );
        Ok(TimeSeries { entries: ordered })
    }

    /// [`TimeSeries::new`] over an in-memory collection of entries.
    ///
    /// # Parameters
    ///
    /// * `entries` - `(key, value)` steps; a `None` key marks the default
    ///   entry and a `None` value marks an undefined leg
    /// * `tolerance` - used to collapse weakly equal keys and values
    ///
    /// # Returns
    ///
    /// The cleansed series, or [`SeqError::InvalidArgument`] on more than one
    /// default entry or decreasing keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeseq::{Pair, TimeSeries, Tolerance};
    ///
    /// let series = TimeSeries::from_entries(
    ///     vec![Pair::new(Some(0), Some(1.0)), Pair::new(Some(5), Some(1.0))],
    ///     Tolerance::default(),
    /// )
    /// .unwrap();
    /// // the second step repeats the first value and is dropped
    /// assert_eq!(series.len(), 1);
    /// ```
    pub fn from_entries<I>(entries: I, tolerance: Tolerance) -> Result<TimeSeries<K, V>>
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        TimeSeries::new(source::of(entries), tolerance)
    }

    /// Re-samples the step function at `keys`.
    ///
    /// Each new step starts at one of `keys` and carries the value in effect
    /// there. The default entry, if any, is kept. Steps that repeat the
    /// previous value are collapsed as in [`TimeSeries::new`].
    pub fn relocate<S>(&self, keys: S, tolerance: Tolerance) -> Result<TimeSeries<K, V>>
    where
        S: Sequence<Item = K>,
    {
        let default = self
            .entries
            .first()
            .filter(|e| e.first().is_none())
            .cloned();
        let resampled = keys.map(|key| {
            let value = self.apply(&key).cloned();
            Pair::new(Some(key), value)
        });
        let entries = source::concat(vec![
            source::of(default).boxed(),
            resampled.boxed(),
        ]);
        TimeSeries::new(entries, tolerance)
    }

    /// Combines several step functions into one.
    ///
    /// At every key where any input changes, `combiner` receives the value
    /// each input has in effect there (`None` where an input has no value).
    /// Keys shared by several inputs produce a single step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeseq::{Pair, TimeSeries, Tolerance};
    ///
    /// let tolerance = Tolerance::default();
    /// let a = TimeSeries::from_entries(
    ///     vec![Pair::new(Some(0), Some(1.0)), Pair::new(Some(10), Some(2.0))],
    ///     tolerance,
    /// )
    /// .unwrap();
    /// let b = TimeSeries::from_entries(vec![Pair::new(Some(5), Some(100.0))], tolerance).unwrap();
    ///
    /// let total = TimeSeries::merge(
    ///     &[a, b],
    ///     |values| Some(values.iter().flatten().copied().sum::<f64>()),
    ///     tolerance,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(total.apply(&0), Some(&1.0));
    /// assert_eq!(total.apply(&7), Some(&101.0));
    /// assert_eq!(total.apply(&12), Some(&102.0));
    /// ```
    pub fn merge<W, F>(
        series: &[TimeSeries<K, V>],
        mut combiner: F,
        tolerance: Tolerance,
    ) -> Result<TimeSeries<K, W>>
    where
        W: WeakEq + Clone,
        F: FnMut(&[Option<&V>]) -> Option<W>,
    {
        let steps = TimeSeriesMerge::new(series, tolerance).map(|step| {
            let (key, values) = step.into_parts();
            Pair::new(key, combiner(&values))
        });
        TimeSeries::new(steps, tolerance)
    }
}

impl<K: PartialOrd, V> TimeSeries<K, V> {
    /// Index of the entry in effect at `key`, if any.
    fn leg_index(&self, key: Option<&K>) -> Option<usize> {
        let covering = self
            .entries
            .partition_point(|e| e.first().as_ref() <= key);
        covering.checked_sub(1)
    }

    /// Value in effect at `key`.
    pub fn apply(&self, key: &K) -> Option<&V> {
        self.apply_at(Some(key))
    }

    /// Value in effect at `key`, where `None` asks for the default entry.
    pub fn apply_at(&self, key: Option<&K>) -> Option<&V> {
        self.leg_index(key)
            .and_then(|index| self.entries[index].second().as_ref())
    }

    /// Whether `x` and `y` fall under the same step. `None` precedes every key.
    pub fn same_leg(&self, x: Option<&K>, y: Option<&K>) -> bool {
        self.leg_index(x) == self.leg_index(y)
    }

    /// Restricts the series to keys in `[from, to]`.
    ///
    /// The step in effect at `from` is always kept, even when its own key
    /// lies before `from`, so the result still answers correctly at the
    /// lower boundary. A missing bound is unbounded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use timeseq::{Pair, TimeSeries, Tolerance};
    ///
    /// let series = TimeSeries::from_entries(
    ///     (0..5).map(|k| Pair::new(Some(k * 10), Some(k))),
    ///     Tolerance::default(),
    /// )
    /// .unwrap();
    /// let window = series.sub_series(Some(&15), Some(&30)).unwrap();
    /// assert_eq!(window.keys().collect::<Vec<_>>(), vec![Some(&10), Some(&20), Some(&30)]);
    /// assert_eq!(window.apply(&15), Some(&1));
    /// assert!(series.sub_series(Some(&15), Some(&15)).is_err());
    /// ```
    pub fn sub_series(&self, from: Option<&K>, to: Option<&K>) -> Result<TimeSeries<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        if let (Some(from), Some(to)) = (from, to) {
            match from.partial_cmp(to) {
                Some(std::cmp::Ordering::Less) => {}
                Some(std::cmp::Ordering::Equal) => {
                    return Err(SeqError::invalid_range("from and to are the same key"))
                }
                _ => return Err(SeqError::invalid_range("from must precede to")),
            }
        }
        let start = match from {
            Some(_) => self.leg_index(from).unwrap_or(0),
            None => 0,
        };
        let end = match to {
            Some(to) => self
                .entries
                .partition_point(|e| e.first().as_ref() <= Some(to)),
            None => self.entries.len(),
        };
        Ok(TimeSeries {
            entries: self.entries[start..end.max(start)].to_vec(),
        })
    }

    /// The entries with indices in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        if start > end || end > self.entries.len() {
            return Err(SeqError::IndexOutOfBounds {
                start,
                end,
                len: self.entries.len(),
            });
        }
        Ok(TimeSeries {
            entries: self.entries[start..end].to_vec(),
        })
    }
}

impl<K, V> TimeSeries<K, V> {
    /// Number of steps, counting the default entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    /// Iterates over the steps in key order, default entry first.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    /// Step keys in order; `None` for the default entry.
    pub fn keys(&self) -> impl Iterator<Item = Option<&K>> + '_ {
        self.entries.iter().map(|e| e.first().as_ref())
    }

    /// The value of the default entry, if the series has one.
    pub fn default_value(&self) -> Option<&V> {
        self.entries
            .first()
            .filter(|e| e.first().is_none())
            .and_then(|e| e.second().as_ref())
    }

    /// The first non-default key.
    pub fn starts_at(&self) -> Option<&K> {
        self.entries.iter().find_map(|e| e.first().as_ref())
    }

    /// The last key.
    pub fn ends_at(&self) -> Option<&K> {
        self.entries.last().and_then(|e| e.first().as_ref())
    }

    /// Hands the entries to a downstream consumer as a sequence.
    pub fn into_sequence(self) -> source::Source<std::vec::IntoIter<Entry<K, V>>> {
        source::of(self.entries)
    }
}

impl<'a, K, V> IntoIterator for &'a TimeSeries<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = std::slice::Iter<'a, Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
