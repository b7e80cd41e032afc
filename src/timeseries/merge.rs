use crate::error::Result;
use crate::pair::Pair;
use crate::sequence::{exhausted, merge, source, BoxSeq, Sequence, SequenceExt};
use crate::weak::{Tolerance, WeakEq};

use super::TimeSeries;

/// Walks the union of the keys of several series.
///
/// Yields one element per distinct key, in ascending order with the default
/// key first, carrying the value each input has in effect at that key.
/// Keys that are weakly equal across inputs collapse into one element.
pub struct TimeSeriesMerge<'a, K, V> {
    series: &'a [TimeSeries<K, V>],
    boundaries: BoxSeq<'a, Option<K>>,
}

impl<'a, K, V> TimeSeriesMerge<'a, K, V>
where
    K: WeakEq + PartialOrd + Clone + 'a,
{
    pub fn new(series: &'a [TimeSeries<K, V>], tolerance: Tolerance) -> Self {
        log::debug!("merging {} time series", series.len());
        let keys: Vec<BoxSeq<'a, Option<K>>> = series
            .iter()
            .map(|s| source::of(s.entries.iter().map(|e| e.first().clone())).boxed())
            .collect();
        let boundaries = merge::merge(keys, merge::min_head, true)
            .skip_duplicates(|key: &Option<K>| key.clone(), tolerance)
            .boxed();
        TimeSeriesMerge { series, boundaries }
    }
}

impl<'a, K, V> Sequence for TimeSeriesMerge<'a, K, V>
where
    K: PartialOrd,
{
    type Item = Pair<Option<K>, Vec<Option<&'a V>>>;

    fn has_next(&mut self) -> bool {
        self.boundaries.has_next()
    }

    fn try_next(&mut self) -> Result<Self::Item> {
        let key = match self.boundaries.pull()? {
            Some(key) => key,
            None => return exhausted(),
        };
        let series = self.series;
        let values = series.iter().map(|s| s.apply_at(key.as_ref())).collect();
        Ok(Pair::new(key, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_union_of_keys_once() {
        let tolerance = Tolerance::default();
        let a = TimeSeries::from_entries(
            vec![Pair::new(Some(1), Some('a')), Pair::new(Some(3), Some('b'))],
            tolerance,
        )
        .unwrap();
        let b = TimeSeries::from_entries(
            vec![Pair::new(None, Some('x')), Pair::new(Some(3), Some('y'))],
            tolerance,
        )
        .unwrap();
        let series = [a, b];

        let steps = TimeSeriesMerge::new(&series, tolerance).take_all().unwrap();
        let keys: Vec<_> = steps.iter().map(|s| *s.first()).collect();
        assert_eq!(keys, vec![None, Some(1), Some(3)]);
        assert_eq!(steps[0].second(), &vec![None, Some(&'x')]);
        assert_eq!(steps[1].second(), &vec![Some(&'a'), Some(&'x')]);
        assert_eq!(steps[2].second(), &vec![Some(&'b'), Some(&'y')]);
    }
}
