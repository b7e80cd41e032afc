//! Piecewise-linear segmentation of sample streams.
//!
//! [`linearize`] splits a stream of `(time, value)` samples into maximal runs
//! that a single straight line approximates within an error bound. Each run
//! becomes a [`Segment`]. A segment is fitted by least squares over its
//! samples and accepted while every sample lies within `epsilon` of the
//! fitted line. The sample that breaks the bound starts the next segment.
//!
//! Two samples always fit. A trailing single sample yields a flat segment.
//!
//! The least-squares line is refitted on every sample, so a gentle change of
//! slope is absorbed into the running segment until the accumulated misfit
//! exceeds `epsilon`. The boundary then lands some samples after the actual
//! bend.
//!
//! The worst residual of a line over a point set is reached at a vertex of
//! the set's convex hull, so only the lower and upper hulls of a segment are
//! kept and checked. Samples arrive in time order, which lets both hulls grow
//! by a monotone chain step.
//!
//! # Examples
//!
//! ```rust
//! use timeseq::sequence::{source, SequenceExt};
//! use timeseq::timeseries::linearize::linearize;
//! use timeseq::Pair;
//!
//! let samples = source::of((0..10).map(|t| {
//!     let t = t as f64;
//!     Pair::new(t, if t < 5.0 { 2.0 * t } else { 40.0 - t })
//! }));
//! let segments = linearize(samples, 0.01).unwrap().take_all().unwrap();
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].start, 0.0);
//! assert_eq!(segments[1].start, 5.0);
//! ```

use crate::axis::Axis;
use crate::error::{Result, SeqError};
use crate::pair::Pair;
use crate::sequence::{exhausted, Sequence};

/// Relative slack for rounding in the residual check, scaled by the largest
/// magnitude in the segment.
const ROUNDING: f64 = 1e-12;

/// A straight line `value(t) = intercept + slope * (t - start)` covering
/// `len` consecutive samples from `start` on.
///
/// Slope is in value units per [`Axis`] unit of the key type, so seconds
/// for timestamps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment<T> {
    pub start: T,
    pub intercept: f64,
    pub slope: f64,
    pub len: usize,
}

impl<T: Axis> Segment<T> {
    pub fn value_at(&self, t: &T) -> f64 {
        self.intercept + self.slope * t.offset_from(&self.start)
    }
}

impl<T> From<Segment<T>> for Pair<T, Pair<f64, f64>> {
    fn from(segment: Segment<T>) -> Self {
        Pair::new(segment.start, Pair::new(segment.intercept, segment.slope))
    }
}

type Point = (f64, f64);

/// Z component of `(a - o) x (b - o)`; positive for a left turn.
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Appends `p` to a hull chain, dropping the vertices it makes redundant.
/// `lower` chains keep left turns, upper chains keep right turns.
fn push_hull(hull: &mut Vec<Point>, p: Point, lower: bool) {
    while let [.., o, a] = hull.as_slice() {
        let turn = cross(*o, *a, p);
        if (lower && turn > 0.0) || (!lower && turn < 0.0) {
            break;
        }
        hull.pop();
    }
    hull.push(p);
}

/// Running sums of an ordinary least squares fit, with the convex hull of
/// the accepted points kept for the residual check. Abscissae are offsets
/// from the segment start.
#[derive(Debug, Clone)]
struct RunningFit {
    n: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_xy: f64,
    len: usize,
    lower: Vec<Point>,
    upper: Vec<Point>,
    max_abs_y: f64,
}

impl RunningFit {
    fn new(value: f64) -> RunningFit {
        RunningFit {
            n: 1.0,
            sum_x: 0.0,
            sum_y: value,
            sum_xx: 0.0,
            sum_xy: 0.0,
            len: 1,
            lower: vec![(0.0, value)],
            upper: vec![(0.0, value)],
            max_abs_y: value.abs(),
        }
    }

    fn line(n: f64, sum_x: f64, sum_y: f64, sum_xx: f64, sum_xy: f64) -> (f64, f64) {
        let denominator = n * sum_xx - sum_x * sum_x;
        if n < 2.0 || denominator.abs() <= f64::EPSILON * sum_xx.abs() {
            return (sum_y / n, 0.0);
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        (intercept, slope)
    }

    /// Adds `(x, y)` if the refitted line keeps every point within
    /// `epsilon`; leaves the fit untouched otherwise.
    fn try_extend(&mut self, x: f64, y: f64, epsilon: f64) -> bool {
        let n = self.n + 1.0;
        let sum_x = self.sum_x + x;
        let sum_y = self.sum_y + y;
        let sum_xx = self.sum_xx + x * x;
        let sum_xy = self.sum_xy + x * y;
        let (intercept, slope) = RunningFit::line(n, sum_x, sum_y, sum_xx, sum_xy);
        let max_abs_y = self.max_abs_y.max(y.abs());
        let bound = epsilon + ROUNDING * max_abs_y.max(1.0);

        let fits = self
            .lower
            .iter()
            .chain(&self.upper)
            .chain(std::iter::once(&(x, y)))
            .all(|&(px, py)| (intercept + slope * px - py).abs() <= bound);
        if fits {
            self.n = n;
            self.sum_x = sum_x;
            self.sum_y = sum_y;
            self.sum_xx = sum_xx;
            self.sum_xy = sum_xy;
            self.len += 1;
            self.max_abs_y = max_abs_y;
            push_hull(&mut self.lower, (x, y), true);
            push_hull(&mut self.upper, (x, y), false);
        }
        fits
    }

    fn finish<T>(self, start: T) -> Segment<T> {
        let (intercept, slope) =
            RunningFit::line(self.n, self.sum_x, self.sum_y, self.sum_xx, self.sum_xy);
        Segment {
            start,
            intercept,
            slope,
            len: self.len,
        }
    }
}

/// Lazy segmentation; see the [module documentation](self).
pub struct Linearize<S, T> {
    samples: S,
    epsilon: f64,
    current: Option<(T, RunningFit)>,
    buffered: Option<Result<Segment<T>>>,
}

impl<S, T> Linearize<S, T>
where
    S: Sequence<Item = Pair<T, f64>>,
    T: Axis,
{
    fn advance(&mut self) -> Result<Option<Segment<T>>> {
        while let Some(sample) = self.samples.pull()? {
            let (t, value) = sample.into_parts();
            match self.current.take() {
                None => self.current = Some((t, RunningFit::new(value))),
                Some((start, mut fit)) => {
                    let x = t.offset_from(&start);
                    if fit.try_extend(x, value, self.epsilon) {
                        self.current = Some((start, fit));
                    } else {
                        self.current = Some((t, RunningFit::new(value)));
                        return Ok(Some(fit.finish(start)));
                    }
                }
            }
        }
        Ok(self.current.take().map(|(start, fit)| fit.finish(start)))
    }
}

impl<S, T> Sequence for Linearize<S, T>
where
    S: Sequence<Item = Pair<T, f64>>,
    T: Axis,
{
    type Item = Segment<T>;

    fn has_next(&mut self) -> bool {
        if self.buffered.is_none() {
            self.buffered = self.advance().transpose();
            if let Some(Ok(segment)) = &self.buffered {
                log::trace!(
                    "segment of {} samples, intercept {}, slope {}",
                    segment.len,
                    segment.intercept,
                    segment.slope
                );
            }
        }
        self.buffered.is_some()
    }

    fn try_next(&mut self) -> Result<Segment<T>> {
        if !self.has_next() {
            return exhausted();
        }
        self.buffered.take().unwrap_or_else(exhausted)
    }
}

/// Segments `samples` into lines within `epsilon` of every sample.
///
/// Samples must arrive in ascending time order. Fails with
/// [`SeqError::InvalidArgument`] if `epsilon` is negative or not finite.
pub fn linearize<S, T>(samples: S, epsilon: f64) -> Result<Linearize<S, T>>
where
    S: Sequence<Item = Pair<T, f64>>,
    T: Axis,
{
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(SeqError::invalid_argument(format!(
            "linearize epsilon must be finite and non-negative, got {epsilon}"
        )));
    }
    Ok(Linearize {
        samples,
        epsilon,
        current: None,
        buffered: None,
    })
}
