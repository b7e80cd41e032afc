#![deny(unsafe_code)]

//! Lazy sequence algebra, step-function time series and piecewise-linear
//! segmentation.
//!
//! Everything here is pull-based: a [`Sequence`](sequence::Sequence) does no
//! work until asked for its next element, so pipelines can run over infinite
//! inputs as long as the consumer bounds them.
//!
//! # Features
//!
//! - **Lazy sequences**: sources, combinators, forking (`tee`), zip, N-way
//!   merge and run grouping, with `None` available as an ordinary element
//! - **Weak comparisons**: tolerance-aware equality and ordering via
//!   [`Tolerance`], [`WeakEq`] and [`WeakOrd`]
//! - **Power series**: lazy sum, product, inverse, composition, derivative
//!   and integral over `f64` coefficient sequences
//! - **Time series**: right-continuous step functions with lookup, slicing,
//!   resampling and merging
//! - **Segmentation**: `linearize` turns a sample stream into straight-line
//!   segments within an error bound
//!
//! # Example
//!
//! ```rust
//! use timeseq::sequence::{source, SequenceExt};
//! use timeseq::timeseries::linearize::linearize;
//! use timeseq::Pair;
//!
//! // A ramp that levels off
//! let samples = source::of((0..20).map(|t| {
//!     let t = t as f64;
//!     Pair::new(t, if t < 10.0 { 3.0 * t } else { 30.0 })
//! }));
//!
//! let segments = linearize(samples, 0.01).unwrap().take_all().unwrap();
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].slope, 3.0);
//! assert_eq!(segments[1].slope, 0.0);
//! ```

pub mod axis;
pub mod error;
pub mod numeric;
pub mod pair;
pub mod sequence;
pub mod timeseries;
pub mod weak;

pub use axis::Axis;
pub use error::{Result, SeqError};
pub use pair::Pair;
pub use sequence::{BoxSeq, Sequence, SequenceExt};
pub use timeseries::linearize::{linearize, Segment};
pub use timeseries::TimeSeries;
pub use weak::{Tolerance, WeakEq, WeakOrd};
