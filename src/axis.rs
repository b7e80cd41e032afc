//! Numeric positions of keys along a time axis.
//!
//! `linearize` fits lines over keys of any type that can report how far it
//! lies from another key of the same type. Plain numbers report their
//! difference; chrono timestamps report elapsed seconds.

use chrono::{DateTime, NaiveDateTime, TimeZone};

/// A key that can be measured against an origin of the same type.
pub trait Axis {
    /// Distance from `origin` to `self`, positive when `self` is later.
    fn offset_from(&self, origin: &Self) -> f64;
}

macro_rules! numeric_axis {
    ($($t:ty),*) => {
        $(
            impl Axis for $t {
                fn offset_from(&self, origin: &Self) -> f64 {
                    *self as f64 - *origin as f64
                }
            }
        )*
    };
}

numeric_axis!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn seconds(delta: chrono::Duration) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

impl<Tz: TimeZone> Axis for DateTime<Tz> {
    fn offset_from(&self, origin: &Self) -> f64 {
        seconds(self.clone().signed_duration_since(origin.clone()))
    }
}

impl Axis for NaiveDateTime {
    fn offset_from(&self, origin: &Self) -> f64 {
        seconds(self.signed_duration_since(*origin))
    }
}
