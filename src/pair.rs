use std::fmt;

/// An immutable ordered pair.
///
/// `Pair` is the element type of time-series samples `(time, value)`, of
/// step-function entries `(key, value-at-and-after-key)` and of linearize
/// segments. Ordering is lexicographic: first component, then second.
///
/// # Examples
///
/// ```rust
/// use timeseq::Pair;
///
/// let sample = Pair::new(10, 32.6);
/// assert_eq!(*sample.first(), 10);
/// assert_eq!(*sample.second(), 32.6);
/// assert_eq!(sample.into_parts(), (10, 32.6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair<A, B> {
    first: A,
    second: B,
}

impl<A, B> Pair<A, B> {
    /// Creates a pair. Usable in `const` items.
    pub const fn new(first: A, second: B) -> Pair<A, B> {
        Pair { first, second }
    }

    /// The first component: the key or timestamp of a sample.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The second component: the value of a sample.
    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }

    /// Returns a new pair with `f` applied to the second component.
    pub fn map_second<C>(self, f: impl FnOnce(B) -> C) -> Pair<A, C> {
        Pair {
            first: self.first,
            second: f(self.second),
        }
    }
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Pair { first, second }
    }
}

impl<A, B> From<Pair<A, B>> for (A, B) {
    fn from(pair: Pair<A, B>) -> Self {
        pair.into_parts()
    }
}

impl<A: fmt::Display, B: fmt::Display> fmt::Display for Pair<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_lexicographically() {
        assert!(Pair::new(1, 9) < Pair::new(2, 0));
        assert!(Pair::new(1, 1) < Pair::new(1, 2));
        assert!(Pair::new(None, 5) < Pair::new(Some(0), 0));
    }

    #[test]
    fn converts_from_tuples() {
        let pair: Pair<u8, &str> = (3, "x").into();
        assert_eq!(pair, Pair::new(3, "x"));
        assert_eq!(pair.map_second(str::len), Pair::new(3, 1));
        assert_eq!(format!("{}", Pair::new(1, 2.5)), "(1, 2.5)");
    }
}
