//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// Creates the smallest interval containing every value, or `None` if there are none.
    pub fn enclosing(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some(Self::new(value, value)),
            Some(acc) => Some(Self::new(acc.min.min(value), acc.max.max(value))),
        })
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_interval() {
        let interval = Interval::enclosing([3.0, -1.0, 2.5]).unwrap();
        assert_eq!(interval, Interval::new(-1.0, 3.0));
        assert_eq!(interval.length(), 4.0);
        assert!(Interval::<f64>::enclosing([]).is_none());
    }

    #[test]
    fn lerp_spans_interval() {
        let interval = Interval::new(2.0, 6.0);
        assert_eq!(interval.lerp(0.0), 2.0);
        assert_eq!(interval.lerp(0.25), 3.0);
        assert_eq!(interval.lerp(1.0), 6.0);
        assert!(interval.contains(interval.lerp(0.5)));
    }
}
