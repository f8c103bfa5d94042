use num_traits::{
    PrimInt, Unsigned,
    identities::{one, zero},
};
use std::cmp::Ordering;

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
///
/// Repeat loci and annotation features are reported as 1-based closed ranges.
/// They are stored in overlap indexes through [`Interval::from_closed`], which
/// shifts the end by one so that `a..=b` becomes `[a, b + 1)`.
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Build an interval from a closed range `start..=end`.
    #[inline]
    pub fn from_closed(start: I, end: I, val: T) -> Self {
        Interval {
            start,
            end: end + one::<I>(),
            val,
        }
    }

    /// The last position covered by this interval.
    #[inline]
    pub fn closed_end(&self) -> I {
        self.end - one::<I>()
    }

    /// Number of positions covered.
    #[inline]
    pub fn len(&self) -> I {
        self.end.checked_sub(&self.start).unwrap_or_else(zero::<I>)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether this interval overlaps `[start, end)`.
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T> PartialEq for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<I, T>) -> bool {
        self.start == other.start && self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_from_closed_shifts_end() {
        let iv = Interval::from_closed(10u32, 15, "cds");
        assert_eq!(iv.start, 10);
        assert_eq!(iv.end, 16);
        assert_eq!(iv.closed_end(), 15);
        assert_eq!(iv.len(), 6);
    }

    #[rstest]
    #[case(15, 20, true)]
    #[case(16, 20, false)]
    #[case(1, 10, true)]
    #[case(1, 9, false)]
    fn test_closed_ranges_touching_ends(#[case] qs: u32, #[case] qe: u32, #[case] expected: bool) {
        let iv = Interval::from_closed(10u32, 15, ());
        // a closed query qs..=qe becomes [qs, qe + 1)
        assert_eq!(iv.overlap(qs, qe + 1), expected);
    }

    #[rstest]
    fn test_empty_interval() {
        let iv: Interval<u32, ()> = Interval { start: 5, end: 5, val: () };
        assert!(iv.is_empty());
        assert_eq!(iv.len(), 0);
        assert!(!Interval::from_closed(5u32, 5, ()).is_empty());
    }
}
