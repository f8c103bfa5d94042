use std::ops::Range;

use num_traits::{PrimInt, Unsigned};

use crate::{Interval, Overlapper};

/// An interval that covers at least this many of its successors is moved to a
/// later component, keeping the running maximum end of each component tight.
const MIN_COVERAGE: usize = 10;

/// Augmented Interval List.
///
/// Intervals are sorted by start and split into components so that long
/// intervals, which would otherwise inflate the running maximum end and force
/// long backwards scans, live apart from the short ones. Each component keeps
/// a running maximum end that lets a query stop scanning early.
#[derive(Debug, Clone)]
pub struct AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: Vec<Interval<I, T>>,
    max_ends: Vec<I>,
    components: Vec<Range<usize>>,
}

impl<I, T> Overlapper<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(mut intervals: Vec<Interval<I, T>>) -> Self {
        intervals.sort_by_key(|iv| iv.start);

        let mut stored = Vec::with_capacity(intervals.len());
        let mut max_ends = Vec::with_capacity(intervals.len());
        let mut components = Vec::new();

        let mut pending = intervals;
        while !pending.is_empty() {
            let (kept, deferred) = Self::decompose(pending);

            let offset = stored.len();
            let mut running = I::zero();
            for iv in kept {
                running = running.max(iv.end);
                max_ends.push(running);
                stored.push(iv);
            }
            components.push(offset..stored.len());

            pending = deferred;
        }

        AIList {
            intervals: stored,
            max_ends,
            components,
        }
    }

    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, end).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(IterFind::new(self, start, end))
    }

    fn len(&self) -> usize {
        self.intervals.len()
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Number of components the intervals were split into.
    pub fn components(&self) -> usize {
        self.components.len()
    }

    /// Split start-sorted intervals into those kept in the current component
    /// and those deferred to the next one. Both halves stay sorted.
    fn decompose(intervals: Vec<Interval<I, T>>) -> (Vec<Interval<I, T>>, Vec<Interval<I, T>>) {
        let n = intervals.len();
        let deferred: Vec<bool> = (0..n)
            .map(|i| {
                let window = &intervals[(i + 1).min(n)..(i + 2 * MIN_COVERAGE).min(n)];
                let covered = window
                    .iter()
                    .filter(|other| intervals[i].end > other.end)
                    .count();
                covered >= MIN_COVERAGE
            })
            .collect();

        let mut kept = Vec::with_capacity(n);
        let mut rest = Vec::new();
        for (iv, defer) in intervals.into_iter().zip(deferred) {
            if defer {
                rest.push(iv);
            } else {
                kept.push(iv);
            }
        }
        (kept, rest)
    }

    /// Index one past the last interval of `component` that starts before `end`.
    fn upper_bound(&self, component: &Range<usize>, end: I) -> usize {
        component.start
            + self.intervals[component.clone()].partition_point(|iv| iv.start < end)
    }
}

/// Lazy overlap query over an [`AIList`].
///
/// Walks each component backwards from the last interval starting before the
/// query end, and leaves the component as soon as the running maximum end
/// shows that nothing further left can reach the query start.
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    inner: &'a AIList<I, T>,
    component: usize,
    // next candidate is `cursor - 1`; `None` means the component is not entered yet
    cursor: Option<usize>,
    start: I,
    stop: I,
}

impl<'a, I, T> IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn new(inner: &'a AIList<I, T>, start: I, stop: I) -> Self {
        IterFind {
            inner,
            component: 0,
            cursor: None,
            start,
            stop,
        }
    }
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    type Item = &'a Interval<I, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner;
        if self.start >= self.stop {
            return None;
        }

        while let Some(range) = inner.components.get(self.component) {
            let mut cursor = match self.cursor {
                Some(c) => c,
                None => inner.upper_bound(range, self.stop),
            };

            while cursor > range.start {
                cursor -= 1;
                if inner.max_ends[cursor] <= self.start {
                    break;
                }
                let iv = &inner.intervals[cursor];
                if iv.end > self.start {
                    self.cursor = Some(cursor);
                    return Some(iv);
                }
            }

            self.component += 1;
            self.cursor = None;
        }

        None
    }
}
