//! Per-sequence overlap indexes.
//!
//! An [`IntervalForest`] holds one [`Overlapper`] for every sequence that has
//! at least one interval. Queries against a sequence that never had any
//! interval return `None`, which callers use to tell "no annotation for this
//! sequence" apart from "annotated, but nothing here".
//!
//! ```
//! use strkit_overlaprs::{Interval, IntervalForest, OverlapperType};
//!
//! let forest = IntervalForest::build(
//!     vec![
//!         ("chr1".to_string(), Interval::from_closed(100u64, 200, "exon")),
//!         ("chr2".to_string(), Interval::from_closed(10u64, 20, "cds")),
//!     ],
//!     OverlapperType::AIList,
//! );
//!
//! let hits = forest.find_closed("chr1", 200, 210).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert!(forest.find_closed("chrM", 1, 10).is_none());
//! ```

use std::collections::HashMap;

use num_traits::{PrimInt, Unsigned, identities::one};

use crate::{AIList, Interval, NCList, Overlapper, OverlapperType};

pub struct IntervalForest<I, T> {
    trees: HashMap<String, Box<dyn Overlapper<I, T>>>,
    overlapper_type: OverlapperType,
}

impl<I, T> IntervalForest<I, T>
where
    I: PrimInt + Unsigned + Send + Sync + 'static,
    T: Eq + Clone + Send + Sync + 'static,
{
    /// Group `(sequence, interval)` pairs by sequence and index each group.
    pub fn build<S>(entries: S, overlapper_type: OverlapperType) -> Self
    where
        S: IntoIterator<Item = (String, Interval<I, T>)>,
    {
        let mut grouped: HashMap<String, Vec<Interval<I, T>>> = HashMap::new();
        for (sequence, interval) in entries {
            grouped.entry(sequence).or_default().push(interval);
        }

        let trees = grouped
            .into_iter()
            .map(|(sequence, intervals)| {
                let tree: Box<dyn Overlapper<I, T>> = match overlapper_type {
                    OverlapperType::AIList => Box::new(AIList::build(intervals)),
                    OverlapperType::NCList => Box::new(NCList::build(intervals)),
                };
                (sequence, tree)
            })
            .collect();

        IntervalForest {
            trees,
            overlapper_type,
        }
    }

    /// Intervals on `sequence` overlapping the half-open range `[start, end)`.
    pub fn find_iter<'a>(
        &'a self,
        sequence: &str,
        start: I,
        end: I,
    ) -> Option<Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>> {
        self.trees
            .get(sequence)
            .map(|tree| tree.find_iter(start, end))
    }

    /// Intervals on `sequence` overlapping the closed range `start..=end`.
    pub fn find_closed(&self, sequence: &str, start: I, end: I) -> Option<Vec<&Interval<I, T>>> {
        self.find_iter(sequence, start, end + one::<I>())
            .map(|hits| hits.collect())
    }

    pub fn contains_sequence(&self, sequence: &str) -> bool {
        self.trees.contains_key(sequence)
    }

    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Total number of indexed intervals across all sequences.
    pub fn len(&self) -> usize {
        self.trees.values().map(|tree| tree.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlapper_type(&self) -> OverlapperType {
        self.overlapper_type
    }
}

impl<I, T> FromIterator<(String, Interval<I, T>)> for IntervalForest<I, T>
where
    I: PrimInt + Unsigned + Send + Sync + 'static,
    T: Eq + Clone + Send + Sync + 'static,
{
    fn from_iter<S: IntoIterator<Item = (String, Interval<I, T>)>>(iter: S) -> Self {
        IntervalForest::build(iter, OverlapperType::default())
    }
}
