use num_traits::{PrimInt, Unsigned};

use crate::{Interval, Overlapper};

/// Nested Containment List.
///
/// Every interval contained in another one becomes its child, so each list
/// (the top level, or the children of one node) holds intervals where no
/// member contains another. Within such a list both starts and ends are
/// increasing, and the first overlapping member is found by binary search
/// on the ends.
#[derive(Debug, Clone)]
pub struct NCList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    nodes: Vec<Interval<I, T>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<I, T> Overlapper<I, T> for NCList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(mut intervals: Vec<Interval<I, T>>) -> Self {
        // containers sort before what they contain
        intervals.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

        let mut children = vec![Vec::new(); intervals.len()];
        let mut roots = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for (idx, iv) in intervals.iter().enumerate() {
            while let Some(&top) = open.last() {
                if intervals[top].end >= iv.end {
                    break;
                }
                open.pop();
            }
            match open.last() {
                Some(&parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
            open.push(idx);
        }

        NCList {
            nodes: intervals,
            children,
            roots,
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
        self.nodes.len()
    }
}

impl<I, T> NCList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Deepest nesting level, 1 for a flat list and 0 when empty.
    pub fn depth(&self) -> usize {
        fn walk(children: &[Vec<usize>], list: &[usize]) -> usize {
            list.iter()
                .map(|&idx| 1 + walk(children, &children[idx]))
                .max()
                .unwrap_or(0)
        }
        walk(&self.children, &self.roots)
    }

    fn first_overlap(&self, list: &[usize], start: I) -> usize {
        list.partition_point(|&idx| self.nodes[idx].end <= start)
    }
}

/// Lazy overlap query over an [`NCList`], depth first, parents before children.
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    inner: &'a NCList<I, T>,
    stack: Vec<(&'a [usize], usize)>,
    start: I,
    stop: I,
}

impl<'a, I, T> IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn new(inner: &'a NCList<I, T>, start: I, stop: I) -> Self {
        let mut stack = Vec::new();
        if start < stop && !inner.roots.is_empty() {
            let roots = inner.roots.as_slice();
            stack.push((roots, inner.first_overlap(roots, start)));
        }
        IterFind {
            inner,
            stack,
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
        let inner: &'a NCList<I, T> = self.inner;

        while let Some(&(list, pos)) = self.stack.last() {
            match list.get(pos) {
                Some(&idx) if inner.nodes[idx].start < self.stop => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                    let sublist = inner.children[idx].as_slice();
                    if !sublist.is_empty() {
                        self.stack
                            .push((sublist, inner.first_overlap(sublist, self.start)));
                    }
                    return Some(&inner.nodes[idx]);
                }
                _ => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn gene_model() -> Vec<Interval<u32, &'static str>> {
        vec![
            Interval { start: 100, end: 500, val: "gene" },
            Interval { start: 100, end: 150, val: "exon1" },
            Interval { start: 120, end: 150, val: "cds1" },
            Interval { start: 300, end: 500, val: "exon2" },
            Interval { start: 300, end: 420, val: "cds2" },
            Interval { start: 600, end: 700, val: "other" },
        ]
    }

    #[rstest]
    fn test_nesting() {
        let list = NCList::build(gene_model());
        assert_eq!(list.len(), 6);
        assert_eq!(list.depth(), 3);
    }

    #[rstest]
    #[case(130, 131, vec!["cds1", "exon1", "gene"])]
    #[case(200, 250, vec!["gene"])]
    #[case(450, 650, vec!["exon2", "gene", "other"])]
    #[case(500, 600, vec![])]
    fn test_find(#[case] start: u32, #[case] end: u32, #[case] expected: Vec<&'static str>) {
        let list = NCList::build(gene_model());
        let mut hits: Vec<&str> = list.find_iter(start, end).map(|iv| iv.val).collect();
        hits.sort();
        assert_eq!(hits, expected);
    }

    #[rstest]
    fn test_parents_come_first() {
        let list = NCList::build(gene_model());
        let hits: Vec<&str> = list.find_iter(130, 131).map(|iv| iv.val).collect();
        assert_eq!(hits, vec!["gene", "exon1", "cds1"]);
    }

    #[rstest]
    fn test_identical_intervals_are_all_reported() {
        let list = NCList::build(vec![
            Interval { start: 5u32, end: 10, val: 1 },
            Interval { start: 5, end: 10, val: 2 },
        ]);
        assert_eq!(list.find(9, 10).len(), 2);
        assert_eq!(list.find(10, 11).len(), 0);
    }
}
