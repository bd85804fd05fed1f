//! Folds over the track tree
//!
//! Renderers and previews use [`PeteTree::traverse_between_limits_to_depth`] to get
//! adaptive level of detail: a caller-supplied depth function decides per node
//! whether to stop and emit the aggregate section or keep descending.

use crate::section::RoadSection;
use crate::tree::PeteTree;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PeteTree {
    /// Fold over the sections lying between points `start` and `end`, in route order
    ///
    /// A section is visited when it covers at least one segment inside `start..end`.
    /// For each internal node, `depth_fn` returns `Some(max_depth)` to emit the node's
    /// aggregate once the traversal reaches that depth (the root is depth 0), or `None`
    /// to keep descending towards the leaves. Leaves are always emitted.
    pub fn traverse_between_limits_to_depth<A, D, F>(
        &self,
        start: usize,
        end: usize,
        depth_fn: D,
        mut fold: F,
        accumulator: A,
    ) -> A
    where
        D: Fn(&RoadSection) -> Option<usize>,
        F: FnMut(&RoadSection, A) -> A,
    {
        self.traverse_from(0, 0, start, end, &depth_fn, &mut fold, accumulator)
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse_from<A, D, F>(
        &self,
        offset: usize,
        depth: usize,
        start: usize,
        end: usize,
        depth_fn: &D,
        fold: &mut F,
        accumulator: A,
    ) -> A
    where
        D: Fn(&RoadSection) -> Option<usize>,
        F: FnMut(&RoadSection, A) -> A,
    {
        if offset >= end || offset + self.skip_count() <= start {
            return accumulator;
        }

        match self {
            PeteTree::Leaf(section) => fold(section, accumulator),
            PeteTree::Node { info, left, right } => {
                if depth_fn(info).is_some_and(|max_depth| depth >= max_depth) {
                    return fold(info, accumulator);
                }
                let accumulator =
                    left.traverse_from(offset, depth + 1, start, end, depth_fn, fold, accumulator);
                right.traverse_from(
                    offset + left.skip_count(),
                    depth + 1,
                    start,
                    end,
                    depth_fn,
                    fold,
                    accumulator,
                )
            }
        }
    }

    /// Fold over every leaf from the start of the track to the end
    pub fn fold_over_route<A, F>(&self, mut fold: F, accumulator: A) -> A
    where
        F: FnMut(&RoadSection, A) -> A,
    {
        self.fold_leaves(&mut fold, accumulator, false)
    }

    /// Fold over every leaf from the end of the track back to the start
    pub fn fold_over_route_rl<A, F>(&self, mut fold: F, accumulator: A) -> A
    where
        F: FnMut(&RoadSection, A) -> A,
    {
        self.fold_leaves(&mut fold, accumulator, true)
    }

    fn fold_leaves<A, F>(&self, fold: &mut F, accumulator: A, reverse: bool) -> A
    where
        F: FnMut(&RoadSection, A) -> A,
    {
        match self {
            PeteTree::Leaf(section) => fold(section, accumulator),
            PeteTree::Node { left, right, .. } => {
                let (first, second) = if reverse { (right, left) } else { (left, right) };
                let accumulator = first.fold_leaves(fold, accumulator, reverse);
                second.fold_leaves(fold, accumulator, reverse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::wiggly_points;

    fn collect_skips(tree: &PeteTree, start: usize, end: usize, depth: Option<usize>) -> Vec<usize> {
        tree.traverse_between_limits_to_depth(
            start,
            end,
            |_| depth,
            |section, mut acc: Vec<usize>| {
                acc.push(section.skip_count);
                acc
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_full_depth_visits_every_leaf_in_order() {
        let points = wiggly_points(33);
        let tree = PeteTree::from_geodetic(&points).unwrap();

        let starts = tree.traverse_between_limits_to_depth(
            0,
            tree.skip_count(),
            |_| None,
            |section, mut acc: Vec<_>| {
                acc.push(section.start.geodetic);
                acc
            },
            Vec::new(),
        );

        assert_eq!(starts.len(), 32);
        assert_eq!(starts, points[..32].to_vec());
    }

    #[test]
    fn test_depth_limit_emits_aggregates() {
        let tree = PeteTree::from_geodetic(&wiggly_points(65)).unwrap();

        // Depth 0 emits the root only
        assert_eq!(collect_skips(&tree, 0, 64, Some(0)), vec![64]);
        // Depth 2 emits four quarters
        assert_eq!(collect_skips(&tree, 0, 64, Some(2)), vec![16, 16, 16, 16]);
    }

    #[test]
    fn test_limits_restrict_the_window() {
        let tree = PeteTree::from_geodetic(&wiggly_points(65)).unwrap();

        // Only the leaves covering segments 10..14
        assert_eq!(collect_skips(&tree, 10, 14, None), vec![1, 1, 1, 1]);
        // Empty window
        assert!(collect_skips(&tree, 20, 20, None).is_empty());
        // Coarse depth keeps whole aggregates overlapping the window
        assert_eq!(collect_skips(&tree, 10, 14, Some(2)), vec![16]);
    }

    #[test]
    fn test_depth_function_sees_each_node() {
        let tree = PeteTree::from_geodetic(&wiggly_points(65)).unwrap();

        // Full detail along the leftmost spine, coarse elsewhere
        let skips = tree.traverse_between_limits_to_depth(
            0,
            64,
            |section| {
                if section.start.geodetic == tree.geodetic_at_index(0) {
                    None
                } else {
                    Some(1)
                }
            },
            |section, mut acc: Vec<usize>| {
                acc.push(section.skip_count);
                acc
            },
            Vec::new(),
        );

        assert_eq!(skips.iter().sum::<usize>(), 64);
        assert_eq!(*skips.last().unwrap(), 32);
        assert_eq!(skips[0], 1);
    }

    #[test]
    fn test_fold_over_route_both_directions() {
        let points = wiggly_points(40);
        let tree = PeteTree::from_geodetic(&points).unwrap();

        let forward = tree.fold_over_route(
            |section, mut acc: Vec<_>| {
                acc.push(section.start.geodetic);
                acc
            },
            Vec::new(),
        );
        assert_eq!(forward, points[..39].to_vec());

        let backward = tree.fold_over_route_rl(
            |section, mut acc: Vec<_>| {
                acc.push(section.end.geodetic);
                acc
            },
            Vec::new(),
        );
        let mut expected = points[1..].to_vec();
        expected.reverse();
        assert_eq!(backward, expected);

        let total = tree.fold_over_route(|section, acc| acc + section.true_length, 0.0);
        assert!((total - tree.true_length()).abs() < 1e-6);
    }
}
