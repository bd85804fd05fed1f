//! Range replacement, the only edit primitive
//!
//! Every edit (delete, nudge, smoothing, insertion) is expressed as: keep some points
//! at the start, keep some points at the end, put new points in between. The result
//! is a brand-new tree; the receiver is never modified.

use crate::geometry::{GeodeticPoint, TrackPoint};
use crate::tree::PeteTree;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PeteTree {
    /// Replace the points from index `from_start` up to index `skip_count() - from_end`
    /// (both inclusive) with `new_points`, and rebuild
    ///
    /// `from_start` is the number of leading points kept and `from_end` the number of
    /// trailing points kept, so `from_start + from_end` may be at most the point count;
    /// when it equals the point count the call is a pure insertion. Kept points retain
    /// their original geodetic data.
    ///
    /// Returns `None` when the resulting track would have fewer than 2 points; the
    /// caller must then refuse the edit and keep the current tree.
    pub fn replace_range(
        &self,
        from_start: usize,
        from_end: usize,
        new_points: &[GeodeticPoint],
    ) -> Option<PeteTree> {
        #[cfg(feature = "profiling")]
        profiling::scope!("tree::replace_range");

        let point_count = self.skip_count() + 1;
        debug_assert!(
            from_start.saturating_add(from_end) <= point_count,
            "kept ranges overlap: {} + {} > {}",
            from_start,
            from_end,
            point_count
        );

        let keep_start = from_start.min(point_count);
        let keep_end = from_end.min(point_count - keep_start);

        let mut points = Vec::with_capacity(keep_start + new_points.len() + keep_end);
        if keep_start > 0 {
            points.extend(self.extract_points_in_range(0, keep_start - 1));
        }
        points.extend(new_points.iter().copied().map(TrackPoint::from));
        if keep_end > 0 {
            points.extend(self.extract_points_in_range(point_count - keep_end, point_count - 1));
        }

        tracing::debug!(
            "Replacing points {}..{} with {} new points",
            keep_start,
            point_count - keep_end,
            new_points.len()
        );
        PeteTree::build(points)
    }

    /// Points with indices `from..=to`, in route order
    ///
    /// `to` is clamped to the last index; an empty vector is returned when `from > to`.
    pub fn extract_points_in_range(&self, from: usize, to: usize) -> Vec<TrackPoint> {
        let last = self.skip_count();
        let to = to.min(last);
        if from > to {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(to - from + 1);
        self.collect_starts(0, from, to, &mut points);
        if to == last {
            points.push(self.info().end);
        }
        points
    }

    /// Push the start point of every leaf whose start index is in `from..=to`
    fn collect_starts(&self, offset: usize, from: usize, to: usize, out: &mut Vec<TrackPoint>) {
        if offset > to || offset + self.skip_count() <= from {
            return;
        }
        match self {
            PeteTree::Leaf(section) => out.push(section.start),
            PeteTree::Node { left, right, .. } => {
                left.collect_starts(offset, from, to, out);
                right.collect_starts(offset + left.skip_count(), from, to, out);
            }
        }
    }
}
