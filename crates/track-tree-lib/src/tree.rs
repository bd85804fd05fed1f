//! Balanced, immutable track tree
//!
//! A [`PeteTree`] covers an entire track. Leaves hold one segment each; nodes hold the
//! aggregate of their children. Trees are never mutated after construction: edits
//! build a new tree (see the mutation module) and the host swaps it in.

use crate::geometry::{BoundingBox3, BoundingSphere, EarthVector, GeodeticPoint, TrackPoint};
use crate::section::{LongitudeSpan, RoadSection};

/// Augmented binary tree over the segments of a track
#[derive(Clone, Debug)]
pub enum PeteTree {
    Leaf(RoadSection),
    Node {
        info: RoadSection,
        left: Box<PeteTree>,
        right: Box<PeteTree>,
    },
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PeteTree {
    /// Build a balanced tree from an ordered sequence of points
    ///
    /// The N points give N-1 leaf segments. Each level splits the segment count in
    /// half (`n / 2` left, the rest right) and the points are consumed from a single
    /// stream, so every leaf takes one new point and shares its start with the end of
    /// its predecessor. Returns `None` when fewer than 2 points are supplied.
    pub fn build<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = TrackPoint>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("tree::build");

        let points: Vec<TrackPoint> = points.into_iter().collect();
        if points.len() < 2 {
            return None;
        }

        let segments = points.len() - 1;
        let mut stream = points.into_iter();
        let first = stream.next()?;
        let (tree, _) = Self::build_balanced(segments, first, &mut stream)?;

        tracing::debug!(
            "Built track tree: {} segments, depth {}, {:.1} m",
            segments,
            tree.depth(),
            tree.true_length()
        );
        Some(tree)
    }

    /// Build from geodetic samples
    pub fn from_geodetic(points: &[GeodeticPoint]) -> Option<Self> {
        Self::build(points.iter().copied().map(TrackPoint::from))
    }

    /// Build from Earth-centred vectors, deriving the geodetic data
    pub fn from_vectors<I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = EarthVector>,
    {
        Self::build(vectors.into_iter().map(TrackPoint::from))
    }

    /// Recursive step: `segments` leaves starting at `start`, pulling the rest from `stream`
    ///
    /// Returns the subtree and its final point, which is the next subtree's start.
    fn build_balanced(
        segments: usize,
        start: TrackPoint,
        stream: &mut impl Iterator<Item = TrackPoint>,
    ) -> Option<(Self, TrackPoint)> {
        if segments <= 1 {
            let end = stream.next()?;
            return Some((PeteTree::Leaf(RoadSection::between(start, end)), end));
        }

        let left_size = segments / 2;
        let right_size = segments - left_size;
        let (left, joint) = Self::build_balanced(left_size, start, stream)?;
        let (right, end) = Self::build_balanced(right_size, joint, stream)?;
        Some((Self::node(left, right), end))
    }

    /// Join two adjacent subtrees under a new node
    pub(crate) fn node(left: PeteTree, right: PeteTree) -> Self {
        PeteTree::Node {
            info: RoadSection::combine(left.info(), right.info()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Aggregate payload of this subtree
    #[inline]
    pub fn info(&self) -> &RoadSection {
        match self {
            PeteTree::Leaf(section) => section,
            PeteTree::Node { info, .. } => info,
        }
    }

    /// Number of segments covered (the last point index of the subtree)
    #[inline]
    pub fn skip_count(&self) -> usize {
        self.info().skip_count
    }

    /// Great-circle length in meters
    #[inline]
    pub fn true_length(&self) -> f64 {
        self.info().true_length
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox3 {
        &self.info().bounding_box
    }

    #[inline]
    pub fn sphere(&self) -> &BoundingSphere {
        &self.info().sphere
    }

    #[inline]
    pub fn longitude_span(&self) -> &LongitudeSpan {
        &self.info().longitude_span
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, PeteTree::Leaf(_))
    }

    /// Number of levels; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            PeteTree::Leaf(_) => 1,
            PeteTree::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}
