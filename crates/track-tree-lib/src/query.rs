//! Positional and spatial queries on the track tree
//!
//! Point indices run from 0 to `skip_count()`. Out-of-range indices violate the
//! caller's contract: debug builds assert, release builds settle on the nearest end
//! of the track. [`crate::Track`] validates indices before calling in.

use crate::geometry::{
    Axis, EarthVector, GeodeticPoint, TrackPoint, great_circle_length, vector_from_geodetic,
};
use crate::section::{LONGITUDE_TOLERANCE, RoadSection};
use crate::tree::PeteTree;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PeteTree {
    /// Descend to the leaf holding `index`, returning it with the index relative to it
    ///
    /// The relative index is 0 for the leaf's start and 1 (or more, past the end of the
    /// track) for its end.
    fn descend(&self, index: usize) -> (&RoadSection, usize) {
        debug_assert!(
            index <= self.skip_count(),
            "point index {} out of range 0..={}",
            index,
            self.skip_count()
        );

        let mut node = self;
        let mut index = index;
        loop {
            match node {
                PeteTree::Leaf(section) => return (section, index),
                PeteTree::Node { left, right, .. } => {
                    let left_skip = left.skip_count();
                    if index < left_skip {
                        node = left;
                    } else {
                        index -= left_skip;
                        node = right;
                    }
                }
            }
        }
    }

    /// Leaf whose segment starts at `index` (the last leaf for the final point)
    pub fn leaf_at_index(&self, index: usize) -> &RoadSection {
        self.descend(index).0
    }

    /// Stored point at `index`
    pub fn point_at_index(&self, index: usize) -> TrackPoint {
        match self.descend(index) {
            (leaf, 0) => leaf.start,
            (leaf, _) => leaf.end,
        }
    }

    /// Earth vector of the point at `index`
    pub fn vector_at_index(&self, index: usize) -> EarthVector {
        self.point_at_index(index).vector
    }

    /// Original geodetic sample at `index`
    pub fn geodetic_at_index(&self, index: usize) -> GeodeticPoint {
        self.point_at_index(index).geodetic
    }

    /// Distance along the track from the first point to the point at `index`, meters
    pub fn distance_from_index(&self, index: usize) -> f64 {
        debug_assert!(index <= self.skip_count());

        let mut node = self;
        let mut index = index;
        let mut distance = 0.0;
        loop {
            match node {
                PeteTree::Leaf(section) => {
                    return if index == 0 {
                        distance
                    } else {
                        distance + section.true_length
                    };
                }
                PeteTree::Node { left, right, .. } => {
                    let left_skip = left.skip_count();
                    if index < left_skip {
                        node = left;
                    } else {
                        distance += left.true_length();
                        index -= left_skip;
                        node = right;
                    }
                }
            }
        }
    }

    /// Index of the last point at or before `distance` meters along the track
    ///
    /// Distances are accumulated in the same order as [`Self::distance_from_index`],
    /// so feeding a point's own distance back returns that point's index.
    /// Negative distances give 0, distances past the end give the last index.
    pub fn index_from_distance(&self, distance: f64) -> usize {
        let mut node = self;
        let mut index = 0;
        let mut covered = 0.0;
        loop {
            match node {
                PeteTree::Leaf(section) => {
                    return if distance < covered + section.true_length {
                        index
                    } else {
                        index + 1
                    };
                }
                PeteTree::Node { left, right, .. } => {
                    let left_end = covered + left.true_length();
                    if distance < left_end {
                        node = left;
                    } else {
                        covered = left_end;
                        index += left.skip_count();
                        node = right;
                    }
                }
            }
        }
    }

    /// Index of the point nearest to a 3D axis, such as the ray under a mouse click
    ///
    /// Branch-and-bound over bounding spheres: children whose sphere the axis passes
    /// through are searched, the closer result wins (ties go to the earlier point). If
    /// neither sphere is hit, the search follows the child whose sphere surface is
    /// nearer the axis. This is a best-effort search that is reliable for continuous
    /// routes but does not guarantee the global optimum.
    pub fn nearest_to_ray(&self, axis: &Axis) -> usize {
        self.nearest_to_axis_from(axis, 0).0
    }

    fn nearest_to_axis_from(&self, axis: &Axis, skip: usize) -> (usize, f64) {
        match self {
            PeteTree::Leaf(section) => {
                let start_distance = axis.distance_to(section.start.vector.0);
                let end_distance = axis.distance_to(section.end.vector.0);
                if start_distance <= end_distance {
                    (skip, start_distance)
                } else {
                    (skip + 1, end_distance)
                }
            }
            PeteTree::Node { left, right, .. } => {
                let right_skip = skip + left.skip_count();
                match (
                    left.sphere().intersects_axis(axis),
                    right.sphere().intersects_axis(axis),
                ) {
                    (true, true) => closer(
                        left.nearest_to_axis_from(axis, skip),
                        right.nearest_to_axis_from(axis, right_skip),
                    ),
                    (true, false) => left.nearest_to_axis_from(axis, skip),
                    (false, true) => right.nearest_to_axis_from(axis, right_skip),
                    (false, false) => {
                        if left.sphere().distance_from_axis(axis)
                            <= right.sphere().distance_from_axis(axis)
                        {
                            left.nearest_to_axis_from(axis, skip)
                        } else {
                            right.nearest_to_axis_from(axis, right_skip)
                        }
                    }
                }
            }
        }
    }

    /// Index of the point nearest to a geodetic position, such as a click on a 2D map
    ///
    /// Same shape as [`Self::nearest_to_ray`], pruning on longitude spans: children
    /// whose span contains the query longitude are searched, otherwise the child that
    /// needs the smaller rotation to reach the query. When both rotations are equal,
    /// as on a road running along a meridian, the child whose bounding sphere is
    /// nearer the query wins. Leaves compare great-circle distances. This is an
    /// approximation, not an exhaustive search.
    pub fn nearest_to_lon_lat(&self, query: &GeodeticPoint) -> usize {
        let target = vector_from_geodetic(query);
        self.nearest_to_lon_lat_from(query, &target, 0).0
    }

    fn nearest_to_lon_lat_from(
        &self,
        query: &GeodeticPoint,
        target: &EarthVector,
        skip: usize,
    ) -> (usize, f64) {
        match self {
            PeteTree::Leaf(section) => {
                let start_distance = great_circle_length(query, &section.start.geodetic);
                let end_distance = great_circle_length(query, &section.end.geodetic);
                if start_distance <= end_distance {
                    (skip, start_distance)
                } else {
                    (skip + 1, end_distance)
                }
            }
            PeteTree::Node { left, right, .. } => {
                let right_skip = skip + left.skip_count();
                let left_span = left.longitude_span();
                let right_span = right.longitude_span();
                match (
                    left_span.contains(query.longitude),
                    right_span.contains(query.longitude),
                ) {
                    (true, true) => closer(
                        left.nearest_to_lon_lat_from(query, target, skip),
                        right.nearest_to_lon_lat_from(query, target, right_skip),
                    ),
                    (true, false) => left.nearest_to_lon_lat_from(query, target, skip),
                    (false, true) => right.nearest_to_lon_lat_from(query, target, right_skip),
                    (false, false) => {
                        let left_rotation = left_span.rotation_away_from(query.longitude).abs();
                        let right_rotation = right_span.rotation_away_from(query.longitude).abs();
                        let go_left =
                            if (left_rotation - right_rotation).abs() > LONGITUDE_TOLERANCE {
                                left_rotation < right_rotation
                            } else {
                                sphere_gap(left, target) <= sphere_gap(right, target)
                            };
                        if go_left {
                            left.nearest_to_lon_lat_from(query, target, skip)
                        } else {
                            right.nearest_to_lon_lat_from(query, target, right_skip)
                        }
                    }
                }
            }
        }
    }
}

/// Distance from a point to the surface of a subtree's bounding sphere, negative inside
#[inline]
fn sphere_gap(tree: &PeteTree, target: &EarthVector) -> f64 {
    let sphere = tree.sphere();
    sphere.center.distance(target.0) - sphere.radius
}

/// Pick the closer of two candidates, preferring the first on a tie
#[inline]
fn closer(first: (usize, f64), second: (usize, f64)) -> (usize, f64) {
    if first.1 <= second.1 { first } else { second }
}
