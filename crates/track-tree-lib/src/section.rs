//! Road sections: the per-node payload of the track tree
//!
//! A leaf section covers one segment between two consecutive points. An internal
//! section aggregates its two children. [`RoadSection::combine`] is the single rule
//! for aggregation and is used both for the initial build and after every edit.

use crate::geometry::{BoundingBox3, BoundingSphere, TrackPoint, great_circle_length};
use crate::utils::{bearing, normalize_angle, signed_rotation};
use std::f64::consts::PI;

/// Slack (radians) when testing longitude containment, about 6 mm at the equator
pub(crate) const LONGITUDE_TOLERANCE: f64 = 1e-9;

/// Angular extent of a section's longitudes
///
/// Expressed as a median direction plus signed turns, so a span that crosses the
/// antimeridian stays small instead of covering almost the whole circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LongitudeSpan {
    /// Centre of the span, radians in (-π, π]
    pub median: f64,
    /// Furthest eastward rotation from the median, >= 0
    pub eastward_turn: f64,
    /// Furthest westward rotation from the median, <= 0
    pub westward_turn: f64,
}

impl LongitudeSpan {
    /// Span of the short way round between two longitudes
    pub fn between(start: f64, end: f64) -> Self {
        let turn = signed_rotation(start, end);
        Self::centred(normalize_angle(start + turn / 2.0), turn.abs() / 2.0)
    }

    fn centred(median: f64, half_width: f64) -> Self {
        let half_width = half_width.min(PI);
        Self {
            median,
            eastward_turn: half_width,
            westward_turn: -half_width,
        }
    }

    /// Smallest span containing both spans
    ///
    /// The other span is placed relative to this median by the shortest rotation, then
    /// the new median is this median perturbed towards the middle of the combined range.
    pub fn union(&self, other: &LongitudeSpan) -> Self {
        let offset = signed_rotation(self.median, other.median);
        let west = self.westward_turn.min(offset + other.westward_turn);
        let east = self.eastward_turn.max(offset + other.eastward_turn);
        Self::centred(normalize_angle(self.median + (east + west) / 2.0), (east - west) / 2.0)
    }

    /// Whether a longitude (radians) falls inside the span
    #[inline]
    pub fn contains(&self, longitude: f64) -> bool {
        let rotation = signed_rotation(self.median, longitude);
        rotation >= self.westward_turn - LONGITUDE_TOLERANCE
            && rotation <= self.eastward_turn + LONGITUDE_TOLERANCE
    }

    /// Signed rotation needed to bring a longitude into the span, zero when contained
    #[inline]
    pub fn rotation_away_from(&self, longitude: f64) -> f64 {
        let rotation = signed_rotation(self.median, longitude);
        if rotation > self.eastward_turn {
            rotation - self.eastward_turn
        } else if rotation < self.westward_turn {
            rotation - self.westward_turn
        } else {
            0.0
        }
    }

    /// Westernmost longitude of the span, radians
    #[inline]
    pub fn west_edge(&self) -> f64 {
        normalize_angle(self.median + self.westward_turn)
    }

    /// Easternmost longitude of the span, radians
    #[inline]
    pub fn east_edge(&self) -> f64 {
        normalize_angle(self.median + self.eastward_turn)
    }
}

/// Aggregate information for a run of consecutive track points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadSection {
    pub start: TrackPoint,
    pub end: TrackPoint,
    pub bounding_box: BoundingBox3,
    pub sphere: BoundingSphere,
    /// Sum of great-circle segment lengths, meters
    pub true_length: f64,
    /// Number of segments covered
    pub skip_count: usize,
    pub longitude_span: LongitudeSpan,
    pub altitude_gained: f64,
    pub altitude_lost: f64,
    pub distance_climbing: f64,
    pub distance_descending: f64,
    /// Steepest uphill gradient of any segment, percent
    pub steepest_climb: f64,
    /// Gradient of the first segment, percent
    pub gradient_at_start: f64,
    /// Gradient of the last segment, percent
    pub gradient_at_end: f64,
    /// Bearing of the first segment, radians from north
    pub direction_at_start: f64,
    /// Bearing of the last segment, radians from north
    pub direction_at_end: f64,
}

impl RoadSection {
    /// Leaf section for the segment between two consecutive points
    pub fn between(start: TrackPoint, end: TrackPoint) -> Self {
        let bounding_box = BoundingBox3::from_corners(start.vector.0, end.vector.0);
        let true_length = great_circle_length(&start.geodetic, &end.geodetic);
        let rise = end.geodetic.altitude - start.geodetic.altitude;
        let gradient = if true_length > 0.0 {
            100.0 * rise / true_length
        } else {
            0.0
        };
        let direction = bearing(&start.geodetic, &end.geodetic);

        Self {
            start,
            end,
            bounding_box,
            sphere: BoundingSphere::containing(&bounding_box),
            true_length,
            skip_count: 1,
            longitude_span: LongitudeSpan::between(
                start.geodetic.longitude,
                end.geodetic.longitude,
            ),
            altitude_gained: rise.max(0.0),
            altitude_lost: (-rise).max(0.0),
            distance_climbing: if rise > 0.0 { true_length } else { 0.0 },
            distance_descending: if rise < 0.0 { true_length } else { 0.0 },
            steepest_climb: gradient.max(0.0),
            gradient_at_start: gradient,
            gradient_at_end: gradient,
            direction_at_start: direction,
            direction_at_end: direction,
        }
    }

    /// Aggregate of two adjacent sections, `left` immediately preceding `right`
    pub fn combine(left: &RoadSection, right: &RoadSection) -> Self {
        let bounding_box = left.bounding_box.union(&right.bounding_box);

        Self {
            start: left.start,
            end: right.end,
            bounding_box,
            sphere: BoundingSphere::containing(&bounding_box),
            true_length: left.true_length + right.true_length,
            skip_count: left.skip_count + right.skip_count,
            longitude_span: left.longitude_span.union(&right.longitude_span),
            altitude_gained: left.altitude_gained + right.altitude_gained,
            altitude_lost: left.altitude_lost + right.altitude_lost,
            distance_climbing: left.distance_climbing + right.distance_climbing,
            distance_descending: left.distance_descending + right.distance_descending,
            steepest_climb: left.steepest_climb.max(right.steepest_climb),
            gradient_at_start: left.gradient_at_start,
            gradient_at_end: right.gradient_at_end,
            direction_at_start: left.direction_at_start,
            direction_at_end: right.direction_at_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeodeticPoint;

    fn point(lon: f64, lat: f64, alt: f64) -> TrackPoint {
        TrackPoint::from(GeodeticPoint::from_degrees(lon, lat, alt))
    }

    #[test]
    fn test_leaf_section() {
        let section = RoadSection::between(point(0.0, 0.0, 0.0), point(0.001, 0.0, 10.0));

        assert_eq!(section.skip_count, 1);
        assert!((section.true_length - 111.19).abs() < 0.1);
        assert_eq!(section.altitude_gained, 10.0);
        assert_eq!(section.altitude_lost, 0.0);
        assert!((section.gradient_at_start - 100.0 * 10.0 / section.true_length).abs() < 1e-9);
        assert!((section.direction_at_start - PI / 2.0).abs() < 1e-6);
        assert!(section.bounding_box.contains(section.start.vector.0));
        assert!(section.bounding_box.contains(section.end.vector.0));
    }

    #[test]
    fn test_combine_aggregates() {
        let a = point(0.0, 0.0, 0.0);
        let b = point(0.001, 0.0, 10.0);
        let c = point(0.002, 0.001, 4.0);
        let left = RoadSection::between(a, b);
        let right = RoadSection::between(b, c);
        let both = RoadSection::combine(&left, &right);

        assert_eq!(both.skip_count, 2);
        assert_eq!(both.true_length, left.true_length + right.true_length);
        assert_eq!(both.bounding_box, left.bounding_box.union(&right.bounding_box));
        assert_eq!(both.altitude_gained, 10.0);
        assert_eq!(both.altitude_lost, 6.0);
        assert_eq!(both.distance_climbing, left.true_length);
        assert_eq!(both.distance_descending, right.true_length);
        assert_eq!(both.gradient_at_start, left.gradient_at_start);
        assert_eq!(both.gradient_at_end, right.gradient_at_end);
        assert_eq!(both.start, a);
        assert_eq!(both.end, c);
    }

    #[test]
    fn test_span_contains_its_endpoints() {
        let span = LongitudeSpan::between(0.3, 0.1);
        assert!((span.median - 0.2).abs() < 1e-12);
        assert!(span.contains(0.1));
        assert!(span.contains(0.3));
        assert!(!span.contains(0.31));
        assert!(span.eastward_turn >= 0.0 && span.westward_turn <= 0.0);
    }

    #[test]
    fn test_span_across_antimeridian() {
        let east = 179.9_f64.to_radians();
        let west = (-179.9_f64).to_radians();
        let span = LongitudeSpan::between(east, west);

        // Centred on the antimeridian, 0.1° either side
        assert!((span.median.abs() - PI).abs() < 1e-12);
        assert!((span.eastward_turn - 0.1_f64.to_radians()).abs() < 1e-12);
        assert!((span.westward_turn + 0.1_f64.to_radians()).abs() < 1e-12);

        assert!(span.contains(PI));
        assert!(span.contains(-PI));
        assert!(!span.contains(0.0));

        // A naive min/max comparison rejects 180°
        let (min, max) = (west.min(east), west.max(east));
        assert!(!(min..=max).contains(&PI));
    }

    #[test]
    fn test_span_union_across_antimeridian() {
        let a = LongitudeSpan::between(179.8_f64.to_radians(), 179.9_f64.to_radians());
        let b = LongitudeSpan::between((-179.9_f64).to_radians(), (-179.8_f64).to_radians());
        let union = a.union(&b);

        assert!((union.eastward_turn - 0.2_f64.to_radians()).abs() < 1e-9);
        assert!(union.contains(PI));
        assert!(union.contains(179.8_f64.to_radians()));
        assert!(union.contains((-179.8_f64).to_radians()));
        assert!(!union.contains(179.7_f64.to_radians()));
        assert!(!union.contains(0.0));
    }

    #[test]
    fn test_span_union_caps_at_full_circle() {
        let a = LongitudeSpan::centred(0.0, 3.0);
        let b = LongitudeSpan::centred(PI, 3.0);
        let union = a.union(&b);
        assert_eq!(union.eastward_turn, PI);
        assert_eq!(union.westward_turn, -PI);
        assert!(union.contains(1.234));
    }

    #[test]
    fn test_rotation_away_from() {
        let span = LongitudeSpan::between(0.0, 0.2);
        assert_eq!(span.rotation_away_from(0.1), 0.0);
        assert!((span.rotation_away_from(0.5) - 0.3).abs() < 1e-12);
        assert!((span.rotation_away_from(-0.4) + 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_span_edges() {
        let span = LongitudeSpan::between(179.9_f64.to_radians(), (-179.9_f64).to_radians());
        assert!((span.west_edge().to_degrees() - 179.9).abs() < 1e-9);
        assert!((span.east_edge().to_degrees() + 179.9).abs() < 1e-9);
    }
}
