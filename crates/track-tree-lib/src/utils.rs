//! Utility functions for angle arithmetic and GPX coordinate conversions
//!
//! Longitudes and bearings live on a circle. Every difference, average or span
//! computed here goes through [`signed_rotation`] so values never jump at ±180°.

use crate::GeodeticPoint;
use std::f64::consts::{PI, TAU};

/// Maximum latitude in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Maximum longitude in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// Normalise an angle in radians into the half-open range (-π, π]
#[inline(always)]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { PI } else { wrapped }
}

/// Shortest signed rotation (radians) that turns direction `from` into direction `to`
///
/// Positive values are anticlockwise, which for longitudes means eastward.
#[inline(always)]
pub fn signed_rotation(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Initial great-circle bearing from `from` to `to`, in radians
///
/// Zero is north, positive is clockwise (towards east), result is in (-π, π].
#[inline]
pub fn bearing(from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
    let delta_lon = to.longitude - from.longitude;
    let y = delta_lon.sin() * to.latitude.cos();
    let x = from.latitude.cos() * to.latitude.sin()
        - from.latitude.sin() * to.latitude.cos() * delta_lon.cos();
    normalize_angle(y.atan2(x))
}

/// Check if a (lat, lon) pair in degrees is a usable track coordinate
#[inline(always)]
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
        && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
}

/// Convert a GPX waypoint to a geodetic point
///
/// Waypoints without elevation are placed at altitude zero.
#[inline(always)]
pub fn waypoint_to_geodetic(waypoint: &gpx::Waypoint) -> GeodeticPoint {
    let point = waypoint.point();
    GeodeticPoint::from_degrees(point.x(), point.y(), waypoint.elevation.unwrap_or(0.0))
}

/// Convert a geodetic point to a GPX waypoint carrying its elevation
#[inline]
pub fn geodetic_to_waypoint(point: &GeodeticPoint) -> gpx::Waypoint {
    let mut waypoint = gpx::Waypoint::new(geo::Point::new(
        point.longitude_degrees(),
        point.latitude_degrees(),
    ));
    waypoint.elevation = Some(point.altitude);
    waypoint
}
