//! Geometry representation
//!
//! Raw samples arrive as geodetic coordinates. All internal geometry works on
//! Earth-centred Cartesian vectors so that boxes, spheres and distances are plain
//! Euclidean operations. Lengths are the exception: the authoritative length of a
//! section is the great-circle distance between its endpoints.

use crate::utils::{self, normalize_angle};
use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// Slack (meters) when testing whether an axis touches a bounding sphere.
/// Section endpoints sit exactly on their leaf sphere's surface.
const SPHERE_TOLERANCE: f64 = 1e-6;

/// One raw sample of a track
///
/// Longitude is in radians within (-π, π], latitude in radians within [-π/2, π/2],
/// altitude in meters above the mean Earth radius.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl GeodeticPoint {
    /// Create a point from radians, normalising longitude and clamping latitude
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude: normalize_angle(longitude),
            latitude: latitude.clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2),
            altitude,
        }
    }

    /// Create a point from longitude and latitude in degrees
    pub fn from_degrees(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), altitude)
    }

    #[inline]
    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    #[inline]
    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

/// Vector from the Earth's centre to a point, in meters
///
/// x points at (0°, 0°), y at (90°E, 0°) and z at the north pole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarthVector(pub DVec3);

impl EarthVector {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    #[inline]
    pub fn as_dvec3(&self) -> DVec3 {
        self.0
    }

    /// Euclidean (chord) distance to another vector
    #[inline]
    pub fn distance(&self, other: &EarthVector) -> f64 {
        self.0.distance(other.0)
    }
}

/// Map geodetic coordinates onto an Earth-centred vector
///
/// Total: every latitude/longitude pair has a well-defined direction.
pub fn vector_from_geodetic(point: &GeodeticPoint) -> EarthVector {
    let (sin_lat, cos_lat) = point.latitude.sin_cos();
    let (sin_lon, cos_lon) = point.longitude.sin_cos();
    let direction = DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
    EarthVector(direction * (EARTH_MEAN_RADIUS + point.altitude))
}

/// Recover geodetic coordinates from an Earth-centred vector
///
/// A zero vector has no direction and maps to longitude 0, latitude 0. Points on
/// the polar axis have no longitude and report 0.
pub fn geodetic_from_vector(vector: &EarthVector) -> GeodeticPoint {
    let length = vector.0.length();
    let Some(direction) = vector.0.try_normalize() else {
        return GeodeticPoint {
            longitude: 0.0,
            latitude: 0.0,
            altitude: -EARTH_MEAN_RADIUS,
        };
    };

    let longitude = if direction.x.abs() < f64::EPSILON && direction.y.abs() < f64::EPSILON {
        0.0
    } else {
        normalize_angle(direction.y.atan2(direction.x))
    };

    GeodeticPoint {
        longitude,
        latitude: direction.z.clamp(-1.0, 1.0).asin(),
        altitude: length - EARTH_MEAN_RADIUS,
    }
}

/// Great-circle distance between two points in meters (Haversine, altitude ignored)
#[inline]
pub fn great_circle_length(p1: &GeodeticPoint, p2: &GeodeticPoint) -> f64 {
    let delta_lat = p2.latitude - p1.latitude;
    let delta_lon = p2.longitude - p1.longitude;

    let a = (delta_lat / 2.0).sin().powi(2)
        + p1.latitude.cos() * p2.latitude.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_MEAN_RADIUS * c
}

/// A track sample as stored in the tree: its vector plus the geodetic data it came from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub vector: EarthVector,
    pub geodetic: GeodeticPoint,
}

impl From<GeodeticPoint> for TrackPoint {
    fn from(geodetic: GeodeticPoint) -> Self {
        Self {
            vector: vector_from_geodetic(&geodetic),
            geodetic,
        }
    }
}

impl From<EarthVector> for TrackPoint {
    fn from(vector: EarthVector) -> Self {
        Self {
            geodetic: geodetic_from_vector(&vector),
            vector,
        }
    }
}

/// Axis-aligned bounding box in Earth-centred coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox3 {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox3 {
    /// Smallest box containing both corners
    #[inline]
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn union(&self, other: &BoundingBox3) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis
    #[inline]
    pub fn dimensions(&self) -> DVec3 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Sphere used for cheap pruning during ray searches
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    /// Sphere centred on the box with the half diagonal as radius
    pub fn containing(bounding_box: &BoundingBox3) -> Self {
        Self {
            center: bounding_box.center(),
            radius: bounding_box.dimensions().length() / 2.0,
        }
    }

    /// Whether the (infinite) axis passes through the sphere
    #[inline]
    pub fn intersects_axis(&self, axis: &Axis) -> bool {
        axis.distance_to(self.center) <= self.radius + SPHERE_TOLERANCE
    }

    /// Distance from the axis to the sphere surface, negative when the axis passes inside
    #[inline]
    pub fn distance_from_axis(&self, axis: &Axis) -> f64 {
        axis.distance_to(self.center) - self.radius
    }
}

/// A 3D line used for picking, e.g. the ray under a mouse click
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    origin: DVec3,
    direction: DVec3,
}

impl Axis {
    /// Create an axis; a zero direction falls back to +Z
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(DVec3::Z),
        }
    }

    /// Vertical axis through a point, as seen by a camera looking straight down on it
    pub fn looking_down_at(point: &GeodeticPoint) -> Self {
        let vector = vector_from_geodetic(point);
        Self::new(vector.0, vector.0)
    }

    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Perpendicular distance from a point to the axis
    #[inline]
    pub fn distance_to(&self, point: DVec3) -> f64 {
        let offset = point - self.origin;
        offset.reject_from_normalized(self.direction).length()
    }
}

/// The host's shared reference point
///
/// Renderers and tools work in compact local coordinates relative to this point to
/// avoid precision loss at Earth-scale magnitudes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceFrame {
    reference: GeodeticPoint,
    origin: EarthVector,
}

impl ReferenceFrame {
    pub fn new(reference: GeodeticPoint) -> Self {
        Self {
            reference,
            origin: vector_from_geodetic(&reference),
        }
    }

    #[inline]
    pub fn reference(&self) -> &GeodeticPoint {
        &self.reference
    }

    /// Local coordinates of an Earth vector (meters from the reference point)
    #[inline]
    pub fn to_local(&self, vector: &EarthVector) -> DVec3 {
        vector.0 - self.origin.0
    }

    #[inline]
    pub fn from_local(&self, local: DVec3) -> EarthVector {
        EarthVector(local + self.origin.0)
    }

    /// Local coordinates of a geodetic point
    pub fn geodetic_to_local(&self, point: &GeodeticPoint) -> DVec3 {
        self.to_local(&vector_from_geodetic(point))
    }

    pub fn local_to_geodetic(&self, local: DVec3) -> GeodeticPoint {
        geodetic_from_vector(&self.from_local(local))
    }
}

/// Vector of a GPX waypoint
#[inline]
pub(crate) fn waypoint_to_track_point(waypoint: &gpx::Waypoint) -> TrackPoint {
    TrackPoint::from(utils::waypoint_to_geodetic(waypoint))
}
