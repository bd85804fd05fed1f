//! Track host: owns the single live tree for one GPS track
//!
//! This module provides the `Track` struct, which loads GPX data into a
//! [`PeteTree`], validates caller input before it reaches the tree, and swaps in
//! the rebuilt tree after each successful edit.

use crate::geometry::{
    Axis, GeodeticPoint, ReferenceFrame, TrackPoint, waypoint_to_track_point,
};
use crate::{PeteTree, Result, TrackError, utils};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A range replacement request
///
/// Keep `from_start` leading points and `from_end` trailing points, and put `points`
/// in between. See [`PeteTree::replace_range`].
#[derive(Clone, Debug, PartialEq)]
pub struct RangeEdit {
    pub from_start: usize,
    pub from_end: usize,
    pub points: Vec<GeodeticPoint>,
}

impl RangeEdit {
    /// Delete the points `from..=to` of a track with `point_count` points
    pub fn delete(from: usize, to: usize, point_count: usize) -> Self {
        Self {
            from_start: from,
            from_end: point_count.saturating_sub(to + 1),
            points: Vec::new(),
        }
    }

    /// Replace the points `from..=to` of a track with `point_count` points
    pub fn replace(from: usize, to: usize, point_count: usize, points: Vec<GeodeticPoint>) -> Self {
        Self {
            from_start: from,
            from_end: point_count.saturating_sub(to + 1),
            points,
        }
    }
}

/// Summary figures for a track
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackInfo {
    pub name: Option<String>,
    pub point_count: usize,
    /// Total great-circle length in meters
    pub total_length_m: f64,
    pub altitude_gained_m: f64,
    pub altitude_lost_m: f64,
    /// Steepest segment gradient in percent
    pub steepest_climb_pct: f64,
    /// Latitude / longitude extent in degrees; `west_lon > east_lon` across the antimeridian
    pub min_lat: f64,
    pub max_lat: f64,
    pub west_lon: f64,
    pub east_lon: f64,
}

/// A single editable GPS track
#[derive(Clone, Debug)]
pub struct Track {
    name: Option<String>,
    tree: PeteTree,
    /// Local coordinate origin shared by every consumer of this track
    reference: ReferenceFrame,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Create a track from geodetic points
    ///
    /// The first point becomes the reference for local coordinates.
    pub fn new(name: Option<String>, points: &[GeodeticPoint]) -> Result<Self> {
        let tree = PeteTree::from_geodetic(points).ok_or(TrackError::TooFewPoints {
            found: points.len(),
        })?;
        Ok(Self {
            name,
            reference: ReferenceFrame::new(points[0]),
            tree,
        })
    }

    /// Create a track from parsed GPX data
    ///
    /// All track segments are joined in file order into one line. Files without
    /// tracks fall back to their routes. Points with unusable coordinates are skipped.
    pub fn from_gpx(gpx_data: &gpx::Gpx) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::from_gpx");

        let waypoints: Vec<&gpx::Waypoint> = if gpx_data.tracks.is_empty() {
            gpx_data.routes.iter().flat_map(|route| &route.points).collect()
        } else {
            gpx_data
                .tracks
                .iter()
                .flat_map(|track| &track.segments)
                .flat_map(|segment| &segment.points)
                .collect()
        };

        let mut points = Vec::with_capacity(waypoints.len());
        for waypoint in waypoints {
            let (lat, lon) = (waypoint.point().y(), waypoint.point().x());
            if !utils::is_valid_coordinate(lat, lon) {
                tracing::warn!("Skipping point with invalid coordinates: ({}, {})", lat, lon);
                continue;
            }
            points.push(waypoint_to_track_point(waypoint));
        }

        let found = points.len();
        let reference = ReferenceFrame::new(
            points
                .first()
                .ok_or(TrackError::TooFewPoints { found })?
                .geodetic,
        );
        let tree = PeteTree::build(points).ok_or(TrackError::TooFewPoints { found })?;

        let name = gpx_data
            .tracks
            .iter()
            .find_map(|track| track.name.clone())
            .or_else(|| gpx_data.metadata.as_ref().and_then(|m| m.name.clone()));

        tracing::info!(
            "Loaded track {:?}: {} points, {:.1} m",
            name,
            found,
            tree.true_length()
        );
        Ok(Self {
            name,
            tree,
            reference,
        })
    }

    /// Load a track from a GPX file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);
        Self::from_gpx(&gpx::read(reader)?)
    }

    /// GPX document with one track and one segment holding every point
    pub fn to_gpx(&self) -> gpx::Gpx {
        let mut segment = gpx::TrackSegment::default();
        segment.points = self
            .tree
            .extract_points_in_range(0, self.last_index())
            .iter()
            .map(|point| utils::geodetic_to_waypoint(&point.geodetic))
            .collect();
        let track = gpx::Track {
            name: self.name.clone(),
            segments: vec![segment],
            ..Default::default()
        };
        gpx::Gpx {
            version: gpx::GpxVersion::Gpx11,
            creator: Some(env!("CARGO_PKG_NAME").to_string()),
            tracks: vec![track],
            ..Default::default()
        }
    }

    /// Write the track to a GPX file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        gpx::write(&self.to_gpx(), writer)?;
        Ok(())
    }

    #[inline]
    pub fn tree(&self) -> &PeteTree {
        &self.tree
    }

    #[inline]
    pub fn reference_frame(&self) -> &ReferenceFrame {
        &self.reference
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.tree.skip_count() + 1
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.tree.skip_count()
    }

    /// Total great-circle length in meters
    #[inline]
    pub fn total_length(&self) -> f64 {
        self.tree.true_length()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index > self.last_index() {
            return Err(TrackError::IndexOutOfRange {
                index,
                max: self.last_index(),
            });
        }
        Ok(())
    }

    pub fn point(&self, index: usize) -> Result<TrackPoint> {
        self.check_index(index)?;
        Ok(self.tree.point_at_index(index))
    }

    /// Distance in meters from the start of the track to point `index`
    pub fn distance_from_index(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.tree.distance_from_index(index))
    }

    /// Point at or before `distance` meters along the track, clamped to the track
    #[inline]
    pub fn index_from_distance(&self, distance: f64) -> usize {
        self.tree.index_from_distance(distance)
    }

    #[inline]
    pub fn nearest_to_lon_lat(&self, query: &GeodeticPoint) -> usize {
        self.tree.nearest_to_lon_lat(query)
    }

    #[inline]
    pub fn nearest_to_ray(&self, axis: &Axis) -> usize {
        self.tree.nearest_to_ray(axis)
    }

    /// Points `from..=to`, both indices checked
    pub fn extract(&self, from: usize, to: usize) -> Result<Vec<TrackPoint>> {
        self.check_index(from)?;
        self.check_index(to)?;
        Ok(self.tree.extract_points_in_range(from, to))
    }

    /// Apply a range edit, returning the points it replaced
    ///
    /// On success the new tree replaces the current one. When the edit would leave
    /// fewer than 2 points the track is left unchanged.
    pub fn apply(&mut self, edit: &RangeEdit) -> Result<Vec<TrackPoint>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::apply");

        let point_count = self.point_count();
        let kept = edit.from_start.checked_add(edit.from_end);
        if kept.is_none_or(|kept| kept > point_count) {
            return Err(TrackError::InvalidRange {
                from_start: edit.from_start,
                from_end: edit.from_end,
                point_count,
            });
        }

        let tree = self
            .tree
            .replace_range(edit.from_start, edit.from_end, &edit.points)
            .ok_or(TrackError::EditWouldDestroyTrack)?;

        // Empty when the edit is a pure insertion
        let replaced = match (point_count - edit.from_end).checked_sub(1) {
            Some(to) => self.tree.extract_points_in_range(edit.from_start, to),
            None => Vec::new(),
        };

        tracing::debug!(
            "Applied edit: {} points replaced by {}, {} -> {} points",
            replaced.len(),
            edit.points.len(),
            point_count,
            tree.skip_count() + 1
        );
        self.tree = tree;
        Ok(replaced)
    }

    /// Summary figures, computed from the root aggregate and one pass over the leaves
    pub fn info(&self) -> TrackInfo {
        let root = self.tree.info();
        let (min_lat, max_lat) = self.tree.fold_over_route(
            |section, (min, max): (f64, f64)| {
                let lat = section.end.geodetic.latitude_degrees();
                (min.min(lat), max.max(lat))
            },
            {
                let lat = root.start.geodetic.latitude_degrees();
                (lat, lat)
            },
        );

        TrackInfo {
            name: self.name.clone(),
            point_count: self.point_count(),
            total_length_m: root.true_length,
            altitude_gained_m: root.altitude_gained,
            altitude_lost_m: root.altitude_lost,
            steepest_climb_pct: root.steepest_climb,
            min_lat,
            max_lat,
            west_lon: root.longitude_span.west_edge().to_degrees(),
            east_lon: root.longitude_span.east_edge().to_degrees(),
        }
    }
}
