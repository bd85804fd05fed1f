//! Command execution
//!
//! Each command produces a serializable report. Reports print as pretty JSON with
//! `--json`, otherwise as a short text summary.

use crate::{Command, Result, Settings};
use serde::Serialize;
use std::path::Path;
use track_tree_lib::{
    EARTH_MEAN_RADIUS, EditSession, GeodeticPoint, RangeEdit, Track, TrackInfo, TrackPoint,
};

/// A single track point with its position along the track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointReport {
    pub index: usize,
    pub distance_m: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

/// Outcome of an edit written to disk
#[derive(Debug, Clone, Serialize)]
pub struct EditReport {
    pub output: String,
    pub replaced_points: usize,
    pub info: TrackInfo,
}

/// Level-of-detail outline in meters relative to the first point of the track
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub reference: GeodeticPoint,
    pub points: Vec<[f64; 3]>,
}

/// Load the track named in the settings and run the selected command
pub fn run(settings: &Settings) -> Result<()> {
    let track = Track::load(&settings.gpx_file)?;
    let mut session = EditSession::new(track, settings.session_config());

    match &settings.command {
        Command::Info => {
            let info = session.track().info();
            emit(settings.json, &info, describe_info)
        }
        Command::Nearest { lon, lat } => {
            let query = GeodeticPoint::from_degrees(*lon, *lat, 0.0);
            let index = session.track().nearest_to_lon_lat(&query);
            let report = point_report(session.track(), index)?;
            emit(settings.json, &report, describe_point)
        }
        Command::Locate { index, distance } => {
            let index = match (index, distance) {
                (Some(index), _) => *index,
                (None, Some(distance)) => session.track().index_from_distance(*distance),
                (None, None) => 0,
            };
            let report = point_report(session.track(), index)?;
            emit(settings.json, &report, describe_point)
        }
        Command::Delete { from, to, output } => {
            let point_count = session.track().point_count();
            let replaced = session.track().extract(*from, *to)?.len();
            session.apply(RangeEdit::delete(*from, *to, point_count))?;
            let report = save(session.track(), output, replaced)?;
            emit(settings.json, &report, describe_edit)
        }
        Command::Nudge {
            from,
            to,
            east,
            north,
            up,
            output,
        } => {
            let point_count = session.track().point_count();
            let moved: Vec<GeodeticPoint> = session
                .track()
                .extract(*from, *to)?
                .iter()
                .map(|point| nudged(&point.geodetic, *east, *north, *up))
                .collect();
            let replaced = moved.len();
            session.apply(RangeEdit::replace(*from, *to, point_count, moved))?;
            let report = save(session.track(), output, replaced)?;
            emit(settings.json, &report, describe_edit)
        }
        Command::Preview { lon, lat } => {
            let focus = GeodeticPoint::from_degrees(*lon, *lat, 0.0);
            let report = PreviewReport {
                reference: *session.track().reference_frame().reference(),
                points: session
                    .preview(&focus)
                    .into_iter()
                    .map(|local| local.to_array())
                    .collect(),
            };
            emit(settings.json, &report, |report| {
                format!("{} outline points around the focus", report.points.len())
            })
        }
    }
}

fn emit<T: Serialize>(json: bool, report: &T, describe: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", describe(report));
    }
    Ok(())
}

fn point_report(track: &Track, index: usize) -> Result<PointReport> {
    let TrackPoint { geodetic, .. } = track.point(index)?;
    Ok(PointReport {
        index,
        distance_m: track.distance_from_index(index)?,
        longitude: geodetic.longitude_degrees(),
        latitude: geodetic.latitude_degrees(),
        altitude: geodetic.altitude,
    })
}

fn save(track: &Track, output: &Path, replaced_points: usize) -> Result<EditReport> {
    track.save(output)?;
    tracing::info!("Wrote {} points to {}", track.point_count(), output.display());
    Ok(EditReport {
        output: output.display().to_string(),
        replaced_points,
        info: track.info(),
    })
}

/// Move a point by a local east/north/up offset in meters
fn nudged(point: &GeodeticPoint, east: f64, north: f64, up: f64) -> GeodeticPoint {
    let radius = EARTH_MEAN_RADIUS + point.altitude;
    let parallel_radius = radius * point.latitude.cos();
    let longitude_shift = if parallel_radius > 0.0 {
        east / parallel_radius
    } else {
        0.0
    };
    GeodeticPoint::new(
        point.longitude + longitude_shift,
        point.latitude + north / radius,
        point.altitude + up,
    )
}

fn describe_info(info: &TrackInfo) -> String {
    format!(
        "{}: {} points, {:.1} km, +{:.0} m / -{:.0} m, steepest {:.1}%, lat {:.5}..{:.5}, lon {:.5}..{:.5}",
        info.name.as_deref().unwrap_or("(unnamed)"),
        info.point_count,
        info.total_length_m / 1000.0,
        info.altitude_gained_m,
        info.altitude_lost_m,
        info.steepest_climb_pct,
        info.min_lat,
        info.max_lat,
        info.west_lon,
        info.east_lon
    )
}

fn describe_point(point: &PointReport) -> String {
    format!(
        "#{} at {:.1} m: lon {:.6}, lat {:.6}, alt {:.1} m",
        point.index, point.distance_m, point.longitude, point.latitude, point.altitude
    )
}

fn describe_edit(edit: &EditReport) -> String {
    format!(
        "Replaced {} points, wrote {} points ({:.1} km) to {}",
        edit.replaced_points,
        edit.info.point_count,
        edit.info.total_length_m / 1000.0,
        edit.output
    )
}
