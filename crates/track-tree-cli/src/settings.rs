use clap::{Parser, Subcommand};
use std::path::PathBuf;
use track_tree_lib::SessionConfig;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Tree - inspect and edit large GPS tracks
pub struct Settings {
    /// GPX file to load
    #[clap(value_name = "FILE")]
    pub gpx_file: PathBuf,

    /// Print results as JSON instead of text
    #[clap(long, global = true, default_value = "false")]
    pub json: bool,

    /// Tree depth used by previews away from the focus point
    #[clap(long, default_value = "10")]
    pub render_depth: usize,

    /// Radius in meters around the focus point previewed at full detail
    #[clap(long, default_value = "2000.0")]
    pub detail_radius: f64,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print length, climbing and extent of the track
    Info,

    /// Find the track point nearest to a longitude/latitude (degrees)
    #[clap(allow_negative_numbers = true)]
    Nearest { lon: f64, lat: f64 },

    /// Look up a point by index, or the point at a distance (meters) along the track
    Locate {
        #[clap(long, conflicts_with = "distance", required_unless_present = "distance")]
        index: Option<usize>,

        #[clap(long)]
        distance: Option<f64>,
    },

    /// Delete the points FROM..=TO and write the result
    Delete {
        from: usize,
        to: usize,

        /// Where to write the edited track
        #[clap(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Shift the points FROM..=TO by a local offset in meters and write the result
    #[clap(allow_negative_numbers = true)]
    Nudge {
        from: usize,
        to: usize,

        #[clap(long, default_value = "0.0")]
        east: f64,

        #[clap(long, default_value = "0.0")]
        north: f64,

        #[clap(long, default_value = "0.0")]
        up: f64,

        /// Where to write the edited track
        #[clap(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print a level-of-detail outline of the track around a focus longitude/latitude
    #[clap(allow_negative_numbers = true)]
    Preview { lon: f64, lat: f64 },
}

impl Settings {
    /// Parse from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            default_render_depth: self.render_depth,
            full_detail_radius: self.detail_radius,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nearest_with_negative_longitude() {
        let settings =
            Settings::try_parse_from(["track-tree", "ride.gpx", "nearest", "-0.1276", "51.5"])
                .unwrap();
        assert_eq!(
            settings.command,
            Command::Nearest {
                lon: -0.1276,
                lat: 51.5
            }
        );
        assert!(!settings.json);
    }

    #[test]
    fn test_parse_session_config() {
        let settings = Settings::try_parse_from([
            "track-tree",
            "ride.gpx",
            "--render-depth",
            "5",
            "--detail-radius",
            "300",
            "info",
            "--json",
        ])
        .unwrap();
        let config = settings.session_config();
        assert_eq!(config.undo_limit, SessionConfig::default().undo_limit);
        assert_eq!(config.default_render_depth, 5);
        assert_eq!(config.full_detail_radius, 300.0);
        assert!(settings.json);
    }

    #[test]
    fn test_undo_limit_is_not_a_flag() {
        assert!(
            Settings::try_parse_from(["track-tree", "ride.gpx", "--undo-limit", "5", "info"])
                .is_err()
        );
    }

    #[test]
    fn test_locate_needs_index_or_distance() {
        assert!(Settings::try_parse_from(["track-tree", "ride.gpx", "locate"]).is_err());
        assert!(
            Settings::try_parse_from([
                "track-tree", "ride.gpx", "locate", "--index", "1", "--distance", "5"
            ])
            .is_err()
        );
        let settings =
            Settings::try_parse_from(["track-tree", "ride.gpx", "locate", "--distance", "5"])
                .unwrap();
        assert_eq!(
            settings.command,
            Command::Locate {
                index: None,
                distance: Some(5.0)
            }
        );
    }

    #[test]
    fn test_parse_nudge() {
        let settings = Settings::try_parse_from([
            "track-tree", "ride.gpx", "nudge", "3", "7", "--up", "-2.5", "-o", "out.gpx",
        ])
        .unwrap();
        match settings.command {
            Command::Nudge { from, to, east, up, output, .. } => {
                assert_eq!((from, to), (3, 7));
                assert_eq!(east, 0.0);
                assert_eq!(up, -2.5);
                assert_eq!(output, PathBuf::from("out.gpx"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
