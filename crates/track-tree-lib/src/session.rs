//! EditSession - a track plus undo/redo history and level-of-detail previews
//!
//! Every edit is a [`RangeEdit`]. The inverse of an edit is another range edit with
//! the same kept counts and the replaced points as its payload, so undo and redo go
//! through the same rebuild path as the edit itself.

use crate::geometry::{GeodeticPoint, vector_from_geodetic};
use crate::{RangeEdit, Result, Track, TrackError};
use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration for an editing session
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Maximum number of edits kept for undo (default 50). Zero disables history.
    pub undo_limit: usize,
    /// Tree depth at which previews stop descending away from the focus (default 10)
    pub default_render_depth: usize,
    /// Sections within this many meters of the focus are previewed at full detail
    /// (default 2000)
    pub full_detail_radius: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo_limit: 50,
            default_render_depth: 10,
            full_detail_radius: 2000.0,
        }
    }
}

/// An applied edit and the edit that reverts it
#[derive(Debug, Clone)]
struct HistoryEntry {
    forward: RangeEdit,
    inverse: RangeEdit,
}

/// A track being edited
#[derive(Debug, Clone)]
pub struct EditSession {
    track: Track,
    config: SessionConfig,
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl EditSession {
    pub fn new(track: Track, config: SessionConfig) -> Self {
        Self {
            track,
            config,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    #[inline]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Give up the session, keeping the edited track
    pub fn into_track(self) -> Track {
        self.track
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Apply an edit and record it for undo
    ///
    /// A refused edit leaves both the track and the history untouched.
    pub fn apply(&mut self, edit: RangeEdit) -> Result<()> {
        let replaced = self.track.apply(&edit)?;
        let inverse = RangeEdit {
            from_start: edit.from_start,
            from_end: edit.from_end,
            points: replaced.iter().map(|point| point.geodetic).collect(),
        };

        self.redo.clear();
        self.push_undo(HistoryEntry {
            forward: edit,
            inverse,
        });
        Ok(())
    }

    /// Revert the most recent edit
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo.pop_back().ok_or(TrackError::NothingToUndo)?;
        if let Err(err) = self.track.apply(&entry.inverse) {
            self.undo.push_back(entry);
            return Err(err);
        }
        self.redo.push(entry);
        tracing::debug!("Undo: {} undo / {} redo entries", self.undo.len(), self.redo.len());
        Ok(())
    }

    /// Re-apply the most recently undone edit
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.redo.pop().ok_or(TrackError::NothingToRedo)?;
        if let Err(err) = self.track.apply(&entry.forward) {
            self.redo.push(entry);
            return Err(err);
        }
        self.push_undo(entry);
        Ok(())
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        if self.config.undo_limit == 0 {
            return;
        }
        self.undo.push_back(entry);
        while self.undo.len() > self.config.undo_limit {
            self.undo.pop_front();
        }
    }

    /// Simplified outline of the whole track in local coordinates
    ///
    /// Sections whose bounding sphere comes within `full_detail_radius` of `focus` are
    /// expanded down to single segments; the rest stop at `default_render_depth`. The
    /// result holds the start of every emitted section plus the final point.
    pub fn preview(&self, focus: &GeodeticPoint) -> Vec<DVec3> {
        #[cfg(feature = "profiling")]
        profiling::scope!("session::preview");

        let tree = self.track.tree();
        let frame = self.track.reference_frame();
        let focus = vector_from_geodetic(focus).0;
        let radius = self.config.full_detail_radius;
        let depth = self.config.default_render_depth;

        let mut outline = tree.traverse_between_limits_to_depth(
            0,
            tree.skip_count(),
            |section| {
                if section.sphere.center.distance(focus) - section.sphere.radius <= radius {
                    None
                } else {
                    Some(depth)
                }
            },
            |section, mut acc: Vec<DVec3>| {
                acc.push(frame.to_local(&section.start.vector));
                acc
            },
            Vec::new(),
        );
        outline.push(frame.to_local(&tree.info().end.vector));
        outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::{equator_points, wiggly_points};

    fn session(points: &[GeodeticPoint], config: SessionConfig) -> EditSession {
        EditSession::new(Track::new(None, points).unwrap(), config)
    }

    fn geodetic_points(session: &EditSession) -> Vec<GeodeticPoint> {
        let track = session.track();
        track
            .extract(0, track.last_index())
            .unwrap()
            .iter()
            .map(|point| point.geodetic)
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.undo_limit, 50);
        assert_eq!(config.default_render_depth, 10);
        assert_eq!(config.full_detail_radius, 2000.0);
    }

    #[test]
    fn test_undo_restores_the_track() {
        let points = wiggly_points(20);
        let mut session = session(&points, SessionConfig::default());
        assert!(!session.can_undo());

        session.apply(RangeEdit::delete(3, 9, 20)).unwrap();
        assert_eq!(session.track().point_count(), 13);
        assert!(session.can_undo());

        session.undo().unwrap();
        assert_eq!(session.track().point_count(), 20);
        assert_eq!(geodetic_points(&session), points);
        assert!(session.can_redo());

        session.redo().unwrap();
        assert_eq!(session.track().point_count(), 13);
    }

    #[test]
    fn test_undo_insertion_and_replacement() {
        let points = equator_points(6, 10.0);
        let mut session = session(&points, SessionConfig::default());

        let extra = wiggly_points(4);
        session.apply(RangeEdit::replace(2, 3, 6, extra.clone())).unwrap();
        session
            .apply(RangeEdit {
                from_start: 1,
                from_end: 7,
                points: extra,
            })
            .unwrap();
        assert_eq!(session.track().point_count(), 12);

        session.undo().unwrap();
        assert_eq!(session.track().point_count(), 8);
        session.undo().unwrap();
        assert_eq!(geodetic_points(&session), points);
        assert!(matches!(session.undo(), Err(TrackError::NothingToUndo)));
    }

    #[test]
    fn test_undo_delete_of_first_point_with_debug_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let points = equator_points(5, 10.0);
            let mut session = session(&points, SessionConfig::default());

            session.apply(RangeEdit::delete(0, 0, 5)).unwrap();
            assert_eq!(session.track().point_count(), 4);

            // The inverse is an insertion before the first kept point
            session.undo().unwrap();
            assert_eq!(geodetic_points(&session), points);

            session.redo().unwrap();
            assert_eq!(geodetic_points(&session), points[1..].to_vec());
        });
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut session = session(&wiggly_points(10), SessionConfig::default());

        session.apply(RangeEdit::delete(2, 2, 10)).unwrap();
        session.undo().unwrap();
        session.apply(RangeEdit::delete(5, 5, 10)).unwrap();
        assert!(matches!(session.redo(), Err(TrackError::NothingToRedo)));
    }

    #[test]
    fn test_refused_edit_keeps_history() {
        let mut session = session(&equator_points(4, 10.0), SessionConfig::default());

        session.apply(RangeEdit::delete(1, 1, 4)).unwrap();
        let result = session.apply(RangeEdit::delete(0, 2, 3));
        assert!(matches!(result, Err(TrackError::EditWouldDestroyTrack)));
        assert_eq!(session.track().point_count(), 3);

        session.undo().unwrap();
        assert_eq!(session.track().point_count(), 4);
    }

    #[test]
    fn test_undo_limit() {
        let config = SessionConfig {
            undo_limit: 2,
            ..Default::default()
        };
        let mut session = session(&wiggly_points(10), config);

        for _ in 0..4 {
            let count = session.track().point_count();
            session.apply(RangeEdit::delete(1, 1, count)).unwrap();
        }
        assert_eq!(session.track().point_count(), 6);

        session.undo().unwrap();
        session.undo().unwrap();
        assert!(session.undo().is_err());
        assert_eq!(session.track().point_count(), 8);
    }

    #[test]
    fn test_preview_detail_follows_focus() {
        let points = wiggly_points(257);
        let config = SessionConfig {
            default_render_depth: 3,
            full_detail_radius: 50.0,
            ..Default::default()
        };
        let session = session(&points, config);
        let frame = *session.track().reference_frame();

        // Far from everything: 2^3 sections plus the final point
        let far = GeodeticPoint::from_degrees(100.0, -40.0, 0.0);
        let coarse = session.preview(&far);
        assert_eq!(coarse.len(), 9);
        assert!(coarse[0].length() < 1e-6);
        assert!((coarse[8] - frame.geodetic_to_local(&points[256])).length() < 1e-6);

        // Focused on the start: full detail there, so more points
        let near = session.preview(&points[0]);
        assert!(near.len() > coarse.len());
        assert!((near[1] - frame.geodetic_to_local(&points[1])).length() < 1e-6);

        // A huge radius expands everything
        let everything = EditSession::new(
            session.track().clone(),
            SessionConfig {
                full_detail_radius: 1.0e9,
                ..Default::default()
            },
        );
        assert_eq!(everything.preview(&far).len(), 257);
    }
}
