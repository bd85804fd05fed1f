//! Track Tree Library - Core Data Structures for GPS Track Editing
//!
//! This library stores a whole GPS track as an immutable, augmented, balanced binary
//! tree of road sections. Every node pre-computes aggregate geometry (bounding box,
//! bounding sphere, true length, point count, longitude span) so that positional
//! lookups, nearest-point searches and level-of-detail traversals run in O(log N),
//! and every edit is a range replacement that builds a fresh tree.
//!
//! # Architecture
//!
//! - **[`GeodeticPoint`] / [`EarthVector`]**: raw samples and their Earth-centred vectors
//! - **[`RoadSection`]**: per-node aggregate payload
//! - **[`PeteTree`]**: the balanced tree, with query and range-replace operations
//! - **[`Track`]**: host owning the single live tree and its reference frame
//! - **[`EditSession`]**: track plus undo/redo built on range replacement
//!
//! # Performance Characteristics
//!
//! - **Build Time**: O(N), one pass over the points
//! - **Index / distance queries**: O(log N)
//! - **Nearest point**: O(log N) typical, branch-and-bound
//! - **Edit**: O(N) rebuild, the old tree is dropped

mod geometry;
mod mutation;
mod query;
mod section;
mod session;
mod track;
mod traversal;
mod tree;
pub mod utils;

// Public API exports
pub use geometry::{
    Axis, BoundingBox3, BoundingSphere, EARTH_MEAN_RADIUS, EarthVector, GeodeticPoint,
    ReferenceFrame, TrackPoint, geodetic_from_vector, great_circle_length, vector_from_geodetic,
};
pub use section::{LongitudeSpan, RoadSection};
pub use session::{EditSession, SessionConfig};
pub use track::{RangeEdit, Track, TrackInfo};
pub use tree::PeteTree;

/// Error types for the track layer
///
/// The tree itself never fails: construction and rebuilds signal a degenerate track
/// through `None`. These errors belong to the hosts that load, validate and edit tracks.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A track needs at least 2 points, found {found}")]
    TooFewPoints { found: usize },

    #[error("Point index {index} out of range (last index is {max})")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("Invalid edit range: keeping {from_start} leading and {from_end} trailing points of {point_count}")]
    InvalidRange {
        from_start: usize,
        from_end: usize,
        point_count: usize,
    },

    #[error("Edit refused: the track would have fewer than 2 points")]
    EditWouldDestroyTrack,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

pub type Result<T> = std::result::Result<T, TrackError>;
