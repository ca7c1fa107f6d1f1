// Error types for the navigation engine.
//
// Nothing here is fatal to the caller's movement logic: `PathFinder`'s
// infallible entry point turns every variant into a best-effort path. The
// fallible entry point (`PathFinder::try_calculate_path`) surfaces them for
// callers that want to react, e.g. by playing a "can't get there" line.

use crate::types::Vec2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// The search exhausted the graph without reaching the end point.
    #[error("no walkable route from {start} to {end}")]
    Unreachable { start: Vec2, end: Vec2 },

    /// A walkbox with too few vertices (or non-finite ones) to form an area.
    #[error("walkbox {index} is degenerate ({vertex_count} vertices)")]
    DegenerateWalkbox { index: usize, vertex_count: usize },

    /// A query point lies outside every walkable polygon and could not be
    /// clamped (clamping disabled, or nothing is walkable).
    #[error("point {0} is outside the walkable area")]
    PointOutsideWalkableArea(Vec2),

    /// Malformed `NavConfig` JSON.
    #[error("invalid navigation config: {0}")]
    Config(#[from] serde_json::Error),
}
