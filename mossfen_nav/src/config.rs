// Data-driven navigation configuration.
//
// All tunable navigation parameters live in `NavConfig`, loaded from JSON
// alongside the rest of the room/engine settings. The engine never mutates
// it. Missing fields fall back to `NavConfig::default()`, so a room can
// override just the tolerance, say, without restating everything.
//
// See also: `finder.rs` which owns a `NavConfig` inside `PathFinder`,
// `walkbox.rs` for how `boundary_epsilon` shapes containment tests.
//
// **Critical constraint: determinism.** Config values feed directly into
// graph construction and path search. Identical configs and walkboxes give
// identical graphs and paths.

use crate::error::NavError;
use serde::{Deserialize, Serialize};

/// What the infallible `PathFinder::calculate_path` returns when no route
/// exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnreachablePolicy {
    /// Return an empty path; the actor stays put.
    #[default]
    Empty,
    /// Return the straight segment from start to end and let the movement
    /// system deal with it.
    StraightLine,
}

/// When the cached visibility graph is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphCachePolicy {
    /// Reuse the graph until an enabled flag (or the walkbox set) changes,
    /// or until `PathFinder::invalidate` is called.
    #[default]
    CacheUntilChanged,
    /// Rebuild on every query. Correctness fallback for rooms that mutate
    /// walkboxes behind the engine's back; O(V²) per query.
    RebuildEveryQuery,
}

/// Navigation parameters. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Points closer than this are the same position (node reuse, start ==
    /// end), and points this close to a walkbox edge count as on it. Room
    /// units.
    pub boundary_epsilon: f32,

    /// Move query endpoints that fall outside the walkable area onto the
    /// nearest walkable boundary point. When false such queries fail with
    /// `PointOutsideWalkableArea`.
    pub clamp_outside_points: bool,

    /// Degradation for unreachable targets in `calculate_path`.
    pub unreachable_policy: UnreachablePolicy,

    /// Cache behaviour for the visibility graph.
    pub cache_policy: GraphCachePolicy,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            boundary_epsilon: 0.01,
            clamp_outside_points: true,
            unreachable_policy: UnreachablePolicy::Empty,
            cache_policy: GraphCachePolicy::CacheUntilChanged,
        }
    }
}

impl NavConfig {
    /// Parse a config from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Ok(serde_json::from_str(json)?)
    }
}
