// mossfen_nav: walkbox navigation for Mossfen rooms.
//
// Given a room's walkable polygons ("walkboxes") and two points, this crate
// computes the waypoints an actor walks through to get from one to the
// other. It knows nothing about rendering, scripting, or room loading: the
// room lends its walkboxes in and gets a `Vec<Vec2>` back.
//
// Module overview:
// - `types.rs`:          Vec2 room coordinates, NavNodeId.
// - `geometry.rs`:       Segment/line/polygon primitives and bounding boxes.
// - `walkbox.rs`:        Walkbox data model + WalkableArea (containment, line of sight, clamping).
// - `priority_queue.rs`: IndexedPriorityQueue, the sorted-vector Dijkstra frontier.
// - `nav.rs`:            Visibility graph, per-query overlay, and graph construction from walkboxes.
// - `pathfinding.rs`:    Dijkstra shortest-path search over the nav graph.
// - `finder.rs`:         PathFinder, the cached graph + the `calculate_path` entry point.
// - `funnel.rs`:         Funnel string pulling through walkbox portals.
// - `config.rs`:         NavConfig: tolerances, clamping, degradation and cache policy.
// - `error.rs`:          NavError.
//
// The `navdump` binary (`main.rs`) runs queries against a room JSON file and
// dumps paths or the visibility graph for external tools to draw.
//
// **Critical constraint: determinism.** Navigation is a pure function of the
// walkboxes, config and endpoints. No randomness, no system time, and no
// iteration over hash maps.

pub mod config;
pub mod error;
pub mod finder;
pub mod funnel;
pub mod geometry;
pub mod nav;
pub mod pathfinding;
pub mod priority_queue;
pub mod types;
pub mod walkbox;

pub use config::{GraphCachePolicy, NavConfig, UnreachablePolicy};
pub use error::NavError;
pub use finder::PathFinder;
pub use funnel::{Portal, corridor_portals, string_pull};
pub use nav::{NavGraph, build_nav_graph};
pub use pathfinding::path_length;
pub use types::{NavNodeId, Vec2};
pub use walkbox::{WalkableArea, Walkbox, set_enabled_by_name};
