// Path queries: the entry point the room's movement system calls.
//
// `PathFinder` owns the navigation config and the cached visibility graph.
// Walkboxes stay with the room and are lent in on every call, so a query
// always sees the room's current enabled flags. A query runs:
//
// 1. Resolve the endpoints. Points outside the walkable area are clamped to
//    the nearest walkable boundary point (or rejected, if configured so).
// 2. Short-circuit: start == end gives a one-point path, and mutually
//    visible endpoints give the straight two-point path.
// 3. Otherwise fetch the cached graph (rebuilding it if the walkboxes
//    changed), overlay transient start/end nodes on it with `QueryGraph`,
//    connect each to every node it can see, and run `dijkstra`.
// 4. Map the node path back to positions, with the exact resolved start and
//    end at either end.
//
// The transient overlay is dropped when the query returns, so the cached
// graph never changes between rebuilds.
//
// Cache invalidation: the graph is keyed on a fingerprint of every walkbox's
// enabled flag and vertex count. Toggling a door rebuilds it on the next
// query. Geometry edits that keep vertex counts need `invalidate()`.
//
// See also: `nav.rs` for the graph and builder, `pathfinding.rs` for the
// search, `walkbox.rs` for containment, sight lines and clamping.
//
// **Critical constraint: determinism.** No randomness and no hash-order
// iteration; identical walkboxes and endpoints give identical paths.

use crate::config::{GraphCachePolicy, NavConfig, UnreachablePolicy};
use crate::error::NavError;
use crate::nav::{NavGraph, NavTopology, QueryGraph, build_nav_graph};
use crate::pathfinding::dijkstra;
use crate::types::{NavNodeId, Vec2};
use crate::walkbox::{WalkableArea, Walkbox};
use log::debug;

/// Computes walkable paths through a room and caches its visibility graph.
#[derive(Clone, Debug, Default)]
pub struct PathFinder {
    config: NavConfig,
    graph: Option<NavGraph>,
    /// (enabled, vertex count) per walkbox at the last rebuild.
    fingerprint: Vec<(bool, usize)>,
    rebuilds: u64,
}

impl PathFinder {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Drop the cached graph; the next query rebuilds it.
    pub fn invalidate(&mut self) {
        self.graph = None;
        self.fingerprint.clear();
    }

    /// The graph built for the most recent query, for debug drawing and
    /// inspection. `None` before the first graph-backed query or after
    /// `invalidate`.
    pub fn cached_graph(&self) -> Option<&NavGraph> {
        self.graph.as_ref()
    }

    /// How many times the graph has been built.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// The visibility graph for `walkboxes`, rebuilt if stale.
    pub fn graph(&mut self, walkboxes: &[Walkbox]) -> &NavGraph {
        let fingerprint: Vec<(bool, usize)> = walkboxes
            .iter()
            .map(|w| (w.enabled, w.vertex_count()))
            .collect();
        let stale = self.config.cache_policy == GraphCachePolicy::RebuildEveryQuery
            || fingerprint != self.fingerprint;
        if stale {
            self.graph = None;
            self.fingerprint = fingerprint;
        }

        let config = &self.config;
        let rebuilds = &mut self.rebuilds;
        self.graph.get_or_insert_with(|| {
            *rebuilds += 1;
            let graph = build_nav_graph(walkboxes, config);
            debug!(
                "rebuilt nav graph #{}: {} nodes, {} edges",
                rebuilds,
                graph.node_count(),
                graph.edge_count()
            );
            graph
        })
    }

    /// Walkable path from `start` to `end`, degrading failures per config.
    ///
    /// Never fails: unreachable targets give an empty path or a straight
    /// line (`UnreachablePolicy`), and unresolvable endpoints give an empty
    /// path.
    pub fn calculate_path(&mut self, walkboxes: &[Walkbox], start: Vec2, end: Vec2) -> Vec<Vec2> {
        match self.try_calculate_path(walkboxes, start, end) {
            Ok(path) => path,
            Err(NavError::Unreachable { start, end }) => {
                debug!("no route from {start} to {end}, applying {:?}", self.config.unreachable_policy);
                match self.config.unreachable_policy {
                    UnreachablePolicy::Empty => Vec::new(),
                    UnreachablePolicy::StraightLine => vec![start, end],
                }
            }
            Err(err) => {
                debug!("{err}; returning empty path");
                Vec::new()
            }
        }
    }

    /// Walkable path from `start` to `end`.
    ///
    /// The path begins at the resolved (possibly clamped) start, ends at the
    /// resolved end, and never repeats a point back to back.
    pub fn try_calculate_path(
        &mut self,
        walkboxes: &[Walkbox],
        start: Vec2,
        end: Vec2,
    ) -> Result<Vec<Vec2>, NavError> {
        let epsilon = self.config.boundary_epsilon;
        let area = WalkableArea::new(walkboxes, epsilon);
        let start = self.resolve_endpoint(&area, start)?;
        let end = self.resolve_endpoint(&area, end)?;

        if start.approx_eq(end, epsilon) {
            return Ok(vec![start]);
        }
        if area.line_of_sight(start, end) {
            return Ok(vec![start, end]);
        }

        let graph = self.graph(walkboxes);
        let mut query = QueryGraph::new(graph);
        let source = attach_endpoint(&mut query, &area, start, epsilon);
        let target = attach_endpoint(&mut query, &area, end, epsilon);

        let Some(result) = dijkstra(&query, source, target) else {
            return Err(NavError::Unreachable { start, end });
        };

        let inner = result
            .nodes
            .get(1..result.nodes.len().saturating_sub(1))
            .unwrap_or(&[]);
        let mut path = Vec::with_capacity(inner.len() + 2);
        path.push(start);
        for &id in inner {
            push_distinct(&mut path, query.position(id), epsilon);
        }
        if path.len() > 1 && path[path.len() - 1].approx_eq(end, epsilon) {
            path.pop();
        }
        path.push(end);
        Ok(path)
    }

    fn resolve_endpoint(&self, area: &WalkableArea<'_>, point: Vec2) -> Result<Vec2, NavError> {
        if area.contains(point) {
            return Ok(point);
        }
        if !self.config.clamp_outside_points {
            return Err(NavError::PointOutsideWalkableArea(point));
        }
        let clamped = area
            .clamp(point)
            .ok_or(NavError::PointOutsideWalkableArea(point))?;
        debug!("clamped {point} to walkable {clamped}");
        Ok(clamped)
    }
}

/// Node for a query endpoint: the graph node already at `point`, or a new
/// transient node wired to every node it can see.
fn attach_endpoint(
    query: &mut QueryGraph<'_>,
    area: &WalkableArea<'_>,
    point: Vec2,
    epsilon: f32,
) -> NavNodeId {
    let base = query.base();
    if let Some(id) = base.find_node_at(point, epsilon) {
        return id;
    }
    let id = query.add_transient_node(point);
    for node in base.nodes() {
        if area.line_of_sight(point, node.position) {
            query.connect(id, node.id);
        }
    }
    id
}

fn push_distinct(path: &mut Vec<Vec2>, p: Vec2, epsilon: f32) {
    if !path.last().is_some_and(|last| last.approx_eq(p, epsilon)) {
        path.push(p);
    }
}
