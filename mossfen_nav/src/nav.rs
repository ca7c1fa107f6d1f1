// Visibility graph for walkbox navigation.
//
// The nav graph is a set of `NavNode`s (positions) connected by undirected,
// distance-weighted `NavEdge`s stored as mirrored pairs in per-node adjacency
// lists. It is built from the room's walkboxes by `build_nav_graph()` and
// searched by `pathfinding.rs`.
//
// Nodes are the corners a shortest path can bend around: every vertex of
// every enabled walkbox plus the pivot vertices of disabled ones (holes).
// Two nodes are joined when the straight segment between them stays inside
// the walkable area (`WalkableArea::line_of_sight`).
//
// Queries never touch the built graph. `QueryGraph` borrows it and appends
// the per-query start/end nodes and their edges in side arrays, which are
// dropped with the query.
//
// All storage uses `Vec` indexed by `NavNodeId` for O(1) lookup and
// deterministic iteration order. The one hash map (vertex de-duplication
// during the build) is only probed, never iterated.
//
// See also: `walkbox.rs` for the line-of-sight test, `pathfinding.rs` for the
// Dijkstra search over `NavTopology`, `finder.rs` which caches the `NavGraph`.
//
// **Critical constraint: determinism.** Node IDs are assigned in walkbox
// order, then vertex order. Edges are tested in ascending (i, j) order, so
// adjacency lists come out identical for identical walkboxes.

use crate::config::NavConfig;
use crate::types::{NavNodeId, Vec2};
use crate::walkbox::{WalkableArea, Walkbox};
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A node in the navigation graph: a position an actor can walk through.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavNode {
    pub id: NavNodeId,
    pub position: Vec2,
}

/// A directed half of an undirected edge. `from` always equals the node
/// whose adjacency list holds it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavEdge {
    pub from: NavNodeId,
    pub to: NavNodeId,
    /// Euclidean distance between the two node positions.
    pub cost: f32,
}

/// Read access shared by the cached graph and the per-query overlay, so the
/// search runs on either.
pub trait NavTopology {
    fn node_count(&self) -> usize;

    fn position(&self, id: NavNodeId) -> Vec2;

    /// Outgoing edges of `id`, in insertion order.
    fn edges_from(&self, id: NavNodeId) -> impl Iterator<Item = &NavEdge>;
}

/// The navigation graph container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavGraph {
    nodes: Vec<NavNode>,
    /// `edges[i]` holds only edges with `from == i`; each has a mirror in
    /// `edges[to]`.
    edges: Vec<SmallVec<[NavEdge; 8]>>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the given position. Returns its ID.
    pub fn add_node(&mut self, position: Vec2) -> NavNodeId {
        let id = NavNodeId(self.nodes.len() as u32);
        self.nodes.push(NavNode { id, position });
        self.edges.push(SmallVec::new());
        id
    }

    /// Add an undirected edge weighted by the Euclidean distance between the
    /// two nodes. Returns false (and changes nothing) for self-loops and for
    /// pairs that are already connected.
    pub fn add_edge(&mut self, a: NavNodeId, b: NavNodeId) -> bool {
        let cost = self.node(a).position.distance(self.node(b).position);
        self.add_edge_with_cost(a, b, cost)
    }

    /// Like `add_edge`, with an explicit non-negative cost.
    pub fn add_edge_with_cost(&mut self, a: NavNodeId, b: NavNodeId, cost: f32) -> bool {
        if a == b || self.has_edge(a, b) {
            return false;
        }
        let cost = cost.max(0.0);
        self.edges[a.index()].push(NavEdge { from: a, to: b, cost });
        self.edges[b.index()].push(NavEdge { from: b, to: a, cost });
        true
    }

    pub fn has_edge(&self, a: NavNodeId, b: NavNodeId) -> bool {
        self.edges[a.index()].iter().any(|e| e.to == b)
    }

    /// Sum of edge costs along `path`, or `None` if two consecutive nodes
    /// are not joined by an edge.
    pub fn path_cost(&self, path: &[NavNodeId]) -> Option<f32> {
        path.windows(2).try_fold(0.0, |total, pair| {
            let edge = self.edges.get(pair[0].index())?.iter().find(|e| e.to == pair[1])?;
            Some(total + edge.cost)
        })
    }

    /// Get a node by ID.
    pub fn node(&self, id: NavNodeId) -> &NavNode {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    /// Get all edges originating from a node.
    pub fn edges(&self, id: NavNodeId) -> &[NavEdge] {
        &self.edges[id.index()]
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges (each mirrored pair counts once).
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|e| e.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node sitting at `position` (within `epsilon`), if any. Lowest ID
    /// wins when several qualify.
    pub fn find_node_at(&self, position: Vec2, epsilon: f32) -> Option<NavNodeId> {
        self.nodes
            .iter()
            .find(|n| n.position.approx_eq(position, epsilon))
            .map(|n| n.id)
    }
}

impl NavTopology for NavGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn position(&self, id: NavNodeId) -> Vec2 {
        self.nodes[id.index()].position
    }

    fn edges_from(&self, id: NavNodeId) -> impl Iterator<Item = &NavEdge> {
        self.edges[id.index()].iter()
    }
}

// ---------------------------------------------------------------------------
// Per-query overlay
// ---------------------------------------------------------------------------

/// A cached `NavGraph` plus transient nodes for one query.
///
/// Transient nodes get IDs after the base graph's. Their edges, and the
/// mirror halves hanging off base nodes, live in the overlay's own arrays;
/// the base graph is only borrowed.
#[derive(Clone, Debug)]
pub struct QueryGraph<'g> {
    base: &'g NavGraph,
    extra_nodes: SmallVec<[Vec2; 2]>,
    extra_edges: SmallVec<[Vec<NavEdge>; 2]>,
    /// Edges from base nodes to transient ones, indexed by base node.
    /// Sized lazily on the first connection.
    spliced: Vec<SmallVec<[NavEdge; 2]>>,
}

impl<'g> QueryGraph<'g> {
    pub fn new(base: &'g NavGraph) -> Self {
        Self {
            base,
            extra_nodes: SmallVec::new(),
            extra_edges: SmallVec::new(),
            spliced: Vec::new(),
        }
    }

    pub fn base(&self) -> &'g NavGraph {
        self.base
    }

    /// Add a node that exists only for this query.
    pub fn add_transient_node(&mut self, position: Vec2) -> NavNodeId {
        let id = NavNodeId((self.base.node_count() + self.extra_nodes.len()) as u32);
        self.extra_nodes.push(position);
        self.extra_edges.push(Vec::new());
        id
    }

    pub fn is_transient(&self, id: NavNodeId) -> bool {
        id.index() >= self.base.node_count()
    }

    /// Connect two nodes, at least one of them transient, with a
    /// distance-weighted edge. Same idempotence rules as
    /// `NavGraph::add_edge`; base-to-base pairs are refused.
    pub fn connect(&mut self, a: NavNodeId, b: NavNodeId) -> bool {
        if a == b || (!self.is_transient(a) && !self.is_transient(b)) {
            return false;
        }
        if self.edges_from(a).any(|e| e.to == b) {
            return false;
        }
        let cost = self.position(a).distance(self.position(b));
        self.push_half(NavEdge { from: a, to: b, cost });
        self.push_half(NavEdge { from: b, to: a, cost });
        true
    }

    fn push_half(&mut self, edge: NavEdge) {
        let n = self.base.node_count();
        let i = edge.from.index();
        if i >= n {
            self.extra_edges[i - n].push(edge);
        } else {
            if self.spliced.len() < n {
                self.spliced.resize_with(n, SmallVec::new);
            }
            self.spliced[i].push(edge);
        }
    }
}

impl NavTopology for QueryGraph<'_> {
    fn node_count(&self) -> usize {
        self.base.node_count() + self.extra_nodes.len()
    }

    fn position(&self, id: NavNodeId) -> Vec2 {
        let n = self.base.node_count();
        let i = id.index();
        if i < n {
            self.base.node(id).position
        } else {
            self.extra_nodes[i - n]
        }
    }

    fn edges_from(&self, id: NavNodeId) -> impl Iterator<Item = &NavEdge> {
        let n = self.base.node_count();
        let i = id.index();
        let empty: &[NavEdge] = &[];
        if i < n {
            let spliced = self.spliced.get(i).map_or(empty, |s| s.as_slice());
            self.base.edges(id).iter().chain(spliced.iter())
        } else {
            empty.iter().chain(self.extra_edges[i - n].iter())
        }
    }
}

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

/// Build a visibility graph from the room's walkboxes.
///
/// 1. **Validation**: walkboxes with fewer than 3 vertices are logged and
///    skipped.
/// 2. **Nodes**: every vertex of every enabled walkbox, then every pivot
///    vertex of every disabled walkbox (`Walkbox::pivot_vertices`), in room
///    order. Vertices shared by adjacent walkboxes become one node, and
///    candidates outside the walkable area are dropped.
/// 3. **Edges**: every unordered node pair whose connecting segment passes
///    `WalkableArea::line_of_sight` gets one mirrored edge weighted by
///    distance. O(V²) segment tests, each O(E) walkbox edges.
pub fn build_nav_graph(walkboxes: &[Walkbox], config: &NavConfig) -> NavGraph {
    for (index, walkbox) in walkboxes.iter().enumerate() {
        if let Err(err) = walkbox.validate(index) {
            warn!("{err}; skipping it for navigation");
        }
    }

    let area = WalkableArea::new(walkboxes, config.boundary_epsilon);
    let mut graph = NavGraph::new();

    // --- 1. Nodes ---
    let mut seen: FxHashMap<(u32, u32), NavNodeId> = FxHashMap::default();
    for (walkbox, enabled) in area.walkboxes() {
        let candidates: SmallVec<[usize; 8]> = if enabled {
            (0..walkbox.vertex_count()).collect()
        } else {
            walkbox.pivot_vertices()
        };
        for i in candidates {
            let position = walkbox.vertices()[i];
            if seen.contains_key(&position.to_bits()) || !area.contains(position) {
                continue;
            }
            let id = graph.add_node(position);
            seen.insert(position.to_bits(), id);
        }
    }

    // --- 2. Edges ---
    let n = graph.node_count();
    for i in 0..n {
        let a = graph.nodes[i].position;
        for j in (i + 1)..n {
            let b = graph.nodes[j].position;
            if area.line_of_sight(a, b) {
                graph.add_edge(NavNodeId(i as u32), NavNodeId(j as u32));
            }
        }
    }

    debug!(
        "built nav graph from {} walkboxes: {} nodes, {} edges",
        walkboxes.len(),
        graph.node_count(),
        graph.edge_count()
    );
    graph
}
