// Dijkstra shortest-path search over a navigation topology.
//
// Single source, single target. Costs-so-far live in a `Vec<f32>` indexed by
// node, which doubles as the key array of the `IndexedPriorityQueue`
// frontier. Parent pointers are a `Vec<Option<NavNodeId>>`. The search stops
// as soon as the target is popped.
//
// Generic over `NavTopology`, so the same code searches a bare `NavGraph`
// (tests, tools) and the per-query `QueryGraph` overlay (`finder.rs`).
//
// See also: `priority_queue.rs` for the frontier, `nav.rs` for the graph
// types.
//
// **Critical constraint: determinism.** Neighbors are relaxed in adjacency
// order, a relaxation only wins on a strictly smaller cost, and the queue
// breaks ties by insertion order. Identical graphs give identical paths.

use crate::nav::NavTopology;
use crate::priority_queue::IndexedPriorityQueue;
use crate::types::{NavNodeId, Vec2};
use log::trace;

/// The result of a successful search.
#[derive(Clone, Debug)]
pub struct PathResult {
    /// Sequence of node IDs from source to target (inclusive).
    pub nodes: Vec<NavNodeId>,
    /// Sum of the edge costs along `nodes`.
    pub total_cost: f32,
}

impl PathResult {
    /// Node positions along the path.
    pub fn positions<G: NavTopology>(&self, graph: &G) -> Vec<Vec2> {
        self.nodes.iter().map(|&id| graph.position(id)).collect()
    }
}

/// Find the cheapest path from `source` to `target`.
///
/// Returns `None` if no path exists or if either ID is out of range.
pub fn dijkstra<G: NavTopology>(
    graph: &G,
    source: NavNodeId,
    target: NavNodeId,
) -> Option<PathResult> {
    let n = graph.node_count();
    if source.index() >= n || target.index() >= n {
        return None;
    }
    if source == target {
        return Some(PathResult {
            nodes: vec![source],
            total_cost: 0.0,
        });
    }

    // cost[node] = cost of cheapest known path from source to node.
    let mut cost = vec![f32::INFINITY; n];
    let mut parent: Vec<Option<NavNodeId>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut frontier = IndexedPriorityQueue::with_capacity(n);

    cost[source.index()] = 0.0;
    frontier.insert(source.index(), &cost);

    let mut settled_count = 0usize;
    while let Some(ci) = frontier.pop_min(&cost) {
        settled[ci] = true;
        settled_count += 1;

        if ci == target.index() {
            trace!(
                "dijkstra {source} -> {target}: settled {settled_count}/{n}, cost {}",
                cost[ci]
            );
            return Some(reconstruct_path(&parent, source, target, cost[ci]));
        }

        let current_cost = cost[ci];
        for edge in graph.edges_from(NavNodeId(ci as u32)) {
            let ni = edge.to.index();
            if settled[ni] {
                continue;
            }
            let candidate = current_cost + edge.cost;
            if candidate < cost[ni] {
                // Finite cost and not settled means already queued.
                let queued = cost[ni].is_finite();
                cost[ni] = candidate;
                parent[ni] = Some(NavNodeId(ci as u32));
                if queued {
                    frontier.decrease_key(ni, &cost);
                } else {
                    frontier.insert(ni, &cost);
                }
            }
        }
    }

    trace!("dijkstra {source} -> {target}: unreachable after settling {settled_count}/{n}");
    None
}

/// Reconstruct the path from parent pointers.
fn reconstruct_path(
    parent: &[Option<NavNodeId>],
    source: NavNodeId,
    target: NavNodeId,
    total_cost: f32,
) -> PathResult {
    let mut nodes = Vec::new();
    let mut current = target;

    loop {
        nodes.push(current);
        if current == source {
            break;
        }
        match parent[current.index()] {
            Some(prev) => current = prev,
            None => break,
        }
    }

    nodes.reverse();
    PathResult { nodes, total_cost }
}

/// Total Euclidean length of a polyline.
pub fn path_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
