// Funnel smoothing (string pulling) through a corridor of portals.
//
// A portal is one edge the path must pass through, given as a `left` and a
// `right` endpoint as seen by an actor walking the corridor. `string_pull`
// pulls a string taut from the start, through every portal, to the goal and
// returns the corners it wraps around: the shortest path that stays in the
// corridor.
//
// The algorithm keeps an apex and a left/right funnel. Each new portal
// narrows one side if it lies inside the funnel. When a side would cross the
// other, the other side's point becomes a path corner, the apex moves there,
// and the scan restarts from the portal after it.
//
// Left and right follow the y-up convention of `Vec2::cross`: `left` is on the
// walker's left when y grows upward. Rooms stored y-down just swap the two
// names; `Portal::between` orients portals itself, so only hand-built
// corridors need to care.
//
// This is independent of the visibility graph. Paths from `PathFinder` are
// already taut; the funnel is for corridors derived from walkbox adjacency
// (`corridor_portals`) or a triangulation.
//
// **Critical constraint: determinism.** Pure function of its inputs.

use crate::geometry::{orientation, segment_contact_params};
use crate::types::Vec2;
use crate::walkbox::Walkbox;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One edge of the navigable corridor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub left: Vec2,
    pub right: Vec2,
}

impl Portal {
    pub fn new(left: Vec2, right: Vec2) -> Self {
        Self { left, right }
    }

    /// Degenerate portal at a single point (used for the start and goal).
    pub fn point(p: Vec2) -> Self {
        Self { left: p, right: p }
    }

    /// The stretch of boundary shared by two adjacent walkboxes, oriented
    /// for walking from `from` into `to`.
    ///
    /// Edges count as shared when they lie on one line (within `epsilon`)
    /// and overlap along it, so a narrow walkbox butting into the side of a
    /// wide one gets a portal as wide as the overlap. `None` if the two only
    /// touch at a point or not at all.
    pub fn between(from: &Walkbox, to: &Walkbox, epsilon: f32) -> Option<Portal> {
        let (p, q) = from.edges().find_map(|(a, b)| {
            to.edges()
                .find_map(|(c, d)| shared_stretch(a, b, c, d, epsilon))
        })?;
        let inside = centroid(from.vertices());
        // Walking out of `from` across p-q: left is the endpoint on the left
        // of the outward direction.
        let mid = p.midpoint(q);
        if orientation(inside, mid, p) > 0.0 {
            Some(Portal::new(p, q))
        } else {
            Some(Portal::new(q, p))
        }
    }
}

/// The part of edge `a-b` that colinear edge `c-d` also covers, if it has
/// length.
fn shared_stretch(a: Vec2, b: Vec2, c: Vec2, d: Vec2, epsilon: f32) -> Option<(Vec2, Vec2)> {
    let mut params: SmallVec<[f32; 2]> = SmallVec::new();
    segment_contact_params(a, b, c, d, epsilon, &mut params);
    // A transversal contact yields one parameter, an overlap two.
    let &[t0, t1] = params.as_slice() else {
        return None;
    };
    ((t1 - t0) * a.distance(b) > epsilon).then(|| (a.lerp(b, t0), a.lerp(b, t1)))
}

fn centroid(vertices: &[Vec2]) -> Vec2 {
    if vertices.is_empty() {
        return Vec2::ZERO;
    }
    let sum = vertices.iter().fold(Vec2::ZERO, |acc, &v| acc + v);
    sum / vertices.len() as f32
}

/// Portals for a chain of walkbox indices, one per consecutive pair. `None`
/// if an index is out of range or two consecutive walkboxes are not adjacent.
pub fn corridor_portals(walkboxes: &[Walkbox], chain: &[usize], epsilon: f32) -> Option<Vec<Portal>> {
    chain
        .windows(2)
        .map(|pair| {
            let from = walkboxes.get(pair[0])?;
            let to = walkboxes.get(pair[1])?;
            Portal::between(from, to, epsilon)
        })
        .collect()
}

/// Shortest path from `start` to `goal` through `portals`, in order.
///
/// The result starts at `start`, ends at `goal`, contains only portal
/// endpoints in between, and never repeats a point back to back. It has at
/// most `portals.len() + 2` points.
pub fn string_pull(start: Vec2, portals: &[Portal], goal: Vec2) -> Vec<Vec2> {
    let mut corridor = Vec::with_capacity(portals.len() + 2);
    corridor.push(Portal::point(start));
    corridor.extend_from_slice(portals);
    corridor.push(Portal::point(goal));

    let mut path = vec![start];

    let mut apex = start;
    let mut funnel_left = start;
    let mut funnel_right = start;
    #[allow(unused_assignments)]
    let mut apex_index = 0usize;
    let mut left_index = 0usize;
    let mut right_index = 0usize;

    let mut i = 1usize;
    while i < corridor.len() {
        let Portal { left, right } = corridor[i];

        // Tighten the right side.
        if orientation(apex, funnel_right, right) >= 0.0 {
            if apex == funnel_right || orientation(apex, funnel_left, right) < 0.0 {
                funnel_right = right;
                right_index = i;
            } else {
                // Right crossed over left: left becomes a corner.
                push_distinct(&mut path, funnel_left);
                apex = funnel_left;
                apex_index = left_index;
                funnel_left = apex;
                funnel_right = apex;
                left_index = apex_index;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        // Tighten the left side.
        if orientation(apex, funnel_left, left) <= 0.0 {
            if apex == funnel_left || orientation(apex, funnel_right, left) > 0.0 {
                funnel_left = left;
                left_index = i;
            } else {
                // Left crossed over right: right becomes a corner.
                push_distinct(&mut path, funnel_right);
                apex = funnel_right;
                apex_index = right_index;
                funnel_left = apex;
                funnel_right = apex;
                left_index = apex_index;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        i += 1;
    }

    push_distinct(&mut path, goal);
    path
}

fn push_distinct(path: &mut Vec<Vec2>, p: Vec2) {
    if path.last() != Some(&p) {
        path.push(p);
    }
}
