// Pure 2-D geometry primitives used by every other navigation module.
//
// Distance to lines and segments, side/orientation tests, segment-segment
// intersection (boolean and parametric), polygon containment and signed
// area, and axis-aligned `Bounds` for cheap rejection before exact tests.
//
// Everything here is a side-effect-free function of its inputs. Callers pick
// their own tolerance; the only built-in constant is `LINE_EPSILON`, which
// guards divisions by near-zero segment lengths.
//
// See also: `walkbox.rs` which builds containment and line-of-sight on top of
// these, `funnel.rs` which uses the orientation test directly.
//
// **Critical constraint: determinism.** No randomness and no iteration over
// unordered collections. Given the same inputs the same f32 operations run in
// the same order.

use crate::types::Vec2;
use serde::{Deserialize, Serialize};

/// Below this, a line's normal (or a segment's length) is treated as zero.
pub const LINE_EPSILON: f32 = 1e-9;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box. `top` is the smaller y, `bottom` the larger,
/// matching screen-space rooms; the naming is only for readability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for &p in rest {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    /// Box spanned by a segment.
    pub fn of_segment(a: Vec2, b: Vec2) -> Self {
        Bounds {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Bounds {
            min: Vec2::new(self.min.x - margin, self.min.y - margin),
            max: Vec2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Inclusive overlap: boxes that share only an edge or corner overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }
}

// ---------------------------------------------------------------------------
// Lines and segments
// ---------------------------------------------------------------------------

/// Twice the signed area of triangle `abc`. Positive when `c` lies to the
/// left of the directed line `a -> b` in a y-up frame, zero when colinear.
pub fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

/// Signed distance from `point` to the infinite line through `a` and `b`.
///
/// Uses the normalized line equation `a·x + b·y + c = 0`. The sign is
/// positive on the left of `a -> b` (y-up). If `a` and `b` coincide the line
/// is undefined and the plain distance to `a` is returned.
pub fn distance_point_to_line(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let la = a.y - b.y;
    let lb = b.x - a.x;
    let lc = a.x * b.y - b.x * a.y;
    let norm = (la * la + lb * lb).sqrt();
    if norm < LINE_EPSILON {
        return point.distance(a);
    }
    (la * point.x + lb * point.y + lc) / norm
}

/// Closest point to `point` on the closed segment `a-b`.
pub fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < LINE_EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Unsigned distance from `point` to the closed segment `a-b`.
pub fn distance_point_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    point.distance(closest_point_on_segment(point, a, b))
}

/// True if the closed segments `p1-p2` and `p3-p4` share at least one point.
///
/// Bounding boxes are compared first; the exact test uses the four
/// orientation signs, with colinear cases resolved by the bounding boxes.
///
/// Helper API for callers such as room editors and hit tests. The navigation
/// core needs tolerances and contact positions, so it uses `segments_cross`
/// and `segment_contact_params` instead.
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    if !Bounds::of_segment(p1, p2).overlaps(&Bounds::of_segment(p3, p4)) {
        return false;
    }

    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Touching or colinear: an endpoint lying on the other segment.
    (d1 == 0.0 && Bounds::of_segment(p3, p4).contains(p1))
        || (d2 == 0.0 && Bounds::of_segment(p3, p4).contains(p2))
        || (d3 == 0.0 && Bounds::of_segment(p1, p2).contains(p3))
        || (d4 == 0.0 && Bounds::of_segment(p1, p2).contains(p4))
}

/// True if the open segments properly cross: each strictly separates the
/// endpoints of the other. Touching and colinear overlap do not count.
///
/// `WalkableArea::line_of_sight` uses this to reject sight lines cutting
/// through a disabled walkbox's edge.
pub fn segments_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    if !Bounds::of_segment(p1, p2).overlaps(&Bounds::of_segment(p3, p4)) {
        return false;
    }
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Push every parameter `t` in `[0, 1]` at which segment `a-b` meets the
/// closed segment `c-d` (within `epsilon` of it).
///
/// A transversal meeting contributes one value; a colinear overlap
/// contributes the parameters of both ends of the overlap. `a + (b - a) * t`
/// recovers the meeting point.
pub fn segment_contact_params(
    a: Vec2,
    b: Vec2,
    c: Vec2,
    d: Vec2,
    epsilon: f32,
    out: &mut impl Extend<f32>,
) {
    let r = b - a;
    let s = d - c;
    let r_len_sq = r.length_squared();
    if r_len_sq < LINE_EPSILON {
        return;
    }
    let denom = r.cross(s);
    let ac = c - a;

    if denom.abs() > LINE_EPSILON * r_len_sq.max(s.length_squared()) {
        let t = ac.cross(s) / denom;
        let u = ac.cross(r) / denom;
        let r_len = r_len_sq.sqrt();
        let t_tol = epsilon / r_len;
        let s_len = s.length().max(LINE_EPSILON);
        let u_tol = epsilon / s_len;
        if t >= -t_tol && t <= 1.0 + t_tol && u >= -u_tol && u <= 1.0 + u_tol {
            out.extend(std::iter::once(t.clamp(0.0, 1.0)));
        }
        return;
    }

    // Parallel. Only matters when colinear (within tolerance).
    if distance_point_to_line(c, a, b).abs() > epsilon {
        return;
    }
    let tc = ac.dot(r) / r_len_sq;
    let td = (d - a).dot(r) / r_len_sq;
    let (lo, hi) = if tc <= td { (tc, td) } else { (td, tc) };
    if hi < 0.0 || lo > 1.0 {
        return;
    }
    out.extend([lo.max(0.0), hi.min(1.0)]);
}

// ---------------------------------------------------------------------------
// Polygons
// ---------------------------------------------------------------------------

/// Signed area (shoelace). Positive for counter-clockwise winding in a y-up
/// frame.
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice += vertices[i].cross(vertices[j]);
    }
    twice / 2.0
}

/// Even-odd ray-casting containment. Points exactly on the boundary may land
/// either way; callers that care combine this with a boundary-distance check.
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = vj.x + (point.y - vj.y) / (vi.y - vj.y) * (vi.x - vj.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Iterator over the closed polygon's edges as `(start, end)` pairs.
pub fn polygon_edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Closest point on the polygon's boundary and its distance.
/// Returns `None` for an empty polygon.
pub fn closest_point_on_boundary(point: Vec2, vertices: &[Vec2]) -> Option<(Vec2, f32)> {
    if vertices.is_empty() {
        return None;
    }
    if vertices.len() == 1 {
        return Some((vertices[0], point.distance(vertices[0])));
    }
    polygon_edges(vertices)
        .map(|(a, b)| {
            let q = closest_point_on_segment(point, a, b);
            (q, point.distance(q))
        })
        .min_by(|x, y| x.1.total_cmp(&y.1))
}
