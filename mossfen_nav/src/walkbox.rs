// Walkboxes and the walkable-area view built over them.
//
// A `Walkbox` is one polygon from the room: its vertex ring, an `enabled`
// flag the room toggles at runtime (doors, scripted blockers), an optional
// name for scripts to address it by, and optionally the indices of vertices
// the room has flagged as concave pivots. Geometry is fixed once loaded; only
// `enabled` changes.
//
// The walkable region is the union of enabled walkboxes minus the interior
// of every disabled walkbox. A disabled walkbox therefore doubles as a hole
// when it sits inside an enabled one, and simply stops contributing area
// when it sits beside one.
//
// `WalkableArea` is a borrowed, read-only view over a `&[Walkbox]` slice. It
// snapshots the enabled flags and per-box bounds once, then answers
// containment, line-of-sight and clamping queries. The navigation core never
// owns or copies walkbox geometry.
//
// See also: `geometry.rs` for the primitives used here, `nav.rs` which uses
// `WalkableArea::line_of_sight` as the edge test when building the graph,
// `finder.rs` which clamps query endpoints with `WalkableArea::clamp`.
//
// **Critical constraint: determinism.** Walkboxes are visited in slice
// order and edges in vertex order, so every query is a pure function of the
// walkbox slice and the tolerance.

use crate::error::NavError;
use crate::geometry::{
    Bounds, closest_point_on_boundary, closest_point_on_segment, distance_point_to_line,
    orientation, point_in_polygon, polygon_edges, segment_contact_params, segments_cross,
    signed_area,
};
use crate::types::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Sub-intervals of a sight line shorter than this (in segment parameter
/// space) are not sampled.
const MIN_SAMPLE_SPAN: f32 = 1e-6;

fn default_enabled() -> bool {
    true
}

/// One walkable (or, when disabled, blocking) polygon of a room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Walkbox {
    /// Script-facing name, if the room gave it one.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the polygon currently contributes walkable area.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    vertices: Vec<Vec2>,
    /// Vertex indices flagged as concave pivots by the room data.
    #[serde(default)]
    concave: Option<Vec<usize>>,
}

impl Walkbox {
    /// An enabled, unnamed walkbox with no explicit concave flags.
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self {
            name: None,
            enabled: true,
            vertices,
            concave: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Flag vertices as concave pivots. Replaces automatic detection.
    pub fn with_concave(mut self, indices: Vec<usize>) -> Self {
        self.concave = Some(indices);
        self
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Explicit concave flags, if the room supplied any.
    pub fn concave_indices(&self) -> Option<&[usize]> {
        self.concave.as_deref()
    }

    /// Reject polygons the navigation core cannot use. `index` is the
    /// walkbox's position in the room's slice, for the error report.
    pub fn validate(&self, index: usize) -> Result<(), NavError> {
        if self.vertices.len() < 3 || self.vertices.iter().any(|v| !v.is_finite()) {
            return Err(NavError::DegenerateWalkbox {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    /// Signed area; positive for counter-clockwise winding (y-up).
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.vertices)
    }

    /// Boundary edges in vertex order, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        polygon_edges(&self.vertices)
    }

    /// True if the interior angle at vertex `i` exceeds 180 degrees.
    /// Colinear vertices are not concave.
    pub fn is_vertex_concave(&self, i: usize) -> bool {
        self.vertex_turn(i) * self.signed_area() < 0.0
    }

    /// True if the interior angle at vertex `i` is below 180 degrees.
    fn is_vertex_convex(&self, i: usize) -> bool {
        self.vertex_turn(i) * self.signed_area() > 0.0
    }

    fn vertex_turn(&self, i: usize) -> f32 {
        let n = self.vertices.len();
        if n < 3 || i >= n {
            return 0.0;
        }
        let prev = self.vertices[(i + n - 1) % n];
        let next = self.vertices[(i + 1) % n];
        orientation(prev, self.vertices[i], next)
    }

    /// Vertices that are reflex when seen from the walkable side, i.e. the
    /// corners a shortest path may need to bend around.
    ///
    /// Explicit concave flags win. Otherwise an enabled walkbox contributes
    /// its concave vertices and a disabled one (a hole) its convex ones.
    pub fn pivot_vertices(&self) -> SmallVec<[usize; 8]> {
        if let Some(flags) = &self.concave {
            return flags
                .iter()
                .copied()
                .filter(|&i| i < self.vertices.len())
                .collect();
        }
        (0..self.vertices.len())
            .filter(|&i| {
                if self.enabled {
                    self.is_vertex_concave(i)
                } else {
                    self.is_vertex_convex(i)
                }
            })
            .collect()
    }

    /// Inclusive containment: inside, or within `epsilon` of the boundary.
    pub fn contains(&self, point: Vec2, epsilon: f32) -> bool {
        point_in_polygon(point, &self.vertices) || self.boundary_distance(point) <= epsilon
    }

    /// Strict containment: inside and farther than `epsilon` from the
    /// boundary.
    pub fn contains_strictly(&self, point: Vec2, epsilon: f32) -> bool {
        point_in_polygon(point, &self.vertices) && self.boundary_distance(point) > epsilon
    }

    fn boundary_distance(&self, point: Vec2) -> f32 {
        closest_point_on_boundary(point, &self.vertices).map_or(f32::INFINITY, |(_, d)| d)
    }
}

/// Toggle every walkbox carrying `name`. Returns how many matched.
pub fn set_enabled_by_name(walkboxes: &mut [Walkbox], name: &str, enabled: bool) -> usize {
    let mut matched = 0;
    for walkbox in walkboxes.iter_mut() {
        if walkbox.name.as_deref() == Some(name) {
            walkbox.enabled = enabled;
            matched += 1;
        }
    }
    matched
}

// ---------------------------------------------------------------------------
// Walkable area view
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct AreaBox<'a> {
    walkbox: &'a Walkbox,
    bounds: Bounds,
    enabled: bool,
}

/// Read-only view of the walkable region described by a walkbox slice.
///
/// Enabled flags are captured when the view is created, so one view sees a
/// consistent snapshot even if the room toggles a walkbox afterwards.
/// Degenerate walkboxes (fewer than 3 vertices, non-finite coordinates) are
/// left out; `nav::build_nav_graph` is the place that reports them.
#[derive(Clone, Debug)]
pub struct WalkableArea<'a> {
    boxes: Vec<AreaBox<'a>>,
    epsilon: f32,
}

impl<'a> WalkableArea<'a> {
    pub fn new(walkboxes: &'a [Walkbox], epsilon: f32) -> Self {
        let boxes = walkboxes
            .iter()
            .enumerate()
            .filter(|(i, w)| w.validate(*i).is_ok())
            .filter_map(|(_, walkbox)| {
                Some(AreaBox {
                    walkbox,
                    bounds: walkbox.bounds()?,
                    enabled: walkbox.enabled,
                })
            })
            .collect();
        Self { boxes, epsilon }
    }

    /// Tolerance used for boundary tests.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// True if no enabled walkbox contributes any area.
    pub fn is_empty(&self) -> bool {
        !self.boxes.iter().any(|b| b.enabled)
    }

    /// The usable walkboxes, in room order, with their snapshotted flags.
    pub fn walkboxes(&self) -> impl Iterator<Item = (&'a Walkbox, bool)> + '_ {
        self.boxes.iter().map(|b| (b.walkbox, b.enabled))
    }

    /// True if `point` is walkable: inside (or on) some enabled walkbox and
    /// not strictly inside any disabled one.
    pub fn contains(&self, point: Vec2) -> bool {
        let eps = self.epsilon;
        let in_walkable = self.boxes.iter().any(|b| {
            b.enabled && b.bounds.expand(eps).contains(point) && b.walkbox.contains(point, eps)
        });
        in_walkable
            && !self.boxes.iter().any(|b| {
                !b.enabled && b.bounds.contains(point) && b.walkbox.contains_strictly(point, eps)
            })
    }

    /// True if the whole segment `a-b` lies in the walkable region.
    ///
    /// The segment is split at every point where it meets a walkbox edge
    /// (enabled or not). Walkability cannot change between two consecutive
    /// split points, so checking each piece's midpoint decides the segment.
    /// Edges shared by two enabled walkboxes split the segment but both
    /// halves stay walkable, so interior seams never block sight.
    ///
    /// A piece lying on a disabled walkbox's edge also needs walkable room
    /// beside it: one of the two points `2 * epsilon` off the segment, on
    /// either side, must be walkable. Two touching blockers, or a blocker
    /// flush with a wall, leave no such room.
    pub fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        if a.approx_eq(b, self.epsilon) {
            return true;
        }

        let segment_bounds = Bounds::of_segment(a, b).expand(self.epsilon);
        let mut splits: SmallVec<[f32; 16]> = smallvec![0.0, 1.0];
        for area_box in &self.boxes {
            if !area_box.bounds.overlaps(&segment_bounds) {
                continue;
            }
            for (c, d) in area_box.walkbox.edges() {
                // Cutting through a blocker's edge enters its interior.
                if !area_box.enabled && self.crosses_clearly(a, b, c, d) {
                    return false;
                }
                segment_contact_params(a, b, c, d, self.epsilon, &mut splits);
            }
        }
        splits.sort_by(|x, y| x.total_cmp(y));

        let dir = b - a;
        let side = Vec2::new(-dir.y, dir.x) * (2.0 * self.epsilon / dir.length());
        splits.windows(2).all(|w| {
            w[1] - w[0] <= MIN_SAMPLE_SPAN
                || self.piece_walkable(a.lerp(b, (w[0] + w[1]) * 0.5), side)
        })
    }

    /// Walkability of a sight-line piece, sampled at its midpoint.
    fn piece_walkable(&self, mid: Vec2, side: Vec2) -> bool {
        self.contains(mid)
            && (!self.near_disabled_boundary(mid)
                || self.contains(mid + side)
                || self.contains(mid - side))
    }

    fn near_disabled_boundary(&self, point: Vec2) -> bool {
        let eps = self.epsilon;
        self.boxes.iter().any(|b| {
            !b.enabled
                && b.bounds.expand(eps).contains(point)
                && b.walkbox.boundary_distance(point) <= eps
        })
    }

    /// Proper crossing of `a-b` and `c-d` with every endpoint farther than
    /// epsilon from the other segment's line, so the crossing is not a
    /// rounding artifact of a graze.
    fn crosses_clearly(&self, a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
        segments_cross(a, b, c, d)
            && [
                distance_point_to_line(c, a, b),
                distance_point_to_line(d, a, b),
                distance_point_to_line(a, c, d),
                distance_point_to_line(b, c, d),
            ]
            .iter()
            .all(|dist| dist.abs() > self.epsilon)
    }

    /// `point` itself if walkable, otherwise the nearest walkable point on
    /// any walkbox boundary. `None` only when nothing is walkable.
    pub fn clamp(&self, point: Vec2) -> Option<Vec2> {
        if self.contains(point) {
            return Some(point);
        }
        let mut candidates: Vec<(f32, Vec2)> = self
            .boxes
            .iter()
            .flat_map(|b| b.walkbox.edges())
            .map(|(c, d)| {
                let q = closest_point_on_segment(point, c, d);
                (point.distance_squared(q), q)
            })
            .collect();
        candidates.sort_by(|x, y| x.0.total_cmp(&y.0));
        candidates
            .into_iter()
            .map(|(_, q)| q)
            .find(|&q| self.contains(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Walkbox {
        Walkbox::new(vec![v(x0, y0), v(x1, y0), v(x1, y1), v(x0, y1)])
    }

    /// An L-shaped room: the square (0,0)-(20,20) minus its top-right quarter.
    fn l_shape() -> Walkbox {
        Walkbox::new(vec![
            v(0.0, 0.0),
            v(20.0, 0.0),
            v(20.0, 10.0),
            v(10.0, 10.0),
            v(10.0, 20.0),
            v(0.0, 20.0),
        ])
    }

    #[test]
    fn validate_rejects_degenerate_polygons() {
        let line = Walkbox::new(vec![v(0.0, 0.0), v(1.0, 0.0)]);
        match line.validate(3) {
            Err(NavError::DegenerateWalkbox { index, vertex_count }) => {
                assert_eq!(index, 3);
                assert_eq!(vertex_count, 2);
            }
            other => panic!("expected DegenerateWalkbox, got {other:?}"),
        }
        assert!(rect(0.0, 0.0, 1.0, 1.0).validate(0).is_ok());
    }

    #[test]
    fn concave_vertex_detection_ignores_winding() {
        let l = l_shape();
        let concave: Vec<usize> = (0..6).filter(|&i| l.is_vertex_concave(i)).collect();
        assert_eq!(concave, vec![3]);

        let mut reversed: Vec<Vec2> = l.vertices().to_vec();
        reversed.reverse();
        let cw = Walkbox::new(reversed);
        let concave_cw: Vec<usize> = (0..6).filter(|&i| cw.is_vertex_concave(i)).collect();
        assert_eq!(concave_cw, vec![2]);
    }

    #[test]
    fn pivots_prefer_explicit_flags() {
        let l = l_shape().with_concave(vec![0, 99]);
        assert_eq!(l.pivot_vertices().as_slice(), &[0]);
        assert_eq!(l_shape().pivot_vertices().as_slice(), &[3]);
    }

    #[test]
    fn disabled_box_pivots_on_its_convex_corners() {
        let hole = rect(5.0, 5.0, 8.0, 8.0).with_enabled(false);
        assert_eq!(hole.pivot_vertices().as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn set_enabled_by_name_toggles_matches() {
        let mut boxes = vec![
            rect(0.0, 0.0, 1.0, 1.0).with_name("door"),
            rect(1.0, 0.0, 2.0, 1.0),
        ];
        assert_eq!(set_enabled_by_name(&mut boxes, "door", false), 1);
        assert!(!boxes[0].enabled);
        assert!(boxes[1].enabled);
        assert_eq!(set_enabled_by_name(&mut boxes, "window", false), 0);
    }

    #[test]
    fn contains_respects_holes_and_boundary() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(40.0, 40.0, 60.0, 60.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(area.contains(v(10.0, 10.0)));
        assert!(area.contains(v(100.0, 50.0)));
        assert!(!area.contains(v(50.0, 50.0)));
        assert!(area.contains(v(40.0, 50.0)));
        assert!(!area.contains(v(150.0, 50.0)));
    }

    #[test]
    fn line_of_sight_blocked_by_concave_notch() {
        let boxes = vec![l_shape()];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(area.line_of_sight(v(2.0, 2.0), v(18.0, 8.0)));
        assert!(!area.line_of_sight(v(18.0, 5.0), v(5.0, 18.0)));
        // Grazing the reflex corner itself is allowed.
        assert!(area.line_of_sight(v(20.0, 0.0), v(10.0, 10.0)));
        assert!(area.line_of_sight(v(15.0, 5.0), v(5.0, 15.0)));
    }

    #[test]
    fn line_of_sight_blocked_by_hole() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(40.0, 40.0, 60.0, 60.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(!area.line_of_sight(v(10.0, 50.0), v(90.0, 50.0)));
        assert!(area.line_of_sight(v(10.0, 10.0), v(90.0, 10.0)));
        // Running along the hole's edge is fine.
        assert!(area.line_of_sight(v(40.0, 20.0), v(40.0, 80.0)));
    }

    #[test]
    fn touching_blockers_leave_no_seam_to_walk() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(30.0, 10.0, 50.0, 90.0).with_enabled(false),
            rect(50.0, 10.0, 70.0, 90.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(!area.line_of_sight(v(50.0, 5.0), v(50.0, 95.0)));
        // The obstacle's outer sides are still walkable.
        assert!(area.line_of_sight(v(30.0, 5.0), v(30.0, 95.0)));
        assert!(area.line_of_sight(v(30.0, 90.0), v(70.0, 90.0)));
    }

    #[test]
    fn blocker_flush_with_wall_closes_the_wall() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(40.0, 0.0, 60.0, 30.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(!area.line_of_sight(v(30.0, 0.0), v(70.0, 0.0)));
        assert!(area.line_of_sight(v(30.0, 0.0), v(40.0, 0.0)));
        assert!(area.line_of_sight(v(40.0, 0.0), v(40.0, 30.0)));
        assert!(area.line_of_sight(v(40.0, 30.0), v(60.0, 30.0)));
    }

    #[test]
    fn cutting_a_blocker_corner_is_blocked() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(40.0, 40.0, 60.0, 60.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(!area.line_of_sight(v(30.0, 55.0), v(55.0, 30.0)));
        // Grazing the corner exactly is not a cut.
        assert!(area.line_of_sight(v(30.0, 50.0), v(50.0, 30.0)));
    }

    #[test]
    fn line_of_sight_crosses_shared_seam() {
        let boxes = vec![rect(0.0, 0.0, 50.0, 50.0), rect(50.0, 0.0, 100.0, 50.0)];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(area.line_of_sight(v(10.0, 10.0), v(90.0, 40.0)));
    }

    #[test]
    fn line_of_sight_blocked_between_separate_boxes() {
        let boxes = vec![rect(0.0, 0.0, 40.0, 40.0), rect(60.0, 0.0, 100.0, 40.0)];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(!area.line_of_sight(v(10.0, 10.0), v(90.0, 10.0)));
    }

    #[test]
    fn clamp_moves_outside_points_to_nearest_boundary() {
        let boxes = vec![rect(0.0, 0.0, 100.0, 100.0)];
        let area = WalkableArea::new(&boxes, 0.01);
        assert_eq!(area.clamp(v(50.0, 50.0)), Some(v(50.0, 50.0)));
        assert_eq!(area.clamp(v(150.0, 50.0)), Some(v(100.0, 50.0)));
        assert_eq!(area.clamp(v(-5.0, -5.0)), Some(v(0.0, 0.0)));
    }

    #[test]
    fn clamp_out_of_a_hole_lands_on_hole_edge() {
        let boxes = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(40.0, 40.0, 60.0, 60.0).with_enabled(false),
        ];
        let area = WalkableArea::new(&boxes, 0.01);
        assert_eq!(area.clamp(v(42.0, 50.0)), Some(v(40.0, 50.0)));
    }

    #[test]
    fn clamp_with_nothing_walkable() {
        let boxes = vec![rect(0.0, 0.0, 10.0, 10.0).with_enabled(false)];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(area.is_empty());
        assert_eq!(area.clamp(v(5.0, 5.0)), None);
    }

    #[test]
    fn view_snapshots_enabled_flags() {
        let mut boxes = vec![rect(0.0, 0.0, 10.0, 10.0)];
        let enabled_now = WalkableArea::new(&boxes, 0.01).contains(v(5.0, 5.0));
        boxes[0].enabled = false;
        let disabled_now = WalkableArea::new(&boxes, 0.01).contains(v(5.0, 5.0));
        assert!(enabled_now);
        assert!(!disabled_now);
    }

    #[test]
    fn degenerate_boxes_are_left_out_of_the_view() {
        let boxes = vec![Walkbox::new(vec![v(0.0, 0.0), v(5.0, 5.0)])];
        let area = WalkableArea::new(&boxes, 0.01);
        assert!(area.is_empty());
        assert_eq!(area.walkboxes().count(), 0);
    }

    #[test]
    fn walkbox_loads_from_json() {
        let json = r#"{
            "name": "floor",
            "vertices": [{"x": 0.0, "y": 0.0}, {"x": 10.0, "y": 0.0}, {"x": 10.0, "y": 10.0}]
        }"#;
        let walkbox: Walkbox = serde_json::from_str(json).unwrap();
        assert!(walkbox.enabled);
        assert_eq!(walkbox.name.as_deref(), Some("floor"));
        assert_eq!(walkbox.vertex_count(), 3);
        assert!(walkbox.concave_indices().is_none());
    }
}
