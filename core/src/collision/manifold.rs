use super::narrowphase::{closest_point_on_segment, world_vertices};
use super::{Manifold, ManifoldPoint, ManifoldPointId, Penetration};
use crate::geometry::{Shape, Transform, Vec2};

/// Builds a contact manifold (1 or 2 points) from a detected penetration.
pub trait ManifoldSolver {
    fn manifold(
        &self,
        penetration: &Penetration,
        s1: &Shape,
        t1: &Transform,
        s2: &Shape,
        t2: &Transform,
    ) -> Option<Manifold>;
}

/// Reference/incident edge clipping for polygon pairs; closest-feature
/// points for circle cases. Feature indices feed the stable point ids used
/// by warm-start matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClippingManifoldSolver;

impl ManifoldSolver for ClippingManifoldSolver {
    fn manifold(
        &self,
        penetration: &Penetration,
        s1: &Shape,
        t1: &Transform,
        s2: &Shape,
        t2: &Transform,
    ) -> Option<Manifold> {
        match (s1, s2) {
            (Shape::Circle { radius: r1 }, Shape::Circle { .. }) => {
                // Point on the first circle's surface along the normal, pushed
                // in by half the overlap.
                let point =
                    t1.translation + penetration.normal * (*r1 - penetration.depth * 0.5);
                Some(single_point(penetration, point))
            }
            (Shape::Circle { radius }, Shape::Polygon { vertices }) => {
                // The penetration normal points circle -> polygon.
                let point = circle_polygon_point(
                    t1.translation,
                    *radius,
                    penetration.normal,
                    vertices,
                    t2,
                );
                Some(single_point(penetration, point))
            }
            (Shape::Polygon { vertices }, Shape::Circle { radius }) => {
                // The penetration normal points polygon -> circle.
                let point = circle_polygon_point(
                    t2.translation,
                    *radius,
                    -penetration.normal,
                    vertices,
                    t1,
                );
                Some(single_point(penetration, point))
            }
            (Shape::Polygon { vertices: v1 }, Shape::Polygon { vertices: v2 }) => {
                polygon_manifold(penetration, v1, t1, v2, t2)
            }
        }
    }
}

fn single_point(penetration: &Penetration, point: Vec2) -> Manifold {
    Manifold {
        normal: penetration.normal,
        points: vec![ManifoldPoint {
            point,
            depth: penetration.depth,
            id: ManifoldPointId::DISTANCE,
        }],
    }
}

/// Contact point for a circle against a polygon: the closest point on the
/// polygon boundary to the circle center (the center-inside case projects
/// onto the normal instead).
fn circle_polygon_point(
    center: Vec2,
    radius: f64,
    normal_toward_poly: Vec2,
    vertices: &[Vec2],
    poly_tx: &Transform,
) -> Vec2 {
    let verts = world_vertices(vertices, poly_tx);
    let n = verts.len();
    let mut best = center + normal_toward_poly * radius;
    let mut best_dist_sq = f64::MAX;
    for i in 0..n {
        let p = closest_point_on_segment(center, verts[i], verts[(i + 1) % n]);
        let d2 = (center - p).length_squared();
        if d2 < best_dist_sq {
            best_dist_sq = d2;
            best = p;
        }
    }
    best
}

/// Separation of `other`'s support point from each edge of `verts`; the edge
/// with the greatest (least negative) separation is the best candidate
/// reference face.
fn max_separation(verts: &[Vec2], other: &[Vec2]) -> (f64, usize) {
    let n = verts.len();
    let mut best_sep = f64::MIN;
    let mut best_edge = 0;
    for i in 0..n {
        let v0 = verts[i];
        let e = verts[(i + 1) % n] - v0;
        let len = e.length();
        if len < 1e-12 {
            continue;
        }
        let normal = Vec2::new(e.y, -e.x) / len;
        let mut min_dot = f64::MAX;
        for &b in other {
            min_dot = min_dot.min((b - v0).dot(normal));
        }
        if min_dot > best_sep {
            best_sep = min_dot;
            best_edge = i;
        }
    }
    (best_sep, best_edge)
}

/// The edge of the incident polygon most anti-parallel to the reference
/// normal.
fn incident_edge(verts: &[Vec2], ref_normal: Vec2) -> usize {
    let n = verts.len();
    let mut min_dot = f64::MAX;
    let mut best = 0;
    for i in 0..n {
        let e = verts[(i + 1) % n] - verts[i];
        let len = e.length();
        if len < 1e-12 {
            continue;
        }
        let normal = Vec2::new(e.y, -e.x) / len;
        let dot = normal.dot(ref_normal);
        if dot < min_dot {
            min_dot = dot;
            best = i;
        }
    }
    best
}

/// Clip the segment v0-v1 against the half-plane through `line_point` with
/// the given normal, keeping the positive side.
fn clip(v0: Vec2, v1: Vec2, line_point: Vec2, normal: Vec2) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(2);
    let d0 = (v0 - line_point).dot(normal);
    let d1 = (v1 - line_point).dot(normal);
    if d0 >= 0.0 {
        out.push(v0);
    }
    if d1 >= 0.0 {
        out.push(v1);
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out.push(v0 + (v1 - v0) * t);
    }
    out
}

fn polygon_manifold(
    penetration: &Penetration,
    v1: &[Vec2],
    t1: &Transform,
    v2: &[Vec2],
    t2: &Transform,
) -> Option<Manifold> {
    let w1 = world_vertices(v1, t1);
    let w2 = world_vertices(v2, t2);
    if w1.len() < 3 || w2.len() < 3 {
        return None;
    }

    let (sep1, edge1) = max_separation(&w1, &w2);
    let (sep2, edge2) = max_separation(&w2, &w1);

    // Reference face: the side with the smaller penetration, with a small
    // bias toward the first shape so the choice is stable frame to frame.
    let flipped = sep2 > sep1 + 1e-3 * penetration.depth.max(1e-3);
    let (ref_verts, inc_verts, ref_edge) = if flipped {
        (&w2, &w1, edge2)
    } else {
        (&w1, &w2, edge1)
    };

    let n = ref_verts.len();
    let ref_v0 = ref_verts[ref_edge];
    let ref_v1 = ref_verts[(ref_edge + 1) % n];
    let ref_e = ref_v1 - ref_v0;
    let ref_len = ref_e.length();
    if ref_len < 1e-12 {
        return None;
    }
    let ref_tangent = ref_e / ref_len;
    let ref_normal = Vec2::new(ref_e.y, -ref_e.x) / ref_len;

    let inc = incident_edge(inc_verts, ref_normal);
    let inc_v0 = inc_verts[inc];
    let inc_v1 = inc_verts[(inc + 1) % inc_verts.len()];

    // Clip the incident edge between the reference edge's end planes.
    let clipped = clip(inc_v0, inc_v1, ref_v0, ref_tangent);
    if clipped.len() < 2 {
        return None;
    }
    let clipped = clip(clipped[0], clipped[1], ref_v1, -ref_tangent);
    if clipped.len() < 2 {
        return None;
    }

    let mut points = Vec::with_capacity(2);
    for (i, &cp) in clipped.iter().take(2).enumerate() {
        let sep = (cp - ref_v0).dot(ref_normal);
        if sep <= 0.0 {
            points.push(ManifoldPoint {
                point: cp,
                depth: -sep,
                id: ManifoldPointId::feature(ref_edge as u8, inc as u8, i as u8, flipped),
            });
        }
    }
    if points.is_empty() {
        return None;
    }

    Some(Manifold {
        // The caller's normal already points from shape 1 to shape 2 and is
        // consistent with the chosen face to within the SAT tolerance.
        normal: penetration.normal,
        points,
    })
}
