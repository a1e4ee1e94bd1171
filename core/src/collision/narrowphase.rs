use super::Penetration;
use crate::geometry::{Shape, Transform, Vec2};

/// Narrowphase penetration test between two convex shapes.
pub trait NarrowphaseDetector {
    /// Returns the penetration if the shapes overlap, with the normal
    /// pointing from the first shape toward the second.
    fn detect(&self, s1: &Shape, t1: &Transform, s2: &Shape, t2: &Transform)
    -> Option<Penetration>;
}

/// Separating-axis detector for circles and convex polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sat;

impl NarrowphaseDetector for Sat {
    fn detect(
        &self,
        s1: &Shape,
        t1: &Transform,
        s2: &Shape,
        t2: &Transform,
    ) -> Option<Penetration> {
        match (s1, s2) {
            (Shape::Circle { radius: r1 }, Shape::Circle { radius: r2 }) => {
                circle_vs_circle(t1.translation, *r1, t2.translation, *r2)
            }
            (Shape::Circle { radius }, Shape::Polygon { vertices }) => {
                circle_vs_polygon(t1.translation, *radius, vertices, t2).map(flip)
            }
            (Shape::Polygon { vertices }, Shape::Circle { radius }) => {
                circle_vs_polygon(t2.translation, *radius, vertices, t1)
            }
            (Shape::Polygon { vertices: v1 }, Shape::Polygon { vertices: v2 }) => {
                polygon_vs_polygon(v1, t1, v2, t2)
            }
        }
    }
}

fn flip(p: Penetration) -> Penetration {
    Penetration {
        normal: -p.normal,
        depth: p.depth,
    }
}

fn circle_vs_circle(c1: Vec2, r1: f64, c2: Vec2, r2: f64) -> Option<Penetration> {
    let d = c2 - c1;
    let dist_sq = d.length_squared();
    let sum_r = r1 + r2;
    if dist_sq >= sum_r * sum_r {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-12 { d / dist } else { Vec2::X };
    Some(Penetration {
        normal,
        depth: sum_r - dist,
    })
}

pub(crate) fn world_vertices(vertices: &[Vec2], tx: &Transform) -> Vec<Vec2> {
    vertices.iter().map(|&v| tx.apply(v)).collect()
}

fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    let mut normals = Vec::with_capacity(n);
    for i in 0..n {
        let e = vertices[(i + 1) % n] - vertices[i];
        let len = e.length();
        if len > 1e-12 {
            // Outward normal for counter-clockwise winding.
            normals.push(Vec2::new(e.y, -e.x) / len);
        }
    }
    normals
}

fn project(vertices: &[Vec2], axis: Vec2) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for &v in vertices {
        let p = v.dot(axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn polygon_vs_polygon(
    v1: &[Vec2],
    t1: &Transform,
    v2: &[Vec2],
    t2: &Transform,
) -> Option<Penetration> {
    let w1 = world_vertices(v1, t1);
    let w2 = world_vertices(v2, t2);
    if w1.len() < 3 || w2.len() < 3 {
        return None;
    }

    let mut min_overlap = f64::MAX;
    let mut min_axis = Vec2::ZERO;

    for axis in edge_normals(&w1).into_iter().chain(edge_normals(&w2)) {
        let (min_a, max_a) = project(&w1, axis);
        let (min_b, max_b) = project(&w2, axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = axis;
        }
    }

    // Point the normal from shape 1 toward shape 2.
    if (t2.translation - t1.translation).dot(min_axis) < 0.0 {
        min_axis = -min_axis;
    }
    Some(Penetration {
        normal: min_axis,
        depth: min_overlap,
    })
}

/// Closest point on the polygon boundary to the circle center; handles the
/// center-inside case by pushing out along the closest feature.
fn circle_vs_polygon(
    center: Vec2,
    radius: f64,
    vertices: &[Vec2],
    poly_tx: &Transform,
) -> Option<Penetration> {
    let verts = world_vertices(vertices, poly_tx);
    let n = verts.len();
    if n < 3 {
        return None;
    }

    let mut closest_dist_sq = f64::MAX;
    let mut closest = Vec2::ZERO;
    for i in 0..n {
        let p = closest_point_on_segment(center, verts[i], verts[(i + 1) % n]);
        let d2 = (center - p).length_squared();
        if d2 < closest_dist_sq {
            closest_dist_sq = d2;
            closest = p;
        }
    }

    let inside = point_in_polygon(center, &verts);
    let dist = closest_dist_sq.sqrt();
    if !inside && dist >= radius {
        return None;
    }

    // Normal points from the polygon toward the circle.
    let (normal, depth) = if inside {
        let d = closest - center;
        let len = d.length();
        if len > 1e-12 {
            (-d / len, radius + dist)
        } else {
            (Vec2::X, radius)
        }
    } else if dist > 1e-12 {
        ((center - closest) / dist, radius - dist)
    } else {
        // Center exactly on the boundary.
        (Vec2::X, radius)
    };

    Some(Penetration { normal, depth })
}

pub(crate) fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let ab_sq = ab.length_squared();
    if ab_sq < 1e-24 {
        return a;
    }
    let t = ((p - a).dot(ab) / ab_sq).clamp(0.0, 1.0);
    a + ab * t
}

pub(crate) fn point_in_polygon(p: Vec2, verts: &[Vec2]) -> bool {
    let n = verts.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = verts[i];
        let vj = verts[j];
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
