use super::{Aabb, MassData, Transform, Vec2, cross};

/// Planar convex shape. Polygon vertices are counter-clockwise and local to
/// the shape's frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    pub fn circle(radius: f64) -> Self {
        Shape::Circle { radius }
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        Shape::Polygon { vertices }
    }

    /// Axis-aligned box of the given full width/height, centered at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        }
    }

    /// Mass, center of mass, and rotational inertia about the center for a
    /// uniform density.
    pub fn mass_data(&self, density: f64) -> MassData {
        match self {
            Shape::Circle { radius } => {
                let mass = density * std::f64::consts::PI * radius * radius;
                MassData {
                    center: Vec2::ZERO,
                    mass,
                    inertia: 0.5 * mass * radius * radius,
                }
            }
            Shape::Polygon { vertices } => polygon_mass_data(vertices, density),
        }
    }

    /// World-space bounding box under `tx`.
    pub fn aabb(&self, tx: &Transform) -> Aabb {
        match self {
            Shape::Circle { radius } => {
                let r = Vec2::splat(*radius);
                Aabb::new(tx.translation - r, tx.translation + r)
            }
            Shape::Polygon { vertices } => {
                let mut min = Vec2::splat(f64::MAX);
                let mut max = Vec2::splat(f64::MIN);
                for &v in vertices {
                    let w = tx.apply(v);
                    min = min.min(w);
                    max = max.max(w);
                }
                Aabb::new(min, max)
            }
        }
    }

    /// Radius of the smallest origin-centered disk containing the shape.
    /// Used to bound rotational sweep during time-of-impact detection.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { vertices } => vertices
                .iter()
                .map(|v| v.length())
                .fold(0.0, f64::max),
        }
    }
}

/// Exact area, centroid, and inertia for a simple polygon via the shoelace
/// decomposition into origin-anchored triangles.
fn polygon_mass_data(vertices: &[Vec2], density: f64) -> MassData {
    let n = vertices.len();
    if n < 3 {
        return MassData {
            center: Vec2::ZERO,
            mass: 0.0,
            inertia: 0.0,
        };
    }

    let mut area = 0.0;
    let mut center = Vec2::ZERO;
    let mut inertia = 0.0;

    for i in 0..n {
        let p0 = vertices[i];
        let p1 = vertices[(i + 1) % n];
        let c = cross(p0, p1);
        area += c;
        center += (p0 + p1) * c;
        inertia += c * (p0.dot(p0) + p0.dot(p1) + p1.dot(p1));
    }

    area *= 0.5;
    if area.abs() < f64::EPSILON {
        return MassData {
            center: Vec2::ZERO,
            mass: 0.0,
            inertia: 0.0,
        };
    }

    center /= 6.0 * area;
    let mass = density * area;
    // Inertia above is about the origin; shift to the centroid.
    let inertia_origin = density * inertia / 12.0;
    let inertia_center = inertia_origin - mass * center.length_squared();

    MassData {
        center,
        mass,
        inertia: inertia_center,
    }
}
