pub mod aabb;
pub mod mass;
pub mod ray;
pub mod shape;
pub mod transform;

pub use aabb::Aabb;
pub use mass::{Mass, MassData, MassType};
pub use ray::{Ray, RaycastHit};
pub use shape::Shape;
pub use transform::Transform;

/// All linear algebra runs in f64; the solver's conservation guarantees are
/// stated to 1e-9.
pub type Vec2 = glam::DVec2;

/// 2D cross product (z component of the 3D cross).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Cross of a scalar (angular velocity) with a vector: `s × v = (-s·v.y, s·v.x)`.
#[inline]
pub fn cross_sv(s: f64, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}
