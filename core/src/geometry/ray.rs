use super::{Shape, Transform, Vec2};

/// A ray with unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray {
    /// Returns `None` if `direction` is degenerate.
    pub fn new(origin: Vec2, direction: Vec2) -> Option<Self> {
        let len = direction.length();
        if len < 1e-12 {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / len,
        })
    }

    pub fn point_at(&self, t: f64) -> Vec2 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// Distance along the ray.
    pub t: f64,
    pub point: Vec2,
}

/// Closest intersection of `ray` with a transformed shape within `max_dist`.
pub fn raycast(ray: &Ray, shape: &Shape, tx: &Transform, max_dist: f64) -> Option<RaycastHit> {
    let t = match shape {
        Shape::Circle { radius } => ray_vs_circle(ray, tx.translation, *radius),
        Shape::Polygon { vertices } => ray_vs_polygon(ray, tx, vertices),
    }?;
    if t < 0.0 || t > max_dist {
        return None;
    }
    Some(RaycastHit {
        t,
        point: ray.point_at(t),
    })
}

fn ray_vs_circle(ray: &Ray, center: Vec2, radius: f64) -> Option<f64> {
    let f = ray.origin - center;
    let b = 2.0 * f.dot(ray.direction);
    let c = f.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) * 0.5;
    let t2 = (-b + sqrt_d) * 0.5;
    if t1 >= 0.0 {
        Some(t1)
    } else if t2 >= 0.0 {
        Some(t2)
    } else {
        None
    }
}

fn ray_vs_polygon(ray: &Ray, tx: &Transform, vertices: &[Vec2]) -> Option<f64> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }
    let mut closest: Option<f64> = None;
    for i in 0..n {
        let a = tx.apply(vertices[i]);
        let b = tx.apply(vertices[(i + 1) % n]);
        if let Some(t) = ray_vs_segment(ray, a, b) {
            if closest.is_none_or(|c| t < c) {
                closest = Some(t);
            }
        }
    }
    closest
}

fn ray_vs_segment(ray: &Ray, a: Vec2, b: Vec2) -> Option<f64> {
    let e = b - a;
    let denom = ray.direction.x * e.y - ray.direction.y * e.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let d = a - ray.origin;
    let t = (d.x * e.y - d.y * e.x) / denom;
    let u = (d.x * ray.direction.y - d.y * ray.direction.x) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_circle_front_face() {
        let ray = Ray::new(Vec2::new(-5.0, 0.0), Vec2::X).unwrap();
        let hit = raycast(&ray, &Shape::circle(1.0), &Transform::IDENTITY, 100.0).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert!((hit.point - Vec2::new(-1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn ray_misses_offset_polygon() {
        let ray = Ray::new(Vec2::new(0.0, 10.0), Vec2::X).unwrap();
        let tx = Transform::new(Vec2::new(5.0, 0.0), 0.0);
        assert!(raycast(&ray, &Shape::rectangle(2.0, 2.0), &tx, 100.0).is_none());
    }

    #[test]
    fn ray_respects_max_distance() {
        let ray = Ray::new(Vec2::new(-5.0, 0.0), Vec2::X).unwrap();
        assert!(raycast(&ray, &Shape::circle(1.0), &Transform::IDENTITY, 3.0).is_none());
    }
}
