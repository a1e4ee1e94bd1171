use super::Vec2;

/// Rigid 2D transform: a rotation about the origin followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    /// Rotation angle in radians.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec2::ZERO,
        rotation: 0.0,
    };

    pub fn new(translation: Vec2, rotation: f64) -> Self {
        Self { translation, rotation }
    }

    /// Local point to world space.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.apply_rotation(point) + self.translation
    }

    /// World point to local space.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.apply_inverse_rotation(point - self.translation)
    }

    /// Rotate a vector (no translation).
    pub fn apply_rotation(&self, v: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Inverse-rotate a vector (no translation).
    pub fn apply_inverse_rotation(&self, v: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos)
    }

    /// Linear interpolation of translation and rotation, used for
    /// time-of-impact poses.
    pub fn lerp(&self, end: &Transform, t: f64) -> Transform {
        Transform {
            translation: self.translation.lerp(end.translation, t),
            rotation: self.rotation + (end.rotation - self.rotation) * t,
        }
    }

    /// Shift the translation by `v` (world coordinate shifting).
    pub fn shift(&mut self, v: Vec2) {
        self.translation += v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn apply_round_trips_through_inverse() {
        let tx = Transform::new(Vec2::new(3.0, -1.0), 0.7);
        let p = Vec2::new(-2.0, 5.0);
        let back = tx.apply_inverse(tx.apply(p));
        assert!((back - p).length() < 1e-12);
    }

    #[test]
    fn quarter_turn_rotates_x_to_y() {
        let tx = Transform::new(Vec2::ZERO, FRAC_PI_2);
        let r = tx.apply(Vec2::X);
        assert!((r - Vec2::Y).length() < 1e-12);
    }
}
