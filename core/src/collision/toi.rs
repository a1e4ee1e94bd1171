use super::narrowphase::{NarrowphaseDetector, Sat};
use crate::geometry::{Shape, Transform, Vec2};

/// Earliest time of impact over a motion window, normalized to [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Toi {
    pub t: f64,
}

/// Detects the first time two moving shapes touch over the step's motion.
/// Only translational motion needs to be resolved exactly; bullet CCD is
/// scoped to translation.
pub trait TimeOfImpactDetector {
    fn time_of_impact(
        &self,
        s1: &Shape,
        t1_begin: &Transform,
        t1_end: &Transform,
        s2: &Shape,
        t2_begin: &Transform,
        t2_end: &Transform,
    ) -> Option<Toi>;
}

/// Analytic cast for circle pairs, sampled advancement with bisection
/// refinement for everything else.
#[derive(Debug, Clone, Copy)]
pub struct ConservativeAdvancement {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ConservativeAdvancement {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 32,
        }
    }
}

impl TimeOfImpactDetector for ConservativeAdvancement {
    fn time_of_impact(
        &self,
        s1: &Shape,
        t1_begin: &Transform,
        t1_end: &Transform,
        s2: &Shape,
        t2_begin: &Transform,
        t2_end: &Transform,
    ) -> Option<Toi> {
        if let (Shape::Circle { radius: r1 }, Shape::Circle { radius: r2 }) = (s1, s2) {
            return circle_cast(
                t1_begin.translation,
                t1_end.translation,
                *r1,
                t2_begin.translation,
                t2_end.translation,
                *r2,
            );
        }
        self.sampled_advancement(s1, t1_begin, t1_end, s2, t2_begin, t2_end)
    }
}

impl ConservativeAdvancement {
    /// Step through the motion looking for the first overlapping pose, then
    /// bisect back to the touching time. The sample count is sized so no
    /// sample advances the relative motion by more than a fraction of the
    /// smaller shape.
    fn sampled_advancement(
        &self,
        s1: &Shape,
        t1_begin: &Transform,
        t1_end: &Transform,
        s2: &Shape,
        t2_begin: &Transform,
        t2_end: &Transform,
    ) -> Option<Toi> {
        let detector = Sat;
        let overlap_at = |t: f64| {
            let p1 = t1_begin.lerp(t1_end, t);
            let p2 = t2_begin.lerp(t2_end, t);
            detector.detect(s1, &p1, s2, &p2).is_some()
        };

        if overlap_at(0.0) {
            // Already touching; the discrete solver owns this contact.
            return None;
        }

        let rel = (t2_end.translation - t2_begin.translation)
            - (t1_end.translation - t1_begin.translation);
        let feature = s1.bounding_radius().min(s2.bounding_radius()).max(1e-3);
        let samples = ((rel.length() / (0.25 * feature)).ceil() as usize).clamp(4, 128);

        let mut prev_t = 0.0;
        let mut hit_t = None;
        for i in 1..=samples {
            let t = i as f64 / samples as f64;
            if overlap_at(t) {
                hit_t = Some(t);
                break;
            }
            prev_t = t;
        }
        let mut hi = hit_t?;
        let mut lo = prev_t;

        for _ in 0..self.max_iterations {
            if hi - lo < self.tolerance {
                break;
            }
            let mid = 0.5 * (lo + hi);
            if overlap_at(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Some(Toi { t: lo })
    }
}

/// Relative-motion ray against the inflated circle: smallest root of
/// |d0 + t·v|² = (r1 + r2)² in (0, 1].
fn circle_cast(c1_0: Vec2, c1_1: Vec2, r1: f64, c2_0: Vec2, c2_1: Vec2, r2: f64) -> Option<Toi> {
    let d0 = c2_0 - c1_0;
    let v = (c2_1 - c2_0) - (c1_1 - c1_0);
    let radius = r1 + r2;

    if d0.length_squared() < radius * radius {
        return None;
    }

    let a = v.length_squared();
    if a < 1e-24 {
        return None;
    }
    let b = 2.0 * d0.dot(v);
    let c = d0.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t > 0.0 && t <= 1.0 { Some(Toi { t }) } else { None }
}
