use crate::collision::{Manifold, ManifoldPointId, ValueMixer};
use crate::dynamics::body::{Body, BodyId};
use crate::geometry::Vec2;

/// Identity of a collision pair: two (body, fixture) halves, stored with the
/// smaller body id first so lookups are order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactKey {
    pub body1: BodyId,
    pub fixture1: usize,
    pub body2: BodyId,
    pub fixture2: usize,
}

impl ContactKey {
    pub fn new(body1: BodyId, fixture1: usize, body2: BodyId, fixture2: usize) -> Self {
        if body1 <= body2 {
            Self { body1, fixture1, body2, fixture2 }
        } else {
            Self {
                body1: body2,
                fixture1: fixture2,
                body2: body1,
                fixture2: fixture1,
            }
        }
    }
}

/// One solvable contact point with its warm-start cache and effective masses.
#[derive(Debug, Clone, Copy)]
pub struct SolvableContact {
    pub id: ManifoldPointId,
    /// World-space point at constraint creation.
    pub point: Vec2,
    pub depth: f64,
    /// Accumulated normal impulse.
    pub jn: f64,
    /// Accumulated tangent impulse.
    pub jt: f64,
    /// Restitution bias: e times the approach speed (negative while
    /// approaching), zero below the restitution-velocity threshold.
    pub(crate) vb: f64,
    pub(crate) mass_n: f64,
    pub(crate) mass_t: f64,
    /// Arms from each body's center of mass, fixed at init.
    pub(crate) r1: Vec2,
    pub(crate) r2: Vec2,
    /// Local-frame copies of the contact point, used to re-derive the
    /// penetration as the position solver moves the bodies.
    pub(crate) local1: Vec2,
    pub(crate) local2: Vec2,
    /// Dropped from the solve due to an ill-conditioned block matrix.
    pub(crate) ignored: bool,
}

impl SolvableContact {
    fn new(point: Vec2, depth: f64, id: ManifoldPointId) -> Self {
        Self {
            id,
            point,
            depth,
            jn: 0.0,
            jt: 0.0,
            vb: 0.0,
            mass_n: 0.0,
            mass_t: 0.0,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            local1: Vec2::ZERO,
            local2: Vec2::ZERO,
            ignored: false,
        }
    }
}

/// The per-manifold constraint handed to the sequential-impulse solver:
/// shared normal/tangent basis, mixed material values, and up to two
/// solvable points.
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    pub key: ContactKey,
    pub normal: Vec2,
    pub tangent: Vec2,
    pub contacts: Vec<SolvableContact>,
    pub friction: f64,
    pub restitution: f64,
    pub restitution_velocity: f64,
    /// True iff either fixture is a sensor; sensors never enter the solver.
    pub sensor: bool,
    /// Cleared by a listener veto; a disabled constraint is skipped for the
    /// step.
    pub enabled: bool,
    /// Active contact count after degenerate handling (1 or 2).
    pub(crate) size: usize,
    /// 2x2 block effective-mass matrix for the normal impulses, row-major,
    /// valid when `size == 2`.
    pub(crate) k: [f64; 4],
    pub(crate) inv_k: [f64; 4],
}

impl ContactConstraint {
    /// Build a constraint from a manifold. The normal follows the manifold
    /// (first body toward second, in key order); the tangent is the normal
    /// rotated a quarter turn.
    pub fn new(
        key: ContactKey,
        manifold: &Manifold,
        body1: &Body,
        body2: &Body,
        mixer: &dyn ValueMixer,
    ) -> Self {
        let f1 = &body1.fixtures()[key.fixture1];
        let f2 = &body2.fixtures()[key.fixture2];
        let normal = manifold.normal;
        let contacts = manifold
            .points
            .iter()
            .map(|p| SolvableContact::new(p.point, p.depth, p.id))
            .collect();
        Self {
            key,
            normal,
            tangent: normal.perp(),
            contacts,
            friction: mixer.mix_friction(f1.friction(), f2.friction()),
            restitution: mixer.mix_restitution(f1.restitution(), f2.restitution()),
            restitution_velocity: mixer
                .mix_restitution_velocity(f1.restitution_velocity(), f2.restitution_velocity()),
            sensor: f1.sensor || f2.sensor,
            enabled: true,
            size: 0,
            k: [0.0; 4],
            inv_k: [0.0; 4],
        }
    }

    /// True when this constraint participates in the velocity/position solve.
    pub(crate) fn is_solvable(&self) -> bool {
        self.enabled && !self.sensor && !self.contacts.is_empty()
    }
}
