//! Articulated joints. Each variant owns its parameters and solver state;
//! `Joint` carries the fields every variant shares and dispatches the solve
//! lifecycle: `initialize` -> n x `solve_velocity` -> m x `solve_position`.

pub mod angle;
pub mod distance;
pub mod friction;
pub mod motor;
pub mod pin;
pub mod prismatic;
pub mod pulley;
pub mod revolute;
pub mod rope;
pub mod weld;
pub mod wheel;

pub use angle::AngleJoint;
pub use distance::DistanceJoint;
pub use friction::FrictionJoint;
pub use motor::MotorJoint;
pub use pin::PinJoint;
pub use prismatic::PrismaticJoint;
pub use pulley::PulleyJoint;
pub use revolute::RevoluteJoint;
pub use rope::RopeJoint;
pub use weld::WeldJoint;
pub use wheel::WheelJoint;

use crate::error::Error;
use crate::geometry::Vec2;

use super::body::{Body, BodyId, body_pair_mut};
use super::settings::Settings;
use super::timestep::TimeStep;

pub type JointId = u32;

/// State of a joint with respect to its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitState {
    #[default]
    Inactive,
    AtLower,
    AtUpper,
    /// Upper and lower limit coincide within tolerance; solved as equality.
    Equal,
}

#[derive(Debug, Clone)]
pub enum JointKind {
    Angle(AngleJoint),
    Distance(DistanceJoint),
    Friction(FrictionJoint),
    Motor(MotorJoint),
    Pin(PinJoint),
    Prismatic(PrismaticJoint),
    Pulley(PulleyJoint),
    Revolute(RevoluteJoint),
    Rope(RopeJoint),
    Weld(WeldJoint),
    Wheel(WheelJoint),
}

/// A constraint between two bodies (the pin variant anchors one body to a
/// world point and stores the same id twice).
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) id: JointId,
    pub(crate) body1: BodyId,
    pub(crate) body2: BodyId,
    pub collision_allowed: bool,
    pub user_data: u64,
    kind: JointKind,
}

impl Joint {
    pub(crate) fn new(body1: BodyId, body2: BodyId, kind: JointKind) -> Self {
        Self {
            id: 0,
            body1,
            body2,
            collision_allowed: false,
            user_data: 0,
            kind,
        }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn body1(&self) -> BodyId {
        self.body1
    }

    pub fn body2(&self) -> BodyId {
        self.body2
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut JointKind {
        &mut self.kind
    }

    /// True for the pin variant, which constrains a single body.
    pub fn is_unary(&self) -> bool {
        matches!(self.kind, JointKind::Pin(_))
    }

    /// Rejects configurations the solver cannot initialize, before any
    /// warm-start impulse has been applied.
    pub(crate) fn validate(&self, bodies: &[Option<Body>]) -> Result<(), Error> {
        if let JointKind::Revolute(j) = &self.kind {
            if j.is_motor_enabled() {
                let i1 = bodies[self.body1 as usize].as_ref().unwrap().inv_inertia();
                let i2 = bodies[self.body2 as usize].as_ref().unwrap().inv_inertia();
                if i1 == 0.0 && i2 == 0.0 {
                    return Err(Error::InvalidState(
                        "revolute motor requires at least one body with finite inertia",
                    ));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn initialize(
        &mut self,
        bodies: &mut [Option<Body>],
        step: &TimeStep,
        settings: &Settings,
    ) -> Result<(), Error> {
        if let JointKind::Pin(joint) = &mut self.kind {
            let body = bodies[self.body1 as usize].as_mut().unwrap();
            joint.initialize(body, step, settings);
            return Ok(());
        }
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);
        match &mut self.kind {
            JointKind::Angle(j) => j.initialize(b1, b2, step, settings),
            JointKind::Distance(j) => j.initialize(b1, b2, step, settings),
            JointKind::Friction(j) => j.initialize(b1, b2, step, settings),
            JointKind::Motor(j) => j.initialize(b1, b2, step, settings),
            JointKind::Prismatic(j) => j.initialize(b1, b2, step, settings),
            JointKind::Pulley(j) => j.initialize(b1, b2, step, settings),
            JointKind::Revolute(j) => return j.initialize(b1, b2, step, settings),
            JointKind::Rope(j) => j.initialize(b1, b2, step, settings),
            JointKind::Weld(j) => j.initialize(b1, b2, step, settings),
            JointKind::Wheel(j) => j.initialize(b1, b2, step, settings),
            JointKind::Pin(_) => unreachable!(),
        }
        Ok(())
    }

    pub(crate) fn solve_velocity(
        &mut self,
        bodies: &mut [Option<Body>],
        step: &TimeStep,
        settings: &Settings,
    ) {
        if let JointKind::Pin(joint) = &mut self.kind {
            let body = bodies[self.body1 as usize].as_mut().unwrap();
            joint.solve_velocity(body, step, settings);
            return;
        }
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);
        match &mut self.kind {
            JointKind::Angle(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Distance(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Friction(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Motor(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Prismatic(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Pulley(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Revolute(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Rope(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Weld(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Wheel(j) => j.solve_velocity(b1, b2, step, settings),
            JointKind::Pin(_) => unreachable!(),
        }
    }

    /// Returns true when the joint's position error is within tolerance.
    pub(crate) fn solve_position(
        &mut self,
        bodies: &mut [Option<Body>],
        step: &TimeStep,
        settings: &Settings,
    ) -> bool {
        if let JointKind::Pin(joint) = &mut self.kind {
            let body = bodies[self.body1 as usize].as_mut().unwrap();
            return joint.solve_position(body, step, settings);
        }
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);
        match &mut self.kind {
            JointKind::Angle(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Distance(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Friction(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Motor(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Prismatic(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Pulley(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Revolute(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Rope(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Weld(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Wheel(j) => j.solve_position(b1, b2, step, settings),
            JointKind::Pin(_) => unreachable!(),
        }
    }

    /// Move any world-space anchors by `v`; local-space anchors need no work.
    pub fn shift(&mut self, v: Vec2) {
        match &mut self.kind {
            JointKind::Pin(j) => j.shift(v),
            JointKind::Pulley(j) => j.shift(v),
            _ => {}
        }
    }

    /// Constraint force applied over the last step, scaled by `inv_dt`.
    pub fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        match &self.kind {
            JointKind::Angle(j) => j.reaction_force(inv_dt),
            JointKind::Distance(j) => j.reaction_force(inv_dt),
            JointKind::Friction(j) => j.reaction_force(inv_dt),
            JointKind::Motor(j) => j.reaction_force(inv_dt),
            JointKind::Pin(j) => j.reaction_force(inv_dt),
            JointKind::Prismatic(j) => j.reaction_force(inv_dt),
            JointKind::Pulley(j) => j.reaction_force(inv_dt),
            JointKind::Revolute(j) => j.reaction_force(inv_dt),
            JointKind::Rope(j) => j.reaction_force(inv_dt),
            JointKind::Weld(j) => j.reaction_force(inv_dt),
            JointKind::Wheel(j) => j.reaction_force(inv_dt),
        }
    }

    /// Constraint torque applied over the last step, scaled by `inv_dt`.
    pub fn reaction_torque(&self, inv_dt: f64) -> f64 {
        match &self.kind {
            JointKind::Angle(j) => j.reaction_torque(inv_dt),
            JointKind::Distance(j) => j.reaction_torque(inv_dt),
            JointKind::Friction(j) => j.reaction_torque(inv_dt),
            JointKind::Motor(j) => j.reaction_torque(inv_dt),
            JointKind::Pin(j) => j.reaction_torque(inv_dt),
            JointKind::Prismatic(j) => j.reaction_torque(inv_dt),
            JointKind::Pulley(j) => j.reaction_torque(inv_dt),
            JointKind::Revolute(j) => j.reaction_torque(inv_dt),
            JointKind::Rope(j) => j.reaction_torque(inv_dt),
            JointKind::Weld(j) => j.reaction_torque(inv_dt),
            JointKind::Wheel(j) => j.reaction_torque(inv_dt),
        }
    }
}

/// Validates that a joint connects two distinct bodies.
pub(crate) fn distinct(b1: &Body, b2: &Body) -> Result<(), Error> {
    if b1.id() == b2.id() {
        return Err(Error::InvalidArgument("joint requires two distinct bodies"));
    }
    Ok(())
}

/// Wrap an angle into (-pi, pi].
pub(crate) fn wrap_angle(mut a: f64) -> f64 {
    use std::f64::consts::PI;
    while a <= -PI {
        a += 2.0 * PI;
    }
    while a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Solve `K x = b` for a row-major 2x2 matrix; zero when singular.
pub(crate) fn solve22(k: &[f64; 4], b: Vec2) -> Vec2 {
    let det = k[0] * k[3] - k[1] * k[2];
    if det.abs() < f64::EPSILON {
        return Vec2::ZERO;
    }
    let inv = 1.0 / det;
    Vec2::new(
        inv * (k[3] * b.x - k[1] * b.y),
        inv * (k[0] * b.y - k[2] * b.x),
    )
}

/// Solve `K x = b` for a row-major symmetric 3x3 matrix via Cramer's rule;
/// zero when singular.
pub(crate) fn solve33(k: &[f64; 9], b: [f64; 3]) -> [f64; 3] {
    let det = k[0] * (k[4] * k[8] - k[5] * k[7]) - k[1] * (k[3] * k[8] - k[5] * k[6])
        + k[2] * (k[3] * k[7] - k[4] * k[6]);
    if det.abs() < f64::EPSILON {
        return [0.0; 3];
    }
    let inv = 1.0 / det;
    let x = b[0] * (k[4] * k[8] - k[5] * k[7]) - k[1] * (b[1] * k[8] - k[5] * b[2])
        + k[2] * (b[1] * k[7] - k[4] * b[2]);
    let y = k[0] * (b[1] * k[8] - k[5] * b[2]) - b[0] * (k[3] * k[8] - k[5] * k[6])
        + k[2] * (k[3] * b[2] - b[1] * k[6]);
    let z = k[0] * (k[4] * b[2] - b[1] * k[7]) - k[1] * (k[3] * b[2] - b[1] * k[6])
        + b[0] * (k[3] * k[7] - k[4] * k[6]);
    [x * inv, y * inv, z * inv]
}

/// Solve the top-left 2x2 block of a row-major 3x3 matrix.
pub(crate) fn solve22_of33(k: &[f64; 9], b: Vec2) -> Vec2 {
    solve22(&[k[0], k[1], k[3], k[4]], b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn wrap_angle_stays_in_half_open_interval() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn solve22_inverts_a_known_system() {
        let k = [2.0, 1.0, 1.0, 3.0];
        let x = solve22(&k, Vec2::new(5.0, 10.0));
        assert!((2.0 * x.x + x.y - 5.0).abs() < 1e-12);
        assert!((x.x + 3.0 * x.y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn solve33_inverts_a_known_system() {
        let k = [4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        let x = solve33(&k, b);
        assert!((4.0 * x[0] + x[1] - 1.0).abs() < 1e-12);
        assert!((x[0] + 3.0 * x[1] + x[2] - 2.0).abs() < 1e-12);
        assert!((x[1] + 2.0 * x[2] - 3.0).abs() < 1e-12);
    }
}
