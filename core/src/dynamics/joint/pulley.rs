use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, distinct};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Links two bodies by a virtual rope through two fixed pulley anchors:
/// `len1 + ratio * len2` is held at its initial value. With slack enabled
/// the rope only constrains when taut.
#[derive(Debug, Clone)]
pub struct PulleyJoint {
    pulley_anchor1: Vec2,
    pulley_anchor2: Vec2,
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    ratio: f64,
    target_length: f64,
    slack_enabled: bool,

    // solver state
    n1: Vec2,
    n2: Vec2,
    r1: Vec2,
    r2: Vec2,
    mass: f64,
    impulse: f64,
    taut: bool,
}

impl Joint {
    /// Pulley joint routing body anchors over the given world pulley
    /// anchors with ratio 1; the current total length is held.
    pub fn pulley(
        b1: &Body,
        b2: &Body,
        pulley_anchor1: Vec2,
        pulley_anchor2: Vec2,
        anchor1: Vec2,
        anchor2: Vec2,
    ) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        let target_length = (anchor1 - pulley_anchor1).length() + (anchor2 - pulley_anchor2).length();
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Pulley(PulleyJoint {
                pulley_anchor1,
                pulley_anchor2,
                local_anchor1: b1.transform().apply_inverse(anchor1),
                local_anchor2: b2.transform().apply_inverse(anchor2),
                ratio: 1.0,
                target_length,
                slack_enabled: false,
                n1: Vec2::ZERO,
                n2: Vec2::ZERO,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                mass: 0.0,
                impulse: 0.0,
                taut: true,
            }),
        ))
    }
}

impl PulleyJoint {
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// The target total length is unchanged; callers that want the rope
    /// re-tensioned at the new ratio also call `set_target_length`.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), Error> {
        if ratio <= 0.0 {
            return Err(Error::InvalidArgument("pulley ratio must be positive"));
        }
        self.ratio = ratio;
        Ok(())
    }

    pub fn target_length(&self) -> f64 {
        self.target_length
    }

    pub fn set_target_length(&mut self, length: f64) -> Result<(), Error> {
        if length < 0.0 {
            return Err(Error::InvalidArgument("target length must be non-negative"));
        }
        self.target_length = length;
        Ok(())
    }

    pub fn is_slack_enabled(&self) -> bool {
        self.slack_enabled
    }

    pub fn set_slack_enabled(&mut self, enabled: bool) {
        self.slack_enabled = enabled;
    }

    pub(super) fn shift(&mut self, v: Vec2) {
        self.pulley_anchor1 += v;
        self.pulley_anchor2 += v;
    }

    pub(super) fn initialize(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        step: &TimeStep,
        _settings: &Settings,
    ) {
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        self.r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        self.r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let p1 = b1.world_center() + self.r1;
        let p2 = b2.world_center() + self.r2;

        let d1 = p1 - self.pulley_anchor1;
        let d2 = p2 - self.pulley_anchor2;
        let l1 = d1.length();
        let l2 = d2.length();
        self.n1 = if l1 > 1e-12 { d1 / l1 } else { Vec2::ZERO };
        self.n2 = if l2 > 1e-12 { d2 / l2 } else { Vec2::ZERO };

        // With slack the rope only pulls once it is over length.
        self.taut = !self.slack_enabled || (l1 + self.ratio * l2) > self.target_length;
        if !self.taut {
            self.impulse = 0.0;
            return;
        }

        let rn1 = cross(self.r1, self.n1);
        let rn2 = cross(self.r2, self.n2);
        let inv_mass =
            m1 + i1 * rn1 * rn1 + self.ratio * self.ratio * (m2 + i2 * rn2 * rn2);
        self.mass = if inv_mass > f64::EPSILON { 1.0 / inv_mass } else { 0.0 };

        // warm start: positive impulse pulls each body toward its pulley.
        self.impulse *= step.dt_ratio;
        let j1 = self.n1 * -self.impulse;
        let j2 = self.n2 * (-self.ratio * self.impulse);
        b1.velocity += j1 * m1;
        b1.angular_velocity += i1 * cross(self.r1, j1);
        b2.velocity += j2 * m2;
        b2.angular_velocity += i2 * cross(self.r2, j2);
    }

    pub(super) fn solve_velocity(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        _settings: &Settings,
    ) {
        if !self.taut {
            return;
        }
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let v1 = b1.velocity + cross_sv(b1.angular_velocity, self.r1);
        let v2 = b2.velocity + cross_sv(b2.angular_velocity, self.r2);
        // Negated rate of change of total rope length, so a positive
        // accumulated impulse means the rope is pulling.
        let cdot = -self.n1.dot(v1) - self.ratio * self.n2.dot(v2);

        let impulse = -self.mass * cdot;
        self.impulse += impulse;

        let j1 = self.n1 * -impulse;
        let j2 = self.n2 * (-self.ratio * impulse);
        b1.velocity += j1 * m1;
        b1.angular_velocity += i1 * cross(self.r1, j1);
        b2.velocity += j2 * m2;
        b2.angular_velocity += i2 * cross(self.r2, j2);
    }

    pub(super) fn solve_position(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        settings: &Settings,
    ) -> bool {
        if !self.taut {
            return true;
        }
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let p1 = b1.world_center() + r1;
        let p2 = b2.world_center() + r2;

        let d1 = p1 - self.pulley_anchor1;
        let d2 = p2 - self.pulley_anchor2;
        let l1 = d1.length();
        let l2 = d2.length();
        let n1 = if l1 > 1e-12 { d1 / l1 } else { Vec2::ZERO };
        let n2 = if l2 > 1e-12 { d2 / l2 } else { Vec2::ZERO };

        let mut error = l1 + self.ratio * l2 - self.target_length;
        if self.slack_enabled {
            error = error.max(0.0);
        }
        let correction = error.clamp(
            -settings.max_linear_correction(),
            settings.max_linear_correction(),
        );

        let rn1 = cross(r1, n1);
        let rn2 = cross(r2, n2);
        let inv_mass = m1 + i1 * rn1 * rn1 + self.ratio * self.ratio * (m2 + i2 * rn2 * rn2);
        if inv_mass > f64::EPSILON {
            let impulse = correction / inv_mass;
            let j1 = n1 * -impulse;
            let j2 = n2 * (-self.ratio * impulse);
            b1.translate(j1 * m1);
            b1.rotate_about_center(i1 * cross(r1, j1));
            b2.translate(j2 * m2);
            b2.rotate_about_center(i2 * cross(r2, j2));
        }

        error.abs() <= settings.linear_tolerance()
    }

    /// Force applied to body2 by the rope over the last step.
    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.n2 * (-self.ratio * self.impulse * inv_dt)
    }

    pub(super) fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }
}
