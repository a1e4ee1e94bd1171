use crate::error::Error;
use crate::geometry::{Vec2, cross};

use super::{Joint, JointKind, distinct, solve22};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Resists all relative motion at an anchor, capped by a maximum force and
/// torque. Top-down friction without a contact surface.
#[derive(Debug, Clone)]
pub struct FrictionJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    max_force: f64,
    max_torque: f64,

    // solver state
    r1: Vec2,
    r2: Vec2,
    k: [f64; 4],
    angular_mass: f64,
    linear_impulse: Vec2,
    angular_impulse: f64,
}

impl Joint {
    /// Friction joint anchored at the given world point.
    pub fn friction(b1: &Body, b2: &Body, anchor: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Friction(FrictionJoint {
                local_anchor1: b1.transform().apply_inverse(anchor),
                local_anchor2: b2.transform().apply_inverse(anchor),
                max_force: 0.0,
                max_torque: 0.0,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                k: [0.0; 4],
                angular_mass: 0.0,
                linear_impulse: Vec2::ZERO,
                angular_impulse: 0.0,
            }),
        ))
    }
}

impl FrictionJoint {
    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    pub fn set_max_force(&mut self, force: f64) -> Result<(), Error> {
        if force < 0.0 {
            return Err(Error::InvalidArgument("maximum force must be non-negative"));
        }
        self.max_force = force;
        Ok(())
    }

    pub fn max_torque(&self) -> f64 {
        self.max_torque
    }

    pub fn set_max_torque(&mut self, torque: f64) -> Result<(), Error> {
        if torque < 0.0 {
            return Err(Error::InvalidArgument("maximum torque must be non-negative"));
        }
        self.max_torque = torque;
        Ok(())
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

        self.k = [
            m1 + m2 + self.r1.y * self.r1.y * i1 + self.r2.y * self.r2.y * i2,
            -self.r1.x * self.r1.y * i1 - self.r2.x * self.r2.y * i2,
            -self.r1.x * self.r1.y * i1 - self.r2.x * self.r2.y * i2,
            m1 + m2 + self.r1.x * self.r1.x * i1 + self.r2.x * self.r2.x * i2,
        ];
        let inv_angular = i1 + i2;
        self.angular_mass = if inv_angular > f64::EPSILON {
            1.0 / inv_angular
        } else {
            0.0
        };

        // warm start
        self.linear_impulse *= step.dt_ratio;
        self.angular_impulse *= step.dt_ratio;
        let j = self.linear_impulse;
        b1.velocity += j * m1;
        b1.angular_velocity += i1 * (cross(self.r1, j) + self.angular_impulse);
        b2.velocity -= j * m2;
        b2.angular_velocity -= i2 * (cross(self.r2, j) + self.angular_impulse);
    }

    pub(super) fn solve_velocity(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        step: &TimeStep,
        _settings: &Settings,
    ) {
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        // angular
        {
            let c = b1.angular_velocity - b2.angular_velocity;
            let impulse = -self.angular_mass * c;
            let max = self.max_torque * step.dt;
            let old = self.angular_impulse;
            self.angular_impulse = (old + impulse).clamp(-max, max);
            let delta = self.angular_impulse - old;
            b1.angular_velocity += i1 * delta;
            b2.angular_velocity -= i2 * delta;
        }

        // linear
        {
            let rv = (b1.velocity + crate::geometry::cross_sv(b1.angular_velocity, self.r1))
                - (b2.velocity + crate::geometry::cross_sv(b2.angular_velocity, self.r2));
            let impulse = solve22(&self.k, -rv);
            let old = self.linear_impulse;
            let mut total = old + impulse;
            let max = self.max_force * step.dt;
            if total.length_squared() > max * max {
                total = total.normalize() * max;
            }
            self.linear_impulse = total;
            let delta = total - old;
            b1.velocity += delta * m1;
            b1.angular_velocity += i1 * cross(self.r1, delta);
            b2.velocity -= delta * m2;
            b2.angular_velocity -= i2 * cross(self.r2, delta);
        }
    }

    pub(super) fn solve_position(
        &mut self,
        _b1: &mut Body,
        _b2: &mut Body,
        _step: &TimeStep,
        _settings: &Settings,
    ) -> bool {
        // Friction has no position target.
        true
    }

    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.linear_impulse * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.angular_impulse * inv_dt
    }
}
