use std::f64::consts::TAU;

use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, distinct};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Holds the separation of two anchors at a rest distance. With a positive
/// frequency the equality becomes a spring-damper soft constraint and the
/// position solver is skipped.
#[derive(Debug, Clone)]
pub struct DistanceJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    rest_distance: f64,
    /// 0 disables the spring (rigid equality).
    frequency: f64,
    damping_ratio: f64,

    // solver state
    n: Vec2,
    r1: Vec2,
    r2: Vec2,
    mass: f64,
    gamma: f64,
    bias: f64,
    impulse: f64,
}

impl Joint {
    /// Distance joint between two world anchors; the current separation
    /// becomes the rest distance.
    pub fn distance(b1: &Body, b2: &Body, anchor1: Vec2, anchor2: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Distance(DistanceJoint {
                local_anchor1: b1.transform().apply_inverse(anchor1),
                local_anchor2: b2.transform().apply_inverse(anchor2),
                rest_distance: (anchor2 - anchor1).length(),
                frequency: 0.0,
                damping_ratio: 0.0,
                n: Vec2::ZERO,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                mass: 0.0,
                gamma: 0.0,
                bias: 0.0,
                impulse: 0.0,
            }),
        ))
    }
}

impl DistanceJoint {
    pub fn rest_distance(&self) -> f64 {
        self.rest_distance
    }

    pub fn set_rest_distance(&mut self, distance: f64) -> Result<(), Error> {
        if distance < 0.0 {
            return Err(Error::InvalidArgument("rest distance must be non-negative"));
        }
        self.rest_distance = distance;
        Ok(())
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Zero disables the spring.
    pub fn set_frequency(&mut self, frequency: f64) -> Result<(), Error> {
        if frequency < 0.0 {
            return Err(Error::InvalidArgument("frequency must be non-negative"));
        }
        self.frequency = frequency;
        Ok(())
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn set_damping_ratio(&mut self, ratio: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::InvalidArgument("damping ratio must be in [0, 1]"));
        }
        self.damping_ratio = ratio;
        Ok(())
    }

    pub fn is_spring_enabled(&self) -> bool {
        self.frequency > 0.0
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

        let d = p2 - p1;
        let length = d.length();
        self.n = if length > 1e-12 { d / length } else { Vec2::ZERO };

        let rn1 = cross(self.r1, self.n);
        let rn2 = cross(self.r2, self.n);
        let mut inv_mass = m1 + m2 + i1 * rn1 * rn1 + i2 * rn2 * rn2;

        if self.frequency > 0.0 {
            let m_eff = if inv_mass > f64::EPSILON { 1.0 / inv_mass } else { 0.0 };
            let omega = TAU * self.frequency;
            let d_coeff = 2.0 * m_eff * self.damping_ratio * omega;
            let k = m_eff * omega * omega;
            let c = length - self.rest_distance;
            let dt = step.dt;
            let gamma = dt * (d_coeff + dt * k);
            self.gamma = if gamma > f64::EPSILON { 1.0 / gamma } else { 0.0 };
            self.bias = c * dt * k * self.gamma;
            inv_mass += self.gamma;
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
        }
        self.mass = if inv_mass > f64::EPSILON { 1.0 / inv_mass } else { 0.0 };

        // warm start
        self.impulse *= step.dt_ratio;
        let j = self.n * self.impulse;
        b1.velocity -= j * m1;
        b1.angular_velocity -= i1 * cross(self.r1, j);
        b2.velocity += j * m2;
        b2.angular_velocity += i2 * cross(self.r2, j);
    }

    pub(super) fn solve_velocity(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        _settings: &Settings,
    ) {
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let rv = (b2.velocity + cross_sv(b2.angular_velocity, self.r2))
            - (b1.velocity + cross_sv(b1.angular_velocity, self.r1));
        let cdot = rv.dot(self.n);

        let impulse = -self.mass * (cdot + self.bias + self.gamma * self.impulse);
        self.impulse += impulse;

        let j = self.n * impulse;
        b1.velocity -= j * m1;
        b1.angular_velocity -= i1 * cross(self.r1, j);
        b2.velocity += j * m2;
        b2.angular_velocity += i2 * cross(self.r2, j);
    }

    pub(super) fn solve_position(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        settings: &Settings,
    ) -> bool {
        if self.frequency > 0.0 {
            return true;
        }
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let p1 = b1.world_center() + r1;
        let p2 = b2.world_center() + r2;

        let d = p2 - p1;
        let length = d.length();
        if length < 1e-12 {
            return true;
        }
        let n = d / length;
        let error = length - self.rest_distance;
        let correction = error.clamp(
            -settings.max_linear_correction(),
            settings.max_linear_correction(),
        );

        let rn1 = cross(r1, n);
        let rn2 = cross(r2, n);
        let inv_mass = m1 + m2 + i1 * rn1 * rn1 + i2 * rn2 * rn2;
        if inv_mass > f64::EPSILON {
            let impulse = correction / inv_mass;
            let j = n * impulse;
            b1.translate(j * m1);
            b1.rotate_about_center(i1 * cross(r1, j));
            b2.translate(-j * m2);
            b2.rotate_about_center(-i2 * cross(r2, j));
        }

        error.abs() <= settings.linear_tolerance()
    }

    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.n * (self.impulse * inv_dt)
    }

    pub(super) fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }
}
