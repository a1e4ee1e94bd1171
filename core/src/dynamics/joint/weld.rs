use std::f64::consts::TAU;

use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, distinct, solve22, solve33, wrap_angle};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Rigid fixation of two bodies: point-to-point plus angular equality.
/// A positive frequency softens the angular row into a spring-damper,
/// optionally clamped by a maximum spring torque.
#[derive(Debug, Clone)]
pub struct WeldJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    reference_angle: f64,
    frequency: f64,
    damping_ratio: f64,
    max_spring_torque: Option<f64>,

    // solver state
    r1: Vec2,
    r2: Vec2,
    k: [f64; 9],
    angular_mass: f64,
    gamma: f64,
    bias: f64,
    impulse: Vec2,
    angular_impulse: f64,
}

impl Joint {
    /// Weld joint fixing the bodies at the given world anchor in their
    /// current relative pose.
    pub fn weld(b1: &Body, b2: &Body, anchor: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Weld(WeldJoint {
                local_anchor1: b1.transform().apply_inverse(anchor),
                local_anchor2: b2.transform().apply_inverse(anchor),
                reference_angle: b2.transform().rotation - b1.transform().rotation,
                frequency: 0.0,
                damping_ratio: 0.0,
                max_spring_torque: None,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                k: [0.0; 9],
                angular_mass: 0.0,
                gamma: 0.0,
                bias: 0.0,
                impulse: Vec2::ZERO,
                angular_impulse: 0.0,
            }),
        ))
    }
}

impl WeldJoint {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Zero disables the angular spring (fully rigid weld).
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

    pub fn max_spring_torque(&self) -> Option<f64> {
        self.max_spring_torque
    }

    pub fn set_max_spring_torque(&mut self, torque: Option<f64>) -> Result<(), Error> {
        if let Some(t) = torque {
            if t < 0.0 {
                return Err(Error::InvalidArgument("maximum torque must be non-negative"));
            }
        }
        self.max_spring_torque = torque;
        Ok(())
    }

    pub fn is_spring_enabled(&self) -> bool {
        self.frequency > 0.0
    }

    fn relative_angle(&self, b1: &Body, b2: &Body) -> f64 {
        wrap_angle(b2.transform().rotation - b1.transform().rotation - self.reference_angle)
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
            m1 + m2 + i1 * self.r1.y * self.r1.y + i2 * self.r2.y * self.r2.y,
            -i1 * self.r1.x * self.r1.y - i2 * self.r2.x * self.r2.y,
            -i1 * self.r1.y - i2 * self.r2.y,
            -i1 * self.r1.x * self.r1.y - i2 * self.r2.x * self.r2.y,
            m1 + m2 + i1 * self.r1.x * self.r1.x + i2 * self.r2.x * self.r2.x,
            i1 * self.r1.x + i2 * self.r2.x,
            -i1 * self.r1.y - i2 * self.r2.y,
            i1 * self.r1.x + i2 * self.r2.x,
            i1 + i2,
        ];

        if self.frequency > 0.0 {
            let inv_angular = i1 + i2;
            let m_ang = if inv_angular > f64::EPSILON {
                1.0 / inv_angular
            } else {
                0.0
            };
            let omega = TAU * self.frequency;
            let d = 2.0 * m_ang * self.damping_ratio * omega;
            let spring_k = m_ang * omega * omega;
            let c = self.relative_angle(b1, b2);
            let dt = step.dt;
            let gamma = dt * (d + dt * spring_k);
            self.gamma = if gamma > f64::EPSILON { 1.0 / gamma } else { 0.0 };
            self.bias = c * dt * spring_k * self.gamma;
            let inv_mass = inv_angular + self.gamma;
            self.angular_mass = if inv_mass > f64::EPSILON { 1.0 / inv_mass } else { 0.0 };
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
            let inv_angular = i1 + i2;
            self.angular_mass = if inv_angular > f64::EPSILON {
                1.0 / inv_angular
            } else {
                0.0
            };
        }

        // warm start
        self.impulse *= step.dt_ratio;
        self.angular_impulse *= step.dt_ratio;
        let j = self.impulse;
        b1.velocity -= j * m1;
        b1.angular_velocity -= i1 * (cross(self.r1, j) + self.angular_impulse);
        b2.velocity += j * m2;
        b2.angular_velocity += i2 * (cross(self.r2, j) + self.angular_impulse);
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

        if self.frequency > 0.0 {
            // soft angular row
            {
                let cdot = b2.angular_velocity - b1.angular_velocity;
                let impulse = -self.angular_mass
                    * (cdot + self.bias + self.gamma * self.angular_impulse);
                let old = self.angular_impulse;
                match self.max_spring_torque {
                    Some(max) => {
                        let cap = max * step.dt;
                        self.angular_impulse = (old + impulse).clamp(-cap, cap);
                    }
                    None => self.angular_impulse = old + impulse,
                }
                let delta = self.angular_impulse - old;
                b1.angular_velocity -= i1 * delta;
                b2.angular_velocity += i2 * delta;
            }
            // rigid point row
            {
                let cdot = (b2.velocity + cross_sv(b2.angular_velocity, self.r2))
                    - (b1.velocity + cross_sv(b1.angular_velocity, self.r1));
                let impulse = solve22(&[self.k[0], self.k[1], self.k[3], self.k[4]], -cdot);
                self.impulse += impulse;
                b1.velocity -= impulse * m1;
                b1.angular_velocity -= i1 * cross(self.r1, impulse);
                b2.velocity += impulse * m2;
                b2.angular_velocity += i2 * cross(self.r2, impulse);
            }
        } else {
            let cdot1 = (b2.velocity + cross_sv(b2.angular_velocity, self.r2))
                - (b1.velocity + cross_sv(b1.angular_velocity, self.r1));
            let cdot2 = b2.angular_velocity - b1.angular_velocity;
            let x = solve33(&self.k, [-cdot1.x, -cdot1.y, -cdot2]);
            let j = Vec2::new(x[0], x[1]);
            self.impulse += j;
            self.angular_impulse += x[2];
            b1.velocity -= j * m1;
            b1.angular_velocity -= i1 * (cross(self.r1, j) + x[2]);
            b2.velocity += j * m2;
            b2.angular_velocity += i2 * (cross(self.r2, j) + x[2]);
        }
    }

    pub(super) fn solve_position(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        settings: &Settings,
    ) -> bool {
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let p1 = b1.world_center() + r1;
        let p2 = b2.world_center() + r2;
        let linear_error_vec = p2 - p1;
        let linear_error = linear_error_vec.length();

        if self.frequency > 0.0 {
            // Only the point rows have a position target.
            let k = [
                m1 + m2 + i1 * r1.y * r1.y + i2 * r2.y * r2.y,
                -i1 * r1.x * r1.y - i2 * r2.x * r2.y,
                -i1 * r1.x * r1.y - i2 * r2.x * r2.y,
                m1 + m2 + i1 * r1.x * r1.x + i2 * r2.x * r2.x,
            ];
            let j = solve22(&k, -linear_error_vec);
            b1.translate(-j * m1);
            b1.rotate_about_center(-i1 * cross(r1, j));
            b2.translate(j * m2);
            b2.rotate_about_center(i2 * cross(r2, j));
            return linear_error <= settings.linear_tolerance();
        }

        let angular_error_value = self.relative_angle(b1, b2);
        let k = [
            m1 + m2 + i1 * r1.y * r1.y + i2 * r2.y * r2.y,
            -i1 * r1.x * r1.y - i2 * r2.x * r2.y,
            -i1 * r1.y - i2 * r2.y,
            -i1 * r1.x * r1.y - i2 * r2.x * r2.y,
            m1 + m2 + i1 * r1.x * r1.x + i2 * r2.x * r2.x,
            i1 * r1.x + i2 * r2.x,
            -i1 * r1.y - i2 * r2.y,
            i1 * r1.x + i2 * r2.x,
            i1 + i2,
        ];
        let x = solve33(&k, [-linear_error_vec.x, -linear_error_vec.y, -angular_error_value]);
        let j = Vec2::new(x[0], x[1]);
        b1.translate(-j * m1);
        b1.rotate_about_center(-i1 * (cross(r1, j) + x[2]));
        b2.translate(j * m2);
        b2.rotate_about_center(i2 * (cross(r2, j) + x[2]));

        linear_error <= settings.linear_tolerance()
            && angular_error_value.abs() <= settings.angular_tolerance()
    }

    /// Force applied to body2 over the last step.
    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.impulse * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.angular_impulse * inv_dt
    }
}
