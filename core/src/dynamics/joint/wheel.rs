use std::f64::consts::TAU;

use crate::error::Error;
use crate::geometry::{Vec2, cross};

use super::{Joint, JointKind, distinct};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Suspension joint: rigid perpendicular to the axis, a soft spring along
/// it, rotation free, with an optional motor about the wheel's axle. The
/// spring force may be clamped.
#[derive(Debug, Clone)]
pub struct WheelJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    /// Suspension axis in body1's frame.
    local_axis: Vec2,
    frequency: f64,
    damping_ratio: f64,
    max_spring_force: Option<f64>,
    motor_enabled: bool,
    motor_speed: f64,
    max_motor_torque: f64,

    // solver state
    axis: Vec2,
    perp: Vec2,
    s1: f64,
    s2: f64,
    a1: f64,
    a2: f64,
    perp_mass: f64,
    spring_mass: f64,
    motor_mass: f64,
    gamma: f64,
    bias: f64,
    impulse: f64,
    spring_impulse: f64,
    motor_impulse: f64,
}

impl Joint {
    /// Wheel joint with suspension along `axis` (world space) through
    /// `anchor`; the spring defaults to 8 Hz, damping ratio 0.7.
    pub fn wheel(b1: &Body, b2: &Body, anchor: Vec2, axis: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        let len = axis.length();
        if len < 1e-12 {
            return Err(Error::InvalidArgument("wheel axis must be non-degenerate"));
        }
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Wheel(WheelJoint {
                local_anchor1: b1.transform().apply_inverse(anchor),
                local_anchor2: b2.transform().apply_inverse(anchor),
                local_axis: b1.transform().apply_inverse_rotation(axis / len),
                frequency: 8.0,
                damping_ratio: 0.7,
                max_spring_force: None,
                motor_enabled: false,
                motor_speed: 0.0,
                max_motor_torque: 0.0,
                axis: Vec2::ZERO,
                perp: Vec2::ZERO,
                s1: 0.0,
                s2: 0.0,
                a1: 0.0,
                a2: 0.0,
                perp_mass: 0.0,
                spring_mass: 0.0,
                motor_mass: 0.0,
                gamma: 0.0,
                bias: 0.0,
                impulse: 0.0,
                spring_impulse: 0.0,
                motor_impulse: 0.0,
            }),
        ))
    }
}

impl WheelJoint {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) -> Result<(), Error> {
        if frequency <= 0.0 {
            return Err(Error::InvalidArgument("wheel spring frequency must be positive"));
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

    pub fn max_spring_force(&self) -> Option<f64> {
        self.max_spring_force
    }

    pub fn set_max_spring_force(&mut self, force: Option<f64>) -> Result<(), Error> {
        if let Some(f) = force {
            if f < 0.0 {
                return Err(Error::InvalidArgument("maximum force must be non-negative"));
            }
        }
        self.max_spring_force = force;
        Ok(())
    }

    pub fn is_motor_enabled(&self) -> bool {
        self.motor_enabled
    }

    pub fn set_motor_enabled(&mut self, enabled: bool) {
        self.motor_enabled = enabled;
    }

    pub fn motor_speed(&self) -> f64 {
        self.motor_speed
    }

    pub fn set_motor_speed(&mut self, speed: f64) {
        self.motor_speed = speed;
    }

    pub fn max_motor_torque(&self) -> f64 {
        self.max_motor_torque
    }

    pub fn set_max_motor_torque(&mut self, torque: f64) -> Result<(), Error> {
        if torque < 0.0 {
            return Err(Error::InvalidArgument("maximum torque must be non-negative"));
        }
        self.max_motor_torque = torque;
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

        let r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let d = (b2.world_center() + r2) - (b1.world_center() + r1);

        self.axis = b1.transform().apply_rotation(self.local_axis);
        self.perp = self.axis.perp();
        self.a1 = cross(d + r1, self.axis);
        self.a2 = cross(r2, self.axis);
        self.s1 = cross(d + r1, self.perp);
        self.s2 = cross(r2, self.perp);

        let inv_perp = m1 + m2 + self.s1 * self.s1 * i1 + self.s2 * self.s2 * i2;
        self.perp_mass = if inv_perp > f64::EPSILON { 1.0 / inv_perp } else { 0.0 };

        // soft axial spring
        let inv_axial = m1 + m2 + self.a1 * self.a1 * i1 + self.a2 * self.a2 * i2;
        if inv_axial > f64::EPSILON {
            let m_ax = 1.0 / inv_axial;
            let c = d.dot(self.axis);
            let omega = TAU * self.frequency;
            let damp = 2.0 * m_ax * self.damping_ratio * omega;
            let k = m_ax * omega * omega;
            let dt = step.dt;
            let gamma = dt * (damp + dt * k);
            self.gamma = if gamma > f64::EPSILON { 1.0 / gamma } else { 0.0 };
            self.bias = c * dt * k * self.gamma;
            let inv_spring = inv_axial + self.gamma;
            self.spring_mass = if inv_spring > f64::EPSILON { 1.0 / inv_spring } else { 0.0 };
        } else {
            self.gamma = 0.0;
            self.bias = 0.0;
            self.spring_mass = 0.0;
        }

        let inv_motor = i1 + i2;
        self.motor_mass = if inv_motor > f64::EPSILON { 1.0 / inv_motor } else { 0.0 };
        if !self.motor_enabled {
            self.motor_impulse = 0.0;
        }

        // warm start
        self.impulse *= step.dt_ratio;
        self.spring_impulse *= step.dt_ratio;
        self.motor_impulse *= step.dt_ratio;
        let p = self.perp * self.impulse + self.axis * self.spring_impulse;
        let l1 = self.impulse * self.s1 + self.spring_impulse * self.a1 + self.motor_impulse;
        let l2 = self.impulse * self.s2 + self.spring_impulse * self.a2 + self.motor_impulse;
        b1.velocity -= p * m1;
        b1.angular_velocity -= i1 * l1;
        b2.velocity += p * m2;
        b2.angular_velocity += i2 * l2;
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

        // axial spring
        {
            let cdot = self.axis.dot(b2.velocity - b1.velocity) + self.a2 * b2.angular_velocity
                - self.a1 * b1.angular_velocity;
            let impulse =
                -self.spring_mass * (cdot + self.bias + self.gamma * self.spring_impulse);
            let old = self.spring_impulse;
            match self.max_spring_force {
                Some(max) => {
                    let cap = max * step.dt;
                    self.spring_impulse = (old + impulse).clamp(-cap, cap);
                }
                None => self.spring_impulse = old + impulse,
            }
            let delta = self.spring_impulse - old;
            let p = self.axis * delta;
            b1.velocity -= p * m1;
            b1.angular_velocity -= i1 * delta * self.a1;
            b2.velocity += p * m2;
            b2.angular_velocity += i2 * delta * self.a2;
        }

        // rotational motor
        if self.motor_enabled {
            let cdot = b2.angular_velocity - b1.angular_velocity - self.motor_speed;
            let impulse = -self.motor_mass * cdot;
            let old = self.motor_impulse;
            let max = self.max_motor_torque * step.dt;
            self.motor_impulse = (old + impulse).clamp(-max, max);
            let delta = self.motor_impulse - old;
            b1.angular_velocity -= i1 * delta;
            b2.angular_velocity += i2 * delta;
        }

        // rigid perpendicular row
        {
            let cdot = self.perp.dot(b2.velocity - b1.velocity) + self.s2 * b2.angular_velocity
                - self.s1 * b1.angular_velocity;
            let impulse = -self.perp_mass * cdot;
            self.impulse += impulse;
            let p = self.perp * impulse;
            b1.velocity -= p * m1;
            b1.angular_velocity -= i1 * impulse * self.s1;
            b2.velocity += p * m2;
            b2.angular_velocity += i2 * impulse * self.s2;
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
        let d = (b2.world_center() + r2) - (b1.world_center() + r1);
        let axis = b1.transform().apply_rotation(self.local_axis);
        let perp = axis.perp();
        let s1 = cross(d + r1, perp);
        let s2 = cross(r2, perp);

        // Only the perpendicular row has a position target; the axial spring
        // corrects through its bias.
        let error = d.dot(perp);
        let inv_mass = m1 + m2 + s1 * s1 * i1 + s2 * s2 * i2;
        if inv_mass > f64::EPSILON {
            let impulse = -error / inv_mass;
            let p = perp * impulse;
            b1.translate(-p * m1);
            b1.rotate_about_center(-i1 * impulse * s1);
            b2.translate(p * m2);
            b2.rotate_about_center(i2 * impulse * s2);
        }

        error.abs() <= settings.linear_tolerance()
    }

    /// Force applied to body2 over the last step.
    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        (self.perp * self.impulse + self.axis * self.spring_impulse) * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.motor_impulse * inv_dt
    }
}
