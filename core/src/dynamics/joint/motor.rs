use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, distinct, solve22, wrap_angle};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Drives body2 toward a target position and orientation relative to body1,
/// with the positional error fed back as a velocity bias scaled by the
/// correction factor and the drive capped by a maximum force and torque.
#[derive(Debug, Clone)]
pub struct MotorJoint {
    /// Body2's target origin, expressed in body1's frame.
    linear_target: Vec2,
    /// Target relative angle (body1 minus body2).
    angular_target: f64,
    correction_factor: f64,
    max_force: f64,
    max_torque: f64,

    // solver state
    r1: Vec2,
    r2: Vec2,
    k: [f64; 4],
    angular_mass: f64,
    linear_error: Vec2,
    angular_error: f64,
    linear_impulse: Vec2,
    angular_impulse: f64,
}

impl Joint {
    /// Motor joint holding the bodies' current relative pose as the target.
    pub fn motor(b1: &Body, b2: &Body) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Motor(MotorJoint {
                linear_target: b1.transform().apply_inverse(b2.transform().translation),
                angular_target: b1.transform().rotation - b2.transform().rotation,
                correction_factor: 0.3,
                max_force: 1000.0,
                max_torque: 1000.0,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                k: [0.0; 4],
                angular_mass: 0.0,
                linear_error: Vec2::ZERO,
                angular_error: 0.0,
                linear_impulse: Vec2::ZERO,
                angular_impulse: 0.0,
            }),
        ))
    }
}

impl MotorJoint {
    pub fn linear_target(&self) -> Vec2 {
        self.linear_target
    }

    pub fn set_linear_target(&mut self, target: Vec2) {
        self.linear_target = target;
    }

    pub fn angular_target(&self) -> f64 {
        self.angular_target
    }

    pub fn set_angular_target(&mut self, target: f64) {
        self.angular_target = target;
    }

    pub fn correction_factor(&self) -> f64 {
        self.correction_factor
    }

    pub fn set_correction_factor(&mut self, factor: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(Error::InvalidArgument("correction factor must be in [0, 1]"));
        }
        self.correction_factor = factor;
        Ok(())
    }

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

        // Anchors at the body origins.
        self.r1 = b1.transform().apply_rotation(-b1.local_center());
        self.r2 = b2.transform().apply_rotation(-b2.local_center());

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

        // Error from body2's current origin to where body1's frame puts it.
        let target_world = b1.transform().apply(self.linear_target);
        self.linear_error = target_world - b2.transform().translation;
        self.angular_error = wrap_angle(
            b1.transform().rotation - b2.transform().rotation - self.angular_target,
        );

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
        let inv_dt = step.inv_dt;

        // angular drive with ERP on the angular error
        {
            let c = b1.angular_velocity - b2.angular_velocity
                + inv_dt * self.correction_factor * self.angular_error;
            let impulse = -self.angular_mass * c;
            let max = self.max_torque * step.dt;
            let old = self.angular_impulse;
            self.angular_impulse = (old + impulse).clamp(-max, max);
            let delta = self.angular_impulse - old;
            b1.angular_velocity += i1 * delta;
            b2.angular_velocity -= i2 * delta;
        }

        // linear drive with ERP on the positional error
        {
            let rv = (b1.velocity + cross_sv(b1.angular_velocity, self.r1))
                - (b2.velocity + cross_sv(b2.angular_velocity, self.r2))
                + self.linear_error * (inv_dt * self.correction_factor);
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
        // Position error is corrected through the velocity bias.
        true
    }

    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.linear_impulse * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.angular_impulse * inv_dt
    }
}
