use crate::error::Error;
use crate::geometry::Vec2;

use super::{Joint, JointKind, LimitState, distinct, wrap_angle};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Constrains the relative rotation of two bodies. With limits disabled the
/// joint gears the angular velocities through an optional ratio; with limits
/// enabled it keeps the relative angle inside [lower, upper] and the ratio
/// is effectively disabled.
#[derive(Debug, Clone)]
pub struct AngleJoint {
    ratio: f64,
    lower_limit: f64,
    upper_limit: f64,
    limit_enabled: bool,
    reference_angle: f64,

    // solver state
    limit_state: LimitState,
    mass: f64,
    impulse: f64,
}

impl Joint {
    /// Angle joint between two distinct bodies; the current relative angle
    /// becomes the reference (zero) angle.
    pub fn angle(b1: &Body, b2: &Body) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        let reference_angle = b1.transform().rotation - b2.transform().rotation;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Angle(AngleJoint {
                ratio: 1.0,
                lower_limit: 0.0,
                upper_limit: 0.0,
                limit_enabled: false,
                reference_angle,
                limit_state: LimitState::Inactive,
                mass: 0.0,
                impulse: 0.0,
            }),
        ))
    }
}

impl AngleJoint {
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), Error> {
        if ratio <= 0.0 {
            return Err(Error::InvalidArgument("angle joint ratio must be positive"));
        }
        self.ratio = ratio;
        Ok(())
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.lower_limit, self.upper_limit)
    }

    pub fn set_limits(&mut self, lower: f64, upper: f64) -> Result<(), Error> {
        if lower > upper {
            return Err(Error::InvalidArgument("lower limit must not exceed upper limit"));
        }
        self.lower_limit = lower;
        self.upper_limit = upper;
        Ok(())
    }

    pub fn is_limit_enabled(&self) -> bool {
        self.limit_enabled
    }

    pub fn set_limit_enabled(&mut self, enabled: bool) {
        self.limit_enabled = enabled;
    }

    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    pub fn reference_angle(&self) -> f64 {
        self.reference_angle
    }

    /// Relative angle wrapped to (-pi, pi].
    fn relative_rotation(&self, b1: &Body, b2: &Body) -> f64 {
        wrap_angle(b1.transform().rotation - b2.transform().rotation - self.reference_angle)
    }

    pub(super) fn initialize(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        step: &TimeStep,
        settings: &Settings,
    ) {
        let i1 = b1.inv_inertia();
        let i2 = b2.inv_inertia();

        if self.limit_enabled {
            let angle = self.relative_rotation(b1, b2);
            if (self.upper_limit - self.lower_limit).abs() < 2.0 * settings.angular_tolerance() {
                self.limit_state = LimitState::Equal;
            } else if angle >= self.upper_limit {
                if self.limit_state != LimitState::AtUpper {
                    self.impulse = 0.0;
                }
                self.limit_state = LimitState::AtUpper;
            } else if angle <= self.lower_limit {
                if self.limit_state != LimitState::AtLower {
                    self.impulse = 0.0;
                }
                self.limit_state = LimitState::AtLower;
            } else {
                self.impulse = 0.0;
                self.limit_state = LimitState::Inactive;
            }
        } else {
            self.limit_state = LimitState::Inactive;
        }

        let inv_k = if self.limit_state == LimitState::Inactive {
            i1 + self.ratio * self.ratio * i2
        } else {
            i1 + i2
        };
        self.mass = if inv_k > f64::EPSILON { 1.0 / inv_k } else { 0.0 };

        // warm start
        self.impulse *= step.dt_ratio;
        b1.angular_velocity += i1 * self.impulse;
        b2.angular_velocity -= i2 * self.impulse;
    }

    pub(super) fn solve_velocity(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        _settings: &Settings,
    ) {
        let i1 = b1.inv_inertia();
        let i2 = b2.inv_inertia();

        match self.limit_state {
            LimitState::Inactive => {
                // Gear drive: C = w1 - r * w2, impulses applied symmetrically.
                let c = b1.angular_velocity - self.ratio * b2.angular_velocity;
                let impulse = -self.mass * c;
                self.impulse += impulse;
                b1.angular_velocity += i1 * impulse;
                b2.angular_velocity -= i2 * impulse;
            }
            LimitState::Equal => {
                let c = b1.angular_velocity - b2.angular_velocity;
                let impulse = -self.mass * c;
                self.impulse += impulse;
                b1.angular_velocity += i1 * impulse;
                b2.angular_velocity -= i2 * impulse;
            }
            LimitState::AtLower | LimitState::AtUpper => {
                let c = b1.angular_velocity - b2.angular_velocity;
                let impulse = -self.mass * c;
                let old = self.impulse;
                if self.limit_state == LimitState::AtLower {
                    self.impulse = (old + impulse).max(0.0);
                } else {
                    self.impulse = (old + impulse).min(0.0);
                }
                let delta = self.impulse - old;
                b1.angular_velocity += i1 * delta;
                b2.angular_velocity -= i2 * delta;
            }
        }
    }

    pub(super) fn solve_position(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        _step: &TimeStep,
        settings: &Settings,
    ) -> bool {
        if self.limit_state == LimitState::Inactive {
            return true;
        }
        let i1 = b1.inv_inertia();
        let i2 = b2.inv_inertia();
        let angle = self.relative_rotation(b1, b2);

        let error = match self.limit_state {
            LimitState::Equal => angle - self.lower_limit,
            LimitState::AtLower => (angle - self.lower_limit).min(0.0),
            LimitState::AtUpper => (angle - self.upper_limit).max(0.0),
            LimitState::Inactive => unreachable!(),
        };
        let correction = error.clamp(
            -settings.max_angular_correction(),
            settings.max_angular_correction(),
        );

        let inv_k = i1 + i2;
        if inv_k > f64::EPSILON {
            let impulse = -correction / inv_k;
            b1.rotate_about_center(i1 * impulse);
            b2.rotate_about_center(-i2 * impulse);
        }

        error.abs() <= settings.angular_tolerance()
    }

    pub(super) fn reaction_force(&self, _inv_dt: f64) -> Vec2 {
        Vec2::ZERO
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.impulse * inv_dt
    }
}
