use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, LimitState, distinct};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Inequality constraint on anchor separation with independently switched
/// lower and upper limits. Solves only in the violating direction; no
/// spring.
#[derive(Debug, Clone)]
pub struct RopeJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    lower_limit: f64,
    upper_limit: f64,
    lower_enabled: bool,
    upper_enabled: bool,

    // solver state
    n: Vec2,
    r1: Vec2,
    r2: Vec2,
    mass: f64,
    impulse: f64,
    limit_state: LimitState,
}

impl Joint {
    /// Rope joint between two world anchors; both limits start at the
    /// current separation with only the upper limit enabled.
    pub fn rope(b1: &Body, b2: &Body, anchor1: Vec2, anchor2: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        let length = (anchor2 - anchor1).length();
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Rope(RopeJoint {
                local_anchor1: b1.transform().apply_inverse(anchor1),
                local_anchor2: b2.transform().apply_inverse(anchor2),
                lower_limit: length,
                upper_limit: length,
                lower_enabled: false,
                upper_enabled: true,
                n: Vec2::ZERO,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                mass: 0.0,
                impulse: 0.0,
                limit_state: LimitState::Inactive,
            }),
        ))
    }
}

impl RopeJoint {
    pub fn limits(&self) -> (f64, f64) {
        (self.lower_limit, self.upper_limit)
    }

    pub fn set_limits(&mut self, lower: f64, upper: f64) -> Result<(), Error> {
        if lower < 0.0 || upper < 0.0 {
            return Err(Error::InvalidArgument("rope limits must be non-negative"));
        }
        if lower > upper {
            return Err(Error::InvalidArgument("lower limit must not exceed upper limit"));
        }
        self.lower_limit = lower;
        self.upper_limit = upper;
        Ok(())
    }

    pub fn is_lower_enabled(&self) -> bool {
        self.lower_enabled
    }

    pub fn set_lower_enabled(&mut self, enabled: bool) {
        self.lower_enabled = enabled;
    }

    pub fn is_upper_enabled(&self) -> bool {
        self.upper_enabled
    }

    pub fn set_upper_enabled(&mut self, enabled: bool) {
        self.upper_enabled = enabled;
    }

    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    pub(super) fn initialize(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        step: &TimeStep,
        settings: &Settings,
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

        let previous = self.limit_state;
        self.limit_state = if self.lower_enabled
            && self.upper_enabled
            && (self.upper_limit - self.lower_limit).abs() < 2.0 * settings.linear_tolerance()
        {
            LimitState::Equal
        } else if self.upper_enabled && length >= self.upper_limit {
            LimitState::AtUpper
        } else if self.lower_enabled && length <= self.lower_limit {
            LimitState::AtLower
        } else {
            LimitState::Inactive
        };
        if self.limit_state != previous {
            self.impulse = 0.0;
        }
        if self.limit_state == LimitState::Inactive {
            self.impulse = 0.0;
            return;
        }

        let rn1 = cross(self.r1, self.n);
        let rn2 = cross(self.r2, self.n);
        let inv_mass = m1 + m2 + i1 * rn1 * rn1 + i2 * rn2 * rn2;
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
        if self.limit_state == LimitState::Inactive {
            return;
        }
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        let rv = (b2.velocity + cross_sv(b2.angular_velocity, self.r2))
            - (b1.velocity + cross_sv(b1.angular_velocity, self.r1));
        let cdot = rv.dot(self.n);
        let impulse = -self.mass * cdot;
        let old = self.impulse;

        // At the upper limit only pull (negative along n); at the lower limit
        // only push.
        self.impulse = match self.limit_state {
            LimitState::AtUpper => (old + impulse).min(0.0),
            LimitState::AtLower => (old + impulse).max(0.0),
            _ => old + impulse,
        };
        let delta = self.impulse - old;

        let j = self.n * delta;
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
        if self.limit_state == LimitState::Inactive {
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

        let error = match self.limit_state {
            LimitState::Equal => length - self.lower_limit,
            LimitState::AtUpper => (length - self.upper_limit).max(0.0),
            LimitState::AtLower => (length - self.lower_limit).min(0.0),
            LimitState::Inactive => unreachable!(),
        };
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
