use crate::error::Error;
use crate::geometry::{Vec2, cross};

use super::{Joint, JointKind, LimitState, distinct, solve22, wrap_angle};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Allows translation along one axis and blocks perpendicular translation
/// and all relative rotation: a 2x2 (perpendicular, angular) block plus
/// scalar axial rows for the optional motor and translation limit.
#[derive(Debug, Clone)]
pub struct PrismaticJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    /// Slide axis in body1's frame.
    local_axis: Vec2,
    reference_angle: f64,
    limit_enabled: bool,
    lower_limit: f64,
    upper_limit: f64,
    motor_enabled: bool,
    motor_speed: f64,
    max_motor_force: f64,

    // solver state
    axis: Vec2,
    perp: Vec2,
    s1: f64,
    s2: f64,
    a1: f64,
    a2: f64,
    k: [f64; 4],
    axial_mass: f64,
    impulse: Vec2,
    axial_impulse: f64,
    motor_impulse: f64,
    limit_state: LimitState,
}

impl Joint {
    /// Prismatic joint sliding along `axis` (world space) through `anchor`.
    pub fn prismatic(b1: &Body, b2: &Body, anchor: Vec2, axis: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        let len = axis.length();
        if len < 1e-12 {
            return Err(Error::InvalidArgument("prismatic axis must be non-degenerate"));
        }
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Prismatic(PrismaticJoint {
                local_anchor1: b1.transform().apply_inverse(anchor),
                local_anchor2: b2.transform().apply_inverse(anchor),
                local_axis: b1.transform().apply_inverse_rotation(axis / len),
                reference_angle: b2.transform().rotation - b1.transform().rotation,
                limit_enabled: false,
                lower_limit: 0.0,
                upper_limit: 0.0,
                motor_enabled: false,
                motor_speed: 0.0,
                max_motor_force: 0.0,
                axis: Vec2::ZERO,
                perp: Vec2::ZERO,
                s1: 0.0,
                s2: 0.0,
                a1: 0.0,
                a2: 0.0,
                k: [0.0; 4],
                axial_mass: 0.0,
                impulse: Vec2::ZERO,
                axial_impulse: 0.0,
                motor_impulse: 0.0,
                limit_state: LimitState::Inactive,
            }),
        ))
    }
}

impl PrismaticJoint {
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

    pub fn max_motor_force(&self) -> f64 {
        self.max_motor_force
    }

    pub fn set_max_motor_force(&mut self, force: f64) -> Result<(), Error> {
        if force < 0.0 {
            return Err(Error::InvalidArgument("maximum force must be non-negative"));
        }
        self.max_motor_force = force;
        Ok(())
    }

    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    /// Signed translation of body2's anchor along the axis.
    pub fn translation(&self, b1: &Body, b2: &Body) -> f64 {
        let axis = b1.transform().apply_rotation(self.local_axis);
        let p1 = b1.transform().apply(self.local_anchor1);
        let p2 = b2.transform().apply(self.local_anchor2);
        (p2 - p1).dot(axis)
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

        let r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let d = (b2.world_center() + r2) - (b1.world_center() + r1);

        self.axis = b1.transform().apply_rotation(self.local_axis);
        self.perp = self.axis.perp();
        self.a1 = cross(d + r1, self.axis);
        self.a2 = cross(r2, self.axis);
        self.s1 = cross(d + r1, self.perp);
        self.s2 = cross(r2, self.perp);

        self.k = [
            m1 + m2 + self.s1 * self.s1 * i1 + self.s2 * self.s2 * i2,
            self.s1 * i1 + self.s2 * i2,
            self.s1 * i1 + self.s2 * i2,
            i1 + i2,
        ];
        let inv_axial = m1 + m2 + self.a1 * self.a1 * i1 + self.a2 * self.a2 * i2;
        self.axial_mass = if inv_axial > f64::EPSILON { 1.0 / inv_axial } else { 0.0 };

        if !self.motor_enabled {
            self.motor_impulse = 0.0;
        }

        if self.limit_enabled {
            let translation = d.dot(self.axis);
            if (self.upper_limit - self.lower_limit).abs() < 2.0 * settings.linear_tolerance() {
                self.limit_state = LimitState::Equal;
            } else if translation <= self.lower_limit {
                if self.limit_state != LimitState::AtLower {
                    self.axial_impulse = 0.0;
                }
                self.limit_state = LimitState::AtLower;
            } else if translation >= self.upper_limit {
                if self.limit_state != LimitState::AtUpper {
                    self.axial_impulse = 0.0;
                }
                self.limit_state = LimitState::AtUpper;
            } else {
                self.limit_state = LimitState::Inactive;
                self.axial_impulse = 0.0;
            }
        } else {
            self.limit_state = LimitState::Inactive;
            self.axial_impulse = 0.0;
        }

        // warm start
        self.impulse *= step.dt_ratio;
        self.axial_impulse *= step.dt_ratio;
        self.motor_impulse *= step.dt_ratio;
        let axial = self.axial_impulse + self.motor_impulse;
        let p = self.perp * self.impulse.x + self.axis * axial;
        let l1 = self.impulse.x * self.s1 + self.impulse.y + axial * self.a1;
        let l2 = self.impulse.x * self.s2 + self.impulse.y + axial * self.a2;
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

        // motor along the axis
        if self.motor_enabled && self.limit_state != LimitState::Equal {
            let cdot = self.axis.dot(b2.velocity - b1.velocity) + self.a2 * b2.angular_velocity
                - self.a1 * b1.angular_velocity;
            let impulse = -self.axial_mass * (cdot - self.motor_speed);
            let old = self.motor_impulse;
            let max = self.max_motor_force * step.dt;
            self.motor_impulse = (old + impulse).clamp(-max, max);
            let delta = self.motor_impulse - old;
            let p = self.axis * delta;
            b1.velocity -= p * m1;
            b1.angular_velocity -= i1 * delta * self.a1;
            b2.velocity += p * m2;
            b2.angular_velocity += i2 * delta * self.a2;
        }

        // translation limit along the axis
        if self.limit_state != LimitState::Inactive {
            let cdot = self.axis.dot(b2.velocity - b1.velocity) + self.a2 * b2.angular_velocity
                - self.a1 * b1.angular_velocity;
            let impulse = -self.axial_mass * cdot;
            let old = self.axial_impulse;
            self.axial_impulse = match self.limit_state {
                LimitState::AtLower => (old + impulse).max(0.0),
                LimitState::AtUpper => (old + impulse).min(0.0),
                _ => old + impulse,
            };
            let delta = self.axial_impulse - old;
            let p = self.axis * delta;
            b1.velocity -= p * m1;
            b1.angular_velocity -= i1 * delta * self.a1;
            b2.velocity += p * m2;
            b2.angular_velocity += i2 * delta * self.a2;
        }

        // perpendicular + angular block
        {
            let cdot = Vec2::new(
                self.perp.dot(b2.velocity - b1.velocity) + self.s2 * b2.angular_velocity
                    - self.s1 * b1.angular_velocity,
                b2.angular_velocity - b1.angular_velocity,
            );
            let impulse = solve22(&self.k, -cdot);
            self.impulse += impulse;
            let p = self.perp * impulse.x;
            let l1 = impulse.x * self.s1 + impulse.y;
            let l2 = impulse.x * self.s2 + impulse.y;
            b1.velocity -= p * m1;
            b1.angular_velocity -= i1 * l1;
            b2.velocity += p * m2;
            b2.angular_velocity += i2 * l2;
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
        let a1 = cross(d + r1, axis);
        let a2 = cross(r2, axis);
        let s1 = cross(d + r1, perp);
        let s2 = cross(r2, perp);

        // axial limit correction
        let mut axial_error = 0.0;
        if self.limit_state != LimitState::Inactive {
            let translation = d.dot(axis);
            let c = match self.limit_state {
                LimitState::Equal => (translation - self.lower_limit).clamp(
                    -settings.max_linear_correction(),
                    settings.max_linear_correction(),
                ),
                LimitState::AtLower => (translation - self.lower_limit)
                    .clamp(-settings.max_linear_correction(), 0.0),
                LimitState::AtUpper => (translation - self.upper_limit)
                    .clamp(0.0, settings.max_linear_correction()),
                LimitState::Inactive => unreachable!(),
            };
            axial_error = c.abs();
            let inv_mass = m1 + m2 + a1 * a1 * i1 + a2 * a2 * i2;
            if inv_mass > f64::EPSILON {
                let impulse = -c / inv_mass;
                let p = axis * impulse;
                b1.translate(-p * m1);
                b1.rotate_about_center(-i1 * impulse * a1);
                b2.translate(p * m2);
                b2.rotate_about_center(i2 * impulse * a2);
            }
        }

        // perpendicular + angular correction
        let perp_error = d.dot(perp);
        let angular_error = wrap_angle(
            b2.transform().rotation - b1.transform().rotation - self.reference_angle,
        );
        let k = [
            m1 + m2 + s1 * s1 * i1 + s2 * s2 * i2,
            s1 * i1 + s2 * i2,
            s1 * i1 + s2 * i2,
            i1 + i2,
        ];
        let impulse = solve22(&k, -Vec2::new(perp_error, angular_error));
        let p = perp * impulse.x;
        let l1 = impulse.x * s1 + impulse.y;
        let l2 = impulse.x * s2 + impulse.y;
        b1.translate(-p * m1);
        b1.rotate_about_center(-i1 * l1);
        b2.translate(p * m2);
        b2.rotate_about_center(i2 * l2);

        perp_error.abs() <= settings.linear_tolerance()
            && axial_error <= settings.linear_tolerance()
            && angular_error.abs() <= settings.angular_tolerance()
    }

    /// Force applied to body2 over the last step.
    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        (self.perp * self.impulse.x + self.axis * (self.axial_impulse + self.motor_impulse))
            * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.impulse.y * inv_dt
    }
}
