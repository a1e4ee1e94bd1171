use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, LimitState, distinct, solve22, solve22_of33, solve33, wrap_angle};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Pins two bodies at a common world point, with an optional angular limit
/// and an optional motor. The velocity constraint is the full 3x3 system
/// when a limit is active, falling back to 2x2 point-to-point when the
/// limit impulse would push the wrong way.
#[derive(Debug, Clone)]
pub struct RevoluteJoint {
    local_anchor1: Vec2,
    local_anchor2: Vec2,
    reference_angle: f64,
    limit_enabled: bool,
    lower_limit: f64,
    upper_limit: f64,
    motor_enabled: bool,
    motor_speed: f64,
    max_motor_torque: f64,

    // solver state
    r1: Vec2,
    r2: Vec2,
    k: [f64; 9],
    motor_mass: f64,
    impulse: [f64; 3],
    motor_impulse: f64,
    limit_state: LimitState,
}

impl Joint {
    /// Revolute joint pinning the bodies at the given world anchor.
    pub fn revolute(b1: &Body, b2: &Body, anchor: Vec2) -> Result<Joint, Error> {
        distinct(b1, b2)?;
        Ok(Joint::new(
            b1.id(),
            b2.id(),
            JointKind::Revolute(RevoluteJoint {
                local_anchor1: b1.transform().apply_inverse(anchor),
                local_anchor2: b2.transform().apply_inverse(anchor),
                reference_angle: b1.transform().rotation - b2.transform().rotation,
                limit_enabled: false,
                lower_limit: 0.0,
                upper_limit: 0.0,
                motor_enabled: false,
                motor_speed: 0.0,
                max_motor_torque: 0.0,
                r1: Vec2::ZERO,
                r2: Vec2::ZERO,
                k: [0.0; 9],
                motor_mass: 0.0,
                impulse: [0.0; 3],
                motor_impulse: 0.0,
                limit_state: LimitState::Inactive,
            }),
        ))
    }
}

impl RevoluteJoint {
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

    /// Target rate of change of the relative angle, rad/s.
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

    pub fn motor_impulse(&self) -> f64 {
        self.motor_impulse
    }

    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    /// Relative angle wrapped to (-pi, pi].
    pub fn relative_rotation(&self, b1: &Body, b2: &Body) -> f64 {
        wrap_angle(b1.transform().rotation - b2.transform().rotation - self.reference_angle)
    }

    pub(super) fn initialize(
        &mut self,
        b1: &mut Body,
        b2: &mut Body,
        step: &TimeStep,
        settings: &Settings,
    ) -> Result<(), Error> {
        let (m1, i1) = (b1.inv_mass(), b1.inv_inertia());
        let (m2, i2) = (b2.inv_mass(), b2.inv_inertia());

        if self.motor_enabled && i1 == 0.0 && i2 == 0.0 {
            return Err(Error::InvalidState(
                "revolute motor requires at least one body with finite inertia",
            ));
        }

        self.r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        self.r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());

        self.k = [
            m1 + m2 + self.r1.y * self.r1.y * i1 + self.r2.y * self.r2.y * i2,
            -self.r1.y * self.r1.x * i1 - self.r2.y * self.r2.x * i2,
            -self.r1.y * i1 - self.r2.y * i2,
            -self.r1.y * self.r1.x * i1 - self.r2.y * self.r2.x * i2,
            m1 + m2 + self.r1.x * self.r1.x * i1 + self.r2.x * self.r2.x * i2,
            self.r1.x * i1 + self.r2.x * i2,
            -self.r1.y * i1 - self.r2.y * i2,
            self.r1.x * i1 + self.r2.x * i2,
            i1 + i2,
        ];

        let inv_motor = i1 + i2;
        self.motor_mass = if inv_motor > f64::EPSILON { 1.0 / inv_motor } else { 0.0 };
        if !self.motor_enabled {
            self.motor_impulse = 0.0;
        }

        if self.limit_enabled {
            let angle = self.relative_rotation(b1, b2);
            if (self.upper_limit - self.lower_limit).abs() < 2.0 * settings.angular_tolerance() {
                self.limit_state = LimitState::Equal;
            } else if angle <= self.lower_limit {
                if self.limit_state != LimitState::AtLower {
                    self.impulse[2] = 0.0;
                }
                self.limit_state = LimitState::AtLower;
            } else if angle >= self.upper_limit {
                // Known asymmetry: the accumulated limit impulse is zeroed
                // when the joint was already at the upper limit, not on
                // entry to it (the lower branch zeroes on entry).
                if self.limit_state == LimitState::AtUpper {
                    self.impulse[2] = 0.0;
                }
                self.limit_state = LimitState::AtUpper;
            } else {
                self.limit_state = LimitState::Inactive;
                self.impulse[2] = 0.0;
            }
        } else {
            self.limit_state = LimitState::Inactive;
            self.impulse[2] = 0.0;
        }

        // warm start
        self.impulse[0] *= step.dt_ratio;
        self.impulse[1] *= step.dt_ratio;
        self.impulse[2] *= step.dt_ratio;
        self.motor_impulse *= step.dt_ratio;
        let p = Vec2::new(self.impulse[0], self.impulse[1]);
        b1.velocity += p * m1;
        b1.angular_velocity += i1 * (cross(self.r1, p) + self.impulse[2] + self.motor_impulse);
        b2.velocity -= p * m2;
        b2.angular_velocity -= i2 * (cross(self.r2, p) + self.impulse[2] + self.motor_impulse);
        Ok(())
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

        // motor
        if self.motor_enabled && self.limit_state != LimitState::Equal {
            let cdot = b1.angular_velocity - b2.angular_velocity - self.motor_speed;
            let impulse = -self.motor_mass * cdot;
            let old = self.motor_impulse;
            let max = self.max_motor_torque * step.dt;
            self.motor_impulse = (old + impulse).clamp(-max, max);
            let delta = self.motor_impulse - old;
            b1.angular_velocity += i1 * delta;
            b2.angular_velocity -= i2 * delta;
        }

        if self.limit_enabled && self.limit_state != LimitState::Inactive {
            let cdot1 = (b1.velocity + cross_sv(b1.angular_velocity, self.r1))
                - (b2.velocity + cross_sv(b2.angular_velocity, self.r2));
            let cdot2 = b1.angular_velocity - b2.angular_velocity;
            let mut x = solve33(&self.k, [-cdot1.x, -cdot1.y, -cdot2]);

            match self.limit_state {
                LimitState::Equal => {
                    self.impulse[0] += x[0];
                    self.impulse[1] += x[1];
                    self.impulse[2] += x[2];
                }
                LimitState::AtLower | LimitState::AtUpper => {
                    let total_z = self.impulse[2] + x[2];
                    let violates = if self.limit_state == LimitState::AtLower {
                        total_z < 0.0
                    } else {
                        total_z > 0.0
                    };
                    if violates {
                        // The limit row would push the wrong way; drop it and
                        // re-solve the point rows with its stored impulse
                        // backed out.
                        let rhs = -cdot1 + Vec2::new(self.k[2], self.k[5]) * self.impulse[2];
                        let reduced = solve22_of33(&self.k, rhs);
                        x[0] = reduced.x;
                        x[1] = reduced.y;
                        x[2] = -self.impulse[2];
                        self.impulse[0] += reduced.x;
                        self.impulse[1] += reduced.y;
                        self.impulse[2] = 0.0;
                    } else {
                        self.impulse[0] += x[0];
                        self.impulse[1] += x[1];
                        self.impulse[2] += x[2];
                    }
                }
                LimitState::Inactive => unreachable!(),
            }

            let p = Vec2::new(x[0], x[1]);
            b1.velocity += p * m1;
            b1.angular_velocity += i1 * (cross(self.r1, p) + x[2]);
            b2.velocity -= p * m2;
            b2.angular_velocity -= i2 * (cross(self.r2, p) + x[2]);
        } else {
            // plain point-to-point
            let cdot = (b1.velocity + cross_sv(b1.angular_velocity, self.r1))
                - (b2.velocity + cross_sv(b2.angular_velocity, self.r2));
            let p = solve22_of33(&self.k, -cdot);
            self.impulse[0] += p.x;
            self.impulse[1] += p.y;
            b1.velocity += p * m1;
            b1.angular_velocity += i1 * cross(self.r1, p);
            b2.velocity -= p * m2;
            b2.angular_velocity -= i2 * cross(self.r2, p);
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
        let mut angular_error = 0.0;

        // angular limit correction
        if self.limit_enabled && self.limit_state != LimitState::Inactive {
            let angle = self.relative_rotation(b1, b2);
            let c = match self.limit_state {
                LimitState::Equal => (angle - self.lower_limit).clamp(
                    -settings.max_angular_correction(),
                    settings.max_angular_correction(),
                ),
                LimitState::AtLower => (angle - self.lower_limit)
                    .clamp(-settings.max_angular_correction(), 0.0),
                LimitState::AtUpper => (angle - self.upper_limit)
                    .clamp(0.0, settings.max_angular_correction()),
                LimitState::Inactive => unreachable!(),
            };
            angular_error = c.abs();
            let inv_k = i1 + i2;
            if inv_k > f64::EPSILON {
                let impulse = -c / inv_k;
                b1.rotate_about_center(i1 * impulse);
                b2.rotate_about_center(-i2 * impulse);
            }
        }

        // point-to-point correction
        let mut r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
        let mut r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
        let mut c = (b1.world_center() + r1) - (b2.world_center() + r2);
        let linear_error = c.length();

        // A heavily separated anchor destabilizes the angular solve; take a
        // half-step translational correction with point masses first.
        let allowed_stretch = 10.0 * settings.linear_tolerance();
        if c.length_squared() > allowed_stretch * allowed_stretch {
            let inv_mass = m1 + m2;
            if inv_mass > f64::EPSILON {
                let impulse = c * (-0.5 / inv_mass);
                b1.translate(impulse * m1);
                b2.translate(-impulse * m2);
                r1 = b1.transform().apply_rotation(self.local_anchor1 - b1.local_center());
                r2 = b2.transform().apply_rotation(self.local_anchor2 - b2.local_center());
                c = (b1.world_center() + r1) - (b2.world_center() + r2);
            }
        }

        let k = [
            m1 + m2 + r1.y * r1.y * i1 + r2.y * r2.y * i2,
            -r1.y * r1.x * i1 - r2.y * r2.x * i2,
            -r1.y * r1.x * i1 - r2.y * r2.x * i2,
            m1 + m2 + r1.x * r1.x * i1 + r2.x * r2.x * i2,
        ];
        let j = solve22(&k, -c);
        b1.translate(j * m1);
        b1.rotate_about_center(i1 * cross(r1, j));
        b2.translate(-j * m2);
        b2.rotate_about_center(-i2 * cross(r2, j));

        linear_error <= settings.linear_tolerance()
            && angular_error <= settings.angular_tolerance()
    }

    /// Force applied to body1 over the last step.
    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        Vec2::new(self.impulse[0], self.impulse[1]) * inv_dt
    }

    pub(super) fn reaction_torque(&self, inv_dt: f64) -> f64 {
        self.impulse[2] * inv_dt
    }
}
