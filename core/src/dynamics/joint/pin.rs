use std::f64::consts::TAU;

use crate::error::Error;
use crate::geometry::{Vec2, cross, cross_sv};

use super::{Joint, JointKind, solve22};
use crate::dynamics::body::Body;
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;

/// Binds one body's anchor to a world-space target through a soft
/// spring-damper constraint. Frequency must be positive; the impulse is
/// capped by `max_force * dt`.
#[derive(Debug, Clone)]
pub struct PinJoint {
    target: Vec2,
    local_anchor: Vec2,
    frequency: f64,
    damping_ratio: f64,
    max_force: f64,

    // solver state
    r: Vec2,
    k: [f64; 4],
    gamma: f64,
    bias: Vec2,
    impulse: Vec2,
}

impl Joint {
    /// Pin joint dragging `anchor` (world space) on `body` toward itself.
    pub fn pin(
        body: &Body,
        anchor: Vec2,
        frequency: f64,
        damping_ratio: f64,
        max_force: f64,
    ) -> Result<Joint, Error> {
        if frequency <= 0.0 {
            return Err(Error::InvalidArgument("pin joint frequency must be positive"));
        }
        if !(0.0..=1.0).contains(&damping_ratio) {
            return Err(Error::InvalidArgument("damping ratio must be in [0, 1]"));
        }
        if max_force < 0.0 {
            return Err(Error::InvalidArgument("maximum force must be non-negative"));
        }
        Ok(Joint::new(
            body.id(),
            body.id(),
            JointKind::Pin(PinJoint {
                target: anchor,
                local_anchor: body.transform().apply_inverse(anchor),
                frequency,
                damping_ratio,
                max_force,
                r: Vec2::ZERO,
                k: [0.0; 4],
                gamma: 0.0,
                bias: Vec2::ZERO,
                impulse: Vec2::ZERO,
            }),
        ))
    }
}

impl PinJoint {
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn anchor(&self, body: &Body) -> Vec2 {
        body.transform().apply(self.local_anchor)
    }

    pub(super) fn shift(&mut self, v: Vec2) {
        self.target += v;
    }

    pub(super) fn initialize(&mut self, body: &mut Body, step: &TimeStep, _settings: &Settings) {
        let m = body.mass().mass;
        let inv_m = body.inv_mass();
        let inv_i = body.inv_inertia();

        // Soft constraint coefficients from the spring-damper analogy.
        let omega = TAU * self.frequency;
        let d = 2.0 * m * self.damping_ratio * omega;
        let k = m * omega * omega;
        let dt = step.dt;
        let gamma = dt * (d + dt * k);
        self.gamma = if gamma > f64::EPSILON { 1.0 / gamma } else { 0.0 };

        self.r = body.transform().apply_rotation(self.local_anchor - body.local_center());
        let error = body.world_center() + self.r - self.target;
        self.bias = error * (dt * k * self.gamma);

        self.k = [
            inv_m + inv_i * self.r.y * self.r.y + self.gamma,
            -inv_i * self.r.x * self.r.y,
            -inv_i * self.r.x * self.r.y,
            inv_m + inv_i * self.r.x * self.r.x + self.gamma,
        ];

        // warm start
        self.impulse *= step.dt_ratio;
        body.velocity += self.impulse * inv_m;
        body.angular_velocity += inv_i * cross(self.r, self.impulse);
    }

    pub(super) fn solve_velocity(&mut self, body: &mut Body, step: &TimeStep, _settings: &Settings) {
        let inv_m = body.inv_mass();
        let inv_i = body.inv_inertia();

        let cdot = body.velocity + cross_sv(body.angular_velocity, self.r);
        let impulse = solve22(&self.k, -(cdot + self.bias + self.impulse * self.gamma));

        let old = self.impulse;
        let mut total = old + impulse;
        let max = self.max_force * step.dt;
        if total.length_squared() > max * max {
            total = total.normalize() * max;
        }
        self.impulse = total;
        let delta = total - old;

        body.velocity += delta * inv_m;
        body.angular_velocity += inv_i * cross(self.r, delta);
    }

    pub(super) fn solve_position(
        &mut self,
        _body: &mut Body,
        _step: &TimeStep,
        _settings: &Settings,
    ) -> bool {
        // Soft constraint: error feeds the velocity bias instead.
        true
    }

    pub(super) fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.impulse * inv_dt
    }

    pub(super) fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }
}
