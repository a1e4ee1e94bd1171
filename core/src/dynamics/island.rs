use log::debug;

use crate::error::Error;

use super::body::{Body, BodyId};
use super::contact::ContactConstraint;
use super::contact::solver as contact_solver;
use super::joint::Joint;
use super::settings::Settings;
use super::timestep::TimeStep;

/// A connected component of awake dynamic bodies plus the contacts and
/// joints among them, solved in isolation. Static bodies are members but
/// never bridge islands.
#[derive(Debug, Default)]
pub struct Island {
    pub bodies: Vec<BodyId>,
    /// Indices into the step's contact constraint list.
    pub contacts: Vec<usize>,
    /// Indices into the world's joint list.
    pub joints: Vec<usize>,
}

impl Island {
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
        self.joints.clear();
    }

    /// Full solve pass: constraint initialization and warm starting,
    /// velocity iterations, position integration, position iterations, and
    /// the island-wide at-rest decision.
    pub(crate) fn solve(
        &self,
        bodies: &mut [Option<Body>],
        constraints: &mut [ContactConstraint],
        joints: &mut [Joint],
        step: &TimeStep,
        settings: &Settings,
    ) -> Result<(), Error> {
        // Impossible configurations are rejected before any warm-start
        // impulse touches a body.
        for &ji in &self.joints {
            joints[ji].validate(bodies)?;
        }

        for &ci in &self.contacts {
            contact_solver::initialize(bodies, &mut constraints[ci]);
        }
        for &ci in &self.contacts {
            contact_solver::warm_start(bodies, &mut constraints[ci], step);
        }
        for &ji in &self.joints {
            joints[ji].initialize(bodies, step, settings)?;
        }

        for _ in 0..settings.velocity_iterations() {
            for &ci in &self.contacts {
                contact_solver::solve_velocity(bodies, &mut constraints[ci]);
            }
            for &ji in &self.joints {
                joints[ji].solve_velocity(bodies, step, settings);
            }
        }

        for &bi in &self.bodies {
            if let Some(body) = bodies[bi as usize].as_mut() {
                body.integrate_position(step, settings);
            }
        }

        for _ in 0..settings.position_iterations() {
            let mut max_penetration = 0.0f64;
            for &ci in &self.contacts {
                let pen = contact_solver::solve_position(bodies, &mut constraints[ci], settings);
                max_penetration = max_penetration.max(pen);
            }
            let mut joints_solved = true;
            for &ji in &self.joints {
                joints_solved &= joints[ji].solve_position(bodies, step, settings);
            }
            if max_penetration <= 3.0 * settings.linear_tolerance() && joints_solved {
                break;
            }
        }

        self.update_at_rest(bodies, step, settings);
        Ok(())
    }

    /// Advance every dynamic member's at-rest timer and put the whole
    /// island to sleep when all of them have dwelt long enough.
    fn update_at_rest(&self, bodies: &mut [Option<Body>], step: &TimeStep, settings: &Settings) {
        if !settings.is_at_rest_detection_enabled() {
            return;
        }
        let mut min_time = f64::MAX;
        let mut sleepable = true;
        for &bi in &self.bodies {
            let body = match bodies[bi as usize].as_mut() {
                Some(b) if b.is_dynamic() => b,
                _ => continue,
            };
            if !body.is_at_rest_detection_enabled() {
                sleepable = false;
            }
            let time = body.update_at_rest_time(step, settings);
            min_time = min_time.min(time);
        }

        if sleepable && min_time >= settings.at_rest_time() {
            debug!("island of {} bodies going to rest", self.bodies.len());
            for &bi in &self.bodies {
                if let Some(body) = bodies[bi as usize].as_mut() {
                    if body.is_dynamic() {
                        body.set_at_rest(true);
                    }
                }
            }
        }
    }
}
