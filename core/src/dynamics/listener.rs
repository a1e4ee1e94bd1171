//! Host-implemented callback sets. Boolean returns are advisory: a `false`
//! from any listener suppresses the contact (or filters the body/pair) for
//! the current step only. Listeners must not mutate the world structurally.

use crate::collision::Toi;
use crate::geometry::{Ray, RaycastHit};

use super::body::Body;
use super::contact::ContactPointData;
use super::joint::Joint;
use super::timestep::TimeStep;
use super::world::World;

/// Step lifecycle notifications.
#[allow(unused_variables)]
pub trait StepListener {
    /// Fired before any work in a step.
    fn begin(&mut self, step: &TimeStep, world: &World) {}
    /// Fired by `World::update` after it performed at least one step.
    fn update_performed(&mut self, step: &TimeStep, world: &World) {}
    /// Fired after all islands have been solved, before CCD.
    fn post_solve(&mut self, step: &TimeStep, world: &World) {}
    /// Fired at the very end of a step.
    fn end(&mut self, step: &TimeStep, world: &World) {}
}

/// A solved contact point with its accumulated impulses.
#[derive(Debug, Clone, Copy)]
pub struct SolvedContactPoint {
    pub data: ContactPointData,
    pub normal_impulse: f64,
    pub tangent_impulse: f64,
}

/// Contact lifecycle notifications. `begin`, `persist`, and `pre_solve`
/// may veto the contact for the step.
#[allow(unused_variables)]
pub trait ContactListener {
    fn begin(&mut self, point: &ContactPointData) -> bool {
        true
    }
    fn persist(&mut self, point: &ContactPointData) -> bool {
        true
    }
    fn end(&mut self, point: &ContactPointData) {}
    fn pre_solve(&mut self, point: &ContactPointData) -> bool {
        true
    }
    fn post_solve(&mut self, point: &SolvedContactPoint) {}
    /// Fired for sensor fixtures each step they overlap; sensors never
    /// enter the solver.
    fn sensed(&mut self, point: &ContactPointData) {}
}

/// Notifications for objects implicitly destroyed by a removal.
#[allow(unused_variables)]
pub trait DestructionListener {
    fn body_destroyed(&mut self, body: &Body) {}
    fn joint_destroyed(&mut self, joint: &Joint) {}
    fn contact_destroyed(&mut self, contact: &ContactPointData) {}
}

/// Fired when a body leaves the world bounds entirely (the body is
/// disabled first).
#[allow(unused_variables)]
pub trait BoundsListener {
    fn out_of_bounds(&mut self, body: &Body) {}
}

/// Filters raycast results; returning false drops the hit.
#[allow(unused_variables)]
pub trait RaycastListener {
    fn allow(&mut self, ray: &Ray, body: &Body, hit: &RaycastHit) -> bool {
        true
    }
}

/// Filters time-of-impact resolution; returning false skips the pair.
#[allow(unused_variables)]
pub trait TimeOfImpactListener {
    fn collision(&mut self, body1: &Body, body2: &Body, toi: &Toi) -> bool {
        true
    }
}
