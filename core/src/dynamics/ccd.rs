//! Continuous-collision substep: after the discrete solve, find the
//! earliest time of impact for each candidate body, pull the pair back to
//! that time, and resolve a one-shot contact so fast bodies cannot tunnel.

use std::collections::HashSet;

use log::debug;

use crate::collision::{ManifoldSolver, NarrowphaseDetector, TimeOfImpactDetector, ValueMixer};

use super::body::{Body, BodyId, body_pair_mut};
use super::contact::constraint::{ContactConstraint, ContactKey};
use super::contact::solver as contact_solver;
use super::listener::TimeOfImpactListener;
use super::settings::{ContinuousDetectionMode, Settings};

pub(crate) struct CcdContext<'a> {
    pub toi: &'a dyn TimeOfImpactDetector,
    pub narrowphase: &'a dyn NarrowphaseDetector,
    pub manifold_solver: &'a dyn ManifoldSolver,
    pub mixer: &'a dyn ValueMixer,
}

/// Run the CCD substep over every candidate body for the current mode.
pub(crate) fn solve(
    bodies: &mut [Option<Body>],
    disallowed: &HashSet<(BodyId, BodyId)>,
    ctx: &CcdContext<'_>,
    listeners: &mut [Box<dyn TimeOfImpactListener>],
    settings: &Settings,
) {
    let mode = settings.continuous_detection_mode();
    if mode == ContinuousDetectionMode::None {
        return;
    }

    for index in 0..bodies.len() {
        let candidate = match &bodies[index] {
            Some(b) => b,
            None => continue,
        };
        if !candidate.is_enabled() || !candidate.is_dynamic() || candidate.is_at_rest() {
            continue;
        }
        if mode == ContinuousDetectionMode::BulletsOnly && !candidate.is_bullet() {
            continue;
        }
        solve_body(bodies, index as BodyId, disallowed, ctx, listeners, settings);
    }
}

/// Find the earliest TOI between `id` and any other body over the step's
/// motion window, and resolve it.
fn solve_body(
    bodies: &mut [Option<Body>],
    id: BodyId,
    disallowed: &HashSet<(BodyId, BodyId)>,
    ctx: &CcdContext<'_>,
    listeners: &mut [Box<dyn TimeOfImpactListener>],
    settings: &Settings,
) {
    let mut best: Option<(BodyId, usize, usize, f64)> = None;

    {
        let body1 = bodies[id as usize].as_ref().unwrap();
        for (other_index, slot) in bodies.iter().enumerate() {
            let other_id = other_index as BodyId;
            if other_id == id {
                continue;
            }
            let body2 = match slot {
                Some(b) if b.is_enabled() => b,
                _ => continue,
            };
            let pair = if id < other_id { (id, other_id) } else { (other_id, id) };
            if disallowed.contains(&pair) {
                continue;
            }

            for (f1, fixture1) in body1.fixtures().iter().enumerate() {
                if fixture1.sensor {
                    continue;
                }
                for (f2, fixture2) in body2.fixtures().iter().enumerate() {
                    if fixture2.sensor || !fixture1.filter.allows(&fixture2.filter) {
                        continue;
                    }
                    let toi = ctx.toi.time_of_impact(
                        &fixture1.shape,
                        body1.initial_transform(),
                        body1.transform(),
                        &fixture2.shape,
                        body2.initial_transform(),
                        body2.transform(),
                    );
                    if let Some(toi) = toi {
                        if best.is_none_or(|(_, _, _, t)| toi.t < t) {
                            best = Some((other_id, f1, f2, toi.t));
                        }
                    }
                }
            }
        }
    }

    let Some((other_id, f1, f2, t)) = best else {
        return;
    };

    // Advisory filter.
    {
        let b1 = bodies[id as usize].as_ref().unwrap();
        let b2 = bodies[other_id as usize].as_ref().unwrap();
        let toi = crate::collision::Toi { t };
        for listener in listeners.iter_mut() {
            if !listener.collision(b1, b2, &toi) {
                return;
            }
        }
    }

    debug!("time of impact t={t:.6} between bodies {id} and {other_id}");

    // The TOI pose is just short of touching; if detection misses there,
    // nudge forward along the motion and retry once. The poses are probed
    // before any body is moved.
    let detect_at = |probe: f64| {
        let b1 = bodies[id as usize].as_ref().unwrap();
        let b2 = bodies[other_id as usize].as_ref().unwrap();
        let s1 = &b1.fixtures()[f1].shape;
        let s2 = &b2.fixtures()[f2].shape;
        let p1 = b1.initial_transform().lerp(b1.transform(), probe);
        let p2 = b2.initial_transform().lerp(b2.transform(), probe);
        ctx.narrowphase
            .detect(s1, &p1, s2, &p2)
            .and_then(|pen| ctx.manifold_solver.manifold(&pen, s1, &p1, s2, &p2))
    };
    let (impact_t, mut manifold) = match detect_at(t) {
        Some(m) => (t, m),
        None => {
            let nudged = (t + 1e-3).min(1.0);
            match detect_at(nudged) {
                Some(m) => (nudged, m),
                None => return,
            }
        }
    };

    // Pull both bodies back to the impact time.
    {
        let (b1, b2) = body_pair_mut(bodies, id, other_id);
        b1.advance_to(impact_t);
        b2.advance_to(impact_t);
    }

    // The constraint key orders by body id; flip the normal to match when
    // the candidate is the higher id.
    if id > other_id {
        manifold.normal = -manifold.normal;
    }
    let key = ContactKey::new(id, f1, other_id, f2);
    let mut constraint = {
        let low = bodies[key.body1 as usize].as_ref().unwrap();
        let high = bodies[key.body2 as usize].as_ref().unwrap();
        ContactConstraint::new(key, &manifold, low, high, ctx.mixer)
    };

    // One-shot resolve: single velocity iteration plus a position fix.
    contact_solver::initialize(bodies, &mut constraint);
    contact_solver::solve_velocity(bodies, &mut constraint);
    contact_solver::solve_position(bodies, &mut constraint, settings);
}
