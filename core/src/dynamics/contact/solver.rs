//! Sequential-impulse solver for contact constraints: effective masses and
//! restitution bias at init, warm starting, tangent-then-normal velocity
//! iterations with accumulated-impulse clamping, and non-linear position
//! correction.

use super::constraint::ContactConstraint;
use crate::dynamics::body::{Body, body_pair_mut};
use crate::dynamics::settings::Settings;
use crate::dynamics::timestep::TimeStep;
use crate::geometry::{Vec2, cross};

/// Block matrices with a condition number beyond this solve one point alone.
const MAX_CONDITION_NUMBER: f64 = 1000.0;

/// Compute per-contact effective masses, local anchors, restitution bias,
/// and the 2x2 block matrix; handle the degenerate two-point case.
pub(crate) fn initialize(bodies: &mut [Option<Body>], constraint: &mut ContactConstraint) {
    if !constraint.is_solvable() {
        constraint.size = 0;
        return;
    }
    let (b1, b2) = body_pair_mut(bodies, constraint.key.body1, constraint.key.body2);
    let m1 = b1.inv_mass();
    let i1 = b1.inv_inertia();
    let c1 = b1.world_center();
    let t1 = *b1.transform();
    let m2 = b2.inv_mass();
    let i2 = b2.inv_inertia();
    let c2 = b2.world_center();
    let t2 = *b2.transform();

    let normal = constraint.normal;
    let tangent = constraint.tangent;

    for contact in &mut constraint.contacts {
        contact.ignored = false;
        contact.r1 = contact.point - c1;
        contact.r2 = contact.point - c2;
        contact.local1 = t1.apply_inverse(contact.point);
        contact.local2 = t2.apply_inverse(contact.point);

        let rn1 = cross(contact.r1, normal);
        let rn2 = cross(contact.r2, normal);
        let kn = m1 + m2 + i1 * rn1 * rn1 + i2 * rn2 * rn2;
        contact.mass_n = if kn > f64::EPSILON { 1.0 / kn } else { 0.0 };

        let rt1 = cross(contact.r1, tangent);
        let rt2 = cross(contact.r2, tangent);
        let kt = m1 + m2 + i1 * rt1 * rt1 + i2 * rt2 * rt2;
        contact.mass_t = if kt > f64::EPSILON { 1.0 / kt } else { 0.0 };

        // Restitution: bias only when approaching faster than the threshold.
        let rv = b2.velocity_at(contact.point) - b1.velocity_at(contact.point);
        let vn = rv.dot(normal);
        contact.vb = if vn < -constraint.restitution_velocity {
            constraint.restitution * vn
        } else {
            0.0
        };
    }

    constraint.size = constraint.contacts.len();
    if constraint.size == 2 {
        let rn1a = cross(constraint.contacts[0].r1, normal);
        let rn2a = cross(constraint.contacts[0].r2, normal);
        let rn1b = cross(constraint.contacts[1].r1, normal);
        let rn2b = cross(constraint.contacts[1].r2, normal);
        let k11 = m1 + m2 + i1 * rn1a * rn1a + i2 * rn2a * rn2a;
        let k12 = m1 + m2 + i1 * rn1a * rn1b + i2 * rn2a * rn2b;
        let k22 = m1 + m2 + i1 * rn1b * rn1b + i2 * rn2b * rn2b;
        let det = k11 * k22 - k12 * k12;
        if k11 * k11 < MAX_CONDITION_NUMBER * det {
            constraint.k = [k11, k12, k12, k22];
            let inv_det = 1.0 / det;
            constraint.inv_k = [
                k22 * inv_det,
                -k12 * inv_det,
                -k12 * inv_det,
                k11 * inv_det,
            ];
        } else {
            // Points are nearly coincident; keep the deeper one at index 0
            // and drop the other from the solve.
            if constraint.contacts[1].depth > constraint.contacts[0].depth {
                constraint.contacts.swap(0, 1);
            }
            constraint.contacts[1].ignored = true;
            constraint.size = 1;
        }
    }
}

/// Re-apply the previous step's impulses, scaled by the dt ratio.
pub(crate) fn warm_start(
    bodies: &mut [Option<Body>],
    constraint: &mut ContactConstraint,
    step: &TimeStep,
) {
    if constraint.size == 0 {
        return;
    }
    let normal = constraint.normal;
    let tangent = constraint.tangent;
    let (b1, b2) = body_pair_mut(bodies, constraint.key.body1, constraint.key.body2);
    for contact in &mut constraint.contacts {
        if contact.ignored {
            continue;
        }
        contact.jn *= step.dt_ratio;
        contact.jt *= step.dt_ratio;
        let j = normal * contact.jn + tangent * contact.jt;
        b1.velocity -= j * b1.inv_mass();
        b1.angular_velocity -= b1.inv_inertia() * cross(contact.r1, j);
        b2.velocity += j * b2.inv_mass();
        b2.angular_velocity += b2.inv_inertia() * cross(contact.r2, j);
    }
}

/// One velocity iteration: friction along the tangent first, then the
/// normal impulses (single contact, or the 2x2 block LCP).
pub(crate) fn solve_velocity(bodies: &mut [Option<Body>], constraint: &mut ContactConstraint) {
    if constraint.size == 0 {
        return;
    }
    let normal = constraint.normal;
    let tangent = constraint.tangent;
    let friction = constraint.friction;
    let (b1, b2) = body_pair_mut(bodies, constraint.key.body1, constraint.key.body2);

    // Tangent: clamp the accumulated impulse to the friction cone around the
    // current normal impulse.
    for contact in &mut constraint.contacts {
        if contact.ignored {
            continue;
        }
        let rv = relative_velocity(b1, b2, contact.r1, contact.r2);
        let vt = rv.dot(tangent);
        let lambda = -contact.mass_t * vt;

        let max_friction = friction * contact.jn;
        let old = contact.jt;
        contact.jt = (old + lambda).clamp(-max_friction, max_friction);
        let delta = contact.jt - old;

        let j = tangent * delta;
        b1.velocity -= j * b1.inv_mass();
        b1.angular_velocity -= b1.inv_inertia() * cross(contact.r1, j);
        b2.velocity += j * b2.inv_mass();
        b2.angular_velocity += b2.inv_inertia() * cross(contact.r2, j);
    }

    if constraint.size == 1 {
        let contact = &mut constraint.contacts[0];
        let rv = relative_velocity(b1, b2, contact.r1, contact.r2);
        let vn = rv.dot(normal);
        let lambda = -contact.mass_n * (vn + contact.vb);

        let old = contact.jn;
        contact.jn = (old + lambda).max(0.0);
        let delta = contact.jn - old;

        let j = normal * delta;
        b1.velocity -= j * b1.inv_mass();
        b1.angular_velocity -= b1.inv_inertia() * cross(contact.r1, j);
        b2.velocity += j * b2.inv_mass();
        b2.angular_velocity += b2.inv_inertia() * cross(contact.r2, j);
    } else {
        solve_block(b1, b2, constraint);
    }
}

/// Two-point normal solve: case analysis over the active set of the 2x2
/// LCP, applying only the delta from the currently accumulated impulses.
fn solve_block(b1: &mut Body, b2: &mut Body, constraint: &mut ContactConstraint) {
    let normal = constraint.normal;
    let [k11, k12, _, k22] = constraint.k;
    let inv_k = constraint.inv_k;

    let a1 = constraint.contacts[0].jn;
    let a2 = constraint.contacts[1].jn;

    let rv1 = relative_velocity(b1, b2, constraint.contacts[0].r1, constraint.contacts[0].r2);
    let rv2 = relative_velocity(b1, b2, constraint.contacts[1].r1, constraint.contacts[1].r2);
    let vn1 = rv1.dot(normal) + constraint.contacts[0].vb;
    let vn2 = rv2.dot(normal) + constraint.contacts[1].vb;

    // Residual with the accumulated impulse backed out, so each case can be
    // evaluated as if solving from scratch.
    let b_1 = vn1 - (k11 * a1 + k12 * a2);
    let b_2 = vn2 - (k12 * a1 + k22 * a2);

    let (x1, x2) = 'cases: {
        // Both points active.
        let x1 = -(inv_k[0] * b_1 + inv_k[1] * b_2);
        let x2 = -(inv_k[2] * b_1 + inv_k[3] * b_2);
        if x1 >= 0.0 && x2 >= 0.0 {
            break 'cases (x1, x2);
        }
        // Only the first point active.
        let x1 = -b_1 / k11;
        if x1 >= 0.0 && k12 * x1 + b_2 >= 0.0 {
            break 'cases (x1, 0.0);
        }
        // Only the second point active.
        let x2 = -b_2 / k22;
        if x2 >= 0.0 && k12 * x2 + b_1 >= 0.0 {
            break 'cases (0.0, x2);
        }
        // Both separating.
        if b_1 >= 0.0 && b_2 >= 0.0 {
            break 'cases (0.0, 0.0);
        }
        // No feasible case; leave the accumulated impulses untouched.
        (a1, a2)
    };

    let d1 = x1 - a1;
    let d2 = x2 - a2;
    if d1 == 0.0 && d2 == 0.0 {
        return;
    }
    let j1 = normal * d1;
    let j2 = normal * d2;
    b1.velocity -= (j1 + j2) * b1.inv_mass();
    b1.angular_velocity -= b1.inv_inertia()
        * (cross(constraint.contacts[0].r1, j1) + cross(constraint.contacts[1].r1, j2));
    b2.velocity += (j1 + j2) * b2.inv_mass();
    b2.angular_velocity += b2.inv_inertia()
        * (cross(constraint.contacts[0].r2, j1) + cross(constraint.contacts[1].r2, j2));
    constraint.contacts[0].jn = x1;
    constraint.contacts[1].jn = x2;
}

/// One position iteration: project the residual overlap onto the normal and
/// apply a pseudo-impulse as translation/rotation. Returns the largest
/// penetration seen so the island can decide convergence.
pub(crate) fn solve_position(
    bodies: &mut [Option<Body>],
    constraint: &mut ContactConstraint,
    settings: &Settings,
) -> f64 {
    if constraint.size == 0 {
        return 0.0;
    }
    let normal = constraint.normal;
    let (b1, b2) = body_pair_mut(bodies, constraint.key.body1, constraint.key.body2);
    let m1 = b1.inv_mass();
    let i1 = b1.inv_inertia();
    let m2 = b2.inv_mass();
    let i2 = b2.inv_inertia();

    let mut max_penetration = 0.0f64;
    for contact in &constraint.contacts {
        if contact.ignored {
            continue;
        }
        // Re-derive the current overlap from how far the anchored points have
        // separated along the normal.
        let p1 = b1.transform().apply(contact.local1);
        let p2 = b2.transform().apply(contact.local2);
        let penetration = contact.depth - (p2 - p1).dot(normal);
        max_penetration = max_penetration.max(penetration);

        let correction = (settings.baumgarte() * (penetration - settings.linear_tolerance()))
            .clamp(0.0, settings.max_linear_correction());
        if correction <= 0.0 {
            continue;
        }

        let r1 = p1 - b1.world_center();
        let r2 = p2 - b2.world_center();
        let rn1 = cross(r1, normal);
        let rn2 = cross(r2, normal);
        let k = m1 + m2 + i1 * rn1 * rn1 + i2 * rn2 * rn2;
        if k <= f64::EPSILON {
            continue;
        }
        let impulse = correction / k;
        let j = normal * impulse;

        b1.translate(-j * m1);
        b1.rotate_about_center(-i1 * cross(r1, j));
        b2.translate(j * m2);
        b2.rotate_about_center(i2 * cross(r2, j));
    }
    max_penetration
}

#[inline]
fn relative_velocity(b1: &Body, b2: &Body, r1: Vec2, r2: Vec2) -> Vec2 {
    (b2.velocity + crate::geometry::cross_sv(b2.angular_velocity, r2))
        - (b1.velocity + crate::geometry::cross_sv(b1.angular_velocity, r1))
}
