//! Integration tests for world stepping, integration, sleep, bounds, CCD,
//! and determinism.

use std::cell::RefCell;
use std::rc::Rc;

use planar_core::dynamics::listener::BoundsListener;
use planar_core::dynamics::{Body, ContinuousDetectionMode, Fixture, World};
use planar_core::dynamics::force::Force;
use planar_core::geometry::{Aabb, Mass, MassType, Ray, Shape, Transform, Vec2};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn disk(mass: f64, radius: f64, x: f64, y: f64) -> Body {
    init_logging();
    let mut body = Body::new();
    body.add_fixture(Fixture::new(Shape::circle(radius)));
    body.set_mass_explicit(Mass::new(Vec2::ZERO, mass, 0.5 * mass * radius * radius));
    body.set_transform(Transform::new(Vec2::new(x, y), 0.0));
    body.set_angular_damping(0.0).unwrap();
    body
}

fn ground(width: f64, height: f64, x: f64, y: f64) -> Body {
    init_logging();
    let mut body = Body::new();
    body.add_fixture(Fixture::new(Shape::rectangle(width, height)));
    body.set_mass(MassType::Infinite);
    body.set_transform(Transform::new(Vec2::new(x, y), 0.0));
    body
}

// =========================================================================
// Bodies and joints lifecycle
// =========================================================================

#[test]
fn test_add_and_remove_body() {
    let mut world = World::new();
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    assert_eq!(world.body_count(), 1);
    assert!(world.remove_body(id));
    assert_eq!(world.body_count(), 0);
    // Removing again is ignored, not an error.
    assert!(!world.remove_body(id));
}

#[test]
fn test_remove_body_removes_attached_joints() {
    let mut world = World::new();
    let a = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 2.0, 0.0));
    let joint = planar_core::dynamics::Joint::distance(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(2.0, 0.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    assert!(world.remove_body(a));
    assert!(world.joint(jid).is_none());
    assert!(!world.remove_joint(jid));
}

#[test]
fn test_add_joint_requires_world_bodies() {
    let mut world = World::new();
    let a = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let foreign = disk(1.0, 0.5, 5.0, 0.0);
    let joint =
        planar_core::dynamics::Joint::angle(world.body(a).unwrap(), &foreign).unwrap();
    assert!(world.add_joint(joint).is_err());
}

// =========================================================================
// Integration
// =========================================================================

#[test]
fn test_free_fall_matches_analytic() {
    // S1: mass 1 kg, gravity (0, -9.8), dt 1/60, 60 steps -> y ~ -4.9.
    let mut world = World::new();
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    world.step(60).unwrap();
    let y = world.body(id).unwrap().transform().translation.y;
    assert!((y + 4.9).abs() < 0.1, "free fall ended at y={y}");
}

#[test]
fn test_static_body_never_moves() {
    let mut world = World::new();
    let id = world.add_body(ground(10.0, 1.0, 0.0, 0.0));
    world.step(120).unwrap();
    let body = world.body(id).unwrap();
    assert_eq!(body.velocity(), Vec2::ZERO);
    assert_eq!(body.transform().translation, Vec2::ZERO);
}

#[test]
fn test_gravity_scale_inverts_gravity() {
    let mut world = World::new();
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    world.body_mut(id).unwrap().set_gravity_scale(-1.0);
    world.step(30).unwrap();
    assert!(world.body(id).unwrap().transform().translation.y > 0.0);
}

#[test]
fn test_momentum_conserved_without_external_forces() {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    let a = world.add_body(disk(2.0, 0.5, -20.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 20.0, 5.0));
    world.body_mut(a).unwrap().set_velocity(Vec2::new(-1.0, 0.5));
    world.body_mut(a).unwrap().set_angular_velocity(2.0);
    world.body_mut(b).unwrap().set_velocity(Vec2::new(0.3, 0.2));
    world.body_mut(b).unwrap().set_angular_velocity(-1.0);
    // Sleep would zero the velocities.
    world.settings_mut().set_at_rest_detection_enabled(false);

    world.step(120).unwrap();

    let va = world.body(a).unwrap().velocity();
    let vb = world.body(b).unwrap().velocity();
    let p = va * 2.0 + vb * 1.0;
    assert!((p - Vec2::new(-1.7, 1.2)).length() < 1e-9, "momentum drifted to {p:?}");
    assert!((world.body(a).unwrap().angular_velocity() - 2.0).abs() < 1e-9);
    assert!((world.body(b).unwrap().angular_velocity() + 1.0).abs() < 1e-9);
}

#[test]
fn test_timed_force_accelerates_for_its_duration() {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    // 6 N for 0.1 s -> 0.6 kg m/s of momentum.
    world
        .body_mut(id)
        .unwrap()
        .apply_force(Force::new(Vec2::new(6.0, 0.0)).with_duration(0.1));
    world.step(60).unwrap();
    let vx = world.body(id).unwrap().velocity().x;
    assert!((vx - 0.6).abs() < 0.05, "vx={vx}");
}

// =========================================================================
// update() semantics
// =========================================================================

#[test]
fn test_update_accumulates_until_step_frequency() {
    let mut world = World::new();
    world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let dt = world.settings().step_frequency();
    assert_eq!(world.update(dt * 0.4, None).unwrap(), 0);
    assert_eq!(world.update(dt * 0.7, None).unwrap(), 1);
}

#[test]
fn test_update_ignores_non_positive_elapsed() {
    let mut world = World::new();
    world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    assert_eq!(world.update(0.0, None).unwrap(), 0);
    assert_eq!(world.update(-1.0, None).unwrap(), 0);
}

#[test]
fn test_update_respects_max_steps() {
    let mut world = World::new();
    world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let dt = world.settings().step_frequency();
    assert_eq!(world.update(dt * 5.0, Some(3)).unwrap(), 3);
}

#[test]
fn test_step_with_dt_rejects_non_positive() {
    let mut world = World::new();
    assert!(world.step_with_dt(1, 0.0).is_err());
    assert!(world.step_with_dt(1, -0.01).is_err());
}

// =========================================================================
// Sleep
// =========================================================================

#[test]
fn test_resting_body_falls_asleep_and_wakes_on_impulse() {
    // S5: a body resting on static ground sleeps after the dwell time and
    // an impulse wakes it.
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.5));

    world.step(180).unwrap();
    assert!(world.body(id).unwrap().is_at_rest(), "body should be asleep");
    assert_eq!(world.body(id).unwrap().velocity(), Vec2::ZERO);

    // Stays asleep while unperturbed.
    world.step(60).unwrap();
    assert!(world.body(id).unwrap().is_at_rest());

    world
        .body_mut(id)
        .unwrap()
        .apply_impulse(Vec2::new(0.02, 0.0));
    assert!(!world.body(id).unwrap().is_at_rest());
}

#[test]
fn test_sleep_disabled_per_body() {
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.5));
    world.body_mut(id).unwrap().set_at_rest_detection_enabled(false);
    world.step(240).unwrap();
    assert!(!world.body(id).unwrap().is_at_rest());
}

// =========================================================================
// Bounds
// =========================================================================

struct RecordingBounds {
    out: Rc<RefCell<Vec<u32>>>,
}

impl BoundsListener for RecordingBounds {
    fn out_of_bounds(&mut self, body: &Body) {
        self.out.borrow_mut().push(body.id());
    }
}

#[test]
fn test_body_leaving_bounds_is_disabled() {
    let mut world = World::new();
    world.set_bounds(Some(Aabb::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0))));
    let out = Rc::new(RefCell::new(Vec::new()));
    world.add_bounds_listener(Box::new(RecordingBounds { out: out.clone() }));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));

    world.step(150).unwrap();

    assert!(!world.body(id).unwrap().is_enabled());
    assert_eq!(out.borrow().as_slice(), &[id]);
}

// =========================================================================
// Shifting and queries
// =========================================================================

#[test]
fn test_shift_moves_everything() {
    let mut world = World::new();
    world.set_bounds(Some(Aabb::new(Vec2::new(-5.0, -5.0), Vec2::new(5.0, 5.0))));
    let id = world.add_body(disk(1.0, 0.5, 1.0, 2.0));
    let pin = planar_core::dynamics::Joint::pin(
        world.body(id).unwrap(),
        Vec2::new(1.0, 2.0),
        4.0,
        0.7,
        100.0,
    )
    .unwrap();
    let jid = world.add_joint(pin).unwrap();

    world.shift(Vec2::new(10.0, 0.0));

    assert_eq!(
        world.body(id).unwrap().transform().translation,
        Vec2::new(11.0, 2.0)
    );
    if let planar_core::dynamics::joint::JointKind::Pin(p) = world.joint(jid).unwrap().kind() {
        assert_eq!(p.target(), Vec2::new(11.0, 2.0));
    } else {
        panic!("expected a pin joint");
    }
    assert_eq!(world.bounds().unwrap().min, Vec2::new(5.0, -5.0));
}

#[test]
fn test_raycast_returns_closest_hit() {
    let mut world = World::new();
    let near = world.add_body(disk(1.0, 0.5, 3.0, 0.0));
    world.add_body(disk(1.0, 0.5, 8.0, 0.0));
    let ray = Ray::new(Vec2::ZERO, Vec2::X).unwrap();
    let (id, hit) = world.raycast(&ray, 100.0).unwrap();
    assert_eq!(id, near);
    assert!((hit.t - 2.5).abs() < 1e-9);
}

#[test]
fn test_query_aabb_filters_by_region() {
    let mut world = World::new();
    let inside = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    world.add_body(disk(1.0, 0.5, 50.0, 0.0));
    let found = world.query_aabb(&Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)));
    assert_eq!(found, vec![inside]);
}

// =========================================================================
// Continuous collision
// =========================================================================

fn bullet_scene(mode: ContinuousDetectionMode) -> (World, u32) {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    world.settings_mut().set_continuous_detection_mode(mode);
    world.add_body(ground(0.1, 10.0, 0.0, 0.0));
    let mut bullet = disk(0.1, 0.05, -0.7, 0.0);
    bullet.set_bullet(true);
    bullet.set_velocity(Vec2::new(60.0, 0.0));
    let id = world.add_body(bullet);
    (world, id)
}

#[test]
fn test_bullet_tunnels_without_ccd() {
    let (mut world, id) = bullet_scene(ContinuousDetectionMode::None);
    world.step(1).unwrap();
    assert!(
        world.body(id).unwrap().transform().translation.x > 0.2,
        "expected the bullet to pass through the wall"
    );
}

#[test]
fn test_bullet_stopped_by_ccd() {
    let (mut world, id) = bullet_scene(ContinuousDetectionMode::BulletsOnly);
    world.step(1).unwrap();
    let x = world.body(id).unwrap().transform().translation.x;
    assert!(x < 0.0, "bullet should stop at the wall, got x={x}");
}

#[test]
fn test_ccd_all_covers_non_bullets() {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    world.add_body(ground(0.1, 10.0, 0.0, 0.0));
    let mut fast = disk(0.1, 0.05, -0.7, 0.0);
    fast.set_velocity(Vec2::new(60.0, 0.0));
    let id = world.add_body(fast);
    world.step(1).unwrap();
    assert!(world.body(id).unwrap().transform().translation.x < 0.0);
}

// =========================================================================
// Determinism
// =========================================================================

fn stacked_scene() -> World {
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    for i in 0..3 {
        world.add_body(disk(1.0, 0.5, 0.05 * i as f64, 0.5 + 1.01 * i as f64));
    }
    world
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let mut w1 = stacked_scene();
    let mut w2 = stacked_scene();
    w1.step(90).unwrap();
    w2.step(90).unwrap();
    for (a, b) in w1.bodies().zip(w2.bodies()) {
        let ta = a.transform();
        let tb = b.transform();
        assert_eq!(ta.translation.x.to_bits(), tb.translation.x.to_bits());
        assert_eq!(ta.translation.y.to_bits(), tb.translation.y.to_bits());
        assert_eq!(ta.rotation.to_bits(), tb.rotation.to_bits());
        assert_eq!(a.velocity().x.to_bits(), b.velocity().x.to_bits());
    }
}
