//! Integration tests for contact persistence, warm starting, the impulse
//! solver, and contact listeners.

use std::cell::RefCell;
use std::rc::Rc;

use planar_core::dynamics::listener::ContactListener;
use planar_core::dynamics::contact::ContactPointData;
use planar_core::dynamics::{Body, ContinuousDetectionMode, Fixture, World};
use planar_core::geometry::{Mass, MassType, Shape, Transform, Vec2};

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

fn box_body(mass: f64, w: f64, h: f64, x: f64, y: f64) -> Body {
    init_logging();
    let mut body = Body::new();
    body.add_fixture(Fixture::new(Shape::rectangle(w, h)));
    body.set_mass_explicit(Mass::new(Vec2::ZERO, mass, mass * (w * w + h * h) / 12.0));
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
// Penetration and solver behaviour
// =========================================================================

#[test]
fn test_resting_contact_stays_within_penetration_bound() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.5));

    world.step(120).unwrap();

    // Post-solve penetration bound: depth <= 3 * linear tolerance.
    let y = world.body(id).unwrap().transform().translation.y;
    let depth = 0.5 - y;
    assert!(
        depth <= 3.0 * world.settings().linear_tolerance() + 1e-9,
        "resting depth {depth}"
    );
}

#[test]
fn test_stack_settles_without_penetration() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let a = world.add_body(box_body(1.0, 1.0, 1.0, 0.0, 0.5));
    let b = world.add_body(box_body(1.0, 1.0, 1.0, 0.0, 1.5));

    world.step(240).unwrap();

    let ya = world.body(a).unwrap().transform().translation.y;
    let yb = world.body(b).unwrap().transform().translation.y;
    let bound = 3.0 * world.settings().linear_tolerance() + 1e-9;
    assert!(0.5 - ya <= bound, "lower box sunk to y={ya}");
    assert!((ya + 1.0) - yb <= bound, "upper box sunk to y={yb}");
}

#[test]
fn test_box_contact_has_two_points() {
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    world.add_body(box_body(1.0, 1.0, 1.0, 0.0, 0.49));

    world.step(1).unwrap();

    let contacts = world.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].contacts.len(), 2);
}

#[test]
fn test_warm_start_is_bit_stable_in_steady_state() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    world.add_body(disk(1.0, 0.5, 0.0, 0.5));

    world.step(300).unwrap();
    let before: Vec<u64> = world.contacts()[0]
        .contacts
        .iter()
        .map(|c| c.jn.to_bits())
        .collect();
    world.step(1).unwrap();
    let after: Vec<u64> = world.contacts()[0]
        .contacts
        .iter()
        .map(|c| c.jn.to_bits())
        .collect();

    assert_eq!(before, after, "steady-state impulses must repeat exactly");
}

#[test]
fn test_restitution_bounces_fast_impacts() {
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let mut ball = disk(1.0, 0.5, 0.0, 3.0);
    ball.fixture_mut(0).unwrap().set_restitution(0.8).unwrap();
    let id = world.add_body(ball);

    // Fall for a while, then find the bounce.
    let mut bounced = false;
    for _ in 0..240 {
        world.step(1).unwrap();
        if world.body(id).unwrap().velocity().y > 1.0 {
            bounced = true;
            break;
        }
    }
    assert!(bounced, "ball with restitution 0.8 should bounce back up");
}

#[test]
fn test_slow_impacts_do_not_bounce() {
    // Below the restitution velocity threshold the bias is zero.
    let mut world = World::new();
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let mut ball = disk(1.0, 0.5, 0.0, 0.52);
    ball.fixture_mut(0).unwrap().set_restitution(1.0).unwrap();
    let id = world.add_body(ball);

    world.step(60).unwrap();

    assert!(world.body(id).unwrap().velocity().y < 0.05);
}

#[test]
fn test_friction_slows_a_sliding_box() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let mut floor = ground(40.0, 1.0, 0.0, -0.5);
    floor.fixture_mut(0).unwrap().set_friction(0.8).unwrap();
    world.add_body(floor);
    let mut slider = box_body(1.0, 1.0, 1.0, -10.0, 0.49);
    slider.fixture_mut(0).unwrap().set_friction(0.8).unwrap();
    slider.set_velocity(Vec2::new(5.0, 0.0));
    let id = world.add_body(slider);

    world.step(180).unwrap();

    let vx = world.body(id).unwrap().velocity().x;
    assert!(vx < 0.2, "friction should dissipate the slide, vx={vx}");
}

#[test]
fn test_frictionless_surface_preserves_slide() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let mut floor = ground(200.0, 1.0, 0.0, -0.5);
    floor.fixture_mut(0).unwrap().set_friction(0.0).unwrap();
    world.add_body(floor);
    let mut slider = box_body(1.0, 1.0, 1.0, -10.0, 0.49);
    slider.fixture_mut(0).unwrap().set_friction(0.0).unwrap();
    slider.set_velocity(Vec2::new(5.0, 0.0));
    let id = world.add_body(slider);

    world.step(60).unwrap();

    let vx = world.body(id).unwrap().velocity().x;
    assert!((vx - 5.0).abs() < 1e-6, "vx={vx}");
}

// =========================================================================
// Contact events
// =========================================================================

#[derive(Default)]
struct EventLog {
    begins: usize,
    persists: usize,
    ends: usize,
    sensed: usize,
}

struct Recorder {
    log: Rc<RefCell<EventLog>>,
    allow: bool,
}

impl ContactListener for Recorder {
    fn begin(&mut self, _point: &ContactPointData) -> bool {
        self.log.borrow_mut().begins += 1;
        self.allow
    }
    fn persist(&mut self, _point: &ContactPointData) -> bool {
        self.log.borrow_mut().persists += 1;
        self.allow
    }
    fn end(&mut self, _point: &ContactPointData) {
        self.log.borrow_mut().ends += 1;
    }
    fn sensed(&mut self, _point: &ContactPointData) {
        self.log.borrow_mut().sensed += 1;
    }
}

#[test]
fn test_contact_lifecycle_events() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let log = Rc::new(RefCell::new(EventLog::default()));
    world.add_contact_listener(Box::new(Recorder { log: log.clone(), allow: true }));
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.6));

    world.step(30).unwrap();
    assert!(log.borrow().begins >= 1, "no begin event fired");
    assert!(log.borrow().persists > 0, "no persist events fired");
    assert_eq!(log.borrow().ends, 0);

    // Fling the body clear of the ground; the contact ends.
    world
        .body_mut(id)
        .unwrap()
        .set_transform(Transform::new(Vec2::new(0.0, 10.0), 0.0));
    world.body_mut(id).unwrap().set_velocity(Vec2::new(0.0, 10.0));
    world.step(2).unwrap();
    assert!(log.borrow().ends >= 1, "no end event fired");
}

#[test]
fn test_listener_veto_suppresses_collision_response() {
    let mut world = World::new();
    // The veto applies to the discrete solver; keep the continuous substep
    // out of the way.
    world
        .settings_mut()
        .set_continuous_detection_mode(ContinuousDetectionMode::None);
    let log = Rc::new(RefCell::new(EventLog::default()));
    world.add_contact_listener(Box::new(Recorder { log, allow: false }));
    world.add_body(ground(20.0, 1.0, 0.0, -0.5));
    let id = world.add_body(disk(1.0, 0.5, 0.0, 1.0));

    world.step(120).unwrap();

    // With every contact vetoed the disk falls straight through.
    assert!(
        world.body(id).unwrap().transform().translation.y < -2.0,
        "vetoed contact should not resolve"
    );
}

#[test]
fn test_sensor_detects_but_does_not_collide() {
    let mut world = World::new();
    let log = Rc::new(RefCell::new(EventLog::default()));
    world.add_contact_listener(Box::new(Recorder { log: log.clone(), allow: true }));
    let mut pad = ground(2.0, 2.0, 0.0, -2.0);
    pad.fixture_mut(0).unwrap().sensor = true;
    world.add_body(pad);
    let id = world.add_body(disk(1.0, 0.5, 0.0, 0.0));

    world.step(120).unwrap();

    assert!(log.borrow().sensed > 0, "sensor overlap not reported");
    // The body passed through the sensor unimpeded.
    assert!(world.body(id).unwrap().transform().translation.y < -3.0);
}

#[test]
fn test_filters_prevent_contact() {
    let mut world = World::new();
    let mut floor = ground(20.0, 1.0, 0.0, -0.5);
    floor.fixture_mut(0).unwrap().filter = planar_core::dynamics::Filter {
        category: 0x0001,
        mask: 0x0001,
    };
    world.add_body(floor);
    let mut ball = disk(1.0, 0.5, 0.0, 1.0);
    ball.fixture_mut(0).unwrap().filter = planar_core::dynamics::Filter {
        category: 0x0002,
        mask: 0x0002,
    };
    let id = world.add_body(ball);

    world.step(120).unwrap();

    assert!(world.body(id).unwrap().transform().translation.y < -2.0);
}

// =========================================================================
// Joint collision flag
// =========================================================================

#[test]
fn test_joined_bodies_do_not_collide_by_default() {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    world.settings_mut().set_at_rest_detection_enabled(false);
    let a = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 0.8, 0.0));
    // Overlapping disks joined by a distance joint: no contact unless the
    // joint allows collision.
    let joint = planar_core::dynamics::Joint::distance(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(0.8, 0.0),
    )
    .unwrap();
    world.add_joint(joint).unwrap();

    world.step(1).unwrap();
    assert!(world.contacts().is_empty());
}
