//! Integration tests for the joint constraint formulations.

use approx::assert_relative_eq;
use planar_core::Error;
use planar_core::dynamics::joint::{Joint, JointKind, LimitState};
use planar_core::dynamics::{Body, Fixture, World};
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

fn static_disk(radius: f64, x: f64, y: f64) -> Body {
    init_logging();
    let mut body = Body::new();
    body.add_fixture(Fixture::new(Shape::circle(radius)));
    body.set_mass(MassType::Infinite);
    body.set_transform(Transform::new(Vec2::new(x, y), 0.0));
    body
}

fn quiet_world() -> World {
    let mut world = World::new();
    world.set_gravity(Vec2::ZERO);
    world.settings_mut().set_at_rest_detection_enabled(false);
    world
}

// =========================================================================
// Angle joint
// =========================================================================

#[test]
fn test_angle_joint_splits_velocity_evenly() {
    // S2 part 1: equal disks, ratio 1 -> both end at 15 deg/s.
    let mut world = quiet_world();
    let a = world.add_body(disk(1.0, 0.5, -2.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 2.0, 0.0));
    world
        .body_mut(b)
        .unwrap()
        .set_angular_velocity(30f64.to_radians());
    let joint = Joint::angle(world.body(a).unwrap(), world.body(b).unwrap()).unwrap();
    world.add_joint(joint).unwrap();

    world.step(1).unwrap();

    let w1 = world.body(a).unwrap().angular_velocity().to_degrees();
    let w2 = world.body(b).unwrap().angular_velocity().to_degrees();
    assert_relative_eq!(w1, 15.0, epsilon = 1e-6);
    assert_relative_eq!(w2, 15.0, epsilon = 1e-6);
}

#[test]
fn test_angle_joint_ratio_gears_velocities() {
    // S2 part 2: a further step with ratio 0.5 redistributes to 10/20 deg/s.
    let mut world = quiet_world();
    let a = world.add_body(disk(1.0, 0.5, -2.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 2.0, 0.0));
    world
        .body_mut(b)
        .unwrap()
        .set_angular_velocity(30f64.to_radians());
    let joint = Joint::angle(world.body(a).unwrap(), world.body(b).unwrap()).unwrap();
    let jid = world.add_joint(joint).unwrap();

    world.step(1).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Angle(angle) = j.kind_mut() {
            angle.set_ratio(0.5).unwrap();
        }
    });
    world.step(1).unwrap();

    let w1 = world.body(a).unwrap().angular_velocity().to_degrees();
    let w2 = world.body(b).unwrap().angular_velocity().to_degrees();
    assert!((w1 - 10.0).abs() < 1e-4, "w1={w1}");
    assert!((w2 - 20.0).abs() < 1e-4, "w2={w2}");
}

#[test]
fn test_angle_joint_limit_holds_relative_angle() {
    let mut world = quiet_world();
    let a = world.add_body(static_disk(0.5, -2.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 2.0, 0.0));
    world.body_mut(b).unwrap().set_angular_velocity(-2.0);
    let joint = Joint::angle(world.body(a).unwrap(), world.body(b).unwrap()).unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Angle(angle) = j.kind_mut() {
            angle.set_limits(-0.5, 0.5).unwrap();
            angle.set_limit_enabled(true);
        }
    });

    world.step(120).unwrap();

    // alpha = theta1 - theta2, so spinning body2 negative drives alpha up to
    // the upper limit.
    let theta2 = world.body(b).unwrap().transform().rotation;
    let alpha = -theta2;
    let tolerance = world.settings().angular_tolerance();
    assert!(alpha <= 0.5 + tolerance, "alpha={alpha}");
    assert!((world.body(b).unwrap().angular_velocity()).abs() < 1e-3);
}

#[test]
fn test_angle_joint_rejects_bad_arguments() {
    let mut world = quiet_world();
    let a = world.add_body(disk(1.0, 0.5, -2.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 2.0, 0.0));
    let joint = Joint::angle(world.body(a).unwrap(), world.body(b).unwrap()).unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Angle(angle) = j.kind_mut() {
            assert!(matches!(angle.set_ratio(0.0), Err(Error::InvalidArgument(_))));
            assert!(matches!(angle.set_limits(1.0, -1.0), Err(Error::InvalidArgument(_))));
        }
    });
}

#[test]
fn test_joint_rejects_same_body_twice() {
    let mut world = quiet_world();
    let a = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let body = world.body(a).unwrap();
    assert!(matches!(
        Joint::angle(body, body),
        Err(Error::InvalidArgument(_))
    ));
}

// =========================================================================
// Distance and rope joints
// =========================================================================

#[test]
fn test_distance_joint_position_solver_reaches_rest_distance() {
    // S3: infinite + unit mass disks 2 m apart, rest distance 10, max
    // correction 0.2 and 10 position iterations -> separation 10 after 4
    // steps with no velocity integration.
    let mut world = quiet_world();
    let a = world.add_body(static_disk(0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 0.0, 2.0));
    let joint = Joint::distance(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(0.0, 2.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Distance(d) = j.kind_mut() {
            d.set_rest_distance(10.0).unwrap();
        }
    });

    world.step(4).unwrap();

    let separation = world.body(b).unwrap().transform().translation.length();
    assert!((separation - 10.0).abs() < 1e-5, "separation={separation}");
}

#[test]
fn test_distance_joint_spring_skips_position_solver() {
    let mut world = quiet_world();
    let a = world.add_body(static_disk(0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 0.0, 2.0));
    let joint = Joint::distance(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(0.0, 2.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Distance(d) = j.kind_mut() {
            d.set_rest_distance(4.0).unwrap();
            d.set_frequency(2.0).unwrap();
            d.set_damping_ratio(0.1).unwrap();
        }
    });

    world.step(1).unwrap();

    // A rigid joint would have snapped 2 m of error at 0.2 m per position
    // iteration; the spring instead leaves the error to the velocity bias.
    let separation = world.body(b).unwrap().transform().translation.length();
    assert!(separation < 4.0 - 1.0, "separation={separation}");
    assert!(
        world.body(b).unwrap().velocity().y > 0.0,
        "spring should accelerate toward rest length"
    );
}

#[test]
fn test_rope_joint_upper_limit_caps_separation() {
    let mut world = quiet_world();
    let a = world.add_body(static_disk(0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 0.0, 2.0));
    let joint = Joint::rope(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(0.0, 2.0),
    )
    .unwrap();
    world.add_joint(joint).unwrap();
    world.body_mut(b).unwrap().set_velocity(Vec2::new(0.0, 5.0));

    world.step(60).unwrap();

    let separation = world.body(b).unwrap().transform().translation.length();
    let tolerance = world.settings().linear_tolerance();
    assert!(separation <= 2.0 + tolerance, "separation={separation}");
}

#[test]
fn test_rope_joint_slack_inside_limits() {
    let mut world = quiet_world();
    let a = world.add_body(static_disk(0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 0.0, 2.0));
    let joint = Joint::rope(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::ZERO,
        Vec2::new(0.0, 2.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Rope(rope) = j.kind_mut() {
            rope.set_limits(0.5, 4.0).unwrap();
        }
    });
    // Moving inward is unconstrained until the lower limit.
    world.body_mut(b).unwrap().set_velocity(Vec2::new(0.0, -1.0));
    world.step(10).unwrap();
    let vy = world.body(b).unwrap().velocity().y;
    assert!((vy + 1.0).abs() < 1e-9, "rope should be slack, vy={vy}");
}

// =========================================================================
// Pulley joint
// =========================================================================

#[test]
fn test_pulley_balances_equal_masses() {
    // S4 part 1: symmetric pulley holds both bodies stationary.
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let a = world.add_body(disk(1.0, 0.25, -1.0, 0.0));
    let b = world.add_body(disk(1.0, 0.25, 1.0, 0.0));
    let joint = Joint::pulley(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::new(-1.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 0.0),
        Vec2::new(1.0, 0.0),
    )
    .unwrap();
    world.add_joint(joint).unwrap();

    world.step(1).unwrap();

    assert!(world.body(a).unwrap().velocity().y.abs() < 1e-9);
    assert!(world.body(b).unwrap().velocity().y.abs() < 1e-9);
}

#[test]
fn test_pulley_ratio_tips_the_balance() {
    // S4 part 2: ratio 0.5 favours body1.
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let a = world.add_body(disk(1.0, 0.25, -1.0, 0.0));
    let b = world.add_body(disk(1.0, 0.25, 1.0, 0.0));
    let joint = Joint::pulley(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::new(-1.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 0.0),
        Vec2::new(1.0, 0.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Pulley(p) = j.kind_mut() {
            p.set_ratio(0.5).unwrap();
        }
    });

    world.step(1).unwrap();

    assert!(world.body(a).unwrap().velocity().y > 0.0);
    assert!(world.body(b).unwrap().velocity().y < 0.0);
}

// =========================================================================
// Revolute joint
// =========================================================================

#[test]
fn test_revolute_holds_anchor_under_gravity() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let pivot = world.add_body(static_disk(0.1, 0.0, 0.0));
    let bob = world.add_body(disk(1.0, 0.25, 1.0, 0.0));
    let joint = Joint::revolute(
        world.body(pivot).unwrap(),
        world.body(bob).unwrap(),
        Vec2::ZERO,
    )
    .unwrap();
    world.add_joint(joint).unwrap();

    world.step(120).unwrap();

    // The bob swings but stays on the 1 m circle around the pivot.
    let p = world.body(bob).unwrap().transform().translation;
    assert!((p.length() - 1.0).abs() < 0.02, "anchor drifted: {p:?}");
}

#[test]
fn test_revolute_motor_saturates_at_limit() {
    // S6: motor drives the arm until the +30 degree limit stops it.
    let mut world = quiet_world();
    let base = world.add_body(static_disk(0.1, 0.0, 2.0));
    let arm = world.add_body(disk(1.0, 0.5, 0.0, 2.0));
    let joint = Joint::revolute(
        world.body(base).unwrap(),
        world.body(arm).unwrap(),
        Vec2::new(0.0, 2.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Revolute(r) = j.kind_mut() {
            r.set_motor_enabled(true);
            r.set_motor_speed(20f64.to_radians());
            r.set_max_motor_torque(1000.0).unwrap();
            r.set_limits(-30f64.to_radians(), 30f64.to_radians()).unwrap();
            r.set_limit_enabled(true);
        }
    });

    world.step(100).unwrap();

    let arm_body = world.body(arm).unwrap();
    // alpha = theta1 - theta2 rises at the motor speed until the limit.
    let alpha = -arm_body.transform().rotation;
    let tolerance = world.settings().angular_tolerance();
    assert!(
        (alpha - 30f64.to_radians()).abs() <= tolerance,
        "alpha={} deg",
        alpha.to_degrees()
    );
    assert!(arm_body.angular_velocity().abs() < 1e-3);
    if let JointKind::Revolute(r) = world.joint(jid).unwrap().kind() {
        let max_impulse = 1000.0 * world.settings().step_frequency();
        assert!(
            (r.motor_impulse() - max_impulse).abs() < 1e-9,
            "motor impulse should be saturated"
        );
        assert_eq!(r.limit_state(), LimitState::AtUpper);
    }
}

#[test]
fn test_revolute_motor_with_two_fixed_rotations_fails_the_step() {
    let mut world = World::new();
    let mut a = disk(1.0, 0.5, 0.0, 0.0);
    a.set_mass_explicit(Mass::new(Vec2::ZERO, 1.0, 0.0));
    let mut b = disk(1.0, 0.5, 2.0, 0.0);
    b.set_mass_explicit(Mass::new(Vec2::ZERO, 1.0, 0.0));
    let a = world.add_body(a);
    let b = world.add_body(b);
    // An unrelated free-falling body to observe side effects.
    let bystander = world.add_body(disk(1.0, 0.5, 10.0, 0.0));
    let joint = Joint::revolute(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::new(1.0, 0.0),
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Revolute(r) = j.kind_mut() {
            r.set_motor_enabled(true);
            r.set_motor_speed(1.0);
            r.set_max_motor_torque(10.0).unwrap();
        }
    });

    assert!(matches!(world.step(1), Err(Error::InvalidState(_))));

    // The failed step must not have mutated any body: no gravity
    // integration, no motion, anywhere in the world.
    for (id, x) in [(a, 0.0), (b, 2.0), (bystander, 10.0)] {
        let body = world.body(id).unwrap();
        assert_eq!(body.transform().translation, Vec2::new(x, 0.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.angular_velocity(), 0.0);
    }
}

// =========================================================================
// Prismatic joint
// =========================================================================

#[test]
fn test_prismatic_blocks_perpendicular_motion() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let slider = world.add_body(disk(1.0, 0.25, 1.0, 0.0));
    let joint = Joint::prismatic(
        world.body(frame).unwrap(),
        world.body(slider).unwrap(),
        Vec2::new(1.0, 0.0),
        Vec2::X,
    )
    .unwrap();
    world.add_joint(joint).unwrap();

    world.step(60).unwrap();

    // Gravity is perpendicular to the axis and fully resisted.
    let p = world.body(slider).unwrap().transform().translation;
    assert!(p.y.abs() < 0.01, "slider sagged to y={}", p.y);

    // Motion along the axis is free.
    world
        .body_mut(slider)
        .unwrap()
        .set_velocity(Vec2::new(1.0, 0.0));
    world.step(30).unwrap();
    assert!(world.body(slider).unwrap().transform().translation.x > 1.3);
}

#[test]
fn test_prismatic_limits_clamp_translation() {
    let mut world = quiet_world();
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let slider = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::prismatic(
        world.body(frame).unwrap(),
        world.body(slider).unwrap(),
        Vec2::ZERO,
        Vec2::X,
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Prismatic(p) = j.kind_mut() {
            p.set_limits(-1.0, 1.0).unwrap();
            p.set_limit_enabled(true);
        }
    });
    world.body_mut(slider).unwrap().set_velocity(Vec2::new(3.0, 0.0));

    world.step(90).unwrap();

    let x = world.body(slider).unwrap().transform().translation.x;
    let tolerance = world.settings().linear_tolerance();
    assert!(x <= 1.0 + tolerance, "x={x}");
}

#[test]
fn test_prismatic_motor_drives_along_axis() {
    let mut world = quiet_world();
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let slider = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::prismatic(
        world.body(frame).unwrap(),
        world.body(slider).unwrap(),
        Vec2::ZERO,
        Vec2::X,
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Prismatic(p) = j.kind_mut() {
            p.set_motor_enabled(true);
            p.set_motor_speed(2.0);
            p.set_max_motor_force(500.0).unwrap();
        }
    });

    world.step(60).unwrap();

    let v = world.body(slider).unwrap().velocity();
    assert_relative_eq!(v.x, 2.0, epsilon = 1e-6);
    assert!(v.y.abs() < 1e-9);
}

// =========================================================================
// Wheel joint
// =========================================================================

#[test]
fn test_wheel_spring_carries_the_chassis_weight() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let wheel = world.add_body(disk(1.0, 0.25, 0.0, -1.0));
    let joint = Joint::wheel(
        world.body(frame).unwrap(),
        world.body(wheel).unwrap(),
        Vec2::new(0.0, -1.0),
        Vec2::Y,
    )
    .unwrap();
    world.add_joint(joint).unwrap();

    world.step(600).unwrap();

    // The suspension sags to the static droop and stays bounded.
    let y = world.body(wheel).unwrap().transform().translation.y;
    assert!(y < -1.0, "wheel should sag below the anchor");
    assert!(y > -1.1, "suspension collapsed to y={y}");
    assert!(world.body(wheel).unwrap().velocity().length() < 0.05);
}

#[test]
fn test_wheel_motor_spins_the_wheel() {
    let mut world = quiet_world();
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let wheel = world.add_body(disk(1.0, 0.25, 0.0, -1.0));
    let joint = Joint::wheel(
        world.body(frame).unwrap(),
        world.body(wheel).unwrap(),
        Vec2::new(0.0, -1.0),
        Vec2::Y,
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Wheel(w) = j.kind_mut() {
            w.set_motor_enabled(true);
            w.set_motor_speed(5.0);
            w.set_max_motor_torque(100.0).unwrap();
        }
    });

    world.step(60).unwrap();

    assert_relative_eq!(world.body(wheel).unwrap().angular_velocity(), 5.0, epsilon = 1e-6);
}

// =========================================================================
// Weld, friction, motor, pin joints
// =========================================================================

#[test]
fn test_weld_locks_relative_pose() {
    let mut world = quiet_world();
    let a = world.add_body(disk(1.0, 0.5, 0.0, 0.0));
    let b = world.add_body(disk(1.0, 0.5, 1.0, 0.0));
    let joint = Joint::weld(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::new(0.5, 0.0),
    )
    .unwrap();
    world.add_joint(joint).unwrap();
    world.body_mut(a).unwrap().apply_impulse_at(Vec2::new(0.0, 1.0), Vec2::ZERO);

    world.step(60).unwrap();

    let ta = world.body(a).unwrap().transform();
    let tb = world.body(b).unwrap().transform();
    let relative_angle = ta.rotation - tb.rotation;
    assert!(relative_angle.abs() < 0.01, "relative angle {relative_angle}");
    let gap = (tb.translation - ta.translation).length();
    assert!((gap - 1.0).abs() < 0.01, "bodies drifted apart: {gap}");
}

#[test]
fn test_friction_joint_brings_sliding_to_rest() {
    let mut world = quiet_world();
    let anchor = world.add_body(static_disk(0.1, 0.0, 0.0));
    let puck = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::friction(
        world.body(anchor).unwrap(),
        world.body(puck).unwrap(),
        Vec2::ZERO,
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Friction(f) = j.kind_mut() {
            f.set_max_force(2.0).unwrap();
            f.set_max_torque(1.0).unwrap();
        }
    });
    world.body_mut(puck).unwrap().set_velocity(Vec2::new(1.0, 0.0));
    world.body_mut(puck).unwrap().set_angular_velocity(3.0);

    world.step(120).unwrap();

    assert!(world.body(puck).unwrap().velocity().length() < 1e-6);
    assert!(world.body(puck).unwrap().angular_velocity().abs() < 1e-6);
}

#[test]
fn test_motor_joint_tracks_linear_target() {
    let mut world = quiet_world();
    let frame = world.add_body(static_disk(0.1, 0.0, 0.0));
    let follower = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::motor(world.body(frame).unwrap(), world.body(follower).unwrap()).unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Motor(m) = j.kind_mut() {
            m.set_linear_target(Vec2::new(1.0, 0.5));
            m.set_correction_factor(0.3).unwrap();
            m.set_max_force(50.0).unwrap();
            m.set_max_torque(50.0).unwrap();
        }
    });

    world.step(300).unwrap();

    let p = world.body(follower).unwrap().transform().translation;
    assert!((p - Vec2::new(1.0, 0.5)).length() < 0.01, "follower at {p:?}");
}

#[test]
fn test_pin_joint_drags_body_to_target() {
    let mut world = quiet_world();
    let id = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::pin(world.body(id).unwrap(), Vec2::ZERO, 4.0, 0.7, 100.0).unwrap();
    let jid = world.add_joint(joint).unwrap();
    world.with_joint_mut(jid, |j| {
        if let JointKind::Pin(p) = j.kind_mut() {
            p.set_target(Vec2::new(1.0, 0.0));
        }
    });

    world.step(300).unwrap();

    let p = world.body(id).unwrap().transform().translation;
    assert!((p - Vec2::new(1.0, 0.0)).length() < 0.05, "body at {p:?}");
}

#[test]
fn test_pin_joint_requires_positive_frequency() {
    let world_body = disk(1.0, 0.25, 0.0, 0.0);
    assert!(matches!(
        Joint::pin(&world_body, Vec2::ZERO, 0.0, 0.7, 100.0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        Joint::pin(&world_body, Vec2::ZERO, 4.0, 1.5, 100.0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        Joint::pin(&world_body, Vec2::ZERO, 4.0, 0.7, -1.0),
        Err(Error::InvalidArgument(_))
    ));
}

// =========================================================================
// Reaction accessors
// =========================================================================

#[test]
fn test_distance_joint_reports_reaction_force() {
    let mut world = World::new();
    world.settings_mut().set_at_rest_detection_enabled(false);
    let a = world.add_body(static_disk(0.5, 0.0, 2.0));
    let b = world.add_body(disk(1.0, 0.25, 0.0, 0.0));
    let joint = Joint::distance(
        world.body(a).unwrap(),
        world.body(b).unwrap(),
        Vec2::new(0.0, 2.0),
        Vec2::ZERO,
    )
    .unwrap();
    let jid = world.add_joint(joint).unwrap();

    world.step(120).unwrap();

    // Hanging at rest the rope tension balances gravity: |F| ~ m g.
    let inv_dt = 1.0 / world.settings().step_frequency();
    let force = world.joint(jid).unwrap().reaction_force(inv_dt);
    assert!((force.length() - 9.8).abs() < 0.5, "|F|={}", force.length());
}
