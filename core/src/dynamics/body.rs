use crate::error::Error;
use crate::geometry::{Aabb, Mass, MassData, MassType, Shape, Transform, Vec2, cross, cross_sv};

use super::force::{Force, Torque};
use super::settings::Settings;
use super::timestep::TimeStep;

pub type BodyId = u32;

/// Category/mask collision filter. Two fixtures collide when each one's
/// category intersects the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub category: u16,
    pub mask: u16,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category: 0xFFFF,
            mask: 0xFFFF,
        }
    }
}

impl Filter {
    pub fn allows(&self, other: &Filter) -> bool {
        (self.category & other.mask) != 0 && (other.category & self.mask) != 0
    }
}

/// A shape attached to a body with its material properties.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub shape: Shape,
    density: f64,
    friction: f64,
    restitution: f64,
    restitution_velocity: f64,
    pub sensor: bool,
    pub filter: Filter,
}

impl Fixture {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            restitution_velocity: 1.0,
            sensor: false,
            filter: Filter::default(),
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn set_density(&mut self, density: f64) -> Result<(), Error> {
        if density <= 0.0 {
            return Err(Error::InvalidArgument("fixture density must be positive"));
        }
        self.density = density;
        Ok(())
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&friction) {
            return Err(Error::InvalidArgument("fixture friction must be in [0, 1]"));
        }
        self.friction = friction;
        Ok(())
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&restitution) {
            return Err(Error::InvalidArgument("fixture restitution must be in [0, 1]"));
        }
        self.restitution = restitution;
        Ok(())
    }

    pub fn restitution_velocity(&self) -> f64 {
        self.restitution_velocity
    }

    pub fn set_restitution_velocity(&mut self, velocity: f64) -> Result<(), Error> {
        if velocity < 0.0 {
            return Err(Error::InvalidArgument(
                "fixture restitution velocity must be non-negative",
            ));
        }
        self.restitution_velocity = velocity;
        Ok(())
    }
}

/// A rigid 2D body: transform, velocities, accumulators, mass state, and an
/// ordered list of fixtures. Bodies live in the world's slot arena and are
/// referenced everywhere by `BodyId`.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) id: BodyId,
    transform: Transform,
    /// Pose before the last position integration; the start of the CCD sweep.
    transform0: Transform,
    pub(crate) velocity: Vec2,
    pub(crate) angular_velocity: f64,
    pub(crate) force: Vec2,
    pub(crate) torque: f64,
    pending_forces: Vec<(Force, f64)>,
    pending_torques: Vec<(Torque, f64)>,
    linear_damping: f64,
    angular_damping: f64,
    gravity_scale: f64,
    mass: Mass,
    explicit_mass: bool,
    fixtures: Vec<Fixture>,
    enabled: bool,
    bullet: bool,
    at_rest: bool,
    at_rest_detection_enabled: bool,
    /// Seconds below the at-rest thresholds; -1 for non-dynamic bodies.
    pub(crate) at_rest_time: f64,
    pub user_data: u64,
}

impl Body {
    pub fn new() -> Self {
        Self {
            id: 0,
            transform: Transform::IDENTITY,
            transform0: Transform::IDENTITY,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            pending_forces: Vec::new(),
            pending_torques: Vec::new(),
            linear_damping: 0.0,
            angular_damping: 0.01,
            gravity_scale: 1.0,
            mass: Mass::infinite(),
            explicit_mass: false,
            fixtures: Vec::new(),
            enabled: true,
            bullet: false,
            at_rest: false,
            at_rest_detection_enabled: true,
            at_rest_time: -1.0,
            user_data: 0,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    // ----- fixtures and mass -------------------------------------------------

    /// Appends a fixture and returns its index. Mass is not recomputed until
    /// `set_mass` or `update_mass` is called.
    pub fn add_fixture(&mut self, fixture: Fixture) -> usize {
        self.fixtures.push(fixture);
        self.fixtures.len() - 1
    }

    /// Removes the fixture at `index`; returns false for an unknown index.
    pub fn remove_fixture(&mut self, index: usize) -> bool {
        if index >= self.fixtures.len() {
            return false;
        }
        self.fixtures.remove(index);
        true
    }

    pub fn fixture(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    pub fn fixture_mut(&mut self, index: usize) -> Option<&mut Fixture> {
        self.fixtures.get_mut(index)
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Computes mass from the fixtures' shapes and densities, classified
    /// under the given type.
    pub fn set_mass(&mut self, mass_type: MassType) {
        let parts: Vec<MassData> = self
            .fixtures
            .iter()
            .map(|f| f.shape.mass_data(f.density))
            .collect();
        self.mass = if parts.is_empty() {
            Mass::infinite()
        } else {
            Mass::combine(&parts).with_type(mass_type)
        };
        self.explicit_mass = false;
        self.at_rest_time = if self.is_dynamic() { 0.0 } else { -1.0 };
    }

    /// Overrides the computed mass with an explicit one.
    pub fn set_mass_explicit(&mut self, mass: Mass) {
        self.mass = mass;
        self.explicit_mass = true;
        self.at_rest_time = if self.is_dynamic() { 0.0 } else { -1.0 };
    }

    /// Recomputes mass from fixtures unless an explicit mass was set.
    pub fn update_mass(&mut self) {
        if !self.explicit_mass {
            self.set_mass(self.mass.mass_type);
        }
    }

    pub fn mass(&self) -> &Mass {
        &self.mass
    }

    #[inline]
    pub(crate) fn inv_mass(&self) -> f64 {
        self.mass.inv_mass
    }

    #[inline]
    pub(crate) fn inv_inertia(&self) -> f64 {
        self.mass.inv_inertia
    }

    /// Dynamic means "responds to at least one impulse component": every
    /// mass type except `Infinite`.
    pub fn is_dynamic(&self) -> bool {
        self.mass.mass_type != MassType::Infinite
    }

    pub fn is_static(&self) -> bool {
        self.mass.mass_type == MassType::Infinite
    }

    // ----- transform and velocity --------------------------------------------

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.transform0 = transform;
    }

    /// Pose at the start of the current step, before position integration.
    pub fn initial_transform(&self) -> &Transform {
        &self.transform0
    }

    pub fn world_center(&self) -> Vec2 {
        self.transform.apply(self.mass.center)
    }

    pub fn local_center(&self) -> Vec2 {
        self.mass.center
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.set_at_rest(false);
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f64) {
        self.angular_velocity = angular_velocity;
        self.set_at_rest(false);
    }

    /// Velocity of a world-space point rigidly attached to this body.
    pub fn velocity_at(&self, world_point: Vec2) -> Vec2 {
        self.velocity + cross_sv(self.angular_velocity, world_point - self.world_center())
    }

    pub(crate) fn translate(&mut self, v: Vec2) {
        self.transform.translation += v;
    }

    pub(crate) fn rotate_about_center(&mut self, angle: f64) {
        let center = self.world_center();
        let d = self.transform.translation - center;
        let (sin, cos) = angle.sin_cos();
        self.transform.translation = center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
        self.transform.rotation += angle;
    }

    pub(crate) fn shift(&mut self, v: Vec2) {
        self.transform.shift(v);
        self.transform0.shift(v);
    }

    /// Pull the body back along its step motion to the normalized time `t`,
    /// used when a time of impact interrupts the step.
    pub(crate) fn advance_to(&mut self, t: f64) {
        self.transform = self.transform0.lerp(&self.transform, t);
    }

    // ----- forces and impulses -----------------------------------------------

    pub fn apply_force(&mut self, force: Force) {
        self.pending_forces.push((force, 0.0));
        self.set_at_rest(false);
    }

    pub fn apply_torque(&mut self, torque: Torque) {
        self.pending_torques.push((torque, 0.0));
        self.set_at_rest(false);
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.mass.inv_mass;
        self.set_at_rest(false);
    }

    pub fn apply_impulse_at(&mut self, impulse: Vec2, world_point: Vec2) {
        self.velocity += impulse * self.mass.inv_mass;
        self.angular_velocity +=
            self.mass.inv_inertia * cross(world_point - self.world_center(), impulse);
        self.set_at_rest(false);
    }

    pub fn apply_angular_impulse(&mut self, impulse: f64) {
        self.angular_velocity += self.mass.inv_inertia * impulse;
        self.set_at_rest(false);
    }

    /// Fold pending forces/torques into the accumulators and retire the
    /// completed ones.
    pub(crate) fn accumulate(&mut self, dt: f64) {
        for (force, age) in &mut self.pending_forces {
            self.force += force.vector;
            if let Some(point) = force.point {
                self.torque += cross(point - self.transform.apply(self.mass.center), force.vector);
            }
            *age += dt;
        }
        self.pending_forces.retain(|(force, age)| !force.is_complete(*age));
        for (torque, age) in &mut self.pending_torques {
            self.torque += torque.torque;
            *age += dt;
        }
        self.pending_torques.retain(|(torque, age)| !torque.is_complete(*age));
    }

    pub(crate) fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    // ----- damping, gravity scale, flags -------------------------------------

    pub fn linear_damping(&self) -> f64 {
        self.linear_damping
    }

    pub fn set_linear_damping(&mut self, damping: f64) -> Result<(), Error> {
        if damping < 0.0 {
            return Err(Error::InvalidArgument("linear damping must be non-negative"));
        }
        self.linear_damping = damping;
        Ok(())
    }

    pub fn angular_damping(&self) -> f64 {
        self.angular_damping
    }

    pub fn set_angular_damping(&mut self, damping: f64) -> Result<(), Error> {
        if damping < 0.0 {
            return Err(Error::InvalidArgument("angular damping must be non-negative"));
        }
        self.angular_damping = damping;
        Ok(())
    }

    pub fn gravity_scale(&self) -> f64 {
        self.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f64) {
        self.gravity_scale = scale;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_bullet(&self) -> bool {
        self.bullet
    }

    pub fn set_bullet(&mut self, bullet: bool) {
        self.bullet = bullet;
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Sleeping zeroes all motion state; waking resets the dwell timer.
    pub fn set_at_rest(&mut self, at_rest: bool) {
        if at_rest {
            self.at_rest = true;
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.force = Vec2::ZERO;
            self.torque = 0.0;
            self.pending_forces.clear();
            self.pending_torques.clear();
        } else {
            self.at_rest = false;
            if self.is_dynamic() {
                self.at_rest_time = 0.0;
            }
        }
    }

    pub fn is_at_rest_detection_enabled(&self) -> bool {
        self.at_rest_detection_enabled
    }

    pub fn set_at_rest_detection_enabled(&mut self, enabled: bool) {
        self.at_rest_detection_enabled = enabled;
        if !enabled {
            self.set_at_rest(false);
        }
    }

    // ----- integration -------------------------------------------------------

    /// Semi-implicit Euler velocity update with damping. Gravity only acts on
    /// components with finite mass; an infinite component's velocity is
    /// user-owned.
    pub(crate) fn integrate_velocity(&mut self, gravity: Vec2, step: &TimeStep, _settings: &Settings) {
        if self.is_static() || self.at_rest {
            return;
        }
        let dt = step.dt;
        let mass_type = self.mass.mass_type;
        if mass_type == MassType::Normal || mass_type == MassType::FixedAngularVelocity {
            self.velocity +=
                (gravity * self.gravity_scale + self.force * self.mass.inv_mass) * dt;
        }
        if mass_type == MassType::Normal || mass_type == MassType::FixedLinearVelocity {
            self.angular_velocity += self.torque * self.mass.inv_inertia * dt;
        }
        self.velocity *= 1.0 / (1.0 + dt * self.linear_damping);
        self.angular_velocity *= 1.0 / (1.0 + dt * self.angular_damping);
    }

    /// Position update with per-step translation/rotation clamps. Velocities
    /// are left untouched; only the position delta is clipped.
    pub(crate) fn integrate_position(&mut self, step: &TimeStep, settings: &Settings) {
        self.transform0 = self.transform;
        if self.is_static() || self.at_rest {
            return;
        }
        let dt = step.dt;

        let mut translation = self.velocity * dt;
        let max_translation = settings.max_translation();
        if translation.length_squared() > max_translation * max_translation {
            translation = translation.normalize() * max_translation;
        }

        let rotation = (self.angular_velocity * dt)
            .clamp(-settings.max_rotation(), settings.max_rotation());

        self.transform.translation += translation;
        self.rotate_about_center(rotation);
    }

    /// Advance or reset the at-rest dwell timer; returns the updated value.
    pub(crate) fn update_at_rest_time(&mut self, step: &TimeStep, settings: &Settings) -> f64 {
        if !self.is_dynamic() {
            return self.at_rest_time;
        }
        let linear = settings.at_rest_linear_velocity();
        let angular = settings.at_rest_angular_velocity();
        if self.velocity.length_squared() > linear * linear
            || self.angular_velocity * self.angular_velocity > angular * angular
        {
            self.at_rest_time = 0.0;
        } else {
            self.at_rest_time += step.dt;
        }
        self.at_rest_time
    }

    /// Union AABB of all fixtures at the current transform.
    pub fn aabb(&self) -> Option<Aabb> {
        let mut result: Option<Aabb> = None;
        for fixture in &self.fixtures {
            let fa = fixture.shape.aabb(&self.transform);
            result = Some(match result {
                Some(acc) => acc.union(&fa),
                None => fa,
            });
        }
        result
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

/// Distinct mutable references to two bodies in the arena.
pub(crate) fn body_pair_mut(
    bodies: &mut [Option<Body>],
    id1: BodyId,
    id2: BodyId,
) -> (&mut Body, &mut Body) {
    let (i1, i2) = (id1 as usize, id2 as usize);
    debug_assert!(i1 != i2);
    if i1 < i2 {
        let (lo, hi) = bodies.split_at_mut(i2);
        (lo[i1].as_mut().unwrap(), hi[0].as_mut().unwrap())
    } else {
        let (lo, hi) = bodies.split_at_mut(i1);
        (hi[0].as_mut().unwrap(), lo[i2].as_mut().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_disk() -> Body {
        let mut body = Body::new();
        body.add_fixture(Fixture::new(Shape::circle(0.5)));
        body.set_mass(MassType::Normal);
        body
    }

    #[test]
    fn static_body_ignores_gravity() {
        let mut body = Body::new();
        body.add_fixture(Fixture::new(Shape::circle(1.0)));
        body.set_mass(MassType::Infinite);
        let step = TimeStep::new(1.0 / 60.0);
        body.integrate_velocity(Vec2::new(0.0, -9.8), &step, &Settings::default());
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn fixed_linear_velocity_resists_gravity_but_spins() {
        let mut body = dynamic_disk();
        body.set_mass(MassType::FixedLinearVelocity);
        body.apply_torque(Torque::new(1.0));
        let step = TimeStep::new(1.0 / 60.0);
        body.accumulate(step.dt);
        body.integrate_velocity(Vec2::new(0.0, -9.8), &step, &Settings::default());
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert!(body.angular_velocity() > 0.0);
    }

    #[test]
    fn translation_clamp_limits_step_motion() {
        let mut body = dynamic_disk();
        body.set_linear_damping(0.0).unwrap();
        body.set_velocity(Vec2::new(100000.0, 0.0));
        let step = TimeStep::new(1.0 / 60.0);
        let settings = Settings::default();
        body.integrate_position(&step, &settings);
        assert!((body.transform().translation.x - settings.max_translation()).abs() < 1e-12);
        // Velocity is preserved for the dynamics record.
        assert_eq!(body.velocity().x, 100000.0);
    }

    #[test]
    fn sleep_clears_motion_state() {
        let mut body = dynamic_disk();
        body.set_velocity(Vec2::new(1.0, 2.0));
        body.apply_force(Force::new(Vec2::X));
        body.set_at_rest(true);
        assert!(body.is_at_rest());
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.angular_velocity(), 0.0);
        body.set_at_rest(false);
        assert_eq!(body.at_rest_time, 0.0);
    }

    #[test]
    fn one_shot_force_lasts_one_accumulation() {
        let mut body = dynamic_disk();
        body.apply_force(Force::new(Vec2::new(6.0, 0.0)));
        body.accumulate(1.0 / 60.0);
        let first = body.force;
        body.clear_accumulators();
        body.accumulate(1.0 / 60.0);
        assert!(first.x > 0.0);
        assert_eq!(body.force, Vec2::ZERO);
    }

    #[test]
    fn timed_force_persists_across_steps() {
        let mut body = dynamic_disk();
        body.apply_force(Force::new(Vec2::new(6.0, 0.0)).with_duration(0.1));
        for _ in 0..5 {
            body.accumulate(1.0 / 60.0);
            body.clear_accumulators();
        }
        body.accumulate(1.0 / 60.0);
        assert_eq!(body.force, Vec2::ZERO, "force expired after its duration");
    }

    #[test]
    fn rotate_about_center_keeps_center_fixed() {
        let mut body = dynamic_disk();
        body.set_transform(Transform::new(Vec2::new(3.0, 4.0), 0.0));
        let before = body.world_center();
        body.rotate_about_center(1.0);
        assert!((body.world_center() - before).length() < 1e-12);
        assert!((body.transform().rotation - 1.0).abs() < 1e-12);
    }
}
