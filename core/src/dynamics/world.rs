//! The world owns bodies, joints, the contact manager, the collision
//! collaborators, and the listener lists, and advances the simulation in
//! fixed steps.

use std::collections::HashSet;
use std::mem;

use log::{debug, trace};

use crate::collision::{
    BroadphaseDetector, ClippingManifoldSolver, ConservativeAdvancement, DefaultValueMixer,
    ManifoldSolver, NarrowphaseDetector, Sat, SpatialHash, TimeOfImpactDetector, ValueMixer,
};
use crate::error::Error;
use crate::geometry::{Aabb, Ray, RaycastHit, Vec2, ray::raycast as shape_raycast};

use super::body::{Body, BodyId};
use super::ccd::{self, CcdContext};
use super::contact::constraint::{ContactConstraint, ContactKey};
use super::contact::manager::{ContactEvent, ContactManager, ContactPointData};
use super::island::Island;
use super::joint::{Joint, JointId};
use super::listener::{
    BoundsListener, ContactListener, DestructionListener, RaycastListener, SolvedContactPoint,
    StepListener, TimeOfImpactListener,
};
use super::settings::Settings;
use super::timestep::TimeStep;

pub struct World {
    bodies: Vec<Option<Body>>,
    free_body_ids: Vec<BodyId>,
    joints: Vec<Joint>,
    next_joint_id: JointId,
    gravity: Vec2,
    settings: Settings,
    bounds: Option<Aabb>,
    step: TimeStep,
    accumulator: f64,
    contact_manager: ContactManager,
    broadphase: Box<dyn BroadphaseDetector>,
    narrowphase: Box<dyn NarrowphaseDetector>,
    manifold_solver: Box<dyn ManifoldSolver>,
    toi_detector: Box<dyn TimeOfImpactDetector>,
    mixer: Box<dyn ValueMixer>,
    step_listeners: Vec<Box<dyn StepListener>>,
    contact_listeners: Vec<Box<dyn ContactListener>>,
    destruction_listeners: Vec<Box<dyn DestructionListener>>,
    bounds_listeners: Vec<Box<dyn BoundsListener>>,
    raycast_listeners: Vec<Box<dyn RaycastListener>>,
    toi_listeners: Vec<Box<dyn TimeOfImpactListener>>,
}

impl World {
    /// A world with earth gravity and the default collaborators.
    pub fn new() -> Self {
        let settings = Settings::default();
        let step = TimeStep::new(settings.step_frequency());
        Self {
            bodies: Vec::new(),
            free_body_ids: Vec::new(),
            joints: Vec::new(),
            next_joint_id: 0,
            gravity: Vec2::new(0.0, -9.8),
            settings,
            bounds: None,
            step,
            accumulator: 0.0,
            contact_manager: ContactManager::new(),
            broadphase: Box::new(SpatialHash::default()),
            narrowphase: Box::new(Sat),
            manifold_solver: Box::new(ClippingManifoldSolver),
            toi_detector: Box::new(ConservativeAdvancement::default()),
            mixer: Box::new(DefaultValueMixer),
            step_listeners: Vec::new(),
            contact_listeners: Vec::new(),
            destruction_listeners: Vec::new(),
            bounds_listeners: Vec::new(),
            raycast_listeners: Vec::new(),
            toi_listeners: Vec::new(),
        }
    }

    // ----- bodies ------------------------------------------------------------

    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = match self.free_body_ids.pop() {
            Some(recycled) => recycled,
            None => self.bodies.len() as BodyId,
        };
        body.id = id;
        let index = id as usize;
        if index >= self.bodies.len() {
            self.bodies.resize_with(index + 1, || None);
        }
        self.bodies[index] = Some(body);
        id
    }

    /// Removes a body, its joints, and its cached contacts. Returns false
    /// for an unknown id, with no state mutated.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let index = id as usize;
        if index >= self.bodies.len() || self.bodies[index].is_none() {
            return false;
        }

        // Joints attached to the body go with it.
        let mut removed_joints = Vec::new();
        self.joints.retain(|j| {
            if j.body1 == id || j.body2 == id {
                removed_joints.push(j.clone());
                false
            } else {
                true
            }
        });
        let removed_contacts = self.contact_manager.remove_body(id);
        self.broadphase.remove(id);
        let body = self.bodies[index].take().unwrap();
        self.free_body_ids.push(id);

        let mut listeners = mem::take(&mut self.destruction_listeners);
        for listener in listeners.iter_mut() {
            for joint in &removed_joints {
                listener.joint_destroyed(joint);
            }
            for constraint in &removed_contacts {
                for contact in &constraint.contacts {
                    listener.contact_destroyed(&ContactPointData {
                        key: constraint.key,
                        point: contact.point,
                        normal: constraint.normal,
                        depth: contact.depth,
                    });
                }
            }
            listener.body_destroyed(&body);
        }
        self.destruction_listeners = listeners;
        true
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id as usize)?.as_ref()
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id as usize)?.as_mut()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().flatten()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    // ----- joints ------------------------------------------------------------

    /// Adds a joint; both referenced bodies must already be in this world.
    /// The bodies are woken.
    pub fn add_joint(&mut self, mut joint: Joint) -> Result<JointId, Error> {
        if self.body(joint.body1).is_none() || self.body(joint.body2).is_none() {
            return Err(Error::InvalidArgument(
                "joint references a body not in this world",
            ));
        }
        let id = self.next_joint_id;
        self.next_joint_id += 1;
        joint.id = id;
        self.wake_pair(joint.body1, joint.body2);
        self.joints.push(joint);
        Ok(id)
    }

    /// Removes a joint; returns false for an unknown id.
    pub fn remove_joint(&mut self, id: JointId) -> bool {
        let Some(index) = self.joints.iter().position(|j| j.id == id) else {
            return false;
        };
        let joint = self.joints.remove(index);
        self.wake_pair(joint.body1, joint.body2);
        let mut listeners = mem::take(&mut self.destruction_listeners);
        for listener in listeners.iter_mut() {
            listener.joint_destroyed(&joint);
        }
        self.destruction_listeners = listeners;
        true
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id == id)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }

    /// Mutate a joint and wake its bodies: changing limits, motors, targets
    /// or springs must bring a sleeping pair back into the solve.
    pub fn with_joint_mut<R>(&mut self, id: JointId, f: impl FnOnce(&mut Joint) -> R) -> Option<R> {
        let index = self.joints.iter().position(|j| j.id == id)?;
        let result = f(&mut self.joints[index]);
        let (b1, b2) = (self.joints[index].body1, self.joints[index].body2);
        self.wake_pair(b1, b2);
        Some(result)
    }

    fn wake_pair(&mut self, b1: BodyId, b2: BodyId) {
        if let Some(body) = self.body_mut(b1) {
            body.set_at_rest(false);
        }
        if b2 != b1 {
            if let Some(body) = self.body_mut(b2) {
                body.set_at_rest(false);
            }
        }
    }

    // ----- configuration -----------------------------------------------------

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn set_bounds(&mut self, bounds: Option<Aabb>) {
        self.bounds = bounds;
    }

    pub fn set_broadphase(&mut self, broadphase: Box<dyn BroadphaseDetector>) {
        self.broadphase = broadphase;
    }

    pub fn set_narrowphase(&mut self, narrowphase: Box<dyn NarrowphaseDetector>) {
        self.narrowphase = narrowphase;
    }

    pub fn set_manifold_solver(&mut self, solver: Box<dyn ManifoldSolver>) {
        self.manifold_solver = solver;
    }

    pub fn set_toi_detector(&mut self, detector: Box<dyn TimeOfImpactDetector>) {
        self.toi_detector = detector;
    }

    pub fn set_value_mixer(&mut self, mixer: Box<dyn ValueMixer>) {
        self.mixer = mixer;
    }

    // ----- listeners ---------------------------------------------------------

    pub fn add_step_listener(&mut self, listener: Box<dyn StepListener>) -> usize {
        self.step_listeners.push(listener);
        self.step_listeners.len() - 1
    }

    pub fn remove_step_listener(&mut self, index: usize) -> bool {
        if index < self.step_listeners.len() {
            self.step_listeners.remove(index);
            true
        } else {
            false
        }
    }

    pub fn add_contact_listener(&mut self, listener: Box<dyn ContactListener>) -> usize {
        self.contact_listeners.push(listener);
        self.contact_listeners.len() - 1
    }

    pub fn remove_contact_listener(&mut self, index: usize) -> bool {
        if index < self.contact_listeners.len() {
            self.contact_listeners.remove(index);
            true
        } else {
            false
        }
    }

    pub fn add_destruction_listener(&mut self, listener: Box<dyn DestructionListener>) -> usize {
        self.destruction_listeners.push(listener);
        self.destruction_listeners.len() - 1
    }

    pub fn add_bounds_listener(&mut self, listener: Box<dyn BoundsListener>) -> usize {
        self.bounds_listeners.push(listener);
        self.bounds_listeners.len() - 1
    }

    pub fn add_raycast_listener(&mut self, listener: Box<dyn RaycastListener>) -> usize {
        self.raycast_listeners.push(listener);
        self.raycast_listeners.len() - 1
    }

    pub fn add_toi_listener(&mut self, listener: Box<dyn TimeOfImpactListener>) -> usize {
        self.toi_listeners.push(listener);
        self.toi_listeners.len() - 1
    }

    // ----- queries -----------------------------------------------------------

    /// Closest raycast hit over all enabled bodies, filtered through the
    /// raycast listeners.
    pub fn raycast(&mut self, ray: &Ray, max_dist: f64) -> Option<(BodyId, RaycastHit)> {
        let mut listeners = mem::take(&mut self.raycast_listeners);
        let mut best: Option<(BodyId, RaycastHit)> = None;
        for body in self.bodies.iter().flatten() {
            if !body.is_enabled() {
                continue;
            }
            for fixture in body.fixtures() {
                if let Some(hit) = shape_raycast(ray, &fixture.shape, body.transform(), max_dist) {
                    let allowed = listeners.iter_mut().all(|l| l.allow(ray, body, &hit));
                    if allowed && best.is_none_or(|(_, b)| hit.t < b.t) {
                        best = Some((body.id(), hit));
                    }
                }
            }
        }
        self.raycast_listeners = listeners;
        best
    }

    /// Ids of enabled bodies whose AABB overlaps the query box.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyId> {
        self.bodies
            .iter()
            .flatten()
            .filter(|b| b.is_enabled())
            .filter(|b| b.aabb().is_some_and(|ba| ba.overlaps(aabb)))
            .map(|b| b.id())
            .collect()
    }

    /// Current step's contact constraints, in solve order.
    pub fn contacts(&self) -> &[ContactConstraint] {
        self.contact_manager.constraints()
    }

    /// Shift the whole world's coordinates by `v`.
    pub fn shift(&mut self, v: Vec2) {
        for body in self.bodies.iter_mut().flatten() {
            body.shift(v);
        }
        for joint in &mut self.joints {
            joint.shift(v);
        }
        if let Some(bounds) = &mut self.bounds {
            *bounds = bounds.translate(v);
        }
        self.contact_manager.shift(v);
        // Stale cells are rebuilt on the next step.
        self.broadphase.clear();
    }

    // ----- stepping ----------------------------------------------------------

    /// Accumulate elapsed real time and run fixed steps when due, at most
    /// `max_steps` (default 1). Zero or negative elapsed time does nothing.
    /// Returns the number of steps performed.
    pub fn update(&mut self, elapsed: f64, max_steps: Option<usize>) -> Result<usize, Error> {
        if elapsed <= 0.0 {
            return Ok(0);
        }
        self.accumulator += elapsed;
        let dt = self.settings.step_frequency();
        let max = max_steps.unwrap_or(1);
        let mut steps = 0;
        while self.accumulator >= dt && steps < max {
            self.do_step(dt)?;
            self.accumulator -= dt;
            steps += 1;
        }
        if steps > 0 {
            let step = self.step;
            let mut listeners = mem::take(&mut self.step_listeners);
            for listener in listeners.iter_mut() {
                listener.update_performed(&step, self);
            }
            self.step_listeners = listeners;
        }
        Ok(steps)
    }

    /// Advance by `count` fixed steps at the configured step frequency.
    pub fn step(&mut self, count: usize) -> Result<(), Error> {
        let dt = self.settings.step_frequency();
        for _ in 0..count {
            self.do_step(dt)?;
        }
        Ok(())
    }

    /// Advance by `count` steps of an explicit duration.
    pub fn step_with_dt(&mut self, count: usize, dt: f64) -> Result<(), Error> {
        if dt <= 0.0 {
            return Err(Error::InvalidArgument("step duration must be positive"));
        }
        for _ in 0..count {
            self.do_step(dt)?;
        }
        Ok(())
    }

    fn do_step(&mut self, dt: f64) -> Result<(), Error> {
        // Impossible joint configurations abort the step before anything,
        // including the step clock, mutates.
        for joint in &self.joints {
            joint.validate(&self.bodies)?;
        }

        self.step.update(dt);
        let step = self.step;

        let mut step_listeners = mem::take(&mut self.step_listeners);
        for listener in step_listeners.iter_mut() {
            listener.begin(&step, self);
        }
        self.step_listeners = step_listeners;

        // Broad phase over enabled bodies with fixtures.
        for (index, slot) in self.bodies.iter().enumerate() {
            let id = index as BodyId;
            match slot {
                Some(body) if body.is_enabled() => match body.aabb() {
                    Some(aabb) => self.broadphase.update(id, aabb),
                    None => self.broadphase.remove(id),
                },
                _ => self.broadphase.remove(id),
            }
        }
        let pairs = self.broadphase.pairs();

        // Pairs whose bodies are joined with collision disallowed never
        // reach the narrow phase.
        let disallowed: HashSet<(BodyId, BodyId)> = self
            .joints
            .iter()
            .filter(|j| !j.collision_allowed && j.body1 != j.body2)
            .map(|j| {
                if j.body1 < j.body2 {
                    (j.body1, j.body2)
                } else {
                    (j.body2, j.body1)
                }
            })
            .collect();

        // Narrow phase: detect, build manifolds, queue constraints.
        for (a, b) in pairs {
            if disallowed.contains(&(a, b)) {
                continue;
            }
            let (Some(b1), Some(b2)) = (
                self.bodies[a as usize].as_ref(),
                self.bodies[b as usize].as_ref(),
            ) else {
                continue;
            };
            if !b1.is_enabled() || !b2.is_enabled() {
                continue;
            }
            for (f1, fixture1) in b1.fixtures().iter().enumerate() {
                for (f2, fixture2) in b2.fixtures().iter().enumerate() {
                    if !fixture1.filter.allows(&fixture2.filter) {
                        continue;
                    }
                    let Some(pen) = self.narrowphase.detect(
                        &fixture1.shape,
                        b1.transform(),
                        &fixture2.shape,
                        b2.transform(),
                    ) else {
                        continue;
                    };
                    let Some(manifold) = self.manifold_solver.manifold(
                        &pen,
                        &fixture1.shape,
                        b1.transform(),
                        &fixture2.shape,
                        b2.transform(),
                    ) else {
                        continue;
                    };
                    let key = ContactKey::new(a, f1, b, f2);
                    self.contact_manager
                        .queue(ContactConstraint::new(key, &manifold, b1, b2, &*self.mixer));
                }
            }
        }

        // Persistence matching and lifecycle callbacks.
        let events = self
            .contact_manager
            .update(self.settings.warm_start_distance_squared());
        trace!("contact update produced {} events", events.len());
        let mut contact_listeners = mem::take(&mut self.contact_listeners);
        for event in &events {
            match event {
                ContactEvent::Begin { constraint, data } => {
                    let mut allowed = true;
                    for listener in contact_listeners.iter_mut() {
                        allowed &= listener.begin(data);
                    }
                    if !allowed {
                        self.contact_manager.disable(*constraint);
                    }
                }
                ContactEvent::Persist { constraint, data } => {
                    let mut allowed = true;
                    for listener in contact_listeners.iter_mut() {
                        allowed &= listener.persist(data);
                    }
                    if !allowed {
                        self.contact_manager.disable(*constraint);
                    }
                }
                ContactEvent::End { data } => {
                    for listener in contact_listeners.iter_mut() {
                        listener.end(data);
                    }
                }
                ContactEvent::Sensed { data } => {
                    for listener in contact_listeners.iter_mut() {
                        listener.sensed(data);
                    }
                }
            }
        }
        // Pre-solve veto pass over the constraints entering the solver.
        if !contact_listeners.is_empty() {
            for ci in 0..self.contact_manager.constraints().len() {
                let constraint = &self.contact_manager.constraints()[ci];
                if !constraint.is_solvable() {
                    continue;
                }
                let points: Vec<ContactPointData> = constraint
                    .contacts
                    .iter()
                    .map(|c| ContactPointData {
                        key: constraint.key,
                        point: c.point,
                        normal: constraint.normal,
                        depth: c.depth,
                    })
                    .collect();
                let mut allowed = true;
                for point in &points {
                    for listener in contact_listeners.iter_mut() {
                        allowed &= listener.pre_solve(point);
                    }
                }
                if !allowed {
                    self.contact_manager.disable(ci);
                }
            }
        }
        self.contact_listeners = contact_listeners;

        // Integrate velocities of awake dynamic bodies.
        for body in self.bodies.iter_mut().flatten() {
            if !body.is_enabled() || body.is_static() || body.is_at_rest() {
                continue;
            }
            body.accumulate(dt);
            body.integrate_velocity(self.gravity, &step, &self.settings);
            body.clear_accumulators();
        }

        // Island construction and solve.
        let mut constraints = self.contact_manager.take_constraints();
        let islands = self.build_islands(&constraints);
        debug!("solving {} islands", islands.len());
        let mut result = Ok(());
        for island in &islands {
            if let Err(e) = island.solve(
                &mut self.bodies,
                &mut constraints,
                &mut self.joints,
                &step,
                &self.settings,
            ) {
                result = Err(e);
                break;
            }
        }
        self.contact_manager.restore_constraints(constraints);
        result?;

        // Post-solve callbacks with accumulated impulses.
        let mut contact_listeners = mem::take(&mut self.contact_listeners);
        if !contact_listeners.is_empty() {
            for constraint in self.contact_manager.constraints() {
                if !constraint.is_solvable() {
                    continue;
                }
                for contact in &constraint.contacts {
                    let solved = SolvedContactPoint {
                        data: ContactPointData {
                            key: constraint.key,
                            point: contact.point,
                            normal: constraint.normal,
                            depth: contact.depth,
                        },
                        normal_impulse: contact.jn,
                        tangent_impulse: contact.jt,
                    };
                    for listener in contact_listeners.iter_mut() {
                        listener.post_solve(&solved);
                    }
                }
            }
        }
        self.contact_listeners = contact_listeners;

        let mut step_listeners = mem::take(&mut self.step_listeners);
        for listener in step_listeners.iter_mut() {
            listener.post_solve(&step, self);
        }
        self.step_listeners = step_listeners;

        // Bodies fully outside the bounds are disabled.
        if let Some(bounds) = self.bounds {
            let mut out_of_bounds = Vec::new();
            for body in self.bodies.iter_mut().flatten() {
                if !body.is_enabled() {
                    continue;
                }
                if let Some(aabb) = body.aabb() {
                    if !bounds.overlaps(&aabb) {
                        body.set_enabled(false);
                        out_of_bounds.push(body.id());
                    }
                }
            }
            if !out_of_bounds.is_empty() {
                let mut listeners = mem::take(&mut self.bounds_listeners);
                for id in out_of_bounds {
                    debug!("body {id} left the world bounds");
                    let body = self.bodies[id as usize].as_ref().unwrap();
                    for listener in listeners.iter_mut() {
                        listener.out_of_bounds(body);
                    }
                }
                self.bounds_listeners = listeners;
            }
        }

        // Continuous collision for fast movers.
        {
            let ctx = CcdContext {
                toi: &*self.toi_detector,
                narrowphase: &*self.narrowphase,
                manifold_solver: &*self.manifold_solver,
                mixer: &*self.mixer,
            };
            let mut toi_listeners = mem::take(&mut self.toi_listeners);
            ccd::solve(
                &mut self.bodies,
                &disallowed,
                &ctx,
                &mut toi_listeners,
                &self.settings,
            );
            self.toi_listeners = toi_listeners;
        }

        let mut step_listeners = mem::take(&mut self.step_listeners);
        for listener in step_listeners.iter_mut() {
            listener.end(&step, self);
        }
        self.step_listeners = step_listeners;
        Ok(())
    }

    /// Depth-first island construction over the contact and joint graphs.
    /// Seeds are awake dynamic bodies; dynamic neighbours are woken and
    /// traversed, static bodies join an island without propagating.
    fn build_islands(&mut self, constraints: &[ContactConstraint]) -> Vec<Island> {
        let n = self.bodies.len();
        let mut contact_edges: Vec<Vec<(usize, BodyId)>> = vec![Vec::new(); n];
        for (ci, constraint) in constraints.iter().enumerate() {
            if !constraint.is_solvable() {
                continue;
            }
            contact_edges[constraint.key.body1 as usize].push((ci, constraint.key.body2));
            contact_edges[constraint.key.body2 as usize].push((ci, constraint.key.body1));
        }
        let mut joint_edges: Vec<Vec<(usize, BodyId)>> = vec![Vec::new(); n];
        for (ji, joint) in self.joints.iter().enumerate() {
            joint_edges[joint.body1 as usize].push((ji, joint.body2));
            if joint.body1 != joint.body2 {
                joint_edges[joint.body2 as usize].push((ji, joint.body1));
            }
        }

        let mut visited = vec![false; n];
        let mut contact_claimed = vec![false; constraints.len()];
        let mut joint_claimed = vec![false; self.joints.len()];
        let mut islands = Vec::new();

        for seed in 0..n {
            {
                let Some(body) = self.bodies[seed].as_ref() else {
                    continue;
                };
                if visited[seed]
                    || !body.is_enabled()
                    || !body.is_dynamic()
                    || body.is_at_rest()
                {
                    continue;
                }
            }

            let mut island = Island::default();
            let mut island_statics = Vec::new();
            let mut stack = vec![seed as BodyId];
            visited[seed] = true;

            while let Some(current) = stack.pop() {
                island.bodies.push(current);
                let edges = contact_edges[current as usize]
                    .iter()
                    .map(|&(i, o)| (true, i, o))
                    .chain(
                        joint_edges[current as usize]
                            .iter()
                            .map(|&(i, o)| (false, i, o)),
                    )
                    .collect::<Vec<_>>();
                for (is_contact, index, other) in edges {
                    let other_index = other as usize;
                    let other_enabled = self.bodies[other_index]
                        .as_ref()
                        .is_some_and(|b| b.is_enabled());
                    if !other_enabled {
                        continue;
                    }
                    if is_contact {
                        if !contact_claimed[index] {
                            contact_claimed[index] = true;
                            island.contacts.push(index);
                        }
                    } else if !joint_claimed[index] {
                        joint_claimed[index] = true;
                        island.joints.push(index);
                    }
                    if visited[other_index] {
                        continue;
                    }
                    visited[other_index] = true;
                    let other_body = self.bodies[other_index].as_mut().unwrap();
                    if other_body.is_dynamic() {
                        // Wake propagation: motion reaches sleeping
                        // neighbours through their shared constraints.
                        if other_body.is_at_rest() {
                            other_body.set_at_rest(false);
                        }
                        stack.push(other);
                    } else {
                        island.bodies.push(other);
                        island_statics.push(other_index);
                    }
                }
            }

            // Statics may participate in any number of islands.
            for index in island_statics {
                visited[index] = false;
            }
            islands.push(island);
        }
        islands
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
