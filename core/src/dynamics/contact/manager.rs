use std::collections::HashMap;

use super::constraint::{ContactConstraint, ContactKey};
use crate::geometry::Vec2;

/// Snapshot of one contact point handed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct ContactPointData {
    pub key: ContactKey,
    pub point: Vec2,
    pub normal: Vec2,
    pub depth: f64,
}

/// Contact lifecycle notifications produced by `ContactManager::update`.
/// `constraint` indexes the manager's current constraint list so a listener
/// veto can be applied back to the right entry.
#[derive(Debug, Clone, Copy)]
pub enum ContactEvent {
    Begin {
        constraint: usize,
        data: ContactPointData,
    },
    Persist {
        constraint: usize,
        data: ContactPointData,
    },
    End {
        data: ContactPointData,
    },
    Sensed {
        data: ContactPointData,
    },
}

/// Holds the step's queued constraints and the previous step's cache, and
/// performs persistence matching between them.
///
/// The cache is a Vec in solve order plus a key index; end events for
/// vanished pairs are emitted by walking the Vec, so callback order is
/// deterministic even though lookup goes through a hash map.
pub struct ContactManager {
    queue: Vec<ContactConstraint>,
    constraints: Vec<ContactConstraint>,
    index: HashMap<ContactKey, usize>,
}

impl ContactManager {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            constraints: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Queue a freshly detected constraint for this step.
    pub fn queue(&mut self, constraint: ContactConstraint) {
        self.queue.push(constraint);
    }

    pub fn constraints(&self) -> &[ContactConstraint] {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut [ContactConstraint] {
        &mut self.constraints
    }

    /// Move the constraint list out for the solve phase; positions (and the
    /// key index) stay valid for `restore_constraints`.
    pub(crate) fn take_constraints(&mut self) -> Vec<ContactConstraint> {
        std::mem::take(&mut self.constraints)
    }

    pub(crate) fn restore_constraints(&mut self, constraints: Vec<ContactConstraint>) {
        self.constraints = constraints;
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.constraints.clear();
        self.index.clear();
    }

    /// Drop every cached constraint touching `body` and return them so the
    /// caller can notify destruction listeners. Used on body removal.
    pub fn remove_body(&mut self, body: u32) -> Vec<ContactConstraint> {
        let mut removed = Vec::new();
        self.constraints.retain(|c| {
            if c.key.body1 == body || c.key.body2 == body {
                removed.push(c.clone());
                false
            } else {
                true
            }
        });
        self.rebuild_index();
        removed
    }

    pub fn shift(&mut self, v: Vec2) {
        for constraint in &mut self.constraints {
            for contact in &mut constraint.contacts {
                contact.point += v;
            }
        }
    }

    /// Match the queued constraints against the previous step's cache.
    ///
    /// A new point inherits the accumulated impulses of a prior point when
    /// their manifold-point identities are equal, or when they lie within the
    /// warm-start distance of each other. Matched points persist, unmatched
    /// new points begin, and prior points with no successor end.
    pub fn update(&mut self, warm_start_distance_squared: f64) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        let old = std::mem::take(&mut self.constraints);
        let old_index = std::mem::take(&mut self.index);
        let mut old_seen = vec![false; old.len()];
        let mut next = std::mem::take(&mut self.queue);

        for (ci, constraint) in next.iter_mut().enumerate() {
            if constraint.sensor {
                for contact in &constraint.contacts {
                    events.push(ContactEvent::Sensed {
                        data: point_data(constraint, contact.point, contact.depth),
                    });
                }
            }

            let key = constraint.key;
            let normal = constraint.normal;
            let previous = old_index.get(&constraint.key).copied().filter(|&i| i < old.len());
            match previous {
                Some(oi) => {
                    old_seen[oi] = true;
                    let old_constraint = &old[oi];
                    let mut old_used = vec![false; old_constraint.contacts.len()];

                    for contact in &mut constraint.contacts {
                        let found = old_constraint.contacts.iter().enumerate().find(
                            |(pi, prior)| {
                                !old_used[*pi]
                                    && ((!contact.id.is_distance() && contact.id == prior.id)
                                        || (contact.point - prior.point).length_squared()
                                            <= warm_start_distance_squared)
                            },
                        );
                        let data = ContactPointData {
                            key,
                            point: contact.point,
                            normal,
                            depth: contact.depth,
                        };
                        match found {
                            Some((pi, prior)) => {
                                old_used[pi] = true;
                                contact.jn = prior.jn;
                                contact.jt = prior.jt;
                                events.push(ContactEvent::Persist { constraint: ci, data });
                            }
                            None => {
                                events.push(ContactEvent::Begin { constraint: ci, data });
                            }
                        }
                    }

                    for (pi, prior) in old_constraint.contacts.iter().enumerate() {
                        if !old_used[pi] {
                            events.push(ContactEvent::End {
                                data: point_data(old_constraint, prior.point, prior.depth),
                            });
                        }
                    }
                }
                None => {
                    for contact in &constraint.contacts {
                        events.push(ContactEvent::Begin {
                            constraint: ci,
                            data: ContactPointData {
                                key,
                                point: contact.point,
                                normal,
                                depth: contact.depth,
                            },
                        });
                    }
                }
            }
        }

        // Pairs that vanished entirely this step, in last step's solve order.
        for (oi, constraint) in old.iter().enumerate() {
            if !old_seen[oi] {
                for contact in &constraint.contacts {
                    events.push(ContactEvent::End {
                        data: point_data(constraint, contact.point, contact.depth),
                    });
                }
            }
        }

        self.constraints = next;
        self.rebuild_index();
        events
    }

    /// Suppress a constraint for this step after a listener veto.
    pub fn disable(&mut self, index: usize) {
        if let Some(constraint) = self.constraints.get_mut(index) {
            constraint.enabled = false;
            for contact in &mut constraint.contacts {
                contact.jn = 0.0;
                contact.jt = 0.0;
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key, i))
            .collect();
    }
}

fn point_data(constraint: &ContactConstraint, point: Vec2, depth: f64) -> ContactPointData {
    ContactPointData {
        key: constraint.key,
        point,
        normal: constraint.normal,
        depth,
    }
}

impl Default for ContactManager {
    fn default() -> Self {
        Self::new()
    }
}
