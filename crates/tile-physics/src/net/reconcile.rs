//! Applying authoritative snapshots to local bodies.
//!
//! Reconciliation touches as little structure as possible: joints are only
//! rebuilt when the ordered lists differ, and fixtures are swapped one index
//! at a time so unchanged fixtures keep their broad-phase proxies.

use crate::api::events::PhysicsEvent;
use crate::api::types::EntityId;
use crate::components::body::PhysicsComponent;
use crate::components::fixture::Fixture;
use crate::components::joint::Joint;
use crate::core::broad_phase::BroadPhase;
use crate::core::physics::PhysicsWorld;
use crate::error::PhysicsError;
use crate::net::state::ComponentState;

/// What a reconciliation pass changed structurally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Local joints were torn down and relinked from the snapshot.
    pub joints_rebuilt: bool,
    pub fixtures_removed: usize,
    pub fixtures_added: usize,
}

impl ReconcileReport {
    /// True if no joint or fixture was touched.
    pub fn is_structural_noop(&self) -> bool {
        !self.joints_rebuilt && self.fixtures_removed == 0 && self.fixtures_added == 0
    }
}

impl<B: BroadPhase> PhysicsWorld<B> {
    /// Bring the body on `id` in line with an authoritative snapshot.
    ///
    /// Snapshots of other component kinds are ignored. Incoming shapes are
    /// validated before anything is written, so a malformed snapshot leaves
    /// the body untouched.
    pub fn handle_component_state(
        &mut self,
        id: EntityId,
        state: &ComponentState,
    ) -> Result<ReconcileReport, PhysicsError> {
        let ComponentState::Physics(state) = state else {
            log::trace!("ignoring non-physics state for {}", id);
            return Ok(ReconcileReport::default());
        };
        if !self.bodies.contains_key(&id) {
            return Err(PhysicsError::MissingBody(id));
        }

        let mut incoming = state.fixtures.clone();
        for fixture in incoming.iter_mut() {
            fixture.shape.rebuild(&self.config)?;
            fixture.reset_for(id);
        }

        let mut report = ReconcileReport::default();

        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.can_collide = state.can_collide;
        body.fixed_rotation = state.fixed_rotation;
        body.status = state.status;

        if !self.joints_match(id, &state.joints) {
            self.rebuild_joints(id, &state.joints);
            report.joints_rebuilt = true;
        }

        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        let (removed, added) = diff_fixtures(body, incoming, &mut self.broad_phase);
        report.fixtures_removed = removed;
        report.fixtures_added = added;
        if removed > 0 || added > 0 {
            self.events.publish(PhysicsEvent::FixtureUpdate { body: id });
        }

        body.dirty = true;
        body.mass = state.mass_grams / 1000.0;
        body.linear_velocity = state.linear_velocity;
        body.angular_velocity = state.angular_velocity;
        // A type change goes through sleep and zeroes the velocities above.
        body.set_body_type(state.body_type, &mut self.events);
        body.predict = false;

        if !report.is_structural_noop() {
            log::debug!("reconciled {}: {:?}", id, report);
        }
        Ok(report)
    }

    /// Positional comparison of the body's joints (linked, then pending)
    /// against the incoming joints this body would accept.
    fn joints_match(&self, id: EntityId, incoming: &[Joint]) -> bool {
        let current: Vec<&Joint> = self
            .graph
            .joints_of(id)
            .map(|(_, joint)| joint)
            .chain(self.graph.pending_joints_of(id))
            .collect();
        let incoming: Vec<&Joint> = incoming.iter().filter(|j| accepts_joint(id, j)).collect();
        current == incoming
    }

    fn rebuild_joints(&mut self, id: EntityId, incoming: &[Joint]) {
        for joint_id in self.graph.joint_ids_of(id) {
            if let Some(joint) = self.graph.remove_joint(joint_id) {
                match joint.other(id) {
                    Some(other) if other != id => {
                        if let Some(b) = self.bodies.get_mut(&other) {
                            b.mark_dirty();
                        }
                    }
                    _ => {}
                }
            }
        }
        self.graph.drop_pending_for(id);

        for joint in incoming {
            if !accepts_joint(id, joint) {
                log::warn!("snapshot for {} carries unusable joint '{}'; skipped", id, joint.id);
                continue;
            }
            let linked = self.bodies.contains_key(&joint.body_a) && self.bodies.contains_key(&joint.body_b);
            if linked {
                self.link_joint(joint.clone());
            } else {
                self.graph.defer_joint(joint.clone());
            }
        }
    }
}

/// Joints a snapshot for `id` may link: they touch `id` and join two
/// distinct bodies.
fn accepts_joint(id: EntityId, joint: &Joint) -> bool {
    joint.other(id).is_some() && !joint.is_self_joint()
}

/// Index-wise fixture diff. Every removal reaches the broad-phase before
/// any addition; additions follow incoming order. Local fixtures past the
/// end of `incoming` are kept. A structurally equal fixture stays indexed
/// but takes the incoming id. Returns `(removed, added)`.
fn diff_fixtures(
    body: &mut PhysicsComponent,
    incoming: Vec<Fixture>,
    broad_phase: &mut dyn BroadPhase,
) -> (usize, usize) {
    let owner = body.owner();
    let mut replaced = Vec::new();
    let mut additions = Vec::new();

    for (idx, fixture) in incoming.into_iter().enumerate() {
        match body.fixtures.get_mut(idx) {
            Some(current) if *current == fixture => {
                if current.id != fixture.id {
                    log::trace!("fixture {} on {} renamed '{}' -> '{}'", idx, owner, current.id, fixture.id);
                    current.id = fixture.id;
                }
            }
            Some(_) => {
                replaced.push(idx);
                additions.push((idx, fixture));
            }
            None => additions.push((idx, fixture)),
        }
    }

    for &idx in &replaced {
        if let Some(current) = body.fixtures.get_mut(idx) {
            broad_phase.remove_fixture(owner, current);
            current.body = None;
        }
    }

    let added = additions.len();
    for (idx, fixture) in additions {
        // Additions past the end are contiguous, so a push lands on `idx`.
        if idx < body.fixtures.len() {
            body.fixtures[idx] = fixture;
        } else {
            body.fixtures.push(fixture);
        }
        if let Some(slot) = body.fixtures.get_mut(idx) {
            broad_phase.add_fixture(owner, slot);
        }
    }

    (replaced.len(), added)
}
