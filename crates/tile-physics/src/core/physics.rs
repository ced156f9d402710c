use std::collections::BTreeMap;

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::api::events::{EventBus, EventCallback, PhysicsEvent};
use crate::api::types::EntityId;
use crate::components::body::{BodyDesc, BodyType, PhysicsComponent};
use crate::components::entity::Entity;
use crate::components::fixture::Fixture;
use crate::components::joint::{Joint, JointId};
use crate::core::broad_phase::{BroadPhase, NullBroadPhase};
use crate::core::graph::JointGraph;
use crate::error::PhysicsError;
use crate::net::state::ComponentState;

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Registry of every body, plus the joint graph, broad-phase and event bus
/// they share.
///
/// All structural mutation goes through the world so that the graph and the
/// broad-phase stay consistent with the bodies. Events are queued during a
/// tick and delivered by [`PhysicsWorld::flush_events`].
pub struct PhysicsWorld<B: BroadPhase = NullBroadPhase> {
    pub(crate) config: PhysicsConfig,
    pub(crate) bodies: BTreeMap<EntityId, PhysicsComponent>,
    pub(crate) graph: JointGraph,
    pub(crate) broad_phase: B,
    pub(crate) events: EventBus,
}

impl PhysicsWorld<NullBroadPhase> {
    /// A world with no spatial index attached.
    pub fn headless(config: PhysicsConfig) -> Self {
        Self::new(config, NullBroadPhase)
    }
}

impl<B: BroadPhase> PhysicsWorld<B> {
    pub fn new(config: PhysicsConfig, broad_phase: B) -> Self {
        Self {
            config,
            bodies: BTreeMap::new(),
            graph: JointGraph::new(),
            broad_phase,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn graph(&self) -> &JointGraph {
        &self.graph
    }

    pub fn broad_phase(&self) -> &B {
        &self.broad_phase
    }

    pub fn broad_phase_mut(&mut self) -> &mut B {
        &mut self.broad_phase
    }

    /// Events queued since the last flush.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // -- Lifecycle --

    /// Attach a body to `entity`. Fixtures are indexed, the body is started,
    /// and any deferred joints that can now resolve are linked.
    /// An existing body on the same entity is despawned first.
    pub fn spawn_body(&mut self, entity: &Entity, desc: BodyDesc) -> Result<(), PhysicsError> {
        let id = entity.id;
        let mut body = PhysicsComponent::from_desc(id, desc, &self.config)?;

        if self.bodies.contains_key(&id) {
            log::warn!("{} already has a body; replacing it", id);
            self.despawn_body(id);
        }

        for fixture in body.fixtures.iter_mut() {
            self.broad_phase.add_fixture(id, fixture);
        }
        body.startup(entity.is_contained(), &mut self.events);
        self.bodies.insert(id, body);
        log::debug!("spawned body on {}", id);

        let ready = self
            .graph
            .take_ready_joints(|endpoint| self.bodies.contains_key(&endpoint));
        for joint in ready {
            self.link_joint(joint);
        }
        Ok(())
    }

    /// Detach and return the body on `id`. Every joint and contact touching
    /// it is destroyed and the other endpoints are marked dirty.
    pub fn despawn_body(&mut self, id: EntityId) -> Option<PhysicsComponent> {
        let mut body = self.bodies.remove(&id)?;
        for other in self.graph.remove_body(id) {
            if let Some(b) = self.bodies.get_mut(&other) {
                b.mark_dirty();
            }
        }
        body.shutdown(&mut self.broad_phase, &mut self.events);
        log::debug!("despawned body on {}", id);
        Some(body)
    }

    pub fn body(&self, id: EntityId) -> Option<&PhysicsComponent> {
        self.bodies.get(&id)
    }

    /// Direct access for fields without side effects (damping, status,
    /// prediction). Use the world methods for anything that publishes events.
    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut PhysicsComponent> {
        self.bodies.get_mut(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &PhysicsComponent> {
        self.bodies.values()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body_entry(&mut self, id: EntityId) -> Result<&mut PhysicsComponent, PhysicsError> {
        self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))
    }

    // -- Fixtures --

    pub fn add_fixture(&mut self, id: EntityId, mut fixture: Fixture) -> Result<(), PhysicsError> {
        fixture.shape.rebuild(&self.config)?;
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.add_fixture(fixture, &mut self.broad_phase, &mut self.events);
        Ok(())
    }

    pub fn remove_fixture(&mut self, id: EntityId, fixture: &str) -> Result<Fixture, PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.remove_fixture(fixture, &mut self.broad_phase, &mut self.events)
    }

    // -- Joints --

    /// Link a joint between two distinct, existing bodies.
    pub fn add_joint(&mut self, joint: Joint) -> Result<JointId, PhysicsError> {
        if joint.is_self_joint() {
            return Err(PhysicsError::SelfJoint(joint.body_a));
        }
        for endpoint in [joint.body_a, joint.body_b] {
            if !self.bodies.contains_key(&endpoint) {
                return Err(PhysicsError::MissingBody(endpoint));
            }
        }
        Ok(self.link_joint(joint))
    }

    pub(crate) fn link_joint(&mut self, joint: Joint) -> JointId {
        for endpoint in [joint.body_a, joint.body_b] {
            if let Some(b) = self.bodies.get_mut(&endpoint) {
                b.mark_dirty();
            }
        }
        self.graph.add_joint(joint)
    }

    pub fn remove_joint(&mut self, id: JointId) -> Result<Joint, PhysicsError> {
        let joint = self.graph.remove_joint(id).ok_or(PhysicsError::MissingJoint)?;
        for endpoint in [joint.body_a, joint.body_b] {
            if let Some(b) = self.bodies.get_mut(&endpoint) {
                b.mark_dirty();
            }
        }
        Ok(joint)
    }

    /// Remove every joint touching `id`, linked or pending.
    /// Returns how many were removed.
    pub fn clear_joints(&mut self, id: EntityId) -> usize {
        let mut removed = 0;
        for joint_id in self.graph.joint_ids_of(id) {
            if self.remove_joint(joint_id).is_ok() {
                removed += 1;
            }
        }
        removed + self.graph.drop_pending_for(id)
    }

    pub fn joints_of(&self, id: EntityId) -> impl Iterator<Item = &Joint> + '_ {
        self.graph.joints_of(id).map(|(_, joint)| joint)
    }

    // -- Body state --

    pub fn set_awake(&mut self, id: EntityId, awake: bool) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_awake(awake, &mut self.events);
        Ok(())
    }

    pub fn set_sleeping_allowed(&mut self, id: EntityId, allowed: bool) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_sleeping_allowed(allowed, &mut self.events);
        Ok(())
    }

    pub fn set_body_type(&mut self, id: EntityId, body_type: BodyType) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_body_type(body_type, &mut self.events);
        Ok(())
    }

    /// Toggle collision. Disabling also destroys the body's contacts.
    pub fn set_can_collide(&mut self, id: EntityId, can_collide: bool) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_can_collide(can_collide, &mut self.events);
        if !can_collide {
            let cleared = self.graph.clear_contacts(id);
            if cleared > 0 {
                log::trace!("dropped {} contacts of {}", cleared, id);
            }
        }
        Ok(())
    }

    pub fn set_hard(&mut self, id: EntityId, hard: bool) -> Result<(), PhysicsError> {
        self.body_entry(id)?.set_hard(hard);
        Ok(())
    }

    pub fn set_linear_velocity(&mut self, id: EntityId, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_linear_velocity(velocity, &mut self.events);
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, id: EntityId, velocity: f32) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(&id).ok_or(PhysicsError::MissingBody(id))?;
        body.set_angular_velocity(velocity, &mut self.events);
        Ok(())
    }

    /// Whether contacts between `a` and `b` should be generated.
    /// False if either body is missing.
    pub fn should_collide(&self, a: EntityId, b: EntityId) -> bool {
        match (self.bodies.get(&a), self.bodies.get(&b)) {
            (Some(a), Some(b)) => a.should_collide(b, &self.graph),
            _ => false,
        }
    }

    // -- Tick --

    /// Advance sleep accounting for every body.
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            body.update_sleep(dt, &self.config, &mut self.events);
        }
    }

    /// Deliver queued events to subscribers, in publication order.
    pub fn flush_events(&mut self) -> Vec<PhysicsEvent> {
        self.events.dispatch()
    }

    pub fn subscribe(&mut self, callback: EventCallback) {
        self.events.subscribe(callback);
    }

    // -- Networking --

    /// Outgoing snapshot of a body.
    pub fn get_component_state(&self, id: EntityId) -> Option<ComponentState> {
        self.bodies
            .get(&id)
            .map(|body| ComponentState::Physics(body.component_state(&self.graph)))
    }

    /// Ids of bodies changed since the last call, clearing their dirty flags.
    pub fn take_dirty(&mut self) -> Vec<EntityId> {
        self.bodies
            .values_mut()
            .filter_map(|body| body.take_dirty().then_some(body.owner()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::graph::Contact;
    use crate::geometry::{Box2, CircleShape, PolygonShape};

    const A: EntityId = EntityId(1);
    const B: EntityId = EntityId(2);
    const C: EntityId = EntityId(3);

    fn world_with(ids: &[EntityId]) -> PhysicsWorld {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        for &id in ids {
            world.spawn_body(&Entity::new(id), BodyDesc::dynamic()).unwrap();
        }
        world.flush_events();
        world
    }

    #[test]
    fn spawn_and_despawn_body() {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        world
            .spawn_body(
                &Entity::new(A),
                BodyDesc::dynamic().with_fixture(Fixture::new("ball", CircleShape::new(0.5))),
            )
            .unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(
            world.flush_events(),
            vec![
                PhysicsEvent::CollisionChanged { body: A, can_collide: true },
                PhysicsEvent::PhysicsUpdate { body: A },
            ]
        );

        let body = world.despawn_body(A).unwrap();
        assert_eq!(body.fixtures().len(), 1);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.flush_events(), vec![PhysicsEvent::PhysicsUpdate { body: A }]);
        assert!(world.despawn_body(A).is_none());
    }

    #[test]
    fn spawning_in_container_disables_collision() {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        world
            .spawn_body(&Entity::new(A).inside(B), BodyDesc::dynamic())
            .unwrap();
        assert!(!world.body(A).unwrap().can_collide());
        assert!(world.flush_events().is_empty());
    }

    #[test]
    fn static_bodies_are_asleep_after_spawn() {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        world
            .spawn_body(&Entity::new(A), BodyDesc::fixed().with_awake(true))
            .unwrap();
        assert!(!world.body(A).unwrap().is_awake());
    }

    #[test]
    fn add_joint_requires_both_bodies() {
        let mut world = world_with(&[A]);
        let err = world.add_joint(Joint::weld("ab", A, B)).unwrap_err();
        assert!(matches!(err, PhysicsError::MissingBody(id) if id == B));
        assert_eq!(world.graph().joint_count(), 0);
    }

    #[test]
    fn self_joint_is_rejected() {
        let mut world = world_with(&[A]);
        let err = world.add_joint(Joint::weld("self", A, A)).unwrap_err();
        assert!(matches!(err, PhysicsError::SelfJoint(id) if id == A));
        assert_eq!(world.joints_of(A).count(), 0);
        assert!(world.get_component_state(A).unwrap().as_physics().unwrap().joints.is_empty());
    }

    #[test]
    fn joints_mark_both_endpoints_dirty() {
        let mut world = world_with(&[A, B]);
        world.take_dirty();
        let id = world.add_joint(Joint::weld("ab", A, B)).unwrap();
        let mut dirty = world.take_dirty();
        dirty.sort();
        assert_eq!(dirty, vec![A, B]);

        world.remove_joint(id).unwrap();
        assert_eq!(world.take_dirty().len(), 2);
        assert!(matches!(world.remove_joint(id), Err(PhysicsError::MissingJoint)));
    }

    #[test]
    fn should_collide_is_symmetric_under_joints() {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        world.spawn_body(&Entity::new(A), BodyDesc::dynamic()).unwrap();
        world.spawn_body(&Entity::new(B), BodyDesc::dynamic()).unwrap();
        world.spawn_body(&Entity::new(C), BodyDesc::fixed()).unwrap();
        world.spawn_body(&Entity::new(EntityId(4)), BodyDesc::kinematic()).unwrap();

        assert!(world.should_collide(A, B) && world.should_collide(B, A));
        assert!(world.should_collide(A, C) && world.should_collide(C, A));
        assert!(!world.should_collide(C, EntityId(4)));
        assert!(!world.should_collide(EntityId(4), C));

        world.add_joint(Joint::weld("ab", A, B)).unwrap();
        assert!(!world.should_collide(A, B));
        assert!(!world.should_collide(B, A));

        world.add_joint(Joint::weld("ac", A, C).with_collide_connected(true)).unwrap();
        assert!(world.should_collide(A, C) && world.should_collide(C, A));

        assert!(!world.should_collide(A, EntityId(99)));
    }

    #[test]
    fn despawn_cleans_up_joints_and_contacts() {
        let mut world = world_with(&[A, B, C]);
        world.add_joint(Joint::weld("ab", A, B)).unwrap();
        world.add_joint(Joint::weld("bc", B, C)).unwrap();
        world.graph.add_contact(Contact { body_a: A, fixture_a: 0, body_b: C, fixture_b: 0, touching: true });
        world.take_dirty();

        world.despawn_body(A);
        assert_eq!(world.graph().joint_count(), 1);
        assert_eq!(world.graph().contact_count(), 0);
        assert_eq!(world.joints_of(B).count(), 1);
        assert_eq!(world.take_dirty(), vec![B]);
    }

    #[test]
    fn disabling_collision_drops_contacts() {
        let mut world = world_with(&[A, B]);
        world.graph.add_contact(Contact { body_a: A, fixture_a: 0, body_b: B, fixture_b: 0, touching: false });
        world.set_can_collide(A, false).unwrap();
        assert_eq!(world.graph().contact_count(), 0);
        assert_eq!(
            world.flush_events(),
            vec![PhysicsEvent::CollisionChanged { body: A, can_collide: false }]
        );
    }

    #[test]
    fn clear_joints_counts_pending_too() {
        let mut world = world_with(&[A, B]);
        world.add_joint(Joint::weld("ab", A, B)).unwrap();
        world.graph.defer_joint(Joint::weld("ac", A, C));
        assert_eq!(world.clear_joints(A), 2);
        assert_eq!(world.graph().joint_count(), 0);
        assert_eq!(world.graph().pending_count(), 0);
    }

    #[test]
    fn deferred_joint_links_when_endpoint_spawns() {
        let mut world = world_with(&[A]);
        world.graph.defer_joint(Joint::weld("ab", A, B));
        assert_eq!(world.joints_of(A).count(), 0);

        world.spawn_body(&Entity::new(B), BodyDesc::dynamic()).unwrap();
        assert_eq!(world.graph().pending_count(), 0);
        assert_eq!(world.joints_of(A).count(), 1);
        assert_eq!(world.joints_of(B).count(), 1);
    }

    #[test]
    fn step_puts_resting_bodies_to_sleep() {
        let mut world = world_with(&[A, B]);
        world.set_sleeping_allowed(B, false).unwrap();
        world.set_linear_velocity(A, Vec2::ZERO).unwrap();
        for _ in 0..40 {
            world.step(1.0 / 60.0);
        }
        assert!(!world.body(A).unwrap().is_awake());
        assert!(world.body(B).unwrap().is_awake());
        assert_eq!(world.flush_events(), vec![PhysicsEvent::Sleep { body: A }]);
    }

    #[test]
    fn subscribers_see_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = world_with(&[A]);
        let sink = Rc::clone(&seen);
        world.subscribe(Box::new(move |e| sink.borrow_mut().push(*e)));

        world.set_body_type(A, BodyType::Static).unwrap();
        assert!(seen.borrow().is_empty());

        world.flush_events();
        assert_eq!(
            *seen.borrow(),
            vec![
                PhysicsEvent::Sleep { body: A },
                PhysicsEvent::Anchored { body: A, anchored: true },
            ]
        );
    }

    #[test]
    fn fixture_operations_go_through_body() {
        let mut world = world_with(&[A]);
        let square = PolygonShape::new_box(1.0, 1.0, world.config()).unwrap();
        world.add_fixture(A, Fixture::new("box", square)).unwrap();
        assert_eq!(world.body(A).unwrap().fixtures().len(), 1);
        assert!(matches!(
            world.remove_fixture(A, "nope"),
            Err(PhysicsError::FixtureNotFound { .. })
        ));
        assert!(world.remove_fixture(A, "box").is_ok());
        assert!(matches!(
            world.add_fixture(B, Fixture::new("x", CircleShape::new(1.0))),
            Err(PhysicsError::MissingBody(_))
        ));
    }

    #[test]
    fn attached_polygon_keeps_explicit_radius() {
        let mut world = world_with(&[A]);
        let shape = PolygonShape::new_box(1.0, 1.0, world.config()).unwrap().with_radius(0.5);
        world.add_fixture(A, Fixture::new("padded", shape.clone())).unwrap();
        world
            .spawn_body(
                &Entity::new(B),
                BodyDesc::dynamic().with_fixture(Fixture::new("padded", shape)),
            )
            .unwrap();

        let expected = Box2::new(Vec2::splat(-1.5), Vec2::splat(1.5));
        for id in [A, B] {
            let bounds = world.body(id).unwrap().fixtures()[0].local_bounds(0.0);
            assert!(bounds.approx_eq(&expected, 1e-5), "{}: {:?}", id, bounds);
        }
    }

    #[test]
    fn component_state_reports_grams() {
        let mut world = PhysicsWorld::headless(PhysicsConfig::default());
        world
            .spawn_body(&Entity::new(A), BodyDesc::dynamic().with_mass(2.5))
            .unwrap();
        let state = world.get_component_state(A).unwrap();
        let physics = state.as_physics().unwrap();
        assert!((physics.mass_grams - 2500.0).abs() < 1e-3);
        assert!(world.get_component_state(B).is_none());
    }
}
