use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::PhysicsConfig;
use crate::api::events::{EventBus, PhysicsEvent};
use crate::api::types::EntityId;
use crate::components::fixture::Fixture;
use crate::components::joint::Joint;
use crate::core::broad_phase::BroadPhase;
use crate::core::graph::JointGraph;
use crate::core::scene::TransformLookup;
use crate::error::PhysicsError;
use crate::geometry::Box2;
use crate::net::state::PhysicsComponentState;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves, never awake.
    #[default]
    Static,
    /// Moved by velocity only; ignores forces.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Whether the body is resting on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyStatus {
    #[default]
    OnGround,
    InAir,
}

/// Description of a body before it is attached, loadable from prototype
/// or map data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub awake: bool,
    pub sleeping_allowed: bool,
    pub can_collide: bool,
    pub fixed_rotation: bool,
    pub status: BodyStatus,
    /// Mass in kilograms.
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub fixtures: Vec<Fixture>,
    /// Persisted joints. Building a body from a description that carries
    /// any is an error; joints are only created at runtime.
    pub joints: Vec<Joint>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            awake: true,
            sleeping_allowed: true,
            can_collide: true,
            fixed_rotation: true,
            status: BodyStatus::OnGround,
            mass: 1.0,
            linear_damping: 0.2,
            angular_damping: 0.3,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            fixtures: Vec::new(),
            joints: Vec::new(),
        }
    }
}

impl BodyDesc {
    /// Create a dynamic body description.
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            fixed_rotation: false,
            ..Self::default()
        }
    }

    /// Create a kinematic body description.
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::default()
        }
    }

    /// Create a static (anchored) body description.
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Parse a description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_awake(mut self, awake: bool) -> Self {
        self.awake = awake;
        self
    }

    pub fn with_can_collide(mut self, can_collide: bool) -> Self {
        self.can_collide = can_collide;
        self
    }

    pub fn with_sleeping_allowed(mut self, allowed: bool) -> Self {
        self.sleeping_allowed = allowed;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_velocity(mut self, linear: Vec2, angular: f32) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    /// Set the linear damping (velocity decay).
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

// ---------------------------------------------------------------------------
// PhysicsComponent
// ---------------------------------------------------------------------------

/// A rigid body attached to one entity.
///
/// Owns its type, sleep state, collision toggles and ordered fixture list,
/// and keeps them consistent: static bodies never wake on their own,
/// sleeping zeroes velocity, and every change that must reach remote peers
/// sets the dirty flag. Joints and contacts live in the [`JointGraph`].
#[derive(Debug, Clone)]
pub struct PhysicsComponent {
    owner: EntityId,
    pub(crate) body_type: BodyType,
    pub(crate) awake: bool,
    pub(crate) sleeping_allowed: bool,
    pub(crate) sleep_time: f32,
    pub(crate) can_collide: bool,
    pub fixed_rotation: bool,
    pub status: BodyStatus,
    pub(crate) mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f32,
    /// Client-side extrapolation flag; cleared by authoritative state.
    pub predict: bool,
    pub(crate) dirty: bool,
    pub(crate) fixtures: Vec<Fixture>,
}

impl PhysicsComponent {
    /// Build a body from a description. Fixture shapes are rebuilt against
    /// `config`; they are not indexed until the world attaches the body.
    pub fn from_desc(owner: EntityId, desc: BodyDesc, config: &PhysicsConfig) -> Result<Self, PhysicsError> {
        if !desc.joints.is_empty() {
            return Err(PhysicsError::UnsupportedJointLoad {
                count: desc.joints.len(),
            });
        }

        let mut fixtures = desc.fixtures;
        for fixture in fixtures.iter_mut() {
            fixture.shape.rebuild(config)?;
            fixture.reset_for(owner);
        }

        Ok(Self {
            owner,
            body_type: desc.body_type,
            awake: desc.awake,
            sleeping_allowed: desc.sleeping_allowed,
            sleep_time: 0.0,
            can_collide: desc.can_collide,
            fixed_rotation: desc.fixed_rotation,
            status: desc.status,
            mass: desc.mass,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            linear_velocity: desc.linear_velocity,
            angular_velocity: desc.angular_velocity,
            predict: false,
            dirty: false,
            fixtures,
        })
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn sleeping_allowed(&self) -> bool {
        self.sleeping_allowed
    }

    pub fn sleep_time(&self) -> f32 {
        self.sleep_time
    }

    pub fn can_collide(&self) -> bool {
        self.can_collide
    }

    /// Mass in kilograms.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixture(&self, id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the body for the next outgoing snapshot.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the outgoing-sync flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // -- State transitions --

    /// Change the body type. The body is always put to sleep first; entering
    /// or leaving Static publishes `Anchored`.
    pub fn set_body_type(&mut self, body_type: BodyType, events: &mut EventBus) {
        if self.body_type == body_type {
            return;
        }
        self.set_awake(false, events);

        let was_static = self.body_type == BodyType::Static;
        self.body_type = body_type;
        let is_static = body_type == BodyType::Static;

        if was_static != is_static {
            events.publish(PhysicsEvent::Anchored {
                body: self.owner,
                anchored: is_static,
            });
            self.dirty = true;
        }
    }

    /// Wake or sleep the body. Either transition resets the sleep timer and
    /// zeroes both velocities.
    ///
    /// Static bodies are not refused here; callers that must keep them
    /// asleep check the type themselves.
    pub fn set_awake(&mut self, awake: bool, events: &mut EventBus) {
        if self.awake == awake {
            return;
        }
        self.awake = awake;
        self.sleep_time = 0.0;
        self.linear_velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;

        let body = self.owner;
        events.publish(if awake {
            PhysicsEvent::Wake { body }
        } else {
            PhysicsEvent::Sleep { body }
        });
        self.dirty = true;
    }

    /// Re-allowing sleep wakes the body so its sleep timer starts fresh.
    pub fn set_sleeping_allowed(&mut self, allowed: bool, events: &mut EventBus) {
        if self.sleeping_allowed == allowed {
            return;
        }
        self.sleeping_allowed = allowed;
        if allowed {
            self.set_awake(true, events);
        }
        self.dirty = true;
    }

    pub fn set_can_collide(&mut self, can_collide: bool, events: &mut EventBus) {
        if self.can_collide == can_collide {
            return;
        }
        self.can_collide = can_collide;
        events.publish(PhysicsEvent::CollisionChanged {
            body: self.owner,
            can_collide,
        });
        self.dirty = true;
    }

    /// Set the linear velocity. Ignored for static bodies; a non-zero value
    /// wakes a sleeping body.
    pub fn set_linear_velocity(&mut self, velocity: Vec2, events: &mut EventBus) {
        if self.body_type == BodyType::Static {
            return;
        }
        if velocity != Vec2::ZERO {
            self.set_awake(true, events);
        }
        self.linear_velocity = velocity;
        self.dirty = true;
    }

    /// Set the angular velocity. Same rules as [`Self::set_linear_velocity`].
    pub fn set_angular_velocity(&mut self, velocity: f32, events: &mut EventBus) {
        if self.body_type == BodyType::Static || self.fixed_rotation {
            return;
        }
        if velocity != 0.0 {
            self.set_awake(true, events);
        }
        self.angular_velocity = velocity;
        self.dirty = true;
    }

    pub fn set_mass(&mut self, mass: f32) {
        if mass.is_nan() || mass <= 0.0 {
            log::warn!("ignoring non-positive mass {} for {}", mass, self.owner);
            return;
        }
        self.mass = mass;
        self.dirty = true;
    }

    // -- Lifecycle --

    /// Initial-state setup when the body is attached.
    pub fn startup(&mut self, in_container: bool, events: &mut EventBus) {
        if self.body_type == BodyType::Static {
            self.awake = false;
        }

        if self.can_collide && !in_container {
            events.publish(PhysicsEvent::CollisionChanged {
                body: self.owner,
                can_collide: true,
            });
            events.publish(PhysicsEvent::PhysicsUpdate { body: self.owner });
        } else {
            self.can_collide = false;
        }
    }

    /// Detach from the broad-phase. Joint and contact edges must already be
    /// gone (see [`JointGraph::remove_body`]).
    pub fn shutdown(&mut self, broad_phase: &mut dyn BroadPhase, events: &mut EventBus) {
        broad_phase.remove_body(self.owner);
        for fixture in self.fixtures.iter_mut() {
            fixture.proxies.clear();
        }
        events.publish(PhysicsEvent::PhysicsUpdate { body: self.owner });
    }

    // -- Collision filtering --

    /// Whether contacts between this body and `other` should be generated.
    /// At least one Dynamic body is required, and a joint between the two
    /// with `collide_connected == false` suppresses them.
    pub fn should_collide(&self, other: &PhysicsComponent, graph: &JointGraph) -> bool {
        if self.body_type != BodyType::Dynamic && other.body_type != BodyType::Dynamic {
            return false;
        }
        !graph
            .joints_between(self.owner, other.owner)
            .any(|joint| !joint.collide_connected)
    }

    /// True if any fixture is hard.
    pub fn hard(&self) -> bool {
        self.fixtures.iter().any(|f| f.hard)
    }

    /// Force every fixture's hard flag.
    pub fn set_hard(&mut self, hard: bool) {
        for fixture in self.fixtures.iter_mut() {
            fixture.hard = hard;
        }
        self.dirty = true;
    }

    /// Layers occupied by any fixture.
    pub fn collision_layer(&self) -> u32 {
        self.fixtures.iter().fold(0, |acc, f| acc | f.collision_layer)
    }

    /// Layers any fixture collides with.
    pub fn collision_mask(&self) -> u32 {
        self.fixtures.iter().fold(0, |acc, f| acc | f.collision_mask)
    }

    // -- Fixtures --

    pub fn add_fixture(
        &mut self,
        mut fixture: Fixture,
        broad_phase: &mut dyn BroadPhase,
        events: &mut EventBus,
    ) {
        fixture.reset_for(self.owner);
        self.fixtures.push(fixture);
        self.dirty = true;
        if let Some(added) = self.fixtures.last_mut() {
            broad_phase.add_fixture(self.owner, added);
        }
        events.publish(PhysicsEvent::FixtureUpdate { body: self.owner });
    }

    /// Remove a fixture by id. A missing fixture is logged and reported as
    /// an error the caller may ignore.
    pub fn remove_fixture(
        &mut self,
        id: &str,
        broad_phase: &mut dyn BroadPhase,
        events: &mut EventBus,
    ) -> Result<Fixture, PhysicsError> {
        let Some(idx) = self.fixtures.iter().position(|f| f.id == id) else {
            log::error!("tried to remove fixture '{}' that is not on {}", id, self.owner);
            return Err(PhysicsError::FixtureNotFound {
                body: self.owner,
                fixture: id.to_string(),
            });
        };
        let mut fixture = self.fixtures.remove(idx);
        self.dirty = true;
        broad_phase.remove_fixture(self.owner, &mut fixture);
        fixture.body = None;
        events.publish(PhysicsEvent::FixtureUpdate { body: self.owner });
        Ok(fixture)
    }

    // -- Sleep --

    /// Advance the sleep timer by `dt`. A body that rests for
    /// `config.time_to_sleep` seconds is put to sleep.
    pub fn update_sleep(&mut self, dt: f32, config: &PhysicsConfig, events: &mut EventBus) {
        if !self.awake || self.body_type == BodyType::Static {
            return;
        }
        if !self.sleeping_allowed {
            self.sleep_time = 0.0;
            return;
        }

        let lin_tol = config.linear_sleep_tolerance;
        if self.linear_velocity.length_squared() > lin_tol * lin_tol
            || self.angular_velocity.abs() > config.angular_sleep_tolerance
        {
            self.sleep_time = 0.0;
            return;
        }

        self.sleep_time += dt;
        if self.sleep_time >= config.time_to_sleep {
            self.set_awake(false, events);
        }
    }

    // -- Bounds --

    /// Union of fixture bounds in body space.
    pub fn local_bounds(&self, rotation: f32) -> Option<Box2> {
        self.fixtures
            .iter()
            .map(|f| f.local_bounds(rotation))
            .reduce(|a, b| a.union(&b))
    }

    /// Union of fixture bounds in world space, via the owner's transform.
    pub fn world_bounds(&self, lookup: &dyn TransformLookup) -> Option<Box2> {
        let (position, rotation) = lookup.world_transform(self.owner)?;
        self.local_bounds(rotation).map(|b| b.translated(position))
    }

    // -- Snapshot --

    /// Outgoing snapshot of this body. Joints are listed linked-first in
    /// edge order, then any still waiting for an endpoint.
    pub fn component_state(&self, graph: &JointGraph) -> PhysicsComponentState {
        let joints = graph
            .joints_of(self.owner)
            .map(|(_, j)| j.clone())
            .chain(graph.pending_joints_of(self.owner).cloned())
            .collect();

        PhysicsComponentState {
            can_collide: self.can_collide,
            fixed_rotation: self.fixed_rotation,
            status: self.status,
            fixtures: self.fixtures.clone(),
            joints,
            mass_grams: self.mass * 1000.0,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            body_type: self.body_type,
        }
    }
}
