use crate::api::types::EntityId;

/// Notifications raised by body mutations.
/// Consumed by the broad-phase, networking and gameplay layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsEvent {
    /// The body was woken up.
    Wake { body: EntityId },
    /// The body was put to sleep.
    Sleep { body: EntityId },
    /// The body's collision toggle changed.
    CollisionChanged { body: EntityId, can_collide: bool },
    /// The body entered (`anchored = true`) or left the Static type.
    Anchored { body: EntityId, anchored: bool },
    /// The body was attached to or detached from the simulation.
    PhysicsUpdate { body: EntityId },
    /// The body's fixture list changed.
    FixtureUpdate { body: EntityId },
}

impl PhysicsEvent {
    /// The body this event is about.
    pub fn body(&self) -> EntityId {
        match *self {
            PhysicsEvent::Wake { body }
            | PhysicsEvent::Sleep { body }
            | PhysicsEvent::CollisionChanged { body, .. }
            | PhysicsEvent::Anchored { body, .. }
            | PhysicsEvent::PhysicsUpdate { body }
            | PhysicsEvent::FixtureUpdate { body } => body,
        }
    }
}

/// Callback invoked for every dispatched event.
pub type EventCallback = Box<dyn FnMut(&PhysicsEvent)>;

/// Event queue plus subscriber registry.
///
/// Mutations only `publish`; subscribers run when the tick driver calls
/// `dispatch`, so a callback never observes a half-applied mutation.
pub struct EventBus {
    pending: Vec<PhysicsEvent>,
    subscribers: Vec<EventCallback>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(32),
            subscribers: Vec::new(),
        }
    }

    /// Queue an event for the next dispatch.
    pub fn publish(&mut self, event: PhysicsEvent) {
        log::trace!("queued {:?}", event);
        self.pending.push(event);
    }

    /// Register a callback that receives every dispatched event.
    pub fn subscribe(&mut self, callback: EventCallback) {
        self.subscribers.push(callback);
    }

    /// Deliver queued events to every subscriber in publication order.
    /// Returns the delivered events.
    pub fn dispatch(&mut self) -> Vec<PhysicsEvent> {
        let events = std::mem::take(&mut self.pending);
        for event in &events {
            for subscriber in self.subscribers.iter_mut() {
                subscriber(event);
            }
        }
        events
    }

    /// Take queued events without notifying subscribers.
    pub fn drain(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Queued events, oldest first.
    pub fn pending(&self) -> &[PhysicsEvent] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_and_drain() {
        let mut bus = EventBus::new();
        bus.publish(PhysicsEvent::Wake { body: EntityId(1) });
        bus.publish(PhysicsEvent::Sleep { body: EntityId(2) });
        assert_eq!(bus.len(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn dispatch_preserves_order_for_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut bus = EventBus::new();
        bus.subscribe(Box::new(move |e| sink.borrow_mut().push(*e)));

        bus.publish(PhysicsEvent::CollisionChanged { body: EntityId(3), can_collide: true });
        bus.publish(PhysicsEvent::PhysicsUpdate { body: EntityId(3) });
        assert!(seen.borrow().is_empty(), "subscribers run only on dispatch");

        let delivered = bus.dispatch();
        assert_eq!(delivered.len(), 2);
        assert_eq!(*seen.borrow(), delivered);
        assert!(bus.is_empty());
    }

    #[test]
    fn event_body_accessor() {
        let e = PhysicsEvent::Anchored { body: EntityId(9), anchored: true };
        assert_eq!(e.body(), EntityId(9));
    }
}
