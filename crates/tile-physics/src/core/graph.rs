//! Joint registry and relation graph.
//!
//! The graph is the authoritative store of joints and contacts. Bodies hold
//! no relation data of their own; they read their edge lists from here.

use slotmap::SlotMap;

use super::edges::{EdgeArena, EdgeId};
use crate::api::types::EntityId;
use crate::components::joint::{Joint, JointId};

slotmap::new_key_type! {
    /// Stable handle to a contact.
    pub struct ContactId;
}

#[derive(Debug, Clone)]
struct JointRecord {
    joint: Joint,
    edge_a: EdgeId,
    edge_b: EdgeId,
}

/// An overlap relation between fixtures of two bodies, maintained by the
/// external narrow-phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body_a: EntityId,
    pub fixture_a: usize,
    pub body_b: EntityId,
    pub fixture_b: usize,
    /// Whether the fixtures currently overlap (not just their bounds).
    pub touching: bool,
}

#[derive(Debug, Clone)]
struct ContactRecord {
    contact: Contact,
    edge_a: EdgeId,
    edge_b: EdgeId,
}

/// Joints, contacts, and the per-body edge lists linking them.
#[derive(Debug, Default)]
pub struct JointGraph {
    joints: SlotMap<JointId, JointRecord>,
    joint_edges: EdgeArena<JointId>,
    contacts: SlotMap<ContactId, ContactRecord>,
    contact_edges: EdgeArena<ContactId>,
    /// Joints waiting for an endpoint body that does not exist yet.
    pending: Vec<Joint>,
}

impl JointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Joints --

    /// Register a joint and link an edge into both endpoints' lists.
    pub fn add_joint(&mut self, joint: Joint) -> JointId {
        let (a, b) = (joint.body_a, joint.body_b);
        self.joints.insert_with_key(|id| {
            let edge_a = self.joint_edges.push(a, b, id);
            let edge_b = self.joint_edges.push(b, a, id);
            JointRecord { joint, edge_a, edge_b }
        })
    }

    /// Unregister a joint, unlinking it from both endpoints.
    pub fn remove_joint(&mut self, id: JointId) -> Option<Joint> {
        let record = self.joints.remove(id)?;
        self.joint_edges.unlink(record.edge_a);
        self.joint_edges.unlink(record.edge_b);
        Some(record.joint)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id).map(|r| &r.joint)
    }

    /// Joints touching `body`, in the order they were linked.
    pub fn joints_of(&self, body: EntityId) -> impl Iterator<Item = (JointId, &Joint)> + '_ {
        self.joint_edges
            .iter(body)
            .filter_map(move |(_, edge)| self.joint(edge.relation).map(|j| (edge.relation, j)))
    }

    pub fn joint_ids_of(&self, body: EntityId) -> Vec<JointId> {
        self.joint_edges.iter(body).map(|(_, e)| e.relation).collect()
    }

    /// Joints linking `a` and `b` directly.
    pub fn joints_between(&self, a: EntityId, b: EntityId) -> impl Iterator<Item = &Joint> + '_ {
        self.joint_edges
            .iter(a)
            .filter(move |(_, e)| e.other == b)
            .filter_map(move |(_, e)| self.joint(e.relation))
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // -- Deferred joints --

    /// Park a joint until both of its bodies exist.
    pub fn defer_joint(&mut self, joint: Joint) {
        log::debug!(
            "deferring joint '{}' between {} and {}",
            joint.id,
            joint.body_a,
            joint.body_b
        );
        self.pending.push(joint);
    }

    pub fn pending_joints_of(&self, body: EntityId) -> impl Iterator<Item = &Joint> + '_ {
        self.pending
            .iter()
            .filter(move |j| j.body_a == body || j.body_b == body)
    }

    /// Forget pending joints touching `body`. Returns how many were dropped.
    pub fn drop_pending_for(&mut self, body: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|j| j.body_a != body && j.body_b != body);
        before - self.pending.len()
    }

    /// Remove and return pending joints whose endpoints both satisfy `exists`.
    pub fn take_ready_joints(&mut self, exists: impl Fn(EntityId) -> bool) -> Vec<Joint> {
        let (ready, waiting): (Vec<Joint>, Vec<Joint>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|j| exists(j.body_a) && exists(j.body_b));
        self.pending = waiting;
        ready
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // -- Contacts --

    pub fn add_contact(&mut self, contact: Contact) -> ContactId {
        let (a, b) = (contact.body_a, contact.body_b);
        self.contacts.insert_with_key(|id| {
            let edge_a = self.contact_edges.push(a, b, id);
            let edge_b = self.contact_edges.push(b, a, id);
            ContactRecord { contact, edge_a, edge_b }
        })
    }

    pub fn remove_contact(&mut self, id: ContactId) -> Option<Contact> {
        let record = self.contacts.remove(id)?;
        self.contact_edges.unlink(record.edge_a);
        self.contact_edges.unlink(record.edge_b);
        Some(record.contact)
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(id).map(|r| &r.contact)
    }

    pub fn set_contact_touching(&mut self, id: ContactId, touching: bool) {
        if let Some(record) = self.contacts.get_mut(id) {
            record.contact.touching = touching;
        }
    }

    pub fn contacts_of(&self, body: EntityId) -> impl Iterator<Item = (ContactId, &Contact)> + '_ {
        self.contact_edges
            .iter(body)
            .filter_map(move |(_, e)| self.contact(e.relation).map(|c| (e.relation, c)))
    }

    /// Destroy every contact touching `body`. Returns how many were removed.
    pub fn clear_contacts(&mut self, body: EntityId) -> usize {
        let ids: Vec<ContactId> = self.contact_edges.iter(body).map(|(_, e)| e.relation).collect();
        ids.into_iter().filter_map(|id| self.remove_contact(id)).count()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    // -- Lifecycle --

    /// Destroy every joint and contact touching `body`, plus any pending
    /// joints naming it. Returns the other endpoints of removed joints.
    pub fn remove_body(&mut self, body: EntityId) -> Vec<EntityId> {
        let mut others = Vec::new();
        for id in self.joint_ids_of(body) {
            if let Some(joint) = self.remove_joint(id) {
                if let Some(other) = joint.other(body) {
                    if other != body && !others.contains(&other) {
                        others.push(other);
                    }
                }
            }
        }
        self.clear_contacts(body);
        self.drop_pending_for(body);
        others
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: EntityId = EntityId(1);
    const B: EntityId = EntityId(2);
    const C: EntityId = EntityId(3);

    fn contact(a: EntityId, b: EntityId) -> Contact {
        Contact { body_a: a, fixture_a: 0, body_b: b, fixture_b: 0, touching: false }
    }

    #[test]
    fn joint_is_visible_from_both_endpoints() {
        let mut graph = JointGraph::new();
        let id = graph.add_joint(Joint::weld("ab", A, B));
        assert_eq!(graph.joints_of(A).count(), 1);
        assert_eq!(graph.joints_of(B).count(), 1);
        assert_eq!(graph.joints_between(B, A).count(), 1);
        assert_eq!(graph.joints_between(A, C).count(), 0);

        let removed = graph.remove_joint(id).unwrap();
        assert_eq!(removed.id, "ab");
        assert_eq!(graph.joints_of(A).count(), 0);
        assert_eq!(graph.joints_of(B).count(), 0);
        assert!(graph.remove_joint(id).is_none());
    }

    #[test]
    fn joints_keep_link_order() {
        let mut graph = JointGraph::new();
        graph.add_joint(Joint::weld("first", A, B));
        graph.add_joint(Joint::weld("second", C, A));
        graph.add_joint(Joint::weld("third", A, C));
        let names: Vec<_> = graph.joints_of(A).map(|(_, j)| j.id.clone()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn remove_body_unlinks_other_endpoints() {
        let mut graph = JointGraph::new();
        graph.add_joint(Joint::weld("ab", A, B));
        graph.add_joint(Joint::weld("ac", A, C));
        graph.add_joint(Joint::weld("bc", B, C));
        graph.add_contact(contact(A, B));
        graph.add_contact(contact(B, C));
        graph.defer_joint(Joint::weld("ad", A, EntityId(4)));

        let mut others = graph.remove_body(A);
        others.sort();
        assert_eq!(others, vec![B, C]);
        assert_eq!(graph.joint_count(), 1);
        assert_eq!(graph.joints_of(B).count(), 1);
        assert_eq!(graph.contact_count(), 1);
        assert_eq!(graph.contacts_of(B).count(), 1);
        assert_eq!(graph.pending_count(), 0);
    }

    #[test]
    fn pending_joints_resolve_when_endpoints_exist() {
        let mut graph = JointGraph::new();
        graph.defer_joint(Joint::weld("ab", A, B));
        graph.defer_joint(Joint::weld("ac", A, C));
        assert_eq!(graph.pending_joints_of(A).count(), 2);

        let ready = graph.take_ready_joints(|id| id == A || id == B);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, "ab");
        assert_eq!(graph.pending_count(), 1);
        assert_eq!(graph.drop_pending_for(C), 1);
    }

    #[test]
    fn contacts_touching_flag() {
        let mut graph = JointGraph::new();
        let id = graph.add_contact(contact(A, B));
        graph.set_contact_touching(id, true);
        assert!(graph.contact(id).unwrap().touching);
        assert_eq!(graph.clear_contacts(B), 1);
        assert_eq!(graph.contacts_of(A).count(), 0);
    }
}
