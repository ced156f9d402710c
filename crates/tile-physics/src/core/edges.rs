//! Arena-backed edge lists.
//!
//! Every body has a doubly linked list of edges, one per relation (joint or
//! contact) it takes part in. A relation between A and B owns two edges, one
//! in each list, so either endpoint can unlink it in O(1).

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::api::types::EntityId;

slotmap::new_key_type! {
    /// Stable handle to one edge record.
    pub struct EdgeId;
}

/// One side of a relation, stored in the list of `owner`.
#[derive(Debug, Clone)]
pub struct Edge<K> {
    /// Body whose list holds this edge.
    pub owner: EntityId,
    /// Body at the other end of the relation.
    pub other: EntityId,
    /// The relation this edge belongs to.
    pub relation: K,
    prev: Option<EdgeId>,
    next: Option<EdgeId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct EdgeList {
    head: Option<EdgeId>,
    tail: Option<EdgeId>,
    len: usize,
}

/// Edge storage shared by all bodies.
#[derive(Debug)]
pub struct EdgeArena<K> {
    edges: SlotMap<EdgeId, Edge<K>>,
    lists: HashMap<EntityId, EdgeList>,
}

impl<K: Copy> EdgeArena<K> {
    pub fn new() -> Self {
        Self {
            edges: SlotMap::with_key(),
            lists: HashMap::new(),
        }
    }

    /// Append an edge to the end of `owner`'s list.
    pub fn push(&mut self, owner: EntityId, other: EntityId, relation: K) -> EdgeId {
        let list = self.lists.entry(owner).or_default();
        let id = self.edges.insert(Edge {
            owner,
            other,
            relation,
            prev: list.tail,
            next: None,
        });
        match list.tail {
            Some(tail) => {
                if let Some(tail_edge) = self.edges.get_mut(tail) {
                    tail_edge.next = Some(id);
                }
            }
            None => list.head = Some(id),
        }
        list.tail = Some(id);
        list.len += 1;
        id
    }

    /// Remove an edge from its owner's list. `None` if already gone.
    pub fn unlink(&mut self, id: EdgeId) -> Option<Edge<K>> {
        let edge = self.edges.remove(id)?;

        if let Some(prev) = edge.prev {
            if let Some(p) = self.edges.get_mut(prev) {
                p.next = edge.next;
            }
        }
        if let Some(next) = edge.next {
            if let Some(n) = self.edges.get_mut(next) {
                n.prev = edge.prev;
            }
        }

        let mut emptied = false;
        if let Some(list) = self.lists.get_mut(&edge.owner) {
            if list.head == Some(id) {
                list.head = edge.next;
            }
            if list.tail == Some(id) {
                list.tail = edge.prev;
            }
            list.len -= 1;
            emptied = list.len == 0;
        }
        if emptied {
            self.lists.remove(&edge.owner);
        }

        Some(edge)
    }

    /// Edges owned by `owner`, in insertion order.
    pub fn iter(&self, owner: EntityId) -> EdgeIter<'_, K> {
        EdgeIter {
            edges: &self.edges,
            cursor: self.lists.get(&owner).and_then(|l| l.head),
        }
    }
}

impl<K: Copy> Default for EdgeArena<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks one owner's list from head to tail.
pub struct EdgeIter<'a, K> {
    edges: &'a SlotMap<EdgeId, Edge<K>>,
    cursor: Option<EdgeId>,
}

impl<'a, K> Iterator for EdgeIter<'a, K> {
    type Item = (EdgeId, &'a Edge<K>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let edge = self.edges.get(id)?;
        self.cursor = edge.next;
        Some((id, edge))
    }
}
