//! Pending entity registry.
//!
//! One registry exists per unit of work and holds the entities awaiting
//! insertion. Membership is keyed by identity token, so re-adding an object
//! any number of times leaves exactly one entry.

use std::collections::HashMap;
use writeset_core::{EntityHandle, EntityToken};

/// The deduplicated set of entities queued for insertion.
///
/// Iteration order is insertion order; nothing in the write path relies on
/// that order for correctness — cross-reference ordering is handled by
/// deferred updates, not by sorting this queue.
#[derive(Debug, Default)]
pub struct PendingInserts {
    /// Queued entities by identity token.
    entities: HashMap<EntityToken, EntityHandle>,
    /// Insertion order of the tokens in `entities`.
    order: Vec<EntityToken>,
}

impl PendingInserts {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an entity for insertion.
    ///
    /// Idempotent: re-adding an already-queued entity has no observable
    /// effect beyond its single membership.
    pub fn add(&mut self, entity: EntityHandle) {
        let token = entity.token();
        if self.entities.contains_key(&token) {
            tracing::trace!(?token, "entity already queued for insert");
            return;
        }
        tracing::trace!(?token, entity_type = entity.entity_type(), "queueing entity for insert");
        self.entities.insert(token, entity);
        self.order.push(token);
    }

    /// Whether an entity is queued.
    pub fn contains(&self, token: EntityToken) -> bool {
        self.entities.contains_key(&token)
    }

    /// The distinct queued entities, in insertion order.
    pub fn list(&self) -> Vec<EntityHandle> {
        self.order
            .iter()
            .filter_map(|token| self.entities.get(token).cloned())
            .collect()
    }

    /// Remove an entity from the queue.
    ///
    /// Returns `true` if the entity was present and removed; `false` leaves
    /// the registry untouched.
    pub fn remove(&mut self, token: EntityToken) -> bool {
        if self.entities.remove(&token).is_some() {
            self.order.retain(|t| *t != token);
            tracing::trace!(?token, "removed entity from insert queue");
            return true;
        }
        false
    }

    /// Number of queued entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop all queued entities.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
    }
}
