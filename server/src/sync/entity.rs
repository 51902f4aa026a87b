use std::{collections::HashMap, time::Duration};

use cinder_shared::{AckBits, Instant};

use crate::{
    sync::{EntityType, SyncTree},
    ClientId, ObjectId,
};

/// Server-side state of one networked entity.
#[derive(Clone, Debug)]
pub struct SyncEntity {
    object_id: ObjectId,
    owner: ClientId,
    tree: SyncTree,
    last_frame: u32,
    timestamp: u32,
    acked_creation: AckBits,
    removing: AckBits,
    last_sent: HashMap<usize, Instant>,
}

impl SyncEntity {
    pub(crate) fn new(
        object_id: ObjectId,
        entity_type: EntityType,
        owner: ClientId,
        frame: u32,
        max_clients: usize,
    ) -> Self {
        Self {
            object_id,
            owner,
            tree: SyncTree::new(entity_type, max_clients),
            last_frame: frame,
            timestamp: 0,
            acked_creation: AckBits::new(max_clients),
            removing: AckBits::new(max_clients),
            last_sent: HashMap::new(),
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn entity_type(&self) -> EntityType {
        self.tree.entity_type()
    }

    pub fn owner(&self) -> ClientId {
        self.owner
    }

    pub fn tree(&self) -> &SyncTree {
        &self.tree
    }

    /// Client frame index of the last update applied.
    pub fn last_frame(&self) -> u32 {
        self.last_frame
    }

    /// Owner's sync timestamp at the last applied update.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn position(&self) -> (f32, f32, f32) {
        self.tree.position().unwrap_or((0.0, 0.0, 0.0))
    }

    /// Whether the client in `slot` acknowledged this entity's creation.
    pub fn is_created_for(&self, slot: usize) -> bool {
        self.acked_creation.get(slot)
    }

    /// Whether a clone-remove sent to `slot` awaits its ack.
    pub fn is_removing_for(&self, slot: usize) -> bool {
        self.removing.get(slot)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut SyncTree {
        &mut self.tree
    }

    pub(crate) fn set_owner(&mut self, owner: ClientId) {
        self.owner = owner;
        self.tree.visit(|node| node.reset_acks());
    }

    pub(crate) fn record_frame(&mut self, frame: u32, timestamp: u32) {
        self.last_frame = frame;
        self.timestamp = timestamp;
    }

    pub(crate) fn ack_creation(&mut self, slot: usize) {
        self.acked_creation.set(slot);
        self.removing.unset(slot);
    }

    /// Client in `slot` has the nodes changed up to `frame`.
    pub(crate) fn ack_nodes(&mut self, slot: usize, frame: u32) {
        self.tree.visit(|node| node.ack(slot, frame));
    }

    pub(crate) fn start_removal(&mut self, slot: usize) {
        self.acked_creation.unset(slot);
        self.tree.visit(|node| node.reset_ack(slot));
        self.removing.set(slot);
        self.last_sent.remove(&slot);
    }

    pub(crate) fn ack_removal(&mut self, slot: usize) {
        self.removing.unset(slot);
    }

    /// Forgets everything known about the client in `slot`.
    pub(crate) fn forget_client(&mut self, slot: usize) {
        self.acked_creation.unset(slot);
        self.removing.unset(slot);
        self.tree.visit(|node| node.reset_ack(slot));
        self.last_sent.remove(&slot);
    }

    /// Whether `interval` has passed since the last packet about this
    /// entity went to `slot`.
    pub(crate) fn can_send_to(&self, slot: usize, now: &Instant, interval: Duration) -> bool {
        self.last_sent
            .get(&slot)
            .map_or(true, |last| last.elapsed(now) >= interval)
    }

    pub(crate) fn mark_sent(&mut self, slot: usize, now: &Instant) {
        self.last_sent.insert(slot, *now);
    }
}
