use std::collections::{BTreeSet, VecDeque};

use cinder_shared::BitWriter;

use crate::{clone::CloneAck, game_state::GameStateMessage, ClientId, ObjectId};

/// Per-client state of the game state.
pub(crate) struct ClientData {
    pub id: ClientId,
    pub slot: usize,
    pub player_entity: Option<ObjectId>,
    /// Ids leased to or owned by this client
    pub object_ids: BTreeSet<ObjectId>,
    pub ack_ts: Option<u32>,
    pub sync_ts: u32,
    acks: BitWriter,
    outgoing: VecDeque<GameStateMessage>,
}

impl ClientData {
    pub fn new(id: ClientId, slot: usize) -> Self {
        Self {
            id,
            slot,
            player_entity: None,
            object_ids: BTreeSet::new(),
            ack_ts: None,
            sync_ts: 0,
            acks: BitWriter::new(),
            outgoing: VecDeque::new(),
        }
    }

    pub fn ack(&mut self, ack: CloneAck) {
        ack.write(&mut self.acks);
    }

    pub fn queue(&mut self, message: GameStateMessage) {
        self.outgoing.push_back(message);
    }

    /// Pending acks (as one terminated packet) followed by the queued
    /// messages.
    pub fn take_outgoing(&mut self) -> Vec<GameStateMessage> {
        let mut messages = Vec::with_capacity(self.outgoing.len() + 1);
        if !self.acks.is_empty() {
            let mut acks = std::mem::take(&mut self.acks);
            acks.write(crate::clone::COMMAND_BITS, u64::from(crate::clone::END));
            messages.push(GameStateMessage::CloneAcks(acks.to_bytes()));
        }
        messages.extend(self.outgoing.drain(..));
        messages
    }
}
