use crate::{object_ids::decode_id_ranges, world_grid::WorldGridUpdate, ObjectId};

/// A message the game state wants delivered to one client. Collected with
/// [`ServerGameState::take_outgoing`](crate::ServerGameState::take_outgoing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStateMessage {
    /// Acks for the client's own clone commands, readable with
    /// [`CloneAck::read_all`](crate::clone::CloneAck::read_all)
    CloneAcks(Vec<u8>),
    /// Replication of entities owned by other clients, readable with
    /// [`ReplicationCommand::read_all`](crate::clone::ReplicationCommand::read_all)
    PackedClones { frame: u32, data: Vec<u8> },
    /// Entity deleted by its owner or by the server
    CloneRemove { object_id: ObjectId },
    /// Newly leased ids as `(gap, run)` pairs
    ObjectIds { ranges: Vec<(u16, u16)> },
    WorldGrid(WorldGridUpdate),
}

impl GameStateMessage {
    /// Ids of an `ObjectIds` message, empty for every other message.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        match self {
            GameStateMessage::ObjectIds { ranges } => decode_id_ranges(ranges),
            _ => Vec::new(),
        }
    }
}
