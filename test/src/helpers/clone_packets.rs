use cinder_server::{
    clone::{CloneCommand, ReplicationAck, ReplicationCommand},
    sync::{node_kinds, EntityType, NodeData},
    GameStateMessage, ObjectId,
};
use cinder_shared::BitWriter;

/// Encodes a sync tree update for `entity_type` carrying `values`; nodes
/// without a value are marked absent.
pub fn tree_data(entity_type: EntityType, values: &[NodeData]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for kind in node_kinds(entity_type) {
        match values.iter().find(|data| data.kind() == *kind) {
            Some(data) => {
                writer.write(1, 1);
                data.write(&mut writer);
            }
            None => writer.write(1, 0),
        }
    }
    writer.to_bytes()
}

/// Builds an inbound clone packet the way a client would.
#[derive(Default)]
pub struct ClonePacket {
    writer: BitWriter,
}

impl ClonePacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        mut self,
        object_id: ObjectId,
        entity_type: EntityType,
        frame: u32,
        values: &[NodeData],
    ) -> Self {
        CloneCommand::Create {
            object_id,
            entity_type: entity_type.to_bits(),
            frame,
            data: tree_data(entity_type, values),
        }
        .write(&mut self.writer);
        self
    }

    pub fn sync(
        mut self,
        object_id: ObjectId,
        entity_type: EntityType,
        frame: u32,
        values: &[NodeData],
    ) -> Self {
        CloneCommand::Sync {
            object_id,
            frame,
            data: tree_data(entity_type, values),
        }
        .write(&mut self.writer);
        self
    }

    pub fn remove(mut self, object_id: ObjectId) -> Self {
        CloneCommand::Remove { object_id }.write(&mut self.writer);
        self
    }

    pub fn timestamp(mut self, new_ts: u32, ack_ts: u32) -> Self {
        CloneCommand::Timestamp { new_ts, ack_ts }.write(&mut self.writer);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        CloneCommand::End.write(&mut self.writer);
        self.writer.to_bytes()
    }
}

/// Every replication command in the packed-clones messages of `messages`.
pub fn replicated(messages: &[GameStateMessage]) -> Vec<ReplicationCommand> {
    messages
        .iter()
        .filter_map(|message| match message {
            GameStateMessage::PackedClones { data, .. } => ReplicationCommand::read_all(data).ok(),
            _ => None,
        })
        .flatten()
        .collect()
}

/// A terminated packet of replication acks.
pub fn ack_packet(acks: &[ReplicationAck]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for ack in acks {
        ack.write(&mut writer);
    }
    CloneCommand::End.write(&mut writer);
    writer.to_bytes()
}
