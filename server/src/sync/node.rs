use cinder_shared::{AckBits, BitReader, BitWriter, SerdeErr};

/// Kind of a sync tree node. Determines the node's field layout on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Creation,
    Position,
    Velocity,
    Health,
    Script,
    Opaque,
    PlayerState,
}

/// Longest opaque node payload, bounded by its 10-bit length field.
pub const MAX_OPAQUE_BYTES: usize = (1 << 10) - 1;

/// Field values of one node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Creation { entity_type: u8, model_hash: u32 },
    Position { x: f32, y: f32, z: f32 },
    /// Components in eighths of a unit per second
    Velocity { x: i16, y: i16, z: i16 },
    Health { health: u16, max_health: u16 },
    Script { script_hash: Option<u32> },
    /// Type-specific state the server stores without interpreting
    Opaque { bytes: Vec<u8> },
    PlayerState { player_id: u16 },
}

impl NodeKind {
    /// Reads this kind's fields.
    pub fn read(self, reader: &mut BitReader) -> Result<NodeData, SerdeErr> {
        let data = match self {
            NodeKind::Creation => NodeData::Creation {
                entity_type: reader.read_u8(4)?,
                model_hash: reader.read_u32(32)?,
            },
            NodeKind::Position => NodeData::Position {
                x: f32::from_bits(reader.read_u32(32)?),
                y: f32::from_bits(reader.read_u32(32)?),
                z: f32::from_bits(reader.read_u32(32)?),
            },
            NodeKind::Velocity => NodeData::Velocity {
                x: reader.read_u16(16)? as i16,
                y: reader.read_u16(16)? as i16,
                z: reader.read_u16(16)? as i16,
            },
            NodeKind::Health => NodeData::Health {
                health: reader.read_u16(16)?,
                max_health: reader.read_u16(16)?,
            },
            NodeKind::Script => {
                let script_hash = if reader.read_bit()? {
                    Some(reader.read_u32(32)?)
                } else {
                    None
                };
                NodeData::Script { script_hash }
            }
            NodeKind::Opaque => {
                let len = reader.read_u16(10)?;
                NodeData::Opaque {
                    bytes: reader.read_bytes(usize::from(len))?,
                }
            }
            NodeKind::PlayerState => NodeData::PlayerState {
                player_id: reader.read_u16(16)?,
            },
        };
        Ok(data)
    }
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Creation { .. } => NodeKind::Creation,
            NodeData::Position { .. } => NodeKind::Position,
            NodeData::Velocity { .. } => NodeKind::Velocity,
            NodeData::Health { .. } => NodeKind::Health,
            NodeData::Script { .. } => NodeKind::Script,
            NodeData::Opaque { .. } => NodeKind::Opaque,
            NodeData::PlayerState { .. } => NodeKind::PlayerState,
        }
    }

    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            NodeData::Creation {
                entity_type,
                model_hash,
            } => {
                writer.write(4, u64::from(*entity_type));
                writer.write(32, u64::from(*model_hash));
            }
            NodeData::Position { x, y, z } => {
                for value in [x, y, z] {
                    writer.write(32, u64::from(value.to_bits()));
                }
            }
            NodeData::Velocity { x, y, z } => {
                for value in [x, y, z] {
                    writer.write(16, u64::from(*value as u16));
                }
            }
            NodeData::Health { health, max_health } => {
                writer.write(16, u64::from(*health));
                writer.write(16, u64::from(*max_health));
            }
            NodeData::Script { script_hash } => match script_hash {
                Some(hash) => {
                    writer.write(1, 1);
                    writer.write(32, u64::from(*hash));
                }
                None => writer.write(1, 0),
            },
            NodeData::Opaque { bytes } => {
                let len = bytes.len().min(MAX_OPAQUE_BYTES);
                writer.write(10, len as u64);
                writer.write_bytes(&bytes[..len]);
            }
            NodeData::PlayerState { player_id } => {
                writer.write(16, u64::from(*player_id));
            }
        }
    }
}

/// One node of an entity's sync tree: its current data and which clients
/// have acknowledged it.
#[derive(Clone, Debug)]
pub struct SyncNode {
    kind: NodeKind,
    data: Option<NodeData>,
    changed_frame: u32,
    acked: AckBits,
}

impl SyncNode {
    pub fn new(kind: NodeKind, max_clients: usize) -> Self {
        Self {
            kind,
            data: None,
            changed_frame: 0,
            acked: AckBits::new(max_clients),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn data(&self) -> Option<&NodeData> {
        self.data.as_ref()
    }

    /// Server frame at which the data last changed.
    pub fn changed_frame(&self) -> u32 {
        self.changed_frame
    }

    /// Stores new data. Acks are reset only if the data actually changed.
    pub fn set_data(&mut self, data: NodeData, frame: u32) {
        if self.data.as_ref() == Some(&data) {
            return;
        }
        self.data = Some(data);
        self.changed_frame = frame;
        self.acked.clear();
    }

    pub fn is_acked_by(&self, slot: usize) -> bool {
        self.acked.get(slot)
    }

    /// Marks the node acked by `slot` if the acked frame covers its last
    /// change.
    pub fn ack(&mut self, slot: usize, frame: u32) {
        if self.changed_frame <= frame {
            self.acked.set(slot);
        }
    }

    pub fn reset_ack(&mut self, slot: usize) {
        self.acked.unset(slot);
    }

    pub fn reset_acks(&mut self) {
        self.acked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(data: NodeData) -> NodeData {
        let mut writer = BitWriter::new();
        data.write(&mut writer);
        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);
        data.kind().read(&mut reader).unwrap()
    }

    #[test]
    fn signed_velocity_survives() {
        let data = NodeData::Velocity { x: -8, y: 0, z: i16::MIN };
        assert_eq!(round_trip(data.clone()), data);
    }

    #[test]
    fn script_node_without_script() {
        let data = NodeData::Script { script_hash: None };
        let mut writer = BitWriter::new();
        data.write(&mut writer);
        assert_eq!(writer.bits_written(), 1);
        assert_eq!(round_trip(data.clone()), data);
    }

    #[test]
    fn truncated_node_is_malformed() {
        let mut reader = BitReader::new(&[0xFF, 0xFF]);
        assert!(NodeKind::Position.read(&mut reader).is_err());
    }

    #[test]
    fn acks_follow_changes() {
        let mut node = SyncNode::new(NodeKind::Health, 4);
        node.set_data(
            NodeData::Health {
                health: 200,
                max_health: 200,
            },
            3,
        );

        node.ack(1, 2);
        assert!(!node.is_acked_by(1));
        node.ack(1, 3);
        assert!(node.is_acked_by(1));

        // same data again keeps the ack
        node.set_data(
            NodeData::Health {
                health: 200,
                max_health: 200,
            },
            4,
        );
        assert!(node.is_acked_by(1));
        assert_eq!(node.changed_frame(), 3);

        node.set_data(
            NodeData::Health {
                health: 150,
                max_health: 200,
            },
            5,
        );
        assert!(!node.is_acked_by(1));
    }
}
