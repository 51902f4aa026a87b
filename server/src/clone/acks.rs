use cinder_shared::{BitReader, BitWriter};

use crate::{
    clone::{read_command, read_object_id, write_object_id, COMMAND_BITS, CREATE, END, REMOVE, SYNC},
    GameStateError, ObjectId,
};

/// Server's acknowledgement of a clone command from the owning client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloneAck {
    Create { object_id: ObjectId },
    /// Echoes the client's latest acknowledged timestamp
    Sync { object_id: ObjectId, ack_ts: u32 },
    Remove { object_id: ObjectId },
}

impl CloneAck {
    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            CloneAck::Create { object_id } => {
                writer.write(COMMAND_BITS, u64::from(CREATE));
                write_object_id(writer, *object_id);
            }
            CloneAck::Sync { object_id, ack_ts } => {
                writer.write(COMMAND_BITS, u64::from(SYNC));
                write_object_id(writer, *object_id);
                writer.write(32, u64::from(*ack_ts));
            }
            CloneAck::Remove { object_id } => {
                writer.write(COMMAND_BITS, u64::from(REMOVE));
                write_object_id(writer, *object_id);
            }
        }
    }

    /// Reads every ack of a `CloneAcks` packet.
    pub fn read_all(bytes: &[u8]) -> Result<Vec<Self>, GameStateError> {
        let mut reader = BitReader::new(bytes);
        let mut acks = Vec::new();
        while let Some(command) = read_command(&mut reader)? {
            let ack = match command {
                CREATE => CloneAck::Create {
                    object_id: read_object_id(&mut reader)?,
                },
                SYNC => CloneAck::Sync {
                    object_id: read_object_id(&mut reader)?,
                    ack_ts: reader.read_u32(32)?,
                },
                REMOVE => CloneAck::Remove {
                    object_id: read_object_id(&mut reader)?,
                },
                END => break,
                command => return Err(GameStateError::UnknownCloneCommand { command }),
            };
            acks.push(ack);
        }
        Ok(acks)
    }
}

/// A client's acknowledgement of a replication command. Create and sync
/// acks carry the server frame of the acknowledged command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicationAck {
    Create { object_id: ObjectId, frame: u32 },
    Sync { object_id: ObjectId, frame: u32 },
    Remove { object_id: ObjectId },
}

impl ReplicationAck {
    pub fn read(reader: &mut BitReader) -> Result<Option<Self>, GameStateError> {
        let Some(command) = read_command(reader)? else {
            return Ok(None);
        };

        let ack = match command {
            CREATE => ReplicationAck::Create {
                object_id: read_object_id(reader)?,
                frame: reader.read_u32(32)?,
            },
            SYNC => ReplicationAck::Sync {
                object_id: read_object_id(reader)?,
                frame: reader.read_u32(32)?,
            },
            REMOVE => ReplicationAck::Remove {
                object_id: read_object_id(reader)?,
            },
            END => return Ok(None),
            command => return Err(GameStateError::UnknownCloneCommand { command }),
        };
        Ok(Some(ack))
    }

    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            ReplicationAck::Create { object_id, frame } => {
                writer.write(COMMAND_BITS, u64::from(CREATE));
                write_object_id(writer, *object_id);
                writer.write(32, u64::from(*frame));
            }
            ReplicationAck::Sync { object_id, frame } => {
                writer.write(COMMAND_BITS, u64::from(SYNC));
                write_object_id(writer, *object_id);
                writer.write(32, u64::from(*frame));
            }
            ReplicationAck::Remove { object_id } => {
                writer.write(COMMAND_BITS, u64::from(REMOVE));
                write_object_id(writer, *object_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_acks_stop_at_end_marker() {
        let mut writer = BitWriter::new();
        CloneAck::Create { object_id: 5 }.write(&mut writer);
        CloneAck::Sync {
            object_id: 6,
            ack_ts: 1000,
        }
        .write(&mut writer);
        writer.write(COMMAND_BITS, u64::from(END));
        CloneAck::Remove { object_id: 7 }.write(&mut writer);

        assert_eq!(
            CloneAck::read_all(&writer.to_bytes()).unwrap(),
            vec![
                CloneAck::Create { object_id: 5 },
                CloneAck::Sync {
                    object_id: 6,
                    ack_ts: 1000
                },
            ]
        );
    }

    #[test]
    fn replication_ack_end() {
        let mut writer = BitWriter::new();
        ReplicationAck::Remove { object_id: 1 }.write(&mut writer);
        writer.write(COMMAND_BITS, u64::from(END));
        let bytes = writer.to_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            ReplicationAck::read(&mut reader).unwrap(),
            Some(ReplicationAck::Remove { object_id: 1 })
        );
        assert_eq!(ReplicationAck::read(&mut reader).unwrap(), None);
    }
}
