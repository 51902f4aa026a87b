use cinder_shared::{BitReader, BitWriter};

use crate::{
    clone::{
        read_command, read_data, read_object_id, write_data, write_object_id, CLIENT_ID_BITS,
        COMMAND_BITS, CREATE, END, REMOVE, SYNC, TAKEOVER, TIMESTAMP,
    },
    sync::EntityType,
    ClientId, GameStateError, ObjectId,
};

/// A command of an inbound clone packet, sent by the client owning the
/// entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloneCommand {
    Create {
        object_id: ObjectId,
        entity_type: u8,
        frame: u32,
        data: Vec<u8>,
    },
    Sync {
        object_id: ObjectId,
        frame: u32,
        data: Vec<u8>,
    },
    Remove {
        object_id: ObjectId,
    },
    /// Moves ownership to `client`; `0` names the sender
    Takeover {
        client: ClientId,
        object_id: ObjectId,
    },
    /// `ack_ts` only moves forward; sync acks echo it
    Timestamp {
        new_ts: u32,
        ack_ts: u32,
    },
    End,
}

impl CloneCommand {
    /// Reads the next command, or `None` at the end of the buffer.
    pub fn read(reader: &mut BitReader) -> Result<Option<Self>, GameStateError> {
        let Some(command) = read_command(reader)? else {
            return Ok(None);
        };

        let parsed = match command {
            CREATE => CloneCommand::Create {
                object_id: read_object_id(reader)?,
                entity_type: reader.read_u8(EntityType::BITS)?,
                frame: reader.read_u32(32)?,
                data: read_data(reader)?,
            },
            SYNC => CloneCommand::Sync {
                object_id: read_object_id(reader)?,
                frame: reader.read_u32(32)?,
                data: read_data(reader)?,
            },
            REMOVE => CloneCommand::Remove {
                object_id: read_object_id(reader)?,
            },
            TAKEOVER => CloneCommand::Takeover {
                client: reader.read_u16(CLIENT_ID_BITS)?,
                object_id: read_object_id(reader)?,
            },
            TIMESTAMP => CloneCommand::Timestamp {
                new_ts: reader.read_u32(32)?,
                ack_ts: reader.read_u32(32)?,
            },
            END => CloneCommand::End,
            command => return Err(GameStateError::UnknownCloneCommand { command }),
        };
        Ok(Some(parsed))
    }

    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            CloneCommand::Create {
                object_id,
                entity_type,
                frame,
                data,
            } => {
                writer.write(COMMAND_BITS, u64::from(CREATE));
                write_object_id(writer, *object_id);
                writer.write(EntityType::BITS, u64::from(*entity_type));
                writer.write(32, u64::from(*frame));
                write_data(writer, data);
            }
            CloneCommand::Sync {
                object_id,
                frame,
                data,
            } => {
                writer.write(COMMAND_BITS, u64::from(SYNC));
                write_object_id(writer, *object_id);
                writer.write(32, u64::from(*frame));
                write_data(writer, data);
            }
            CloneCommand::Remove { object_id } => {
                writer.write(COMMAND_BITS, u64::from(REMOVE));
                write_object_id(writer, *object_id);
            }
            CloneCommand::Takeover { client, object_id } => {
                writer.write(COMMAND_BITS, u64::from(TAKEOVER));
                writer.write(CLIENT_ID_BITS, u64::from(*client));
                write_object_id(writer, *object_id);
            }
            CloneCommand::Timestamp { new_ts, ack_ts } => {
                writer.write(COMMAND_BITS, u64::from(TIMESTAMP));
                writer.write(32, u64::from(*new_ts));
                writer.write(32, u64::from(*ack_ts));
            }
            CloneCommand::End => writer.write(COMMAND_BITS, u64::from(END)),
        }
    }
}
