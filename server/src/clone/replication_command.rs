use cinder_shared::{BitReader, BitWriter};

use crate::{
    clone::{
        read_command, read_data, read_object_id, write_data, write_object_id, CLIENT_ID_BITS,
        COMMAND_BITS, CREATE, END, REMOVE, SYNC,
    },
    sync::EntityType,
    ClientId, GameStateError, ObjectId,
};

/// A command of an outbound packed-clones packet, replicating an entity to a
/// client that does not own it. `frame` is the server frame the client
/// acknowledges with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplicationCommand {
    Create {
        object_id: ObjectId,
        owner: ClientId,
        entity_type: EntityType,
        frame: u32,
        data: Vec<u8>,
    },
    Sync {
        object_id: ObjectId,
        owner: ClientId,
        frame: u32,
        data: Vec<u8>,
    },
    Remove {
        object_id: ObjectId,
    },
    End,
}

impl ReplicationCommand {
    pub fn read(reader: &mut BitReader) -> Result<Option<Self>, GameStateError> {
        let Some(command) = read_command(reader)? else {
            return Ok(None);
        };

        let parsed = match command {
            CREATE => {
                let object_id = read_object_id(reader)?;
                let owner = reader.read_u16(CLIENT_ID_BITS)?;
                let value = reader.read_u8(EntityType::BITS)?;
                let entity_type = EntityType::from_bits(value)
                    .ok_or(GameStateError::UnknownEntityType { value })?;
                ReplicationCommand::Create {
                    object_id,
                    owner,
                    entity_type,
                    frame: reader.read_u32(32)?,
                    data: read_data(reader)?,
                }
            }
            SYNC => ReplicationCommand::Sync {
                object_id: read_object_id(reader)?,
                owner: reader.read_u16(CLIENT_ID_BITS)?,
                frame: reader.read_u32(32)?,
                data: read_data(reader)?,
            },
            REMOVE => ReplicationCommand::Remove {
                object_id: read_object_id(reader)?,
            },
            END => ReplicationCommand::End,
            command => return Err(GameStateError::UnknownCloneCommand { command }),
        };
        Ok(Some(parsed))
    }

    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            ReplicationCommand::Create {
                object_id,
                owner,
                entity_type,
                frame,
                data,
            } => {
                writer.write(COMMAND_BITS, u64::from(CREATE));
                write_object_id(writer, *object_id);
                writer.write(CLIENT_ID_BITS, u64::from(*owner));
                writer.write(EntityType::BITS, u64::from(entity_type.to_bits()));
                writer.write(32, u64::from(*frame));
                write_data(writer, data);
            }
            ReplicationCommand::Sync {
                object_id,
                owner,
                frame,
                data,
            } => {
                writer.write(COMMAND_BITS, u64::from(SYNC));
                write_object_id(writer, *object_id);
                writer.write(CLIENT_ID_BITS, u64::from(*owner));
                writer.write(32, u64::from(*frame));
                write_data(writer, data);
            }
            ReplicationCommand::Remove { object_id } => {
                writer.write(COMMAND_BITS, u64::from(REMOVE));
                write_object_id(writer, *object_id);
            }
            ReplicationCommand::End => writer.write(COMMAND_BITS, u64::from(END)),
        }
    }

    /// Reads every command of a packet up to its end marker.
    pub fn read_all(bytes: &[u8]) -> Result<Vec<Self>, GameStateError> {
        let mut reader = BitReader::new(bytes);
        let mut commands = Vec::new();
        while let Some(command) = Self::read(&mut reader)? {
            if command == ReplicationCommand::End {
                break;
            }
            commands.push(command);
        }
        Ok(commands)
    }
}
