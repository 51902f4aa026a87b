//! Wire formats of the clone protocol.
//!
//! Every packet is a sequence of commands, each starting with a 3-bit
//! command type, terminated by [`END`] or by the end of the buffer.

mod acks;
mod clone_command;
mod replication_command;

pub use acks::{CloneAck, ReplicationAck};
pub use clone_command::CloneCommand;
pub use replication_command::ReplicationCommand;

use cinder_shared::{BitReader, BitWriter, SerdeErr};

use crate::ObjectId;

pub const COMMAND_BITS: u32 = 3;
pub const OBJECT_ID_BITS: u32 = 13;
pub const CLIENT_ID_BITS: u32 = 16;
pub const LENGTH_BITS: u32 = 12;
/// Largest sync tree payload a command can carry.
pub const MAX_DATA_LEN: usize = (1 << LENGTH_BITS) - 1;

pub const CREATE: u8 = 1;
pub const SYNC: u8 = 2;
pub const REMOVE: u8 = 3;
pub const TAKEOVER: u8 = 4;
pub const TIMESTAMP: u8 = 5;
pub const END: u8 = 7;

/// Reads a command type, or `None` at the end of the buffer.
pub(crate) fn read_command(reader: &mut BitReader) -> Result<Option<u8>, SerdeErr> {
    if reader.remaining_bits() < COMMAND_BITS as usize {
        return Ok(None);
    }
    reader.read_u8(COMMAND_BITS).map(Some)
}

pub(crate) fn read_object_id(reader: &mut BitReader) -> Result<ObjectId, SerdeErr> {
    reader.read_u16(OBJECT_ID_BITS)
}

pub(crate) fn write_object_id(writer: &mut BitWriter, object_id: ObjectId) {
    writer.write(OBJECT_ID_BITS, u64::from(object_id));
}

/// Reads a 12-bit length and that many bytes.
pub(crate) fn read_data(reader: &mut BitReader) -> Result<Vec<u8>, SerdeErr> {
    let len = reader.read_u16(LENGTH_BITS)?;
    reader.read_bytes(usize::from(len))
}

/// Writes a 12-bit length and the bytes, truncated to [`MAX_DATA_LEN`].
pub(crate) fn write_data(writer: &mut BitWriter, data: &[u8]) {
    let len = data.len().min(MAX_DATA_LEN);
    writer.write(LENGTH_BITS, len as u64);
    writer.write_bytes(&data[..len]);
}
