use cinder_serde::{BitReader, BitWriter};

use crate::{constants::EVENT_NAME_LENGTH_BITS, ReassemblyError};

/// An application-level event as carried inside the fragment stream:
/// ```text
/// nameLength : 16
/// name       : nameLength bytes
/// payload    : remaining bytes
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

impl ApplicationEvent {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Size of the encoded event without building it.
    pub fn encoded_len(name: &str, payload: &[u8]) -> usize {
        2 + name.len() + payload.len()
    }

    pub fn encode(name: &str, payload: &[u8]) -> Result<Vec<u8>, ReassemblyError> {
        if name.len() > u16::MAX as usize {
            return Err(ReassemblyError::NameTooLong { length: name.len() });
        }

        let mut writer = BitWriter::with_capacity(Self::encoded_len(name, payload));
        writer.write(EVENT_NAME_LENGTH_BITS, name.len() as u64);
        writer.write_bytes(name.as_bytes());
        writer.write_bytes(payload);
        Ok(writer.to_bytes())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ReassemblyError> {
        let mut reader = BitReader::new(bytes);
        let name_length = reader.read(EVENT_NAME_LENGTH_BITS)? as usize;
        let name_bytes = reader
            .read_bytes(name_length)
            .map_err(|_| ReassemblyError::PayloadDecode {
                reason: "name length exceeds payload",
            })?;
        let name = String::from_utf8(name_bytes).map_err(|_| ReassemblyError::PayloadDecode {
            reason: "event name is not valid UTF-8",
        })?;

        let offset = reader.bit_position() / 8;
        Ok(Self {
            name,
            payload: bytes[offset..].to_vec(),
        })
    }
}
