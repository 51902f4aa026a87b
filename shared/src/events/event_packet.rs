use cinder_serde::{BitReader, BitWriter, SerdeErr};

use crate::{constants::UNPARSE_BUFFER_SIZE, EventId, ReassemblyConfig};

/// One fragment of an application event, or the acknowledgement of one.
///
/// Wire layout (field widths from [`ReassemblyConfig`]):
/// ```text
/// eventId_low  : 32
/// eventId_high : 32
/// packetIdx    : packet_size_bits
/// totalPackets : packet_size_bits
/// thisBytes    : fragment_size_bits
/// payload      : thisBytes bytes, only when thisBytes > 0
/// ```
/// An acknowledgement carries no payload; its `packet_idx` names the fragment
/// being acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPacket {
    pub event_id: EventId,
    pub packet_idx: u32,
    pub total_packets: u32,
    pub payload: Vec<u8>,
}

impl EventPacket {
    pub fn fragment(event_id: EventId, packet_idx: u32, total_packets: u32, payload: &[u8]) -> Self {
        Self {
            event_id,
            packet_idx,
            total_packets,
            payload: payload.to_vec(),
        }
    }

    pub fn ack(event_id: EventId, packet_idx: u32, total_packets: u32) -> Self {
        Self {
            event_id,
            packet_idx,
            total_packets,
            payload: Vec::new(),
        }
    }

    /// Length of the payload as carried in the `thisBytes` field.
    pub fn this_bytes(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn is_ack(&self) -> bool {
        self.payload.is_empty()
    }

    /// Reads one packet. Fails without yielding partial data if any field
    /// underflows the buffer.
    pub fn parse(reader: &mut BitReader, config: &ReassemblyConfig) -> Result<Self, SerdeErr> {
        let event_id_low = reader.read(32)?;
        let event_id_high = reader.read(32)?;
        let event_id = (event_id_high << 32) | event_id_low;

        let packet_idx = reader.read_u32(config.packet_size_bits)?;
        let total_packets = reader.read_u32(config.packet_size_bits)?;
        let this_bytes = reader.read(config.fragment_size_bits)? as usize;

        let payload = if this_bytes > 0 {
            reader.read_bytes(this_bytes)?
        } else {
            Vec::new()
        };

        Ok(Self {
            event_id,
            packet_idx,
            total_packets,
            payload,
        })
    }

    /// Writes the packet. A payload longer than the length field can express
    /// is truncated to the representable length.
    pub fn unparse(&self, writer: &mut BitWriter, config: &ReassemblyConfig) {
        let max_bytes = (1usize << config.fragment_size_bits) - 1;
        let this_bytes = self.payload.len().min(max_bytes);

        writer.write(32, self.event_id & 0xFFFF_FFFF);
        writer.write(32, self.event_id >> 32);
        writer.write(config.packet_size_bits, u64::from(self.packet_idx));
        writer.write(config.packet_size_bits, u64::from(self.total_packets));
        writer.write(config.fragment_size_bits, this_bytes as u64);

        if this_bytes > 0 {
            writer.write_bytes(&self.payload[..this_bytes]);
        }
    }

    pub fn to_bytes(&self, config: &ReassemblyConfig) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(UNPARSE_BUFFER_SIZE);
        self.unparse(&mut writer, config);
        writer.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_low_half_comes_first() {
        let config = ReassemblyConfig::default();
        let packet = EventPacket::ack(0x0000_0001_0000_0002, 0, 1);
        let bytes = packet.to_bytes(&config);

        assert_eq!(&bytes[..8], &[0, 0, 0, 2, 0, 0, 0, 1]);
    }

    #[test]
    fn ack_has_header_only() {
        let config = ReassemblyConfig::default();
        let packet = EventPacket::ack(7, 3, 4);
        let bytes = packet.to_bytes(&config);

        // 64 + 17 + 17 + 10 bits
        assert_eq!(bytes.len(), 108usize.div_ceil(8));

        let mut reader = BitReader::new(&bytes);
        let parsed = EventPacket::parse(&mut reader, &config).unwrap();
        assert!(parsed.is_ack());
        assert_eq!(parsed.packet_idx, 3);
        assert_eq!(parsed.total_packets, 4);
    }

    #[test]
    fn max_fragment_fits_unparse_buffer() {
        let config = ReassemblyConfig::default();
        let payload = vec![0xA5; 1023];
        let packet = EventPacket::fragment(u64::MAX, 131_070, 131_071, &payload);
        let bytes = packet.to_bytes(&config);

        assert!(bytes.len() <= UNPARSE_BUFFER_SIZE);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(EventPacket::parse(&mut reader, &config), Ok(packet));
    }

    #[test]
    fn truncated_payload_fails_to_parse() {
        let config = ReassemblyConfig::default();
        let packet = EventPacket::fragment(1, 0, 1, &[1, 2, 3, 4]);
        let mut bytes = packet.to_bytes(&config);
        bytes.truncate(bytes.len() - 2);

        let mut reader = BitReader::new(&bytes);
        assert!(EventPacket::parse(&mut reader, &config).is_err());
    }

    #[test]
    fn truncated_header_fails_to_parse() {
        let config = ReassemblyConfig::default();
        let bytes = [0u8; 7];
        let mut reader = BitReader::new(&bytes);
        assert!(matches!(
            EventPacket::parse(&mut reader, &config),
            Err(SerdeErr::Underflow { .. })
        ));
    }
}
