// Event fragment framing

/// Bit width of the fragment index and fragment count fields.
/// 17 bits allow up to 131071 fragments per event.
pub const PACKET_SIZE_BITS: u32 = 17;

/// Bit width of the fragment payload length field.
pub const FRAGMENT_SIZE_BITS: u32 = 10;

/// Payload bytes carried by every fragment except possibly the last one.
pub const FRAGMENT_SIZE: usize = 1023;

/// Pacing rate applied when a caller passes a non-positive bytes-per-second.
pub const DEFAULT_BYTES_PER_SECOND: u32 = 25_000;

/// Conservative size of a serialized fragment: header plus a maximal payload.
pub const UNPARSE_BUFFER_SIZE: usize = 1536;

/// The application event name is length-prefixed with this many bits.
pub(crate) const EVENT_NAME_LENGTH_BITS: u32 = 16;
