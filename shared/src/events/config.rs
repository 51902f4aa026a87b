use std::{default::Default, time::Duration};

use crate::constants::{
    DEFAULT_BYTES_PER_SECOND, FRAGMENT_SIZE, FRAGMENT_SIZE_BITS, PACKET_SIZE_BITS,
};

/// Contains Config properties which will be used by the
/// [`EventReassembly`](crate::EventReassembly) engine
#[derive(Clone, Debug)]
pub struct ReassemblyConfig {
    /// Bit width of the fragment index / fragment count fields
    pub packet_size_bits: u32,
    /// Bit width of the fragment payload length field
    pub fragment_size_bits: u32,
    /// Payload bytes per fragment
    pub fragment_size: usize,
    /// Pacing rate used when a caller passes a non-positive rate
    pub default_bytes_per_second: u32,
    /// Pause applied to a target after a full round-robin pass over its
    /// unacknowledged fragments
    pub burst_delay: Duration,
    /// How long a completed inbound event is remembered so late duplicates are
    /// re-acknowledged instead of dispatched again
    pub completed_retention: Duration,
    /// Evict incomplete inbound events that received no fragment for this
    /// long. `None` keeps them until the peer is unregistered.
    pub stalled_receive_timeout: Option<Duration>,
    /// Limit of concurrently incomplete inbound events per peer, used by
    /// `register_target`. `None` is unlimited.
    pub default_max_pending_events: Option<u8>,
}

impl ReassemblyConfig {
    /// Payload bytes per fragment, clamped to what the length field can carry.
    pub fn fragment_size(&self) -> usize {
        let representable = (1usize << self.fragment_size_bits) - 1;
        self.fragment_size.clamp(1, representable)
    }

    /// Largest fragment count the count field can carry.
    pub fn max_fragments(&self) -> usize {
        (1usize << self.packet_size_bits) - 1
    }

    /// Hard ceiling on an encoded application event.
    pub fn max_packet_size(&self) -> usize {
        (1usize << self.packet_size_bits) * self.fragment_size()
    }

    /// Number of fragments needed to carry `payload_len` bytes.
    pub fn fragment_count(&self, payload_len: usize) -> usize {
        payload_len.div_ceil(self.fragment_size())
    }
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            packet_size_bits: PACKET_SIZE_BITS,
            fragment_size_bits: FRAGMENT_SIZE_BITS,
            fragment_size: FRAGMENT_SIZE,
            default_bytes_per_second: DEFAULT_BYTES_PER_SECOND,
            burst_delay: Duration::from_millis(250),
            completed_retention: Duration::from_secs(120),
            stalled_receive_timeout: None,
            default_max_pending_events: None,
        }
    }
}
