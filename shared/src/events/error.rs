use thiserror::Error;

use cinder_serde::SerdeErr;

use crate::{EventId, PeerId};

/// Reasons an inbound event packet is dropped or an outbound event is not
/// scheduled. These never reach the application layer: the reassembly engine
/// logs them and relies on retransmission to heal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReassemblyError {
    /// Packet could not be parsed (buffer underflow)
    #[error("Malformed event packet: {0}")]
    Malformed(#[from] SerdeErr),

    /// Fragment declared a fragment count of zero
    #[error("Event {event_id} from peer {peer} declares zero fragments")]
    EmptyEvent {
        peer: PeerId,
        event_id: EventId,
    },

    /// Payload or fragment count beyond the configured ceiling
    #[error("Event of {size} exceeds the limit of {limit}")]
    CapacityExceeded {
        size: usize,
        limit: usize,
    },

    /// Fragment index outside the declared fragment count
    #[error("Fragment {packet_idx} is out of range for an event of {total_packets} fragments")]
    FragmentOutOfRange {
        packet_idx: u32,
        total_packets: u32,
    },

    /// Fragment count differs from the one declared by the first fragment seen
    #[error("Event {event_id} from peer {peer} declared {declared} fragments but a fragment claims {received}")]
    FragmentCountMismatch {
        peer: PeerId,
        event_id: EventId,
        declared: u32,
        received: u32,
    },

    /// Fragment carries more bytes than the configured fragment size
    #[error("Fragment of {size} bytes exceeds the fragment size of {limit} bytes")]
    FragmentTooLarge {
        size: usize,
        limit: usize,
    },

    /// Fragment would open a new event for a peer that is not registered
    #[error("Peer {peer} is not a registered target")]
    UnknownSource {
        peer: PeerId,
    },

    /// Scripted target id does not fit a peer id
    #[error("Event target {target} is not a valid peer id")]
    InvalidTarget {
        target: i64,
    },

    /// Peer already has its maximum number of incomplete inbound events
    #[error("Peer {peer} has reached its limit of pending inbound events")]
    PendingLimitReached {
        peer: PeerId,
    },

    /// Transport sink vetoed dispatch of a reassembled event
    #[error("Dispatch of event {event_id} from peer {peer} was limited by the sink")]
    EventLimited {
        peer: PeerId,
        event_id: EventId,
    },

    /// Event name longer than the 16-bit length prefix allows
    #[error("Event name of {length} bytes exceeds the 65535 byte limit")]
    NameTooLong {
        length: usize,
    },

    /// Reassembled payload does not contain a valid name prefix
    #[error("Reassembled event payload is invalid: {reason}")]
    PayloadDecode {
        reason: &'static str,
    },
}
