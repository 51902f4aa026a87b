use crate::ReassemblyError;

/// Network id of a remote peer. On clients the server is peer `0`.
pub type PeerId = u32;

/// Monotonic id of an outbound event, unique per sending engine.
pub type EventId = u64;

/// Destination of an outbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// Every peer registered at the time the event is triggered
    Broadcast,
    Peer(PeerId),
}

impl TryFrom<i64> for EventTarget {
    type Error = ReassemblyError;

    /// Negative ids mean "broadcast", matching the `-1` convention of the
    /// scripting API. Ids beyond the peer id range are refused.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Ok(EventTarget::Broadcast);
        }
        PeerId::try_from(value)
            .map(EventTarget::Peer)
            .map_err(|_| ReassemblyError::InvalidTarget { target: value })
    }
}
