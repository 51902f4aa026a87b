use crate::PeerId;

/// Transport side of the reassembly engine.
///
/// `send_packet` is an unreliable datagram send: the engine retransmits until
/// acknowledged and never assumes delivery or ordering.
pub trait EventReassemblySink: Send + Sync {
    fn send_packet(&self, target: PeerId, data: &[u8]);

    /// Return `true` to drop a fully reassembled event from `source`, e.g. when
    /// the peer exceeds an event rate limit.
    fn limit_event(&self, _source: PeerId) -> bool {
        false
    }
}

/// Receiver of fully reassembled events, usually the resource manager's event
/// queue. Called from the networking thread.
pub trait EventDispatch: Send + Sync {
    fn queue_event(&self, event_name: &str, payload: Vec<u8>, source: String);
}
