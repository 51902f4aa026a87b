use std::collections::BTreeMap;

use crate::{AckBits, Instant};

/// Inbound event being reassembled from one peer.
///
/// Fragments are kept in a sparse map until the last one arrives; no buffer
/// for the whole event is allocated up front. Once complete, the fragment map
/// is released and the event stays behind as a tombstone so retransmissions
/// are re-acknowledged rather than dispatched twice.
pub(crate) struct ReceiveEvent {
    pub received: AckBits,
    pub fragments: BTreeMap<u32, Vec<u8>>,
    pub completed_at: Option<Instant>,
    pub last_activity: Instant,
}

impl ReceiveEvent {
    pub fn new(total_packets: u32, now: &Instant) -> Self {
        Self {
            received: AckBits::new(total_packets as usize),
            fragments: BTreeMap::new(),
            completed_at: None,
            last_activity: *now,
        }
    }

    pub fn total_packets(&self) -> u32 {
        self.received.len() as u32
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn has_fragment(&self, packet_idx: u32) -> bool {
        self.received.get(packet_idx as usize)
    }

    pub fn has_all(&self) -> bool {
        self.received.is_full()
    }

    /// Stores a fragment. Returns `false` if it was already present.
    pub fn insert(&mut self, packet_idx: u32, payload: Vec<u8>, now: &Instant) -> bool {
        self.last_activity = *now;
        if !self.received.set(packet_idx as usize) {
            return false;
        }
        self.fragments.insert(packet_idx, payload);
        true
    }

    /// Concatenates all fragments in index order, frees them, and marks the
    /// event completed.
    pub fn assemble(&mut self, now: &Instant) -> Vec<u8> {
        let fragments = std::mem::take(&mut self.fragments);
        let size = fragments.values().map(Vec::len).sum();

        let mut payload = Vec::with_capacity(size);
        for fragment in fragments.into_values() {
            payload.extend_from_slice(&fragment);
        }

        self.completed_at = Some(*now);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_of_four_is_not_complete() {
        let now = Instant::now();
        let mut event = ReceiveEvent::new(4, &now);
        assert!(event.insert(2, vec![3], &now));
        assert!(event.insert(0, vec![1], &now));
        assert!(event.insert(1, vec![2], &now));
        assert!(!event.has_all());

        assert!(event.insert(3, vec![4], &now));
        assert!(event.has_all());
        assert_eq!(event.assemble(&now), vec![1, 2, 3, 4]);
        assert!(event.fragments.is_empty());
        assert!(event.is_completed());
    }

    #[test]
    fn duplicate_fragment_is_not_stored_twice() {
        let now = Instant::now();
        let mut event = ReceiveEvent::new(2, &now);
        assert!(event.insert(0, vec![1, 1], &now));
        assert!(!event.insert(0, vec![9, 9], &now));
        assert_eq!(event.fragments.get(&0), Some(&vec![1, 1]));
    }
}
