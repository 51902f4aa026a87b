use std::{collections::HashMap, time::Duration};

use crate::{AckBits, Instant, PeerId};

/// Per-target progress of an outbound event.
pub(crate) struct PerTargetData {
    pub ack_bits: AckBits,
    pub last_send: Option<Instant>,
    pub delay_next_send: Option<Instant>,
    pub last_bit: usize,
}

impl PerTargetData {
    pub fn new(total_packets: usize) -> Self {
        Self {
            ack_bits: AckBits::new(total_packets),
            last_send: None,
            delay_next_send: None,
            last_bit: 0,
        }
    }

    /// Whether the pacing gate allows a send at `now`.
    pub fn can_send(&self, latency: Duration, now: &Instant) -> bool {
        let paced = match self.last_send {
            Some(last_send) => now.is_after(&last_send.plus(latency)),
            None => true,
        };
        paced && !self.is_delayed(now)
    }

    pub fn is_delayed(&self, now: &Instant) -> bool {
        match self.delay_next_send {
            Some(delay_next_send) => !now.is_after(&delay_next_send),
            None => false,
        }
    }
}

/// Outbound event: the encoded application payload plus one ack bitset per
/// target still owed fragments.
pub(crate) struct SendEvent {
    pub payload: Vec<u8>,
    pub bytes_per_second: u32,
    pub total_packets: u32,
    pub targets: HashMap<PeerId, PerTargetData>,
}

impl SendEvent {
    pub fn new(
        payload: Vec<u8>,
        bytes_per_second: u32,
        total_packets: u32,
        targets: impl IntoIterator<Item = PeerId>,
    ) -> Self {
        let targets = targets
            .into_iter()
            .map(|target| (target, PerTargetData::new(total_packets as usize)))
            .collect();

        Self {
            payload,
            bytes_per_second,
            total_packets,
            targets,
        }
    }

    /// Interval between two fragments to the same target, truncated to whole
    /// milliseconds.
    pub fn latency(&self, fragment_size: usize) -> Duration {
        let packets_per_second = f64::from(self.bytes_per_second) / fragment_size as f64;
        Duration::from_millis((1000.0 / packets_per_second) as u64)
    }
}

/// Byte range of fragment `packet_idx` within `payload`.
pub(crate) fn fragment_of(payload: &[u8], packet_idx: usize, fragment_size: usize) -> &[u8] {
    let start = (packet_idx * fragment_size).min(payload.len());
    let end = (start + fragment_size).min(payload.len());
    &payload[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rate_paces_at_forty_millis() {
        let event = SendEvent::new(vec![0; 2500], 25_000, 3, [5]);
        assert_eq!(event.latency(1023), Duration::from_millis(40));
    }

    #[test]
    fn last_fragment_is_short() {
        let payload: Vec<u8> = (0..=255).cycle().take(2500).collect();
        assert_eq!(fragment_of(&payload, 0, 1023).len(), 1023);
        assert_eq!(fragment_of(&payload, 2, 1023).len(), 2500 - 2046);
        assert_eq!(fragment_of(&payload, 2, 1023)[0], payload[2046]);
        assert!(fragment_of(&payload, 3, 1023).is_empty());
    }

    #[test]
    fn pacing_gate() {
        let start = Instant::now();
        let mut data = PerTargetData::new(3);
        assert!(data.can_send(Duration::from_millis(40), &start));

        data.last_send = Some(start);
        assert!(!data.can_send(Duration::from_millis(40), &start.plus(Duration::from_millis(40))));
        assert!(data.can_send(Duration::from_millis(40), &start.plus(Duration::from_millis(41))));

        data.delay_next_send = Some(start.plus(Duration::from_millis(250)));
        assert!(!data.can_send(Duration::from_millis(40), &start.plus(Duration::from_millis(250))));
        assert!(data.can_send(Duration::from_millis(40), &start.plus(Duration::from_millis(251))));
    }
}
