use std::sync::Arc;

use proptest::prelude::*;

use cinder_resources::EventQueue;
use cinder_shared::{ApplicationEvent, EventPacket, Instant, ReassemblyConfig};
use cinder_test::TestPeer;

fn fragments(event_id: u64, name: &str, payload: &[u8], config: &ReassemblyConfig) -> Vec<Vec<u8>> {
    let encoded = ApplicationEvent::encode(name, payload).unwrap();
    let chunks: Vec<&[u8]> = encoded.chunks(config.fragment_size()).collect();
    let total = chunks.len() as u32;
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            EventPacket::fragment(event_id, index as u32, total, chunk).to_bytes(config)
        })
        .collect()
}

proptest! {
    /// Fragments arriving in any order, with duplicates, yield the event
    /// exactly once.
    #[test]
    fn prop_fragments_reassemble_in_any_order(
        payload in prop::collection::vec(any::<u8>(), 0..6000),
        order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle(),
        duplicate in 0..8usize,
    ) {
        let config = ReassemblyConfig::default();
        let events = EventQueue::new();
        let receiver = TestPeer::new(0, config.clone(), Arc::new(events.clone()));
        receiver.engine.register_target(1);

        let packets = fragments(4, "blob", &payload, &config);
        let now = Instant::now();
        let mut delivery: Vec<usize> = order.into_iter().filter(|index| *index < packets.len()).collect();
        delivery.insert(duplicate % (delivery.len() + 1), duplicate % packets.len());
        for index in delivery {
            receiver.engine.handle_packet(1, &packets[index], &now);
        }

        let delivered = events.drain();
        prop_assert_eq!(delivered.len(), 1);
        prop_assert_eq!(&delivered[0].event_name, "blob");
        prop_assert_eq!(&delivered[0].payload, &payload);
        prop_assert_eq!(receiver.link.len(), packets.len() + 1);
    }
}
