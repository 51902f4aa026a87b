use std::{sync::Arc, time::Duration};

use cinder_resources::EventQueue;
use cinder_shared::{EventTarget, Instant, ReassemblyConfig};
use cinder_test::{init_logging, TestPeer};

fn peers() -> (TestPeer, TestPeer, EventQueue, EventQueue) {
    let server_events = EventQueue::new();
    let client_events = EventQueue::new();
    let server = TestPeer::new(0, ReassemblyConfig::default(), Arc::new(server_events.clone()));
    let client = TestPeer::new(1, ReassemblyConfig::default(), Arc::new(client_events.clone()));
    server.connect(&client);
    (server, client, server_events, client_events)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|index| (index % 251) as u8).collect()
}

#[test]
fn test_event_survives_a_lossy_link() {
    init_logging();
    let (server, client, _, client_events) = peers();
    let data = payload(5000);

    let event_id = server
        .engine
        .trigger_event(EventTarget::Peer(1), "inventory", &data, 100_000)
        .unwrap();

    let mut now = Instant::now();
    let mut sent = 0usize;
    let mut acks = 0usize;
    for _ in 0..400 {
        server.engine.network_tick(&now);
        server.deliver_to(&client, &now, |_| {
            sent += 1;
            sent % 3 != 0
        });
        client.engine.network_tick(&now);
        client.deliver_to(&server, &now, |_| {
            acks += 1;
            acks % 4 != 0
        });

        if !server.engine.has_send_event(event_id) {
            break;
        }
        now.add_millis(50);
    }

    assert!(!server.engine.has_send_event(event_id));
    let delivered = client_events.drain();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].event_name, "inventory");
    assert_eq!(delivered[0].payload, data);
    assert_eq!(delivered[0].source, "net:0");
}

#[test]
fn test_duplicated_datagrams_dispatch_once() {
    let (server, client, _, client_events) = peers();
    let data = payload(3000);
    server
        .engine
        .trigger_event(EventTarget::Peer(1), "map", &data, 1_000_000)
        .unwrap();

    let mut now = Instant::now();
    let mut replay = Vec::new();
    for _ in 0..40 {
        server.engine.network_tick(&now);
        for (target, datagram) in server.link.take() {
            assert_eq!(target, 1);
            client.engine.handle_packet(0, &datagram, &now);
            replay.push(datagram);
        }
        now.add_millis(50);
    }
    for datagram in &replay {
        client.engine.handle_packet(0, datagram, &now);
    }

    assert_eq!(client_events.len(), 1);
    assert_eq!(client_events.drain()[0].payload, data);
    // late duplicates of a completed event are acknowledged again
    assert!(client.link.len() >= replay.len() * 2);
}

#[test]
fn test_broadcast_reaches_every_peer() {
    let server = TestPeer::new(0, ReassemblyConfig::default(), Arc::new(EventQueue::new()));
    let clients: Vec<(TestPeer, EventQueue)> = (1..=3)
        .map(|id| {
            let events = EventQueue::new();
            let peer = TestPeer::new(id, ReassemblyConfig::default(), Arc::new(events.clone()));
            server.connect(&peer);
            (peer, events)
        })
        .collect();

    server
        .engine
        .trigger_event(EventTarget::Broadcast, "weather", b"rain", 0)
        .unwrap();

    let now = Instant::now();
    server.engine.network_tick(&now);
    let datagrams = server.link.take();
    assert_eq!(datagrams.len(), 3);
    for (target, datagram) in datagrams {
        let (peer, _) = &clients[target as usize - 1];
        peer.engine.handle_packet(0, &datagram, &now);
    }

    for (_, events) in &clients {
        let delivered = events.drain();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].payload, b"rain");
    }
}

#[test]
fn test_unregistered_peer_stops_retransmission() {
    let (server, client, _, _) = peers();
    let event_id = server
        .engine
        .trigger_event(EventTarget::Peer(1), "loadout", &payload(4000), 0)
        .unwrap();

    let now = Instant::now();
    server.engine.network_tick(&now);
    assert!(!server.link.is_empty());
    server.link.take();

    assert!(server.engine.unregister_target(client.id));
    assert!(!server.engine.has_send_event(event_id));

    server.engine.network_tick(&now.plus(Duration::from_secs(1)));
    assert!(server.link.is_empty());
}
