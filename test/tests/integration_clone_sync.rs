use std::{sync::Arc, thread, time::Duration};

use parking_lot::Mutex;

use cinder_server::{
    clone::{ReplicationAck, ReplicationCommand},
    sync::{EntityType, NodeData},
    ServerGameState, ServerGameStateConfig,
};
use cinder_shared::Instant;
use cinder_test::{ack_packet, init_logging, replicated, ClonePacket};

fn at(x: f32, y: f32) -> NodeData {
    NodeData::Position { x, y, z: 0.0 }
}

fn game_state(clients: &[u16]) -> ServerGameState {
    let mut state = ServerGameState::new(ServerGameStateConfig {
        max_clients: 8,
        ..Default::default()
    });
    for client in clients {
        state.connect_client(*client).unwrap();
    }
    state
}

#[test]
fn test_leased_ids_replicate_to_other_players() {
    init_logging();
    let mut state = game_state(&[1, 2]);

    let leased = state.send_object_ids(1, 3).unwrap();
    let player = leased[0];
    let car = leased[1];
    state
        .try_handle_clone_packet(
            1,
            &ClonePacket::new()
                .timestamp(1000, 1)
                .create(player, EntityType::Player, 1, &[at(0.0, 0.0)])
                .create(car, EntityType::Automobile, 1, &[at(20.0, 0.0)])
                .finish(),
        )
        .unwrap();
    state
        .try_handle_clone_packet(
            2,
            &ClonePacket::new()
                .create(100, EntityType::Player, 1, &[at(30.0, 30.0)])
                .finish(),
        )
        .unwrap();
    state.take_outgoing(1);
    state.take_outgoing(2);

    let start = Instant::now();
    state.tick(&start);
    let to_second = replicated(&state.take_outgoing(2));
    let created: Vec<u16> = to_second
        .iter()
        .filter_map(|command| match command {
            ReplicationCommand::Create {
                object_id, owner: 1, ..
            } => Some(*object_id),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec![player, car]);

    state
        .try_handle_clone_acks(
            2,
            &ack_packet(&[
                ReplicationAck::Create {
                    object_id: player,
                    frame: 0,
                },
                ReplicationAck::Create {
                    object_id: car,
                    frame: 0,
                },
            ]),
        )
        .unwrap();

    state.handle_clone_packet(
        1,
        &ClonePacket::new()
            .sync(car, EntityType::Automobile, 2, &[at(25.0, 0.0)])
            .finish(),
    );
    state.tick(&start.plus(Duration::from_millis(100)));
    assert!(matches!(
        replicated(&state.take_outgoing(2)).as_slice(),
        [ReplicationCommand::Sync { object_id, owner: 1, .. }] if *object_id == car
    ));
}

#[test]
fn test_disconnect_hands_vehicles_to_remaining_player() {
    let mut state = game_state(&[1, 2]);
    state.handle_clone_packet(
        1,
        &ClonePacket::new()
            .create(10, EntityType::Player, 1, &[at(0.0, 0.0)])
            .create(11, EntityType::Automobile, 1, &[at(5.0, 0.0)])
            .finish(),
    );
    state.handle_clone_packet(
        2,
        &ClonePacket::new()
            .create(20, EntityType::Player, 1, &[at(40.0, 0.0)])
            .finish(),
    );
    let start = Instant::now();
    state.tick(&start);
    state.take_outgoing(2);

    state.handle_client_drop(1).unwrap();
    assert!(state.entity(10).is_none());
    assert_eq!(state.entity(11).unwrap().owner(), 2);

    // the new owner keeps syncing it, the server stops replicating it back
    state.handle_clone_packet(
        2,
        &ClonePacket::new()
            .sync(11, EntityType::Automobile, 2, &[at(6.0, 0.0)])
            .finish(),
    );
    assert_eq!(state.entity(11).unwrap().position(), (6.0, 0.0, 0.0));
    state.tick(&start.plus(Duration::from_millis(100)));
    assert!(replicated(&state.take_outgoing(2)).is_empty());
}

#[test]
fn test_game_state_is_shared_between_threads() {
    let state = Arc::new(Mutex::new(game_state(&[1, 2, 3, 4])));

    let workers: Vec<_> = (1..=4u16)
        .map(|client| {
            let state = state.clone();
            thread::spawn(move || {
                for index in 0..10u16 {
                    let object_id = client * 100 + index;
                    let packet = ClonePacket::new()
                        .create(object_id, EntityType::Ped, 1, &[at(f32::from(index), 0.0)])
                        .finish();
                    state.lock().handle_clone_packet(client, &packet);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let state = state.lock();
    assert_eq!(state.entity_count(), 40);
    for client in 1..=4u16 {
        assert_eq!(state.client_object_ids(client).unwrap().len(), 10);
    }
}
