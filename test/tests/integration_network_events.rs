use std::{cell::RefCell, rc::Rc, sync::Arc, thread};

use cinder_resources::{EventHandler, EventQueue, ScriptRef};
use cinder_shared::{EventTarget, Instant, ReassemblyConfig};
use cinder_test::{init_logging, test_manager, TestPeer};

#[test]
fn test_network_events_reach_script_handlers() {
    init_logging();
    let (manager, factory) = test_manager(&[("chat", "")]);
    manager.start_resource("chat").unwrap();
    assert_eq!(factory.loaded(), vec!["chat/main.lua"]);

    let received = Rc::new(RefCell::new(Vec::new()));
    let recorder = received.clone();
    manager
        .get_resource("chat")
        .unwrap()
        .environment()
        .unwrap()
        .add_event_handler(
            "chatMessage",
            EventHandler::native(move |event| {
                recorder.borrow_mut().push((
                    event.source().to_string(),
                    String::from_utf8_lossy(event.payload()).to_string(),
                ));
            }),
        );

    let server = TestPeer::new(0, ReassemblyConfig::default(), Arc::new(manager.event_queue()));
    let client = TestPeer::new(7, ReassemblyConfig::default(), Arc::new(EventQueue::new()));
    server.connect(&client);

    let now = Instant::now();
    client
        .engine
        .trigger_event(EventTarget::Peer(0), "chatMessage", b"hello", 0)
        .unwrap();
    client.engine.network_tick(&now);
    assert_eq!(client.deliver_to(&server, &now, |_| true), 1);

    // dispatch waits for the next manager tick
    assert!(received.borrow().is_empty());
    manager.tick(&now);
    assert_eq!(
        *received.borrow(),
        vec![("net:7".to_string(), "hello".to_string())]
    );
}

#[test]
fn test_events_received_on_another_thread_dispatch_on_tick() {
    let (manager, _) = test_manager(&[("chat", "")]);
    manager.start_resource("chat").unwrap();

    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    manager
        .get_resource("chat")
        .unwrap()
        .environment()
        .unwrap()
        .add_event_handler(
            "ping",
            EventHandler::native(move |_| *counter.borrow_mut() += 1),
        );

    let queue = manager.event_queue();
    thread::spawn(move || {
        let client = TestPeer::new(3, ReassemblyConfig::default(), Arc::new(EventQueue::new()));
        let remote = TestPeer::new(0, ReassemblyConfig::default(), Arc::new(queue));
        client.connect(&remote);

        let now = Instant::now();
        for _ in 0..5 {
            client.engine.trigger_event(EventTarget::Peer(0), "ping", &[], 0);
        }
        client.engine.network_tick(&now);
        client.deliver_to(&remote, &now, |_| true);
    })
    .join()
    .unwrap();

    manager.tick(&Instant::now());
    assert_eq!(*count.borrow(), 5);
}

#[test]
fn test_exports_are_callable_between_resources() {
    let (manager, _) = test_manager(&[
        ("scores", "export 'getScore'\n"),
        ("race", "dependency 'scores'\n"),
    ]);
    manager.start_resource_with_dependencies("race").unwrap();

    let environment = manager.get_resource("scores").unwrap().environment().unwrap();
    let runtime = environment.runtimes()[0].clone();
    environment.register_export("getScore", ScriptRef::new(runtime, 1));

    assert_eq!(
        manager.call_export("scores", "getScore", b"42").unwrap(),
        b"scores:42"
    );

    // stopping the dependency takes its dependant down too
    let stopped = manager.stop_resource("scores").unwrap();
    assert!(stopped.contains(&"race".to_string()));
    assert!(manager.call_export("scores", "getScore", b"42").is_err());
}
