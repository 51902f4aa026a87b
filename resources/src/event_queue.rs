use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use cinder_shared::EventDispatch;

/// An event waiting for the next [`ResourceManager::tick`](crate::ResourceManager::tick).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedEvent {
    pub event_name: String,
    pub payload: Vec<u8>,
    pub source: String,
}

/// FIFO of events queued for dispatch.
///
/// Clones share the same queue and may be moved to other threads, which is
/// how network code hands events to the thread driving the manager.
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Arc<Mutex<VecDeque<QueuedEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event_name: &str, payload: Vec<u8>, source: String) {
        self.events.lock().push_back(QueuedEvent {
            event_name: event_name.to_string(),
            payload,
            source,
        });
    }

    /// Removes and returns every event queued so far.
    pub fn drain(&self) -> Vec<QueuedEvent> {
        self.events.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventDispatch for EventQueue {
    fn queue_event(&self, event_name: &str, payload: Vec<u8>, source: String) {
        self.push(event_name, payload, source);
    }
}
