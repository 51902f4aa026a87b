use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use cinder_shared::{
    EventDispatch, EventReassembly, EventReassemblySink, Instant, PeerId, ReassemblyConfig,
};

/// Datagrams an engine has handed to its transport, in send order.
#[derive(Default)]
pub struct TestLink {
    datagrams: Mutex<VecDeque<(PeerId, Vec<u8>)>>,
}

impl TestLink {
    pub fn take(&self) -> Vec<(PeerId, Vec<u8>)> {
        self.datagrams.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.datagrams.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datagrams.lock().is_empty()
    }
}

impl EventReassemblySink for TestLink {
    fn send_packet(&self, target: PeerId, data: &[u8]) {
        self.datagrams.lock().push_back((target, data.to_vec()));
    }
}

/// One end of an in-memory connection.
pub struct TestPeer {
    pub id: PeerId,
    pub engine: EventReassembly,
    pub link: Arc<TestLink>,
}

impl TestPeer {
    pub fn new(id: PeerId, config: ReassemblyConfig, dispatch: Arc<dyn EventDispatch>) -> Self {
        let link = Arc::new(TestLink::default());
        let engine = EventReassembly::new(config, link.clone(), dispatch);
        Self { id, engine, link }
    }

    /// Registers both peers as each other's targets.
    pub fn connect(&self, other: &TestPeer) {
        self.engine.register_target(other.id);
        other.engine.register_target(self.id);
    }

    /// Hands every datagram this peer sent to `other` over to it, dropping
    /// the ones `keep` rejects. Datagrams addressed to anybody else are
    /// discarded. Returns the number delivered.
    pub fn deliver_to(
        &self,
        other: &TestPeer,
        now: &Instant,
        mut keep: impl FnMut(&[u8]) -> bool,
    ) -> usize {
        let mut delivered = 0;
        for (target, data) in self.link.take() {
            if target != other.id || !keep(&data) {
                continue;
            }
            other.engine.handle_packet(self.id, &data, now);
            delivered += 1;
        }
        delivered
    }
}
