pub mod clone_packets;
pub mod link;
pub mod logging;
pub mod test_runtime;

pub use clone_packets::{ack_packet, replicated, tree_data, ClonePacket};
pub use link::{TestLink, TestPeer};
pub use logging::init_logging;
pub use test_runtime::{test_manager, TestRuntime, TestRuntimeFactory};
