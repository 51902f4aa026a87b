pub mod config;
pub mod error;
pub mod event_packet;
pub mod event_payload;
pub mod reassembly;
mod receive_event;
mod send_event;
pub mod sink;
