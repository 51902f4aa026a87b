//! # Cinder Shared
//! Reliable delivery of application events over an unreliable datagram
//! transport: fragment framing, per-target pacing, acknowledgement tracking and
//! reassembly. Shared between servers and clients.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use cinder_serde::{BitCounter, BitReader, BitWrite, BitWriter, SerdeErr};

mod ack_bits;
mod constants;
mod events;
mod instant;
mod types;

pub use ack_bits::AckBits;
pub use constants::{
    DEFAULT_BYTES_PER_SECOND, FRAGMENT_SIZE, FRAGMENT_SIZE_BITS, PACKET_SIZE_BITS,
    UNPARSE_BUFFER_SIZE,
};
pub use events::{
    config::ReassemblyConfig,
    error::ReassemblyError,
    event_packet::EventPacket,
    event_payload::ApplicationEvent,
    reassembly::EventReassembly,
    sink::{EventDispatch, EventReassemblySink},
};
pub use instant::Instant;
pub use types::{EventId, EventTarget, PeerId};
