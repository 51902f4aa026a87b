//! # Cinder Serde
//! Bit-addressable reading and writing over byte buffers, independent of byte
//! alignment. Every cinder wire format is encoded through these types.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_counter;
mod bit_reader;
mod bit_writer;
mod error;

pub use bit_counter::BitCounter;
pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
