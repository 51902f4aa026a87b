use thiserror::Error;

/// Errors that can occur while reading from a [`BitReader`](crate::BitReader)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Not enough bits left in the buffer to satisfy a read
    #[error("Attempted to read {requested} bits with only {remaining} bits remaining in the buffer")]
    Underflow {
        requested: usize,
        remaining: usize,
    },

    /// Destination slice cannot hold the requested bit range
    #[error("Destination of {capacity} bytes cannot hold {requested} bits")]
    DestinationTooSmall {
        requested: usize,
        capacity: usize,
    },

    /// Integer width outside of the supported 1..=64 range
    #[error("Unsupported integer width of {bits} bits (supported: 1-64)")]
    UnsupportedWidth {
        bits: u32,
    },
}
