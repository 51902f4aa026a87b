//! Fixtures shared by the cross-crate integration tests: an in-memory
//! datagram link between reassembly engines, a scripted runtime for the
//! resource manager and clone packet builders for the game state.

pub mod helpers;

pub use helpers::*;
