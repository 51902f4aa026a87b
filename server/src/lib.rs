//! # Cinder Server
//! Server-authoritative state of networked entities. Clients own the
//! entities they create and stream clone commands for them; the server
//! validates and stores each update, acknowledges it, and replicates the
//! entity to every other client it is relevant to. Also manages the world
//! grid, object id leasing and ownership migration when a client drops.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod clone;
pub mod sync;

mod error;
mod game_state;
mod object_ids;
mod world_grid;

pub use error::GameStateError;
pub use game_state::{CloneStats, GameStateMessage, ServerGameState, ServerGameStateConfig};
pub use object_ids::{decode_id_ranges, encode_id_ranges, ObjectIdPool, OBJECT_ID_SPACE};
pub use world_grid::{sector_of, WorldGrid, WorldGridEntry, WorldGridUpdate, WORLD_GRID_SIZE};

/// Network id of a connected client. `0` is reserved.
pub type ClientId = u16;

/// Id of a networked entity, unique across the server.
pub type ObjectId = u16;
