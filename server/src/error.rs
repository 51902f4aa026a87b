use thiserror::Error;

use cinder_shared::SerdeErr;

use crate::{ClientId, ObjectId};

/// Reasons a clone packet, clone command or client operation is refused.
/// Errors caused by network input are logged by the game state and never
/// echoed back to the peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    /// Packet ended in the middle of a command
    #[error("Malformed clone packet: {0}")]
    Malformed(#[from] SerdeErr),

    /// Command type not understood; the rest of the packet is discarded
    #[error("Unknown clone command {command}")]
    UnknownCloneCommand {
        command: u8,
    },

    #[error("Client {client} is not connected")]
    UnknownClient {
        client: ClientId,
    },

    /// Id `0` stands for the sender in takeover commands
    #[error("Client id {client} is reserved")]
    ReservedClientId {
        client: ClientId,
    },

    #[error("Client {client} is already connected")]
    AlreadyConnected {
        client: ClientId,
    },

    /// Every client slot is taken
    #[error("No free slot for client {client}")]
    NoFreeSlot {
        client: ClientId,
    },

    #[error("No object ids left to lease to client {client}")]
    ObjectIdsExhausted {
        client: ClientId,
    },

    #[error("Object id {object_id} is outside the object id space")]
    InvalidObjectId {
        object_id: ObjectId,
    },

    #[error("Unknown entity type {value}")]
    UnknownEntityType {
        value: u8,
    },

    #[error("Entity {object_id} does not exist")]
    UnknownEntity {
        object_id: ObjectId,
    },

    /// Client tried to change an entity another client owns
    #[error("Client {client} does not own entity {object_id}")]
    NotOwner {
        client: ClientId,
        object_id: ObjectId,
    },

    /// Update does not decode against the entity's sync tree, or declares a
    /// different entity type
    #[error("Update for entity {object_id} cannot apply to its sync tree")]
    IncompatibleSyncTree {
        object_id: ObjectId,
    },

    /// Update is not newer than the last one applied
    #[error("Frame {frame} for entity {object_id} is not newer than {last_frame}")]
    StaleFrame {
        object_id: ObjectId,
        frame: u32,
        last_frame: u32,
    },
}
