mod entity;
mod entity_type;
mod node;
mod tree;

pub use entity::SyncEntity;
pub use entity_type::EntityType;
pub use node::{NodeData, NodeKind, SyncNode, MAX_OPAQUE_BYTES};
pub use tree::{node_kinds, StagedUpdate, SyncTree};
