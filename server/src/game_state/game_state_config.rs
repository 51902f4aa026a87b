use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the [`ServerGameState`](crate::ServerGameState)
#[derive(Clone, Debug)]
pub struct ServerGameStateConfig {
    /// Number of client slots. Bounds every per-client bitset.
    pub max_clients: usize,
    /// Entities further than this from a client's player are not replicated
    /// to that client. Players are always replicated.
    pub cull_distance: f32,
    /// Unused leased object ids a client may hold before the excess is
    /// stolen back by `enforce_lease`
    pub object_id_lease_limit: usize,
    /// Minimum time between two replication packets about the same entity
    /// to the same client
    pub sync_interval: Duration,
    /// Distance around a player within which its client claims grid sectors
    pub world_grid_radius: f32,
    /// Edge length of a grid sector, in world units
    pub world_grid_sector_size: f32,
    /// Offset added to world coordinates so the grid starts at zero
    pub world_grid_origin: f32,
    /// Grid entries per client
    pub max_grid_entries: usize,
    /// Packed-clones payload size above which a packet is flushed
    pub max_clone_packet_bytes: usize,
}

impl Default for ServerGameStateConfig {
    fn default() -> Self {
        Self {
            max_clients: 128,
            cull_distance: 424.0,
            object_id_lease_limit: 64,
            sync_interval: Duration::from_millis(50),
            world_grid_radius: 149.0,
            world_grid_sector_size: 75.0,
            world_grid_origin: 8192.0,
            max_grid_entries: 32,
            max_clone_packet_bytes: 1100,
        }
    }
}
