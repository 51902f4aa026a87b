use std::collections::BTreeMap;

use log::{debug, info, trace, warn};

use cinder_shared::{BitReader, BitWriter, Instant};

use crate::{
    clone::{
        CloneAck, CloneCommand, ReplicationAck, ReplicationCommand, COMMAND_BITS, END,
        MAX_DATA_LEN,
    },
    game_state::{client::ClientData, GameStateMessage, ServerGameStateConfig},
    object_ids::{encode_id_ranges, ObjectIdPool},
    sync::{EntityType, StagedUpdate, SyncEntity, SyncTree},
    world_grid::{sector_of, WorldGrid},
    ClientId, GameStateError, ObjectId,
};

/// What a clone packet contained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloneStats {
    pub creates: usize,
    pub syncs: usize,
    pub removes: usize,
    pub takeovers: usize,
    /// Commands that parsed but were refused
    pub rejected: usize,
}

/// Authoritative state of every networked entity, kept in sync with the
/// clients that own them and replicated to the clients that don't.
///
/// Every method takes `&mut self`; callers sharing the state between the
/// network thread and the game thread wrap it in a lock.
pub struct ServerGameState {
    config: ServerGameStateConfig,
    clients: BTreeMap<ClientId, ClientData>,
    slots: Vec<Option<ClientId>>,
    entities: BTreeMap<ObjectId, SyncEntity>,
    object_ids: ObjectIdPool,
    world_grid: WorldGrid,
    frame: u32,
}

impl ServerGameState {
    pub fn new(config: ServerGameStateConfig) -> Self {
        Self {
            slots: vec![None; config.max_clients],
            world_grid: WorldGrid::new(config.max_clients, config.max_grid_entries),
            config,
            clients: BTreeMap::new(),
            entities: BTreeMap::new(),
            object_ids: ObjectIdPool::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &ServerGameStateConfig {
        &self.config
    }

    /// Server frame the next [`tick`](Self::tick) replicates with.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    // Clients

    /// Assigns the lowest free slot to `client`.
    pub fn connect_client(&mut self, client: ClientId) -> Result<usize, GameStateError> {
        if client == 0 {
            return Err(GameStateError::ReservedClientId { client });
        }
        if self.clients.contains_key(&client) {
            return Err(GameStateError::AlreadyConnected { client });
        }
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(GameStateError::NoFreeSlot { client })?;

        self.slots[slot] = Some(client);
        self.clients.insert(client, ClientData::new(client, slot));
        info!("Client {} connected in slot {}", client, slot);
        Ok(slot)
    }

    pub fn has_client(&self, client: ClientId) -> bool {
        self.clients.contains_key(&client)
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    pub fn client_slot(&self, client: ClientId) -> Option<usize> {
        self.clients.get(&client).map(|data| data.slot)
    }

    /// Object ids leased to or owned by `client`, ascending.
    pub fn client_object_ids(&self, client: ClientId) -> Option<Vec<ObjectId>> {
        self.clients
            .get(&client)
            .map(|data| data.object_ids.iter().copied().collect())
    }

    pub fn player_entity(&self, client: ClientId) -> Option<ObjectId> {
        self.clients.get(&client).and_then(|data| data.player_entity)
    }

    /// Drains the messages queued for `client`, clone acks first.
    pub fn take_outgoing(&mut self, client: ClientId) -> Vec<GameStateMessage> {
        self.clients
            .get_mut(&client)
            .map(ClientData::take_outgoing)
            .unwrap_or_default()
    }

    // Entities

    pub fn entity(&self, object_id: ObjectId) -> Option<&SyncEntity> {
        self.entities.get(&object_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &SyncEntity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn object_id_pool(&self) -> &ObjectIdPool {
        &self.object_ids
    }

    pub fn world_grid(&self) -> &WorldGrid {
        &self.world_grid
    }

    /// Deletes an entity on the server's initiative and tells every client.
    pub fn delete_entity(&mut self, object_id: ObjectId) -> Result<(), GameStateError> {
        if self.remove_entity(object_id, None).is_none() {
            return Err(GameStateError::UnknownEntity { object_id });
        }
        Ok(())
    }

    fn remove_entity(&mut self, object_id: ObjectId, except: Option<ClientId>) -> Option<SyncEntity> {
        let entity = self.entities.remove(&object_id)?;
        self.object_ids.mark_unused(object_id);

        for data in self.clients.values_mut() {
            if data.player_entity == Some(object_id) {
                data.player_entity = None;
            }
            if Some(data.id) != except {
                data.queue(GameStateMessage::CloneRemove { object_id });
            }
        }
        debug!("Removed entity {}", object_id);
        Some(entity)
    }

    // Inbound clone packets

    /// Applies a clone packet from `client`, logging anything refused.
    pub fn handle_clone_packet(&mut self, client: ClientId, data: &[u8]) {
        if let Err(error) = self.try_handle_clone_packet(client, data) {
            warn!("Dropped clone packet from client {}: {}", client, error);
        }
    }

    /// Applies every command of a clone packet in order. Refused commands
    /// are skipped; a truncated packet or unknown command stops processing,
    /// leaving earlier commands applied.
    pub fn try_handle_clone_packet(
        &mut self,
        client: ClientId,
        data: &[u8],
    ) -> Result<CloneStats, GameStateError> {
        if !self.clients.contains_key(&client) {
            return Err(GameStateError::UnknownClient { client });
        }

        let mut stats = CloneStats::default();
        let mut reader = BitReader::new(data);
        while let Some(command) = CloneCommand::read(&mut reader)? {
            match &command {
                CloneCommand::End => break,
                CloneCommand::Create { .. } => stats.creates += 1,
                CloneCommand::Sync { .. } => stats.syncs += 1,
                CloneCommand::Remove { .. } => stats.removes += 1,
                CloneCommand::Takeover { .. } => stats.takeovers += 1,
                CloneCommand::Timestamp { .. } => {}
            }

            if let Err(error) = self.apply_clone_command(client, command) {
                debug!("Refused clone command from client {}: {}", client, error);
                stats.rejected += 1;
            }
        }
        Ok(stats)
    }

    /// Applies one clone command sent by `client`.
    pub fn apply_clone_command(
        &mut self,
        client: ClientId,
        command: CloneCommand,
    ) -> Result<(), GameStateError> {
        if !self.clients.contains_key(&client) {
            return Err(GameStateError::UnknownClient { client });
        }

        match command {
            CloneCommand::Create {
                object_id,
                entity_type,
                frame,
                data,
            } => self.process_clone_create(client, object_id, entity_type, frame, &data),
            CloneCommand::Sync {
                object_id,
                frame,
                data,
            } => self.process_clone_sync(client, object_id, frame, &data),
            CloneCommand::Remove { object_id } => self.process_clone_remove(client, object_id),
            CloneCommand::Takeover {
                client: target,
                object_id,
            } => self.process_clone_takeover(client, target, object_id),
            CloneCommand::Timestamp { new_ts, ack_ts } => {
                if let Some(data) = self.clients.get_mut(&client) {
                    if data.ack_ts.map_or(true, |old| old < ack_ts) {
                        data.ack_ts = Some(ack_ts);
                        data.sync_ts = new_ts;
                    }
                }
                Ok(())
            }
            CloneCommand::End => Ok(()),
        }
    }

    fn ack(&mut self, client: ClientId, ack: CloneAck) {
        if let Some(data) = self.clients.get_mut(&client) {
            data.ack(ack);
        }
    }

    fn slot_of(&self, client: ClientId) -> Result<usize, GameStateError> {
        self.client_slot(client)
            .ok_or(GameStateError::UnknownClient { client })
    }

    fn process_clone_create(
        &mut self,
        client: ClientId,
        object_id: ObjectId,
        entity_type: u8,
        frame: u32,
        data: &[u8],
    ) -> Result<(), GameStateError> {
        if !ObjectIdPool::is_valid(object_id) {
            return Err(GameStateError::InvalidObjectId { object_id });
        }
        let entity_type = EntityType::from_bits(entity_type)
            .ok_or(GameStateError::UnknownEntityType { value: entity_type })?;
        let slot = self.slot_of(client)?;

        if self.entities.contains_key(&object_id) {
            return self.recreate(client, slot, object_id, entity_type, frame, data);
        }

        let mut entity = SyncEntity::new(
            object_id,
            entity_type,
            client,
            frame,
            self.config.max_clients,
        );
        let update = stage_update(entity.tree(), object_id, data)?;

        let sync_ts = self.clients.get(&client).map_or(0, |data| data.sync_ts);
        entity.tree_mut().apply(update, self.frame);
        entity.record_frame(frame, sync_ts);
        entity.ack_creation(slot);
        self.entities.insert(object_id, entity);
        self.object_ids.mark_used(object_id);

        let world_grid = &self.world_grid;
        if let Some(data) = self.clients.get_mut(&client) {
            data.object_ids.insert(object_id);
            if entity_type == EntityType::Player {
                if data.player_entity.is_none() {
                    data.queue(GameStateMessage::WorldGrid(world_grid.full_update()));
                }
                data.player_entity = Some(object_id);
            }
        }

        debug!(
            "Client {} created {:?} entity {}",
            client, entity_type, object_id
        );
        self.ack(client, CloneAck::Create { object_id });
        Ok(())
    }

    /// Create for an id that already exists: a resend from the owner, or a
    /// stale create from a client the entity migrated away from.
    fn recreate(
        &mut self,
        client: ClientId,
        slot: usize,
        object_id: ObjectId,
        entity_type: EntityType,
        frame: u32,
        data: &[u8],
    ) -> Result<(), GameStateError> {
        let server_frame = self.frame;
        let sync_ts = self.clients.get(&client).map_or(0, |data| data.sync_ts);
        let Some(entity) = self.entities.get_mut(&object_id) else {
            return Err(GameStateError::UnknownEntity { object_id });
        };

        if entity.owner() != client {
            entity.ack_creation(slot);
            self.ack(client, CloneAck::Create { object_id });
            return Err(GameStateError::NotOwner { client, object_id });
        }
        if entity.entity_type() != entity_type {
            return Err(GameStateError::IncompatibleSyncTree { object_id });
        }

        let update = stage_update(entity.tree(), object_id, data)?;
        let last_frame = entity.last_frame();
        if frame <= last_frame {
            self.ack(client, CloneAck::Create { object_id });
            return Err(GameStateError::StaleFrame {
                object_id,
                frame,
                last_frame,
            });
        }

        entity.tree_mut().apply(update, server_frame);
        entity.tree_mut().visit(|node| node.reset_acks());
        entity.record_frame(frame, sync_ts);
        self.ack(client, CloneAck::Create { object_id });
        Ok(())
    }

    fn process_clone_sync(
        &mut self,
        client: ClientId,
        object_id: ObjectId,
        frame: u32,
        data: &[u8],
    ) -> Result<(), GameStateError> {
        let server_frame = self.frame;
        let (sync_ts, ack_ts) = self
            .clients
            .get(&client)
            .map_or((0, 0), |data| (data.sync_ts, data.ack_ts.unwrap_or(0)));
        let sync_ack = CloneAck::Sync { object_id, ack_ts };

        let Some(entity) = self.entities.get_mut(&object_id) else {
            return Err(GameStateError::UnknownEntity { object_id });
        };
        if entity.owner() != client {
            self.ack(client, sync_ack);
            return Err(GameStateError::NotOwner { client, object_id });
        }

        let update = stage_update(entity.tree(), object_id, data)?;
        if frame <= entity.last_frame() {
            trace!("Stale frame {} for entity {}", frame, object_id);
            let last_frame = entity.last_frame();
            self.ack(client, sync_ack);
            return Err(GameStateError::StaleFrame {
                object_id,
                frame,
                last_frame,
            });
        }

        entity.tree_mut().apply(update, server_frame);
        entity.record_frame(frame, sync_ts);
        self.ack(client, sync_ack);
        Ok(())
    }

    fn process_clone_remove(
        &mut self,
        client: ClientId,
        object_id: ObjectId,
    ) -> Result<(), GameStateError> {
        let Some(entity) = self.entities.get(&object_id) else {
            self.ack(client, CloneAck::Remove { object_id });
            return Err(GameStateError::UnknownEntity { object_id });
        };
        if entity.owner() != client {
            return Err(GameStateError::NotOwner { client, object_id });
        }

        self.remove_entity(object_id, Some(client));
        self.ack(client, CloneAck::Remove { object_id });
        Ok(())
    }

    /// Ownership moves to `target` (`0` for the sender). The sender must own
    /// the entity or be claiming it for itself.
    fn process_clone_takeover(
        &mut self,
        client: ClientId,
        target: ClientId,
        object_id: ObjectId,
    ) -> Result<(), GameStateError> {
        let target = if target == 0 { client } else { target };
        if !self.clients.contains_key(&target) {
            return Err(GameStateError::UnknownClient { client: target });
        }
        let owner = self
            .entities
            .get(&object_id)
            .map(SyncEntity::owner)
            .ok_or(GameStateError::UnknownEntity { object_id })?;

        if owner != client && target != client {
            return Err(GameStateError::NotOwner { client, object_id });
        }
        if owner != target {
            self.transfer_ownership(object_id, owner, target);
        }
        Ok(())
    }

    fn transfer_ownership(&mut self, object_id: ObjectId, from: ClientId, to: ClientId) {
        if let Some(entity) = self.entities.get_mut(&object_id) {
            entity.set_owner(to);
        }
        if let Some(data) = self.clients.get_mut(&from) {
            data.object_ids.remove(&object_id);
        }
        if let Some(data) = self.clients.get_mut(&to) {
            data.object_ids.insert(object_id);
        }
        info!(
            "Entity {} migrated from client {} to client {}",
            object_id, from, to
        );
    }

    // Replication

    /// Applies a client's acknowledgements of replication commands.
    pub fn handle_clone_acks(&mut self, client: ClientId, data: &[u8]) {
        if let Err(error) = self.try_handle_clone_acks(client, data) {
            warn!("Dropped clone acks from client {}: {}", client, error);
        }
    }

    pub fn try_handle_clone_acks(
        &mut self,
        client: ClientId,
        data: &[u8],
    ) -> Result<(), GameStateError> {
        let slot = self.slot_of(client)?;
        let mut reader = BitReader::new(data);

        while let Some(ack) = ReplicationAck::read(&mut reader)? {
            let object_id = match ack {
                ReplicationAck::Create { object_id, .. }
                | ReplicationAck::Sync { object_id, .. }
                | ReplicationAck::Remove { object_id } => object_id,
            };
            let Some(entity) = self.entities.get_mut(&object_id) else {
                trace!("Ack from client {} for unknown entity {}", client, object_id);
                continue;
            };

            match ack {
                ReplicationAck::Create { frame, .. } => {
                    entity.ack_creation(slot);
                    entity.ack_nodes(slot, frame);
                }
                ReplicationAck::Sync { frame, .. } => {
                    if entity.is_created_for(slot) {
                        entity.ack_nodes(slot, frame);
                    }
                }
                ReplicationAck::Remove { .. } => entity.ack_removal(slot),
            }
        }
        Ok(())
    }

    /// Updates the world grid, queues one or more packed-clones packets per
    /// client and advances the server frame.
    pub fn tick(&mut self, now: &Instant) {
        self.update_world_grid();

        let clients: Vec<(ClientId, usize)> = self
            .clients
            .values()
            .map(|data| (data.id, data.slot))
            .collect();
        for (client, slot) in clients {
            self.replicate_to(client, slot, now);
        }

        self.frame = self.frame.wrapping_add(1);
    }

    fn replicate_to(&mut self, client: ClientId, slot: usize, now: &Instant) {
        let player_position = self
            .player_entity(client)
            .and_then(|object_id| self.entities.get(&object_id))
            .map(SyncEntity::position);
        let frame = self.frame;
        let interval = self.config.sync_interval;
        let cull_distance = self.config.cull_distance;
        let max_packet_bytes = self.config.max_clone_packet_bytes;

        let mut packets = Vec::new();
        let mut writer = BitWriter::new();
        let (mut creates, mut syncs, mut removes) = (0, 0, 0);

        for entity in self.entities.values_mut() {
            if entity.owner() == client {
                continue;
            }

            let relevant = entity.entity_type() == EntityType::Player
                || player_position.map_or(false, |position| {
                    distance(position, entity.position()) <= cull_distance
                });

            if !relevant {
                let resend_removal =
                    entity.is_removing_for(slot) && entity.can_send_to(slot, now, interval);
                if entity.is_created_for(slot) || resend_removal {
                    entity.start_removal(slot);
                    ReplicationCommand::Remove {
                        object_id: entity.object_id(),
                    }
                    .write(&mut writer);
                    entity.mark_sent(slot, now);
                    removes += 1;
                }
            } else if entity.can_send_to(slot, now, interval) {
                let Some(command) = replication_command(entity, slot, frame) else {
                    continue;
                };
                match command {
                    ReplicationCommand::Create { .. } => creates += 1,
                    _ => syncs += 1,
                }
                command.write(&mut writer);
                entity.mark_sent(slot, now);
            }

            if writer.byte_len() > max_packet_bytes {
                packets.push(finish_packet(&mut writer));
            }
        }

        if !writer.is_empty() {
            packets.push(finish_packet(&mut writer));
        }
        if packets.is_empty() {
            return;
        }

        trace!(
            "Frame {} to client {}: {} creates, {} syncs, {} removes",
            frame,
            client,
            creates,
            syncs,
            removes
        );
        if let Some(data) = self.clients.get_mut(&client) {
            for packet in packets {
                data.queue(GameStateMessage::PackedClones {
                    frame,
                    data: packet,
                });
            }
        }
    }

    /// Releases and claims grid sectors around every client's player and
    /// broadcasts each changed entry.
    pub fn update_world_grid(&mut self) {
        let mut updates = Vec::new();
        for data in self.clients.values() {
            let Some(player) = data.player_entity.and_then(|id| self.entities.get(&id)) else {
                continue;
            };
            let (x, y, _) = player.position();
            let radius = self.config.world_grid_radius;
            let origin = self.config.world_grid_origin;
            let size = self.config.world_grid_sector_size;

            let min = (sector_of(x - radius, origin, size), sector_of(y - radius, origin, size));
            let max = (sector_of(x + radius, origin, size), sector_of(y + radius, origin, size));
            updates.extend(self.world_grid.update_client(data.slot, min, max));
        }

        for update in updates {
            self.broadcast(GameStateMessage::WorldGrid(update));
        }
    }

    fn broadcast(&mut self, message: GameStateMessage) {
        for data in self.clients.values_mut() {
            data.queue(message.clone());
        }
    }

    // Object ids

    /// Leases up to `count` object ids to `client` and queues an
    /// `ObjectIds` message listing them.
    pub fn send_object_ids(
        &mut self,
        client: ClientId,
        count: usize,
    ) -> Result<Vec<ObjectId>, GameStateError> {
        if !self.clients.contains_key(&client) {
            return Err(GameStateError::UnknownClient { client });
        }

        let ids = self.object_ids.lease(count);
        if ids.is_empty() {
            warn!("Could not assign object ids to client {}", client);
            return Err(GameStateError::ObjectIdsExhausted { client });
        }
        if ids.len() < count {
            warn!(
                "Client {} asked for {} object ids, only {} left",
                client,
                count,
                ids.len()
            );
        }

        if let Some(data) = self.clients.get_mut(&client) {
            data.object_ids.extend(ids.iter().copied());
            data.queue(GameStateMessage::ObjectIds {
                ranges: encode_id_ranges(&ids),
            });
        }
        Ok(ids)
    }

    /// Steals back the unused ids `client` holds beyond the lease limit,
    /// highest first. Returns the stolen ids.
    pub fn enforce_lease(&mut self, client: ClientId) -> Result<Vec<ObjectId>, GameStateError> {
        let limit = self.config.object_id_lease_limit;
        let object_ids = &mut self.object_ids;
        let data = self
            .clients
            .get_mut(&client)
            .ok_or(GameStateError::UnknownClient { client })?;

        let unused: Vec<ObjectId> = data
            .object_ids
            .iter()
            .copied()
            .filter(|id| !object_ids.is_used(*id))
            .collect();
        if unused.len() <= limit {
            return Ok(Vec::new());
        }

        let stolen = unused[limit..].to_vec();
        for object_id in &stolen {
            data.object_ids.remove(object_id);
            object_ids.steal(*object_id);
        }
        debug!("Stole {} object ids from client {}", stolen.len(), client);
        Ok(stolen)
    }

    // Disconnects

    /// Forgets `client`: frees its grid entries, migrates the entities it
    /// owned to the nearest remaining player (deleting the ones nobody can
    /// take, and its player entities), steals its unused object ids and
    /// clears its acks everywhere.
    pub fn handle_client_drop(&mut self, client: ClientId) -> Result<(), GameStateError> {
        let dropped = self
            .clients
            .remove(&client)
            .ok_or(GameStateError::UnknownClient { client })?;
        self.slots[dropped.slot] = None;
        info!("Client {} dropped, reassigning its entities", client);

        for update in self.world_grid.clear_client(dropped.slot) {
            self.broadcast(GameStateMessage::WorldGrid(update));
        }

        let owned: Vec<ObjectId> = self
            .entities
            .values()
            .filter(|entity| entity.owner() == client)
            .map(SyncEntity::object_id)
            .collect();

        let mut remaining_ids = dropped.object_ids;
        for object_id in owned {
            let Some(entity) = self.entities.get(&object_id) else {
                continue;
            };
            let candidate = if entity.entity_type() == EntityType::Player {
                None
            } else {
                self.nearest_client(entity.position())
            };

            match candidate {
                Some(target) => {
                    remaining_ids.remove(&object_id);
                    self.transfer_ownership(object_id, client, target);
                }
                None => {
                    debug!("No candidate for entity {}, deleting", object_id);
                    self.remove_entity(object_id, None);
                }
            }
        }

        for object_id in remaining_ids {
            if !self.object_ids.is_used(object_id) {
                self.object_ids.steal(object_id);
            }
        }

        for entity in self.entities.values_mut() {
            entity.forget_client(dropped.slot);
        }
        Ok(())
    }

    /// Client whose player entity is closest to `position`; ties go to the
    /// lowest client id.
    fn nearest_client(&self, position: (f32, f32, f32)) -> Option<ClientId> {
        let mut nearest: Option<(f32, ClientId)> = None;
        for data in self.clients.values() {
            let Some(player) = data.player_entity.and_then(|id| self.entities.get(&id)) else {
                continue;
            };
            let player_distance = distance(position, player.position());
            if nearest.map_or(true, |(best, _)| player_distance < best) {
                nearest = Some((player_distance, data.id));
            }
        }
        nearest.map(|(_, client)| client)
    }
}

/// Decodes `data` against `tree` and checks it may be applied.
fn stage_update(
    tree: &SyncTree,
    object_id: ObjectId,
    data: &[u8],
) -> Result<StagedUpdate, GameStateError> {
    let update = tree
        .decode(data)
        .map_err(|_| GameStateError::IncompatibleSyncTree { object_id })?;
    if !tree.can_apply_to_object(&update) {
        return Err(GameStateError::IncompatibleSyncTree { object_id });
    }
    Ok(update)
}

/// Create with the full tree if `slot` has not acked the creation yet,
/// otherwise a sync of the nodes it has not acked. `None` when there is
/// nothing to sync.
fn replication_command(entity: &SyncEntity, slot: usize, frame: u32) -> Option<ReplicationCommand> {
    let mut data = BitWriter::new();
    let created = entity.is_created_for(slot);
    let wrote = entity
        .tree()
        .write(&mut data, |node| !created || !node.is_acked_by(slot));
    if created && !wrote {
        return None;
    }

    let data = data.to_bytes();
    if data.len() > MAX_DATA_LEN {
        warn!(
            "Entity {} state of {} bytes does not fit a clone command",
            entity.object_id(),
            data.len()
        );
        return None;
    }

    let command = if created {
        ReplicationCommand::Sync {
            object_id: entity.object_id(),
            owner: entity.owner(),
            frame,
            data,
        }
    } else {
        ReplicationCommand::Create {
            object_id: entity.object_id(),
            owner: entity.owner(),
            entity_type: entity.entity_type(),
            frame,
            data,
        }
    };
    Some(command)
}

fn finish_packet(writer: &mut BitWriter) -> Vec<u8> {
    writer.write(COMMAND_BITS, u64::from(END));
    std::mem::take(writer).to_bytes()
}

fn distance(a: (f32, f32, f32), b: (f32, f32, f32)) -> f32 {
    let (dx, dy, dz) = (a.0 - b.0, a.1 - b.1, a.2 - b.2);
    (dx * dx + dy * dy + dz * dz).sqrt()
}
