use log::trace;

/// Sectors per axis.
pub const WORLD_GRID_SIZE: usize = 256;

/// One claimed sector. `slot` is `None` while the entry is free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldGridEntry {
    pub sector_x: u8,
    pub sector_y: u8,
    pub slot: Option<u8>,
}

/// A change to the replicated grid: `entries` replace the entries starting
/// at the flat index `base` (client slot times entries per client, plus
/// the entry's position).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldGridUpdate {
    pub base: u16,
    pub entries: Vec<WorldGridEntry>,
}

/// Which client slot is responsible for which sector of the world.
///
/// Each client owns up to `entries_per_client` sectors around its player.
/// `owners` indexes the same data by sector.
#[derive(Clone, Debug)]
pub struct WorldGrid {
    entries_per_client: usize,
    entries: Vec<WorldGridEntry>,
    owners: Vec<Option<u8>>,
}

impl WorldGrid {
    pub fn new(max_clients: usize, entries_per_client: usize) -> Self {
        Self {
            entries_per_client,
            entries: vec![WorldGridEntry::default(); max_clients * entries_per_client],
            owners: vec![None; WORLD_GRID_SIZE * WORLD_GRID_SIZE],
        }
    }

    pub fn entries_per_client(&self) -> usize {
        self.entries_per_client
    }

    /// Entries of the client in `slot`.
    pub fn client_entries(&self, slot: usize) -> &[WorldGridEntry] {
        let start = slot * self.entries_per_client;
        self.entries
            .get(start..start + self.entries_per_client)
            .unwrap_or(&[])
    }

    pub fn owner(&self, sector_x: usize, sector_y: usize) -> Option<u8> {
        self.owners
            .get(sector_x * WORLD_GRID_SIZE + sector_y)
            .copied()
            .flatten()
    }

    /// The whole grid, sent to a client when its player first appears.
    pub fn full_update(&self) -> WorldGridUpdate {
        WorldGridUpdate {
            base: 0,
            entries: self.entries.clone(),
        }
    }

    /// Releases the entries of `slot` outside `min..=max` (with one sector of
    /// slack) and claims unowned sectors inside it. Returns one update per
    /// changed entry.
    pub fn update_client(
        &mut self,
        slot: usize,
        min: (usize, usize),
        max: (usize, usize),
    ) -> Vec<WorldGridUpdate> {
        let mut updates = Vec::new();
        let Ok(slot_id) = u8::try_from(slot) else {
            return updates;
        };
        let start = slot * self.entries_per_client;
        let range = start..start + self.entries_per_client;
        if range.end > self.entries.len() {
            return updates;
        }

        for index in range.clone() {
            let entry = self.entries[index];
            if entry.slot.is_none() {
                continue;
            }
            let x = usize::from(entry.sector_x);
            let y = usize::from(entry.sector_y);
            let outside = x + 1 < min.0 || x >= max.0 + 1 || y + 1 < min.1 || y >= max.1 + 1;
            if outside {
                self.owners[x * WORLD_GRID_SIZE + y] = None;
                self.entries[index] = WorldGridEntry::default();
                updates.push(self.entry_update(index));
            }
        }

        let max_x = max.0.min(WORLD_GRID_SIZE - 1);
        let max_y = max.1.min(WORLD_GRID_SIZE - 1);
        for x in min.0..=max_x {
            for y in min.1..=max_y {
                if self.owners[x * WORLD_GRID_SIZE + y].is_some() {
                    continue;
                }
                let Some(index) = range.clone().find(|index| self.entries[*index].slot.is_none())
                else {
                    break;
                };

                trace!("Client slot {} claims sector {},{}", slot, x, y);
                self.entries[index] = WorldGridEntry {
                    sector_x: x as u8,
                    sector_y: y as u8,
                    slot: Some(slot_id),
                };
                self.owners[x * WORLD_GRID_SIZE + y] = Some(slot_id);
                updates.push(self.entry_update(index));
            }
        }
        updates
    }

    /// Frees every entry of `slot`.
    pub fn clear_client(&mut self, slot: usize) -> Vec<WorldGridUpdate> {
        let start = slot * self.entries_per_client;
        let end = (start + self.entries_per_client).min(self.entries.len());
        let mut updates = Vec::new();
        for index in start..end {
            let entry = self.entries[index];
            if entry.slot.is_some() {
                self.owners[usize::from(entry.sector_x) * WORLD_GRID_SIZE + usize::from(entry.sector_y)] =
                    None;
            }
            self.entries[index] = WorldGridEntry::default();
            updates.push(self.entry_update(index));
        }
        updates
    }

    fn entry_update(&self, index: usize) -> WorldGridUpdate {
        WorldGridUpdate {
            base: index as u16,
            entries: vec![self.entries[index]],
        }
    }
}

/// Sector index along one axis for world coordinate `coordinate`, after
/// shifting by `origin` and clamping to the grid.
pub fn sector_of(coordinate: f32, origin: f32, sector_size: f32) -> usize {
    let shifted = (coordinate + origin).max(0.0) / sector_size;
    (shifted as usize).min(WORLD_GRID_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_free_sectors_up_to_capacity() {
        let mut grid = WorldGrid::new(2, 4);
        let updates = grid.update_client(0, (10, 10), (12, 12));

        // nine sectors in range, four entries available
        assert_eq!(updates.len(), 4);
        assert_eq!(grid.owner(10, 10), Some(0));
        assert_eq!(grid.owner(10, 13), None);
        assert!(grid.client_entries(0).iter().all(|entry| entry.slot == Some(0)));
    }

    #[test]
    fn owned_sectors_are_not_claimed_twice() {
        let mut grid = WorldGrid::new(2, 4);
        grid.update_client(0, (10, 10), (10, 11));
        let updates = grid.update_client(1, (10, 10), (11, 11));

        assert_eq!(updates.len(), 2);
        assert_eq!(grid.owner(10, 11), Some(0));
        assert_eq!(grid.owner(11, 11), Some(1));
        assert_eq!(updates[0].base, 4);
    }

    #[test]
    fn far_sectors_are_released() {
        let mut grid = WorldGrid::new(1, 2);
        grid.update_client(0, (10, 10), (10, 10));
        assert_eq!(grid.owner(10, 10), Some(0));

        // one sector of slack keeps the entry
        assert!(grid.update_client(0, (11, 10), (11, 10)).len() == 1);
        assert_eq!(grid.owner(10, 10), Some(0));

        let updates = grid.update_client(0, (20, 20), (20, 20));
        assert_eq!(grid.owner(10, 10), None);
        assert_eq!(grid.owner(11, 10), None);
        assert_eq!(grid.owner(20, 20), Some(0));
        assert_eq!(updates.len(), 3);
    }

    #[test]
    fn clear_client_frees_everything() {
        let mut grid = WorldGrid::new(1, 2);
        grid.update_client(0, (0, 0), (0, 1));
        let updates = grid.clear_client(0);

        assert_eq!(updates.len(), 2);
        assert_eq!(grid.owner(0, 0), None);
        assert_eq!(grid.full_update().entries, vec![WorldGridEntry::default(); 2]);
    }

    #[test]
    fn sectors_clamp_to_grid() {
        assert_eq!(sector_of(-10_000.0, 8192.0, 75.0), 0);
        assert_eq!(sector_of(0.0, 8192.0, 75.0), 109);
        assert_eq!(sector_of(50_000.0, 8192.0, 75.0), WORLD_GRID_SIZE - 1);
    }
}
