use cinder_shared::AckBits;

use crate::{clone::OBJECT_ID_BITS, ObjectId};

/// Size of the object id space. Id `0` is never handed out.
pub const OBJECT_ID_SPACE: usize = 1 << OBJECT_ID_BITS;

/// Server-wide bookkeeping of object ids.
///
/// An id is `sent` once leased to a client and `used` while an entity
/// exists under it. Ids taken back from a client that no longer needs them
/// are `stolen`: they may be leased again even though they were sent.
#[derive(Clone, Debug)]
pub struct ObjectIdPool {
    sent: AckBits,
    used: AckBits,
    stolen: AckBits,
}

impl ObjectIdPool {
    pub fn new() -> Self {
        Self {
            sent: AckBits::new(OBJECT_ID_SPACE),
            used: AckBits::new(OBJECT_ID_SPACE),
            stolen: AckBits::new(OBJECT_ID_SPACE),
        }
    }

    pub fn is_valid(object_id: ObjectId) -> bool {
        object_id != 0 && usize::from(object_id) < OBJECT_ID_SPACE
    }

    pub fn is_sent(&self, object_id: ObjectId) -> bool {
        self.sent.get(usize::from(object_id))
    }

    pub fn is_used(&self, object_id: ObjectId) -> bool {
        self.used.get(usize::from(object_id))
    }

    pub fn is_stolen(&self, object_id: ObjectId) -> bool {
        self.stolen.get(usize::from(object_id))
    }

    fn is_free(&self, index: usize) -> bool {
        !self.used.get(index) && (!self.sent.get(index) || self.stolen.get(index))
    }

    /// Leases up to `count` free or stolen ids, lowest first.
    pub fn lease(&mut self, count: usize) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity(count.min(OBJECT_ID_SPACE));
        for index in 1..OBJECT_ID_SPACE {
            if ids.len() == count {
                break;
            }
            if self.is_free(index) {
                self.sent.set(index);
                self.stolen.unset(index);
                ids.push(index as ObjectId);
            }
        }
        ids
    }

    pub fn mark_used(&mut self, object_id: ObjectId) {
        self.used.set(usize::from(object_id));
    }

    pub fn mark_unused(&mut self, object_id: ObjectId) {
        self.used.unset(usize::from(object_id));
    }

    /// Takes a leased id back so it can be leased again.
    pub fn steal(&mut self, object_id: ObjectId) {
        let index = usize::from(object_id);
        if self.sent.get(index) {
            self.stolen.set(index);
        }
    }

    /// Number of ids that could be leased right now.
    pub fn available(&self) -> usize {
        (1..OBJECT_ID_SPACE)
            .filter(|index| self.is_free(*index))
            .count()
    }
}

impl Default for ObjectIdPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Compresses ascending ids into `(gap, run)` pairs: each pair skips `gap`
/// ids after the previous run, then covers `run + 1` consecutive ids.
pub fn encode_id_ranges(ids: &[ObjectId]) -> Vec<(u16, u16)> {
    let mut pairs = Vec::new();
    let mut last: i32 = -1;
    let mut index = 0;

    while index < ids.len() {
        let gap = i32::from(ids[index]) - 2 - last;
        let mut run = 0u16;
        index += 1;
        while index < ids.len() && ids[index] == ids[index - 1].wrapping_add(1) {
            run += 1;
            index += 1;
        }
        last = i32::from(ids[index - 1]);
        pairs.push((gap.max(0) as u16, run));
    }
    pairs
}

/// Expands pairs produced by [`encode_id_ranges`].
pub fn decode_id_ranges(pairs: &[(u16, u16)]) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    let mut last: i32 = -1;
    for (gap, run) in pairs {
        let first = last + 2 + i32::from(*gap);
        for id in first..=first + i32::from(*run) {
            ids.push(id as ObjectId);
        }
        last = first + i32::from(*run);
    }
    ids
}
