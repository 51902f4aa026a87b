/// Fixed-size bitset recording which fragments (or peers) have been
/// acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AckBits {
    words: Vec<u64>,
    len: usize,
    set_count: usize,
}

impl AckBits {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
            set_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Sets the bit at `index`. Returns `true` if it was previously unset;
    /// out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) -> bool {
        if index >= self.len || self.get(index) {
            return false;
        }
        self.words[index / 64] |= 1 << (index % 64);
        self.set_count += 1;
        true
    }

    /// Clears the bit at `index`. Returns `true` if it was previously set.
    pub fn unset(&mut self, index: usize) -> bool {
        if !self.get(index) {
            return false;
        }
        self.words[index / 64] &= !(1 << (index % 64));
        self.set_count -= 1;
        true
    }

    pub fn count_ones(&self) -> usize {
        self.set_count
    }

    pub fn is_full(&self) -> bool {
        self.set_count == self.len
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
        self.set_count = 0;
    }

    /// Indices of the set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|index| self.get(*index))
    }

    /// First unset index in `start..end`, if any.
    pub fn first_unset_in(&self, start: usize, end: usize) -> Option<usize> {
        (start..end.min(self.len)).find(|index| !self.get(*index))
    }
}
