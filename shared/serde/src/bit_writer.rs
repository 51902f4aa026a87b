/// Sink for individual bits. Implemented by [`BitWriter`], which stores them,
/// and by [`BitCounter`](crate::BitCounter), which only counts them.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);

    fn write_byte(&mut self, byte: u8) {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 != 0);
        }
    }

    /// Writes the low `bits` bits of `value`, most significant bit first.
    fn write_value(&mut self, bits: u32, value: u64) {
        let bits = bits.min(64);
        for shift in (0..bits).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }
}

/// Growable, bit-addressable output buffer.
///
/// Bits are packed most significant bit first, so a value written with
/// `write(32, x)` on a byte boundary produces the big-endian bytes of `x`.
pub struct BitWriter {
    buffer: Vec<u8>,
    bits_written: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            bits_written: 0,
        }
    }

    /// Appends the low `bits` bits of `value`. Widths above 64 are clamped.
    pub fn write(&mut self, bits: u32, value: u64) {
        self.write_value(bits, value);
    }

    /// Appends the first `bit_count` bits of `data`. Requests longer than
    /// `data` are clamped to `data.len() * 8`.
    pub fn write_bits(&mut self, data: &[u8], bit_count: usize) {
        let bit_count = bit_count.min(data.len() * 8);
        let whole_bytes = bit_count / 8;

        if self.bits_written % 8 == 0 {
            self.buffer.extend_from_slice(&data[..whole_bytes]);
            self.bits_written += whole_bytes * 8;
        } else {
            for byte in &data[..whole_bytes] {
                self.write_byte(*byte);
            }
        }

        let tail_bits = bit_count % 8;
        if tail_bits > 0 {
            let tail = data[whole_bytes];
            for shift in ((8 - tail_bits)..8).rev() {
                self.write_bit((tail >> shift) & 1 != 0);
            }
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.write_bits(data, data.len() * 8);
    }

    pub fn bits_written(&self) -> usize {
        self.bits_written
    }

    /// Number of bytes needed to hold every bit written so far.
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits_written == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Resets the cursor while keeping the allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.bits_written = 0;
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        let byte_index = self.bits_written / 8;
        if byte_index == self.buffer.len() {
            self.buffer.push(0);
        }
        if bit {
            self.buffer[byte_index] |= 0x80 >> (self.bits_written % 8);
        }
        self.bits_written += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_u32_is_big_endian() {
        let mut writer = BitWriter::new();
        writer.write(32, 0x1234_5678);
        assert_eq!(writer.to_bytes(), vec![0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn unaligned_values_pack_tightly() {
        let mut writer = BitWriter::new();
        writer.write(3, 0b101);
        writer.write(5, 0b10011);
        writer.write(4, 0b1111);

        assert_eq!(writer.bits_written(), 12);
        assert_eq!(writer.to_bytes(), vec![0b1011_0011, 0b1111_0000]);
    }

    #[test]
    fn only_low_bits_are_written() {
        let mut writer = BitWriter::new();
        writer.write(4, 0xFF);
        assert_eq!(writer.to_bytes(), vec![0xF0]);
    }

    #[test]
    fn write_bits_handles_partial_trailing_byte() {
        let mut writer = BitWriter::new();
        writer.write(1, 1);
        writer.write_bits(&[0xAB, 0b1100_0000], 10);

        assert_eq!(writer.bits_written(), 11);
        // 1 | 1010_1011 | 11
        assert_eq!(writer.to_bytes(), vec![0b1101_0101, 0b1110_0000]);
    }

    #[test]
    fn write_bits_clamps_to_source() {
        let mut writer = BitWriter::new();
        writer.write_bits(&[0xFF], 64);
        assert_eq!(writer.bits_written(), 8);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut writer = BitWriter::with_capacity(1);
        for _ in 0..10_000 {
            writer.write(8, 0xEE);
        }
        let bytes = writer.to_bytes();
        assert_eq!(bytes.len(), 10_000);
        assert!(bytes.iter().all(|&b| b == 0xEE));
    }
}
