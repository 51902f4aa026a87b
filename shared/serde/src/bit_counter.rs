use crate::BitWrite;

/// Counts bits instead of storing them, used to size a buffer before writing.
#[derive(Default)]
pub struct BitCounter {
    bits: usize,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> usize {
        self.bits
    }

    pub fn bytes_needed(&self) -> usize {
        self.bits.div_ceil(8)
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _bit: bool) {
        self.bits += 1;
    }

    fn write_value(&mut self, bits: u32, _value: u64) {
        self.bits += bits.min(64) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BitWriter;

    #[test]
    fn counter_matches_writer() {
        let mut counter = BitCounter::new();
        let mut writer = BitWriter::new();

        for (bits, value) in [(3, 5u64), (13, 4000), (32, 0xDEAD_BEEF), (1, 1)] {
            counter.write_value(bits, value);
            writer.write(bits, value);
        }
        counter.write_byte(0x42);
        writer.write_byte(0x42);

        assert_eq!(counter.bits_needed(), writer.bits_written());
        assert_eq!(counter.bytes_needed(), writer.byte_len());
    }
}
