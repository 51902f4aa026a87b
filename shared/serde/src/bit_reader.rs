use crate::SerdeErr;

/// Cursor over a byte slice that reads arbitrary bit widths.
///
/// Every read checks the remaining length first: a failed read leaves the
/// cursor where it was and returns an error, so callers can abort parsing the
/// enclosing packet without consuming partial garbage.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_position: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_position: 0,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.bit_position
    }

    pub fn remaining_bits(&self) -> usize {
        self.buffer.len() * 8 - self.bit_position
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining_bits() == 0
    }

    fn ensure(&self, requested: usize) -> Result<(), SerdeErr> {
        let remaining = self.remaining_bits();
        if requested > remaining {
            return Err(SerdeErr::Underflow {
                requested,
                remaining,
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let byte = self.buffer[self.bit_position / 8];
        let bit = (byte >> (7 - (self.bit_position % 8))) & 1 != 0;
        self.bit_position += 1;
        bit
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        self.ensure(1)?;
        Ok(self.take_bit())
    }

    /// Reads `bits` bits (1..=64), most significant bit first.
    pub fn read(&mut self, bits: u32) -> Result<u64, SerdeErr> {
        if bits == 0 || bits > 64 {
            return Err(SerdeErr::UnsupportedWidth { bits });
        }
        self.ensure(bits as usize)?;

        let mut value: u64 = 0;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.take_bit());
        }
        Ok(value)
    }

    pub fn read_u8(&mut self, bits: u32) -> Result<u8, SerdeErr> {
        Ok(self.read(bits.min(8))? as u8)
    }

    pub fn read_u16(&mut self, bits: u32) -> Result<u16, SerdeErr> {
        Ok(self.read(bits.min(16))? as u16)
    }

    pub fn read_u32(&mut self, bits: u32) -> Result<u32, SerdeErr> {
        Ok(self.read(bits.min(32))? as u32)
    }

    /// Copies `bit_count` raw bits into `out`, filling bytes from the front.
    /// Bits of a trailing partial byte land in its high end.
    pub fn read_bits(&mut self, out: &mut [u8], bit_count: usize) -> Result<(), SerdeErr> {
        if bit_count > out.len() * 8 {
            return Err(SerdeErr::DestinationTooSmall {
                requested: bit_count,
                capacity: out.len(),
            });
        }
        self.ensure(bit_count)?;

        let whole_bytes = bit_count / 8;
        if self.bit_position % 8 == 0 {
            let start = self.bit_position / 8;
            out[..whole_bytes].copy_from_slice(&self.buffer[start..start + whole_bytes]);
            self.bit_position += whole_bytes * 8;
        } else {
            for byte in out.iter_mut().take(whole_bytes) {
                let mut value = 0u8;
                for _ in 0..8 {
                    value = (value << 1) | u8::from(self.take_bit());
                }
                *byte = value;
            }
        }

        let tail_bits = bit_count % 8;
        if tail_bits > 0 {
            let mut value = 0u8;
            for index in 0..tail_bits {
                if self.take_bit() {
                    value |= 0x80 >> index;
                }
            }
            out[whole_bytes] = value;
        }

        Ok(())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SerdeErr> {
        let mut out = vec![0u8; len];
        self.read_bits(&mut out, len * 8)?;
        Ok(out)
    }
}
