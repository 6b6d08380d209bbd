//! Low-level components dedicated to bit manipulation for CAN buffers.
//! Signals in vehicle databases seldom align with byte boundaries and come in
//! two numbering conventions (Intel and Motorola); both are handled here.
//!
//! Bit positions follow the DBC convention: `byte_index * 8 + bit_in_byte`,
//! where bit 0 is the least significant bit of the byte.
use crate::error::{BitReaderError, BitWriterError};

/// Next position when walking a Motorola (big-endian) signal from its MSB.
#[inline]
fn motorola_next(pos: usize) -> usize {
    if pos % 8 == 0 {
        pos + 15
    } else {
        pos - 1
    }
}

/// Reader that extracts bit segments from a `&[u8]`
/// without extra allocation or copies.
pub struct BitReader<'a> {
    /// Shared source buffer (typically the received CAN frame payload).
    buffer: &'a [u8],
}

impl<'a> BitReader<'a> {
    /// Create a reader over the provided buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    fn check_width(num_bits: u8) -> Result<(), BitReaderError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitReaderError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }
        Ok(())
    }

    fn bit(&self, pos: usize) -> Result<bool, BitReaderError> {
        let byte = self
            .buffer
            .get(pos / 8)
            .ok_or(BitReaderError::OutOfBounds {
                bit: pos,
                available: self.buffer.len() * 8,
            })?;
        Ok((byte >> (pos % 8)) & 1 == 1)
    }

    /// Read an Intel (little-endian) signal whose LSB sits at `start_bit`.
    pub fn read_le(&self, start_bit: u16, num_bits: u8) -> Result<u64, BitReaderError> {
        Self::check_width(num_bits)?;

        let start = start_bit as usize;
        let end = start + num_bits as usize;
        let buffer_len_bits = self.buffer.len() * 8;

        // Prevent reading beyond the buffer.
        if end > buffer_len_bits {
            return Err(BitReaderError::OutOfBounds {
                bit: end - 1,
                available: buffer_len_bits,
            });
        }

        let mut result: u64 = 0;
        let mut bits_read = 0usize;

        while bits_read < num_bits as usize {
            let current_byte_index = (start + bits_read) / 8;
            let current_bit_offset = (start + bits_read) % 8;
            let byte = self.buffer[current_byte_index];

            // Number of bits available within the current byte.
            let bits_this_iteration = (8 - current_bit_offset).min(num_bits as usize - bits_read);

            let mask = ((1u16 << bits_this_iteration) - 1) as u8;
            let masked_value = (byte >> current_bit_offset) & mask;

            result |= (masked_value as u64) << bits_read;
            bits_read += bits_this_iteration;
        }
        Ok(result)
    }

    /// Read a Motorola (big-endian) signal whose MSB sits at `start_bit`.
    pub fn read_be(&self, start_bit: u16, num_bits: u8) -> Result<u64, BitReaderError> {
        Self::check_width(num_bits)?;

        let mut pos = start_bit as usize;
        let mut result: u64 = 0;
        for i in 0..num_bits {
            result = (result << 1) | self.bit(pos)? as u64;
            if i + 1 < num_bits {
                pos = motorola_next(pos);
            }
        }
        Ok(result)
    }
}
//==================================================================================BITWRITER

/// Writer able to lay bit segments into a `&mut [u8]`
/// without assuming byte alignment. Used by the packer to build payloads
/// signal by signal; bits outside the signal are left untouched.
pub struct BitWriter<'a> {
    /// Target buffer (typically the CAN frame payload under construction).
    buffer: &'a mut [u8],
}

impl<'a> BitWriter<'a> {
    /// Create a writer over the buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    fn check_width(num_bits: u8) -> Result<(), BitWriterError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitWriterError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }
        Ok(())
    }

    fn set_bit(&mut self, pos: usize, value: bool) -> Result<(), BitWriterError> {
        let available = self.buffer.len() * 8;
        let byte = self
            .buffer
            .get_mut(pos / 8)
            .ok_or(BitWriterError::OutOfBounds {
                bit: pos,
                available,
            })?;
        let mask = 1u8 << (pos % 8);
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    /// Write the `num_bits` low bits of `value` as an Intel signal starting at `start_bit`.
    pub fn write_le(&mut self, value: u64, start_bit: u16, num_bits: u8) -> Result<(), BitWriterError> {
        Self::check_width(num_bits)?;

        let start = start_bit as usize;
        let end = start + num_bits as usize;
        let buffer_len_bits = self.buffer.len() * 8;

        if end > buffer_len_bits {
            return Err(BitWriterError::OutOfBounds {
                bit: end - 1,
                available: buffer_len_bits,
            });
        }

        let mut val_to_write = value;
        let mut bits_written = 0usize;

        while bits_written < num_bits as usize {
            let current_byte_index = (start + bits_written) / 8;
            let current_bit_offset = (start + bits_written) % 8;

            let bits_this_iteration =
                (8 - current_bit_offset).min(num_bits as usize - bits_written);

            // Update only the relevant bits.
            let mask = ((1u16 << bits_this_iteration) - 1) as u8;
            self.buffer[current_byte_index] &= !(mask << current_bit_offset);
            self.buffer[current_byte_index] |= (val_to_write as u8 & mask) << current_bit_offset;
            val_to_write >>= bits_this_iteration;

            bits_written += bits_this_iteration;
        }
        Ok(())
    }

    /// Write the `num_bits` low bits of `value` as a Motorola signal whose MSB sits at `start_bit`.
    pub fn write_be(&mut self, value: u64, start_bit: u16, num_bits: u8) -> Result<(), BitWriterError> {
        Self::check_width(num_bits)?;

        let mut pos = start_bit as usize;
        for i in (0..num_bits).rev() {
            self.set_bit(pos, (value >> i) & 1 == 1)?;
            if i > 0 {
                pos = motorola_next(pos);
            }
        }
        Ok(())
    }
}
