//! Signal decode/encode engine driven by the compile-time message descriptors.
//! It drives the bit-level readers/writers and turns raw payload bits into
//! signed or unsigned integers (raw units, no scaling).
use super::bits::{BitReader, BitWriter};
use super::checksum::honda_checksum;
use crate::core::{ByteOrder, ChecksumKind, MessageDescriptor, SignalDescriptor, MAX_PAYLOAD_BYTES};
use crate::error::SignalError;

/// Name of the checksum signal in every Honda message that carries one.
pub const CHECKSUM_SIGNAL: &str = "CHECKSUM";

/// Read one signal from a payload, sign-extending when the descriptor says so.
pub fn read_signal(payload: &[u8], signal: &SignalDescriptor) -> Result<i64, SignalError> {
    let reader = BitReader::new(payload);
    let raw = match signal.byte_order {
        ByteOrder::LittleEndian => reader.read_le(signal.start_bit, signal.length)?,
        ByteOrder::BigEndian => reader.read_be(signal.start_bit, signal.length)?,
    };

    if signal.is_signed && signal.length < 64 && (raw >> (signal.length - 1)) & 1 == 1 {
        Ok(raw as i64 - (1i64 << signal.length))
    } else {
        Ok(raw as i64)
    }
}

/// Write one signal into a payload after checking that the value fits.
pub fn write_signal(
    payload: &mut [u8],
    signal: &'static SignalDescriptor,
    value: i64,
) -> Result<(), SignalError> {
    if signal.length < 64 {
        let (min, max) = if signal.is_signed {
            let half = 1i64 << (signal.length - 1);
            (-half, half - 1)
        } else {
            (0, (1i64 << signal.length) - 1)
        };
        if value < min || value > max {
            return Err(SignalError::ValueOutOfRange {
                name: signal.name,
                value,
            });
        }
    }

    let mask = if signal.length >= 64 {
        u64::MAX
    } else {
        (1u64 << signal.length) - 1
    };
    let raw = value as u64 & mask;

    let mut writer = BitWriter::new(payload);
    match signal.byte_order {
        ByteOrder::LittleEndian => writer.write_le(raw, signal.start_bit, signal.length)?,
        ByteOrder::BigEndian => writer.write_be(raw, signal.start_bit, signal.length)?,
    }
    Ok(())
}

/// Decode the signal `name` of message `descriptor` from `payload`.
///
/// Fails when the payload is shorter than the message layout or when the
/// layout has no such signal.
pub fn decode(
    descriptor: &'static MessageDescriptor,
    payload: &[u8],
    name: &'static str,
) -> Result<i64, SignalError> {
    let required = descriptor.length as usize;
    if payload.len() < required {
        return Err(SignalError::FrameTooShort {
            message: descriptor.name,
            len: payload.len(),
            required,
        });
    }
    let signal = descriptor.signal(name).ok_or(SignalError::UnknownSignal {
        name,
        message: descriptor.name,
    })?;
    read_signal(&payload[..required], signal)
}

/// Build a payload for `descriptor` from `(signal, value)` pairs.
///
/// Unlisted signals stay zero. When the message carries a Honda checksum it is
/// computed last, over the final payload, so callers never supply it.
///
/// # Return value
/// Number of payload bytes written into `buffer` (the message length).
pub fn pack(
    descriptor: &'static MessageDescriptor,
    values: &[(&'static str, i64)],
    buffer: &mut [u8; MAX_PAYLOAD_BYTES],
) -> Result<usize, SignalError> {
    buffer.fill(0);
    let len = (descriptor.length as usize).min(MAX_PAYLOAD_BYTES);
    let payload = &mut buffer[..len];

    for &(name, value) in values {
        let signal = descriptor.signal(name).ok_or(SignalError::UnknownSignal {
            name,
            message: descriptor.name,
        })?;
        write_signal(payload, signal, value)?;
    }

    if descriptor.checksum == ChecksumKind::Honda {
        if let Some(signal) = descriptor.signal(CHECKSUM_SIGNAL) {
            let checksum = honda_checksum(descriptor.id, payload);
            write_signal(payload, signal, checksum as i64)?;
        }
    }

    Ok(len)
}
