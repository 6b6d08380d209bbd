//! Rolling counter and checksum helpers shared by the packer and the
//! integrity gate. Honda places both in the last payload byte:
//! counter in bits 5..4, checksum in bits 3..0.

/// Counter modulus for 2-bit rolling counters.
pub const COUNTER_MODULUS: u8 = 4;

/// Honda nibble checksum over the arbitration id and the payload, ignoring the
/// checksum nibble itself (low nibble of the last byte).
pub fn honda_checksum(id: u32, payload: &[u8]) -> u8 {
    let mut checksum: u8 = 0;

    let mut addr = id;
    while addr > 0 {
        checksum = checksum.wrapping_add((addr & 0xF) as u8);
        addr >>= 4;
    }

    let last = payload.len().saturating_sub(1);
    for (j, byte) in payload.iter().enumerate() {
        checksum = checksum.wrapping_add((byte & 0xF) + (byte >> 4));
        if j == last {
            checksum = checksum.wrapping_sub(byte & 0xF);
        }
    }

    8u8.wrapping_sub(checksum) & 0xF
}

/// Checksum stored in the frame (low nibble of the last byte).
pub fn honda_stored_checksum(payload: &[u8]) -> Option<u8> {
    payload.last().map(|b| b & 0xF)
}

/// Rolling counter stored in the frame (bits 5..4 of the last byte).
pub fn honda_stored_counter(payload: &[u8]) -> Option<u8> {
    payload.last().map(|b| (b >> 4) & 0x3)
}

/// Counter expected after `previous`.
#[inline]
pub fn next_counter(previous: u8) -> u8 {
    (previous + 1) % COUNTER_MODULUS
}
