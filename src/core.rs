//! Defines the "data contract" between `build.rs` (the scribe) and
//! the signal codec (the interpreter).
//!
//! `build.rs` generates static message descriptors from the JSON signal database.
//! The `engine` module consumes those descriptors to decode or pack CAN payloads.

// Some descriptor fields are only read by generated code or tests.
#![allow(dead_code)]

/// Classic CAN payload capacity.
pub const MAX_PAYLOAD_BYTES: usize = 8;

/// Bit numbering convention of a signal, as declared in DBC files.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ByteOrder {
    /// Intel layout: `start_bit` is the least significant bit, bits grow upward.
    LittleEndian,
    /// Motorola layout: `start_bit` is the most significant bit, bits walk
    /// down the byte then continue at bit 7 of the next byte.
    BigEndian,
}

/// Integrity scheme carried in the message payload.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ChecksumKind {
    /// No checksum signal.
    None,
    /// Honda nibble sum over the identifier and the payload.
    Honda,
}

/// Descriptor for a single signal inside a message.
#[derive(Debug)]
pub struct SignalDescriptor {
    /// 1. Signal name as written in the signal database (e.g. `"STEER_TORQUE"`).
    pub name: &'static str,
    /// 2. DBC start bit (meaning depends on `byte_order`).
    pub start_bit: u16,
    /// 3. Width in bits (1..=64).
    pub length: u8,
    /// 4. Two's complement signal.
    pub is_signed: bool,
    /// 5. Bit numbering convention.
    pub byte_order: ByteOrder,
}

/// Descriptor for an entire message layout.
#[derive(Debug)]
pub struct MessageDescriptor {
    /// 1. Arbitration identifier.
    pub id: u32,
    /// 2. Message name (diagnostics).
    pub name: &'static str,
    /// 3. Payload length in bytes.
    pub length: u8,
    /// 4. Integrity scheme.
    pub checksum: ChecksumKind,
    /// 5. Ordered list of signals.
    pub signals: &'static [SignalDescriptor],
}

impl MessageDescriptor {
    /// Find a signal by name.
    pub fn signal(&self, name: &str) -> Option<&'static SignalDescriptor> {
        self.signals.iter().find(|s| s.name == name)
    }
}
