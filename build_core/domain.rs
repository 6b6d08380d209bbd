use crate::core::{ByteOrder, ChecksumKind};
use serde::Deserialize;

//==================================================================================SIGNAL_DB
// Structures to deserialize `honda_messages.json`.
// The database is a DBC-like description of every message the safety core decodes.
#[derive(Debug, Deserialize)]
/// Root of the signal database.
pub(crate) struct SignalDatabase {
    /// Database name (diagnostics only).
    pub(crate) name: String,
    pub(crate) messages: Vec<MessageDef>,
}

#[derive(Debug, Deserialize)]
/// One CAN message layout.
pub(crate) struct MessageDef {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) length: u8,
    #[serde(default)]
    pub(crate) checksum: ChecksumDef,
    pub(crate) signals: Vec<SignalDef>,
}

#[derive(Debug, Deserialize)]
/// One signal inside a message.
pub(crate) struct SignalDef {
    pub(crate) name: String,
    pub(crate) start_bit: u16,
    pub(crate) length: u8,
    #[serde(default)]
    pub(crate) signed: bool,
    #[serde(default)]
    pub(crate) byte_order: ByteOrderDef,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Bit numbering as written in the database. Honda layouts are Motorola.
pub(crate) enum ByteOrderDef {
    LittleEndian,
    #[default]
    BigEndian,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Integrity scheme as written in the database.
pub(crate) enum ChecksumDef {
    #[default]
    None,
    Honda,
}

impl From<ByteOrderDef> for ByteOrder {
    fn from(value: ByteOrderDef) -> Self {
        match value {
            ByteOrderDef::LittleEndian => ByteOrder::LittleEndian,
            ByteOrderDef::BigEndian => ByteOrder::BigEndian,
        }
    }
}

impl From<ChecksumDef> for ChecksumKind {
    fn from(value: ChecksumDef) -> Self {
        match value {
            ChecksumDef::None => ChecksumKind::None,
            ChecksumDef::Honda => ChecksumKind::Honda,
        }
    }
}

impl SignalDef {
    /// Every bit position covered by the signal, in the order it is read.
    pub(crate) fn covered_bits(&self) -> Vec<usize> {
        let mut bits = Vec::with_capacity(self.length as usize);
        let mut pos = self.start_bit as usize;
        match self.byte_order {
            ByteOrderDef::LittleEndian => {
                for i in 0..self.length as usize {
                    bits.push(pos + i);
                }
            }
            ByteOrderDef::BigEndian => {
                for i in 0..self.length {
                    bits.push(pos);
                    if i + 1 < self.length {
                        pos = if pos % 8 == 0 { pos + 15 } else { pos - 1 };
                    }
                }
            }
        }
        bits
    }
}
