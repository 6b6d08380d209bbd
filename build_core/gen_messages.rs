//! Validate the signal database and emit static message descriptors.
use std::collections::HashSet;
use std::fmt::Write;

use crate::core::{ByteOrder, ChecksumKind};

use super::conf::MAX_MESSAGE_LENGTH;
use super::domain::*;
use super::errors::*;
use super::name_helpers::*;

/// Walk through the database and emit one descriptor per message plus the lookup table.
pub(crate) fn run_messages_gen(db: &SignalDatabase) -> Result<String, BuildError> {
    let mut buffer = String::new();

    writeln!(buffer, "// Generated from the `{}` signal database.", db.name)?;
    writeln!(
        buffer,
        "use crate::core::{{ByteOrder, ChecksumKind, MessageDescriptor, SignalDescriptor}};\n"
    )?;

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut table = Vec::new();

    for message in &db.messages {
        validate_message(message)?;

        let const_name = to_const_name(&message.name);
        if !seen_ids.insert(message.id) {
            return Err(BuildError::MessageErr {
                name: message.name.clone(),
                comment: "duplicate arbitration id",
            });
        }
        if !seen_names.insert(const_name.clone()) {
            return Err(BuildError::MessageErr {
                name: message.name.clone(),
                comment: "duplicate message name",
            });
        }

        buffer.push_str(&generate_message_code(message, &const_name)?);
        table.push(const_name);
    }

    writeln!(buffer, "/// Every message known to the signal database.")?;
    writeln!(buffer, "pub static MESSAGES: &[&MessageDescriptor] = &[")?;
    for name in &table {
        writeln!(buffer, "    &{name},")?;
    }
    writeln!(buffer, "];")?;

    Ok(buffer)
}

/// Emit the id constant and the static descriptor of one message.
fn generate_message_code(message: &MessageDef, const_name: &str) -> Result<String, BuildError> {
    let mut buffer = String::new();
    let checksum: ChecksumKind = message.checksum.into();

    writeln!(buffer, "/// Arbitration id of `{}`.", message.name)?;
    writeln!(buffer, "pub const {const_name}_ID: u32 = {:#X};", message.id)?;
    writeln!(buffer, "/// Layout of `{}` ({} bytes).", message.name, message.length)?;
    writeln!(buffer, "pub static {const_name}: MessageDescriptor = MessageDescriptor {{")?;
    writeln!(buffer, "    id: {:#X},", message.id)?;
    writeln!(buffer, "    name: {:?},", message.name)?;
    writeln!(buffer, "    length: {},", message.length)?;
    writeln!(buffer, "    checksum: ChecksumKind::{checksum:?},")?;
    writeln!(buffer, "    signals: &[")?;
    for signal in &message.signals {
        let byte_order: ByteOrder = signal.byte_order.into();
        writeln!(buffer, "        SignalDescriptor {{")?;
        writeln!(buffer, "            name: {:?},", signal.name)?;
        writeln!(buffer, "            start_bit: {},", signal.start_bit)?;
        writeln!(buffer, "            length: {},", signal.length)?;
        writeln!(buffer, "            is_signed: {},", signal.signed)?;
        writeln!(buffer, "            byte_order: ByteOrder::{byte_order:?},")?;
        writeln!(buffer, "        }},")?;
    }
    writeln!(buffer, "    ],")?;
    writeln!(buffer, "}};\n")?;

    Ok(buffer)
}

/// Reject layouts the runtime codec cannot honor.
fn validate_message(message: &MessageDef) -> Result<(), BuildError> {
    if message.length == 0 || message.length > MAX_MESSAGE_LENGTH {
        return Err(BuildError::MessageErr {
            name: message.name.clone(),
            comment: "length must be within 1..=8 bytes",
        });
    }

    let message_bits = message.length as usize * 8;
    let mut used = HashSet::new();
    let mut names = HashSet::new();

    for signal in &message.signals {
        let path = format!("{}.{}", message.name, signal.name);

        if !names.insert(signal.name.as_str()) {
            return Err(BuildError::BitLayoutErr {
                path,
                comment: "duplicate signal name",
            });
        }
        if !(1..=64).contains(&signal.length) {
            return Err(BuildError::BitLayoutErr {
                path,
                comment: "width must be within 1..=64 bits",
            });
        }
        for bit in signal.covered_bits() {
            if bit >= message_bits {
                return Err(BuildError::BitLayoutErr {
                    path,
                    comment: "signal runs past the end of the message",
                });
            }
            if !used.insert(bit) {
                return Err(BuildError::BitLayoutErr {
                    path,
                    comment: "signal overlaps another signal",
                });
            }
        }
    }

    if message.checksum == ChecksumDef::Honda {
        let has = |n: &str| message.signals.iter().any(|s| s.name == n);
        if !has("CHECKSUM") || !has("COUNTER") {
            return Err(BuildError::MessageErr {
                name: message.name.clone(),
                comment: "honda checksum requires COUNTER and CHECKSUM signals",
            });
        }
    }

    Ok(())
}
